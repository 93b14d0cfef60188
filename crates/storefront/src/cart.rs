//! Cart store.
//!
//! Holds the pizzas the customer intends to buy. The in-memory line list is
//! the source of truth; after every mutation the whole list is written to
//! durable storage under the `cart` key, and at construction that key is read
//! once to seed the store.

use std::num::NonZeroU32;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pizzeria_core::{CartLine, Pizza, PizzaId, Price};

use crate::notify::{Notification, Notifier};
use crate::storage::{KeyValueStore, keys};

/// Shared handle to the cart.
///
/// Cheap to clone; clones observe and mutate the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    lines: RwLock<Vec<CartLine>>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
}

impl CartStore {
    /// Create the store, seeding it from durable storage.
    ///
    /// Missing or unreadable data yields an empty cart.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        let lines = read_persisted_lines(storage.as_ref());
        tracing::debug!(lines = lines.len(), "Cart loaded");

        Self {
            inner: Arc::new(CartStoreInner {
                lines: RwLock::new(lines),
                storage,
                notifier,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<CartLine>> {
        self.inner.lines.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<CartLine>> {
        self.inner.lines.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the cart in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.read().clone()
    }

    /// The line for `item_id`, if the pizza is in the cart.
    #[must_use]
    pub fn line(&self, item_id: PizzaId) -> Option<CartLine> {
        self.read()
            .iter()
            .find(|line| line.item.id == item_id)
            .cloned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Add `quantity` of `item`, merging into an existing line for the same
    /// pizza. A merged quantity saturates at `u32::MAX`.
    pub fn add_item(&self, item: Pizza, quantity: NonZeroU32) {
        let name = item.name.clone();
        let merged = {
            let mut lines = self.write();
            let merged = match lines.iter_mut().find(|line| line.item.id == item.id) {
                Some(line) => {
                    line.quantity = line.quantity.saturating_add(quantity.get());
                    true
                }
                None => {
                    lines.push(CartLine::new(item, quantity));
                    false
                }
            };
            self.persist(&lines);
            merged
        };

        let message = if merged {
            format!("Added more {name} to cart")
        } else {
            format!("{name} added to cart")
        };
        self.inner.notifier.notify(Notification::success(message));
    }

    /// Add a single unit of `item`.
    pub fn add_one(&self, item: Pizza) {
        self.add_item(item, NonZeroU32::MIN);
    }

    /// Remove the line for `item_id`. Does nothing if it is not in the cart.
    pub fn remove_item(&self, item_id: PizzaId) {
        let removed = {
            let mut lines = self.write();
            let Some(index) = lines.iter().position(|line| line.item.id == item_id) else {
                return;
            };
            let removed = lines.remove(index);
            self.persist(&lines);
            removed
        };

        self.inner.notifier.notify(Notification::success(format!(
            "{} removed from cart",
            removed.item.name
        )));
    }

    /// Replace the quantity of `item_id`.
    ///
    /// Zero or below removes the line, exactly like [`CartStore::remove_item`].
    /// Values above `u32::MAX` are clamped to it. Does nothing if the pizza is
    /// not in the cart.
    pub fn set_quantity(&self, item_id: PizzaId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(item_id);
            return;
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .and_then(NonZeroU32::new)
            .unwrap_or(NonZeroU32::MAX);

        let mut lines = self.write();
        if let Some(line) = lines.iter_mut().find(|line| line.item.id == item_id) {
            line.quantity = quantity;
            self.persist(&lines);
        }
    }

    /// Empty the cart.
    pub fn clear(&self) {
        {
            let mut lines = self.write();
            lines.clear();
            self.persist(&lines);
        }
        self.inner.notifier.notify(Notification::success("Cart cleared"));
    }

    /// Sum of unit price times quantity over every line.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.read().iter().map(CartLine::line_total).sum()
    }

    /// Number of pizzas in the cart, counting quantities.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.read()
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Write the full line list to durable storage.
    ///
    /// Called with the write lock held so snapshots land in mutation order.
    /// Failures are logged; memory stays authoritative.
    fn persist(&self, lines: &[CartLine]) {
        let result = serde_json::to_string(lines)
            .map_err(crate::storage::StorageError::from)
            .and_then(|json| self.inner.storage.set(keys::CART, &json));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist cart");
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &*self.read())
            .finish_non_exhaustive()
    }
}

/// Read the persisted cart, treating anything unusable as empty.
fn read_persisted_lines(storage: &dyn KeyValueStore) -> Vec<CartLine> {
    let raw = match storage.get(keys::CART) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read cart from storage");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<CartLine>>(&raw) {
        Ok(lines) => merge_duplicate_lines(lines),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding corrupt persisted cart");
            Vec::new()
        }
    }
}

/// Collapse lines that share a pizza id into the first one.
fn merge_duplicate_lines(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|m| m.item.id == line.item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity.get());
            }
            None => merged.push(line),
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::placeholder_menu;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStore;

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn pizza(name: &str) -> Pizza {
        placeholder_menu()
            .into_iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    fn new_cart() -> (CartStore, Arc<MemoryStore>, Arc<RecordingNotifier>) {
        let storage = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let cart = CartStore::load(storage.clone(), notifier.clone());
        (cart, storage, notifier)
    }

    #[test]
    fn test_add_distinct_items() {
        let (cart, _, _) = new_cart();
        cart.add_item(pizza("Margherita"), qty(2));
        cart.add_item(pizza("Pepperoni"), qty(1));
        cart.add_item(pizza("Supreme"), qty(4));

        assert_eq!(cart.lines().len(), 3);
        assert_eq!(cart.total_item_count(), 7);
        let names: Vec<_> = cart.lines().into_iter().map(|l| l.item.name).collect();
        assert_eq!(names, ["Margherita", "Pepperoni", "Supreme"]);
    }

    #[test]
    fn test_add_same_item_merges() {
        let (cart, _, notifier) = new_cart();
        cart.add_item(pizza("Margherita"), qty(2));
        cart.add_item(pizza("Margherita"), qty(3));

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().unwrap().quantity.get(), 5);
        assert_eq!(
            notifier.messages(),
            ["Margherita added to cart", "Added more Margherita to cart"]
        );
    }

    #[test]
    fn test_add_one() {
        let (cart, _, _) = new_cart();
        cart.add_one(pizza("Supreme"));
        cart.add_one(pizza("Supreme"));
        assert_eq!(cart.line(PizzaId::new(3)).unwrap().quantity.get(), 2);
    }

    #[test]
    fn test_remove_item() {
        let (cart, _, notifier) = new_cart();
        cart.add_one(pizza("Margherita"));
        cart.add_one(pizza("Pepperoni"));
        notifier.drain();

        cart.remove_item(PizzaId::new(1));
        assert!(cart.line(PizzaId::new(1)).is_none());
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(notifier.messages(), ["Margherita removed from cart"]);
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let (cart, storage, notifier) = new_cart();
        cart.add_item(pizza("Margherita"), qty(2));
        let before = cart.lines();
        let persisted = storage.get(keys::CART).unwrap();
        notifier.drain();

        cart.remove_item(PizzaId::new(99));

        assert_eq!(cart.lines(), before);
        assert_eq!(storage.get(keys::CART).unwrap(), persisted);
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn test_set_quantity_replaces() {
        let (cart, _, _) = new_cart();
        cart.add_item(pizza("Pepperoni"), qty(2));
        cart.set_quantity(PizzaId::new(2), 7);
        assert_eq!(cart.line(PizzaId::new(2)).unwrap().quantity.get(), 7);
    }

    #[test]
    fn test_set_quantity_zero_matches_remove() {
        let (a, storage_a, notes_a) = new_cart();
        let (b, storage_b, notes_b) = new_cart();
        for cart in [&a, &b] {
            cart.add_item(pizza("Margherita"), qty(2));
            cart.add_item(pizza("Pepperoni"), qty(1));
        }

        a.set_quantity(PizzaId::new(1), 0);
        b.remove_item(PizzaId::new(1));

        assert_eq!(a.lines(), b.lines());
        assert_eq!(
            storage_a.get(keys::CART).unwrap(),
            storage_b.get(keys::CART).unwrap()
        );
        assert_eq!(notes_a.messages(), notes_b.messages());
    }

    #[test]
    fn test_set_negative_quantity_removes() {
        let (cart, _, _) = new_cart();
        cart.add_one(pizza("Margherita"));
        cart.set_quantity(PizzaId::new(1), -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_above_u32_clamps() {
        let (cart, storage, _) = new_cart();
        cart.add_item(pizza("Pepperoni"), qty(2));

        cart.set_quantity(PizzaId::new(2), 5_000_000_000);

        assert_eq!(cart.line(PizzaId::new(2)).unwrap().quantity, NonZeroU32::MAX);
        assert_eq!(cart.total_item_count(), u64::from(u32::MAX));
        let reloaded = CartStore::load(storage, Arc::new(RecordingNotifier::new()));
        assert_eq!(reloaded.total_item_count(), u64::from(u32::MAX));
    }

    #[test]
    fn test_merged_quantity_saturates() {
        let (cart, _, _) = new_cart();
        cart.add_item(pizza("Supreme"), NonZeroU32::MAX);
        cart.add_item(pizza("Supreme"), qty(10));
        assert_eq!(cart.line(PizzaId::new(3)).unwrap().quantity, NonZeroU32::MAX);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_set_quantity_absent_item_is_noop() {
        let (cart, _, _) = new_cart();
        cart.add_one(pizza("Margherita"));
        cart.set_quantity(PizzaId::new(42), 5);
        assert_eq!(cart.lines().len(), 1);
        assert!(cart.line(PizzaId::new(42)).is_none());
    }

    #[test]
    fn test_clear() {
        let (cart, storage, notifier) = new_cart();
        cart.add_one(pizza("Margherita"));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(storage.get(keys::CART).unwrap().as_deref(), Some("[]"));
        assert_eq!(notifier.last().unwrap().message, "Cart cleared");
    }

    #[test]
    fn test_total_price_exact() {
        let (cart, _, _) = new_cart();
        cart.add_item(pizza("Margherita"), qty(2));
        cart.add_item(pizza("Pepperoni"), qty(1));
        assert_eq!(cart.total_price(), Price::from_cents(4147));
    }

    #[test]
    fn test_empty_cart_totals() {
        let (cart, _, _) = new_cart();
        assert_eq!(cart.total_price(), Price::ZERO);
        assert_eq!(cart.total_item_count(), 0);
    }

    #[test]
    fn test_persist_reload_roundtrip() {
        let (cart, storage, _) = new_cart();
        cart.add_item(pizza("Veggie Delight"), qty(2));
        cart.add_item(pizza("Margherita"), qty(1));
        cart.add_item(pizza("Supreme"), qty(3));
        cart.set_quantity(PizzaId::new(1), 4);
        let before = cart.lines();
        drop(cart);

        let reloaded = CartStore::load(storage, Arc::new(RecordingNotifier::new()));
        assert_eq!(reloaded.lines(), before);
    }

    #[test]
    fn test_corrupt_storage_yields_empty_cart() {
        let storage = Arc::new(MemoryStore::with_entries([(keys::CART, "{not json")]));
        let cart = CartStore::load(storage, Arc::new(RecordingNotifier::new()));
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Price::ZERO);
    }

    #[test]
    fn test_legacy_storage_format_loads() {
        let storage = Arc::new(MemoryStore::with_entries([(
            keys::CART,
            r#"[{"pizza": {"id": 1, "name": "Margherita", "price": 12.99}, "quantity": 2}]"#,
        )]));
        let cart = CartStore::load(storage, Arc::new(RecordingNotifier::new()));
        assert_eq!(cart.total_item_count(), 2);
        assert_eq!(cart.total_price(), Price::from_cents(2598));
    }

    #[test]
    fn test_duplicate_persisted_lines_are_merged() {
        let storage = Arc::new(MemoryStore::with_entries([(
            keys::CART,
            r#"[
                {"item": {"id": 1, "name": "Margherita", "price": 12.99}, "quantity": 2},
                {"item": {"id": 2, "name": "Pepperoni", "price": 15.49}, "quantity": 1},
                {"item": {"id": 1, "name": "Margherita", "price": 12.99}, "quantity": 1}
            ]"#,
        )]));
        let cart = CartStore::load(storage, Arc::new(RecordingNotifier::new()));
        let lines = cart.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.first().unwrap().quantity.get(), 3);
    }

    #[test]
    fn test_clones_share_state() {
        let (cart, _, _) = new_cart();
        let other = cart.clone();
        other.add_one(pizza("Margherita"));
        assert_eq!(cart.total_item_count(), 1);
    }
}
