//! The menu: loading, client-side filtering and admin management.

use pizzeria_core::{NewPizza, Pizza, PizzaId, PizzaPatch, Price};

use crate::api::{CatalogApi, CatalogFacets, PizzaAdminApi, PizzaFilters};
use crate::notify::{Notification, Notifier};

/// Category value that matches every pizza.
pub const ALL_CATEGORIES: &str = "all";

/// Categories offered by the menu page, in display order.
pub const MENU_CATEGORIES: [&str; 5] = [
    ALL_CATEGORIES,
    "classic",
    "premium",
    "vegetarian",
    "meat lovers",
];

/// Where a loaded menu came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// Fetched from the API.
    Remote,
    /// The API was unreachable; the built-in placeholder menu is shown.
    Placeholder,
}

/// A menu ready for display.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub pizzas: Vec<Pizza>,
    pub facets: Option<CatalogFacets>,
    pub source: CatalogSource,
}

/// Keep the pizzas matching both `search` and `category`.
///
/// `search` matches the name or description case-insensitively; an empty
/// search matches everything. `category` must equal the pizza's category
/// exactly unless it is [`ALL_CATEGORIES`]. Input order is preserved.
#[must_use]
pub fn filter_pizzas<'a>(items: &'a [Pizza], search: &str, category: &str) -> Vec<&'a Pizza> {
    let needle = search.to_lowercase();
    items
        .iter()
        .filter(|pizza| {
            needle.is_empty()
                || pizza.name.to_lowercase().contains(&needle)
                || pizza.description.to_lowercase().contains(&needle)
        })
        .filter(|pizza| category == ALL_CATEGORIES || pizza.category == category)
        .collect()
}

/// Fetch the menu, falling back to [`placeholder_menu`] if the API fails.
pub async fn load_catalog<A: CatalogApi>(
    api: &A,
    notifier: &dyn Notifier,
    filters: &PizzaFilters,
) -> Catalog {
    match api.list_pizzas(filters).await {
        Ok(response) => {
            tracing::debug!(count = response.pizzas.len(), "Menu loaded");
            Catalog {
                pizzas: response.pizzas,
                facets: response.filters,
                source: CatalogSource::Remote,
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load menu, showing placeholder");
            notifier.notify(Notification::error("Failed to load pizzas"));
            Catalog {
                pizzas: placeholder_menu(),
                facets: None,
                source: CatalogSource::Placeholder,
            }
        }
    }
}

/// Add a pizza to the menu (admin only).
pub async fn add_pizza<A: PizzaAdminApi>(
    api: &A,
    notifier: &dyn Notifier,
    pizza: &NewPizza,
) -> Option<Pizza> {
    match api.create_pizza(pizza).await {
        Ok(created) => {
            tracing::info!(pizza_id = %created.id, name = %created.name, "Pizza added");
            notifier.notify(Notification::success("Pizza added successfully!"));
            Some(created)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to add pizza");
            notifier.notify(Notification::error("Failed to save pizza"));
            None
        }
    }
}

/// Change fields of a pizza on the menu (admin only).
pub async fn edit_pizza<A: PizzaAdminApi>(
    api: &A,
    notifier: &dyn Notifier,
    id: PizzaId,
    patch: &PizzaPatch,
) -> Option<Pizza> {
    match api.update_pizza(id, patch).await {
        Ok(updated) => {
            tracing::info!(pizza_id = %id, "Pizza updated");
            notifier.notify(Notification::success("Pizza updated successfully!"));
            Some(updated)
        }
        Err(e) => {
            tracing::error!(pizza_id = %id, error = %e, "Failed to update pizza");
            notifier.notify(Notification::error("Failed to save pizza"));
            None
        }
    }
}

/// Take a pizza off the menu (admin only).
pub async fn remove_pizza<A: PizzaAdminApi>(
    api: &A,
    notifier: &dyn Notifier,
    id: PizzaId,
) -> bool {
    match api.delete_pizza(id).await {
        Ok(()) => {
            tracing::info!(pizza_id = %id, "Pizza deleted");
            notifier.notify(Notification::success("Pizza deleted successfully!"));
            true
        }
        Err(e) => {
            tracing::error!(pizza_id = %id, error = %e, "Failed to delete pizza");
            notifier.notify(Notification::error("Failed to delete pizza"));
            false
        }
    }
}

/// Menu shown when the API cannot be reached.
#[must_use]
pub fn placeholder_menu() -> Vec<Pizza> {
    [
        (
            1,
            "Margherita",
            1299,
            "Fresh tomatoes, mozzarella cheese, and basil",
            "classic",
        ),
        (
            2,
            "Pepperoni",
            1549,
            "Classic pepperoni with mozzarella cheese",
            "classic",
        ),
        (
            3,
            "Supreme",
            1899,
            "Pepperoni, sausage, bell peppers, onions, and mushrooms",
            "premium",
        ),
        (
            4,
            "Veggie Delight",
            1649,
            "Bell peppers, mushrooms, onions, olives, and tomatoes",
            "vegetarian",
        ),
    ]
    .into_iter()
    .map(|(id, name, cents, description, category)| Pizza {
        id: PizzaId::new(id),
        name: name.to_string(),
        price: Price::from_cents(cents),
        description: description.to_string(),
        image: "/placeholder.svg".to_string(),
        category: category.to_string(),
        is_veg: category == "vegetarian",
        toppings: Vec::new(),
        spice_level: None,
    })
    .collect()
}
