//! Menu browsing.

use pizzeria_core::{Pizza, Price, SpiceLevel};
use pizzeria_storefront::api::PizzaFilters;
use pizzeria_storefront::catalog::{self, CatalogSource};
use pizzeria_storefront::state::StorefrontState;

/// Filters the server applies before the menu is sent.
pub fn server_filters(
    veg: bool,
    spice_level: Option<SpiceLevel>,
    max_price: Option<Price>,
) -> PizzaFilters {
    PizzaFilters {
        is_veg: veg.then_some(true),
        spice_level,
        max_price,
        ..PizzaFilters::default()
    }
}

/// Print the menu, narrowed locally by `search` and `category`.
pub async fn show(state: &StorefrontState, filters: &PizzaFilters, search: &str, category: &str) {
    let menu = catalog::load_catalog(state.api(), state.notifier(), filters).await;
    if menu.source == CatalogSource::Placeholder {
        tracing::warn!("Showing the offline menu; prices may be out of date");
    }

    let matches = catalog::filter_pizzas(&menu.pizzas, search, category);
    if matches.is_empty() {
        tracing::info!("No pizzas match your search");
        return;
    }
    for pizza in matches {
        print_pizza(pizza);
    }
}

pub fn print_pizza(pizza: &Pizza) {
    let veg = if pizza.is_veg { " (veg)" } else { "" };
    tracing::info!(
        "{:>4}  {:<20} {:>8}  {}{}",
        pizza.id,
        pizza.name,
        pizza.price.to_string(),
        pizza.category,
        veg
    );
    if !pizza.description.is_empty() {
        tracing::info!("      {}", pizza.description);
    }
}
