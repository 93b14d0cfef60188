//! Pizzeria CLI - Terminal front end for the storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the menu
//! pizzeria menu --search pepperoni --category classic
//!
//! # Fill the cart
//! pizzeria cart add 1 --quantity 2
//! pizzeria cart show
//!
//! # Log in and order
//! pizzeria login -e diner@example.com -p secret
//! pizzeria checkout --address "1 Main St" --phone 555-0100 --payment cash
//! pizzeria orders
//!
//! # Manage the shop (admin accounts only)
//! pizzeria admin orders --status pending
//! pizzeria admin set-status 12 preparing
//! pizzeria admin pizza create --name Hawaiian --price 14.99 --category classic
//! ```
//!
//! # Environment Variables
//!
//! See `pizzeria_storefront::config`. `RUST_LOG` overrides the default
//! `pizzeria=info` log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use pizzeria_core::{OrderId, OrderStatus, PaymentMethod, PizzaId, Price, SpiceLevel};
use pizzeria_storefront::config::StorefrontConfig;
use pizzeria_storefront::notify::TracingNotifier;
use pizzeria_storefront::orders::StatusFilter;
use pizzeria_storefront::state::StorefrontState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "pizzeria")]
#[command(author, version, about = "Order pizza from the terminal")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the menu
    Menu {
        /// Case-insensitive text to look for in names and descriptions
        #[arg(short, long, default_value = "")]
        search: String,

        /// Menu category (`all`, `classic`, `premium`, `vegetarian`, `meat lovers`)
        #[arg(short, long, default_value = "all")]
        category: String,

        /// Ask the server for vegetarian pizzas only
        #[arg(long)]
        veg: bool,

        /// Ask the server for pizzas of this spice level
        #[arg(long)]
        spice: Option<SpiceLevel>,

        /// Ask the server for pizzas at or below this price
        #[arg(long, value_parser = parse_price)]
        max_price: Option<Price>,
    },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Log in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Place an order for the cart contents
    Checkout {
        /// Delivery address
        #[arg(short, long)]
        address: String,

        /// Contact phone number
        #[arg(short = 'n', long)]
        phone: String,

        /// `card` or `cash`
        #[arg(long, default_value = "card")]
        payment: PaymentMethod,
    },
    /// List your orders
    Orders,
    /// Manage orders and the menu (admin accounts only)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines and totals
    Show,
    /// Add a pizza from the menu
    Add {
        pizza_id: PizzaId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a pizza
    Remove { pizza_id: PizzaId },
    /// Set the quantity of a pizza (zero or less removes it)
    Set {
        pizza_id: PizzaId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AdminAction {
    /// List every order
    Orders {
        /// `all` or a status such as `pending`
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
    },
    /// Move an order to a new status
    SetStatus {
        order_id: OrderId,
        status: OrderStatus,
    },
    /// Manage pizzas
    Pizza {
        #[command(subcommand)]
        action: PizzaAction,
    },
}

#[derive(Subcommand)]
enum PizzaAction {
    /// Add a pizza to the menu
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, value_parser = parse_price)]
        price: Price,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "/placeholder.svg")]
        image: String,

        #[arg(long, default_value = "classic")]
        category: String,

        #[arg(long)]
        veg: bool,

        /// Repeat for each topping
        #[arg(long = "topping")]
        toppings: Vec<String>,

        #[arg(long)]
        spice: Option<SpiceLevel>,
    },
    /// Change fields of a pizza
    Update {
        id: PizzaId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_parser = parse_price)]
        price: Option<Price>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        image: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        veg: Option<bool>,

        #[arg(long)]
        spice: Option<SpiceLevel>,
    },
    /// Remove a pizza from the menu
    Delete { id: PizzaId },
}

fn parse_price(raw: &str) -> Result<Price, String> {
    Price::parse(raw).map_err(|e| e.to_string())
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pizzeria=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let state = StorefrontState::open(config, Arc::new(TracingNotifier))?;

    match cli.command {
        Commands::Menu {
            search,
            category,
            veg,
            spice,
            max_price,
        } => {
            let filters = commands::menu::server_filters(veg, spice, max_price);
            commands::menu::show(&state, &filters, &search, &category).await;
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state),
            CartAction::Add { pizza_id, quantity } => {
                commands::cart::add(&state, pizza_id, quantity).await?;
            }
            CartAction::Remove { pizza_id } => state.cart().remove_item(pizza_id),
            CartAction::Set { pizza_id, quantity } => {
                state.cart().set_quantity(pizza_id, quantity);
                commands::cart::show(&state);
            }
            CartAction::Clear => state.cart().clear(),
        },
        Commands::Login { email, password } => {
            commands::account::login(&state, &email, &password).await?;
        }
        Commands::Register { email, password } => {
            commands::account::register(&state, &email, &password).await?;
        }
        Commands::Logout => state.session().logout(),
        Commands::Whoami => commands::account::whoami(&state),
        Commands::Checkout {
            address,
            phone,
            payment,
        } => commands::orders::checkout(&state, address, phone, payment).await?,
        Commands::Orders => commands::orders::history(&state).await,
        Commands::Admin { action } => {
            commands::admin::require_admin(&state)?;
            match action {
                AdminAction::Orders { status } => commands::admin::orders(&state, status).await,
                AdminAction::SetStatus { order_id, status } => {
                    commands::admin::set_status(&state, order_id, status).await?;
                }
                AdminAction::Pizza { action } => match action {
                    PizzaAction::Create {
                        name,
                        price,
                        description,
                        image,
                        category,
                        veg,
                        toppings,
                        spice,
                    } => {
                        let pizza = pizzeria_core::NewPizza {
                            name,
                            description,
                            price,
                            image,
                            category,
                            is_veg: veg,
                            toppings,
                            spice_level: spice,
                        };
                        commands::admin::create_pizza(&state, &pizza).await?;
                    }
                    PizzaAction::Update {
                        id,
                        name,
                        price,
                        description,
                        image,
                        category,
                        veg,
                        spice,
                    } => {
                        let patch = pizzeria_core::PizzaPatch {
                            name,
                            description,
                            price,
                            image,
                            category,
                            is_veg: veg,
                            toppings: None,
                            spice_level: spice,
                        };
                        commands::admin::update_pizza(&state, id, &patch).await?;
                    }
                    PizzaAction::Delete { id } => commands::admin::delete_pizza(&state, id).await?,
                },
            }
        }
    }
    Ok(())
}
