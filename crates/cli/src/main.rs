//! Milk Delivery CLI - drive the delivery API from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (prompts for the password)
//! milk-cli login -u lan.nguyen
//!
//! # Browse the catalog and fill the cart
//! milk-cli products --brand 66a1f0
//! milk-cli cart add --product 66a1f3 -q 2
//! milk-cli cart show
//!
//! # Place an order for a package
//! milk-cli checkout --package 66b2c1 --combo 2-4-6 --start 03/07/2024 --shipments 12 \
//!     --name "Lan Nguyen" --phone 0901234567 --address "12 Hang Bai" --city Hanoi
//!
//! # Delivery staff: today's orders and status updates
//! milk-cli orders
//! milk-cli order dispatch <ORDER_ID> <ITEM_ID>
//! milk-cli order fail <ORDER_ID> <ITEM_ID> --reason "Customer not home"
//! ```
//!
//! # Environment Variables
//!
//! See `milk_delivery_client::config`. `RUST_LOG` controls log output
//! (default: `milk_delivery_client=info,milk_cli=info`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use milk_delivery_core::{DeliveryCombo, PaymentMethod, parse_api_date};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "milk-cli")]
#[command(author, version, about = "Milk Delivery CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session tokens
    Login {
        /// Account user name
        #[arg(short, long)]
        user: String,
    },
    /// Remove the stored session
    Logout,
    /// Show the signed-in user
    Me,
    /// Change the password (prompts), then sign out
    Password,
    /// Update profile fields
    Profile(ProfileArgs),
    /// List products
    Products {
        /// Only products of this brand id
        #[arg(short, long)]
        brand: Option<String>,
    },
    /// Show one product
    Product { id: String },
    /// List packages
    Packages {
        /// Only packages containing a product with this name (recorded in
        /// the search history)
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one package
    Package { id: String },
    /// Recent searches
    History {
        /// Forget every search
        #[arg(long)]
        clear: bool,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage saved addresses
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Order a package
    Checkout(CheckoutArgs),
    /// Orders scheduled for a delivery date
    Orders {
        /// Delivery date (default: today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Inspect or update one order item
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product or package
    Add {
        /// Product id
        #[arg(long, conflicts_with = "package", required_unless_present = "package")]
        product: Option<String>,
        /// Package id
        #[arg(long)]
        package: Option<String>,
        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line (0 removes it)
    Set { id: String, quantity: u32 },
    /// Remove a line
    Remove { id: String },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add(AddressArgs),
    /// Remove the address at INDEX (as shown by `list`)
    Remove { index: usize },
}

#[derive(Args, Clone)]
struct AddressArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long, default_value = milk_delivery_core::DEFAULT_COUNTRY)]
    country: String,
}

#[derive(Args)]
struct CheckoutArgs {
    /// Package id
    #[arg(long)]
    package: String,
    /// Weekly delivery combo (`2-4-6` or `3-5-7`)
    #[arg(long)]
    combo: DeliveryCombo,
    /// First delivery date (dd/mm/yyyy)
    #[arg(long, value_parser = parse_date)]
    start: NaiveDate,
    /// Number of deliveries
    #[arg(long)]
    shipments: String,
    /// Payment method (`VNPay` or `COD`)
    #[arg(long, default_value = "COD")]
    payment: PaymentMethod,
    /// Use the saved address at this index instead of the fields below
    #[arg(long, conflicts_with_all = ["name", "phone", "address", "city"])]
    saved_address: Option<usize>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long, default_value = milk_delivery_core::DEFAULT_COUNTRY)]
    country: String,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Show an order item
    Show { order: String, item: String },
    /// Mark as out for delivery
    Dispatch { order: String, item: String },
    /// Mark as delivered (item must be paid)
    Complete { order: String, item: String },
    /// Mark as failed
    Fail {
        order: String,
        item: String,
        #[arg(short, long)]
        reason: String,
    },
    /// Collect payment for the item through VNPay
    Pay { order: String, item: String },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    parse_api_date(value).ok_or_else(|| format!("expected dd/mm/yyyy, got {value:?}"))
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("milk_delivery_client=info,milk_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = commands::open_app().await?;

    match cli.command {
        Commands::Login { user } => commands::session::login(&mut app, &user).await?,
        Commands::Logout => commands::session::logout(&mut app).await?,
        Commands::Me => commands::session::me(&app)?,
        Commands::Password => commands::session::change_password(&mut app).await?,
        Commands::Profile(args) => {
            let update = milk_delivery_core::ProfileUpdate {
                first_name: args.first_name,
                last_name: args.last_name,
                email: args.email,
                phone_number: args.phone,
                address: args.address,
            };
            commands::session::edit_profile(&mut app, &update).await?;
        }
        Commands::Products { brand } => {
            commands::catalog::products(&app, brand.as_deref()).await?;
        }
        Commands::Product { id } => commands::catalog::product(&app, &id).await?,
        Commands::Packages { search } => {
            commands::catalog::packages(&app, search.as_deref()).await?;
        }
        Commands::Package { id } => commands::catalog::package(&app, &id).await?,
        Commands::History { clear } => commands::catalog::history(&app, clear).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&app)?,
            CartAction::Add {
                product,
                package,
                quantity,
            } => {
                commands::cart::add(&mut app, product.as_deref(), package.as_deref(), quantity)
                    .await?;
            }
            CartAction::Set { id, quantity } => {
                commands::cart::set_quantity(&mut app, &id, quantity).await?;
            }
            CartAction::Remove { id } => commands::cart::remove(&mut app, &id).await?,
            CartAction::Clear => commands::cart::clear(&mut app).await?,
        },
        Commands::Addresses { action } => match action {
            AddressAction::List => commands::addresses::list(&mut app).await?,
            AddressAction::Add(args) => {
                commands::addresses::add(
                    &mut app,
                    &args.name,
                    &args.phone,
                    &args.address,
                    &args.city,
                    &args.country,
                )
                .await?;
            }
            AddressAction::Remove { index } => commands::addresses::remove(&mut app, index).await?,
        },
        Commands::Checkout(args) => {
            let request = commands::checkout::CheckoutRequest {
                package: args.package,
                combo: args.combo,
                start: args.start,
                shipments: args.shipments,
                payment: args.payment,
                saved_address: args.saved_address,
                name: args.name.unwrap_or_default(),
                phone: args.phone.unwrap_or_default(),
                address: args.address.unwrap_or_default(),
                city: args.city.unwrap_or_default(),
                country: args.country,
            };
            commands::checkout::run(&mut app, request).await?;
        }
        Commands::Orders { date } => commands::orders::list(&app, date).await?,
        Commands::Order { action } => match action {
            OrderAction::Show { order, item } => {
                commands::orders::show(&app, &order, &item).await?;
            }
            OrderAction::Dispatch { order, item } => {
                commands::orders::dispatch(&app, &order, &item).await?;
            }
            OrderAction::Complete { order, item } => {
                commands::orders::complete(&app, &order, &item).await?;
            }
            OrderAction::Fail {
                order,
                item,
                reason,
            } => commands::orders::fail(&app, &order, &item, &reason).await?,
            OrderAction::Pay { order, item } => {
                commands::orders::pay(&app, &order, &item).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(
            parse_date("03/07/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 3).unwrap()
        );
        assert_eq!(
            parse_date("2024-07-03").unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 3).unwrap()
        );
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_checkout_args_parse() {
        let cli = Cli::try_parse_from([
            "milk-cli",
            "checkout",
            "--package",
            "k1",
            "--combo",
            "2-4-6",
            "--start",
            "03/07/2024",
            "--shipments",
            "12",
            "--payment",
            "vnpay",
            "--saved-address",
            "0",
        ])
        .unwrap();
        match cli.command {
            Commands::Checkout(args) => {
                assert_eq!(args.combo, DeliveryCombo::MonWedFri);
                assert_eq!(args.payment, PaymentMethod::VnPay);
                assert_eq!(args.saved_address, Some(0));
            }
            _ => panic!("expected checkout"),
        }
    }
}
