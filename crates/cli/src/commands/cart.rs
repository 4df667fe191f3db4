//! Cart commands. The cart is persisted after every change.

use milk_delivery_client::{Action, App};
use milk_delivery_core::{CartItemId, PackageId, ProductId};
use tracing::info;

use super::{CliError, print_lines};

/// Print the cart lines and totals.
pub fn show(app: &App) -> Result<(), CliError> {
    let cart = &app.state().cart;
    if cart.is_empty() {
        return print_lines(["Cart is empty"]);
    }
    let mut lines: Vec<String> = cart
        .lines()
        .iter()
        .map(|line| {
            format!(
                "{}  {} x{}  {}",
                line.item.id,
                line.item.name,
                line.quantity,
                line.line_total().display()
            )
        })
        .collect();
    lines.push(format!(
        "Total: {} items, {}",
        cart.total_quantity(),
        cart.total_price().display()
    ));
    print_lines(lines)
}

/// Add a product or a package, looked up in the catalog.
pub async fn add(
    app: &mut App,
    product: Option<&str>,
    package: Option<&str>,
    quantity: u32,
) -> Result<(), CliError> {
    let item = match (product, package) {
        (Some(id), _) => app.catalog().product(&ProductId::new(id)).await?.to_cart_item(),
        (None, Some(id)) => app.catalog().package(&PackageId::new(id)).await?.to_cart_item(),
        (None, None) => return Ok(()),
    };
    info!(item = %item.name, quantity, "Adding to cart");
    app.dispatch(Action::AddToCart { item, quantity }).await?;
    show(app)
}

pub async fn set_quantity(app: &mut App, id: &str, quantity: u32) -> Result<(), CliError> {
    app.dispatch(Action::UpdateQuantity {
        id: CartItemId::new(id),
        quantity,
    })
    .await?;
    show(app)
}

pub async fn remove(app: &mut App, id: &str) -> Result<(), CliError> {
    app.dispatch(Action::RemoveFromCart(CartItemId::new(id)))
        .await?;
    show(app)
}

pub async fn clear(app: &mut App) -> Result<(), CliError> {
    app.dispatch(Action::ClearCart).await?;
    show(app)
}
