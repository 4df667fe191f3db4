//! Delivery staff commands: daily order list and status updates.

use chrono::{Local, NaiveDate};
use milk_delivery_client::App;
use milk_delivery_core::{OrderDetail, OrderId, OrderItemId, StatusUpdate, format_api_date};
use tracing::info;

use super::addresses::address_line;
use super::{CliError, TerminalBrowser, print_lines};

/// Print the orders scheduled for `date` (default: today).
pub async fn list(app: &App, date: Option<NaiveDate>) -> Result<(), CliError> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let orders = app.client().orders_by_date(date).await?;
    if orders.is_empty() {
        return print_lines([format!("No orders for {}", format_api_date(date))]);
    }
    print_lines(orders.iter().map(|summary| {
        format!(
            "{}  {}  {}  {}{}",
            summary.order.id,
            summary.order.status,
            summary.package.display_name(),
            address_line(&summary.shipping_address),
            if summary.order.is_paid { "  (paid)" } else { "" }
        )
    }))
}

pub async fn show(app: &App, order: &str, item: &str) -> Result<(), CliError> {
    let detail = app
        .client()
        .order_detail(&OrderId::new(order), &OrderItemId::new(item))
        .await?;
    print_detail(&detail)
}

pub async fn dispatch(app: &App, order: &str, item: &str) -> Result<(), CliError> {
    let update = app
        .client()
        .dispatch(&OrderId::new(order), &OrderItemId::new(item))
        .await?;
    report(&update)
}

pub async fn complete(app: &App, order: &str, item: &str) -> Result<(), CliError> {
    let update = app
        .client()
        .complete(&OrderId::new(order), &OrderItemId::new(item))
        .await?;
    report(&update)
}

pub async fn fail(app: &App, order: &str, item: &str, reason: &str) -> Result<(), CliError> {
    let update = app
        .client()
        .fail(&OrderId::new(order), &OrderItemId::new(item), reason)
        .await?;
    report(&update)
}

/// Collect payment for an unpaid item through VNPay.
pub async fn pay(app: &App, order: &str, item: &str) -> Result<(), CliError> {
    let order_id = OrderId::new(order);
    let detail = app
        .client()
        .order_detail(&order_id, &OrderItemId::new(item))
        .await?;
    app.client()
        .collect_payment(&order_id, &detail.item, &TerminalBrowser)
        .await?;
    info!("Payment collected");
    print_lines(["Paid"])
}

fn report(update: &StatusUpdate) -> Result<(), CliError> {
    match &update.reason {
        Some(reason) => print_lines([format!("Status: {} ({reason})", update.status)]),
        None => print_lines([format!("Status: {}", update.status)]),
    }
}

fn print_detail(detail: &OrderDetail) -> Result<(), CliError> {
    let item = &detail.item;
    print_lines([
        format!("Order {} / item {}", detail.order_id, item.id),
        format!("Status:   {}", item.status),
        format!("Paid:     {}", if item.is_paid { "yes" } else { "no" }),
        format!(
            "Price:    {}",
            item.price.map_or_else(|| "-".to_owned(), |p| p.display())
        ),
        format!(
            "Delivery: {}",
            item.delivery_date()
                .map_or_else(|| "-".to_owned(), format_api_date)
        ),
        format!("Tracking: {}", item.tracking_number.as_deref().unwrap_or("-")),
        format!("Package:  {}", detail.package.display_name()),
        format!("Ship to:  {}", address_line(&detail.shipping_address)),
    ])
}
