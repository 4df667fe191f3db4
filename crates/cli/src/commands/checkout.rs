//! Checkout command.

use chrono::{Local, NaiveDate};
use milk_delivery_client::{App, CheckoutOutcome};
use milk_delivery_core::{DeliveryCombo, OrderForm, PackageId, PaymentMethod};
use tracing::info;

use super::{CliError, TerminalBrowser, print_lines, require_user};

/// Checkout input gathered from the command line.
pub struct CheckoutRequest {
    pub package: String,
    pub combo: DeliveryCombo,
    pub start: NaiveDate,
    pub shipments: String,
    pub payment: PaymentMethod,
    pub saved_address: Option<usize>,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
}

pub async fn run(app: &mut App, request: CheckoutRequest) -> Result<(), CliError> {
    let user = require_user(app)?;
    let package = app
        .catalog()
        .package(&PackageId::new(request.package))
        .await?;

    let mut form = OrderForm {
        full_name: request.name,
        phone: request.phone,
        address: request.address,
        city: request.city,
        country: request.country,
        payment_method: request.payment,
        delivery_combo: request.combo,
        start_date: Some(request.start),
        number_of_shipment: request.shipments,
    };
    if let Some(index) = request.saved_address {
        let saved = app.addresses().list(&user.id).await?;
        let address = saved.get(index).ok_or(CliError::NoSuchAddress(index))?;
        form.use_address(address);
    }

    info!(
        package = %package.display_name(),
        amount = %package.effective_price().display(),
        method = %form.payment_method,
        "Submitting order"
    );
    let today = Local::now().date_naive();
    match app.checkout(&form, &package, today, &TerminalBrowser).await? {
        CheckoutOutcome::Placed(order) => print_lines([
            format!("Order {} placed", order.id),
            "Pay on delivery".to_owned(),
        ]),
        CheckoutOutcome::Paid(result) => print_lines([format!(
            "Payment successful{}",
            result
                .order_id
                .map(|id| format!(" for order {id}"))
                .unwrap_or_default()
        )]),
    }
}
