//! Order submission and the VNPay redirect flow.
//!
//! Cash-on-delivery orders are posted directly. Prepaid orders are created by
//! the API once VNPay reports back, so the client only opens the payment page
//! and then reads the outcome from the return endpoint.

use std::future::Future;

use milk_delivery_core::{NewOrder, OrderId, OrderItem, Price};
use tracing::instrument;
use url::Url;

use crate::api::{PaymentResult, PlacedOrder, TRACKING_RETURN_PATH, VNPAY_RETURN_PATH};
use crate::error::ApiError;
use crate::http::{ApiClient, Transport};
use crate::storage::KeyValueStore;

/// Shows the payment provider's checkout page to the customer.
pub trait PaymentBrowser: Send + Sync {
    /// Open `url` and resolve once the customer is done with it.
    fn open(&self, url: &Url) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// How a submitted order was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Cash on delivery: the order exists and awaits payment at the door.
    Placed(PlacedOrder),
    /// Paid through VNPay.
    Paid(PaymentResult),
}

impl<T: Transport, S: KeyValueStore> ApiClient<T, S> {
    /// Submit a validated order, going through VNPay when it is prepaid.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Payment` if VNPay declines or returns nothing,
    /// otherwise any error from the requests or the browser.
    #[instrument(skip(self, order, browser), fields(package_id = %order.package_id, method = %order.payment_method))]
    pub async fn submit_order<B: PaymentBrowser>(
        &self,
        order: &NewOrder,
        amount: Price,
        browser: &B,
    ) -> Result<CheckoutOutcome, ApiError> {
        if !order.payment_method.is_prepaid() {
            return self.place_order(order).await.map(CheckoutOutcome::Placed);
        }

        let url = self.create_payment_url(order, amount).await?;
        browser.open(&url).await?;
        let result = settle(self.payment_return(VNPAY_RETURN_PATH).await?)?;
        tracing::info!("Order paid through VNPay");
        Ok(CheckoutOutcome::Paid(result))
    }

    /// Collect payment for an existing order item through VNPay.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Payment` if the item is already paid, has no price,
    /// or VNPay declines.
    #[instrument(skip(self, item, browser), fields(order_id = %order_id, item_id = %item.id))]
    pub async fn collect_payment<B: PaymentBrowser>(
        &self,
        order_id: &OrderId,
        item: &OrderItem,
        browser: &B,
    ) -> Result<PaymentResult, ApiError> {
        if item.is_paid {
            return Err(ApiError::Payment("order item is already paid".into()));
        }
        let amount = item
            .price
            .ok_or_else(|| ApiError::Payment("order item has no price".into()))?;

        let url = self
            .create_tracking_payment_url(order_id, &item.id, amount)
            .await?;
        browser.open(&url).await?;
        let result = settle(self.payment_return(TRACKING_RETURN_PATH).await?)?;
        tracing::info!("Order item paid through VNPay");
        Ok(result)
    }
}

fn settle(result: PaymentResult) -> Result<PaymentResult, ApiError> {
    if result.is_success() {
        return Ok(result);
    }
    let reason = result
        .message
        .or_else(|| result.code.map(|code| format!("VNPay response code {code}")))
        .unwrap_or_else(|| "payment was not completed".to_owned());
    tracing::warn!(%reason, "Payment not completed");
    Err(ApiError::Payment(reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_reports_decline_reason() {
        let declined = PaymentResult {
            code: Some("24".to_owned()),
            ..PaymentResult::default()
        };
        match settle(declined) {
            Err(ApiError::Payment(reason)) => assert_eq!(reason, "VNPay response code 24"),
            other => panic!("unexpected result: {other:?}"),
        }

        let approved = PaymentResult {
            code: Some("00".to_owned()),
            ..PaymentResult::default()
        };
        assert!(settle(approved).is_ok());
    }
}
