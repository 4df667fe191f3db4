//! VNPay redirect payments.
//!
//! Both flows have the same shape: ask the API for a signed VNPay URL, let the
//! customer pay in a browser, then read the outcome from the matching return
//! endpoint.

use milk_delivery_core::{NewOrder, OrderId, OrderItemId, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::error::ApiError;
use crate::http::{ApiClient, Transport};
use crate::storage::KeyValueStore;

/// Return endpoint for checkout payments.
pub const VNPAY_RETURN_PATH: &str = "/api/payments/vnpay_return";

/// Return endpoint for order-tracking payments.
pub const TRACKING_RETURN_PATH: &str = "/api/payments/vnpay_return_order_tracking";

/// VNPay response code for an approved transaction.
const VNPAY_SUCCESS_CODE: &str = "00";

#[derive(Serialize)]
struct CheckoutPayment<'a> {
    #[serde(flatten)]
    order: &'a NewOrder,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackingPayment<'a> {
    order_id: &'a OrderId,
    item_id: &'a OrderItemId,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentLink {
    #[serde(default)]
    vnp_url: Option<String>,
}

impl PaymentLink {
    fn into_url(self) -> Result<Url, ApiError> {
        let raw = self
            .vnp_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ApiError::Payment("payment provider returned no redirect URL".into()))?;
        Ok(Url::parse(&raw)?)
    }
}

/// Outcome reported by a VNPay return endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    /// VNPay response code (`"00"` means approved).
    #[serde(default, alias = "vnp_ResponseCode")]
    pub code: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "orderID")]
    pub order_id: Option<OrderId>,
}

impl PaymentResult {
    /// Whether the payment went through.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success == Some(true) || self.code.as_deref() == Some(VNPAY_SUCCESS_CODE)
    }
}

impl<T: Transport, S: KeyValueStore> ApiClient<T, S> {
    /// `POST /api/payments/create_payment_url` for a new order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Payment` if the response carries no redirect URL.
    #[instrument(skip(self, order), fields(package_id = %order.package_id, amount = %amount))]
    pub async fn create_payment_url(&self, order: &NewOrder, amount: Price) -> Result<Url, ApiError> {
        let body = CheckoutPayment {
            order,
            amount: amount.amount(),
        };
        let link: PaymentLink = self.post("/api/payments/create_payment_url", &body).await?;
        link.into_url()
    }

    /// `POST /api/payments/create_payment_order_tracking_url` to collect
    /// payment for an existing order item.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Payment` if the response carries no redirect URL.
    #[instrument(skip(self), fields(order_id = %order_id, item_id = %item_id, amount = %amount))]
    pub async fn create_tracking_payment_url(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
        amount: Price,
    ) -> Result<Url, ApiError> {
        let body = TrackingPayment {
            order_id,
            item_id,
            amount: amount.amount(),
        };
        let link: PaymentLink = self
            .post("/api/payments/create_payment_order_tracking_url", &body)
            .await?;
        link.into_url()
    }

    /// Read a payment outcome from `return_path`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Payment` if the endpoint answers with an empty body.
    #[instrument(skip(self))]
    pub async fn payment_return(&self, return_path: &str) -> Result<PaymentResult, ApiError> {
        let result: Option<PaymentResult> = self.get(return_path).await?;
        result.ok_or_else(|| ApiError::Payment("no payment result was returned".into()))
    }
}
