//! Order placement, lookup and the delivery status workflow.

use chrono::NaiveDate;
use milk_delivery_core::{
    NewOrder, OrderDetail, OrderId, OrderItem, OrderItemId, OrderStatus, OrderSummary,
    StatusUpdate, ValidationError, plan_transition,
};
use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::instrument;

use crate::error::ApiError;
use crate::http::{ApiClient, Transport};
use crate::storage::KeyValueStore;

/// Order created by `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

impl<T: Transport, S: KeyValueStore> ApiClient<T, S> {
    /// `POST /api/orders`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no order id.
    #[instrument(skip(self, order), fields(package_id = %order.package_id, method = %order.payment_method))]
    pub async fn place_order(&self, order: &NewOrder) -> Result<PlacedOrder, ApiError> {
        let placed: PlacedOrder = self.post("/api/orders", order).await?;
        tracing::info!(order_id = %placed.id, "Order placed");
        Ok(placed)
    }

    /// Orders scheduled for delivery on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not an order list.
    #[instrument(skip(self))]
    pub async fn orders_by_date(&self, date: NaiveDate) -> Result<Vec<OrderSummary>, ApiError> {
        self.get(format!("/api/orders/getByDate/{}", date.format("%Y-%m-%d")))
            .await
    }

    /// `GET /api/orders/:orderId/:itemId`
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id, item_id = %item_id))]
    pub async fn order_detail(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
    ) -> Result<OrderDetail, ApiError> {
        self.get(format!("/api/orders/{order_id}/{item_id}")).await
    }

    /// Move `item` to `to`, checking the workflow before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` without a request if the transition is
    /// not allowed, otherwise any error from the PATCH.
    #[instrument(skip(self, item, reason), fields(order_id = %order_id, item_id = %item.id, from = %item.status, to = %to))]
    pub async fn transition_item(
        &self,
        order_id: &OrderId,
        item: &OrderItem,
        to: OrderStatus,
        reason: Option<&str>,
    ) -> Result<StatusUpdate, ApiError> {
        let update = plan_transition(item, to, reason).map_err(ValidationError::from)?;
        let _: IgnoredAny = self
            .patch(format!("/api/orders/{order_id}/{}/status", item.id), &update)
            .await?;
        tracing::info!("Order item status updated");
        Ok(update)
    }

    /// Mark an item as out for delivery.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::transition_item`].
    pub async fn dispatch(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
    ) -> Result<StatusUpdate, ApiError> {
        self.fetch_and_transition(order_id, item_id, OrderStatus::OutForDelivery, None)
            .await
    }

    /// Mark a paid, dispatched item as delivered.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::transition_item`].
    pub async fn complete(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
    ) -> Result<StatusUpdate, ApiError> {
        self.fetch_and_transition(order_id, item_id, OrderStatus::Completed, None)
            .await
    }

    /// Mark an item as failed with a reason.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::transition_item`].
    pub async fn fail(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
        reason: &str,
    ) -> Result<StatusUpdate, ApiError> {
        self.fetch_and_transition(order_id, item_id, OrderStatus::Failed, Some(reason))
            .await
    }

    async fn fetch_and_transition(
        &self,
        order_id: &OrderId,
        item_id: &OrderItemId,
        to: OrderStatus,
        reason: Option<&str>,
    ) -> Result<StatusUpdate, ApiError> {
        let detail = self.order_detail(order_id, item_id).await?;
        self.transition_item(order_id, &detail.item, to, reason)
            .await
    }
}
