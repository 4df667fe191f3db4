//! Orders, order items and the delivery status workflow.
//!
//! Status changes are driven by explicit staff actions. The allowed graph:
//!
//! ```text
//! Pending ──dispatch──▶ Out for Delivery ──complete──▶ Completed
//!    │                        │
//!    └────────fail────────────┴──────────▶ Failed
//! ```
//!
//! `Completed` and `Failed` are terminal. Completing requires the item to be
//! paid. Failing requires a non-blank reason.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::address::SavedAddress;
use super::catalog::Package;
use super::id::{OrderId, OrderItemId};
use super::price::Price;
use super::status::OrderStatus;

/// Why a status change was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The item is already `Completed` or `Failed`.
    #[error("order item is already {0}")]
    Terminal(OrderStatus),

    /// The requested status equals the current one.
    #[error("order item is already {0}")]
    Unchanged(OrderStatus),

    /// The graph has no edge between the two statuses.
    #[error("cannot move order item from {from} to {to}")]
    NotAllowed {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// Completion requested before payment was collected.
    #[error("order item must be paid before it can be completed")]
    Unpaid,

    /// Failure requested without a reason.
    #[error("a reason is required to mark an order item as failed")]
    MissingReason,
}

/// A validated status change ready to be sent as
/// `PATCH /api/orders/:orderId/:itemId/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub reason: Option<String>,
}

/// Check a requested status change against the workflow graph.
///
/// # Errors
///
/// Returns a [`TransitionError`] describing why the change is not allowed.
pub fn plan_transition(
    item: &OrderItem,
    to: OrderStatus,
    reason: Option<&str>,
) -> Result<StatusUpdate, TransitionError> {
    let from = item.status;

    if from.is_terminal() {
        return Err(TransitionError::Terminal(from));
    }
    if from == to {
        return Err(TransitionError::Unchanged(from));
    }

    match (from, to) {
        (OrderStatus::Pending, OrderStatus::OutForDelivery) => Ok(StatusUpdate {
            status: to,
            reason: None,
        }),
        (OrderStatus::OutForDelivery, OrderStatus::Completed) => {
            if item.is_paid {
                Ok(StatusUpdate {
                    status: to,
                    reason: None,
                })
            } else {
                Err(TransitionError::Unpaid)
            }
        }
        (_, OrderStatus::Failed) => {
            let reason = reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or(TransitionError::MissingReason)?;
            Ok(StatusUpdate {
                status: to,
                reason: Some(reason.to_owned()),
            })
        }
        _ => Err(TransitionError::NotAllowed { from, to }),
    }
}

/// One deliverable item of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: OrderItemId,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub is_delivered: bool,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub delivered_at: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub status: OrderStatus,
}

impl OrderItem {
    /// The delivery date, when the server sent one in a format we know.
    #[must_use]
    pub fn delivery_date(&self) -> Option<NaiveDate> {
        self.delivered_at.as_deref().and_then(parse_api_date)
    }
}

/// Response of `GET /api/orders/:orderId/:itemId`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order_id: OrderId,
    pub package: Package,
    pub shipping_address: SavedAddress,
    pub item: OrderItem,
}

/// The order part of a day listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHeader {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub is_delivered: bool,
    #[serde(default)]
    pub delivered_at: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub status: OrderStatus,
}

/// One entry of `GET /api/orders/getByDate/:date`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub package: Package,
    pub shipping_address: SavedAddress,
    pub order: OrderHeader,
}

/// Date format used by the API for delivery and payment dates.
pub const API_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format a date the way the API expects (`dd/mm/yyyy`).
#[must_use]
pub fn format_api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

/// Parse an API date, accepting `dd/mm/yyyy` or ISO-8601 (date or datetime).
#[must_use]
pub fn parse_api_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, API_DATE_FORMAT)
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value.get(..10)?, "%Y-%m-%d").ok())
}
