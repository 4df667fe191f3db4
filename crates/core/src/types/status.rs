//! Status enums for orders, payment and delivery scheduling.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Delivery status of a single order item.
///
/// Wire values match the API exactly, including the spaces in
/// `"Out for Delivery"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Completed,
    Failed,
}

impl OrderStatus {
    /// Wire string for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::OutForDelivery => "Out for Delivery",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }

    /// Terminal statuses accept no further transition.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Out for Delivery" | "out_for_delivery" => Ok(Self::OutForDelivery),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    /// Online payment through the `VNPay` redirect flow. Orders are created
    /// as paid.
    #[default]
    #[serde(rename = "VNPay")]
    VnPay,
    /// Cash on delivery.
    #[serde(rename = "COD")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Whether an order placed with this method is created already paid.
    #[must_use]
    pub const fn is_prepaid(&self) -> bool {
        matches!(self, Self::VnPay)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VnPay => write!(f, "VNPay"),
            Self::CashOnDelivery => write!(f, "COD"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vnpay" => Ok(Self::VnPay),
            "cod" => Ok(Self::CashOnDelivery),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Weekly delivery schedule for a subscription package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryCombo {
    /// Monday, Wednesday, Friday.
    #[default]
    #[serde(rename = "2-4-6")]
    MonWedFri,
    /// Tuesday, Thursday, Saturday.
    #[serde(rename = "3-5-7")]
    TueThuSat,
}

impl DeliveryCombo {
    /// Weekdays on which deliveries happen.
    #[must_use]
    pub const fn weekdays(&self) -> [Weekday; 3] {
        match self {
            Self::MonWedFri => [Weekday::Mon, Weekday::Wed, Weekday::Fri],
            Self::TueThuSat => [Weekday::Tue, Weekday::Thu, Weekday::Sat],
        }
    }

    /// Whether `date` falls on one of this combo's delivery days.
    #[must_use]
    pub fn accepts(&self, date: NaiveDate) -> bool {
        self.weekdays().contains(&date.weekday())
    }
}

impl std::fmt::Display for DeliveryCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MonWedFri => write!(f, "2-4-6"),
            Self::TueThuSat => write!(f, "3-5-7"),
        }
    }
}

impl std::str::FromStr for DeliveryCombo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2-4-6" => Ok(Self::MonWedFri),
            "3-5-7" => Ok(Self::TueThuSat),
            _ => Err(format!("invalid delivery combo: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"Out for Delivery\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"Completed\"").unwrap();
        assert_eq!(parsed, OrderStatus::Completed);
        assert_eq!("Out for Delivery".parse::<OrderStatus>(), Ok(OrderStatus::OutForDelivery));
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::OutForDelivery.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("vnpay".parse::<PaymentMethod>(), Ok(PaymentMethod::VnPay));
        assert_eq!("COD".parse::<PaymentMethod>(), Ok(PaymentMethod::CashOnDelivery));
        assert_eq!(
            serde_json::to_string(&PaymentMethod::VnPay).unwrap(),
            "\"VNPay\""
        );
        assert!(PaymentMethod::VnPay.is_prepaid());
        assert!(!PaymentMethod::CashOnDelivery.is_prepaid());
    }

    #[test]
    fn test_delivery_combo_accepts_matching_weekdays() {
        // 2024-07-01 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2024, 7, 2).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 7, 7).unwrap();

        assert!(DeliveryCombo::MonWedFri.accepts(monday));
        assert!(!DeliveryCombo::MonWedFri.accepts(tuesday));
        assert!(DeliveryCombo::TueThuSat.accepts(tuesday));
        assert!(!DeliveryCombo::TueThuSat.accepts(sunday));
        assert!(!DeliveryCombo::MonWedFri.accepts(sunday));
    }
}
