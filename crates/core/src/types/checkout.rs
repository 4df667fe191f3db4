//! Checkout form and the `POST /api/orders` body it produces.

use chrono::NaiveDate;
use serde::Serialize;

use super::address::SavedAddress;
use super::id::{PackageId, UserId};
use super::order::format_api_date;
use super::status::{DeliveryCombo, PaymentMethod};
use super::validation::ValidationError;

/// Raw checkout input, as typed by the customer.
#[derive(Debug, Clone, Default)]
pub struct OrderForm {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub payment_method: PaymentMethod,
    pub delivery_combo: DeliveryCombo,
    pub start_date: Option<NaiveDate>,
    pub number_of_shipment: String,
}

impl OrderForm {
    /// Pre-fill the address fields from a saved address.
    pub fn use_address(&mut self, saved: &SavedAddress) {
        self.full_name.clone_from(&saved.full_name);
        self.phone.clone_from(&saved.phone);
        self.address.clone_from(&saved.address);
        self.city.clone_from(&saved.city);
        self.country.clone_from(&saved.country);
    }

    /// Validate the form and build the order body.
    ///
    /// `today` stamps `paidAt` for prepaid orders.
    ///
    /// # Errors
    ///
    /// - `MissingField` for any blank field or a missing start date
    /// - `DeliveryDayMismatch` if the start date is not a combo day
    /// - `InvalidShipmentCount` if the shipment count is not a positive integer
    pub fn validate(
        &self,
        package: &PackageId,
        user: &UserId,
        today: NaiveDate,
    ) -> Result<NewOrder, ValidationError> {
        let shipping_address = SavedAddress::new(
            &self.full_name,
            &self.phone,
            &self.address,
            &self.city,
            &self.country,
        )?;
        let start = self
            .start_date
            .ok_or(ValidationError::MissingField("start delivery date"))?;
        let shipments_raw = self.number_of_shipment.trim();
        if shipments_raw.is_empty() {
            return Err(ValidationError::MissingField("number of shipments"));
        }

        if !self.delivery_combo.accepts(start) {
            return Err(ValidationError::DeliveryDayMismatch {
                combo: self.delivery_combo,
                date: start,
            });
        }

        let number_of_shipment = shipments_raw
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ValidationError::InvalidShipmentCount(shipments_raw.to_owned()))?;

        let is_paid = self.payment_method.is_prepaid();
        Ok(NewOrder {
            package_id: package.clone(),
            shipping_address,
            payment_method: self.payment_method,
            user_id: user.clone(),
            is_paid,
            paid_at: is_paid.then(|| format_api_date(today)),
            delivered_at: format_api_date(start),
            number_of_shipment,
            delivery_combo: self.delivery_combo,
        })
    }
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(rename = "packageID")]
    pub package_id: PackageId,
    pub shipping_address: SavedAddress,
    pub payment_method: PaymentMethod,
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub is_paid: bool,
    pub paid_at: Option<String>,
    pub delivered_at: String,
    pub number_of_shipment: u32,
    /// Checked against the start date; not part of the order body.
    #[serde(skip)]
    pub delivery_combo: DeliveryCombo,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> OrderForm {
        OrderForm {
            full_name: "Lan Nguyen".to_owned(),
            phone: "0901234567".to_owned(),
            address: "12 Hang Bai".to_owned(),
            city: "Hanoi".to_owned(),
            country: "Vietnam".to_owned(),
            payment_method: PaymentMethod::CashOnDelivery,
            delivery_combo: DeliveryCombo::MonWedFri,
            // Wednesday
            start_date: NaiveDate::from_ymd_opt(2024, 7, 3),
            number_of_shipment: "12".to_owned(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    #[test]
    fn test_valid_cod_order() {
        let order = filled_form()
            .validate(&PackageId::new("k1"), &UserId::new("u1"), today())
            .unwrap();
        assert!(!order.is_paid);
        assert_eq!(order.paid_at, None);
        assert_eq!(order.delivered_at, "03/07/2024");
        assert_eq!(order.number_of_shipment, 12);

        let body = serde_json::to_value(&order).unwrap();
        assert_eq!(body["packageID"], "k1");
        assert_eq!(body["userID"], "u1");
        assert_eq!(body["paymentMethod"], "COD");
        assert_eq!(body["shippingAddress"]["fullName"], "Lan Nguyen");
        assert_eq!(order.delivery_combo, DeliveryCombo::MonWedFri);
        assert!(body.get("deliveryCombo").is_none());
    }

    #[test]
    fn test_vnpay_order_is_prepaid() {
        let mut form = filled_form();
        form.payment_method = PaymentMethod::VnPay;
        let order = form
            .validate(&PackageId::new("k1"), &UserId::new("u1"), today())
            .unwrap();
        assert!(order.is_paid);
        assert_eq!(order.paid_at.as_deref(), Some("01/07/2024"));
    }

    #[test]
    fn test_start_date_must_match_combo() {
        let mut form = filled_form();
        form.delivery_combo = DeliveryCombo::TueThuSat;
        let err = form
            .validate(&PackageId::new("k1"), &UserId::new("u1"), today())
            .unwrap_err();
        assert!(matches!(err, ValidationError::DeliveryDayMismatch { .. }));
    }

    #[test]
    fn test_shipment_count_must_be_positive_number() {
        for bad in ["abc", "0", "-3"] {
            let mut form = filled_form();
            form.number_of_shipment = bad.to_owned();
            let err = form
                .validate(&PackageId::new("k1"), &UserId::new("u1"), today())
                .unwrap_err();
            assert_eq!(err, ValidationError::InvalidShipmentCount(bad.to_owned()));
        }
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let mut form = filled_form();
        form.start_date = None;
        assert_eq!(
            form.validate(&PackageId::new("k1"), &UserId::new("u1"), today()),
            Err(ValidationError::MissingField("start delivery date"))
        );

        let mut form = filled_form();
        form.phone = " ".to_owned();
        assert_eq!(
            form.validate(&PackageId::new("k1"), &UserId::new("u1"), today()),
            Err(ValidationError::MissingField("phone"))
        );
    }

    #[test]
    fn test_use_address_prefills_fields() {
        let mut form = OrderForm::default();
        let saved = SavedAddress::new("Minh", "0909", "5 Le Loi", "Hue", "Vietnam").unwrap();
        form.use_address(&saved);
        assert_eq!(form.city, "Hue");
        assert_eq!(form.full_name, "Minh");
    }
}
