//! Integration tests for order submission and VNPay payments.

use chrono::NaiveDate;
use milk_delivery_client::http::{Method, StatusCode};
use milk_delivery_client::{ApiError, CheckoutOutcome};
use milk_delivery_core::{
    DeliveryCombo, NewOrder, OrderForm, OrderId, OrderItem, PackageId, PaymentMethod, Price,
    UserId,
};
use milk_delivery_integration_tests::{Harness, RecordingBrowser, ScriptedTransport};
use serde_json::json;

const PAY_URL: &str = "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html?vnp_TxnRef=42";

fn order(method: PaymentMethod) -> NewOrder {
    let form = OrderForm {
        full_name: "Lan Nguyen".to_owned(),
        phone: "0901234567".to_owned(),
        address: "12 Hang Bai".to_owned(),
        city: "Hanoi".to_owned(),
        country: "Vietnam".to_owned(),
        payment_method: method,
        delivery_combo: DeliveryCombo::MonWedFri,
        // Wednesday
        start_date: NaiveDate::from_ymd_opt(2024, 7, 3),
        number_of_shipment: "12".to_owned(),
    };
    let today = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    form.validate(&PackageId::new("k1"), &UserId::new("u1"), today)
        .unwrap()
}

fn unpaid_item(price: Option<i64>) -> OrderItem {
    serde_json::from_value(json!({
        "_id": "i1",
        "status": "Out for Delivery",
        "isPaid": false,
        "price": price,
    }))
    .unwrap()
}

#[tokio::test]
async fn test_cash_on_delivery_posts_order() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/api/orders",
        StatusCode::CREATED,
        json!({"_id": "o1", "isPaid": false, "trackingNumber": "TRK-1"}),
    );
    let harness = Harness::signed_in(transport, "a1", "r1").await;
    let browser = RecordingBrowser::default();

    let outcome = harness
        .client
        .submit_order(
            &order(PaymentMethod::CashOnDelivery),
            Price::from_dong(250_000),
            &browser,
        )
        .await
        .unwrap();

    let CheckoutOutcome::Placed(placed) = outcome else {
        panic!("expected a placed order, got {outcome:?}");
    };
    assert_eq!(placed.id, OrderId::new("o1"));
    assert_eq!(placed.tracking_number.as_deref(), Some("TRK-1"));
    assert!(browser.opened().is_empty());

    let sent = &harness.transport().requests_to("/api/orders")[0];
    assert_eq!(sent.bearer.as_deref(), Some("a1"));
    let body = sent.body.as_ref().unwrap();
    assert_eq!(body["paymentMethod"], "COD");
    assert_eq!(body["isPaid"], false);
    assert_eq!(body["deliveredAt"], "03/07/2024");
    assert!(body.get("deliveryCombo").is_none());
    assert_eq!(body["shippingAddress"]["city"], "Hanoi");
}

#[tokio::test]
async fn test_vnpay_opens_payment_page_and_reads_return() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/api/payments/create_payment_url",
        StatusCode::OK,
        json!({"vnpUrl": PAY_URL}),
    );
    transport.reply(
        Method::GET,
        "/api/payments/vnpay_return",
        StatusCode::OK,
        json!({"code": "00", "message": "Success", "orderID": "o9"}),
    );
    let harness = Harness::signed_in(transport, "a1", "r1").await;
    let browser = RecordingBrowser::default();

    let outcome = harness
        .client
        .submit_order(&order(PaymentMethod::VnPay), Price::from_dong(250_000), &browser)
        .await
        .unwrap();

    let CheckoutOutcome::Paid(result) = outcome else {
        panic!("expected a paid order, got {outcome:?}");
    };
    assert_eq!(result.order_id, Some(OrderId::new("o9")));
    assert_eq!(browser.opened().len(), 1);
    assert_eq!(browser.opened()[0].as_str(), PAY_URL);

    // The API creates prepaid orders itself once VNPay reports back.
    assert_eq!(harness.transport().calls("/api/orders"), 0);

    let sent = &harness.transport().requests_to("/api/payments/create_payment_url")[0];
    let body = sent.body.as_ref().unwrap();
    assert_eq!(body["amount"], json!(250_000.0));
    assert_eq!(body["packageID"], "k1");
    assert_eq!(body["isPaid"], true);
    assert_eq!(body["paidAt"], "01/07/2024");
}

#[tokio::test]
async fn test_declined_vnpay_payment_is_an_error() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/api/payments/create_payment_url",
        StatusCode::OK,
        json!({"vnpUrl": PAY_URL}),
    );
    transport.reply(
        Method::GET,
        "/api/payments/vnpay_return",
        StatusCode::OK,
        json!({"vnp_ResponseCode": "24"}),
    );
    let harness = Harness::signed_in(transport, "a1", "r1").await;

    let err = harness
        .client
        .submit_order(
            &order(PaymentMethod::VnPay),
            Price::from_dong(250_000),
            &RecordingBrowser::default(),
        )
        .await
        .unwrap_err();

    match err {
        ApiError::Payment(reason) => assert_eq!(reason, "VNPay response code 24"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_payment_url_stops_before_browser() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/api/payments/create_payment_url",
        StatusCode::OK,
        json!({}),
    );
    let harness = Harness::signed_in(transport, "a1", "r1").await;
    let browser = RecordingBrowser::default();

    let err = harness
        .client
        .submit_order(&order(PaymentMethod::VnPay), Price::from_dong(250_000), &browser)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Payment(_)));
    assert!(browser.opened().is_empty());
    assert_eq!(harness.transport().calls("/api/payments/vnpay_return"), 0);
}

#[tokio::test]
async fn test_collect_payment_uses_tracking_endpoints() {
    let transport = ScriptedTransport::new();
    transport.reply(
        Method::POST,
        "/api/payments/create_payment_order_tracking_url",
        StatusCode::OK,
        json!({"vnpUrl": PAY_URL}),
    );
    transport.reply(
        Method::GET,
        "/api/payments/vnpay_return_order_tracking",
        StatusCode::OK,
        json!({"success": true, "message": "Paid"}),
    );
    let harness = Harness::signed_in(transport, "a1", "r1").await;
    let browser = RecordingBrowser::default();

    let result = harness
        .client
        .collect_payment(&OrderId::new("o1"), &unpaid_item(Some(180_000)), &browser)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(browser.opened().len(), 1);
    let sent =
        &harness.transport().requests_to("/api/payments/create_payment_order_tracking_url")[0];
    assert_eq!(
        sent.body,
        Some(json!({"orderId": "o1", "itemId": "i1", "amount": 180_000.0}))
    );
}

#[tokio::test]
async fn test_collect_payment_rejects_paid_or_unpriced_items() {
    let harness = Harness::signed_in(ScriptedTransport::new(), "a1", "r1").await;
    let browser = RecordingBrowser::default();

    let mut paid = unpaid_item(Some(180_000));
    paid.is_paid = true;
    let err = harness
        .client
        .collect_payment(&OrderId::new("o1"), &paid, &browser)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Payment(_)));

    let err = harness
        .client
        .collect_payment(&OrderId::new("o1"), &unpaid_item(None), &browser)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Payment(_)));

    assert!(harness.transport().requests().is_empty());
    assert!(browser.opened().is_empty());
}
