//! Integration tests for the finish-order flow.

use std::sync::Arc;

use comanda_core::{ConsumptionMethod, OrderLine, ProductId};
use comanda_integration_tests::{
    COCA_COLA, FakeOrderGateway, MCOFERTA, SLUG, TestApp, TestOptions, VALID_CPF,
};

fn product(id: &str) -> ProductId {
    id.parse().unwrap()
}

#[tokio::test]
async fn test_finish_form_renders_cart_summary() {
    let app = TestApp::spawn(TestOptions::default()).await;
    app.add_to_cart(SLUG, MCOFERTA, 2).await;

    let response = app
        .get(&format!("/{SLUG}/order/finish?consumptionMethod=TAKEAWAY"))
        .await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains("Finalizar pedido"));
    assert!(body.contains("R$ 79,80"));
    assert!(body.contains("action=\"/fsw-donalds/order/finish?consumptionMethod=TAKEAWAY\""));
}

#[tokio::test]
async fn test_submit_redirects_to_checkout() {
    let app = TestApp::spawn(TestOptions::default()).await;
    app.add_to_cart(SLUG, MCOFERTA, 2).await;
    app.add_to_cart(SLUG, COCA_COLA, 1).await;

    let response = app
        .submit_order(SLUG, Some("TAKEAWAY"), "  Ana Souza ", VALID_CPF)
        .await;

    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers()["location"],
        "https://checkout.stripe.com/c/pay/cs_test_123"
    );

    let orders = app.gateway.orders();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.name, "Ana Souza");
    assert_eq!(order.cpf, "52998224725");
    assert_eq!(order.slug, SLUG);
    assert_eq!(order.consumption_method, ConsumptionMethod::Takeaway);
    assert_eq!(
        order.products,
        vec![
            OrderLine {
                id: product(MCOFERTA),
                quantity: 2
            },
            OrderLine {
                id: product(COCA_COLA),
                quantity: 1
            },
        ]
    );

    // The cart is emptied once the order exists
    assert_eq!(app.cart_count(SLUG).await, 0);
}

#[tokio::test]
async fn test_missing_method_defaults_to_dine_in() {
    let app = TestApp::spawn(TestOptions::default()).await;
    app.add_to_cart(SLUG, MCOFERTA, 1).await;

    let response = app.submit_order(SLUG, None, "Ana", VALID_CPF).await;
    assert_eq!(response.status(), 303);
    assert_eq!(
        app.gateway.orders()[0].consumption_method,
        ConsumptionMethod::DineIn
    );
}

#[tokio::test]
async fn test_submit_without_payment_key_shows_received_page() {
    let app = TestApp::spawn(TestOptions {
        payment_public_key: None,
        ..TestOptions::default()
    })
    .await;
    app.add_to_cart(SLUG, MCOFERTA, 1).await;

    let response = app.submit_order(SLUG, None, "Ana", VALID_CPF).await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains("Pedido recebido!"));
    assert!(body.contains("cs_test_123"));
    assert_eq!(app.gateway.orders().len(), 1);
    assert_eq!(app.cart_count(SLUG).await, 0);
}

#[tokio::test]
async fn test_invalid_fields_are_reported_without_calling_api() {
    let app = TestApp::spawn(TestOptions::default()).await;
    app.add_to_cart(SLUG, MCOFERTA, 1).await;

    let response = app
        .submit_order(SLUG, None, "   ", "529.982.247-26")
        .await;
    assert_eq!(response.status(), 422);

    let body = response.text().await.unwrap();
    assert!(body.contains("O nome é obrigatório."));
    assert!(body.contains("CPF inválido."));
    // Submitted values are kept in the form
    assert!(body.contains("value=\"529.982.247-26\""));

    assert!(app.gateway.orders().is_empty());
    assert_eq!(app.cart_count(SLUG).await, 1);
}

#[tokio::test]
async fn test_blank_cpf_is_required() {
    let app = TestApp::spawn(TestOptions::default()).await;
    app.add_to_cart(SLUG, MCOFERTA, 1).await;

    let response = app.submit_order(SLUG, None, "Ana", "").await;
    assert_eq!(response.status(), 422);
    assert!(response.text().await.unwrap().contains("O CPF é obrigatório."));
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let app = TestApp::spawn(TestOptions::default()).await;

    let response = app.submit_order(SLUG, None, "Ana", VALID_CPF).await;
    assert_eq!(response.status(), 422);
    assert!(response.text().await.unwrap().contains("Seu carrinho está vazio."));
    assert!(app.gateway.orders().is_empty());
}

#[tokio::test]
async fn test_gateway_failure_keeps_cart_and_allows_retry() {
    let app = TestApp::spawn(TestOptions {
        gateway: Arc::new(FakeOrderGateway::failing()),
        ..TestOptions::default()
    })
    .await;
    app.add_to_cart(SLUG, MCOFERTA, 1).await;

    let response = app.submit_order(SLUG, None, "Ana", VALID_CPF).await;
    assert_eq!(response.status(), 502);
    let body = response.text().await.unwrap();
    assert!(body.contains("Não foi possível finalizar o pedido. Tente novamente."));
    assert!(body.contains("value=\"Ana\""));
    assert_eq!(app.cart_count(SLUG).await, 1);

    // A failed submission is not left pending
    let retry = app.submit_order(SLUG, None, "Ana", VALID_CPF).await;
    assert_eq!(retry.status(), 502);
    assert_eq!(app.gateway.orders().len(), 2);
}

#[tokio::test]
async fn test_concurrent_submission_is_refused() {
    let gateway = Arc::new(FakeOrderGateway::succeeding("cs_test_123").gated());
    let app = Arc::new(
        TestApp::spawn(TestOptions {
            gateway: Arc::clone(&gateway),
            ..TestOptions::default()
        })
        .await,
    );
    app.add_to_cart(SLUG, MCOFERTA, 1).await;

    let first = {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.submit_order(SLUG, None, "Ana", VALID_CPF).await })
    };
    gateway.wait_for_call().await;

    let second = app.submit_order(SLUG, None, "Ana", VALID_CPF).await;
    assert_eq!(second.status(), 409);

    gateway.release();
    let first = first.await.unwrap();
    assert_eq!(first.status(), 303);
    assert_eq!(gateway.orders().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_submissions_reach_the_api_once() {
    for _ in 0..20 {
        let gateway = Arc::new(FakeOrderGateway::succeeding("cs_test_123").gated());
        let app = Arc::new(
            TestApp::spawn(TestOptions {
                gateway: Arc::clone(&gateway),
                ..TestOptions::default()
            })
            .await,
        );
        app.add_to_cart(SLUG, MCOFERTA, 1).await;

        let submit = || {
            let app = Arc::clone(&app);
            tokio::spawn(async move { app.submit_order(SLUG, None, "Ana", VALID_CPF).await })
        };
        let mut first = submit();
        let mut second = submit();

        // One request is held at the gateway; the other must be refused
        gateway.wait_for_call().await;
        let (refused, first_was_refused) = tokio::select! {
            response = &mut first => (response.unwrap(), true),
            response = &mut second => (response.unwrap(), false),
        };
        assert_eq!(refused.status(), 409);

        gateway.release();
        let accepted = if first_was_refused { second } else { first };
        assert_eq!(accepted.await.unwrap().status(), 303);
        assert_eq!(gateway.orders().len(), 1);
    }
}

#[tokio::test]
async fn test_order_only_uses_that_restaurants_cart() {
    let app = TestApp::spawn(TestOptions::default()).await;
    app.add_to_cart(SLUG, MCOFERTA, 1).await;
    app.add_to_cart("pizzaria-do-ze", "c1d2e3f4-a5b6-4c7d-8e9f-0a1b2c3d4e01", 2)
        .await;

    let response = app
        .submit_order("pizzaria-do-ze", None, "Ana", VALID_CPF)
        .await;
    assert_eq!(response.status(), 303);

    let orders = app.gateway.orders();
    assert_eq!(orders[0].slug, "pizzaria-do-ze");
    assert_eq!(orders[0].products.len(), 1);
    assert_eq!(orders[0].products[0].quantity, 2);

    // The other restaurant's cart is untouched
    assert_eq!(app.cart_count(SLUG).await, 1);
    assert_eq!(app.cart_count("pizzaria-do-ze").await, 0);
}

#[tokio::test]
async fn test_submit_to_unknown_restaurant_is_404() {
    let app = TestApp::spawn(TestOptions::default()).await;
    let response = app.submit_order("no-such-place", None, "Ana", VALID_CPF).await;
    assert_eq!(response.status(), 404);
}
