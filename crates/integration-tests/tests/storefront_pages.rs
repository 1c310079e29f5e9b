//! Integration tests for page rendering, cart operations, and middleware.

use comanda_integration_tests::{COCA_COLA, MCOFERTA, SLUG, TestApp, TestOptions};

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn(TestOptions::default()).await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");

    // Bundled menus are loaded, so the app is ready
    assert_eq!(app.get("/health/ready").await.status(), 200);
}

#[tokio::test]
async fn test_home_lists_restaurants() {
    let app = TestApp::spawn(TestOptions::default()).await;

    let body = app.get("/").await.text().await.unwrap();
    assert!(body.contains("FSW Donalds"));
    assert!(body.contains("href=\"/fsw-donalds\""));
}

#[tokio::test]
async fn test_restaurant_landing_offers_both_methods() {
    let app = TestApp::spawn(TestOptions::default()).await;

    let response = app.get(&format!("/{SLUG}")).await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("consumptionMethod=DINE_IN"));
    assert!(body.contains("consumptionMethod=TAKEAWAY"));
    assert!(body.contains("Para levar"));
}

#[tokio::test]
async fn test_menu_groups_by_category() {
    let app = TestApp::spawn(TestOptions::default()).await;

    let body = app
        .get(&format!("/{SLUG}/menu?consumptionMethod=TAKEAWAY"))
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Combos"));
    assert!(body.contains("Bebidas"));
    assert!(body.contains("R$ 39,90"));
    assert!(body.contains("Para levar"));
}

#[tokio::test]
async fn test_product_page() {
    let app = TestApp::spawn(TestOptions::default()).await;

    let response = app.get(&format!("/{SLUG}/menu/{MCOFERTA}")).await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("McOferta Média Big Mac Duplo"));
    assert!(body.contains("Ingredientes"));
    assert!(body.contains(&format!("value=\"{MCOFERTA}\"")));
}

#[tokio::test]
async fn test_unknown_restaurant_and_product_are_404() {
    let app = TestApp::spawn(TestOptions::default()).await;

    assert_eq!(app.get("/no-such-place").await.status(), 404);
    assert_eq!(app.get("/no-such-place/menu").await.status(), 404);
    assert_eq!(
        app.get(&format!("/{SLUG}/menu/not-a-uuid")).await.status(),
        404
    );
    assert_eq!(
        app.get(&format!("/{SLUG}/menu/00000000-0000-4000-8000-000000000000"))
            .await
            .status(),
        404
    );
}

#[tokio::test]
async fn test_product_search() {
    let app = TestApp::spawn(TestOptions::default()).await;

    let body = app.get("/products?q=coca").await.text().await.unwrap();
    assert!(body.contains("Coca-Cola"));
    assert!(!body.contains("Big Mac"));

    let body = app.get("/products?q=zzzz").await.text().await.unwrap();
    assert!(body.contains("Nenhum produto encontrado."));
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_add_to_cart_merges_quantities() {
    let app = TestApp::spawn(TestOptions::default()).await;

    assert_eq!(app.add_to_cart(SLUG, MCOFERTA, 2).await, 2);
    assert_eq!(app.add_to_cart(SLUG, MCOFERTA, 3).await, 5);
    assert_eq!(app.add_to_cart(SLUG, COCA_COLA, 1).await, 6);

    let body = app.get(&format!("/{SLUG}/cart")).await.text().await.unwrap();
    // One merged line for the McOferta, in first-added position
    assert_eq!(body.matches("McOferta Média Big Mac Duplo").count(), 1);
    assert!(body.contains("5x"));
    let mcoferta = body.find("McOferta Média Big Mac Duplo").unwrap();
    let coca = body.find("Coca-Cola").unwrap();
    assert!(mcoferta < coca);
    // 5 x 39,90 + 5,90
    assert!(body.contains("R$ 205,40"));
}

#[tokio::test]
async fn test_add_to_cart_htmx_trigger() {
    let app = TestApp::spawn(TestOptions::default()).await;

    let response = app
        .client
        .post(app.url(&format!("/{SLUG}/cart/add")))
        .header("HX-Request", "true")
        .form(&[("product_id", MCOFERTA)])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["hx-trigger"], "cart-updated");
    assert!(response.text().await.unwrap().contains("id=\"cart-count\""));
}

#[tokio::test]
async fn test_add_to_cart_without_htmx_redirects_to_menu() {
    let app = TestApp::spawn(TestOptions::default()).await;

    let response = app
        .post_form(
            &format!("/{SLUG}/cart/add"),
            &[
                ("product_id", MCOFERTA),
                ("quantity", "2"),
                ("consumptionMethod", "TAKEAWAY"),
            ],
        )
        .await;

    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers()["location"],
        "/fsw-donalds/menu?consumptionMethod=TAKEAWAY"
    );
    assert_eq!(app.cart_count(SLUG).await, 2);
}

#[tokio::test]
async fn test_add_to_cart_rejects_bad_input() {
    let app = TestApp::spawn(TestOptions::default()).await;
    let path = format!("/{SLUG}/cart/add");

    let zero = app
        .post_form(&path, &[("product_id", MCOFERTA), ("quantity", "0")])
        .await;
    assert_eq!(zero.status(), 400);

    let garbage = app.post_form(&path, &[("product_id", "nope")]).await;
    assert_eq!(garbage.status(), 400);

    let unknown = app
        .post_form(
            &path,
            &[("product_id", "00000000-0000-4000-8000-000000000000")],
        )
        .await;
    assert_eq!(unknown.status(), 404);

    assert_eq!(app.cart_count(SLUG).await, 0);
}

#[tokio::test]
async fn test_carts_are_per_restaurant_and_per_session() {
    let app = TestApp::spawn(TestOptions::default()).await;

    app.add_to_cart(SLUG, MCOFERTA, 2).await;
    assert_eq!(app.cart_count("pizzaria-do-ze").await, 0);

    // A different browser has its own session
    let other = TestApp::new_client();
    let body = other
        .get(app.url(&format!("/{SLUG}/cart/count")))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(comanda_integration_tests::badge_count(&body), 0);
    assert_eq!(app.cart_count(SLUG).await, 2);
}

#[tokio::test]
async fn test_toggle_cart_sheet() {
    let app = TestApp::spawn(TestOptions::default()).await;
    app.add_to_cart(SLUG, MCOFERTA, 1).await;

    let menu = app.get(&format!("/{SLUG}/menu")).await.text().await.unwrap();
    assert!(menu.contains("Ver sacola (1)"));
    assert!(!menu.contains("Finalizar pedido"));

    let opened = app
        .client
        .post(app.url(&format!("/{SLUG}/cart/toggle")))
        .header("HX-Request", "true")
        .form(&[("consumptionMethod", "DINE_IN")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(opened.contains("cart-sheet open"));
    assert!(opened.contains("Fechar sacola"));
    assert!(opened.contains("Finalizar pedido"));

    let closed = app
        .post_form(&format!("/{SLUG}/cart/toggle"), &[])
        .await;
    assert_eq!(closed.status(), 303);

    let menu = app.get(&format!("/{SLUG}/menu")).await.text().await.unwrap();
    assert!(menu.contains("Ver sacola (1)"));
}

// =============================================================================
// Middleware
// =============================================================================

#[tokio::test]
async fn test_security_headers_and_nonce() {
    let app = TestApp::spawn(TestOptions::default()).await;

    let response = app.get(&format!("/{SLUG}/order/finish")).await;
    assert_eq!(response.status(), 200);

    let headers = response.headers().clone();
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers.contains_key("x-request-id"));

    let csp = headers["content-security-policy"].to_str().unwrap().to_string();
    assert!(csp.contains("form-action 'self' https://checkout.stripe.com"));

    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .unwrap()
        .to_string();
    // Compare the alphanumeric prefix; the template escapes some base64 symbols
    let prefix: String = nonce.chars().take_while(char::is_ascii_alphanumeric).collect();
    let body = response.text().await.unwrap();
    assert!(body.contains(&format!("<script nonce=\"{prefix}")));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::spawn(TestOptions::default()).await;

    let response = app
        .client
        .get(app.url("/health"))
        .header("x-request-id", "edge-abc123")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "edge-abc123");
}
