mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use std::sync::Arc;

use async_trait::async_trait;
use catalog_admin::{
    AppError, Result,
    models::{NewProduct, PLACEHOLDER_IMAGE, Page, PageRequest, Product, ProductChanges},
    store::{CatalogStore, InMemoryStore},
};
use common::{RECIPIENT, RecordingQueue, TestApp, body_text, location, stored_uploads};
use rust_decimal::Decimal;

/// Reads from the wrapped store; every write fails.
struct FailingWrites(InMemoryStore);

fn store_down() -> AppError {
    AppError::InternalError("catalog store unavailable".to_string())
}

#[async_trait]
impl CatalogStore for FailingWrites {
    async fn find_by_id(&self, id: i32) -> Result<Option<Product>> {
        self.0.find_by_id(id).await
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Product>> {
        self.0.list(request).await
    }

    async fn create(&self, _new: NewProduct) -> Result<Product> {
        Err(store_down())
    }

    async fn update(&self, _id: i32, _changes: ProductChanges) -> Result<Option<Product>> {
        Err(store_down())
    }

    async fn delete(&self, _id: i32) -> Result<Option<Product>> {
        Err(store_down())
    }

    async fn ping(&self) -> Result<()> {
        self.0.ping().await
    }
}

async fn app_with_failing_writes() -> TestApp {
    let store = InMemoryStore::new();
    TestApp::with_catalog(store.clone(), Arc::new(FailingWrites(store))).await
}

#[tokio::test]
async fn admin_pages_require_a_session() {
    let app = TestApp::spawn().await;

    let request = Request::builder()
        .uri("/admin/products")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let forged = Request::builder()
        .uri("/admin/products")
        .header(header::COOKIE, "admin_session=not-a-token")
        .body(Body::empty())
        .unwrap();
    assert_eq!(location(&app.send(forged).await), "/login");
}

#[tokio::test]
async fn list_renders_products_with_status_banner() {
    let app = TestApp::spawn().await;
    app.seed("Desk Lamp", Decimal::new(1999, 2)).await;

    let response = app
        .get("/admin/products?page=1&status=success&message=Product+added+successfully")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Desk Lamp"));
    assert!(html.contains("19.99"));
    assert!(html.contains("Product added successfully"));
    assert!(html.contains("admin@shop.test"));
}

#[tokio::test]
async fn add_form_renders() {
    let app = TestApp::spawn().await;

    let response = app.get("/admin/products/new").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"action="/admin/products""#));
    assert!(html.contains("multipart/form-data"));
}

#[tokio::test]
async fn create_without_image_uses_placeholder() {
    let app = TestApp::spawn().await;

    let response = app
        .post_product(
            "/admin/products",
            &[("name", "Desk Lamp"), ("price", "19.99")],
            None,
        )
        .await;

    assert_eq!(
        location(&response),
        "/admin/products?status=success&message=Product+added+successfully"
    );

    let product = app.store.find_by_id(1).await.unwrap().expect("created");
    assert_eq!(product.name, "Desk Lamp");
    assert_eq!(product.price, Decimal::new(1999, 2));
    assert_eq!(product.image, PLACEHOLDER_IMAGE);
    assert!(app.queue.sent().is_empty());
}

#[tokio::test]
async fn uploads_with_same_name_do_not_overwrite() {
    let app = TestApp::spawn().await;

    for price in ["1.00", "2.00"] {
        let response = app
            .post_product(
                "/admin/products",
                &[("name", "Lamp"), ("price", price)],
                Some(("lamp.png", price.as_bytes())),
            )
            .await;
        assert!(location(&response).contains("status=success"));
    }

    let first = app.store.find_by_id(1).await.unwrap().unwrap();
    let second = app.store.find_by_id(2).await.unwrap().unwrap();

    assert_ne!(first.image, second.image);
    assert_eq!(
        std::fs::read(app.public_dir.path().join(&first.image)).unwrap(),
        b"1.00"
    );
    assert_eq!(
        std::fs::read(app.public_dir.path().join(&second.image)).unwrap(),
        b"2.00"
    );
}

#[tokio::test]
async fn stored_images_are_served_publicly() {
    let app = TestApp::spawn().await;
    app.post_product(
        "/admin/products",
        &[("name", "Lamp"), ("price", "5")],
        Some(("lamp.png", b"png-bytes")),
    )
    .await;
    let product = app.store.find_by_id(1).await.unwrap().unwrap();

    let request = Request::builder()
        .uri(format!("/{}", product.image))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "png-bytes");
}

#[tokio::test]
async fn invalid_create_is_rejected_without_mutation() {
    let app = TestApp::spawn().await;

    let response = app
        .post_product("/admin/products", &[("name", ""), ("price", "abc")], None)
        .await;

    let target = location(&response);
    assert!(target.starts_with("/admin/products/new?status=error"));
    assert!(target.contains("name+field+is+required"));

    let page = app
        .store
        .list(PageRequest::new(15, 1))
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn edit_form_is_prefilled() {
    let app = TestApp::spawn().await;
    let product = app.seed("Desk Lamp", Decimal::new(1000, 2)).await;

    let response = app
        .get(&format!("/admin/products/{}/edit", product.id))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"value="Desk Lamp""#));
    assert!(html.contains(r#"value="10.00""#));
}

#[tokio::test]
async fn edit_form_for_missing_product_redirects_with_error() {
    let app = TestApp::spawn().await;

    let response = app.get("/admin/products/99/edit").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin/products?status=error&message=Product+99+not+found"
    );
}

#[tokio::test]
async fn price_change_enqueues_exactly_one_notification() {
    let app = TestApp::spawn().await;
    let product = app.seed("Desk Lamp", Decimal::new(1000, 2)).await;

    let response = app
        .post_product(
            &format!("/admin/products/{}", product.id),
            &[("name", "Desk Lamp"), ("price", "12.50")],
            None,
        )
        .await;

    assert_eq!(
        location(&response),
        "/admin/products?status=success&message=Product+updated+successfully"
    );

    let sent = app.queue.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].product_id, product.id);
    assert_eq!(sent[0].product_name, "Desk Lamp");
    assert_eq!(sent[0].old_price, Some(Decimal::new(1000, 2)));
    assert_eq!(sent[0].new_price, Decimal::new(1250, 2));
    assert_eq!(sent[0].recipient, RECIPIENT);
}

#[tokio::test]
async fn unchanged_price_enqueues_nothing() {
    let app = TestApp::spawn().await;
    let product = app.seed("Desk Lamp", Decimal::new(1000, 2)).await;

    let response = app
        .post_product(
            &format!("/admin/products/{}", product.id),
            &[("name", "Desk Lamp XL"), ("price", "10.0")],
            None,
        )
        .await;

    assert!(location(&response).contains("status=success"));
    let updated = app.store.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(updated.name, "Desk Lamp XL");
    assert!(app.queue.sent().is_empty());
}

#[tokio::test]
async fn queue_failure_does_not_undo_the_update() {
    let app = TestApp::with_queue(RecordingQueue::closed()).await;
    let product = app.seed("Desk Lamp", Decimal::new(1000, 2)).await;

    let response = app
        .post_product(
            &format!("/admin/products/{}", product.id),
            &[("name", "Desk Lamp"), ("price", "12.50")],
            None,
        )
        .await;

    assert_eq!(
        location(&response),
        "/admin/products?status=success&message=Product+updated+successfully"
    );
    let updated = app.store.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(updated.price, Decimal::new(1250, 2));
}

#[tokio::test]
async fn rejected_image_leaves_product_untouched() {
    let app = TestApp::spawn().await;
    let product = app.seed("Desk Lamp", Decimal::new(1000, 2)).await;

    let response = app
        .post_product(
            &format!("/admin/products/{}", product.id),
            &[("name", "Renamed"), ("price", "15.00")],
            Some(("payload.exe", b"MZ")),
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with(&format!(
        "/admin/products/{}/edit?status=error",
        product.id
    )));

    let unchanged = app.store.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(unchanged, product);
    assert!(app.queue.sent().is_empty());
}

#[tokio::test]
async fn replacing_image_removes_previous_upload() {
    let app = TestApp::spawn().await;
    app.post_product(
        "/admin/products",
        &[("name", "Lamp"), ("price", "5")],
        Some(("old.png", b"old")),
    )
    .await;
    let original = app.store.find_by_id(1).await.unwrap().unwrap();

    app.post_product(
        "/admin/products/1",
        &[("name", "Lamp"), ("price", "5")],
        Some(("new.png", b"new")),
    )
    .await;
    let updated = app.store.find_by_id(1).await.unwrap().unwrap();

    assert_ne!(updated.image, original.image);
    assert!(updated.image.ends_with("_new.png"));
    assert!(!app.public_dir.path().join(&original.image).exists());
    assert!(app.public_dir.path().join(&updated.image).exists());
}

#[tokio::test]
async fn updating_missing_product_reports_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .post_product(
            "/admin/products/42",
            &[("name", "Ghost"), ("price", "1.00")],
            None,
        )
        .await;

    assert_eq!(
        location(&response),
        "/admin/products?status=error&message=Product+42+not+found"
    );
    assert!(app.queue.sent().is_empty());
}

#[tokio::test]
async fn deleting_missing_product_reports_not_found() {
    let app = TestApp::spawn().await;
    let existing = app.seed("Desk Lamp", Decimal::new(1000, 2)).await;

    let response = app.post_empty("/admin/products/42/delete").await;

    assert_eq!(
        location(&response),
        "/admin/products?status=error&message=Product+42+not+found"
    );
    assert!(app.store.find_by_id(existing.id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_removes_product_and_its_image() {
    let app = TestApp::spawn().await;
    app.post_product(
        "/admin/products",
        &[("name", "Lamp"), ("price", "5")],
        Some(("lamp.png", b"img")),
    )
    .await;
    let product = app.store.find_by_id(1).await.unwrap().unwrap();
    let image_path = app.public_dir.path().join(&product.image);
    assert!(image_path.exists());

    let response = app.post_empty("/admin/products/1/delete").await;

    assert_eq!(
        location(&response),
        "/admin/products?status=success&message=Product+deleted+successfully"
    );
    assert!(app.store.find_by_id(1).await.unwrap().is_none());
    assert!(!image_path.exists());
}

#[tokio::test]
async fn failed_update_discards_new_image_and_sends_nothing() {
    let app = app_with_failing_writes().await;
    let product = app.seed("Desk Lamp", Decimal::new(1000, 2)).await;

    let response = app
        .post_product(
            &format!("/admin/products/{}", product.id),
            &[("name", "Desk Lamp"), ("price", "12.50")],
            Some(("lamp.png", b"img")),
        )
        .await;

    assert!(location(&response).starts_with(&format!(
        "/admin/products/{}/edit?status=error",
        product.id
    )));
    assert!(stored_uploads(&app.public_dir).is_empty());
    assert!(app.queue.sent().is_empty());
    assert_eq!(
        app.store.find_by_id(product.id).await.unwrap().unwrap(),
        product
    );
}

#[tokio::test]
async fn failed_create_discards_new_image() {
    let app = app_with_failing_writes().await;

    let response = app
        .post_product(
            "/admin/products",
            &[("name", "Desk Lamp"), ("price", "12.50")],
            Some(("lamp.png", b"img")),
        )
        .await;

    assert!(location(&response).starts_with("/admin/products/new?status=error"));
    assert!(stored_uploads(&app.public_dir).is_empty());
    assert_eq!(app.store.list(PageRequest::new(15, 1)).await.unwrap().total, 0);
}

#[tokio::test]
async fn malformed_page_number_shows_first_page() {
    let app = TestApp::spawn().await;
    app.seed("Desk Lamp", Decimal::new(1999, 2)).await;

    let response = app.get("/admin/products?page=abc").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Desk Lamp"));
}
