#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use catalog_admin::{
    AppState,
    app::{self, SessionSettings},
    config::UploadConfig,
    models::{NewProduct, PriceChangeNotification, Product},
    services::{ImageUploader, NotificationQueue, PriceChangeNotifier, QueueError},
    store::{AdminDirectory, CatalogStore, InMemoryStore},
    utils::jwt,
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use tempfile::TempDir;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret";
pub const RECIPIENT: &str = "pricing@shop.test";
const BOUNDARY: &str = "catalog-admin-test-boundary";

/// Records enqueued notifications, or refuses them when `closed` is set.
#[derive(Default)]
pub struct RecordingQueue {
    pub messages: Mutex<Vec<PriceChangeNotification>>,
    pub closed: bool,
}

impl RecordingQueue {
    pub fn closed() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            closed: true,
        }
    }

    pub fn sent(&self) -> Vec<PriceChangeNotification> {
        self.messages.lock().unwrap().clone()
    }
}

impl NotificationQueue for RecordingQueue {
    fn enqueue(&self, message: PriceChangeNotification) -> Result<(), QueueError> {
        if self.closed {
            return Err(QueueError::Closed);
        }
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
    pub queue: Arc<RecordingQueue>,
    pub public_dir: TempDir,
    pub cookie: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::with_queue(RecordingQueue::default()).await
    }

    pub async fn with_queue(queue: RecordingQueue) -> Self {
        let store = InMemoryStore::new();
        Self::assemble(queue, store.clone(), Arc::new(store)).await
    }

    /// Serves the catalog from `catalog` while `store` stays available for seeding
    /// and assertions.
    pub async fn with_catalog(store: InMemoryStore, catalog: Arc<dyn CatalogStore>) -> Self {
        Self::assemble(RecordingQueue::default(), store, catalog).await
    }

    async fn assemble(
        queue: RecordingQueue,
        store: InMemoryStore,
        catalog: Arc<dyn CatalogStore>,
    ) -> Self {
        let public_dir = TempDir::new().expect("temp dir");
        let queue = Arc::new(queue);

        let hash = bcrypt::hash("secret", 4).expect("hash");
        let admin = store
            .upsert("admin@shop.test", "admin", &hash)
            .await
            .expect("admin");

        let state = AppState {
            catalog,
            admins: Arc::new(store.clone()),
            images: ImageUploader::new(&UploadConfig {
                public_dir: public_dir.path().to_path_buf(),
                max_image_size: 64 * 1024,
            }),
            notifier: PriceChangeNotifier::new(queue.clone(), RECIPIENT),
            sessions: SessionSettings {
                jwt_secret: JWT_SECRET.to_string(),
                ttl_hours: 1,
            },
        };

        let token = jwt::generate_token(admin.id, &admin.email, JWT_SECRET, 1).expect("token");

        Self {
            router: app::router(state, 10 * 1024 * 1024),
            store,
            queue,
            public_dir,
            cookie: format!("admin_session={}", token),
        }
    }

    pub async fn seed(&self, name: &str, price: Decimal) -> Product {
        self.store
            .create(NewProduct {
                name: name.to_string(),
                price,
                image: "product-placeholder.jpg".to_string(),
            })
            .await
            .expect("seed product")
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(uri)
            .header(header::COOKIE, &self.cookie)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_empty(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, &self.cookie)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_product(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, &self.cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields, image)))
            .unwrap();
        self.send(request).await
    }
}

pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Files currently stored under `<public_dir>/uploads`.
pub fn stored_uploads(public_dir: &TempDir) -> Vec<String> {
    match std::fs::read_dir(public_dir.path().join("uploads")) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect location")
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
