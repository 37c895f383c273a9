//! Persistence seams used by the admin handlers.
//!
//! Handlers only see [`CatalogStore`] and [`AdminDirectory`]; [`PgStore`] backs
//! both in production and [`InMemoryStore`] backs tests and local runs.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{Admin, NewProduct, Page, PageRequest, Product, ProductChanges},
};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Product>>;

    /// Newest products first.
    async fn list(&self, request: PageRequest) -> Result<Page<Product>>;

    async fn create(&self, new: NewProduct) -> Result<Product>;

    /// Applies all changes in one write. `None` means the product does not exist.
    async fn update(&self, id: i32, changes: ProductChanges) -> Result<Option<Product>>;

    /// Returns the removed product, or `None` when nothing matched.
    async fn delete(&self, id: i32) -> Result<Option<Product>>;

    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait AdminDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>>;

    async fn upsert(&self, email: &str, name: &str, password_hash: &str) -> Result<Admin>;
}
