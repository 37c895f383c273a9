use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    database,
    error::Result,
    models::{Admin, NewProduct, Page, PageRequest, Product, ProductChanges},
    queries::{admin_queries, product_queries},
};

use super::{AdminDirectory, CatalogStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Product>> {
        product_queries::find_by_id(&self.pool, id).await
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Product>> {
        product_queries::list_products(&self.pool, request).await
    }

    async fn create(&self, new: NewProduct) -> Result<Product> {
        product_queries::create_product(&self.pool, &new).await
    }

    async fn update(&self, id: i32, changes: ProductChanges) -> Result<Option<Product>> {
        product_queries::update_product(&self.pool, id, &changes).await
    }

    async fn delete(&self, id: i32) -> Result<Option<Product>> {
        product_queries::delete_product(&self.pool, id).await
    }

    async fn ping(&self) -> Result<()> {
        database::ping(&self.pool).await
    }
}

#[async_trait]
impl AdminDirectory for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>> {
        admin_queries::find_by_email(&self.pool, email).await
    }

    async fn upsert(&self, email: &str, name: &str, password_hash: &str) -> Result<Admin> {
        admin_queries::upsert_admin(&self.pool, email, name, password_hash).await
    }
}
