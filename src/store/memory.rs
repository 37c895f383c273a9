use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    error::{AppError, Result},
    models::{Admin, NewProduct, Page, PageRequest, Product, ProductChanges},
};

use super::{AdminDirectory, CatalogStore};

#[derive(Default)]
struct Tables {
    products: BTreeMap<i32, Product>,
    admins: Vec<Admin>,
    next_product_id: i32,
    next_admin_id: i32,
}

/// Process-local store with the same semantics as the PostgreSQL adapter.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AppError::InternalError("in-memory store poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AppError::InternalError("in-memory store poisoned".to_string()))
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Product>> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Product>> {
        let tables = self.read()?;

        let mut products: Vec<&Product> = tables.products.values().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = products.len() as i64;
        let items = products
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.per_page as usize)
            .cloned()
            .collect();

        Ok(Page::new(items, total, request))
    }

    async fn create(&self, new: NewProduct) -> Result<Product> {
        let mut tables = self.write()?;
        tables.next_product_id += 1;

        let now = Utc::now();
        let product = Product {
            id: tables.next_product_id,
            name: new.name,
            price: new.price,
            image: new.image,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(product.id, product.clone());

        Ok(product)
    }

    async fn update(&self, id: i32, changes: ProductChanges) -> Result<Option<Product>> {
        let mut tables = self.write()?;

        let Some(product) = tables.products.get_mut(&id) else {
            return Ok(None);
        };

        product.name = changes.name;
        product.price = changes.price;
        if let Some(image) = changes.image {
            product.image = image;
        }
        product.updated_at = Utc::now();

        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: i32) -> Result<Option<Product>> {
        Ok(self.write()?.products.remove(&id))
    }

    async fn ping(&self) -> Result<()> {
        self.read().map(|_| ())
    }
}

#[async_trait]
impl AdminDirectory for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>> {
        Ok(self
            .read()?
            .admins
            .iter()
            .find(|admin| admin.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn upsert(&self, email: &str, name: &str, password_hash: &str) -> Result<Admin> {
        let mut tables = self.write()?;
        let now = Utc::now();

        if let Some(admin) = tables
            .admins
            .iter_mut()
            .find(|admin| admin.email.eq_ignore_ascii_case(email))
        {
            admin.password = password_hash.to_string();
            admin.updated_at = now;
            return Ok(admin.clone());
        }

        tables.next_admin_id += 1;
        let admin = Admin {
            id: tables.next_admin_id,
            email: email.to_lowercase(),
            name: name.to_string(),
            password: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.admins.push(admin.clone());

        Ok(admin)
    }
}
