use sqlx::PgPool;

use crate::{
    error::Result,
    models::{NewProduct, Page, PageRequest, Product, ProductChanges},
};

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn list_products(pool: &PgPool, request: PageRequest) -> Result<Page<Product>> {
    #[derive(sqlx::FromRow)]
    struct ListRow {
        #[sqlx(flatten)]
        product: Product,
        total_count: i64,
    }

    let rows = sqlx::query_as::<_, ListRow>(
        r#"
        SELECT *, COUNT(*) OVER() AS total_count
        FROM products
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(request.per_page)
    .bind(request.offset())
    .fetch_all(pool)
    .await?;

    // Past the last page the window count is unavailable.
    let total = match rows.first() {
        Some(row) => row.total_count,
        None => count_products(pool).await?,
    };
    let products = rows.into_iter().map(|r| r.product).collect();

    Ok(Page::new(products, total, request))
}

async fn count_products(pool: &PgPool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub async fn create_product(pool: &PgPool, new: &NewProduct) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, price, image)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&new.name)
    .bind(new.price)
    .bind(&new.image)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn update_product(
    pool: &PgPool,
    id: i32,
    changes: &ProductChanges,
) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET
            name = $1,
            price = $2,
            image = COALESCE($3, image),
            updated_at = NOW()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(&changes.name)
    .bind(changes.price)
    .bind(&changes.image)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

pub async fn delete_product(pool: &PgPool, id: i32) -> Result<Option<Product>> {
    let deleted = sqlx::query_as::<_, Product>("DELETE FROM products WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(deleted)
}
