use sqlx::PgPool;

use crate::{error::Result, models::Admin};

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Admin>> {
    let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE LOWER(email) = LOWER($1)")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(admin)
}

pub async fn upsert_admin(
    pool: &PgPool,
    email: &str,
    name: &str,
    password_hash: &str,
) -> Result<Admin> {
    let admin = sqlx::query_as::<_, Admin>(
        r#"
        INSERT INTO admins (email, name, password)
        VALUES (LOWER($1), $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET password = EXCLUDED.password, updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(admin)
}
