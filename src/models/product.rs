use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Image reference stored when a product is created without an upload.
pub const PLACEHOLDER_IMAGE: &str = "product-placeholder.jpg";

const MAX_NAME_LENGTH: usize = 255;

/// Largest value a `NUMERIC(12,2)` column holds.
fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn has_placeholder_image(&self) -> bool {
        self.image == PLACEHOLDER_IMAGE
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub image: String,
}

/// Field changes applied by one update. `image` is `None` when no file was uploaded.
#[derive(Debug, Clone)]
pub struct ProductChanges {
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
}

/// Raw text fields of the add/edit product forms.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductForm {
    pub name: Option<String>,
    pub price: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProduct {
    pub name: String,
    pub price: Decimal,
}

impl ProductForm {
    pub fn validate(&self) -> Result<ValidatedProduct> {
        let mut errors = Vec::new();

        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            errors.push("The name field is required.".to_string());
        } else if name.chars().count() > MAX_NAME_LENGTH {
            errors.push(format!(
                "The name may not be greater than {} characters.",
                MAX_NAME_LENGTH
            ));
        }

        let raw_price = self.price.as_deref().map(str::trim).unwrap_or_default();
        let mut price = Decimal::ZERO;
        if raw_price.is_empty() {
            errors.push("The price field is required.".to_string());
        } else {
            match Decimal::from_str(raw_price) {
                Ok(parsed) if parsed.is_sign_negative() && !parsed.is_zero() => {
                    errors.push("The price must be at least 0.".to_string());
                }
                Ok(parsed) if parsed.normalize().scale() > 2 => {
                    errors.push("The price may not have more than 2 decimal places.".to_string());
                }
                Ok(parsed) if parsed > max_price() => {
                    errors.push("The price is too large.".to_string());
                }
                Ok(parsed) => price = parsed.round_dp(2),
                Err(_) => errors.push("The price must be a number.".to_string()),
            }
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(ValidatedProduct {
            name: name.to_string(),
            price,
        })
    }
}
