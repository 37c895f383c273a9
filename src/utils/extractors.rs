use axum::{body::Bytes, extract::Multipart};

use crate::{
    error::{AppError, Result},
    models::{AdminSession, ProductForm},
    utils::jwt::Claims,
};

pub fn session_from_claims(claims: &Claims) -> Result<AdminSession> {
    let admin_id = claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::Unauthorized("Unauthorized".to_string()))?;

    Ok(AdminSession {
        admin_id,
        email: claims.email.clone(),
    })
}

#[derive(Debug)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Splits a product form submission into its text fields and optional image.
/// An empty file input counts as no image.
pub async fn read_product_multipart(
    mut multipart: Multipart,
) -> Result<(ProductForm, Option<UploadedImage>)> {
    let mut form = ProductForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("name") => form.name = Some(field.text().await.map_err(multipart_error)?),
            Some("price") => form.price = Some(field.text().await.map_err(multipart_error)?),
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if !file_name.is_empty() || !bytes.is_empty() {
                    image = Some(UploadedImage { file_name, bytes });
                }
            }
            _ => {}
        }
    }

    Ok((form, image))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Upload(format!("Invalid form submission: {}", e.body_text()))
}
