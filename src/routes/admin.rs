use axum::{
    Extension,
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        AdminSession, NewProduct, PLACEHOLDER_IMAGE, PageQuery, PageRequest, Product,
        ProductChanges, ProductForm,
    },
    utils::{
        extractors::{UploadedImage, read_product_multipart},
        flash::{Flash, FlashQuery},
        views,
    },
};

const PRODUCTS_PATH: &str = "/admin/products";

fn product_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Product {} not found", id))
}

pub async fn list_products(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Query(page): Query<PageQuery>,
    Query(flash): Query<FlashQuery>,
) -> Result<Html<String>> {
    let page = state.catalog.list(PageRequest::from(page)).await?;

    Ok(Html(views::products_page(
        &page,
        &session,
        flash.into_flash().as_ref(),
    )))
}

pub async fn add_product_form(
    Extension(session): Extension<AdminSession>,
    Query(flash): Query<FlashQuery>,
) -> Html<String> {
    Html(views::add_product_page(&session, flash.into_flash().as_ref()))
}

pub async fn edit_product_form(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<i32>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let product = state
        .catalog
        .find_by_id(id)
        .await
        .and_then(|found| found.ok_or_else(|| product_not_found(id)));

    match product {
        Ok(product) => Html(views::edit_product_page(
            &product,
            &session,
            flash.into_flash().as_ref(),
        ))
        .into_response(),
        Err(e) => {
            e.log("show product form");
            Flash::error(e.user_message())
                .redirect(PRODUCTS_PATH)
                .into_response()
        }
    }
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    multipart: Multipart,
) -> Redirect {
    let result = match read_product_multipart(multipart).await {
        Ok((form, image)) => store_new_product(&state, form, image).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(product) => {
            tracing::info!(
                admin_id = session.admin_id,
                product_id = product.id,
                "Product created"
            );
            Flash::success("Product added successfully").redirect(PRODUCTS_PATH)
        }
        Err(e) => {
            e.log("create product");
            Flash::error(e.user_message()).redirect("/admin/products/new")
        }
    }
}

async fn store_new_product(
    state: &AppState,
    form: ProductForm,
    image: Option<UploadedImage>,
) -> Result<Product> {
    let validated = form.validate()?;

    let image_ref = match image {
        Some(image) => state.images.store(&image.bytes, &image.file_name).await?,
        None => PLACEHOLDER_IMAGE.to_string(),
    };

    let created = state
        .catalog
        .create(NewProduct {
            name: validated.name,
            price: validated.price,
            image: image_ref.clone(),
        })
        .await;

    if created.is_err() {
        state.images.discard(&image_ref).await;
    }

    created
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Redirect {
    let result = match read_product_multipart(multipart).await {
        Ok((form, image)) => apply_update(&state, id, form, image).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(product) => {
            tracing::info!(
                admin_id = session.admin_id,
                product_id = product.id,
                "Product updated"
            );
            Flash::success("Product updated successfully").redirect(PRODUCTS_PATH)
        }
        Err(e @ AppError::NotFound(_)) => {
            e.log("update product");
            Flash::error(e.user_message()).redirect(PRODUCTS_PATH)
        }
        Err(e) => {
            e.log("update product");
            Flash::error(e.user_message()).redirect(&format!("{}/{}/edit", PRODUCTS_PATH, id))
        }
    }
}

/// Validates, stores any new image, then writes fields and image reference in
/// one store update. The price notification goes out only after that write.
async fn apply_update(
    state: &AppState,
    id: i32,
    form: ProductForm,
    image: Option<UploadedImage>,
) -> Result<Product> {
    let current = state
        .catalog
        .find_by_id(id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    let old_price = current.price;

    let validated = form.validate()?;

    let new_image = match image {
        Some(image) => Some(state.images.store(&image.bytes, &image.file_name).await?),
        None => None,
    };

    let changes = ProductChanges {
        name: validated.name,
        price: validated.price,
        image: new_image.clone(),
    };

    let updated = match state.catalog.update(id, changes).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            if let Some(reference) = &new_image {
                state.images.discard(reference).await;
            }
            return Err(product_not_found(id));
        }
        Err(e) => {
            if let Some(reference) = &new_image {
                state.images.discard(reference).await;
            }
            return Err(e);
        }
    };

    if new_image.is_some() && current.image != updated.image {
        state.images.discard(&current.image).await;
    }

    let outcome = state
        .notifier
        .notify_price_change(&updated, Some(old_price), Some(updated.price));
    tracing::debug!(product_id = id, ?outcome, "Price change check done");

    Ok(updated)
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<i32>,
) -> Redirect {
    let result = state
        .catalog
        .delete(id)
        .await
        .and_then(|deleted| deleted.ok_or_else(|| product_not_found(id)));

    match result {
        Ok(product) => {
            if !product.has_placeholder_image() {
                state.images.discard(&product.image).await;
            }
            tracing::info!(
                admin_id = session.admin_id,
                product_id = product.id,
                "Product deleted"
            );
            Flash::success("Product deleted successfully").redirect(PRODUCTS_PATH)
        }
        Err(e @ AppError::NotFound(_)) => {
            e.log("delete product");
            Flash::error(e.user_message()).redirect(PRODUCTS_PATH)
        }
        Err(e) => {
            e.log("delete product");
            Flash::error("Failed to delete product").redirect(PRODUCTS_PATH)
        }
    }
}
