//! Server-rendered admin pages.
//!
//! Templates live in `src/templates` and use `{{key}}` placeholders that are
//! filled in a single pass, so substituted values are never re-scanned.

use chrono::{DateTime, Utc};

use crate::{
    models::{AdminSession, Page, Product},
    utils::flash::{Flash, FlashStatus},
};

const LAYOUT: &str = include_str!("../templates/layout.html");
const LOGIN: &str = include_str!("../templates/login.html");
const PRODUCTS: &str = include_str!("../templates/products.html");
const PRODUCT_ROW: &str = include_str!("../templates/product_row.html");
const PRODUCT_FORM: &str = include_str!("../templates/product_form.html");

/// Replaces every `{{key}}` with its value; unknown keys are left as is.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

fn escape(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

fn render_flash(flash: Option<&Flash>) -> String {
    match flash {
        Some(flash) => {
            let class = match flash.status {
                FlashStatus::Success => "flash flash-success",
                FlashStatus::Error => "flash flash-error",
            };
            format!(
                r#"<div class="{}" role="status">{}</div>"#,
                class,
                escape(&flash.message)
            )
        }
        None => String::new(),
    }
}

fn render_nav(session: Option<&AdminSession>) -> String {
    match session {
        Some(session) => format!(
            r#"{} <form method="post" action="/logout"><button type="submit">Log out</button></form>"#,
            escape(&session.email)
        ),
        None => String::new(),
    }
}

fn layout(
    title: &str,
    session: Option<&AdminSession>,
    flash: Option<&Flash>,
    content: &str,
) -> String {
    fill(
        LAYOUT,
        &[
            ("title", escape(title).as_str()),
            ("nav", render_nav(session).as_str()),
            ("flash", render_flash(flash).as_str()),
            ("content", content),
        ],
    )
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn login_page(flash: Option<&Flash>) -> String {
    layout("Sign in", None, flash, LOGIN)
}

pub fn products_page(
    page: &Page<Product>,
    session: &AdminSession,
    flash: Option<&Flash>,
) -> String {
    let rows: String = if page.items.is_empty() {
        r#"<tr><td colspan="6">No products yet.</td></tr>"#.to_string()
    } else {
        page.items
            .iter()
            .map(|product| {
                fill(
                    PRODUCT_ROW,
                    &[
                        ("id", product.id.to_string().as_str()),
                        ("image", escape(&product.image).as_str()),
                        ("name", escape(&product.name).as_str()),
                        ("price", format!("{:.2}", product.price).as_str()),
                        ("updated_at", format_timestamp(product.updated_at).as_str()),
                    ],
                )
            })
            .collect()
    };

    let mut pagination = Vec::new();
    if page.has_previous() {
        pagination.push(format!(
            r#"<a href="/admin/products?page={}">&laquo; Previous</a>"#,
            page.page - 1
        ));
    }
    pagination.push(format!(
        "<span>Page {} of {} ({} products)</span>",
        page.page, page.last_page, page.total
    ));
    if page.has_next() {
        pagination.push(format!(
            r#"<a href="/admin/products?page={}">Next &raquo;</a>"#,
            page.page + 1
        ));
    }

    let content = fill(
        PRODUCTS,
        &[("rows", rows.as_str()), ("pagination", pagination.join(" ").as_str())],
    );

    layout("Products", Some(session), flash, &content)
}

pub fn add_product_page(session: &AdminSession, flash: Option<&Flash>) -> String {
    let content = fill(
        PRODUCT_FORM,
        &[
            ("heading", "Add product"),
            ("action", "/admin/products"),
            ("name", ""),
            ("price", ""),
            ("current_image", ""),
            ("submit", "Create"),
        ],
    );

    layout("Add product", Some(session), flash, &content)
}

pub fn edit_product_page(
    product: &Product,
    session: &AdminSession,
    flash: Option<&Flash>,
) -> String {
    let heading = format!("Edit {}", product.name);
    let current_image = format!(
        r#"<p>Current image: <img src="/{}" alt="" width="96"></p>"#,
        escape(&product.image)
    );

    let content = fill(
        PRODUCT_FORM,
        &[
            ("heading", escape(&heading).as_str()),
            ("action", format!("/admin/products/{}", product.id).as_str()),
            ("name", escape(&product.name).as_str()),
            ("price", format!("{:.2}", product.price).as_str()),
            ("current_image", current_image.as_str()),
            ("submit", "Save"),
        ],
    );

    layout(&heading, Some(session), flash, &content)
}
