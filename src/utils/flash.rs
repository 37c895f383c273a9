use axum::response::Redirect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashStatus {
    Success,
    Error,
}

/// One-shot status banner carried in the redirect target's query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub status: FlashStatus,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: FlashStatus::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: FlashStatus::Error,
            message: message.into(),
        }
    }

    pub fn redirect(&self, path: &str) -> Redirect {
        match serde_urlencoded::to_string(self) {
            Ok(query) => Redirect::to(&format!("{}?{}", path, query)),
            Err(e) => {
                tracing::warn!("Could not encode status message: {}", e);
                Redirect::to(path)
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub status: Option<String>,
    pub message: Option<String>,
}

impl FlashQuery {
    pub fn into_flash(self) -> Option<Flash> {
        let message = self.message.filter(|m| !m.trim().is_empty())?;

        match self.status.as_deref() {
            Some("success") => Some(Flash::success(message)),
            Some("error") => Some(Flash::error(message)),
            _ => None,
        }
    }
}
