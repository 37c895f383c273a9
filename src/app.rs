use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::{self, AppConfig, BootstrapAdmin, MailTransport},
    database,
    error::{AppError, Result},
    routes,
    services::{
        ImageUploader, LogMailer, Mailer, NotificationWorker, PriceChangeNotifier, RetryPolicy,
        SesMailer, notification_queue,
    },
    store::{AdminDirectory, CatalogStore, PgStore},
};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub jwt_secret: String,
    pub ttl_hours: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub admins: Arc<dyn AdminDirectory>,
    pub images: ImageUploader,
    pub notifier: PriceChangeNotifier,
    pub sessions: SessionSettings,
}

/// Router plus the background worker that delivers queued notifications.
pub struct Application {
    pub router: Router,
    pub worker: NotificationWorker,
}

pub async fn build(config: &AppConfig) -> Result<Application> {
    let pool = database::create_pool(&config.database).await?;
    let store = Arc::new(PgStore::new(pool));

    if let Some(admin) = &config.auth.bootstrap_admin {
        bootstrap_admin(store.as_ref(), admin).await?;
    }

    let mailer: Arc<dyn Mailer> = match config.notifications.transport {
        MailTransport::Ses => Arc::new(SesMailer::new(
            config::load_ses_client().await?,
            config.notifications.sender.clone(),
        )),
        MailTransport::Log => Arc::new(LogMailer),
    };

    let images = ImageUploader::new(&config.uploads);
    images.ensure_ready().await?;

    let (queue, receiver) = notification_queue::channel(config.notifications.queue_capacity);
    let worker = NotificationWorker::new(
        receiver,
        mailer,
        RetryPolicy::with_max_attempts(config.notifications.max_attempts),
    );

    tracing::info!(
        "Price change notifications go to {} via {:?}",
        config.notifications.recipient,
        config.notifications.transport
    );

    let state = AppState {
        catalog: store.clone(),
        admins: store,
        images,
        notifier: PriceChangeNotifier::new(
            Arc::new(queue),
            config.notifications.recipient.clone(),
        ),
        sessions: SessionSettings {
            jwt_secret: config.auth.jwt_secret.clone(),
            ttl_hours: config.auth.session_ttl_hours,
        },
    };

    Ok(Application {
        router: router(state, config.server.max_body_size),
        worker,
    })
}

pub fn router(state: AppState, max_body_size: usize) -> Router {
    let public_dir = state.images.public_dir().to_path_buf();

    routes::create_router(&state)
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates or re-keys the configured admin account.
pub async fn bootstrap_admin(admins: &dyn AdminDirectory, admin: &BootstrapAdmin) -> Result<()> {
    let hash = bcrypt::hash(&admin.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))?;

    let name = admin.email.split('@').next().unwrap_or("admin");
    let stored = admins.upsert(&admin.email, name, &hash).await?;

    tracing::info!(admin_id = stored.id, "Bootstrap admin account ready");

    Ok(())
}
