use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::store::VideoStore;

pub(crate) struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn VideoStore>,
}

pub(crate) fn app_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .merge(crate::handler::pages::pages_router())
        .merge(crate::handler::video::video_router())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub(crate) fn start_api_server(
    config: AppConfig,
    store: Arc<dyn VideoStore>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let addr = config.bind_addr.clone();
        let app = app_router(Arc::new(AppState { config, store }));

        let listener = TcpListener::bind(&addr).await.expect("bind API address");
        log::info!("API server started on {}", addr);
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(cancel))
            .await
        {
            log::error!("API server error: {}", e);
        }
    });
}

async fn shutdown_signal(cancel: CancellationToken) {
    cancel.cancelled().await;
    log::info!("shutting down API server");
}

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
