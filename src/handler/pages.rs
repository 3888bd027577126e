use std::sync::Arc;

use axum::{Router, response::Html, routing::get};

use crate::api::AppState;

/// Static site surface. Plain inline HTML; no template engine.
pub fn pages_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/how-it-works", get(how_it_works))
        .route("/privacy-policy", get(privacy_policy))
        .route("/support", get(support))
}

async fn index() -> Html<&'static str> {
    Html(
        "<!doctype html><title>plateblur</title>\
         <h1>plateblur</h1>\
         <p>POST a video as multipart field <code>file</code> to <code>/upload</code>, \
         then fetch the returned <code>downloadUrl</code>.</p>",
    )
}

async fn how_it_works() -> Html<&'static str> {
    Html(
        "<!doctype html><title>How it works</title>\
         <h1>How it works</h1>\
         <p>Every frame of the uploaded video is Gaussian-blurred and the result \
         is re-encoded as MP4. Each download link works once.</p>",
    )
}

async fn privacy_policy() -> Html<&'static str> {
    Html(
        "<!doctype html><title>Privacy</title>\
         <h1>Privacy</h1>\
         <p>Uploads are processed in memory and per-request temp files; processed \
         videos are deleted after the first download.</p>",
    )
}

async fn support() -> Html<&'static str> {
    Html(
        "<!doctype html><title>Support</title>\
         <h1>Support</h1>\
         <p>File an issue on the project tracker.</p>",
    )
}
