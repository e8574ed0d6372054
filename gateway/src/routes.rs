//! Route composition and rejection-to-response mapping (spec.md §6).
use std::convert::Infallible;
use std::sync::Arc;

use serde_json::json;
use tracing::error;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::error::Error;
use crate::upload::{handle_upload, UploadContext};

/// 16 MiB cap on the multipart body, generous for a single `.docx` upload
/// while bounding one request's memory footprint.
const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Every branch below is mapped down to a plain `http::Response` so `.or()`
/// and `.recover()` compose without type-unification juggling between the
/// success and error arms.
pub fn routes(ctx: Arc<UploadContext>) -> warp::filters::BoxedFilter<(warp::reply::Response,)> {
    let upload = warp::path("upload")
        .and(warp::post())
        .and(warp::any().map(move || Arc::clone(&ctx)))
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and_then(handle_upload)
        .map(|reply: warp::reply::Json| reply.into_response())
        .boxed();

    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::json(&json!({ "status": "ok" })).into_response())
        .boxed();

    upload.or(health).unify().recover(recover).unify().boxed()
}

async fn recover(err: Rejection) -> std::result::Result<warp::reply::Response, Infallible> {
    if let Some(err) = err.find::<Error>() {
        error!(error = %err, "upload request failed");
        let body = json!({ "error": err.to_string() });
        return Ok(warp::reply::with_status(warp::reply::json(&body), err.status()).into_response());
    }

    if err.is_not_found() {
        let body = json!({ "error": "not found" });
        return Ok(warp::reply::with_status(warp::reply::json(&body), StatusCode::NOT_FOUND).into_response());
    }

    error!(?err, "unhandled rejection");
    let body = json!({ "error": "internal error" });
    Ok(warp::reply::with_status(warp::reply::json(&body), StatusCode::INTERNAL_SERVER_ERROR).into_response())
}
