//! The `POST /upload` handler: multipart read, broker round trip, response
//! (spec.md §4.6).
use std::sync::Arc;
use std::time::Duration;

use amqprs::connection::Connection;
use base64::Engine;
use bytes::Buf;
use futures_util::{StreamExt, TryStreamExt};
use messages::UploadMessage;
use tracing::{debug, info};
use uuid::Uuid;
use warp::multipart::FormData;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::reply::await_final_envelope;

/// Shared, per-process state every upload request reads from: the broker
/// connection (channels are opened fresh per request, spec.md §4.6
/// "Concurrency") and the loaded configuration.
pub struct UploadContext {
    pub connection: Connection,
    pub config: Config,
}

/// Reads the first file field out of a multipart form, defaulting the
/// filename when the client didn't send one (spec.md §4.6 step 1).
async fn read_first_part(form: FormData) -> std::result::Result<(String, Vec<u8>), warp::Error> {
    futures_util::pin_mut!(form);

    if let Some(part) = form.try_next().await? {
        let filename = part.filename().unwrap_or("upload.docx").to_owned();
        let mut content = Vec::new();
        let mut stream = part.stream();
        while let Some(buf) = stream.next().await {
            let mut buf = buf?;
            while buf.has_remaining() {
                let chunk = buf.chunk().to_vec();
                buf.advance(chunk.len());
                content.extend_from_slice(&chunk);
            }
        }
        return Ok((filename, content));
    }

    Ok(("upload.docx".to_owned(), Vec::new()))
}

/// Handles one `POST /upload` request (spec.md §4.6 steps 1-6).
pub async fn handle_upload(
    ctx: Arc<UploadContext>,
    form: FormData,
) -> std::result::Result<warp::reply::Json, warp::Rejection> {
    let (filename, content) =
        read_first_part(form).await.map_err(|source| warp::reject::custom(Error::Multipart(source)))?;

    if content.is_empty() {
        return Err(warp::reject::custom(Error::EmptyUpload));
    }

    let task_id = Uuid::new_v4().to_string();
    info!(task_id, filename, "accepted upload");

    let envelope = run_round_trip(&ctx, task_id, filename, content).await.map_err(|err| {
        metrics::counter!("gateway_errors_total", "type" => err.to_error_tag()).increment(1);
        warp::reject::custom(err)
    })?;

    Ok(warp::reply::json(&envelope))
}

async fn run_round_trip(
    ctx: &UploadContext,
    task_id: String,
    filename: String,
    content: Vec<u8>,
) -> Result<messages::FinalEnvelope> {
    let channel = broker::open_channel(&ctx.connection, ctx.config.broker.prefetch).await?;
    let reply_to = broker::declare_reply_queue(&channel).await?;
    debug!(task_id, reply_to, "declared reply queue");

    let message = UploadMessage {
        task_id: task_id.clone(),
        filename,
        content: base64::engine::general_purpose::STANDARD.encode(&content),
        reply_to: reply_to.clone(),
    };
    broker::publish_json(&channel, &ctx.config.upload_queue, &task_id, Some(&reply_to), &message).await?;

    let timeout = Duration::from_secs(ctx.config.response_timeout_secs);
    await_final_envelope(&channel, &reply_to, &task_id, timeout).await
}
