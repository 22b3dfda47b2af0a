use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tokio_util::io::ReaderStream;
use tracing::{instrument, warn};

use crate::error::AppError;
use crate::models::files::SignedFileQuery;
use crate::state::AppState;
use crate::utils::filename::content_disposition_value;

/// Serve a file from the filesystem backend through a signed link.
///
/// No bearer token is needed: the signature and expiry in the query string
/// are the credential. Invalid, expired and unknown links all answer
/// `NOT_FOUND`.
#[instrument(skip(state, query))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<SignedFileQuery>,
) -> Result<Response, AppError> {
    let Some(files) = state.local_files.as_ref() else {
        return Err(AppError::NotFound("File not found".into()));
    };
    if !files.verify(&path, query.expires, &query.signature) {
        warn!("Rejected file link with bad or expired signature");
        return Err(AppError::NotFound("File not found".into()));
    }

    let (reader, len) = files.open(&path).await?;
    let filename = path.rsplit('/').next().unwrap_or(&path);
    let content_type = mime_guess::from_path(filename).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, len.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(filename),
        )
        .header(header::CACHE_CONTROL, "private, max-age=300")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
