use serde::Deserialize;

/// Signature parameters of a filesystem download link.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SignedFileQuery {
    /// Unix timestamp after which the link is rejected.
    pub expires: i64,
    pub signature: String,
}
