use crate::llm::{AdCopyModel, AdGenerator};
use crate::server::form::AdRequestForm;
use crate::server::response::{csv_response, preflight_response, ApiError};
use axum::extract::{Request, State};
use axum::response::Response;
use log::{error, info, warn};
use std::sync::Arc;

pub async fn preflight() -> Response {
    preflight_response()
}

/// Generates ads for a submitted form and returns them as a CSV download.
///
/// - 400 when product, platforms or prompt are missing
/// - 413 when the body exceeds the upload limit
/// - 500 when the model call fails
/// - 502 when the model answers with something that is not an ad list
pub async fn generate_ads<M: AdCopyModel + 'static>(
    State(generator): State<Arc<AdGenerator<M>>>,
    request: Request,
) -> Result<Response, ApiError> {
    let form = AdRequestForm::from_request(request).await?;

    info!(
        "Received request: selectedProduct={:?}, selectedPlatforms={:?}, chatInput={} chars, attachedFiles={:?}",
        form.selected_product,
        form.selected_platforms,
        form.chat_input.as_deref().map_or(0, str::len),
        form.attachment_names()
    );

    let ad_request = form.into_ad_request()?;

    match generator.generate_csv(&ad_request).await {
        Ok(csv) => Ok(csv_response(csv)),
        Err(e) if e.is_malformed_output() => {
            warn!("Model returned malformed ad data: {}", e);
            Err(ApiError::from(&e))
        }
        Err(e) => {
            error!("An error occurred during ad generation: {}", e);
            Err(ApiError::from(&e))
        }
    }
}
