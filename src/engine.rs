use chrono::Utc;
use ocr_table_core::{Detection, parse_detections_json};
use url::Url;
use worker::js_sys::Uint8Array;
use worker::{Fetch, Headers, Method, Request, RequestInit};

use crate::cache::{self, CacheLookup};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionCacheStatus {
    Hit,
    Miss,
}

impl DetectionCacheStatus {
    pub const fn as_header_value(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

/// Parses the configured engine endpoint, failing as `Unavailable`.
pub fn engine_endpoint(configured: Option<&str>) -> Result<Url, ApiError> {
    let raw = configured
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::Unavailable("PaddleOCR engine not initialized".to_string()))?;
    Ok(Url::parse(raw)?)
}

/// Detections for an image, reusing cached engine output when available.
pub async fn detections_for_image(
    endpoint: &Url,
    image: &[u8],
    content_type: &str,
) -> Result<(Vec<Detection>, DetectionCacheStatus), ApiError> {
    match CacheLookup::from(cache::load_detections(image).await) {
        CacheLookup::Hit(cached) => return Ok((cached, DetectionCacheStatus::Hit)),
        CacheLookup::Miss => {}
        CacheLookup::Failed(error) => {
            worker::console_error!("ignoring unreadable cached detections: {error}");
        }
    }

    let detections = run_engine(endpoint, image, content_type).await?;
    if let Err(error) = cache::store_detections(image, &detections).await {
        worker::console_error!("failed to cache engine detections: {error}");
    }
    Ok((detections, DetectionCacheStatus::Miss))
}

async fn run_engine(
    endpoint: &Url,
    image: &[u8],
    content_type: &str,
) -> Result<Vec<Detection>, ApiError> {
    let mut headers = Headers::new();
    let content_type = if content_type.is_empty() {
        "application/octet-stream"
    } else {
        content_type
    };
    headers.set("Content-Type", content_type)?;
    headers.set("Accept", "application/json")?;

    let mut init = RequestInit::new();
    init.with_method(Method::Post)
        .with_headers(headers)
        .with_body(Some(Uint8Array::from(image).into()));
    let request = Request::new_with_init(endpoint.as_str(), &init)?;

    let started = Utc::now();
    let mut response = Fetch::Request(request).send().await?;
    let status = response.status_code();
    if status >= 400 {
        return Err(ApiError::Upstream(format!(
            "OCR engine request failed: status {status}"
        )));
    }

    let body = response.text().await?;
    let detections = parse_detections_json(&body).map_err(|error| {
        ApiError::Upstream(format!("OCR engine returned invalid detections: {error}"))
    })?;

    worker::console_log!(
        "OCR engine returned {} detection(s) in {} ms",
        detections.len(),
        (Utc::now() - started).num_milliseconds()
    );
    Ok(detections)
}
