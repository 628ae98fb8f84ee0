use ocr_table_core::Detection;
use sha2::{Digest, Sha256};
use worker::{Cache, Response};

use crate::error::ApiError;
use crate::models::{DETECTIONS_CACHE_KEY_PREFIX, DETECTIONS_CACHE_TTL_SECONDS};

fn cache_url(key: &str) -> String {
    format!("https://cache.local/{}", urlencoding::encode(key))
}

/// Lowercase hex SHA-256 of the uploaded image.
pub fn image_digest(image: &[u8]) -> String {
    format!("{:x}", Sha256::digest(image))
}

pub fn detections_cache_key(image: &[u8]) -> String {
    format!("{DETECTIONS_CACHE_KEY_PREFIX}{}", image_digest(image))
}

/// Engine output previously stored for the same image bytes.
pub async fn load_detections(image: &[u8]) -> Result<Option<Vec<Detection>>, ApiError> {
    let cache = Cache::default();
    let Some(mut response) = cache
        .get(cache_url(&detections_cache_key(image)), true)
        .await?
    else {
        return Ok(None);
    };

    let body = response.text().await?;
    decode_cached_detections(&body).map(Some)
}

pub fn decode_cached_detections(body: &str) -> Result<Vec<Detection>, ApiError> {
    Ok(serde_json::from_str::<Vec<Detection>>(body)?)
}

/// Outcome of a cache read. A failed read is reported but never fatal.
#[derive(Debug)]
pub enum CacheLookup {
    Hit(Vec<Detection>),
    Miss,
    Failed(ApiError),
}

impl From<Result<Option<Vec<Detection>>, ApiError>> for CacheLookup {
    fn from(loaded: Result<Option<Vec<Detection>>, ApiError>) -> Self {
        match loaded {
            Ok(Some(detections)) => Self::Hit(detections),
            Ok(None) => Self::Miss,
            Err(error) => Self::Failed(error),
        }
    }
}

pub async fn store_detections(image: &[u8], detections: &[Detection]) -> Result<(), ApiError> {
    let cache = Cache::default();
    let mut response = Response::ok(serde_json::to_string(detections)?)?;
    response.headers_mut().set(
        "Cache-Control",
        &format!("public, max-age={DETECTIONS_CACHE_TTL_SECONDS}"),
    )?;
    response
        .headers_mut()
        .set("Content-Type", "application/json; charset=utf-8")?;

    cache
        .put(cache_url(&detections_cache_key(image)), response)
        .await?;
    Ok(())
}
