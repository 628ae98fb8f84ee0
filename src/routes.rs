use std::collections::HashMap;
use std::str::FromStr;

use chrono::Utc;
use ocr_table_core::{
    Detection, OutputFormat, ReconstructOptions, TableReconstruction, parse_detections_json,
    reconstruct_table, render,
};
use serde::Serialize;
use worker::{Context, Cors, Env, FormEntry, Method, Request, Response, Result, RouteContext, Router};

use crate::engine::{self, DetectionCacheStatus};
use crate::error::ApiError;
use crate::models::{HealthResponse, OcrResponse};
use crate::upload::validate_image_upload;

#[derive(Debug, Clone)]
pub struct AppState {
    pub engine_url: Option<String>,
    pub debug: bool,
}

impl AppState {
    fn from_env(env: &Env) -> Self {
        Self {
            engine_url: env.var("OCR_ENGINE_URL").map(|value| value.to_string()).ok(),
            debug: env
                .var("DEBUG")
                .is_ok_and(|value| is_truthy(&value.to_string())),
        }
    }
}

pub async fn handle(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let state = AppState::from_env(&env);

    let mut response = Router::with_data(state)
        .get("/health", health_route)
        .post_async("/ocr", ocr_route)
        .post_async("/api/v1/table", table_route)
        .options("/ocr", preflight_route)
        .options("/api/v1/table", preflight_route)
        .run(req, env)
        .await?;

    response.headers_mut().set("Cache-Control", "no-store")?;
    response.with_cors(&cors())
}

fn cors() -> Cors {
    Cors::new()
        .with_origins(vec!["*"])
        .with_methods(vec![Method::Get, Method::Post, Method::Options])
}

fn health_route(_req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match engine::engine_endpoint(ctx.data.engine_url.as_deref()) {
        Ok(_) => json_response(&HealthResponse::healthy()),
        Err(error) => {
            let response = json_response(&HealthResponse::unhealthy(error.message()))?;
            Ok(response.with_status(503))
        }
    }
}

fn preflight_route(_req: Request, _ctx: RouteContext<AppState>) -> Result<Response> {
    Response::empty()
}

async fn ocr_route(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match ocr_response(req, &ctx.data).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(ctx.data.debug),
    }
}

async fn table_route(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match table_response(req).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(ctx.data.debug),
    }
}

async fn ocr_response(mut req: Request, state: &AppState) -> Result<Response, ApiError> {
    let endpoint = engine::engine_endpoint(state.engine_url.as_deref())?;

    let form = req.form_data().await.map_err(|error| {
        ApiError::BadRequest(format!("expected multipart form data: {error}"))
    })?;
    let Some(FormEntry::File(file)) = form.get("file") else {
        return Err(ApiError::BadRequest(
            "No file uploaded. Use 'file' form field.".to_string(),
        ));
    };

    let filename = file.name();
    let content_type = file.type_();
    validate_image_upload(&filename, &content_type, file.size())?;

    let image = file.bytes().await?;
    if image.is_empty() {
        return Err(ApiError::BadRequest("Empty file uploaded".to_string()));
    }
    worker::console_log!("processing image: {} ({} bytes)", filename, image.len());

    let (detections, cache_status) =
        engine::detections_for_image(&endpoint, &image, &content_type).await?;
    let table = reconstruct(&detections);

    let payload = OcrResponse::from_reconstruction(
        &detections,
        &table,
        cache_status == DetectionCacheStatus::Hit,
        Utc::now(),
    );
    let mut response = json_response(&payload)?;
    response
        .headers_mut()
        .set("X-Cache-Status", cache_status.as_header_value())?;
    Ok(response)
}

async fn table_response(mut req: Request) -> Result<Response, ApiError> {
    let query = parse_query(&req)?;
    let format = parse_format_query(&query)?;

    let body = req.text().await?;
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "request body must contain detections JSON".to_string(),
        ));
    }
    let detections = parse_detections_json(&body)?;
    let table = reconstruct(&detections);

    if format == OutputFormat::Json {
        let payload = OcrResponse::from_reconstruction(&detections, &table, false, Utc::now());
        return Ok(json_response(&payload)?);
    }

    let options = ReconstructOptions::default();
    let rendered = render(&table, format, options.delimiter)?;
    let mut response = Response::ok(rendered)?;
    response
        .headers_mut()
        .set("Content-Type", content_type_for(format))?;
    if let Some(extension) = file_extension_for(format) {
        response.headers_mut().set(
            "Content-Disposition",
            &content_disposition_for(extension),
        )?;
    }
    Ok(response)
}

fn reconstruct(detections: &[Detection]) -> TableReconstruction {
    let table = reconstruct_table(detections, &ReconstructOptions::default());
    worker::console_log!(
        "OCR complete: {} text blocks, {} row(s) x {} column(s), avg confidence: {:.2}",
        table.block_count(),
        table.row_count(),
        table.column_count,
        table.average_confidence
    );
    table
}

fn json_response<T>(payload: &T) -> Result<Response>
where
    T: Serialize,
{
    Response::from_json(payload)
}

fn parse_query(req: &Request) -> Result<HashMap<String, String>, ApiError> {
    let url = req.url()?;
    let query = url
        .query_pairs()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect::<HashMap<_, _>>();
    Ok(query)
}

pub fn parse_format_query(query: &HashMap<String, String>) -> Result<OutputFormat, ApiError> {
    let Some(raw) = query.get("format") else {
        return Ok(OutputFormat::Json);
    };
    OutputFormat::from_str(raw).map_err(ApiError::BadRequest)
}

pub fn content_type_for(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Csv => "text/csv; charset=utf-8",
        OutputFormat::Tsv => "text/tab-separated-values; charset=utf-8",
        OutputFormat::Json => "application/json; charset=utf-8",
        OutputFormat::Text => "text/plain; charset=utf-8",
    }
}

pub fn content_disposition_for(extension: &str) -> String {
    format!("attachment; filename=\"table.{extension}\"")
}

fn file_extension_for(format: OutputFormat) -> Option<&'static str> {
    match format {
        OutputFormat::Csv => Some("csv"),
        OutputFormat::Tsv => Some("tsv"),
        OutputFormat::Json | OutputFormat::Text => None,
    }
}

pub fn is_truthy(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    lowered == "true" || lowered == "1" || lowered == "yes"
}
