use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use billsplit_core::{split, split_evenly, Money, PersonShare, SplitRequest};
use billsplit_llm::{LanguageModel, Structurer};
use billsplit_ocr::{ItemPriceEntry, OcrBackend, ParsedReceipt, ParserConfig, ReceiptPipeline};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;

/// Multipart field carrying the receipt image.
const UPLOAD_FIELD: &str = "bill";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReceiptPipeline<Box<dyn OcrBackend>>>,
    /// Absent when no language-model credentials were configured.
    pub structurer: Option<Arc<Structurer<Box<dyn LanguageModel>>>>,
}

impl AppState {
    pub fn new(
        recognizer: Box<dyn OcrBackend>,
        parser_config: &ParserConfig,
        model: Option<Box<dyn LanguageModel>>,
    ) -> Self {
        Self {
            pipeline: Arc::new(ReceiptPipeline::new(recognizer, parser_config)),
            structurer: model.map(|m| Arc::new(Structurer::new(m))),
        }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/receipts", post(upload_receipt))
        .route("/api/items", post(extract_items))
        .route("/api/structure", post(structure_items))
        .route("/api/split", post(split_bill))
        .route("/api/split/even", post(split_bill_evenly))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct LinesRequest {
    pub lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<ItemPriceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct EvenSplitRequest {
    pub total: Money,
    pub people: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SharesResponse {
    pub shares: Vec<PersonShare>,
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// OCR an uploaded receipt and pair its items with prices.
pub async fn upload_receipt(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParsedReceipt>, ApiError> {
    let mut data = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            data = Some(field.bytes().await?);
            break;
        }
    }
    let data = data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("No file uploaded in field '{UPLOAD_FIELD}'")))?;

    // Recognition may block on a local engine.
    let pipeline = state.pipeline.clone();
    let receipt = tokio::task::spawn_blocking(move || pipeline.process_bytes(&data)).await??;
    Ok(Json(receipt))
}

/// Run the line parser over already-recognized text.
pub async fn extract_items(
    State(state): State<AppState>,
    Json(req): Json<LinesRequest>,
) -> Json<ItemsResponse> {
    let items = state.pipeline.extractor().extract(&req.lines);
    Json(ItemsResponse { items })
}

pub async fn structure_items(
    State(state): State<AppState>,
    Json(req): Json<LinesRequest>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let structurer = state
        .structurer
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Language model is not configured".to_string()))?;
    let items = structurer.structure(&req.lines).await?;
    Ok(Json(ItemsResponse { items }))
}

pub async fn split_bill(Json(req): Json<SplitRequest>) -> Result<Json<SharesResponse>, ApiError> {
    let shares = split(&req)?;
    Ok(Json(SharesResponse { shares }))
}

pub async fn split_bill_evenly(
    Json(req): Json<EvenSplitRequest>,
) -> Result<Json<SharesResponse>, ApiError> {
    let shares = split_evenly(req.total, &req.people)?;
    Ok(Json(SharesResponse { shares }))
}
