use billsplit_llm::{GeminiClient, LanguageModel};
use billsplit_ocr::OcrBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod routes;

use config::ServerConfig;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let parser_config = config.load_parser_config()?;

    // Credentials are handed to the client here; nothing reads them later.
    let model: Option<Box<dyn LanguageModel>> = match &config.gemini_api_key {
        Some(key) => {
            info!("Language model structuring enabled ({})", config.gemini_model);
            Some(Box::new(GeminiClient::new(key.clone(), config.gemini_model.clone())))
        }
        None => {
            info!("GEMINI_API_KEY not set; /api/structure is disabled");
            None
        }
    };

    let state = AppState::new(build_recognizer(&config), &parser_config, model);
    let app = routes::router(state, config.max_upload_bytes);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "tesseract")]
fn build_recognizer(config: &ServerConfig) -> Box<dyn OcrBackend> {
    use billsplit_ocr::recognizer::tesseract_backend::TesseractRecognizer;

    info!("Using Tesseract OCR ({})", config.tesseract_lang);
    Box::new(TesseractRecognizer::new(
        config.tesseract_data_path.clone(),
        &config.tesseract_lang,
    ))
}

#[cfg(not(feature = "tesseract"))]
fn build_recognizer(config: &ServerConfig) -> Box<dyn OcrBackend> {
    tracing::warn!(
        lang = %config.tesseract_lang,
        data_path = ?config.tesseract_data_path,
        "No OCR engine compiled in; /api/receipts will answer 503. Rebuild with `--features tesseract`."
    );
    Box::new(billsplit_ocr::UnavailableRecognizer)
}
