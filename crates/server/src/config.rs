use anyhow::Context;
use billsplit_llm::DEFAULT_GEMINI_MODEL;
use billsplit_ocr::ParserConfig;
use std::path::PathBuf;

/// Server settings, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// TOML file with parser overrides; defaults apply when unset.
    pub parser_config_path: Option<PathBuf>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub max_upload_bytes: usize,
    pub tesseract_lang: String,
    pub tesseract_data_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            parser_config_path: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            tesseract_lang: "eng".to_string(),
            tesseract_data_path: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            host: non_empty("BILLSPLIT_HOST").unwrap_or(defaults.host),
            port: non_empty("BILLSPLIT_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            parser_config_path: non_empty("BILLSPLIT_PARSER_CONFIG").map(PathBuf::from),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            max_upload_bytes: non_empty("BILLSPLIT_MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            tesseract_lang: non_empty("TESSERACT_LANG").unwrap_or(defaults.tesseract_lang),
            tesseract_data_path: non_empty("TESSDATA_PREFIX"),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn load_parser_config(&self) -> anyhow::Result<ParserConfig> {
        let Some(path) = &self.parser_config_path else {
            return Ok(ParserConfig::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read parser config {}", path.display()))?;
        ParserConfig::from_toml(&content)
            .with_context(|| format!("Invalid parser config {}", path.display()))
    }
}
