use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON catalog dataset the vocabulary and search index are built from
    pub catalog_path: PathBuf,
    /// Where the search index is stored
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Maximum number of products returned per search (1..=10)
    pub search_limit: usize,
    /// Ask the LLM to phrase the answer (plain listing otherwise)
    pub generate_responses: bool,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Query interpretation settings
    pub interpreter: InterpreterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for extraction and response generation
    pub chat_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
}

/// Settings handed to the decision policy at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Try the LLM extraction path before the rule-based engine.
    pub use_learned_path: bool,
    /// Upper bound on a single learned-path call, in seconds (capped at 60).
    pub timeout_secs: u64,
    /// Minimum partial-ratio score (exclusive) for a product type match.
    pub type_threshold: f64,
    /// Minimum partial-ratio score (exclusive) for a brand match.
    pub brand_threshold: f64,
    /// How many frequent detail tokens become attribute candidates.
    pub attribute_top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("./data/flipkart_fashion_products_dataset.json"),
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:9000".to_string(),
            search_limit: 5,
            generate_responses: true,
            llm: LlmConfig::default(),
            interpreter: InterpreterConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.2".to_string(),
            api_key: None,
        }
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            use_learned_path: false,
            timeout_secs: 15,
            type_threshold: 80.0,
            brand_threshold: 80.0,
            attribute_top_n: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("SHOP_ASSIST_CATALOG_PATH") {
            config.catalog_path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("SHOP_ASSIST_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("SHOP_ASSIST_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(val) = std::env::var("SHOP_ASSIST_SEARCH_LIMIT") {
            if let Ok(v) = val.parse::<usize>() {
                config.search_limit = v.clamp(1, 10);
            }
        }
        if let Ok(val) = std::env::var("SHOP_ASSIST_LLM_RESPONSES") {
            if let Some(v) = parse_bool(&val) {
                config.generate_responses = v;
            }
        }

        // Interpreter config
        if let Ok(val) = std::env::var("SHOP_ASSIST_USE_LLM") {
            if let Some(v) = parse_bool(&val) {
                config.interpreter.use_learned_path = v;
            }
        }
        if let Ok(val) = std::env::var("SHOP_ASSIST_LLM_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.interpreter.timeout_secs = v.min(60); // Cap at 60s
            }
        }
        if let Ok(val) = std::env::var("SHOP_ASSIST_ATTRIBUTE_TOP_N") {
            if let Ok(v) = val.parse() {
                config.interpreter.attribute_top_n = v;
            }
        }

        // LLM config
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }

        config
    }

    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
