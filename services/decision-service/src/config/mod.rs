use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub deep_reasoner_base_url: String,
    pub deep_reasoner_model: String,
    pub pipeline_timeout_secs: u64,
    pub worker_count: usize,
    pub sse_pace_ms: u64,
    pub extraction_max_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("DECISION_").from_env::<Self>()
    }

    /// Extraction API key. Absence forces the extractor fallback path.
    pub fn llm_api_key() -> Option<String> {
        std::env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty())
    }

    /// Deep-reasoner API key. Absence forces deterministic reasoning.
    pub fn deep_reasoner_api_key() -> Option<String> {
        std::env::var("DEEP_REASONER_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8084,
            data_dir: "data".to_string(),
            llm_base_url: "https://api.openai.com/v1".to_string(),
            llm_model: "gpt-4o".to_string(),
            deep_reasoner_base_url: "https://api.openai.com/v1".to_string(),
            deep_reasoner_model: "o4-mini".to_string(),
            pipeline_timeout_secs: 60,
            worker_count: 4,
            sse_pace_ms: 500,
            extraction_max_retries: 2,
        }
    }
}
