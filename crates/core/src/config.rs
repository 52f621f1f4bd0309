use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub outline: OutlineConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `RFPCAT_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("RFPCAT_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            outline: OutlineConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{} (upload limit {} MB, {} blobs)", self.server.host, self.server.port, self.server.max_upload_mb, self.server.max_blobs);
        tracing::info!("  llm:         provider={}, configured={}", self.llm.provider, self.llm.is_configured());
        tracing::info!("  ollama:      url={}, model={}", self.ollama.url, self.ollama.model);
        tracing::info!("  outline:     heading_marker={:?}", self.outline.heading_marker);
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": {
                "host": self.server.host,
                "port": self.server.port,
                "max_upload_mb": self.server.max_upload_mb,
                "max_blobs": self.server.max_blobs,
            },
            "llm": {
                "provider": self.llm.provider,
                "model": self.llm.active_model(),
                "max_tokens": self.llm.max_tokens,
                "configured": self.llm.is_configured(),
            },
            "ollama": { "url": self.ollama.url, "model": self.ollama.model },
            "outline": { "heading_marker": self.outline.heading_marker },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    /// Request body limit for uploads, in megabytes.
    pub max_upload_mb: u32,
    /// Uploaded images kept for `GET /blobs/{id}`; the oldest is dropped
    /// beyond this.
    pub max_blobs: u32,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 3001),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
            max_upload_mb: profiled_env_u32(p, "MAX_UPLOAD_MB", 50),
            max_blobs: profiled_env_u32(p, "MAX_BLOBS", 256),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb as usize * 1024 * 1024
    }
}

// ── LLM (OpenAI / Anthropic) ─────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "anthropic", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "openai"),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "OPENAI_MODEL", "gpt-3.5-turbo"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            anthropic_model: profiled_env_or(p, "ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929"),
            temperature: profiled_env_or(p, "LLM_TEMPERATURE", "0.7")
                .parse()
                .unwrap_or(0.7),
            max_tokens: profiled_env_u32(p, "LLM_MAX_TOKENS", 1000),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" | "claude" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }

    /// Model name for the active provider (ollama models live in [`OllamaConfig`]).
    pub fn active_model(&self) -> &str {
        match self.provider.as_str() {
            "anthropic" | "claude" => &self.anthropic_model,
            "ollama" => "(see ollama.model)",
            _ => &self.openai_model,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            model: profiled_env_or(p, "OLLAMA_MODEL", "llama3.2"),
        }
    }
}

// ── Outline ───────────────────────────────────────────────────

/// Default heading marker shared by the categorization prompt and the parser.
pub const DEFAULT_HEADING_MARKER: &str = "###";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineConfig {
    /// Line prefix (without the trailing space) that marks a section heading.
    pub heading_marker: String,
}

impl OutlineConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            heading_marker: marker_from_env(p).unwrap_or_else(|| DEFAULT_HEADING_MARKER.to_string()),
        }
    }

    /// The heading marker set in the environment for the active
    /// `RFPCAT_PROFILE`, if any. Blank values count as unset.
    pub fn env_marker() -> Option<String> {
        let profile = env_or("RFPCAT_PROFILE", "").to_uppercase();
        marker_from_env(&profile)
    }
}

fn marker_from_env(p: &str) -> Option<String> {
    profiled_env_opt(p, "HEADING_MARKER")
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            heading_marker: DEFAULT_HEADING_MARKER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own profile prefix so parallel tests never share keys.

    #[test]
    fn profiled_key_wins_over_plain_key() {
        env::set_var("CFGTESTA_PORT", "4100");
        let config = Config::for_profile("cfgtesta");
        assert_eq!(config.profile, "CFGTESTA");
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.profile_label(), "CFGTESTA");
    }

    #[test]
    fn defaults_follow_the_categorization_endpoint() {
        let config = Config::for_profile("CFGTESTB");
        assert_eq!(config.outline.heading_marker, "###");
        assert!(config.server.max_upload_bytes() > 0);
        assert_eq!(config.server.max_blobs, 256);
    }

    #[test]
    fn blank_heading_marker_falls_back_to_default() {
        env::set_var("CFGTESTC_HEADING_MARKER", "   ");
        let config = Config::for_profile("CFGTESTC");
        assert_eq!(config.outline.heading_marker, DEFAULT_HEADING_MARKER);
    }

    #[test]
    fn custom_heading_marker_is_trimmed() {
        env::set_var("CFGTESTD_HEADING_MARKER", " ## ");
        let config = Config::for_profile("CFGTESTD");
        assert_eq!(config.outline.heading_marker, "##");
    }

    #[test]
    fn profiled_marker_is_visible_without_a_full_config() {
        env::set_var("CFGTESTF_HEADING_MARKER", " ## ");
        assert_eq!(marker_from_env("CFGTESTF").as_deref(), Some("##"));
    }

    #[test]
    fn redacted_summary_hides_api_keys() {
        env::set_var("CFGTESTE_OPENAI_API_KEY", "sk-secret-value");
        env::set_var("CFGTESTE_LLM_PROVIDER", "openai");
        let config = Config::for_profile("CFGTESTE");
        assert!(config.llm.is_configured());
        let summary = config.redacted_summary().to_string();
        assert!(!summary.contains("sk-secret-value"));
        assert!(summary.contains("\"configured\":true"));
    }

    #[test]
    fn unknown_provider_is_not_configured() {
        let llm = LlmConfig {
            provider: "mystery".into(),
            openai_api_key: Some("k".into()),
            openai_model: "m".into(),
            openai_base_url: None,
            anthropic_api_key: None,
            anthropic_model: "m".into(),
            temperature: 0.1,
            max_tokens: 10,
        };
        assert!(!llm.is_configured());
    }
}
