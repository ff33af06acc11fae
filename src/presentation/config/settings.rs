use serde::Deserialize;

use crate::application::services::{DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_UPLOAD_BYTES};
use crate::infrastructure::audio::TARGET_SAMPLE_RATE;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub upload: UploadSettings,
    pub audio: AudioSettings,
    pub model: ModelSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory the bundled web client is served from.
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub max_file_size_bytes: u64,
    pub allowed_mime_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioSettings {
    pub target_sample_rate: u32,
    pub target_channels: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    pub provider: RecognizerProviderSetting,
    pub model_id: String,
    pub language: String,
    /// How long a loaded model stays fresh before the next request reloads it.
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognizerProviderSetting {
    Local,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

pub const DEFAULT_MODEL_TTL_SECONDS: u64 = 1800;

impl Settings {
    /// Environment-driven configuration with workable defaults; no config
    /// file is required to boot the server.
    pub fn from_env() -> Self {
        Self {
            server: ServerSettings {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: env_parsed("SERVER_PORT", 5002),
                static_dir: env_or("STATIC_DIR", "client"),
            },
            upload: UploadSettings {
                max_file_size_bytes: env_parsed("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
                allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            audio: AudioSettings {
                target_sample_rate: env_parsed("TARGET_SAMPLE_RATE", TARGET_SAMPLE_RATE),
                target_channels: 1,
            },
            model: ModelSettings {
                provider: match env_or("RECOGNIZER_PROVIDER", "local").to_lowercase().as_str() {
                    "mock" => RecognizerProviderSetting::Mock,
                    _ => RecognizerProviderSetting::Local,
                },
                model_id: env_or("WHISPER_MODEL", "openai/whisper-base"),
                language: env_or("WHISPER_LANGUAGE", "he"),
                ttl_seconds: env_parsed("MODEL_TTL_SECONDS", DEFAULT_MODEL_TTL_SECONDS),
            },
            logging: LoggingSettings {
                level: env_or("LOG_LEVEL", "info"),
                enable_json: env_or("LOG_FORMAT", "plain").to_lowercase() == "json",
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
