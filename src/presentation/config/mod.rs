mod settings;

pub use settings::{
    AudioSettings, LoggingSettings, ModelSettings, RecognizerProviderSetting, ServerSettings,
    Settings, UploadSettings, DEFAULT_MODEL_TTL_SECONDS,
};
