use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use tamlil::application::services::{ModelCache, TranscriptionService, UploadValidator};
use tamlil::infrastructure::audio::SymphoniaDecoder;
use tamlil::infrastructure::observability::{init_tracing, TracingConfig};
use tamlil::infrastructure::recognition::{create_loader, RecognizerProvider};
use tamlil::presentation::{create_router, AppState, RecognizerProviderSetting, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();

    init_tracing(TracingConfig::default(), settings.server.port);

    let provider = match settings.model.provider {
        RecognizerProviderSetting::Local => RecognizerProvider::Local,
        RecognizerProviderSetting::Mock => RecognizerProvider::Mock,
    };
    let loader = create_loader(provider, &settings.model.model_id, &settings.model.language);

    let cache = Arc::new(ModelCache::new(
        loader,
        Duration::from_secs(settings.model.ttl_seconds),
    ));

    let validator = UploadValidator::new(
        settings.upload.max_file_size_bytes,
        settings.upload.allowed_mime_types.iter().cloned(),
    );

    let decoder = Arc::new(SymphoniaDecoder::new(settings.audio.target_sample_rate));

    let transcription_service = Arc::new(TranscriptionService::new(validator, decoder, cache));

    let state = AppState {
        transcription_service,
        settings: settings.clone(),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!(
        model = %settings.model.model_id,
        ttl_seconds = settings.model.ttl_seconds,
        "Listening on {}",
        addr
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
