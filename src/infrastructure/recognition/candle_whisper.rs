use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;
use tokio::sync::Mutex;

use crate::application::ports::{
    LoadError, Recognizer, RecognizerError, RecognizerLoader,
};
use crate::domain::{CanonicalAudio, Transcript};

pub struct CandleWhisperRecognizer {
    model: Mutex<m::model::Whisper>,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
    mel_filters: Vec<f32>,
    language: String,
}

impl CandleWhisperRecognizer {
    pub fn new(model_id: &str, language: &str) -> Result<Self, LoadError> {
        let device = Device::Cpu;

        tracing::info!(
            device = ?device,
            model = model_id,
            language = language,
            "Initializing Candle Whisper recognizer"
        );

        let api = Api::new().map_err(|e| LoadError(e.to_string()))?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .map_err(|e| LoadError(format!("config.json: {}", e)))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| LoadError(format!("tokenizer.json: {}", e)))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| LoadError(format!("model.safetensors: {}", e)))?;

        let mel_repo = api.repo(Repo::new(
            "FL33TW00D-HF/whisper-base".to_string(),
            RepoType::Model,
        ));
        let mel_bytes_path = mel_repo
            .get("melfilters.bytes")
            .map_err(|e| LoadError(format!("melfilters.bytes: {}", e)))?;

        let config_contents = std::fs::read_to_string(&config_path)
            .map_err(|e| LoadError(format!("read config: {}", e)))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| LoadError(format!("parse config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| LoadError(format!("tokenizer: {}", e)))?;

        let mel_bytes = std::fs::read(&mel_bytes_path)
            .map_err(|e| LoadError(format!("mel filters: {}", e)))?;
        let mel_filters = read_mel_filters(&mel_bytes, &config)?;

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], m::DTYPE, &device)
                .map_err(|e| LoadError(format!("weights: {}", e)))?
        };

        let model = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| LoadError(format!("model: {}", e)))?;

        tracing::info!("Candle Whisper recognizer loaded successfully");

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            config,
            device,
            mel_filters,
            language: language.to_string(),
        })
    }

    fn language_token(&self) -> Option<u32> {
        // English-only checkpoints carry no language tokens.
        self.tokenizer
            .token_to_id(&format!("<|{}|>", self.language))
    }
}

#[async_trait]
impl Recognizer for CandleWhisperRecognizer {
    async fn recognize(&self, audio: &CanonicalAudio) -> Result<Transcript, RecognizerError> {
        let chunk_samples = m::N_SAMPLES;
        let mut segments: Vec<String> = Vec::new();

        let mut mel_tensors = Vec::new();

        for (i, chunk) in audio.samples.chunks(chunk_samples).enumerate() {
            let samples = if chunk.len() < chunk_samples {
                let mut padded = chunk.to_vec();
                padded.resize(chunk_samples, 0.0);
                padded
            } else {
                chunk.to_vec()
            };

            let mel_data = m::audio::pcm_to_mel(&self.config, &samples, &self.mel_filters);
            let n_mel = self.config.num_mel_bins;
            let n_frames = mel_data.len() / n_mel;

            let mel_tensor = Tensor::from_vec(mel_data, (1, n_mel, n_frames), &self.device)
                .map_err(|e| RecognizerError::RecognitionFailed(format!("mel tensor: {}", e)))?;

            mel_tensors.push((i, mel_tensor));
        }

        let mut model = self.model.lock().await;
        let language_token = self.language_token();
        let mut confidence: f32 = 1.0;

        for (i, mel_tensor) in mel_tensors {
            tracing::debug!(segment = i, "Transcribing audio segment");
            if i == 0 {
                if let Some(lang) = language_token {
                    confidence =
                        language_probability(&mut model, &self.tokenizer, &self.device, &mel_tensor, lang)?;
                }
            }
            let text = decode_segment(
                &mut model,
                &self.tokenizer,
                &self.device,
                &mel_tensor,
                language_token,
            )?;
            if !text.is_empty() {
                segments.push(text);
            }
        }

        let transcript = segments.join(" ");

        tracing::info!(
            segments = segments.len(),
            chars = transcript.len(),
            confidence = confidence,
            "Audio transcription completed"
        );

        Ok(Transcript::new(
            transcript,
            self.language.clone(),
            confidence,
        ))
    }
}

/// Probability mass the model assigns to the configured language token at the
/// first decoder step, mirroring whisper's language-detection pass.
fn language_probability(
    model: &mut m::model::Whisper,
    tokenizer: &Tokenizer,
    device: &Device,
    mel: &Tensor,
    language_token: u32,
) -> Result<f32, RecognizerError> {
    let sot_token = token_id(tokenizer, m::SOT_TOKEN)?;

    let audio_features = model
        .encoder
        .forward(mel, true)
        .map_err(|e| RecognizerError::RecognitionFailed(format!("encoder: {}", e)))?;

    let token_tensor = Tensor::new(&[sot_token], device)
        .and_then(|t| t.unsqueeze(0))
        .map_err(|e| RecognizerError::RecognitionFailed(e.to_string()))?;

    let decoder_output = model
        .decoder
        .forward(&token_tensor, &audio_features, true)
        .map_err(|e| RecognizerError::RecognitionFailed(format!("decoder: {}", e)))?;

    let logits = model
        .decoder
        .final_linear(
            &decoder_output
                .squeeze(0)
                .map_err(|e| RecognizerError::RecognitionFailed(e.to_string()))?,
        )
        .map_err(|e| RecognizerError::RecognitionFailed(format!("linear: {}", e)))?;

    let last_logits = logits
        .get(0)
        .map_err(|e| RecognizerError::RecognitionFailed(e.to_string()))?;

    let probs = candle_nn::ops::softmax(&last_logits, 0)
        .map_err(|e| RecognizerError::RecognitionFailed(format!("softmax: {}", e)))?;

    let probability = probs
        .get(language_token as usize)
        .and_then(|t| t.to_scalar::<f32>())
        .map_err(|e| RecognizerError::RecognitionFailed(e.to_string()))?;

    model.reset_kv_cache();

    Ok(probability)
}

fn decode_segment(
    model: &mut m::model::Whisper,
    tokenizer: &Tokenizer,
    device: &Device,
    mel: &Tensor,
    language_token: Option<u32>,
) -> Result<String, RecognizerError> {
    let sot_token = token_id(tokenizer, m::SOT_TOKEN)?;
    let transcribe_token = token_id(tokenizer, m::TRANSCRIBE_TOKEN)?;
    let no_timestamps_token = token_id(tokenizer, m::NO_TIMESTAMPS_TOKEN)?;
    let eot_token = token_id(tokenizer, m::EOT_TOKEN)?;

    let audio_features = model
        .encoder
        .forward(mel, true)
        .map_err(|e| RecognizerError::RecognitionFailed(format!("encoder: {}", e)))?;

    let mut tokens = vec![sot_token];
    if let Some(lang) = language_token {
        tokens.push(lang);
    }
    tokens.push(transcribe_token);
    tokens.push(no_timestamps_token);

    let prefix_len = tokens.len();
    let max_tokens = 224;
    let mut decoded_text = String::new();

    for _ in 0..max_tokens {
        let token_tensor = Tensor::new(tokens.as_slice(), device)
            .map_err(|e| RecognizerError::RecognitionFailed(e.to_string()))?
            .unsqueeze(0)
            .map_err(|e| RecognizerError::RecognitionFailed(e.to_string()))?;

        let decoder_output = model
            .decoder
            .forward(&token_tensor, &audio_features, tokens.len() == prefix_len)
            .map_err(|e| RecognizerError::RecognitionFailed(format!("decoder: {}", e)))?;

        let logits = model
            .decoder
            .final_linear(
                &decoder_output
                    .squeeze(0)
                    .map_err(|e| RecognizerError::RecognitionFailed(e.to_string()))?,
            )
            .map_err(|e| RecognizerError::RecognitionFailed(format!("linear: {}", e)))?;

        let seq_len = logits
            .dim(0)
            .map_err(|e| RecognizerError::RecognitionFailed(e.to_string()))?;
        let last_logits = logits
            .get(seq_len - 1)
            .map_err(|e| RecognizerError::RecognitionFailed(e.to_string()))?;

        let next_token = last_logits
            .argmax(0)
            .map_err(|e| RecognizerError::RecognitionFailed(e.to_string()))?
            .to_scalar::<u32>()
            .map_err(|e| RecognizerError::RecognitionFailed(e.to_string()))?;

        if next_token == eot_token {
            break;
        }

        tokens.push(next_token);

        if let Some(text) = tokenizer.id_to_token(next_token) {
            let text = text.replace("Ġ", " ").replace("▁", " ");
            decoded_text.push_str(&text);
        }
    }

    model.reset_kv_cache();

    Ok(decoded_text.trim().to_string())
}

fn token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32, RecognizerError> {
    tokenizer
        .token_to_id(token)
        .ok_or_else(|| RecognizerError::RecognitionFailed(format!("token not found: {}", token)))
}

fn read_mel_filters(bytes: &[u8], config: &Config) -> Result<Vec<f32>, LoadError> {
    let expected_len = config.num_mel_bins * (m::N_FFT / 2 + 1);
    if bytes.len() < expected_len * 4 {
        return Err(LoadError(format!(
            "mel filters file too small: {} bytes, expected at least {}",
            bytes.len(),
            expected_len * 4
        )));
    }

    let filters: Vec<f32> = bytes
        .chunks_exact(4)
        .take(expected_len)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Ok(filters)
}

/// Loads [`CandleWhisperRecognizer`] off the async workers; the construction
/// downloads weights and memory-maps them, which can take minutes cold.
pub struct CandleWhisperLoader {
    model_id: String,
    language: String,
}

impl CandleWhisperLoader {
    pub fn new(model_id: String, language: String) -> Self {
        Self { model_id, language }
    }
}

#[async_trait]
impl RecognizerLoader for CandleWhisperLoader {
    async fn load(&self) -> Result<Arc<dyn Recognizer>, LoadError> {
        let model_id = self.model_id.clone();
        let language = self.language.clone();
        let recognizer = tokio::task::spawn_blocking(move || {
            CandleWhisperRecognizer::new(&model_id, &language)
        })
        .await
        .map_err(|e| LoadError(format!("load task failed: {}", e)))??;

        Ok(Arc::new(recognizer) as Arc<dyn Recognizer>)
    }
}
