/// Audio in the pipeline's canonical form: mono f32 PCM at a fixed rate.
///
/// Invariants upheld by the decoder that produces it: every sample lies in
/// [-1.0, 1.0], `sample_rate` is the pipeline target rate, and the source
/// channel layout has already been downmixed to one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub source_channels: usize,
    pub source_sample_rate: u32,
}

impl CanonicalAudio {
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
