mod symphonia_decoder;

pub use symphonia_decoder::{SymphoniaDecoder, TARGET_SAMPLE_RATE};
