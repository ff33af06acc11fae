use tamlil::application::ports::{AudioDecoder, AudioDecoderError};
use tamlil::infrastructure::audio::SymphoniaDecoder;

fn build_wav(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
    let num_samples = samples.len() as u32;
    let block_align = channels * 2;
    let byte_rate = sample_rate * block_align as u32;
    let data_size = num_samples * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&file_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        wav.extend_from_slice(&s.to_le_bytes());
    }
    wav
}

#[test]
fn given_16khz_mono_wav_when_decoding_then_samples_are_normalized_floats() {
    let samples: Vec<i16> = vec![0, 16384, -16384, 32767, -32768];
    let wav = build_wav(16_000, 1, &samples);
    let decoder = SymphoniaDecoder::default();

    let audio = decoder.decode(&wav).expect("decode should succeed");

    assert_eq!(audio.sample_rate, 16_000);
    assert_eq!(audio.source_sample_rate, 16_000);
    assert_eq!(audio.source_channels, 1);
    assert_eq!(audio.samples.len(), samples.len());
    assert!((audio.samples[1] - 0.5).abs() < 1e-3);
    assert!((audio.samples[2] + 0.5).abs() < 1e-3);
    assert!(audio.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
}

#[test]
fn given_stereo_wav_when_decoding_then_output_is_channel_mean() {
    // Interleaved L/R frames; each output sample must be (L + R) / 2.
    let frames: Vec<(i16, i16)> = vec![(1000, 3000), (-2000, 2000), (16384, 16384), (0, -8000)];
    let interleaved: Vec<i16> = frames.iter().flat_map(|&(l, r)| [l, r]).collect();
    let wav = build_wav(16_000, 2, &interleaved);
    let decoder = SymphoniaDecoder::default();

    let audio = decoder.decode(&wav).expect("decode should succeed");

    assert_eq!(audio.source_channels, 2);
    assert_eq!(audio.samples.len(), frames.len());
    for (sample, &(l, r)) in audio.samples.iter().zip(&frames) {
        let expected = (l as f32 / 32768.0 + r as f32 / 32768.0) / 2.0;
        assert!(
            (sample - expected).abs() < 1e-6,
            "downmixed sample {} should equal channel mean {}",
            sample,
            expected
        );
    }
}

#[test]
fn given_8khz_silence_when_decoding_then_resampled_to_double_length_of_zeros() {
    // 2 seconds of 8 kHz silence must become exactly 32000 zero samples.
    let samples: Vec<i16> = vec![0i16; 16_000];
    let wav = build_wav(8_000, 1, &samples);
    let decoder = SymphoniaDecoder::default();

    let audio = decoder.decode(&wav).expect("decode should succeed");

    assert_eq!(audio.samples.len(), 32_000);
    assert_eq!(audio.source_sample_rate, 8_000);
    assert!((audio.duration_secs() - 2.0).abs() < 1e-3);
    assert!(audio.samples.iter().all(|&s| s == 0.0));
}

#[test]
fn given_44100hz_wav_when_decoding_then_output_length_matches_rate_ratio() {
    let samples: Vec<i16> = vec![0i16; 44_100];
    let wav = build_wav(44_100, 1, &samples);
    let decoder = SymphoniaDecoder::default();

    let audio = decoder.decode(&wav).expect("decode should succeed");

    let expected = (44_100f64 * 16_000.0 / 44_100.0).round() as usize;
    let diff = audio.samples.len().abs_diff(expected);
    assert!(
        diff <= 1,
        "expected ~{} samples, got {}",
        expected,
        audio.samples.len()
    );
}

#[test]
fn given_same_bytes_when_decoding_twice_then_output_is_bit_identical() {
    let samples: Vec<i16> = (0..8_000).map(|i| ((i % 200) * 100 - 10_000) as i16).collect();
    let wav = build_wav(22_050, 1, &samples);
    let decoder = SymphoniaDecoder::default();

    let first = decoder.decode(&wav).expect("decode should succeed");
    let second = decoder.decode(&wav).expect("decode should succeed");

    assert_eq!(first, second);
}

#[test]
fn given_garbage_bytes_when_decoding_then_returns_unsupported_format() {
    let garbage = vec![0xA5u8; 256];
    let decoder = SymphoniaDecoder::default();

    let result = decoder.decode(&garbage);

    assert!(matches!(result, Err(AudioDecoderError::UnsupportedFormat(_))));
}

#[test]
fn given_empty_bytes_when_decoding_then_returns_unsupported_format() {
    let decoder = SymphoniaDecoder::default();

    let result = decoder.decode(&[]);

    assert!(matches!(result, Err(AudioDecoderError::UnsupportedFormat(_))));
}

#[test]
fn given_wav_with_no_frames_when_decoding_then_returns_empty_audio() {
    let wav = build_wav(16_000, 1, &[]);
    let decoder = SymphoniaDecoder::default();

    let result = decoder.decode(&wav);

    assert!(matches!(result, Err(AudioDecoderError::EmptyAudio)));
}
