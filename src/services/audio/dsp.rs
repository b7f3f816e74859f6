//! Simplified preprocessing chain applied to every extracted PCM segment,
//! in the fixed order the extraction adapter's contract specifies:
//! high-pass filter, loudness normalization, noise suppression, compander,
//! peak limiter.

/// One-pole high-pass filter, cutoff ~80 Hz, to remove rumble/DC offset
/// below the dialogue band.
pub fn high_pass_filter(samples: &mut [f32], sample_rate: u32, cutoff_hz: f32) {
    if samples.is_empty() {
        return;
    }
    let rc = 1.0 / (2.0 * std::f32::consts::PI * cutoff_hz);
    let dt = 1.0 / sample_rate as f32;
    let alpha = rc / (rc + dt);

    let mut prev_in = samples[0];
    let mut prev_out = 0.0f32;
    for sample in samples.iter_mut() {
        let input = *sample;
        let output = alpha * (prev_out + input - prev_in);
        prev_in = input;
        prev_out = output;
        *sample = output;
    }
}

/// Scale the signal so its RMS level approximates -16 dB LUFS-equivalent
/// integrated loudness. A simplified stand-in for full ITU-R BS.1770
/// loudness measurement, adequate for leveling speech samples before ASR.
pub fn normalize_loudness(samples: &mut [f32], target_db: f32) {
    if samples.is_empty() {
        return;
    }
    let rms = (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt();
    if rms <= 1e-9 {
        return;
    }
    let target_rms = 10f32.powf(target_db / 20.0);
    let gain = target_rms / rms;
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
}

/// Spectral-noise-suppression stand-in: a light moving-average smoother
/// that attenuates broadband hiss above the dialogue band without a full
/// FFT-based noise gate.
pub fn suppress_noise(samples: &mut [f32]) {
    if samples.len() < 3 {
        return;
    }
    let original = samples.to_vec();
    for i in 1..samples.len() - 1 {
        samples[i] = 0.25 * original[i - 1] + 0.5 * original[i] + 0.25 * original[i + 1];
    }
}

/// Gentle compander: soft-knee compression that reduces dynamic range
/// before the limiter, so quiet dialogue isn't lost under the RMS gain
/// from normalization.
pub fn compand(samples: &mut [f32], threshold: f32, ratio: f32) {
    for sample in samples.iter_mut() {
        let magnitude = sample.abs();
        if magnitude > threshold {
            let excess = magnitude - threshold;
            let compressed = threshold + excess / ratio;
            *sample = compressed * sample.signum();
        }
    }
}

/// Hard peak limiter: clamps any sample exceeding `ceiling` in magnitude.
pub fn limit(samples: &mut [f32], ceiling: f32) {
    for sample in samples.iter_mut() {
        *sample = sample.clamp(-ceiling, ceiling);
    }
}

/// Run the full chain in the order the contract specifies.
pub fn process(samples: &mut [f32], sample_rate: u32) {
    high_pass_filter(samples, sample_rate, 80.0);
    normalize_loudness(samples, -16.0);
    suppress_noise(samples);
    compand(samples, 0.7, 4.0);
    limit(samples, 0.98);
}
