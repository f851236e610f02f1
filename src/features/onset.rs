//! Onset detection for speaking-rate estimation

/// Peak-picking parameters, in frames
#[derive(Debug, Clone, Copy)]
pub struct PeakPicking {
    pub pre_max: usize,
    pub post_max: usize,
    pub pre_avg: usize,
    pub post_avg: usize,
    pub delta: f64,
    pub wait: usize,
}

impl Default for PeakPicking {
    fn default() -> Self {
        Self {
            pre_max: 1,
            post_max: 1,
            pre_avg: 4,
            post_avg: 5,
            delta: 0.07,
            wait: 1,
        }
    }
}

/// Onset strength envelope from a dB mel spectrogram
///
/// Mean positive first difference across bands, normalized to `[0, 1]`.
/// A flat spectrogram gives an all-zero envelope.
pub fn onset_envelope(mel_db: &[Vec<f64>]) -> Vec<f64> {
    if mel_db.is_empty() {
        return Vec::new();
    }

    let mut env = Vec::with_capacity(mel_db.len());
    env.push(0.0);
    for pair in mel_db.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let bands = cur.len().max(1) as f64;
        let flux: f64 = cur
            .iter()
            .zip(prev.iter())
            .map(|(c, p)| (c - p).max(0.0))
            .sum();
        env.push(flux / bands);
    }

    let min = env.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = env.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range < 1e-9 {
        return vec![0.0; env.len()];
    }
    env.iter().map(|v| (v - min) / range).collect()
}

/// Frame indices of detected onsets
pub fn pick_peaks(env: &[f64], params: &PeakPicking) -> Vec<usize> {
    let n = env.len();
    let mut onsets = Vec::new();
    let mut last: Option<usize> = None;

    for t in 0..n {
        let max_lo = t.saturating_sub(params.pre_max);
        let max_hi = (t + params.post_max + 1).min(n);
        let local_max = env[max_lo..max_hi].iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if env[t] < local_max {
            continue;
        }

        let avg_lo = t.saturating_sub(params.pre_avg);
        let avg_hi = (t + params.post_avg + 1).min(n);
        let window = &env[avg_lo..avg_hi];
        let local_avg = window.iter().sum::<f64>() / window.len() as f64;
        if env[t] < local_avg + params.delta {
            continue;
        }

        if let Some(prev) = last {
            if t <= prev + params.wait {
                continue;
            }
        }

        onsets.push(t);
        last = Some(t);
    }

    onsets
}

/// Onsets per minute
pub fn speaking_rate(onset_count: usize, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    onset_count as f64 / duration_secs * 60.0
}
