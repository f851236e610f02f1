//! Short-time Fourier transform
//!
//! Frames are centered (zero padding of `frame_size / 2` on both sides),
//! windowed with a periodic Hann window and zero-padded to the next power of
//! two before the FFT.

use std::f64::consts::PI;

/// Magnitude spectrogram of a waveform
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// `[num_frames][num_bins]` magnitudes, `num_bins = fft_size / 2 + 1`
    pub frames: Vec<Vec<f64>>,
    pub fft_size: usize,
    pub sample_rate: u32,
}

impl Spectrogram {
    /// Compute the magnitude spectrogram of `samples`
    pub fn compute(samples: &[f32], sample_rate: u32, frame_size: usize, hop_size: usize) -> Self {
        let frame_size = frame_size.max(1);
        let hop_size = hop_size.max(1);
        let fft_size = frame_size.next_power_of_two();
        let num_bins = fft_size / 2 + 1;
        let window = hann_window(frame_size);

        let pad = frame_size / 2;
        let mut padded = vec![0.0f64; pad];
        padded.extend(samples.iter().map(|&s| s as f64));
        padded.extend(std::iter::repeat(0.0).take(pad));
        if padded.len() < frame_size {
            padded.resize(frame_size, 0.0);
        }

        let num_frames = 1 + (padded.len() - frame_size) / hop_size;
        let mut frames = Vec::with_capacity(num_frames);
        let mut buf = vec![(0.0f64, 0.0f64); fft_size];

        for f in 0..num_frames {
            let offset = f * hop_size;
            for v in buf.iter_mut() {
                *v = (0.0, 0.0);
            }
            for i in 0..frame_size {
                buf[i] = (padded[offset + i] * window[i], 0.0);
            }

            fft(&mut buf);

            let mags: Vec<f64> = buf[..num_bins]
                .iter()
                .map(|&(re, im)| (re * re + im * im).sqrt())
                .collect();
            frames.push(mags);
        }

        Self {
            frames,
            fft_size,
            sample_rate,
        }
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Center frequency of bin `k` in Hz
    #[inline]
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * self.sample_rate as f64 / self.fft_size as f64
    }

    /// Power spectrum (squared magnitudes) of one frame
    pub fn power(&self, frame: usize) -> Vec<f64> {
        self.frames[frame].iter().map(|m| m * m).collect()
    }

    /// Magnitude spectrum averaged over all frames
    pub fn mean_magnitudes(&self) -> Vec<f64> {
        let mut mean = vec![0.0f64; self.num_bins()];
        if self.frames.is_empty() {
            return mean;
        }
        for frame in &self.frames {
            for (acc, &m) in mean.iter_mut().zip(frame.iter()) {
                *acc += m;
            }
        }
        let n = self.frames.len() as f64;
        for v in mean.iter_mut() {
            *v /= n;
        }
        mean
    }
}

/// Periodic Hann window
fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

/// In-place iterative Cooley-Tukey FFT on `(re, im)` pairs
///
/// Length must be a power of two.
pub(crate) fn fft(x: &mut [(f64, f64)]) {
    let n = x.len();
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            x.swap(i, j);
        }
    }

    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let angle = -2.0 * PI / size as f64;
        let wn = (angle.cos(), angle.sin());
        let mut start = 0;
        while start < n {
            let mut w = (1.0, 0.0);
            for k in 0..half {
                let u = x[start + k];
                let v = x[start + k + half];
                let t = (w.0 * v.0 - w.1 * v.1, w.0 * v.1 + w.1 * v.0);
                x[start + k] = (u.0 + t.0, u.1 + t.1);
                x[start + k + half] = (u.0 - t.0, u.1 - t.1);
                w = (w.0 * wn.0 - w.1 * wn.1, w.0 * wn.1 + w.1 * wn.0);
            }
            start += size;
        }
        size <<= 1;
    }
}
