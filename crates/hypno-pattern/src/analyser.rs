//! Frequency-domain analysis of captured PCM, shaped like a browser analyser node:
//! Blackman window, FFT, magnitude smoothing over time, decibel output.

use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::TAU;
use std::sync::Arc;

use crate::audio::{AudioError, FrequencySource};

pub const DEFAULT_FFT_SIZE: usize = 256;
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;
pub const MIN_DECIBELS: f32 = -100.0;
/// PCM blocks buffered between the capture thread and the frame loop.
const PCM_QUEUE_CAPACITY: usize = 32;

pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    history: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    decibels: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new(fft_size: usize) -> Result<Self, AudioError> {
        if fft_size < 32 || !fft_size.is_power_of_two() {
            return Err(AudioError::InvalidFftSize(fft_size));
        }
        let bins = fft_size / 2;
        Ok(Self {
            fft: FftPlanner::new().plan_fft_forward(fft_size),
            window: blackman(fft_size),
            history: vec![0.0; fft_size],
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; bins],
            decibels: vec![MIN_DECIBELS; bins],
        })
    }

    /// Number of frequency bins, half the FFT size.
    pub fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Append PCM, keeping only the most recent FFT-size samples.
    pub fn push_samples(&mut self, samples: &[f32]) {
        let size = self.history.len();
        if samples.len() >= size {
            self.history.copy_from_slice(&samples[samples.len() - size..]);
        } else {
            self.history.rotate_left(samples.len());
            self.history[size - samples.len()..].copy_from_slice(samples);
        }
    }

    /// Run one analysis pass over the current window and return the spectrum in dB.
    pub fn analyse(&mut self) -> &[f32] {
        let size = self.history.len();
        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(&self.history).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let norm = 1.0 / size as f32;
        let tau = SMOOTHING_TIME_CONSTANT;
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.scratch[k].norm() * norm;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            self.decibels[k] = to_decibels(*smoothed);
        }
        &self.decibels
    }

    /// Spectrum from the last analysis pass.
    pub fn decibels(&self) -> &[f32] {
        &self.decibels
    }
}

fn to_decibels(magnitude: f32) -> f32 {
    if magnitude <= 0.0 {
        MIN_DECIBELS
    } else {
        (20.0 * magnitude.log10()).max(MIN_DECIBELS)
    }
}

/// Blackman window with α = 0.16.
fn blackman(size: usize) -> Vec<f32> {
    let (a0, a1, a2) = (0.42, 0.5, 0.08);
    (0..size)
        .map(|i| {
            let x = i as f32 / size as f32;
            a0 - a1 * (TAU * x).cos() + a2 * (2.0 * TAU * x).cos()
        })
        .collect()
}

/// Capture-side handle: pushes PCM blocks toward the analyser.
#[derive(Clone)]
pub struct PcmSender {
    tx: Sender<Vec<f32>>,
}

impl PcmSender {
    /// Queue a block. A full queue drops the block; only a dropped analyser is an error.
    pub fn send(&self, block: Vec<f32>) -> Result<(), AudioError> {
        match self.tx.try_send(block) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                log::debug!("pcm queue full, dropping block");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(AudioError::Disconnected),
        }
    }
}

/// Frame-side frequency source fed by a [`PcmSender`].
pub struct AnalyserSource {
    rx: Receiver<Vec<f32>>,
    analyser: SpectrumAnalyser,
    received: bool,
}

impl FrequencySource for AnalyserSource {
    fn latest(&mut self) -> &[f32] {
        let mut fresh = false;
        while let Ok(block) = self.rx.try_recv() {
            self.analyser.push_samples(&block);
            fresh = true;
        }
        if fresh {
            self.received = true;
            self.analyser.analyse();
        }
        if self.received {
            self.analyser.decibels()
        } else {
            &[]
        }
    }
}

/// Create a connected capture handle and analyser source.
pub fn analyser_channel(fft_size: usize) -> Result<(PcmSender, AnalyserSource), AudioError> {
    let analyser = SpectrumAnalyser::new(fft_size)?;
    let (tx, rx) = bounded(PCM_QUEUE_CAPACITY);
    Ok((
        PcmSender { tx },
        AnalyserSource {
            rx,
            analyser,
            received: false,
        },
    ))
}
