use std::f32::consts::TAU;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hypno_pattern::{AudioError, PcmSender};

pub const SAMPLE_RATE: u32 = 44_100;
pub const BLOCK_LEN: usize = 512;

/// Sine oscillator that produces PCM blocks with a continuous phase.
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    frequency: f32,
    sample_rate: f32,
    phase: f32,
}

impl ToneGenerator {
    pub fn new(frequency: f32, sample_rate: u32) -> Self {
        Self {
            frequency: frequency.max(0.0),
            sample_rate: sample_rate.max(1) as f32,
            phase: 0.0,
        }
    }

    pub fn next_block(&mut self, len: usize) -> Vec<f32> {
        let step = TAU * self.frequency / self.sample_rate;
        (0..len)
            .map(|_| {
                let sample = self.phase.sin() * 0.5;
                self.phase = (self.phase + step) % TAU;
                sample
            })
            .collect()
    }
}

/// Synthetic capture device: a background thread pushing a sine tone
/// into the analyser at real-time pace.
pub struct ToneCapture {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ToneCapture {
    pub fn start(sender: PcmSender, frequency: f32) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let mut tone = ToneGenerator::new(frequency, SAMPLE_RATE);
        let block_time = Duration::from_secs_f64(BLOCK_LEN as f64 / SAMPLE_RATE as f64);

        let thread = thread::Builder::new()
            .name("tone-capture".into())
            .spawn(move || {
                while flag.load(Ordering::Relaxed) {
                    match sender.send(tone.next_block(BLOCK_LEN)) {
                        Ok(()) => {}
                        Err(AudioError::Disconnected) => {
                            log::debug!("analyser dropped, stopping tone capture");
                            break;
                        }
                        Err(e) => {
                            log::warn!("tone capture failed: {e}");
                            break;
                        }
                    }
                    thread::sleep(block_time);
                }
                flag.store(false, Ordering::Relaxed);
            })?;

        log::info!("tone capture started at {frequency} Hz");
        Ok(Self {
            running,
            thread: Some(thread),
        })
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

impl Drop for ToneCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
