use std::f64::consts::TAU;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, trace};

use crate::{DriverConfig, Frame};

/// Anything that can hand out one waveform frame and one frequency frame at a time.
///
/// A microphone and an FFT would go here. The synthetic source stands in for them.
pub trait FrameSource {
    /// (time domain bytes, frequency bins)
    fn next_frames(&mut self) -> (Vec<u8>, Vec<u8>);
}

/// A tone whose loudness and pitch drift slowly, with a stretch of silence every so often.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    fft_size: usize,
    frame: u64,
}

/// frames per silence cycle, and how many of them at the end are quiet
const SILENCE_PERIOD: u64 = 240;
const SILENCE_FRAMES: u64 = 20;

impl SyntheticSource {
    pub fn new(fft_size: usize) -> Self {
        Self { fft_size, frame: 0 }
    }

    pub fn is_silent(frame: u64) -> bool {
        frame % SILENCE_PERIOD >= SILENCE_PERIOD - SILENCE_FRAMES
    }
}

impl FrameSource for SyntheticSource {
    fn next_frames(&mut self) -> (Vec<u8>, Vec<u8>) {
        let t = self.frame as f64;
        let silent = Self::is_silent(self.frame);

        self.frame += 1;

        let num_bins = (self.fft_size / 2).max(1);

        if silent {
            return (vec![128; self.fft_size], vec![0; num_bins]);
        }

        // 0.2..1.0, slowly
        let loudness = 0.6 + 0.4 * (t * 0.013).sin();
        let amplitude = 100.0 * loudness;
        let cycles = 3.0;

        let waveform = (0..self.fft_size)
            .map(|k| {
                let phase = TAU * cycles * k as f64 / self.fft_size as f64 + t * 0.3;

                (128.0 + amplitude * phase.sin()).round().clamp(0.0, 255.0) as u8
            })
            .collect();

        // the peak wanders between the low and the high end of the spectrum
        let center = (num_bins - 1) as f64 * (0.5 + 0.4 * (t * 0.005).sin());

        let bins = (0..num_bins)
            .map(|i| {
                let d = i as f64 - center;

                (255.0 * loudness * (-d * d / 2.0).exp()).round() as u8
            })
            .collect();

        (waveform, bins)
    }
}

/// frames arriving on a channel at a fixed cadence
///
/// Dropping `stream` stops the producer thread after its next send.
pub struct FrameStream {
    pub stream: flume::Receiver<Frame>,
    handle: JoinHandle<u64>,
}

impl FrameStream {
    pub fn spawn<S>(mut source: S, config: &DriverConfig) -> anyhow::Result<Self>
    where
        S: FrameSource + Send + 'static,
    {
        // TODO: what capacity channel? a watch that drops stale frames might be better if the consumer lags
        let (tx, rx) = flume::bounded(2);

        let period = Duration::from_secs_f64(1.0 / config.frames_per_second as f64);
        let frames = config.frames;

        let handle = thread::Builder::new()
            .name("frames".to_string())
            .spawn(move || {
                let mut sent = 0;

                while frames == 0 || sent < frames {
                    let (waveform, bins) = source.next_frames();

                    trace!("sending {} samples and {} bins", waveform.len(), bins.len());

                    if tx.send(Frame::Waveform(waveform)).is_err()
                        || tx.send(Frame::Frequency(bins)).is_err()
                    {
                        debug!("receiver is gone");
                        break;
                    }

                    sent += 1;

                    thread::sleep(period);
                }

                info!("sent {} frames", sent);

                sent
            })?;

        Ok(Self { stream: rx, handle })
    }

    /// wait for the producer to finish. returns how many frames it sent
    pub fn join(self) -> anyhow::Result<u64> {
        drop(self.stream);

        self.handle
            .join()
            .map_err(|_| anyhow::anyhow!("frame thread panicked"))
    }
}
