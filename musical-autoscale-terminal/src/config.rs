use std::env;
use std::str::FromStr;

use anyhow::{Context, ensure};

/// settings for the terminal driver. read from `AUTOSCALE_*` environment variables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverConfig {
    pub frames_per_second: u32,
    /// stop after this many frames. 0 runs forever
    pub frames: u64,
    /// 32 is the smallest size that still looks good. gives 32 waveform samples and 16 bins
    pub fft_size: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 60,
            frames: 600,
            fft_size: 32,
        }
    }
}

impl DriverConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// `lookup` returns the raw value of a variable if it is set
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut x = Self::default();

        if let Some(fps) = parse_var(&lookup, "AUTOSCALE_FPS")? {
            x.frames_per_second = fps;
        }
        if let Some(frames) = parse_var(&lookup, "AUTOSCALE_FRAMES")? {
            x.frames = frames;
        }
        if let Some(fft_size) = parse_var(&lookup, "AUTOSCALE_FFT_SIZE")? {
            x.fft_size = fft_size;
        }

        ensure!(x.frames_per_second > 0, "AUTOSCALE_FPS must be positive");
        ensure!(
            x.fft_size >= 2 && x.fft_size.is_power_of_two(),
            "AUTOSCALE_FFT_SIZE must be a power of two. got {}",
            x.fft_size
        );

        Ok(x)
    }

    pub fn bins(&self) -> usize {
        self.fft_size / 2
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(name)
        .map(|x| {
            x.trim()
                .parse::<T>()
                .with_context(|| format!("invalid {name}: {x:?}"))
        })
        .transpose()
}
