//! One display's worth of scaling state. The waveform and the spectrum each get their own scaler.
use crate::audio::{AdaptiveScaler, ExponentialSmoother, StreamAggregator, WaveformLanes};
use crate::config::SessionConfig;
use crate::errors::ScaleResult;
use crate::logging::info;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScopeSession<const LANES: usize> {
    config: SessionConfig,
    lanes: WaveformLanes<LANES>,
    spectrum: StreamAggregator,
}

impl<const LANES: usize> ScopeSession<LANES> {
    pub fn new(config: SessionConfig) -> ScaleResult<Self> {
        let (lanes, spectrum) = Self::build(&config)?;

        info!("new session with {} lanes", LANES);

        Ok(Self {
            config,
            lanes,
            spectrum,
        })
    }

    fn build(config: &SessionConfig) -> ScaleResult<(WaveformLanes<LANES>, StreamAggregator)> {
        let waveform_scaler = AdaptiveScaler::try_new(
            config.waveform_offset,
            config.waveform_factor,
            config.scale,
        )?;

        let centroid_scaler = AdaptiveScaler::try_new(
            config.centroid_offset,
            config.centroid_factor,
            config.scale,
        )?;

        let smoother = ExponentialSmoother::try_new(config.smoothing_weight)?;

        Ok((
            WaveformLanes::new(waveform_scaler),
            StreamAggregator::new(centroid_scaler, smoother),
        ))
    }

    /// scale a frame of time domain bytes into the lanes
    pub fn on_waveform(&mut self, frame: &[u8]) -> &[f64; LANES] {
        self.lanes.update(frame)
    }

    /// reduce a frame of frequency bins to its smoothed, scaled centroid. None for silence
    pub fn on_frequency(&mut self, bins: &[u8]) -> Option<f64> {
        self.spectrum.update(bins.iter().map(|&x| x as f64))
    }

    /// forget everything learned so far and start over from the config
    ///
    /// On error the session keeps its current state.
    pub fn reset(&mut self) -> ScaleResult<()> {
        let (lanes, spectrum) = Self::build(&self.config)?;

        self.lanes = lanes;
        self.spectrum = spectrum;

        info!("session reset");

        Ok(())
    }

    pub fn lanes(&self) -> &WaveformLanes<LANES> {
        &self.lanes
    }

    pub fn spectrum(&self) -> &StreamAggregator {
        &self.spectrum
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
