//! Indicator computation, delegated to the `ta` crate where it has coverage.

use crate::bars::BarSeries;
use ta::Next;
use ta::indicators::{Maximum, Minimum, RelativeStrengthIndex};

/// Latest RSI over a close-price sequence (Wilder smoothing, `ta` default).
/// `None` when there are fewer closes than the period needs.
pub fn latest_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period {
        return None;
    }
    let mut rsi = RelativeStrengthIndex::new(period).ok()?;

    let mut last_rsi: Option<f64> = None;
    for &price in closes {
        last_rsi = Some(rsi.next(price));
    }
    last_rsi
}

/// Rolling support/resistance: windowed min of lows and max of highs,
/// reading only the latest values.
pub fn support_resistance(series: &BarSeries, window: usize) -> Option<(f64, f64)> {
    let mut min = Minimum::new(window).ok()?;
    let mut max = Maximum::new(window).ok()?;

    let mut levels: Option<(f64, f64)> = None;
    for bar in series.bars() {
        levels = Some((min.next(bar.low), max.next(bar.high)));
    }
    levels
}

/// Result of the volume-spike check on the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeCheck {
    pub spiked: bool,
    pub current: f64,
    pub average: f64,
}

/// Compare the last volume against the average of everything before it.
/// A spike requires strictly exceeding `average * multiplier`; needs at
/// least two volumes.
pub fn volume_spike(volumes: &[f64], multiplier: f64) -> Option<VolumeCheck> {
    let (&current, prior) = volumes.split_last()?;
    if prior.is_empty() {
        return None;
    }
    let average = prior.iter().sum::<f64>() / prior.len() as f64;
    Some(VolumeCheck {
        spiked: current > average * multiplier,
        current,
        average,
    })
}
