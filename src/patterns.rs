//! Candlestick pattern detectors over the most recent bar.
//!
//! Each detector returns a signed strength in the TA convention: +100 for a
//! bullish occurrence, -100 for a bearish one, 0 when absent. Two-bar shapes
//! also look at the previous bar. Degenerate bars (zero range) never match.

use crate::bars::{Bar, BarSeries};

/// A detected pattern on the last bar of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternHit {
    pub name: &'static str,
    pub strength: i32,
}

impl PatternHit {
    pub fn is_bullish(&self) -> bool {
        self.strength > 0
    }
}

type Detector = fn(Option<&Bar>, &Bar) -> i32;

const DETECTORS: &[(&str, Detector)] = &[
    ("Doji", doji),
    ("Hammer", hammer),
    ("Shooting Star", shooting_star),
    ("Marubozu", marubozu),
    ("Bullish Engulfing", bullish_engulfing),
    ("Bearish Engulfing", bearish_engulfing),
];

/// Run every detector against the last bar, recording non-zero results.
pub fn detect_all(series: &BarSeries) -> Vec<PatternHit> {
    let bars = series.bars();
    let Some(last) = bars.last() else {
        return Vec::new();
    };
    let prev = bars.len().checked_sub(2).map(|i| &bars[i]);

    DETECTORS
        .iter()
        .filter_map(|&(name, detect)| {
            let strength = detect(prev, last);
            (strength != 0).then_some(PatternHit { name, strength })
        })
        .collect()
}

// Body no more than a tenth of the range.
fn doji(_prev: Option<&Bar>, bar: &Bar) -> i32 {
    if bar.range() > 0.0 && bar.body_pct() <= 0.1 { 100 } else { 0 }
}

// Long lower shadow, small body near the top of the range.
fn hammer(_prev: Option<&Bar>, bar: &Bar) -> i32 {
    if bar.range() <= 0.0 || bar.body() <= 0.0 {
        return 0;
    }
    let long_tail = bar.lower_wick() >= 2.0 * bar.body();
    let small_head = bar.upper_wick() <= bar.body();
    if long_tail && small_head { 100 } else { 0 }
}

// Mirror of the hammer: long upper shadow, body near the bottom.
fn shooting_star(_prev: Option<&Bar>, bar: &Bar) -> i32 {
    if bar.range() <= 0.0 || bar.body() <= 0.0 {
        return 0;
    }
    let long_head = bar.upper_wick() >= 2.0 * bar.body();
    let small_tail = bar.lower_wick() <= bar.body();
    if long_head && small_tail { -100 } else { 0 }
}

// Body fills nearly the whole range; direction gives the sign.
fn marubozu(_prev: Option<&Bar>, bar: &Bar) -> i32 {
    if bar.range() <= 0.0 || bar.body_pct() < 0.95 {
        return 0;
    }
    if bar.is_bullish() {
        100
    } else if bar.is_bearish() {
        -100
    } else {
        0
    }
}

fn bullish_engulfing(prev: Option<&Bar>, bar: &Bar) -> i32 {
    let Some(prev) = prev else { return 0 };
    let engulfs = bar.open <= prev.close && bar.close >= prev.open && bar.body() > prev.body();
    if prev.is_bearish() && bar.is_bullish() && engulfs {
        100
    } else {
        0
    }
}

fn bearish_engulfing(prev: Option<&Bar>, bar: &Bar) -> i32 {
    let Some(prev) = prev else { return 0 };
    let engulfs = bar.open >= prev.close && bar.close <= prev.open && bar.body() > prev.body();
    if prev.is_bullish() && bar.is_bearish() && engulfs {
        -100
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp_ms: 0,
            open,
            high,
            low,
            close,
            volume: 0.0,
        }
    }

    fn series(bars: Vec<Bar>) -> BarSeries {
        let bars = bars
            .into_iter()
            .enumerate()
            .map(|(i, mut b)| {
                b.timestamp_ms = i as i64;
                b
            })
            .collect();
        BarSeries::from_bars("TEST", bars)
    }

    #[test]
    fn hammer_fires_on_long_lower_shadow() {
        // Small body near the top of the range, lower wick 3.5.
        let hits = detect_all(&series(vec![bar(13.0, 14.0, 9.5, 13.5)]));
        assert!(hits.iter().any(|h| h.name == "Hammer" && h.strength == 100));
    }

    #[test]
    fn shooting_star_is_bearish() {
        let hits = detect_all(&series(vec![bar(10.0, 14.0, 9.8, 9.9)]));
        assert!(
            hits.iter()
                .any(|h| h.name == "Shooting Star" && h.strength == -100)
        );
    }

    #[test]
    fn doji_on_tiny_body() {
        let hits = detect_all(&series(vec![bar(10.0, 11.0, 9.0, 10.05)]));
        assert!(hits.iter().any(|h| h.name == "Doji"));
    }

    #[test]
    fn engulfing_needs_previous_bar() {
        let up = bar(10.0, 10.5, 8.9, 9.0); // bearish
        let engulf = bar(8.9, 11.2, 8.8, 11.0); // bullish, wraps the prior body
        let hits = detect_all(&series(vec![up, engulf]));
        assert!(
            hits.iter()
                .any(|h| h.name == "Bullish Engulfing" && h.is_bullish())
        );

        // Alone, the same bar produces no engulfing hit.
        let hits = detect_all(&series(vec![bar(8.9, 11.2, 8.8, 11.0)]));
        assert!(!hits.iter().any(|h| h.name == "Bullish Engulfing"));
    }

    #[test]
    fn degenerate_bar_matches_nothing() {
        let hits = detect_all(&series(vec![bar(10.0, 10.0, 10.0, 10.0)]));
        assert!(hits.is_empty());
    }

    #[test]
    fn empty_series_matches_nothing() {
        assert!(detect_all(&series(Vec::new())).is_empty());
    }
}
