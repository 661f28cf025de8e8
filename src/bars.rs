//! OHLCV bar model and the lenient decoding used for provider kline rows.

use serde_json::Value;

/// One sampling interval of price and volume. Immutable once decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Body size as a fraction of the full range. Zero for degenerate bars.
    pub fn body_pct(&self) -> f64 {
        if self.range() > 0.0 {
            self.body() / self.range()
        } else {
            0.0
        }
    }

    /// Decode one kline row from the positional array format:
    /// `[openTime, open, high, low, close, volume, ...]`.
    /// A row missing any of the six leading fields is dropped.
    pub fn from_kline_row(row: &[Value]) -> Option<Bar> {
        Some(Bar {
            timestamp_ms: row.first()?.as_i64()?,
            open: lenient_f64(row.get(1)?)?,
            high: lenient_f64(row.get(2)?)?,
            low: lenient_f64(row.get(3)?)?,
            close: lenient_f64(row.get(4)?)?,
            volume: lenient_f64(row.get(5)?)?,
        })
    }
}

/// Providers send numeric fields as either JSON numbers or quoted strings.
/// Accept both; blanks and nulls decode to `None`.
pub fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

/// Bars for one symbol, ascending by timestamp with no duplicate timestamps.
/// Owned by the scan that fetched it and discarded after rendering.
#[derive(Debug, Clone)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, enforcing the ordering invariant. Duplicate
    /// timestamps keep the later-seen row.
    pub fn from_bars(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp_ms);
        bars.reverse();
        bars.dedup_by_key(|b| b.timestamp_ms);
        bars.reverse();
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar {
            timestamp_ms: ts,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn series_sorts_and_dedups_timestamps() {
        let series = BarSeries::from_bars(
            "TEST",
            vec![bar(3, 30.0), bar(1, 10.0), bar(2, 20.0), bar(2, 25.0)],
        );
        let timestamps: Vec<i64> = series.bars().iter().map(|b| b.timestamp_ms).collect();
        assert_eq!(timestamps, vec![1, 2, 3]);
        // Later-seen row wins on a duplicate timestamp.
        assert_eq!(series.bars()[1].close, 25.0);
    }

    #[test]
    fn kline_row_accepts_strings_and_numbers() {
        let row = json!([1700000000000i64, "101.5", 103, "100.0", "102.25", "5000"]);
        let b = Bar::from_kline_row(row.as_array().unwrap()).unwrap();
        assert_eq!(b.open, 101.5);
        assert_eq!(b.high, 103.0);
        assert_eq!(b.close, 102.25);
        assert_eq!(b.volume, 5000.0);
    }

    #[test]
    fn malformed_kline_row_is_dropped() {
        let row = json!([1700000000000i64, "", 103, "100.0", "102.25", "5000"]);
        assert!(Bar::from_kline_row(row.as_array().unwrap()).is_none());
        let short = json!([1700000000000i64, "101.5"]);
        assert!(Bar::from_kline_row(short.as_array().unwrap()).is_none());
    }

    #[test]
    fn candle_geometry() {
        let b = Bar {
            timestamp_ms: 0,
            open: 10.0,
            high: 14.0,
            low: 9.0,
            close: 12.0,
            volume: 0.0,
        };
        assert_eq!(b.body(), 2.0);
        assert_eq!(b.upper_wick(), 2.0);
        assert_eq!(b.lower_wick(), 1.0);
        assert_eq!(b.range(), 5.0);
        assert!(b.is_bullish());
        assert_eq!(b.body_pct(), 0.4);
    }
}
