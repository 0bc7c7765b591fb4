// Mini sparklines: value-only sliding windows
use super::Synchronizer;
use crate::domain::history::HistoryBuffer;
use crate::error::SyncResult;
use serde::Serialize;

/// Value the window is filled with before any reading arrives.
pub const SPARKLINE_BASELINE: f64 = 50.0;

pub fn new_window(width: usize) -> SyncResult<HistoryBuffer<f64>> {
    HistoryBuffer::filled(width, SPARKLINE_BASELINE)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SparklineView {
    pub values: Vec<f64>,
    pub min: f64,
    pub max: f64,
}

impl Default for SparklineView {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            min: 0.0,
            max: 100.0,
        }
    }
}

pub struct Sparkline;

impl Synchronizer for Sparkline {
    type Input = HistoryBuffer<f64>;
    type View = SparklineView;

    fn project(&self, input: &HistoryBuffer<f64>) -> SparklineView {
        SparklineView {
            values: input.snapshot(),
            ..SparklineView::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eleven_pushes_keep_last_ten() {
        let mut window = new_window(10).unwrap();
        assert_eq!(Sparkline.project(&window).values, vec![SPARKLINE_BASELINE; 10]);

        let values: Vec<f64> = (1..=11).map(|v| v as f64 * 3.5).collect();
        for v in &values {
            window.append_bounded(*v);
        }
        assert_eq!(Sparkline.project(&window).values, values[1..].to_vec());
    }
}
