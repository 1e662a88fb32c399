//! Magnetization observations from a Metropolis run.

use serde::Serialize;

/// Ordered magnetization samples, one per evaluated flip decision.
///
/// Values lie in `[-1, 1]`. Draws that hit a pinned node record nothing,
/// so a run's history can be shorter than its step count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MagnetizationHistory {
    samples: Vec<f64>,
}

impl MagnetizationHistory {
    pub(crate) fn with_capacity(steps: usize) -> Self {
        Self {
            samples: Vec::with_capacity(steps),
        }
    }

    pub(crate) fn push(&mut self, value: f64) {
        self.samples.push(value);
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample was recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples in draw order.
    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// The most recent sample, if any.
    pub fn last(&self) -> Option<f64> {
        self.samples.last().copied()
    }

    /// Steady-state window: the second half of the samples.
    pub fn steady_state(&self) -> &[f64] {
        &self.samples[self.samples.len() / 2..]
    }

    /// Mean of the final `window` samples, or of the whole history when it
    /// is shorter. `0.0` for an empty history or a zero window.
    pub fn tail_mean(&self, window: usize) -> f64 {
        if self.samples.is_empty() || window == 0 {
            return 0.0;
        }
        let tail = &self.samples[self.samples.len().saturating_sub(window)..];
        tail.iter().sum::<f64>() / tail.len() as f64
    }
}

impl From<Vec<f64>> for MagnetizationHistory {
    fn from(samples: Vec<f64>) -> Self {
        Self { samples }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steady_state_is_second_half() {
        let hist = MagnetizationHistory::from(vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(hist.steady_state(), &[0.3, 0.4, 0.5]);

        let empty = MagnetizationHistory::default();
        assert!(empty.steady_state().is_empty());
    }

    #[test]
    fn test_tail_mean_windows() {
        let hist = MagnetizationHistory::from(vec![1.0, 0.0, 0.5, 0.5]);
        assert!((hist.tail_mean(2) - 0.5).abs() < 1e-12);
        assert!((hist.tail_mean(100) - 0.5).abs() < 1e-12);
        assert_eq!(hist.tail_mean(0), 0.0);
        assert_eq!(MagnetizationHistory::default().tail_mean(10), 0.0);
    }

    #[test]
    fn test_last_and_len() {
        let hist = MagnetizationHistory::from(vec![-0.2, 0.6]);
        assert_eq!(hist.len(), 2);
        assert_eq!(hist.last(), Some(0.6));
        assert_eq!(MagnetizationHistory::default().last(), None);
    }
}
