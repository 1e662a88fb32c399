//! Susceptibility estimation from magnetization fluctuations.

use ndarray::ArrayView1;

use crate::dynamics::MagnetizationHistory;
use crate::error::{PolarityError, Result};

/// Social susceptibility: `variance(steady-state window) * n_users / T`.
///
/// The window is the second half of the history, past the initial
/// transient. High values flag a network whose aggregate opinion is
/// fluctuating hard, the signature of a nearby tipping point. An empty
/// history yields `0.0`; `T <= 0` is rejected.
pub fn susceptibility(
    history: &MagnetizationHistory,
    n_users: usize,
    temperature: f64,
) -> Result<f64> {
    if temperature <= 0.0 {
        return Err(PolarityError::InvalidTemperature(temperature));
    }
    if history.is_empty() {
        return Ok(0.0);
    }

    let window = ArrayView1::from(history.steady_state());
    let variance = window.var(0.0);
    Ok(variance * n_users as f64 / temperature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_yields_zero() {
        let chi = susceptibility(&MagnetizationHistory::default(), 100, 2.0).unwrap();
        assert_eq!(chi, 0.0);
    }

    #[test]
    fn test_constant_history_yields_zero() {
        let hist = MagnetizationHistory::from(vec![0.4; 50]);
        let chi = susceptibility(&hist, 100, 2.0).unwrap();
        assert_eq!(chi, 0.0);
    }

    #[test]
    fn test_alternating_window_scales_with_population() {
        // Steady-state window is {1, -1}: population variance 1.
        let hist = MagnetizationHistory::from(vec![0.0, 0.0, 1.0, -1.0]);
        let chi = susceptibility(&hist, 10, 2.0).unwrap();
        assert!((chi - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_transient_half_is_ignored() {
        // A noisy first half must not contribute to the estimate.
        let hist = MagnetizationHistory::from(vec![1.0, -1.0, 1.0, -1.0, 0.2, 0.2, 0.2, 0.2]);
        let chi = susceptibility(&hist, 100, 1.0).unwrap();
        assert_eq!(chi, 0.0);
    }

    #[test]
    fn test_non_positive_temperature_rejected() {
        let hist = MagnetizationHistory::from(vec![0.1, 0.2]);
        assert!(matches!(
            susceptibility(&hist, 10, 0.0),
            Err(PolarityError::InvalidTemperature(_))
        ));
        assert!(susceptibility(&hist, 10, -2.0).is_err());
    }
}
