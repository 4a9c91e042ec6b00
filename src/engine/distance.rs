//! Route distance: driving estimate with a great-circle fallback.

use std::sync::Arc;

use super::services::DistanceService;
use super::types::{Coordinate, DistanceMethod, DistanceResult};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Computes the distance label between two resolved coordinates.
pub struct DistanceCalculator {
    service: Arc<dyn DistanceService>,
    offline: bool,
}

impl DistanceCalculator {
    pub fn new(service: Arc<dyn DistanceService>) -> Self {
        Self {
            service,
            offline: false,
        }
    }

    /// Set offline mode — straight-line estimates only.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Total: any backend failure degrades to the straight-line estimate,
    /// so the caller always gets a distance for two resolved points.
    pub fn compute(&self, a: Coordinate, b: Coordinate) -> DistanceResult {
        if !self.offline {
            match self.service.driving_distance(a, b) {
                Ok(estimate) => {
                    return DistanceResult {
                        text: format!(
                            "{} (about {} driving)",
                            estimate.distance_text, estimate.duration_text
                        ),
                        method: DistanceMethod::Driving,
                    };
                }
                Err(e) => {
                    eprintln!("  Warning: distance backend failed ({}), using straight line", e);
                }
            }
        }

        DistanceResult {
            text: format!("{:.1} km (straight line)", haversine_km(a, b)),
            method: DistanceMethod::Haversine,
        }
    }
}

/// Great-circle distance in kilometers via the haversine formula.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::services::mock::{FailingDistance, FixedDistance};
    use crate::engine::services::DrivingEstimate;
    use approx::assert_relative_eq;

    const COLOMBO: Coordinate = Coordinate::new(6.9271, 79.8612);
    const KANDY: Coordinate = Coordinate::new(7.2906, 80.6337);

    #[test]
    fn test_haversine_colombo_to_kandy() {
        let d = haversine_km(COLOMBO, KANDY);
        assert_relative_eq!(d, 94.34, epsilon = 0.5);
    }

    #[test]
    fn test_haversine_symmetric_and_zero() {
        assert_relative_eq!(
            haversine_km(COLOMBO, KANDY),
            haversine_km(KANDY, COLOMBO),
            epsilon = 1e-9
        );
        assert_relative_eq!(haversine_km(COLOMBO, COLOMBO), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_haversine_deterministic() {
        assert_eq!(haversine_km(COLOMBO, KANDY), haversine_km(COLOMBO, KANDY));
    }

    #[test]
    fn test_compute_driving() {
        let calc = DistanceCalculator::new(Arc::new(FixedDistance(DrivingEstimate {
            distance_text: "115.2 km".into(),
            duration_text: "2 h 45 min".into(),
        })));
        let result = calc.compute(COLOMBO, KANDY);
        assert_eq!(result.method, DistanceMethod::Driving);
        assert_eq!(result.text, "115.2 km (about 2 h 45 min driving)");
    }

    #[test]
    fn test_compute_falls_back_to_haversine() {
        let calc = DistanceCalculator::new(Arc::new(FailingDistance));
        let result = calc.compute(COLOMBO, KANDY);
        assert_eq!(result.method, DistanceMethod::Haversine);
        assert!(result.text.ends_with("km (straight line)"), "{}", result.text);

        let km: f64 = result
            .text
            .split_whitespace()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert_relative_eq!(km, haversine_km(COLOMBO, KANDY), epsilon = 0.06);
    }

    #[test]
    fn test_compute_offline_skips_backend() {
        let mut calc = DistanceCalculator::new(Arc::new(FixedDistance(DrivingEstimate {
            distance_text: "1 km".into(),
            duration_text: "1 min".into(),
        })));
        calc.set_offline(true);
        let result = calc.compute(COLOMBO, KANDY);
        assert_eq!(result.method, DistanceMethod::Haversine);
    }
}
