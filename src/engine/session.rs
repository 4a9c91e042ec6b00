//! Resolution session — resolves one (origin, destination) pair per
//! generation.
//!
//! Re-issuing an identical pair is a no-op; a different pair supersedes
//! any in-flight run by bumping the generation, and the stale run's
//! continuations are discarded by an identity check before every state
//! write. No locks are held across suspension points.

use std::sync::{Arc, Mutex};

use super::distance::{haversine_km, DistanceCalculator};
use super::resolver::AddressResolver;
use super::types::{
    AddressRole, Bounds, Coordinate, DistanceMethod, DistanceResult, EngineError,
    ResolutionResult, ResolveStrategy, SessionPhase, SessionSnapshot,
};

struct SessionState {
    generation: u64,
    pair: Option<(String, String)>,
    phase: SessionPhase,
    origin: Option<ResolutionResult>,
    destination: Option<ResolutionResult>,
    bounds: Option<Bounds>,
    distance: Option<DistanceResult>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            generation: 0,
            pair: None,
            phase: SessionPhase::Idle,
            origin: None,
            destination: None,
            bounds: None,
            distance: None,
        }
    }

    fn fold_bounds(&mut self, coord: Coordinate) {
        match self.bounds.as_mut() {
            Some(b) => b.extend(coord),
            None => self.bounds = Some(Bounds::around(coord)),
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let origin_coordinate = self.origin.as_ref().and_then(|r| r.coordinate);
        let destination_coordinate = self.destination.as_ref().and_then(|r| r.coordinate);
        SessionSnapshot {
            origin_coordinate,
            destination_coordinate,
            bounds: self.bounds,
            distance_text: self.distance.as_ref().map(|d| d.text.clone()),
            is_loading: self.phase == SessionPhase::Resolving,
            is_unresolved: origin_coordinate.is_none() && destination_coordinate.is_none(),
        }
    }
}

/// Stateful coordinator for resolving an address pair exactly once per
/// distinct input pair.
pub struct ResolutionSession {
    resolver: Arc<AddressResolver>,
    distance: Arc<DistanceCalculator>,
    state: Mutex<SessionState>,
}

impl ResolutionSession {
    pub fn new(resolver: Arc<AddressResolver>, distance: Arc<DistanceCalculator>) -> Self {
        Self {
            resolver,
            distance,
            state: Mutex::new(SessionState::new()),
        }
    }

    /// Resolve both addresses concurrently, fold bounds, then compute the
    /// distance once both coordinates exist.
    ///
    /// `Err` only on a fatal configuration error; the session drops back
    /// to `Idle` so the caller can degrade to raw address text.
    pub async fn resolve_pair(
        &self,
        origin: Option<&str>,
        destination: Option<&str>,
    ) -> Result<SessionSnapshot, EngineError> {
        let pair = (
            origin.unwrap_or("").trim().to_string(),
            destination.unwrap_or("").trim().to_string(),
        );

        let generation = {
            let mut st = self.state.lock().unwrap();

            // Identical pair already started or finished: no-op. This is
            // what keeps input-driven re-invocation from looping.
            if st.pair.as_ref() == Some(&pair) && st.phase != SessionPhase::Idle {
                return Ok(st.snapshot());
            }

            st.generation += 1;
            st.pair = Some(pair.clone());
            st.origin = None;
            st.destination = None;
            st.bounds = None;
            st.distance = None;

            if pair.0.is_empty() && pair.1.is_empty() {
                st.phase = SessionPhase::Idle;
                return Ok(st.snapshot());
            }

            st.phase = SessionPhase::Resolving;
            st.generation
        };

        // Concurrent resolution of both sides; a join, not a race. Each
        // side publishes its own result and bounds as soon as it
        // completes, so a mid-run snapshot already shows the faster one.
        let (origin_outcome, destination_outcome) = tokio::join!(
            self.resolve_side(pair.0.clone(), AddressRole::Origin, generation),
            self.resolve_side(pair.1.clone(), AddressRole::Destination, generation),
        );

        let (origin_coord, destination_coord) = match (origin_outcome, destination_outcome) {
            (Ok(o), Ok(d)) => (o, d),
            (Err(e), _) | (_, Err(e)) => {
                let mut st = self.state.lock().unwrap();
                if st.generation == generation {
                    st.phase = SessionPhase::Idle;
                }
                return Err(e);
            }
        };

        // Distance only after both sides completed with coordinates.
        if let (Some(a), Some(b)) = (origin_coord, destination_coord) {
            let calculator = Arc::clone(&self.distance);
            let result = tokio::task::spawn_blocking(move || calculator.compute(a, b))
                .await
                .unwrap_or_else(|_| DistanceResult {
                    text: format!("{:.1} km (straight line)", haversine_km(a, b)),
                    method: DistanceMethod::Haversine,
                });

            let mut st = self.state.lock().unwrap();
            if st.generation != generation {
                return Ok(st.snapshot());
            }
            st.distance = Some(result);
        }

        let mut st = self.state.lock().unwrap();
        if st.generation == generation {
            st.phase = SessionPhase::Resolved;
        }
        Ok(st.snapshot())
    }

    /// Resolve one side off the async executor and apply its result
    /// under the identity check. Returns the coordinate for the distance
    /// join, or `None` when the run has been superseded.
    async fn resolve_side(
        &self,
        input: String,
        role: AddressRole,
        generation: u64,
    ) -> Result<Option<Coordinate>, EngineError> {
        let resolver = Arc::clone(&self.resolver);
        let joined = tokio::task::spawn_blocking(move || {
            if input.is_empty() {
                Ok(ResolutionResult::unresolved(&input))
            } else {
                resolver.resolve(&input, role)
            }
        })
        .await;
        let result = flatten_join(joined)?;
        let coord = result.coordinate;

        let mut st = self.state.lock().unwrap();
        if st.generation != generation {
            return Ok(None); // superseded; discard
        }
        if let Some(c) = coord {
            st.fold_bounds(c);
        }
        match role {
            AddressRole::Origin => st.origin = Some(result),
            AddressRole::Destination => st.destination = Some(result),
        }
        Ok(coord)
    }

    /// Current read model without starting a run.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().unwrap().snapshot()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.lock().unwrap().phase
    }

    /// Resolution tier per side — diagnostics only, never shown to users.
    pub fn strategies(&self) -> (Option<ResolveStrategy>, Option<ResolveStrategy>) {
        let st = self.state.lock().unwrap();
        (
            st.origin.as_ref().map(|r| r.strategy),
            st.destination.as_ref().map(|r| r.strategy),
        )
    }
}

fn flatten_join<T>(
    joined: Result<Result<T, EngineError>, tokio::task::JoinError>,
) -> Result<T, EngineError> {
    match joined {
        Ok(inner) => inner,
        Err(e) => Err(EngineError::ServiceUnavailable(format!(
            "background task failed: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::gazetteer::Gazetteer;
    use crate::engine::services::mock::{
        FailingDistance, FailingGeocoder, FailingPlaces, FixedGeocoder, SlowGeocoder,
        UnavailableGeocoder,
    };
    use crate::engine::services::{GeocodingService, PlaceLookupService};
    use std::time::Duration;

    const ORIGIN_PLUS: &str = "MWFJ+7X4, Weragama Rd, Wadduwa";
    const DEST_LANDMARK: &str = "Royal College, Colombo";

    fn session_with(
        geocoder: Arc<dyn GeocodingService>,
        places: Arc<dyn PlaceLookupService>,
    ) -> Arc<ResolutionSession> {
        let resolver = AddressResolver::new(Arc::new(Gazetteer::sri_lanka()), geocoder, places);
        let distance = DistanceCalculator::new(Arc::new(FailingDistance));
        Arc::new(ResolutionSession::new(
            Arc::new(resolver),
            Arc::new(distance),
        ))
    }

    fn offline_session() -> Arc<ResolutionSession> {
        session_with(Arc::new(FailingGeocoder), Arc::new(FailingPlaces))
    }

    #[tokio::test]
    async fn test_resolve_pair_gazetteer_only() {
        let session = offline_session();
        let snapshot = session
            .resolve_pair(Some(ORIGIN_PLUS), Some(DEST_LANDMARK))
            .await
            .unwrap();

        let origin = snapshot.origin_coordinate.unwrap();
        let destination = snapshot.destination_coordinate.unwrap();
        assert!((origin.lat - 6.586039).abs() < 1e-9);
        assert!((destination.lat - 6.909736).abs() < 1e-9);

        assert_eq!(
            session.strategies(),
            (
                Some(ResolveStrategy::GazetteerPlusCode),
                Some(ResolveStrategy::GazetteerLandmark)
            )
        );

        let bounds = snapshot.bounds.unwrap();
        assert!(bounds.contains(origin));
        assert!(bounds.contains(destination));

        // Distance backend fails: straight-line fallback.
        assert!(snapshot.distance_text.unwrap().ends_with("(straight line)"));
        assert!(!snapshot.is_unresolved);
        assert!(!snapshot.is_loading);
        assert_eq!(session.phase(), SessionPhase::Resolved);
    }

    #[tokio::test]
    async fn test_identical_pair_resolves_once() {
        let geocoder = Arc::new(FixedGeocoder::new(Coordinate::new(6.85, 79.92)));
        let session = session_with(
            Arc::clone(&geocoder) as Arc<dyn GeocodingService>,
            Arc::new(FailingPlaces),
        );

        let first = session
            .resolve_pair(Some("10 Lake Rd"), Some("11 Hill St"))
            .await
            .unwrap();
        let second = session
            .resolve_pair(Some("10 Lake Rd"), Some("11 Hill St"))
            .await
            .unwrap();

        // One run, two addresses: exactly two geocoder calls total.
        assert_eq!(geocoder.call_count(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_superseding_pair_wins() {
        let slow = Arc::new(SlowGeocoder {
            coord: Coordinate::new(1.0, 1.0),
            delay: Duration::from_millis(200),
        });
        let session = session_with(slow, Arc::new(FailingPlaces));

        // First run resolves free text through the slow geocoder.
        let stale = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .resolve_pair(Some("1 Old Origin Rd"), Some("2 Old Dest Rd"))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Second run supersedes with gazetteer-only inputs.
        let fresh = session
            .resolve_pair(Some(ORIGIN_PLUS), Some(DEST_LANDMARK))
            .await
            .unwrap();
        stale.await.unwrap().unwrap();

        // Final state reflects only the superseding pair.
        let snapshot = session.snapshot();
        assert_eq!(snapshot, fresh);
        assert!((snapshot.origin_coordinate.unwrap().lat - 6.586039).abs() < 1e-9);
        assert!((snapshot.destination_coordinate.unwrap().lat - 6.909736).abs() < 1e-9);
        let bounds = snapshot.bounds.unwrap();
        assert!(!bounds.contains(Coordinate::new(1.0, 1.0)));
        assert_eq!(session.phase(), SessionPhase::Resolved);
    }

    #[tokio::test]
    async fn test_faster_side_publishes_bounds_mid_run() {
        // Destination resolves instantly from the gazetteer while the
        // origin is stuck in the slow geocoder: a snapshot taken mid-run
        // already carries the destination marker and its bounds.
        let slow = Arc::new(SlowGeocoder {
            coord: Coordinate::new(6.80, 79.90),
            delay: Duration::from_millis(300),
        });
        let session = session_with(slow, Arc::new(FailingPlaces));

        let run = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .resolve_pair(Some("1 Slow Origin Rd"), Some(DEST_LANDMARK))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mid = session.snapshot();
        assert!(mid.is_loading);
        assert!(mid.origin_coordinate.is_none());
        let destination = mid.destination_coordinate.unwrap();
        assert!((destination.lat - 6.909736).abs() < 1e-9);
        assert!(mid.bounds.unwrap().contains(destination));

        let done = run.await.unwrap().unwrap();
        assert!(done.bounds.unwrap().contains(Coordinate::new(6.80, 79.90)));
        assert!(done.distance_text.is_some());
    }

    #[tokio::test]
    async fn test_single_address_no_distance() {
        let session = offline_session();
        let snapshot = session
            .resolve_pair(None, Some(DEST_LANDMARK))
            .await
            .unwrap();

        assert!(snapshot.origin_coordinate.is_none());
        assert!(snapshot.destination_coordinate.is_some());
        assert!(snapshot.distance_text.is_none());
        assert!(snapshot.bounds.is_some());
        assert!(!snapshot.is_unresolved);
        assert_eq!(session.phase(), SessionPhase::Resolved);
    }

    #[tokio::test]
    async fn test_empty_pair_stays_idle() {
        let session = offline_session();
        let snapshot = session.resolve_pair(None, Some("  ")).await.unwrap();

        assert!(snapshot.is_unresolved);
        assert!(snapshot.bounds.is_none());
        assert!(snapshot.distance_text.is_none());
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_fatal_error_propagates_and_resets() {
        let session = session_with(Arc::new(UnavailableGeocoder), Arc::new(FailingPlaces));
        let err = session
            .resolve_pair(Some("free text one"), Some("free text two"))
            .await
            .unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(session.phase(), SessionPhase::Idle);

        // An explicit re-issue of the same pair is allowed to retry.
        let err = session
            .resolve_pair(Some("free text one"), Some("free text two"))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
