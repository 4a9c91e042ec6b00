//! External service contracts and their HTTP providers.
//!
//! Production providers: OSM Nominatim (forward geocoding with a country
//! bias), Komoot Photon (free-text place lookup), and OSRM (driving
//! distance/duration).

use super::types::{Coordinate, EngineError};
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = "Routepoint/0.4 (route-distance-engine)";
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Service contracts ──────────────────────────────────────────

/// Forward geocoding of a full address string.
pub trait GeocodingService: Send + Sync {
    fn geocode(&self, address: &str, region_bias: &str) -> Result<Coordinate, EngineError>;
}

/// Free-text place search (named points of interest, Plus Codes).
pub trait PlaceLookupService: Send + Sync {
    fn find_place(&self, query: &str) -> Result<Coordinate, EngineError>;
}

/// A driving estimate from the routing backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrivingEstimate {
    pub distance_text: String,
    pub duration_text: String,
}

/// Road-network distance between two coordinates.
pub trait DistanceService: Send + Sync {
    fn driving_distance(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<DrivingEstimate, EngineError>;
}

// ─── Nominatim geocoder ─────────────────────────────────────────

#[derive(Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

/// OSM Nominatim forward geocoder.
#[derive(Default)]
pub struct NominatimGeocoder;

impl NominatimGeocoder {
    pub fn new() -> Self {
        Self
    }
}

impl GeocodingService for NominatimGeocoder {
    fn geocode(&self, address: &str, region_bias: &str) -> Result<Coordinate, EngineError> {
        let url = format!(
            "https://nominatim.openstreetmap.org/search?q={}&format=json&limit=1&countrycodes={}",
            urlencode(address),
            urlencode(region_bias),
        );

        let response = ureq::get(&url)
            .set("User-Agent", USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .call()
            .map_err(map_http_error)?;

        let hits: Vec<NominatimHit> = response
            .into_json()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let hit = hits
            .first()
            .ok_or_else(|| EngineError::NoMatch(address.to_string()))?;

        let lat: f64 = hit
            .lat
            .parse()
            .map_err(|_| EngineError::InvalidResponse(format!("bad latitude '{}'", hit.lat)))?;
        let lng: f64 = hit
            .lon
            .parse()
            .map_err(|_| EngineError::InvalidResponse(format!("bad longitude '{}'", hit.lon)))?;

        Ok(Coordinate::new(lat, lng))
    }
}

// ─── Photon place lookup ────────────────────────────────────────

#[derive(Deserialize)]
struct PhotonResponse {
    #[serde(default)]
    features: Vec<PhotonFeature>,
}

#[derive(Deserialize)]
struct PhotonFeature {
    geometry: PhotonGeometry,
}

#[derive(Deserialize)]
struct PhotonGeometry {
    /// GeoJSON order: [lng, lat].
    coordinates: [f64; 2],
}

/// Komoot Photon free-text place search.
#[derive(Default)]
pub struct PhotonPlaceLookup;

impl PhotonPlaceLookup {
    pub fn new() -> Self {
        Self
    }
}

impl PlaceLookupService for PhotonPlaceLookup {
    fn find_place(&self, query: &str) -> Result<Coordinate, EngineError> {
        let url = format!("https://photon.komoot.io/api?q={}&limit=1", urlencode(query));

        let response = ureq::get(&url)
            .set("User-Agent", USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .call()
            .map_err(map_http_error)?;

        let parsed: PhotonResponse = response
            .into_json()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let feature = parsed
            .features
            .first()
            .ok_or_else(|| EngineError::NoMatch(query.to_string()))?;

        let [lng, lat] = feature.geometry.coordinates;
        Ok(Coordinate::new(lat, lng))
    }
}

// ─── OSRM driving distance ──────────────────────────────────────

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
}

/// OSRM public routing backend.
#[derive(Default)]
pub struct OsrmDistance;

impl OsrmDistance {
    pub fn new() -> Self {
        Self
    }
}

impl DistanceService for OsrmDistance {
    fn driving_distance(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<DrivingEstimate, EngineError> {
        let url = format!(
            "https://router.project-osrm.org/route/v1/driving/{},{};{},{}?overview=false",
            origin.lng, origin.lat, destination.lng, destination.lat,
        );

        let response = ureq::get(&url)
            .set("User-Agent", USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .call()
            .map_err(map_http_error)?;

        let parsed: OsrmResponse = response
            .into_json()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        if parsed.code != "Ok" {
            return Err(EngineError::NoMatch(format!("OSRM status {}", parsed.code)));
        }

        let route = parsed
            .routes
            .first()
            .ok_or_else(|| EngineError::InvalidResponse("no routes in response".into()))?;

        Ok(DrivingEstimate {
            distance_text: format!("{:.1} km", route.distance / 1000.0),
            duration_text: format_duration(route.duration),
        })
    }
}

/// Render a duration in seconds as "N min" or "H h M min".
fn format_duration(seconds: f64) -> String {
    let total_minutes = (seconds / 60.0).round().max(1.0) as u64;
    if total_minutes >= 60 {
        format!("{} h {} min", total_minutes / 60, total_minutes % 60)
    } else {
        format!("{} min", total_minutes)
    }
}

// ─── Error mapping ──────────────────────────────────────────────

/// Auth failures mean the backend is unusable for this session; everything
/// else is transient and the strategy chain absorbs it.
fn map_http_error(err: ureq::Error) -> EngineError {
    match err {
        ureq::Error::Status(401, _) | ureq::Error::Status(403, _) => {
            EngineError::ServiceUnavailable("request rejected (check API credentials)".into())
        }
        ureq::Error::Status(code, _) => EngineError::Network(format!("HTTP {}", code)),
        ureq::Error::Transport(t) => EngineError::Network(t.to_string()),
    }
}

// ─── URL encoding (minimal, no extra dep) ───────────────────────

fn urlencode(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '&' => "%26".to_string(),
            '=' => "%3D".to_string(),
            '+' => "%2B".to_string(),
            ',' => "%2C".to_string(),
            _ if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '~' => {
                c.to_string()
            }
            // Percent-escape the UTF-8 bytes, not the code point.
            _ => {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf)
                    .bytes()
                    .map(|b| format!("%{:02X}", b))
                    .collect()
            }
        })
        .collect()
}

// ─── Test doubles ───────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Geocoder returning a fixed coordinate and counting calls.
    pub struct FixedGeocoder {
        pub coord: Coordinate,
        pub calls: AtomicUsize,
    }

    impl FixedGeocoder {
        pub fn new(coord: Coordinate) -> Self {
            Self {
                coord,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GeocodingService for FixedGeocoder {
        fn geocode(&self, _address: &str, _bias: &str) -> Result<Coordinate, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.coord)
        }
    }

    /// Geocoder that always fails transiently.
    pub struct FailingGeocoder;

    impl GeocodingService for FailingGeocoder {
        fn geocode(&self, address: &str, _bias: &str) -> Result<Coordinate, EngineError> {
            Err(EngineError::NoMatch(address.to_string()))
        }
    }

    /// Geocoder with a fatal configuration error.
    pub struct UnavailableGeocoder;

    impl GeocodingService for UnavailableGeocoder {
        fn geocode(&self, _address: &str, _bias: &str) -> Result<Coordinate, EngineError> {
            Err(EngineError::ServiceUnavailable("missing API credentials".into()))
        }
    }

    /// Geocoder that sleeps before answering (for superseding-run tests).
    pub struct SlowGeocoder {
        pub coord: Coordinate,
        pub delay: Duration,
    }

    impl GeocodingService for SlowGeocoder {
        fn geocode(&self, _address: &str, _bias: &str) -> Result<Coordinate, EngineError> {
            std::thread::sleep(self.delay);
            Ok(self.coord)
        }
    }

    /// Place lookup returning a fixed coordinate.
    pub struct FixedPlaces(pub Coordinate);

    impl PlaceLookupService for FixedPlaces {
        fn find_place(&self, _query: &str) -> Result<Coordinate, EngineError> {
            Ok(self.0)
        }
    }

    /// Place lookup that always fails transiently.
    pub struct FailingPlaces;

    impl PlaceLookupService for FailingPlaces {
        fn find_place(&self, query: &str) -> Result<Coordinate, EngineError> {
            Err(EngineError::NoMatch(query.to_string()))
        }
    }

    /// Distance backend returning a fixed estimate.
    pub struct FixedDistance(pub DrivingEstimate);

    impl DistanceService for FixedDistance {
        fn driving_distance(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> Result<DrivingEstimate, EngineError> {
            Ok(self.0.clone())
        }
    }

    /// Distance backend that always fails.
    pub struct FailingDistance;

    impl DistanceService for FailingDistance {
        fn driving_distance(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> Result<DrivingEstimate, EngineError> {
            Err(EngineError::Network("routing backend timed out".into()))
        }
    }
}
