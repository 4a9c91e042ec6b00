//! Static reference tables for the Sri Lanka service region.
//!
//! Pure data: known school landmarks, known Plus Code locations, major
//! city centroids, and the island's default centroid. Injected into the
//! resolver at construction — never a hidden global.

use super::types::Coordinate;
use serde::Serialize;

// ─── Landmark table (schools) ───────────────────────────────────

struct Landmark {
    name: &'static str,
    lat: f64,
    lng: f64,
}

const LANDMARKS: &[Landmark] = &[
    Landmark { name: "royal college", lat: 6.909736, lng: 79.863019 },
    Landmark { name: "ananda college", lat: 6.927132, lng: 79.864615 },
    Landmark { name: "visakha vidyalaya", lat: 6.899835, lng: 79.860527 },
    Landmark { name: "d.s. senanayake college", lat: 6.908341, lng: 79.877512 },
    Landmark { name: "nalanda college", lat: 6.918533, lng: 79.870936 },
    Landmark { name: "musaeus college", lat: 6.910702, lng: 79.866339 },
    Landmark { name: "devi balika vidyalaya", lat: 6.913894, lng: 79.880804 },
    Landmark { name: "isipathana college", lat: 6.888817, lng: 79.868816 },
    Landmark { name: "st. thomas' college", lat: 6.838912, lng: 79.866028 },
    Landmark { name: "trinity college", lat: 7.297096, lng: 80.640671 },
];

// ─── Plus Code table (pickup points) ────────────────────────────

struct PlusCodeEntry {
    code: &'static str,
    lat: f64,
    lng: f64,
}

const PLUS_CODES: &[PlusCodeEntry] = &[
    PlusCodeEntry { code: "MWFJ+7X4", lat: 6.586039, lng: 79.973867 },
    PlusCodeEntry { code: "WVH7+2Q", lat: 6.927632, lng: 79.864361 },
    PlusCodeEntry { code: "VRGR+8C", lat: 6.875815, lng: 79.841126 },
    PlusCodeEntry { code: "WX6M+Q87", lat: 6.961942, lng: 79.933379 },
    PlusCodeEntry { code: "7JPV+6W", lat: 7.285619, lng: 80.644793 },
];

// ─── City centroids ─────────────────────────────────────────────

struct CityEntry {
    name: &'static str,
    lat: f64,
    lng: f64,
}

const CITIES: &[CityEntry] = &[
    CityEntry { name: "colombo", lat: 6.9271, lng: 79.8612 },
    CityEntry { name: "kandy", lat: 7.2906, lng: 80.6337 },
    CityEntry { name: "galle", lat: 6.0535, lng: 80.2210 },
    CityEntry { name: "negombo", lat: 7.2008, lng: 79.8737 },
    CityEntry { name: "jaffna", lat: 9.6615, lng: 80.0255 },
    CityEntry { name: "kurunegala", lat: 7.4863, lng: 80.3647 },
    CityEntry { name: "matara", lat: 5.9549, lng: 80.5550 },
    CityEntry { name: "anuradhapura", lat: 8.3114, lng: 80.4037 },
    CityEntry { name: "ratnapura", lat: 6.6828, lng: 80.3992 },
    CityEntry { name: "batticaloa", lat: 7.7102, lng: 81.6924 },
];

const DEFAULT_CENTROID: Coordinate = Coordinate::new(7.8731, 80.7718);
const REGION_NAME: &str = "Sri Lanka";
const REGION_BIAS: &str = "lk";

/// Plus Code area codes are the leading 4 characters.
const AREA_CODE_LEN: usize = 4;

/// A landmark entry for the public listing API.
#[derive(Debug, Clone, Serialize)]
pub struct LandmarkInfo {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Read-only lookup tables shared by every resolver and session.
pub struct Gazetteer {
    landmarks: &'static [Landmark],
    plus_codes: &'static [PlusCodeEntry],
    cities: &'static [CityEntry],
    default_centroid: Coordinate,
    region_name: &'static str,
    region_bias: &'static str,
}

impl Gazetteer {
    /// The built-in Sri Lanka region profile.
    pub fn sri_lanka() -> Self {
        Self {
            landmarks: LANDMARKS,
            plus_codes: PLUS_CODES,
            cities: CITIES,
            default_centroid: DEFAULT_CENTROID,
            region_name: REGION_NAME,
            region_bias: REGION_BIAS,
        }
    }

    /// Find a landmark key occurring as a case-insensitive substring of
    /// the raw address.
    pub fn landmark_match(&self, raw: &str) -> Option<(&'static str, Coordinate)> {
        let lower = raw.to_lowercase();
        self.landmarks
            .iter()
            .find(|l| lower.contains(l.name))
            .map(|l| (l.name, Coordinate::new(l.lat, l.lng)))
    }

    /// Exact landmark key lookup (case-insensitive).
    pub fn landmark(&self, name: &str) -> Option<Coordinate> {
        let key = name.to_lowercase();
        self.landmarks
            .iter()
            .find(|l| l.name == key)
            .map(|l| Coordinate::new(l.lat, l.lng))
    }

    /// Exact Plus Code lookup.
    pub fn plus_code_exact(&self, code: &str) -> Option<Coordinate> {
        let key = code.to_uppercase();
        self.plus_codes
            .iter()
            .find(|p| p.code == key)
            .map(|p| Coordinate::new(p.lat, p.lng))
    }

    /// Approximate Plus Code lookup: reuse the coordinate of a known code
    /// sharing the leading 4-character area code.
    pub fn plus_code_area(&self, code: &str) -> Option<Coordinate> {
        let key = code.to_uppercase();
        let area = key.get(..AREA_CODE_LEN)?;
        self.plus_codes
            .iter()
            .find(|p| p.code.starts_with(area))
            .map(|p| Coordinate::new(p.lat, p.lng))
    }

    /// Find a major-city name occurring as a substring of the text.
    pub fn city_match(&self, text: &str) -> Option<(&'static str, Coordinate)> {
        let lower = text.to_lowercase();
        self.cities
            .iter()
            .find(|c| lower.contains(c.name))
            .map(|c| (c.name, Coordinate::new(c.lat, c.lng)))
    }

    /// Terminal fallback for any non-empty address.
    pub fn default_centroid(&self) -> Coordinate {
        self.default_centroid
    }

    pub fn region_name(&self) -> &str {
        self.region_name
    }

    /// Country bias hint passed to the geocoder.
    pub fn region_bias(&self) -> &str {
        self.region_bias
    }

    /// The full landmark list (for autocomplete / API).
    pub fn landmark_list(&self) -> Vec<LandmarkInfo> {
        self.landmarks
            .iter()
            .map(|l| LandmarkInfo {
                name: l.name.to_string(),
                lat: l.lat,
                lng: l.lng,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_match_substring() {
        let g = Gazetteer::sri_lanka();
        let (name, coord) = g.landmark_match("Royal College, Colombo 07").unwrap();
        assert_eq!(name, "royal college");
        assert!((coord.lat - 6.909736).abs() < 1e-9);
        assert!((coord.lng - 79.863019).abs() < 1e-9);
    }

    #[test]
    fn test_landmark_match_case_insensitive() {
        let g = Gazetteer::sri_lanka();
        assert!(g.landmark_match("ANANDA COLLEGE").is_some());
        assert!(g.landmark_match("near visakha vidyalaya gate").is_some());
    }

    #[test]
    fn test_landmark_no_match() {
        let g = Gazetteer::sri_lanka();
        assert!(g.landmark_match("12 Flower Road").is_none());
    }

    #[test]
    fn test_plus_code_exact() {
        let g = Gazetteer::sri_lanka();
        let coord = g.plus_code_exact("MWFJ+7X4").unwrap();
        assert!((coord.lat - 6.586039).abs() < 1e-9);
        assert!((coord.lng - 79.973867).abs() < 1e-9);
        assert!(g.plus_code_exact("mwfj+7x4").is_some());
    }

    #[test]
    fn test_plus_code_area_prefix() {
        let g = Gazetteer::sri_lanka();
        // Not in the table, but shares area code MWFJ with a known entry.
        let coord = g.plus_code_area("MWFJ+9Z").unwrap();
        assert!((coord.lat - 6.586039).abs() < 1e-9);
        assert!(g.plus_code_exact("MWFJ+9Z").is_none());
    }

    #[test]
    fn test_plus_code_unknown_area() {
        let g = Gazetteer::sri_lanka();
        assert!(g.plus_code_area("QQQQ+22").is_none());
    }

    #[test]
    fn test_city_match() {
        let g = Gazetteer::sri_lanka();
        let (name, coord) = g.city_match("22 Temple Rd, Kandy, Sri Lanka").unwrap();
        assert_eq!(name, "kandy");
        assert!((coord.lat - 7.2906).abs() < 1e-9);
    }

    #[test]
    fn test_default_centroid() {
        let g = Gazetteer::sri_lanka();
        let c = g.default_centroid();
        assert!((c.lat - 7.8731).abs() < 1e-9);
        assert!((c.lng - 80.7718).abs() < 1e-9);
    }

    #[test]
    fn test_landmark_list() {
        let g = Gazetteer::sri_lanka();
        let list = g.landmark_list();
        assert!(list.iter().any(|l| l.name == "royal college"));
        assert!(list.len() >= 10);
    }
}
