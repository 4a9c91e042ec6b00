//! Core types for the resolution engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic coordinate in WGS84 degrees.
///
/// Produced only by resolution; lat is within [-90, 90], lng within
/// [-180, 180] for every value the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Which side of the route an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressRole {
    Origin,
    Destination,
}

impl fmt::Display for AddressRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin => write!(f, "origin"),
            Self::Destination => write!(f, "destination"),
        }
    }
}

/// Which tier of the fallback chain produced a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveStrategy {
    GazetteerLandmark,
    GazetteerPlusCode,
    PlaceLookup,
    Geocoder,
    CityFallback,
    DefaultCentroid,
    Unresolved,
}

impl fmt::Display for ResolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GazetteerLandmark => write!(f, "landmark table"),
            Self::GazetteerPlusCode => write!(f, "Plus Code table"),
            Self::PlaceLookup => write!(f, "place lookup"),
            Self::Geocoder => write!(f, "geocoder"),
            Self::CityFallback => write!(f, "city centroid"),
            Self::DefaultCentroid => write!(f, "regional centroid"),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// Outcome of resolving one raw address string.
///
/// `coordinate` is `None` exactly when `strategy` is `Unresolved`; the
/// constructors are the only way to build one, which keeps that pairing
/// intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub input: String,
    pub coordinate: Option<Coordinate>,
    pub strategy: ResolveStrategy,
}

impl ResolutionResult {
    pub fn resolved(input: &str, coordinate: Coordinate, strategy: ResolveStrategy) -> Self {
        Self {
            input: input.to_string(),
            coordinate: Some(coordinate),
            strategy,
        }
    }

    /// The empty-input case. Not an error.
    pub fn unresolved(input: &str) -> Self {
        Self {
            input: input.to_string(),
            coordinate: None,
            strategy: ResolveStrategy::Unresolved,
        }
    }
}

/// Minimal rectangle enclosing the session's resolved coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn around(coord: Coordinate) -> Self {
        Self {
            south: coord.lat,
            west: coord.lng,
            north: coord.lat,
            east: coord.lng,
        }
    }

    pub fn extend(&mut self, coord: Coordinate) {
        self.south = self.south.min(coord.lat);
        self.west = self.west.min(coord.lng);
        self.north = self.north.max(coord.lat);
        self.east = self.east.max(coord.lng);
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        (self.south..=self.north).contains(&coord.lat)
            && (self.west..=self.east).contains(&coord.lng)
    }
}

/// How a distance figure was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMethod {
    Driving,
    Haversine,
}

/// A human-readable distance between the two resolved points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    pub text: String,
    pub method: DistanceMethod,
}

/// Lifecycle of one resolution session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Resolving,
    Resolved,
}

/// Read model for the rendering layer: marker coordinates, viewport
/// bounds, and a distance label. The fallback tier that produced each
/// coordinate is deliberately not part of this surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub origin_coordinate: Option<Coordinate>,
    pub destination_coordinate: Option<Coordinate>,
    pub bounds: Option<Bounds>,
    pub distance_text: Option<String>,
    pub is_loading: bool,
    pub is_unresolved: bool,
}

/// Resolution engine errors.
///
/// Only `ServiceUnavailable` is fatal to a resolution run; the other
/// variants are transient provider failures that the strategy chain
/// absorbs by falling through to the next tier.
#[derive(Debug)]
pub enum EngineError {
    Network(String),
    NoMatch(String),
    InvalidResponse(String),
    ServiceUnavailable(String),
}

impl EngineError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::NoMatch(q) => write!(f, "No match for '{}'", q),
            Self::InvalidResponse(msg) => write!(f, "Invalid service response: {}", msg),
            Self::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}
