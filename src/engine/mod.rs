//! Location resolution & route distance engine.
//!
//! Turns heterogeneous, often malformed address strings (Plus Codes,
//! school names, free text) into usable coordinates via a multi-strategy
//! fallback pipeline, then derives a route distance between the two
//! resolved points.

pub mod classifier;
pub mod distance;
pub mod gazetteer;
pub mod resolver;
pub mod services;
pub mod session;
pub mod types;

pub use classifier::{classify, AddressClass};
pub use distance::{haversine_km, DistanceCalculator};
pub use gazetteer::{Gazetteer, LandmarkInfo};
pub use resolver::AddressResolver;
pub use services::{
    DistanceService, DrivingEstimate, GeocodingService, NominatimGeocoder, OsrmDistance,
    PhotonPlaceLookup, PlaceLookupService,
};
pub use session::ResolutionSession;
pub use types::{
    AddressRole, Bounds, Coordinate, DistanceMethod, DistanceResult, EngineError,
    ResolutionResult, ResolveStrategy, SessionPhase, SessionSnapshot,
};
