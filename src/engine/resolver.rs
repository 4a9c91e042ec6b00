//! Address resolver — orchestrates the strategy chain.
//!
//! Chain: gazetteer landmark → Plus Code (exact, area prefix, place
//! lookup) → geocoder with enhanced address → city centroid → default
//! regional centroid. First success wins; transient provider failures
//! fall through to the next strategy, so a non-empty address always
//! resolves to something.

use std::sync::Arc;

use super::classifier::classify;
use super::gazetteer::Gazetteer;
use super::services::{GeocodingService, PlaceLookupService};
use super::types::{AddressRole, EngineError, ResolutionResult, ResolveStrategy};

/// The address resolver with its fallback pipeline.
///
/// Both strategies that the source data skews by role (Plus Codes for
/// home pickups, school names for drop-offs) run for either role here;
/// the role only shapes diagnostics.
pub struct AddressResolver {
    gazetteer: Arc<Gazetteer>,
    geocoder: Arc<dyn GeocodingService>,
    places: Arc<dyn PlaceLookupService>,
    offline: bool,
}

impl AddressResolver {
    pub fn new(
        gazetteer: Arc<Gazetteer>,
        geocoder: Arc<dyn GeocodingService>,
        places: Arc<dyn PlaceLookupService>,
    ) -> Self {
        Self {
            gazetteer,
            geocoder,
            places,
            offline: false,
        }
    }

    /// Set offline mode — skip network strategies.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Resolve one raw address through the full fallback chain.
    ///
    /// `Err` only on a fatal configuration error from a provider; every
    /// transient failure falls through until the regional centroid.
    pub fn resolve(&self, raw: &str, role: AddressRole) -> Result<ResolutionResult, EngineError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(ResolutionResult::unresolved(raw));
        }

        let class = classify(trimmed, &self.gazetteer);

        // 1. Known landmark
        if let Some(ref name) = class.candidate_landmark {
            if let Some(coord) = self.gazetteer.landmark(name) {
                return Ok(ResolutionResult::resolved(
                    raw,
                    coord,
                    ResolveStrategy::GazetteerLandmark,
                ));
            }
        }

        // 2. Plus Code: exact entry, then shared area code, then lookup
        if let Some(ref code) = class.plus_code {
            if let Some(coord) = self.gazetteer.plus_code_exact(code) {
                return Ok(ResolutionResult::resolved(
                    raw,
                    coord,
                    ResolveStrategy::GazetteerPlusCode,
                ));
            }
            if let Some(coord) = self.gazetteer.plus_code_area(code) {
                return Ok(ResolutionResult::resolved(
                    raw,
                    coord,
                    ResolveStrategy::GazetteerPlusCode,
                ));
            }
            if !self.offline {
                let query = format!("{}, {}", code, self.gazetteer.region_name());
                match self.places.find_place(&query) {
                    Ok(coord) => {
                        return Ok(ResolutionResult::resolved(
                            raw,
                            coord,
                            ResolveStrategy::PlaceLookup,
                        ));
                    }
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(_) => {} // fall through
                }
            }
        }

        // 3. Geocoder with the enhanced address and a region bias
        let enhanced = enhance_address(trimmed, self.gazetteer.region_name());
        if !self.offline {
            match self.geocoder.geocode(&enhanced, self.gazetteer.region_bias()) {
                Ok(coord) => {
                    return Ok(ResolutionResult::resolved(raw, coord, ResolveStrategy::Geocoder));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(_) => {}
            }
        }

        // 4. City-substring fallback
        if let Some((_, coord)) = self.gazetteer.city_match(&enhanced) {
            return Ok(ResolutionResult::resolved(
                raw,
                coord,
                ResolveStrategy::CityFallback,
            ));
        }

        // 5. Regional centroid — terminal, never fails
        eprintln!(
            "  Warning: {} address '{}' fell back to the regional centroid",
            role, trimmed
        );
        Ok(ResolutionResult::resolved(
            raw,
            self.gazetteer.default_centroid(),
            ResolveStrategy::DefaultCentroid,
        ))
    }
}

/// Append the region name when absent, and a generic landmark-type suffix
/// when the text names an institution without saying so.
fn enhance_address(raw: &str, region_name: &str) -> String {
    let lower = raw.to_lowercase();
    let mut enhanced = raw.to_string();

    if names_institution(&lower) && !lower.contains("school") {
        enhanced.push_str(" school");
    }
    if !lower.contains(&region_name.to_lowercase()) {
        enhanced.push_str(", ");
        enhanced.push_str(region_name);
    }
    enhanced
}

fn names_institution(lower: &str) -> bool {
    ["college", "vidyalaya", "vidyalayam", "convent", "academy"]
        .iter()
        .any(|k| lower.contains(k))
}
