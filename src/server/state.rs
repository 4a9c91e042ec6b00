use crate::engine::{AddressResolver, DistanceCalculator, Gazetteer};
use std::sync::Arc;

pub struct AppState {
    pub gazetteer: Arc<Gazetteer>,
    pub resolver: Arc<AddressResolver>,
    pub distance: Arc<DistanceCalculator>,
}
