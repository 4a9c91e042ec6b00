//! Routepoint — location resolution & route distance engine for
//! school-transport logistics.

pub mod engine;
pub mod server;
