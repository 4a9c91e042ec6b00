mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::engine::{
    AddressResolver, DistanceCalculator, Gazetteer, NominatimGeocoder, OsrmDistance,
    PhotonPlaceLookup,
};

pub fn build_router() -> Router {
    let gazetteer = Arc::new(Gazetteer::sri_lanka());
    let resolver = AddressResolver::new(
        Arc::clone(&gazetteer),
        Arc::new(NominatimGeocoder::new()),
        Arc::new(PhotonPlaceLookup::new()),
    );
    let distance = DistanceCalculator::new(Arc::new(OsrmDistance::new()));

    let state = Arc::new(AppState {
        gazetteer,
        resolver: Arc::new(resolver),
        distance: Arc::new(distance),
    });

    Router::new()
        .route("/api/route", get(handlers::route))
        .route("/api/landmarks", get(handlers::landmarks))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16) {
    let app = build_router();
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  Routepoint server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    });
}
