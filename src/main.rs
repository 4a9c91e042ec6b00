use clap::Parser;
use routepoint::engine::{
    AddressResolver, DistanceCalculator, Gazetteer, NominatimGeocoder, OsrmDistance,
    PhotonPlaceLookup, ResolutionSession,
};
use std::sync::Arc;

/// Routepoint — location resolution & route distance engine.
///
/// Resolves a pair of messy real-world address strings (Plus Codes,
/// school names, free text) to coordinates and derives the route
/// distance between them.
///
/// Examples:
///   routepoint --origin "MWFJ+7X4, Weragama Rd, Wadduwa" --destination "Royal College, Colombo"
///   routepoint --destination "Ananda College" --offline
///   routepoint --serve --port 8733
#[derive(Parser)]
#[command(name = "routepoint", version, about, long_about = None)]
struct Cli {
    /// Origin address (home / pickup point).
    #[arg(long, short = 'o')]
    origin: Option<String>,

    /// Destination address (school / drop-off point).
    #[arg(long, short = 'd')]
    destination: Option<String>,

    /// Offline mode: resolve from the built-in gazetteer only.
    #[arg(long)]
    offline: bool,

    /// Start the HTTP API server instead of resolving a pair.
    #[arg(long)]
    serve: bool,

    /// Server bind host.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server bind port.
    #[arg(long, default_value_t = 8733)]
    port: u16,
}

fn main() {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Error: Cannot start runtime: {}", e);
        std::process::exit(1);
    });

    if cli.serve {
        runtime.block_on(routepoint::server::start(&cli.host, cli.port));
        return;
    }

    if cli.origin.is_none() && cli.destination.is_none() {
        eprintln!("Error: No addresses given.");
        eprintln!();
        eprintln!("Usage:");
        eprintln!("  routepoint --origin \"MWFJ+7X4, Weragama Rd, Wadduwa\" --destination \"Royal College, Colombo\"");
        eprintln!("  routepoint --destination \"Ananda College\" --offline");
        eprintln!("  routepoint --serve");
        std::process::exit(1);
    }

    // ── Build the engine ────────────────────────────────────────

    let gazetteer = Arc::new(Gazetteer::sri_lanka());
    let mut resolver = AddressResolver::new(
        Arc::clone(&gazetteer),
        Arc::new(NominatimGeocoder::new()),
        Arc::new(PhotonPlaceLookup::new()),
    );
    let mut distance = DistanceCalculator::new(Arc::new(OsrmDistance::new()));
    if cli.offline {
        resolver.set_offline(true);
        distance.set_offline(true);
    }

    let session = ResolutionSession::new(Arc::new(resolver), Arc::new(distance));

    // ── Resolve ─────────────────────────────────────────────────

    let snapshot = runtime
        .block_on(session.resolve_pair(cli.origin.as_deref(), cli.destination.as_deref()))
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let (origin_strategy, destination_strategy) = session.strategies();
    if let Some(s) = origin_strategy {
        eprintln!("  Origin resolved via {}", s);
    }
    if let Some(s) = destination_strategy {
        eprintln!("  Destination resolved via {}", s);
    }
    if let Some(ref text) = snapshot.distance_text {
        eprintln!("  Distance: {}", text);
    }

    // JSON read model to stdout
    println!("{}", serde_json::to_string_pretty(&snapshot).unwrap());
}
