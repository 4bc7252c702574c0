use std::{fs::OpenOptions, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use econome::{AppState, JwtIdentityVerifier, build_router, graceful_shutdown};

/// The REST API server for econome.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: PathBuf,

    /// The IP address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    address: std::net::IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// The audience (project ID) bearer tokens must be issued for.
    #[arg(long)]
    token_audience: Option<String>,

    /// The issuer bearer tokens must come from.
    ///
    /// Defaults to the secure token service URL for `--token-audience`.
    #[arg(long)]
    token_issuer: Option<String>,

    /// File path to the PEM encoded RSA public key used to verify RS256 tokens.
    #[arg(long, conflicts_with = "token_secret")]
    token_public_key: Option<PathBuf>,

    /// Shared secret for verifying HS256 tokens during local development.
    #[arg(long, env = "TOKEN_SECRET", hide_env_values = true)]
    token_secret: Option<String>,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let verifier = build_verifier(&args);

    let connection = Connection::open(&args.db_path).unwrap_or_else(|error| {
        panic!(
            "Could not open database file {}: {error}",
            args.db_path.display()
        )
    });
    let state = AppState::new(connection, verifier).expect("Could not initialize the database");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state)).layer(CorsLayer::permissive());

    let addr = SocketAddr::new(args.address, args.port);
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped unexpectedly");
}

fn build_verifier(args: &Args) -> JwtIdentityVerifier {
    let audience = args.token_audience.as_deref();
    let issuer = args.token_issuer.clone().or_else(|| {
        audience.map(|audience| format!("https://securetoken.google.com/{audience}"))
    });

    if let Some(key_path) = &args.token_public_key {
        let pem = std::fs::read(key_path).unwrap_or_else(|error| {
            panic!("Could not read public key {}: {error}", key_path.display())
        });

        return JwtIdentityVerifier::from_rsa_pem(&pem, audience, issuer.as_deref())
            .expect("Could not load the token public key");
    }

    let secret = args
        .token_secret
        .as_deref()
        .expect("Either --token-public-key or the environment variable 'TOKEN_SECRET' must be set");
    tracing::warn!("Verifying bearer tokens with a shared secret, do not use this in production");

    JwtIdentityVerifier::from_secret(secret.as_bytes(), audience, issuer.as_deref())
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged by the error response itself.
        .on_failure(());

    router.layer(tracing_layer)
}
