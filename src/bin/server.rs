use std::{
    error::Error,
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use cashcards::{
    AppState, Authenticator, InMemoryUsers, PaginationConfig, PasswordHash, SQLiteUsers,
    build_router, graceful_shutdown, logging_middleware,
};

/// The REST API server for cash cards.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "CASHCARDS_DB_PATH")]
    db_path: String,

    /// The address to serve the API from.
    #[arg(long, env = "CASHCARDS_ADDRESS", default_value = "127.0.0.1")]
    address: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, env = "CASHCARDS_PORT", default_value_t = 3000)]
    port: u16,

    /// The number of cash cards per page when a request does not say.
    #[arg(
        long,
        env = "CASHCARDS_PAGE_SIZE",
        default_value_t = PaginationConfig::default().default_page_size
    )]
    page_size: u64,

    /// The largest page of cash cards a client may request.
    #[arg(
        long,
        env = "CASHCARDS_MAX_PAGE_SIZE",
        default_value_t = PaginationConfig::default().max_page_size
    )]
    max_page_size: u64,

    /// Authenticate against the built-in demo accounts instead of the users in the database.
    #[arg(long, env = "CASHCARDS_DEMO_USERS")]
    demo_users: bool,

    /// File path for the debug log.
    #[arg(long, env = "CASHCARDS_LOG_PATH", default_value = "debug.log")]
    log_path: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    setup_logging(&args.log_path)?;

    let addr = SocketAddr::new(args.address, args.port);

    let conn = Connection::open(&args.db_path)?;
    let conn = Arc::new(Mutex::new(conn));

    let authenticator: Arc<dyn Authenticator> = if args.demo_users {
        tracing::warn!("Using the built-in demo accounts, do not use this in production.");
        Arc::new(InMemoryUsers::demo(PasswordHash::DEFAULT_COST)?)
    } else {
        Arc::new(SQLiteUsers::new(conn.clone()))
    };

    let pagination_config = PaginationConfig {
        default_page_size: args.page_size,
        max_page_size: args.max_page_size,
    };

    let state = AppState::new(conn, authenticator, pagination_config)?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn setup_logging(log_path: &str) -> Result<(), Box<dyn Error>> {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();

    Ok(())
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
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
