use std::{
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
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
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use sales_dashboard::{
    AppState, DEFAULT_DATA_URL, PaginationConfig, RecordStore, RemoteFeed, SoldPolicy,
    build_router, graceful_shutdown, initialize_db, load_records_from_file, logging_middleware,
};

/// The JSON API server for the sales dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The address to serve the API from.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// URL of the JSON feed of transactions, fetched on every request.
    #[arg(long, default_value = DEFAULT_DATA_URL, conflicts_with_all = ["data_file", "db_path"])]
    data_url: String,

    /// File path to a JSON array of transactions, loaded once at startup.
    #[arg(long, conflicts_with = "db_path")]
    data_file: Option<PathBuf>,

    /// File path to a SQLite database created with `seed_database`.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// How long to wait for the transaction feed before giving up.
    #[arg(long, default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// How to decide whether a transaction counts as a sale.
    #[arg(long, value_enum, default_value_t = SoldPolicy::Detect)]
    sold_policy: SoldPolicy,

    /// The number of transactions per page when a request does not say.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(i64).range(1..))]
    default_page_size: i64,

    /// File path to write debug logs to.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(args.log_file.as_ref());

    let record_store = open_record_store(&args);
    let pagination_config = PaginationConfig {
        default_page_size: args.default_page_size,
        ..Default::default()
    };
    let app_state = AppState::new(record_store, args.sold_policy, pagination_config);

    let addr = SocketAddr::new(args.host, args.port);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(app_state).layer(middleware::from_fn(logging_middleware)),
    );

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not start server");
}

fn open_record_store(args: &Args) -> RecordStore {
    if let Some(db_path) = &args.db_path {
        tracing::info!("Serving transactions from the database at {}", db_path.display());
        let conn = Connection::open(db_path).expect("Could not open database");
        initialize_db(&conn).expect("Could not initialize database");

        return RecordStore::Database(Arc::new(Mutex::new(conn)));
    }

    if let Some(data_file) = &args.data_file {
        tracing::info!("Serving transactions from {}", data_file.display());
        let records = load_records_from_file(data_file).expect("Could not load transactions");
        tracing::info!("Loaded {} transactions", records.len());

        return RecordStore::in_memory(records);
    }

    tracing::info!("Serving transactions from {}", args.data_url);
    let feed = RemoteFeed::new(
        &args.data_url,
        Duration::from_secs(args.fetch_timeout_secs),
    )
    .expect("Could not create HTTP client");

    RecordStore::Remote(feed)
}

fn setup_logging(log_file: Option<&PathBuf>) {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(filter::LevelFilter::INFO);

    let debug_log = log_file.map(|path| {
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("Could not create log file");

        tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(Arc::new(log_file))
            .with_filter(filter::LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
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
        // Errors are logged where they are turned into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
