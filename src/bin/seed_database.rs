use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rusqlite::Connection;

use sales_dashboard::{
    DEFAULT_DATA_URL, RemoteFeed, initialize_db, load_records_from_file, replace_all_records,
};

/// A utility for filling the sales dashboard database from the transaction feed.
///
/// Any transactions already in the database are replaced.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database to fill.
    #[arg(long, short)]
    db_path: PathBuf,

    /// URL of the JSON feed of transactions.
    #[arg(long, default_value = DEFAULT_DATA_URL, conflicts_with = "data_file")]
    data_url: String,

    /// File path to a JSON array of transactions to use instead of the feed.
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// How long to wait for the transaction feed before giving up.
    #[arg(long, default_value_t = 30)]
    fetch_timeout_secs: u64,
}

/// Fetch the transaction feed once and store it in the database.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let records = match &args.data_file {
        Some(data_file) => {
            println!("Reading transactions from {data_file:#?}");
            load_records_from_file(data_file)?
        }
        None => {
            println!("Fetching transactions from {}", args.data_url);
            RemoteFeed::new(&args.data_url, Duration::from_secs(args.fetch_timeout_secs))?
                .fetch()
                .await?
        }
    };

    println!("Opening database at {:#?}", args.db_path);
    let mut conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let count = replace_all_records(&records, &mut conn)?;

    println!("Stored {count} transactions. Success!");

    Ok(())
}
