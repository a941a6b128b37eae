use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payshare::application::engine::LedgerService;
use payshare::domain::identity::Identity;
use payshare::domain::ports::{EventSinkBox, LedgerStoreBox};
use payshare::infrastructure::in_memory::{InMemoryEventLog, InMemoryLedgerStore};
use payshare::infrastructure::wallet::InMemoryWallet;
use payshare::interfaces::csv::operation_reader::OperationReader;
use payshare::interfaces::csv::payee_writer::PayeeWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Recipient whose incoming transfers fail. May be repeated.
    #[arg(long = "reject", value_name = "ID")]
    rejected: Vec<u32>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(LedgerStoreBox, EventSinkBox)> {
    use payshare::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(db_path) => {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            let ledger_store: LedgerStoreBox = Box::new(store.clone());
            let sink: EventSinkBox = Box::new(store);
            Ok((ledger_store, sink))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(LedgerStoreBox, EventSinkBox)> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (LedgerStoreBox, EventSinkBox) {
    (
        Box::new(InMemoryLedgerStore::new()),
        Box::new(InMemoryEventLog::new()),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let wallet = InMemoryWallet::new();
    for id in &cli.rejected {
        wallet.reject(Identity::new(*id));
    }

    let (store, sink) = open_stores(cli.db_path)?;
    let service = LedgerService::new(store, sink, Box::new(wallet));

    // Replay operations
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for (line, op_result) in reader.operations().enumerate() {
        match op_result {
            Ok(op) => {
                if let Err(e) = service.process_operation(op).await {
                    if !e.is_domain() {
                        return Err(e).into_diagnostic();
                    }
                    eprintln!("Error processing operation {}: {}", line + 1, e);
                }
            }
            Err(e) => {
                eprintln!("Error reading operation {}: {}", line + 1, e);
            }
        }
    }

    let ledger = service.into_ledger().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = PayeeWriter::new(stdout.lock());
    writer.write_ledger(&ledger).into_diagnostic()?;

    Ok(())
}
