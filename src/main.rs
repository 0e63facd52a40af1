use chrono::Utc;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use somalipay::application::service::{PaymentResponse, PaymentResult, PaymentService};
use somalipay::config::PaymentConfig;
use somalipay::domain::catalog::MethodCatalog;
use somalipay::domain::payment::{PaymentRecord, PaymentRequest, PaymentSummary};
use somalipay::domain::ports::{GatewayMode, PaymentStoreBox};
use somalipay::domain::room::Room;
use somalipay::infrastructure::gateway_from_config;
use somalipay::infrastructure::in_memory::{InMemoryPaymentStore, InMemoryRoomDirectory};
#[cfg(feature = "storage-rocksdb")]
use somalipay::infrastructure::rocksdb::RocksDbPaymentStore;
use somalipay::interfaces::csv::room_reader::RoomReader;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the payment methods currently accepted
    Methods,
    /// Show the payment mode and any missing production settings
    CheckConfig,
    /// Open a payment session for a booking
    Book {
        /// Rooms CSV file (id,slug,name,price,discount)
        #[arg(long)]
        rooms: PathBuf,
        /// Booking request JSON file
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        user: String,
        /// Also run the payment attempt right away
        #[arg(long)]
        execute: bool,
    },
    /// Attempt a stored pending payment
    Pay { payment_id: String },
    /// Mark overdue pending payments as expired
    Expire,
    /// Summarize a user's payments
    Summary {
        #[arg(long)]
        user: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigReport<'a> {
    mode: GatewayMode,
    missing_variables: &'a [&'static str],
}

#[derive(Serialize)]
struct Booking {
    payment: PaymentResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempt: Option<PaymentResult>,
}

/// Stored record plus its countdown, keeping the record's own field names.
#[derive(Serialize)]
struct PaymentView {
    #[serde(flatten)]
    record: PaymentRecord,
    time_remaining: String,
}

#[derive(Serialize)]
struct UserReport {
    summary: PaymentSummary,
    payments: Vec<PaymentView>,
}

#[derive(Serialize)]
struct ExpireReport {
    expired: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = PaymentConfig::from_env().into_diagnostic()?;
    let catalog = Arc::new(MethodCatalog::from_config(&config));

    if let Command::CheckConfig = cli.command {
        let mode = if config.demo_mode {
            GatewayMode::Demo
        } else {
            GatewayMode::Production
        };
        return print_json(&ConfigReport {
            mode,
            missing_variables: config.missing_production_vars(),
        });
    }
    if let Command::Methods = cli.command {
        return print_json(&catalog.list_active_methods());
    }

    let store = open_store(cli.db_path)?;
    let gateway = gateway_from_config(&config).into_diagnostic()?;

    match cli.command {
        Command::Book {
            rooms,
            request,
            user,
            execute,
        } => {
            let rooms = load_rooms(rooms)?;
            let request: PaymentRequest =
                serde_json::from_reader(File::open(request).into_diagnostic()?).into_diagnostic()?;
            let service = PaymentService::new(catalog, Box::new(rooms), store, gateway);

            let session = service.open(&user, &request).await.into_diagnostic()?;
            // Settle from the opened record, which exists even if storing it failed.
            let attempt = if execute {
                Some(service.settle_record(&session.record).await.into_diagnostic()?)
            } else {
                None
            };
            print_json(&Booking {
                payment: session.response,
                attempt,
            })
        }
        Command::Pay { payment_id } => {
            let service = PaymentService::new(catalog, no_rooms(), store, gateway);
            let result = service.settle(&payment_id).await.into_diagnostic()?;
            print_json(&result)
        }
        Command::Expire => {
            let service = PaymentService::new(catalog, no_rooms(), store, gateway);
            let expired = service.expire_overdue(Utc::now()).await.into_diagnostic()?;
            print_json(&ExpireReport { expired })
        }
        Command::Summary { user } => {
            let service = PaymentService::new(catalog, no_rooms(), store, gateway);
            let summary = service.summary(&user).await.into_diagnostic()?;
            let now = Utc::now();
            let payments = service
                .user_payments(&user)
                .await
                .into_diagnostic()?
                .into_iter()
                .map(|record| PaymentView {
                    time_remaining: record.time_remaining(now),
                    record,
                })
                .collect();
            print_json(&UserReport { summary, payments })
        }
        Command::Methods | Command::CheckConfig => Ok(()),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("somalipay=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_store(db_path: Option<PathBuf>) -> Result<PaymentStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDbPaymentStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryPaymentStore::new()))
        }
        None => Ok(Box::new(InMemoryPaymentStore::new())),
    }
}

fn load_rooms(path: PathBuf) -> Result<InMemoryRoomDirectory> {
    let file = File::open(path).into_diagnostic()?;
    let rooms: Vec<Room> = RoomReader::new(file)
        .rooms()
        .collect::<somalipay::error::Result<_>>()
        .into_diagnostic()?;
    tracing::debug!(rooms = rooms.len(), "loaded rooms");
    Ok(InMemoryRoomDirectory::new(rooms))
}

fn no_rooms() -> Box<InMemoryRoomDirectory> {
    Box::new(InMemoryRoomDirectory::default())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).into_diagnostic()?;
    io::Write::write_all(&mut out, b"\n").into_diagnostic()?;
    Ok(())
}
