use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use feeledger::application::aggregation::{
    compute_class_summaries, compute_global_stats, compute_monthly_collection,
    compute_payment_method_distribution, compute_student_balances,
};
use feeledger::application::query::{PaymentQuery, StudentQuery, available_classes};
use feeledger::application::service::FeeService;
use feeledger::domain::class_label::ClassLabel;
use feeledger::domain::payment::{PaymentMethod, PaymentStatus};
use feeledger::infrastructure::in_memory::{
    InMemoryFeeStructureRepository, InMemoryPaymentLedger, InMemoryStudentRepository,
};
use feeledger::interfaces::csv::report_writer::ReportWriter;
use feeledger::interfaces::csv::student_reader::StudentReader;
use feeledger::interfaces::json::snapshot_reader::{read_snapshot, write_json};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// JSON snapshot with students, feeStructures and payments to load first
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// CSV file of students to load first
    #[arg(long, global = true)]
    students_csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collection summary per class (CSV)
    Classes,
    /// Expected, paid and pending fees per student (CSV)
    Balances {
        /// Date used to flag overdue fee items [default: today]
        #[arg(long)]
        reference_date: Option<NaiveDate>,
    },
    /// Collection per calendar month (JSON)
    Monthly {
        /// Year to bucket [default: current year]
        #[arg(long)]
        year: Option<i32>,
    },
    /// School-wide totals (JSON)
    Global {
        /// Date whose month counts as "this month" [default: today]
        #[arg(long)]
        reference_date: Option<NaiveDate>,
    },
    /// Share of payments per payment method (JSON)
    Methods,
    /// Every dashboard view in one report (JSON)
    Dashboard {
        #[arg(long)]
        reference_date: Option<NaiveDate>,
    },
    /// Students matching a filter (JSON)
    Students {
        /// Part of the name, roll number or father's name
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        class: Option<String>,
    },
    /// Payments matching a filter (JSON)
    Payments {
        /// Part of the student name or roll number
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<PaymentStatus>,
        #[arg(long)]
        method: Option<PaymentMethod>,
        #[arg(long)]
        class: Option<String>,
    },
    /// Distinct class labels of all students, one per line
    ClassList,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(feature = "storage-rocksdb")]
fn build_service(db_path: Option<PathBuf>) -> Result<FeeService> {
    use feeledger::infrastructure::rocksdb::RocksDBStore;

    if let Some(db_path) = db_path {
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        return Ok(FeeService::new(
            Box::new(store.clone()),
            Box::new(store.clone()),
            Box::new(store),
        ));
    }
    Ok(in_memory_service())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn build_service(db_path: Option<PathBuf>) -> Result<FeeService> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(in_memory_service())
}

fn in_memory_service() -> FeeService {
    FeeService::new(
        Box::new(InMemoryStudentRepository::new()),
        Box::new(InMemoryFeeStructureRepository::new()),
        Box::new(InMemoryPaymentLedger::new()),
    )
}

async fn load_inputs(service: &FeeService, cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.snapshot {
        let file = File::open(path).into_diagnostic()?;
        let snapshot = read_snapshot(BufReader::new(file)).into_diagnostic()?;
        service.import(snapshot).await.into_diagnostic()?;
    }

    if let Some(path) = &cli.students_csv {
        let file = File::open(path).into_diagnostic()?;
        for student in StudentReader::new(file).students() {
            match student {
                Ok(student) => {
                    if let Err(e) = service.create_student(student).await {
                        warn!("Error importing student: {}", e);
                    }
                }
                Err(e) => warn!("Error reading student: {}", e),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "feeledger=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let service = build_service(cli.db_path.clone())?;
    load_inputs(&service, &cli).await?;

    let snapshot = service.snapshot().await.into_diagnostic()?;
    let students = &snapshot.students;
    let structures = &snapshot.fee_structures;
    let payments = &snapshot.payments;
    let stdout = io::stdout();

    match cli.command {
        Command::Classes => {
            let summaries = compute_class_summaries(students, structures, payments).into_diagnostic()?;
            ReportWriter::new(stdout.lock())
                .write_class_summaries(&summaries)
                .into_diagnostic()?;
        }
        Command::Balances { reference_date } => {
            let balances = compute_student_balances(
                students,
                structures,
                payments,
                reference_date.unwrap_or_else(today),
            )
            .into_diagnostic()?;
            ReportWriter::new(stdout.lock())
                .write_student_balances(&balances)
                .into_diagnostic()?;
        }
        Command::Monthly { year } => {
            let year = year.unwrap_or_else(|| today().year());
            let monthly = compute_monthly_collection(payments, year).into_diagnostic()?;
            write_json(stdout.lock(), &monthly).into_diagnostic()?;
        }
        Command::Global { reference_date } => {
            let stats = compute_global_stats(
                students,
                structures,
                payments,
                reference_date.unwrap_or_else(today),
            )
            .into_diagnostic()?;
            write_json(stdout.lock(), &stats).into_diagnostic()?;
        }
        Command::Methods => {
            let distribution = compute_payment_method_distribution(payments).into_diagnostic()?;
            write_json(stdout.lock(), &distribution).into_diagnostic()?;
        }
        Command::Dashboard { reference_date } => {
            let report = service
                .dashboard(reference_date.unwrap_or_else(today))
                .await
                .into_diagnostic()?;
            write_json(stdout.lock(), &report).into_diagnostic()?;
        }
        Command::Students { search, class } => {
            let query = StudentQuery {
                search,
                class: class.map(ClassLabel::from),
            };
            write_json(stdout.lock(), &query.apply(students)).into_diagnostic()?;
        }
        Command::Payments {
            search,
            status,
            method,
            class,
        } => {
            let query = PaymentQuery {
                search,
                status,
                method,
                class: class.map(ClassLabel::from),
            };
            write_json(stdout.lock(), &query.apply(payments)).into_diagnostic()?;
        }
        Command::ClassList => {
            let mut out = stdout.lock();
            for class in available_classes(students) {
                writeln!(out, "{}", class).into_diagnostic()?;
            }
        }
    }

    Ok(())
}
