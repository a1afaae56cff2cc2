//! Ganacert CLI - certification operations from the command line
//!
//! Usage:
//! ```bash
//! ganacert init
//! ganacert record create --brand-number BR-1001 --owner "Ana Quispe" \
//!     --national-id 4455667 --breed nelore --purpose meat --head-count 50 \
//!     --department santa-cruz --municipality Warnes --amount 350
//! ganacert record transition MRC_0001 in-review --actor ana
//! ganacert record approve MRC_0001 MRC_0002 --actor admin
//! ganacert compute-daily-kpi --date 2024-03-01
//! ganacert generate-report --start 2024-03-01 --end 2024-03-31 --type period-summary
//! ganacert dashboard
//! ganacert audit MRC_0001
//! ```

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use ganacert_core::{BrandStatus, CattleBreed, CattlePurpose, Department, ReportType};
use rust_decimal::Decimal;
use std::path::PathBuf;

mod commands;
mod db;
mod error;

use commands::{audit, dashboard, kpi, record, report};
use error::{CliError, CliResult};

/// Ganacert - cattle-brand certification tracking and KPIs
#[derive(Parser)]
#[command(name = "ganacert")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file path
    #[arg(long, default_value = "data/ganacert.db", global = true)]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize database schema
    Init {
        /// Force re-initialization (drops existing data)
        #[arg(long)]
        force: bool,
    },

    /// Show database status
    Status,

    /// Certification record management
    Record {
        #[command(subcommand)]
        action: RecordAction,
    },

    /// Compute daily KPI snapshot(s)
    ComputeDailyKpi {
        /// Snapshot date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Range start (inclusive); computes one snapshot per day
        #[arg(long, conflicts_with = "date", requires = "end")]
        start: Option<NaiveDate>,
        /// Range end (inclusive)
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },

    /// Generate a period report
    GenerateReport {
        /// Period start (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Period end (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Report type
        #[arg(long = "type", value_enum, default_value = "period-summary")]
        report_type: ReportTypeArg,
        /// Producer national ID (required for --type producer)
        #[arg(long)]
        producer_id: Option<String>,
        /// Export format
        #[arg(long, value_enum, default_value = "json")]
        format: FormatArg,
        /// Output file path; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show the management dashboard
    Dashboard,

    /// Audit trail queries
    Audit {
        /// Record ID to list history for
        record_id: Option<String>,
        /// List entries since this date instead
        #[arg(long)]
        since: Option<NaiveDate>,
        /// Aggregate entry counts per actor
        #[arg(long)]
        by_actor: bool,
        /// Aggregate entry counts per day (with --since)
        #[arg(long)]
        by_day: bool,
    },
}

#[derive(Subcommand)]
pub enum RecordAction {
    /// Register a new certification request (starts PENDING)
    Create {
        #[arg(long)]
        brand_number: String,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        national_id: String,
        #[arg(long, value_enum)]
        breed: BreedArg,
        #[arg(long, value_enum)]
        purpose: PurposeArg,
        #[arg(long)]
        head_count: u32,
        #[arg(long, value_enum)]
        department: DepartmentArg,
        #[arg(long)]
        municipality: String,
        /// Certification fee in Bs
        #[arg(long, default_value = "0")]
        amount: Decimal,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        community: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        created_by: Option<String>,
    },
    /// List records
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long, value_enum)]
        department: Option<DepartmentArg>,
        #[arg(long, default_value = "50")]
        limit: u32,
        #[arg(long, default_value = "0")]
        offset: u32,
    },
    /// Show one record with its audit history
    Show {
        record_id: String,
    },
    /// Apply a status transition
    Transition {
        record_id: String,
        #[arg(value_enum)]
        status: StatusArg,
        #[arg(long, default_value = "system")]
        actor: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Approve records (bulk)
    Approve {
        #[arg(required = true)]
        record_ids: Vec<String>,
        #[arg(long, default_value = "system")]
        actor: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Reject records (bulk)
    Reject {
        #[arg(required = true)]
        record_ids: Vec<String>,
        #[arg(long, default_value = "system")]
        actor: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    InReview,
    Approved,
    Rejected,
}

impl StatusArg {
    pub fn to_core(self) -> BrandStatus {
        match self {
            StatusArg::Pending => BrandStatus::Pending,
            StatusArg::InReview => BrandStatus::InReview,
            StatusArg::Approved => BrandStatus::Approved,
            StatusArg::Rejected => BrandStatus::Rejected,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BreedArg {
    Criollo,
    Nelore,
    Brahman,
    SantaGertrudis,
    Charolais,
    Holstein,
    Simmental,
    Angus,
    Hereford,
    Guzerat,
    Mixed,
    Other,
}

impl BreedArg {
    pub fn to_core(self) -> CattleBreed {
        match self {
            BreedArg::Criollo => CattleBreed::Criollo,
            BreedArg::Nelore => CattleBreed::Nelore,
            BreedArg::Brahman => CattleBreed::Brahman,
            BreedArg::SantaGertrudis => CattleBreed::SantaGertrudis,
            BreedArg::Charolais => CattleBreed::Charolais,
            BreedArg::Holstein => CattleBreed::Holstein,
            BreedArg::Simmental => CattleBreed::Simmental,
            BreedArg::Angus => CattleBreed::Angus,
            BreedArg::Hereford => CattleBreed::Hereford,
            BreedArg::Guzerat => CattleBreed::Guzerat,
            BreedArg::Mixed => CattleBreed::Mixed,
            BreedArg::Other => CattleBreed::Other,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PurposeArg {
    Meat,
    Dairy,
    DualPurpose,
    Breeding,
}

impl PurposeArg {
    pub fn to_core(self) -> CattlePurpose {
        match self {
            PurposeArg::Meat => CattlePurpose::Meat,
            PurposeArg::Dairy => CattlePurpose::Dairy,
            PurposeArg::DualPurpose => CattlePurpose::DualPurpose,
            PurposeArg::Breeding => CattlePurpose::Breeding,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DepartmentArg {
    LaPaz,
    SantaCruz,
    Cochabamba,
    Potosi,
    Oruro,
    Chuquisaca,
    Tarija,
    Beni,
    Pando,
}

impl DepartmentArg {
    pub fn to_core(self) -> Department {
        match self {
            DepartmentArg::LaPaz => Department::LaPaz,
            DepartmentArg::SantaCruz => Department::SantaCruz,
            DepartmentArg::Cochabamba => Department::Cochabamba,
            DepartmentArg::Potosi => Department::Potosi,
            DepartmentArg::Oruro => Department::Oruro,
            DepartmentArg::Chuquisaca => Department::Chuquisaca,
            DepartmentArg::Tarija => Department::Tarija,
            DepartmentArg::Beni => Department::Beni,
            DepartmentArg::Pando => Department::Pando,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportTypeArg {
    PeriodSummary,
    DepartmentComparison,
    Producer,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
    Markdown,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        let envelope = serde_json::json!({
            "error": { "kind": err.kind(), "message": err.to_string() }
        });
        eprintln!("{envelope}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Init { force } => {
            db::init_database(&cli.db, force).await?;
            println!("✅ Database initialized at {:?}", cli.db);
        }

        Commands::Status => {
            db::show_status(&cli.db).await?;
        }

        Commands::Record { action } => {
            record::handle(&cli.db, action).await?;
        }

        Commands::ComputeDailyKpi { date, start, end } => {
            kpi::compute(&cli.db, date, start.zip(end)).await?;
        }

        Commands::GenerateReport {
            start,
            end,
            report_type,
            producer_id,
            format,
            output,
        } => {
            let report_type = resolve_report_type(report_type, producer_id)?;
            report::generate(&cli.db, start, end, report_type, format, output).await?;
        }

        Commands::Dashboard => {
            dashboard::show(&cli.db).await?;
        }

        Commands::Audit {
            record_id,
            since,
            by_actor,
            by_day,
        } => {
            audit::run(&cli.db, record_id, since, by_actor, by_day).await?;
        }
    }

    Ok(())
}

fn resolve_report_type(
    arg: ReportTypeArg,
    producer_id: Option<String>,
) -> CliResult<ReportType> {
    Ok(match arg {
        ReportTypeArg::PeriodSummary => ReportType::PeriodSummary,
        ReportTypeArg::DepartmentComparison => ReportType::DepartmentComparison,
        ReportTypeArg::Producer => {
            let national_id = producer_id.ok_or_else(|| {
                CliError::InvalidArgument(
                    "--producer-id is required for --type producer".to_string(),
                )
            })?;
            ReportType::Producer { national_id }
        }
    })
}
