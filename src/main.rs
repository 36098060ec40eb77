//! ledgerdesk main entry point

mod commands;

use clap::{Parser, Subcommand};
use ledgerdesk_config::Config;
use ledgerdesk_core::{CoreError, DefaultErrorLogger, ErrorLogger};
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "ledgerdesk")]
#[command(version = "0.1.0")]
#[command(about = "Journals, general ledgers and financial reports for multi-project accounting", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "ledgerdesk.yaml")]
    pub config: PathBuf,

    /// Bearer token; overrides the stored login
    #[arg(long, env = "LEDGERDESK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the configuration file
    Validate,
    /// Write the default configuration file
    InitConfig {
        #[arg(long)]
        force: bool,
    },
    /// Log in and store the token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LEDGERDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Show the claims of the current token
    Whoami,
    /// List projects
    Projects,
    /// List a project's chart of accounts
    Accounts { project: String },
    /// List a project's journal entries
    Journals {
        project: String,
        #[arg(long)]
        search: Option<String>,
        /// entry-number, date, description or posted
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
    },
    /// Work with one journal entry
    Journal {
        project: String,
        #[command(subcommand)]
        action: JournalAction,
    },
    /// Show the general ledger grouped by account
    Ledger {
        project: String,
        #[command(flatten)]
        filter: LedgerFilter,
        /// account-name, account-type, description, debit, credit, balance or date
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Export the general ledger to an .xlsx workbook
    ExportLedger {
        project: String,
        #[command(flatten)]
        filter: LedgerFilter,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export the general balance to an .xlsx workbook
    ExportBalance {
        /// Project name; omit with --all
        project: Option<String>,
        /// Consolidate every project into one workbook
        #[arg(long, conflicts_with = "project")]
        all: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load every project's reports and print the dashboard
    Dashboard {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum JournalAction {
    /// Show an entry with its lines and totals
    Show { id: i64 },
    /// Create an entry from a JSON draft file
    Create {
        file: PathBuf,
        /// Receipt image sent with the entry
        #[arg(long)]
        attachment: Option<PathBuf>,
    },
    /// Replace an unposted entry from a JSON draft file
    Update {
        id: i64,
        file: PathBuf,
        #[arg(long)]
        attachment: Option<PathBuf>,
    },
    Post { id: i64 },
    Unpost { id: i64 },
    Delete { id: i64 },
}

#[derive(clap::Args, Debug, Clone)]
pub struct LedgerFilter {
    #[arg(long)]
    pub search: Option<String>,
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<chrono::NaiveDate>,
    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<chrono::NaiveDate>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PeriodArgs {
    /// month, quarter, year, all or custom
    #[arg(long)]
    pub range: Option<String>,
    #[arg(long)]
    pub from: Option<chrono::NaiveDate>,
    #[arg(long)]
    pub to: Option<chrono::NaiveDate>,
}

fn main() {
    let args = Args::parse();

    let config = match &args.command {
        Command::InitConfig { .. } => Config::default(),
        _ => match Config::load_or_default(&args.config) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: failed to load {}: {}", args.config.display(), e);
                std::process::exit(2);
            }
        },
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();
    log::debug!("config loaded from {}", args.config.display());

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(commands::run(&args, &config)) {
        if let Some(core) = e.downcast_ref::<CoreError>() {
            let context = commands::error_context(&args.command);
            DefaultErrorLogger.log_error(core, &context);
            eprintln!("Error: {}", core);
            for suggestion in core.to_details().suggestions {
                eprintln!("  hint: {}", suggestion);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}
