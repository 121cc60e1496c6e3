use clap::{Args, Parser, Subcommand};
use curatx::{
    append_record, check_record, render_report, AppendOptions, GuardConfig, GuardReport, Record,
    Verdict,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// Exit status for failures outside the curatx error taxonomy.
const INTERNAL_FAILURE: u8 = 70;

/// Curate an append-only CSV dataset
#[derive(Parser, Debug)]
#[command(name = "curatx")]
#[command(version, about = "Append rows to a CSV dataset and guard it against near-duplicates", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append a row of key=value pairs, creating or widening the file as needed
    Append(AppendArgs),
    /// Check whether a proposed row is a near-duplicate of existing data
    Guard(GuardArgs),
}

#[derive(Args, Debug)]
struct AppendArgs {
    /// Data as key=value pairs (columns=keys)
    pairs: Vec<String>,

    /// Path to the CSV file
    #[arg(short, long, default_value = "dataset.csv")]
    file: PathBuf,

    /// Add an ISO-8601 UTC timestamp column to this row
    #[arg(long)]
    add_timestamp: bool,

    /// Name of the timestamp column when --add-timestamp is used
    #[arg(long = "timestamp-col", default_value = "timestamp")]
    timestamp_col: String,

    /// When creating a new CSV, stamp the filename with a UTC timestamp (default)
    #[arg(long, overrides_with = "no_stamp_filename_on_create")]
    stamp_filename_on_create: bool,

    /// Disable filename stamping on new CSV creation
    #[arg(long, overrides_with = "stamp_filename_on_create")]
    no_stamp_filename_on_create: bool,

    /// Print a confirmation of what was written
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct GuardArgs {
    /// Proposed data as key=value pairs
    pairs: Vec<String>,

    /// CSV file path
    #[arg(short, long)]
    file: PathBuf,

    /// The column name to check for uniqueness
    #[arg(long = "check-col")]
    check_col: String,

    /// Character-level similarity threshold (0.0-1.0)
    #[arg(long, default_value_t = curatx_similarity::DEFAULT_CHAR_THRESHOLD)]
    threshold: f64,

    /// Token Jaccard threshold (0.0-1.0)
    #[arg(long, default_value_t = curatx_similarity::DEFAULT_TOKEN_THRESHOLD)]
    token_threshold: f64,

    /// Disable URL/email/number/punctuation normalization before comparison
    #[arg(long)]
    no_normalize: bool,

    /// Minimum normalized length to enforce checks (0 to disable)
    #[arg(long, default_value_t = 0)]
    min_length: usize,

    /// Print the verdict as JSON
    #[arg(long)]
    json: bool,

    /// Also report admitted rows
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let log_level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run_append(args: AppendArgs) -> curatx::Result<u8> {
    let record = Record::from_pairs(&args.pairs)?;
    let options = AppendOptions {
        add_timestamp: args.add_timestamp,
        timestamp_column: args.timestamp_col,
        stamp_filename_on_create: args.stamp_filename_on_create || !args.no_stamp_filename_on_create,
    };

    let outcome = append_record(&args.file, record, &options)?;
    if args.verbose {
        println!("{}", outcome);
    }
    Ok(0)
}

fn run_guard(args: GuardArgs) -> anyhow::Result<u8> {
    let record = Record::from_pairs(&args.pairs)?;
    let config = GuardConfig {
        normalize: !args.no_normalize,
        char_threshold: args.threshold,
        token_threshold: args.token_threshold,
        min_length: args.min_length,
    };

    let verdict = check_record(&args.file, &args.check_col, &record, &config)?;
    debug!("Verdict for column '{}': {:?}", args.check_col, verdict);

    if args.json {
        let report = GuardReport::new(&args.check_col, &verdict, &config);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if matches!(verdict, Verdict::Reject(_)) || args.verbose {
        println!("{}", render_report(&verdict, &config));
    }
    Ok(verdict.exit_code())
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<curatx::Error>()
        .map(|e| e.kind().exit_code())
        .unwrap_or(INTERNAL_FAILURE)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::from(INTERNAL_FAILURE);
    }

    let result = match cli.command {
        Command::Append(args) => run_append(args).map_err(anyhow::Error::from),
        Command::Guard(args) => run_guard(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}
