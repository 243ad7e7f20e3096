//! splitsheet CLI - shared-expense spreadsheet extraction tool
//!
//! A command-line tool for turning expense workbooks into JSON records.

use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use splitsheet::render::JsonFormat;
use splitsheet::{ExtractOptions, Extraction, SheetSelector};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Shared-expense spreadsheet extraction to JSON
#[derive(Parser)]
#[command(
    name = "splitsheet",
    version,
    about = "Extract shared expenses from spreadsheets",
    long_about = "splitsheet - Shared-expense spreadsheet extraction tool.\n\n\
                  Reads an XLSX expense sheet and writes one JSON record per expense \
                  with date, description, amount, payer and per-person shares."
)]
struct Cli {
    /// Show debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an expense sheet to JSON
    #[command(visible_alias = "json")]
    Convert {
        #[command(flatten)]
        input: InputArgs,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show how each row of an expense sheet is read
    Inspect {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show paid, share and net totals per person
    Balances {
        #[command(flatten)]
        input: InputArgs,

        /// Print the totals as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Input selection shared by the reading commands.
#[derive(Args)]
struct InputArgs {
    /// Input workbook path
    input: PathBuf,

    /// Worksheet name (default: first sheet)
    #[arg(long, conflicts_with = "sheet_index")]
    sheet: Option<String>,

    /// Worksheet position, starting at 0
    #[arg(long)]
    sheet_index: Option<usize>,

    /// Leading spreadsheet rows that are not part of the table
    #[arg(long, default_value_t = splitsheet::options::DEFAULT_SKIP_ROWS)]
    skip_rows: usize,

    /// Comma-separated participant names, in share-column order
    #[arg(long, value_delimiter = ',')]
    participants: Option<Vec<String>>,
}

impl InputArgs {
    fn options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::new().with_skip_rows(self.skip_rows);

        if let Some(ref name) = self.sheet {
            options = options.with_sheet_name(name.clone());
        } else if let Some(idx) = self.sheet_index {
            options = options.with_sheet(SheetSelector::Index(idx));
        }

        if let Some(ref names) = self.participants {
            options = options.with_participants(names.iter().map(|n| n.trim().to_string()));
        }

        options
    }

    fn extract(&self) -> CliResult<Extraction> {
        let options = self.options();
        tracing::debug!(input = %self.input.display(), sheet = %options.sheet, "reading workbook");
        Ok(splitsheet::extract_file_with_options(&self.input, &options)?)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Convert {
            input,
            output,
            compact,
        } => {
            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };

            let (count, json) = with_spinner("Reading workbook...", |pb| {
                let extraction = input.extract()?;
                pb.set_message("Rendering to JSON...");
                let json = splitsheet::render::to_json(extraction.records(), format)?;
                Ok((extraction.records().len(), json))
            })?;

            write_output(output.as_ref(), &json)?;

            match output {
                Some(path) => println!(
                    "{} Converted {} expenses: {}",
                    "✓".green().bold(),
                    count,
                    path.display()
                ),
                None => eprintln!("{} Converted {} expenses", "✓".green().bold(), count),
            }
        }

        Commands::Inspect { input } => {
            let extraction = with_spinner("Analyzing workbook...", |_| input.extract())?;
            print_inspection(&input, &input.options(), &extraction);
        }

        Commands::Balances { input, json } => {
            let options = input.options();
            let extraction = with_spinner("Reading workbook...", |_| input.extract())?;

            let participants = options.layout.participant_names();
            let balances = splitsheet::compute_balances(extraction.records(), &participants);
            let settlements = splitsheet::compute_settlements(&balances);

            if json {
                let report = serde_json::json!({
                    "balances": balances,
                    "settlements": settlements,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            print_balances(&balances, &settlements, extraction.records().len());
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Run `work` under a spinner that is cleared whether or not it succeeds.
fn with_spinner<T>(
    message: &str,
    work: impl FnOnce(&ProgressBar) -> CliResult<T>,
) -> CliResult<T> {
    let pb = create_spinner(message);
    let result = work(&pb);
    pb.finish_and_clear();
    result
}

fn print_balances(
    balances: &splitsheet::Balances,
    settlements: &[splitsheet::Settlement],
    expenses: usize,
) {
    println!("{}", "Balances".cyan().bold());
    println!("{}", "─".repeat(52));
    println!(
        "{:<16} {:>11} {:>11} {:>11}",
        "Name".bold(),
        "Paid".bold(),
        "Share".bold(),
        "Net".bold()
    );
    for balance in balances.iter() {
        let net = format!("{:>11.2}", balance.net());
        let net = if balance.net() < 0.0 {
            net.red()
        } else {
            net.green()
        };
        println!(
            "{:<16} {:>11.2} {:>11.2} {}",
            balance.name, balance.total_paid, balance.total_share, net
        );
    }

    println!("\n{}", "Settlements".cyan().bold());
    println!("{}", "─".repeat(52));
    if settlements.is_empty() {
        println!("{} Everyone is settled up", "✓".green().bold());
    }
    for settlement in settlements {
        println!(
            "{} {} {}: {:.2}",
            settlement.from,
            "→".dimmed(),
            settlement.to,
            settlement.amount
        );
    }

    println!("\n{}: {}", "Expenses".bold(), expenses);
}

fn print_inspection(input: &InputArgs, options: &ExtractOptions, extraction: &Extraction) {
    let normalization = &extraction.normalization;

    println!("{}", "Workbook Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.input.file_name().unwrap_or_default().to_string_lossy()
    );
    println!("{}: {}", "Format".bold(), extraction.format);
    println!("{}: {}", "Sheet".bold(), extraction.sheet);
    println!("{}: {}", "Rows".bold(), extraction.rows.len());
    println!("{}: {}", "Skipped leading rows".bold(), extraction.skip_rows);
    println!(
        "{}: {}",
        "Participants".bold(),
        options.layout.participant_names().join(", ")
    );

    match extraction.header_row {
        Some(idx) => println!("{}: sheet row {}", "Header row".bold(), idx),
        None => println!("{} No header row found", "!".yellow().bold()),
    }

    println!("\n{}", "Dense Rows (sheet positions)".cyan().bold());
    println!("{}", "─".repeat(40));
    for (idx, row) in splitsheet::dense_rows(
        &extraction.rows,
        splitsheet::locate::DEFAULT_MIN_FILLED,
        splitsheet::locate::DEFAULT_LAST_INDEX,
    ) {
        println!("{:>4}: {}", idx, row);
    }

    println!("\n{}", "Row Classification (record ids)".cyan().bold());
    println!("{}", "─".repeat(40));
    for summary in splitsheet::summarize(extraction.table_rows(), &options.layout) {
        let kind = match summary.kind {
            splitsheet::RowKind::Data => summary.kind.label().green(),
            splitsheet::RowKind::Terminator => summary.kind.label().red(),
            _ => summary.kind.label().dimmed(),
        };
        let marker = if summary.keyword_match { "*" } else { " " };
        println!(
            "{:>4}{} {:<10} {} cells",
            summary.index, marker, kind, summary.filled
        );
        if normalization.stopped_at == Some(summary.index) {
            break;
        }
    }

    println!("\n{}", "Result".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Expenses".bold(), normalization.records.len());
    println!("{}: {}", "Skipped".bold(), normalization.skipped.len());
    match normalization.stopped_at {
        Some(idx) => println!("{}: {}", "Stopped at row".bold(), idx),
        None => println!("{}: {}", "Stopped at row".bold(), "-".dimmed()),
    }
}

fn print_version() {
    println!("{} {}", "splitsheet".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Shared-expense spreadsheet extraction to JSON");
    println!();
    println!("Supported formats: XLSX, XLSM, XLTX");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> CliResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
