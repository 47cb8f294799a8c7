use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};

use crate::application::{AppError, ImportMode, LedgerService, Period, RankKey};
use crate::domain::{format_amount, Amount, Category, Transaction};
use crate::io::{read_csv, ImportOptions, ImportResult, Importer, Exporter};
use crate::storage::SheetStore;

/// Biashara - sales and repairs ledger
#[derive(Parser)]
#[command(name = "biashara")]
#[command(about = "Record sales and repair jobs, keep backups, see what sells")]
#[command(version)]
pub struct Cli {
    /// Working ledger file (CSV, same layout as backups)
    #[arg(short, long, env = "BIASHARA_FILE", default_value = "mauzo_yangu.csv", global = true)]
    pub file: PathBuf,

    /// SQLite sheet to keep in sync with the ledger
    #[arg(long, env = "BIASHARA_SHEET", global = true)]
    pub sheet: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a sale or a job
    Record {
        /// Item or service name (e.g., "screen", "flashing")
        item: String,

        /// Price in shillings
        #[arg(short, long)]
        price: i64,

        /// Phone model (e.g., "A10s")
        #[arg(short, long, default_value = "")]
        model: String,

        /// Category: job (Job/Service) or spare (Spare/Good)
        #[arg(short, long, default_value = "spare")]
        category: String,

        /// Date of the sale (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete the most recently recorded transaction
    Undo,

    /// List transactions
    List {
        #[command(flatten)]
        window: WindowArgs,

        /// Show only the last N transactions
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Revenue and ranking reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Write a CSV backup
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Replace the ledger with a CSV backup
    Restore {
        /// Backup file
        input: String,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,
    },

    /// Merge a CSV backup into the ledger, skipping identical rows
    Merge {
        /// Backup file
        input: String,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,
    },

    /// Merge the remote sheet into the ledger and write the result back
    Sync,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Revenue total with a per-category split
    Revenue {
        #[command(flatten)]
        window: WindowArgs,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Best sellers by number of sales
    Ranking {
        #[command(flatten)]
        window: WindowArgs,

        /// Grouping: item-model, category-item-model
        #[arg(long, default_value = "item-model")]
        by: String,

        /// Number of groups to show
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
}

/// Reporting window: a named period or explicit dates
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Period: today, month, year, all
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub period: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

/// The ledger for one command run, with where it came from.
struct Session {
    service: LedgerService,
    file: PathBuf,
    sheet: Option<SheetStore>,
    /// Set once the sheet has been read into the ledger. Until then a push would
    /// overwrite rows this run never saw.
    sheet_pulled: bool,
}

impl Session {
    async fn open(file: &Path, sheet: Option<&str>) -> Result<Self> {
        let mut service = LedgerService::new();

        if file.exists() {
            let reader = File::open(file)
                .with_context(|| format!("Failed to open ledger file: {}", file.display()))?;
            let table = read_csv(reader)
                .with_context(|| format!("Failed to read ledger file: {}", file.display()))?;
            service
                .import_sheet(&table, ImportMode::Replace)
                .with_context(|| format!("Ledger file is not usable: {}", file.display()))?;
        }

        let store = match sheet {
            Some(path) => match SheetStore::open(path).await {
                Ok(store) => Some(store),
                Err(err) => {
                    tracing::warn!("cannot open sheet {path}: {err:#}");
                    eprintln!("Sheet unavailable, working locally only");
                    None
                }
            },
            None => None,
        };

        let mut sheet_pulled = false;
        if let Some(store) = &store {
            match service.pull(store, ImportMode::Merge).await {
                Ok(result) => {
                    sheet_pulled = true;
                    if result.imported > 0 {
                        tracing::info!(imported = result.imported, "merged remote sheet");
                    }
                }
                Err(AppError::RemoteUnavailable(_)) => {
                    eprintln!("Sheet unavailable, working locally only");
                }
                Err(err) => return Err(err).context("Remote sheet is not usable"),
            }
        }

        Ok(Self {
            service,
            file: file.to_path_buf(),
            sheet: store,
            sheet_pulled,
        })
    }

    /// Write the ledger file, then the remote sheet if it was read this run.
    /// The file is written first so a failed remote write loses nothing.
    async fn save(&self) -> Result<()> {
        let writer = File::create(&self.file)
            .with_context(|| format!("Failed to write ledger file: {}", self.file.display()))?;
        Exporter::new(&self.service).export_csv(writer)?;

        if !self.sheet_pulled {
            if self.sheet.is_some() {
                tracing::warn!("sheet was not read this run, leaving it untouched");
            }
            return Ok(());
        }

        if let Some(store) = &self.sheet {
            self.service.push(store).await.with_context(|| {
                format!(
                    "Saved to {}, but the sheet was not updated; run `biashara sync` to retry",
                    self.file.display()
                )
            })?;
        }
        Ok(())
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut session = Session::open(&self.file, self.sheet.as_deref()).await?;
        let today = Local::now().date_naive();

        match self.command {
            Commands::Record {
                item,
                price,
                model,
                category,
                date,
            } => {
                let category = Category::from_str(&category).ok_or_else(|| {
                    anyhow::anyhow!("Invalid category '{}'. Valid: job, spare", category)
                })?;

                let now = match date {
                    Some(date_str) => start_of_day(parse_date(&date_str)?),
                    None => Local::now().naive_local(),
                };

                let tx = session
                    .service
                    .record_transaction(&model, &item, category, price, now)?;
                session.save().await?;

                println!(
                    "Recorded: {} ({}) {} TSh",
                    tx.item,
                    tx.model,
                    format_amount(tx.price)
                );
            }

            Commands::Undo => match session.service.delete_last() {
                Some(tx) => {
                    session.save().await?;
                    println!(
                        "Deleted: {} {} ({}) {} TSh",
                        tx.date,
                        tx.item,
                        tx.model,
                        format_amount(tx.price)
                    );
                }
                None => println!("Nothing to delete."),
            },

            Commands::List { window, limit } => {
                let (from, to) = resolve_window(&window, today)?;
                let records = session.service.transactions_between(from, to);
                run_list_command(&records, limit);
            }

            Commands::Report(cmd) => run_report_command(&session.service, cmd, today)?,

            Commands::Export { output } => {
                let exporter = Exporter::new(&session.service);
                match output {
                    Some(path) => {
                        let file = File::create(&path)
                            .with_context(|| format!("Failed to create output file: {}", path))?;
                        let count = exporter.export_csv(file)?;
                        eprintln!("Exported {} transactions to {}", count, path);
                    }
                    None => {
                        exporter.export_csv(std::io::stdout())?;
                    }
                }
            }

            Commands::Restore { input, dry_run } => {
                let result = run_import_command(&mut session, &input, ImportMode::Replace, dry_run)?;
                if !dry_run {
                    session.save().await?;
                }
                print_import_result(&result, dry_run);
            }

            Commands::Merge { input, dry_run } => {
                let result = run_import_command(&mut session, &input, ImportMode::Merge, dry_run)?;
                if !dry_run && result.imported > 0 {
                    session.save().await?;
                }
                print_import_result(&result, dry_run);
            }

            Commands::Sync => {
                let store = session
                    .sheet
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("No usable sheet; pass --sheet <path>"))?;
                let result = session.service.sync(store).await?;
                session.sheet_pulled = true;
                session.save().await?;
                println!("Sync complete");
                println!("  Merged:  {}", result.pulled.imported);
                println!("  Written: {}", result.pushed);
            }
        }

        Ok(())
    }
}

fn run_import_command(
    session: &mut Session,
    input: &str,
    mode: ImportMode,
    dry_run: bool,
) -> Result<ImportResult> {
    let reader =
        File::open(input).with_context(|| format!("Failed to open input file: {}", input))?;
    let options = ImportOptions { mode, dry_run };
    let result = Importer::new(&mut session.service).import_csv(reader, options)?;
    Ok(result)
}

fn print_import_result(result: &ImportResult, dry_run: bool) {
    if dry_run {
        println!("Validation successful");
    } else {
        println!("Import complete");
    }
    println!("  Imported:   {}", result.imported);
    println!("  Duplicates: {}", result.duplicates);
    println!("  Skipped:    {}", result.skipped);

    if !result.errors.is_empty() {
        println!("\nSkipped rows:");
        for error in result.errors.iter().take(10) {
            println!(
                "  Line {}: {}",
                error.line,
                error
                    .field
                    .as_ref()
                    .map(|f| format!("{}: ", f))
                    .unwrap_or_default()
                    + &error.error
            );
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more", result.errors.len() - 10);
        }
    }
}

fn run_list_command(records: &[Transaction], limit: Option<usize>) {
    if records.is_empty() {
        println!("No transactions found.");
        return;
    }

    let skip = limit.map_or(0, |n| records.len().saturating_sub(n));

    println!(
        "{:<12} {:<12} {:<24} {:<12} {:>10}",
        "DATE", "MODEL", "ITEM", "CATEGORY", "PRICE"
    );
    println!("{}", "-".repeat(74));
    for tx in &records[skip..] {
        println!(
            "{:<12} {:<12} {:<24} {:<12} {:>10}",
            tx.date.format("%Y-%m-%d"),
            truncate(&tx.model, 12),
            truncate(&tx.item, 24),
            tx.category,
            format_amount(tx.price)
        );
    }
}

fn run_report_command(service: &LedgerService, cmd: ReportCommands, today: NaiveDate) -> Result<()> {
    match cmd {
        ReportCommands::Revenue { window, format } => {
            let (from, to) = resolve_window(&window, today)?;
            let report = service.revenue_report(from, to);

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                "csv" => {
                    println!("category,total,count,percentage");
                    for cat in &report.categories {
                        println!(
                            "{},{},{},{:.2}",
                            cat.category, cat.total, cat.count, cat.percentage
                        );
                    }
                }
                _ => {
                    // Table format
                    println!("Revenue Report");
                    println!("Period: {}", describe_window(from, to));
                    println!();
                    println!(
                        "{:<14} {:>14} {:>8} {:>8}",
                        "CATEGORY", "TOTAL", "COUNT", "PERCENT"
                    );
                    println!("{}", "-".repeat(47));
                    for cat in &report.categories {
                        println!(
                            "{:<14} {:>14} {:>8} {:>7.1}%",
                            cat.category,
                            format_amount(cat.total),
                            cat.count,
                            cat.percentage
                        );
                    }
                    println!("{}", "-".repeat(47));
                    println!("{:<14} {:>14} {:>8}", "TOTAL", format_tsh(report.total), report.count);
                }
            }
        }

        ReportCommands::Ranking {
            window,
            by,
            limit,
            format,
        } => {
            let (from, to) = resolve_window(&window, today)?;
            let key = RankKey::from_str(&by).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid grouping '{}'. Valid: item-model, category-item-model",
                    by
                )
            })?;
            let ranking = service.ranking(from, to, key, Some(limit));

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&ranking)?);
                }
                "csv" => {
                    println!("category,item,model,count");
                    for entry in &ranking {
                        println!(
                            "{},{},{},{}",
                            entry.category.map(|c| c.as_str()).unwrap_or(""),
                            entry.item,
                            entry.model,
                            entry.count
                        );
                    }
                }
                _ => {
                    println!("Top {} ({})", limit, describe_window(from, to));
                    println!();
                    if ranking.is_empty() {
                        println!("No transactions found.");
                        return Ok(());
                    }
                    println!(
                        "{:<4} {:<12} {:<24} {:<12} {:>5}",
                        "#", "CATEGORY", "ITEM", "MODEL", "QTY"
                    );
                    println!("{}", "-".repeat(61));
                    for (i, entry) in ranking.iter().enumerate() {
                        println!(
                            "{:<4} {:<12} {:<24} {:<12} {:>5}",
                            i + 1,
                            entry.category.map(|c| c.as_str()).unwrap_or("-"),
                            truncate(&entry.item, 24),
                            truncate(&entry.model, 12),
                            entry.count
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

/// Resolve `--period`/`--from`/`--to` into an inclusive date range.
/// Without any of them the whole ledger is selected.
fn resolve_window(window: &WindowArgs, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    if let Some(name) = &window.period {
        if name.eq_ignore_ascii_case("all") {
            return Ok((NaiveDate::MIN, NaiveDate::MAX));
        }
        let period = Period::from_str(name).ok_or_else(|| {
            anyhow::anyhow!("Invalid period '{}'. Valid: today, month, year, all", name)
        })?;
        return Ok(period.range(today));
    }

    let from = window
        .from
        .as_deref()
        .map(parse_date)
        .transpose()
        .context("Invalid from-date")?
        .unwrap_or(NaiveDate::MIN);
    let to = window
        .to
        .as_deref()
        .map(parse_date)
        .transpose()
        .context("Invalid to-date")?
        .unwrap_or(NaiveDate::MAX);

    Ok((from, to))
}

fn describe_window(from: NaiveDate, to: NaiveDate) -> String {
    match (from == NaiveDate::MIN, to == NaiveDate::MAX) {
        (true, true) => "all time".to_string(),
        (true, false) => format!("up to {}", to),
        (false, true) => format!("from {}", from),
        (false, false) => format!("{} to {}", from, to),
    }
}

fn format_tsh(amount: Amount) -> String {
    format!("{} TSh", format_amount(amount))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
