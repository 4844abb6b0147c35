//! docfill CLI - DOCX template filling tool

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docfill::{
    generate_batch, BatchEvent, BatchOptions, DataContext, ErrorMode, GenerateOptions,
    GenerationStats, RecordList, Template, TemplateSummary,
};

#[derive(Parser)]
#[command(name = "docfill")]
#[command(version)]
#[command(about = "Fill DOCX templates with placeholders and loop regions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args)]
struct FillFlags {
    /// Abort on malformed loop markers instead of leaving them as text
    #[arg(long)]
    strict: bool,

    /// Protect outputs as read-only
    #[arg(long, env = "DOCFILL_READ_ONLY")]
    read_only: bool,

    /// Leave headers and footers untouched
    #[arg(long)]
    no_headers_footers: bool,
}

impl FillFlags {
    fn options(&self) -> GenerateOptions {
        let mode = if self.strict {
            ErrorMode::Strict
        } else {
            ErrorMode::Lenient
        };
        GenerateOptions::new()
            .with_error_mode(mode)
            .with_read_only(self.read_only)
            .with_headers_footers(!self.no_headers_footers)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a template into one document
    #[command(alias = "gen")]
    Generate {
        /// Template DOCX file
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// JSON data file: an object (one record) or an array (record list); "-" reads stdin
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[command(flatten)]
        flags: FillFlags,
    },

    /// Fill a template once per chunk of records
    Batch {
        /// Template DOCX file
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// JSON array of records; "-" reads stdin
        #[arg(short, long, value_name = "FILE")]
        data: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Records per document (0 = all records in one document)
        #[arg(short = 'n', long, default_value = "1")]
        fill_count: usize,

        /// File name rule, e.g. "{{Name}}_{Case}"
        #[arg(long)]
        name_rule: Option<String>,

        /// Prefix for default file names
        #[arg(long, default_value = "document")]
        doc_type: String,

        /// Generate one document at a time
        #[arg(long)]
        sequential: bool,

        #[command(flatten)]
        flags: FillFlags,
    },

    /// List a template's placeholders, loops and marker problems
    Inspect {
        /// Template DOCX file
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Generate {
            template,
            data,
            output,
            flags,
        }) => cmd_generate(&template, &data, &output, flags.options()),
        Some(Commands::Batch {
            template,
            data,
            output,
            fill_count,
            name_rule,
            doc_type,
            sequential,
            flags,
        }) => {
            let mut options = BatchOptions::new()
                .with_fill_count(fill_count)
                .with_document_type(doc_type)
                .with_parallel(!sequential)
                .with_generate_options(flags.options());
            if let Some(rule) = name_rule {
                options = options.with_name_rule(rule);
            }
            cmd_batch(&template, &data, &output, options)
        }
        Some(Commands::Inspect { template, json }) => cmd_inspect(&template, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!(
                "{}",
                "Usage: docfill generate <TEMPLATE> --data <FILE> --output <FILE>".yellow()
            );
            println!("       docfill --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_data(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn cmd_generate(
    template: &Path,
    data: &Path,
    output: &Path,
    options: GenerateOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = DataContext::from_json_str(&read_data(data)?)?;
    log::debug!("filling {} with {} record(s)", template.display(), context.record_count());
    let stats = docfill::generate_file(template, &context, output, options)?;

    println!("{} {}", "Saved to".green(), output.display());
    print_stats(&stats);
    Ok(())
}

fn print_stats(stats: &GenerationStats) {
    println!(
        "  {} {} placeholders replaced",
        "├─".dimmed(),
        stats.placeholders_replaced
    );
    println!(
        "  {} {} loops expanded ({} rows, {} blocks)",
        "├─".dimmed(),
        stats.loops_expanded(),
        stats.rows_inserted,
        stats.blocks_inserted
    );
    let last = if stats.issues.is_empty() { "└─" } else { "├─" };
    println!(
        "  {} read-only: {}",
        last.dimmed(),
        if stats.protected { "Yes" } else { "No" }
    );
    for (i, issue) in stats.issues.iter().enumerate() {
        let branch = if i + 1 == stats.issues.len() { "└─" } else { "├─" };
        println!("  {} {} {}", branch.dimmed(), "warning:".yellow(), issue);
    }
}

fn cmd_batch(
    template: &Path,
    data: &Path,
    output: &Path,
    options: BatchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = RecordList::from_json_str(&read_data(data)?)?;
    let template = Template::open(template)?;

    let (sender, receiver) = crossbeam_channel::unbounded();
    let options = options.with_progress(sender);
    let output_dir = output.to_path_buf();

    let worker = thread::spawn(move || generate_batch(&template, &records, output_dir, &options));

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    // The channel closes when the worker drops its options.
    for event in receiver {
        match event {
            BatchEvent::Started { total } => pb.set_length(total as u64),
            BatchEvent::Written { path, .. } => {
                let name = path.file_name().unwrap_or_default().to_string_lossy();
                pb.set_message(name.into_owned());
                pb.inc(1);
            }
            BatchEvent::Failed { index, error } => {
                log::warn!("batch output #{} failed: {}", index + 1, error);
                pb.println(format!("{} #{}: {}", "Failed".red(), index + 1, error));
                pb.inc(1);
            }
            BatchEvent::Cancelled { .. } => pb.inc(1),
            BatchEvent::Finished { .. } => {}
        }
    }

    let report = worker
        .join()
        .map_err(|_| "batch worker panicked".to_string())??;
    pb.finish_with_message("Done!");
    log::info!(
        "batch finished: {} written, {} failed",
        report.outputs.len(),
        report.failures.len()
    );

    println!(
        "\n{} {} written, {} failed ({} records)",
        "Batch:".green().bold(),
        report.outputs.len(),
        report.failures.len(),
        report.processed_records
    );
    for path in &report.outputs {
        println!("  {} {}", "├─".dimmed(), path.display());
    }

    if report.is_failed() {
        return Err("every document in the batch failed".into());
    }
    Ok(())
}

fn cmd_inspect(template: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let summary = docfill::inspect(template)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_summary(template, &summary);
    Ok(())
}

fn print_summary(template: &Path, summary: &TemplateSummary) {
    println!("{}", "Template Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), template.display());

    println!();
    println!("{} ({})", "Placeholders".cyan().bold(), summary.placeholders.len());
    println!("{}", "─".repeat(40).dimmed());
    for key in &summary.placeholders {
        println!("  {{{{{}}}}}", key);
    }

    println!();
    println!("{} ({})", "Loops".cyan().bold(), summary.loops.len());
    println!("{}", "─".repeat(40).dimmed());
    for lp in &summary.loops {
        println!(
            "  {} in {} ({} template items)",
            lp.name.bold(),
            lp.container,
            lp.template_len
        );
    }

    if !summary.issues.is_empty() {
        println!();
        println!("{} ({})", "Issues".yellow().bold(), summary.issues.len());
        println!("{}", "─".repeat(40).dimmed());
        for issue in &summary.issues {
            println!("  {}", issue);
        }
    }
}

fn cmd_version() {
    println!("{} {}", "docfill".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("DOCX template filling tool");
    println!();
    println!("License: MIT");
}
