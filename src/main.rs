mod cleaner;
mod entry;
mod error;
mod filter;
mod prompt;

use clap::{ArgAction, Parser};
use cleaner::{DeletionResult, Disposal, Runner, SystemTrash};
use colored::Colorize;
use entry::{DirectoryEntry, FsLister};
use error::RunError;
use filter::AgeThreshold;
use prompt::{Notice, Severity};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::SystemTime;
use tracing::info;
use tracing_subscriber::EnvFilter;

const ISSUES_URL: &str = concat!(env!("CARGO_PKG_REPOSITORY"), "/issues");

#[derive(Parser)]
#[command(name = "autodelete")]
#[command(about = "Move files older than a number of days from a directory to the trash")]
#[command(version)]
struct Cli {
    /// Directory to clean up (asked for interactively when omitted)
    path: Option<PathBuf>,

    /// Trash files last modified more than this many days ago
    #[arg(short, long, default_value_t = i64::from(AgeThreshold::DEFAULT.days()), allow_negative_numbers = true)]
    days: i64,

    /// Ask for the directory and the age with a form
    #[arg(short, long)]
    interactive: bool,

    /// Show what would be trashed without trashing it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Skip the confirmation prompt in interactive mode
    #[arg(short = 'y', long)]
    yes: bool,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_dry_run(selected: &[DirectoryEntry]) {
    println!("{}", "Dry run - nothing will be moved to the trash:\n".yellow());
    for entry in selected {
        println!("  {}", entry.path.display());
    }
    println!(
        "\n{} {}",
        "Total:".bold(),
        format!("{} files", selected.len()).green().bold()
    );
}

fn deleted_line(entry: &DirectoryEntry) -> String {
    format!("{} was deleted.", entry.name)
}

fn failure_line(entry: &DirectoryEntry, err: &io::Error) -> String {
    format!("{}: {}", entry.name, err)
}

fn error_notice(err: &RunError) -> Notice {
    match err {
        RunError::Validation(e) => Notice::new(
            Severity::Error,
            "Value Error",
            vec![e.to_string(), "Please correct your input.".to_string()],
        ),
        RunError::Directory { .. } => {
            Notice::new(Severity::Error, "Directory Error", vec![err.to_string()])
        }
    }
}

fn no_match_notice(dir: &Path, days: i64) -> Notice {
    Notice::new(
        Severity::Info,
        "Nothing to delete",
        vec![format!(
            "No file in {} is older than {} days.",
            dir.display(),
            days
        )],
    )
}

fn result_notice(result: &DeletionResult) -> Notice {
    let mut lines = vec![format!(
        "{} files successfully moved to the trash.",
        result.deleted_count()
    )];
    lines.extend(result.failed.iter().map(|(entry, err)| failure_line(entry, err)));

    if result.failed.is_empty() {
        Notice::new(Severity::Success, "Process successful", lines)
    } else {
        Notice::new(Severity::Error, "Process finished with errors", lines)
    }
}

fn uncaught_notice(err: &anyhow::Error) -> Notice {
    Notice::new(
        Severity::Error,
        "Uncaught error",
        vec![
            format!("{err:#}"),
            "Please report this error to:".to_string(),
            ISSUES_URL.to_string(),
        ],
    )
}

fn exit_code(result: &DeletionResult) -> ExitCode {
    if result.failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

// One line per trashed file, nothing else on success.
fn run_script(cli: &Cli, path: PathBuf) -> anyhow::Result<ExitCode> {
    let runner = Runner::new(FsLister, SystemTrash);
    let now = SystemTime::now();

    if cli.dry_run {
        match runner.preview(&path, cli.days, now) {
            Ok(selected) if selected.is_empty() => {
                println!("{}", "No matching files.".yellow());
            }
            Ok(selected) => print_dry_run(&selected),
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                return Ok(ExitCode::FAILURE);
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let result = match runner.run(&path, cli.days, now) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    for entry in &result.deleted {
        println!("{}", deleted_line(entry));
    }
    for (entry, err) in &result.failed {
        eprintln!("{}", failure_line(entry, err));
    }

    info!(
        dir = %path.display(),
        selected = result.selected_count(),
        deleted = result.deleted_count(),
        "run complete"
    );

    Ok(exit_code(&result))
}

fn run_interactive(cli: &Cli) -> anyhow::Result<ExitCode> {
    let form = prompt::ask(cli.path.as_deref(), cli.days)?;
    let runner = Runner::new(FsLister, SystemTrash);

    let selected = match runner.preview(&form.dir, form.days, SystemTime::now()) {
        Ok(selected) => selected,
        Err(e) => {
            error_notice(&e).show()?;
            return Ok(ExitCode::FAILURE);
        }
    };

    if selected.is_empty() {
        no_match_notice(&form.dir, form.days).show()?;
        return Ok(ExitCode::SUCCESS);
    }

    if cli.dry_run {
        print_dry_run(&selected);
        return Ok(ExitCode::SUCCESS);
    }

    for entry in &selected {
        println!("  {}", entry.path.display());
    }
    if !cli.yes && !prompt::confirm(selected.len())? {
        println!("{}", "Cancelled.".yellow());
        return Ok(ExitCode::SUCCESS);
    }

    let bar = prompt::progress_bar(selected.len());
    let result = runner.dispose(selected, |disposal| {
        let name = match disposal {
            Disposal::Trashed(entry) | Disposal::Failed(entry, _) => &entry.name,
        };
        bar.set_message(name.clone());
        bar.inc(1);
    });
    bar.finish_and_clear();

    result_notice(&result).show()?;
    Ok(exit_code(&result))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.path.clone() {
        Some(path) if !cli.interactive => run_script(&cli, path),
        _ => run_interactive(&cli),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            if uncaught_notice(&e).show().is_err() {
                eprintln!(
                    "{} {:#}\nPlease report this error to: {}",
                    "error:".red().bold(),
                    e,
                    ISSUES_URL
                );
            }
            ExitCode::FAILURE
        }
    }
}
