use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};

pub struct FormInput {
    pub dir: PathBuf,
    pub days: i64,
}

fn default_dir_text(dir: Option<&Path>) -> String {
    dir.map_or_else(|| ".".to_string(), |d| d.display().to_string())
}

// Values are validated by the caller so a bad entry ends in a notice.
pub fn ask(default_dir: Option<&Path>, default_days: i64) -> dialoguer::Result<FormInput> {
    let theme = ColorfulTheme::default();

    let dir = Input::<String>::with_theme(&theme)
        .with_prompt("Choose directory")
        .default(default_dir_text(default_dir))
        .allow_empty(true)
        .interact_text()?;

    let days = Input::<i64>::with_theme(&theme)
        .with_prompt("Delete all files older than (days)")
        .default(default_days)
        .interact_text()?;

    Ok(FormInput {
        dir: PathBuf::from(dir.trim()),
        days,
    })
}

pub fn confirm(count: usize) -> dialoguer::Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Move {count} files to the trash?"))
        .default(false)
        .interact()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A titled message block, the terminal stand-in for a dialog box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub lines: Vec<String>,
}

impl Notice {
    pub fn new(severity: Severity, title: &str, lines: Vec<String>) -> Self {
        Self {
            severity,
            title: title.to_string(),
            lines,
        }
    }

    pub fn render(&self) -> String {
        let title = match self.severity {
            Severity::Info => style(&self.title).yellow().bold(),
            Severity::Success => style(&self.title).green().bold(),
            Severity::Error => style(&self.title).red().bold(),
        };

        let mut out = format!("\n{} {}\n", style("┌").dim(), title);
        for line in &self.lines {
            out.push_str(&format!("{} {}\n", style("│").dim(), line));
        }
        out.push_str(&format!("{}\n", style("└").dim()));
        out
    }

    pub fn show(&self) -> io::Result<()> {
        Term::stdout().write_str(&self.render())
    }
}

pub fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(bar_style) =
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
    {
        bar.set_style(bar_style.progress_chars("=> "));
    }
    bar
}
