// Mode-aware terminal output for analyses, fetch results and tables
use crate::models::{BinaryInfo, CommandAnalysis, PackageInfo};
use crate::registry::Registry;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::time::Duration;

/// Output mode for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-friendly output with colors and emojis
    Human,
    /// Machine-readable JSON output
    Json,
    /// Plain text without colors (for pipes/logs)
    Plain,
}

impl OutputMode {
    /// Auto-detect output mode based on environment
    pub fn auto() -> Self {
        if std::env::var("CMDPEEK_JSON").is_ok() {
            Self::Json
        } else if !io::stdout().is_terminal() {
            // Output is piped/redirected, use plain text
            Self::Plain
        } else {
            Self::Human
        }
    }
}

/// CLI output writer with mode awareness
pub struct OutputWriter {
    mode: OutputMode,
}

impl OutputWriter {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_human(&self) -> bool {
        matches!(self.mode, OutputMode::Human)
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        match self.mode {
            OutputMode::Human => {
                println!();
                println!("{}", title.cyan().bold());
                println!("{}", "═".repeat(title.chars().count()).cyan());
            }
            OutputMode::Plain => {
                println!();
                println!("{}", title);
                println!("{}", "=".repeat(title.chars().count()));
            }
            OutputMode::Json => {}
        }
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => println!("  {} {}", "✓".green(), message),
            OutputMode::Plain => println!("  [OK] {}", message),
            OutputMode::Json => {}
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Human => println!("  {} {}", "⚠".yellow(), message),
            OutputMode::Plain => println!("  [WARN] {}", message),
            OutputMode::Json => {}
        }
    }

    pub fn info(&self, message: &str) {
        if !matches!(self.mode, OutputMode::Json) {
            println!("  {}", message);
        }
    }

    /// Print a key-value table
    pub fn table(&self, rows: &[(&str, String)]) {
        let max_key_len = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        match self.mode {
            OutputMode::Human => {
                for (key, value) in rows {
                    let key = format!("{:width$}", key, width = max_key_len);
                    println!("  {} │ {}", key.yellow(), value);
                }
            }
            OutputMode::Plain => {
                for (key, value) in rows {
                    println!("  {:width$} : {}", key, value, width = max_key_len);
                }
            }
            OutputMode::Json => {}
        }
    }

    /// Print a block of code tagged with its language
    pub fn code_block(&self, language: &str, code: &str) {
        match self.mode {
            OutputMode::Human => {
                println!("{}", format!("```{}", language).dimmed());
                println!("{}", code.trim_end());
                println!("{}", "```".dimmed());
            }
            OutputMode::Plain => {
                println!("```{}", language);
                println!("{}", code.trim_end());
                println!("```");
            }
            OutputMode::Json => {}
        }
    }

    /// Pretty JSON on stdout; only meaningful in JSON mode
    pub fn json<T: Serialize>(&self, value: &T) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Spinner for network work, shown only to humans
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.is_human() {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    pub fn render_analysis(&self, analysis: &CommandAnalysis) -> serde_json::Result<()> {
        if matches!(self.mode, OutputMode::Json) {
            return self.json(analysis);
        }

        self.section(&analysis.kind);
        self.info(&analysis.description);
        if analysis.is_unknown() {
            self.info("No known command family matched; only generic checks were applied");
        }

        if !analysis.warnings.is_empty() {
            self.section("Warnings");
            for warning in &analysis.warnings {
                self.warning(warning);
            }
        }

        if !analysis.parameters.is_empty() {
            self.section("Parameters");
            let rows: Vec<(&str, String)> = analysis
                .parameters
                .iter()
                .map(|(k, v)| (k.as_str(), parameter_text(v)))
                .collect();
            self.table(&rows);
        }

        if let Some(info) = &analysis.package_info {
            self.section("Package");
            self.table(&package_rows(info));
        }

        if let Some(info) = &analysis.binary_info {
            self.section("Binary Download");
            self.table(&binary_rows(info));
        }

        if !analysis.urls.is_empty() {
            self.section("URLs");
            for url in &analysis.urls {
                self.info(url);
            }
        }

        if let Some(code) = &analysis.extracted_code {
            self.section("Code");
            self.code_block(analysis.code_language.as_str(), code);
        }

        Ok(())
    }

    /// Package manager and programming tool tables
    pub fn render_registry(&self, registry: &Registry) {
        self.section("Package Managers");
        println!("{}", package_manager_table(registry));
        self.section("Programming Tools");
        println!("{}", programming_tool_table(registry));
    }
}

fn parameter_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn package_rows(info: &PackageInfo) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Name", info.package_name.clone()),
        ("Manager", info.package_manager.clone()),
        ("About", info.description.clone()),
    ];
    if let Some(url) = &info.search_url {
        rows.push(("Search", url.clone()));
    }
    rows
}

fn binary_rows(info: &BinaryInfo) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    if let Some(name) = &info.file_name {
        rows.push(("File", name.clone()));
    }
    if let Some(ext) = &info.file_extension {
        rows.push(("Extension", ext.clone()));
    }
    if let Some(mime) = &info.mime_type {
        rows.push(("MIME type", mime.clone()));
    }
    if let Some(size) = info.size {
        rows.push(("Size", format_size(size)));
    }
    rows
}

pub fn package_manager_table(registry: &Registry) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Prefix", "Name", "Search URL", "Description"]);
    for spec in registry.package_managers() {
        table.add_row(vec![
            spec.prefix.clone(),
            spec.name.clone(),
            spec.search_url_template.clone(),
            spec.description.clone(),
        ]);
    }
    table
}

pub fn programming_tool_table(registry: &Registry) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Token", "Name", "Description"]);
    for spec in registry.programming_tools() {
        table.add_row(vec![
            spec.token.clone(),
            spec.name.clone(),
            spec.description.clone(),
        ]);
    }
    table
}

/// Format file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    }
}
