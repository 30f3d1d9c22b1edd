use std::io::Write;

use colored::Colorize;
use tl_ledger::{Ledger, PackageHistory, ValidationReport};
use tl_server::ChainView;

use crate::cli::OutputFormat;

/// Render every record followed by the validation signal.
pub fn render_chain(out: &mut impl Write, ledger: &Ledger, format: OutputFormat) -> anyhow::Result<()> {
    let view = ChainView::render(ledger);
    if format == OutputFormat::Json {
        return write_json(out, &view);
    }

    for record in &view.records {
        writeln!(out, "{}", format!("### Block {}", record.index).bold())?;
        writeln!(out, "  Timestamp:     {}", record.timestamp)?;
        writeln!(out, "  Data:          {}", record.payload.to_string().yellow())?;
        writeln!(out, "  Hash:          {}", record.digest.to_string().cyan())?;
        writeln!(out, "  Previous Hash: {}", record.previous_digest)?;
        writeln!(out)?;
    }
    render_verdict(out, view.valid)
}

fn render_verdict(out: &mut impl Write, valid: bool) -> anyhow::Result<()> {
    if valid {
        writeln!(out, "{} Chain is valid and untampered.", "✓".green().bold())?;
    } else {
        writeln!(out, "{} Chain has been tampered with.", "✗".red().bold())?;
    }
    Ok(())
}

pub fn render_report(out: &mut impl Write, report: &ValidationReport, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, report);
    }

    writeln!(
        out,
        "Checked {} records ({})",
        report.record_count.to_string().bold(),
        report.algorithm
    )?;
    for v in &report.violations {
        writeln!(out, "  {} record {}: {}", "!".red(), v.index, v.description)?;
    }
    render_verdict(out, report.valid)
}

pub fn render_history(
    out: &mut impl Write,
    package_id: &str,
    history: Option<&PackageHistory>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, &history);
    }

    let Some(history) = history else {
        writeln!(out, "No events for package {}.", package_id.yellow())?;
        return Ok(());
    };
    writeln!(out, "Package {}", history.package_id.yellow().bold())?;
    for event in &history.events {
        writeln!(
            out,
            "  [{}] {}  {}  {}",
            event.index,
            event.timestamp,
            event.status.green(),
            event.digest.short_hex().dimmed()
        )?;
    }
    Ok(())
}

/// A rejected line: a red mark in text mode, `{"error": ...}` in JSON mode.
pub fn render_error(out: &mut impl Write, message: &str, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, &serde_json::json!({ "error": message }));
    }
    writeln!(out, "{} {}", "✗".red().bold(), message)?;
    Ok(())
}

fn write_json<T: serde::Serialize + ?Sized>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
