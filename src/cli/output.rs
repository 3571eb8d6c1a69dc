use colored::*;
use serde::Serialize;

use crate::apps::OrphanedApplication;
use crate::cleaner::{DeletionReport, DeletionStatus};
use crate::common::format::{self, format_path, format_size, format_size_colored};
use crate::common::platform::Platform;
use crate::scanner::targets::{Category, PreviewReport, ScanResult};

/// Print any serialisable result as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing results: {}", e),
    }
}

/// Categories for this platform, one per line
pub fn print_categories(platform: Platform, categories: &[Category]) {
    format::print_header(&format!("Cleanup categories ({})", platform));
    for category in categories {
        let kind = if category.is_special() { "special" } else { "single path" };
        println!("  {:<18} {}", category.name().cyan(), kind.dimmed());
    }
    println!();
}

/// Print a single category result in human-readable format
pub fn print_scan_result(result: &ScanResult) {
    format::print_header(&format!("{} scan", result.category));
    format::print_kv("Location", &display_location(result));
    format::print_kv("Items", &format::format_count(result.item_count));
    format::print_kv("Size", &format_size_colored(result.total_bytes).to_string());
    if result.category.is_special() && !result.is_empty() {
        println!("  {}", "Counts for this category are estimates.".dimmed());
    }
    println!();
}

/// Print the preview table with a grand total row
pub fn print_preview(report: &PreviewReport) {
    println!();
    println!("{}  Cleanup Preview", "🧹");
    println!("{}", "─".repeat(72).dimmed());
    let age = format::format_age_filter(report.min_age_days);
    println!(
        "  Scanned in {}  •  {}",
        format::format_duration(report.duration_secs).cyan(),
        age.dimmed()
    );
    println!("{}", "─".repeat(72).dimmed());
    println!();

    println!(
        "  {:<16} {:>12} {:>12}  {}",
        "Category".dimmed(),
        "Items".dimmed(),
        "Size".dimmed(),
        "Location".dimmed()
    );
    println!("  {}", "─".repeat(70).dimmed());

    for result in &report.results {
        let line = format!(
            "  {:<16} {:>12} {:>12}  {}",
            result.category.name(),
            result.item_count,
            format_size(result.total_bytes),
            format::truncate(&display_location(result), 36)
        );
        if result.is_empty() {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }

    println!("  {}", "─".repeat(70).dimmed());
    println!(
        "  {:<16} {:>12} {:>12}",
        "TOTAL".bold(),
        report.total_items.to_string().bold(),
        format_size_colored(report.total_bytes)
    );
    println!();

    if report.total_items == 0 {
        println!("  {} Nothing to clean!", "✨");
        println!();
    }
}

/// `name|path|count|bytes`, one line per category
pub fn print_records(results: &[ScanResult]) {
    for result in results {
        println!("{}", result.record());
    }
}

/// Print one category's deletion outcome
pub fn print_deletion_report(report: &DeletionReport) {
    let name = report.category.name().bold();
    match report.status {
        DeletionStatus::NothingToDelete => {
            println!("  {} {}: nothing to delete", "✨", name);
        }
        DeletionStatus::DryRun => {
            println!(
                "  {} {}: dry run — would delete {} ({}). No files modified.",
                "ℹ️",
                name,
                format::format_count(report.candidates),
                format_size(report.candidate_bytes)
            );
        }
        DeletionStatus::Cancelled => {
            println!("  {} {}: cancelled", "✗".red(), name);
        }
        DeletionStatus::Unsupported => {
            println!("  {} {}: not supported here", "⚠".yellow(), name);
        }
        DeletionStatus::Completed => {
            let icon = if report.failed == 0 { "✓".green() } else { "⚠".yellow() };
            println!(
                "  {} {}: {} deleted, {} could not be deleted, {} freed",
                icon,
                name,
                report.deleted.to_string().cyan(),
                report.failed,
                format_size_colored(report.bytes_freed)
            );
        }
    }

    if !report.errors.is_empty() {
        for (i, err) in report.errors.iter().enumerate().take(10) {
            println!("    {} {}", format!("{}.", i + 1).dimmed(), err.dimmed());
        }
        if report.errors.len() > 10 {
            println!("    ... and {} more", (report.errors.len() - 10).to_string().dimmed());
        }
    }
}

/// Totals across every cleaned category
pub fn print_clean_summary(reports: &[DeletionReport]) {
    let deleted: u64 = reports.iter().map(|r| r.deleted).sum();
    let failed: u64 = reports.iter().map(|r| r.failed).sum();
    let freed: u64 = reports.iter().map(|r| r.bytes_freed).sum();
    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  {} Total: {} deleted, {} failed, {} freed",
        "💾",
        deleted.to_string().cyan(),
        failed,
        format_size_colored(freed)
    );
    println!();
}

/// `name status deleted failed bytes`, one line per category
pub fn print_clean_quiet(reports: &[DeletionReport]) {
    for r in reports {
        println!(
            "{}  {}  {}  {}  {}",
            r.category.name(),
            r.status,
            r.deleted,
            r.failed,
            r.bytes_freed
        );
    }
}

/// Print orphaned application directories
pub fn print_orphans(orphans: &[OrphanedApplication]) {
    println!();
    println!("  {} Application Data ({})", "📱", orphans.len());
    println!("{}", "─".repeat(70).dimmed());
    println!();

    if orphans.is_empty() {
        println!("  No orphaned application data found.");
        println!();
        return;
    }

    println!(
        "  {:<40} {:>10}  {}",
        "Identifier".dimmed(),
        "Size".dimmed(),
        "Owner".dimmed()
    );
    println!("  {}", "─".repeat(68).dimmed());

    for orphan in orphans {
        let owner = match &orphan.matched_installed_app {
            Some(app) => app.green().to_string(),
            None => "orphaned".yellow().to_string(),
        };
        println!(
            "  {:<40} {:>10}  {}",
            format::truncate(&orphan.app_identifier, 40),
            if orphan.size_bytes > 0 { format_size(orphan.size_bytes) } else { "-".to_string() },
            owner
        );
        println!("    {} {}", "↳".dimmed(), format_path(&orphan.directory_path).dimmed());
    }

    let total: u64 = orphans.iter().map(|o| o.size_bytes).sum();
    println!();
    println!("  {} Total: {}", "💾", format_size_colored(total));
    println!();
}

fn display_location(result: &ScanResult) -> String {
    if result.category.is_special() || result.display_path.is_empty() {
        result.display_path.clone()
    } else {
        format_path(std::path::Path::new(&result.display_path))
    }
}
