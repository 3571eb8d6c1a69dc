use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::Colorize;

use housekeep::apps::orphans;
use housekeep::cleaner::{DeletionEngine, DeletionReport, RunConfig};
use housekeep::cli::args::{Cli, Commands, ConfigAction, OutputFormat};
use housekeep::cli::output;
use housekeep::common::config::Config;
use housekeep::common::logging;
use housekeep::common::platform::HostLayout;
use housekeep::common::prompt::TerminalConfirm;
use housekeep::scanner::targets::Category;
use housekeep::scanner::CategoryScanner;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // reset and init must work even when the file on disk is broken
    if let Commands::Config { action } = cli.command {
        let _log_guard = logging::init(cli.verbose, false);
        return cmd_config(action);
    }

    let config = Config::load()?;
    let log_guard = logging::init(cli.verbose, config.log_to_file);
    config.validate()?;

    let layout = HostLayout::detect(&config);
    tracing::debug!(platform = %layout.platform, home = %layout.home.display(), "host layout");

    match cli.command {
        Commands::Categories => cmd_categories(&cli, &layout),

        Commands::Scan {
            ref category,
            min_age_days,
        } => cmd_scan(&cli, &config, &layout, category, min_age_days.unwrap_or(config.default_min_age_days)),

        Commands::Preview { min_age_days } => {
            cmd_preview(&cli, &config, &layout, min_age_days.unwrap_or(config.default_min_age_days))
        }

        Commands::Clean {
            ref categories,
            all,
            force,
            dry_run,
            min_age_days,
        } => {
            let run = RunConfig {
                force: force || config.force,
                dry_run,
                min_age_days: min_age_days.unwrap_or(config.default_min_age_days),
            };
            let code = cmd_clean(&cli, &config, &layout, categories, all, run)?;
            if code != 0 {
                drop(log_guard);
                std::process::exit(code);
            }
            Ok(())
        }

        Commands::Orphans { all } => cmd_orphans(&cli, &config, &layout, all),

        Commands::Config { action } => cmd_config(action),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(clap_complete::Shell::from(shell), &mut cmd, "housekeep", &mut std::io::stdout());
            Ok(())
        }
    }
}

// ─── Categories ───────────────────────────────────────────────────────────────

fn cmd_categories(cli: &Cli, layout: &HostLayout) -> Result<()> {
    let categories = Category::for_platform(layout.platform);
    match cli.format {
        OutputFormat::Human if !cli.quiet => output::print_categories(layout.platform, &categories),
        OutputFormat::Json => output::print_json(&categories),
        _ => println!("{}", Category::names_for(layout.platform)),
    }
    Ok(())
}

// ─── Scan ─────────────────────────────────────────────────────────────────────

fn cmd_scan(cli: &Cli, config: &Config, layout: &HostLayout, name: &str, min_age_days: u32) -> Result<()> {
    let category = Category::parse_for(name, layout.platform)?;
    let scanner = CategoryScanner::new(layout, &config.limits);
    let result = scanner.scan_category(category, min_age_days);

    match cli.format {
        OutputFormat::Human => output::print_scan_result(&result),
        OutputFormat::Json => output::print_json(&result),
        OutputFormat::Quiet => output::print_records(std::slice::from_ref(&result)),
    }
    Ok(())
}

// ─── Preview ──────────────────────────────────────────────────────────────────

fn cmd_preview(cli: &Cli, config: &Config, layout: &HostLayout, min_age_days: u32) -> Result<()> {
    let scanner = CategoryScanner::new(layout, &config.limits);
    let show_progress = !cli.quiet && cli.format == OutputFormat::Human;
    let report = scanner.preview(min_age_days, show_progress);

    match cli.format {
        OutputFormat::Human => output::print_preview(&report),
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Quiet => output::print_records(&report.results),
    }
    Ok(())
}

// ─── Clean ────────────────────────────────────────────────────────────────────

/// Clean each requested category in turn; the exit code is 1 when any of
/// them was cancelled or unsupported
fn cmd_clean(
    cli: &Cli,
    config: &Config,
    layout: &HostLayout,
    names: &[String],
    all: bool,
    run: RunConfig,
) -> Result<i32> {
    let categories = if all {
        Category::for_platform(layout.platform)
    } else {
        names
            .iter()
            .map(|n| Category::parse_for(n, layout.platform))
            .collect::<Result<Vec<_>, _>>()?
    };

    let human = cli.format == OutputFormat::Human;
    if human && !cli.quiet && run.dry_run {
        println!();
        println!("  {} Dry run: nothing will be deleted", "ℹ️");
    }

    let mut confirm = TerminalConfirm;
    let mut engine = DeletionEngine::new(layout, &config.limits, run, &mut confirm).with_progress(human && !cli.quiet);

    let mut reports: Vec<DeletionReport> = Vec::with_capacity(categories.len());
    for category in categories {
        let report = engine.delete_category(category);
        if human {
            output::print_deletion_report(&report);
        }
        reports.push(report);
    }

    match cli.format {
        OutputFormat::Human => {
            if !cli.quiet {
                output::print_clean_summary(&reports);
            }
        }
        OutputFormat::Json => output::print_json(&reports),
        OutputFormat::Quiet => output::print_clean_quiet(&reports),
    }

    Ok(reports.iter().map(DeletionReport::exit_code).max().unwrap_or(0))
}

// ─── Orphans ──────────────────────────────────────────────────────────────────

fn cmd_orphans(cli: &Cli, config: &Config, layout: &HostLayout, all: bool) -> Result<()> {
    let found = if all {
        orphans::inspect_support_dirs(layout, &config.limits)
    } else {
        orphans::find_orphaned_apps(layout, &config.limits)
    };

    match cli.format {
        OutputFormat::Human => output::print_orphans(&found),
        OutputFormat::Json => output::print_json(&found),
        OutputFormat::Quiet => {
            for o in &found {
                println!("{}|{}|{}", o.app_identifier, o.directory_path.display(), o.size_bytes);
            }
        }
    }
    Ok(())
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            Config::init_dirs()?;
            if !Config::config_path().exists() {
                Config::default().save()?;
            }
            println!("  {} housekeep initialized at ~/.housekeep", "✓".green());
            println!("  Created: config.toml, logs/");
            Ok(())
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("  {} Configuration reset to defaults", "✓".green());
            Ok(())
        }
    }
}
