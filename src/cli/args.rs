use clap::{Parser, Subcommand, ValueEnum};

/// Housekeep — category-based disk cleanup for macOS and Linux
#[derive(Parser, Debug)]
#[command(
    name = "housekeep",
    version,
    about = "Category-based disk cleanup for macOS and Linux",
    long_about = "Housekeep measures caches, logs, trash, package caches, node_modules,\n\
                   build output, Docker volumes and orphaned app data, then removes\n\
                   what you confirm. Version-control and tool metadata is never touched.",
    after_help = "EXAMPLES:\n  \
        housekeep categories                       List categories for this machine\n  \
        housekeep preview                          Size every category\n  \
        housekeep preview --min-age-days 30        Only count files older than 30 days\n  \
        housekeep scan caches --format quiet       One name|path|count|bytes record\n  \
        housekeep clean caches logs --dry-run      Show what would be removed\n  \
        housekeep clean node_modules --force       Skip the generic prompt\n  \
        housekeep clean --all                      Clean every category, one prompt each\n  \
        housekeep orphans                          List leftover app support data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode — minimal output
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the cleanup categories available on this platform
    Categories,

    /// Scan a single category
    Scan {
        /// Category name (see `housekeep categories`)
        category: String,

        /// Only count files last modified at least N days ago
        #[arg(long, value_name = "N")]
        min_age_days: Option<u32>,
    },

    /// Scan every category and print a summary table
    Preview {
        /// Only count files last modified at least N days ago
        #[arg(long, value_name = "N")]
        min_age_days: Option<u32>,
    },

    /// Delete the contents of one or more categories
    Clean {
        /// Categories to clean
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        categories: Vec<String>,

        /// Clean every category available on this platform
        #[arg(long)]
        all: bool,

        /// Skip the generic confirmation (development-file warnings still ask)
        #[arg(long, short = 'f', env = "FORCE_MODE")]
        force: bool,

        /// Show what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,

        /// Only delete files last modified at least N days ago
        #[arg(long, value_name = "N")]
        min_age_days: Option<u32>,
    },

    /// List application support directories whose app is no longer installed
    Orphans {
        /// Also list directories that matched an installed app
        #[arg(long)]
        all: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset to default configuration
    Reset,

    /// Initialize housekeep directories and default config
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Quiet,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

impl From<CompletionShell> for clap_complete::Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => clap_complete::Shell::Bash,
            CompletionShell::Zsh => clap_complete::Shell::Zsh,
            CompletionShell::Fish => clap_complete::Shell::Fish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_clean_flags() {
        let cli = Cli::try_parse_from(["housekeep", "clean", "caches", "logs", "--dry-run", "--min-age-days", "7"]).unwrap();
        match cli.command {
            Commands::Clean {
                categories,
                all,
                dry_run,
                min_age_days,
                ..
            } => {
                assert_eq!(categories, vec!["caches", "logs"]);
                assert!(!all);
                assert!(dry_run);
                assert_eq!(min_age_days, Some(7));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_clean_needs_a_target() {
        assert!(Cli::try_parse_from(["housekeep", "clean"]).is_err());
        assert!(Cli::try_parse_from(["housekeep", "clean", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["housekeep", "clean", "caches", "--all"]).is_err());
    }

    #[test]
    fn test_global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["housekeep", "scan", "caches", "--format", "quiet"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Quiet);
    }
}
