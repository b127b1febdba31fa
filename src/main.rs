use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use winget_backup::commands::{self, Action, ExportOptions, ImportOptions};
use winget_backup::runtime::RealRuntime;
use winget_backup::winget::WingetCli;

/// winget-backup - back up and restore installed winget packages
///
/// Without arguments an interactive menu asks whether to export or import.
/// With a manifest path the packages listed in it are installed right away.
///
/// Examples:
///   winget-backup                        # Choose export or import interactively
///   winget-backup backup.json            # Reinstall the packages in backup.json
#[derive(Parser, Debug)]
#[command(author, version = env!("WINGET_BACKUP_VERSION"), about)]
struct Cli {
    /// Manifest produced by an earlier export; its packages are installed
    #[arg(value_name = "MANIFEST")]
    manifest: Option<PathBuf>,

    /// Directory for new backups (default: Documents/WingetBackups)
    #[arg(long = "dir", short = 'd', env = "WINGET_BACKUP_DIR", value_name = "PATH")]
    backup_dir: Option<PathBuf>,

    /// File name stem for new backups (default: winget_backup_<date>)
    #[arg(long, short = 'n', value_name = "NAME")]
    name: Option<String>,

    /// winget executable to run (default: found on PATH)
    #[arg(long = "winget", env = "WINGET_BACKUP_WINGET", value_name = "PATH")]
    winget: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter(cli.verbose)),
    )
    .init();
    let runtime = RealRuntime;

    let (action, interactive) = match Action::from_manifest_arg(cli.manifest) {
        Some(action) => (action, false),
        None => (commands::select_action(&runtime)?, true),
    };
    // A bad manifest path is reported before anything depends on winget
    if let Action::Import(manifest) = &action {
        commands::import::ensure_manifest(&runtime, manifest)?;
    }
    let winget = WingetCli::locate(cli.winget)?;

    match action {
        Action::Export => {
            let options = ExportOptions {
                dir: cli.backup_dir,
                name: cli.name,
            };
            commands::export::run(&runtime, &winget, &options)?;
        }
        Action::Import(manifest) => {
            let options = ImportOptions {
                confirm: interactive,
            };
            commands::import::run(&runtime, &winget, &manifest, &options)?;
        }
    }
    Ok(())
}
