//! kana: local WordPress development sites on Docker.

use clap::{Parser, Subcommand};
use container::DockerCli;
use site::config::{export_site_config, Config, Directories, SiteFlags};
use site::{SiteController, SiteState};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "kana", version, about = "Local WordPress development environments")]
struct Args {
    /// Site name (default: sanitized name of the current directory)
    #[arg(short, long, global = true)]
    name: Option<String>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long = "app-dir", env = "KANA_APP_DIR", global = true, help = "App directory (default: ~/.config/kana)")]
    app_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the site, installing WordPress on first run
    Start {
        /// The current directory is a plugin
        #[arg(long, conflicts_with = "theme")]
        plugin: bool,

        /// The current directory is a theme
        #[arg(long)]
        theme: bool,

        /// Keep WordPress files in ./wordpress
        #[arg(long)]
        local: bool,

        /// Also start phpMyAdmin
        #[arg(long)]
        phpmyadmin: bool,
    },

    /// Stop all containers of the site
    Stop,

    /// Stop the site and delete all of its files
    Destroy {
        #[arg(long = "confirm-destroy")]
        confirm_destroy: bool,
    },

    /// Show whether the site is running
    Status,

    /// Run a wp-cli command against the site
    Wp {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Write the site's settings to .kana.toml in the current directory
    Export,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(args)) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> site::Result<ExitCode> {
    let app_dir = match args.app_dir {
        Some(dir) => dir,
        None => Directories::default_app_dir()?,
    };
    let working = std::env::current_dir()?;
    let config = Config::load(Directories::new(app_dir, working))?;

    let mut flags = SiteFlags {
        name: args.name,
        ..SiteFlags::default()
    };
    if let Command::Start {
        plugin,
        theme,
        local,
        phpmyadmin,
    } = &args.command
    {
        flags.plugin = *plugin;
        flags.theme = *theme;
        flags.local = *local;
        flags.phpmyadmin = *phpmyadmin;
    }

    let settings = config.resolve(&flags)?;
    tracing::debug!("[kana] Resolved settings: {:?}", settings);

    let controller = SiteController::new(settings, Arc::new(DockerCli::new()))?;
    let name = controller.settings().name.clone();

    match args.command {
        Command::Start { .. } => {
            controller.start_site().await?;
            controller.install_wordpress().await?;

            let report = controller.install_default_extensions().await?;
            for plugin in &report.failed {
                eprintln!("Warning: plugin {} could not be installed", plugin);
            }

            println!("Site {} started: {}", name, controller.settings().url());
        }

        Command::Stop => {
            let report = controller.stop_site().await?;
            if report.outcomes.is_empty() {
                println!("Site {} is not running", name);
                return Ok(ExitCode::SUCCESS);
            }
            report.into_result()?;
            println!("Site {} stopped", name);
        }

        Command::Destroy { confirm_destroy } => {
            if !confirm_destroy {
                eprintln!(
                    "Destroying {} deletes all of its files; rerun with --confirm-destroy",
                    name
                );
                return Ok(ExitCode::FAILURE);
            }
            controller.destroy_site().await?;
            println!("Site {} destroyed", name);
        }

        Command::Status => {
            let state = controller.state().await?;
            println!("{}: {}", name, state);
            if state == SiteState::Running {
                println!("  {}", controller.settings().url());
            }
        }

        Command::Wp { args } => {
            if !controller.is_site_running().await? {
                eprintln!("Site {} is not running; start it first", name);
                return Ok(ExitCode::FAILURE);
            }

            let result = controller.run_admin_command(&args).await?;
            print!("{}", result.output);
            if !result.success() {
                let code = u8::try_from(result.exit_code).unwrap_or(1);
                return Ok(ExitCode::from(code));
            }
        }

        Command::Export => {
            if !controller.is_site_running().await? {
                eprintln!("Site {} is not running; start it before exporting", name);
                return Ok(ExitCode::FAILURE);
            }

            let path = config.directories.site_config_file();
            export_site_config(controller.settings(), &path)?;
            println!("Exported {} to {}", name, path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}
