//! Remote render UI client entry point.
//!
//! ```text
//! rui-client                       Connect with defaults
//! rui-client --config <path>       Use custom config TOML
//! rui-client --nif-paths menu.json Enable model selection
//! rui-client --gen-config          Dump default config and exit
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rui_client::config::ClientConfig;
use rui_client::menu;
use rui_client::session::Session;
use rui_core::ModelMenu;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rui-client", about = "Remote render UI client")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "rui-client.toml")]
    config: PathBuf,

    /// Server host (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (overrides config).
    #[arg(long)]
    log_level: Option<String>,

    /// JSON file mapping menu names to remote model paths.
    #[arg(long)]
    nif_paths: Option<String>,

    /// Window width (overrides config).
    #[arg(long)]
    width: Option<u32>,

    /// Window height (overrides config).
    #[arg(long)]
    height: Option<u32>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

impl Cli {
    fn apply(self, config: &mut ClientConfig) {
        if let Some(host) = self.host {
            config.network.host = host;
        }
        if let Some(port) = self.port {
            config.network.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(paths) = self.nif_paths {
            config.controls.nif_paths = paths;
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
    }
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.gen_config {
        return match toml::to_string_pretty(&ClientConfig::default()) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("cannot serialize default config: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let mut config = ClientConfig::load(&cli.config);
    cli.apply(&mut config);

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("rui-client v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Model menu ───────────────────────────────────────────

    let models = if config.controls.nif_paths.is_empty() {
        ModelMenu::default()
    } else {
        match menu::load(Path::new(&config.controls.nif_paths)) {
            Ok(models) => models,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    };

    // ── 2. Connect ──────────────────────────────────────────────

    let session = match Session::connect(&config, models).await {
        Ok(session) => session,
        Err(e) => {
            error!(
                "could not connect to server {}:{}: {e}",
                config.network.host, config.network.port
            );
            return ExitCode::FAILURE;
        }
    };
    info!(
        "control window {}x{}",
        config.window.width, config.window.height
    );

    // ── 3. Event loop ───────────────────────────────────────────

    let input = BufReader::new(std::io::stdin());
    let save_path = PathBuf::from(&config.controls.save_path);
    if let Err(e) = session.run(input, std::io::stdout(), save_path).await {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
