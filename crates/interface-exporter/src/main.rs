//! Interface exporter binary

use clap::Parser;
use common::LogFormat;
use interface_exporter::{Config, DEFAULT_CONFIG_PATH, ExporterServer, init_tracing};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "interface-exporter")]
#[command(about = "Prometheus exporter reporting the health of HTTP and TCP interfaces")]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, short, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH, env = "INTERFACE_EXPORTER_CONFIG")]
    config: PathBuf,

    /// Address to serve metrics on, overrides server.listen_addr
    #[arg(long, value_name = "ADDR")]
    listen_addr: Option<String>,

    /// Log format (text or json), overrides logging.format
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        if self.config.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_CONFIG_PATH)
        } else {
            self.config.clone()
        }
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref addr) = self.listen_addr {
            config.server.listen_addr = addr.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config_path();

    // Tracing is configured from the file, so failures here go to stderr
    let mut config = match Config::load_from_file(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    cli.apply_overrides(&mut config);

    // Telemetry guard will flush spans on drop
    let _telemetry_guard = init_tracing(&config.logging, &config.telemetry)?;

    info!(
        config = %config_path.display(),
        targets = config.targets.len(),
        "Interface exporter starting"
    );

    let server = ExporterServer::new(&config)?;
    if let Err(e) = server.run().await {
        error!(error = %e, "Interface exporter failed");
        return Err(e.into());
    }

    Ok(())
}
