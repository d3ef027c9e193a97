use anyhow::Result;
use clap::Parser;
use ghostpilot_common::observability::{LogConfig, init_logging};
use ghostpilot_config::{GhostpilotConfig, GhostpilotConfigLoader, LoggingConfig};
use std::path::PathBuf;
mod manual;

const DEFAULT_CONFIG_FILE: &str = "ghostpilot.yaml";

/// Post a tweet to the local tweets API, then read back the emoji tally.
#[derive(Debug, Parser)]
#[command(name = "ghostpilot", version)]
struct Cli {
    /// YAML config file; `ghostpilot.yaml` is used when present otherwise.
    #[arg(long, env = "GHOSTPILOT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over the file)
    let cfg = load_config(&cli)?;

    // 2) Logging goes to the rolling file (and stderr when asked); stdout carries the responses
    let log_path = init_logging(log_config(&cfg.logging))?;
    tracing::info!(log = %log_path.display(), base_url = %cfg.target.base_url, "ghostpilot.start");

    // 3) POST the tweet, then GET the emojis, strictly in that order
    let tweet = manual::load_tweet(cfg.payload.tweet_file.as_deref())?;
    let api = manual::tweets_api(&cfg)?;
    manual::run(&api, &tweet, &mut std::io::stdout()).await?;

    tracing::info!("ghostpilot.done");
    Ok(())
}

fn load_config(cli: &Cli) -> Result<GhostpilotConfig> {
    let loader = GhostpilotConfigLoader::new();
    let loader = match &cli.config {
        Some(path) => loader.with_file(path),
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE),
    };
    Ok(loader.load()?)
}

fn log_config(logging: &LoggingConfig) -> LogConfig {
    LogConfig {
        app_name: "ghostpilot",
        log_dir: logging.dir.clone(),
        emit_stderr: logging.stderr,
        format: logging.format,
        default_filter: logging.filter.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghostpilot_common::observability::LogFormat;

    #[test]
    fn no_arguments_is_a_valid_invocation() {
        assert!(Cli::try_parse_from(["ghostpilot"]).is_ok());
    }

    #[test]
    fn config_flag_names_a_file() {
        let cli = Cli::try_parse_from(["ghostpilot", "--config", "custom.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let cli = Cli {
            config: Some(PathBuf::from("/definitely/not/here/ghostpilot.yaml")),
        };
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn logging_settings_map_onto_log_config() {
        let logging = LoggingConfig {
            format: LogFormat::Json,
            stderr: true,
            filter: "ghostpilot_http=trace".into(),
            dir: Some(PathBuf::from("/tmp/ghostpilot")),
        };
        let cfg = log_config(&logging);
        assert_eq!(cfg.app_name, "ghostpilot");
        assert!(cfg.emit_stderr);
        assert!(matches!(cfg.format, LogFormat::Json));
        assert_eq!(cfg.default_filter, "ghostpilot_http=trace");
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/tmp/ghostpilot")));
    }
}
