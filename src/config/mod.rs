use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the console
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the billing API, e.g. `https://billing.example.com`
    pub billing_api_url: String,

    /// File standing in for browser local storage
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    /// Directory generated invoice documents are written to
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Logo drawn in the invoice header; optional at runtime
    #[serde(default = "default_invoice_logo")]
    pub invoice_logo: PathBuf,

    /// Seconds the payment success page stays up before returning
    #[serde(default = "default_payment_return_delay")]
    pub payment_return_delay_secs: u64,

    /// Log file; stdout belongs to the terminal UI
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".billing-session.json")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("invoices")
}

fn default_invoice_logo() -> PathBuf {
    PathBuf::from("assets/invoice.jpg")
}

fn default_payment_return_delay() -> u64 {
    5
}

fn default_log_file() -> PathBuf {
    PathBuf::from("billing-console.log")
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first if one exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Base URL without a trailing slash
    pub fn api_url(&self) -> &str {
        self.billing_api_url.trim_end_matches('/')
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn invoice_logo(&self) -> &Path {
        &self.invoice_logo
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn payment_return_delay(&self) -> Duration {
        Duration::from_secs(self.payment_return_delay_secs)
    }
}

/// Command line overrides for values normally taken from the environment
#[derive(Debug, Default, clap::Parser)]
#[command(name = "billing-console", about = "Terminal front end for the billing API")]
pub struct Args {
    /// Billing API base URL (overrides BILLING_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Session file (overrides SESSION_FILE)
    #[arg(long)]
    pub session_file: Option<PathBuf>,

    /// Export directory for invoice documents (overrides EXPORT_DIR)
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
}

/// Load the environment configuration and apply command line overrides
pub fn init(args: Args) -> Result<Config> {
    dotenv().ok();

    // The base URL may be given only on the command line
    let mut vars: Vec<(String, String)> = std::env::vars().collect();
    if let Some(url) = &args.api_url {
        vars.retain(|(key, _)| key != "BILLING_API_URL");
        vars.push(("BILLING_API_URL".to_string(), url.clone()));
    }

    let mut config = envy::from_iter::<_, Config>(vars)?;
    apply_overrides(&mut config, args);

    Ok(config)
}

fn apply_overrides(config: &mut Config, args: Args) {
    if let Some(url) = args.api_url {
        config.billing_api_url = url;
    }
    if let Some(path) = args.session_file {
        config.session_file = path;
    }
    if let Some(path) = args.export_dir {
        config.export_dir = path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_fill_optional_values() {
        let config: Config =
            envy::from_iter(vars(&[("BILLING_API_URL", "http://localhost:8094/")])).unwrap();

        assert_eq!(config.api_url(), "http://localhost:8094");
        assert_eq!(config.session_file(), Path::new(".billing-session.json"));
        assert_eq!(config.export_dir(), Path::new("invoices"));
        assert_eq!(config.payment_return_delay(), Duration::from_secs(5));
    }

    #[test]
    fn missing_base_url_is_an_error() {
        let result = envy::from_iter::<_, Config>(vars(&[("EXPORT_DIR", "out")]));
        assert!(result.is_err());
    }

    #[test]
    fn command_line_overrides_environment() {
        let mut config: Config = envy::from_iter(vars(&[
            ("BILLING_API_URL", "http://a"),
            ("EXPORT_DIR", "from-env"),
        ]))
        .unwrap();

        apply_overrides(
            &mut config,
            Args {
                api_url: Some("http://b".into()),
                session_file: None,
                export_dir: Some(PathBuf::from("from-cli")),
            },
        );

        assert_eq!(config.api_url(), "http://b");
        assert_eq!(config.export_dir(), Path::new("from-cli"));
        assert_eq!(config.session_file(), Path::new(".billing-session.json"));
    }
}
