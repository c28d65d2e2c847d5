//! Command-line interface parsing for tickerdesk
//!
//! This module handles parsing of CLI arguments using clap, including an
//! optional startup ticker, the --refresh flag for bypassing the cache, and
//! an --endpoint override for the analysis service URL.

use clap::Parser;
use thiserror::Error;

/// Longest ticker accepted by the input validation
const MAX_TICKER_LEN: usize = 10;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified ticker is not a plausible security identifier
    #[error("Invalid ticker: '{0}'. Tickers are 1-10 ASCII letters or digits")]
    InvalidTicker(String),
}

/// Tickerdesk - On-demand stock analysis reports in the terminal
#[derive(Parser, Debug)]
#[command(name = "tickerdesk")]
#[command(about = "Request stock analysis reports and browse a local 24-hour cache")]
#[command(version)]
pub struct Cli {
    /// Ticker to analyze immediately on startup
    ///
    /// Examples:
    ///   tickerdesk              # Open the prompt and cached report list
    ///   tickerdesk TSLA         # Analyze TSLA right away (cache permitting)
    ///   tickerdesk TSLA --refresh   # Skip the cache and request a fresh report
    #[arg(value_name = "TICKER")]
    pub ticker: Option<String>,

    /// Skip the cache and request a fresh report for the startup ticker
    #[arg(long, requires = "ticker")]
    pub refresh: bool,

    /// Analysis endpoint URL (overrides the TICKERDESK_API_URL variable)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Ticker to submit as soon as the app starts, already normalized
    pub initial_ticker: Option<String>,
    /// Whether the startup request should bypass the cache
    pub force_refresh: bool,
    /// Endpoint URL override from the command line
    pub endpoint: Option<String>,
}

/// Normalizes and validates a user-supplied ticker.
///
/// Trims surrounding whitespace and upper-cases the result; this normalized
/// form is the cache lookup key everywhere in the program.
///
/// # Arguments
/// * `s` - The raw ticker string
///
/// # Returns
/// * `Ok(String)` with the normalized ticker
/// * `Err(CliError::InvalidTicker)` if empty, too long, or non-alphanumeric
pub fn normalize_ticker(s: &str) -> Result<String, CliError> {
    let ticker = s.trim().to_ascii_uppercase();
    if ticker.is_empty()
        || ticker.len() > MAX_TICKER_LEN
        || !ticker.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(CliError::InvalidTicker(s.to_string()));
    }
    Ok(ticker)
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an invalid ticker was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_ticker = match &cli.ticker {
            Some(raw) => Some(normalize_ticker(raw)?),
            None => None,
        };

        Ok(StartupConfig {
            initial_ticker,
            force_refresh: cli.refresh,
            endpoint: cli.endpoint.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ticker_uppercases() {
        assert_eq!(normalize_ticker("tsla").unwrap(), "TSLA");
        assert_eq!(normalize_ticker("Brk").unwrap(), "BRK");
    }

    #[test]
    fn test_normalize_ticker_trims_whitespace() {
        assert_eq!(normalize_ticker("  msft ").unwrap(), "MSFT");
    }

    #[test]
    fn test_normalize_ticker_accepts_digits() {
        assert_eq!(normalize_ticker("7203").unwrap(), "7203");
    }

    #[test]
    fn test_normalize_ticker_rejects_empty() {
        assert!(normalize_ticker("").is_err());
        assert!(normalize_ticker("   ").is_err());
    }

    #[test]
    fn test_normalize_ticker_rejects_symbols() {
        let result = normalize_ticker("TS/LA");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid ticker"));
        assert!(err.to_string().contains("TS/LA"));
    }

    #[test]
    fn test_normalize_ticker_rejects_overlong() {
        assert!(normalize_ticker("ABCDEFGHIJK").is_err());
        assert!(normalize_ticker("ABCDEFGHIJ").is_ok());
    }

    #[test]
    fn test_startup_config_default() {
        let config = StartupConfig::default();
        assert!(config.initial_ticker.is_none());
        assert!(!config.force_refresh);
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["tickerdesk"]);
        assert!(cli.ticker.is_none());
        assert!(!cli.refresh);
        assert!(cli.endpoint.is_none());
    }

    #[test]
    fn test_cli_parse_ticker() {
        let cli = Cli::parse_from(["tickerdesk", "TSLA"]);
        assert_eq!(cli.ticker.as_deref(), Some("TSLA"));
        assert!(!cli.refresh);
    }

    #[test]
    fn test_cli_parse_ticker_with_refresh() {
        let cli = Cli::parse_from(["tickerdesk", "TSLA", "--refresh"]);
        assert_eq!(cli.ticker.as_deref(), Some("TSLA"));
        assert!(cli.refresh);
    }

    #[test]
    fn test_cli_refresh_requires_ticker() {
        let result = Cli::try_parse_from(["tickerdesk", "--refresh"]);
        assert!(result.is_err(), "--refresh without a ticker should be rejected");
    }

    #[test]
    fn test_cli_parse_endpoint_override() {
        let cli = Cli::parse_from(["tickerdesk", "--endpoint", "http://localhost:9000/analyze"]);
        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:9000/analyze"));
    }

    #[test]
    fn test_startup_config_from_cli_normalizes_ticker() {
        let cli = Cli::parse_from(["tickerdesk", "nvda"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.initial_ticker.as_deref(), Some("NVDA"));
    }

    #[test]
    fn test_startup_config_from_cli_invalid_ticker() {
        let cli = Cli::parse_from(["tickerdesk", "not-a-ticker!"]);
        let result = StartupConfig::from_cli(&cli);
        assert!(result.is_err());
    }

    #[test]
    fn test_startup_config_from_cli_carries_refresh_and_endpoint() {
        let cli = Cli::parse_from([
            "tickerdesk",
            "TSLA",
            "--refresh",
            "--endpoint",
            "http://localhost:9000/analyze",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(config.force_refresh);
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000/analyze"));
    }
}
