//! Command-line arguments, layered over the config file and defaults.

use crate::config::{AnalysisConfig, ConfigError, TrendMode};
use clap::Parser;
use std::path::PathBuf;

/// COVID-19 case data exploratory analysis
#[derive(Parser, Debug)]
#[command(name = "covid-eda", version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Input CSV file (falls back to the embedded sample when unreadable)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Directory for chart PNGs
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Number of regions in the top-N bar chart
    #[arg(long)]
    pub top_n: Option<usize>,

    /// How the global trend series is obtained
    #[arg(long, value_enum)]
    pub trend: Option<TrendMode>,

    /// Open the chart viewer window after rendering
    #[arg(long)]
    pub show: bool,
}

impl Cli {
    /// Defaults, then the config file, then flags.
    pub fn resolve_config(&self) -> Result<AnalysisConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(input) = &self.input {
            config.source_path = input.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(n) = self.top_n {
            config.top_n = n;
        }
        if let Some(mode) = self.trend {
            config.trend_mode = mode;
        }
        if self.show {
            config.show_charts = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_no_flags_gives_defaults() {
        let cli = Cli::try_parse_from(["covid-eda"]).unwrap();
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.trend_mode, TrendMode::Aggregate);
        assert!(!config.show_charts);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"top_n": 4, "output_dir": "from_file"}}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "covid-eda",
            "--config",
            path.as_str(),
            "--output-dir",
            "from_flag",
            "--trend",
            "strict",
            "--show",
        ])
        .unwrap();
        let config = cli.resolve_config().unwrap();

        assert_eq!(config.top_n, 4);
        assert_eq!(config.output_dir, PathBuf::from("from_flag"));
        assert_eq!(config.trend_mode, TrendMode::Strict);
        assert!(config.show_charts);
    }

    #[test]
    fn test_zero_top_n_flag_rejected() {
        let cli = Cli::try_parse_from(["covid-eda", "--top-n", "0"]).unwrap();
        assert!(matches!(
            cli.resolve_config().unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_unknown_trend_mode_rejected() {
        assert!(Cli::try_parse_from(["covid-eda", "--trend", "guess"]).is_err());
    }
}
