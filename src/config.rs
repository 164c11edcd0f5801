use crate::{
    csv_codec::CsvDialect,
    database::config::DatabaseConfig,
    server::config::{LoggingConfig, MetricsConfig, ServerConfig},
};
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub csv: CsvConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// CSV import/export settings. Import and export encodings are independent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    #[serde(default = "default_csv_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_import_encoding")]
    pub import_encoding: String,
    #[serde(default = "default_export_encoding")]
    pub export_encoding: String,
}

fn default_csv_delimiter() -> char {
    ';'
}

fn default_import_encoding() -> String {
    "utf-8".to_string()
}

fn default_export_encoding() -> String {
    "windows-1250".to_string()
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: default_csv_delimiter(),
            import_encoding: default_import_encoding(),
            export_encoding: default_export_encoding(),
        }
    }
}

impl CsvConfig {
    /// Dialect used to decode uploaded allocation files
    pub fn import_dialect(&self) -> CsvDialect {
        CsvDialect::new(self.delimiter, &self.import_encoding)
    }

    /// Dialect used to encode report downloads
    pub fn export_dialect(&self) -> CsvDialect {
        CsvDialect::new(self.delimiter, &self.export_encoding)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_export_filename")]
    pub export_filename: String,
}

fn default_export_filename() -> String {
    "all_ventures.csv".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            export_filename: default_export_filename(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::Config::try_from(&Config::default())?);

        if Path::new("config.yaml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("ALLOCATION")
                .prefix_separator("_")
                .separator("__"),
        );

        builder.build()?.try_deserialize()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::Config::try_from(&Config::default())?);

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        builder = builder.add_source(
            Environment::with_prefix("ALLOCATION")
                .prefix_separator("_")
                .separator("__"),
        );

        builder.build()?.try_deserialize()
    }
}
