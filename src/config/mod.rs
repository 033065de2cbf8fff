mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{ClientSettings, LoggingSettings, Settings};

/// Loads configuration from `config/default` (any format the `config` crate
/// understands, optional) and `PUSU_`-prefixed environment variables, then
/// fills whatever is missing from `Settings::default()`.
///
/// Nested keys use a double underscore: `PUSU_CLIENT__TIMEOUT_MS=250`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("PUSU")
                .prefix_separator("_")
                .separator("__"),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}
