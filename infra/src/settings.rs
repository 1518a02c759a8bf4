//! Layered configuration loading.
//!
//! Sources, later ones winning:
//! 1. `.env` (via `dotenvy`, only fills unset variables)
//! 2. `config/default.toml`
//! 3. `config/<environment>.toml`
//! 4. `AUTOLOT__*` environment variables, e.g. `AUTOLOT__DATABASE__URL`
//!
//! Every file is optional; anything left unset falls back to the
//! `AppConfig` defaults.

use std::path::Path;

use al_shared::config::{AppConfig, Environment};
use config::{Config, File};
use tracing::debug;

use crate::InfrastructureError;

const ENV_PREFIX: &str = "AUTOLOT";
const ENV_SEPARATOR: &str = "__";

/// Load the application configuration from the working directory
pub fn load() -> Result<AppConfig, InfrastructureError> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }

    let environment = Environment::from_env();
    let env_source = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true);

    build(Path::new("."), environment, Some(env_source))
}

/// Load configuration files from `root` only, ignoring the process environment
pub fn load_from(root: &Path, environment: Environment) -> Result<AppConfig, InfrastructureError> {
    build(root, environment, None)
}

fn build(
    root: &Path,
    environment: Environment,
    env_source: Option<config::Environment>,
) -> Result<AppConfig, InfrastructureError> {
    let mut builder = Config::builder()
        .set_default("environment", environment.to_string())
        .map_err(config_error)?
        .add_source(File::from(root.join("config/default")).required(false))
        .add_source(File::from(root.join(environment.config_name())).required(false));

    if let Some(source) = env_source {
        builder = builder.add_source(source);
    }

    let config: AppConfig = builder
        .build()
        .map_err(config_error)?
        .try_deserialize()
        .map_err(config_error)?;

    debug!(environment = %config.environment, "Configuration loaded");
    Ok(config)
}

fn config_error(err: config::ConfigError) -> InfrastructureError {
    InfrastructureError::Config(err.to_string())
}
