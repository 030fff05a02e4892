use crate::errors::JiraError;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ENV_PREFIX: &str = "JIRA";
const CONFIG_FILE_NAME: &str = ".jira.yaml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub debug: bool,
}

/// Values given on the command line. They win over the environment and the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub debug: bool,
}

impl Settings {
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let file = match &overrides.config {
            Some(path) => File::from(path.clone()).required(true),
            None => match Self::config_path() {
                Some(path) => File::from(path).format(FileFormat::Yaml).required(false),
                None => File::from(PathBuf::from(CONFIG_FILE_NAME))
                    .format(FileFormat::Yaml)
                    .required(false),
            },
        };

        Self::build(file, Environment::with_prefix(ENV_PREFIX), overrides)
    }

    fn build<S>(file: S, env: Environment, overrides: &Overrides) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let mut builder = Config::builder()
            .set_default("endpoint", "")?
            .set_default("username", "")?
            .set_default("password", "")?
            .set_default("debug", false)?
            .add_source(file)
            .add_source(env);

        if let Some(endpoint) = &overrides.endpoint {
            builder = builder.set_override("endpoint", endpoint.as_str())?;
        }
        if let Some(username) = &overrides.username {
            builder = builder.set_override("username", username.as_str())?;
        }
        if let Some(password) = &overrides.password {
            builder = builder.set_override("password", password.as_str())?;
        }
        if overrides.debug {
            builder = builder.set_override("debug", true)?;
        }

        let mut settings: Settings = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        settings.endpoint = settings.endpoint.trim_end_matches('/').to_string();
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(JiraError::Config("Jira endpoint is not set".to_string()).into());
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(JiraError::Config(format!(
                "Jira endpoint '{}' must start with http:// or https://",
                self.endpoint
            ))
            .into());
        }
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        let home = std::env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(CONFIG_FILE_NAME))
    }
}
