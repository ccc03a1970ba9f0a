use std::{env, net::SocketAddr, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub project_id: String,
    pub storage_bucket: String,
    pub bind_addr: String,
    pub bind_port: u16,
    pub cv_data_path: PathBuf,
    pub static_dir: PathBuf,
    pub emulator_host: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GCP_PROJECT is required and must not be empty")]
    MissingProject,
    #[error("PORT must be a valid u16")]
    InvalidPort,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let project_id = env::var("GCP_PROJECT")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingProject)?;

        let storage_bucket = env::var("STORAGE_BUCKET")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("{project_id}-cv-assets"));

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let bind_port = env::var("PORT")
            .ok()
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(8080);

        let cv_data_path = env::var("CV_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/cv_data.json"));
        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static"));

        let emulator_host = env::var("FIRESTORE_EMULATOR_HOST")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let access_token = env::var("GOOGLE_ACCESS_TOKEN")
            .ok()
            .filter(|value| !value.is_empty());

        let config = Self {
            project_id,
            storage_bucket,
            bind_addr,
            bind_port,
            cv_data_path,
            static_dir,
            emulator_host,
            access_token,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}
