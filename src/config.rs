use std::{env, net::SocketAddr, path::PathBuf};

use dotenvy::dotenv;
use teloxide::types::ChatId;
use url::Url;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    pub teloxide_token: String,
    pub main_admin: ChatId,
    pub data_dir: PathBuf,
    pub log_level: String,
    pub webhook: Option<(Url, SocketAddr)>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let teloxide_token =
            env::var("TELOXIDE_TOKEN").map_err(|_| ConfigError::Missing("TELOXIDE_TOKEN"))?;

        let main_admin = env::var("MAIN_ADMIN_ID").map_err(|_| ConfigError::Missing("MAIN_ADMIN_ID"))?;
        let main_admin = main_admin
            .trim()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| ConfigError::Malformed {
                name: "MAIN_ADMIN_ID",
                value: main_admin.clone(),
            })?;

        let data_dir = env::var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."));
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());

        let ngrok_url = match env::var("NGROK_URL") {
            Ok(raw) => Some(raw.parse::<Url>().map_err(|_| ConfigError::Malformed {
                name: "NGROK_URL",
                value: raw.clone(),
            })?),
            Err(_) => None,
        };
        let ngrok_addr = match env::var("NGROK_ADDR") {
            Ok(raw) => Some(raw.parse::<SocketAddr>().map_err(|_| ConfigError::Malformed {
                name: "NGROK_ADDR",
                value: raw.clone(),
            })?),
            Err(_) => None,
        };

        Ok(Self {
            teloxide_token,
            main_admin,
            data_dir,
            log_level,
            webhook: ngrok_url.zip(ngrok_addr),
        })
    }
}
