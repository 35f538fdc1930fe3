use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::{LogLevel, SyncMode};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required value {name} (set --{flag} or the {name} environment variable)")]
    Missing {
        name: &'static str,
        flag: &'static str,
    },
}

/// Validated application configuration.
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub user_id: String,
    pub data_path: PathBuf,
    pub albums: Vec<String>,

    pub watch_interval: Duration,

    pub mode: SyncMode,
    #[allow(dead_code)] // read from cli.log_level before Config is built
    pub log_level: LogLevel,

    pub list_albums: bool,
    pub dry_run: bool,
    pub once: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("data_path", &self.data_path)
            .field("mode", &self.mode)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn required(
    value: Option<String>,
    name: &'static str,
    flag: &'static str,
) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing { name, flag }),
    }
}

impl Config {
    pub fn from_cli(cli: crate::cli::Cli) -> Result<Self, ConfigError> {
        let client_id = required(cli.client_id, "CLIENT_ID", "client-id")?;
        let client_secret = required(cli.client_secret, "CLIENT_SECRET", "client-secret")?;
        let refresh_token = required(cli.refresh_token, "REFRESH_TOKEN", "refresh-token")?;
        let user_id = required(cli.user_id, "USER_ID", "user-id")?;
        let data_path = required(cli.data_path, "DATA_PATH", "data-path")?;

        Ok(Self {
            client_id,
            client_secret,
            refresh_token,
            user_id,
            data_path: expand_tilde(&data_path),
            albums: cli.albums,
            watch_interval: Duration::from_secs(cli.watch_interval),
            mode: cli.mode,
            log_level: cli.log_level,
            list_albums: cli.list_albums,
            dry_run: cli.dry_run,
            once: cli.once,
        })
    }
}

/// Setup guide printed when a required value is missing.
pub const USAGE_GUIDE: &str = "\
Usage: album-mirror [incremental|full] with the following values set,
either as flags or as environment variables:

  CLIENT_ID      OAuth2 client id of your API project
  CLIENT_SECRET  OAuth2 client secret of your API project
  REFRESH_TOKEN  refresh token issued when you authorised the project
                 to read your albums
  USER_ID        numeric id of the account owning the albums
  DATA_PATH      directory to archive into, e.g. ./data

Obtaining a refresh token:
  1) open https://accounts.google.com/o/oauth2/auth?client_id=<CLIENT_ID>
     &redirect_uri=urn:ietf:wg:oauth:2.0:oob&response_type=code
     &scope=https://picasaweb.google.com/data
  2) consent and copy the code shown
  3) POST code=<CODE>&client_id=<CLIENT_ID>&client_secret=<CLIENT_SECRET>
     &redirect_uri=urn:ietf:wg:oauth:2.0:oob&grant_type=authorization_code
     to https://accounts.google.com/o/oauth2/token and keep the
     refresh_token from the JSON response

Pass `full` to walk every page of every album instead of stopping early
on albums whose recent photos are already archived.";

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn full_cli() -> crate::cli::Cli {
        crate::cli::Cli::try_parse_from([
            "album-mirror",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--refresh-token",
            "rt",
            "--user-id",
            "1234",
            "--data-path",
            "/srv/photos",
        ])
        .unwrap()
    }

    #[test]
    fn test_expand_tilde_with_home() {
        let result = expand_tilde("~/Pictures");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(result, home.join("Pictures"));
        }
    }

    #[test]
    fn test_expand_tilde_no_prefix() {
        assert_eq!(expand_tilde("/srv/photos"), PathBuf::from("/srv/photos"));
        assert_eq!(expand_tilde("./data"), PathBuf::from("./data"));
    }

    #[test]
    fn test_from_cli_complete() {
        let cfg = Config::from_cli(full_cli()).unwrap();
        assert_eq!(cfg.user_id, "1234");
        assert_eq!(cfg.data_path, PathBuf::from("/srv/photos"));
        assert_eq!(cfg.mode, SyncMode::Incremental);
        assert_eq!(
            cfg.watch_interval,
            Duration::from_secs(crate::cli::DEFAULT_WATCH_INTERVAL_SECS)
        );
    }

    #[test]
    fn test_from_cli_missing_value() {
        let mut cli = full_cli();
        cli.refresh_token = None;
        let err = Config::from_cli(cli).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing {
                name: "REFRESH_TOKEN",
                flag: "refresh-token"
            }
        );
    }

    #[test]
    fn test_from_cli_empty_value_is_missing() {
        let mut cli = full_cli();
        cli.data_path = Some("  ".to_string());
        assert!(matches!(
            Config::from_cli(cli),
            Err(ConfigError::Missing { name: "DATA_PATH", .. })
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cfg = Config::from_cli(full_cli()).unwrap();
        let rendered = format!("{:?}", cfg);
        assert!(!rendered.contains("\"secret\""));
        assert!(!rendered.contains("\"rt\""));
        assert!(rendered.contains("<redacted>"));
    }
}
