use clap::Parser;

use crate::types::{LogLevel, SyncMode};

/// Twelve hours, the default pause between passes.
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 12 * 60 * 60;

#[derive(Parser, Debug)]
#[command(
    name = "album-mirror",
    version,
    about = "Mirror Picasa web albums into a local directory tree"
)]
pub struct Cli {
    /// Sync mode: `incremental` stops early on albums that look archived,
    /// `full` walks every page of every album
    #[arg(value_enum, default_value_t = SyncMode::Incremental)]
    pub mode: SyncMode,

    /// OAuth2 client id of the API project
    #[arg(long, env = "CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// OAuth2 client secret of the API project
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Long-lived OAuth2 refresh token authorising access to the albums.
    /// Prefer the REFRESH_TOKEN environment variable; flags are visible in
    /// process listings.
    #[arg(long, env = "REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Numeric user id owning the albums
    #[arg(long, env = "USER_ID")]
    pub user_id: Option<String>,

    /// Directory the archive is written to
    #[arg(long, env = "DATA_PATH")]
    pub data_path: Option<String>,

    /// Only sync albums with this title (repeatable)
    #[arg(short = 'a', long = "album")]
    pub albums: Vec<String>,

    /// Print the album titles and exit
    #[arg(short = 'l', long)]
    pub list_albums: bool,

    /// Log what would be downloaded without touching the archive
    #[arg(long)]
    pub dry_run: bool,

    /// Run a single pass and exit instead of repeating
    #[arg(long)]
    pub once: bool,

    /// Seconds to wait between passes
    #[arg(long, default_value_t = DEFAULT_WATCH_INTERVAL_SECS)]
    pub watch_interval: u64,

    /// Log level (RUST_LOG takes precedence when set)
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_incremental_mode() {
        let cli = Cli::try_parse_from(["album-mirror"]).unwrap();
        assert_eq!(cli.mode, SyncMode::Incremental);
        assert_eq!(cli.watch_interval, DEFAULT_WATCH_INTERVAL_SECS);
        assert!(!cli.once);
        assert!(!cli.dry_run);
    }

    #[test]
    fn full_mode_positional() {
        let cli = Cli::try_parse_from(["album-mirror", "full"]).unwrap();
        assert!(cli.mode.is_full());
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["album-mirror", "partial"]).is_err());
    }

    #[test]
    fn repeatable_album_filter() {
        let cli =
            Cli::try_parse_from(["album-mirror", "-a", "Vacation", "--album", "Family"]).unwrap();
        assert_eq!(cli.albums, vec!["Vacation", "Family"]);
    }

    #[test]
    fn explicit_flags_are_parsed() {
        let cli = Cli::try_parse_from([
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
            "--watch-interval",
            "60",
        ])
        .unwrap();
        assert_eq!(cli.client_id.as_deref(), Some("id"));
        assert_eq!(cli.user_id.as_deref(), Some("1234"));
        assert_eq!(cli.data_path.as_deref(), Some("/srv/photos"));
        assert_eq!(cli.watch_interval, 60);
    }
}
