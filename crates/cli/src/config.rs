use std::path::{Path, PathBuf};

use reviewdesk_gateway::{ConfigError, GatewayConfig};

/// Settings for the `reviewdesk` binary.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub gateway: GatewayConfig,
    pub session_file: PathBuf,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default                          |
    /// |-----------------------------------|----------------------------------|
    /// | `REVIEWDESK_API_URL`              | `http://localhost:3000`          |
    /// | `REVIEWDESK_SESSION_FILE`         | `$HOME/.reviewdesk/session.json` |
    /// | `REVIEWDESK_REQUEST_TIMEOUT_SECS` | `30`                             |
    pub fn from_env() -> Result<Self, ConfigError> {
        let gateway = GatewayConfig::from_env()?;
        let session_file = match std::env::var_os("REVIEWDESK_SESSION_FILE") {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => default_session_file(std::env::var_os("HOME").map(PathBuf::from).as_deref()),
        };
        Ok(Self {
            gateway,
            session_file,
        })
    }
}

/// `<home>/.reviewdesk/session.json`, relative to the working directory
/// when no home is known.
pub fn default_session_file(home: Option<&Path>) -> PathBuf {
    home.unwrap_or_else(|| Path::new("."))
        .join(".reviewdesk")
        .join("session.json")
}
