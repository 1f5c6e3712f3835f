use anyhow::Result;
use log::info;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Environment variable holding the Relatics username
pub const USERNAME_VAR: &str = "RELATICS_USERNAME";

/// Environment variable holding the Relatics password
pub const PASSWORD_VAR: &str = "RELATICS_PASSWORD";

/// Username and password for the generic API login.
///
/// The password is only ever read when the login envelope is rendered; it
/// never shows up in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub fn from_env() -> Result<Credentials> {
        info!("Importing credentials from environment variables");

        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let username = std::env::var(USERNAME_VAR)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", USERNAME_VAR))?;
        let password = std::env::var(PASSWORD_VAR)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", PASSWORD_VAR))?;

        Ok(Credentials::new(username, password))
    }

    /// Read credentials from a specific .env file without touching the
    /// process environment
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Credentials> {
        let path = path.as_ref();
        info!("Importing credentials from .env file: {}", path.display());

        if !path.exists() {
            anyhow::bail!("Environment file not found: {}", path.display());
        }

        let values: HashMap<String, String> = dotenvy::from_path_iter(path)
            .map_err(|e| anyhow::anyhow!("Failed to load .env file '{}': {}", path.display(), e))?
            .collect::<Result<_, _>>()
            .map_err(|e| anyhow::anyhow!("Failed to parse .env file '{}': {}", path.display(), e))?;

        let lookup = |key: &str| {
            values
                .get(key)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("{} not found in .env file: {}", key, path.display()))
        };

        Ok(Credentials::new(lookup(USERNAME_VAR)?, lookup(PASSWORD_VAR)?))
    }

    pub fn from_command_line(username: String, password: String) -> Credentials {
        info!("Using credentials from command line parameters");
        Credentials::new(username, password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "username: {}", self.username)
    }
}
