//!
//! Current environment related stuff.
//!

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Env variable that sets the Development/Sandbox/Production environment.
pub const RUN_ENV: &str = "FIELDPAY_RUN_ENV";

/// Parent dir where Cargo.toml is stored.
pub const CARGO_MANIFEST_DIR: &str = "CARGO_MANIFEST_DIR";

///
/// Current environment.
///
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Env {
    /// Development environment.
    #[default]
    Development,
    /// Sandbox environment.
    Sandbox,
    /// Production environment.
    Production,
}

impl Env {
    /// Stem of the configuration file associated with this environment.
    pub fn config_file_stem(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

/// Name of the current environment, taken from `FIELDPAY_RUN_ENV`.
pub fn which() -> Env {
    #[cfg(debug_assertions)]
    let default_env = Env::Development;
    #[cfg(not(debug_assertions))]
    let default_env = Env::Production;

    std::env::var(RUN_ENV).map_or_else(|_| default_env, |v| v.parse().unwrap_or(default_env))
}

///
/// Base path to look for the `config/` directory.
///
/// The workspace splits the engine into several crates, so the current working
/// directory may be the workspace root or an individual crate directory; both
/// must resolve to the same configuration files.
///
pub fn workspace_path() -> PathBuf {
    if let Ok(manifest_dir) = std::env::var(CARGO_MANIFEST_DIR) {
        let mut path = PathBuf::from(manifest_dir);
        path.pop();
        path.pop();
        path
    } else {
        PathBuf::from(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parses_from_string() {
        assert_eq!("Sandbox".parse::<Env>().ok(), Some(Env::Sandbox));
        assert!("nonsense".parse::<Env>().is_err());
    }
}
