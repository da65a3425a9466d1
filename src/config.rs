//! Configuration management for session-gate.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Args;
use crate::guard::{Route, RouteGuard, RouteTable, HOME_PATH, LOGIN_PATH};
use crate::session::{RestorePolicy, SessionHandle, SessionStore};
use crate::storage::{FileStorage, MemoryStorage, TokenStorage, DEFAULT_TOKEN_KEY};
use crate::verifier::{StaticVerifier, DEFAULT_LATENCY};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Token persistence.
    pub storage: StorageSection,
    /// Credential verifier.
    pub verifier: VerifierSection,
    /// Routes and guard targets.
    pub routes: RoutesSection,
    /// Session behavior.
    pub session: SessionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

/// Storage configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Backend to use.
    pub backend: StorageBackend,
    /// File holding the token when the backend is `file`.
    pub path: PathBuf,
    /// Key the token is stored under.
    pub key: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: PathBuf::from(".session-gate/session.json"),
            key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

/// Verifier configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierSection {
    /// Simulated latency in milliseconds. Zero disables it.
    pub latency_ms: u64,
}

impl Default for VerifierSection {
    fn default() -> Self {
        Self {
            latency_ms: DEFAULT_LATENCY.as_millis() as u64,
        }
    }
}

/// Routes configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesSection {
    /// Login route.
    pub login: String,
    /// Entry point of the protected area.
    pub home: String,
    /// Route table.
    pub table: Vec<Route>,
}

impl Default for RoutesSection {
    fn default() -> Self {
        Self {
            login: LOGIN_PATH.to_string(),
            home: HOME_PATH.to_string(),
            table: RouteTable::default().routes().to_vec(),
        }
    }
}

/// Session configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Meaning of a persisted token at startup.
    pub restore: RestorePolicy,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("SESSION_GATE_STORAGE_PATH") {
            if !path.is_empty() {
                self.storage.path = PathBuf::from(path);
            }
        }

        if let Ok(backend) = std::env::var("SESSION_GATE_STORAGE_BACKEND") {
            match backend.as_str() {
                "file" => self.storage.backend = StorageBackend::File,
                "memory" => self.storage.backend = StorageBackend::Memory,
                _ => {}
            }
        }

        if let Ok(latency) = std::env::var("SESSION_GATE_LATENCY_MS") {
            if let Ok(latency) = latency.parse() {
                self.verifier.latency_ms = latency;
            }
        }

        if let Ok(level) = std::env::var("SESSION_GATE_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref path) = args.storage {
            self.storage.path = path.clone();
            self.storage.backend = StorageBackend::File;
        }

        if args.memory {
            self.storage.backend = StorageBackend::Memory;
        }

        if let Some(latency) = args.latency_ms {
            self.verifier.latency_ms = latency;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Check that the route settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.routes.login, &self.routes.home] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidRoute(path.clone()));
            }
        }
        if let Some(route) = self.routes.table.iter().find(|r| !r.path.starts_with('/')) {
            return Err(ConfigError::InvalidRoute(route.path.clone()));
        }
        if self.routes.login == self.routes.home {
            return Err(ConfigError::InvalidRoute(self.routes.home.clone()));
        }
        self.validate_table()?;
        if self.storage.key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        Ok(())
    }

    /// Every guard target must land on an enterable route.
    ///
    /// Home must be in the table without a redirect, login must be open to
    /// anonymous sessions, and redirects must end at a known route.
    fn validate_table(&self) -> Result<(), ConfigError> {
        let table = self.route_table();
        let (login, home) = (&self.routes.login, &self.routes.home);

        match table.resolve(home) {
            Some(route) if route.redirect.is_none() => {}
            _ => return Err(ConfigError::InvalidRoute(home.clone())),
        }
        if let Some(route) = table.resolve(login) {
            if route.protected || route.redirect.is_some() {
                return Err(ConfigError::InvalidRoute(login.clone()));
            }
        }

        for route in table.routes() {
            let mut current = route;
            let mut hops = 0;
            while let Some(target) = &current.redirect {
                hops += 1;
                if hops > table.routes().len() {
                    return Err(ConfigError::InvalidRoute(route.path.clone()));
                }
                match table.resolve(target) {
                    Some(next) => current = next,
                    None if target == login => break,
                    None => return Err(ConfigError::InvalidRoute(target.clone())),
                }
            }
        }
        Ok(())
    }

    /// Build the configured token storage.
    pub fn token_storage(&self) -> Box<dyn TokenStorage> {
        match self.storage.backend {
            StorageBackend::File => Box::new(FileStorage::with_key(
                &self.storage.path,
                self.storage.key.clone(),
            )),
            StorageBackend::Memory => Box::new(MemoryStorage::new()),
        }
    }

    /// Build the demo verifier with the configured latency.
    pub fn verifier(&self) -> StaticVerifier {
        StaticVerifier::demo().with_latency(Duration::from_millis(self.verifier.latency_ms))
    }

    /// Build the session store, restoring any persisted token.
    pub fn session_store(&self) -> SessionStore {
        SessionStore::with_policy(self.token_storage(), self.session.restore)
    }

    /// Build the store and wrap it in a handle for views.
    pub fn session_handle(&self) -> SessionHandle {
        SessionHandle::new(Arc::new(self.session_store()), Arc::new(self.verifier()))
    }

    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(self.routes.login.clone(), self.routes.home.clone())
    }

    pub fn route_table(&self) -> RouteTable {
        RouteTable::new(self.routes.table.clone())
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error.
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
    /// Route path that is not absolute, or a guard target that cannot be entered.
    #[error("invalid route path: {0}")]
    InvalidRoute(String),
    /// Storage key must not be empty.
    #[error("storage key must not be empty")]
    EmptyStorageKey,
}
