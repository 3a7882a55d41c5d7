//! Resolver configuration.
//!
//! Everything has a default; a YAML file at `~/.config/skyresolve/config.yaml`
//! may override any subset of fields.

use crate::error::ResolveError;
use crate::gate::DEFAULT_GATE_SPACING_MS;
use crate::model::Source;
use crate::retry::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Default Values
// ============================================================================

/// Default number of consolidated results
pub const DEFAULT_LIMIT: usize = 10;

/// Default per-call timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default cone radius in degrees
pub const DEFAULT_RADIUS_DEG: f64 = 0.1;

/// Default availability probe timeout in milliseconds
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Default VizieR cross-match radius in arcseconds
pub const DEFAULT_VIZIER_RADIUS_ARCSEC: f64 = 5.0;

/// Default row cap per VizieR request
pub const DEFAULT_VIZIER_MAX_ROWS: u32 = 20;

pub const DEFAULT_USER_AGENT: &str = concat!("skyresolve/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_SESAME_URL: &str = "https://cds.unistra.fr/cgi-bin/nph-sesame/-oxp/SNV";
pub const DEFAULT_SIMBAD_TAP_URL: &str = "https://simbad.cds.unistra.fr/simbad/sim-tap/sync";
pub const DEFAULT_VIZIER_URL: &str = "https://vizier.cds.unistra.fr/viz-bin/asu-tsv";
pub const DEFAULT_NED_URL: &str = "https://ned.ipac.caltech.edu/cgi-bin/objsearch";
pub const DEFAULT_MPC_IDENTIFIER_URL: &str =
    "https://data.minorplanetcenter.net/api/query-identifier";
pub const DEFAULT_MPC_OBSERVATIONS_URL: &str = "https://data.minorplanetcenter.net/api/get-obs";

/// Hipparcos, Yale Bright Star and NGC 2000.
pub const DEFAULT_VIZIER_CATALOGS: &[&str] = &["I/239/hip_main", "V/50/catalog", "VII/118/ngc2000"];

// ============================================================================
// Sections
// ============================================================================

/// Upstream base URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub sesame: String,
    pub simbad_tap: String,
    pub vizier: String,
    pub ned: String,
    pub mpc_identifier: String,
    pub mpc_observations: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            sesame: DEFAULT_SESAME_URL.to_string(),
            simbad_tap: DEFAULT_SIMBAD_TAP_URL.to_string(),
            vizier: DEFAULT_VIZIER_URL.to_string(),
            ned: DEFAULT_NED_URL.to_string(),
            mpc_identifier: DEFAULT_MPC_IDENTIFIER_URL.to_string(),
            mpc_observations: DEFAULT_MPC_OBSERVATIONS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizierSettings {
    /// Catalogues cross-matched around the target, in query order.
    pub catalogs: Vec<String>,
    pub radius_arcsec: f64,
    pub max_rows: u32,
}

impl Default for VizierSettings {
    fn default() -> Self {
        Self {
            catalogs: DEFAULT_VIZIER_CATALOGS.iter().map(|c| c.to_string()).collect(),
            radius_arcsec: DEFAULT_VIZIER_RADIUS_ARCSEC,
            max_rows: DEFAULT_VIZIER_MAX_ROWS,
        }
    }
}

// ============================================================================
// ResolverConfig
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub endpoints: Endpoints,
    pub user_agent: String,
    /// Minimum spacing between calls within one upstream family.
    pub gate_spacing_ms: u64,
    pub retry_delay_ms: u64,
    pub max_retries: u32,
    pub timeout_ms: u64,
    pub probe_timeout_ms: u64,
    pub limit: usize,
    pub radius_deg: f64,
    pub vizier: VizierSettings,
    /// Sources searched when a request does not name any.
    pub sources: Vec<Source>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            gate_spacing_ms: DEFAULT_GATE_SPACING_MS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            limit: DEFAULT_LIMIT,
            radius_deg: DEFAULT_RADIUS_DEG,
            vizier: VizierSettings::default(),
            sources: Source::ALL.to_vec(),
        }
    }
}

impl ResolverConfig {
    pub fn gate_spacing(&self) -> Duration {
        Duration::from_millis(self.gate_spacing_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Reject values no search could run with.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.limit == 0 {
            return Err(ResolveError::Config("limit must be at least 1".to_string()));
        }
        if !(self.radius_deg > 0.0 && self.radius_deg <= 180.0) {
            return Err(ResolveError::Config(format!(
                "radius_deg must be in (0, 180], got {}",
                self.radius_deg
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ResolveError::Config("timeout_ms must be positive".to_string()));
        }
        if self.vizier.radius_arcsec <= 0.0 {
            return Err(ResolveError::Config(
                "vizier.radius_arcsec must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// ConfigStore
// ============================================================================

/// Loads and saves the user configuration file.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Create a store at the default location.
    pub fn new_default() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        let path = base.join("skyresolve").join("config.yaml");
        Self { path }
    }

    /// Create a store at a custom path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(&self) -> ResolverConfig {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(
                        target: "skyresolve.config",
                        path = %self.path.display(),
                        error = %e,
                        "Ignoring unparseable config file"
                    );
                    ResolverConfig::default()
                }
            },
            Err(_) => ResolverConfig::default(),
        }
    }

    pub fn save(&self, config: &ResolverConfig) -> Result<(), ConfigStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigStoreError::Io(e.to_string()))?;
        }

        let content = serde_yaml::to_string(config)
            .map_err(|e| ConfigStoreError::Serialize(e.to_string()))?;

        std::fs::write(&self.path, content).map_err(|e| ConfigStoreError::Io(e.to_string()))?;

        Ok(())
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new_default()
    }
}

/// Errors from config storage operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("skyresolve-test-{}-{}", std::process::id(), name))
            .join("config.yaml")
    }

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.limit, DEFAULT_LIMIT);
        assert_eq!(config.gate_spacing(), Duration::from_millis(200));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.sources.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "limit: 3\nvizier:\n  radius_arcsec: 2.5\nsources: [simbad, ned]\n";
        let config: ResolverConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.limit, 3);
        assert_eq!(config.vizier.radius_arcsec, 2.5);
        assert_eq!(config.vizier.catalogs.len(), DEFAULT_VIZIER_CATALOGS.len());
        assert_eq!(config.sources, vec![Source::Simbad, Source::Ned]);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = ResolverConfig {
            limit: 0,
            ..ResolverConfig::default()
        };
        assert!(matches!(config.validate(), Err(ResolveError::Config(_))));
    }

    #[test]
    fn test_store_round_trip() {
        let store = ConfigStore::new(scratch_path("roundtrip"));
        let config = ResolverConfig {
            limit: 4,
            ..ResolverConfig::default()
        };
        store.save(&config).unwrap();
        assert!(store.exists());
        assert_eq!(store.load(), config);
        let _ = std::fs::remove_dir_all(store.path().parent().unwrap());
    }

    #[test]
    fn test_store_falls_back_on_garbage() {
        let path = scratch_path("garbage");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "limit: [not a number").unwrap();
        let store = ConfigStore::new(path);
        assert_eq!(store.load(), ResolverConfig::default());
        let _ = std::fs::remove_dir_all(store.path().parent().unwrap());
    }

    #[test]
    fn test_missing_file_is_default() {
        let store = ConfigStore::new(scratch_path("missing"));
        assert!(!store.exists());
        assert_eq!(store.load().limit, DEFAULT_LIMIT);
    }
}
