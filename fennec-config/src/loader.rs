//! Locating, parsing and overriding [`ClientConfig`].
//!
//! Evaluation order:
//! 1) an explicit path or `$FENNEC_CONFIG_PATH` (TOML or JSON file),
//! 2) `$FENNEC_CONFIG_JSON` (inline JSON),
//! 3) the first of `fennec.toml`, `fennec.json`, `config/fennec.toml`,
//!    `config/fennec.json` under the search root,
//! 4) defaults.
//!
//! `FENNEC_*` overrides are applied on top, read from the process
//! environment first and then from a `.env` file in the search root.

use crate::models::{ClientConfig, ConfigSource};
use anyhow::{Context, anyhow};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

pub const CONFIG_PATH_VAR: &str = "FENNEC_CONFIG_PATH";
pub const CONFIG_JSON_VAR: &str = "FENNEC_CONFIG_JSON";

const DEFAULT_CANDIDATES: &[&str] = &[
    "fennec.toml",
    "fennec.json",
    "config/fennec.toml",
    "config/fennec.json",
];

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Result of a load: the validated config plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: ClientConfig,
    pub source: ConfigSource,
    pub env_file_loaded: bool,
    /// Names of the `FENNEC_*` variables that overrode file values.
    pub overrides: Vec<&'static str>,
}

#[derive(Clone)]
pub struct ConfigLoader {
    search_root: PathBuf,
    explicit_path: Option<PathBuf>,
    env: EnvLookup,
    read_env_file: bool,
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("search_root", &self.search_root)
            .field("explicit_path", &self.explicit_path)
            .field("read_env_file", &self.read_env_file)
            .finish_non_exhaustive()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader over the process environment and the working directory.
    pub fn new() -> Self {
        Self {
            search_root: PathBuf::from("."),
            explicit_path: None,
            env: Arc::new(|name: &str| std::env::var(name).ok()),
            read_env_file: true,
        }
    }

    pub fn with_search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_root = root.into();
        self
    }

    /// Takes precedence over `$FENNEC_CONFIG_PATH`.
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    /// Replace the process environment, e.g. with a fixed map in tests.
    pub fn with_env_map(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Arc::new(move |name: &str| vars.get(name).cloned());
        self
    }

    pub fn without_env_file(mut self) -> Self {
        self.read_env_file = false;
        self
    }

    pub fn load(&self) -> anyhow::Result<ConfigLoad> {
        let (env_file, env_file_loaded) = self.env_file_vars()?;
        let lookup = |name: &str| {
            (self.env)(name)
                .or_else(|| env_file.get(name).cloned())
                .filter(|value| !value.trim().is_empty())
        };

        let (mut config, source) = self.locate(&lookup)?;
        let overrides = apply_env_overrides(&mut config, &lookup)?;
        config.validate().context("invalid client configuration")?;

        info!(source = ?source, overrides = ?overrides, "loaded client configuration");
        Ok(ConfigLoad {
            config,
            source,
            env_file_loaded,
            overrides,
        })
    }

    fn locate(&self, lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<(ClientConfig, ConfigSource)> {
        let path = self
            .explicit_path
            .clone()
            .or_else(|| lookup(CONFIG_PATH_VAR).map(PathBuf::from));
        if let Some(path) = path {
            let config = load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(raw) = lookup(CONFIG_JSON_VAR) {
            let config = parse_json(&raw).with_context(|| format!("failed to parse {CONFIG_JSON_VAR}"))?;
            return Ok((config, ConfigSource::EnvInline));
        }

        if let Some(path) = self.find_default_file() {
            let config = load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        debug!(root = %self.search_root.display(), "no config file found; using defaults");
        Ok((ClientConfig::default(), ConfigSource::Default))
    }

    fn find_default_file(&self) -> Option<PathBuf> {
        DEFAULT_CANDIDATES
            .iter()
            .map(|candidate| self.search_root.join(candidate))
            .find(|path| path.is_file())
    }

    /// Parse `.env` without touching the process environment.
    fn env_file_vars(&self) -> anyhow::Result<(HashMap<String, String>, bool)> {
        if !self.read_env_file {
            return Ok((HashMap::new(), false));
        }
        let path = self.search_root.join(".env");
        if !path.is_file() {
            return Ok((HashMap::new(), false));
        }

        let mut vars = HashMap::new();
        let entries = dotenvy::from_path_iter(&path).with_context(|| format!("failed to open {}", path.display()))?;
        for entry in entries {
            let (key, value) = entry.with_context(|| format!("invalid entry in {}", path.display()))?;
            vars.insert(key, value);
        }
        debug!(path = %path.display(), count = vars.len(), "read env file");
        Ok((vars, true))
    }
}

pub fn load_from_file(path: &Path) -> anyhow::Result<ClientConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read client config from {}", path.display()))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&contents).with_context(|| format!("invalid client config {}", path.display())),
        Some("toml") => {
            toml::from_str(&contents).map_err(|err| anyhow!("invalid client config {}: {}", path.display(), err))
        }
        _ => parse_from_str(&contents, &path.display().to_string()),
    }
}

/// Try TOML first, then JSON.
pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<ClientConfig> {
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| {
            anyhow!("failed to parse client config {origin}: toml error: {toml_err}; json error: {json_err}")
        })
    })
}

pub fn parse_json(raw: &str) -> anyhow::Result<ClientConfig> {
    serde_json::from_str(raw).map_err(|err| anyhow!("invalid client config json: {err}"))
}

fn apply_env_overrides(
    config: &mut ClientConfig,
    lookup: &impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Vec<&'static str>> {
    let mut applied = Vec::new();

    if let Some(raw) = lookup("FENNEC_SERVER_URL") {
        let url = Url::parse(raw.trim()).with_context(|| format!("FENNEC_SERVER_URL is not a valid url: {raw}"))?;
        config.server.url = Some(url);
        applied.push("FENNEC_SERVER_URL");
    }
    if let Some(user_id) = lookup("FENNEC_USER_ID") {
        config.server.user_id = Some(user_id.trim().to_string());
        applied.push("FENNEC_USER_ID");
    }
    if let Some(token) = lookup("FENNEC_ACCESS_TOKEN") {
        config.server.access_token = Some(token.trim().to_string());
        applied.push("FENNEC_ACCESS_TOKEN");
    }
    if let Some(device_id) = lookup("FENNEC_DEVICE_ID") {
        config.server.device_id = Some(device_id.trim().to_string());
        applied.push("FENNEC_DEVICE_ID");
    }
    if let Some(raw) = lookup("FENNEC_PAGE_SIZE") {
        config.paging.page_size = raw
            .trim()
            .parse()
            .with_context(|| format!("FENNEC_PAGE_SIZE must be a positive integer, got {raw:?}"))?;
        applied.push("FENNEC_PAGE_SIZE");
    }
    if let Some(raw) = lookup("FENNEC_FILTER_DEBOUNCE") {
        config.paging.filter_debounce = humantime::parse_duration(raw.trim())
            .with_context(|| format!("FENNEC_FILTER_DEBOUNCE is not a duration: {raw:?}"))?;
        applied.push("FENNEC_FILTER_DEBOUNCE");
    }

    if config.server.url.is_some() && !config.server.is_complete() {
        warn!("server url configured without credentials; requests will fail until a user and token are set");
    }
    Ok(applied)
}
