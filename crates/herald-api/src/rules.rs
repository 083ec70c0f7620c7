//! Rule file loading and the hot-swappable rule store.
//!
//! A [`RuleStore`] hands out `Arc<RuleSet>` snapshots. Reloading builds a
//! complete new rule set first and swaps it in only on success, so a broken
//! edit to the rules file never leaves the service without rules and
//! in-flight dispatches keep the snapshot they started with.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Format, Json, Toml, Yaml},
    Figment,
};
use herald_core::{builtin, HeraldError, RuleSet, WorkflowsConfig};
use tokio::sync::RwLock;
use tracing::{error, info};

/// Where the active rule set comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// The compiled-in default routing.
    Builtin,
    /// A rules file on disk.
    File(PathBuf),
}

impl RuleSource {
    /// Chooses the file source when a path is configured.
    pub fn from_path(path: Option<&Path>) -> Self {
        path.map_or(Self::Builtin, |p| Self::File(p.to_path_buf()))
    }

    /// Loads the rule set this source describes.
    ///
    /// # Errors
    ///
    /// Fails when the rules file cannot be read or does not validate.
    pub fn load(&self) -> Result<RuleSet> {
        match self {
            Self::Builtin => Ok(builtin::rules()),
            Self::File(path) => load_rules(path),
        }
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "built-in rules"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads and validates a rules file.
///
/// The format follows the extension: `.toml`, `.yaml`/`.yml` or `.json`.
///
/// # Errors
///
/// Fails on an unsupported extension, an unreadable file, a document that
/// does not match the `workflows` schema, or a rule that does not validate.
pub fn load_rules(path: &Path) -> Result<RuleSet> {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);

    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read rules file {}", path.display()))?;

    let figment = match extension.as_deref() {
        Some("toml") => Figment::from(Toml::string(&contents)),
        Some("yaml" | "yml") => Figment::from(Yaml::string(&contents)),
        Some("json") => Figment::from(Json::string(&contents)),
        _ => bail!("Unsupported rules file extension for {} (expected toml, yaml, yml or json)", path.display()),
    };

    let config: WorkflowsConfig = figment
        .extract()
        .map_err(|e| HeraldError::InvalidRuleSet { reason: e.to_string() })
        .with_context(|| format!("Failed to parse rules file {}", path.display()))?;

    RuleSet::from_config(config).with_context(|| format!("Invalid rules in {}", path.display()))
}

/// Shared holder of the active rule set.
#[derive(Clone)]
pub struct RuleStore {
    current: Arc<RwLock<Arc<RuleSet>>>,
    source: RuleSource,
}

impl RuleStore {
    /// Wraps an already loaded rule set.
    pub fn new(rules: RuleSet, source: RuleSource) -> Self {
        Self { current: Arc::new(RwLock::new(Arc::new(rules))), source }
    }

    /// Loads the initial rule set from `source`.
    ///
    /// # Errors
    ///
    /// Fails when the source cannot be loaded.
    pub fn from_source(source: RuleSource) -> Result<Self> {
        let rules = source.load()?;
        info!(source = %source, rules = rules.len(), "Rules loaded");
        Ok(Self::new(rules, source))
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> Arc<RuleSet> {
        Arc::clone(&*self.current.read().await)
    }

    /// Number of rules in the current snapshot.
    pub async fn len(&self) -> usize {
        self.current.read().await.len()
    }

    /// Where rules are loaded from.
    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    /// Reloads from the source and swaps the snapshot on success.
    ///
    /// On failure the previous snapshot stays active.
    ///
    /// # Errors
    ///
    /// Returns the load error.
    pub async fn reload(&self) -> Result<usize> {
        match self.source.load() {
            Ok(rules) => {
                let count = rules.len();
                *self.current.write().await = Arc::new(rules);
                info!(source = %self.source, rules = count, "Rules reloaded");
                Ok(count)
            },
            Err(e) => {
                error!(source = %self.source, error = %format!("{e:#}"), "Rule reload failed; keeping previous rules");
                Err(e)
            },
        }
    }
}

impl fmt::Debug for RuleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleStore").field("source", &self.source).finish_non_exhaustive()
    }
}

/// Reloads `store` every time the process receives SIGHUP.
///
/// # Errors
///
/// Fails when the signal handler cannot be installed.
#[cfg(unix)]
pub fn spawn_reload_on_hangup(store: RuleStore) -> std::io::Result<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    Ok(tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!(source = %store.source(), "SIGHUP received, reloading rules");
            // Failure is logged by reload and the old snapshot is kept.
            let _ = store.reload().await;
        }
    }))
}
