use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use crate::constants::env::{HISTORY_CAPACITY_VAR, HISTORY_DIR_VAR, SEED_VAR};
use crate::constants::history::{DEFAULT_HISTORY_CAPACITY, DEFAULT_HISTORY_DIR};
use crate::constants::qr::RESOLVER_SEED_SALT;
use crate::errors::TraceError;
use crate::random::{DeterministicRng, RandomSource, SystemRandom};

/// Top-level runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceConfig {
    /// RNG seed; `None` draws from OS entropy so chains differ per session.
    pub seed: Option<u64>,
    /// Max number of scan records kept.
    pub history_capacity: usize,
    /// Directory holding the scan history file.
    pub history_dir: PathBuf,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            seed: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            history_dir: PathBuf::from(DEFAULT_HISTORY_DIR),
        }
    }
}

impl TraceConfig {
    /// Load overrides from the process environment.
    pub fn from_env() -> Result<Self, TraceError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load overrides through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TraceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let seed = parse_var::<u64, _>(&lookup, SEED_VAR)?;
        let history_capacity = parse_var::<usize, _>(&lookup, HISTORY_CAPACITY_VAR)?
            .unwrap_or(defaults.history_capacity);
        let history_dir = match lookup(HISTORY_DIR_VAR) {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
            _ => {
                info!(
                    "{HISTORY_DIR_VAR} not set, using default: {}",
                    defaults.history_dir.display()
                );
                defaults.history_dir
            }
        };
        Self {
            seed,
            history_capacity,
            history_dir,
        }
        .validated()
    }

    /// Reject values no component can work with.
    pub fn validated(self) -> Result<Self, TraceError> {
        if self.history_capacity == 0 {
            return Err(TraceError::Configuration(
                "history capacity must be at least 1".into(),
            ));
        }
        Ok(self)
    }

    /// Source for trace generation: seeded when `seed` is set, OS-seeded otherwise.
    pub fn random_source(&self) -> Box<dyn RandomSource> {
        Self::source_for(self.seed)
    }

    /// Source for scan resolution, on a stream distinct from `random_source`.
    pub fn scan_random_source(&self) -> Box<dyn RandomSource> {
        Self::source_for(self.seed.map(|seed| seed ^ RESOLVER_SEED_SALT))
    }

    fn source_for(seed: Option<u64>) -> Box<dyn RandomSource> {
        match seed {
            Some(seed) => Box::new(DeterministicRng::new(seed)),
            None => Box::new(SystemRandom::new()),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, TraceError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default");
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|err| TraceError::Configuration(format!("invalid {key} value '{raw}': {err}")))
}
