//! Species catalogue and its hot-reloadable source.
//!
//! The lifecycle tick asks a [`SpeciesSource`] for one immutable
//! [`SpeciesCatalog`] snapshot per run and uses it for every planting in
//! that run. [`FileSpeciesSource`] re-reads its YAML file only when the
//! file's modification time changes, and keeps serving the last good
//! snapshot if a reload fails.
//!
//! File format, keyed by species:
//!
//! ```yaml
//! alface:
//!   nome_comum: Alface
//!   germinacao_dias: 7
//!   maturidade_dias: 30
//!   tolerancia_seca: media
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use eko_types::Species;

/// Errors raised while loading a species catalogue.
#[derive(Debug, thiserror::Error)]
pub enum SpeciesError {
    /// The file could not be read.
    #[error("failed to read species file {path}: {source}")]
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The YAML did not describe a species map.
    #[error("failed to parse species YAML: {source}")]
    Yaml {
        /// The underlying parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// The time-scale factor must be finite and positive.
    #[error("invalid time scale factor: {0}")]
    InvalidTimeScale(f64),
}

/// One immutable view of the species reference data.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesCatalog {
    species: BTreeMap<String, Species>,
    time_scale_factor: f64,
}

impl SpeciesCatalog {
    /// Build a catalogue from species whose `key` is already set.
    pub fn new(
        species: impl IntoIterator<Item = Species>,
        time_scale_factor: f64,
    ) -> Result<Self, SpeciesError> {
        if !time_scale_factor.is_finite() || time_scale_factor <= 0.0 {
            return Err(SpeciesError::InvalidTimeScale(time_scale_factor));
        }
        Ok(Self {
            species: species.into_iter().map(|s| (s.key.clone(), s)).collect(),
            time_scale_factor,
        })
    }

    /// Parse the keyed YAML format. Map keys become [`Species::key`].
    pub fn from_yaml(yaml: &str, time_scale_factor: f64) -> Result<Self, SpeciesError> {
        let raw: BTreeMap<String, Species> = if yaml.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_yml::from_str(yaml)?
        };
        let species = raw.into_iter().map(|(key, mut s)| {
            s.key = key;
            s
        });
        Self::new(species, time_scale_factor)
    }

    /// Look up one species by key.
    pub fn get(&self, key: &str) -> Option<&Species> {
        self.species.get(key)
    }

    /// Whether `key` is in the catalogue.
    pub fn contains(&self, key: &str) -> bool {
        self.species.contains_key(key)
    }

    /// Divisor applied to every species day count.
    pub const fn time_scale_factor(&self) -> f64 {
        self.time_scale_factor
    }

    /// Number of species.
    pub fn len(&self) -> usize {
        self.species.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// All species, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.values()
    }
}

/// Supplies the species snapshot for a tick.
pub trait SpeciesSource: Send + Sync {
    /// The current catalogue.
    fn snapshot(&self) -> Result<Arc<SpeciesCatalog>, SpeciesError>;
}

/// A fixed catalogue, for tests and embedded data.
#[derive(Debug, Clone)]
pub struct StaticSpeciesSource {
    catalog: Arc<SpeciesCatalog>,
}

impl StaticSpeciesSource {
    /// Serve `catalog` forever.
    pub fn new(catalog: SpeciesCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

impl SpeciesSource for StaticSpeciesSource {
    fn snapshot(&self) -> Result<Arc<SpeciesCatalog>, SpeciesError> {
        Ok(Arc::clone(&self.catalog))
    }
}

#[derive(Debug, Clone)]
struct Loaded {
    modified: SystemTime,
    catalog: Arc<SpeciesCatalog>,
}

/// Species YAML on disk, reloaded when its modification time changes.
#[derive(Debug)]
pub struct FileSpeciesSource {
    path: PathBuf,
    time_scale_factor: f64,
    loaded: Mutex<Option<Loaded>>,
}

impl FileSpeciesSource {
    /// Watch `path`. Nothing is read until the first snapshot.
    pub fn new(path: impl Into<PathBuf>, time_scale_factor: f64) -> Self {
        Self {
            path: path.into(),
            time_scale_factor,
            loaded: Mutex::new(None),
        }
    }

    /// The watched file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<(SystemTime, SpeciesCatalog), SpeciesError> {
        let io = |source| SpeciesError::Io {
            path: self.path.clone(),
            source,
        };
        let modified = std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(io)?;
        let contents = std::fs::read_to_string(&self.path).map_err(io)?;
        let catalog = SpeciesCatalog::from_yaml(&contents, self.time_scale_factor)?;
        Ok((modified, catalog))
    }

    fn cached(&self) -> Option<Loaded> {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SpeciesSource for FileSpeciesSource {
    /// The file is stat'ed and read without holding the cache lock; the lock
    /// only guards the compare and the swap.
    fn snapshot(&self) -> Result<Arc<SpeciesCatalog>, SpeciesError> {
        let current_mtime = std::fs::metadata(&self.path).and_then(|m| m.modified()).ok();
        let cached = self.cached();
        if let Some(cached) = &cached {
            if current_mtime == Some(cached.modified) {
                return Ok(Arc::clone(&cached.catalog));
            }
        }

        match self.read() {
            Ok((modified, catalog)) => {
                let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
                // Another caller may have stored a newer file meanwhile.
                if let Some(newer) = loaded.as_ref().filter(|l| l.modified > modified) {
                    return Ok(Arc::clone(&newer.catalog));
                }
                let catalog = Arc::new(catalog);
                *loaded = Some(Loaded {
                    modified,
                    catalog: Arc::clone(&catalog),
                });
                drop(loaded);
                tracing::info!(
                    path = %self.path.display(),
                    species = catalog.len(),
                    "Species catalogue loaded"
                );
                Ok(catalog)
            }
            Err(err) => match self.cached() {
                Some(cached) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %err,
                        "Species reload failed, keeping previous catalogue"
                    );
                    Ok(cached.catalog)
                }
                None => Err(err),
            },
        }
    }
}
