//! File-backed warm-start store.
//!
//! Layout under the store root, one directory per configuration profile:
//!
//! ```text
//! <root>/<profile>/solution_20260301T181500.123Z.json
//! <root>/<profile>/latest.json
//! ```
//!
//! Every save writes a timestamped record and overwrites `latest.json`
//! with the same content.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{SolutionSignature, WarmStartRecord, SCHEMA_VERSION};
use crate::error::StoreError;
use crate::models::Solution;

const LATEST: &str = "latest.json";
const PREFIX: &str = "solution_";

/// Persists and reloads warm-start records.
#[derive(Debug, Clone)]
pub struct WarmStartStore {
    root: PathBuf,
}

impl WarmStartStore {
    /// Creates a store rooted at `root`. Nothing is touched until the first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn profile_dir(&self, profile: &str) -> PathBuf {
        self.root.join(profile)
    }

    /// Saves `solution` for `profile`, stamped now. Returns the timestamped path.
    pub fn save(
        &self,
        profile: &str,
        solution: &Solution,
        signature: SolutionSignature,
    ) -> Result<PathBuf, StoreError> {
        self.save_at(profile, solution, signature, Utc::now())
    }

    /// Saves with an explicit timestamp.
    pub fn save_at(
        &self,
        profile: &str,
        solution: &Solution,
        signature: SolutionSignature,
        timestamp: DateTime<Utc>,
    ) -> Result<PathBuf, StoreError> {
        let record = WarmStartRecord::from_solution(solution, signature, timestamp);
        self.save_record(profile, &record)
    }

    /// Writes `record` as a timestamped file and as the profile's latest.
    pub fn save_record(&self, profile: &str, record: &WarmStartRecord) -> Result<PathBuf, StoreError> {
        let dir = self.profile_dir(profile);
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let stamp = record.generated.timestamp.format("%Y%m%dT%H%M%S%.3fZ");
        let path = dir.join(format!("{PREFIX}{stamp}.json"));
        let json = serde_json::to_string_pretty(record).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;

        write(&path, &json)?;
        write(&dir.join(LATEST), &json)?;

        info!(
            profile,
            path = %path.display(),
            assignments = record.assignments.len(),
            "saved warm-start record"
        );
        Ok(path)
    }

    /// Loads the latest record of `profile`.
    ///
    /// The schema version is checked before the rest of the record is
    /// interpreted.
    pub fn load_latest(&self, profile: &str) -> Result<WarmStartRecord, StoreError> {
        let path = self.profile_dir(profile).join(LATEST);
        if !path.exists() {
            return Err(StoreError::MissingLatest {
                profile: profile.to_string(),
            });
        }
        load(&path)
    }

    /// Like [`load_latest`](Self::load_latest), but any failure means "no
    /// warm start".
    pub fn try_load_latest(&self, profile: &str) -> Option<WarmStartRecord> {
        match self.load_latest(profile) {
            Ok(record) => Some(record),
            Err(StoreError::MissingLatest { .. }) => {
                debug!(profile, "no stored solution, cold start");
                None
            }
            Err(err) => {
                warn!(profile, error = %err, "stored solution unusable, cold start");
                None
            }
        }
    }

    /// Timestamped records of `profile`, oldest first.
    pub fn history(&self, profile: &str) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.profile_dir(profile);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(PREFIX) && name.ends_with(".json") {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn write(path: &Path, contents: &str) -> Result<(), StoreError> {
    fs::write(path, contents).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load(path: &Path) -> Result<WarmStartRecord, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_err = |source: serde_json::Error| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let value: serde_json::Value = serde_json::from_str(&text).map_err(parse_err)?;
    let found = value
        .get("schema_version")
        .and_then(serde_json::Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0);
    if found != SCHEMA_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found,
            expected: SCHEMA_VERSION,
        });
    }
    serde_json::from_value(value).map_err(parse_err)
}
