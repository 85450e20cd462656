use std::{
    fs,
    io::{ErrorKind, Write},
    path::PathBuf,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::RegressionMetrics,
    services::model::{RatingModel, TrainingOptions},
};

const FORMAT_VERSION: u32 = 1;

/// Factor vector learned for one user or movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactorRow {
    pub id: u32,
    pub factors: Vec<f32>,
}

/// Serialized form of a fitted model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSnapshot {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub options: TrainingOptions,
    pub global_mean: f32,
    pub metrics: RegressionMetrics,
    pub users: Vec<FactorRow>,
    pub movies: Vec<FactorRow>,
}

impl ModelSnapshot {
    pub fn from_model(model: &RatingModel, metrics: RegressionMetrics) -> Self {
        let to_rows = |rows: Vec<(u32, Vec<f32>)>| -> Vec<FactorRow> {
            rows.into_iter()
                .map(|(id, factors)| FactorRow { id, factors })
                .collect()
        };

        Self {
            format_version: FORMAT_VERSION,
            trained_at: Utc::now(),
            options: *model.options(),
            global_mean: model.global_mean(),
            metrics,
            users: to_rows(model.user_factors()),
            movies: to_rows(model.movie_factors()),
        }
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            format_version: self.format_version,
            trained_at: self.trained_at,
            factors: self.options.factors,
            iterations: self.options.iterations,
            global_mean: self.global_mean,
            user_count: self.users.len(),
            movie_count: self.movies.len(),
            metrics: self.metrics,
        }
    }
}

/// Model description without the factor matrices
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelSummary {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub factors: u32,
    pub iterations: u32,
    pub global_mean: f32,
    pub user_count: usize,
    pub movie_count: usize,
    pub metrics: RegressionMetrics,
}

/// Reads and writes model snapshots as JSON at a fixed path
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Writes the snapshot, replacing any previous one
    ///
    /// The JSON goes to a uniquely named sibling file that is then renamed
    /// over the target, so readers only ever see a complete model.
    pub fn save(&self, snapshot: &ModelSnapshot) -> AppResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AppError::Internal(format!("Invalid model path: {}", self.path.display()))
            })?;
        let tmp_path = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let result = (|| -> AppResult<()> {
            let mut file = fs::File::create(&tmp_path)?;
            serde_json::to_writer(&mut file, snapshot)?;
            file.flush()?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result?;

        tracing::info!(
            path = %self.path.display(),
            users = snapshot.users.len(),
            movies = snapshot.movies.len(),
            "Model saved"
        );

        Ok(())
    }

    /// Reads the last saved snapshot
    pub fn load(&self) -> AppResult<ModelSnapshot> {
        let bytes = fs::read(&self.path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::NotFound(format!("No model saved at {}", self.path.display()))
            } else {
                AppError::Io(e)
            }
        })?;

        let snapshot: ModelSnapshot = serde_json::from_slice(&bytes)?;
        if snapshot.format_version != FORMAT_VERSION {
            return Err(AppError::Internal(format!(
                "Unsupported model format version {}",
                snapshot.format_version
            )));
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ModelSnapshot {
        ModelSnapshot {
            format_version: FORMAT_VERSION,
            trained_at: Utc::now(),
            options: TrainingOptions {
                factors: 2,
                iterations: 3,
            },
            global_mean: 3.75,
            metrics: RegressionMetrics {
                rmse: 0.5,
                r_squared: 0.8,
                mae: 0.4,
                mse: 0.25,
                count: 4,
            },
            users: vec![FactorRow {
                id: 6,
                factors: vec![0.1, 0.2],
            }],
            movies: vec![
                FactorRow {
                    id: 10,
                    factors: vec![0.3, 0.4],
                },
                FactorRow {
                    id: 11,
                    factors: vec![0.5, 0.6],
                },
            ],
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("nested").join("model.json"));

        let saved = snapshot();
        store.save(&saved).unwrap();
        assert_eq!(store.load().unwrap(), saved);

        // only the model file is left behind
        let entries = fs::read_dir(dir.path().join("nested")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_save_overwrites_previous_model() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.json"));

        store.save(&snapshot()).unwrap();
        let mut newer = snapshot();
        newer.global_mean = 4.0;
        store.save(&newer).unwrap();

        assert_eq!(store.load().unwrap().global_mean, 4.0);
    }

    #[test]
    fn test_concurrent_saves_never_expose_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.json"));
        store.save(&snapshot()).unwrap();

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let mut snapshot = snapshot();
                    snapshot.global_mean = i as f32;
                    // large enough that a non-atomic write would be visible
                    snapshot.movies = (0..2_000)
                        .map(|id| FactorRow {
                            id,
                            factors: vec![i as f32; 16],
                        })
                        .collect();
                    for _ in 0..10 {
                        store.save(&snapshot).unwrap();
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let loaded = store.load().unwrap();
                        assert_eq!(loaded.format_version, FORMAT_VERSION);
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }

        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_load_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("missing.json"));
        assert!(matches!(store.load(), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_summary() {
        let summary = snapshot().summary();
        assert_eq!(summary.user_count, 1);
        assert_eq!(summary.movie_count, 2);
        assert_eq!(summary.factors, 2);
        assert_eq!(summary.metrics.count, 4);
    }
}
