use std::path::PathBuf;

use serde::Deserialize;

use crate::services::model::TrainingOptions;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// CSV file the model is trained on
    #[serde(default = "default_train_data_path")]
    pub train_data_path: PathBuf,

    /// CSV file the model is evaluated against
    #[serde(default = "default_test_data_path")]
    pub test_data_path: PathBuf,

    /// Where the fitted model is written after every request
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Approximation rank of the factor matrices
    #[serde(default = "default_factors")]
    pub factors: u32,

    /// Number of training passes
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Predicted ratings above this score are recommended
    #[serde(default = "default_recommendation_threshold")]
    pub recommendation_threshold: f32,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7071
}

fn default_train_data_path() -> PathBuf {
    PathBuf::from("Data/recommendation-ratings-train.csv")
}

fn default_test_data_path() -> PathBuf {
    PathBuf::from("Data/recommendation-ratings-test.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("Data/MovieRecommenderModel.json")
}

fn default_factors() -> u32 {
    100
}

fn default_iterations() -> u32 {
    20
}

fn default_recommendation_threshold() -> f32 {
    3.5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            train_data_path: default_train_data_path(),
            test_data_path: default_test_data_path(),
            model_path: default_model_path(),
            factors: default_factors(),
            iterations: default_iterations(),
            recommendation_threshold: default_recommendation_threshold(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the trainer or the threshold rule cannot work with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.factors == 0 {
            anyhow::bail!("FACTORS must be greater than zero");
        }
        if self.iterations == 0 {
            anyhow::bail!("ITERATIONS must be greater than zero");
        }
        if !self.recommendation_threshold.is_finite() {
            anyhow::bail!("RECOMMENDATION_THRESHOLD must be a finite number");
        }
        Ok(())
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            factors: self.factors,
            iterations: self.iterations,
        }
    }
}
