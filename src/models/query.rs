use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// A user/movie pair parsed from a `"userId:movieId"` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecommendationQuery {
    pub user_id: u32,
    pub movie_id: u32,
}

impl RecommendationQuery {
    pub fn new(user_id: u32, movie_id: u32) -> Self {
        Self { user_id, movie_id }
    }

    /// Parses `"userId:movieId"`, e.g. `"6:10"`
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::InvalidInput(
                "Expected a value of the form userId:movieId".to_string(),
            ));
        }

        let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
        let [user, movie] = parts.as_slice() else {
            return Err(AppError::InvalidInput(format!(
                "Expected userId:movieId, got '{}'",
                raw
            )));
        };

        Ok(Self {
            user_id: parse_id("userId", user)?,
            movie_id: parse_id("movieId", movie)?,
        })
    }
}

fn parse_id(name: &str, value: &str) -> Result<u32, AppError> {
    value
        .parse::<u32>()
        .map_err(|_| AppError::InvalidInput(format!("{} must be a non-negative integer, got '{}'", name, value)))
}

impl FromStr for RecommendationQuery {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for RecommendationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.user_id, self.movie_id)
    }
}
