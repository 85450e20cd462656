use std::{fs::File, io::ErrorKind, path::Path};

use crate::{
    error::{AppError, AppResult},
    models::MovieRating,
};

/// Reads every rating from a headered CSV file
///
/// A missing file maps to `AppError::DataNotFound`; a file with a header but
/// no rows is rejected since nothing can be trained or evaluated on it.
pub fn load_ratings(path: &Path) -> AppResult<Vec<MovieRating>> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            AppError::DataNotFound(path.display().to_string())
        } else {
            AppError::Io(e)
        }
    })?;

    let ratings = read_ratings(file)?;
    if ratings.is_empty() {
        return Err(AppError::Training(format!(
            "{} contains no ratings",
            path.display()
        )));
    }

    tracing::debug!(path = %path.display(), rows = ratings.len(), "Loaded ratings");

    Ok(ratings)
}

/// Deserializes ratings from any CSV source
pub fn read_ratings<R: std::io::Read>(reader: R) -> AppResult<Vec<MovieRating>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut ratings = Vec::new();
    for result in rdr.deserialize() {
        let rating: MovieRating = result?;
        if !rating.rating.is_finite() {
            return Err(AppError::InvalidData(format!(
                "Rating for user {} and movie {} is not a finite number",
                rating.user_id, rating.movie_id
            )));
        }
        ratings.push(rating);
    }

    Ok(ratings)
}
