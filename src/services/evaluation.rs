use crate::{
    error::{AppError, AppResult},
    models::{MovieRating, RegressionMetrics},
    services::model::RatingModel,
};

/// Scores the model on held-out ratings
///
/// RMSE comes from the factorization library; MAE and R² are derived from
/// the same predictions.
pub fn evaluate(model: &RatingModel, test: &[MovieRating]) -> AppResult<RegressionMetrics> {
    if test.is_empty() {
        return Err(AppError::Training(
            "Cannot evaluate on an empty test set".to_string(),
        ));
    }

    let pairs: Vec<(f64, f64)> = test
        .iter()
        .map(|rating| model.predict_rating(rating))
        .filter_map(|prediction| {
            prediction
                .label
                .map(|label| (label as f64, prediction.score as f64))
        })
        .collect();

    regression_metrics(model.rmse(test) as f64, &pairs)
}

/// Completes `rmse` with MSE, MAE and R² over `(label, score)` pairs
pub fn regression_metrics(rmse: f64, pairs: &[(f64, f64)]) -> AppResult<RegressionMetrics> {
    if pairs.is_empty() {
        return Err(AppError::Training(
            "Cannot evaluate on an empty test set".to_string(),
        ));
    }

    let n = pairs.len() as f64;
    let mean_label = pairs.iter().map(|(label, _)| label).sum::<f64>() / n;

    let mut ss_tot = 0.0;
    let mut abs_err = 0.0;
    for (label, score) in pairs {
        abs_err += (label - score).abs();
        ss_tot += (label - mean_label).powi(2);
    }

    let mse = rmse * rmse;
    let ss_res = mse * n;
    // Constant labels leave R² undefined
    let r_squared = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(RegressionMetrics {
        rmse,
        r_squared,
        mae: abs_err / n,
        mse,
        count: pairs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::model::TrainingOptions;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfect_predictions() {
        let metrics = regression_metrics(0.0, &[(1.0, 1.0), (3.0, 3.0), (5.0, 5.0)]).unwrap();
        assert!(approx(metrics.rmse, 0.0));
        assert!(approx(metrics.mae, 0.0));
        assert!(approx(metrics.r_squared, 1.0));
        assert_eq!(metrics.count, 3);
    }

    #[test]
    fn test_known_values() {
        // errors: 1, -1, 0, 2 -> mse = 6/4, mae = 4/4
        // labels mean = 3 -> ss_tot = 4 + 0 + 0 + 4 = 8
        let pairs = [(1.0, 0.0), (3.0, 4.0), (3.0, 3.0), (5.0, 3.0)];
        let metrics = regression_metrics(1.5f64.sqrt(), &pairs).unwrap();
        assert!(approx(metrics.mse, 1.5));
        assert!(approx(metrics.rmse, 1.5f64.sqrt()));
        assert!(approx(metrics.mae, 1.0));
        assert!(approx(metrics.r_squared, 1.0 - 6.0 / 8.0));
    }

    #[test]
    fn test_constant_labels() {
        let exact = regression_metrics(0.0, &[(4.0, 4.0), (4.0, 4.0)]).unwrap();
        assert!(approx(exact.r_squared, 1.0));

        let off = regression_metrics(1.0, &[(4.0, 3.0), (4.0, 5.0)]).unwrap();
        assert!(approx(off.r_squared, 0.0));
        assert!(approx(off.rmse, 1.0));
    }

    #[test]
    fn test_empty_set_is_rejected() {
        assert!(matches!(regression_metrics(0.0, &[]), Err(AppError::Training(_))));
    }

    #[test]
    fn test_evaluate_model() {
        let train = vec![
            MovieRating::new(1, 10, 5.0),
            MovieRating::new(1, 20, 3.0),
            MovieRating::new(2, 10, 4.0),
            MovieRating::new(2, 20, 2.0),
        ];
        let test = vec![MovieRating::new(1, 10, 5.0), MovieRating::new(3, 10, 4.0)];
        let options = TrainingOptions {
            factors: 2,
            iterations: 5,
        };
        let model = RatingModel::train(&train, &options).unwrap();
        let metrics = evaluate(&model, &test).unwrap();
        assert_eq!(metrics.count, 2);
        assert!(metrics.rmse.is_finite());
        assert!(metrics.rmse >= 0.0);
        assert!(approx(metrics.mse, metrics.rmse * metrics.rmse));
        assert!(approx(metrics.rmse, model.rmse(&test) as f64));
    }

    #[test]
    fn test_evaluate_empty_test_set() {
        let train = vec![MovieRating::new(1, 10, 5.0), MovieRating::new(2, 10, 4.0)];
        let options = TrainingOptions {
            factors: 2,
            iterations: 3,
        };
        let model = RatingModel::train(&train, &options).unwrap();
        assert!(matches!(evaluate(&model, &[]), Err(AppError::Training(_))));
    }
}
