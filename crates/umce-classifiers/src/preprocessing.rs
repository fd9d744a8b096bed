//! Feature standardization for the single-model pipelines.
//!
//! The scaler is fit on a training matrix and then applied unchanged to the
//! matching test matrix, so both are expressed in training units.

use ndarray::{Array1, Array2, Axis};

use crate::error::{Result, UmceError};

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, PartialEq)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// Columns with a population std below this are left unscaled.
    const MIN_STD: f64 = 1e-12;
}

/// Fit a `Scaler` where rows are samples and columns are features.
/// Uses the population standard deviation.
pub fn fit_scaler(x: &Array2<f64>) -> Result<Scaler> {
    if x.nrows() == 0 {
        return Err(UmceError::DegenerateInput(
            "cannot fit a scaler on zero rows".to_string(),
        ));
    }

    let mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| UmceError::DegenerateInput("empty matrix".to_string()))?;
    let std = x
        .std_axis(Axis(0), 0.0)
        .mapv(|s| if s < Scaler::MIN_STD { 1.0 } else { s });

    Ok(Scaler { mean, std })
}

/// Transform all rows using the provided `Scaler`.
pub fn transform_all(x: &Array2<f64>, sc: &Scaler) -> Result<Array2<f64>> {
    if x.ncols() != sc.mean.len() {
        return Err(UmceError::Schema(format!(
            "scaler fit on {} columns applied to {}",
            sc.mean.len(),
            x.ncols()
        )));
    }
    Ok((x - &sc.mean) / &sc.std)
}

/// Optional convenience: fit scaler and return transformed matrix in one call.
pub fn fit_transform(x: &Array2<f64>) -> Result<(Scaler, Array2<f64>)> {
    let sc = fit_scaler(x)?;
    let scaled = transform_all(x, &sc)?;
    Ok((sc, scaled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_fit_transform_zero_mean_unit_variance() {
        let x = array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0]];
        let (sc, scaled) = fit_transform(&x).unwrap();

        assert_abs_diff_eq!(sc.mean[0], 2.0);
        assert_abs_diff_eq!(sc.std[0], (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(scaled.column(0).sum(), 0.0, epsilon = 1e-12);
        // Constant column is only centred.
        assert_eq!(sc.std[1], 1.0);
        assert_eq!(scaled.column(1).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_transform_uses_training_statistics() {
        let sc = fit_scaler(&array![[0.0], [2.0]]).unwrap();
        let test = transform_all(&array![[4.0]], &sc).unwrap();
        assert_abs_diff_eq!(test[[0, 0]], 3.0);
    }

    #[test]
    fn test_errors() {
        assert!(fit_scaler(&Array2::zeros((0, 2))).is_err());
        let sc = fit_scaler(&array![[1.0, 2.0]]).unwrap();
        assert!(matches!(transform_all(&array![[1.0]], &sc), Err(UmceError::Schema(_))));
    }
}
