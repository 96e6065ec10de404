//! Accuracy of a reconstructed field against ground truth
//!
//! Differences are taken as `predicted - truth`, so a positive bias means
//! the reconstruction runs warm. Cells that are no-data or non-finite in
//! either field are left out.

use fieldrecon_core::{Error, Field, FieldElement, Result};

/// Summary error metrics over the comparable cells of two fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorStats {
    /// Number of cells compared
    pub n: usize,
    /// Mean absolute error
    pub mae: f64,
    /// Root mean square error
    pub rmse: f64,
    /// Largest absolute difference
    pub max_abs_err: f64,
    /// Mean signed difference
    pub mean_bias: f64,
}

fn check_shapes<T: FieldElement, U: FieldElement>(predicted: &Field<T>, truth: &Field<U>) -> Result<()> {
    let (er, ec) = truth.shape();
    let (ar, ac) = predicted.shape();
    if (er, ec) != (ar, ac) {
        return Err(Error::SizeMismatch { er, ec, ar, ac });
    }
    Ok(())
}

fn valid_f64<T: FieldElement>(value: T, nodata: Option<T>) -> Option<f64> {
    if value.is_valid(nodata) {
        value.to_f64()
    } else {
        None
    }
}

/// Compare a reconstruction with ground truth cell by cell.
///
/// # Errors
/// - [`Error::SizeMismatch`] if the shapes differ
/// - [`Error::Algorithm`] if no cell is valid in both fields
pub fn compare_fields<T, U>(predicted: &Field<T>, truth: &Field<U>) -> Result<ErrorStats>
where
    T: FieldElement,
    U: FieldElement,
{
    check_shapes(predicted, truth)?;

    let mut sum_sq = 0.0;
    let mut sum_abs = 0.0;
    let mut sum_diff = 0.0;
    let mut max_abs = 0.0_f64;
    let mut n = 0usize;

    for (&p, &t) in predicted.data().iter().zip(truth.data().iter()) {
        let (Some(p), Some(t)) = (valid_f64(p, predicted.nodata()), valid_f64(t, truth.nodata())) else {
            continue;
        };

        let diff = p - t;
        sum_sq += diff * diff;
        sum_abs += diff.abs();
        sum_diff += diff;
        max_abs = max_abs.max(diff.abs());
        n += 1;
    }

    if n == 0 {
        return Err(Error::Algorithm("No cells are valid in both fields".into()));
    }

    let nf = n as f64;
    Ok(ErrorStats {
        n,
        mae: sum_abs / nf,
        rmse: (sum_sq / nf).sqrt(),
        max_abs_err: max_abs,
        mean_bias: sum_diff / nf,
    })
}

/// Mean absolute error between a reconstruction and ground truth.
pub fn mean_absolute_error<T, U>(predicted: &Field<T>, truth: &Field<U>) -> Result<f64>
where
    T: FieldElement,
    U: FieldElement,
{
    compare_fields(predicted, truth).map(|stats| stats.mae)
}

/// Per-cell absolute difference `|predicted - truth|`.
///
/// Cells that cannot be compared are NaN, which is also the no-data marker
/// of the returned field.
pub fn absolute_error<T, U>(predicted: &Field<T>, truth: &Field<U>) -> Result<Field<f64>>
where
    T: FieldElement,
    U: FieldElement,
{
    check_shapes(predicted, truth)?;

    let data: Vec<f64> = predicted
        .data()
        .iter()
        .zip(truth.data().iter())
        .map(|(&p, &t)| {
            match (valid_f64(p, predicted.nodata()), valid_f64(t, truth.nodata())) {
                (Some(p), Some(t)) => (p - t).abs(),
                _ => f64::NAN,
            }
        })
        .collect();

    let (rows, cols) = predicted.shape();
    let mut output = Field::from_vec(data, rows, cols)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}
