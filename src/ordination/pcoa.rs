use log::debug;
use nalgebra::{DMatrix, SymmetricEigen};

use crate::error::{GutError, Result};

/// Classical multidimensional scaling of a distance matrix. Returns the
/// coordinates of every sample on the `dimensions` leading axes and the
/// matching eigenvalues.
pub fn pcoa(distances: &[Vec<f64>], dimensions: usize) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let n = distances.len();
    if n < 2 {
        return Err(GutError::EmptyCohort(format!(
            "ordination needs at least 2 samples, got {}",
            n
        )));
    }
    if distances.iter().any(|row| row.len() != n) {
        return Err(GutError::InvalidArgument(
            "distance matrix must be square".to_string(),
        ));
    }

    // Gower centring of -0.5 * D^2
    let a = DMatrix::from_fn(n, n, |i, j| -0.5 * distances[i][j] * distances[i][j]);
    let row_means: Vec<f64> = (0..n).map(|i| a.row(i).mean()).collect();
    let col_means: Vec<f64> = (0..n).map(|j| a.column(j).mean()).collect();
    let grand_mean = a.mean();
    let b = DMatrix::from_fn(n, n, |i, j| {
        a[(i, j)] - row_means[i] - col_means[j] + grand_mean
    });

    let eigen = SymmetricEigen::new(b);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&x, &y| eigen.eigenvalues[y].total_cmp(&eigen.eigenvalues[x]));
    order.truncate(dimensions.min(n));

    let eigenvalues: Vec<f64> = order.iter().map(|&k| eigen.eigenvalues[k]).collect();
    debug!("Leading eigenvalues: {:?}", eigenvalues);

    let coordinates = (0..n)
        .map(|i| {
            order
                .iter()
                .map(|&k| eigen.eigenvectors[(i, k)] * eigen.eigenvalues[k].max(0.0).sqrt())
                .collect()
        })
        .collect();

    Ok((coordinates, eigenvalues))
}
