use rayon::prelude::*;

/// Bray-Curtis dissimilarity: sum |u - v| / sum (u + v). Two empty samples
/// are identical.
pub fn bray_curtis(u: &[u64], v: &[u64]) -> f64 {
    let (diff, total) = u
        .iter()
        .zip(v)
        .fold((0u64, 0u64), |(diff, total), (&a, &b)| {
            (diff + a.abs_diff(b), total + a + b)
        });
    if total == 0 {
        0.0
    } else {
        diff as f64 / total as f64
    }
}

/// Symmetric pairwise Bray-Curtis matrix, rows computed in parallel
pub fn distance_matrix(counts: &[Vec<u64>]) -> Vec<Vec<f64>> {
    let n = counts.len();
    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            ((i + 1)..n)
                .map(|j| bray_curtis(&counts[i], &counts[j]))
                .collect()
        })
        .collect();

    let mut matrix = vec![vec![0.0; n]; n];
    for (i, row) in upper.iter().enumerate() {
        for (offset, &d) in row.iter().enumerate() {
            let j = i + 1 + offset;
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}
