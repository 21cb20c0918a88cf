// Truncated SVD dimensionality reduction.
//
// Projects the sparse term matrix into a dense low-rank embedding via
// power iteration with deflation: find the dominant singular triple,
// subtract its contribution, repeat. The returned embedding is U·Σ
// (document weights), matching what a truncated SVD transform yields.
//
// The iteration starts from a seeded random vector, so identical input
// and seed produce bit-identical output. The reduction is lossy by
// design — only the top singular directions survive.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::vectorize::TermMatrix;

/// Fixed seed for reproducible embeddings across runs.
pub const DEFAULT_SEED: u64 = 42;

const MAX_ITERATIONS: usize = 100;
const CONVERGENCE_TOL: f64 = 1e-10;

/// Truncated SVD reducer.
pub struct TruncatedSvd {
    /// Requested number of latent components. The effective count is
    /// clamped to min(n_components, max(1, n_terms - 1)).
    pub n_components: usize,
    pub seed: u64,
}

impl Default for TruncatedSvd {
    fn default() -> Self {
        Self {
            n_components: 50,
            seed: DEFAULT_SEED,
        }
    }
}

impl TruncatedSvd {
    /// The component count actually produced for a vocabulary of
    /// `n_terms` columns.
    pub fn effective_components(&self, n_terms: usize) -> usize {
        self.n_components.min(n_terms.saturating_sub(1).max(1))
    }

    /// Reduce the term matrix to a dense (n_rows, k) embedding.
    ///
    /// A zero-column matrix (all-empty batch text) reduces to an all-zero
    /// embedding of the clamped width — never an error.
    pub fn fit_transform(&self, matrix: &TermMatrix) -> Array2<f64> {
        let n = matrix.n_rows();
        let v = matrix.n_terms();
        let k = self.effective_components(v);

        if n == 0 || v == 0 {
            return Array2::zeros((n, k));
        }

        // Densify the sparse rows for the iteration
        let mut work = Array2::<f64>::zeros((n, v));
        for (i, row) in matrix.rows.iter().enumerate() {
            for &(j, weight) in row {
                work[[i, j]] = weight;
            }
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut embedding = Array2::<f64>::zeros((n, k));

        for component in 0..k {
            let Some((sigma, u, vt)) = dominant_singular_triple(&work, &mut rng) else {
                // Rank exhausted — remaining components stay zero
                break;
            };

            for i in 0..n {
                embedding[[i, component]] = sigma * u[i];
            }

            // Deflate: remove this component's contribution
            for i in 0..n {
                for j in 0..v {
                    work[[i, j]] -= sigma * u[i] * vt[j];
                }
            }
        }

        debug!(
            rows = n,
            components = k,
            "Reduced term matrix to dense embedding"
        );

        embedding
    }
}

/// Power iteration for the dominant singular value and vectors of
/// `matrix`. Returns None when the matrix is numerically zero.
fn dominant_singular_triple(
    matrix: &Array2<f64>,
    rng: &mut StdRng,
) -> Option<(f64, Array1<f64>, Array1<f64>)> {
    let (m, n) = (matrix.nrows(), matrix.ncols());

    // Seeded random start, normalized
    let mut v: Array1<f64> = Array1::from_iter((0..n).map(|_| rng.random::<f64>() - 0.5));
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm == 0.0 {
        return None;
    }
    v /= norm;

    let mut u = Array1::<f64>::zeros(m);
    let mut sigma = 0.0;

    for _ in 0..MAX_ITERATIONS {
        // u = A v, normalized
        u = matrix.dot(&v);
        let norm_u = u.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm_u < CONVERGENCE_TOL {
            return None;
        }
        u /= norm_u;

        // v = A^T u; its norm is the singular value estimate
        let v_new = matrix.t().dot(&u);
        let new_sigma = v_new.iter().map(|x| x * x).sum::<f64>().sqrt();
        if new_sigma < CONVERGENCE_TOL {
            return None;
        }
        v = v_new / new_sigma;

        if (new_sigma - sigma).abs() < CONVERGENCE_TOL {
            sigma = new_sigma;
            break;
        }
        sigma = new_sigma;
    }

    Some((sigma, u, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::vectorize::TfidfVectorizer;

    fn sample_matrix() -> TermMatrix {
        let texts: Vec<String> = [
            "bullish breakout today volume rising",
            "bearish crash fears intraday selling",
            "bullish momentum strong rally continues",
            "market chatter neutral quiet session",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        TfidfVectorizer::default().fit_transform(&texts)
    }

    #[test]
    fn embedding_has_clamped_shape() {
        let matrix = sample_matrix();
        let svd = TruncatedSvd {
            n_components: 50,
            seed: DEFAULT_SEED,
        };
        let embedding = svd.fit_transform(&matrix);
        assert_eq!(embedding.nrows(), matrix.n_rows());
        assert_eq!(
            embedding.ncols(),
            50.min(matrix.n_terms() - 1),
            "components clamp to vocabulary size minus one"
        );
    }

    #[test]
    fn effective_components_clamps() {
        let svd = TruncatedSvd::default();
        assert_eq!(svd.effective_components(2000), 50);
        assert_eq!(svd.effective_components(10), 9);
        assert_eq!(svd.effective_components(1), 1);
        assert_eq!(svd.effective_components(0), 1);
    }

    #[test]
    fn deterministic_for_same_seed() {
        let matrix = sample_matrix();
        let svd = TruncatedSvd::default();
        let a = svd.fit_transform(&matrix);
        let b = svd.fit_transform(&matrix);
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.to_bits(), y.to_bits(), "embedding must be bit-identical");
        }
    }

    #[test]
    fn zero_column_matrix_reduces_to_zeros() {
        let matrix = TermMatrix {
            rows: vec![vec![], vec![], vec![]],
            vocabulary: vec![],
        };
        let embedding = TruncatedSvd::default().fit_transform(&matrix);
        assert_eq!(embedding.nrows(), 3);
        assert_eq!(embedding.ncols(), 1);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn empty_batch_reduces_to_empty() {
        let matrix = TermMatrix {
            rows: vec![],
            vocabulary: vec![],
        };
        let embedding = TruncatedSvd::default().fit_transform(&matrix);
        assert_eq!(embedding.nrows(), 0);
    }

    #[test]
    fn first_component_captures_dominant_direction() {
        // Two identical rows and one orthogonal row: the dominant
        // singular direction separates them, and identical rows get
        // identical first-component weights.
        let matrix = TermMatrix {
            rows: vec![
                vec![(0, 1.0)],
                vec![(0, 1.0)],
                vec![(1, 1.0)],
            ],
            vocabulary: vec!["alpha".to_string(), "beta".to_string()],
        };
        let svd = TruncatedSvd {
            n_components: 1,
            seed: DEFAULT_SEED,
        };
        let embedding = svd.fit_transform(&matrix);
        assert!((embedding[[0, 0]] - embedding[[1, 0]]).abs() < 1e-8);
    }
}
