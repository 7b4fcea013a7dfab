use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Upper bound on the rank of the reduced feature matrix
pub const MAX_COMPONENTS: usize = 5;

/// Linear map from raw feature space onto the leading singular directions
#[derive(Debug, Clone)]
pub struct Projection {
    /// `input_dims × rank`, one right singular vector per column
    components: DMatrix<f64>,
    /// Descending
    singular_values: Vec<f64>,
    /// Share of the total squared norm of the feature matrix per direction
    energy_ratio: Vec<f64>,
}

impl Projection {
    pub fn rank(&self) -> usize {
        self.components.ncols()
    }

    pub fn input_dims(&self) -> usize {
        self.components.nrows()
    }

    pub fn components(&self) -> &DMatrix<f64> {
        &self.components
    }

    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    pub fn energy_ratio(&self) -> &[f64] {
        &self.energy_ratio
    }

    /// Projects one raw feature vector into the reduced space.
    ///
    /// Returns `None` when `features` does not have `input_dims()` entries.
    pub fn project(&self, features: &[f64]) -> Option<DVector<f64>> {
        if features.len() != self.input_dims() {
            return None;
        }
        Some(self.components.tr_mul(&DVector::from_column_slice(features)))
    }
}

/// Truncated SVD of `features` without mean-centering.
///
/// The right singular vectors are the eigenvectors of `XᵀX`; the leading
/// `min(MAX_COMPONENTS, ncols)` of them form the projection and the reduced
/// matrix is `X · V_k`. Each direction is sign-normalized so its largest
/// magnitude entry is positive.
pub fn reduce_dimensions(features: &DMatrix<f64>) -> (DMatrix<f64>, Projection) {
    let dims = features.ncols();
    let rank = dims.min(MAX_COMPONENTS);

    let eigen = SymmetricEigen::new(features.tr_mul(features));

    let mut order: Vec<usize> = (0..dims).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    // Clamp tiny negative eigenvalues from round-off
    let total_energy: f64 = eigen.eigenvalues.iter().map(|v| v.max(0.0)).sum();

    let mut components = DMatrix::<f64>::zeros(dims, rank);
    let mut singular_values = Vec::with_capacity(rank);
    let mut energy_ratio = Vec::with_capacity(rank);

    for (k, &col) in order.iter().take(rank).enumerate() {
        let mut direction = eigen.eigenvectors.column(col).clone_owned();
        let pivot = direction
            .iter()
            .copied()
            .fold(0.0_f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
        if pivot < 0.0 {
            direction.neg_mut();
        }
        components.set_column(k, &direction);

        let energy = eigen.eigenvalues[col].max(0.0);
        singular_values.push(energy.sqrt());
        energy_ratio.push(if total_energy > 0.0 {
            energy / total_energy
        } else {
            0.0
        });
    }

    let reduced = features * &components;

    tracing::info!(
        rows = features.nrows(),
        rank,
        energy_ratio = ?energy_ratio,
        "Feature matrix reduced"
    );

    (
        reduced,
        Projection {
            components,
            singular_values,
            energy_ratio,
        },
    )
}
