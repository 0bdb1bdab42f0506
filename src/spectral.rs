use std::fmt::{Display, Formatter, Result as FmtResult};

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use thiserror::Error;
use tracing::*;

use crate::{Bipartition, Molecule, SpectralOptions};

/// Why a molecule has no well-defined Fiedler vector.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Degeneracy {
    #[error("the molecule has no atoms")]
    Empty,
    #[error("a single atom cannot be partitioned")]
    SingleAtom,
    #[error("the molecule is split into {components} disconnected components")]
    Disconnected { components: usize },
    #[error("the second-smallest Laplacian eigenvalue {0} is zero")]
    ZeroFiedlerValue(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Degenerate molecule graph with {atoms} atom(s): {reason}")]
    DegenerateGraph { atoms: usize, reason: Degeneracy },
    #[error("Eigensolver failure: {0}")]
    SolverFailure(String),
}

/// Eigenvalues in ascending order, and the matching orthonormal eigenvectors
/// as the columns of `eigenvectors`.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenDecomposition {
    pub eigenvalues: DVector<f64>,
    pub eigenvectors: DMatrix<f64>,
}

/// A solver for real symmetric eigenproblems.
///
/// Implementations must return eigenvalues sorted ascending with eigenvector
/// columns in the same order. The sign of each eigenvector is unspecified.
pub trait Eigensolver {
    fn decompose(&self, matrix: &DMatrix<f64>) -> Result<EigenDecomposition, GraphError>;
}

/// The default solver, backed by nalgebra's symmetric QR iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricEigenSolver {
    pub epsilon: f64,
    /// `0` iterates until convergence.
    pub max_iterations: usize,
}

impl Default for SymmetricEigenSolver {
    fn default() -> Self {
        Self {
            epsilon: f64::EPSILON,
            max_iterations: 0,
        }
    }
}

impl SymmetricEigenSolver {
    pub fn from_options(options: &SpectralOptions) -> Self {
        Self {
            max_iterations: options.max_iterations,
            ..Default::default()
        }
    }
}

impl Eigensolver for SymmetricEigenSolver {
    fn decompose(&self, matrix: &DMatrix<f64>) -> Result<EigenDecomposition, GraphError> {
        let (rows, cols) = matrix.shape();
        if rows != cols {
            return Err(GraphError::SolverFailure(format!(
                "expected a square matrix, got {rows}x{cols}"
            )));
        }
        if matrix.iter().any(|x| !x.is_finite()) {
            return Err(GraphError::SolverFailure(
                "matrix has non-finite entries".to_string(),
            ));
        }
        let scale = matrix.amax().max(1.0);
        for i in 0..rows {
            for j in (i + 1)..cols {
                if (matrix[(i, j)] - matrix[(j, i)]).abs() > 1e-12 * scale {
                    return Err(GraphError::SolverFailure(format!(
                        "matrix is not symmetric at ({i}, {j})"
                    )));
                }
            }
        }
        if rows == 0 {
            return Ok(EigenDecomposition {
                eigenvalues: DVector::zeros(0),
                eigenvectors: DMatrix::zeros(0, 0),
            });
        }

        let eigen = SymmetricEigen::try_new(matrix.clone(), self.epsilon, self.max_iterations)
            .ok_or_else(|| {
                GraphError::SolverFailure(format!(
                    "no convergence within {} iterations",
                    self.max_iterations
                ))
            })?;

        // nalgebra does not sort its eigenpairs.
        let mut order: Vec<usize> = (0..rows).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
        let eigenvalues = DVector::from_iterator(rows, order.iter().map(|&i| eigen.eigenvalues[i]));
        let columns: Vec<DVector<f64>> = order
            .iter()
            .map(|&i| eigen.eigenvectors.column(i).into_owned())
            .collect();

        Ok(EigenDecomposition {
            eigenvalues,
            eigenvectors: DMatrix::from_columns(&columns),
        })
    }
}

/// The weighted adjacency matrix: entry `(i, j)` is the order of the bond
/// between atoms `i` and `j` (4 for aromatic), or zero.
pub fn adjacency_matrix(molecule: &Molecule) -> DMatrix<f64> {
    let n = molecule.len();
    let mut adjacency = DMatrix::zeros(n, n);
    for bond in molecule.bonds() {
        let weight = bond.order.value() as f64;
        adjacency[(bond.first, bond.second)] = weight;
        adjacency[(bond.second, bond.first)] = weight;
    }
    adjacency
}

/// The diagonal matrix of adjacency row sums.
pub fn degree_matrix(adjacency: &DMatrix<f64>) -> DMatrix<f64> {
    let sums: Vec<f64> = adjacency.row_iter().map(|row| row.sum()).collect();
    DMatrix::from_diagonal(&DVector::from_vec(sums))
}

pub fn laplacian_matrix(degree: &DMatrix<f64>, adjacency: &DMatrix<f64>) -> DMatrix<f64> {
    degree - adjacency
}

/// The spectral view of a molecule: its weighted adjacency, degree and
/// Laplacian matrices, and the Fiedler vector of the Laplacian.
///
/// Built from a snapshot of the molecule; rebuild it if the molecule changes.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeGraph {
    adjacency: DMatrix<f64>,
    degree: DMatrix<f64>,
    laplacian: DMatrix<f64>,
    eigenvalues: DVector<f64>,
    fiedler: DVector<f64>,
}

impl MoleculeGraph {
    pub fn new(molecule: &Molecule) -> Result<Self, GraphError> {
        let options = SpectralOptions::default();
        Self::with_solver(molecule, &SymmetricEigenSolver::from_options(&options), &options)
    }

    /// Build the matrices and extract the Fiedler vector with the given solver.
    ///
    /// Fails with [`GraphError::DegenerateGraph`] for empty, single-atom and
    /// disconnected molecules, and for a Fiedler eigenvalue within
    /// `options.zero_tolerance` of zero.
    pub fn with_solver(
        molecule: &Molecule,
        solver: &dyn Eigensolver,
        options: &SpectralOptions,
    ) -> Result<Self, GraphError> {
        let n = molecule.len();
        let adjacency = adjacency_matrix(molecule);
        let degree = degree_matrix(&adjacency);
        let laplacian = laplacian_matrix(&degree, &adjacency);

        let degenerate = |reason| GraphError::DegenerateGraph { atoms: n, reason };
        match n {
            0 => return Err(degenerate(Degeneracy::Empty)),
            1 => return Err(degenerate(Degeneracy::SingleAtom)),
            _ => {}
        }
        let components = molecule.component_count();
        if components > 1 {
            return Err(degenerate(Degeneracy::Disconnected { components }));
        }

        let EigenDecomposition {
            eigenvalues,
            eigenvectors,
        } = solver.decompose(&laplacian)?;
        if eigenvalues.len() != n || eigenvectors.shape() != (n, n) {
            return Err(GraphError::SolverFailure(format!(
                "expected {} eigenpairs, got {} eigenvalues and a {:?} eigenvector matrix",
                n,
                eigenvalues.len(),
                eigenvectors.shape()
            )));
        }
        if eigenvalues.as_slice().windows(2).any(|w| w[0] > w[1]) {
            return Err(GraphError::SolverFailure(
                "eigenvalues are not in ascending order".to_string(),
            ));
        }
        debug!("Laplacian spectrum: {:?}", eigenvalues.as_slice());

        let fiedler_value = eigenvalues[1];
        if fiedler_value.abs() <= options.zero_tolerance {
            return Err(degenerate(Degeneracy::ZeroFiedlerValue(fiedler_value)));
        }
        if n > 2 && (eigenvalues[2] - fiedler_value).abs() <= options.zero_tolerance {
            warn!(
                "Fiedler eigenvalue {} is repeated, so the Fiedler vector is not unique",
                fiedler_value
            );
        }

        let mut fiedler = eigenvectors.column(1).into_owned();
        fix_sign(&mut fiedler, options.zero_tolerance);

        Ok(Self {
            adjacency,
            degree,
            laplacian,
            eigenvalues,
            fiedler,
        })
    }

    pub fn adjacency(&self) -> &DMatrix<f64> {
        &self.adjacency
    }

    pub fn degree(&self) -> &DMatrix<f64> {
        &self.degree
    }

    pub fn laplacian(&self) -> &DMatrix<f64> {
        &self.laplacian
    }

    /// All Laplacian eigenvalues, ascending.
    pub fn eigenvalues(&self) -> &DVector<f64> {
        &self.eigenvalues
    }

    pub fn fiedler(&self) -> &DVector<f64> {
        &self.fiedler
    }

    /// The second-smallest Laplacian eigenvalue, also known as the
    /// algebraic connectivity.
    pub fn fiedler_value(&self) -> f64 {
        self.eigenvalues[1]
    }

    pub fn bipartition(&self) -> Bipartition {
        Bipartition::from_fiedler(self.fiedler.as_slice())
    }
}

/// Make the largest-magnitude entry positive, picking the lowest index among
/// entries within `tolerance` of the maximum.
fn fix_sign(vector: &mut DVector<f64>, tolerance: f64) {
    let largest = vector.amax();
    let pivot = vector.iter().find(|x| x.abs() >= largest - tolerance).copied();
    if matches!(pivot, Some(x) if x < 0.0) {
        vector.neg_mut();
    }
}

impl Display for MoleculeGraph {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "DEGREE MATRIX:")?;
        writeln!(f, "{}", self.degree)?;
        writeln!(f, "WEIGHTED ADJACENCY MATRIX:")?;
        writeln!(f, "{}", self.adjacency)?;
        writeln!(f, "LAPLACIAN MATRIX:")?;
        writeln!(f, "{}", self.laplacian)?;
        writeln!(f, "FIEDLER VECTOR:")?;
        writeln!(f, "{:?}", self.fiedler.as_slice())
    }
}
