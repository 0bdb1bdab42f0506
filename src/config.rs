//! Configuration for parsing and spectral bipartitioning.
//!
//! - [`ParseOptions`] controls how tolerant the SMILES scanner is and whether
//!   aromatic bonds are produced.
//! - [`SpectralOptions`] controls the eigensolver and the numerical threshold
//!   used to decide that an eigenvalue is zero.
//! - [`Config`] bundles both.

/// What to do with ring-closure labels or branches still open at the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RingClosurePolicy {
    /// Accept them silently; the dangling label simply never becomes a bond.
    #[default]
    Lenient,
    /// Reject them with a malformed-SMILES error.
    Strict,
}

/// Options for the SMILES parser.
///
/// # Examples
///
/// ```
/// use retrochem::{ParseOptions, RingClosurePolicy};
///
/// let strict = ParseOptions::default()
///     .with_ring_closures(RingClosurePolicy::Strict)
///     .with_aromatic_bonds(true);
/// assert!(strict.infer_aromatic_bonds);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub ring_closures: RingClosurePolicy,
    /// Produce aromatic bonds: `:` gives the aromatic order, and so does an
    /// unmarked bond between two aromatic atoms. When off, both are single.
    pub infer_aromatic_bonds: bool,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            ring_closures: RingClosurePolicy::Strict,
            ..Default::default()
        }
    }

    pub fn with_ring_closures(mut self, policy: RingClosurePolicy) -> Self {
        self.ring_closures = policy;
        self
    }

    pub fn with_aromatic_bonds(mut self, infer: bool) -> Self {
        self.infer_aromatic_bonds = infer;
        self
    }
}

/// Options for the Laplacian eigendecomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralOptions {
    /// Eigenvalues with an absolute value at or below this are treated as zero.
    pub zero_tolerance: f64,
    /// Iteration cap for the eigensolver; `0` means iterate until convergence.
    pub max_iterations: usize,
}

impl Default for SpectralOptions {
    fn default() -> Self {
        Self {
            zero_tolerance: 1e-9,
            max_iterations: 0,
        }
    }
}

impl SpectralOptions {
    pub fn with_zero_tolerance(mut self, tolerance: f64) -> Self {
        self.zero_tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }
}

/// All settings for a parse-and-bipartition run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Config {
    pub parse: ParseOptions,
    pub spectral: SpectralOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.parse.ring_closures, RingClosurePolicy::Lenient);
        assert!(!config.parse.infer_aromatic_bonds);
        assert_eq!(config.spectral.zero_tolerance, 1e-9);
        assert_eq!(config.spectral.max_iterations, 0);
    }

    #[test]
    fn test_builders() {
        let parse = ParseOptions::strict().with_aromatic_bonds(true);
        assert_eq!(parse.ring_closures, RingClosurePolicy::Strict);
        assert!(parse.infer_aromatic_bonds);

        let spectral = SpectralOptions::default()
            .with_zero_tolerance(1e-6)
            .with_max_iterations(500);
        assert_eq!(spectral.zero_tolerance, 1e-6);
        assert_eq!(spectral.max_iterations, 500);
    }
}
