//! Parse SMILES strings into molecules and suggest a single retrosynthetic
//! disconnection by spectral bipartition of the molecular graph.
//!
//! ```
//! use retrochem::{parse_smiles, MoleculeGraph};
//!
//! let acetic_acid = parse_smiles("CC(=O)O").unwrap();
//! let graph = MoleculeGraph::new(&acetic_acid).unwrap();
//! let split = graph.bipartition();
//! assert_eq!(split.len(), 4);
//! ```

mod atom;
pub use atom::*;

mod bond;
pub use bond::*;

mod periodic;
pub use periodic::*;

mod config;
pub use config::*;

mod parse;
pub use parse::*;

mod molecule;
pub use molecule::*;

mod spectral;
pub use spectral::*;

mod bipartition;
pub use bipartition::*;

mod retro;
pub use retro::*;

mod error;
pub use error::*;

/// Install a formatting `tracing` subscriber at the given level
/// (`trace`, `debug`, `info`, `warn` or `error`; anything else means `info`).
///
/// Calling it again after a subscriber is installed does nothing.
pub fn init_logging(level: &str) {
    let level = level.parse().unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
