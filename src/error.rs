use thiserror::Error;

use crate::{GraphError, PeriodicTableError, SmilesError};

/// Any failure along the SMILES -> molecule -> graph -> bipartition pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    MalformedSmiles(#[from] SmilesError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    PeriodicTable(#[from] PeriodicTableError),
}

pub type Result<T> = std::result::Result<T, Error>;
