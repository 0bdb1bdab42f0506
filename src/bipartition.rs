use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::Molecule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cluster {
    First,
    Second,
}

/// A two-way split of a molecule's atom indices.
///
/// Atoms with a strictly positive Fiedler entry go to the first cluster;
/// everything else, including entries that are exactly zero, goes to the second.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bipartition {
    first: Vec<usize>,
    second: Vec<usize>,
}

impl Bipartition {
    pub fn from_fiedler(fiedler: &[f64]) -> Self {
        let (first, second): (Vec<usize>, Vec<usize>) =
            (0..fiedler.len()).partition(|&i| fiedler[i] > 0.0);
        Self { first, second }
    }

    /// Atom indices of the first cluster, ascending.
    pub fn first(&self) -> &[usize] {
        &self.first
    }

    /// Atom indices of the second cluster, ascending.
    pub fn second(&self) -> &[usize] {
        &self.second
    }

    pub fn len(&self) -> usize {
        self.first.len() + self.second.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cluster_of(&self, atom: usize) -> Option<Cluster> {
        if self.first.binary_search(&atom).is_ok() {
            Some(Cluster::First)
        } else if self.second.binary_search(&atom).is_ok() {
            Some(Cluster::Second)
        } else {
            None
        }
    }

    /// Whether both splits group the atoms the same way, regardless of which
    /// side is called first.
    pub fn same_partition(&self, other: &Bipartition) -> bool {
        (self.first == other.first && self.second == other.second)
            || (self.first == other.second && self.second == other.first)
    }

    /// Indices of the bonds whose atoms fall in different clusters: the bonds
    /// this retrosynthetic step proposes to break.
    pub fn cut_bonds(&self, molecule: &Molecule) -> Vec<usize> {
        molecule
            .bonds()
            .iter()
            .enumerate()
            .filter(|(_, bond)| self.cluster_of(bond.first) != self.cluster_of(bond.second))
            .map(|(i, _)| i)
            .collect()
    }
}

impl Display for Bipartition {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "First cluster: {:?}", self.first)?;
        write!(f, "Second cluster: {:?}", self.second)
    }
}
