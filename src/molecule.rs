use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;

use crate::{Atom, Bond, BondOrder, ParseOptions, PeriodicTable, SmilesError, SmilesParser};

/// The connectivity of a molecule as a petgraph graph.
///
/// Node `i` carries atom index `i`; edges carry the bond order.
pub type AtomGraph = UnGraph<usize, BondOrder>;

/// A parsed molecule: its atoms in parse order, and the bonds between them.
///
/// Bonds refer to atoms by their index in [`Molecule::atoms`], which is also
/// the row/column index used by [`MoleculeGraph`](crate::MoleculeGraph).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a SMILES string with the builtin periodic table and default options.
    pub fn from_smiles(smiles: &str) -> Result<Self, SmilesError> {
        SmilesParser::new(smiles, PeriodicTable::builtin()).parse()
    }

    pub fn parse(
        smiles: &str,
        table: &PeriodicTable,
        options: ParseOptions,
    ) -> Result<Self, SmilesError> {
        SmilesParser::new(smiles, table).with_options(options).parse()
    }

    pub(crate) fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    pub(crate) fn add_bond(&mut self, bond: Bond) -> usize {
        debug_assert!(bond.first < self.atoms.len() && bond.second < self.atoms.len());
        self.bonds.push(bond);
        self.bonds.len() - 1
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Number of atoms.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.bonds.iter().find(|bond| bond.connects(a, b))
    }

    pub fn neighbors(&self, atom: usize) -> impl Iterator<Item = usize> + '_ {
        self.bonds.iter().filter_map(move |bond| bond.other(atom))
    }

    pub fn to_graph(&self) -> AtomGraph {
        let mut graph = AtomGraph::with_capacity(self.atoms.len(), self.bonds.len());
        for i in 0..self.atoms.len() {
            graph.add_node(i);
        }
        for bond in &self.bonds {
            graph.add_edge(
                NodeIndex::new(bond.first),
                NodeIndex::new(bond.second),
                bond.order,
            );
        }
        graph
    }

    /// Number of connected components. An empty molecule has none.
    pub fn component_count(&self) -> usize {
        petgraph::algo::connected_components(&self.to_graph())
    }

    /// The connected groups of atoms left after removing the bonds at the
    /// given indices. Each group is sorted, and groups are ordered by their
    /// lowest atom index.
    pub fn fragments(&self, removed_bonds: &[usize]) -> Vec<Vec<usize>> {
        let mut sets = UnionFind::<usize>::new(self.atoms.len());
        for (i, bond) in self.bonds.iter().enumerate() {
            if !removed_bonds.contains(&i) {
                sets.union(bond.first, bond.second);
            }
        }

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for atom in 0..self.atoms.len() {
            groups.entry(sets.find(atom)).or_default().push(atom);
        }
        let mut fragments: Vec<Vec<usize>> = groups.into_values().collect();
        fragments.sort_by_key(|group| group[0]);
        fragments
    }
}

impl FromStr for Molecule {
    type Err = SmilesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_smiles(s)
    }
}

impl Display for Molecule {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "MOLECULE OVERVIEW")?;
        writeln!(f, "Number of atoms: {}", self.atoms.len())?;
        writeln!(f, "Number of bonds: {}", self.bonds.len())?;
        writeln!(f, "ATOM BLOCK")?;
        for (i, atom) in self.atoms.iter().enumerate() {
            writeln!(f, "Atom {}: {}", i, atom.summary())?;
        }
        writeln!(f, "BOND BLOCK")?;
        for (i, bond) in self.bonds.iter().enumerate() {
            writeln!(f, "Bond {}: {}\t{}\t{}", i, bond.first, bond.second, bond.order)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_matches_bonds() {
        let molecule: Molecule = "CC(=O)O".parse().unwrap();
        let graph = molecule.to_graph();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        let edge = graph.find_edge(NodeIndex::new(1), NodeIndex::new(2)).unwrap();
        assert_eq!(graph[edge], BondOrder::Double);
        assert_eq!(graph[NodeIndex::new(3)], 3);
    }

    #[test]
    fn test_components() {
        assert_eq!(Molecule::new().component_count(), 0);
        assert_eq!(Molecule::from_smiles("CCO").unwrap().component_count(), 1);
        assert_eq!(Molecule::from_smiles("CCO.O").unwrap().component_count(), 2);
    }

    #[test]
    fn test_fragments() {
        let ester = Molecule::from_smiles("CC(=O)OCC").unwrap();
        assert_eq!(ester.fragments(&[]), vec![vec![0, 1, 2, 3, 4, 5]]);

        // bond 2 is C1-O3, the acyl-oxygen bond
        assert_eq!(ester.bonds()[2].first, 1);
        assert_eq!(ester.bonds()[2].second, 3);
        assert_eq!(ester.fragments(&[2]), vec![vec![0, 1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn test_neighbors() {
        let isobutane = Molecule::from_smiles("CC(C)C").unwrap();
        let mut neighbors: Vec<_> = isobutane.neighbors(1).collect();
        neighbors.sort();
        assert_eq!(neighbors, vec![0, 2, 3]);
        assert_eq!(isobutane.neighbors(0).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_dump() {
        let molecule = Molecule::from_smiles("C=O").unwrap();
        let dump = molecule.to_string();
        assert!(dump.starts_with("MOLECULE OVERVIEW\n"));
        assert!(dump.contains("Number of atoms: 2\n"));
        assert!(dump.contains("Atom 1: O\n"));
        assert!(dump.contains("Bond 0: 0\t1\t2\n"));
    }
}
