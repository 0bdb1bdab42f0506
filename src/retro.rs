use std::fmt::{Display, Formatter, Result as FmtResult};

use tracing::*;

use crate::{
    Bipartition, Config, Molecule, MoleculeGraph, PeriodicTable, Result, SmilesParser,
    SymmetricEigenSolver,
};

/// A single retrosynthetic step: the molecule, its spectral graph, the two
/// clusters, and the bonds between them.
#[derive(Debug, Clone)]
pub struct Retrosynthesis {
    pub molecule: Molecule,
    pub graph: MoleculeGraph,
    pub partition: Bipartition,
    pub cut_bonds: Vec<usize>,
}

/// Parse `smiles` and suggest one disconnection by spectral bipartition.
///
/// ```
/// use retrochem::{retrosynthesize, Config, PeriodicTable};
///
/// let step = retrosynthesize("CCCC", PeriodicTable::builtin(), &Config::default()).unwrap();
/// assert!(step.partition.same_partition(&retrochem::Bipartition::from_fiedler(&[1.0, 1.0, -1.0, -1.0])));
/// assert_eq!(step.cut_bonds, vec![1]);
/// ```
pub fn retrosynthesize(smiles: &str, table: &PeriodicTable, config: &Config) -> Result<Retrosynthesis> {
    let molecule = SmilesParser::new(smiles, table)
        .with_options(config.parse)
        .parse()?;
    let solver = SymmetricEigenSolver::from_options(&config.spectral);
    let graph = MoleculeGraph::with_solver(&molecule, &solver, &config.spectral)?;
    let partition = graph.bipartition();
    let cut_bonds = partition.cut_bonds(&molecule);
    info!(
        "{}: clusters of {} and {} atoms, {} bond(s) cut",
        smiles,
        partition.first().len(),
        partition.second().len(),
        cut_bonds.len()
    );
    Ok(Retrosynthesis {
        molecule,
        graph,
        partition,
        cut_bonds,
    })
}

impl Retrosynthesis {
    /// The atom groups left after breaking the cut bonds.
    pub fn fragments(&self) -> Vec<Vec<usize>> {
        self.molecule.fragments(&self.cut_bonds)
    }
}

impl Display for Retrosynthesis {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "{}", self.partition)?;
        for &i in &self.cut_bonds {
            let bond = self.molecule.bonds()[i];
            let atoms = self.molecule.atoms();
            writeln!(
                f,
                "Cleave bond {}: {} ({}) {} {} ({})",
                i,
                atoms[bond.first].element_symbol(),
                bond.first,
                bond.order.symbol(),
                atoms[bond.second].element_symbol(),
                bond.second
            )?;
        }
        Ok(())
    }
}
