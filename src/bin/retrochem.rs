use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use retrochem::*;
use tracing::*;

#[derive(Parser)]
#[command(
    name = "retrochem",
    about = "Parse SMILES and predict a single retrosynthetic step",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    options: Options,
}

#[derive(Subcommand)]
enum Command {
    /// Print the atoms and bonds parsed from a SMILES string
    #[command(visible_alias = "m")]
    Molecule { smiles: String },

    /// Print the degree, adjacency and Laplacian matrices and the Fiedler vector
    #[command(visible_alias = "g")]
    Graph { smiles: String },

    /// Split the molecule in two and list the bonds to cleave
    #[command(visible_alias = "r")]
    Retro { smiles: String },

    /// Print some example SMILES strings
    Examples,
}

#[derive(Args)]
struct Options {
    /// Reject unclosed ring labels and branches
    #[arg(long, global = true)]
    strict: bool,

    /// Read `:` and unmarked bonds between aromatic atoms as aromatic bonds
    #[arg(long, global = true)]
    aromatic_bonds: bool,

    /// Periodic table CSV (AtomicNumber,Symbol,Name,AtomicMass)
    #[arg(long, value_name = "FILE", global = true)]
    table: Option<PathBuf>,

    /// Eigenvalues at or below this magnitude count as zero
    #[arg(long, value_name = "TOL", default_value_t = 1e-9, global = true)]
    zero_tolerance: f64,

    /// Log level
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log: String,
}

impl Options {
    fn config(&self) -> Config {
        let ring_closures = if self.strict {
            RingClosurePolicy::Strict
        } else {
            RingClosurePolicy::Lenient
        };
        Config {
            parse: ParseOptions::default()
                .with_ring_closures(ring_closures)
                .with_aromatic_bonds(self.aromatic_bonds),
            spectral: SpectralOptions::default().with_zero_tolerance(self.zero_tolerance),
        }
    }
}

const EXAMPLES: [(&str, &str); 3] = [
    ("Acetic acid", "CC(=O)O"),
    ("Cyclohexane", "C1CCCCC1"),
    ("Decalin", "C1CC2CCCCC2CC1"),
];

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.options.log);
    let config = cli.options.config();

    let custom_table = match &cli.options.table {
        Some(path) => Some(
            PeriodicTable::from_path(path)
                .with_context(|| format!("Failed to load periodic table {}", path.display()))?,
        ),
        None => None,
    };
    let table = custom_table.as_ref().unwrap_or_else(|| PeriodicTable::builtin());

    match &cli.command {
        Command::Molecule { smiles } => {
            let molecule = Molecule::parse(smiles, table, config.parse)
                .with_context(|| format!("Failed to parse SMILES {smiles}"))?;
            print!("{molecule}");
        }
        Command::Graph { smiles } => {
            let molecule = Molecule::parse(smiles, table, config.parse)
                .with_context(|| format!("Failed to parse SMILES {smiles}"))?;
            let solver = SymmetricEigenSolver::from_options(&config.spectral);
            let graph = MoleculeGraph::with_solver(&molecule, &solver, &config.spectral)
                .with_context(|| format!("Failed to build the graph of {smiles}"))?;
            print!("{graph}");
        }
        Command::Retro { smiles } => {
            let step = retrosynthesize(smiles, table, &config)
                .with_context(|| format!("Failed to retrosynthesize {smiles}"))?;
            print!("{step}");
            for (i, fragment) in step.fragments().iter().enumerate() {
                println!("Fragment {}: {:?}", i, fragment);
            }
        }
        Command::Examples => {
            for (name, smiles) in EXAMPLES {
                println!("{name}:\t{smiles}");
            }
        }
    }
    info!("Done");
    Ok(())
}
