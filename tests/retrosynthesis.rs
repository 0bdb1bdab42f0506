use retrochem::*;

fn step(smiles: &str) -> Retrosynthesis {
    init_logging("warn");
    retrosynthesize(smiles, PeriodicTable::builtin(), &Config::default())
        .unwrap_or_else(|e| panic!("Failed to retrosynthesize {smiles}: {e}"))
}

#[test]
fn test_partition_covers_every_atom_once() {
    for smiles in ["CC(=O)O", "C1CCCCC1", "CCOC(=O)CC(=O)OCC", "C1CC2CCCCC2CC1", "O=C(OCC)c1ccccc1"] {
        let step = step(smiles);
        let mut atoms: Vec<usize> = step
            .partition
            .first()
            .iter()
            .chain(step.partition.second())
            .copied()
            .collect();
        atoms.sort();
        assert_eq!(atoms, (0..step.molecule.len()).collect::<Vec<_>>(), "{smiles}");
        assert!(!step.cut_bonds.is_empty(), "{smiles}");
    }
}

#[test]
fn test_bipartition_is_deterministic() {
    let molecule = parse_smiles("CCOC(=O)CC(=O)OCC").unwrap();
    let first = MoleculeGraph::new(&molecule).unwrap().bipartition();
    for _ in 0..5 {
        let again = MoleculeGraph::new(&molecule).unwrap().bipartition();
        assert!(first.same_partition(&again));
    }
}

#[test]
fn test_symmetric_chain_splits_in_half() {
    // hexane: the Fiedler vector of a path splits it at the middle bond
    let step = step("CCCCCC");
    assert!(step
        .partition
        .same_partition(&Bipartition::from_fiedler(&[1.0, 1.0, 1.0, -1.0, -1.0, -1.0])));
    assert_eq!(step.cut_bonds, vec![2]);
    assert_eq!(step.fragments(), vec![vec![0, 1, 2], vec![3, 4, 5]]);
}

#[test]
fn test_bicyclic_splits_between_rings() {
    // biphenyl-like: two cyclohexane rings joined by one bond
    let step = step("C1CCCCC1C2CCCCC2");
    assert_eq!(step.cut_bonds.len(), 1);
    let bond = step.molecule.bonds()[step.cut_bonds[0]];
    assert!(bond.connects(5, 6));
    assert_eq!(
        step.fragments(),
        vec![(0..6).collect::<Vec<_>>(), (6..12).collect::<Vec<_>>()]
    );
}

#[test]
fn test_errors_surface_through_the_pipeline() {
    let table = PeriodicTable::builtin();
    let config = Config::default();

    match retrosynthesize("CC)C", table, &config) {
        Err(Error::MalformedSmiles(e)) => assert_eq!(e.position, 2),
        other => panic!("expected a malformed SMILES error, got {other:?}"),
    }
    match retrosynthesize("C", table, &config) {
        Err(Error::Graph(GraphError::DegenerateGraph { atoms: 1, .. })) => {}
        other => panic!("expected a degenerate graph error, got {other:?}"),
    }
    match retrosynthesize("CC.CC", table, &config) {
        Err(Error::Graph(GraphError::DegenerateGraph {
            reason: Degeneracy::Disconnected { components: 2 },
            ..
        })) => {}
        other => panic!("expected a disconnected graph error, got {other:?}"),
    }
}

#[test]
fn test_strict_configuration() {
    let config = Config {
        parse: ParseOptions::strict(),
        ..Default::default()
    };
    let result = retrosynthesize("C1CCCCC", PeriodicTable::builtin(), &config);
    assert!(matches!(
        result,
        Err(Error::MalformedSmiles(SmilesError {
            kind: SmilesErrorKind::UnclosedRing(1),
            ..
        }))
    ));
}

#[test]
fn test_synthetic_table() {
    let table = PeriodicTable::from_symbols(["C", "O"]);
    let step = retrosynthesize("CCOCC", &table, &Config::default()).unwrap();
    assert_eq!(step.molecule.len(), 5);
    assert!(matches!(
        retrosynthesize("CCN", &table, &Config::default()),
        Err(Error::MalformedSmiles(_))
    ));
}

#[test]
fn test_dumps() {
    let step = step("CC(=O)O");
    let molecule = step.molecule.to_string();
    assert!(molecule.contains("Number of bonds: 3"));
    let graph = step.graph.to_string();
    assert!(graph.contains("FIEDLER VECTOR:"));
    let summary = step.to_string();
    assert!(summary.starts_with("First cluster: "));
    assert!(summary.contains("Cleave bond"));
}
