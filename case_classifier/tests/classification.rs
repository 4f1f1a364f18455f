//! End-to-end scenarios: from algorithm text through simulation to a named
//! training case.

use case_classifier::{
    BufferedThreeCycleSet, CaseReverseEngineer, ConcreteCaseSet, ThreeCycleSet,
};
use puzzle_core::{
    Metric, Part, PartKind, letter_scheme::DEFAULT_LETTER_SCHEME, parse_algorithm,
    parse_commutator,
};

#[test]
fn setup_commutator_expands_to_the_classic_corner_cycle() {
    let commutator = parse_commutator("[R U R', D]").unwrap();
    let expanded = commutator.algorithm();
    assert_eq!(expanded, parse_algorithm("R U R' D R U' R' D'").unwrap());

    let mut engineer = CaseReverseEngineer::new(3, Some(PartKind::Corner)).unwrap();
    let case = engineer.find_case(&expanded).unwrap();
    assert_eq!(case.part_cycles().len(), 1);
    let cycle = &case.part_cycles()[0];
    assert_eq!((cycle.kind(), cycle.len(), cycle.twist()), (PartKind::Corner, 3, 0));

    let abstract_set = ThreeCycleSet::new(PartKind::Corner);
    assert!(abstract_set.matches(&case));
    assert_eq!(abstract_set.refinements_matching(&case).len(), 3);
}

#[test]
fn edge_three_cycle_set_names_the_m_u2_commutator() {
    let buffer = Part::parse(PartKind::Edge, "UF").unwrap();
    let set = ConcreteCaseSet::BufferedThreeCycle(BufferedThreeCycleSet::new(
        PartKind::Edge,
        buffer,
    ));
    assert_eq!(set.default_cube_size(), 3);

    let alg = parse_algorithm("M' U2 M U2").unwrap();
    let mut engineer =
        CaseReverseEngineer::new(set.default_cube_size(), Some(PartKind::Edge)).unwrap();
    let case = engineer.find_case(&alg).unwrap();

    assert!(set.matches(&case));
    let strict = set.create_strict_matching(&case).unwrap();
    assert!(set.strict_matches(&strict));

    // The name is the two non-buffer targets as letters of the scheme.
    let name = set.case_name(&strict, Some(&DEFAULT_LETTER_SCHEME)).unwrap();
    let letters: Vec<&str> = name.split(' ').collect();
    assert_eq!(letters.len(), 2, "{name}");
    for letter in letters {
        assert_eq!(letter.chars().count(), 1, "{name}");
        assert!(letter.chars().next().unwrap().is_ascii_lowercase());
    }
}

#[test]
fn verification_rejects_algorithms_for_other_cases() {
    let buffer = Part::parse(PartKind::Edge, "UF").unwrap();
    let set = ConcreteCaseSet::BufferedThreeCycle(BufferedThreeCycleSet::new(
        PartKind::Edge,
        buffer,
    ));
    // A corner algorithm does not produce an edge cycle case.
    let alg = parse_algorithm("R U R' D R U' R' D'").unwrap();
    let mut engineer = CaseReverseEngineer::new(3, None).unwrap();
    let case = engineer.find_case(&alg).unwrap();
    assert!(!set.matches(&case));
    assert!(set.create_strict_matching(&case).is_err());
    assert!(set.case_name(&case, None).is_err());
}

#[test]
fn cancellation_savings_between_neighboring_algorithms() {
    let first = parse_algorithm("R U").unwrap();
    let second = parse_algorithm("U' R'").unwrap();
    assert_eq!(first.cancellations(&second, 3, Metric::Htm).unwrap(), 4);

    let unrelated = parse_algorithm("F D").unwrap();
    assert_eq!(first.cancellations(&unrelated, 3, Metric::Htm).unwrap(), 0);

    // R U + U R' merges into R U2 R': one move saved in HTM, none in QTM.
    let left = parse_algorithm("R U").unwrap();
    let right = parse_algorithm("U R'").unwrap();
    assert_eq!(left.cancellations(&right, 3, Metric::Htm).unwrap(), 1);
    assert_eq!(left.cancellations(&right, 3, Metric::Qtm).unwrap(), 0);
}

#[test]
fn catalog_classifies_reverse_engineered_cases() {
    let mut engineer = CaseReverseEngineer::new(3, Some(PartKind::Corner)).unwrap();
    let case = engineer
        .find_case(&parse_algorithm("R U R' D R U' R' D'").unwrap())
        .unwrap();
    let matching: Vec<_> = case_classifier::CASE_SETS
        .iter()
        .filter(|set| set.matches(&case))
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].to_string(), "corner 3-cycles");
}
