use std::{fmt, ops::BitOr};

use fxhash::FxHashMap;
use itertools::Itertools;

use puzzle_core::{Part, PartCycle, PartKind};

use crate::case::Case;

/// A constraint on one slot of a part cycle.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PartPattern {
    Wildcard,
    Specific(Part),
}

impl PartPattern {
    fn matches(&self, part: &Part) -> bool {
        match self {
            PartPattern::Wildcard => true,
            PartPattern::Specific(expected) => expected == part,
        }
    }

    fn rotated_by(&self, number: u8) -> PartPattern {
        match self {
            PartPattern::Wildcard => PartPattern::Wildcard,
            PartPattern::Specific(part) => PartPattern::Specific(part.rotated_by(number)),
        }
    }

    fn specific_part(&self) -> Option<&Part> {
        match self {
            PartPattern::Wildcard => None,
            PartPattern::Specific(part) => Some(part),
        }
    }
}

impl fmt::Display for PartPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartPattern::Wildcard => f.write_str("*"),
            PartPattern::Specific(part) => write!(f, "{part}"),
        }
    }
}

/// A constraint on the twist of a part cycle.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TwistPattern {
    Specific(u8),
    AnyUnsolved,
}

impl TwistPattern {
    fn matches(&self, twist: u8) -> bool {
        match self {
            TwistPattern::Specific(expected) => *expected == twist,
            TwistPattern::AnyUnsolved => twist > 0,
        }
    }
}

impl fmt::Display for TwistPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TwistPattern::Specific(twist) => write!(f, "{twist}"),
            TwistPattern::AnyUnsolved => f.write_str("any unsolved"),
        }
    }
}

/// Matches part cycles of one kind, length and twist shape. Specific part
/// constraints are satisfied by any start point or orientation relabeling
/// of the cycle.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PartCyclePattern {
    part_kind: PartKind,
    part_patterns: Vec<PartPattern>,
    twist: TwistPattern,
}

impl PartCyclePattern {
    #[must_use]
    pub fn new(
        part_kind: PartKind,
        part_patterns: Vec<PartPattern>,
        twist: TwistPattern,
    ) -> PartCyclePattern {
        PartCyclePattern {
            part_kind,
            part_patterns,
            twist,
        }
    }

    #[must_use]
    pub fn part_kind(&self) -> PartKind {
        self.part_kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.part_patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.part_patterns.is_empty()
    }

    /// All spellings of the pattern that describe the same cycle shape:
    /// every cyclic shift, and, when a specific part is pinned, every
    /// uniform orientation relabeling.
    fn rotations(&self) -> Vec<Vec<PartPattern>> {
        let cyclic_shifts: Vec<Vec<PartPattern>> = (0..self.part_patterns.len())
            .map(|shift| {
                let mut patterns = self.part_patterns.clone();
                patterns.rotate_left(shift);
                patterns
            })
            .collect();
        if !self
            .part_patterns
            .iter()
            .any(|pattern| pattern.specific_part().is_some())
        {
            return cyclic_shifts;
        }
        (0..self.part_kind.rotation_order())
            .flat_map(|rotation| {
                cyclic_shifts.iter().map(move |shift| {
                    shift
                        .iter()
                        .map(|pattern| pattern.rotated_by(rotation))
                        .collect()
                })
            })
            .collect()
    }

    #[must_use]
    pub fn matches(&self, cycle: &PartCycle) -> bool {
        cycle.kind() == self.part_kind
            && cycle.len() == self.part_patterns.len()
            && self.twist.matches(cycle.twist())
            && self.rotations().iter().any(|patterns| {
                patterns
                    .iter()
                    .zip(cycle.parts())
                    .all(|(pattern, part)| pattern.matches(part))
            })
    }
}

impl fmt::Display for PartCyclePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}([{}], {})",
            self.part_kind,
            self.part_patterns.iter().join(", "),
            self.twist
        )
    }
}

/// A pattern whose cycle constraints must be matched one-to-one by the
/// case's cycles.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LeafCasePattern {
    cycle_patterns: Vec<PartCyclePattern>,
    ignore_same_face_center_cycles: bool,
}

impl LeafCasePattern {
    #[must_use]
    pub fn new(
        cycle_patterns: Vec<PartCyclePattern>,
        ignore_same_face_center_cycles: bool,
    ) -> LeafCasePattern {
        LeafCasePattern {
            cycle_patterns,
            ignore_same_face_center_cycles,
        }
    }

    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        let case = case.canonicalize(self.ignore_same_face_center_cycles);
        if case.part_cycles().len() != self.cycle_patterns.len() {
            return false;
        }
        let mut cycle_groups: FxHashMap<(PartKind, usize), Vec<&PartCycle>> = FxHashMap::default();
        for cycle in case.part_cycles() {
            cycle_groups
                .entry((cycle.kind(), cycle.len()))
                .or_default()
                .push(cycle);
        }
        let mut pattern_groups: FxHashMap<(PartKind, usize), Vec<&PartCyclePattern>> =
            FxHashMap::default();
        for pattern in &self.cycle_patterns {
            pattern_groups
                .entry((pattern.part_kind(), pattern.len()))
                .or_default()
                .push(pattern);
        }
        if cycle_groups.len() != pattern_groups.len() {
            return false;
        }
        pattern_groups.iter().all(|(key, patterns)| {
            cycle_groups.get(key).is_some_and(|cycles| {
                patterns.len() == cycles.len()
                    && patterns.iter().permutations(patterns.len()).any(|ordered| {
                        ordered
                            .iter()
                            .zip(cycles.iter())
                            .all(|(pattern, cycle)| pattern.matches(cycle))
                    })
            })
        })
    }
}

impl fmt::Display for LeafCasePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.cycle_patterns.iter().join(", "))
    }
}

/// A predicate over cases: a leaf shape or a union of alternatives.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CasePattern {
    Leaf(LeafCasePattern),
    Union(Box<CasePattern>, Box<CasePattern>),
}

impl CasePattern {
    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        match self {
            CasePattern::Leaf(leaf) => leaf.matches(case),
            CasePattern::Union(left, right) => left.matches(case) || right.matches(case),
        }
    }
}

impl BitOr for CasePattern {
    type Output = CasePattern;

    fn bitor(self, rhs: CasePattern) -> CasePattern {
        CasePattern::Union(Box::new(self), Box::new(rhs))
    }
}

impl fmt::Display for CasePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CasePattern::Leaf(leaf) => write!(f, "{leaf}"),
            CasePattern::Union(left, right) => write!(f, "({left}) | ({right})"),
        }
    }
}

/// Shorthand constructors for building patterns the way the case sets do.
#[must_use]
pub fn wildcard() -> PartPattern {
    PartPattern::Wildcard
}

#[must_use]
pub fn specific(part: Part) -> PartPattern {
    PartPattern::Specific(part)
}

#[must_use]
pub fn solved_twist() -> TwistPattern {
    TwistPattern::Specific(0)
}

#[must_use]
pub fn cycle_pattern(
    part_kind: PartKind,
    part_patterns: Vec<PartPattern>,
    twist: TwistPattern,
) -> PartCyclePattern {
    PartCyclePattern::new(part_kind, part_patterns, twist)
}

/// A leaf pattern over the given cycle patterns; same-face center cycles
/// are always treated as filler.
#[must_use]
pub fn case_pattern(cycle_patterns: Vec<PartCyclePattern>) -> CasePattern {
    CasePattern::Leaf(LeafCasePattern::new(cycle_patterns, true))
}

#[cfg(test)]
mod tests {
    use super::{TwistPattern, case_pattern, cycle_pattern, specific, solved_twist, wildcard};
    use crate::case::Case;
    use puzzle_core::{Part, PartCycle, PartKind};

    fn part(kind: PartKind, name: &str) -> Part {
        Part::parse(kind, name).unwrap()
    }

    fn case_of(kind: PartKind, cycles: &[(&[&str], u8)]) -> Case {
        let cycles = cycles
            .iter()
            .map(|(names, twist)| {
                let parts = names.iter().map(|name| part(kind, name)).collect();
                PartCycle::try_new(parts, *twist).unwrap()
            })
            .collect();
        Case::try_new(cycles).unwrap()
    }

    #[test]
    fn buffer_pattern_matches_any_rotation_of_the_cycle() {
        let pattern = case_pattern(vec![cycle_pattern(
            PartKind::Corner,
            vec![
                specific(part(PartKind::Corner, "UFL")),
                wildcard(),
                wildcard(),
            ],
            solved_twist(),
        )]);
        // The buffer appears in the middle, in a rotated labeling.
        let matching = case_of(PartKind::Corner, &[(&["URF", "FLU", "DBL"], 0)]);
        assert!(pattern.matches(&matching));

        let two_cycle = case_of(PartKind::Corner, &[(&["UFL", "URF"], 0)]);
        assert!(!pattern.matches(&two_cycle));

        let without_buffer = case_of(PartKind::Corner, &[(&["URF", "ULB", "DBL"], 0)]);
        assert!(!pattern.matches(&without_buffer));
    }

    #[test]
    fn twist_constraints() {
        let twisted = case_of(PartKind::Corner, &[(&["URF"], 1), (&["ULB"], 2)]);
        let pattern = case_pattern(vec![
            cycle_pattern(
                PartKind::Corner,
                vec![wildcard()],
                TwistPattern::Specific(1),
            ),
            cycle_pattern(
                PartKind::Corner,
                vec![wildcard()],
                TwistPattern::Specific(2),
            ),
        ]);
        assert!(pattern.matches(&twisted));

        let any_unsolved = case_pattern(vec![
            cycle_pattern(PartKind::Corner, vec![wildcard()], TwistPattern::AnyUnsolved),
            cycle_pattern(PartKind::Corner, vec![wildcard()], TwistPattern::AnyUnsolved),
        ]);
        assert!(any_unsolved.matches(&twisted));

        let solved_only = case_pattern(vec![
            cycle_pattern(PartKind::Corner, vec![wildcard()], solved_twist()),
            cycle_pattern(PartKind::Corner, vec![wildcard()], solved_twist()),
        ]);
        assert!(!solved_only.matches(&twisted));
    }

    #[test]
    fn union_matches_either_side() {
        let edges = case_of(PartKind::Edge, &[(&["UF", "UB", "DF"], 0)]);
        let edge_pattern = case_pattern(vec![cycle_pattern(
            PartKind::Edge,
            vec![wildcard(), wildcard(), wildcard()],
            solved_twist(),
        )]);
        let corner_pattern = case_pattern(vec![cycle_pattern(
            PartKind::Corner,
            vec![wildcard(), wildcard(), wildcard()],
            solved_twist(),
        )]);
        assert!((corner_pattern.clone() | edge_pattern.clone()).matches(&edges));
        assert!(!(corner_pattern.clone() | corner_pattern).matches(&edges));
    }

    #[test]
    fn bijection_respects_shapes() {
        // One 3-cycle and one 2-cycle: the patterns must pair up by length.
        let mixed = case_of(
            PartKind::Edge,
            &[(&["UF", "UB", "DF"], 0), (&["UR", "UL"], 0)],
        );
        let pattern = case_pattern(vec![
            cycle_pattern(
                PartKind::Edge,
                vec![
                    specific(part(PartKind::Edge, "UR")),
                    wildcard(),
                ],
                solved_twist(),
            ),
            cycle_pattern(
                PartKind::Edge,
                vec![wildcard(), wildcard(), wildcard()],
                solved_twist(),
            ),
        ]);
        assert!(pattern.matches(&mixed));
    }
}
