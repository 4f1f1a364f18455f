use std::fmt;

use itertools::Itertools;
use puzzle_core::{Part, PartCycle, PartKind, SerializationError, letter_scheme::LetterScheme};

use crate::{
    case::Case,
    case_sets::{PatternArityError, arity_error, kind_lowercase, name_part, parse_kind_token},
    pattern::{CasePattern, TwistPattern, case_pattern, cycle_pattern, specific, wildcard},
};

fn twist_name(part_kind: PartKind) -> &'static str {
    match part_kind {
        PartKind::Edge | PartKind::Midge => "flip",
        _ => "twist",
    }
}

fn inverse_twist(part_kind: PartKind, twist: u8) -> u8 {
    (part_kind.rotation_order() - twist) % part_kind.rotation_order()
}

fn two_twist_pattern(part_kind: PartKind) -> CasePattern {
    case_pattern(vec![
        cycle_pattern(part_kind, vec![wildcard()], TwistPattern::Specific(1)),
        cycle_pattern(
            part_kind,
            vec![wildcard()],
            TwistPattern::Specific(inverse_twist(part_kind, 1)),
        ),
    ])
}

/// Two pieces of one kind twisted in place in opposite directions, with no
/// fixed buffer ("floating").
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FloatingTwoTwistSet {
    part_kind: PartKind,
}

impl FloatingTwoTwistSet {
    #[must_use]
    pub fn new(part_kind: PartKind) -> FloatingTwoTwistSet {
        FloatingTwoTwistSet { part_kind }
    }

    #[must_use]
    pub fn part_kind(&self) -> PartKind {
        self.part_kind
    }

    #[must_use]
    pub fn pattern(&self) -> CasePattern {
        two_twist_pattern(self.part_kind)
    }

    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        self.pattern().matches(case)
    }

    /// Floating twists have no buffer, so there is exactly one refinement.
    #[must_use]
    pub fn all_refinements(&self) -> Vec<ConcreteFloatingTwoTwistSet> {
        vec![ConcreteFloatingTwoTwistSet::new(self.part_kind)]
    }

    #[must_use]
    pub fn refinements_matching(&self, case: &Case) -> Vec<ConcreteFloatingTwoTwistSet> {
        if self.matches(case) {
            self.all_refinements()
        } else {
            Vec::new()
        }
    }
}

impl fmt::Display for FloatingTwoTwistSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "floating {} {}s",
            kind_lowercase(self.part_kind),
            twist_name(self.part_kind)
        )
    }
}

/// The trainable floating two-twist set; identical shape to the abstract
/// set, since no buffer choice is involved.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ConcreteFloatingTwoTwistSet {
    part_kind: PartKind,
}

impl ConcreteFloatingTwoTwistSet {
    #[must_use]
    pub fn new(part_kind: PartKind) -> ConcreteFloatingTwoTwistSet {
        ConcreteFloatingTwoTwistSet { part_kind }
    }

    #[must_use]
    pub fn part_kind(&self) -> PartKind {
        self.part_kind
    }

    #[must_use]
    pub fn pattern(&self) -> CasePattern {
        two_twist_pattern(self.part_kind)
    }

    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        self.pattern().matches(case)
    }

    #[must_use]
    pub fn strict_matches(&self, case: &Case) -> bool {
        self.matches(case)
    }

    pub fn create_strict_matching(&self, case: &Case) -> Result<Case, PatternArityError> {
        if !self.matches(case) {
            return Err(arity_error(self, case));
        }
        Ok(case.clone())
    }

    pub fn case_name(
        &self,
        case: &Case,
        letter_scheme: Option<&LetterScheme>,
    ) -> Result<String, PatternArityError> {
        if !self.matches(case) {
            return Err(arity_error(self, case));
        }
        Ok(case
            .part_cycles()
            .iter()
            .map(|cycle| name_part(letter_scheme, &cycle.parts()[0]))
            .join(" "))
    }

    pub fn row_pattern(
        &self,
        refinement_index: usize,
        case: &Case,
    ) -> Result<CasePattern, PatternArityError> {
        if refinement_index > 1 || !self.matches(case) {
            return Err(arity_error(self, case));
        }
        let desired_twist = if refinement_index == 0 {
            1
        } else {
            inverse_twist(self.part_kind, 1)
        };
        let part = case
            .part_cycles()
            .iter()
            .find(|cycle| cycle.len() == 1 && cycle.twist() == desired_twist)
            .map(|cycle| cycle.parts()[0].clone())
            .ok_or_else(|| arity_error(self, case))?;
        Ok(case_pattern(vec![
            cycle_pattern(
                self.part_kind,
                vec![specific(part)],
                TwistPattern::Specific(desired_twist),
            ),
            cycle_pattern(
                self.part_kind,
                vec![wildcard()],
                TwistPattern::Specific(inverse_twist(self.part_kind, desired_twist)),
            ),
        ]))
    }

    #[must_use]
    pub fn default_cube_size(&self) -> u32 {
        self.part_kind.min_cube_size().max(3)
    }

    /// Every distinct twist pair. For kinds with only one nonzero twist
    /// (flips), unordered pairs; otherwise the twist directions make the
    /// pair ordered.
    #[must_use]
    pub fn cases(&self) -> Vec<Case> {
        let elements: Vec<&Part> = self
            .part_kind
            .elements()
            .iter()
            .filter(|part| part.is_canonical())
            .collect();
        let untwist = inverse_twist(self.part_kind, 1);
        let pairs: Vec<(&Part, &Part)> = if untwist == 1 {
            elements.iter().copied().tuple_combinations().collect()
        } else {
            elements
                .iter()
                .copied()
                .permutations(2)
                .map(|pair| (pair[0], pair[1]))
                .collect()
        };
        pairs
            .into_iter()
            .map(|(first, second)| {
                Case::try_new(vec![
                    PartCycle::try_new(vec![first.clone()], 1).expect("a twist cycle is valid"),
                    PartCycle::try_new(vec![second.clone()], untwist)
                        .expect("a twist cycle is valid"),
                ])
                .expect("distinct pieces give disjoint cycles")
            })
            .collect()
    }

    pub(crate) fn raw_data_parts(&self) -> Vec<String> {
        vec![self.part_kind.name().to_owned()]
    }

    pub(crate) fn from_raw_data_parts(
        parts: &[&str],
    ) -> Result<ConcreteFloatingTwoTwistSet, SerializationError> {
        let [kind_token] = parts else {
            return Err(SerializationError::Malformed {
                data: parts.join(":"),
            });
        };
        Ok(ConcreteFloatingTwoTwistSet::new(parse_kind_token(
            kind_token,
        )?))
    }
}

impl fmt::Display for ConcreteFloatingTwoTwistSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "floating {} {}s",
            kind_lowercase(self.part_kind),
            twist_name(self.part_kind)
        )
    }
}
