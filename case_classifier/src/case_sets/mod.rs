//! The catalog of named, pattern-defined training case sets.
//!
//! The set kinds are a closed catalog, so both levels of the hierarchy are
//! enums dispatched exhaustively rather than open-ended class families.

mod floating_two_twist;
mod parity;
mod parity_twist;
mod three_cycle;
mod three_twist;

use std::{fmt, sync::LazyLock};

use thiserror::Error;

use puzzle_core::{Part, PartKind, SerializationError, letter_scheme::LetterScheme};

use crate::{case::Case, pattern::CasePattern};

pub use floating_two_twist::{ConcreteFloatingTwoTwistSet, FloatingTwoTwistSet};
pub use parity::{BufferedParitySet, ParitySet};
pub use parity_twist::{BufferedParityTwistSet, ParityTwistSet};
pub use three_cycle::{BufferedThreeCycleSet, ThreeCycleSet};
pub use three_twist::{BufferedThreeTwistSet, ThreeTwistSet};

/// A shape-specific operation was called on a case of a different shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("the case {case} does not have the shape {set} requires")]
pub struct PatternArityError {
    pub set: String,
    pub case: String,
}

pub(crate) fn arity_error(set: &impl fmt::Display, case: &Case) -> PatternArityError {
    PatternArityError {
        set: set.to_string(),
        case: case.to_string(),
    }
}

pub(crate) fn kind_lowercase(kind: PartKind) -> String {
    kind.name().to_lowercase()
}

pub(crate) fn name_part(letter_scheme: Option<&LetterScheme>, part: &Part) -> String {
    letter_scheme.map_or_else(|| part.to_string(), |scheme| scheme.letter_or_name(part))
}

pub(crate) fn parse_kind_token(token: &str) -> Result<PartKind, SerializationError> {
    PartKind::parse_name(token).ok_or_else(|| SerializationError::UnknownTag {
        tag: token.to_owned(),
    })
}

pub(crate) fn parse_part_token(kind: PartKind, token: &str) -> Result<Part, SerializationError> {
    Ok(Part::parse(kind, token)?)
}

/// A buffer-agnostic case set, e.g. "all edge 3-cycles".
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AbstractCaseSet {
    ThreeCycle(ThreeCycleSet),
    FloatingTwoTwist(FloatingTwoTwistSet),
    ThreeTwist(ThreeTwistSet),
    Parity(ParitySet),
    ParityTwist(ParityTwistSet),
}

impl AbstractCaseSet {
    #[must_use]
    pub fn pattern(&self) -> CasePattern {
        match self {
            AbstractCaseSet::ThreeCycle(set) => set.pattern(),
            AbstractCaseSet::FloatingTwoTwist(set) => set.pattern(),
            AbstractCaseSet::ThreeTwist(set) => set.pattern(),
            AbstractCaseSet::Parity(set) => set.pattern(),
            AbstractCaseSet::ParityTwist(set) => set.pattern(),
        }
    }

    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        self.pattern().matches(case)
    }

    /// Every concrete set this abstract set refines into.
    #[must_use]
    pub fn all_refinements(&self) -> Vec<ConcreteCaseSet> {
        match self {
            AbstractCaseSet::ThreeCycle(set) => set
                .all_refinements()
                .into_iter()
                .map(ConcreteCaseSet::BufferedThreeCycle)
                .collect(),
            AbstractCaseSet::FloatingTwoTwist(set) => set
                .all_refinements()
                .into_iter()
                .map(ConcreteCaseSet::FloatingTwoTwist)
                .collect(),
            AbstractCaseSet::ThreeTwist(set) => set
                .all_refinements()
                .into_iter()
                .map(ConcreteCaseSet::BufferedThreeTwist)
                .collect(),
            AbstractCaseSet::Parity(set) => set
                .all_refinements()
                .into_iter()
                .map(ConcreteCaseSet::BufferedParity)
                .collect(),
            AbstractCaseSet::ParityTwist(set) => set
                .all_refinements()
                .into_iter()
                .map(ConcreteCaseSet::BufferedParityTwist)
                .collect(),
        }
    }

    /// The concrete sets a matching case could be assigned to, one per
    /// valid anchor piece. Multiple results mean the case genuinely has
    /// several valid anchors; their order is unspecified.
    #[must_use]
    pub fn refinements_matching(&self, case: &Case) -> Vec<ConcreteCaseSet> {
        match self {
            AbstractCaseSet::ThreeCycle(set) => set
                .refinements_matching(case)
                .into_iter()
                .map(ConcreteCaseSet::BufferedThreeCycle)
                .collect(),
            AbstractCaseSet::FloatingTwoTwist(set) => set
                .refinements_matching(case)
                .into_iter()
                .map(ConcreteCaseSet::FloatingTwoTwist)
                .collect(),
            AbstractCaseSet::ThreeTwist(set) => set
                .refinements_matching(case)
                .into_iter()
                .map(ConcreteCaseSet::BufferedThreeTwist)
                .collect(),
            AbstractCaseSet::Parity(set) => set
                .refinements_matching(case)
                .into_iter()
                .map(ConcreteCaseSet::BufferedParity)
                .collect(),
            AbstractCaseSet::ParityTwist(set) => set
                .refinements_matching(case)
                .into_iter()
                .map(ConcreteCaseSet::BufferedParityTwist)
                .collect(),
        }
    }
}

impl fmt::Display for AbstractCaseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractCaseSet::ThreeCycle(set) => write!(f, "{set}"),
            AbstractCaseSet::FloatingTwoTwist(set) => write!(f, "{set}"),
            AbstractCaseSet::ThreeTwist(set) => write!(f, "{set}"),
            AbstractCaseSet::Parity(set) => write!(f, "{set}"),
            AbstractCaseSet::ParityTwist(set) => write!(f, "{set}"),
        }
    }
}

/// A trainable case set anchored to a concrete buffer (where the kind has
/// one), e.g. "edge 3-cycles for buffer UF".
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConcreteCaseSet {
    BufferedThreeCycle(BufferedThreeCycleSet),
    FloatingTwoTwist(ConcreteFloatingTwoTwistSet),
    BufferedThreeTwist(BufferedThreeTwistSet),
    BufferedParity(BufferedParitySet),
    BufferedParityTwist(BufferedParityTwistSet),
}

const SEPARATOR: char = ':';

/// The serialization tag of each concrete set kind. The table is the single
/// source of truth for both directions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ConcreteCaseSetTag {
    BufferedThreeCycle,
    FloatingTwoTwist,
    BufferedThreeTwist,
    BufferedParity,
    BufferedParityTwist,
}

static CONCRETE_CASE_SET_TAGS: phf::Map<&'static str, ConcreteCaseSetTag> = phf::phf_map! {
    "BufferedThreeCycleSet" => ConcreteCaseSetTag::BufferedThreeCycle,
    "ConcreteFloatingTwoTwistSet" => ConcreteCaseSetTag::FloatingTwoTwist,
    "BufferedThreeTwistSet" => ConcreteCaseSetTag::BufferedThreeTwist,
    "BufferedParitySet" => ConcreteCaseSetTag::BufferedParity,
    "BufferedParityTwistSet" => ConcreteCaseSetTag::BufferedParityTwist,
};

impl ConcreteCaseSetTag {
    fn name(self) -> &'static str {
        match self {
            ConcreteCaseSetTag::BufferedThreeCycle => "BufferedThreeCycleSet",
            ConcreteCaseSetTag::FloatingTwoTwist => "ConcreteFloatingTwoTwistSet",
            ConcreteCaseSetTag::BufferedThreeTwist => "BufferedThreeTwistSet",
            ConcreteCaseSetTag::BufferedParity => "BufferedParitySet",
            ConcreteCaseSetTag::BufferedParityTwist => "BufferedParityTwistSet",
        }
    }
}

impl ConcreteCaseSet {
    #[must_use]
    pub fn pattern(&self) -> CasePattern {
        match self {
            ConcreteCaseSet::BufferedThreeCycle(set) => set.pattern(),
            ConcreteCaseSet::FloatingTwoTwist(set) => set.pattern(),
            ConcreteCaseSet::BufferedThreeTwist(set) => set.pattern(),
            ConcreteCaseSet::BufferedParity(set) => set.pattern(),
            ConcreteCaseSet::BufferedParityTwist(set) => set.pattern(),
        }
    }

    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        self.pattern().matches(case)
    }

    /// The buffer piece the set is anchored to; floating sets have none.
    #[must_use]
    pub fn buffer(&self) -> Option<&Part> {
        match self {
            ConcreteCaseSet::BufferedThreeCycle(set) => Some(set.buffer()),
            ConcreteCaseSet::FloatingTwoTwist(_) => None,
            ConcreteCaseSet::BufferedThreeTwist(set) => Some(set.buffer()),
            ConcreteCaseSet::BufferedParity(set) => Some(set.buffer()),
            ConcreteCaseSet::BufferedParityTwist(set) => Some(set.buffer()),
        }
    }

    /// Like [`ConcreteCaseSet::matches`], but only for cases spelled from
    /// this set's anchor.
    #[must_use]
    pub fn strict_matches(&self, case: &Case) -> bool {
        match self {
            ConcreteCaseSet::BufferedThreeCycle(set) => set.strict_matches(case),
            ConcreteCaseSet::FloatingTwoTwist(set) => set.strict_matches(case),
            ConcreteCaseSet::BufferedThreeTwist(set) => set.strict_matches(case),
            ConcreteCaseSet::BufferedParity(set) => set.strict_matches(case),
            ConcreteCaseSet::BufferedParityTwist(set) => set.strict_matches(case),
        }
    }

    /// Rewrites an equivalent, loosely-matching case into the one spelling
    /// this set expects.
    pub fn create_strict_matching(&self, case: &Case) -> Result<Case, PatternArityError> {
        match self {
            ConcreteCaseSet::BufferedThreeCycle(set) => set.create_strict_matching(case),
            ConcreteCaseSet::FloatingTwoTwist(set) => set.create_strict_matching(case),
            ConcreteCaseSet::BufferedThreeTwist(set) => set.create_strict_matching(case),
            ConcreteCaseSet::BufferedParity(set) => set.create_strict_matching(case),
            ConcreteCaseSet::BufferedParityTwist(set) => set.create_strict_matching(case),
        }
    }

    /// The human-readable label of a case within this set, through the
    /// letter scheme when one is given.
    pub fn case_name(
        &self,
        case: &Case,
        letter_scheme: Option<&LetterScheme>,
    ) -> Result<String, PatternArityError> {
        match self {
            ConcreteCaseSet::BufferedThreeCycle(set) => set.case_name(case, letter_scheme),
            ConcreteCaseSet::FloatingTwoTwist(set) => set.case_name(case, letter_scheme),
            ConcreteCaseSet::BufferedThreeTwist(set) => set.case_name(case, letter_scheme),
            ConcreteCaseSet::BufferedParity(set) => set.case_name(case, letter_scheme),
            ConcreteCaseSet::BufferedParityTwist(set) => set.case_name(case, letter_scheme),
        }
    }

    /// The pattern of the spreadsheet row (refinement 0) or column
    /// (refinement 1) a case belongs to.
    pub fn row_pattern(
        &self,
        refinement_index: usize,
        case: &Case,
    ) -> Result<CasePattern, PatternArityError> {
        match self {
            ConcreteCaseSet::BufferedThreeCycle(set) => set.row_pattern(refinement_index, case),
            ConcreteCaseSet::FloatingTwoTwist(set) => set.row_pattern(refinement_index, case),
            ConcreteCaseSet::BufferedThreeTwist(set) => set.row_pattern(refinement_index, case),
            ConcreteCaseSet::BufferedParity(set) => set.row_pattern(refinement_index, case),
            ConcreteCaseSet::BufferedParityTwist(set) => set.row_pattern(refinement_index, case),
        }
    }

    /// The cube size this set is usually trained on.
    #[must_use]
    pub fn default_cube_size(&self) -> u32 {
        match self {
            ConcreteCaseSet::BufferedThreeCycle(set) => set.default_cube_size(),
            ConcreteCaseSet::FloatingTwoTwist(set) => set.default_cube_size(),
            ConcreteCaseSet::BufferedThreeTwist(set) => set.default_cube_size(),
            ConcreteCaseSet::BufferedParity(set) => set.default_cube_size(),
            ConcreteCaseSet::BufferedParityTwist(set) => set.default_cube_size(),
        }
    }

    /// Enumerates every distinct case the set represents.
    #[must_use]
    pub fn cases(&self) -> Vec<Case> {
        match self {
            ConcreteCaseSet::BufferedThreeCycle(set) => set.cases(),
            ConcreteCaseSet::FloatingTwoTwist(set) => set.cases(),
            ConcreteCaseSet::BufferedThreeTwist(set) => set.cases(),
            ConcreteCaseSet::BufferedParity(set) => set.cases(),
            ConcreteCaseSet::BufferedParityTwist(set) => set.cases(),
        }
    }

    fn tag(&self) -> ConcreteCaseSetTag {
        match self {
            ConcreteCaseSet::BufferedThreeCycle(_) => ConcreteCaseSetTag::BufferedThreeCycle,
            ConcreteCaseSet::FloatingTwoTwist(_) => ConcreteCaseSetTag::FloatingTwoTwist,
            ConcreteCaseSet::BufferedThreeTwist(_) => ConcreteCaseSetTag::BufferedThreeTwist,
            ConcreteCaseSet::BufferedParity(_) => ConcreteCaseSetTag::BufferedParity,
            ConcreteCaseSet::BufferedParityTwist(_) => ConcreteCaseSetTag::BufferedParityTwist,
        }
    }

    /// Serializes the set as `Tag:param:…`.
    #[must_use]
    pub fn to_raw_data(&self) -> String {
        let parts = match self {
            ConcreteCaseSet::BufferedThreeCycle(set) => set.raw_data_parts(),
            ConcreteCaseSet::FloatingTwoTwist(set) => set.raw_data_parts(),
            ConcreteCaseSet::BufferedThreeTwist(set) => set.raw_data_parts(),
            ConcreteCaseSet::BufferedParity(set) => set.raw_data_parts(),
            ConcreteCaseSet::BufferedParityTwist(set) => set.raw_data_parts(),
        };
        let mut raw = self.tag().name().to_owned();
        for part in parts {
            debug_assert!(!part.contains(SEPARATOR));
            raw.push(SEPARATOR);
            raw.push_str(&part);
        }
        raw
    }

    pub fn from_raw_data(raw_data: &str) -> Result<ConcreteCaseSet, SerializationError> {
        let mut tokens = raw_data.split(SEPARATOR);
        let tag_token = tokens.next().unwrap_or_default();
        let tag = CONCRETE_CASE_SET_TAGS.get(tag_token).copied().ok_or_else(|| {
            SerializationError::UnknownTag {
                tag: tag_token.to_owned(),
            }
        })?;
        let parts: Vec<&str> = tokens.collect();
        Ok(match tag {
            ConcreteCaseSetTag::BufferedThreeCycle => ConcreteCaseSet::BufferedThreeCycle(
                BufferedThreeCycleSet::from_raw_data_parts(&parts)?,
            ),
            ConcreteCaseSetTag::FloatingTwoTwist => ConcreteCaseSet::FloatingTwoTwist(
                ConcreteFloatingTwoTwistSet::from_raw_data_parts(&parts)?,
            ),
            ConcreteCaseSetTag::BufferedThreeTwist => ConcreteCaseSet::BufferedThreeTwist(
                BufferedThreeTwistSet::from_raw_data_parts(&parts)?,
            ),
            ConcreteCaseSetTag::BufferedParity => {
                ConcreteCaseSet::BufferedParity(BufferedParitySet::from_raw_data_parts(&parts)?)
            }
            ConcreteCaseSetTag::BufferedParityTwist => ConcreteCaseSet::BufferedParityTwist(
                BufferedParityTwistSet::from_raw_data_parts(&parts)?,
            ),
        })
    }
}

impl fmt::Display for ConcreteCaseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcreteCaseSet::BufferedThreeCycle(set) => write!(f, "{set}"),
            ConcreteCaseSet::FloatingTwoTwist(set) => write!(f, "{set}"),
            ConcreteCaseSet::BufferedThreeTwist(set) => write!(f, "{set}"),
            ConcreteCaseSet::BufferedParity(set) => write!(f, "{set}"),
            ConcreteCaseSet::BufferedParityTwist(set) => write!(f, "{set}"),
        }
    }
}

/// The process-wide catalog of abstract case sets, built once before any
/// concurrent lookups start.
pub static CASE_SETS: LazyLock<Vec<AbstractCaseSet>> = LazyLock::new(|| {
    let mut sets = Vec::new();
    for kind in PartKind::MOVEABLE {
        sets.push(AbstractCaseSet::ThreeCycle(ThreeCycleSet::new(kind)));
    }
    for kind in [PartKind::Corner, PartKind::Edge] {
        sets.push(AbstractCaseSet::FloatingTwoTwist(FloatingTwoTwistSet::new(
            kind,
        )));
    }
    sets.push(AbstractCaseSet::ThreeTwist(ThreeTwistSet));
    for (buffer_kind, parity_kind) in [
        (PartKind::Corner, PartKind::Edge),
        (PartKind::Edge, PartKind::Corner),
    ] {
        sets.push(AbstractCaseSet::Parity(ParitySet::new(
            buffer_kind,
            parity_kind,
        )));
        sets.push(AbstractCaseSet::ParityTwist(ParityTwistSet::new(
            buffer_kind,
            parity_kind,
        )));
    }
    sets
});

#[cfg(test)]
mod tests {
    use super::{CASE_SETS, ConcreteCaseSet};
    use crate::case::Case;
    use puzzle_core::{Part, PartCycle, PartKind};

    fn corner(name: &str) -> Part {
        Part::parse(PartKind::Corner, name).unwrap()
    }

    fn corner_cycle_case(names: &[&str]) -> Case {
        let parts = names.iter().map(|name| corner(name)).collect();
        Case::try_new(vec![PartCycle::try_new(parts, 0).unwrap()]).unwrap()
    }

    #[test]
    fn raw_data_round_trips_for_every_concrete_set() {
        for abstract_set in CASE_SETS.iter() {
            for concrete in abstract_set.all_refinements() {
                let raw = concrete.to_raw_data();
                let reparsed = ConcreteCaseSet::from_raw_data(&raw).unwrap();
                assert_eq!(reparsed, concrete, "{raw}");
            }
        }
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert!(ConcreteCaseSet::from_raw_data("MysterySet:Corner:ULB").is_err());
        assert!(ConcreteCaseSet::from_raw_data("BufferedThreeCycleSet:Corner").is_err());
        assert!(ConcreteCaseSet::from_raw_data("BufferedThreeCycleSet:Gizmo:ULB").is_err());
    }

    #[test]
    fn refinements_matching_returns_all_anchors() {
        let case = corner_cycle_case(&["URF", "ULB", "DFR"]);
        let three_cycles = CASE_SETS
            .iter()
            .find(|set| set.matches(&case))
            .expect("corner 3-cycles are in the catalog");
        let refinements = three_cycles.refinements_matching(&case);
        assert_eq!(refinements.len(), 3);
        let buffers: Vec<String> = refinements
            .iter()
            .map(|set| set.buffer().unwrap().to_string())
            .collect();
        for name in ["URF", "ULB", "DFR"] {
            assert!(buffers.contains(&name.to_string()), "{buffers:?}");
        }
    }

    #[test]
    fn enumerated_cases_match_their_set() {
        for abstract_set in CASE_SETS.iter() {
            for concrete in abstract_set.all_refinements().into_iter().take(2) {
                let cases = concrete.cases();
                assert!(!cases.is_empty(), "{concrete}");
                for case in cases.iter().take(20) {
                    assert!(concrete.matches(case), "{concrete}: {case}");
                    assert!(abstract_set.matches(case), "{abstract_set}: {case}");
                }
            }
        }
    }

    #[test]
    fn strict_matching_canonicalizes_enumerated_cases() {
        for abstract_set in CASE_SETS.iter().take(3) {
            for concrete in abstract_set.all_refinements().into_iter().take(1) {
                for case in concrete.cases().into_iter().take(5) {
                    let strict = concrete.create_strict_matching(&case).unwrap();
                    assert!(concrete.strict_matches(&strict), "{concrete}: {case}");
                    assert!(case.equivalent(&strict, true));
                }
            }
        }
    }
}
