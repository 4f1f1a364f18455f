use std::fmt;

use itertools::Itertools;
use puzzle_core::{Part, PartCycle, PartKind, SerializationError, letter_scheme::LetterScheme};

use crate::{
    case::Case,
    case_sets::{PatternArityError, arity_error, name_part, parse_part_token},
    pattern::{CasePattern, TwistPattern, case_pattern, cycle_pattern, specific, wildcard},
};

fn direction_pattern(part_patterns: [crate::pattern::PartPattern; 3], twist: u8) -> CasePattern {
    let [first, second, third] = part_patterns;
    case_pattern(vec![
        cycle_pattern(PartKind::Corner, vec![first], TwistPattern::Specific(twist)),
        cycle_pattern(PartKind::Corner, vec![second], TwistPattern::Specific(twist)),
        cycle_pattern(PartKind::Corner, vec![third], TwistPattern::Specific(twist)),
    ])
}

/// Three corners twisted in place in the same direction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ThreeTwistSet;

impl ThreeTwistSet {
    #[must_use]
    pub fn pattern(&self) -> CasePattern {
        direction_pattern([wildcard(), wildcard(), wildcard()], 1)
            | direction_pattern([wildcard(), wildcard(), wildcard()], 2)
    }

    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        self.pattern().matches(case)
    }

    #[must_use]
    pub fn all_refinements(&self) -> Vec<BufferedThreeTwistSet> {
        PartKind::Corner
            .elements()
            .iter()
            .filter(|part| part.is_canonical())
            .map(|part| BufferedThreeTwistSet::new(part.clone()))
            .collect()
    }

    /// Any of the three twisted corners can serve as the buffer.
    #[must_use]
    pub fn refinements_matching(&self, case: &Case) -> Vec<BufferedThreeTwistSet> {
        if !self.matches(case) {
            return Vec::new();
        }
        case.canonicalize(true)
            .part_cycles()
            .iter()
            .map(|cycle| BufferedThreeTwistSet::new(cycle.parts()[0].canonical()))
            .collect()
    }
}

impl fmt::Display for ThreeTwistSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("corner 3-twists")
    }
}

/// Three same-direction corner twists including a fixed buffer corner.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BufferedThreeTwistSet {
    buffer: Part,
}

impl BufferedThreeTwistSet {
    #[must_use]
    pub fn new(buffer: Part) -> BufferedThreeTwistSet {
        assert_eq!(buffer.kind(), PartKind::Corner);
        BufferedThreeTwistSet { buffer }
    }

    #[must_use]
    pub fn buffer(&self) -> &Part {
        &self.buffer
    }

    #[must_use]
    pub fn pattern(&self) -> CasePattern {
        direction_pattern([specific(self.buffer.clone()), wildcard(), wildcard()], 1)
            | direction_pattern([specific(self.buffer.clone()), wildcard(), wildcard()], 2)
    }

    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        self.pattern().matches(case)
    }

    fn has_three_twist_shape(case: &Case) -> bool {
        case.part_cycles().len() == 3
            && case
                .part_cycles()
                .iter()
                .all(|cycle| cycle.len() == 1 && cycle.kind() == PartKind::Corner)
    }

    #[must_use]
    pub fn strict_matches(&self, case: &Case) -> bool {
        Self::has_three_twist_shape(case)
            && self.matches(case)
            && case.part_cycles()[0].parts()[0] == self.buffer
    }

    pub fn create_strict_matching(&self, case: &Case) -> Result<Case, PatternArityError> {
        if !self.matches(case) {
            return Err(arity_error(self, case));
        }
        let mut cycles: Vec<PartCycle> = case.part_cycles().to_vec();
        cycles.sort_by_key(|cycle| !cycle.contains_turned(&self.buffer));
        let buffer_cycle = cycles[0]
            .start_with(&self.buffer)
            .ok_or_else(|| arity_error(self, case))?;
        cycles[0] = buffer_cycle;
        Ok(Case::try_new(cycles).expect("reordering cycles keeps the case valid"))
    }

    /// The two non-buffer twisted corners.
    pub fn case_name(
        &self,
        case: &Case,
        letter_scheme: Option<&LetterScheme>,
    ) -> Result<String, PatternArityError> {
        if !self.strict_matches(case) {
            return Err(arity_error(self, case));
        }
        Ok(case.part_cycles()[1..]
            .iter()
            .map(|cycle| name_part(letter_scheme, &cycle.parts()[0]))
            .join(" "))
    }

    pub fn row_pattern(
        &self,
        refinement_index: usize,
        case: &Case,
    ) -> Result<CasePattern, PatternArityError> {
        if refinement_index > 1 || !Self::has_three_twist_shape(case) {
            return Err(arity_error(self, case));
        }
        let twist = if refinement_index == 0 { 1 } else { 2 };
        let other_parts: Vec<Part> = case
            .part_cycles()
            .iter()
            .map(|cycle| cycle.parts()[0].clone())
            .filter(|part| !part.turned_equals(&self.buffer))
            .collect();
        other_parts
            .into_iter()
            .map(|part| {
                direction_pattern(
                    [
                        specific(self.buffer.clone()),
                        specific(part),
                        wildcard(),
                    ],
                    twist,
                )
            })
            .reduce(|left, right| left | right)
            .ok_or_else(|| arity_error(self, case))
    }

    #[must_use]
    pub fn default_cube_size(&self) -> u32 {
        3
    }

    /// All twist triples through the buffer, in both directions.
    #[must_use]
    pub fn cases(&self) -> Vec<Case> {
        let others: Vec<&Part> = PartKind::Corner
            .elements()
            .iter()
            .filter(|part| part.is_canonical() && !part.turned_equals(&self.buffer))
            .collect();
        others
            .iter()
            .copied()
            .tuple_combinations()
            .flat_map(|(first, second)| {
                [1_u8, 2].into_iter().map(move |twist| {
                    let cycles = [&self.buffer, first, second]
                        .into_iter()
                        .map(|part| {
                            PartCycle::try_new(vec![part.clone()], twist)
                                .expect("a twist cycle is valid")
                        })
                        .collect();
                    Case::try_new(cycles).expect("distinct corners give disjoint cycles")
                })
            })
            .collect()
    }

    pub(crate) fn raw_data_parts(&self) -> Vec<String> {
        vec![self.buffer.to_string()]
    }

    pub(crate) fn from_raw_data_parts(
        parts: &[&str],
    ) -> Result<BufferedThreeTwistSet, SerializationError> {
        let [buffer_token] = parts else {
            return Err(SerializationError::Malformed {
                data: parts.join(":"),
            });
        };
        Ok(BufferedThreeTwistSet::new(parse_part_token(
            PartKind::Corner,
            buffer_token,
        )?))
    }
}

impl fmt::Display for BufferedThreeTwistSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corner 3-twists for buffer {}", self.buffer)
    }
}
