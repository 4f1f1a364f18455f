use std::fmt;

use itertools::Itertools;
use puzzle_core::{Part, PartCycle, PartKind, SerializationError, letter_scheme::LetterScheme};

use crate::{
    case::Case,
    case_sets::{PatternArityError, arity_error, kind_lowercase, name_part, parse_kind_token,
        parse_part_token},
    pattern::{CasePattern, case_pattern, cycle_pattern, solved_twist, specific, wildcard},
};

/// All 3-cycles of one part kind, e.g. "edge 3-cycles".
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ThreeCycleSet {
    part_kind: PartKind,
}

impl ThreeCycleSet {
    #[must_use]
    pub fn new(part_kind: PartKind) -> ThreeCycleSet {
        ThreeCycleSet { part_kind }
    }

    #[must_use]
    pub fn part_kind(&self) -> PartKind {
        self.part_kind
    }

    #[must_use]
    pub fn pattern(&self) -> CasePattern {
        case_pattern(vec![cycle_pattern(
            self.part_kind,
            vec![wildcard(), wildcard(), wildcard()],
            solved_twist(),
        )])
    }

    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        self.pattern().matches(case)
    }

    #[must_use]
    pub fn refinement(&self, buffer: Part) -> BufferedThreeCycleSet {
        BufferedThreeCycleSet::new(self.part_kind, buffer)
    }

    /// One buffered set per physical piece of the kind.
    #[must_use]
    pub fn all_refinements(&self) -> Vec<BufferedThreeCycleSet> {
        self.part_kind
            .elements()
            .iter()
            .filter(|part| part.is_canonical())
            .map(|part| self.refinement(part.clone()))
            .collect()
    }

    /// The buffered sets a matching case could be trained in: any of the
    /// cycle's three pieces can serve as the buffer.
    #[must_use]
    pub fn refinements_matching(&self, case: &Case) -> Vec<BufferedThreeCycleSet> {
        if !self.matches(case) {
            return Vec::new();
        }
        let case = case.canonicalize(true);
        let cycle = &case.part_cycles()[0];
        cycle
            .parts()
            .iter()
            .map(|part| self.refinement(part.canonical()))
            .collect()
    }
}

impl fmt::Display for ThreeCycleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 3-cycles", kind_lowercase(self.part_kind))
    }
}

/// All 3-cycles of one part kind through a fixed buffer piece, e.g. "edge
/// 3-cycles for buffer UF".
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BufferedThreeCycleSet {
    part_kind: PartKind,
    buffer: Part,
}

impl BufferedThreeCycleSet {
    #[must_use]
    pub fn new(part_kind: PartKind, buffer: Part) -> BufferedThreeCycleSet {
        assert_eq!(buffer.kind(), part_kind);
        BufferedThreeCycleSet { part_kind, buffer }
    }

    #[must_use]
    pub fn part_kind(&self) -> PartKind {
        self.part_kind
    }

    #[must_use]
    pub fn buffer(&self) -> &Part {
        &self.buffer
    }

    #[must_use]
    pub fn pattern(&self) -> CasePattern {
        case_pattern(vec![cycle_pattern(
            self.part_kind,
            vec![specific(self.buffer.clone()), wildcard(), wildcard()],
            solved_twist(),
        )])
    }

    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        self.pattern().matches(case)
    }

    fn cycle<'a>(&self, case: &'a Case) -> Option<&'a PartCycle> {
        case.part_cycles()
            .iter()
            .find(|cycle| cycle.kind() == self.part_kind && cycle.len() == 3)
    }

    /// Only matches cases already spelled from this set's buffer.
    #[must_use]
    pub fn strict_matches(&self, case: &Case) -> bool {
        case.part_cycles().len() == 1
            && self.matches(case)
            && self
                .cycle(case)
                .is_some_and(|cycle| cycle.parts()[0] == self.buffer)
    }

    /// Rewrites an equivalent case so that it fulfills `strict_matches`.
    pub fn create_strict_matching(&self, case: &Case) -> Result<Case, PatternArityError> {
        if !self.matches(case) {
            return Err(arity_error(self, case));
        }
        let cycle = self
            .cycle(case)
            .and_then(|cycle| cycle.start_with(&self.buffer))
            .ok_or_else(|| arity_error(self, case))?;
        Ok(Case::try_new(vec![cycle]).expect("restarting a cycle keeps it valid"))
    }

    /// The two non-buffer targets, as letters of the scheme when one is
    /// given.
    pub fn case_name(
        &self,
        case: &Case,
        letter_scheme: Option<&LetterScheme>,
    ) -> Result<String, PatternArityError> {
        if !self.strict_matches(case) {
            return Err(arity_error(self, case));
        }
        let cycle = self.cycle(case).expect("strict matches have the cycle");
        Ok(cycle.parts()[1..=2]
            .iter()
            .map(|part| name_part(letter_scheme, part))
            .join(" "))
    }

    /// The pattern of the spreadsheet row/column this case belongs to: the
    /// buffer plus the first or second target pinned down.
    pub fn row_pattern(
        &self,
        refinement_index: usize,
        case: &Case,
    ) -> Result<CasePattern, PatternArityError> {
        if refinement_index > 1 || !self.matches(case) {
            return Err(arity_error(self, case));
        }
        let started = self
            .cycle(case)
            .and_then(|cycle| cycle.start_with(&self.buffer))
            .ok_or_else(|| arity_error(self, case))?;
        let mut part_patterns = vec![specific(self.buffer.clone()), wildcard(), wildcard()];
        part_patterns[refinement_index + 1] =
            specific(started.parts()[refinement_index + 1].clone());
        Ok(case_pattern(vec![cycle_pattern(
            self.part_kind,
            part_patterns,
            solved_twist(),
        )]))
    }

    #[must_use]
    pub fn default_cube_size(&self) -> u32 {
        self.part_kind.min_cube_size().max(3)
    }

    /// Every distinct case of this set: all ordered, oriented target pairs.
    #[must_use]
    pub fn cases(&self) -> Vec<Case> {
        self.part_kind
            .elements()
            .iter()
            .permutations(2)
            .filter(|pair| {
                !pair[0].turned_equals(pair[1])
                    && !pair[0].turned_equals(&self.buffer)
                    && !pair[1].turned_equals(&self.buffer)
            })
            .map(|pair| {
                let parts = vec![self.buffer.clone(), pair[0].clone(), pair[1].clone()];
                Case::try_new(vec![
                    PartCycle::try_new(parts, 0).expect("targets are distinct pieces"),
                ])
                .expect("a single cycle is a valid case")
            })
            .collect()
    }

    pub(crate) fn raw_data_parts(&self) -> Vec<String> {
        vec![self.part_kind.name().to_owned(), self.buffer.to_string()]
    }

    pub(crate) fn from_raw_data_parts(
        parts: &[&str],
    ) -> Result<BufferedThreeCycleSet, SerializationError> {
        let [kind_token, buffer_token] = parts else {
            return Err(SerializationError::Malformed {
                data: parts.join(":"),
            });
        };
        let part_kind = parse_kind_token(kind_token)?;
        let buffer = parse_part_token(part_kind, buffer_token)?;
        Ok(BufferedThreeCycleSet::new(part_kind, buffer))
    }
}

impl fmt::Display for BufferedThreeCycleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} 3-cycles for buffer {}",
            kind_lowercase(self.part_kind),
            self.buffer
        )
    }
}
