use std::fmt;

use itertools::Itertools;
use puzzle_core::{Part, PartCycle, PartKind, SerializationError, letter_scheme::LetterScheme};

use crate::{
    case::Case,
    case_sets::{PatternArityError, arity_error, kind_lowercase, name_part, parse_kind_token,
        parse_part_token},
    pattern::{CasePattern, case_pattern, cycle_pattern, solved_twist, specific, wildcard},
};

/// The two parity pieces adjacent to a buffer: same primary face, as many
/// shared faces as possible.
pub(crate) fn default_parity_parts(parity_kind: PartKind, buffer: &Part) -> Vec<Part> {
    let candidates: Vec<&Part> = parity_kind
        .elements()
        .iter()
        .filter(|part| part.primary_face() == buffer.primary_face())
        .collect();
    let shared_faces = |part: &Part| {
        part.faces()
            .iter()
            .filter(|face| buffer.faces().contains(face))
            .count()
    };
    let max_shared = candidates
        .iter()
        .map(|part| shared_faces(part))
        .max()
        .unwrap_or(0);
    candidates
        .into_iter()
        .filter(|part| shared_faces(part) == max_shared)
        .take(2)
        .cloned()
        .collect()
}

pub(crate) fn parity_default_cube_size(buffer_kind: PartKind, parity_kind: PartKind) -> u32 {
    let mut candidate = buffer_kind.min_cube_size().max(parity_kind.min_cube_size());
    for _ in 0..2 {
        if buffer_kind.exists_on_cube_size(candidate) && parity_kind.exists_on_cube_size(candidate)
        {
            return candidate;
        }
        candidate += 1;
    }
    unreachable!("two consecutive sizes always cover both parities")
}

/// A swap of two pieces of the buffer kind together with a swap of two
/// pieces of the parity kind, e.g. "corner edge parities".
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParitySet {
    buffer_kind: PartKind,
    parity_kind: PartKind,
}

impl ParitySet {
    #[must_use]
    pub fn new(buffer_kind: PartKind, parity_kind: PartKind) -> ParitySet {
        ParitySet {
            buffer_kind,
            parity_kind,
        }
    }

    #[must_use]
    pub fn buffer_kind(&self) -> PartKind {
        self.buffer_kind
    }

    #[must_use]
    pub fn parity_kind(&self) -> PartKind {
        self.parity_kind
    }

    #[must_use]
    pub fn pattern(&self) -> CasePattern {
        case_pattern(vec![
            cycle_pattern(
                self.buffer_kind,
                vec![wildcard(), wildcard()],
                solved_twist(),
            ),
            cycle_pattern(
                self.parity_kind,
                vec![wildcard(), wildcard()],
                solved_twist(),
            ),
        ])
    }

    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        self.pattern().matches(case)
    }

    #[must_use]
    pub fn all_refinements(&self) -> Vec<BufferedParitySet> {
        self.buffer_kind
            .elements()
            .iter()
            .filter(|part| part.is_canonical())
            .map(|part| BufferedParitySet::new(self.buffer_kind, self.parity_kind, part.clone()))
            .collect()
    }

    /// Either piece of the buffer-kind swap can anchor the case.
    #[must_use]
    pub fn refinements_matching(&self, case: &Case) -> Vec<BufferedParitySet> {
        if !self.matches(case) {
            return Vec::new();
        }
        let case = case.canonicalize(true);
        let Some(buffer_cycle) = case
            .part_cycles()
            .iter()
            .find(|cycle| cycle.kind() == self.buffer_kind && cycle.len() == 2)
        else {
            return Vec::new();
        };
        buffer_cycle
            .parts()
            .iter()
            .map(|part| {
                BufferedParitySet::new(self.buffer_kind, self.parity_kind, part.canonical())
            })
            .collect()
    }
}

impl fmt::Display for ParitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} parities",
            kind_lowercase(self.buffer_kind),
            kind_lowercase(self.parity_kind)
        )
    }
}

/// All parities swapping a fixed buffer with some other piece.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BufferedParitySet {
    buffer_kind: PartKind,
    parity_kind: PartKind,
    buffer: Part,
}

impl BufferedParitySet {
    #[must_use]
    pub fn new(buffer_kind: PartKind, parity_kind: PartKind, buffer: Part) -> BufferedParitySet {
        assert_eq!(buffer.kind(), buffer_kind);
        BufferedParitySet {
            buffer_kind,
            parity_kind,
            buffer,
        }
    }

    #[must_use]
    pub fn buffer_kind(&self) -> PartKind {
        self.buffer_kind
    }

    #[must_use]
    pub fn parity_kind(&self) -> PartKind {
        self.parity_kind
    }

    #[must_use]
    pub fn buffer(&self) -> &Part {
        &self.buffer
    }

    #[must_use]
    pub fn pattern(&self) -> CasePattern {
        case_pattern(vec![
            cycle_pattern(
                self.buffer_kind,
                vec![specific(self.buffer.clone()), wildcard()],
                solved_twist(),
            ),
            cycle_pattern(
                self.parity_kind,
                vec![wildcard(), wildcard()],
                solved_twist(),
            ),
        ])
    }

    #[must_use]
    pub fn matches(&self, case: &Case) -> bool {
        self.pattern().matches(case)
    }

    fn buffer_cycle<'a>(&self, case: &'a Case) -> Option<&'a PartCycle> {
        case.part_cycles()
            .iter()
            .find(|cycle| cycle.kind() == self.buffer_kind && cycle.len() == 2)
    }

    fn parity_cycle<'a>(&self, case: &'a Case) -> Option<&'a PartCycle> {
        case.part_cycles()
            .iter()
            .find(|cycle| cycle.kind() == self.parity_kind && cycle.len() == 2)
    }

    #[must_use]
    pub fn strict_matches(&self, case: &Case) -> bool {
        self.matches(case)
            && self
                .buffer_cycle(case)
                .is_some_and(|cycle| cycle.parts().contains(&self.buffer))
    }

    pub fn create_strict_matching(&self, case: &Case) -> Result<Case, PatternArityError> {
        if !self.matches(case) {
            return Err(arity_error(self, case));
        }
        let buffer_cycle = self
            .buffer_cycle(case)
            .and_then(|cycle| cycle.start_with(&self.buffer))
            .ok_or_else(|| arity_error(self, case))?;
        let parity_cycle = self
            .parity_cycle(case)
            .ok_or_else(|| arity_error(self, case))?;
        Ok(
            Case::try_new(vec![buffer_cycle, parity_cycle.clone()])
                .expect("restarting a cycle keeps the case valid"),
        )
    }

    /// The swapped piece, with the parity pair in parentheses.
    pub fn case_name(
        &self,
        case: &Case,
        letter_scheme: Option<&LetterScheme>,
    ) -> Result<String, PatternArityError> {
        if !self.strict_matches(case) {
            return Err(arity_error(self, case));
        }
        let buffer_cycle = self
            .buffer_cycle(case)
            .and_then(|cycle| cycle.start_with(&self.buffer))
            .expect("strict matches contain the buffer cycle");
        let parity_cycle = self
            .parity_cycle(case)
            .expect("matching cases contain the parity cycle");
        let swap = name_part(letter_scheme, &buffer_cycle.parts()[1]);
        let first = name_part(letter_scheme, &parity_cycle.parts()[0]);
        let second = name_part(letter_scheme, &parity_cycle.parts()[1]);
        Ok(format!("{swap} ({first} ⟷ {second})"))
    }

    /// The unlettered name used by sheet scraping.
    pub fn raw_case_name(&self, case: &Case) -> Result<String, PatternArityError> {
        if !self.matches(case) {
            return Err(arity_error(self, case));
        }
        let buffer_cycle = self
            .buffer_cycle(case)
            .ok_or_else(|| arity_error(self, case))?;
        let parity_cycle = self
            .parity_cycle(case)
            .ok_or_else(|| arity_error(self, case))?;
        Ok(format!(
            "{} ⟷ {}, {} ⟷ {}",
            buffer_cycle.parts()[0],
            buffer_cycle.parts()[1],
            parity_cycle.parts()[0],
            parity_cycle.parts()[1]
        ))
    }

    /// Refinement 0 pins the swap partner; the parity pair is never refined
    /// because it is determined by the swap.
    pub fn row_pattern(
        &self,
        refinement_index: usize,
        case: &Case,
    ) -> Result<CasePattern, PatternArityError> {
        if refinement_index > 1 || !self.matches(case) {
            return Err(arity_error(self, case));
        }
        if refinement_index == 1 {
            return Ok(self.pattern());
        }
        let swap_part = self
            .buffer_cycle(case)
            .and_then(|cycle| {
                cycle
                    .parts()
                    .iter()
                    .find(|part| !part.turned_equals(&self.buffer))
            })
            .ok_or_else(|| arity_error(self, case))?;
        Ok(case_pattern(vec![
            cycle_pattern(
                self.buffer_kind,
                vec![specific(self.buffer.clone()), specific(swap_part.clone())],
                solved_twist(),
            ),
            cycle_pattern(
                self.parity_kind,
                vec![wildcard(), wildcard()],
                solved_twist(),
            ),
        ]))
    }

    #[must_use]
    pub fn default_cube_size(&self) -> u32 {
        parity_default_cube_size(self.buffer_kind, self.parity_kind)
    }

    /// One case per oriented swap partner, with the default parity pair.
    #[must_use]
    pub fn cases(&self) -> Vec<Case> {
        let parity_parts = default_parity_parts(self.parity_kind, &self.buffer);
        self.buffer_kind
            .elements()
            .iter()
            .filter(|part| !part.turned_equals(&self.buffer))
            .map(|part| {
                Case::try_new(vec![
                    PartCycle::try_new(vec![self.buffer.clone(), part.clone()], 0)
                        .expect("the swap pair is disjoint"),
                    PartCycle::try_new(parity_parts.clone(), 0)
                        .expect("the parity pair is disjoint"),
                ])
                .expect("swap and parity cycles touch different kinds")
            })
            .collect()
    }

    pub(crate) fn raw_data_parts(&self) -> Vec<String> {
        vec![
            self.buffer_kind.name().to_owned(),
            self.parity_kind.name().to_owned(),
            self.buffer.to_string(),
        ]
    }

    pub(crate) fn from_raw_data_parts(
        parts: &[&str],
    ) -> Result<BufferedParitySet, SerializationError> {
        let [buffer_kind_token, parity_kind_token, buffer_token] = parts else {
            return Err(SerializationError::Malformed {
                data: parts.join(":"),
            });
        };
        let buffer_kind = parse_kind_token(buffer_kind_token)?;
        let parity_kind = parse_kind_token(parity_kind_token)?;
        let buffer = parse_part_token(buffer_kind, buffer_token)?;
        Ok(BufferedParitySet::new(buffer_kind, parity_kind, buffer))
    }
}

impl fmt::Display for BufferedParitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} parities for buffer {}",
            kind_lowercase(self.buffer_kind),
            kind_lowercase(self.parity_kind),
            self.buffer
        )
    }
}
