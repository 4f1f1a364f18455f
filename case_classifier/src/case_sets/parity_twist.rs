use std::fmt;

use puzzle_core::{Part, PartCycle, PartKind, SerializationError, letter_scheme::LetterScheme};

use crate::{
    case::Case,
    case_sets::{
        PatternArityError, arity_error, kind_lowercase, name_part, parse_kind_token,
        parse_part_token,
    },
    case_sets::parity::{default_parity_parts, parity_default_cube_size},
    pattern::{
        CasePattern, TwistPattern, case_pattern, cycle_pattern, solved_twist, specific, wildcard,
    },
};

/// A parity whose buffer swap additionally twists, leaving one more piece
/// of the buffer kind twisted in place.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParityTwistSet {
    buffer_kind: PartKind,
    parity_kind: PartKind,
}

impl ParityTwistSet {
    #[must_use]
    pub fn new(buffer_kind: PartKind, parity_kind: PartKind) -> ParityTwistSet {
        ParityTwistSet {
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
                TwistPattern::AnyUnsolved,
            ),
            cycle_pattern(self.buffer_kind, vec![wildcard()], TwistPattern::AnyUnsolved),
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
    pub fn all_refinements(&self) -> Vec<BufferedParityTwistSet> {
        self.buffer_kind
            .elements()
            .iter()
            .filter(|part| part.is_canonical())
            .map(|part| {
                BufferedParityTwistSet::new(self.buffer_kind, self.parity_kind, part.clone())
            })
            .collect()
    }

    /// Either piece of the twisted swap can anchor the case; the floating
    /// twisted piece cannot.
    #[must_use]
    pub fn refinements_matching(&self, case: &Case) -> Vec<BufferedParityTwistSet> {
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
                BufferedParityTwistSet::new(self.buffer_kind, self.parity_kind, part.canonical())
            })
            .collect()
    }
}

impl fmt::Display for ParityTwistSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} parity twists",
            kind_lowercase(self.buffer_kind),
            kind_lowercase(self.parity_kind)
        )
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BufferedParityTwistSet {
    buffer_kind: PartKind,
    parity_kind: PartKind,
    buffer: Part,
}

impl BufferedParityTwistSet {
    #[must_use]
    pub fn new(
        buffer_kind: PartKind,
        parity_kind: PartKind,
        buffer: Part,
    ) -> BufferedParityTwistSet {
        assert_eq!(buffer.kind(), buffer_kind);
        BufferedParityTwistSet {
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
                TwistPattern::AnyUnsolved,
            ),
            cycle_pattern(self.buffer_kind, vec![wildcard()], TwistPattern::AnyUnsolved),
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

    fn twist_cycle<'a>(&self, case: &'a Case) -> Option<&'a PartCycle> {
        case.part_cycles()
            .iter()
            .find(|cycle| cycle.kind() == self.buffer_kind && cycle.len() == 1)
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
        let twist_cycle = self.twist_cycle(case).ok_or_else(|| arity_error(self, case))?;
        let parity_cycle = self
            .parity_cycle(case)
            .ok_or_else(|| arity_error(self, case))?;
        Ok(
            Case::try_new(vec![buffer_cycle, twist_cycle.clone(), parity_cycle.clone()])
                .expect("restarting a cycle keeps the case valid"),
        )
    }

    /// The twisted swap piece, with the parity pair and the floating twist
    /// in parentheses.
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
        let twist_cycle = self.twist_cycle(case).expect("matching cases have the twist");
        let parity_cycle = self
            .parity_cycle(case)
            .expect("matching cases have the parity pair");
        Ok(format!(
            "{} ({} ⟷ {}, {})",
            name_part(letter_scheme, &buffer_cycle.parts()[1]),
            name_part(letter_scheme, &parity_cycle.parts()[0]),
            name_part(letter_scheme, &parity_cycle.parts()[1]),
            name_part(letter_scheme, &twist_cycle.parts()[0]),
        ))
    }

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
                TwistPattern::AnyUnsolved,
            ),
            cycle_pattern(self.buffer_kind, vec![wildcard()], TwistPattern::AnyUnsolved),
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

    /// One case per swap partner, floating twisted piece and twist amount,
    /// with the default parity pair. The buffer swap untwists what the
    /// floating piece twists.
    #[must_use]
    pub fn cases(&self) -> Vec<Case> {
        let order = self.buffer_kind.rotation_order();
        let parity_parts = default_parity_parts(self.parity_kind, &self.buffer);
        let mut cases = Vec::new();
        for swap_part in self.buffer_kind.elements() {
            if swap_part.turned_equals(&self.buffer) {
                continue;
            }
            for twisted_part in self.buffer_kind.elements() {
                if !twisted_part.is_canonical()
                    || twisted_part.turned_equals(&self.buffer)
                    || twisted_part.turned_equals(swap_part)
                {
                    continue;
                }
                for twist in 1..order {
                    cases.push(
                        Case::try_new(vec![
                            PartCycle::try_new(
                                vec![self.buffer.clone(), swap_part.clone()],
                                (order - twist) % order,
                            )
                            .expect("the swap pair is disjoint"),
                            PartCycle::try_new(vec![twisted_part.clone()], twist)
                                .expect("a twist cycle is valid"),
                            PartCycle::try_new(parity_parts.clone(), 0)
                                .expect("the parity pair is disjoint"),
                        ])
                        .expect("the three cycles are disjoint"),
                    );
                }
            }
        }
        cases
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
    ) -> Result<BufferedParityTwistSet, SerializationError> {
        let [buffer_kind_token, parity_kind_token, buffer_token] = parts else {
            return Err(SerializationError::Malformed {
                data: parts.join(":"),
            });
        };
        let buffer_kind = parse_kind_token(buffer_kind_token)?;
        let parity_kind = parse_kind_token(parity_kind_token)?;
        let buffer = parse_part_token(buffer_kind, buffer_token)?;
        Ok(BufferedParityTwistSet::new(buffer_kind, parity_kind, buffer))
    }
}

impl fmt::Display for BufferedParityTwistSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} parity twists for buffer {}",
            kind_lowercase(self.buffer_kind),
            kind_lowercase(self.parity_kind),
            self.buffer
        )
    }
}
