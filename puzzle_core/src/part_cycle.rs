use std::{cmp::Ordering, fmt};

use itertools::Itertools;
use thiserror::Error;

use crate::cube::{Part, PartKind, PartParseError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartCycleError {
    #[error("a part cycle cannot be empty")]
    Empty,
    #[error("all parts of a cycle must be {expected}s, got a {actual}")]
    MixedKinds { expected: PartKind, actual: PartKind },
    #[error("invalid twist {twist} for a {kind} cycle")]
    InvalidTwist { twist: u8, kind: PartKind },
    #[error("the parts of a cycle must be distinct pieces")]
    DuplicateParts,
}

/// Errors from the compact `:`-separated persisted key format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("unknown type tag {tag:?}")]
    UnknownTag { tag: String },
    #[error("malformed raw data {data:?}")]
    Malformed { data: String },
    #[error(transparent)]
    Part(#[from] PartParseError),
    #[error(transparent)]
    Cycle(#[from] PartCycleError),
}

/// A cyclic relabeling of same-kind parts plus an orientation change.
///
/// The piece at the position of `parts[0]` ends up at the position of
/// `parts[1]` and so on; the piece at the last position wraps around to
/// `parts[0]`, re-oriented by `twist`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PartCycle {
    parts: Vec<Part>,
    twist: u8,
}

impl PartCycle {
    pub fn try_new(parts: Vec<Part>, twist: u8) -> Result<PartCycle, PartCycleError> {
        let Some(first) = parts.first() else {
            return Err(PartCycleError::Empty);
        };
        let kind = first.kind();
        for part in &parts {
            if part.kind() != kind {
                return Err(PartCycleError::MixedKinds {
                    expected: kind,
                    actual: part.kind(),
                });
            }
        }
        if twist >= kind.rotation_order() {
            return Err(PartCycleError::InvalidTwist { twist, kind });
        }
        for (a, b) in parts.iter().tuple_combinations() {
            if a.turned_equals(b) {
                return Err(PartCycleError::DuplicateParts);
            }
        }
        Ok(PartCycle { parts, twist })
    }

    #[must_use]
    pub fn kind(&self) -> PartKind {
        self.parts[0].kind()
    }

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    #[must_use]
    pub fn twist(&self) -> u8 {
        self.twist
    }

    /// Cycles are never empty, so there is no `is_empty` counterpart.
    #[allow(clippy::len_without_is_empty)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the cycle touches the given physical piece, in any
    /// orientation.
    #[must_use]
    pub fn contains_turned(&self, part: &Part) -> bool {
        self.parts.iter().any(|p| p.turned_equals(part))
    }

    /// The cycle undoing this one.
    #[must_use]
    pub fn inverse(&self) -> PartCycle {
        let order = self.kind().rotation_order();
        let untwist = (order - self.twist) % order;
        let mut parts = vec![self.parts[0].clone()];
        parts.extend(
            self.parts[1..]
                .iter()
                .rev()
                .map(|part| part.rotated_by(untwist)),
        );
        PartCycle {
            parts,
            twist: untwist,
        }
    }

    /// The same cycle written starting from `parts[by]`. The parts that wrap
    /// around pick up the cycle's twist.
    #[must_use]
    pub fn shifted(&self, by: usize) -> PartCycle {
        let by = by % self.parts.len();
        let mut parts: Vec<Part> = self.parts[by..].to_vec();
        parts.extend(self.parts[..by].iter().map(|part| part.rotated_by(self.twist)));
        PartCycle {
            parts,
            twist: self.twist,
        }
    }

    /// Uniformly relabels every part by the same rotation; the described
    /// permutation is unchanged.
    #[must_use]
    pub fn rotated_by(&self, number: u8) -> PartCycle {
        PartCycle {
            parts: self
                .parts
                .iter()
                .map(|part| part.rotated_by(number))
                .collect(),
            twist: self.twist,
        }
    }

    /// Rewrites the cycle to start exactly at `part` (which may be given in
    /// any orientation present in the cycle).
    #[must_use]
    pub fn start_with(&self, part: &Part) -> Option<PartCycle> {
        let index = self.parts.iter().position(|p| p.turned_equals(part))?;
        let shifted = self.shifted(index);
        let rotation = shifted.parts[0].rotation_index_to(part)?;
        Some(shifted.rotated_by(rotation))
    }

    /// The lexicographically smallest spelling among all start points and
    /// uniform relabelings.
    #[must_use]
    pub fn canonical(&self) -> PartCycle {
        let order = self.kind().rotation_order();
        (0..self.parts.len())
            .flat_map(|shift| {
                let shifted = self.shifted(shift);
                (0..order).map(move |rotation| shifted.rotated_by(rotation))
            })
            .min()
            .expect("cycles are never empty")
    }

    /// Whether the two cycles describe the same permutation and orientation
    /// change.
    #[must_use]
    pub fn equivalent(&self, other: &PartCycle) -> bool {
        self.canonical() == other.canonical()
    }

    /// Serializes the cycle as `Kind(P1 P2 …)` with a trailing twist digit
    /// when the twist is nonzero. The result never contains `:`, which the
    /// outer case format uses as its separator.
    #[must_use]
    pub fn to_raw_data(&self) -> String {
        let parts = self.parts.iter().join(" ");
        if self.twist > 0 {
            format!("{}({parts}){}", self.kind(), self.twist)
        } else {
            format!("{}({parts})", self.kind())
        }
    }

    pub fn from_raw_data(raw_data: &str) -> Result<PartCycle, SerializationError> {
        let malformed = || SerializationError::Malformed {
            data: raw_data.to_owned(),
        };
        let open = raw_data.find('(').ok_or_else(malformed)?;
        let close = raw_data.rfind(')').ok_or_else(malformed)?;
        if close < open {
            return Err(malformed());
        }
        let kind = PartKind::parse_name(&raw_data[..open]).ok_or_else(|| {
            SerializationError::UnknownTag {
                tag: raw_data[..open].to_owned(),
            }
        })?;
        let parts = raw_data[open + 1..close]
            .split_whitespace()
            .map(|part| Part::parse(kind, part))
            .collect::<Result<Vec<_>, _>>()?;
        let twist_string = &raw_data[close + 1..];
        let twist = if twist_string.is_empty() {
            0
        } else {
            twist_string.parse::<u8>().map_err(|_| malformed())?
        };
        Ok(PartCycle::try_new(parts, twist)?)
    }
}

impl PartialOrd for PartCycle {
    fn partial_cmp(&self, other: &PartCycle) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PartCycle {
    fn cmp(&self, other: &PartCycle) -> Ordering {
        self.parts
            .cmp(&other.parts)
            .then_with(|| self.twist.cmp(&other.twist))
    }
}

impl fmt::Display for PartCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw_data())
    }
}

#[cfg(test)]
mod tests {
    use super::PartCycle;
    use crate::cube::{Part, PartKind};

    fn corner_cycle(names: &[&str], twist: u8) -> PartCycle {
        let parts = names
            .iter()
            .map(|name| Part::parse(PartKind::Corner, name).unwrap())
            .collect();
        PartCycle::try_new(parts, twist).unwrap()
    }

    #[test]
    fn construction_validates() {
        let ulb = Part::parse(PartKind::Corner, "ULB").unwrap();
        let lbu = ulb.rotated_by(1);
        assert!(PartCycle::try_new(vec![], 0).is_err());
        assert!(PartCycle::try_new(vec![ulb.clone(), lbu], 0).is_err());
        assert!(PartCycle::try_new(vec![ulb], 3).is_err());
    }

    #[test]
    fn shifting_preserves_the_permutation() {
        let cycle = corner_cycle(&["ULB", "URF", "DFL"], 1);
        for shift in 0..3 {
            assert!(cycle.equivalent(&cycle.shifted(shift)));
        }
        for rotation in 0..3 {
            assert!(cycle.equivalent(&cycle.rotated_by(rotation)));
        }
    }

    #[test]
    fn inverse_is_involutive() {
        for twist in 0..3 {
            let cycle = corner_cycle(&["ULB", "URF", "DFL"], twist);
            assert_eq!(cycle.inverse().inverse(), cycle);
            assert_ne!(cycle.inverse(), cycle);
        }
    }

    #[test]
    fn start_with_reanchors() {
        let cycle = corner_cycle(&["ULB", "URF", "DFL"], 0);
        let urf = Part::parse(PartKind::Corner, "URF").unwrap();
        let restarted = cycle.start_with(&urf).unwrap();
        assert_eq!(restarted.parts()[0], urf);
        assert!(restarted.equivalent(&cycle));

        // Asking for a rotated labeling reorients the whole cycle.
        let rfu = urf.rotated_by(1);
        let reoriented = cycle.start_with(&rfu).unwrap();
        assert_eq!(reoriented.parts()[0], rfu);
        assert!(reoriented.equivalent(&cycle));
    }

    #[test]
    fn raw_data_round_trips() {
        for cycle in [
            corner_cycle(&["ULB", "URF", "DFL"], 0),
            corner_cycle(&["ULB", "URF"], 2),
            corner_cycle(&["ULB"], 1),
        ] {
            let raw = cycle.to_raw_data();
            assert!(!raw.contains(':'));
            assert_eq!(PartCycle::from_raw_data(&raw).unwrap(), cycle);
        }
        assert_eq!(
            corner_cycle(&["ULB", "URF"], 2).to_raw_data(),
            "Corner(ULB URF)2"
        );
    }

    #[test]
    fn malformed_raw_data_is_rejected() {
        for raw in ["Corner", "Gadget(UF)", "Corner(ULB ULB)", "Corner(ULB)9"] {
            assert!(PartCycle::from_raw_data(raw).is_err(), "{raw}");
        }
    }
}
