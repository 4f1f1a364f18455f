use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use puzzle_core::{PartCycle, PartKind, SerializationError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaseError {
    #[error("a length-1 cycle without twist describes a solved piece")]
    TrivialCycle,
    #[error("the cycles of a case must touch disjoint pieces")]
    OverlappingCycles,
}

/// The net effect of an algorithm on the puzzle: an unordered set of
/// disjoint part cycles. Solved pieces never appear.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Case {
    part_cycles: Vec<PartCycle>,
}

/// Center cycles that stay on one face permute physically
/// indistinguishable stickers.
pub(crate) fn is_same_face_center_cycle(cycle: &PartCycle) -> bool {
    cycle.kind().is_moveable_center()
        && cycle
            .parts()
            .iter()
            .map(|part| part.primary_face())
            .all_equal()
}

impl Case {
    pub fn try_new(part_cycles: Vec<PartCycle>) -> Result<Case, CaseError> {
        for cycle in &part_cycles {
            if cycle.len() == 1 && cycle.twist() == 0 {
                return Err(CaseError::TrivialCycle);
            }
        }
        for (a, b) in part_cycles.iter().tuple_combinations() {
            if a.kind() == b.kind() && a.parts().iter().any(|part| b.contains_turned(part)) {
                return Err(CaseError::OverlappingCycles);
            }
        }
        Ok(Case { part_cycles })
    }

    #[must_use]
    pub fn part_cycles(&self) -> &[PartCycle] {
        &self.part_cycles
    }

    /// A canonical spelling: optionally without same-face center cycles,
    /// every cycle in canonical form, sorted. Same-face center cycles are
    /// only dropped when something else remains, so a pure center case
    /// still describes itself.
    #[must_use]
    pub fn canonicalize(&self, ignore_same_face_center_cycles: bool) -> Case {
        let mut cycles: Vec<&PartCycle> = self.part_cycles.iter().collect();
        if ignore_same_face_center_cycles {
            let filtered: Vec<&PartCycle> = cycles
                .iter()
                .copied()
                .filter(|cycle| !is_same_face_center_cycle(cycle))
                .collect();
            if !filtered.is_empty() {
                cycles = filtered;
            }
        }
        let mut part_cycles: Vec<PartCycle> =
            cycles.into_iter().map(PartCycle::canonical).collect();
        part_cycles.sort();
        Case { part_cycles }
    }

    /// Whether the two cases describe the same permutation and orientation
    /// change, regardless of how their cycles are spelled.
    #[must_use]
    pub fn equivalent(&self, other: &Case, ignore_same_face_center_cycles: bool) -> bool {
        self.canonicalize(ignore_same_face_center_cycles)
            == other.canonicalize(ignore_same_face_center_cycles)
    }

    /// The part kinds the case touches.
    #[must_use]
    pub fn part_kinds(&self) -> Vec<PartKind> {
        self.part_cycles
            .iter()
            .map(PartCycle::kind)
            .unique()
            .collect()
    }

    /// Serializes the case as its `:`-joined part cycles.
    #[must_use]
    pub fn to_raw_data(&self) -> String {
        self.part_cycles
            .iter()
            .map(PartCycle::to_raw_data)
            .join(":")
    }

    pub fn from_raw_data(raw_data: &str) -> Result<Case, SerializationError> {
        let part_cycles = raw_data
            .split(':')
            .map(PartCycle::from_raw_data)
            .collect::<Result<Vec<_>, _>>()?;
        Case::try_new(part_cycles).map_err(|_| SerializationError::Malformed {
            data: raw_data.to_owned(),
        })
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw_data())
    }
}

#[cfg(test)]
mod tests {
    use super::Case;
    use puzzle_core::{Part, PartCycle, PartKind};

    fn cycle(kind: PartKind, names: &[&str], twist: u8) -> PartCycle {
        let parts = names
            .iter()
            .map(|name| Part::parse(kind, name).unwrap())
            .collect();
        PartCycle::try_new(parts, twist).unwrap()
    }

    #[test]
    fn trivial_and_overlapping_cycles_are_rejected() {
        assert!(Case::try_new(vec![cycle(PartKind::Corner, &["ULB"], 0)]).is_err());
        assert!(
            Case::try_new(vec![
                cycle(PartKind::Edge, &["UF", "UB"], 0),
                cycle(PartKind::Edge, &["FU", "DF"], 0),
            ])
            .is_err()
        );
        assert!(Case::try_new(vec![cycle(PartKind::Corner, &["ULB"], 1)]).is_ok());
    }

    #[test]
    fn equivalence_ignores_cycle_spelling() {
        let a = Case::try_new(vec![cycle(PartKind::Edge, &["UF", "UB", "DF"], 0)]).unwrap();
        let b = Case::try_new(vec![cycle(PartKind::Edge, &["UB", "DF", "UF"], 0)]).unwrap();
        let c = Case::try_new(vec![cycle(PartKind::Edge, &["FU", "BU", "FD"], 0)]).unwrap();
        assert!(a.equivalent(&b, true));
        assert!(a.equivalent(&c, true));
        let different = Case::try_new(vec![cycle(PartKind::Edge, &["UF", "DF", "UB"], 0)]).unwrap();
        assert!(!a.equivalent(&different, true));
    }

    #[test]
    fn same_face_center_cycles_are_ignored_next_to_real_cycles() {
        let centers = cycle(PartKind::XCenter, &["URF", "UFL"], 0);
        let edges = cycle(PartKind::Edge, &["UF", "UB", "DF"], 0);
        let with_centers = Case::try_new(vec![centers.clone(), edges.clone()]).unwrap();
        let without_centers = Case::try_new(vec![edges]).unwrap();
        assert!(with_centers.equivalent(&without_centers, true));
        assert!(!with_centers.equivalent(&without_centers, false));

        // A case of only center cycles keeps them.
        let only_centers = Case::try_new(vec![centers]).unwrap();
        assert_eq!(only_centers.canonicalize(true).part_cycles().len(), 1);
    }

    #[test]
    fn raw_data_round_trips() {
        let case = Case::try_new(vec![
            cycle(PartKind::Corner, &["ULB", "URF"], 1),
            cycle(PartKind::Edge, &["UF", "UB"], 0),
        ])
        .unwrap();
        let raw = case.to_raw_data();
        assert_eq!(raw, "Corner(ULB URF)1:Edge(UF UB)");
        assert_eq!(Case::from_raw_data(&raw).unwrap(), case);
        assert!(Case::from_raw_data("Nonsense(UF)").is_err());
    }
}
