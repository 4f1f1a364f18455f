use fxhash::FxHashSet;
use log::debug;

use puzzle_core::{
    Algorithm, CubeState, MoveError, Part, PartCycle, PartKind, UnsupportedCubeSizeError,
};

use crate::case::Case;

/// Figures out which case an algorithm solves (or scrambles).
///
/// The reference state places every relevant part at its own solved
/// position, labeled as itself. Applying the inverse of an algorithm then
/// lets the occupants be read off directly as the forward permutation.
pub struct CaseReverseEngineer {
    cube_size: u32,
    part_kinds: Vec<PartKind>,
    state: CubeState,
}

impl CaseReverseEngineer {
    /// Builds the (reusable) reference state for the given cube size,
    /// optionally restricted to a single part kind for speed.
    pub fn new(cube_size: u32, part_kind: Option<PartKind>) -> Result<CaseReverseEngineer, MoveError> {
        let part_kinds = match part_kind {
            Some(kind) => {
                if !kind.exists_on_cube_size(cube_size) {
                    return Err(UnsupportedCubeSizeError::PartKind { kind, cube_size }.into());
                }
                vec![kind]
            }
            None => PartKind::MOVEABLE
                .into_iter()
                .filter(|kind| kind.exists_on_cube_size(cube_size))
                .collect(),
        };
        let state = CubeState::solved_for_kinds(cube_size, &part_kinds)?;
        Ok(CaseReverseEngineer {
            cube_size,
            part_kinds,
            state,
        })
    }

    #[must_use]
    pub fn cube_size(&self) -> u32 {
        self.cube_size
    }

    /// The case the algorithm performs. Fails fast when the algorithm
    /// contains a move that doesn't exist on this cube size instead of
    /// producing a wrong decomposition.
    pub fn find_case(&mut self, algorithm: &Algorithm) -> Result<Case, MoveError> {
        self.check_suitable(algorithm)?;
        let part_kinds = self.part_kinds.clone();
        let case = algorithm
            .inverse()
            .apply_temporarily_to(&mut self.state, |state| {
                case_from_state(state, &part_kinds)
            })?;
        debug!("{algorithm} performs {case}");
        Ok(case)
    }

    /// The single cycle starting at `buffer`.
    pub fn find_part_cycle(
        &mut self,
        algorithm: &Algorithm,
        buffer: &Part,
    ) -> Result<PartCycle, MoveError> {
        if !self.part_kinds.contains(&buffer.kind()) {
            return Err(UnsupportedCubeSizeError::PartKind {
                kind: buffer.kind(),
                cube_size: self.cube_size,
            }
            .into());
        }
        self.check_suitable(algorithm)?;
        algorithm
            .inverse()
            .apply_temporarily_to(&mut self.state, |state| cycle_from(state, buffer))
    }

    fn check_suitable(&self, algorithm: &Algorithm) -> Result<(), MoveError> {
        for mv in algorithm.moves() {
            mv.decide_meaning(self.cube_size)?;
        }
        Ok(())
    }
}

/// Walks the cycle of occupants starting at `buffer` until it closes,
/// reading the final orientation off as the twist.
fn cycle_from(state: &CubeState, buffer: &Part) -> PartCycle {
    let mut parts = vec![buffer.clone()];
    let mut current = state
        .occupant(buffer)
        .expect("the reference state tracks every relevant part");
    let mut steps = 0;
    while !current.turned_equals(buffer) {
        parts.push(current.clone());
        current = state
            .occupant(&current)
            .expect("the reference state tracks every relevant part");
        steps += 1;
        assert!(
            steps <= buffer.kind().elements().len(),
            "occupant walk failed to close into a cycle"
        );
    }
    let twist = buffer
        .rotation_index_to(&current)
        .expect("the closing part is the buffer piece");
    PartCycle::try_new(parts, twist).expect("an occupant walk visits each piece once")
}

fn case_from_state(state: &CubeState, part_kinds: &[PartKind]) -> Case {
    let mut visited: FxHashSet<Part> = FxHashSet::default();
    let mut cycles = Vec::new();
    for kind in part_kinds {
        for part in kind.elements() {
            if !part.is_canonical() || visited.contains(part) {
                continue;
            }
            let cycle = cycle_from(state, part);
            for touched in cycle.parts() {
                visited.insert(touched.canonical());
            }
            if cycle.len() > 1 || cycle.twist() > 0 {
                cycles.push(cycle);
            }
        }
    }
    Case::try_new(cycles).expect("cycles of one permutation are disjoint and nontrivial")
}

#[cfg(test)]
mod tests {
    use super::CaseReverseEngineer;
    use puzzle_core::{Part, PartKind, parse_algorithm};

    #[test]
    fn classic_corner_commutator_is_a_three_cycle() {
        let mut engineer = CaseReverseEngineer::new(3, Some(PartKind::Corner)).unwrap();
        let alg = parse_algorithm("R U R' D R U' R' D'").unwrap();
        let case = engineer.find_case(&alg).unwrap();
        assert_eq!(case.part_cycles().len(), 1);
        let cycle = &case.part_cycles()[0];
        assert_eq!(cycle.kind(), PartKind::Corner);
        assert_eq!(cycle.len(), 3);
        assert_eq!(cycle.twist(), 0);
    }

    #[test]
    fn m_slice_commutator_is_an_edge_three_cycle() {
        let mut engineer = CaseReverseEngineer::new(3, Some(PartKind::Edge)).unwrap();
        let alg = parse_algorithm("M' U2 M U2").unwrap();
        let case = engineer.find_case(&alg).unwrap();
        assert_eq!(case.part_cycles().len(), 1);
        let cycle = &case.part_cycles()[0];
        assert_eq!(cycle.len(), 3);
        assert_eq!(cycle.twist(), 0);
        let uf = Part::parse(PartKind::Edge, "UF").unwrap();
        assert!(cycle.contains_turned(&uf));
    }

    #[test]
    fn the_empty_algorithm_solves_nothing() {
        let mut engineer = CaseReverseEngineer::new(3, None).unwrap();
        let case = engineer
            .find_case(&parse_algorithm("").unwrap())
            .unwrap();
        assert!(case.part_cycles().is_empty());
    }

    #[test]
    fn corner_twists_conserve_orientation() {
        let mut engineer = CaseReverseEngineer::new(3, Some(PartKind::Corner)).unwrap();
        for alg_string in ["R U R' U R U2 R'", "R U R' U'", "R U2 R' U' R U' R'"] {
            let alg = parse_algorithm(alg_string).unwrap();
            let case = engineer.find_case(&alg).unwrap();
            assert!(!case.part_cycles().is_empty(), "{alg_string}");
            let total_twist: u32 = case
                .part_cycles()
                .iter()
                .map(|cycle| u32::from(cycle.twist()))
                .sum();
            assert_eq!(total_twist % 3, 0, "{alg_string}");
        }
    }

    #[test]
    fn unsuitable_moves_fail_fast() {
        let mut engineer = CaseReverseEngineer::new(3, None).unwrap();
        let alg = parse_algorithm("R 3f U").unwrap();
        assert!(engineer.find_case(&alg).is_err());
        // The engineer stays usable afterwards.
        assert!(engineer.find_case(&parse_algorithm("R").unwrap()).is_ok());
    }

    #[test]
    fn kind_must_exist_on_the_cube_size() {
        assert!(CaseReverseEngineer::new(3, Some(PartKind::Wing)).is_err());
        assert!(CaseReverseEngineer::new(4, Some(PartKind::Wing)).is_ok());
    }

    #[test]
    fn inverse_algorithm_gives_the_inverse_case() {
        let mut engineer = CaseReverseEngineer::new(3, Some(PartKind::Edge)).unwrap();
        let alg = parse_algorithm("M' U2 M U2").unwrap();
        let case = engineer.find_case(&alg).unwrap();
        let inverse_case = engineer.find_case(&alg.inverse()).unwrap();
        let cycle = &case.part_cycles()[0];
        assert!(cycle.inverse().equivalent(&inverse_case.part_cycles()[0]));
    }
}
