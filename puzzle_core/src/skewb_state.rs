use fxhash::FxHashMap;

use crate::{
    cube::{Part, PartKind, corner_turn_mapping},
    cube_state::{PuzzleState, apply_mapping},
    moves::{Move, MoveError, UnsupportedCubeSizeError},
};

/// The positions and occupants of a Skewb: eight corners and six face
/// centers.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SkewbState {
    occupants: FxHashMap<Part, Part>,
}

impl SkewbState {
    #[must_use]
    pub fn solved() -> SkewbState {
        let mut occupants = FxHashMap::default();
        for kind in [PartKind::Corner, PartKind::Face] {
            for part in kind.elements() {
                if part.is_canonical() {
                    occupants.insert(part.clone(), part.clone());
                }
            }
        }
        SkewbState { occupants }
    }

    /// The part currently occupying the solved position of `position`, in
    /// the orientation matching `position`'s labeling.
    #[must_use]
    pub fn occupant(&self, position: &Part) -> Option<Part> {
        let (canonical, index) = position.canonicalize();
        self.occupants
            .get(&canonical)
            .map(|occupant| occupant.rotated_by(index))
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.occupants
            .iter()
            .all(|(position, occupant)| position == occupant)
    }
}

impl PuzzleState for SkewbState {
    fn apply_move(&mut self, mv: &Move) -> Result<(), MoveError> {
        match mv {
            Move::Skewb(skewb_move) => {
                let axis_corner = skewb_move.axis_corner().clone();
                let mapping = corner_turn_mapping(&axis_corner, skewb_move.direction());
                apply_mapping(&mut self.occupants, &mapping, |part| match part.kind() {
                    // The rotating half holds the axis corner, the three
                    // corners sharing an edge with it, and the three
                    // centers of its faces.
                    PartKind::Corner => {
                        part.faces()
                            .iter()
                            .filter(|face| axis_corner.faces().contains(face))
                            .count()
                            >= 2
                    }
                    PartKind::Face => axis_corner.faces().contains(&part.primary_face()),
                    _ => unreachable!("Skewb states only track corners and centers"),
                });
                Ok(())
            }
            Move::Rotation(rotation) => {
                apply_mapping(&mut self.occupants, &rotation.mapping(), |_| true);
                Ok(())
            }
            _ => Err(UnsupportedCubeSizeError::WrongPuzzle { mv: mv.to_string() }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SkewbState;
    use crate::{
        cube::{Part, PartKind},
        cube_state::PuzzleState,
        direction::SkewbDirection,
        moves::{Move, SkewbMove},
    };

    fn turn(corner: &str, direction: SkewbDirection) -> Move {
        Move::Skewb(
            SkewbMove::new(Part::parse(PartKind::Corner, corner).unwrap(), direction).unwrap(),
        )
    }

    #[test]
    fn corner_turns_have_order_three() {
        let mut state = SkewbState::solved();
        let mv = turn("URF", SkewbDirection::FORWARD);
        for _ in 0..3 {
            state.apply_move(&mv).unwrap();
        }
        assert!(state.is_solved());
    }

    #[test]
    fn turn_and_inverse_cancel() {
        let mut state = SkewbState::solved();
        state.apply_move(&turn("DBL", SkewbDirection::FORWARD)).unwrap();
        assert!(!state.is_solved());
        state
            .apply_move(&turn("DBL", SkewbDirection::BACKWARD))
            .unwrap();
        assert!(state.is_solved());
    }

    #[test]
    fn a_turn_moves_centers_of_its_half_only() {
        let mut state = SkewbState::solved();
        state.apply_move(&turn("URF", SkewbDirection::FORWARD)).unwrap();
        let u_center = Part::parse(PartKind::Face, "U").unwrap();
        let d_center = Part::parse(PartKind::Face, "D").unwrap();
        // The U center moved to R, so R now holds U; D is untouched.
        let r_center = Part::parse(PartKind::Face, "R").unwrap();
        assert_eq!(state.occupant(&r_center), Some(u_center));
        assert_eq!(state.occupant(&d_center), Some(d_center));
    }

    #[test]
    fn cube_moves_are_rejected() {
        let mut state = SkewbState::solved();
        let alg = crate::parser::parse_algorithm("R").unwrap();
        assert!(alg.apply_to(&mut state).is_err());
    }
}
