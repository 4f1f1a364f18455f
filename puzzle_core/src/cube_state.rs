use fxhash::FxHashMap;

use crate::{
    cube::{Face, FaceMapping, Part, PartKind, turn_mapping},
    moves::{Move, MoveError, UnsupportedCubeSizeError},
};

/// The seam between algorithms and concrete puzzles: anything a [`Move`]
/// can be applied to.
pub trait PuzzleState {
    fn apply_move(&mut self, mv: &Move) -> Result<(), MoveError>;
}

/// Moves every affected position's occupant along the rigid face mapping.
///
/// Positions are keyed by their canonical labeling; the occupant is stored
/// in the orientation matching that labeling, so re-keying a moved position
/// rotates the occupant by the same amount.
pub(crate) fn apply_mapping(
    occupants: &mut FxHashMap<Part, Part>,
    mapping: &FaceMapping,
    affected: impl Fn(&Part) -> bool,
) {
    let mut new_occupants =
        FxHashMap::with_capacity_and_hasher(occupants.len(), Default::default());
    for (position, occupant) in occupants.iter() {
        if affected(position) {
            // The occupant's identity travels unchanged; re-keying the new
            // position to its canonical labeling rotates the occupant by
            // the same offset.
            let new_position = position.map_faces(mapping);
            let (canonical, index) = new_position.canonicalize();
            let order = canonical.kind().rotation_order();
            new_occupants.insert(canonical, occupant.rotated_by((order - index) % order));
        } else {
            new_occupants.insert(position.clone(), occupant.clone());
        }
    }
    *occupants = new_occupants;
}

/// How many layers deep below `face` a part's physical position sits, from
/// 0 (on the face) to `cube_size - 1` (on the opposite face). This is what
/// decides whether a fat or slice move drags the part along.
fn layer_index(part: &Part, face: Face, cube_size: u32) -> u32 {
    let middle = (cube_size - 1) / 2;
    let faces = part.faces();
    match part.kind() {
        PartKind::Corner => {
            if faces.contains(&face) {
                0
            } else {
                cube_size - 1
            }
        }
        PartKind::Edge | PartKind::Midge => {
            if faces.contains(&face) {
                0
            } else if faces.contains(&face.opposite()) {
                cube_size - 1
            } else {
                middle
            }
        }
        PartKind::Wing => {
            if faces.contains(&face) {
                0
            } else if faces.contains(&face.opposite()) {
                cube_size - 1
            } else {
                // The wing's chirality decides which side of the middle it
                // sits on: it is next to the face completing its corner.
                let chirality_face = faces[0].clockwise_neighbor_after(faces[1]);
                if chirality_face == face {
                    1
                } else {
                    cube_size - 2
                }
            }
        }
        PartKind::XCenter => {
            let primary = part.primary_face();
            if primary == face {
                0
            } else if primary == face.opposite() {
                cube_size - 1
            } else if faces.contains(&face) {
                1
            } else {
                cube_size - 2
            }
        }
        PartKind::TCenter => {
            let primary = part.primary_face();
            if primary == face {
                0
            } else if primary == face.opposite() {
                cube_size - 1
            } else if faces[1] == face {
                1
            } else if faces[1] == face.opposite() {
                cube_size - 2
            } else {
                middle
            }
        }
        PartKind::Face => {
            let primary = part.primary_face();
            if primary == face {
                0
            } else if primary == face.opposite() {
                cube_size - 1
            } else {
                middle
            }
        }
    }
}

/// The positions and occupants of an NxN cube, tracked per part.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CubeState {
    cube_size: u32,
    occupants: FxHashMap<Part, Part>,
}

impl CubeState {
    /// A solved cube tracking every moveable part kind that exists on the
    /// given size.
    pub fn solved(cube_size: u32) -> Result<CubeState, MoveError> {
        CubeState::solved_for_kinds(cube_size, &PartKind::MOVEABLE)
    }

    /// A solved cube tracking only the given part kinds; kinds that don't
    /// exist on the size are skipped.
    pub fn solved_for_kinds(cube_size: u32, kinds: &[PartKind]) -> Result<CubeState, MoveError> {
        if cube_size < 2 {
            return Err(UnsupportedCubeSizeError::CubeSizeTooSmall { cube_size }.into());
        }
        let mut occupants = FxHashMap::default();
        for kind in kinds {
            if !kind.exists_on_cube_size(cube_size) {
                continue;
            }
            for part in kind.elements() {
                if part.is_canonical() {
                    occupants.insert(part.clone(), part.clone());
                }
            }
        }
        Ok(CubeState {
            cube_size,
            occupants,
        })
    }

    #[must_use]
    pub fn cube_size(&self) -> u32 {
        self.cube_size
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

impl PuzzleState for CubeState {
    fn apply_move(&mut self, mv: &Move) -> Result<(), MoveError> {
        let decided = mv.decide_meaning(self.cube_size)?;
        let cube_size = self.cube_size;
        match decided {
            Move::Fat(m) => apply_mapping(
                &mut self.occupants,
                &turn_mapping(m.axis_face(), m.direction()),
                |part| layer_index(part, m.axis_face(), cube_size) < m.width(),
            ),
            Move::Slice(m) => apply_mapping(
                &mut self.occupants,
                &turn_mapping(m.axis_face(), m.direction()),
                |part| layer_index(part, m.axis_face(), cube_size) == m.slice_index(),
            ),
            Move::InnerMSlice(m) => apply_mapping(
                &mut self.occupants,
                &turn_mapping(m.axis_face, m.direction),
                |part| layer_index(part, m.axis_face, cube_size) == m.slice_index,
            ),
            Move::FatMSlice(m) => apply_mapping(
                &mut self.occupants,
                &turn_mapping(m.axis_face, m.direction),
                |part| {
                    let layer = layer_index(part, m.axis_face, cube_size);
                    layer >= 1 && layer <= cube_size - 2
                },
            ),
            Move::Rotation(rotation) => {
                apply_mapping(&mut self.occupants, &rotation.mapping(), |_| true);
            }
            Move::Skewb(_) => {
                return Err(UnsupportedCubeSizeError::WrongPuzzle {
                    mv: mv.to_string(),
                }
                .into());
            }
            Move::MaybeFatMaybeSlice(_) | Move::MaybeFatMSlice(_) => {
                unreachable!("decide_meaning resolves size-dependent moves")
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CubeState;
    use crate::{
        cube::{Part, PartKind},
        parser::parse_algorithm,
    };

    fn edge(name: &str) -> Part {
        Part::parse(PartKind::Edge, name).unwrap()
    }

    #[test]
    fn four_quarter_turns_solve() {
        let mut state = CubeState::solved(3).unwrap();
        let alg = parse_algorithm("R R R R").unwrap();
        alg.apply_to(&mut state).unwrap();
        assert!(state.is_solved());
    }

    #[test]
    fn u_moves_the_front_edge_left() {
        let mut state = CubeState::solved(3).unwrap();
        parse_algorithm("U").unwrap().apply_to(&mut state).unwrap();
        assert_eq!(state.occupant(&edge("UL")), Some(edge("UF")));
        assert_eq!(state.occupant(&edge("UB")), Some(edge("UL")));
        assert!(!state.is_solved());
    }

    #[test]
    fn six_sexy_moves_solve() {
        let mut state = CubeState::solved(3).unwrap();
        let sexy = parse_algorithm("R U R' U'").unwrap();
        (&sexy * 6).apply_to(&mut state).unwrap();
        assert!(state.is_solved());
    }

    #[test]
    fn m_slice_has_order_four() {
        let mut state = CubeState::solved(3).unwrap();
        let m = parse_algorithm("M").unwrap();
        (&m * 4).apply_to(&mut state).unwrap();
        assert!(state.is_solved());
        (&m * 2).apply_to(&mut state).unwrap();
        assert!(!state.is_solved());
    }

    #[test]
    fn rotations_permute_every_tracked_part() {
        let mut state = CubeState::solved(5).unwrap();
        let alg = parse_algorithm("x y").unwrap();
        alg.apply_to(&mut state).unwrap();
        assert!(!state.is_solved());
        alg.inverse().apply_to(&mut state).unwrap();
        assert!(state.is_solved());
    }

    #[test]
    fn apply_temporarily_restores_on_success() {
        let mut state = CubeState::solved(3).unwrap();
        let alg = parse_algorithm("R U2 F").unwrap();
        let was_solved = alg
            .apply_temporarily_to(&mut state, |s| s.is_solved())
            .unwrap();
        assert!(!was_solved);
        assert!(state.is_solved());
    }

    #[test]
    fn apply_rolls_back_on_invalid_moves() {
        let mut state = CubeState::solved(3).unwrap();
        let alg = parse_algorithm("R U 3f").unwrap();
        assert!(alg.apply_to(&mut state).is_err());
        assert!(state.is_solved());
    }

    #[test]
    fn wide_moves_take_inner_layers_along() {
        let mut state = CubeState::solved(4).unwrap();
        parse_algorithm("Rw").unwrap().apply_to(&mut state).unwrap();
        // The wing next to the R face moved, the one next to L did not.
        let fu = Part::parse(PartKind::Wing, "FU").unwrap();
        let uf = Part::parse(PartKind::Wing, "UF").unwrap();
        assert_ne!(state.occupant(&fu), Some(fu.clone()));
        assert_eq!(state.occupant(&uf), Some(uf));
    }
}
