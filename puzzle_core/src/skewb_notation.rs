use std::sync::LazyLock;

use fxhash::FxHashMap;
use itertools::Itertools;
use thiserror::Error;

use crate::{
    algorithm::Algorithm,
    cancellation,
    cube::{Part, PartKind, corner_turn_mapping},
    direction::SkewbDirection,
    moves::{Move, SkewbMove},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkewbNotationError {
    #[error("the notation move {0:?} does not map to a corner")]
    NotACorner(String),
    #[error("duplicate move {0:?} in notation")]
    DuplicateMove(String),
    #[error("turns around corner {0} cannot be represented in this notation")]
    UnreachableCorner(Part),
    #[error("the move {0} cannot be written in this notation")]
    UnrepresentableMove(String),
}

/// One notation for Skewb moves: a mapping from move letters to the corners
/// they turn around. Corners missing from the table are rendered through
/// their diagonal opposite plus a rotation.
#[derive(Clone, Debug)]
pub struct SkewbNotation {
    name: String,
    move_corner_pairs: Vec<(String, Part)>,
    corner_to_move: FxHashMap<Part, String>,
}

impl SkewbNotation {
    pub fn new(
        name: impl Into<String>,
        move_corner_pairs: Vec<(String, Part)>,
    ) -> Result<SkewbNotation, SkewbNotationError> {
        let mut corner_to_move = FxHashMap::default();
        for (move_string, corner) in &move_corner_pairs {
            if corner.kind() != PartKind::Corner {
                return Err(SkewbNotationError::NotACorner(move_string.clone()));
            }
            if move_corner_pairs
                .iter()
                .filter(|(other, _)| other == move_string)
                .count()
                > 1
            {
                return Err(SkewbNotationError::DuplicateMove(move_string.clone()));
            }
            for rotation in corner.rotations() {
                corner_to_move.insert(rotation, move_string.clone());
            }
        }
        let notation = SkewbNotation {
            name: name.into(),
            move_corner_pairs,
            corner_to_move,
        };
        for corner in PartKind::Corner.elements() {
            if !corner.is_canonical() {
                continue;
            }
            if notation.corner_to_move.contains_key(corner)
                || notation
                    .corner_to_move
                    .contains_key(&diagonal_opposite(corner))
            {
                continue;
            }
            return Err(SkewbNotationError::UnreachableCorner(corner.clone()));
        }
        Ok(notation)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The corner a move letter turns around.
    #[must_use]
    pub fn corner(&self, move_string: &str) -> Option<&Part> {
        self.move_corner_pairs
            .iter()
            .find(|(string, _)| string == move_string)
            .map(|(_, corner)| corner)
    }

    /// Every nonzero move this notation can write directly.
    #[must_use]
    pub fn non_zero_moves(&self) -> Vec<Move> {
        self.move_corner_pairs
            .iter()
            .cartesian_product(SkewbDirection::NON_ZERO)
            .map(|((_, corner), direction)| {
                Move::Skewb(
                    SkewbMove::new(corner.clone(), direction).expect("notation corners are corners"),
                )
            })
            .collect()
    }

    /// Renders an algorithm of Skewb moves and rotations in this notation.
    /// Turns around corners the notation cannot name directly are written
    /// through their diagonal opposite; the compensating rotations are
    /// pushed to the end of the string and cancelled there.
    pub fn algorithm_to_string(&self, algorithm: &Algorithm) -> Result<String, SkewbNotationError> {
        let moves = algorithm.moves();
        let tail_start = moves.len() - cancellation::num_tail_rotations(moves);
        let mut reversed_rotations: Vec<Move> = Vec::new();
        let mut rendered = Vec::new();
        for mv in &moves[..tail_start] {
            rendered.push(self.move_to_string(mv, &mut reversed_rotations)?);
        }
        let mut new_tail: Vec<Move> = reversed_rotations.into_iter().rev().collect();
        new_tail.extend(moves[tail_start..].iter().cloned());
        let cancelled_tail = Algorithm::from_moves(new_tail)
            .cancelled(3)
            .expect("rotations cancel on any cube size");
        let body = rendered.iter().join(" ");
        if cancelled_tail.is_empty() {
            Ok(body)
        } else if body.is_empty() {
            Ok(cancelled_tail.to_string())
        } else {
            Ok(format!("{body} {cancelled_tail}"))
        }
    }

    fn move_to_string(
        &self,
        mv: &Move,
        reversed_rotations: &mut Vec<Move>,
    ) -> Result<String, SkewbNotationError> {
        let mut mv = mv.clone();
        for rotation in reversed_rotations.iter() {
            let Move::Rotation(rotation) = rotation else {
                unreachable!("only rotations are accumulated")
            };
            mv = mv.rotate_by(&rotation.inverse());
        }
        match mv {
            Move::Skewb(skewb_move) => Ok(self.skewb_move_to_string(&skewb_move, reversed_rotations)),
            Move::Rotation(_) => Ok(mv.to_string()),
            other => Err(SkewbNotationError::UnrepresentableMove(other.to_string())),
        }
    }

    fn skewb_move_to_string(
        &self,
        skewb_move: &SkewbMove,
        reversed_rotations: &mut Vec<Move>,
    ) -> String {
        if let Some(move_string) = self.corner_to_move.get(skewb_move.axis_corner()) {
            return format!("{move_string}{}", skewb_move.direction().name());
        }
        let opposite = diagonal_opposite(skewb_move.axis_corner());
        let move_string = self
            .corner_to_move
            .get(&opposite)
            .expect("coverage was checked at construction");
        if !skewb_move.direction().is_zero() {
            // Turning around a corner equals turning around its diagonal
            // opposite followed by a whole-puzzle rotation.
            let mapping = corner_turn_mapping(skewb_move.axis_corner(), skewb_move.direction());
            let rotations = cancellation::orientation_algorithm(&mapping)
                .expect("corner rotations are reachable orientations");
            reversed_rotations.extend(rotations.moves().iter().rev().cloned());
        }
        format!("{move_string}{}", skewb_move.direction().name())
    }
}

/// The corner diagonally across the puzzle.
#[must_use]
pub fn diagonal_opposite(corner: &Part) -> Part {
    let faces = corner.faces().iter().map(|face| face.opposite()).collect();
    Part::corner_like_lenient(PartKind::Corner, faces)
        .expect("opposites of a corner's faces span three axes")
}

fn notation_corner(name: &str) -> Part {
    Part::parse(PartKind::Corner, name).expect("notation corner names are valid")
}

/// Fixed-corner notation: all moves keep the DBL corner in place.
pub static FIXED_CORNER: LazyLock<SkewbNotation> = LazyLock::new(|| {
    SkewbNotation::new(
        "fixed corner",
        vec![
            ("U".to_owned(), notation_corner("ULB")),
            ("R".to_owned(), notation_corner("DRB")),
            ("L".to_owned(), notation_corner("DFL")),
            ("B".to_owned(), notation_corner("DBL")),
        ],
    )
    .expect("the fixed corner notation is well formed")
});

/// Sarah's notation: the four corners around U.
pub static SARAH: LazyLock<SkewbNotation> = LazyLock::new(|| {
    SkewbNotation::new(
        "sarah",
        vec![
            ("F".to_owned(), notation_corner("URF")),
            ("R".to_owned(), notation_corner("UBR")),
            ("B".to_owned(), notation_corner("ULB")),
            ("L".to_owned(), notation_corner("UFL")),
        ],
    )
    .expect("sarah's notation is well formed")
});

/// Rubik's notation: all eight corners named directly.
pub static RUBIKS: LazyLock<SkewbNotation> = LazyLock::new(|| {
    SkewbNotation::new(
        "rubiks",
        vec![
            ("F".to_owned(), notation_corner("URF")),
            ("R".to_owned(), notation_corner("UBR")),
            ("B".to_owned(), notation_corner("ULB")),
            ("L".to_owned(), notation_corner("UFL")),
            ("f".to_owned(), notation_corner("DFR")),
            ("r".to_owned(), notation_corner("DRB")),
            ("b".to_owned(), notation_corner("DBL")),
            ("l".to_owned(), notation_corner("DLF")),
        ],
    )
    .expect("the rubiks notation is well formed")
});

#[cfg(test)]
mod tests {
    use super::{FIXED_CORNER, RUBIKS, SARAH, diagonal_opposite};
    use crate::{
        cube::{Part, PartKind},
        cube_state::PuzzleState,
        parser::parse_skewb_algorithm,
        skewb_state::SkewbState,
    };

    #[test]
    fn diagonal_opposites() {
        let urf = Part::parse(PartKind::Corner, "URF").unwrap();
        let opposite = diagonal_opposite(&urf);
        assert!(opposite.turned_equals(&Part::parse(PartKind::Corner, "DBL").unwrap()));
        assert!(diagonal_opposite(&opposite).turned_equals(&urf));
    }

    #[test]
    fn parses_each_notation() {
        assert_eq!(parse_skewb_algorithm("U R' L B2", &FIXED_CORNER).unwrap().len(), 4);
        assert_eq!(parse_skewb_algorithm("F R B' L", &SARAH).unwrap().len(), 4);
        assert_eq!(parse_skewb_algorithm("f r b l'", &RUBIKS).unwrap().len(), 4);
        assert!(parse_skewb_algorithm("f", &SARAH).is_err());
    }

    #[test]
    fn representable_moves_round_trip() {
        for text in ["F R' B L", "F2 R", "B' L2"] {
            let alg = parse_skewb_algorithm(text, &SARAH).unwrap();
            let rendered = SARAH.algorithm_to_string(&alg).unwrap();
            let reparsed = parse_skewb_algorithm(&rendered, &SARAH).unwrap();
            assert_eq!(alg, reparsed, "{text} rendered as {rendered}");
        }
    }

    #[test]
    fn unrepresentable_corners_render_equivalently() {
        // The rubiks f move turns a corner sarah's notation cannot name;
        // the rendered string must still have the same effect.
        let alg = parse_skewb_algorithm("f R f'", &RUBIKS).unwrap();
        let rendered = SARAH.algorithm_to_string(&alg).unwrap();
        let reparsed = parse_skewb_algorithm(&rendered, &SARAH).unwrap();

        let mut direct = SkewbState::solved();
        alg.apply_to(&mut direct).unwrap();
        let mut via_notation = SkewbState::solved();
        reparsed.apply_to(&mut via_notation).unwrap();
        assert_eq!(direct, via_notation);
    }
}
