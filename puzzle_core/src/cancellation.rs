//! Incremental, metric-driven simplification of move sequences.

use std::{collections::HashMap, sync::LazyLock};

use log::trace;

use crate::{
    algorithm::Algorithm,
    cube::{FaceMapping, IDENTITY_MAPPING, compose_mappings},
    moves::{Metric, Move, MoveError, Rotation},
};

/// Cancels the algorithm as much as possible by replaying it through
/// [`push_with_cancellation`] from the empty algorithm.
pub(crate) fn cancel(algorithm: &Algorithm, cube_size: u32) -> Result<Algorithm, MoveError> {
    let mut result = Algorithm::empty();
    for mv in algorithm.moves() {
        result = push_with_cancellation(&result, mv, cube_size)?;
    }
    Ok(result)
}

/// Bubbles the move at `index` to the end of the sequence, swapping it past
/// each later move. `None` when some adjacent pair cannot swap.
fn swap_to_end(moves: &[Move], index: usize) -> Option<Vec<Move>> {
    let mut new_moves = moves.to_vec();
    for current_index in index..moves.len() - 1 {
        let obstacle_index = current_index + 1;
        let (swapped_first, swapped_second) =
            new_moves[current_index].swap(&new_moves[obstacle_index])?;
        new_moves[current_index] = swapped_first;
        new_moves[obstacle_index] = swapped_second;
    }
    Some(new_moves)
}

/// Variants of the sequence in which progressively earlier moves have been
/// commuted into the last position, so the incoming move can try to merge
/// with each of them.
fn cancel_variants(moves: &[Move]) -> Vec<Vec<Move>> {
    let mut variants = Vec::new();
    for index in (0..moves.len()).rev() {
        match swap_to_end(moves, index) {
            Some(variant) => variants.push(variant),
            None => break,
        }
    }
    debug_assert!(!variants.is_empty());
    variants
}

pub(crate) fn num_tail_rotations(moves: &[Move]) -> usize {
    moves
        .iter()
        .rev()
        .take_while(|m| matches!(m, Move::Rotation(_)))
        .count()
}

fn alg_plus_cancelled_move(
    moves: &[Move],
    mv: &Move,
    cube_size: u32,
) -> Result<Algorithm, MoveError> {
    let tail = num_tail_rotations(moves);
    if matches!(mv, Move::Rotation(_)) && tail >= 2 {
        // A rotation tail plus another rotation collapses through the
        // orientation table instead of pairwise merging.
        let head = Algorithm::from_moves(moves[..moves.len() - tail].iter().cloned());
        let mut tail_moves: Vec<Move> = moves[moves.len() - tail..].to_vec();
        tail_moves.push(mv.clone());
        let collapsed = cancelled_rotations(&tail_moves)
            .cloned()
            .unwrap_or_else(|| Algorithm::from_moves(tail_moves));
        Ok(&head + &collapsed)
    } else {
        let last = moves.len() - 1;
        let head = Algorithm::from_moves(moves[..last].iter().cloned());
        let joined = moves[last].join_with_cancellation(mv, cube_size)?;
        Ok(&head + &joined)
    }
}

/// Appends `mv` to the algorithm, merging it with whichever earlier move
/// yields the cheapest result.
fn push_with_cancellation(
    algorithm: &Algorithm,
    mv: &Move,
    cube_size: u32,
) -> Result<Algorithm, MoveError> {
    if algorithm.is_empty() {
        return Ok(Algorithm::from_move(mv.clone()));
    }
    let mut best: Option<((u32, u32, usize), Algorithm)> = None;
    for variant in cancel_variants(algorithm.moves()) {
        let candidate = alg_plus_cancelled_move(&variant, mv, cube_size)?;
        // QTM is the most sensitive metric, so it dominates. HTM breaks
        // ties so that something like R R still merges into R2, and the
        // length breaks remaining ties so rotations get cancelled even when
        // they don't change the move count.
        let score = (
            candidate.move_count(cube_size, Metric::Qtm)?,
            candidate.move_count(cube_size, Metric::Htm)?,
            candidate.len(),
        );
        trace!("candidate {candidate} scores {score:?}");
        if best.as_ref().is_none_or(|(best_score, _)| score < *best_score) {
            best = Some((score, candidate));
        }
    }
    Ok(best.expect("the unswapped variant always exists").1)
}

/// The net face mapping of a sequence of rotations.
pub(crate) fn rotated_center_state(moves: &[Move]) -> FaceMapping {
    moves.iter().fold(IDENTITY_MAPPING, |state, mv| match mv {
        Move::Rotation(rotation) => compose_mappings(&state, &rotation.mapping()),
        _ => state,
    })
}

/// Every reachable orientation of the six faces, mapped to a minimal
/// algorithm of rotations producing it. Built once; 24 entries.
static ROTATION_SEQUENCES: LazyLock<HashMap<FaceMapping, Algorithm>> = LazyLock::new(|| {
    let mut sequences: HashMap<FaceMapping, Algorithm> = HashMap::new();
    let mut insert = |alg: Algorithm| {
        let state = rotated_center_state(alg.moves());
        sequences.entry(state).or_insert(alg);
    };
    insert(Algorithm::empty());
    for rotation in Rotation::non_zero_rotations() {
        insert(Algorithm::from_move(Move::Rotation(rotation)));
    }
    for left in Rotation::non_zero_rotations() {
        for right in Rotation::non_zero_rotations() {
            if right.direction().is_double() || right.axis_face().same_axis(left.axis_face()) {
                continue;
            }
            insert(Algorithm::from_moves([
                Move::Rotation(left),
                Move::Rotation(right),
            ]));
        }
    }
    sequences
});

/// The minimal rotation algorithm equivalent to the given rotations.
pub(crate) fn cancelled_rotations(rotations: &[Move]) -> Option<&'static Algorithm> {
    ROTATION_SEQUENCES.get(&rotated_center_state(rotations))
}

/// The minimal rotation algorithm producing the given orientation.
pub(crate) fn orientation_algorithm(mapping: &FaceMapping) -> Option<&'static Algorithm> {
    ROTATION_SEQUENCES.get(mapping)
}

#[cfg(test)]
mod tests {
    use super::ROTATION_SEQUENCES;
    use crate::parser::parse_algorithm;

    fn cancelled(alg: &str, cube_size: u32) -> String {
        parse_algorithm(alg)
            .unwrap()
            .cancelled(cube_size)
            .unwrap()
            .to_string()
    }

    #[test]
    fn inverse_pairs_cancel() {
        assert_eq!(cancelled("R R'", 3), "");
        assert_eq!(cancelled("R U U' R'", 3), "");
        let alg = parse_algorithm("R U2 Lw' M").unwrap();
        assert!((&alg + &alg.inverse()).cancelled(4).unwrap().is_empty());
    }

    #[test]
    fn doubles_merge() {
        assert_eq!(cancelled("R R", 3), "R2");
        assert_eq!(cancelled("R2 R", 3), "R'");
        assert_eq!(cancelled("U2 U2", 3), "");
    }

    #[test]
    fn no_over_cancellation() {
        assert_eq!(cancelled("R U R U'", 3), "R U R U'");
    }

    #[test]
    fn commuting_moves_swap_before_cancelling() {
        assert_eq!(cancelled("U D U'", 3), "D");
        assert_eq!(cancelled("R L R'", 3), "L");
    }

    #[test]
    fn rotations_collapse() {
        assert_eq!(cancelled("x x", 3), "x2");
        assert_eq!(cancelled("y y'", 3), "");
        // Three rotations always reduce to at most two.
        let alg = parse_algorithm("x y x").unwrap();
        assert!(alg.cancelled(3).unwrap().len() <= 2);
    }

    #[test]
    fn fat_blocks_merge_with_rotations() {
        assert_eq!(cancelled("Rw x'", 3), "L");
        assert_eq!(cancelled("R Lw", 3), "R2 x'");
    }

    #[test]
    fn slices_extend_and_shrink_fat_blocks() {
        // R then the adjacent slice in the same direction widens the block;
        // the inverse slice peels a layer off a wide block.
        assert_eq!(cancelled("R r", 4), "Rw");
        assert_eq!(cancelled("Rw r'", 4), "R");
    }

    #[test]
    fn cancellation_is_idempotent() {
        for alg in ["R U R' U'", "R R U2 U2", "Rw x' M M", "U D U' D'"] {
            let once = parse_algorithm(alg).unwrap().cancelled(3).unwrap();
            assert_eq!(once.cancelled(3).unwrap(), once);
        }
    }

    #[test]
    fn orientation_table_covers_all_24_orientations() {
        assert_eq!(ROTATION_SEQUENCES.len(), 24);
    }
}
