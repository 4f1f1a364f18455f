use std::{
    fmt,
    ops::{Add, Mul},
};

use itertools::Itertools;

use crate::{
    cancellation,
    cube::Face,
    cube_state::PuzzleState,
    moves::{Metric, Move, MoveError, Rotation},
};

/// An immutable, ordered sequence of moves.
///
/// Concatenation never cancels implicitly; [`Algorithm::cancelled`] is the
/// explicit operation that produces the minimal-cost equivalent form, so
/// both the raw and the canonical spelling of a sequence stay observable.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Algorithm {
    moves: Vec<Move>,
}

impl Algorithm {
    #[must_use]
    pub fn empty() -> Algorithm {
        Algorithm { moves: Vec::new() }
    }

    #[must_use]
    pub fn from_move(mv: Move) -> Algorithm {
        Algorithm { moves: vec![mv] }
    }

    pub fn from_moves(moves: impl IntoIterator<Item = Move>) -> Algorithm {
        Algorithm {
            moves: moves.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The algorithm undoing this one: reversed order, every move inverted.
    #[must_use]
    pub fn inverse(&self) -> Algorithm {
        Algorithm {
            moves: self.moves.iter().rev().map(Move::inverse).collect(),
        }
    }

    /// Re-expresses the algorithm in the frame reached by doing `rotation`
    /// first, e.g. rotating `R U` by `y` gives `F U`.
    #[must_use]
    pub fn rotate_by(&self, rotation: &Rotation) -> Algorithm {
        if rotation.direction().is_zero() {
            return self.clone();
        }
        Algorithm {
            moves: self.moves.iter().map(|m| m.rotate_by(rotation)).collect(),
        }
    }

    /// Mirrors the algorithm with `normal_face` as the mirror normal, e.g.
    /// mirroring `R U F` along `R` gives `L U' F'`.
    #[must_use]
    pub fn mirror(&self, normal_face: Face) -> Algorithm {
        Algorithm {
            moves: self.moves.iter().map(|m| m.mirror(normal_face)).collect(),
        }
    }

    /// The total cost under `metric`. The cube size decides what lowercase
    /// and M-slice moves mean, so it is needed for counting.
    pub fn move_count(&self, cube_size: u32, metric: Metric) -> Result<u32, MoveError> {
        self.moves
            .iter()
            .map(|m| m.move_count(cube_size, metric))
            .sum()
    }

    /// The minimal-cost equivalent form of this algorithm, built by
    /// replaying it through the incremental cancellation engine.
    pub fn cancelled(&self, cube_size: u32) -> Result<Algorithm, MoveError> {
        cancellation::cancel(self, cube_size)
    }

    /// How many `metric` units disappear when `other` is appended to this
    /// algorithm, compared to cancelling the two separately.
    pub fn cancellations(
        &self,
        other: &Algorithm,
        cube_size: u32,
        metric: Metric,
    ) -> Result<u32, MoveError> {
        let cancelled = self.cancelled(cube_size)?;
        let other_cancelled = other.cancelled(cube_size)?;
        let together_cancelled = (self + other).cancelled(cube_size)?;
        Ok(cancelled.move_count(cube_size, metric)?
            + other_cancelled.move_count(cube_size, metric)?
            - together_cancelled.move_count(cube_size, metric)?)
    }

    /// Applies the algorithm to a puzzle state. If a move turns out to be
    /// invalid for the state, everything applied so far is undone before
    /// the error is returned.
    pub fn apply_to<S: PuzzleState>(&self, state: &mut S) -> Result<(), MoveError> {
        for (index, mv) in self.moves.iter().enumerate() {
            if let Err(error) = state.apply_move(mv) {
                for applied in self.moves[..index].iter().rev() {
                    state
                        .apply_move(&applied.inverse())
                        .expect("undoing an applied move cannot fail");
                }
                return Err(error);
            }
        }
        Ok(())
    }

    /// Applies the algorithm, runs `f` on the modified state and restores
    /// the state via the inverse before returning, on every exit path.
    pub fn apply_temporarily_to<S: PuzzleState, R>(
        &self,
        state: &mut S,
        f: impl FnOnce(&mut S) -> R,
    ) -> Result<R, MoveError> {
        self.apply_to(state)?;
        let guard = RestoreGuard {
            state,
            inverse: self.inverse(),
        };
        Ok(f(&mut *guard.state))
    }
}

struct RestoreGuard<'a, S: PuzzleState> {
    state: &'a mut S,
    inverse: Algorithm,
}

impl<S: PuzzleState> Drop for RestoreGuard<'_, S> {
    fn drop(&mut self) {
        self.inverse
            .apply_to(self.state)
            .expect("the inverse of an applied algorithm applies cleanly");
    }
}

impl Add for &Algorithm {
    type Output = Algorithm;

    fn add(self, rhs: &Algorithm) -> Algorithm {
        Algorithm {
            moves: self.moves.iter().chain(rhs.moves.iter()).cloned().collect(),
        }
    }
}

impl Add for Algorithm {
    type Output = Algorithm;

    fn add(self, rhs: Algorithm) -> Algorithm {
        &self + &rhs
    }
}

impl Mul<u32> for &Algorithm {
    type Output = Algorithm;

    fn mul(self, times: u32) -> Algorithm {
        Algorithm {
            moves: (0..times)
                .flat_map(|_| self.moves.iter().cloned())
                .collect(),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.moves.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::Algorithm;
    use crate::parser::parse_algorithm;

    #[test]
    fn inverse_is_involutive() {
        let alg = parse_algorithm("R U R' D Rw2 M'").unwrap();
        assert_eq!(alg.inverse().inverse(), alg);
    }

    #[test]
    fn inverse_reverses_and_inverts() {
        let alg = parse_algorithm("R U").unwrap();
        assert_eq!(alg.inverse().to_string(), "U' R'");
    }

    #[test]
    fn concatenation_and_repetition() {
        let left = parse_algorithm("R U").unwrap();
        let right = parse_algorithm("R'").unwrap();
        assert_eq!((&left + &right).to_string(), "R U R'");
        assert_eq!((&left * 3).len(), 6);
        assert_eq!(&left + &Algorithm::empty(), left);
    }

    #[test]
    fn no_implicit_cancellation_on_concat() {
        let alg = parse_algorithm("R").unwrap();
        let doubled = &alg + &alg.inverse();
        assert_eq!(doubled.len(), 2);
    }

    #[test]
    fn mirror_is_involutive() {
        let alg = parse_algorithm("R U F' Lw2").unwrap();
        assert_eq!(alg.mirror(crate::Face::R).mirror(crate::Face::R), alg);
    }

    #[test]
    fn rotate_round_trip() {
        let alg = parse_algorithm("R U R' U'").unwrap();
        let rotation = crate::Rotation::new(crate::Face::U, crate::CubeDirection::FORWARD);
        assert_eq!(alg.rotate_by(&rotation).rotate_by(&rotation.inverse()), alg);
    }
}
