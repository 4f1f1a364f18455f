use std::fmt;

use crate::{
    algorithm::Algorithm,
    moves::{Metric, MoveError},
};

/// A commutator-shaped spelling of an algorithm.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Commutator {
    /// `[A, B]`, meaning `A B A' B'`.
    Pure(Algorithm, Algorithm),
    /// `[S : C]`, meaning `S C S'` for an inner commutator `C`.
    Setup(Algorithm, Box<Commutator>),
    /// An algorithm used like a commutator without being one.
    Fake(Algorithm),
}

impl Commutator {
    /// Expands the commutator into the move sequence it denotes.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Commutator::Pure(first, second) => {
                &(&(first + second) + &first.inverse()) + &second.inverse()
            }
            Commutator::Setup(setup, inner) => {
                &(setup + &inner.algorithm()) + &setup.inverse()
            }
            Commutator::Fake(algorithm) => algorithm.clone(),
        }
    }

    #[must_use]
    pub fn inverse(&self) -> Commutator {
        match self {
            Commutator::Pure(first, second) => Commutator::Pure(second.clone(), first.clone()),
            Commutator::Setup(setup, inner) => {
                Commutator::Setup(setup.clone(), Box::new(inner.inverse()))
            }
            Commutator::Fake(algorithm) => Commutator::Fake(algorithm.inverse()),
        }
    }

    /// How many `metric` units cancel between this commutator's algorithm
    /// and `other`'s.
    pub fn cancellations(
        &self,
        other: &Commutator,
        cube_size: u32,
        metric: Metric,
    ) -> Result<u32, MoveError> {
        self.algorithm()
            .cancellations(&other.algorithm(), cube_size, metric)
    }
}

impl fmt::Display for Commutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Commutator::Pure(first, second) => write!(f, "[{first}, {second}]"),
            Commutator::Setup(setup, inner) => write!(f, "[{setup} : {inner}]"),
            Commutator::Fake(algorithm) => write!(f, "{algorithm}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{parse_algorithm, parse_commutator};

    #[test]
    fn pure_commutator_expands() {
        let commutator = parse_commutator("[R U R', D]").unwrap();
        let expected = parse_algorithm("R U R' D R U' R' D'").unwrap();
        assert_eq!(commutator.algorithm(), expected);
    }

    #[test]
    fn setup_commutator_expands() {
        let commutator = parse_commutator("[F : [R, U]]").unwrap();
        let expected = parse_algorithm("F R U R' U' F'").unwrap();
        assert_eq!(commutator.algorithm(), expected);
    }

    #[test]
    fn inverse_of_pure_swaps_halves() {
        let commutator = parse_commutator("[R, U]").unwrap();
        assert_eq!(commutator.inverse().to_string(), "[U, R]");
        let both = &commutator.algorithm() + &commutator.inverse().algorithm();
        assert!(both.cancelled(3).unwrap().is_empty());
    }
}
