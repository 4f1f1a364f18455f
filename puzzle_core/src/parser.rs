use pest::{
    Parser,
    error::{Error, ErrorVariant},
    iterators::Pair,
};
use pest_derive::Parser;
use thiserror::Error as ThisError;

use crate::{
    algorithm::Algorithm,
    commutator::Commutator,
    cube::Face,
    direction::{CubeDirection, SkewbDirection},
    moves::{
        FatMove, MaybeFatMSliceMove, MaybeFatMaybeSliceMove, Move, Rotation, SkewbMove, SliceMove,
    },
    skewb_notation::SkewbNotation,
};

#[derive(Parser)]
#[grammar = "./alg.pest"]
struct AlgParser;

/// A failed parse, carrying the offending position and what was expected
/// there.
#[derive(ThisError, Debug)]
#[error("{inner}")]
pub struct ParseError {
    inner: Box<Error<Rule>>,
}

impl ParseError {
    /// The (1-based) line and column of the failure.
    #[must_use]
    pub fn line_col(&self) -> (usize, usize) {
        match self.inner.line_col {
            pest::error::LineColLocation::Pos(pos) => pos,
            pest::error::LineColLocation::Span(start, _) => start,
        }
    }
}

impl From<Error<Rule>> for ParseError {
    fn from(inner: Error<Rule>) -> ParseError {
        ParseError {
            inner: Box::new(inner),
        }
    }
}

fn custom_error(message: impl Into<String>, span: pest::Span<'_>) -> ParseError {
    Error::new_from_span(
        ErrorVariant::CustomError {
            message: message.into(),
        },
        span,
    )
    .into()
}

fn cube_direction(suffix: &str) -> CubeDirection {
    match suffix {
        "" => CubeDirection::FORWARD,
        "2" | "2'" => CubeDirection::DOUBLE,
        "'" | "3" => CubeDirection::BACKWARD,
        _ => unreachable!("the grammar only produces known direction suffixes"),
    }
}

fn skewb_direction(suffix: &str) -> SkewbDirection {
    match suffix {
        "" | "2'" => SkewbDirection::FORWARD,
        "'" | "2" => SkewbDirection::BACKWARD,
        _ => unreachable!("the grammar only produces known direction suffixes"),
    }
}

/// Splits a move token into its leading digits, the letter body and the
/// direction suffix.
fn split_token(token: &str) -> (&str, &str, &str) {
    let digit_end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    let (digits, rest) = token.split_at(digit_end);
    let letter_end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (letters, suffix) = rest.split_at(letter_end);
    (digits, letters, suffix)
}

fn face_for_letter(letter: char) -> Face {
    Face::parse(letter).expect("the grammar only produces face letters")
}

fn decode_cube_move(pair: &Pair<'_, Rule>) -> Result<Move, ParseError> {
    let inner = pair
        .clone()
        .into_inner()
        .next()
        .expect("a cube move wraps one concrete move rule");
    let token = inner.as_str();
    let (digits, letters, suffix) = split_token(token);
    let direction = cube_direction(suffix);
    match inner.as_rule() {
        Rule::rotation_move => {
            let axis_face = match letters.chars().next() {
                Some('y') => Face::U,
                Some('z') => Face::F,
                Some('x') => Face::R,
                _ => unreachable!("the grammar only produces axis letters"),
            };
            Ok(Move::Rotation(Rotation::new(axis_face, direction)))
        }
        Rule::fat_move => {
            let width = if digits.is_empty() {
                2
            } else {
                digits
                    .parse::<u32>()
                    .map_err(|_| custom_error("fat move width is out of range", inner.as_span()))?
            };
            let axis_face = face_for_letter(letters.chars().next().expect("one letter"));
            FatMove::new(axis_face, direction, width)
                .map(Move::Fat)
                .map_err(|e| custom_error(e.to_string(), inner.as_span()))
        }
        Rule::plain_move => {
            let axis_face = face_for_letter(letters.chars().next().expect("one letter"));
            Ok(Move::Fat(FatMove::outer(axis_face, direction)))
        }
        Rule::slice_move => {
            let slice_index = digits
                .parse::<u32>()
                .map_err(|_| custom_error("slice index is out of range", inner.as_span()))?;
            let axis_face = face_for_letter(letters.chars().next().expect("one letter"));
            SliceMove::new(axis_face, direction, slice_index)
                .map(Move::Slice)
                .map_err(|e| custom_error(e.to_string(), inner.as_span()))
        }
        Rule::maybe_fat_slice_move => {
            let axis_face = face_for_letter(letters.chars().next().expect("one letter"));
            Ok(Move::MaybeFatMaybeSlice(MaybeFatMaybeSliceMove {
                axis_face,
                direction,
            }))
        }
        Rule::mslice_move => {
            // E follows D, S follows F, M follows L.
            let axis_face = match letters.chars().next() {
                Some('E') => Face::D,
                Some('S') => Face::F,
                Some('M') => Face::L,
                _ => unreachable!("the grammar only produces M slice letters"),
            };
            Ok(Move::MaybeFatMSlice(MaybeFatMSliceMove {
                axis_face,
                direction,
            }))
        }
        rule => unreachable!("{rule:?} is not a cube move"),
    }
}

fn build_moves_with_triggers(pair: Pair<'_, Rule>) -> Result<Algorithm, ParseError> {
    let mut algorithm = Algorithm::empty();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::cube_move => {
                algorithm = algorithm + Algorithm::from_move(decode_cube_move(&inner)?);
            }
            Rule::trigger => {
                algorithm = algorithm + build_trigger(inner)?;
            }
            rule => unreachable!("{rule:?} inside a move sequence"),
        }
    }
    Ok(algorithm)
}

fn build_trigger(pair: Pair<'_, Rule>) -> Result<Algorithm, ParseError> {
    let mut moves = Algorithm::empty();
    let mut times = 1;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::moves_with_triggers => moves = build_moves_with_triggers(inner)?,
            Rule::multiplier => {
                let digits = inner.as_str().trim_start_matches('*');
                times = digits.parse::<u32>().map_err(|_| {
                    custom_error("trigger multiplier is out of range", inner.as_span())
                })?;
            }
            rule => unreachable!("{rule:?} inside a trigger"),
        }
    }
    Ok(&moves * times)
}

fn build_nonempty_moves(pair: Pair<'_, Rule>) -> Result<Algorithm, ParseError> {
    let mut algorithm = Algorithm::empty();
    for inner in pair.into_inner() {
        algorithm = algorithm + Algorithm::from_move(decode_cube_move(&inner)?);
    }
    Ok(algorithm)
}

fn build_commutator(pair: Pair<'_, Rule>) -> Result<Commutator, ParseError> {
    match pair.as_rule() {
        Rule::pure_commutator => {
            let mut halves = pair.into_inner();
            let first = build_nonempty_moves(halves.next().expect("first half"))?;
            let second = build_nonempty_moves(halves.next().expect("second half"))?;
            Ok(Commutator::Pure(first, second))
        }
        Rule::setup_commutator => {
            let mut parts = pair.into_inner();
            let setup = build_nonempty_moves(parts.next().expect("setup moves"))?;
            let inner_pair = parts
                .next()
                .expect("inner commutator")
                .into_inner()
                .next()
                .expect("setup inner wraps its content");
            let inner = match inner_pair.as_rule() {
                Rule::pure_commutator => build_commutator(inner_pair)?,
                Rule::moves_with_triggers => Commutator::Fake(build_moves_with_triggers(inner_pair)?),
                rule => unreachable!("{rule:?} inside a setup commutator"),
            };
            Ok(Commutator::Setup(setup, Box::new(inner)))
        }
        Rule::fake_commutator => {
            let moves = pair
                .into_inner()
                .next()
                .expect("a fake commutator wraps a move sequence");
            Ok(Commutator::Fake(build_moves_with_triggers(moves)?))
        }
        rule => unreachable!("{rule:?} is not a commutator"),
    }
}

/// Parses an algorithm in cube notation, requiring the whole input to be
/// consumed.
pub fn parse_algorithm(text: &str) -> Result<Algorithm, ParseError> {
    let parsed = AlgParser::parse(Rule::cube_algorithm, text)?
        .next()
        .expect("a successful parse yields the entry rule");
    let moves = parsed
        .into_inner()
        .next()
        .expect("the algorithm rule wraps a move sequence");
    build_moves_with_triggers(moves)
}

/// Parses a commutator (pure, setup or fake) in cube notation.
pub fn parse_commutator(text: &str) -> Result<Commutator, ParseError> {
    let parsed = AlgParser::parse(Rule::commutator, text)?
        .next()
        .expect("a successful parse yields the entry rule");
    let inner = parsed
        .into_inner()
        .next()
        .expect("the commutator rule wraps its variant");
    build_commutator(inner)
}

/// Parses a Skewb algorithm, resolving move letters through the given
/// notation.
pub fn parse_skewb_algorithm(
    text: &str,
    notation: &SkewbNotation,
) -> Result<Algorithm, ParseError> {
    let parsed = AlgParser::parse(Rule::skewb_algorithm, text)?
        .next()
        .expect("a successful parse yields the entry rule");
    let mut moves = Vec::new();
    for pair in parsed.into_inner() {
        match pair.as_rule() {
            Rule::rotation_move => {
                moves.push(decode_rotation(pair.as_str()));
            }
            Rule::skewb_move => {
                let token = pair.as_str();
                let (_, letters, suffix) = split_token(token);
                let direction = skewb_direction(suffix);
                let corner = notation.corner(letters).ok_or_else(|| {
                    custom_error(
                        format!(
                            "{letters:?} is not a move of the {} notation",
                            notation.name()
                        ),
                        pair.as_span(),
                    )
                })?;
                moves.push(Move::Skewb(
                    SkewbMove::new(corner.clone(), direction)
                        .expect("notations only map to corners"),
                ));
            }
            Rule::EOI => {}
            rule => unreachable!("{rule:?} inside a Skewb algorithm"),
        }
    }
    Ok(Algorithm::from_moves(moves))
}

fn decode_rotation(token: &str) -> Move {
    let (_, letters, suffix) = split_token(token);
    let axis_face = match letters.chars().next() {
        Some('y') => Face::U,
        Some('z') => Face::F,
        Some('x') => Face::R,
        _ => unreachable!("the grammar only produces axis letters"),
    };
    Move::Rotation(Rotation::new(axis_face, cube_direction(suffix)))
}

#[cfg(test)]
mod tests {
    use super::{parse_algorithm, parse_commutator};
    use crate::{
        cube::Face,
        direction::CubeDirection,
        moves::{FatMove, Move},
    };

    #[test]
    fn parses_plain_moves() {
        let alg = parse_algorithm("R U2 F' D2").unwrap();
        assert_eq!(alg.len(), 4);
        assert_eq!(
            alg.moves()[0],
            Move::Fat(FatMove::outer(Face::R, CubeDirection::FORWARD))
        );
        assert_eq!(alg.to_string(), "R U2 F' D2");
    }

    #[test]
    fn parses_wide_slice_and_mslice_moves() {
        for notation in ["Rw", "3Rw2", "u'", "2f", "M'", "E2", "S", "x", "y'", "z2"] {
            let alg = parse_algorithm(notation).unwrap();
            assert_eq!(alg.to_string(), notation, "round-tripping {notation}");
        }
    }

    #[test]
    fn parses_direction_aliases() {
        assert_eq!(
            parse_algorithm("R3").unwrap(),
            parse_algorithm("R'").unwrap()
        );
        assert_eq!(
            parse_algorithm("R2'").unwrap(),
            parse_algorithm("R2").unwrap()
        );
    }

    #[test]
    fn parses_triggers_with_repetition() {
        let with_star = parse_algorithm("(R U)*3").unwrap();
        let without_star = parse_algorithm("(R U)3").unwrap();
        assert_eq!(with_star, without_star);
        assert_eq!(with_star.len(), 6);

        let nested = parse_algorithm("(R (U F)2)2").unwrap();
        assert_eq!(nested.to_string(), "R U F U F R U F U F");
    }

    #[test]
    fn empty_input_is_the_empty_algorithm() {
        assert!(parse_algorithm("").unwrap().is_empty());
        assert!(parse_algorithm("   ").unwrap().is_empty());
    }

    #[test]
    fn reports_position_and_expectation() {
        let error = parse_algorithm("R U $").unwrap_err();
        assert_eq!(error.line_col(), (1, 5));
        assert!(!error.to_string().is_empty());
    }

    #[test]
    fn trailing_input_is_an_error() {
        assert!(parse_algorithm("R ]").is_err());
        assert!(parse_commutator("[R, U] R").is_err());
    }

    #[test]
    fn parses_commutator_forms() {
        assert_eq!(
            parse_commutator("[R U R', D]").unwrap().to_string(),
            "[R U R', D]"
        );
        assert_eq!(
            parse_commutator("[F ; [R, U]]").unwrap().to_string(),
            "[F : [R, U]]"
        );
        let fake = parse_commutator("R U R'").unwrap();
        assert_eq!(fake.to_string(), "R U R'");
    }

    #[test]
    fn setup_commutator_with_plain_inner() {
        let commutator = parse_commutator("[D : R U R']").unwrap();
        assert_eq!(
            commutator.algorithm(),
            parse_algorithm("D R U R' D'").unwrap()
        );
    }
}
