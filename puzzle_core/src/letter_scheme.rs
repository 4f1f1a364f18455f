use std::sync::LazyLock;

use fxhash::FxHashMap;

use crate::cube::{Part, PartKind, PartParseError};

/// Maps stickers to letters for naming training cases.
///
/// Letters are keyed by each part's position in its kind's generation
/// order, so a scheme is just one alphabet per part kind plus the buffer
/// piece the scheme's owner uses for that kind.
#[derive(Clone, Debug)]
pub struct LetterScheme {
    letters: FxHashMap<PartKind, Vec<char>>,
    buffers: FxHashMap<PartKind, Part>,
}

impl LetterScheme {
    #[must_use]
    pub fn new(
        letters: FxHashMap<PartKind, Vec<char>>,
        buffers: FxHashMap<PartKind, Part>,
    ) -> LetterScheme {
        LetterScheme { letters, buffers }
    }

    #[must_use]
    pub fn letter(&self, part: &Part) -> Option<char> {
        self.letters
            .get(&part.kind())
            .and_then(|alphabet| alphabet.get(part.piece_index()))
            .copied()
    }

    /// The letter for a part, falling back to the part's own name when the
    /// scheme has no letter for it.
    #[must_use]
    pub fn letter_or_name(&self, part: &Part) -> String {
        self.letter(part)
            .map_or_else(|| part.to_string(), |letter| letter.to_string())
    }

    #[must_use]
    pub fn for_letter(&self, kind: PartKind, letter: char) -> Option<Part> {
        let canonical = letter.to_ascii_lowercase();
        let alphabet = self.letters.get(&kind)?;
        let index = alphabet.iter().position(|c| *c == canonical)?;
        kind.elements().get(index).cloned()
    }

    #[must_use]
    pub fn is_valid_letter(&self, kind: PartKind, letter: char) -> bool {
        self.for_letter(kind, letter).is_some()
    }

    /// Parses either a single scheme letter or a full part name.
    pub fn parse_part(&self, kind: PartKind, string: &str) -> Result<Part, PartParseError> {
        let trimmed = string.trim();
        let mut chars = trimmed.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            if let Some(part) = self.for_letter(kind, letter) {
                return Ok(part);
            }
        }
        Part::parse(kind, trimmed)
    }

    /// The buffer piece this scheme trains with for the given part kind.
    #[must_use]
    pub fn default_buffer(&self, kind: PartKind) -> Option<&Part> {
        self.buffers.get(&kind)
    }
}

/// The stock scheme: letters a through x per kind in generation order, with
/// the original author's buffer pieces.
pub static DEFAULT_LETTER_SCHEME: LazyLock<LetterScheme> = LazyLock::new(|| {
    let alphabet: Vec<char> = ('a'..='x').collect();
    let mut letters = FxHashMap::default();
    for kind in PartKind::MOVEABLE {
        letters.insert(kind, alphabet.clone());
    }
    let mut buffers = FxHashMap::default();
    let buffer_names = [
        (PartKind::Corner, "ULB"),
        (PartKind::Edge, "UF"),
        (PartKind::Wing, "FU"),
        (PartKind::XCenter, "URF"),
        (PartKind::TCenter, "UF"),
    ];
    for (kind, name) in buffer_names {
        buffers.insert(
            kind,
            Part::parse(kind, name).expect("buffer names are valid parts"),
        );
    }
    LetterScheme::new(letters, buffers)
});

#[cfg(test)]
mod tests {
    use super::DEFAULT_LETTER_SCHEME;
    use crate::cube::{Part, PartKind};

    #[test]
    fn letters_follow_generation_order() {
        let scheme = &*DEFAULT_LETTER_SCHEME;
        let first_edge = &PartKind::Edge.elements()[0];
        assert_eq!(scheme.letter(first_edge), Some('a'));
        let last_corner = &PartKind::Corner.elements()[23];
        assert_eq!(scheme.letter(last_corner), Some('x'));
    }

    #[test]
    fn for_letter_round_trips() {
        let scheme = &*DEFAULT_LETTER_SCHEME;
        for part in PartKind::Corner.elements() {
            let letter = scheme.letter(part).unwrap();
            assert_eq!(scheme.for_letter(PartKind::Corner, letter).as_ref(), Some(part));
        }
    }

    #[test]
    fn parse_part_accepts_letters_and_names() {
        let scheme = &*DEFAULT_LETTER_SCHEME;
        let by_letter = scheme.parse_part(PartKind::Edge, "a").unwrap();
        assert_eq!(by_letter, PartKind::Edge.elements()[0]);
        let by_name = scheme.parse_part(PartKind::Edge, "UF").unwrap();
        assert_eq!(by_name, Part::parse(PartKind::Edge, "UF").unwrap());
    }

    #[test]
    fn buffers_exist_for_training_kinds() {
        let scheme = &*DEFAULT_LETTER_SCHEME;
        for kind in [PartKind::Corner, PartKind::Edge, PartKind::Wing] {
            assert!(scheme.default_buffer(kind).is_some());
        }
        assert!(scheme.default_buffer(PartKind::Face).is_none());
    }
}
