use std::{cmp::Ordering, fmt, sync::LazyLock};

use fxhash::FxHashMap;
use itertools::Itertools;
use thiserror::Error;

use crate::{
    algorithm::Algorithm,
    direction::{CubeDirection, SkewbDirection},
    moves::{Move, Rotation},
};

/// One of the six sides of a cube, in the fixed order `U F R L B D`.
///
/// Opposite faces sit at mirrored indices, so `U`/`D`, `F`/`B` and `R`/`L`
/// share an axis.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum Face {
    U,
    F,
    R,
    L,
    B,
    D,
}

pub const FACE_NAMES: [char; 6] = ['U', 'F', 'R', 'L', 'B', 'D'];

impl Face {
    pub const ALL: [Face; 6] = [Face::U, Face::F, Face::R, Face::L, Face::B, Face::D];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn opposite(self) -> Face {
        Face::ALL[5 - self.index()]
    }

    /// `U`/`D` share priority 0, `F`/`B` priority 1, `R`/`L` priority 2.
    #[must_use]
    pub fn axis_priority(self) -> usize {
        self.index().min(5 - self.index())
    }

    #[must_use]
    pub fn same_axis(self, other: Face) -> bool {
        self.axis_priority() == other.axis_priority()
    }

    /// The canonical face of each axis is the one with the smaller index.
    #[must_use]
    pub fn is_canonical_axis_face(self) -> bool {
        self.index() < 3
    }

    /// The four adjacent faces in turn order: turning this face clockwise by
    /// one quarter moves the contents of `neighbors()[i]` to
    /// `neighbors()[i + 1]`.
    #[must_use]
    pub fn neighbors(self) -> [Face; 4] {
        match self {
            Face::U => [Face::F, Face::L, Face::B, Face::R],
            Face::F => [Face::U, Face::R, Face::D, Face::L],
            Face::R => [Face::U, Face::B, Face::D, Face::F],
            Face::L => [Face::U, Face::F, Face::D, Face::B],
            Face::B => [Face::U, Face::L, Face::D, Face::R],
            Face::D => [Face::F, Face::R, Face::B, Face::L],
        }
    }

    /// The neighbor that the contents of `neighbor` move to under a single
    /// clockwise turn of this face.
    #[must_use]
    pub fn clockwise_neighbor_after(self, neighbor: Face) -> Face {
        let neighbors = self.neighbors();
        let index = neighbors
            .iter()
            .position(|f| *f == neighbor)
            .expect("neighbor must not share an axis with this face");
        neighbors[(index + 1) % 4]
    }

    #[must_use]
    pub fn name(self) -> char {
        FACE_NAMES[self.index()]
    }

    #[must_use]
    pub fn parse(name: char) -> Option<Face> {
        let upper = name.to_ascii_uppercase();
        FACE_NAMES
            .iter()
            .position(|c| *c == upper)
            .map(|i| Face::ALL[i])
    }

    /// An algorithm of one rotation after which this face's contents lie
    /// where `other`'s contents currently are.
    #[must_use]
    pub fn rotation_to(self, other: Face) -> Algorithm {
        if self == other {
            return Algorithm::empty();
        }
        for axis_face in [Face::U, Face::F, Face::R] {
            if axis_face.same_axis(self) || axis_face.same_axis(other) {
                continue;
            }
            for direction in CubeDirection::NON_ZERO {
                let mapping = turn_mapping(axis_face, direction);
                if mapping[self.index()] == other {
                    return Algorithm::from_move(Move::Rotation(Rotation::new(
                        axis_face, direction,
                    )));
                }
            }
        }
        unreachable!("every pair of faces is connected by a rotation")
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A mapping from each face to the face its contents move to, describing a
/// rigid rotation of (a layer of) the puzzle.
pub(crate) type FaceMapping = [Face; 6];

pub(crate) const IDENTITY_MAPPING: FaceMapping = Face::ALL;

/// The face mapping of turning `axis_face` by `direction`. The same mapping
/// applies to every layer along that axis, which is what makes it usable for
/// outer turns, slice moves and whole-puzzle rotations alike.
pub(crate) fn turn_mapping(axis_face: Face, direction: CubeDirection) -> FaceMapping {
    let mut mapping = IDENTITY_MAPPING;
    let neighbors = axis_face.neighbors();
    for (i, face) in neighbors.iter().enumerate() {
        mapping[face.index()] = neighbors[(i + direction.value() as usize) % 4];
    }
    mapping
}

/// The face mapping of turning the half of a Skewb around `corner`:
/// the corner's three faces cycle in tuple order, their opposites follow.
pub(crate) fn corner_turn_mapping(corner: &Part, direction: SkewbDirection) -> FaceMapping {
    debug_assert_eq!(corner.kind(), PartKind::Corner);
    let mut mapping = IDENTITY_MAPPING;
    let faces = corner.faces();
    let steps = direction.value() as usize;
    for (i, face) in faces.iter().enumerate() {
        let target = faces[(i + steps) % 3];
        mapping[face.index()] = target;
        mapping[face.opposite().index()] = target.opposite();
    }
    mapping
}

pub(crate) fn compose_mappings(first: &FaceMapping, second: &FaceMapping) -> FaceMapping {
    let mut composed = IDENTITY_MAPPING;
    for face in Face::ALL {
        composed[face.index()] = second[first[face.index()].index()];
    }
    composed
}

/// The categories of physical pieces.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum PartKind {
    Corner,
    Edge,
    Wing,
    Midge,
    XCenter,
    TCenter,
    Face,
}

impl PartKind {
    pub const ALL: [PartKind; 7] = [
        PartKind::Corner,
        PartKind::Edge,
        PartKind::Wing,
        PartKind::Midge,
        PartKind::XCenter,
        PartKind::TCenter,
        PartKind::Face,
    ];

    /// The part kinds the reverse engineer tracks; fixed centers are
    /// excluded because they carry no useful permutation information.
    pub const MOVEABLE: [PartKind; 6] = [
        PartKind::Corner,
        PartKind::Edge,
        PartKind::Wing,
        PartKind::Midge,
        PartKind::XCenter,
        PartKind::TCenter,
    ];

    /// How many faces a part of this kind stores. Moveable centers store the
    /// full tuple of their corresponding corner/edge to pin down which of
    /// the identically-colored center stickers they are.
    #[must_use]
    pub fn face_count(self) -> usize {
        match self {
            PartKind::Corner | PartKind::XCenter => 3,
            PartKind::Edge | PartKind::Wing | PartKind::Midge | PartKind::TCenter => 2,
            PartKind::Face => 1,
        }
    }

    /// The number of distinguishable orientations a part of this kind has.
    #[must_use]
    pub fn rotation_order(self) -> u8 {
        match self {
            PartKind::Corner => 3,
            PartKind::Edge | PartKind::Midge => 2,
            PartKind::Wing | PartKind::XCenter | PartKind::TCenter | PartKind::Face => 1,
        }
    }

    #[must_use]
    pub fn is_moveable_center(self) -> bool {
        matches!(self, PartKind::XCenter | PartKind::TCenter)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PartKind::Corner => "Corner",
            PartKind::Edge => "Edge",
            PartKind::Wing => "Wing",
            PartKind::Midge => "Midge",
            PartKind::XCenter => "XCenter",
            PartKind::TCenter => "TCenter",
            PartKind::Face => "Face",
        }
    }

    #[must_use]
    pub fn parse_name(name: &str) -> Option<PartKind> {
        PartKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    #[must_use]
    pub fn exists_on_cube_size(self, cube_size: u32) -> bool {
        match self {
            PartKind::Corner => cube_size >= 2,
            PartKind::Edge => cube_size == 3,
            PartKind::Wing | PartKind::XCenter => cube_size >= 4,
            PartKind::Midge | PartKind::TCenter => cube_size >= 5 && cube_size % 2 == 1,
            PartKind::Face => cube_size >= 3 && cube_size % 2 == 1,
        }
    }

    /// The smallest cube this kind of part exists on.
    #[must_use]
    pub fn min_cube_size(self) -> u32 {
        match self {
            PartKind::Corner => 2,
            PartKind::Edge | PartKind::Face => 3,
            PartKind::Wing | PartKind::XCenter => 4,
            PartKind::Midge | PartKind::TCenter => 5,
        }
    }

    /// All parts of this kind, in a fixed generation order. The position of
    /// a part in this list is its [`Part::piece_index`], which letter
    /// schemes key off.
    #[must_use]
    pub fn elements(self) -> &'static [Part] {
        match self {
            PartKind::Corner => &CORNERS,
            PartKind::Edge => &EDGES,
            PartKind::Wing => &WINGS,
            PartKind::Midge => &MIDGES,
            PartKind::XCenter => &X_CENTERS,
            PartKind::TCenter => &T_CENTERS,
            PartKind::Face => &FACE_PARTS,
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartParseError {
    #[error("unknown face name {0:?}")]
    UnknownFace(char),
    #[error("{string:?} does not describe a {kind} part")]
    Invalid { kind: PartKind, string: String },
}

/// One sticker-identified physical piece in a specific orientation.
///
/// The face tuple lists the sticker faces with the primary sticker first;
/// orientation-equivalent labelings of the same physical piece are reachable
/// through [`Part::rotations`].
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Part {
    kind: PartKind,
    faces: Vec<Face>,
}

fn edge_like_valid(faces: &[Face]) -> bool {
    faces
        .iter()
        .tuple_combinations()
        .all(|(a, b)| !a.same_axis(*b))
}

fn corner_valid(faces: &[Face]) -> bool {
    edge_like_valid(faces) && faces[0].clockwise_neighbor_after(faces[1]) == faces[2]
}

fn generate_edge_like(kind: PartKind) -> Vec<Part> {
    Face::ALL
        .iter()
        .permutations(2)
        .filter(|faces| !faces[0].same_axis(*faces[1]))
        .map(|faces| Part {
            kind,
            faces: faces.into_iter().copied().collect(),
        })
        .collect()
}

fn generate_corner_like(kind: PartKind) -> Vec<Part> {
    Face::ALL
        .iter()
        .permutations(3)
        .map(|faces| faces.into_iter().copied().collect::<Vec<_>>())
        .filter(|faces| corner_valid(faces))
        .map(|faces| Part { kind, faces })
        .collect()
}

static CORNERS: LazyLock<Vec<Part>> = LazyLock::new(|| generate_corner_like(PartKind::Corner));
static EDGES: LazyLock<Vec<Part>> = LazyLock::new(|| generate_edge_like(PartKind::Edge));
static WINGS: LazyLock<Vec<Part>> = LazyLock::new(|| generate_edge_like(PartKind::Wing));
static MIDGES: LazyLock<Vec<Part>> = LazyLock::new(|| generate_edge_like(PartKind::Midge));
static X_CENTERS: LazyLock<Vec<Part>> = LazyLock::new(|| generate_corner_like(PartKind::XCenter));
static T_CENTERS: LazyLock<Vec<Part>> = LazyLock::new(|| generate_edge_like(PartKind::TCenter));
static FACE_PARTS: LazyLock<Vec<Part>> = LazyLock::new(|| {
    Face::ALL
        .iter()
        .map(|face| Part {
            kind: PartKind::Face,
            faces: vec![*face],
        })
        .collect()
});

static PIECE_INDICES: LazyLock<FxHashMap<Part, usize>> = LazyLock::new(|| {
    let mut indices = FxHashMap::default();
    for kind in PartKind::ALL {
        for (i, part) in kind.elements().iter().enumerate() {
            indices.insert(part.clone(), i);
        }
    }
    indices
});

impl Part {
    /// Builds a part from a face tuple, requiring the exact canonical
    /// labeling (corner chirality included).
    pub fn try_new(kind: PartKind, faces: Vec<Face>) -> Result<Part, PartParseError> {
        let part = Part { kind, faces };
        if PIECE_INDICES.contains_key(&part) {
            Ok(part)
        } else {
            Err(PartParseError::Invalid {
                kind,
                string: part.faces.iter().map(|f| f.name()).collect(),
            })
        }
    }

    #[must_use]
    pub fn kind(&self) -> PartKind {
        self.kind
    }

    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// The face the part's primary sticker lies on.
    #[must_use]
    pub fn primary_face(&self) -> Face {
        self.faces[0]
    }

    /// The position of this part in its kind's generation order.
    #[must_use]
    pub fn piece_index(&self) -> usize {
        *PIECE_INDICES
            .get(self)
            .expect("constructed parts are always generated elements")
    }

    /// Relabels the part by rotating its face tuple. Parts with rotation
    /// order 1 (wings, centers) are returned unchanged.
    #[must_use]
    pub fn rotated_by(&self, number: u8) -> Part {
        let order = self.kind.rotation_order();
        let steps = (number % order) as usize;
        if steps == 0 {
            return self.clone();
        }
        let mut faces = self.faces.clone();
        faces.rotate_left(steps);
        Part {
            kind: self.kind,
            faces,
        }
    }

    /// All orientation-equivalent labelings of this physical piece, starting
    /// with this one.
    #[must_use]
    pub fn rotations(&self) -> Vec<Part> {
        (0..self.kind.rotation_order())
            .map(|i| self.rotated_by(i))
            .collect()
    }

    /// The rotation-index-0 labeling of this physical piece.
    #[must_use]
    pub fn canonical(&self) -> Part {
        self.rotations().into_iter().min().expect("nonempty")
    }

    /// The canonical labeling together with the rotation index that turns it
    /// back into this one.
    #[must_use]
    pub fn canonicalize(&self) -> (Part, u8) {
        let order = self.kind.rotation_order();
        let (j, canonical) = self
            .rotations()
            .into_iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .expect("nonempty");
        #[allow(clippy::cast_possible_truncation)]
        let j = j as u8;
        (canonical, (order - j) % order)
    }

    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.rotations().iter().all(|r| self <= r)
    }

    /// Whether the two parts label the same physical piece, in any
    /// orientation.
    #[must_use]
    pub fn turned_equals(&self, other: &Part) -> bool {
        self.kind == other.kind && self.rotations().contains(other)
    }

    /// The index `i` such that `self.rotated_by(i) == other`, if the parts
    /// label the same physical piece.
    #[must_use]
    pub fn rotation_index_to(&self, other: &Part) -> Option<u8> {
        (0..self.kind.rotation_order()).find(|i| &self.rotated_by(*i) == other)
    }

    /// Applies a rigid face mapping to the part's sticker tuple.
    #[must_use]
    pub(crate) fn map_faces(&self, mapping: &FaceMapping) -> Part {
        Part {
            kind: self.kind,
            faces: self
                .faces
                .iter()
                .map(|face| mapping[face.index()])
                .collect(),
        }
    }

    /// Builds a corner-shaped face tuple, swapping the last two faces when
    /// the given order has the wrong chirality.
    pub(crate) fn corner_like_lenient(
        kind: PartKind,
        faces: Vec<Face>,
    ) -> Result<Part, PartParseError> {
        if corner_valid(&faces) {
            Part::try_new(kind, faces)
        } else {
            let reordered = vec![faces[0], faces[2], faces[1]];
            Part::try_new(kind, reordered)
        }
    }

    /// Parses a part from face letters. Corners and X centers accept either
    /// chirality; wings additionally accept a third, corner-style letter
    /// that disambiguates which of the two wings is meant.
    pub fn parse(kind: PartKind, string: &str) -> Result<Part, PartParseError> {
        let invalid = || PartParseError::Invalid {
            kind,
            string: string.to_owned(),
        };
        let faces = string
            .trim()
            .chars()
            .map(|c| Face::parse(c).ok_or(PartParseError::UnknownFace(c)))
            .collect::<Result<Vec<_>, _>>()?;
        match kind {
            PartKind::Corner | PartKind::XCenter => {
                if faces.len() != 3 {
                    return Err(invalid());
                }
                Part::corner_like_lenient(kind, faces)
            }
            PartKind::Wing if faces.len() == 3 => {
                let reordered = vec![faces[1], faces[0], faces[2]];
                let valid = corner_valid(&faces);
                if valid == corner_valid(&reordered) {
                    return Err(invalid());
                }
                if valid {
                    Part::try_new(kind, faces[0..2].to_vec())
                } else {
                    Part::try_new(kind, vec![faces[1], faces[0]])
                }
            }
            PartKind::Edge | PartKind::Midge | PartKind::Wing | PartKind::TCenter => {
                if faces.len() != 2 {
                    return Err(invalid());
                }
                Part::try_new(kind, faces)
            }
            PartKind::Face => {
                if faces.len() != 1 {
                    return Err(invalid());
                }
                Part::try_new(kind, faces)
            }
        }
        .map_err(|_| invalid())
    }
}

impl PartialOrd for Part {
    fn partial_cmp(&self, other: &Part) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Part {
    fn cmp(&self, other: &Part) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.piece_index().cmp(&other.piece_index()))
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Moveable centers show only their primary sticker uppercased; the
        // rest of the tuple pins down which center sticker is meant.
        let uppercase_count = match self.kind {
            PartKind::XCenter | PartKind::TCenter => 1,
            _ => self.faces.len(),
        };
        for (i, face) in self.faces.iter().enumerate() {
            let name = face.name();
            if i < uppercase_count {
                write!(f, "{name}")?;
            } else {
                write!(f, "{}", name.to_ascii_lowercase())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Face, Part, PartKind, compose_mappings, corner_turn_mapping, turn_mapping};
    use crate::direction::{CubeDirection, SkewbDirection};

    #[test]
    fn face_opposites_and_axes() {
        assert_eq!(Face::U.opposite(), Face::D);
        assert_eq!(Face::F.opposite(), Face::B);
        assert_eq!(Face::R.opposite(), Face::L);
        assert!(Face::U.same_axis(Face::D));
        assert!(!Face::U.same_axis(Face::F));
        assert_eq!(Face::U.axis_priority(), 0);
        assert_eq!(Face::B.axis_priority(), 1);
        assert_eq!(Face::L.axis_priority(), 2);
    }

    #[test]
    fn turn_mapping_follows_neighbor_cycle() {
        let mapping = turn_mapping(Face::U, CubeDirection::FORWARD);
        assert_eq!(mapping[Face::F.index()], Face::L);
        assert_eq!(mapping[Face::L.index()], Face::B);
        assert_eq!(mapping[Face::U.index()], Face::U);
        assert_eq!(mapping[Face::D.index()], Face::D);

        let inverse = turn_mapping(Face::U, CubeDirection::BACKWARD);
        let composed = compose_mappings(&mapping, &inverse);
        assert_eq!(composed, Face::ALL);
    }

    #[test]
    fn element_counts() {
        assert_eq!(PartKind::Corner.elements().len(), 24);
        assert_eq!(PartKind::Edge.elements().len(), 24);
        assert_eq!(PartKind::Wing.elements().len(), 24);
        assert_eq!(PartKind::XCenter.elements().len(), 24);
        assert_eq!(PartKind::TCenter.elements().len(), 24);
        assert_eq!(PartKind::Face.elements().len(), 6);
    }

    #[test]
    fn corner_chirality() {
        for name in ["URF", "UFL", "ULB", "UBR", "DFR", "DLF", "DBL", "DRB"] {
            let part = Part::parse(PartKind::Corner, name).unwrap();
            assert_eq!(part.to_string(), name);
        }
        // The wrong chirality is corrected by swapping the last two faces.
        let fixed = Part::parse(PartKind::Corner, "UFR").unwrap();
        assert_eq!(fixed.to_string(), "URF");
    }

    #[test]
    fn rotations_and_turned_equality() {
        let urf = Part::parse(PartKind::Corner, "URF").unwrap();
        let rfu = Part::parse(PartKind::Corner, "RFU").unwrap();
        assert_ne!(urf, rfu);
        assert!(urf.turned_equals(&rfu));
        assert_eq!(urf.rotations().len(), 3);
        assert_eq!(urf.rotation_index_to(&rfu), Some(1));

        let (canonical, index) = rfu.canonicalize();
        assert_eq!(canonical.rotated_by(index), rfu);

        let uf_wing = Part::parse(PartKind::Wing, "UF").unwrap();
        let fu_wing = Part::parse(PartKind::Wing, "FU").unwrap();
        assert!(!uf_wing.turned_equals(&fu_wing));
    }

    #[test]
    fn wing_parse_with_corner_disambiguation() {
        let from_corner = Part::parse(PartKind::Wing, "UFL").unwrap();
        assert_eq!(from_corner, Part::parse(PartKind::Wing, "UF").unwrap());
        let other_chirality = Part::parse(PartKind::Wing, "FUR").unwrap();
        assert_eq!(other_chirality, Part::parse(PartKind::Wing, "FU").unwrap());
    }

    #[test]
    fn center_display() {
        let x_center = Part::parse(PartKind::XCenter, "URF").unwrap();
        assert_eq!(x_center.to_string(), "Urf");
        let t_center = Part::parse(PartKind::TCenter, "UF").unwrap();
        assert_eq!(t_center.to_string(), "Uf");
    }

    #[test]
    fn corner_turn_mapping_cycles_corner_faces() {
        let urf = Part::parse(PartKind::Corner, "URF").unwrap();
        let mapping = corner_turn_mapping(&urf, SkewbDirection::FORWARD);
        assert_eq!(mapping[Face::U.index()], Face::R);
        assert_eq!(mapping[Face::R.index()], Face::F);
        assert_eq!(mapping[Face::F.index()], Face::U);
        assert_eq!(mapping[Face::D.index()], Face::L);
    }
}
