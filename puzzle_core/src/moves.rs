use std::fmt;

use thiserror::Error;

use crate::{
    algorithm::Algorithm,
    cube::{Face, FaceMapping, Part, PartKind, turn_mapping},
    direction::{CubeDirection, SkewbDirection},
};

/// The move-counting metrics the engine supports. Quarter-turn metric counts
/// a half turn as two moves, half-turn metric counts every turn as one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Metric {
    Qtm,
    Htm,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidMoveError {
    #[error("invalid width {width} for a fat move")]
    Width { width: u32 },
    #[error("invalid slice index {slice_index} for a slice move")]
    SliceIndex { slice_index: u32 },
    #[error("expected a corner to turn a Skewb around, got a {kind}")]
    NotACorner { kind: PartKind },
    #[error("moves of different puzzles cannot be joined")]
    MixedPuzzles,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedCubeSizeError {
    #[error("cubes smaller than 2x2 are not supported")]
    CubeSizeTooSmall { cube_size: u32 },
    #[error("the move {mv} does not exist on a {cube_size}x{cube_size} cube")]
    Move { mv: String, cube_size: u32 },
    #[error("{kind} parts do not exist on a {cube_size}x{cube_size} cube")]
    PartKind { kind: PartKind, cube_size: u32 },
    #[error("a {mv} move cannot be applied to this puzzle")]
    WrongPuzzle { mv: String },
}

/// Umbrella error for operations that both construct moves and resolve them
/// against a cube size.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error(transparent)]
    Invalid(#[from] InvalidMoveError),
    #[error(transparent)]
    UnsupportedCubeSize(#[from] UnsupportedCubeSizeError),
}

/// A face turn taking `width` outer layers along, width 1 being a plain
/// outer turn.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FatMove {
    axis_face: Face,
    direction: CubeDirection,
    width: u32,
}

impl FatMove {
    pub fn new(
        axis_face: Face,
        direction: CubeDirection,
        width: u32,
    ) -> Result<FatMove, InvalidMoveError> {
        if width < 1 {
            return Err(InvalidMoveError::Width { width });
        }
        Ok(FatMove {
            axis_face,
            direction,
            width,
        })
    }

    /// A plain outer turn.
    #[must_use]
    pub fn outer(axis_face: Face, direction: CubeDirection) -> FatMove {
        FatMove {
            axis_face,
            direction,
            width: 1,
        }
    }

    #[must_use]
    pub fn axis_face(self) -> Face {
        self.axis_face
    }

    #[must_use]
    pub fn direction(self) -> CubeDirection {
        self.direction
    }

    #[must_use]
    pub fn width(self) -> u32 {
        self.width
    }

    fn with_width(self, width: u32) -> FatMove {
        FatMove { width, ..self }
    }
}

/// A turn of a single inner layer, `slice_index` layers in from the axis
/// face (index 1 is the layer right behind it).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SliceMove {
    axis_face: Face,
    direction: CubeDirection,
    slice_index: u32,
}

impl SliceMove {
    pub fn new(
        axis_face: Face,
        direction: CubeDirection,
        slice_index: u32,
    ) -> Result<SliceMove, InvalidMoveError> {
        if slice_index < 1 {
            return Err(InvalidMoveError::SliceIndex { slice_index });
        }
        Ok(SliceMove {
            axis_face,
            direction,
            slice_index,
        })
    }

    #[must_use]
    pub fn axis_face(self) -> Face {
        self.axis_face
    }

    #[must_use]
    pub fn direction(self) -> CubeDirection {
        self.direction
    }

    #[must_use]
    pub fn slice_index(self) -> u32 {
        self.slice_index
    }

    /// Re-expresses slices in the far half of the cube from the opposite
    /// face, so that equal slices compare equal.
    fn simplified(self, cube_size: u32) -> SliceMove {
        if self.slice_index >= cube_size.div_ceil(2) {
            SliceMove {
                axis_face: self.axis_face.opposite(),
                direction: self.direction.inverse(),
                slice_index: cube_size - 1 - self.slice_index,
            }
        } else {
            self
        }
    }

    fn translated_slice_index(self, other_axis_face: Face, cube_size: u32) -> u32 {
        if self.axis_face == other_axis_face {
            self.slice_index
        } else {
            cube_size - 1 - self.slice_index
        }
    }
}

/// The move written `M`, `E` or `S` on an even cube: everything turns except
/// the two outer layers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FatMSliceMove {
    pub(crate) axis_face: Face,
    pub(crate) direction: CubeDirection,
}

/// The single middle layer of an odd cube.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct InnerMSliceMove {
    pub(crate) axis_face: Face,
    pub(crate) direction: CubeDirection,
    pub(crate) slice_index: u32,
}

/// A lowercase move like `u`, which is a two-layer fat move on 3x3 but a
/// slice move on bigger cubes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MaybeFatMaybeSliceMove {
    pub(crate) axis_face: Face,
    pub(crate) direction: CubeDirection,
}

/// An `M`/`E`/`S` move whose meaning depends on the parity of the cube size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MaybeFatMSliceMove {
    pub(crate) axis_face: Face,
    pub(crate) direction: CubeDirection,
}

/// A whole-puzzle rotation. Costs nothing in any metric.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Rotation {
    axis_face: Face,
    direction: CubeDirection,
}

impl Rotation {
    #[must_use]
    pub fn new(axis_face: Face, direction: CubeDirection) -> Rotation {
        Rotation {
            axis_face,
            direction,
        }
    }

    #[must_use]
    pub fn axis_face(self) -> Face {
        self.axis_face
    }

    #[must_use]
    pub fn direction(self) -> CubeDirection {
        self.direction
    }

    #[must_use]
    pub fn inverse(self) -> Rotation {
        Rotation {
            axis_face: self.axis_face,
            direction: self.direction.inverse(),
        }
    }

    pub(crate) fn mapping(self) -> FaceMapping {
        turn_mapping(self.axis_face, self.direction)
    }

    /// All 18 rotations with a nonzero direction.
    pub(crate) fn non_zero_rotations() -> impl Iterator<Item = Rotation> {
        Face::ALL.into_iter().flat_map(|face| {
            CubeDirection::NON_ZERO
                .into_iter()
                .map(move |direction| Rotation::new(face, direction))
        })
    }
}

/// A turn of a Skewb half around a corner axis. The corner is stored with
/// its lowest face first so that equal turns compare equal.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct SkewbMove {
    axis_corner: Part,
    direction: SkewbDirection,
}

impl SkewbMove {
    pub fn new(axis_corner: Part, direction: SkewbDirection) -> Result<SkewbMove, InvalidMoveError> {
        if axis_corner.kind() != PartKind::Corner {
            return Err(InvalidMoveError::NotACorner {
                kind: axis_corner.kind(),
            });
        }
        let min_face = *axis_corner
            .faces()
            .iter()
            .min()
            .expect("corners have faces");
        let index = axis_corner
            .faces()
            .iter()
            .position(|f| *f == min_face)
            .expect("just found");
        #[allow(clippy::cast_possible_truncation)]
        let axis_corner = axis_corner.rotated_by(index as u8);
        Ok(SkewbMove {
            axis_corner,
            direction,
        })
    }

    #[must_use]
    pub fn axis_corner(&self) -> &Part {
        &self.axis_corner
    }

    #[must_use]
    pub fn direction(&self) -> SkewbDirection {
        self.direction
    }
}

/// A single move of a cube or Skewb.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Move {
    Fat(FatMove),
    Slice(SliceMove),
    FatMSlice(FatMSliceMove),
    InnerMSlice(InnerMSliceMove),
    MaybeFatMaybeSlice(MaybeFatMaybeSliceMove),
    MaybeFatMSlice(MaybeFatMSliceMove),
    Rotation(Rotation),
    Skewb(SkewbMove),
}

fn translated_direction(axis_face: Face, direction: CubeDirection, target: Face) -> CubeDirection {
    if axis_face == target {
        direction
    } else {
        debug_assert_eq!(axis_face, target.opposite());
        direction.inverse()
    }
}

impl Move {
    /// The axis face of every cube move; `None` for Skewb turns.
    #[must_use]
    pub fn axis_face(&self) -> Option<Face> {
        match self {
            Move::Fat(m) => Some(m.axis_face),
            Move::Slice(m) => Some(m.axis_face),
            Move::FatMSlice(m) => Some(m.axis_face),
            Move::InnerMSlice(m) => Some(m.axis_face),
            Move::MaybeFatMaybeSlice(m) => Some(m.axis_face),
            Move::MaybeFatMSlice(m) => Some(m.axis_face),
            Move::Rotation(m) => Some(m.axis_face),
            Move::Skewb(_) => None,
        }
    }

    /// Whether the move leaves the puzzle untouched.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        match self {
            Move::Fat(m) => m.direction.is_zero(),
            Move::Slice(m) => m.direction.is_zero(),
            Move::FatMSlice(m) => m.direction.is_zero(),
            Move::InnerMSlice(m) => m.direction.is_zero(),
            Move::MaybeFatMaybeSlice(m) => m.direction.is_zero(),
            Move::MaybeFatMSlice(m) => m.direction.is_zero(),
            Move::Rotation(m) => m.direction.is_zero(),
            Move::Skewb(m) => m.direction.is_zero(),
        }
    }

    #[must_use]
    pub fn inverse(&self) -> Move {
        match self {
            Move::Fat(m) => Move::Fat(FatMove {
                direction: m.direction.inverse(),
                ..*m
            }),
            Move::Slice(m) => Move::Slice(SliceMove {
                direction: m.direction.inverse(),
                ..*m
            }),
            Move::FatMSlice(m) => Move::FatMSlice(FatMSliceMove {
                direction: m.direction.inverse(),
                ..*m
            }),
            Move::InnerMSlice(m) => Move::InnerMSlice(InnerMSliceMove {
                direction: m.direction.inverse(),
                ..*m
            }),
            Move::MaybeFatMaybeSlice(m) => Move::MaybeFatMaybeSlice(MaybeFatMaybeSliceMove {
                direction: m.direction.inverse(),
                ..*m
            }),
            Move::MaybeFatMSlice(m) => Move::MaybeFatMSlice(MaybeFatMSliceMove {
                direction: m.direction.inverse(),
                ..*m
            }),
            Move::Rotation(m) => Move::Rotation(m.inverse()),
            Move::Skewb(m) => Move::Skewb(SkewbMove {
                axis_corner: m.axis_corner.clone(),
                direction: m.direction.inverse(),
            }),
        }
    }

    /// Re-expresses the move in the frame reached by doing `rotation` first:
    /// the result of `rotate_by` sandwiched between `rotation` and its
    /// inverse has the same effect as the original move.
    #[must_use]
    pub fn rotate_by(&self, rotation: &Rotation) -> Move {
        if rotation.direction.is_zero() {
            return self.clone();
        }
        let mapping = rotation.mapping();
        let map_axis = |axis_face: Face| mapping[axis_face.index()];
        match self {
            Move::Fat(m) => Move::Fat(FatMove {
                axis_face: map_axis(m.axis_face),
                ..*m
            }),
            Move::Slice(m) => Move::Slice(SliceMove {
                axis_face: map_axis(m.axis_face),
                ..*m
            }),
            Move::FatMSlice(m) => Move::FatMSlice(FatMSliceMove {
                axis_face: map_axis(m.axis_face),
                ..*m
            }),
            Move::InnerMSlice(m) => Move::InnerMSlice(InnerMSliceMove {
                axis_face: map_axis(m.axis_face),
                ..*m
            }),
            Move::MaybeFatMaybeSlice(m) => Move::MaybeFatMaybeSlice(MaybeFatMaybeSliceMove {
                axis_face: map_axis(m.axis_face),
                ..*m
            }),
            Move::MaybeFatMSlice(m) => Move::MaybeFatMSlice(MaybeFatMSliceMove {
                axis_face: map_axis(m.axis_face),
                ..*m
            }),
            Move::Rotation(m) => Move::Rotation(Rotation {
                axis_face: map_axis(m.axis_face),
                direction: m.direction,
            }),
            Move::Skewb(m) => {
                let corner = m.axis_corner.map_faces(&mapping);
                Move::Skewb(
                    SkewbMove::new(corner, m.direction).expect("a rotated corner is a corner"),
                )
            }
        }
    }

    /// Mirrors the move using `normal_face` as the normal of the mirror
    /// plane.
    #[must_use]
    pub fn mirror(&self, normal_face: Face) -> Move {
        let flip = |axis_face: Face, direction: CubeDirection| {
            if normal_face.same_axis(axis_face) {
                (axis_face.opposite(), direction.inverse())
            } else {
                (axis_face, direction.inverse())
            }
        };
        match self {
            Move::Fat(m) => {
                let (axis_face, direction) = flip(m.axis_face, m.direction);
                Move::Fat(FatMove {
                    axis_face,
                    direction,
                    width: m.width,
                })
            }
            Move::Slice(m) => {
                // Mirroring along the slice's own axis keeps the direction
                // and moves the slice to the other side.
                if normal_face.same_axis(m.axis_face) {
                    Move::Slice(SliceMove {
                        axis_face: m.axis_face.opposite(),
                        direction: m.direction.inverse(),
                        slice_index: m.slice_index,
                    })
                } else {
                    self.inverse()
                }
            }
            Move::FatMSlice(m) => {
                let (axis_face, direction) = flip(m.axis_face, m.direction);
                Move::FatMSlice(FatMSliceMove {
                    axis_face,
                    direction,
                })
            }
            Move::InnerMSlice(m) => {
                if normal_face.same_axis(m.axis_face) {
                    Move::InnerMSlice(InnerMSliceMove {
                        axis_face: m.axis_face.opposite(),
                        direction: m.direction.inverse(),
                        slice_index: m.slice_index,
                    })
                } else {
                    self.inverse()
                }
            }
            Move::MaybeFatMaybeSlice(m) => {
                let (axis_face, direction) = flip(m.axis_face, m.direction);
                Move::MaybeFatMaybeSlice(MaybeFatMaybeSliceMove {
                    axis_face,
                    direction,
                })
            }
            Move::MaybeFatMSlice(m) => {
                let (axis_face, direction) = flip(m.axis_face, m.direction);
                Move::MaybeFatMSlice(MaybeFatMSliceMove {
                    axis_face,
                    direction,
                })
            }
            Move::Rotation(m) => {
                let (axis_face, direction) = flip(m.axis_face, m.direction);
                Move::Rotation(Rotation {
                    axis_face,
                    direction,
                })
            }
            Move::Skewb(m) => {
                let faces = m
                    .axis_corner
                    .faces()
                    .iter()
                    .map(|face| {
                        if face.same_axis(normal_face) {
                            face.opposite()
                        } else {
                            *face
                        }
                    })
                    .collect();
                let corner = Part::corner_like_lenient(PartKind::Corner, faces)
                    .expect("mirrored corner faces still span three axes");
                Move::Skewb(
                    SkewbMove::new(corner, m.direction.inverse())
                        .expect("mirrored corner is a corner"),
                )
            }
        }
    }

    /// Whether the two moves can be reordered without changing the effect
    /// of the algorithm.
    #[must_use]
    pub fn can_swap(&self, other: &Move) -> bool {
        if matches!(self, Move::Rotation(_)) || matches!(other, Move::Rotation(_)) {
            return true;
        }
        match (self.axis_face(), other.axis_face()) {
            (Some(a), Some(b)) => a.same_axis(b),
            _ => false,
        }
    }

    /// Rewrites the pair `[self, other]` as an equivalent pair with the two
    /// moves exchanged, re-expressing a move in the rotated frame when it
    /// commutes past a rotation.
    #[must_use]
    pub fn swap(&self, other: &Move) -> Option<(Move, Move)> {
        if !self.can_swap(other) {
            return None;
        }
        if let Move::Rotation(rotation) = self {
            Some((other.rotate_by(&rotation.inverse()), self.clone()))
        } else if let Move::Rotation(rotation) = other {
            Some((other.clone(), self.rotate_by(rotation)))
        } else {
            Some((other.clone(), self.clone()))
        }
    }

    /// Resolves size-dependent moves into their concrete meaning for
    /// `cube_size` and validates that the move exists on that size.
    pub fn decide_meaning(&self, cube_size: u32) -> Result<Move, UnsupportedCubeSizeError> {
        if cube_size < 2 {
            return Err(UnsupportedCubeSizeError::CubeSizeTooSmall { cube_size });
        }
        let unsupported = || UnsupportedCubeSizeError::Move {
            mv: self.to_string(),
            cube_size,
        };
        match self {
            Move::MaybeFatMaybeSlice(m) => match cube_size {
                2 => Err(unsupported()),
                3 => Ok(Move::Fat(FatMove {
                    axis_face: m.axis_face,
                    direction: m.direction,
                    width: 2,
                })),
                _ => Ok(Move::Slice(SliceMove {
                    axis_face: m.axis_face,
                    direction: m.direction,
                    slice_index: 1,
                })),
            },
            Move::MaybeFatMSlice(m) => {
                if cube_size % 2 == 0 {
                    Ok(Move::FatMSlice(FatMSliceMove {
                        axis_face: m.axis_face,
                        direction: m.direction,
                    }))
                } else {
                    Ok(Move::InnerMSlice(InnerMSliceMove {
                        axis_face: m.axis_face,
                        direction: m.direction,
                        slice_index: cube_size / 2,
                    }))
                }
            }
            Move::Fat(m) => {
                if m.width > cube_size - 1 {
                    Err(unsupported())
                } else {
                    Ok(self.clone())
                }
            }
            Move::Slice(m) => {
                if m.slice_index > cube_size - 2 {
                    Err(unsupported())
                } else {
                    Ok(self.clone())
                }
            }
            Move::InnerMSlice(m) => {
                if m.slice_index > cube_size - 2 {
                    Err(unsupported())
                } else {
                    Ok(self.clone())
                }
            }
            Move::FatMSlice(_) | Move::Rotation(_) | Move::Skewb(_) => Ok(self.clone()),
        }
    }

    fn is_slice_move(&self) -> bool {
        matches!(
            self,
            Move::Slice(_) | Move::InnerMSlice(_) | Move::FatMSlice(_)
        )
    }

    fn is_double_move(&self) -> bool {
        match self {
            Move::Fat(m) => m.direction.is_double(),
            Move::Slice(m) => m.direction.is_double(),
            Move::FatMSlice(m) => m.direction.is_double(),
            Move::InnerMSlice(m) => m.direction.is_double(),
            Move::MaybeFatMaybeSlice(m) => m.direction.is_double(),
            Move::MaybeFatMSlice(m) => m.direction.is_double(),
            Move::Rotation(m) => m.direction.is_double(),
            Move::Skewb(_) => false,
        }
    }

    /// The cost of the move under `metric` on a cube of the given size.
    pub fn move_count(&self, cube_size: u32, metric: Metric) -> Result<u32, MoveError> {
        let decided = self.decide_meaning(cube_size)?;
        if decided.is_identity() || matches!(decided, Move::Rotation(_)) {
            return Ok(0);
        }
        let slice_factor = if decided.is_slice_move() { 2 } else { 1 };
        let direction_factor = if decided.is_double_move() { 2 } else { 1 };
        Ok(match metric {
            Metric::Qtm => slice_factor * direction_factor,
            Metric::Htm => slice_factor,
        })
    }

    /// Joins two adjacent moves, cancelling as much as possible. Returns the
    /// merged (possibly empty) algorithm, or the two moves unchanged when
    /// nothing cancels.
    pub fn join_with_cancellation(
        &self,
        other: &Move,
        cube_size: u32,
    ) -> Result<Algorithm, MoveError> {
        let self_is_skewb = matches!(self, Move::Skewb(_));
        let other_is_skewb = matches!(other, Move::Skewb(_));
        let self_is_rotation = matches!(self, Move::Rotation(_));
        let other_is_rotation = matches!(other, Move::Rotation(_));
        if (self_is_skewb && !other_is_skewb && !other_is_rotation)
            || (other_is_skewb && !self_is_skewb && !self_is_rotation)
        {
            return Err(InvalidMoveError::MixedPuzzles.into());
        }
        let left = self.decide_meaning(cube_size)?;
        let right = other.decide_meaning(cube_size)?;
        let moves = match merged(&left, &right, cube_size) {
            Some(merged_moves) => merged_moves,
            None => vec![self.clone(), other.clone()],
        };
        Ok(Algorithm::from_moves(
            moves.into_iter().filter(|m| !m.is_identity()),
        ))
    }
}

/// The algebraic sum of two adjacent moves, or `None` when they don't
/// interact. Both moves have been resolved for `cube_size` already.
fn merged(left: &Move, right: &Move, cube_size: u32) -> Option<Vec<Move>> {
    // The middle slice of an odd cube merges exactly like any other slice.
    let as_slice = |m: &Move| match m {
        Move::InnerMSlice(m) => Some(SliceMove {
            axis_face: m.axis_face,
            direction: m.direction,
            slice_index: m.slice_index,
        }),
        Move::Slice(m) => Some(*m),
        _ => None,
    };
    let wrap_slice = |slice: SliceMove| {
        if cube_size % 2 == 1 && slice.slice_index == cube_size / 2 {
            Move::InnerMSlice(InnerMSliceMove {
                axis_face: slice.axis_face,
                direction: slice.direction,
                slice_index: slice.slice_index,
            })
        } else {
            Move::Slice(slice)
        }
    };
    match (left, right) {
        (Move::Rotation(l), Move::Rotation(r)) => merge_rotations(*l, *r),
        (Move::Rotation(rotation), Move::Fat(fat)) | (Move::Fat(fat), Move::Rotation(rotation)) => {
            merge_rotation_with_fat(*rotation, *fat, cube_size)
        }
        (Move::Fat(l), Move::Fat(r)) => merge_fat_with_fat(*l, *r, cube_size),
        (Move::Fat(fat), other) | (other, Move::Fat(fat)) => {
            if let Some(slice) = as_slice(other) {
                merge_fat_with_slice(*fat, slice, cube_size)
            } else if let Move::FatMSlice(mslice) = other {
                merge_fat_with_mslice(*fat, *mslice, cube_size)
            } else {
                None
            }
        }
        (Move::FatMSlice(l), Move::FatMSlice(r)) => {
            if l.axis_face.same_axis(r.axis_face) {
                Some(vec![Move::FatMSlice(FatMSliceMove {
                    axis_face: r.axis_face,
                    direction: r.direction
                        + translated_direction(l.axis_face, l.direction, r.axis_face),
                })])
            } else {
                None
            }
        }
        (l, r) => {
            if let (Some(l), Some(r)) = (as_slice(l), as_slice(r)) {
                merge_slice_with_slice(l, r, cube_size).map(|moves| {
                    moves
                        .into_iter()
                        .map(|m| match m {
                            Move::Slice(s) => wrap_slice(s),
                            other => other,
                        })
                        .collect()
                })
            } else if let (Move::Skewb(l), Move::Skewb(r)) = (l, r) {
                if l.axis_corner == r.axis_corner {
                    Some(vec![Move::Skewb(SkewbMove {
                        axis_corner: l.axis_corner.clone(),
                        direction: l.direction + r.direction,
                    })])
                } else {
                    None
                }
            } else {
                None
            }
        }
    }
}

fn merge_rotations(l: Rotation, r: Rotation) -> Option<Vec<Move>> {
    if l.axis_face.same_axis(r.axis_face) {
        return Some(vec![Move::Rotation(Rotation {
            axis_face: l.axis_face,
            direction: l.direction + translated_direction(r.axis_face, r.direction, l.axis_face),
        })]);
    }
    if l.direction.is_double() && r.direction.is_double() {
        // Two half rotations around different axes equal one around the
        // remaining axis.
        let remaining = Face::ALL
            .into_iter()
            .find(|f| !f.same_axis(l.axis_face) && !f.same_axis(r.axis_face))
            .expect("three axes exist");
        return Some(vec![Move::Rotation(Rotation {
            axis_face: remaining,
            direction: CubeDirection::DOUBLE,
        })]);
    }
    None
}

fn merge_rotation_with_fat(
    rotation: Rotation,
    fat: FatMove,
    cube_size: u32,
) -> Option<Vec<Move>> {
    if !rotation.axis_face.same_axis(fat.axis_face) {
        return None;
    }
    let translated = translated_direction(rotation.axis_face, rotation.direction, fat.axis_face);
    if translated != fat.direction.inverse() {
        return None;
    }
    // The rotation undoes the fat block's turn, leaving the complementary
    // block turned from the other side.
    Some(vec![Move::Fat(FatMove {
        axis_face: fat.axis_face.opposite(),
        direction: fat.direction,
        width: cube_size - fat.width,
    })])
}

fn merge_fat_with_fat(l: FatMove, r: FatMove, cube_size: u32) -> Option<Vec<Move>> {
    if l.axis_face == r.axis_face && l.width == r.width {
        return Some(vec![Move::Fat(FatMove {
            axis_face: l.axis_face,
            direction: l.direction + r.direction,
            width: l.width,
        })]);
    }
    if l.axis_face == r.axis_face.opposite() && l.width + r.width == cube_size {
        // Opposite blocks covering the whole cube: merge into one block
        // plus a rotation.
        return Some(vec![
            Move::Fat(FatMove {
                axis_face: l.axis_face,
                direction: l.direction + r.direction,
                width: l.width,
            }),
            Move::Rotation(Rotation::new(r.axis_face, r.direction)),
        ]);
    }
    let leaves_inner_slice = |bigger: FatMove, smaller: FatMove| {
        bigger.axis_face == smaller.axis_face
            && bigger.width == smaller.width + 1
            && bigger.direction == smaller.direction.inverse()
    };
    if leaves_inner_slice(r, l) {
        return Some(vec![Move::Slice(SliceMove {
            axis_face: r.axis_face,
            direction: r.direction,
            slice_index: r.width - 1,
        })]);
    }
    if leaves_inner_slice(l, r) {
        return Some(vec![Move::Slice(SliceMove {
            axis_face: l.axis_face,
            direction: l.direction,
            slice_index: l.width - 1,
        })]);
    }
    let leaves_fat_mslice = |bigger: FatMove, smaller: FatMove| {
        cube_size % 2 == 0
            && bigger.axis_face == smaller.axis_face
            && bigger.width == cube_size - 1
            && smaller.width == 1
            && bigger.direction == smaller.direction.inverse()
    };
    if leaves_fat_mslice(r, l) {
        return Some(vec![Move::FatMSlice(FatMSliceMove {
            axis_face: r.axis_face,
            direction: r.direction,
        })]);
    }
    if leaves_fat_mslice(l, r) {
        return Some(vec![Move::FatMSlice(FatMSliceMove {
            axis_face: l.axis_face,
            direction: l.direction,
        })]);
    }
    None
}

fn merge_fat_with_slice(fat: FatMove, slice: SliceMove, cube_size: u32) -> Option<Vec<Move>> {
    if !fat.axis_face.same_axis(slice.axis_face) {
        return None;
    }
    let translated = translated_direction(slice.axis_face, slice.direction, fat.axis_face);
    let translated_index = slice.translated_slice_index(fat.axis_face, cube_size);
    if translated_index == fat.width && translated == fat.direction {
        Some(vec![Move::Fat(fat.with_width(fat.width + 1))])
    } else if translated_index == fat.width - 1 && translated == fat.direction.inverse() {
        Some(vec![Move::Fat(fat.with_width(fat.width - 1))])
    } else {
        None
    }
}

fn merge_fat_with_mslice(
    fat: FatMove,
    mslice: FatMSliceMove,
    cube_size: u32,
) -> Option<Vec<Move>> {
    if !fat.axis_face.same_axis(mslice.axis_face) {
        return None;
    }
    let translated = translated_direction(mslice.axis_face, mslice.direction, fat.axis_face);
    if fat.width == 1 && fat.direction == translated {
        Some(vec![Move::Fat(FatMove {
            axis_face: fat.axis_face,
            direction: fat.direction,
            width: cube_size - 1,
        })])
    } else if fat.width == cube_size - 1 && fat.direction == translated.inverse() {
        Some(vec![Move::Fat(FatMove {
            axis_face: fat.axis_face,
            direction: fat.direction,
            width: 1,
        })])
    } else {
        None
    }
}

fn merge_slice_with_slice(l: SliceMove, r: SliceMove, cube_size: u32) -> Option<Vec<Move>> {
    if !l.axis_face.same_axis(r.axis_face) {
        return None;
    }
    let r_simplified = r.simplified(cube_size);
    // Only on 4x4 can two adjacent slices join into a fat M slice.
    if cube_size == 4 && r_simplified.slice_index == 1 {
        let mirrored = SliceMove {
            axis_face: r_simplified.axis_face.opposite(),
            direction: r_simplified.direction.inverse(),
            slice_index: r_simplified.slice_index,
        };
        if mirrored.simplified(cube_size) == l.simplified(cube_size) {
            return Some(vec![Move::FatMSlice(FatMSliceMove {
                axis_face: l.axis_face,
                direction: l.direction,
            })]);
        }
    }
    let l_simplified = l.simplified(cube_size);
    if l_simplified.axis_face == r_simplified.axis_face
        && l_simplified.slice_index == r_simplified.slice_index
    {
        return Some(vec![Move::Slice(SliceMove {
            axis_face: l_simplified.axis_face,
            direction: l_simplified.direction
                + translated_direction(
                    r_simplified.axis_face,
                    r_simplified.direction,
                    l_simplified.axis_face,
                ),
            slice_index: l_simplified.slice_index,
        })]);
    }
    None
}

/// The letter and displayed direction of an M/E/S-style move.
fn mslice_notation(axis_face: Face, direction: CubeDirection) -> (char, CubeDirection) {
    // E follows D, S follows F, M follows L.
    let letter = |face| match face {
        Face::D => 'E',
        Face::F => 'S',
        Face::L => 'M',
        _ => unreachable!("normalized to the slice-letter face"),
    };
    if matches!(axis_face, Face::D | Face::F | Face::L) {
        (letter(axis_face), direction)
    } else {
        (letter(axis_face.opposite()), direction.inverse())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Fat(m) => {
                if m.width > 2 {
                    write!(f, "{}", m.width)?;
                }
                write!(f, "{}", m.axis_face.name())?;
                if m.width > 1 {
                    write!(f, "w")?;
                }
                write!(f, "{}", m.direction.name())
            }
            Move::Slice(m) => {
                if m.slice_index > 1 {
                    write!(f, "{}", m.slice_index)?;
                }
                write!(
                    f,
                    "{}{}",
                    m.axis_face.name().to_ascii_lowercase(),
                    m.direction.name()
                )
            }
            Move::FatMSlice(m) => {
                let (letter, direction) = mslice_notation(m.axis_face, m.direction);
                write!(f, "{letter}{}", direction.name())
            }
            Move::InnerMSlice(m) => {
                let (letter, direction) = mslice_notation(m.axis_face, m.direction);
                write!(f, "{letter}{}", direction.name())
            }
            Move::MaybeFatMSlice(m) => {
                let (letter, direction) = mslice_notation(m.axis_face, m.direction);
                write!(f, "{letter}{}", direction.name())
            }
            Move::MaybeFatMaybeSlice(m) => {
                write!(
                    f,
                    "{}{}",
                    m.axis_face.name().to_ascii_lowercase(),
                    m.direction.name()
                )
            }
            Move::Rotation(m) => {
                let axis_name = ['y', 'z', 'x'][m.axis_face.axis_priority()];
                let direction = if m.axis_face.is_canonical_axis_face() {
                    m.direction
                } else {
                    m.direction.inverse()
                };
                write!(f, "{axis_name}{}", direction.name())
            }
            Move::Skewb(m) => write!(f, "{}{}", m.axis_corner, m.direction.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FatMove, Metric, Move, Rotation, SliceMove};
    use crate::{
        cube::{Face, Part, PartKind},
        direction::{CubeDirection, SkewbDirection},
        moves::SkewbMove,
    };

    fn outer(face: Face, direction: CubeDirection) -> Move {
        Move::Fat(FatMove::outer(face, direction))
    }

    #[test]
    fn inverse_is_involutive() {
        let moves = [
            outer(Face::R, CubeDirection::FORWARD),
            Move::Slice(SliceMove::new(Face::U, CubeDirection::DOUBLE, 2).unwrap()),
            Move::Rotation(Rotation::new(Face::F, CubeDirection::BACKWARD)),
            Move::Skewb(
                SkewbMove::new(
                    Part::parse(PartKind::Corner, "URF").unwrap(),
                    SkewbDirection::FORWARD,
                )
                .unwrap(),
            ),
        ];
        for m in moves {
            assert_eq!(m.inverse().inverse(), m);
        }
    }

    #[test]
    fn mirror_is_involutive() {
        let moves = [
            outer(Face::R, CubeDirection::FORWARD),
            outer(Face::U, CubeDirection::DOUBLE),
            Move::Slice(SliceMove::new(Face::R, CubeDirection::FORWARD, 1).unwrap()),
            Move::Skewb(
                SkewbMove::new(
                    Part::parse(PartKind::Corner, "URF").unwrap(),
                    SkewbDirection::FORWARD,
                )
                .unwrap(),
            ),
        ];
        for m in moves {
            for normal in [Face::R, Face::U, Face::F] {
                assert_eq!(m.mirror(normal).mirror(normal), m, "mirroring {m}");
            }
        }
    }

    #[test]
    fn mirror_flips_direction() {
        // Mirroring R U F with the R face as normal gives L U' F'.
        let mirrored = [
            outer(Face::R, CubeDirection::FORWARD).mirror(Face::R),
            outer(Face::U, CubeDirection::FORWARD).mirror(Face::R),
            outer(Face::F, CubeDirection::FORWARD).mirror(Face::R),
        ];
        assert_eq!(mirrored[0], outer(Face::L, CubeDirection::BACKWARD));
        assert_eq!(mirrored[1], outer(Face::U, CubeDirection::BACKWARD));
        assert_eq!(mirrored[2], outer(Face::F, CubeDirection::BACKWARD));
    }

    #[test]
    fn rotate_by_round_trips() {
        let moves = [
            outer(Face::R, CubeDirection::FORWARD),
            Move::Slice(SliceMove::new(Face::F, CubeDirection::DOUBLE, 1).unwrap()),
            Move::Rotation(Rotation::new(Face::U, CubeDirection::FORWARD)),
        ];
        for m in &moves {
            for rotation in Rotation::non_zero_rotations() {
                assert_eq!(m.rotate_by(&rotation).rotate_by(&rotation.inverse()), *m);
            }
        }
    }

    #[test]
    fn rotating_r_by_y_gives_f() {
        let r = outer(Face::R, CubeDirection::FORWARD);
        let y = Rotation::new(Face::U, CubeDirection::FORWARD);
        assert_eq!(r.rotate_by(&y), outer(Face::F, CubeDirection::FORWARD));
    }

    #[test]
    fn move_counts() {
        let r2 = outer(Face::R, CubeDirection::DOUBLE);
        assert_eq!(r2.move_count(3, Metric::Qtm).unwrap(), 2);
        assert_eq!(r2.move_count(3, Metric::Htm).unwrap(), 1);

        let m_slice = crate::parser::parse_algorithm("M").unwrap();
        assert_eq!(m_slice.move_count(3, Metric::Qtm).unwrap(), 2);
        assert_eq!(m_slice.move_count(3, Metric::Htm).unwrap(), 2);

        let rotation = Move::Rotation(Rotation::new(Face::U, CubeDirection::FORWARD));
        assert_eq!(rotation.move_count(3, Metric::Qtm).unwrap(), 0);
        assert_eq!(rotation.move_count(3, Metric::Htm).unwrap(), 0);
    }

    #[test]
    fn decide_meaning_rejects_oversized_moves() {
        let wide_slice = Move::Slice(SliceMove::new(Face::R, CubeDirection::FORWARD, 3).unwrap());
        assert!(wide_slice.decide_meaning(4).is_err());
        assert!(wide_slice.decide_meaning(5).is_ok());

        let lowercase = crate::parser::parse_algorithm("u").unwrap();
        assert!(lowercase.moves()[0].decide_meaning(2).is_err());
    }

    #[test]
    fn join_cancels_same_axis_moves() {
        let r = outer(Face::R, CubeDirection::FORWARD);
        let joined = r.join_with_cancellation(&r, 3).unwrap();
        assert_eq!(joined.to_string(), "R2");

        let r_prime = r.inverse();
        let cancelled = r.join_with_cancellation(&r_prime, 3).unwrap();
        assert!(cancelled.is_empty());
    }

    #[test]
    fn join_merges_opposite_fat_blocks() {
        // R Lw covers the whole 3x3, leaving R2 and a rotation.
        let r = outer(Face::R, CubeDirection::FORWARD);
        let lw = Move::Fat(FatMove::new(Face::L, CubeDirection::FORWARD, 2).unwrap());
        let joined = r.join_with_cancellation(&lw, 3).unwrap();
        assert_eq!(joined.moves().len(), 2);
        assert!(matches!(joined.moves()[1], Move::Rotation(_)));
    }

    #[test]
    fn join_absorbs_full_width_fat_move_into_rotation() {
        // Rw followed by x' is just L on a 3x3.
        let rw = Move::Fat(FatMove::new(Face::R, CubeDirection::FORWARD, 2).unwrap());
        let x_prime = Move::Rotation(Rotation::new(Face::R, CubeDirection::BACKWARD));
        let joined = rw.join_with_cancellation(&x_prime, 3).unwrap();
        assert_eq!(joined.to_string(), "L");
    }

    #[test]
    fn skewb_moves_merge_on_the_same_corner() {
        let corner = Part::parse(PartKind::Corner, "URF").unwrap();
        let turn = Move::Skewb(SkewbMove::new(corner.clone(), SkewbDirection::FORWARD).unwrap());
        let joined = turn.join_with_cancellation(&turn, 3).unwrap();
        assert_eq!(
            joined.moves()[0],
            Move::Skewb(SkewbMove::new(corner, SkewbDirection::BACKWARD).unwrap())
        );
    }
}
