//! Strongly typed newtype wrappers for the coordinate formats within the game's world, and related constants.

use std::fmt::{Display, Formatter};
use std::ops::Deref;

use bevy_math::{IVec2, IVec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a side of a chunk in blocks
pub const CHUNK_DIM: i32 = 32;
/// Length of a side of a chunk in blocks
pub const CHUNK_DIMZ: usize = CHUNK_DIM as usize;
/// Number of blocks on the face of a chunk
pub const CHUNK_DIM2: i32 = CHUNK_DIM * CHUNK_DIM;
/// Number of blocks in the volume of the chunk
pub const CHUNK_DIM3: i32 = CHUNK_DIM * CHUNK_DIM * CHUNK_DIM;
/// Number of blocks in the volume of the chunk
pub const CHUNK_DIM3Z: usize = (CHUNK_DIM * CHUNK_DIM * CHUNK_DIM) as usize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("Given coordinates were outside of chunk boundaries: {0}")]
/// Error when the given coordinates are outside of the chunk boundary.
pub struct InChunkVecError(IVec3);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("Given index was outside of chunk boundaries: {0}")]
/// Error when the given block index is outside of the chunk boundary.
pub struct InChunkIndexError(usize);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(transparent)]
/// A block position inside of a chunk, limited to 0..[CHUNK_DIM] on every axis
pub struct InChunkPos(pub(crate) IVec3);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(transparent)]
/// An absolute chunk position in a voxel world
pub struct AbsChunkPos(pub(crate) IVec3);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(transparent)]
/// An absolute block position in a voxel world
pub struct AbsBlockPos(pub(crate) IVec3);

// === Utils
macro_rules! impl_simple_ivec3_newtype {
    ($T:ident) => {
        impl $T {
            /// (0, 0, 0)
            pub const ZERO: Self = Self(IVec3::ZERO);
            /// (1, 1, 1)
            pub const ONE: Self = Self(IVec3::ONE);

            /// Const-friendly from<IVec3>
            pub const fn from_ivec3(value: IVec3) -> Self {
                Self(value)
            }

            /// Const-friendly into<IVec3>
            pub const fn into_ivec3(self) -> IVec3 {
                self.0
            }

            /// Constructs a new [`Self`] from the given coordinates.
            pub const fn new(x: i32, y: i32, z: i32) -> Self {
                Self(IVec3::new(x, y, z))
            }
        }

        impl From<IVec3> for $T {
            fn from(value: IVec3) -> Self {
                Self::from_ivec3(value)
            }
        }
        impl From<$T> for IVec3 {
            fn from(value: $T) -> IVec3 {
                value.into_ivec3()
            }
        }
        impl Deref for $T {
            type Target = IVec3;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
    };
}

// === InChunkPos

impl InChunkPos {
    /// (0, 0, 0)
    pub const ZERO: Self = Self(IVec3::ZERO);
    /// (31, 31, 31)
    pub const MAX: Self = Self(IVec3::splat(CHUNK_DIM - 1));

    /// Const-friendly try_from<IVec3>
    pub const fn try_from_ivec3(v: IVec3) -> Result<Self, InChunkVecError> {
        let IVec3 { x, y, z } = v;
        if (x < 0) || (x >= CHUNK_DIM) || (y < 0) || (y >= CHUNK_DIM) || (z < 0) || (z >= CHUNK_DIM) {
            Err(InChunkVecError(v))
        } else {
            Ok(Self(v))
        }
    }

    /// Constructs a new in-chunk position from the given coordinates, or returns an error if it's
    /// outside of chunk bounds.
    pub const fn try_new(x: i32, y: i32, z: i32) -> Result<Self, InChunkVecError> {
        Self::try_from_ivec3(IVec3::new(x, y, z))
    }

    /// Convert a XZY-strided index into a chunk storage array into the coordinates
    pub const fn try_from_index(idx: usize) -> Result<Self, InChunkIndexError> {
        if idx >= CHUNK_DIM3Z {
            return Err(InChunkIndexError(idx));
        }
        let i: i32 = idx as i32;
        Ok(InChunkPos(IVec3::new(
            i % CHUNK_DIM,
            (i / CHUNK_DIM2) % CHUNK_DIM,
            (i / CHUNK_DIM) % CHUNK_DIM,
        )))
    }

    /// Const-friendly into<IVec3>
    pub const fn into_ivec3(self) -> IVec3 {
        self.0
    }

    /// Converts the coordinates into an XZY-strided index into the chunk storage array
    pub const fn as_index(self) -> usize {
        (self.0.x + (CHUNK_DIM * self.0.z) + (CHUNK_DIM2 * self.0.y)) as usize
    }
}

impl TryFrom<IVec3> for InChunkPos {
    type Error = InChunkVecError;

    #[inline]
    fn try_from(value: IVec3) -> Result<Self, Self::Error> {
        Self::try_from_ivec3(value)
    }
}

impl From<InChunkPos> for IVec3 {
    #[inline]
    fn from(value: InChunkPos) -> IVec3 {
        value.0
    }
}

impl Deref for InChunkPos {
    type Target = IVec3;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// === AbsChunkPos
impl_simple_ivec3_newtype!(AbsChunkPos);
// === AbsBlockPos
impl_simple_ivec3_newtype!(AbsBlockPos);

impl AbsBlockPos {
    /// Splits the absolute position into the containing chunk's position and the position within that chunk.
    pub fn split_chunk_component(self) -> (AbsChunkPos, InChunkPos) {
        let chunk = self.0.div_euclid(IVec3::splat(CHUNK_DIM));
        let in_chunk = self.0.rem_euclid(IVec3::splat(CHUNK_DIM));
        (
            AbsChunkPos(chunk),
            InChunkPos::try_from_ivec3(in_chunk).expect("rem_euclid outside chunk bounds"),
        )
    }
}

impl From<AbsChunkPos> for AbsBlockPos {
    /// Returns the block position of the chunk's (0, 0, 0) corner.
    fn from(value: AbsChunkPos) -> AbsBlockPos {
        AbsBlockPos(value.0 * CHUNK_DIM)
    }
}

// === Area

/// An axis-aligned rectangle of block columns on the horizontal (XZ) plane, with *inclusive* corners.
///
/// The inclusive representation makes every constructible area span at least one column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Area {
    min: IVec2,
    max: IVec2,
}

impl Area {
    /// Constructs an area from two (inclusive) corner columns, in any order.
    pub fn from_corners(a: IVec2, b: IVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Constructs an area from its minimum corner and its size in columns, which must be positive on both axes.
    pub fn try_from_min_size(min: IVec2, size: IVec2) -> Result<Self, AreaSizeError> {
        if size.x <= 0 || size.y <= 0 {
            return Err(AreaSizeError(size));
        }
        Ok(Self {
            min,
            max: min + size - IVec2::ONE,
        })
    }

    /// A single-column area.
    pub const fn single(column: IVec2) -> Self {
        Self {
            min: column,
            max: column,
        }
    }

    /// Returns the corner with the smallest coordinates.
    pub const fn min(self) -> IVec2 {
        self.min
    }

    /// Returns the corner with the largest coordinates.
    pub const fn max(self) -> IVec2 {
        self.max
    }

    /// Size of the area along the X axis, in columns.
    pub const fn width(self) -> i32 {
        self.max.x - self.min.x + 1
    }

    /// Size of the area along the Z axis, in columns.
    pub const fn depth(self) -> i32 {
        self.max.y - self.min.y + 1
    }

    /// Total number of columns covered by the area.
    pub const fn cell_count(self) -> usize {
        (self.width() as usize) * (self.depth() as usize)
    }

    /// Checks if the given column lies within the area.
    pub fn contains(self, column: IVec2) -> bool {
        (self.min.x..=self.max.x).contains(&column.x) && (self.min.y..=self.max.y).contains(&column.y)
    }

    /// Returns an iterator over all the (x, z) columns inside this area, row by row.
    pub fn iter(self) -> impl Iterator<Item = IVec2> {
        itertools::iproduct!(self.min.x..=self.max.x, self.min.y..=self.max.y).map(|(x, z)| IVec2::new(x, z))
    }
}

impl Display for Area {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[({}, {})..=({}, {})]",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("Given area size has a non-positive axis: {0}")]
/// Error when constructing an [`Area`] from a size with a zero or negative axis.
pub struct AreaSizeError(IVec2);
