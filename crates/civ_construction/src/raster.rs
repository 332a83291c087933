//! The seam between parcels and the building-part rasterizer components.

use bevy_math::IVec2;
use civ_schemas::coordinates::{AbsBlockPos, Area};
use civ_schemas::voxel::heightfield::HeightField;
use civ_schemas::voxel::world::VoxelWorld;
use tracing::warn;

use crate::parcel::{BuildingPart, PartKind};
use crate::prelude::HashMap;
use crate::theme::{BlockRole, BlockTheme};

/// The terrain elevations a rasterizer builds on top of.
#[derive(Clone, Debug, PartialEq)]
pub enum HeightSource {
    /// A pre-flattened pad at a single elevation.
    Constant(i32),
    /// Per-column sampled elevations.
    Sampled(HeightField),
}

impl HeightSource {
    /// Returns the ground elevation of the given column, or `None` for unresolved or
    /// out-of-field columns of a sampled source.
    pub fn height_at(&self, column: IVec2) -> Option<i32> {
        match self {
            Self::Constant(height) => Some(*height),
            Self::Sampled(field) => field.get(column),
        }
    }
}

/// Write access handed to rasterizers: role-based block writes, clipped to a footprint.
pub trait RasterTarget {
    /// The footprint writes are clipped to.
    fn footprint(&self) -> Area;
    /// Writes the block for `role` at `position`, if the position's column is inside the footprint.
    fn set_block(&mut self, position: AbsBlockPos, role: BlockRole);
}

/// A [`RasterTarget`] writing straight into a voxel world through a theme.
pub struct WorldRasterTarget<'a, W: VoxelWorld + ?Sized> {
    world: &'a mut W,
    theme: &'a BlockTheme,
    footprint: Area,
}

impl<'a, W: VoxelWorld + ?Sized> WorldRasterTarget<'a, W> {
    /// Binds a world, a theme and the parcel footprint together.
    pub fn new(world: &'a mut W, theme: &'a BlockTheme, footprint: Area) -> Self {
        Self {
            world,
            theme,
            footprint,
        }
    }
}

impl<'a, W: VoxelWorld + ?Sized> RasterTarget for WorldRasterTarget<'a, W> {
    fn footprint(&self) -> Area {
        self.footprint
    }

    fn set_block(&mut self, position: AbsBlockPos, role: BlockRole) {
        if !self.footprint.contains(IVec2::new(position.x, position.z)) {
            return;
        }
        self.world.set_block(position, self.theme.block_for(role));
    }
}

/// A building-part rasterizer component, declaring the single part kind it renders.
///
/// The rendering algorithms live in external collaborator crates; this crate only owns
/// the dispatch seam.
pub trait PartRasterizer {
    /// The part kind this rasterizer renders.
    fn kind(&self) -> PartKind;
    /// Renders the given part onto the target. `part` is guaranteed to match [`Self::kind`].
    fn raster(&self, target: &mut dyn RasterTarget, part: &BuildingPart, heights: &HeightSource);
}

/// An explicit dispatch table from part kinds to their rasterizer components.
#[derive(Default)]
pub struct RasterizerSet {
    table: HashMap<PartKind, Box<dyn PartRasterizer>>,
}

impl RasterizerSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rasterizer under its declared kind, replacing (and warning about) any
    /// previous registration for that kind.
    pub fn register(&mut self, rasterizer: Box<dyn PartRasterizer>) {
        let kind = rasterizer.kind();
        if self.table.insert(kind, rasterizer).is_some() {
            warn!(?kind, "replacing previously registered part rasterizer");
        }
    }

    /// Looks up the rasterizer for the given part kind.
    pub fn get(&self, kind: PartKind) -> Option<&dyn PartRasterizer> {
        self.table.get(&kind).map(Box::as_ref)
    }

    /// Number of registered rasterizers.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Checks if no rasterizers are registered.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
