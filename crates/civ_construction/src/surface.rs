//! Sampling of terrain surface elevations from a voxel world.

use civ_schemas::coordinates::{AbsBlockPos, Area};
use civ_schemas::voxel::heightfield::HeightField;
use civ_schemas::voxel::voxeltypes::BlockRegistry;
use civ_schemas::voxel::world::VoxelWorld;
use tracing::debug;

/// Read-only scanner that finds, per column of an [`Area`], the topmost block
/// that counts as terrain surface (not air, not a liquid, not vegetation).
pub struct SurfaceSampler<'r> {
    registry: &'r BlockRegistry,
    max_deviation: i32,
}

impl<'r> SurfaceSampler<'r> {
    /// Creates a sampler scanning `max_deviation` blocks above and below the reference elevation.
    pub fn new(registry: &'r BlockRegistry, max_deviation: i32) -> Self {
        Self {
            registry,
            max_deviation,
        }
    }

    /// Half-height of the scanned vertical window, in blocks.
    pub fn max_deviation(&self) -> i32 {
        self.max_deviation
    }

    /// Scans `[reference_height - max_deviation, reference_height + max_deviation]` top to
    /// bottom in every column of `area` and records the first surface block found, so the
    /// highest qualifying block always wins.
    ///
    /// Columns without any qualifying block inside the window stay unresolved in the
    /// returned field; deciding how to treat them is left to the caller.
    pub fn sample<W: VoxelWorld + ?Sized>(&self, world: &W, area: Area, reference_height: i32) -> HeightField {
        let mut field = HeightField::unresolved(area);
        for column in area.iter() {
            for y in (reference_height - self.max_deviation..=reference_height + self.max_deviation).rev() {
                let entry = world.get_block(AbsBlockPos::new(column.x, y, column.y));
                // Ids missing from the registry cannot be classified; treat them as solid
                // ground like any other non-air, non-liquid, non-vegetation block.
                let is_surface = entry
                    .lookup(self.registry)
                    .map_or(true, |def| def.is_terrain_surface());
                if is_surface {
                    field.insert(column, y);
                    break;
                }
            }
        }
        debug!(
            %area,
            reference_height,
            resolved = field.resolved_count(),
            total = area.cell_count(),
            "sampled terrain surface"
        );
        field
    }
}
