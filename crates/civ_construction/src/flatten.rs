//! Levelling of terrain footprints to a common building-pad elevation.

use std::cmp::Ordering;

use civ_schemas::coordinates::{AbsBlockPos, Area};
use civ_schemas::voxel::voxeltypes::{BlockEntry, BlockRegistry, EMPTY_BLOCK_NAME};
use civ_schemas::voxel::world::VoxelWorld;
use thiserror::Error;
use tracing::debug;

use crate::prelude::*;
use crate::surface::SurfaceSampler;

/// Errors from a terrain flattening pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlattenError {
    /// No column of the footprint had a terrain surface inside the sampled window, so
    /// there is no meaningful elevation to flatten to.
    #[error("no terrain surface found in {area} within {deviation} blocks of y={reference_height}")]
    NoSurface {
        /// The footprint that was sampled.
        area: Area,
        /// The reference elevation the window was centered on.
        reference_height: i32,
        /// Half-height of the sampled window.
        deviation: i32,
    },
}

/// Levels a terrain footprint: samples the surface, computes a mean elevation and
/// mutates the world so every sampled column's surface sits at that mean.
pub struct TerrainFlattener<'r> {
    sampler: SurfaceSampler<'r>,
    air: BlockEntry,
}

impl<'r> TerrainFlattener<'r> {
    /// Creates a flattener; fails if the registry has no empty block to carve with.
    pub fn new(registry: &'r BlockRegistry, max_deviation: i32) -> Result<Self> {
        let Some((air_id, _)) = registry.lookup_name_to_object(EMPTY_BLOCK_NAME.as_ref()) else {
            bail!("block registry has no {} block to carve terrain with", EMPTY_BLOCK_NAME);
        };
        Ok(Self {
            sampler: SurfaceSampler::new(registry, max_deviation),
            air: BlockEntry::new(air_id),
        })
    }

    /// The sampler used to read surface elevations.
    pub fn sampler(&self) -> &SurfaceSampler<'r> {
        &self.sampler
    }

    /// Flattens `area` around `reference_height` and returns the mean elevation the
    /// footprint was levelled to.
    ///
    /// The mean is the integer-truncated average over the *resolved* columns only;
    /// columns without a sampled surface contribute to neither the sum nor the divisor
    /// and are left untouched by the pass. Columns below the mean are backfilled with
    /// `fill` up to and including the mean, columns above it are carved down to it with
    /// air. Columns already at the mean are not written at all, which makes a repeated
    /// flatten of an unchanged footprint a no-op.
    ///
    /// Mutation is in-place and not transactional.
    pub fn flatten<W: VoxelWorld + ?Sized>(
        &self,
        world: &mut W,
        area: Area,
        reference_height: i32,
        fill: BlockEntry,
    ) -> Result<i32, FlattenError> {
        let field = self.sampler.sample(world, area, reference_height);
        let resolved = field.resolved_count();
        if resolved == 0 {
            return Err(FlattenError::NoSurface {
                area,
                reference_height,
                deviation: self.sampler.max_deviation(),
            });
        }

        let sum: i64 = field.iter_resolved().map(|(_, y)| i64::from(y)).sum();
        let mean = (sum / resolved as i64) as i32;

        let mut raised = 0u64;
        let mut carved = 0u64;
        for (column, y) in field.iter_resolved() {
            match y.cmp(&mean) {
                Ordering::Less => {
                    for i in y..=mean {
                        world.set_block(AbsBlockPos::new(column.x, i, column.y), fill);
                        raised += 1;
                    }
                }
                Ordering::Greater => {
                    for i in (mean + 1)..=y {
                        world.set_block(AbsBlockPos::new(column.x, i, column.y), self.air);
                        carved += 1;
                    }
                }
                Ordering::Equal => {}
            }
        }
        debug!(%area, mean, raised, carved, skipped = area.cell_count() - resolved, "flattened terrain");
        Ok(mean)
    }
}
