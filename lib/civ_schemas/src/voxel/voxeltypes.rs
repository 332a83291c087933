//! Descriptors for in-game voxel/block types.
use std::fmt::{Debug, Formatter};

use bitflags::bitflags;
use rgb::RGBA8;
use serde::{Deserialize, Serialize};

use crate::registry::{Registry, RegistryId, RegistryName, RegistryNameRef, RegistryObject};

bitflags! {
    /// Classification flags of a block type, used by terrain routines to decide what counts as ground.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct BlockFlags: u8 {
        /// The block is empty space.
        const AIR = 1 << 0;
        /// The block is a liquid (water, lava, ...).
        const LIQUID = 1 << 1;
        /// The block is vegetation (plants, tall grass, ...).
        const VEGETATION = 1 << 2;
    }
}

/// A block type reference stored in a chunk, used to uniquely identify a registered block variant.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BlockEntry {
    /// The block ID in the registry
    pub id: RegistryId,
}

/// A named registry of block definitions.
pub type BlockRegistry = Registry<BlockDefinition>;

impl BlockEntry {
    /// Helper to construct a new block entry
    pub fn new(id: RegistryId) -> Self {
        Self { id }
    }

    /// Helper to look up the block definition corresponding to this entry
    pub fn lookup(self, registry: &BlockRegistry) -> Option<&BlockDefinition> {
        registry.lookup_id_to_object(self.id)
    }
}

impl Debug for BlockEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlockEntry{{id={}}}", self.id)
    }
}

/// A definition of a block type, specifying properties such as registry name, classification and color.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// The unique registry name
    pub name: RegistryName,
    /// Classification flags used by terrain routines
    pub flags: BlockFlags,
    /// A color that can represent the block on maps, debug views, etc.
    pub representative_color: RGBA8,
    /// If the block can be collided with
    pub has_collision_box: bool,
}

impl BlockDefinition {
    /// Checks if the block counts as a terrain surface: not air, not a liquid and not vegetation.
    pub fn is_terrain_surface(&self) -> bool {
        !self
            .flags
            .intersects(BlockFlags::AIR | BlockFlags::LIQUID | BlockFlags::VEGETATION)
    }
}

/// The registry name of [`EMPTY_BLOCK`]
pub const EMPTY_BLOCK_NAME: RegistryName = RegistryName::civ_const("empty");

/// The empty (air) block definition, also used when no specific blocks have been generated
pub static EMPTY_BLOCK: BlockDefinition = BlockDefinition {
    name: EMPTY_BLOCK_NAME,
    flags: BlockFlags::AIR,
    representative_color: RGBA8::new(0, 0, 0, 0),
    has_collision_box: false,
};

impl RegistryObject for BlockDefinition {
    fn registry_name(&self) -> RegistryNameRef {
        self.name.as_ref()
    }
}
