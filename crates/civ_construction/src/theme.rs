//! Mapping from semantic building block roles to concrete registered block types.

use civ_schemas::registry::RegistryName;
use civ_schemas::voxel::voxeltypes::{BlockEntry, BlockRegistry, EMPTY_BLOCK_NAME};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prelude::HashMap;

/// Semantic roles a block can play in city construction, substituted with
/// concrete block types by a [`BlockTheme`] to allow visual style swaps.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum BlockRole {
    RoadFill,
    RoadSurface,
    LotEmpty,
    BuildingWall,
    BuildingFloor,
    BuildingFoundation,
    TowerWall,
    TowerStairs,
    RoofFlat,
    RoofHip,
    RoofSaddle,
    RoofDome,
    RoofGable,
    SimpleDoor,
    WingDoor,
    WindowGlass,
    Fence,
    FenceGate,
    Barrel,
    Ladder,
    PillarBase,
    PillarMiddle,
    PillarTop,
    Torch,
}

/// Errors from resolving a theme against the block registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThemeError {
    /// A role was mapped to a block name missing from the registry.
    #[error("Theme maps role {role:?} to unknown block {name}")]
    UnknownBlock {
        /// The role being resolved.
        role: BlockRole,
        /// The block name that could not be found.
        name: RegistryName,
    },
    /// The registry is missing the empty block, which themes use for openings.
    #[error("The block registry has no civ:empty block registered")]
    MissingEmptyBlock,
}

/// An immutable role → block mapping, resolved once against the block registry at
/// initialization and consumed read-only afterwards.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BlockTheme {
    roles: HashMap<BlockRole, BlockEntry>,
    air: BlockEntry,
}

impl BlockTheme {
    /// Starts building a theme.
    pub fn builder() -> BlockThemeBuilder {
        BlockThemeBuilder::default()
    }

    /// Returns the block for the given role, or air for roles the theme leaves open.
    pub fn block_for(&self, role: BlockRole) -> BlockEntry {
        self.roles.get(&role).copied().unwrap_or(self.air)
    }

    /// Checks if the theme maps the given role to a concrete block.
    pub fn covers(&self, role: BlockRole) -> bool {
        self.roles.contains_key(&role)
    }

    /// The empty block used for openings and unmapped roles.
    pub fn air(&self) -> BlockEntry {
        self.air
    }
}

/// Builder for [`BlockTheme`], collecting role mappings before resolving them in one pass.
#[derive(Clone, Debug, Default)]
pub struct BlockThemeBuilder {
    roles: Vec<(BlockRole, RegistryName)>,
    openings: Vec<BlockRole>,
}

impl BlockThemeBuilder {
    /// Maps a role to a named block.
    pub fn register(mut self, role: BlockRole, name: RegistryName) -> Self {
        self.roles.push((role, name));
        self
    }

    /// Maps a role to the empty block (doorways, window openings).
    pub fn register_empty(mut self, role: BlockRole) -> Self {
        self.openings.push(role);
        self
    }

    /// Resolves all registered mappings against the given registry.
    pub fn build(self, registry: &BlockRegistry) -> Result<BlockTheme, ThemeError> {
        let (air_id, _) = registry
            .lookup_name_to_object(EMPTY_BLOCK_NAME.as_ref())
            .ok_or(ThemeError::MissingEmptyBlock)?;
        let air = BlockEntry::new(air_id);

        let mut roles = HashMap::with_capacity(self.roles.len() + self.openings.len());
        for (role, name) in self.roles {
            let (id, _) = registry
                .lookup_name_to_object(name.as_ref())
                .ok_or(ThemeError::UnknownBlock { role, name })?;
            roles.insert(role, BlockEntry::new(id));
        }
        for role in self.openings {
            roles.insert(role, air);
        }
        Ok(BlockTheme { roles, air })
    }
}

#[cfg(test)]
mod test {
    use civ_schemas::dependencies::rgb::RGBA8;
    use civ_schemas::voxel::voxeltypes::{BlockDefinition, BlockFlags, EMPTY_BLOCK};

    use super::*;

    fn test_registry() -> BlockRegistry {
        let mut registry = BlockRegistry::default();
        registry.push_object(EMPTY_BLOCK.clone()).unwrap();
        registry
            .push_object(BlockDefinition {
                name: RegistryName::civ_const("stone_wall"),
                flags: BlockFlags::empty(),
                representative_color: RGBA8::new(100, 100, 100, 255),
                has_collision_box: true,
            })
            .unwrap();
        registry
    }

    #[test]
    fn resolves_roles() {
        let registry = test_registry();
        let theme = BlockTheme::builder()
            .register(BlockRole::BuildingWall, RegistryName::civ("stone_wall"))
            .register_empty(BlockRole::SimpleDoor)
            .build(&registry)
            .unwrap();

        assert!(theme.covers(BlockRole::BuildingWall));
        assert_ne!(theme.block_for(BlockRole::BuildingWall), theme.air());
        // openings map to air
        assert_eq!(theme.block_for(BlockRole::SimpleDoor), theme.air());
        // unmapped roles fall back to air
        assert!(!theme.covers(BlockRole::Torch));
        assert_eq!(theme.block_for(BlockRole::Torch), theme.air());
    }

    #[test]
    fn unknown_block_is_an_error() {
        let registry = test_registry();
        let result = BlockTheme::builder()
            .register(BlockRole::RoofFlat, RegistryName::civ("missing_tiles"))
            .build(&registry);
        assert_eq!(
            result.unwrap_err(),
            ThemeError::UnknownBlock {
                role: BlockRole::RoofFlat,
                name: RegistryName::civ("missing_tiles"),
            }
        );
    }

    #[test]
    fn empty_block_is_required() {
        let registry = BlockRegistry::default();
        let result = BlockTheme::builder().build(&registry);
        assert_eq!(result.unwrap_err(), ThemeError::MissingEmptyBlock);
    }
}
