//! Construction system configuration handling

use civ_schemas::registry::RegistryName;
use smart_default::SmartDefault;

/// Tunables of the construction system.
///
/// Constructed explicitly by the host and passed by reference wherever needed;
/// there is no global configuration state.
#[derive(Clone, Eq, PartialEq, Debug, SmartDefault)]
pub struct ConstructionConfig {
    /// Half-height of the vertical window scanned when sampling the terrain
    /// surface around a reference elevation, in blocks.
    #[default = 40]
    pub max_surface_deviation: i32,
    /// The block used to backfill terrain below the flattening elevation when
    /// no explicit filler is given.
    #[default(RegistryName::civ_const("dirt"))]
    pub default_fill: RegistryName,
}
