//! Building parcels and the construction system tying sampling, flattening and
//! rasterizer dispatch together.

use bevy_math::IVec2;
use civ_schemas::coordinates::{AbsBlockPos, Area};
use civ_schemas::voxel::heightfield::HeightField;
use civ_schemas::voxel::voxeltypes::{BlockEntry, BlockRegistry};
use civ_schemas::voxel::world::VoxelWorld;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::config::ConstructionConfig;
use crate::flatten::{FlattenError, TerrainFlattener};
use crate::prelude::*;
use crate::raster::{HeightSource, RasterizerSet, WorldRasterTarget};
use crate::surface::SurfaceSampler;
use crate::theme::{BlockRole, BlockTheme};

/// The kinds of building parts a composite building can be assembled from, one per
/// rasterizer component.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum PartKind {
    HollowPart,
    Column,
    RectPart,
    RoundPart,
    SingleBlock,
    Staircase,
    SimpleDoor,
    WingDoor,
    ConicRoof,
    DomeRoof,
    FlatRoof,
    HipRoof,
    PentRoof,
    SaddleRoof,
}

/// One tagged part of a composite building, with the geometry its rasterizer needs.
///
/// Elevations are relative to the parcel's pad height.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum BuildingPart {
    /// A hollow cuboid shell (walls only).
    Hollow { bounds: Area, base: i32, height: i32 },
    /// A 1×1 pillar of blocks.
    Column { column: IVec2, base: i32, height: i32 },
    /// A filled cuboid.
    Rect { bounds: Area, base: i32, height: i32 },
    /// A cylindrical part.
    Round {
        center: IVec2,
        radius: i32,
        base: i32,
        height: i32,
    },
    /// A single block of the given role.
    SingleBlock { position: AbsBlockPos, role: BlockRole },
    /// A straight staircase climbing along the longer axis of its bounds.
    Staircase { bounds: Area, base: i32, height: i32 },
    /// A one-block doorway.
    SimpleDoor { position: AbsBlockPos },
    /// A multi-block door opening.
    WingDoor { bounds: Area, base: i32 },
    /// Roofs of the various supported silhouettes.
    ConicRoof { bounds: Area, base: i32, pitch: i32 },
    DomeRoof { bounds: Area, base: i32, height: i32 },
    FlatRoof { bounds: Area, base: i32 },
    HipRoof { bounds: Area, base: i32, pitch: i32 },
    PentRoof { bounds: Area, base: i32, pitch: i32 },
    SaddleRoof { bounds: Area, base: i32, pitch: i32 },
}

impl BuildingPart {
    /// The dispatch tag of this part.
    pub fn kind(&self) -> PartKind {
        match self {
            Self::Hollow { .. } => PartKind::HollowPart,
            Self::Column { .. } => PartKind::Column,
            Self::Rect { .. } => PartKind::RectPart,
            Self::Round { .. } => PartKind::RoundPart,
            Self::SingleBlock { .. } => PartKind::SingleBlock,
            Self::Staircase { .. } => PartKind::Staircase,
            Self::SimpleDoor { .. } => PartKind::SimpleDoor,
            Self::WingDoor { .. } => PartKind::WingDoor,
            Self::ConicRoof { .. } => PartKind::ConicRoof,
            Self::DomeRoof { .. } => PartKind::DomeRoof,
            Self::FlatRoof { .. } => PartKind::FlatRoof,
            Self::HipRoof { .. } => PartKind::HipRoof,
            Self::PentRoof { .. } => PartKind::PentRoof,
            Self::SaddleRoof { .. } => PartKind::SaddleRoof,
        }
    }
}

/// A building described as a composition of tagged parts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeBuilding {
    parts: SmallVec<[BuildingPart; 4]>,
}

impl CompositeBuilding {
    /// Creates a building from its parts.
    pub fn new(parts: impl IntoIterator<Item = BuildingPart>) -> Self {
        Self {
            parts: parts.into_iter().collect(),
        }
    }

    /// The parts of this building, in rendering order.
    pub fn parts(&self) -> &[BuildingPart] {
        &self.parts
    }
}

/// A designated footprint in the world reserved for buildings, with a levelled pad elevation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    /// The footprint shape all rasterizer writes are clipped to.
    pub shape: Area,
    /// The levelled building-pad elevation, as returned by a flatten pass.
    pub height: i32,
    /// The buildings to place on the parcel.
    pub buildings: Vec<CompositeBuilding>,
}

/// The city construction system: samples and flattens terrain and hands building
/// parcels off to the registered part rasterizers.
///
/// Holds only shared references to the block registry; constructed explicitly by the
/// host once the registry and theme are ready.
pub struct Construction<'r> {
    theme: BlockTheme,
    default_fill: BlockEntry,
    sampler: SurfaceSampler<'r>,
    flattener: TerrainFlattener<'r>,
}

impl<'r> Construction<'r> {
    /// Creates the construction system, resolving the configured default fill block
    /// against the registry.
    pub fn new(registry: &'r BlockRegistry, theme: BlockTheme, config: &ConstructionConfig) -> Result<Self> {
        ensure!(
            config.max_surface_deviation > 0,
            "max_surface_deviation must be positive, got {}",
            config.max_surface_deviation
        );
        let Some((fill_id, _)) = registry.lookup_name_to_object(config.default_fill.as_ref()) else {
            bail!("configured default fill block {} is not registered", config.default_fill);
        };
        Ok(Self {
            theme,
            default_fill: BlockEntry::new(fill_id),
            sampler: SurfaceSampler::new(registry, config.max_surface_deviation),
            flattener: TerrainFlattener::new(registry, config.max_surface_deviation)?,
        })
    }

    /// The theme used to resolve block roles during rasterization.
    pub fn theme(&self) -> &BlockTheme {
        &self.theme
    }

    /// Samples the terrain surface of `area` around `reference_height` without
    /// modifying the world.
    pub fn sample<W: VoxelWorld + ?Sized>(&self, world: &W, area: Area, reference_height: i32) -> HeightField {
        self.sampler.sample(world, area, reference_height)
    }

    /// Flattens `area` with the given filler block, returning the pad elevation.
    pub fn flatten<W: VoxelWorld + ?Sized>(
        &self,
        world: &mut W,
        area: Area,
        reference_height: i32,
        fill: BlockEntry,
    ) -> Result<i32, FlattenError> {
        self.flattener.flatten(world, area, reference_height, fill)
    }

    /// Flattens `area` with the configured default filler block.
    pub fn flatten_default<W: VoxelWorld + ?Sized>(
        &self,
        world: &mut W,
        area: Area,
        reference_height: i32,
    ) -> Result<i32, FlattenError> {
        self.flattener.flatten(world, area, reference_height, self.default_fill)
    }

    /// Renders every part of every building of the parcel through the rasterizer set,
    /// on top of a constant height source at the parcel's pad elevation.
    ///
    /// Parts without a registered rasterizer are skipped.
    pub fn build_parcel<W: VoxelWorld + ?Sized>(&self, world: &mut W, parcel: &Parcel, rasterizers: &RasterizerSet) {
        let heights = HeightSource::Constant(parcel.height);
        let mut target = WorldRasterTarget::new(world, &self.theme, parcel.shape);
        let mut rendered = 0usize;
        for building in &parcel.buildings {
            for part in building.parts() {
                match rasterizers.get(part.kind()) {
                    Some(rasterizer) => {
                        rasterizer.raster(&mut target, part, &heights);
                        rendered += 1;
                    }
                    None => trace!(kind = ?part.kind(), "no rasterizer registered for part kind"),
                }
            }
        }
        debug!(
            shape = %parcel.shape,
            height = parcel.height,
            buildings = parcel.buildings.len(),
            rendered,
            "built parcel"
        );
    }
}

#[cfg(test)]
mod test {
    use civ_schemas::dependencies::rgb::RGBA8;
    use civ_schemas::registry::RegistryName;
    use civ_schemas::voxel::voxeltypes::{BlockDefinition, BlockFlags, EMPTY_BLOCK};
    use civ_schemas::voxel::world::MemoryWorld;

    use super::*;
    use crate::raster::{PartRasterizer, RasterTarget};

    fn test_registry() -> BlockRegistry {
        let mut registry = BlockRegistry::default();
        registry.push_object(EMPTY_BLOCK.clone()).unwrap();
        for name in ["dirt", "stone", "brick"] {
            registry
                .push_object(BlockDefinition {
                    name: RegistryName::civ(name),
                    flags: BlockFlags::empty(),
                    representative_color: RGBA8::new(0, 0, 0, 255),
                    has_collision_box: true,
                })
                .unwrap();
        }
        registry
    }

    fn test_theme(registry: &BlockRegistry) -> BlockTheme {
        BlockTheme::builder()
            .register(BlockRole::BuildingWall, RegistryName::civ("brick"))
            .register(BlockRole::BuildingFoundation, RegistryName::civ("stone"))
            .register_empty(BlockRole::SimpleDoor)
            .build(registry)
            .unwrap()
    }

    /// Renders a filled cuboid of walls; stands in for the external part components.
    struct RectStub;

    impl PartRasterizer for RectStub {
        fn kind(&self) -> PartKind {
            PartKind::RectPart
        }

        fn raster(&self, target: &mut dyn RasterTarget, part: &BuildingPart, heights: &HeightSource) {
            let BuildingPart::Rect { bounds, base, height } = part else {
                unreachable!("dispatched part of wrong kind");
            };
            for column in bounds.iter() {
                let Some(ground) = heights.height_at(column) else {
                    continue;
                };
                for y in ground + base..ground + base + height {
                    target.set_block(AbsBlockPos::new(column.x, y, column.y), BlockRole::BuildingWall);
                }
            }
        }
    }

    /// Records which parts reached it instead of writing blocks.
    struct CountingStub {
        kind: PartKind,
        hits: Rc<Cell<usize>>,
    }

    impl PartRasterizer for CountingStub {
        fn kind(&self) -> PartKind {
            self.kind
        }

        fn raster(&self, _target: &mut dyn RasterTarget, part: &BuildingPart, _heights: &HeightSource) {
            assert_eq!(part.kind(), self.kind);
            self.hits.set(self.hits.get() + 1);
        }
    }

    #[test]
    fn construction_requires_a_registered_fill_block() {
        let registry = test_registry();
        let theme = test_theme(&registry);
        let config = ConstructionConfig {
            default_fill: RegistryName::civ("unobtainium"),
            ..ConstructionConfig::default()
        };
        assert!(Construction::new(&registry, theme, &config).is_err());
    }

    #[test]
    fn flatten_default_then_build_places_blocks_on_the_pad() {
        let registry = test_registry();
        let construction = Construction::new(&registry, test_theme(&registry), &ConstructionConfig::default()).unwrap();
        let air = construction.theme().air();
        let brick = construction.theme().block_for(BlockRole::BuildingWall);

        let (stone_id, _) = registry
            .lookup_name_to_object(RegistryName::civ("stone").as_ref())
            .unwrap();
        let stone = BlockEntry::new(stone_id);
        let shape = Area::from_corners(IVec2::new(0, 0), IVec2::new(5, 5));
        let mut world = MemoryWorld::new(air);
        for column in shape.iter() {
            for y in 0..=4 + (column.x % 3) {
                world.set_block(AbsBlockPos::new(column.x, y, column.y), stone);
            }
        }

        let pad = construction.flatten_default(&mut world, shape, 5).unwrap();

        let mut rasterizers = RasterizerSet::new();
        rasterizers.register(Box::new(RectStub));
        let bounds = Area::from_corners(IVec2::new(1, 1), IVec2::new(3, 3));
        let parcel = Parcel {
            shape,
            height: pad,
            buildings: vec![CompositeBuilding::new([BuildingPart::Rect {
                bounds,
                base: 1,
                height: 2,
            }])],
        };
        construction.build_parcel(&mut world, &parcel, &rasterizers);

        for column in bounds.iter() {
            assert_eq!(world.get_block(AbsBlockPos::new(column.x, pad + 1, column.y)), brick);
            assert_eq!(world.get_block(AbsBlockPos::new(column.x, pad + 2, column.y)), brick);
            assert_eq!(world.get_block(AbsBlockPos::new(column.x, pad + 3, column.y)), air);
        }
    }

    #[test]
    fn parts_dispatch_only_to_their_kind() {
        let registry = test_registry();
        let construction = Construction::new(&registry, test_theme(&registry), &ConstructionConfig::default()).unwrap();
        let mut world = MemoryWorld::new(construction.theme().air());

        let column_hits = Rc::new(Cell::new(0));
        let door_hits = Rc::new(Cell::new(0));
        let mut rasterizers = RasterizerSet::new();
        rasterizers.register(Box::new(CountingStub {
            kind: PartKind::Column,
            hits: Rc::clone(&column_hits),
        }));
        rasterizers.register(Box::new(CountingStub {
            kind: PartKind::SimpleDoor,
            hits: Rc::clone(&door_hits),
        }));
        assert_eq!(rasterizers.len(), 2);

        let shape = Area::from_corners(IVec2::new(0, 0), IVec2::new(7, 7));
        let parcel = Parcel {
            shape,
            height: 10,
            buildings: vec![CompositeBuilding::new([
                BuildingPart::Column {
                    column: IVec2::new(1, 1),
                    base: 0,
                    height: 4,
                },
                BuildingPart::SimpleDoor {
                    position: AbsBlockPos::new(2, 11, 1),
                },
                BuildingPart::Column {
                    column: IVec2::new(3, 3),
                    base: 0,
                    height: 4,
                },
                // no rasterizer registered for roofs, silently skipped
                BuildingPart::FlatRoof {
                    bounds: shape,
                    base: 5,
                },
            ])],
        };
        construction.build_parcel(&mut world, &parcel, &rasterizers);

        assert_eq!(column_hits.get(), 2);
        assert_eq!(door_hits.get(), 1);
    }
}
