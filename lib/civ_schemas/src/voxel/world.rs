//! Voxel world access interface and a chunked in-memory implementation.

use hashbrown::HashMap;

use crate::coordinates::{AbsBlockPos, AbsChunkPos, InChunkPos, CHUNK_DIM3Z};
use crate::voxel::voxeltypes::BlockEntry;

/// Read and write access to the blocks of a voxel world.
///
/// The handle is the single owner of the world for the duration of a call: reads borrow
/// `&self`, mutation requires `&mut self`, making exclusivity visible in the signatures.
/// Writes are immediate and visible to subsequent reads on the same handle, with no
/// transaction or rollback mechanism.
pub trait VoxelWorld {
    /// Returns the block stored at the given position.
    fn get_block(&self, position: AbsBlockPos) -> BlockEntry;
    /// Stores the given block at the given position.
    fn set_block(&mut self, position: AbsBlockPos, block: BlockEntry);
}

/// Per-chunk block storage: uniform until the first differing write, dense afterwards.
#[derive(Clone, Eq, PartialEq, Debug)]
enum ChunkBlocks {
    /// Every block in the chunk is the same.
    Uniform(BlockEntry),
    /// At least one block differs, XZY-strided dense array.
    Dense(Box<[BlockEntry; CHUNK_DIM3Z]>),
}

impl ChunkBlocks {
    fn get(&self, position: InChunkPos) -> BlockEntry {
        match self {
            Self::Uniform(e) => *e,
            Self::Dense(blocks) => blocks[position.as_index()],
        }
    }

    fn put(&mut self, position: InChunkPos, block: BlockEntry) {
        match self {
            Self::Uniform(e) => {
                if *e != block {
                    // Length is CHUNK_DIM3Z, the conversion cannot fail.
                    let mut blocks: Box<[BlockEntry; CHUNK_DIM3Z]> = vec![*e; CHUNK_DIM3Z]
                        .into_boxed_slice()
                        .try_into()
                        .unwrap();
                    blocks[position.as_index()] = block;
                    *self = Self::Dense(blocks);
                }
            }
            Self::Dense(blocks) => blocks[position.as_index()] = block,
        }
    }
}

/// A voxel world held fully in memory as a map of uniform-or-dense chunks.
///
/// Chunks that were never written to read as the world's empty block.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MemoryWorld {
    empty: BlockEntry,
    chunks: HashMap<AbsChunkPos, ChunkBlocks>,
}

impl MemoryWorld {
    /// Creates a world where every block is `empty` (the air block of the game's registry).
    pub fn new(empty: BlockEntry) -> Self {
        Self {
            empty,
            chunks: HashMap::new(),
        }
    }

    /// The block returned for never-written positions.
    pub fn empty_block(&self) -> BlockEntry {
        self.empty
    }

    /// Number of chunks that have been written to.
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

impl VoxelWorld for MemoryWorld {
    fn get_block(&self, position: AbsBlockPos) -> BlockEntry {
        let (chunk_pos, in_chunk) = position.split_chunk_component();
        match self.chunks.get(&chunk_pos) {
            Some(chunk) => chunk.get(in_chunk),
            None => self.empty,
        }
    }

    fn set_block(&mut self, position: AbsBlockPos, block: BlockEntry) {
        let (chunk_pos, in_chunk) = position.split_chunk_component();
        self.chunks
            .entry(chunk_pos)
            .or_insert(ChunkBlocks::Uniform(self.empty))
            .put(in_chunk, block);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::RegistryId;

    fn entry(id: u32) -> BlockEntry {
        BlockEntry::new(RegistryId::try_from(id).unwrap())
    }

    #[test]
    fn unwritten_positions_read_empty() {
        let world = MemoryWorld::new(entry(1));
        assert_eq!(world.get_block(AbsBlockPos::new(0, 0, 0)), entry(1));
        assert_eq!(world.get_block(AbsBlockPos::new(-1000, 250, 73)), entry(1));
        assert_eq!(world.loaded_chunk_count(), 0);
    }

    #[test]
    fn writes_are_immediately_visible() {
        let mut world = MemoryWorld::new(entry(1));
        let pos = AbsBlockPos::new(5, -17, -3);
        world.set_block(pos, entry(2));
        assert_eq!(world.get_block(pos), entry(2));
        // neighbors in the same chunk stay empty
        assert_eq!(world.get_block(AbsBlockPos::new(5, -18, -3)), entry(1));
    }

    #[test]
    fn writes_across_chunk_boundaries() {
        let mut world = MemoryWorld::new(entry(1));
        for x in 30..35 {
            world.set_block(AbsBlockPos::new(x, 0, 0), entry(3));
        }
        assert_eq!(world.loaded_chunk_count(), 2);
        for x in 30..35 {
            assert_eq!(world.get_block(AbsBlockPos::new(x, 0, 0)), entry(3));
        }
    }

    #[test]
    fn uniform_chunk_stays_uniform_on_identical_write() {
        let mut world = MemoryWorld::new(entry(1));
        world.set_block(AbsBlockPos::new(0, 0, 0), entry(1));
        let snapshot = world.clone();
        world.set_block(AbsBlockPos::new(1, 0, 0), entry(1));
        assert_eq!(world, snapshot);
    }
}
