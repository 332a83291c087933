//! Voxel-related data representations

pub mod heightfield;
pub mod voxeltypes;
pub mod world;
