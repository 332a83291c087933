#![warn(missing_docs)]
#![deny(clippy::disallowed_types)]

//! A library crate of the in-memory representations of the game's core world data.

pub mod coordinates;
pub mod registry;
pub mod voxel;

/// Re-exported dependencies used in API types
pub mod dependencies {
    pub use bevy_math;
    pub use bitflags;
    pub use hashbrown;
    pub use itertools;
    pub use kstring;
    pub use rgb;
    pub use serde;
    pub use thiserror;
}
