#![warn(missing_docs)]
#![deny(clippy::disallowed_types)]
#![allow(clippy::type_complexity)]

//! City construction systems for Civitas: terrain surface sampling, terrain
//! flattening and dispatch of composite buildings to part rasterizers.

pub mod config;
pub mod flatten;
pub mod parcel;
pub mod prelude;
pub mod raster;
pub mod surface;
pub mod theme;

pub use parcel::Construction;
