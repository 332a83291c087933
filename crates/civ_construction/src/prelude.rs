//! Common type aliases

// some of the imports here are not used yet, but are pre-defined for symmetry
#![allow(unused)]

// Anyhow error handling
pub use anyhow::{anyhow, bail, ensure, Context, Result};

// Common synchronization/cell types
pub use std::cell::{Cell, OnceCell, RefCell};
pub use std::rc::Rc;
pub use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock, Weak};

// hashbrown Hash* types
pub use hashbrown::{HashMap, HashSet};
