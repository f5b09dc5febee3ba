// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Address-space regions exposed to remote peers.

pub mod region;
pub mod map;

pub use map::MemoryMap;
pub use region::{Granularity, Region};
