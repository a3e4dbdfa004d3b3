//! Data models shared between the catalog and its collaborators.

mod video;

pub use video::*;
