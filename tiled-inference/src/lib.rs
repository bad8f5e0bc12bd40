//! Tiled object detection on images larger than the network input.
//!
//! The [tiling](crate::tiling) module splits an image into evenly spaced,
//! overlapping tiles sized to the network input. After running the
//! detector on every tile, the [merge](crate::merge) module folds
//! detections of the same object found in neighbouring tiles into one.

mod common;
pub mod config;
pub mod index;
pub mod merge;
pub mod tiling;

pub use config::Config;
pub use index::{LinearIndex, RTreeIndex, SpatialIndex};
pub use merge::{
    merge_boxes, merge_boxes_with_index, merge_objects, ClassId, MergeGroups, MergeOptions,
    MergeOutput, TiledBox, TiledObject,
};
pub use tiling::{
    compute_tile_spacing_and_count, origin_at, PixelRect, TileIndex, Tiling, TilingInit,
};
