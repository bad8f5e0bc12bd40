//! Spatial indexes for finding detections near each other.

use crate::{common::*, tiling::PixelRect};
use rstar::{
    primitives::{GeomWithData, Rectangle},
    RTree, AABB,
};

/// A static index over rectangles, built once and queried many times.
pub trait SpatialIndex {
    fn build(rects: &[PixelRect]) -> Self
    where
        Self: Sized;

    /// Append the positions of all rectangles overlapping `query` to
    /// `found`. Rectangles touching only at an edge are included.
    fn search(&self, query: &PixelRect, found: &mut Vec<usize>);
}

type IndexedRect = GeomWithData<Rectangle<[i32; 2]>, usize>;

/// Bulk-loaded R-tree.
pub struct RTreeIndex {
    tree: RTree<IndexedRect>,
}

impl SpatialIndex for RTreeIndex {
    fn build(rects: &[PixelRect]) -> Self {
        let items: Vec<IndexedRect> = rects
            .iter()
            .enumerate()
            .map(|(index, rect)| {
                let corners = Rectangle::from_corners([rect.l(), rect.t()], [rect.r(), rect.b()]);
                GeomWithData::new(corners, index)
            })
            .collect();

        Self {
            tree: RTree::bulk_load(items),
        }
    }

    fn search(&self, query: &PixelRect, found: &mut Vec<usize>) {
        let envelope = AABB::from_corners([query.l(), query.t()], [query.r(), query.b()]);
        found.extend(
            self.tree
                .locate_in_envelope_intersecting(&envelope)
                .map(|item| item.data),
        );
    }
}

/// Scans every rectangle on each query.
#[derive(Debug, Clone)]
pub struct LinearIndex {
    rects: Vec<PixelRect>,
}

impl SpatialIndex for LinearIndex {
    fn build(rects: &[PixelRect]) -> Self {
        Self {
            rects: rects.to_vec(),
        }
    }

    fn search(&self, query: &PixelRect, found: &mut Vec<usize>) {
        let overlapping = self.rects.iter().positions(|rect| {
            rect.l() <= query.r()
                && query.l() <= rect.r()
                && rect.t() <= query.b()
                && query.t() <= rect.b()
        });
        found.extend(overlapping);
    }
}
