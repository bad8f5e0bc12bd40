//! Merging detections of the same object found in neighbouring tiles.

use crate::{
    common::*,
    index::{RTreeIndex, SpatialIndex},
    tiling::{PixelRect, TileIndex, Tiling},
};
use std::ops::Range;

/// Class label assigned by the detector.
pub type ClassId = i32;

/// A detection tagged with the tile it was found in.
pub type TiledBox = TileLabel<PixelRect, ClassId>;

/// The result of an object detector that can be merged across tiles.
pub trait TiledObject {
    fn tiled_box(&self) -> TiledBox;
}

impl TiledObject for TiledBox {
    fn tiled_box(&self) -> TiledBox {
        *self
    }
}

impl<T> TiledObject for &T
where
    T: TiledObject,
{
    fn tiled_box(&self) -> TiledBox {
        (*self).tiled_box()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Minimum intersection over union for two boxes to be the same object.
    pub min_iou: R64,
    /// Whether boxes with different classes may be merged.
    pub merge_different_classes: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            min_iou: r64(0.5),
            merge_different_classes: false,
        }
    }
}

/// Groups of input positions stored in one flat buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeGroups {
    indices: Vec<usize>,
    offsets: Vec<usize>,
}

impl MergeGroups {
    fn push_group(&mut self) {
        self.offsets.push(self.indices.len());
    }

    fn push_member(&mut self, index: usize) {
        self.indices.push(index);
    }

    fn range(&self, group: usize) -> Range<usize> {
        let start = self.offsets[group];
        let end = self
            .offsets
            .get(group + 1)
            .copied()
            .unwrap_or(self.indices.len());
        start..end
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn get(&self, group: usize) -> Option<&[usize]> {
        (group < self.len()).then(|| &self.indices[self.range(group)])
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.len()).map(move |group| &self.indices[self.range(group)])
    }

    pub fn to_vecs(&self) -> Vec<Vec<usize>> {
        self.iter().map(|group| group.to_vec()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutput {
    /// Positions in the input that belong to each merged box.
    pub groups: MergeGroups,
    /// One box per group, bounding all members of the group.
    pub merged: Vec<TiledBox>,
}

/// Merge objects from a tiled inference run.
///
/// See [merge_boxes] for the output format.
pub fn merge_objects<O>(
    tiling: &Tiling,
    objects: &[O],
    options: Option<&MergeOptions>,
) -> MergeOutput
where
    O: TiledObject,
{
    let boxes: Vec<_> = objects.iter().map(|obj| obj.tiled_box()).collect();
    merge_boxes(tiling, &boxes, options)
}

/// Merge boxes that were detected more than once across tile boundaries.
///
/// Most groups contain one box. The merged box of a group is the
/// closure of its members, with the class and tile of its first member.
/// Groups appear in the order of their first member in `boxes`.
/// `None` options fall back to [MergeOptions::default].
pub fn merge_boxes(
    tiling: &Tiling,
    boxes: &[TiledBox],
    options: Option<&MergeOptions>,
) -> MergeOutput {
    merge_boxes_with_index::<RTreeIndex>(tiling, boxes, options)
}

/// Same as [merge_boxes] with a custom spatial index.
pub fn merge_boxes_with_index<I>(
    tiling: &Tiling,
    boxes: &[TiledBox],
    options: Option<&MergeOptions>,
) -> MergeOutput
where
    I: SpatialIndex,
{
    let MergeOptions {
        min_iou,
        merge_different_classes,
    } = options.copied().unwrap_or_default();
    let min_iou = min_iou.raw();

    let rects: Vec<PixelRect> = boxes.iter().map(|bbox| bbox.rect).collect();
    let index = I::build(&rects);

    let mut consumed = vec![false; boxes.len()];
    let mut groups = MergeGroups::default();
    let mut merged = vec![];

    // reused across seeds
    let mut nearby = vec![];
    let mut group_tiles: Vec<TileIndex> = vec![];

    for (seed, seed_box) in boxes.iter().enumerate() {
        if consumed[seed] {
            continue;
        }
        consumed[seed] = true;
        groups.push_group();
        groups.push_member(seed);
        group_tiles.clear();
        group_tiles.push(seed_box.tile);

        let mut merged_rect = seed_box.rect;

        // The clipper shrinks with every tile merged into this group.
        let mut clipper = tiling.tile_rect_at(seed_box.tile);

        nearby.clear();
        index.search(&seed_box.rect, &mut nearby);

        // Candidates of the same tile end up adjacent, from the lowest to
        // the highest overlap with the seed.
        nearby.sort_by_cached_key(|&other| {
            let other_box = &boxes[other];
            (
                other_box.tile,
                r64(other_box.rect.iou_with(&merged_rect)),
                Reverse(other),
            )
        });

        let runs = nearby.iter().group_by(|&&other| boxes[other].tile);

        for (tile, candidates) in &runs {
            // at most one box per tile, otherwise we'd redo the NMS of the detector
            if group_tiles.contains(&tile) {
                continue;
            }

            // Both boxes are clipped to the region seen by every tile
            // involved. A sliver of an object detected at the edge of a
            // tile would otherwise have a low IoU and escape the merge.
            let new_clipper = clipper.clip_to(&tiling.tile_rect_at(tile));
            let merged_clipped = merged_rect.clip_to(&new_clipper);

            // the last passing candidate has the highest overlap
            let accepted = candidates
                .copied()
                .filter(|&other| {
                    let other_box = &boxes[other];
                    !consumed[other]
                        && (merge_different_classes || other_box.class == seed_box.class)
                })
                .filter(|&other| {
                    let other_clipped = boxes[other].rect.clip_to(&new_clipper);
                    merged_clipped.iou_with(&other_clipped) >= min_iou
                })
                .last();

            if let Some(other) = accepted {
                trace!(
                    "merge box {} from tile {} into box {} from tile {}",
                    other,
                    tile,
                    seed,
                    seed_box.tile
                );

                consumed[other] = true;
                merged_rect = merged_rect.closure_with(&boxes[other].rect);
                clipper = new_clipper;
                groups.push_member(other);
                group_tiles.push(tile);
            }
        }

        merged.push(TiledBox {
            rect: merged_rect,
            tile: seed_box.tile,
            class: seed_box.class,
        });
    }

    debug!("merged {} boxes into {} groups", boxes.len(), merged.len());

    MergeOutput { groups, merged }
}
