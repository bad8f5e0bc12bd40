//! Splitting an image into tiles for inference.
//!
//! Padding is only added between tiles, never on the outer edges of the
//! image, since that would run the network outside of the image. The
//! discussion below covers one axis; the other axis is handled the same
//! way.
//!
//! Let `N` be the network size and `P` the minimum padding. The part of
//! a tile that is not padding is its valid region, and the valid regions
//! together must cover the whole image. The two exterior tiles have
//! padding on their inner side only, and every interior tile has it on
//! both sides.
//!
//! ```text
//! exterior_valid = N - P
//! interior_valid = N - 2 * P
//! inner_valid    = image_size - 2 * exterior_valid
//! num_tiles      = 2 + ceil(inner_valid / interior_valid)
//! ```
//!
//! The tiles are then spread evenly over the image, so that the first
//! tile starts at zero and the last one ends exactly at the image edge.
//! The resulting padding is often larger than `P`. Tile origins are
//! rounded to whole pixels, so the spacing between neighbouring tiles
//! may differ by one pixel.

use crate::common::*;

/// Flat index of a tile, `ty * num_x + tx`.
pub type TileIndex = usize;

/// Rectangle in image pixel coordinates.
pub type PixelRect = TLBR<i32>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilingInit {
    pub image_size: HW<usize>,
    pub network_size: HW<usize>,
    pub min_padding: usize,
}

impl TilingInit {
    pub fn build(self) -> Result<Tiling> {
        let Self {
            image_size,
            network_size,
            min_padding,
        } = self;

        let (space_y, num_y) =
            compute_tile_spacing_and_count(image_size.h(), network_size.h(), min_padding)?;
        let (space_x, num_x) =
            compute_tile_spacing_and_count(image_size.w(), network_size.w(), min_padding)?;

        debug!(
            "tiling {}x{} image for {}x{} network: {}x{} tiles, spacing {:.2}x{:.2}",
            image_size.w(),
            image_size.h(),
            network_size.w(),
            network_size.h(),
            num_x,
            num_y,
            space_x,
            space_y
        );

        Ok(Tiling {
            space_x,
            space_y,
            num_x,
            num_y,
            network_size,
            image_size,
        })
    }
}

/// Defines how an image is split into tiles.
#[derive(Debug, Clone, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Tiling {
    /// Horizontal pixels between the origins of neighbouring tiles.
    space_x: f64,
    /// Vertical pixels between the origins of neighbouring tiles.
    space_y: f64,
    num_x: usize,
    num_y: usize,
    network_size: HW<usize>,
    image_size: HW<usize>,
}

impl Tiling {
    /// Returns true if the whole image fits in a single tile.
    pub fn is_single(&self) -> bool {
        self.num_x == 1 && self.num_y == 1
    }

    pub fn num_tiles(&self) -> usize {
        self.num_x * self.num_y
    }

    /// The (x, y) pixel position of the top-left corner of a tile.
    pub fn tile_origin(&self, tx: usize, ty: usize) -> (usize, usize) {
        (origin_at(tx, self.space_x), origin_at(ty, self.space_y))
    }

    /// The image region covered by a tile.
    ///
    /// Tiles of an image smaller than the network are cut at the image
    /// edge.
    pub fn tile_rect(&self, tx: usize, ty: usize) -> PixelRect {
        let (x, y) = self.tile_origin(tx, ty);
        let [h, w] = self.network_size.cast::<i32>().hw();
        let rect = PixelRect::from_tlhw([y as i32, x as i32, h, w]);
        rect.clip_to(&self.image_rect())
    }

    /// The region of the whole image.
    pub fn image_rect(&self) -> PixelRect {
        self.image_size.cast::<i32>().to_tlbr()
    }

    pub fn tile_rect_at(&self, index: TileIndex) -> PixelRect {
        debug_assert!(
            index < self.num_tiles(),
            "tile index {} is out of range for {} tiles",
            index,
            self.num_tiles()
        );
        let (tx, ty) = self.split_tile_index(index);
        self.tile_rect(tx, ty)
    }

    pub fn make_tile_index(&self, tx: usize, ty: usize) -> TileIndex {
        ty * self.num_x + tx
    }

    /// Inverse of [make_tile_index](Self::make_tile_index).
    pub fn split_tile_index(&self, index: TileIndex) -> (usize, usize) {
        (index % self.num_x, index / self.num_x)
    }

    /// Iterate over all tiles and their regions in index order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileIndex, PixelRect)> + '_ {
        (0..self.num_tiles()).map(move |index| (index, self.tile_rect_at(index)))
    }

    /// Move a detection from tile-local to image coordinates and tag it
    /// with the tile it came from.
    pub fn to_image_label<C>(
        &self,
        tile: TileIndex,
        label: Label<PixelRect, C>,
    ) -> TileLabel<PixelRect, C>
    where
        C: Copy,
    {
        let (tx, ty) = self.split_tile_index(tile);
        let (x, y) = self.tile_origin(tx, ty);
        TileLabel::new(label.translate(y as i32, x as i32), tile)
    }
}

/// The position of the i-th tile origin along one axis.
pub fn origin_at(index: usize, spacing: f64) -> usize {
    (index as f64 * spacing + 0.5) as usize
}

/// Split one axis into evenly spaced tiles.
///
/// Returns the spacing between tile origins and the number of tiles.
pub fn compute_tile_spacing_and_count(
    image_size: usize,
    network_size: usize,
    min_padding: usize,
) -> Result<(f64, usize)> {
    ensure!(image_size > 0, "image size must be positive");
    ensure!(network_size > 0, "network size must be positive");
    ensure!(
        min_padding < network_size / 2,
        "padding {} is too large for network size {}",
        min_padding,
        network_size
    );

    if image_size <= network_size {
        return Ok((0.0, 1));
    }

    let exterior_valid = network_size - min_padding;
    let interior_valid = network_size - min_padding * 2;
    let inner_valid = image_size.saturating_sub(exterior_valid * 2);
    let num_inner_tiles = (inner_valid + interior_valid - 1) / interior_valid;
    let num_tiles = 2 + num_inner_tiles;
    let spacing = (image_size - network_size) as f64 / (num_tiles - 1) as f64;

    Ok((spacing, num_tiles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn tile_origins(image_size: usize, network_size: usize, min_padding: usize) -> Vec<usize> {
        let (spacing, num_tiles) =
            compute_tile_spacing_and_count(image_size, network_size, min_padding).unwrap();
        (0..num_tiles).map(|i| origin_at(i, spacing)).collect()
    }

    fn validate_split(
        image_size: usize,
        network_size: usize,
        min_padding: usize,
        expect: Option<Vec<usize>>,
    ) {
        let origins = tile_origins(image_size, network_size, min_padding);

        if let Some(expect) = expect {
            assert_eq!(origins, expect);
        }

        origins.iter().tuple_windows().for_each(|(&prev, &next)| {
            let overlap = (prev + network_size) as isize - next as isize;
            assert!(
                overlap >= min_padding as isize,
                "overlap {} is less than {} for ({}, {}, {})",
                overlap,
                min_padding,
                image_size,
                network_size,
                min_padding
            );
        });

        assert_eq!(origins[0], 0);

        if image_size >= network_size {
            assert_eq!(*origins.last().unwrap(), image_size - network_size);
        } else {
            assert_eq!(origins.len(), 1);
        }
    }

    #[test]
    fn tile_positions() {
        validate_split(10, 11, 2, Some(vec![0]));
        validate_split(10, 10, 0, Some(vec![0]));
        validate_split(10, 10, 3, Some(vec![0]));
        validate_split(10, 5, 0, Some(vec![0, 5]));
        validate_split(14, 6, 1, Some(vec![0, 4, 8]));
        validate_split(20, 6, 2, None);
        validate_split(1024, 640, 32, None);
        validate_split(1280, 640, 32, None);

        for image_size in 14..20 {
            for network_size in 6..=14 {
                for min_padding in 1..=2 {
                    validate_split(image_size, network_size, min_padding, None);
                }
            }
        }
    }

    #[test]
    fn random_tile_positions() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            let network_size = rng.gen_range(2..=1024);
            let min_padding = rng.gen_range(0..network_size / 2);
            let image_size = rng.gen_range(1..=8192);
            validate_split(image_size, network_size, min_padding, None);
        }
    }

    #[test]
    fn padding_too_large() {
        assert!(compute_tile_spacing_and_count(100, 20, 10).is_err());
        assert!(compute_tile_spacing_and_count(100, 21, 10).is_err());
        assert!(compute_tile_spacing_and_count(100, 22, 10).is_ok());
        assert!(compute_tile_spacing_and_count(100, 0, 0).is_err());
        assert!(compute_tile_spacing_and_count(0, 20, 0).is_err());

        let result = TilingInit {
            image_size: HW::from_hw([100, 100]),
            network_size: HW::from_hw([20, 8]),
            min_padding: 4,
        }
        .build();
        assert!(result.is_err());
    }

    #[test]
    fn single_tile() {
        let tiling = TilingInit {
            image_size: HW::from_hw([300, 400]),
            network_size: HW::from_hw([480, 640]),
            min_padding: 32,
        }
        .build()
        .unwrap();

        assert!(tiling.is_single());
        assert_eq!(tiling.num_tiles(), 1);
        assert_eq!(tiling.space_x(), 0.0);
        assert_eq!(tiling.space_y(), 0.0);
        assert_eq!(tiling.tile_rect(0, 0).tlbr(), [0, 0, 300, 400]);
        assert_eq!(tiling.tile_rect(0, 0), tiling.image_rect());
    }

    #[test]
    fn tile_rects_stay_in_image() {
        let tiling = TilingInit {
            image_size: HW::from_hw([500, 300]),
            network_size: HW::from_hw([640, 128]),
            min_padding: 16,
        }
        .build()
        .unwrap();

        assert_eq!(tiling.num_y(), 1);
        assert_eq!(tiling.num_x(), 3);
        assert_eq!(tiling.image_rect().tlbr(), [0, 0, 500, 300]);

        // the height is cut to the image, the width is the network's
        assert_eq!(tiling.tile_rect(0, 0).tlbr(), [0, 0, 500, 128]);
        assert_eq!(tiling.tile_rect(2, 0).tlbr(), [0, 172, 500, 300]);
        assert!(tiling
            .tiles()
            .all(|(_, rect)| rect.clip_to(&tiling.image_rect()) == rect));
    }

    #[test]
    fn tile_index_round_trip() {
        let tiling = TilingInit {
            image_size: HW::from_hw([1560, 2688]),
            network_size: HW::from_hw([480, 640]),
            min_padding: 32,
        }
        .build()
        .unwrap();

        for ty in 0..tiling.num_y() {
            for tx in 0..tiling.num_x() {
                let index = tiling.make_tile_index(tx, ty);
                assert!(index < tiling.num_tiles());
                assert_eq!(tiling.split_tile_index(index), (tx, ty));
            }
        }
    }

    #[test]
    fn tile_rects() {
        let tiling = TilingInit {
            image_size: HW::from_hw([1560, 2688]),
            network_size: HW::from_hw([480, 640]),
            min_padding: 32,
        }
        .build()
        .unwrap();

        assert_eq!(tiling.num_x(), 5);
        assert_eq!(tiling.num_y(), 4);
        assert!(!tiling.is_single());

        // tlbr order
        assert_eq!(tiling.tile_rect(0, 0).tlbr(), [0, 0, 480, 640]);
        assert_eq!(tiling.tile_rect(1, 0).tlbr(), [0, 512, 480, 1152]);
        assert_eq!(tiling.tile_rect(4, 3).tlbr(), [1080, 2048, 1560, 2688]);

        let tiles: Vec<_> = tiling.tiles().collect();
        assert_eq!(tiles.len(), 20);
        assert_eq!(tiles[0], (0, tiling.tile_rect(0, 0)));
        assert_eq!(tiles[19], (19, tiling.tile_rect(4, 3)));
        assert!(tiles
            .iter()
            .all(|(_, rect)| rect.h() == 480 && rect.w() == 640));
    }

    #[test]
    fn tile_local_label_to_image() {
        let tiling = TilingInit {
            image_size: HW::from_hw([1560, 2688]),
            network_size: HW::from_hw([480, 640]),
            min_padding: 32,
        }
        .build()
        .unwrap();

        let tile = tiling.make_tile_index(1, 3);
        let label = Label {
            rect: PixelRect::from_tlbr([10, 20, 30, 40]),
            class: 2,
        };
        let tiled = tiling.to_image_label(tile, label);

        assert_eq!(tiled.tile, tile);
        assert_eq!(tiled.class, 2);
        assert_eq!(tiled.rect.tlbr(), [1090, 532, 1110, 552]);
    }
}
