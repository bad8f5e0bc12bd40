//! Labeled bounding boxes produced by a detector.

use bbox::{Rect, RectNum, TLBR};
use num_traits::Num;

/// Generic bounding box with an extra class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label<R, C>
where
    R: Rect,
{
    pub rect: R,
    pub class: C,
}

impl<T, C> Label<TLBR<T>, C>
where
    T: Copy + Num + PartialOrd,
    C: Copy,
{
    pub fn translate(&self, dy: T, dx: T) -> Self {
        Label {
            rect: self.rect.translate(dy, dx),
            class: self.class,
        }
    }
}

/// Bounding box tagged with the tile it was detected in.
///
/// The `tile` is a flat tile index as created by the tiling that split
/// the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileLabel<R, C>
where
    R: Rect,
{
    pub rect: R,
    pub tile: usize,
    pub class: C,
}

impl<R, C> TileLabel<R, C>
where
    R: Rect,
{
    pub fn new(label: Label<R, C>, tile: usize) -> Self {
        let Label { rect, class } = label;
        Self { rect, tile, class }
    }

    pub fn into_label(self) -> Label<R, C> {
        let Self { rect, class, .. } = self;
        Label { rect, class }
    }
}

macro_rules! impl_rect_for_label {
    ($name:ident) => {
        impl<R, C> Rect for $name<R, C>
        where
            R: Rect,
        {
            type Type = R::Type;

            fn t(&self) -> Self::Type {
                self.rect.t()
            }

            fn l(&self) -> Self::Type {
                self.rect.l()
            }

            fn b(&self) -> Self::Type {
                self.rect.b()
            }

            fn r(&self) -> Self::Type {
                self.rect.r()
            }

            fn h(&self) -> Self::Type {
                self.rect.h()
            }

            fn w(&self) -> Self::Type {
                self.rect.w()
            }

            fn try_from_tlbr(_tlbr: [Self::Type; 4]) -> anyhow::Result<Self> {
                anyhow::bail!("cannot build a {} without a class", stringify!($name))
            }

            fn try_from_tlhw(_tlhw: [Self::Type; 4]) -> anyhow::Result<Self> {
                anyhow::bail!("cannot build a {} without a class", stringify!($name))
            }
        }
    };
}

impl_rect_for_label!(Label);
impl_rect_for_label!(TileLabel);
