use super::TLBR;
use crate::common::*;

/// The generic rectangle.
pub trait Rect {
    type Type;

    fn t(&self) -> Self::Type;
    fn l(&self) -> Self::Type;
    fn b(&self) -> Self::Type;
    fn r(&self) -> Self::Type;
    fn h(&self) -> Self::Type;
    fn w(&self) -> Self::Type;

    fn try_from_tlbr(tlbr: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;

    fn try_from_tlhw(tlhw: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;
}

pub trait RectNum: Rect
where
    Self::Type: Copy + Num + PartialOrd,
{
    fn from_tlbr(tlbr: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_tlbr(tlbr).unwrap()
    }

    fn from_tlhw(tlhw: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_tlhw(tlhw).unwrap()
    }

    fn tlbr(&self) -> [Self::Type; 4] {
        [self.t(), self.l(), self.b(), self.r()]
    }

    fn tlhw(&self) -> [Self::Type; 4] {
        [self.t(), self.l(), self.h(), self.w()]
    }

    fn hw(&self) -> [Self::Type; 2] {
        [self.h(), self.w()]
    }

    fn to_tlbr(&self) -> TLBR<Self::Type> {
        TLBR {
            t: self.t(),
            l: self.l(),
            b: self.b(),
            r: self.r(),
        }
    }

    fn area(&self) -> <Self::Type as Mul<Self::Type>>::Output
    where
        Self::Type: Mul<Self::Type>,
    {
        self.h() * self.w()
    }

    fn is_empty(&self) -> bool {
        let zero = Self::Type::zero();
        self.h() <= zero || self.w() <= zero
    }

    /// Compute the smallest rectangle enclosing both rectangles.
    fn closure_with<R>(&self, other: &R) -> TLBR<Self::Type>
    where
        R: Rect<Type = Self::Type>,
    {
        TLBR {
            t: min(self.t(), other.t()),
            l: min(self.l(), other.l()),
            b: max(self.b(), other.b()),
            r: max(self.r(), other.r()),
        }
    }

    /// Compute the intersection, or `None` if it has zero area.
    fn intersect_with<R>(&self, other: &R) -> Option<TLBR<Self::Type>>
    where
        R: Rect<Type = Self::Type>,
    {
        let clipped = self.clip_to(other);
        (!clipped.is_empty()).then(|| clipped)
    }

    /// Clip this rectangle to the bounds of `clipper`.
    ///
    /// Disjoint rectangles produce a zero-area rectangle lying on the
    /// clipper's boundary instead of an inverted one.
    fn clip_to<R>(&self, clipper: &R) -> TLBR<Self::Type>
    where
        R: Rect<Type = Self::Type>,
    {
        let t = max(self.t(), clipper.t());
        let l = max(self.l(), clipper.l());
        let b = max(min(self.b(), clipper.b()), t);
        let r = max(min(self.r(), clipper.r()), l);
        TLBR { t, l, b, r }
    }

    fn intersection_area_with<R>(&self, other: &R) -> Self::Type
    where
        R: Rect<Type = Self::Type>,
    {
        self.intersect_with(other)
            .map(|rect| rect.h() * rect.w())
            .unwrap_or_else(Self::Type::zero)
    }

    /// Intersection over union.
    ///
    /// Returns zero when both rectangles are empty.
    fn iou_with<R>(&self, other: &R) -> f64
    where
        R: Rect<Type = Self::Type>,
        Self::Type: Into<f64>,
    {
        let area = |h: Self::Type, w: Self::Type| -> f64 {
            let h: f64 = h.into();
            let w: f64 = w.into();
            h * w
        };

        let inter_area = self
            .intersect_with(other)
            .map(|rect| area(rect.h(), rect.w()))
            .unwrap_or(0.0);
        let union_area = area(self.h(), self.w()) + area(other.h(), other.w()) - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }

    /// Move the rectangle by `dy` vertically and `dx` horizontally.
    fn translate(&self, dy: Self::Type, dx: Self::Type) -> TLBR<Self::Type> {
        TLBR {
            t: self.t() + dy,
            l: self.l() + dx,
            b: self.b() + dy,
            r: self.r() + dx,
        }
    }
}

impl<T> RectNum for T
where
    T: Rect,
    T::Type: Copy + Num + PartialOrd,
{
}

fn min<T: PartialOrd>(lhs: T, rhs: T) -> T {
    if rhs < lhs {
        rhs
    } else {
        lhs
    }
}

fn max<T: PartialOrd>(lhs: T, rhs: T) -> T {
    if rhs > lhs {
        rhs
    } else {
        lhs
    }
}
