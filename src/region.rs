// Rectangle-set algebra.
//
// A `Region` is an ordered list of rectangles treated as a set. Every
// operation is deterministic: the same inputs always produce the same
// rectangles in the same order, so regions can be compared structurally.

use crate::types::{Rect, Size};

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Region(Vec<Rect>);

impl Region {
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build from rectangles, dropping the zero-area ones.
    pub fn from_rects(rects: impl IntoIterator<Item = Rect>) -> Self {
        Self(rects.into_iter().filter(|r| !r.is_empty()).collect())
    }

    /// One rectangle covering `size` at the origin (empty if `size` has no area).
    pub fn full(size: Size) -> Self {
        Self::from_rects([Rect::from_size(size)])
    }

    pub fn rects(&self) -> &[Rect] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn area(&self) -> i64 {
        self.0.iter().map(|r| r.width as i64 * r.height as i64).sum()
    }

    /// Bounding rectangle of the whole region.
    pub fn union_bounds(&self) -> Option<Rect> {
        let mut it = self.0.iter();
        let first = *it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self(self.0.iter().map(|r| r.translate(dx, dy)).collect())
    }

    /// Clip every rectangle to `clip`.
    pub fn intersect(&self, clip: &Rect) -> Self {
        Self(self.0.iter().filter_map(|r| r.intersection(clip)).collect())
    }

    /// `self` minus `other`. Pieces untouched by a subtrahend keep their place;
    /// a cut piece is replaced by its top, left, right and bottom remainders.
    pub fn subtract(&self, other: &Region) -> Self {
        let mut pieces = self.0.clone();
        for hole in &other.0 {
            let mut next = Vec::with_capacity(pieces.len() + 3);
            for piece in pieces {
                match piece.intersection(hole) {
                    None => next.push(piece),
                    Some(cut) => split_around(&piece, &cut, &mut next),
                }
            }
            pieces = next;
        }
        Self(pieces)
    }

    pub fn contains(&self, p: crate::types::Point) -> bool {
        self.0.iter().any(|r| r.contains(p))
    }
}

impl From<Vec<Rect>> for Region {
    fn from(rects: Vec<Rect>) -> Self {
        Self::from_rects(rects)
    }
}

/// Push what is left of `piece` once `cut` (fully inside it) is removed.
fn split_around(piece: &Rect, cut: &Rect, out: &mut Vec<Rect>) {
    let top = Rect::new(piece.x, piece.y, piece.width, cut.y - piece.y);
    let left = Rect::new(piece.x, cut.y, cut.x - piece.x, cut.height);
    let right = Rect::new(cut.right(), cut.y, piece.right() - cut.right(), cut.height);
    let bottom = Rect::new(piece.x, cut.bottom(), piece.width, piece.bottom() - cut.bottom());
    out.extend([top, left, right, bottom].into_iter().filter(|r| !r.is_empty()));
}

/// Free-function form used by the tracker and the overlay controller.
pub fn subtract(minuend: &Region, subtrahend: &Region) -> Region {
    minuend.subtract(subtrahend)
}
