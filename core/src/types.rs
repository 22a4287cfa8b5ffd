use ndarray::Array2;

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for ball counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, column)`, also used for sizes as `(height, width)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

pub trait BoardSizeExt {
    /// Board size as `(height, width)`.
    fn board_size(&self) -> Coord2;

    fn in_bounds(&self, coords: Coord2) -> bool {
        let (height, width) = self.board_size();
        coords.0 < height && coords.1 < width
    }

    fn iter_orthogonal(&self, coords: Coord2) -> OrthogonalIter {
        OrthogonalIter::new(coords, self.board_size())
    }
}

impl<T> BoardSizeExt for Array2<T> {
    fn board_size(&self) -> Coord2 {
        let (rows, columns) = self.dim();
        (
            rows.try_into().unwrap_or(Coord::MAX),
            columns.try_into().unwrap_or(Coord::MAX),
        )
    }
}

/// Up, down, left, right.
const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
pub(crate) fn apply_delta(coords: Coord2, delta: (isize, isize), bounds: Coord2) -> Option<Coord2> {
    let (row, column) = coords;
    let (d_row, d_column) = delta;
    let (height, width) = bounds;

    let next_row = row.checked_add_signed(d_row.try_into().ok()?)?;
    if next_row >= height {
        return None;
    }

    let next_column = column.checked_add_signed(d_column.try_into().ok()?)?;
    if next_column >= width {
        return None;
    }

    Some((next_row, next_column))
}

/// In-bounds cells sharing an edge with `center`.
#[derive(Debug)]
pub struct OrthogonalIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl OrthogonalIter {
    fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for OrthogonalIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= ORTHOGONAL.len() {
                return None;
            }

            let next_item = apply_delta(self.center, ORTHOGONAL[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
