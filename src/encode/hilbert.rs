// src/encode/hilbert.rs

//! Hilbert curve visiting order for a `2^order x 2^order` grid.
//!
//! Each curve position is computed independently from the base-4 digits of
//! its index, most significant first. A four-entry anchor table holds the
//! current orientation of the quadrant corners; digit 0 reflects it across
//! one diagonal and digit 3 across the other, which reproduces the
//! recursive construction without recursion.
//!
//! Curves are pure functions of their order, so [`cached`] keeps one shared
//! copy per order for the lifetime of the process.

use crate::utils::error::{CodecError, Result};
use std::ops::Index;
use std::sync::{Arc, OnceLock};

/// Deepest supported curve (a 32768 x 32768 working grid).
pub const MAX_ORDER: u32 = 15;

/// Quadrant anchors of the base curve unit: (0,0) -> (0,1) -> (1,1) -> (1,0).
const BASE_ANCHORS: [(u32, u32); 4] = [(0, 0), (0, 1), (1, 1), (1, 0)];

/// Recursion depth of a Hilbert curve. The grid side is `2^order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Order(u32);

impl Order {
    /// Validates a requested order.
    pub fn new(order: i64) -> Result<Self> {
        if order < 0 || order > MAX_ORDER as i64 {
            return Err(CodecError::InvalidOrder(order));
        }
        Ok(Self(order as u32))
    }

    /// Smallest order whose grid holds a `height x width` image,
    /// i.e. `ceil(log2(max(height, width)))`.
    pub fn for_dimensions(height: usize, width: usize) -> Result<Self> {
        let longest = height.max(width);
        if height == 0 || width == 0 {
            return Err(CodecError::InvalidDimensions { height, width });
        }
        Self::new(longest.next_power_of_two().trailing_zeros() as i64)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Grid side length `N = 2^order`.
    pub fn side(self) -> usize {
        1usize << self.0
    }

    /// Number of cells on the curve, `4^order`.
    pub fn cell_count(self) -> usize {
        1usize << (2 * self.0)
    }
}

/// The `(x, y)` coordinate visited at curve position `index`.
///
/// `x` is the column and `y` the row of the working grid.
#[inline]
pub fn point_at(order: Order, index: usize) -> (u32, u32) {
    let mut anchors = BASE_ANCHORS;
    let (mut x, mut y) = (0u32, 0u32);

    for depth in (0..order.0).rev() {
        let quadrant = (index >> (2 * depth)) & 3;
        match quadrant {
            0 => anchors.swap(1, 3),
            3 => anchors.swap(0, 2),
            _ => {}
        }
        let (ax, ay) = anchors[quadrant];
        x += ax << depth;
        y += ay << depth;
    }

    (x, y)
}

/// Immutable visiting order of every cell in a `2^order` square grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HilbertOrder {
    order: Order,
    points: Vec<(u32, u32)>,
}

impl HilbertOrder {
    pub fn order(&self) -> Order {
        self.order
    }

    pub fn side(&self) -> usize {
        self.order.side()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(u32, u32)] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (u32, u32)> {
        self.points.iter()
    }
}

impl Index<usize> for HilbertOrder {
    type Output = (u32, u32);

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a HilbertOrder {
    type Item = &'a (u32, u32);
    type IntoIter = std::slice::Iter<'a, (u32, u32)>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Computes the full curve for `order`. Cost is O(order * 4^order).
pub fn generate(order: Order) -> HilbertOrder {
    let points = (0..order.cell_count())
        .map(|i| point_at(order, i))
        .collect();
    HilbertOrder { order, points }
}

/// Curve points scaled into `[0, 1)`, shifted by `offset` cells.
///
/// Only meant for plotting; the codec works on integer coordinates.
pub fn generate_normalized(order: Order, offset: f64) -> Vec<(f64, f64)> {
    let side = order.side() as f64;
    (0..order.cell_count())
        .map(|i| {
            let (x, y) = point_at(order, i);
            ((x as f64 + offset) / side, (y as f64 + offset) / side)
        })
        .collect()
}

static CURVES: [OnceLock<Arc<HilbertOrder>>; MAX_ORDER as usize + 1] =
    [const { OnceLock::new() }; MAX_ORDER as usize + 1];

/// Shared, lazily built curve for `order`.
///
/// The first caller for a given order builds it; everyone after gets the
/// same allocation.
pub fn cached(order: Order) -> Arc<HilbertOrder> {
    CURVES[order.0 as usize]
        .get_or_init(|| {
            log::debug!("Building Hilbert curve of order {}", order.0);
            Arc::new(generate(order))
        })
        .clone()
}
