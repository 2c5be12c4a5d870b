//! Lattice positions, areas and world bounds

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::{GenError, GenResult};

/// Integer lattice coordinate of a region (or a tile, depending on context).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Copy of this position moved by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The 3x3 block centered on this position, in area order.
    pub fn neighborhood(self) -> Area {
        Area::around(self, 1)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Inclusive axis-aligned rectangle of positions.
///
/// Iteration is x-major: every `y` of the first column, then the next
/// column. All pipeline stages walk areas in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub min: Position,
    pub max: Position,
}

impl Area {
    /// Build an area from two corners in any order.
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            min: Position::new(a.x.min(b.x), a.y.min(b.y)),
            max: Position::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Square of side `2 * radius + 1` centered on `center`.
    pub fn around(center: Position, radius: u32) -> Self {
        let r = radius as i32;
        Self {
            min: center.offset(-r, -r),
            max: center.offset(r, r),
        }
    }

    pub fn single(position: Position) -> Self {
        Self {
            min: position,
            max: position,
        }
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn len(&self) -> usize {
        let w = (self.max.x - self.min.x + 1) as usize;
        let h = (self.max.y - self.min.y + 1) as usize;
        w * h
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        let (min, max) = (self.min, self.max);
        (min.x..=max.x).flat_map(move |x| (min.y..=max.y).map(move |y| Position::new(x, y)))
    }
}

/// Lattice axis, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Limits of one lattice axis. `None` means unbounded in that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisBounds {
    #[serde(default)]
    pub min: Option<i32>,
    #[serde(default)]
    pub max: Option<i32>,
    #[serde(default)]
    pub wrap: bool,
}

impl AxisBounds {
    pub const UNBOUNDED: AxisBounds = AxisBounds {
        min: None,
        max: None,
        wrap: false,
    };

    pub const fn new(min: Option<i32>, max: Option<i32>, wrap: bool) -> Self {
        Self { min, max, wrap }
    }

    /// Finite range `[min, max]` that wraps around.
    pub const fn wrapping(min: i32, max: i32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            wrap: true,
        }
    }

    /// Finite range `[min, max]` that clamps.
    pub const fn clamped(min: i32, max: i32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            wrap: false,
        }
    }

    fn validate(&self, axis: Axis) -> GenResult<()> {
        if self.min.is_some_and(|min| min > 0) || self.max.is_some_and(|max| max < 0) {
            return Err(GenError::InvalidBounds { axis });
        }
        if self.wrap && (self.min.is_none() || self.max.is_none()) {
            return Err(GenError::WrapBoundsUndefined { axis });
        }
        Ok(())
    }

    /// Wrap `v` into range if this axis wraps, otherwise return it unchanged.
    pub fn normalize(&self, v: i32) -> i32 {
        match (self.wrap, self.min, self.max) {
            (true, Some(min), Some(max)) => wrap(v, min, max),
            _ => v,
        }
    }

    pub fn contains(&self, v: i32) -> bool {
        self.min.is_none_or(|min| v >= min) && self.max.is_none_or(|max| v <= max)
    }

    /// Clamp `v` into range (wrapped axes are wrapped instead).
    pub fn clamp(&self, v: i32) -> i32 {
        if self.wrap {
            return self.normalize(v);
        }
        let v = self.min.map_or(v, |min| v.max(min));
        self.max.map_or(v, |max| v.min(max))
    }
}

/// Wrap `v` into the inclusive range `[min, max]`.
fn wrap(v: i32, min: i32, max: i32) -> i32 {
    let span = i64::from(max) - i64::from(min) + 1;
    ((i64::from(v) - i64::from(min)).rem_euclid(span) + i64::from(min)) as i32
}

/// Per-axis limits of the world lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub x: AxisBounds,
    #[serde(default)]
    pub y: AxisBounds,
}

impl Bounds {
    pub const UNBOUNDED: Bounds = Bounds {
        x: AxisBounds::UNBOUNDED,
        y: AxisBounds::UNBOUNDED,
    };

    pub const fn new(x: AxisBounds, y: AxisBounds) -> Self {
        Self { x, y }
    }

    /// Check that the origin is representable and wrapped axes are finite.
    pub fn validate(&self) -> GenResult<()> {
        self.x.validate(Axis::X)?;
        self.y.validate(Axis::Y)
    }

    /// Apply wrapping to both axes.
    pub fn normalize(&self, p: Position) -> Position {
        Position::new(self.x.normalize(p.x), self.y.normalize(p.y))
    }

    /// Whether `p` lies inside the bounds (wrapped axes always do after
    /// normalization).
    pub fn contains(&self, p: Position) -> bool {
        let p = self.normalize(p);
        self.x.contains(p.x) && self.y.contains(p.y)
    }

    /// Clamp (or wrap) both axes.
    pub fn clamp(&self, p: Position) -> Position {
        Position::new(self.x.clamp(p.x), self.y.clamp(p.y))
    }
}
