use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::StreamError;

/// A 2D cell coordinate on the ground grid (the Y axis is ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    pub const ORIGIN: CellCoord = CellCoord { x: 0, z: 0 };

    /// Largest addressable index on either axis. Up to here `index * S` is
    /// off by at most a quarter cell after f32 rounding, so every cell has a
    /// distinct origin whatever the cell size.
    pub const MAX_INDEX: i32 = 1 << 22;

    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Packed 64-bit key: `x` in the high half, `z` in the low half.
    pub fn key(self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.z as u32 as u64)
    }

    /// Inverse of [`CellCoord::key`].
    pub fn from_key(key: u64) -> Self {
        Self {
            x: (key >> 32) as u32 as i32,
            z: key as u32 as i32,
        }
    }

    /// Whether both indices lie within `[-MAX_INDEX, MAX_INDEX]`.
    pub fn is_addressable(self) -> bool {
        let range = -Self::MAX_INDEX..=Self::MAX_INDEX;
        range.contains(&self.x) && range.contains(&self.z)
    }

    /// The adjacent cell in `dir`, or `None` if it is not addressable.
    pub fn neighbor(self, dir: Direction) -> Option<CellCoord> {
        let (dx, dz) = dir.offset();
        let next = CellCoord {
            x: self.x.checked_add(dx)?,
            z: self.z.checked_add(dz)?,
        };
        next.is_addressable().then_some(next)
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// The four cardinal directions on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosZ,
        Direction::NegZ,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::PosX => (1, 0),
            Direction::NegX => (-1, 0),
            Direction::PosZ => (0, 1),
            Direction::NegZ => (0, -1),
        }
    }
}

/// Maps continuous world positions onto the fixed-size ground grid.
///
/// Cell `(gx, gz)` covers the half-open square between its origin and the
/// origin of `(gx+1, gz+1)`, where the origin is `gx*S` rounded to f32. Keying
/// is defined against those rounded origins, so `to_cell(to_origin(c)) == c`
/// holds exactly for every addressable cell, and negative positions floor
/// instead of folding onto cell zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridKeyCodec {
    cell_size: f32,
}

impl GridKeyCodec {
    /// Create a codec for the given cell size. Fails unless the size is a
    /// positive normal float whose farthest origin is still finite.
    pub fn new(cell_size: f32) -> Result<Self, StreamError> {
        if !cell_size.is_finite() || cell_size < f32::MIN_POSITIVE {
            return Err(StreamError::invalid_config(format!(
                "cell_size must be finite and positive, got {cell_size}"
            )));
        }
        if !((CellCoord::MAX_INDEX as f32 + 1.0) * cell_size).is_finite() {
            return Err(StreamError::invalid_config(format!(
                "cell_size {cell_size} is too large to address the grid"
            )));
        }
        Ok(Self { cell_size })
    }

    /// Cell size used for this grid.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Convert a world position to a cell coordinate.
    pub fn to_cell(&self, pos: Vec3) -> Result<CellCoord, StreamError> {
        if !pos.x.is_finite() || !pos.z.is_finite() {
            return Err(StreamError::NonFinitePosition { x: pos.x, z: pos.z });
        }
        match (self.axis_index(pos.x), self.axis_index(pos.z)) {
            (Some(x), Some(z)) => Ok(CellCoord { x, z }),
            _ => Err(StreamError::CoordinateOverflow { x: pos.x, z: pos.z }),
        }
    }

    /// Minimum corner of a cell, on the ground plane.
    pub fn to_origin(&self, cell: CellCoord) -> Vec3 {
        Vec3::new(self.axis_origin(cell.x), 0.0, self.axis_origin(cell.z))
    }

    fn axis_origin(&self, index: i32) -> f32 {
        index as f32 * self.cell_size
    }

    /// Index of the cell whose rounded origin is the last one not above `v`.
    ///
    /// The f64 quotient is within one cell of the answer; the correction loops
    /// make the result agree with `axis_origin` exactly.
    fn axis_index(&self, v: f32) -> Option<i32> {
        let limit = CellCoord::MAX_INDEX as f64 + 1.0;
        let guess = (v as f64 / self.cell_size as f64).floor();
        if !(-limit..=limit).contains(&guess) {
            return None;
        }
        let mut index = guess as i32;
        while self.axis_origin(index) > v {
            index -= 1;
        }
        while self.axis_origin(index + 1) <= v {
            index += 1;
        }
        (-CellCoord::MAX_INDEX..=CellCoord::MAX_INDEX)
            .contains(&index)
            .then_some(index)
    }

    /// Center of a cell, on the ground plane. This is the reference point used
    /// for eviction distances.
    pub fn to_center(&self, cell: CellCoord) -> Vec3 {
        let half = self.cell_size * 0.5;
        self.to_origin(cell) + Vec3::new(half, 0.0, half)
    }

    /// Offset of `pos` from the minimum corner of `cell`, as `(local_x, local_z)`.
    pub fn local_offset(&self, pos: Vec3, cell: CellCoord) -> (f32, f32) {
        let origin = self.to_origin(cell);
        (pos.x - origin.x, pos.z - origin.z)
    }

    /// Every cell crossed by the straight segment `from -> to`, in crossing
    /// order, starting with the cell of `from`. At most `max_cells` cells are
    /// returned.
    pub fn cells_along(
        &self,
        from: Vec3,
        to: Vec3,
        max_cells: usize,
    ) -> Result<Vec<CellCoord>, StreamError> {
        let start = self.to_cell(from)?;
        let end = self.to_cell(to)?;
        let mut cells = vec![start];

        let dx = to.x - from.x;
        let dz = to.z - from.z;
        let step_x = step_sign(end.x, start.x);
        let step_z = step_sign(end.z, start.z);
        let (mut t_max_x, t_delta_x) = self.first_crossing(from.x, start.x, step_x, dx);
        let (mut t_max_z, t_delta_z) = self.first_crossing(from.z, start.z, step_z, dz);

        let mut current = start;
        while current != end && cells.len() < max_cells {
            // Once an axis has reached the end cell it must not step again,
            // which keeps the walk finite despite rounding in the t values.
            let step_along_x = if current.x == end.x {
                false
            } else if current.z == end.z {
                true
            } else {
                t_max_x < t_max_z
            };
            if step_along_x {
                current.x += step_x;
                t_max_x += t_delta_x;
            } else {
                current.z += step_z;
                t_max_z += t_delta_z;
            }
            cells.push(current);
        }
        Ok(cells)
    }

    /// Parametric distance to the first boundary crossing on one axis and the
    /// distance between successive crossings.
    fn first_crossing(&self, from: f32, cell: i32, step: i32, delta: f32) -> (f32, f32) {
        if step == 0 || delta == 0.0 {
            return (f32::INFINITY, f32::INFINITY);
        }
        let boundary = if step > 0 {
            self.axis_origin(cell + 1)
        } else {
            self.axis_origin(cell)
        };
        ((boundary - from) / delta, self.cell_size / delta.abs())
    }
}

fn step_sign(end: i32, start: i32) -> i32 {
    match end.cmp(&start) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
    }
}
