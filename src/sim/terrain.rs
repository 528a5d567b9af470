//! Deformable terrain grid and surface queries
//!
//! The terrain is a byte bitmap of solid/empty cells over a fixed-size
//! world. Out-of-range access is a boundary condition, never an error:
//! columns outside the grid read as empty, rows past the bottom read as
//! solid (nothing falls through the world floor).

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::level::LevelSpec;

/// The landing pad rectangle. Terrain mutations re-seat it on the surface
/// beneath its horizontal center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Default for Pad {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: PAD_WIDTH,
            h: PAD_HEIGHT,
        }
    }
}

impl Pad {
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Top surface of the pad (touchdown plane)
    pub fn top(&self) -> f32 {
        self.y
    }
}

/// Result of the bounded penetration probe at a world point
#[derive(Debug, Clone, PartialEq)]
pub struct Penetration {
    /// Approximate shortest escape distance; 0 when the point is in open
    /// space (or the probe's step budget ran out)
    pub depth: f32,
    /// Unit direction out of the terrain (straight up for open-space points)
    pub normal: Vec2,
    /// First open-space point along the escape direction, half a step back
    pub exit_point: Option<Vec2>,
    /// Surface height directly below the queried point, for altimetry
    pub surface_y: Option<f32>,
}

/// Brush mode for the authoring paint primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    Add,
    Remove,
}

/// Solid/empty cell bitmap over the world
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    solids: Vec<u8>,
    width: f32,
    height: f32,
    dirty: bool,
}

impl TerrainGrid {
    /// Allocate a cleared grid covering `world_width x world_height`
    pub fn new(world_width: f32, world_height: f32, cell_size: f32) -> Self {
        let cols = ((world_width / cell_size).ceil() as usize).max(1);
        let rows = ((world_height / cell_size).ceil() as usize).max(1);
        Self {
            cell_size,
            cols,
            rows,
            solids: vec![0; cols * rows],
            width: cols as f32 * cell_size,
            height: rows as f32 * cell_size,
            dirty: true,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Consume the render-cache invalidation flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    fn cell_index(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    /// Cell occupancy with the implicit boundary rules: columns outside the
    /// grid are empty, rows outside it are solid.
    pub fn is_solid_cell(&self, col: isize, row: isize) -> bool {
        if col < 0 || col >= self.cols as isize {
            return false;
        }
        if row < 0 || row >= self.rows as isize {
            return true;
        }
        self.solids[self.cell_index(col as usize, row as usize)] == 1
    }

    /// Set a single cell; out-of-range indices are ignored
    pub fn set_solid_cell(&mut self, col: isize, row: isize, solid: bool) {
        if col < 0 || col >= self.cols as isize || row < 0 || row >= self.rows as isize {
            return;
        }
        let index = self.cell_index(col as usize, row as usize);
        self.solids[index] = solid as u8;
        self.dirty = true;
    }

    /// Fill a column solid from `from_row` down to the bottom
    pub fn fill_column_solid(&mut self, col: isize, from_row: usize) {
        if col < 0 || col >= self.cols as isize {
            return;
        }
        for row in from_row..self.rows {
            let index = self.cell_index(col as usize, row);
            self.solids[index] = 1;
        }
        self.dirty = true;
    }

    /// Occupancy at a world point, clamped into world bounds
    pub fn is_solid_world(&self, x: f32, y: f32) -> bool {
        let clamped_x = x.clamp(0.0, self.width - 1.0);
        let clamped_y = y.clamp(0.0, self.height - 1.0);
        let col = (clamped_x / self.cell_size).floor() as isize;
        let row = (clamped_y / self.cell_size).floor() as isize;
        self.is_solid_cell(col, row)
    }

    /// March from `origin` along `dir` in half-cell steps until a solid cell
    /// is hit. Returns the hit point, or `None` when the ray leaves the
    /// world or exhausts `max_distance`.
    pub fn find_surface_along_ray(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<Vec2> {
        let step = self.cell_size * 0.5;
        let steps = (max_distance / step).ceil() as usize;
        let mut p = origin;
        for _ in 0..steps {
            p += dir * step;
            if p.x < 0.0 || p.x >= self.width || p.y < 0.0 || p.y >= self.height {
                break;
            }
            if self.is_solid_world(p.x, p.y) {
                return Some(p);
            }
        }
        None
    }

    /// Row-aligned surface height below `(x, start_y)`, if any
    pub fn find_surface_below(&self, x: f32, start_y: f32) -> Option<f32> {
        let origin = Vec2::new(x, start_y);
        let reach = self.height - start_y + 2.0 * self.cell_size;
        let hit = self.find_surface_along_ray(origin, Vec2::Y, reach)?;
        let row = (hit.y / self.cell_size).floor();
        Some(row * self.cell_size)
    }

    /// Surface height below a point, or the world bottom when there is none
    pub fn ground_y_at(&self, x: f32, hint_y: f32) -> f32 {
        self.find_surface_below(x, hint_y).unwrap_or(self.height)
    }

    /// First solid row in a column, scanned from the top of the world.
    /// The particle layer reads this for cheap rest checks.
    pub fn height_at(&self, x: f32) -> f32 {
        let clamped_x = x.clamp(0.0, self.width - 1.0);
        let col = (clamped_x / self.cell_size).floor() as usize;
        for row in 0..self.rows {
            if self.solids[self.cell_index(col, row)] == 1 {
                return row as f32 * self.cell_size;
            }
        }
        self.height
    }

    /// Bounded-cost penetration probe. For a solid point, marches outward
    /// along eight fixed directions; the shortest escape wins. Exceeding the
    /// step budget in every direction reports depth 0 rather than searching
    /// further.
    pub fn resolve_penetration_at(&self, x: f32, y: f32) -> Penetration {
        let surface_y = self.find_surface_below(x, y + self.cell_size * 0.6);
        if !self.is_solid_world(x, y) {
            return Penetration {
                depth: 0.0,
                normal: -Vec2::Y,
                exit_point: None,
                surface_y,
            };
        }

        const DIRECTIONS: [Vec2; 8] = [
            Vec2::new(0.0, -1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, 1.0),
        ];
        let step = (self.cell_size * 0.3).max(2.0);
        let max_steps = 80;

        let mut best: Option<(f32, Vec2, Vec2)> = None;
        for dir in DIRECTIONS {
            let mut p = Vec2::new(x, y);
            let mut dist = 0.0;
            for _ in 0..max_steps {
                p += dir * step;
                dist += step;
                if p.x < 0.0 || p.x >= self.width || p.y < 0.0 || p.y >= self.height {
                    break;
                }
                if !self.is_solid_world(p.x, p.y) {
                    if best.as_ref().is_none_or(|(shortest, _, _)| dist < *shortest) {
                        best = Some((dist, dir, p - dir * step * 0.5));
                    }
                    break;
                }
            }
        }

        match best {
            Some((dist, dir, exit)) => Penetration {
                depth: dist,
                normal: -dir.normalize(),
                exit_point: Some(exit),
                surface_y,
            },
            None => Penetration {
                depth: 0.0,
                normal: -Vec2::Y,
                exit_point: None,
                surface_y,
            },
        }
    }

    /// Re-seat the pad on the surface directly beneath `center_x`
    pub fn align_pad_to_surface(&self, pad: &mut Pad, center_x: f32, hint_y: f32) {
        let search_start = hint_y.clamp(0.0, self.height - 1.0);
        if let Some(surface) = self.find_surface_below(center_x, search_start) {
            pad.y = (surface - pad.h).clamp(0.0, self.height - pad.h);
        }
    }

    /// Carve a crater: clear every cell whose center lies within `radius`
    /// of `(x, y)` and whose row lies in `[y - depth - radius, y + radius]`.
    /// No-op for a non-positive radius.
    pub fn deform_crater(&mut self, pad: Option<&mut Pad>, x: f32, y: f32, radius: f32, depth: f32) {
        if radius <= 0.0 {
            return;
        }
        let radius_sq = radius * radius;
        let min_col = (((x - radius) / self.cell_size).floor().max(0.0)) as usize;
        let max_col = (((x + radius) / self.cell_size).ceil() as usize).min(self.cols - 1);
        let min_row = (((y - depth - radius) / self.cell_size).floor().max(0.0)) as usize;
        let max_row = (((y + radius) / self.cell_size).ceil() as usize).min(self.rows - 1);

        let mut removed = false;
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                let cx = (col as f32 + 0.5) * self.cell_size;
                let cy = (row as f32 + 0.5) * self.cell_size;
                let dx = cx - x;
                let dy = cy - y;
                if dx * dx + dy * dy <= radius_sq {
                    let index = self.cell_index(col, row);
                    if self.solids[index] != 0 {
                        self.solids[index] = 0;
                        removed = true;
                    }
                }
            }
        }

        if removed {
            self.dirty = true;
            if let Some(pad) = pad {
                self.align_pad_to_surface(pad, pad.center_x(), pad.y + pad.h);
            }
        }
    }

    /// Authoring brush: set every cell within `radius` of `(x, y)` solid or
    /// empty. Same dirty-marking and pad realignment contract as cratering.
    pub fn paint_circle(&mut self, pad: Option<&mut Pad>, x: f32, y: f32, radius: f32, mode: PaintMode) {
        if radius <= 0.0 {
            return;
        }
        let value = match mode {
            PaintMode::Add => 1,
            PaintMode::Remove => 0,
        };
        let radius_sq = radius * radius;
        let min_col = (((x - radius) / self.cell_size).floor().max(0.0)) as usize;
        let max_col = (((x + radius) / self.cell_size).ceil() as usize).min(self.cols - 1);
        let min_row = (((y - radius) / self.cell_size).floor().max(0.0)) as usize;
        let max_row = (((y + radius) / self.cell_size).ceil() as usize).min(self.rows - 1);

        let mut changed = false;
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                let cx = (col as f32 + 0.5) * self.cell_size;
                let cy = (row as f32 + 0.5) * self.cell_size;
                let dx = cx - x;
                let dy = cy - y;
                if dx * dx + dy * dy <= radius_sq {
                    let index = self.cell_index(col, row);
                    if self.solids[index] != value {
                        self.solids[index] = value;
                        changed = true;
                    }
                }
            }
        }

        if changed {
            self.dirty = true;
            if let Some(pad) = pad {
                self.align_pad_to_surface(pad, pad.center_x(), pad.y + pad.h);
            }
        }
    }

    /// Procedurally build the terrain for a level: layered sine waves with
    /// exponential smoothing and bounded noise, clamped to the level's base
    /// band, with a flat shelf carved across the pad's column span.
    /// Returns the per-column height profile for external rendering.
    pub fn generate(
        level: &LevelSpec,
        world_height: f32,
        pad: &mut Pad,
        rng: &mut Pcg32,
    ) -> (Self, Vec<f32>) {
        let mut grid = Self::new(level.world_width, world_height, GRID_CELL_SIZE);
        let step = grid.cell_size;
        let cols = grid.cols;

        let base_min = world_height * level.base_band[0];
        let base_max = world_height * level.base_band[1];
        let base_mid = (base_min + base_max) * 0.5;
        let amp = world_height * level.amp;

        let mut heights = Vec::with_capacity(cols);
        let mut y = base_mid;
        for i in 0..cols {
            let t = i as f32 * step;
            let primary = (t * level.wave_freq).sin() * amp * level.wave_scale;
            let secondary = ((t + 500.0) * level.rough_wave_freq).sin() * amp * 0.35;
            let target = base_mid + primary + secondary;
            let noise = (rng.random::<f32>() - 0.5) * amp * level.noise_scale;
            y = y * 0.55 + (target + noise) * 0.45;
            y = y.clamp(base_min, base_max);
            heights.push(y.floor());
        }

        // Flatten a shelf across the pad span at the lowest height within it
        let pad_cols = ((PAD_WIDTH / step).round() as usize).max(4);
        let pad_start_px = level.world_width * level.pad_offset - PAD_WIDTH / 2.0;
        let pad_start = ((pad_start_px / step).floor() as isize)
            .clamp(0, (cols - pad_cols - 1) as isize) as usize;
        let mut pad_y = heights[pad_start];
        for i in 1..pad_cols {
            pad_y = pad_y.min(heights[pad_start + i]);
        }
        for h in heights.iter_mut().skip(pad_start).take(pad_cols) {
            *h = pad_y;
        }

        for (col, h) in heights.iter().enumerate() {
            let fill_start = (h / step).floor() as usize;
            grid.fill_column_solid(col as isize, fill_start);
        }

        pad.w = PAD_WIDTH;
        pad.h = PAD_HEIGHT;
        pad.x = pad_start as f32 * step;
        pad.y = pad_y - pad.h;
        grid.align_pad_to_surface(pad, pad.center_x(), pad.y);

        log::debug!(
            "terrain generated: {}x{} cells, pad at x={:.0} y={:.0}",
            grid.cols,
            grid.rows,
            pad.x,
            pad.y
        );
        (grid, heights)
    }
}
