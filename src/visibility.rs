use std::cmp::Ordering;

use tile_grid::core::{Coord, MapSize};

// Ray-cast tuneables:
// - RAY_ANGLE_EPS: anti-gap micro-jitter for each sampled ray.
// - DDA_TIE_EPS: corner-tie tolerance in ray traversal.
const RAY_ANGLE_EPS: f32 = 0.0008;
const DDA_TIE_EPS: f32 = 0.001;

/// Tiles reachable from a point, honoring opaque blockers.
pub trait VisibilityService {
    /// Every tile within `radius` (square neighborhood) of `origin` that a
    /// ray from the origin reaches. Opaque tiles that stop a ray are included,
    /// tiles behind them are not. The origin itself is always included.
    fn visible_tiles(&self, origin: Coord, radius: u16) -> Vec<Coord>;
}

pub trait OpacityMap {
    fn map_size(&self) -> MapSize;
    fn is_opaque(&self, coord: Coord) -> bool;
}

/// Line of sight by DDA rays aimed at every tile center and corner in range.
pub struct RayCastVisibility<'a, M: ?Sized> {
    map: &'a M,
}

impl<'a, M: OpacityMap + ?Sized> RayCastVisibility<'a, M> {
    pub fn new(map: &'a M) -> Self {
        Self { map }
    }

    fn cast_ray(&self, origin: Coord, radius: u16, angle: f32, seen: &mut SeenSet) {
        let origin_x = origin.x as f32 + 0.5;
        let origin_y = origin.y as f32 + 0.5;
        let dir_x = angle.cos();
        let dir_y = angle.sin();

        let step_x = if dir_x > 0.0 {
            1
        } else if dir_x < 0.0 {
            -1
        } else {
            0
        };
        let step_y = if dir_y > 0.0 {
            1
        } else if dir_y < 0.0 {
            -1
        } else {
            0
        };

        if step_x == 0 && step_y == 0 {
            return;
        }

        let delta_dist_x = if step_x == 0 {
            f32::INFINITY
        } else {
            1.0 / dir_x.abs()
        };
        let delta_dist_y = if step_y == 0 {
            f32::INFINITY
        } else {
            1.0 / dir_y.abs()
        };

        let mut map_x = origin.x as i32;
        let mut map_y = origin.y as i32;

        let mut side_dist_x = if step_x > 0 {
            ((map_x + 1) as f32 - origin_x) * delta_dist_x
        } else if step_x < 0 {
            (origin_x - map_x as f32) * delta_dist_x
        } else {
            f32::INFINITY
        };
        let mut side_dist_y = if step_y > 0 {
            ((map_y + 1) as f32 - origin_y) * delta_dist_y
        } else if step_y < 0 {
            (origin_y - map_y as f32) * delta_dist_y
        } else {
            f32::INFINITY
        };

        loop {
            let cmp = side_dist_x - side_dist_y;
            if cmp.abs() <= DDA_TIE_EPS {
                // Corner crossing: look at both side cells so exact diagonal
                // rays neither miss tiles nor slip through a blocked pinch.
                let x_blocked = self.visit(map_x + step_x, map_y, origin, radius, seen);
                let y_blocked = self.visit(map_x, map_y + step_y, origin, radius, seen);
                if x_blocked && y_blocked {
                    break;
                }
                map_x += step_x;
                map_y += step_y;
                side_dist_x += delta_dist_x;
                side_dist_y += delta_dist_y;
            } else if cmp < 0.0 {
                map_x += step_x;
                side_dist_x += delta_dist_x;
            } else {
                map_y += step_y;
                side_dist_y += delta_dist_y;
            }

            if self.visit(map_x, map_y, origin, radius, seen) {
                break;
            }
        }
    }

    /// Marks the tile seen; returns true when the ray must stop there.
    fn visit(&self, x: i32, y: i32, origin: Coord, radius: u16, seen: &mut SeenSet) -> bool {
        let size = self.map.map_size();
        if x < 0 || y < 0 || x >= size.width as i32 || y >= size.height as i32 {
            return true;
        }
        let coord = Coord::new(x as u16, y as u16);
        if coord.chebyshev(origin) > radius {
            return true;
        }
        seen.insert(coord);
        self.map.is_opaque(coord)
    }
}

impl<M: OpacityMap + ?Sized> VisibilityService for RayCastVisibility<'_, M> {
    fn visible_tiles(&self, origin: Coord, radius: u16) -> Vec<Coord> {
        let size = self.map.map_size();
        if !size.contains(origin) {
            return Vec::new();
        }

        let mut seen = SeenSet::new(origin, radius);
        seen.insert(origin);
        if radius == 0 {
            return seen.into_coords();
        }

        for angle in sampled_angles(size, origin, radius) {
            for angle_offset in [-RAY_ANGLE_EPS, 0.0, RAY_ANGLE_EPS] {
                self.cast_ray(origin, radius, angle + angle_offset, &mut seen);
            }
        }
        seen.into_coords()
    }
}

fn sampled_angles(size: MapSize, origin: Coord, radius: u16) -> Vec<f32> {
    let sx = origin.x as i32;
    let sy = origin.y as i32;
    let r = radius as i32;

    let min_x = (sx - r).max(0);
    let max_x = (sx + r).min(size.width as i32 - 1);
    let min_y = (sy - r).max(0);
    let max_y = (sy + r).min(size.height as i32 - 1);

    let origin_x = sx as f32 + 0.5;
    let origin_y = sy as f32 + 0.5;
    let mut angles = Vec::new();

    let mut push_angle = |target_x: f32, target_y: f32| {
        let dx = target_x - origin_x;
        let dy = target_y - origin_y;
        if dx.abs() < f32::EPSILON && dy.abs() < f32::EPSILON {
            return;
        }
        angles.push(dy.atan2(dx));
    };

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            // Center and 4 corners: dense enough to eliminate missing-lit holes.
            push_angle(x as f32 + 0.5, y as f32 + 0.5);
            push_angle(x as f32, y as f32);
            push_angle((x + 1) as f32, y as f32);
            push_angle(x as f32, (y + 1) as f32);
            push_angle((x + 1) as f32, (y + 1) as f32);
        }
    }

    angles.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    angles.dedup_by(|a, b| (*a - *b).abs() <= 0.000001);
    angles
}

/// Dedup bitmap over the square window around the origin.
struct SeenSet {
    min_x: i32,
    min_y: i32,
    side: usize,
    bits: Vec<bool>,
    coords: Vec<Coord>,
}

impl SeenSet {
    fn new(origin: Coord, radius: u16) -> Self {
        let side = 2 * radius as usize + 1;
        Self {
            min_x: origin.x as i32 - radius as i32,
            min_y: origin.y as i32 - radius as i32,
            side,
            bits: vec![false; side * side],
            coords: Vec::new(),
        }
    }

    fn insert(&mut self, coord: Coord) {
        let lx = (coord.x as i32 - self.min_x) as usize;
        let ly = (coord.y as i32 - self.min_y) as usize;
        let idx = ly * self.side + lx;
        if !self.bits[idx] {
            self.bits[idx] = true;
            self.coords.push(coord);
        }
    }

    fn into_coords(mut self) -> Vec<Coord> {
        self.coords.sort();
        self.coords
    }
}
