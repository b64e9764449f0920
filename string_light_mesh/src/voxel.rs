// Dense voxel grid raycaster.
//
// The grid is stored as a flat `Vec<bool>` (solid / empty) indexed by
// `x + z * size_x + y * size_x * size_z`, one unit voxel per cell with the
// grid's corner at the world origin. Out-of-bounds reads are empty;
// out-of-bounds writes are no-ops.
//
// `cast()` is a 3D DDA (Amanatides & Woo) traversal. A ray starting outside
// the grid is first clipped to the grid bounds with the same slab test the
// analytic scene uses. The hit reports the entry point into the first solid
// voxel, the normal of the face crossed, and the distance from the origin.
// Solid voxels the ray *starts in* are walked out of rather than reported,
// which matches the "origin inside a collider is ignored" convention of
// `scene.rs`: a backward cast from a hit point on a voxel face finds the
// opposite surface instead of the voxel it is touching.
//
// See also: `host.rs` for the `Raycaster` trait, `scene.rs` for the analytic
// collider scene.

use crate::host::{RaycastHit, Raycaster};
use crate::scene::ray_aabb_entry;
use glam::Vec3;

/// Dense 3D grid of unit voxels.
#[derive(Clone, Debug, Default)]
pub struct VoxelGrid {
    /// Flat storage: index = x + z * size_x + y * size_x * size_z.
    solid: Vec<bool>,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
}

impl VoxelGrid {
    /// Create a new grid with every voxel empty.
    pub fn new(size_x: u32, size_y: u32, size_z: u32) -> Self {
        let total = (size_x as usize) * (size_y as usize) * (size_z as usize);
        Self {
            solid: vec![false; total],
            size_x,
            size_y,
            size_z,
        }
    }

    pub fn in_bounds(&self, coord: [i32; 3]) -> bool {
        coord[0] >= 0
            && coord[1] >= 0
            && coord[2] >= 0
            && (coord[0] as u32) < self.size_x
            && (coord[1] as u32) < self.size_y
            && (coord[2] as u32) < self.size_z
    }

    fn index(&self, coord: [i32; 3]) -> Option<usize> {
        if self.in_bounds(coord) {
            let [x, y, z] = coord.map(|c| c as usize);
            let sx = self.size_x as usize;
            let sz = self.size_z as usize;
            Some(x + z * sx + y * sx * sz)
        } else {
            None
        }
    }

    /// Returns `false` for out-of-bounds coordinates.
    pub fn is_solid(&self, coord: [i32; 3]) -> bool {
        self.index(coord).is_some_and(|i| self.solid[i])
    }

    pub fn set_solid(&mut self, coord: [i32; 3], solid: bool) {
        if let Some(i) = self.index(coord) {
            self.solid[i] = solid;
        }
    }

    /// Mark every voxel in the inclusive box `min..=max` solid.
    pub fn fill(&mut self, min: [i32; 3], max: [i32; 3]) {
        for y in min[1]..=max[1] {
            for z in min[2]..=max[2] {
                for x in min[0]..=max[0] {
                    self.set_solid([x, y, z], true);
                }
            }
        }
    }

    fn extent(&self) -> Vec3 {
        Vec3::new(self.size_x as f32, self.size_y as f32, self.size_z as f32)
    }
}

impl Raycaster for VoxelGrid {
    fn cast(&self, origin: Vec3, direction: Vec3) -> Option<RaycastHit> {
        let dir = direction.try_normalize()?;
        let extent = self.extent();

        // Where the ray enters the grid, and through which face if it starts
        // outside.
        let (t_start, mut crossed_axis) =
            if origin.cmpge(Vec3::ZERO).all() && origin.cmple(extent).all() {
                (0.0, None)
            } else {
                let (t, axis) = ray_aabb_entry(origin, dir, Vec3::ZERO, extent)?;
                (t, Some(axis))
            };
        let start = origin + dir * t_start;
        let limits = [self.size_x, self.size_y, self.size_z];

        let mut voxel = [0i32; 3];
        let mut step = [0i32; 3];
        let mut t_max = [f32::INFINITY; 3];
        let mut t_delta = [f32::INFINITY; 3];

        for axis in 0..3 {
            let max_cell = limits[axis].saturating_sub(1) as i32;
            voxel[axis] = (start[axis].floor() as i32).clamp(0, max_cell);
            if dir[axis] > 0.0 {
                step[axis] = 1;
                t_delta[axis] = 1.0 / dir[axis];
                t_max[axis] = ((voxel[axis] + 1) as f32 - origin[axis]) / dir[axis];
            } else if dir[axis] < 0.0 {
                step[axis] = -1;
                t_delta[axis] = 1.0 / -dir[axis];
                t_max[axis] = (origin[axis] - voxel[axis] as f32) / -dir[axis];
            }
            // If dir[axis] == 0, step/t_max/t_delta stay at 0/INF/INF: the axis never advances.
        }

        // Solid voxels around an origin inside the grid are walked out of.
        let mut leaving_start = crossed_axis.is_none();
        let mut t_current = t_start;

        while self.in_bounds(voxel) {
            if self.is_solid(voxel) {
                if let (false, Some(axis)) = (leaving_start, crossed_axis) {
                    let mut normal = Vec3::ZERO;
                    normal[axis] = -step[axis] as f32;
                    return Some(RaycastHit {
                        point: origin + dir * t_current,
                        normal,
                        distance: t_current,
                    });
                }
            } else {
                leaving_start = false;
            }

            // Advance along the axis with the smallest t_max.
            let min_axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
                0
            } else if t_max[1] <= t_max[2] {
                1
            } else {
                2
            };
            if t_max[min_axis].is_infinite() {
                return None;
            }

            t_current = t_max[min_axis];
            voxel[min_axis] += step[min_axis];
            t_max[min_axis] += t_delta[min_axis];
            crossed_axis = Some(min_axis);
        }

        None
    }
}
