//! Orthographic camera and the fixed overlay mesh.
//!
//! The overlay is a single oversized triangle in mesh space, scaled to half
//! the viewport so that its right angle sits on the bottom-left corner and its
//! hypotenuse passes outside the top-right one. UVs run 0..2 along each leg,
//! which puts 0..1 exactly on the visible rectangle.

use transition::Viewport;

/// Mesh-space triangle corners.
pub const TRIANGLE_POSITIONS: [[f32; 3]; 3] =
    [[-1.0, -1.0, 0.0], [3.0, -1.0, 0.0], [-1.0, 3.0, 0.0]];

/// Texture coordinates matching [`TRIANGLE_POSITIONS`].
pub const TRIANGLE_UVS: [[f32; 2]; 3] = [[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]];

pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 100.0;
/// The camera sits on the +z axis looking back at the mesh plane.
pub const CAMERA_Z: f32 = 1.0;

/// Column-major 4x4 matrix as uploaded to the GPU.
pub type Mat4 = [[f32; 4]; 4];

const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Frustum spanning `[-w/2, w/2] x [-h/2, h/2]` around the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub z: f32,
}

impl OrthoCamera {
    pub fn for_size(width: f32, height: f32) -> Self {
        Self {
            left: -width / 2.0,
            right: width / 2.0,
            top: height / 2.0,
            bottom: -height / 2.0,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            z: CAMERA_Z,
        }
    }

    /// Projection with wgpu's `[0, 1]` depth range.
    pub fn projection(&self) -> Mat4 {
        let width = self.right - self.left;
        let height = self.top - self.bottom;
        let depth = self.far - self.near;
        [
            [2.0 / width, 0.0, 0.0, 0.0],
            [0.0, 2.0 / height, 0.0, 0.0],
            [0.0, 0.0, -1.0 / depth, 0.0],
            [
                -(self.right + self.left) / width,
                -(self.top + self.bottom) / height,
                -self.near / depth,
                1.0,
            ],
        ]
    }

    pub fn view(&self) -> Mat4 {
        let mut view = IDENTITY;
        view[3][2] = -self.z;
        view
    }

    pub fn view_projection(&self) -> Mat4 {
        multiply(&self.projection(), &self.view())
    }
}

/// Scale applied to the mesh so it spans the viewport.
pub fn mesh_scale(width: f32, height: f32) -> [f32; 3] {
    [width / 2.0, height / 2.0, 1.0]
}

/// Model-view-projection for a viewport of `width` x `height`.
pub fn overlay_transform(width: f32, height: f32) -> Mat4 {
    let [sx, sy, sz] = mesh_scale(width, height);
    let mut model = IDENTITY;
    model[0][0] = sx;
    model[1][1] = sy;
    model[2][2] = sz;
    multiply(&OrthoCamera::for_size(width, height).view_projection(), &model)
}

/// Physical backbuffer size once the scale factor is capped at `cap`.
///
/// Degenerate viewports map to `None`; the swapchain keeps its last size.
pub fn backbuffer_size(viewport: Viewport, cap: f64) -> Option<(u32, u32)> {
    if viewport.is_degenerate() {
        return None;
    }
    let ratio = viewport.pixel_ratio(cap);
    let scale = if viewport.scale_factor.is_finite() && viewport.scale_factor > 0.0 {
        ratio / viewport.scale_factor
    } else {
        1.0
    };
    let width = ((f64::from(viewport.width) * scale).round() as u32).max(1);
    let height = ((f64::from(viewport.height) * scale).round() as u32).max(1);
    Some((width, height))
}

fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (col, out_col) in out.iter_mut().enumerate() {
        for (row, cell) in out_col.iter_mut().enumerate() {
            *cell = (0..4).map(|k| a[k][row] * b[col][k]).sum();
        }
    }
    out
}

#[cfg(test)]
fn transform_point(m: &Mat4, point: [f32; 3]) -> [f32; 4] {
    let v = [point[0], point[1], point[2], 1.0];
    let mut out = [0.0; 4];
    for (row, cell) in out.iter_mut().enumerate() {
        *cell = (0..4).map(|k| m[k][row] * v[k]).sum();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: [f32; 4], expected: [f32; 4]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-5, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn frustum_matches_viewport() {
        let camera = OrthoCamera::for_size(800.0, 600.0);
        assert_eq!(camera.left, -400.0);
        assert_eq!(camera.right, 400.0);
        assert_eq!(camera.top, 300.0);
        assert_eq!(camera.bottom, -300.0);
        assert_eq!((camera.near, camera.far, camera.z), (1.0, 100.0, 1.0));
    }

    #[test]
    fn viewport_corners_land_on_clip_corners() {
        let vp = OrthoCamera::for_size(800.0, 600.0).view_projection();
        assert_close(transform_point(&vp, [-400.0, -300.0, 0.0]), [-1.0, -1.0, 0.0, 1.0]);
        assert_close(transform_point(&vp, [400.0, 300.0, 0.0]), [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn mesh_plane_sits_inside_depth_range() {
        let vp = OrthoCamera::for_size(100.0, 100.0).view_projection();
        let far_plane = transform_point(&vp, [0.0, 0.0, CAMERA_Z - CAMERA_FAR]);
        assert!((far_plane[2] - 1.0).abs() < 1e-5);
        let mesh = transform_point(&vp, [0.0, 0.0, 0.0]);
        assert!(mesh[2] >= 0.0 && mesh[2] <= 1.0);
    }

    #[test]
    fn triangle_covers_the_viewport() {
        assert_eq!(mesh_scale(1024.0, 768.0), [512.0, 384.0, 1.0]);
        let transform = overlay_transform(1024.0, 768.0);
        let clip: Vec<_> = TRIANGLE_POSITIONS
            .iter()
            .map(|position| transform_point(&transform, *position))
            .collect();
        assert_close(clip[0], [-1.0, -1.0, 0.0, 1.0]);
        assert_close(clip[1], [3.0, -1.0, 0.0, 1.0]);
        assert_close(clip[2], [-1.0, 3.0, 0.0, 1.0]);
    }

    #[test]
    fn uvs_reach_one_at_the_viewport_edge() {
        // Halfway along each leg is the far edge of the viewport.
        let right_uv = (TRIANGLE_UVS[0][0] + TRIANGLE_UVS[1][0]) / 2.0;
        let top_uv = (TRIANGLE_UVS[0][1] + TRIANGLE_UVS[2][1]) / 2.0;
        assert_eq!((right_uv, top_uv), (1.0, 1.0));
    }

    #[test]
    fn backbuffer_respects_pixel_ratio_cap() {
        let viewport = Viewport::new(3000, 1500).with_scale_factor(3.0);
        assert_eq!(backbuffer_size(viewport, 2.0), Some((2000, 1000)));

        let viewport = Viewport::new(1600, 1200).with_scale_factor(2.0);
        assert_eq!(backbuffer_size(viewport, 2.0), Some((1600, 1200)));

        assert_eq!(backbuffer_size(Viewport::new(0, 600), 2.0), None);
    }
}
