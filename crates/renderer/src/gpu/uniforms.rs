use bytemuck::{Pod, Zeroable};
use transition::UniformStore;

use crate::camera::{self, Mat4};

/// std140 image of the `TransitionUniforms` block.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TransitionUniforms {
    pub transform: Mat4,
    pub overlay_color: [f32; 4],
    pub resolution: [f32; 2],
    pub progress: f32,
    pub power: f32,
    pub out_flag: u32,
    pub _padding: [u32; 3],
}

unsafe impl Zeroable for TransitionUniforms {}
unsafe impl Pod for TransitionUniforms {}

impl TransitionUniforms {
    pub fn new(width: u32, height: u32, overlay_color: [f32; 3]) -> Self {
        let mut uniforms = Self {
            transform: [[0.0; 4]; 4],
            overlay_color: [overlay_color[0], overlay_color[1], overlay_color[2], 1.0],
            resolution: [0.0; 2],
            progress: 0.0,
            power: 0.0,
            out_flag: 1,
            _padding: [0; 3],
        };
        uniforms.set_resolution(width, height);
        uniforms
    }

    /// Rebuilds the camera and mesh transform for a new backbuffer size.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1) as f32, height.max(1) as f32);
        self.resolution = [width, height];
        self.transform = camera::overlay_transform(width, height);
    }

    pub fn apply(&mut self, store: &UniformStore) {
        self.progress = store.progress;
        self.power = store.power;
        self.out_flag = u32::from(store.out_flag);
    }
}
