/// Shader parameters that shape the wipe.
///
/// Only timeline tweens and timeline `set` steps write these values; the
/// surface reads them when it draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformStore {
    /// Wipe position, 0 fully open and 1 fully covering.
    pub progress: f32,
    /// Strength of the bend pulse layered over the wipe.
    pub power: f32,
    /// The overlay rests in its covering state.
    pub out_flag: bool,
}

impl Default for UniformStore {
    fn default() -> Self {
        Self {
            progress: 0.0,
            power: 0.0,
            out_flag: true,
        }
    }
}

impl UniformStore {
    pub fn progress_mut(&mut self) -> &mut f32 {
        &mut self.progress
    }

    pub fn power_mut(&mut self) -> &mut f32 {
        &mut self.power
    }

    pub fn out_flag_mut(&mut self) -> &mut bool {
        &mut self.out_flag
    }
}
