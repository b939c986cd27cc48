/// Amount `scale` moves per [`StepState::advance_step`] call.
pub const STEP_SIZE: f64 = 0.05;

/// Per-node oscillator that ramps `scale` from its last milestone to the
/// opposite one (0 to 1, then 1 to 0, alternating).
///
/// A step finishes once `scale` has travelled strictly more than one unit
/// away from the committed milestone. Accumulating [`STEP_SIZE`] twenty times
/// lands just above 1.0, so each step lasts exactly twenty calls; the value is
/// then snapped back onto the milestone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepState {
    scale: f64,
    direction: f64,
    committed_scale: f64,
}

impl StepState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live animated value, nominally within `[0, 1]`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Last completed milestone, always 0 or 1.
    pub fn committed_scale(&self) -> f64 {
        self.committed_scale
    }

    /// `0.0` while idle, `±1.0` while a step is running.
    pub fn direction(&self) -> f64 {
        self.direction
    }

    pub fn is_stepping(&self) -> bool {
        self.direction != 0.0
    }

    /// Moves `scale` by one increment and reports whether the step completed.
    pub fn advance_step(&mut self) -> bool {
        self.scale += STEP_SIZE * self.direction;
        if (self.scale - self.committed_scale).abs() > 1.0 {
            self.scale = self.committed_scale + self.direction;
            self.direction = 0.0;
            self.committed_scale = self.scale;
            return true;
        }
        false
    }

    /// Starts a step towards the opposite milestone unless one is running.
    pub fn begin_step(&mut self) {
        if self.direction == 0.0 {
            self.direction = 1.0 - 2.0 * self.committed_scale;
        }
    }
}
