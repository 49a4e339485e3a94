//! Fixed timestep accumulator.

/// Turns variable frame times into a whole number of fixed physics steps.
///
/// ```
/// use rein2d::physics::stepper::FixedTimestep;
///
/// let mut stepper = FixedTimestep::new(1.0 / 60.0, 4);
/// let steps = stepper.advance(1.0 / 30.0);
/// assert_eq!(steps, 2);
/// ```
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    fixed_dt: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl FixedTimestep {
    /// A non-positive or non-finite `fixed_dt` falls back to 1/60.
    pub fn new(fixed_dt: f32, max_substeps: u32) -> Self {
        let fixed_dt = if fixed_dt.is_finite() && fixed_dt > 0.0 {
            fixed_dt
        } else {
            1.0 / 60.0
        };
        Self {
            fixed_dt,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
        }
    }

    #[inline]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    #[inline]
    pub fn max_substeps(&self) -> u32 {
        self.max_substeps
    }

    /// Add a frame's elapsed time and return how many fixed steps to run.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }

        let mut substeps = 0u32;
        while self.accumulator >= self.fixed_dt && substeps < self.max_substeps {
            self.accumulator -= self.fixed_dt;
            substeps += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if self.accumulator >= self.fixed_dt {
            self.accumulator = 0.0;
        }

        substeps
    }

    /// Fraction of a fixed step left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.fixed_dt).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(1.0 / 60.0, 4)
    }
}
