use std::time::Instant;

pub const MAX_LOGIC_UPDATE_PER_SECOND: f32 = 60.0;
/// Length of one logic step in seconds.
pub const FIXED_UPDATE_TIMESTEP: f32 = 1.0 / MAX_LOGIC_UPDATE_PER_SECOND;

/// Fixed-step accumulator: rendering happens once per frame, logic advances in whole
/// `FIXED_UPDATE_TIMESTEP` steps regardless of the frame rate.
///
/// Uses [`Instant`], which is monotonic, so the elapsed time can never be negative.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    previous: Instant,
    lag: f32,
}

impl FixedTimestep {
    pub fn new(now: Instant) -> Self {
        Self {
            previous: now,
            lag: 0.0,
        }
    }

    /// Adds the wall time since the previous tick to the accumulator.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.previous).as_secs_f32();
        self.previous = now;
        self.accumulate(elapsed);
        elapsed
    }

    pub fn accumulate(&mut self, elapsed: f32) {
        self.lag += elapsed.max(0.0);
    }

    /// Consumes every whole step in the accumulator and returns how many there were.
    pub fn drain(&mut self) -> u32 {
        let mut steps = 0;
        while self.lag >= FIXED_UPDATE_TIMESTEP {
            self.lag -= FIXED_UPDATE_TIMESTEP;
            steps += 1;
        }
        steps
    }

    pub fn lag(&self) -> f32 {
        self.lag
    }
}
