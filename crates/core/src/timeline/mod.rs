use std::time::Duration;

/// Fixed-interval frame counter used by the render loop.
///
/// Time is derived from the frame index rather than a wall clock, so an
/// exported animation does not depend on how fast frames were produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameClock {
    interval: Duration,
    frame: u64,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        Self { interval, frame: 0 }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Index of the frame about to be produced.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Presentation time of the current frame.
    pub fn elapsed(&self) -> Duration {
        self.interval.saturating_mul(u32::try_from(self.frame).unwrap_or(u32::MAX))
    }

    pub fn advance(&mut self) {
        self.frame += 1;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::from_millis(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_tracks_frame_index() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.elapsed(), Duration::ZERO);

        for _ in 0..20 {
            clock.advance();
        }
        assert_eq!(clock.frame(), 20);
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
    }
}
