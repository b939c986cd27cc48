use crate::{
    chain::SlotLayout,
    config::AnimationConfig,
    raster::RasterSurface,
    record::{FrameSink, RecordingSettings},
    timeline::FrameClock,
    walker::{ChainWalker, TickOutcome},
    Result,
};

/// Frame loop that drives a [`ChainWalker`] and feeds a [`FrameSink`].
///
/// Every frame renders the current chain, hands the pixels to the sink and
/// then ticks the walker once. The loop stops after the tick that completes
/// a full traversal cycle.
#[derive(Debug)]
pub struct Renderer {
    walker: ChainWalker,
    surface: RasterSurface,
    layout: SlotLayout,
    clock: FrameClock,
    settings: RecordingSettings,
    running: bool,
}

impl Renderer {
    pub fn new(config: &AnimationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            walker: ChainWalker::new(),
            surface: RasterSurface::from_config(config)?,
            layout: SlotLayout::new(config.width, config.height),
            clock: FrameClock::from_millis(config.frame_delay_ms),
            settings: RecordingSettings::from_config(config),
            running: true,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn walker(&self) -> &ChainWalker {
        &self.walker
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Renders and pushes one frame, then advances the animation.
    ///
    /// Returns whether another frame should follow.
    pub fn render_frame<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> Result<bool> {
        if !self.running {
            return Ok(false);
        }

        self.surface.clear();
        self.walker.render(&mut self.surface, &self.layout);
        sink.push_frame(self.clock.frame(), self.surface.finish_frame())?;
        self.clock.advance();

        match self.walker.tick() {
            TickOutcome::CycleComplete => {
                tracing::debug!(frames = self.clock.frame(), "animation cycle complete");
                self.running = false;
            }
            TickOutcome::Advanced(index) | TickOutcome::TurnedAround(index) => {
                tracing::trace!(index, frame = self.clock.frame(), "next node stepping");
            }
            TickOutcome::Continuing => {}
        }
        Ok(self.running)
    }

    /// Drives one full cycle into `sink` and returns the number of frames.
    pub fn run<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> Result<u64> {
        sink.begin(&self.settings)?;
        while self.render_frame(sink)? {}
        sink.end()?;

        let frames = self.clock.frame();
        tracing::info!(
            frames,
            duration_ms = self.clock.elapsed().as_millis() as u64,
            "rendered animation"
        );
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{GifSink, InMemorySink};
    use crate::StepGifError;

    fn small_config() -> AnimationConfig {
        AnimationConfig {
            width: 120,
            height: 60,
            ..Default::default()
        }
    }

    #[test]
    fn one_cycle_is_two_hundred_frames() {
        let mut renderer = Renderer::new(&small_config()).unwrap();
        let mut sink = InMemorySink::new();

        let frames = renderer.run(&mut sink).unwrap();

        assert_eq!(frames, 200);
        assert_eq!(sink.frames().len(), 200);
        assert!(sink.is_finished());
        assert!(!renderer.is_running());
        let indices: Vec<u64> = sink.frames().iter().map(|(index, _)| *index).collect();
        assert_eq!(indices, (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn stopped_renderer_pushes_nothing() {
        let mut renderer = Renderer::new(&small_config()).unwrap();
        let mut sink = InMemorySink::new();
        renderer.run(&mut sink).unwrap();

        assert!(!renderer.render_frame(&mut sink).unwrap());
        assert_eq!(sink.frames().len(), 200);
    }

    #[test]
    fn animation_loops_back_to_its_first_frame() {
        let mut renderer = Renderer::new(&small_config()).unwrap();
        let mut sink = InMemorySink::new();
        renderer.run(&mut sink).unwrap();

        let frames = sink.frames();
        // Halfway through, every node is filled, so the picture differs.
        assert_ne!(frames[0].1, frames[100].1);

        let mut surface = RasterSurface::from_config(&small_config()).unwrap();
        renderer
            .walker()
            .render(&mut surface, &SlotLayout::new(120, 60));
        assert_eq!(surface.finish_frame(), &frames[0].1);
    }

    #[test]
    fn oversized_canvas_fails_before_any_output_exists() {
        let path = std::env::temp_dir().join(format!(
            "linked-step-{}-oversized.gif",
            std::process::id()
        ));
        let mut config = AnimationConfig {
            width: 70_000,
            height: 2,
            ..Default::default()
        };
        config.output.path = path.clone();

        assert!(matches!(
            Renderer::new(&config),
            Err(StepGifError::InvalidConfig(_))
        ));
        let mut sink = GifSink::from_config(&config);
        assert!(sink
            .begin(&RecordingSettings::from_config(&config))
            .is_err());
        assert!(!path.exists());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = AnimationConfig {
            frame_delay_ms: 0,
            ..Default::default()
        };
        assert!(Renderer::new(&config).is_err());
    }
}
