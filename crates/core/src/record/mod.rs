use std::{
    cell::RefCell,
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, Frame, RgbaImage,
};

use crate::{config::MAX_DIMENSION, AnimationConfig, Result, StepGifError};

/// Parameters handed to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSettings {
    pub width: u32,
    pub height: u32,
    pub frame_delay_ms: u64,
}

impl RecordingSettings {
    pub fn from_config(config: &AnimationConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            frame_delay_ms: config.frame_delay_ms,
        }
    }
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}

/// Consumer of rendered frames, called in frame order.
pub trait FrameSink {
    /// Called once before any frame is pushed.
    fn begin(&mut self, settings: &RecordingSettings) -> Result<()>;
    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> Result<()>;
    /// Called once after the last frame; finalizes any output.
    fn end(&mut self) -> Result<()>;
}

/// Keeps every frame in memory. Used by tests and tooling.
#[derive(Debug, Default)]
pub struct InMemorySink {
    settings: Option<RecordingSettings>,
    frames: Vec<(u64, RgbaImage)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> Option<&RecordingSettings> {
        self.settings.as_ref()
    }

    pub fn frames(&self) -> &[(u64, RgbaImage)] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, settings: &RecordingSettings) -> Result<()> {
        self.settings = Some(settings.clone());
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> Result<()> {
        self.frames.push((index, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Streams frames into an animated GIF file.
pub struct GifSink {
    path: PathBuf,
    repeat: bool,
    speed: i32,
    delay: Option<Delay>,
    encoder: Option<GifEncoder<TrackedWriter<BufWriter<File>>>>,
    writer: Option<TrackedWriter<BufWriter<File>>>,
    frames_written: u64,
}

impl GifSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            repeat: true,
            speed: 10,
            delay: None,
            encoder: None,
            writer: None,
            frames_written: 0,
        }
    }

    pub fn from_config(config: &AnimationConfig) -> Self {
        Self::new(&config.output.path)
            .with_repeat(config.output.repeat)
            .with_speed(config.output.speed)
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, settings: &RecordingSettings) -> Result<()> {
        let delay_ms = u32::try_from(settings.frame_delay_ms)
            .map_err(|_| StepGifError::invalid_config("frame delay out of range"))?;
        let dimensions = 1..=MAX_DIMENSION;
        if !dimensions.contains(&settings.width) || !dimensions.contains(&settings.height) {
            return Err(StepGifError::invalid_config(format!(
                "gif frames cannot be {}x{}",
                settings.width, settings.height
            )));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let writer = TrackedWriter::new(BufWriter::new(File::create(&self.path)?));
        let mut encoder = GifEncoder::new_with_speed(writer.handle(), self.speed);
        if self.repeat {
            encoder.set_repeat(Repeat::Infinite)?;
        }

        tracing::debug!(path = %self.path.display(), delay_ms, "opened gif output");
        self.delay = Some(Delay::from_numer_denom_ms(delay_ms, 1));
        self.encoder = Some(encoder);
        self.writer = Some(writer);
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> Result<()> {
        let (Some(encoder), Some(delay)) = (self.encoder.as_mut(), self.delay) else {
            return Err(StepGifError::msg("gif sink received a frame before begin"));
        };
        encoder.encode_frame(Frame::from_parts(frame.clone(), 0, 0, delay))?;
        self.frames_written += 1;
        tracing::trace!(index, "encoded gif frame");
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        let (Some(encoder), Some(writer)) = (self.encoder.take(), self.writer.take()) else {
            return Err(StepGifError::msg("gif sink finished before begin"));
        };
        // The encoder writes the trailer on drop and swallows write errors;
        // the tracked writer surfaces them here.
        drop(encoder);
        writer.finish()?;
        tracing::info!(
            path = %self.path.display(),
            frames = self.frames_written,
            "wrote animated gif"
        );
        Ok(())
    }
}

impl std::fmt::Debug for GifSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifSink")
            .field("path", &self.path)
            .field("repeat", &self.repeat)
            .field("speed", &self.speed)
            .field("frames_written", &self.frames_written)
            .finish()
    }
}

struct Tracked<W> {
    out: W,
    error: Option<io::Error>,
}

/// Shared writer that remembers the first I/O error it hit, so failures
/// during an encoder's drop can still be reported.
struct TrackedWriter<W: Write> {
    shared: Rc<RefCell<Tracked<W>>>,
}

impl<W: Write> TrackedWriter<W> {
    fn new(out: W) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Tracked { out, error: None })),
        }
    }

    fn handle(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }

    /// Flushes and returns the inner writer. Every other handle must have
    /// been dropped.
    fn finish(self) -> io::Result<W> {
        let tracked = Rc::try_unwrap(self.shared)
            .map_err(|_| io::Error::other("writer still has open handles"))?
            .into_inner();
        if let Some(err) = tracked.error {
            return Err(err);
        }
        let mut out = tracked.out;
        out.flush()?;
        Ok(out)
    }

    fn record<T>(&self, result: io::Result<T>) -> io::Result<T> {
        result.map_err(|err| {
            let copy = io::Error::new(err.kind(), err.to_string());
            self.shared.borrow_mut().error.get_or_insert(err);
            copy
        })
    }
}

impl<W: Write> Write for TrackedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = self.shared.borrow_mut().out.write(buf);
        self.record(result)
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = self.shared.borrow_mut().out.flush();
        self.record(result)
    }
}
