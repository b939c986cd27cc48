use std::{io::Write, time::Duration};

use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};
use image::{Rgba, RgbaImage};

use crate::{record::FrameSink, RecordingSettings, Result};

const RAMP: &[u8] = b" .:-=+*#%@";

/// Display-only sink that plays the animation as ASCII art on a terminal.
///
/// Each frame is reduced to a grid of `columns` characters across; the
/// character density follows how far each cell strays from the background.
#[derive(Debug)]
pub struct TerminalPreview<W: Write> {
    out: W,
    columns: u32,
    background: Rgba<u8>,
    interval: Duration,
    pace: bool,
}

impl<W: Write> TerminalPreview<W> {
    pub fn new(out: W, columns: u32, background: [u8; 4]) -> Self {
        Self {
            out,
            columns: columns.max(1),
            background: Rgba(background),
            interval: Duration::ZERO,
            pace: true,
        }
    }

    /// Disables sleeping between frames.
    pub fn unpaced(mut self) -> Self {
        self.pace = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn rasterize(&self, frame: &RgbaImage) -> String {
        let (width, height) = frame.dimensions();
        let columns = self.columns.min(width.max(1));
        let cell_w = width.div_ceil(columns).max(1);
        // Terminal cells are roughly twice as tall as they are wide.
        let cell_h = (cell_w * 2).max(1);
        let rows = height.div_ceil(cell_h);

        let mut text = String::with_capacity(((columns + 1) * rows) as usize);
        for row in 0..rows {
            for column in 0..columns {
                let ink = self.cell_ink(frame, column * cell_w, row * cell_h, cell_w, cell_h);
                let level = (ink * (RAMP.len() - 1) as f64).round() as usize;
                text.push(RAMP[level.min(RAMP.len() - 1)] as char);
            }
            text.push('\n');
        }
        text
    }

    /// Mean distance from the background over one cell, in `[0, 1]`.
    fn cell_ink(&self, frame: &RgbaImage, x0: u32, y0: u32, w: u32, h: u32) -> f64 {
        let x1 = (x0 + w).min(frame.width());
        let y1 = (y0 + h).min(frame.height());
        let mut total = 0.0;
        let mut count = 0u32;
        for y in y0..y1 {
            for x in x0..x1 {
                let pixel = frame.get_pixel(x, y);
                let diff = (0..3)
                    .map(|c| (f64::from(pixel[c]) - f64::from(self.background[c])).abs())
                    .fold(0.0, f64::max);
                total += diff / 255.0;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            // Strokes are thin relative to a cell; boost so they stay visible.
            (total / f64::from(count) * 4.0).min(1.0)
        }
    }
}

impl<W: Write> FrameSink for TerminalPreview<W> {
    fn begin(&mut self, settings: &RecordingSettings) -> Result<()> {
        self.interval = Duration::from_millis(settings.frame_delay_ms);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(())
    }

    fn push_frame(&mut self, index: u64, frame: &RgbaImage) -> Result<()> {
        let text = self.rasterize(frame);
        queue!(self.out, MoveTo(0, 0))?;
        writeln!(self.out, "{text}frame {index}")?;
        self.out.flush()?;
        if self.pace {
            std::thread::sleep(self.interval);
        }
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn blank_frame_renders_as_spaces() {
        let preview = TerminalPreview::new(Vec::new(), 10, BG).unpaced();
        let frame = RgbaImage::from_pixel(20, 20, Rgba(BG));
        let text = preview.rasterize(&frame);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|line| *line == " ".repeat(10)));
    }

    #[test]
    fn ink_shows_up_in_the_matching_cell() {
        let preview = TerminalPreview::new(Vec::new(), 10, BG).unpaced();
        let mut frame = RgbaImage::from_pixel(20, 20, Rgba(BG));
        for y in 0..4 {
            for x in 0..2 {
                frame.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        let text = preview.rasterize(&frame);
        let first = text.lines().next().unwrap();
        assert_eq!(first.chars().next(), Some('@'));
        assert_eq!(&first[1..], " ".repeat(9));
    }

    #[test]
    fn frames_are_written_with_their_index() {
        let mut preview = TerminalPreview::new(Vec::new(), 4, BG).unpaced();
        preview.begin(&RecordingSettings::default()).unwrap();
        preview
            .push_frame(7, &RgbaImage::from_pixel(8, 8, Rgba(BG)))
            .unwrap();
        preview.end().unwrap();

        let mut prefix = Vec::new();
        queue!(prefix, Clear(ClearType::All), MoveTo(0, 0)).unwrap();
        let written = preview.into_inner();
        assert!(written.starts_with(&prefix));
        let written = String::from_utf8(written).unwrap();
        assert!(written.ends_with("frame 7\n"));
    }
}
