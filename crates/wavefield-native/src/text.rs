//! Terminal renderer: draws the field as a block of glow characters.

use std::fmt::Write as _;
use std::io::{self, Write};
use wavefield_core::{FrameConsumer, FrameView, WaveField};

/// Glyphs from dark to fully lit.
pub const GLOW_RAMP: &[u8] = b" .:-=+*#%@";

/// Render `field` downsampled to at most `columns` characters wide.
///
/// Terminal cells are about twice as tall as they are wide, so the block has
/// half as many rows as columns. Each character shows the brightest cell it
/// covers.
pub fn render_field(field: &WaveField, columns: usize) -> String {
    let res = field.resolution();
    let columns = columns.clamp(1, res);
    let rows = (columns / 2).max(1);
    let cells = field.cells();
    let top = (GLOW_RAMP.len() - 1) as f32;

    let mut out = String::with_capacity((columns + 1) * rows);
    for r in 0..rows {
        let (y0, y1) = (r * res / rows, ((r + 1) * res / rows).max(r * res / rows + 1));
        for c in 0..columns {
            let (x0, x1) = (
                c * res / columns,
                ((c + 1) * res / columns).max(c * res / columns + 1),
            );
            let mut energy = 0.0f32;
            for y in y0..y1.min(res) {
                for x in x0..x1.min(res) {
                    energy = energy.max(cells[y * res + x].energy);
                }
            }
            let glyph = (energy.clamp(0.0, 1.0) * top).round() as usize;
            out.push(GLOW_RAMP[glyph] as char);
        }
        out.push('\n');
    }
    out
}

/// Frame consumer that prints every `every`-th frame, starting with the first.
pub struct TextRenderer<W: Write> {
    out: W,
    every: u32,
    columns: usize,
    frames_seen: u64,
    frames_drawn: u64,
    error: Option<io::Error>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, every: u32, columns: usize) -> Self {
        Self {
            out,
            every,
            columns,
            frames_seen: 0,
            frames_drawn: 0,
            error: None,
        }
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// The first write error, if output has failed. Once set, no further
    /// frames are drawn.
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, frame: &FrameView<'_>) -> io::Result<()> {
        let mut text = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(
            text,
            "t={:>7.0}ms  waves={:<3} energy={:.2}",
            frame.time_ms,
            frame.waves.len(),
            frame.field.total_energy()
        );
        text.push_str(&render_field(frame.field, self.columns));
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write> FrameConsumer for TextRenderer<W> {
    fn consume(&mut self, frame: &FrameView<'_>) {
        self.frames_seen += 1;
        if self.every == 0 || self.error.is_some() {
            return;
        }
        if (self.frames_seen - 1) % self.every as u64 != 0 {
            return;
        }
        match self.draw(frame) {
            Ok(()) => self.frames_drawn += 1,
            Err(err) => {
                log::warn!("[text] output failed, no more frames will be drawn: {err}");
                self.error = Some(err);
            }
        }
    }
}
