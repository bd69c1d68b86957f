/*!
 * Pagination of display lines into output pages.
 *
 * A logical input page is written to one or more output pages. Every page
 * opened on a [`PageSink`] is owned by a [`PageContext`] and committed back
 * to the sink exactly once: by [`PageContext::close`] on the normal path,
 * or by `Drop` when drawing fails part way.
 */

use log::warn;

use super::layout::RenderedLine;
use super::PageSize;
use crate::errors::RenderError;

/// Drawing surface of one open output page
pub trait PageCanvas {
    /// Draw text at the current line position
    fn show_text(&mut self, text: &str) -> Result<(), RenderError>;

    /// Move to the start of the next line
    fn new_line(&mut self) -> Result<(), RenderError>;
}

/// Geometry and text state of a page about to be opened
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub size: PageSize,
    pub font_size: f32,
    pub leading: f32,
    pub margin: f32,
}

/// Destination for output pages, appended in commit order
pub trait PageSink {
    type Canvas: PageCanvas;

    /// Open a page with the text cursor at the top-left margin
    fn begin_page(&mut self, setup: &PageSetup) -> Result<Self::Canvas, RenderError>;

    /// Finish a page and append it to the output
    fn commit_page(&mut self, canvas: Self::Canvas) -> Result<(), RenderError>;
}

/// Exclusively owned cursor over one open output page
pub struct PageContext<'a, S: PageSink> {
    sink: &'a mut S,
    canvas: Option<S::Canvas>,
    cursor_y: f32,
    leading: f32,
    margin: f32,
}

impl<'a, S: PageSink> PageContext<'a, S> {
    /// Open a page on `sink` and draw `header` at the top margin
    pub fn open(sink: &'a mut S, setup: &PageSetup, header: &str) -> Result<Self, RenderError> {
        let canvas = sink.begin_page(setup)?;
        let mut context = Self {
            sink,
            canvas: Some(canvas),
            cursor_y: setup.size.height - setup.margin - setup.leading,
            leading: setup.leading,
            margin: setup.margin,
        };

        if !header.is_empty() {
            let canvas = context.canvas_mut()?;
            canvas.show_text(header)?;
            canvas.new_line()?;
        }
        Ok(context)
    }

    fn canvas_mut(&mut self) -> Result<&mut S::Canvas, RenderError> {
        self.canvas
            .as_mut()
            .ok_or_else(|| RenderError::Pdf("Page was already closed".to_string()))
    }

    /// Whether the cursor has reached the bottom margin
    pub fn needs_new_page(&self) -> bool {
        self.cursor_y <= self.margin
    }

    /// Draw one line and advance by the leading; blank lines only advance
    pub fn write_line(&mut self, line: &RenderedLine) -> Result<(), RenderError> {
        let canvas = self.canvas_mut()?;
        if !line.is_blank {
            canvas.show_text(&line.text)?;
        }
        canvas.new_line()?;
        self.cursor_y -= self.leading;
        Ok(())
    }

    /// Commit the page to the sink
    pub fn close(mut self) -> Result<(), RenderError> {
        match self.canvas.take() {
            Some(canvas) => self.sink.commit_page(canvas),
            None => Ok(()),
        }
    }
}

impl<S: PageSink> Drop for PageContext<'_, S> {
    fn drop(&mut self) {
        if let Some(canvas) = self.canvas.take() {
            if let Err(e) = self.sink.commit_page(canvas) {
                warn!("Failed to commit page after an interrupted write: {}", e);
            }
        }
    }
}

/// Write the lines of one logical page, opening continuation pages on overflow.
///
/// `header_for(segment)` returns the header of the `segment`-th output page
/// (0 for the first). The first page may hold only its header when the
/// cursor starts at the margin; a continuation page always takes at least
/// one line. Returns the number of output pages written.
pub fn write_page<S: PageSink>(
    sink: &mut S,
    setup: &PageSetup,
    lines: &[RenderedLine],
    header_for: impl Fn(usize) -> String,
) -> Result<usize, RenderError> {
    let mut remaining = lines;
    let mut segment = 0usize;

    loop {
        let mut context = PageContext::open(sink, setup, &header_for(segment))?;

        let mut written = 0usize;
        for line in remaining {
            let fresh_continuation = segment > 0 && written == 0;
            if context.needs_new_page() && !fresh_continuation {
                break;
            }
            context.write_line(line)?;
            written += 1;
        }
        context.close()?;

        segment += 1;
        remaining = &remaining[written..];
        if remaining.is_empty() {
            return Ok(segment);
        }
    }
}
