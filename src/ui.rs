//! `UiFrame`: a thin wrapper around `ratatui::Frame` that clamps every draw
//! call to the visible area.
//!
//! Floating menu lists are placed by the positioner in page coordinates and
//! can hang past the terminal edge while the terminal is being resized.
//! Drawing through `UiFrame` clips those rectangles instead of writing
//! outside the buffer.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Draw into an arbitrary buffer, e.g. an offscreen one in tests and
    /// benchmarks.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    /// Write `text` at `(x, y)`, truncated to the frame area.
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, style: Style) {
        safe_set_string(self.buffer, self.area, x, y, text, style);
    }
}

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let available = max_x.saturating_sub(x);
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_to_width_short_and_long() {
        assert_eq!(truncate_to_width("File", 10), "File");
        assert_eq!(truncate_to_width("Preferences", 4), "Pref");
    }

    #[test]
    fn set_string_clips_to_area() {
        let area = Rect::new(0, 0, 6, 2);
        let mut buf = Buffer::empty(area);
        let mut ui = UiFrame::from_parts(area, &mut buf);
        ui.set_string(3, 0, "Window", Style::default());
        ui.set_string(100, 0, "x", Style::default());
        ui.set_string(0, 5, "x", Style::default());
        let row: String = (0..6)
            .map(|x| buf.cell((x, 0)).map(|c| c.symbol().to_string()).unwrap_or_default())
            .collect();
        assert_eq!(row, "   Win");
    }

    #[test]
    fn render_widget_clips_to_frame_area() {
        struct Fill;
        impl Widget for Fill {
            fn render(self, area: Rect, buf: &mut Buffer) {
                for y in area.y..area.bottom() {
                    for x in area.x..area.right() {
                        if let Some(cell) = buf.cell_mut((x, y)) {
                            cell.set_symbol("A");
                        }
                    }
                }
            }
        }

        let area = Rect::new(0, 0, 5, 3);
        let mut buf = Buffer::empty(area);
        let mut ui = UiFrame::from_parts(area, &mut buf);
        ui.render_widget(Fill, Rect::new(3, 1, 5, 2));
        ui.render_widget(Fill, Rect::new(10, 10, 2, 2));

        assert_eq!(buf.cell((3, 1)).map(|c| c.symbol()), Some("A"));
        assert_eq!(buf.cell((4, 2)).map(|c| c.symbol()), Some("A"));
        assert_eq!(buf.cell((2, 1)).map(|c| c.symbol()), Some(" "));
    }
}
