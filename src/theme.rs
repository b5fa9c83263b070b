use ratatui::style::{Color, Modifier, Style};

// Centralized demo colors. The menu state machine never looks at these; the
// terminal view maps menu state onto them.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);

pub fn accent() -> Color {
    Color::Rgb(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2)
}

// Menubar
pub fn menubar_bg() -> Color {
    Color::DarkGray
}
pub fn menubar_fg() -> Color {
    Color::White
}
pub fn trigger_open_bg() -> Color {
    Color::Gray
}
pub fn trigger_open_fg() -> Color {
    Color::Black
}

// Lists
pub fn menu_bg() -> Color {
    Color::Black
}
pub fn menu_fg() -> Color {
    Color::White
}
pub fn menu_border() -> Color {
    Color::DarkGray
}
pub fn menu_selected_bg() -> Color {
    Color::Gray
}
pub fn menu_selected_fg() -> Color {
    Color::Black
}
pub fn menu_disabled_fg() -> Color {
    Color::DarkGray
}

// Status line
pub fn status_bg() -> Color {
    Color::Blue
}
pub fn status_fg() -> Color {
    Color::White
}

/// Style for a list while its opacity is still low.
pub fn fading(style: Style) -> Style {
    style.add_modifier(Modifier::DIM)
}

pub fn checked_marker() -> Style {
    Style::default().fg(accent()).add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fading_keeps_colors() {
        let base = Style::default().fg(menu_fg()).bg(menu_bg());
        let faded = fading(base);
        assert_eq!(faded.fg, Some(menu_fg()));
        assert!(faded.add_modifier.contains(Modifier::DIM));
    }

    #[test]
    fn accent_is_rgb() {
        assert_eq!(accent(), Color::Rgb(200, 100, 0));
    }
}
