use ratatui::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    /// Accent for keys, cursors and the kind badge
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    /// Cursor row and gauge track
    pub selection_bg: Color,
    /// Picker characters that matched the query
    pub match_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x12, 0x16, 0x1C),
            text: Color::Rgb(0xC5, 0xCD, 0xD8),
            text_bright: Color::Rgb(0xF2, 0xF5, 0xF9),
            highlight: Color::Rgb(0x5F, 0xB3, 0xF9),
            dim: Color::Rgb(0x6B, 0x76, 0x86),
            red: Color::Rgb(0xF0, 0x5D, 0x5E),
            yellow: Color::Rgb(0xF2, 0xC1, 0x4E),
            green: Color::Rgb(0x62, 0xD2, 0x8C),
            cyan: Color::Rgb(0x4F, 0xD1, 0xC5),
            selection_bg: Color::Rgb(0x22, 0x2B, 0x38),
            match_fg: Color::Rgb(0xF2, 0xC1, 0x4E),
        }
    }
}

impl Theme {
    /// Gauge color for a completion percentage
    pub fn progress_color(&self, percent: u8) -> Color {
        match percent {
            100 => self.green,
            50..=99 => self.cyan,
            _ => self.yellow,
        }
    }
}
