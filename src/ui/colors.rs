//! Color schemes for the dashboard panels

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

/// Available color schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorScheme {
    #[default]
    Default,
    Monochrome,
}

impl ColorScheme {
    /// Get the theme for this color scheme
    pub fn theme(&self) -> Theme {
        match self {
            ColorScheme::Default => Theme::default_theme(),
            ColorScheme::Monochrome => Theme::monochrome(),
        }
    }
}

/// Colors used by each panel
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,

    // Title bar - black on cyan
    pub title_fg: Color,
    pub title_bg: Color,

    // Panel accents
    pub cpu: Color,
    pub memory: Color,
    pub processes: Color,
    pub network: Color,

    pub bar: Color,
    pub bar_empty: Color,
    pub graph: Color,

    /// Extra emphasis for labels, used when colors are unavailable
    pub label_modifier: Modifier,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            background: Color::Reset,
            text: Color::White,
            text_dim: Color::DarkGray,
            border: Color::Gray,

            title_fg: Color::Black,
            title_bg: Color::Cyan,

            cpu: Color::Cyan,
            memory: Color::Green,
            processes: Color::Yellow,
            network: Color::Magenta,

            bar: Color::Blue,
            bar_empty: Color::DarkGray,
            graph: Color::Red,

            label_modifier: Modifier::empty(),
        }
    }

    pub fn monochrome() -> Self {
        let w = Color::Reset;
        Self {
            background: w,
            text: w,
            text_dim: w,
            border: w,
            title_fg: w,
            title_bg: w,
            cpu: w,
            memory: w,
            processes: w,
            network: w,
            bar: w,
            bar_empty: w,
            graph: w,
            label_modifier: Modifier::BOLD,
        }
    }

    pub fn title(&self) -> Style {
        let style = Style::default().fg(self.title_fg).bg(self.title_bg);
        if self.title_bg == Color::Reset {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    }

    /// Label style for a panel accent color
    pub fn label(&self, accent: Color) -> Style {
        Style::default()
            .fg(accent)
            .add_modifier(self.label_modifier)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        let theme = ColorScheme::Default.theme();
        assert_eq!(theme.title(), Style::default().fg(Color::Black).bg(Color::Cyan));
        assert_eq!(theme.cpu, Color::Cyan);
        assert_eq!(theme.memory, Color::Green);
        assert_eq!(theme.graph, Color::Red);
    }

    #[test]
    fn test_monochrome_uses_reverse_title() {
        let theme = ColorScheme::Monochrome.theme();
        assert!(theme.title().add_modifier.contains(Modifier::REVERSED));
        assert!(theme.label(theme.cpu).add_modifier.contains(Modifier::BOLD));
    }
}
