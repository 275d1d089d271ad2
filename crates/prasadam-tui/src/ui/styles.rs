use ratatui::style::{Color, Modifier, Style};

use prasadam_core::view::CardAccent;

// Color palette
pub const PRIMARY: Color = Color::Rgb(230, 126, 34);
pub const SECONDARY: Color = Color::Rgb(76, 175, 80);
pub const ACCENT: Color = Color::Rgb(241, 196, 15);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(64, 48, 40);

// Temple card headers
pub const JYOTIRLINGA: Color = Color::Rgb(139, 69, 19);
pub const DHAM: Color = Color::Rgb(210, 105, 30);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY).add_modifier(Modifier::BOLD)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn price_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Header band of a temple card.
pub fn accent_style(accent: CardAccent) -> Style {
    let bg = match accent {
        CardAccent::Jyotirlinga => JYOTIRLINGA,
        CardAccent::Dham => DHAM,
    };
    Style::default().bg(bg).fg(Color::White).add_modifier(Modifier::BOLD)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn button_style(focused: bool, enabled: bool) -> Style {
    if !enabled {
        muted_style()
    } else if focused {
        Style::default().bg(PRIMARY).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(PRIMARY)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(40, 32, 28)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}
