//! Tab content renderers.

pub mod prasadam;
pub mod temples;

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::LoadState;
use crate::ui::styles;

/// Draw the loading or error placeholder for a listing.
///
/// Returns false when the listing is loaded and the caller should draw it.
pub(crate) fn render_load_state(frame: &mut Frame, state: &LoadState, title: &str, area: Rect) -> bool {
    let (text, style) = match state {
        LoadState::Loaded => return false,
        LoadState::Loading => ("Loading...".to_string(), styles::muted_style()),
        LoadState::Failed(message) => (message.clone(), styles::error_style()),
    };

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(vec![Line::from(""), Line::styled(format!("  {}", text), style)])
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
    true
}
