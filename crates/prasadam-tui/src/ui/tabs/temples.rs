use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use prasadam_core::utils::truncate_string;
use prasadam_core::view::{temple_cards, TempleCard};

use crate::app::{App, Focus};
use crate::ui::styles;

use super::render_load_state;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("Temples · {}", app.temple_filter.label());
    if render_load_state(frame, &app.temples_load, &title, area) {
        return;
    }

    let cards = temple_cards(app.visible_temples());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_temple_list(frame, app, &cards, &title, chunks[0]);
    render_temple_detail(frame, cards.get(app.temple_selection), chunks[1]);
}

fn render_temple_list(frame: &mut Frame, app: &App, cards: &[TempleCard], title: &str, area: Rect) {
    let name_width = (area.width as usize).saturating_sub(18).max(8);

    let items: Vec<ListItem> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let line = Line::from(vec![
                Span::styled(format!(" {:<12}", card.type_label), styles::accent_style(card.accent)),
                Span::raw(" "),
                Span::raw(truncate_string(&card.name, name_width)),
            ]);
            let style = if i == app.temple_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let block = Block::default()
        .title(format!(" {} ({}) ", title, cards.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.focus == Focus::Catalog));

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    if !cards.is_empty() {
        state.select(Some(app.temple_selection));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_temple_detail(frame: &mut Frame, card: Option<&TempleCard>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(card) = card else {
        let paragraph = Paragraph::new(Line::styled("  No temples to show", styles::muted_style()))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let lines = vec![
        Line::from(Span::styled(format!(" {} ", card.type_label), styles::accent_style(card.accent))),
        Line::from(""),
        Line::from(Span::styled(card.name.clone(), styles::title_style())),
        Line::from(vec![
            Span::styled("📍 ", styles::muted_style()),
            Span::styled(card.location.clone(), styles::muted_style()),
        ]),
        Line::from(""),
        Line::from(card.description.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter]", styles::help_key_style()),
            Span::styled(" View Prasadam", styles::help_desc_style()),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block.title(format!(" {} ", card.name)).title_style(styles::title_style()))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
