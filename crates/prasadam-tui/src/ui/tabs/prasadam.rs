use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use prasadam_core::utils::truncate_string;
use prasadam_core::view::{prasadam_cards, PrasadamCard};
use prasadam_core::CatalogScope;

use crate::app::{App, Focus};
use crate::ui::styles;

use super::render_load_state;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.catalog.scope() {
        CatalogScope::All => "Prasadam".to_string(),
        CatalogScope::Temple { name, .. } => format!("Prasadam from {}", name),
    };
    if render_load_state(frame, &app.prasadam_load, &title, area) {
        return;
    }

    let cards = prasadam_cards(app.catalog.prasadam(), app.flashed_item());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_item_list(frame, app, &cards, &title, chunks[0]);
    render_item_detail(frame, cards.get(app.prasadam_selection), chunks[1]);
}

fn render_item_list(frame: &mut Frame, app: &App, cards: &[PrasadamCard], title: &str, area: Rect) {
    let name_width = (area.width as usize).saturating_sub(16).max(8);

    let items: Vec<ListItem> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let line = Line::from(vec![
                Span::raw(format!(" {} ", card.icon)),
                Span::raw(format!("{:<width$}", truncate_string(&card.name, name_width), width = name_width)),
                Span::styled(format!(" {:>8}", card.price), styles::price_style()),
            ]);
            let style = if i == app.prasadam_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let mut block = Block::default()
        .title(format!(" {} ({}) ", title, cards.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.focus == Focus::Catalog));
    if matches!(app.catalog.scope(), CatalogScope::Temple { .. }) {
        block = block.title_bottom(Line::styled(" [x] show all ", styles::muted_style()));
    }

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    if !cards.is_empty() {
        state.select(Some(app.prasadam_selection));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_item_detail(frame: &mut Frame, card: Option<&PrasadamCard>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(card) = card else {
        let paragraph = Paragraph::new(Line::styled("  No prasadam available", styles::muted_style()))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let button_style = if card.just_added {
        styles::success_style()
    } else {
        styles::button_style(true, true)
    };

    let lines = vec![
        Line::from(Span::raw(format!("  {}", card.icon))),
        Line::from(""),
        Line::from(Span::styled(card.name.clone(), styles::title_style())),
        Line::from(Span::styled(card.from.clone(), styles::muted_style())),
        Line::from(""),
        Line::from(card.description.clone()),
        Line::from(""),
        Line::from(Span::styled(card.price.clone(), styles::price_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!(" {} ", card.button_label()), button_style),
            Span::styled("  [Enter]", styles::muted_style()),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
