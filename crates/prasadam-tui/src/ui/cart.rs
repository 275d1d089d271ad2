use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use prasadam_core::view::cart_view;

use crate::app::{App, Focus};

use super::styles;

/// Cart sidebar: lines, running total and the checkout hint.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = cart_view(app.cart.cart());
    let focused = app.focus == Focus::Cart;

    let block = Block::default()
        .title(format!(" Your Cart ({}) ", view.item_count))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(inner);

    if view.is_empty {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::styled("  Your cart is empty", styles::muted_style()),
        ]);
        frame.render_widget(paragraph, chunks[0]);
    } else {
        let items: Vec<ListItem> = view
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let style = if focused && i == app.cart_selection {
                    styles::selected_style()
                } else {
                    styles::list_item_style()
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(line.name.clone(), styles::highlight_style()),
                        Span::raw("  "),
                        Span::styled(line.line_total.clone(), styles::price_style()),
                    ]),
                    Line::styled(format!("  {}", line.temple), styles::muted_style()),
                    Line::raw(format!("  {}", line.quantity)),
                ])
                .style(style)
            })
            .collect();

        let mut state = ListState::default();
        if focused {
            state.select(Some(app.cart_selection));
        }
        frame.render_stateful_widget(List::new(items), chunks[0], &mut state);
    }

    let footer = vec![
        Line::from(vec![
            Span::styled("Total: ", styles::highlight_style()),
            Span::styled(view.total, styles::price_style()),
        ]),
        Line::from(vec![
            Span::styled(
                "[o] Proceed to Checkout",
                styles::button_style(false, view.checkout_enabled),
            ),
        ]),
    ];
    let paragraph = Paragraph::new(footer).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(styles::muted_style()),
    );
    frame.render_widget(paragraph, chunks[1]);
}
