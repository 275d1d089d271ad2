use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use prasadam_core::offline::ProxyState;
use prasadam_core::utils::format_rupees;
use prasadam_core::TempleFilter;

use crate::app::{ApiHealth, App, AppState, Tab};

use super::styles;
use super::tabs::{prasadam, temples};
use super::{cart, checkout};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Checkout => checkout::render(frame, app),
        AppState::ShowingAlert => {
            // The alert sits on top of the dialog it answers
            if app.checkout.is_open() {
                checkout::render(frame, app);
            }
            render_alert_overlay(frame, app);
        }
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  E-Prashadam";
    let tagline = " · Sacred offerings from India's holy temples";
    let help_hint = "[?] Help";
    let used = title.len() + tagline.chars().count() + help_hint.len() + 4;

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(tagline, styles::muted_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let main_tabs = [
        ("[1] Temples", app.current_tab == Tab::Temples),
        ("[2] Prasadam", app.current_tab == Tab::Prasadam),
    ];

    let mut spans = vec![Span::raw(" ")];
    push_choices(&mut spans, &main_tabs);

    // Temple type filter on the right of the Temples tab
    if app.current_tab == Tab::Temples {
        let filters = [
            ("[a]ll", app.temple_filter == TempleFilter::All),
            ("[j]yotirlinga", app.temple_filter == TempleFilter::Jyotirlinga),
            ("[d]ham", app.temple_filter == TempleFilter::Dham),
        ];
        let main_width: usize = spans.iter().map(|s| s.content.len()).sum();
        let filter_width: usize =
            filters.iter().map(|(l, _)| l.len()).sum::<usize>() + (filters.len() - 1) * 3;
        let padding = (area.width as usize).saturating_sub(main_width + filter_width + 2);

        spans.push(Span::raw(" ".repeat(padding)));
        push_choices(&mut spans, &filters);
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn push_choices(spans: &mut Vec<Span<'static>>, choices: &[(&'static str, bool)]) {
    for (i, (label, selected)) in choices.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let style = if *selected {
            styles::tab_style(true)
        } else {
            styles::muted_style()
        };
        spans.push(Span::styled(*label, style));
    }
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let (content, sidebar) = if app.cart_open {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    match app.current_tab {
        Tab::Temples => temples::render(frame, app, content),
        Tab::Prasadam => prasadam::render(frame, app, content),
    }

    if let Some(sidebar) = sidebar {
        cart::render(frame, app, sidebar);
    }
}

/// Left side of the status bar when no message is pending.
fn status_summary(app: &App) -> String {
    let count = app.cart.total_item_count();
    let mut parts = vec![format!(
        "Cart: {} item{} · {}",
        count,
        if count == 1 { "" } else { "s" },
        format_rupees(app.cart.total_price())
    )];

    match &app.api_health {
        ApiHealth::Up(health) if health.is_healthy() => parts.push("API up".to_string()),
        ApiHealth::Up(health) => parts.push(format!("API {}", health.status)),
        ApiHealth::Down(_) => parts.push("API unreachable".to_string()),
        ApiHealth::Unknown => {}
    }

    if let Some(status) = &app.offline_status {
        let cache = match (status.state, &status.last_updated) {
            (ProxyState::Activated, Some(age)) => {
                format!("Offline cache: {} files, {}", status.entries, age)
            }
            (ProxyState::Activated, None) => format!("Offline cache: {} files", status.entries),
            _ => "Offline cache: not ready".to_string(),
        };
        parts.push(cache);
    }

    parts.join(" | ")
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[c]art | [o]rder | [u]pdate | [q]uit";

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => format!(" {} ", status_summary(app)),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 27, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("             ॐ  E-Prashadam", styles::title_style())),
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1/2", "Switch tabs"),
        help_line("←/→", "Prev/next tab"),
        help_line("↑/↓", "Navigate list"),
        help_line("Tab", "Switch focus (catalog ↔ cart)"),
        help_line("Esc", "Close cart or dialog"),
        Line::from(""),
        Line::from(Span::styled(" Temples", styles::highlight_style())),
        help_line("a/j/d", "Show all/Jyotirlingas/Dhams"),
        help_line("Enter", "View this temple's prasadam"),
        Line::from(""),
        Line::from(Span::styled(" Prasadam", styles::highlight_style())),
        help_line("Enter/+", "Add to cart"),
        help_line("x", "Show prasadam from all temples"),
        Line::from(""),
        Line::from(Span::styled(" Cart", styles::highlight_style())),
        help_line("c", "Open/close cart"),
        help_line("r/Del", "Remove selected item"),
        help_line("o", "Proceed to checkout"),
        help_line("u", "Reload catalog"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 8, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled("            ॐ  E-Prashadam", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_alert_overlay(frame: &mut Frame, app: &App) {
    let message = app.alert.as_deref().unwrap_or_default();
    let area = centered_rect_fixed(56, 8, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}", message), styles::list_item_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("Enter", styles::help_key_style()),
            Span::styled(" to continue", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" E-Prashadam ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
