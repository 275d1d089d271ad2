use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use prasadam_core::checkout::{CheckoutFailure, TRANSPORT_FAILURE_MESSAGE};
use prasadam_core::models::ContactField;
use prasadam_core::utils::truncate_string;
use prasadam_core::view::order_summary_view;
use prasadam_core::CheckoutState;

use crate::app::{App, CheckoutFocus};

use super::render::centered_rect_fixed;
use super::styles;

const DIALOG_WIDTH: u16 = 60;
const FIELD_WIDTH: usize = 36;

/// Order summary plus the contact form.
pub fn render(frame: &mut Frame, app: &App) {
    let mut lines = vec![Line::from(Span::styled(" Order Summary", styles::highlight_style()))];

    if let Some(summary) = app.checkout.summary() {
        let view = order_summary_view(summary);
        for (label, amount) in view.lines {
            let label = truncate_string(&label, 40);
            let pad = 44usize.saturating_sub(label.chars().count());
            lines.push(Line::from(vec![
                Span::raw(format!("  {}{}", label, " ".repeat(pad))),
                Span::styled(amount, styles::price_style()),
            ]));
        }
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<44}", "Total"), styles::highlight_style()),
            Span::styled(view.total, styles::price_style()),
        ]));
    }
    lines.push(Line::from(""));

    for field in ContactField::ALL {
        lines.push(field_line(app, field));
    }
    lines.push(Line::from(""));

    let submitting = app.checkout.is_submitting();
    let focused = app.checkout_focus == CheckoutFocus::PlaceOrder;
    let label = if submitting { "  Placing...  " } else { " Place Order " };
    lines.push(Line::from(vec![
        Span::raw("                    ["),
        Span::styled(label, styles::button_style(focused, !submitting)),
        Span::raw("]"),
    ]));

    if let CheckoutState::Failed(failure) = app.checkout.state() {
        let reason = match failure {
            CheckoutFailure::Rejected(reason) => format!("Failed to place order: {}", reason),
            CheckoutFailure::Transport => TRANSPORT_FAILURE_MESSAGE.to_string(),
        };
        lines.push(Line::from(""));
        lines.push(Line::styled(format!(" {}", reason), styles::error_style()));
    }

    let height = lines.len() as u16 + 2;
    let area = centered_rect_fixed(DIALOG_WIDTH, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Checkout ")
        .title_style(styles::title_style())
        .title_bottom(Line::styled(" [Tab] next field · [Esc] close ", styles::muted_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_line(app: &App, field: ContactField) -> Line<'static> {
    let focused = app.checkout_focus == CheckoutFocus::Field(field);
    let value = app.checkout.form().field(field);

    // Show the tail so the cursor stays visible on long input
    let shown: String = {
        let count = value.chars().count();
        value.chars().skip(count.saturating_sub(FIELD_WIDTH - 1)).collect()
    };
    let cursor = if focused { "▌" } else { "" };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };

    Line::from(vec![
        Span::styled(format!(" {:>16}: [", field.label()), styles::muted_style()),
        Span::styled(
            format!("{:<width$}", format!("{}{}", shown, cursor), width = FIELD_WIDTH),
            style,
        ),
        Span::styled("]", styles::muted_style()),
    ])
}
