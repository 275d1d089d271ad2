//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use prasadam_core::TempleFilter;

use crate::app::{App, AppState, CheckoutFocus, Focus, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ShowingAlert => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.dismiss_alert();
            }
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Checkout => {
            handle_checkout_input(app, key);
            return Ok(false);
        }
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('1') => select_tab(app, Tab::Temples),
        KeyCode::Char('2') => select_tab(app, Tab::Prasadam),
        KeyCode::Left => select_tab(app, app.current_tab.prev()),
        KeyCode::Right => select_tab(app, app.current_tab.next()),
        KeyCode::Char('c') => app.toggle_cart(),
        KeyCode::Char('o') => app.open_checkout(),
        KeyCode::Char('u') => app.refresh_catalog(),
        KeyCode::Tab if app.cart_open => {
            app.focus = match app.focus {
                Focus::Catalog => Focus::Cart,
                Focus::Cart => Focus::Catalog,
            };
        }
        _ => {
            if app.focus == Focus::Cart {
                handle_cart_input(app, key);
            } else {
                match app.current_tab {
                    Tab::Temples => handle_temples_input(app, key),
                    Tab::Prasadam => handle_prasadam_input(app, key),
                }
            }
        }
    }

    Ok(false)
}

fn select_tab(app: &mut App, tab: Tab) {
    app.current_tab = tab;
    app.focus = Focus::Catalog;
}

/// Shared list movement. Returns true if the key was a navigation key.
fn navigate(selection: &mut usize, len: usize, key: KeyCode) -> bool {
    let max_index = len.saturating_sub(1);
    match key {
        KeyCode::Down => *selection = (*selection + 1).min(max_index),
        KeyCode::Up => *selection = selection.saturating_sub(1),
        KeyCode::Home => *selection = 0,
        KeyCode::End => *selection = max_index,
        KeyCode::PageDown => *selection = (*selection + PAGE_SCROLL_SIZE).min(max_index),
        KeyCode::PageUp => *selection = selection.saturating_sub(PAGE_SCROLL_SIZE),
        _ => return false,
    }
    true
}

fn handle_temples_input(app: &mut App, key: KeyEvent) {
    let len = app.visible_temples().len();
    if navigate(&mut app.temple_selection, len, key.code) {
        return;
    }

    match key.code {
        KeyCode::Char('a') => app.set_temple_filter(TempleFilter::All),
        KeyCode::Char('j') => app.set_temple_filter(TempleFilter::Jyotirlinga),
        KeyCode::Char('d') => app.set_temple_filter(TempleFilter::Dham),
        KeyCode::Enter => {
            if let Some(id) = app.selected_temple().map(|t| t.id) {
                app.view_temple_prasadam(id);
            }
        }
        _ => {}
    }
}

fn handle_prasadam_input(app: &mut App, key: KeyEvent) {
    let len = app.catalog.prasadam().len();
    if navigate(&mut app.prasadam_selection, len, key.code) {
        return;
    }

    match key.code {
        KeyCode::Enter | KeyCode::Char('+') => app.add_selected_to_cart(),
        KeyCode::Char('x') => app.show_all_prasadam(),
        _ => {}
    }
}

fn handle_cart_input(app: &mut App, key: KeyEvent) {
    let len = app.cart.cart().len();
    if navigate(&mut app.cart_selection, len, key.code) {
        return;
    }

    match key.code {
        KeyCode::Delete | KeyCode::Char('r') | KeyCode::Char('-') => app.remove_selected_from_cart(),
        KeyCode::Enter => app.open_checkout(),
        KeyCode::Esc => app.close_cart(),
        _ => {}
    }
}

fn handle_checkout_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_checkout(),
        KeyCode::Tab | KeyCode::Down => app.checkout_focus = app.checkout_focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.checkout_focus = app.checkout_focus.prev(),
        KeyCode::Enter => match app.checkout_focus {
            CheckoutFocus::Field(_) => app.checkout_focus = app.checkout_focus.next(),
            CheckoutFocus::PlaceOrder => app.submit_order(),
        },
        KeyCode::Backspace => {
            if let CheckoutFocus::Field(field) = app.checkout_focus {
                app.checkout.form_mut().field_mut(field).pop();
            }
        }
        KeyCode::Char(c) => {
            if let CheckoutFocus::Field(field) = app.checkout_focus {
                app.checkout.form_mut().push_char(field, c);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{item, temple, test_app};
    use crossterm::event::KeyModifiers;
    use prasadam_core::models::{ContactField, TempleType};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, key(code)).await.unwrap()
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c)).await;
        }
    }

    #[tokio::test]
    async fn test_quit_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        assert!(!press(&mut app, KeyCode::Char('q')).await);
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')).await);
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Char('q')).await;
        assert!(press(&mut app, KeyCode::Char('y')).await);
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_tab_switching() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        press(&mut app, KeyCode::Char('2')).await;
        assert_eq!(app.current_tab, Tab::Prasadam);
        press(&mut app, KeyCode::Right).await;
        assert_eq!(app.current_tab, Tab::Temples);
    }

    #[tokio::test]
    async fn test_temple_filter_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.catalog.set_temples(vec![
            temple(1, TempleType::Jyotirlinga),
            temple(2, TempleType::Dham),
        ]);

        press(&mut app, KeyCode::Char('d')).await;
        assert_eq!(app.temple_filter, TempleFilter::Dham);
        assert_eq!(app.selected_temple().map(|t| t.id), Some(2));

        press(&mut app, KeyCode::Char('a')).await;
        press(&mut app, KeyCode::End).await;
        assert_eq!(app.temple_selection, 1);
        press(&mut app, KeyCode::Down).await;
        assert_eq!(app.temple_selection, 1);
    }

    #[tokio::test]
    async fn test_add_and_remove_from_cart() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.catalog.set_all_prasadam(vec![item(1, 50.0), item(2, 30.0)]);
        app.current_tab = Tab::Prasadam;

        press(&mut app, KeyCode::Enter).await;
        press(&mut app, KeyCode::Down).await;
        press(&mut app, KeyCode::Char('+')).await;
        press(&mut app, KeyCode::Char('+')).await;
        assert_eq!(app.cart.total_item_count(), 3);
        app.check_background_tasks().await;
        assert!(app.cart_open);

        // Cart focus takes the list keys
        press(&mut app, KeyCode::Tab).await;
        assert_eq!(app.focus, Focus::Cart);
        press(&mut app, KeyCode::Char('r')).await;
        assert_eq!(app.cart.cart().len(), 1);
        assert_eq!(app.cart.cart().lines()[0].id, 2);

        press(&mut app, KeyCode::Esc).await;
        assert!(!app.cart_open);
        assert_eq!(app.focus, Focus::Catalog);
    }

    #[tokio::test]
    async fn test_checkout_form_typing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.cart.add_one(&item(1, 50.0)).unwrap();

        press(&mut app, KeyCode::Char('o')).await;
        assert_eq!(app.state, AppState::Checkout);

        // Global keys are text while the dialog is open
        type_text(&mut app, "quo").await;
        press(&mut app, KeyCode::Backspace).await;
        assert_eq!(app.checkout.form().field(ContactField::Name), "qu");
        assert_eq!(app.state, AppState::Checkout);

        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.checkout_focus, CheckoutFocus::Field(ContactField::Email));
        press(&mut app, KeyCode::BackTab).await;
        assert_eq!(app.checkout_focus, CheckoutFocus::Field(ContactField::Name));

        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.cart.total_item_count(), 1);
    }

    #[tokio::test]
    async fn test_place_order_with_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.cart.add_one(&item(1, 50.0)).unwrap();

        press(&mut app, KeyCode::Char('o')).await;
        app.checkout_focus = CheckoutFocus::PlaceOrder;
        press(&mut app, KeyCode::Enter).await;

        assert_eq!(app.checkout_focus, CheckoutFocus::Field(ContactField::Name));
        assert_eq!(app.status_message.as_deref(), Some("Full Name is required"));
        assert!(!app.checkout.is_submitting());
    }

    #[tokio::test]
    async fn test_checkout_on_empty_cart_stays_normal() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        press(&mut app, KeyCode::Char('o')).await;
        assert_eq!(app.state, AppState::Normal);
    }
}
