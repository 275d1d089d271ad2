//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `tabs`: Temples and Prasadam tab content
//! - `cart`: Cart sidebar
//! - `checkout`: Checkout dialog

pub mod cart;
pub mod checkout;
pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
