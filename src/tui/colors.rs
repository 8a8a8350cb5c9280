//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Header and status bar background
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Active filter tab
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Confirm dialog and error messages
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Row being renamed
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
