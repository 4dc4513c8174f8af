//! UI module - HUD and pause overlay.

mod hud;
mod plugin;

pub use hud::HudValues;
pub use plugin::UiPlugin;
