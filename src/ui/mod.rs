//! Terminal user interface for the news reader.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling per view
//! - `events` - Background task results
//! - `helpers` - Task spawning and browser handoff
//! - `render` - View dispatch and overlays
//! - `header`, `articles`, `sidebar`, `pager`, `status` - Feed view widgets
//! - `auth`, `preferences`, `profile`, `help` - Forms and overlays

mod articles;
mod auth;
mod events;
mod header;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod pager;
mod preferences;
mod profile;
mod render;
mod sidebar;
mod status;

pub use loop_runner::{run, Action};
