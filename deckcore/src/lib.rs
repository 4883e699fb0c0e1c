//! deckcore: shared library for the scriptdeck button deck
//!
//! Everything that is not drawing lives here: loading actions from script
//! files, the serial task runner, the controller that owns queue and log
//! state, colors, the background animation pool and settings.

pub mod action;
pub mod controller;
pub mod error;
pub mod log;
pub mod palette;
pub mod pool;
pub mod registry;
pub mod repaint;
pub mod runner;
pub mod safety;
pub mod script;
pub mod settings;
pub mod theme;
pub mod ticker;
pub mod widgets;

pub use action::{Action, ActionRef, FnAction};
pub use controller::{Controller, Message};
pub use error::{ActionError, DeckError};
pub use registry::{ActionSource, Registry};
pub use repaint::RepaintController;
pub use settings::Settings;
pub use theme::DeckTheme;
