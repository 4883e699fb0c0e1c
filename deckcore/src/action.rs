//! Actions: named, zero-argument effect callbacks shown as deck buttons.

use crate::error::ActionError;
use std::fmt;
use std::sync::Arc;

/// Something a deck button can run.
///
/// `run` is called on a worker thread, never on the UI thread, so
/// implementations must be `Send + Sync`. An action has no inputs and no
/// result beyond success or an error message.
pub trait Action: Send + Sync {
    /// Source name, e.g. `do_thing`.
    fn name(&self) -> &str;

    fn run(&self) -> Result<(), ActionError>;

    /// Button label, e.g. `DO THING`.
    fn display_name(&self) -> String {
        display_name(self.name())
    }
}

/// Shared handle to a registered action.
pub type ActionRef = Arc<dyn Action>;

/// Turn a function name into a button label: underscores become spaces,
/// letters are upper-cased.
pub fn display_name(name: &str) -> String {
    name.replace('_', " ").to_uppercase()
}

/// An action backed by a Rust closure.
pub struct FnAction<F> {
    name: String,
    func: F,
}

impl<F> FnAction<F>
where
    F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self { name: name.into(), func }
    }

    pub fn shared(name: impl Into<String>, func: F) -> ActionRef {
        Arc::new(Self::new(name, func))
    }
}

impl<F> Action for FnAction<F>
where
    F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self) -> Result<(), ActionError> {
        (self.func)()
    }
}

impl<F> fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction").field("name", &self.name).finish()
    }
}
