//! Action registry
//!
//! Sources expose a single entry point, [`ActionSource::actions`]. The
//! registry walks its sources once at startup and keeps the result frozen
//! for the life of the app: file order first, declaration order within
//! each file. Any source failure aborts the whole load.

use crate::action::{Action, ActionRef};
use crate::error::Result;
use crate::script::ScriptFile;
use std::path::Path;

/// Anything that can contribute actions to the deck.
pub trait ActionSource {
    /// Short label used in logs.
    fn label(&self) -> String;

    fn actions(&self) -> Result<Vec<ActionRef>>;
}

impl ActionSource for ScriptFile {
    fn label(&self) -> String {
        self.path().display().to_string()
    }

    fn actions(&self) -> Result<Vec<ActionRef>> {
        Ok(self.load()?.into_iter().map(|a| a.into_ref()).collect())
    }
}

/// A fixed list of in-process actions.
impl ActionSource for Vec<ActionRef> {
    fn label(&self) -> String {
        "builtin".to_string()
    }

    fn actions(&self) -> Result<Vec<ActionRef>> {
        Ok(self.clone())
    }
}

/// Immutable, ordered set of loaded actions.
#[derive(Clone, Default)]
pub struct Registry {
    actions: Vec<ActionRef>,
}

impl Registry {
    /// Load every source in order. The first failure is returned and no
    /// registry is produced.
    pub fn load<'a, I>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a dyn ActionSource>,
    {
        let mut actions = Vec::new();
        for source in sources {
            let found = source.actions()?;
            tracing::info!(source = %source.label(), count = found.len(), "loaded actions");
            actions.extend(found);
        }
        Ok(Self { actions })
    }

    /// Load script files named relative to `dir`, using `shell` to run them.
    pub fn from_scripts<S: AsRef<str>>(dir: &Path, names: &[S], shell: &str) -> Result<Self> {
        let files: Vec<ScriptFile> = names
            .iter()
            .map(|name| ScriptFile::new(dir.join(name.as_ref())).with_shell(shell))
            .collect();
        Self::load(files.iter().map(|f| f as &dyn ActionSource))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ActionRef> {
        self.actions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionRef> {
        self.actions.iter()
    }

    /// Button labels in registry order.
    pub fn display_names(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.display_name()).collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.actions.iter().map(|a| a.name())).finish()
    }
}
