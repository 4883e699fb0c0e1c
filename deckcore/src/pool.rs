//! Shuffled playback pool for background animations.
//!
//! Every asset is handed out once per cycle, in random order. When the
//! working copy runs dry it is refilled from the full set and reshuffled.

use crate::error::{DeckError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AnimationPool<T> {
    all: Vec<T>,
    remaining: Vec<T>,
}

impl<T: Clone> AnimationPool<T> {
    /// Build a pool and shuffle the first cycle.
    pub fn new<R: Rng + ?Sized>(items: Vec<T>, rng: &mut R) -> Self {
        let mut pool = Self { all: items, remaining: Vec::new() };
        pool.refill(rng);
        pool
    }

    fn refill<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.remaining = self.all.clone();
        self.remaining.shuffle(rng);
    }

    /// Next asset, refilling first when the current cycle is spent.
    /// `None` only when the pool has no assets at all.
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T> {
        if self.all.is_empty() {
            return None;
        }
        if self.remaining.is_empty() {
            self.refill(rng);
        }
        self.remaining.pop()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// List files in `dir` whose extension matches `extension`
/// (case-insensitive), sorted by name.
pub fn discover_assets(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|source| DeckError::Assets { path: dir.to_path_buf(), source })?;

    let mut found: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case(extension))
                .unwrap_or(false)
        })
        .collect();
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_each_cycle_shows_every_asset_once() {
        let mut rng = StdRng::seed_from_u64(42);
        let assets: Vec<u32> = (0..7).collect();
        let mut pool = AnimationPool::new(assets.clone(), &mut rng);

        for cycle in 0..5 {
            let shown: Vec<u32> = (0..assets.len())
                .map(|_| pool.next(&mut rng).unwrap())
                .collect();
            let unique: HashSet<u32> = shown.iter().copied().collect();
            assert_eq!(unique.len(), assets.len(), "cycle {} repeated: {:?}", cycle, shown);
        }
    }

    #[test]
    fn test_single_asset_repeats() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut pool = AnimationPool::new(vec!["only"], &mut rng);
        for _ in 0..3 {
            assert_eq!(pool.next(&mut rng), Some("only"));
        }
    }

    #[test]
    fn test_empty_pool_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut pool: AnimationPool<String> = AnimationPool::new(Vec::new(), &mut rng);
        assert!(pool.is_empty());
        assert_eq!(pool.next(&mut rng), None);
    }

    #[test]
    fn test_single_asset_repeats_gif() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut pool = AnimationPool::new(vec!["only.gif"], &mut rng);
        for _ in 0..4 {
            assert_eq!(pool.next(&mut rng), Some("only.gif"));
        }
    }

    #[test]
    fn test_discover_assets_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.gif", "a.GIF", "icon.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("folder.gif")).unwrap();

        let found = discover_assets(dir.path(), "gif").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.GIF", "b.gif"]);
    }

    #[test]
    fn test_discover_missing_dir_errors() {
        let err = discover_assets(Path::new("/no/such/assets"), "gif").unwrap_err();
        assert!(matches!(err, DeckError::Assets { .. }));
    }
}
