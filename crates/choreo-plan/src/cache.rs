//! Keyed cache of compiled movies.
//!
//! Entries are keyed by the digest of a movie's canonical JSON together with
//! the plan options, so any edit to either produces a fresh compile.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use choreo_core::hash::ContentHasher;
use choreo_core::{ChoreoResult, ContentHash};
use choreo_ir::{CompiledMovie, MovieDefinition};

use crate::context::PlanOptions;
use crate::planner::Planner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(ContentHash);

impl CacheKey {
    pub fn for_movie(movie: &MovieDefinition, options: &PlanOptions) -> ChoreoResult<Self> {
        let mut hasher = ContentHasher::new();
        hasher.update_json(movie)?;
        hasher.update_json(options)?;
        Ok(Self(hasher.finish()))
    }

    pub fn hash(&self) -> ContentHash {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Entry {
    movie: String,
    compiled: Arc<CompiledMovie>,
}

/// Compiled movies owned by one caller; no process-wide state.
pub struct CompileCache {
    planner: Planner,
    entries: HashMap<CacheKey, Entry>,
}

impl CompileCache {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner,
            entries: HashMap::new(),
        }
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn key_for(&self, movie: &MovieDefinition) -> ChoreoResult<CacheKey> {
        CacheKey::for_movie(movie, self.planner.options())
    }

    /// Return the cached compile of `movie`, compiling on a miss.
    /// Failed compiles are not cached.
    pub fn get_or_compile(&mut self, movie: &MovieDefinition) -> ChoreoResult<Arc<CompiledMovie>> {
        let key = self.key_for(movie)?;
        if let Some(entry) = self.entries.get(&key) {
            tracing::debug!("cache hit for '{}' ({})", movie.name, key);
            return Ok(Arc::clone(&entry.compiled));
        }
        tracing::debug!("cache miss for '{}' ({})", movie.name, key);
        let compiled = Arc::new(self.planner.compile(movie)?);
        self.entries.insert(
            key,
            Entry {
                movie: movie.name.clone(),
                compiled: Arc::clone(&compiled),
            },
        );
        Ok(compiled)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<CompiledMovie>> {
        self.entries.get(key).map(|entry| Arc::clone(&entry.compiled))
    }

    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry compiled from a movie called `name`. Returns how many went.
    pub fn invalidate_movie(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.movie != name);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CompileCache {
    fn default() -> Self {
        Self::new(Planner::default())
    }
}
