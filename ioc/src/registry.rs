//! The keyed map underneath the container.
//!
//! It knows nothing about sigils, invocation or autowiring: it stores
//! definitions under canonical identifiers and refuses to replace a singleton
//! that has been handed out or is being constructed.

use crate::core::{BuildGuard, Definition};
use crate::error::{ContainerError, Result};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Default)]
pub(crate) struct Registry {
  definitions: DashMap<String, Arc<Definition>>,
}

impl Registry {
  /// Returns a handle on the definition so that no shard lock is held while it
  /// is being resolved.
  pub(crate) fn lookup(&self, id: &str) -> Option<Arc<Definition>> {
    self.definitions.get(id).map(|entry| Arc::clone(entry.value()))
  }

  /// Like [`lookup`](Self::lookup), marking an unresolved singleton as under
  /// construction before the shard lock is released.
  pub(crate) fn checkout(&self, id: &str) -> Option<(Arc<Definition>, Option<BuildGuard>)> {
    self.definitions.get(id).map(|entry| {
      let definition = Arc::clone(entry.value());
      let guard = BuildGuard::enter(&definition);
      (definition, guard)
    })
  }

  pub(crate) fn contains(&self, id: &str) -> bool {
    self.definitions.contains_key(id)
  }

  /// Stores `definition`, returning whether an earlier definition was replaced.
  pub(crate) fn insert(&self, id: String, definition: Definition) -> Result<bool> {
    match self.definitions.entry(id) {
      Entry::Occupied(mut occupied) => {
        if occupied.get().is_frozen() {
          return Err(ContainerError::FrozenService {
            id: occupied.key().clone(),
          });
        }
        occupied.insert(Arc::new(definition));
        Ok(true)
      }
      Entry::Vacant(vacant) => {
        vacant.insert(Arc::new(definition));
        Ok(false)
      }
    }
  }

  /// Replaces the definition under `id` with one derived from it.
  ///
  /// `derive` runs under the shard lock and must not touch the registry.
  pub(crate) fn replace_with<F>(&self, id: &str, derive: F) -> Result<()>
  where
    F: FnOnce(&Definition) -> Result<Definition>,
  {
    match self.definitions.entry(id.to_owned()) {
      Entry::Occupied(mut occupied) => {
        if occupied.get().is_frozen() {
          return Err(ContainerError::FrozenService { id: id.to_owned() });
        }
        let derived = derive(occupied.get())?;
        occupied.insert(Arc::new(derived));
        Ok(())
      }
      Entry::Vacant(_) => Err(ContainerError::UnknownIdentifier { id: id.to_owned() }),
    }
  }

  pub(crate) fn remove(&self, id: &str) -> Option<Arc<Definition>> {
    self.definitions.remove(id).map(|(_, definition)| definition)
  }

  pub(crate) fn len(&self) -> usize {
    self.definitions.len()
  }

  pub(crate) fn identifiers(&self) -> Vec<String> {
    self
      .definitions
      .iter()
      .map(|entry| entry.key().clone())
      .collect()
  }
}
