//! Core data structures shared by the registry, the invoker and the container.

use crate::error::{ContainerError, Result};
use crate::invoker::Invocable;

use once_cell::sync::OnceCell;
use std::any::Any;
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A type-erased, shareable service value.
///
/// Every resolution hands out one of these; use
/// [`Container::get_as`](crate::Container::get_as) for typed access.
pub type Service = Arc<dyn Any + Send + Sync>;

/// Wraps a concrete value into a [`Service`].
pub fn service<T: Any + Send + Sync>(value: T) -> Service {
  Arc::new(value)
}

/// Downcasts a [`Service`], reporting `id` when the type does not match.
pub(crate) fn downcast<T: Any + Send + Sync>(id: &str, service: Service) -> Result<Arc<T>> {
  service
    .downcast::<T>()
    .map_err(|_| ContainerError::TypeMismatch {
      id: id.to_owned(),
      expected: std::any::type_name::<T>(),
    })
}

thread_local! {
  // Identifiers currently being resolved on this thread, tagged with the owning
  // container so that two containers may use the same identifier independently.
  static RESOLVING_STACK: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// An RAII guard detecting circular resolution.
///
/// Entering pushes `(owner, id)` onto the thread-local stack and fails if the pair
/// is already present. Dropping the guard pops it again.
pub(crate) struct ResolutionGuard {
  owner: usize,
  id: String,
}

impl ResolutionGuard {
  pub(crate) fn enter(owner: usize, id: &str) -> Result<Self> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(start) = stack.iter().position(|(o, i)| *o == owner && i == id) {
        let mut chain: Vec<&str> = stack[start..]
          .iter()
          .filter(|(o, _)| *o == owner)
          .map(|(_, i)| i.as_str())
          .collect();
        chain.push(id);
        return Err(ContainerError::CyclicDependency {
          chain: chain.join(" -> "),
        });
      }
      stack.push((owner, id.to_owned()));
      Ok(())
    })?;
    Ok(Self {
      owner,
      id: id.to_owned(),
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(pos) = stack
        .iter()
        .rposition(|(o, i)| *o == self.owner && *i == self.id)
      {
        stack.remove(pos);
      }
    });
  }
}

/// The kind of a registered definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
  /// A pre-built value, returned as-is.
  Value,
  /// Constructed on first request, then cached.
  Singleton,
  /// Constructed on every request.
  Factory,
  /// Resolves to a [`BoundMethod`](crate::BoundMethod).
  Method,
}

pub(crate) enum Definition {
  Value(Service),
  Singleton {
    cell: OnceCell<Service>,
    invocable: Arc<Invocable>,
    // Resolutions currently holding a `BuildGuard` on this definition.
    building: AtomicUsize,
  },
  Factory(Arc<Invocable>),
  Method(Arc<Invocable>),
}

impl Definition {
  pub(crate) fn singleton(invocable: Invocable) -> Self {
    Definition::Singleton {
      cell: OnceCell::new(),
      invocable: Arc::new(invocable),
      building: AtomicUsize::new(0),
    }
  }

  pub(crate) fn kind(&self) -> Kind {
    match self {
      Definition::Value(_) => Kind::Value,
      Definition::Singleton { .. } => Kind::Singleton,
      Definition::Factory(_) => Kind::Factory,
      Definition::Method(_) => Kind::Method,
    }
  }

  /// Whether a singleton has been constructed and cached.
  pub(crate) fn is_resolved(&self) -> bool {
    matches!(self, Definition::Singleton { cell, .. } if cell.get().is_some())
  }

  /// Whether replacing this definition would discard a singleton value that was
  /// handed out, or is about to be.
  pub(crate) fn is_frozen(&self) -> bool {
    match self {
      Definition::Singleton { cell, building, .. } => {
        cell.get().is_some() || building.load(Ordering::Acquire) > 0
      }
      _ => false,
    }
  }
}

/// Marks an unresolved singleton as under construction while alive.
///
/// Taken by the registry under the shard lock, so an overwrite either lands
/// before the resolution starts or is refused until it ends.
pub(crate) struct BuildGuard {
  definition: Arc<Definition>,
}

impl BuildGuard {
  pub(crate) fn enter(definition: &Arc<Definition>) -> Option<Self> {
    match &**definition {
      Definition::Singleton { cell, building, .. } if cell.get().is_none() => {
        building.fetch_add(1, Ordering::AcqRel);
        Some(Self {
          definition: Arc::clone(definition),
        })
      }
      _ => None,
    }
  }
}

impl Drop for BuildGuard {
  fn drop(&mut self) {
    if let Definition::Singleton { building, .. } = &*self.definition {
      building.fetch_sub(1, Ordering::AcqRel);
    }
  }
}
