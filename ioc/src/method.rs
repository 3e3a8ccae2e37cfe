//! Service methods: callables handed out by the container.

use crate::container::Container;
use crate::core::{downcast, Service};
use crate::error::{ContainerError, Result};
use crate::invoker::{self, Args, Invocable};
use crate::registry::Registry;

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

/// The value a `Method` definition resolves to.
///
/// Calling it merges the caller's arguments with container entries matching the
/// remaining parameter names and runs the underlying body every time; nothing is
/// cached.
///
/// The handle does not keep its container alive: once every [`Container`]
/// clone is dropped, calling it fails with [`ContainerError::ContainerDropped`].
#[derive(Clone)]
pub struct BoundMethod {
  id: String,
  invocable: Arc<Invocable>,
  registry: Weak<Registry>,
}

impl BoundMethod {
  pub(crate) fn new(id: &str, invocable: Arc<Invocable>, registry: Weak<Registry>) -> Self {
    Self {
      id: id.to_owned(),
      invocable,
      registry,
    }
  }

  /// The identifier this method was registered under.
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn invocable(&self) -> &Invocable {
    &self.invocable
  }

  pub fn call(&self, args: Args) -> Result<Service> {
    let container = Container::upgrade(&self.registry).ok_or_else(|| {
      ContainerError::ContainerDropped {
        id: self.id.clone(),
      }
    })?;
    invoker::invoke(&container, &self.invocable, &args)
  }

  /// Calls the method and downcasts its result.
  pub fn call_as<T: Any + Send + Sync>(&self, args: Args) -> Result<Arc<T>> {
    downcast(&self.id, self.call(args)?)
  }
}

impl fmt::Debug for BoundMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BoundMethod")
      .field("id", &self.id)
      .field("invocable", &self.invocable)
      .finish_non_exhaustive()
  }
}
