//! The main `Container` struct and its associated methods.

use crate::autowire::{self, Autowire, AutowireOptions, Manifest, ResolvedFields};
use crate::core::{downcast, service, Definition, Kind, ResolutionGuard, Service};
use crate::error::{ContainerError, Result};
use crate::invoker::{self, Args, Invocable};
use crate::method::BoundMethod;
use crate::registry::Registry;
use crate::sigil::{self, Sigil};

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// What gets stored under an identifier.
pub enum Entry {
  /// A pre-built value.
  Value(Service),
  /// An invocable whose kind is picked from the identifier's sigil:
  /// `"id()"` for a method, `"id++"` for a factory, a singleton otherwise.
  Invocable(Invocable),
  /// Always a singleton, whatever the identifier's sigil.
  Singleton(Invocable),
  /// Always a factory.
  Factory(Invocable),
  /// Always a method.
  Method(Invocable),
}

impl Entry {
  pub fn value<T: Any + Send + Sync>(value: T) -> Self {
    Entry::Value(service(value))
  }
}

impl From<Invocable> for Entry {
  fn from(invocable: Invocable) -> Self {
    Entry::Invocable(invocable)
  }
}

impl fmt::Debug for Entry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Entry::Value(_) => f.write_str("Entry::Value"),
      Entry::Invocable(i) => f.debug_tuple("Entry::Invocable").field(i).finish(),
      Entry::Singleton(i) => f.debug_tuple("Entry::Singleton").field(i).finish(),
      Entry::Factory(i) => f.debug_tuple("Entry::Factory").field(i).finish(),
      Entry::Method(i) => f.debug_tuple("Entry::Method").field(i).finish(),
    }
  }
}

/// A stored definition, returned by [`Container::raw`] without invoking it.
#[derive(Clone)]
pub enum Raw {
  Value(Service),
  Singleton(Arc<Invocable>),
  Factory(Arc<Invocable>),
  Method(Arc<Invocable>),
}

impl Raw {
  pub fn kind(&self) -> Kind {
    match self {
      Raw::Value(_) => Kind::Value,
      Raw::Singleton(_) => Kind::Singleton,
      Raw::Factory(_) => Kind::Factory,
      Raw::Method(_) => Kind::Method,
    }
  }

  /// The stored invocable, or `None` for a plain value.
  pub fn invocable(&self) -> Option<&Invocable> {
    match self {
      Raw::Value(_) => None,
      Raw::Singleton(i) | Raw::Factory(i) | Raw::Method(i) => Some(&**i),
    }
  }
}

impl fmt::Debug for Raw {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Raw::Value(_) => f.write_str("Raw::Value"),
      Raw::Singleton(i) => f.debug_tuple("Raw::Singleton").field(i).finish(),
      Raw::Factory(i) => f.debug_tuple("Raw::Factory").field(i).finish(),
      Raw::Method(i) => f.debug_tuple("Raw::Method").field(i).finish(),
    }
  }
}

/// A setup callback for [`Container::register`].
pub type Plugin = Box<dyn FnOnce(&Container) -> Result<()>>;

/// The Inversion of Control (IoC) container.
///
/// Services are addressed by string identifiers. A `Container` is a cheap,
/// thread-safe handle: clones share the same registrations.
#[derive(Clone, Default)]
pub struct Container {
  registry: Arc<Registry>,
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a container and registers `entries` in iteration order.
  pub fn with_entries<I, K>(entries: I) -> Result<Self>
  where
    I: IntoIterator<Item = (K, Entry)>,
    K: AsRef<str>,
  {
    let container = Self::new();
    for (id, entry) in entries {
      container.set(id.as_ref(), entry)?;
    }
    Ok(container)
  }

  // Identifies this container's registrations on the resolution stack.
  fn owner(&self) -> usize {
    Arc::as_ptr(&self.registry) as usize
  }

  pub(crate) fn upgrade(registry: &Weak<Registry>) -> Option<Self> {
    registry.upgrade().map(|registry| Self { registry })
  }

  // --- Registration ---

  /// Stores `entry` under `id`.
  ///
  /// A bare invocable registered under `"id()"` becomes a method and under
  /// `"id++"` a factory; the sigil is stripped before storage. Fails with
  /// [`ContainerError::FrozenService`] when `id` names a singleton that was
  /// already resolved.
  pub fn set(&self, id: &str, entry: impl Into<Entry>) -> Result<()> {
    let (canonical, sigil) = sigil::split(id);
    let definition = match (entry.into(), sigil) {
      (Entry::Value(_), Some(_)) => {
        return Err(ContainerError::NotInvokable { id: id.to_owned() });
      }
      (Entry::Value(value), None) => Definition::Value(value),
      (Entry::Invocable(invocable), Some(Sigil::Method)) | (Entry::Method(invocable), _) => {
        Definition::Method(Arc::new(invocable))
      }
      (Entry::Invocable(invocable), Some(Sigil::Factory)) | (Entry::Factory(invocable), _) => {
        Definition::Factory(Arc::new(invocable))
      }
      (Entry::Invocable(invocable), None) | (Entry::Singleton(invocable), _) => {
        Definition::singleton(invocable)
      }
    };
    self.define(canonical, definition)
  }

  fn define(&self, id: &str, definition: Definition) -> Result<()> {
    let kind = definition.kind();
    match self.registry.insert(id.to_owned(), definition) {
      Ok(replaced) => {
        debug!(id, ?kind, replaced, "registered definition");
        Ok(())
      }
      Err(err) => {
        debug!(id, "refused to override a resolved singleton");
        Err(err)
      }
    }
  }

  pub fn set_value<T: Any + Send + Sync>(&self, id: &str, value: T) -> Result<()> {
    self.set(id, Entry::value(value))
  }

  /// Registers an already shared value.
  pub fn set_shared(&self, id: &str, value: Service) -> Result<()> {
    self.set(id, Entry::Value(value))
  }

  pub fn set_singleton(&self, id: &str, invocable: Invocable) -> Result<()> {
    self.set(id, Entry::Singleton(invocable))
  }

  pub fn set_factory(&self, id: &str, invocable: Invocable) -> Result<()> {
    self.set(id, Entry::Factory(invocable))
  }

  pub fn set_method(&self, id: &str, invocable: Invocable) -> Result<()> {
    self.set(id, Entry::Method(invocable))
  }

  /// Wraps the definition under `id`: every value it produces is passed
  /// through `extension` along with this container.
  ///
  /// The kind is kept, so an extended factory still runs on every request and
  /// an extended singleton still runs once. Fails with
  /// [`ContainerError::UnknownIdentifier`] for unregistered identifiers,
  /// [`ContainerError::NotInvokable`] for plain values and
  /// [`ContainerError::FrozenService`] for a singleton already resolved.
  pub fn extend<F>(&self, id: &str, extension: F) -> Result<()>
  where
    F: Fn(Service, &Container) -> Result<Service> + Send + Sync + 'static,
  {
    let id = sigil::canonical(id);
    self.registry.replace_with(id, |definition| match definition {
      Definition::Value(_) => Err(ContainerError::NotInvokable { id: id.to_owned() }),
      Definition::Singleton { invocable, .. } => Ok(Definition::singleton(Invocable::extended(
        Arc::clone(invocable),
        extension,
      ))),
      Definition::Factory(invocable) => Ok(Definition::Factory(Arc::new(Invocable::extended(
        Arc::clone(invocable),
        extension,
      )))),
      Definition::Method(invocable) => Ok(Definition::Method(Arc::new(Invocable::extended(
        Arc::clone(invocable),
        extension,
      )))),
    })?;
    debug!(id, "extended definition");
    Ok(())
  }

  /// Removes the definition under `id` along with any cached value.
  ///
  /// Returns whether something was removed.
  pub fn unset(&self, id: &str) -> bool {
    let id = sigil::canonical(id);
    let removed = self.registry.remove(id).is_some();
    if removed {
      debug!(id, "removed definition");
    }
    removed
  }

  // --- Resolution ---

  /// Resolves the service registered under `id`.
  ///
  /// Singletons are constructed on first request and cached, factories are
  /// constructed on every request, and methods resolve to a [`BoundMethod`].
  pub fn get(&self, id: &str) -> Result<Service> {
    self
      .try_get(id)?
      .ok_or_else(|| ContainerError::UnknownIdentifier {
        id: sigil::canonical(id).to_owned(),
      })
  }

  /// Like [`get`](Self::get), but `Ok(None)` for unregistered identifiers.
  pub fn try_get(&self, id: &str) -> Result<Option<Service>> {
    let id = sigil::canonical(id);
    match self.registry.checkout(id) {
      // The build guard keeps the definition frozen until resolution ends.
      Some((definition, _building)) => self.resolve(id, &definition).map(Some),
      None => Ok(None),
    }
  }

  /// Resolves `id` and downcasts it to `T`.
  pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
    downcast(sigil::canonical(id), self.get(id)?)
  }

  /// Resolves a method registration into its callable.
  pub fn get_method(&self, id: &str) -> Result<BoundMethod> {
    self.get_as::<BoundMethod>(id).map(|method| (*method).clone())
  }

  fn resolve(&self, id: &str, definition: &Definition) -> Result<Service> {
    match definition {
      Definition::Value(value) => Ok(Arc::clone(value)),
      Definition::Singleton { cell, invocable, .. } => {
        if let Some(value) = cell.get() {
          return Ok(Arc::clone(value));
        }
        let _guard = ResolutionGuard::enter(self.owner(), id)?;
        let value = cell.get_or_try_init(|| {
          trace!(id, "constructing singleton");
          invoker::invoke(self, invocable, &Args::default())
        })?;
        Ok(Arc::clone(value))
      }
      Definition::Factory(invocable) => {
        let _guard = ResolutionGuard::enter(self.owner(), id)?;
        trace!(id, "invoking factory");
        invoker::invoke(self, invocable, &Args::default())
      }
      Definition::Method(invocable) => Ok(service(BoundMethod::new(
        id,
        Arc::clone(invocable),
        Arc::downgrade(&self.registry),
      ))),
    }
  }

  /// Whether something is registered under `id`. Never resolves anything.
  pub fn has(&self, id: &str) -> bool {
    self.registry.contains(sigil::canonical(id))
  }

  /// The definition stored under `id`, without resolving it.
  pub fn raw(&self, id: &str) -> Result<Raw> {
    let id = sigil::canonical(id);
    let definition = self
      .registry
      .lookup(id)
      .ok_or_else(|| ContainerError::UnknownIdentifier { id: id.to_owned() })?;
    Ok(match &*definition {
      Definition::Value(value) => Raw::Value(Arc::clone(value)),
      Definition::Singleton { invocable, .. } => Raw::Singleton(Arc::clone(invocable)),
      Definition::Factory(invocable) => Raw::Factory(Arc::clone(invocable)),
      Definition::Method(invocable) => Raw::Method(Arc::clone(invocable)),
    })
  }

  pub fn kind(&self, id: &str) -> Option<Kind> {
    self
      .registry
      .lookup(sigil::canonical(id))
      .map(|definition| definition.kind())
  }

  /// Whether `id` is a singleton whose value has been constructed.
  pub fn is_resolved(&self, id: &str) -> bool {
    self
      .registry
      .lookup(sigil::canonical(id))
      .is_some_and(|definition| definition.is_resolved())
  }

  pub fn len(&self) -> usize {
    self.registry.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The canonical identifiers currently registered, in no particular order.
  pub fn identifiers(&self) -> Vec<String> {
    self.registry.identifiers()
  }

  // --- Invocation ---

  /// Invokes `invocable`, filling its parameters from `args` and from this
  /// container.
  pub fn call(&self, invocable: &Invocable, args: Args) -> Result<Service> {
    invoker::invoke(self, invocable, &args)
  }

  pub fn call_as<T: Any + Send + Sync>(&self, invocable: &Invocable, args: Args) -> Result<Arc<T>> {
    downcast(invocable.name(), self.call(invocable, args)?)
  }

  // --- Autowiring ---

  /// Populates the injectable fields of `target` from this container.
  ///
  /// Without cloning (the default here), `target` is updated in place and a
  /// copy of it is returned. With `clone_instance(true)` only the returned copy
  /// is populated.
  pub fn autowire<T: Autowire + Clone>(&self, target: &mut T, options: &AutowireOptions) -> Result<T> {
    autowire::wire(self, &T::manifest(), target, options, false)
  }

  /// Resolves every injectable field of `manifest` without populating anything.
  pub fn resolve_fields<T>(&self, manifest: &Manifest<T>, strict: bool) -> Result<ResolvedFields> {
    autowire::resolve_fields(self, manifest, strict)
  }

  // --- Bulk registration ---

  /// Runs each setup callback once against this container.
  ///
  /// Plugin names are only used for diagnostics.
  pub fn register<I, N, F>(&self, plugins: I) -> Result<&Self>
  where
    I: IntoIterator<Item = (N, F)>,
    N: AsRef<str>,
    F: FnOnce(&Container) -> Result<()>,
  {
    for (name, plugin) in plugins {
      debug!(plugin = name.as_ref(), "registering plugin");
      plugin(self)?;
    }
    Ok(self)
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("definitions", &self.registry.len())
      .finish()
  }
}

/// A minimal locator facade: look a service up, or ask whether it exists.
pub trait ServiceLocator {
  fn get(&self, id: &str) -> Result<Service>;
  fn has(&self, id: &str) -> bool;
}

impl ServiceLocator for Container {
  fn get(&self, id: &str) -> Result<Service> {
    Container::get(self, id)
  }

  fn has(&self, id: &str) -> bool {
    Container::has(self, id)
  }
}
