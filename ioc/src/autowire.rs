//! Field autowiring.
//!
//! Rust offers no runtime field enumeration, so every autowirable type
//! publishes a [`Manifest`]: the names of its injectable fields and how to
//! assign each of them. Wiring happens in two phases. All field values are
//! resolved from the container first, then [`Manifest::populate`] assigns them
//! to the instance. A failure in either phase leaves the target untouched.

use crate::container::Container;
use crate::core::{downcast, Service};
use crate::error::{ContainerError, Result};
use crate::invoker::Invocable;

use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Fields whose name starts with this prefix are never injected.
pub const PRIVATE_PREFIX: &str = "_";

type Setter<T> = Box<dyn Fn(&mut T, Service) -> Result<()> + Send + Sync>;

/// A type whose fields can be populated from a [`Container`].
///
/// Usually implemented through the [`injectable!`](crate::injectable) macro.
pub trait Autowire: Sized + Send + Sync + 'static {
  fn manifest() -> Manifest<Self>;
}

struct Field<T> {
  name: String,
  setter: Setter<T>,
}

/// The injectable fields of `T`, in declaration order.
pub struct Manifest<T> {
  fields: Vec<Field<T>>,
}

impl<T> Default for Manifest<T> {
  fn default() -> Self {
    Self { fields: Vec::new() }
  }
}

impl<T> Manifest<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Declares a field resolved from the container entry called `name`.
  ///
  /// The resolved service must be a `V`; otherwise population fails with
  /// [`ContainerError::TypeMismatch`].
  pub fn field<V, F>(self, name: &str, setter: F) -> Self
  where
    V: Any + Send + Sync,
    F: Fn(&mut T, Arc<V>) + Send + Sync + 'static,
  {
    let id = name.to_owned();
    self.field_service(name, move |target, service| {
      setter(target, downcast::<V>(&id, service)?);
      Ok(())
    })
  }

  /// Declares a field receiving the raw [`Service`].
  pub fn field_service<F>(mut self, name: &str, setter: F) -> Self
  where
    F: Fn(&mut T, Service) -> Result<()> + Send + Sync + 'static,
  {
    self.fields.push(Field {
      name: name.to_owned(),
      setter: Box::new(setter),
    });
    self
  }

  /// Every declared field name, private ones included.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.fields.iter().map(|f| f.name.as_str())
  }

  /// The field names eligible for injection.
  pub fn injectable(&self) -> impl Iterator<Item = &str> {
    self.names().filter(|name| !name.starts_with(PRIVATE_PREFIX))
  }

  /// Assigns the resolved `fields` to `instance`.
  ///
  /// Fields absent from `fields` keep their current value.
  pub fn populate(&self, mut instance: T, fields: ResolvedFields) -> Result<T> {
    for (name, value) in fields.values {
      if let Some(field) = self.fields.iter().find(|f| f.name == name) {
        (field.setter)(&mut instance, value)?;
      }
    }
    Ok(instance)
  }
}

impl<T> fmt::Debug for Manifest<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.names()).finish()
  }
}

/// Field values resolved ahead of population.
#[derive(Default, Clone)]
pub struct ResolvedFields {
  values: Vec<(String, Service)>,
}

impl ResolvedFields {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: impl Into<String>, value: Service) {
    self.values.push((name.into(), value));
  }

  pub fn contains(&self, name: &str) -> bool {
    self.values.iter().any(|(n, _)| n == name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.values.iter().map(|(n, _)| n.as_str())
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

impl fmt::Debug for ResolvedFields {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.names()).finish()
  }
}

/// How an object gets autowired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AutowireOptions {
  /// Fail with [`ContainerError::UnknownIdentifier`] when a field has no
  /// matching entry. When `false` such fields are skipped.
  pub strict: bool,
  /// Work on a copy of the target instead of the target itself. `None` picks
  /// the entry point's default: `false` for [`Container::autowire`], `true`
  /// for [`autowired_object`].
  pub clone: Option<bool>,
}

impl Default for AutowireOptions {
  fn default() -> Self {
    Self {
      strict: true,
      clone: None,
    }
  }
}

impl AutowireOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn strict(mut self, strict: bool) -> Self {
    self.strict = strict;
    self
  }

  pub fn clone_instance(mut self, clone: bool) -> Self {
    self.clone = Some(clone);
    self
  }

  fn clone_or(&self, default: bool) -> bool {
    self.clone.unwrap_or(default)
  }
}

/// Phase one: resolve every injectable field of `manifest` by name.
pub(crate) fn resolve_fields<T>(
  container: &Container,
  manifest: &Manifest<T>,
  strict: bool,
) -> Result<ResolvedFields> {
  let mut fields = ResolvedFields::new();
  for name in manifest.injectable() {
    match container.try_get(name)? {
      Some(value) => fields.insert(name, value),
      None if strict => {
        return Err(ContainerError::UnknownIdentifier {
          id: name.to_owned(),
        })
      }
      None => trace!(field = name, "no entry for field, leaving it untouched"),
    }
  }
  Ok(fields)
}

/// Resolves and populates `target`, writing the result back unless cloning.
pub(crate) fn wire<T: Clone>(
  container: &Container,
  manifest: &Manifest<T>,
  target: &mut T,
  options: &AutowireOptions,
  clone_by_default: bool,
) -> Result<T> {
  let fields = resolve_fields(container, manifest, options.strict)?;
  apply(manifest, target, fields, options.clone_or(clone_by_default))
}

// Phase two. `target` is only overwritten once population has succeeded.
fn apply<T: Clone>(
  manifest: &Manifest<T>,
  target: &mut T,
  fields: ResolvedFields,
  clone: bool,
) -> Result<T> {
  let populated = manifest.populate(target.clone(), fields)?;
  if !clone {
    *target = populated.clone();
  }
  Ok(populated)
}

/// A lazy definition autowiring `object` when it is first requested.
///
/// The object itself is built eagerly; its fields are only resolved once the
/// identifier it is registered under gets resolved. By default each resolution
/// works on a copy of `object`; with `clone_instance(false)` the held object is
/// updated in place and a copy of it is returned.
///
/// ```
/// use fibre_wire::{autowired_object, injectable, AutowireOptions, Container};
/// use std::sync::Arc;
///
/// #[derive(Clone, Default)]
/// struct Greeter {
///   greeting: Option<Arc<String>>,
/// }
/// injectable!(Greeter { greeting: String });
///
/// let container = Container::new();
/// container
///   .set("greeter", autowired_object(AutowireOptions::new(), Greeter::default()))
///   .unwrap();
/// container.set_value("greeting", "hi".to_string()).unwrap();
///
/// let greeter = container.get_as::<Greeter>("greeter").unwrap();
/// assert_eq!(greeter.greeting.as_deref().map(String::as_str), Some("hi"));
/// ```
pub fn autowired_object<T: Autowire + Clone>(options: AutowireOptions, object: T) -> Invocable {
  let manifest = T::manifest();
  let prototype = Mutex::new(object);
  Invocable::builder(format!("autowired<{}>", std::any::type_name::<T>())).build(move |params| {
    let fields = resolve_fields(params.container(), &manifest, options.strict)?;
    let mut prototype = prototype.lock();
    apply(&manifest, &mut prototype, fields, options.clone_or(true))
  })
}
