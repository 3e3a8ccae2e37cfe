//! Parameter-name injection.
//!
//! An [`Invocable`] carries an explicit list of [`ParameterDescriptor`]s next to
//! its body. When it is called, each parameter is resolved from, in order:
//!
//! 1. a positional argument at the parameter's position,
//! 2. a container entry with the parameter's name,
//! 3. a keyed argument with the parameter's name,
//! 4. the parameter's declared default.
//!
//! Every parameter is resolved before the body runs.

use crate::container::Container;
use crate::core::{downcast, service, Service};
use crate::error::{ContainerError, Result};

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

type Body = Box<dyn Fn(&Params<'_>) -> Result<Service> + Send + Sync>;

/// One declared parameter of an [`Invocable`].
#[derive(Clone)]
pub struct ParameterDescriptor {
  name: String,
  position: usize,
  default: Option<Service>,
}

impl ParameterDescriptor {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn position(&self) -> usize {
    self.position
  }

  pub fn has_default(&self) -> bool {
    self.default.is_some()
  }

  pub fn default_value(&self) -> Option<&Service> {
    self.default.as_ref()
  }
}

impl fmt::Debug for ParameterDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ParameterDescriptor")
      .field("name", &self.name)
      .field("position", &self.position)
      .field("has_default", &self.has_default())
      .finish()
  }
}

/// A callable body together with the names of the parameters it expects.
pub struct Invocable {
  name: String,
  parameters: Vec<ParameterDescriptor>,
  body: Body,
}

impl Invocable {
  /// Starts describing an invocable called `name`.
  ///
  /// The name only shows up in error messages.
  pub fn builder(name: impl Into<String>) -> InvocableBuilder {
    InvocableBuilder {
      name: name.into(),
      parameters: Vec::new(),
    }
  }

  /// An invocable without parameters.
  pub fn thunk<T, F>(name: impl Into<String>, body: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    Self::builder(name).build(move |_| Ok(body()))
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn parameters(&self) -> &[ParameterDescriptor] {
    &self.parameters
  }

  /// Wraps `inner`, passing each of its results through `extension`.
  ///
  /// Parameters are declared and resolved exactly as for `inner`.
  pub(crate) fn extended<F>(inner: Arc<Invocable>, extension: F) -> Self
  where
    F: Fn(Service, &Container) -> Result<Service> + Send + Sync + 'static,
  {
    Invocable {
      name: inner.name.clone(),
      parameters: inner.parameters.clone(),
      body: Box::new(move |params| {
        let produced = (inner.body)(params)?;
        extension(produced, params.container())
      }),
    }
  }
}

impl fmt::Debug for Invocable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Invocable")
      .field("name", &self.name)
      .field("parameters", &self.parameters)
      .finish_non_exhaustive()
  }
}

/// Declares the parameters of an [`Invocable`] before attaching its body.
///
/// ```
/// use fibre_wire::{Container, Invocable};
///
/// let greet = Invocable::builder("greet")
///   .param("name")
///   .param_or("punctuation", "!".to_string())
///   .build(|p| {
///     let name = p.get::<String>("name")?;
///     let punctuation = p.get::<String>("punctuation")?;
///     Ok(format!("Hello, {}{}", name, punctuation))
///   });
///
/// let container = Container::new();
/// container.set_value("name", "World".to_string()).unwrap();
/// let greeting = container.call_as::<String>(&greet, Default::default()).unwrap();
/// assert_eq!(*greeting, "Hello, World!");
/// ```
#[derive(Debug)]
pub struct InvocableBuilder {
  name: String,
  parameters: Vec<ParameterDescriptor>,
}

impl InvocableBuilder {
  /// Declares a required parameter.
  pub fn param(self, name: impl Into<String>) -> Self {
    self.push(name.into(), None)
  }

  /// Declares a parameter falling back to `default` when nothing else supplies it.
  pub fn param_or<T: Any + Send + Sync>(self, name: impl Into<String>, default: T) -> Self {
    self.push(name.into(), Some(service(default)))
  }

  /// Like [`param_or`](Self::param_or) with an already shared default.
  pub fn param_or_service(self, name: impl Into<String>, default: Service) -> Self {
    self.push(name.into(), Some(default))
  }

  fn push(mut self, name: String, default: Option<Service>) -> Self {
    let position = self.parameters.len();
    self.parameters.push(ParameterDescriptor {
      name,
      position,
      default,
    });
    self
  }

  /// Attaches a body producing a concrete value.
  pub fn build<T, F>(self, body: F) -> Invocable
  where
    T: Any + Send + Sync,
    F: Fn(&Params<'_>) -> Result<T> + Send + Sync + 'static,
  {
    self.build_service(move |params| body(params).map(service))
  }

  /// Attaches a body producing an already type-erased [`Service`].
  pub fn build_service<F>(self, body: F) -> Invocable
  where
    F: Fn(&Params<'_>) -> Result<Service> + Send + Sync + 'static,
  {
    Invocable {
      name: self.name,
      parameters: self.parameters,
      body: Box::new(body),
    }
  }
}

/// Call-time arguments: positional (by parameter position) and keyed (by name).
#[derive(Clone, Default)]
pub struct Args {
  positional: BTreeMap<usize, Service>,
  keyed: HashMap<String, Service>,
}

impl Args {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends a positional argument after the highest position used so far.
  pub fn arg<T: Any + Send + Sync>(self, value: T) -> Self {
    self.arg_service(service(value))
  }

  pub fn arg_service(self, value: Service) -> Self {
    let next = self
      .positional
      .keys()
      .next_back()
      .map_or(0, |last| last + 1);
    self.at_service(next, value)
  }

  /// Places a positional argument at `position`.
  pub fn at<T: Any + Send + Sync>(self, position: usize, value: T) -> Self {
    self.at_service(position, service(value))
  }

  pub fn at_service(mut self, position: usize, value: Service) -> Self {
    self.positional.insert(position, value);
    self
  }

  /// Adds an argument matched against the parameter called `name`.
  pub fn named<T: Any + Send + Sync>(self, name: impl Into<String>, value: T) -> Self {
    self.named_service(name, service(value))
  }

  pub fn named_service(mut self, name: impl Into<String>, value: Service) -> Self {
    self.keyed.insert(name.into(), value);
    self
  }

  pub fn is_empty(&self) -> bool {
    self.positional.is_empty() && self.keyed.is_empty()
  }
}

impl fmt::Debug for Args {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Args")
      .field("positions", &self.positional.keys().collect::<Vec<_>>())
      .field("names", &self.keyed.keys().collect::<Vec<_>>())
      .finish()
  }
}

/// The resolved arguments handed to an invocable body.
pub struct Params<'a> {
  container: &'a Container,
  callable: &'a str,
  parameters: &'a [ParameterDescriptor],
  values: Vec<Service>,
}

impl<'a> Params<'a> {
  /// The container the invocation runs against.
  pub fn container(&self) -> &'a Container {
    self.container
  }

  /// The raw value of the parameter called `name`.
  pub fn service(&self, name: &str) -> Result<&Service> {
    self
      .parameters
      .iter()
      .position(|p| p.name == name)
      .map(|index| &self.values[index])
      .ok_or_else(|| ContainerError::MissingParameter {
        callable: self.callable.to_owned(),
        parameter: name.to_owned(),
      })
  }

  /// The parameter called `name`, downcast to `T`.
  pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    let value = Arc::clone(self.service(name)?);
    downcast(name, value)
  }

  /// A copy of the parameter called `name`.
  pub fn value<T: Any + Send + Sync + Clone>(&self, name: &str) -> Result<T> {
    self.get::<T>(name).map(|v| (*v).clone())
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

/// Resolves every parameter of `invocable`, then runs its body.
pub(crate) fn invoke(container: &Container, invocable: &Invocable, args: &Args) -> Result<Service> {
  let mut values = Vec::with_capacity(invocable.parameters.len());
  for parameter in &invocable.parameters {
    values.push(resolve_parameter(container, invocable, parameter, args)?);
  }
  let params = Params {
    container,
    callable: &invocable.name,
    parameters: &invocable.parameters,
    values,
  };
  (invocable.body)(&params)
}

fn resolve_parameter(
  container: &Container,
  invocable: &Invocable,
  parameter: &ParameterDescriptor,
  args: &Args,
) -> Result<Service> {
  if let Some(value) = args.positional.get(&parameter.position) {
    trace!(callable = %invocable.name, parameter = %parameter.name, "positional argument");
    return Ok(Arc::clone(value));
  }
  if let Some(value) = container.try_get(&parameter.name)? {
    trace!(callable = %invocable.name, parameter = %parameter.name, "container entry");
    return Ok(value);
  }
  if let Some(value) = args.keyed.get(&parameter.name) {
    trace!(callable = %invocable.name, parameter = %parameter.name, "keyed argument");
    return Ok(Arc::clone(value));
  }
  if let Some(value) = &parameter.default {
    trace!(callable = %invocable.name, parameter = %parameter.name, "default value");
    return Ok(Arc::clone(value));
  }
  Err(ContainerError::MissingParameter {
    callable: invocable.name.clone(),
    parameter: parameter.name.clone(),
  })
}
