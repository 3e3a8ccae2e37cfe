use thiserror::Error;

/// Errors raised while registering or resolving services.
///
/// All of them describe a misconfigured container rather than a transient
/// condition, so the container never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
  /// Nothing is registered under the (canonicalized) identifier.
  #[error("Identifier '{id}' is not defined")]
  UnknownIdentifier { id: String },

  /// A method or factory sigil was attached to a value that cannot be invoked.
  #[error("Identifier '{id}' requires an invocable definition, but a plain value was given")]
  NotInvokable { id: String },

  /// A declared parameter could not be satisfied from any source.
  #[error("Unable to invoke '{callable}': parameter '{parameter}' could not be resolved")]
  MissingParameter { callable: String, parameter: String },

  /// The singleton was already constructed and handed out.
  #[error("Cannot override frozen service '{id}'")]
  FrozenService { id: String },

  /// Resolving an identifier re-entered its own resolution.
  #[error("Circular dependency detected: {chain}")]
  CyclicDependency { chain: String },

  /// A resolved value was not of the type the caller asked for.
  #[error("Service '{id}' is not of the expected type `{expected}`")]
  TypeMismatch { id: String, expected: &'static str },

  /// A method handle outlived the container it was resolved from.
  #[error("Method '{id}' belongs to a container that was dropped")]
  ContainerDropped { id: String },
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = ContainerError> = std::result::Result<T, E>;
