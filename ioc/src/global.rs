//! The global container instance and access functions.

use crate::container::Container;
use once_cell::sync::Lazy;

// Created on first access, in a thread-safe manner.
static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(Container::default);

/// Provides a reference to the global container instance.
///
/// # Examples
///
/// ```
/// use fibre_wire::global;
///
/// fn register_services() {
///   global()
///     .set_value("greeting", String::from("Hello from global!"))
///     .unwrap();
/// }
/// # register_services();
/// # assert!(global().has("greeting"));
/// ```
pub fn global() -> &'static Container {
  &GLOBAL_CONTAINER
}
