//! Public macros for ergonomic resolution and autowiring manifests.

/// Resolves a service from the global container as an `Arc<T>`.
///
/// # Panics
///
/// Panics if the identifier cannot be resolved or holds another type. For a
/// non-panicking version, use `global().get_as::<T>(id)` directly.
///
/// # Examples
///
/// ```
/// use fibre_wire::{global, resolve};
///
/// global().set_value("resolve_doc", 7_u32).unwrap();
/// let answer = resolve!(u32, "resolve_doc");
/// assert_eq!(*answer, 7);
/// ```
#[macro_export]
macro_rules! resolve {
  ($type:ty, $id:expr) => {
    $crate::resolve_from!($crate::global(), $type, $id)
  };
}

/// Resolves a service from the global container, or `None` on any failure.
#[macro_export]
macro_rules! maybe_resolve {
  ($type:ty, $id:expr) => {
    $crate::global().get_as::<$type>($id).ok()
  };
}

/// Resolves a service from a given container as an `Arc<T>`.
///
/// # Panics
///
/// Panics if the identifier cannot be resolved or holds another type.
///
/// ```
/// use fibre_wire::{resolve_from, Container};
///
/// let container = Container::new();
/// container.set_value("name", "fibre".to_string()).unwrap();
/// assert_eq!(*resolve_from!(container, String, "name"), "fibre");
/// ```
#[macro_export]
macro_rules! resolve_from {
  ($container:expr, $type:ty, $id:expr) => {{
    let id: &str = $id;
    match $container.get_as::<$type>(id) {
      Ok(service) => service,
      Err(err) => panic!(
        "Failed to resolve required service '{}' as {}: {}",
        id,
        std::any::type_name::<$type>(),
        err
      ),
    }
  }};
}

/// Implements [`Autowire`](crate::Autowire) for a struct whose injectable
/// fields are `Option<Arc<T>>`.
///
/// Each listed field is resolved from the container entry named after it. List
/// the field's inner type, not the `Option<Arc<_>>` wrapper.
///
/// ```
/// use fibre_wire::{injectable, AutowireOptions, Container};
/// use std::sync::Arc;
///
/// #[derive(Clone, Default)]
/// struct Report {
///   title: Option<Arc<String>>,
///   pages: Option<Arc<u32>>,
/// }
/// injectable!(Report { title: String, pages: u32 });
///
/// let container = Container::new();
/// container.set_value("title", "Q3".to_string()).unwrap();
///
/// let mut report = Report::default();
/// container
///   .autowire(&mut report, &AutowireOptions::new().strict(false))
///   .unwrap();
/// assert_eq!(report.title.as_deref().map(String::as_str), Some("Q3"));
/// assert!(report.pages.is_none());
/// ```
#[macro_export]
macro_rules! injectable {
  ($target:ident { $($field:ident : $field_type:ty),* $(,)? }) => {
    impl $crate::Autowire for $target {
      fn manifest() -> $crate::Manifest<Self> {
        $crate::Manifest::new()
          $(
            .field::<$field_type, _>(
              stringify!($field),
              |target: &mut Self, value: ::std::sync::Arc<$field_type>| {
                target.$field = ::std::option::Option::Some(value);
              },
            )
          )*
      }
    }
  };
}
