//! Tests for the resolution macros against the global container and local
//! `Container` instances.
//!
//! The global container is shared by every test in this binary, so each test
//! uses identifiers of its own.

use fibre_wire::{
  global, injectable, maybe_resolve, resolve, resolve_from, AutowireOptions, Autowire, Container,
  Invocable,
};
use std::sync::Arc;

struct MacroTestService {
  value: i32,
}

#[test]
fn test_resolve_global() {
  global()
    .set(
      "macro_service",
      Invocable::thunk("macro_service", || MacroTestService { value: 42 }),
    )
    .unwrap();

  let first = resolve!(MacroTestService, "macro_service");
  let second = resolve!(MacroTestService, "macro_service()");

  assert_eq!(first.value, 42);
  assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_maybe_resolve_global() {
  global().set_value("macro_maybe", 7_u64).unwrap();

  assert_eq!(maybe_resolve!(u64, "macro_maybe").map(|v| *v), Some(7));
  assert!(maybe_resolve!(u64, "macro_absent").is_none());
  // Wrong type is reported as absent as well.
  assert!(maybe_resolve!(String, "macro_maybe").is_none());
}

#[test]
#[should_panic(expected = "Failed to resolve required service 'macro_missing'")]
fn test_resolve_panics_on_missing_service() {
  resolve!(MacroTestService, "macro_missing");
}

#[test]
fn test_resolve_from_local_container() {
  let container = Container::new();
  container.set_value("local", "only here".to_string()).unwrap();

  assert_eq!(*resolve_from!(container, String, "local"), "only here");
  assert!(!global().has("local"));
}

#[test]
#[should_panic(expected = "is not of the expected type")]
fn test_resolve_from_panics_on_type_mismatch() {
  let container = Container::new();
  container.set_value("number", 1_u8).unwrap();
  resolve_from!(container, String, "number");
}

#[derive(Clone, Default)]
struct Wired {
  first: Option<Arc<String>>,
  second: Option<Arc<u32>>,
  _internal: Option<Arc<String>>,
}

injectable!(Wired {
  first: String,
  second: u32,
  _internal: String,
});

#[test]
fn test_injectable_builds_manifest_in_declaration_order() {
  let manifest = Wired::manifest();

  assert_eq!(
    manifest.names().collect::<Vec<_>>(),
    vec!["first", "second", "_internal"]
  );
  assert_eq!(
    manifest.injectable().collect::<Vec<_>>(),
    vec!["first", "second"]
  );
}

#[test]
fn test_injectable_populates_option_arc_fields() {
  let container = Container::new();
  container.set_value("first", "one".to_string()).unwrap();
  container.set_value("second", 2_u32).unwrap();

  let mut wired = Wired::default();
  container.autowire(&mut wired, &AutowireOptions::new()).unwrap();

  assert_eq!(wired.first.as_deref().map(String::as_str), Some("one"));
  assert_eq!(wired.second.as_deref().copied(), Some(2));
  assert!(wired._internal.is_none());
}
