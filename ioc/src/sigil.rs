//! Trailing identifier sigils that select a definition kind by convention.
//!
//! `"name()"` registers a service method and `"name++"` a factory. The sigil is
//! stripped before storage, and lookups strip it too, so every spelling of an
//! identifier addresses the same entry.

/// A recognized trailing sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sigil {
  /// `()`: the entry resolves to a callable instead of a value.
  Method,
  /// `++`: the entry is re-evaluated on every request.
  Factory,
}

impl Sigil {
  pub fn suffix(self) -> &'static str {
    match self {
      Sigil::Method => "()",
      Sigil::Factory => "++",
    }
  }
}

/// Splits `id` into its canonical form and the sigil it carried, if any.
///
/// Identifiers of two bytes or fewer never carry a sigil, so `"()"` and `"++"`
/// are ordinary identifiers.
pub fn split(id: &str) -> (&str, Option<Sigil>) {
  if id.len() <= 2 {
    return (id, None);
  }
  for sigil in [Sigil::Method, Sigil::Factory] {
    if let Some(stripped) = id.strip_suffix(sigil.suffix()) {
      return (stripped, Some(sigil));
    }
  }
  (id, None)
}

/// Returns `id` without its trailing sigil.
pub fn canonical(id: &str) -> &str {
  split(id).0
}
