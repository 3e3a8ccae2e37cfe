//! # Fibre Wire
//!
//! A string-keyed, thread-safe Inversion of Control (IoC) container for Rust.
//!
//! Services are registered under plain identifiers, either as ready values or
//! as [`Invocable`]s: bodies that declare the names of the parameters they need.
//! When an invocable runs, every parameter whose name matches a registered
//! identifier is resolved from the container, so services wire themselves
//! together by naming their dependencies.
//!
//! ## Core Concepts
//!
//! - **Singleton**: an invocable run on first request; its result is cached.
//! - **Factory**: an invocable run on every request.
//! - **Method**: resolves to a [`BoundMethod`], a callable mixing call-time
//!   arguments with container entries.
//! - **Sigils**: registering a bare invocable under `"id()"` or `"id++"` picks
//!   a method or a factory. The explicit `set_*` methods do the same without
//!   naming conventions.
//! - **Autowiring**: types publishing a [`Manifest`] of their fields can be
//!   populated from the container, immediately or lazily on first request.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_wire::{Args, Container, Invocable};
//!
//! struct Named {
//!   name: String,
//! }
//!
//! let container = Container::new();
//! container
//!   .set("foo", Invocable::thunk("foo", || Named { name: "world".into() }))
//!   .unwrap();
//!
//! // `bar` asks for `foo` by naming a parameter after it.
//! container
//!   .set(
//!     "bar",
//!     Invocable::builder("bar").param("foo").build(|p| {
//!       let foo = p.get::<Named>("foo")?;
//!       Ok(Named { name: format!("{}{}", foo.name, foo.name) })
//!     }),
//!   )
//!   .unwrap();
//!
//! // `doIt()` registers a method: resolving it yields a callable.
//! container
//!   .set(
//!     "doIt()",
//!     Invocable::builder("doIt").param("count").param("foo").build(|p| {
//!       let count = p.value::<usize>("count")?;
//!       Ok(p.get::<Named>("foo")?.name.repeat(count))
//!     }),
//!   )
//!   .unwrap();
//!
//! assert_eq!(container.get_as::<Named>("bar").unwrap().name, "worldworld");
//! let do_it = container.get_method("doIt").unwrap();
//! assert_eq!(*do_it.call_as::<String>(Args::new().arg(2_usize)).unwrap(), "worldworld");
//! ```

mod autowire;
mod container;
mod core;
mod error;
mod global;
mod invoker;
mod macros;
mod method;
mod registry;
pub mod sigil;

pub use autowire::{autowired_object, Autowire, AutowireOptions, Manifest, ResolvedFields, PRIVATE_PREFIX};
pub use container::{Container, Entry, Plugin, Raw, ServiceLocator};
pub use crate::core::{service, Kind, Service};
pub use error::{ContainerError, Result};
pub use global::global;
pub use invoker::{Args, Invocable, InvocableBuilder, ParameterDescriptor, Params};
pub use method::BoundMethod;
pub use sigil::Sigil;
