use fibre_wire::{Container, Invocable};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn tracker() -> RequestTracker {
  RequestTracker {
    id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
  }
}

fn main() -> fibre_wire::Result<()> {
  let container = Container::new();

  // --- Singleton Registration ---
  // This invocable will only be called ONCE.
  container.set(
    "singleton_tracker",
    Invocable::thunk("singleton_tracker", || {
      println!("Creating SINGLETON RequestTracker...");
      tracker()
    }),
  )?;

  // --- Factory Registration ---
  // The `++` sigil makes it run EVERY time the service is resolved.
  container.set(
    "factory_tracker++",
    Invocable::thunk("factory_tracker", || {
      println!("Creating FACTORY RequestTracker...");
      tracker()
    }),
  )?;

  println!("--- Resolving Singletons ---");
  let s1 = container.get_as::<RequestTracker>("singleton_tracker")?;
  let s2 = container.get_as::<RequestTracker>("singleton_tracker")?;
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert!(Arc::ptr_eq(&s1, &s2), "Singleton instances should be identical");

  println!("--- Resolving Factories ---");
  let f1 = container.get_as::<RequestTracker>("factory_tracker")?;
  let f2 = container.get_as::<RequestTracker>("factory_tracker")?;
  println!("Factory 1 ID: {}, Factory 2 ID: {}", f1.id, f2.id);
  assert!(!Arc::ptr_eq(&f1, &f2), "Factory instances should be different");

  // A resolved singleton is frozen.
  let err = container
    .set_value("singleton_tracker", RequestTracker { id: 99 })
    .unwrap_err();
  println!("Overwriting a resolved singleton: {}", err);
  Ok(())
}
