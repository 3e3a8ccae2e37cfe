use fibre_wire::{autowired_object, injectable, AutowireOptions, Container};
use std::sync::Arc;

#[derive(Clone, Default)]
struct Dashboard {
  title: Option<Arc<String>>,
  refresh_seconds: Option<Arc<u64>>,
}

injectable!(Dashboard {
  title: String,
  refresh_seconds: u64,
});

fn main() -> fibre_wire::Result<()> {
  let container = Container::new();

  // The object is built now; its fields are filled in on first request.
  container.set(
    "dashboard",
    autowired_object(AutowireOptions::new().strict(false), Dashboard::default()),
  )?;
  container.set_value("title", "Operations".to_string())?;

  let dashboard = container.get_as::<Dashboard>("dashboard")?;
  println!(
    "title = {:?}, refresh = {:?}",
    dashboard.title.as_deref(),
    dashboard.refresh_seconds.as_deref()
  );

  // Strict autowiring refuses to leave a field unresolved.
  let mut strict = Dashboard::default();
  match container.autowire(&mut strict, &AutowireOptions::new()) {
    Ok(_) => println!("unexpectedly wired every field"),
    Err(err) => println!("strict autowiring failed: {}", err),
  }
  Ok(())
}
