use fibre_wire::{Args, Container, Invocable};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self, title: &str) -> String {
    self.logger.log("Starting report generation.");
    let report = format!("Report: {}", title);
    self.logger.log("Finished report generation.");
    report
  }
}

fn main() -> fibre_wire::Result<()> {
  let container = Container::new();

  // Trait objects are stored as `Arc<dyn Trait>` values.
  container.set_value("logger", Arc::new(ConsoleLogger) as Arc<dyn Logger>)?;

  // The service names its dependency through the `logger` parameter.
  container.set(
    "reports",
    Invocable::builder("reports").param("logger").build(|p| {
      Ok(ReportService {
        logger: p.value::<Arc<dyn Logger>>("logger")?,
      })
    }),
  )?;

  // A service method: `title` comes from the caller, `reports` from the container.
  container.set(
    "generate()",
    Invocable::builder("generate")
      .param("title")
      .param("reports")
      .build(|p| {
        let reports = p.get::<ReportService>("reports")?;
        Ok(reports.generate_report(&p.value::<String>("title")?))
      }),
  )?;

  println!("Resolving the service method...");
  let generate = container.get_method("generate")?;
  let report = generate.call_as::<String>(Args::new().arg("Quarterly".to_string()))?;
  println!("{}", report);
  Ok(())
}
