use docparse_core::{compiled_in, CapabilityRegistry, FormatKind};

pub fn run(registry: &CapabilityRegistry) -> Result<(), Box<dyn std::error::Error>> {
    println!("Backends:");
    for (backend, available) in registry.report() {
        let status = if available {
            "available"
        } else if compiled_in(backend) {
            "disabled"
        } else {
            "not built"
        };

        let extensions: Vec<String> = FormatKind::SUPPORTED
            .into_iter()
            .filter(|kind| kind.required_backend() == Some(backend))
            .flat_map(|kind| kind.extensions().map(|ext| format!(".{}", ext)).collect::<Vec<_>>())
            .collect();

        println!(
            "  {:<12} {:<10} {} ({})",
            backend.as_str(),
            status,
            backend.description(),
            extensions.join(", ")
        );
    }

    Ok(())
}
