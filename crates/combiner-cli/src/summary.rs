use console::Style;
use combiner_core::metadata::MetadataOutcome;
use combiner_core::pipeline::config::CompositeConfig;
use combiner_core::pipeline::CompositeRunResult;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    failed: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            failed: Style::new().red().bold(),
        }
    }
}

pub fn print_config_summary(config: &CompositeConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Photo Combiner"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(14)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Images"),
        s.value.apply_to(config.inputs.len())
    );
    let mut output = config.output.directory.clone();
    if let Some(ref sub) = config.output.subfolder {
        output.push(sub);
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Format"),
        s.value.apply_to(format!(
            "{} (quality {})",
            config.output.format, config.output.quality
        ))
    );
    let operations: Vec<String> = config.operations.iter().map(|op| op.to_string()).collect();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Operations"),
        s.method.apply_to(operations.join(", "))
    );
    if config.copy_metadata && config.output.format.supports_metadata() {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Metadata"),
            s.method.apply_to("copy from first image")
        );
    } else {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Metadata"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();
}

pub fn print_run_summary(result: &CompositeRunResult) {
    let s = Styles::new();

    println!();
    if !result.dropped_sources.is_empty() {
        println!("  {}", s.header.apply_to("Skipped images"));
        for dropped in &result.dropped_sources {
            println!(
                "    {} {}",
                s.path.apply_to(&dropped.name),
                s.disabled.apply_to(&dropped.reason)
            );
        }
        println!();
    }

    println!("  {}", s.header.apply_to("Results"));
    for saved in &result.succeeded {
        let metadata = match &saved.metadata {
            MetadataOutcome::Copied { tags } => s.label.apply_to(format!("{tags} tag(s) copied")),
            MetadataOutcome::Skipped => s.label.apply_to("no metadata".to_string()),
            MetadataOutcome::Failed { reason } => {
                s.disabled.apply_to(format!("metadata not copied: {reason}"))
            }
        };
        println!(
            "    {:<10}{}  {}",
            s.method.apply_to(saved.operation),
            s.path.apply_to(&saved.resource),
            metadata
        );
    }
    for failed in &result.failed {
        println!(
            "    {:<10}{}",
            s.failed.apply_to(failed.operation),
            s.failed.apply_to(&failed.reason)
        );
    }
    println!();
}
