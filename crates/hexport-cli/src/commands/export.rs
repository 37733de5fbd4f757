use anyhow::Result;
use hexport_config::Config;
use hexport_core::{ExportRequest, ExportSummary, export};

use crate::cli::Cli;

pub fn handle(cli: Cli, config: &Config) -> Result<()> {
    let request = ExportRequest {
        source: cli.source,
        output: cli.output,
        logical_name: cli.logical_name,
        chunk_size: cli.chunk_size.unwrap_or(config.chunk_size),
    };

    let summary = export(&request, &config.files, &config.context, &config.fallback)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn print_summary(summary: &ExportSummary) {
    println!("✓ Generated {}", summary.output.display());
    println!(
        "  Source: {} ({} bytes)",
        summary.source.display(),
        summary.size_bytes
    );
    println!("  File name: {} ({})", summary.logical_name, summary.mime_type);
    println!("  Object id: {} ({})", summary.object_id, summary.id_source);
    println!("  Hex chunks: {}", summary.chunks);
}
