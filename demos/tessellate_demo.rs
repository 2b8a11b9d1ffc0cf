//! Complete workflow demonstration for sphere_tessellator
//!
//! Run with `RUST_LOG=sphere_tessellator=debug` to see pipeline events.

use serde_json::json;
use sphere_tessellator::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== sphere_tessellator Demo ===\n");

    // Step 1: Configure
    println!("Step 1: Configuring tessellator...");
    let config = TessellatorConfigBuilder::new()
        .seed(12345)
        .progress_batch(2_000)?
        .build()?;
    println!("  Seed: {}", config.seed);
    println!("  Representative: {:?}", config.representative);

    // Two regions sharing a border along the prime meridian
    let collection = FeatureCollection::new(vec![
        Feature::polygon(
            &[[-180.0, -10.0], [0.0, -10.0], [0.0, 10.0], [-180.0, 10.0], [-180.0, -10.0]],
            json!({ "name": "west" }),
        ),
        Feature::polygon(
            &[[0.0, -10.0], [180.0, -10.0], [180.0, 10.0], [0.0, 10.0], [0.0, -10.0]],
            json!({ "name": "east" }),
        ),
    ]);

    // Step 2: Tessellate with progress
    println!("\nStep 2: Tessellating...");
    let mut tessellator = Tessellator::new(config);
    let mut report = |fraction: f64| println!("  progress {:>5.1}%", fraction * 100.0);
    let result =
        tessellator.tessellate_with_progress(&collection, 10_000, SampleMode::Spiral, &mut report)?;

    // Step 3: Summarize records
    println!("\nStep 3: Records:");
    for record in result.records() {
        let label = match &record.kind {
            RecordKind::Region { properties, .. } => properties["name"].to_string(),
            RecordKind::Background => "background".to_string(),
        };
        let pct = record.triangles.len() as f64 / result.triangle_count() as f64 * 100.0;
        println!("  {}: {} triangles ({:.1}%)", label, record.triangles.len(), pct);
    }

    // Step 4: Worker round trip
    println!("\nStep 4: Worker protocol...");
    let request = json!({
        "mapData": { "type": "FeatureCollection", "features": [] },
        "complexity": 100,
        "interpolation": "random"
    })
    .to_string();
    let mut messages = 0;
    handle_message(&mut tessellator, &request, |_message| messages += 1)?;
    println!("  Posted {} messages", messages);

    let json = result.to_json()?;
    println!("\n  GeoJSON size: {:.2} MB", json.len() as f64 / 1024.0 / 1024.0);

    println!("\n=== Demo Complete ===");
    Ok(())
}
