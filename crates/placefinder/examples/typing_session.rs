//! Simulated typing against the live Nominatim service
//!
//! This example demonstrates a full autocomplete session:
//! - Typing a query one character at a time (only the final text is searched)
//! - Ranking by a fallback location
//! - Picking the first result
//!
//! Usage: `cargo run --example typing_session -- "Cambridge" you@example.org`

use std::time::Duration;

use placefinder::{Autocomplete, AutocompleteConfigBuilder, geocoding::ClientConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    placefinder::init_logging(tracing::Level::INFO)?;

    let mut args = std::env::args().skip(1);
    let query = args.next().unwrap_or_else(|| "Cambridge".to_string());
    let contact = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("a contact address is required by the provider"))?;

    let client = ClientConfig::new("PlacefinderExample", contact).limit(20);
    let config = AutocompleteConfigBuilder::new()
        // Central London, used because there is no device location here
        .fallback_location(51.5074, -0.1278)?
        .build();
    let mut session = Autocomplete::with_nominatim(client, config)?;
    let mut view = session.subscribe();

    let mut typed = String::new();
    for ch in query.chars() {
        typed.push(ch);
        session.input(typed.clone())?;
        tokio::time::sleep(Duration::from_millis(120)).await;
    }

    let snapshot = view
        .wait_for(|v| v.show_list || v.show_no_results)
        .await?
        .clone();

    if snapshot.show_no_results {
        println!("No locations found for '{query}'");
        return Ok(());
    }

    if snapshot.sorted_by_distance {
        println!("Sorted by distance from you");
    }
    for (i, row) in snapshot.rows.iter().enumerate() {
        println!(
            "  {}. {} [{}] {}",
            i + 1,
            row.label,
            row.badge,
            row.distance.as_deref().unwrap_or("")
        );
    }

    session.select(0)?;
    if let Some(place) = session.next_selection().await {
        println!(
            "\nSelected place {} at ({}, {}): {}",
            place.place_id, place.lat, place.lon, place.display_name
        );
    }

    Ok(())
}
