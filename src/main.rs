use anyhow::Context;
use housing_scout::filters::{apply, KeywordFilter, Merge, RangeFilter, StopProximityFilter};
use housing_scout::models::{district_by_number, Coordinates, Stop};
use housing_scout::scrapers::ScraperTrait;
use housing_scout::{Query, RoomBucket, ScraperConfig, WillhabenScraper};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🏠 Housing Scout - willhaben rentals");

    let config = ScraperConfig::from_env().context("Failed to load configuration")?;
    let districts = [6, 7, 15]
        .into_iter()
        .map(district_by_number)
        .collect::<Result<Vec<_>, _>>()?;
    let query = Query::new()
        .with_price(Some(500), Some(1500))
        .with_area(Some(40), None)
        .with_rooms(RoomBucket::Two)
        .with_districts(districts);

    let scraper =
        WillhabenScraper::with_config(config, query).context("Failed to create scraper")?;
    let apartments = scraper
        .scrape()
        .await
        .context("Failed to retrieve listings")?;
    info!(source = scraper.source_name(), apartments = apartments.len(), "Retrieved listings");

    let stops = vec![
        Stop::new("Westbahnhof", Coordinates::new(16.3378, 48.1966)),
        Stop::new("Neubaugasse", Coordinates::new(16.3524, 48.1990)),
        Stop::new("Volkstheater", Coordinates::new(16.3589, 48.2052)),
    ];
    let filter = Merge::new()
        .with(RangeFilter::rooms(2, 0))
        .with(RangeFilter::price(0.0, 1400.0))
        .with(KeywordFilter::new(["balkon", "altbau", "terrasse"]))
        .with(StopProximityFilter::new(stops, 600.0));

    let matches = apply(&apartments, &filter);
    info!("\n✅ {} of {} apartments match\n", matches.len(), apartments.len());

    for (i, apartment) in matches.iter().enumerate() {
        println!("{}. {} ({:.0} €)", i + 1, apartment.title, apartment.price);
        println!("   {} Zimmer, {} m²", apartment.rooms, apartment.area);
        if let Some(district) = &apartment.district {
            println!("   Bezirk: {} ({})", district.name, district.number);
        }
        println!("   URL: {}", apartment.url);
        println!();
    }

    let json = serde_json::to_string_pretty(&matches)?;
    tokio::fs::write("scraped_apartments.json", json).await?;
    info!("💾 Saved matches to scraped_apartments.json");

    Ok(())
}
