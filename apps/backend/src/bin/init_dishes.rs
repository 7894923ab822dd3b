use anyhow::{Context, Result};
use dish_backend::config::{load_env_files, SeedConfig, ServerConfig};
use dish_backend::db::Db;
use dish_backend::models::domain::NewDish;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env files for database URLs
    load_env_files(Path::new("."));

    env_logger::init();

    let reset = std::env::args().any(|arg| arg == "--reset");

    println!("🚀 Initializing dish catalog...\n");

    let server_config = ServerConfig::from_env().context("Invalid server configuration")?;
    let seed_config = SeedConfig::load().context("Failed to load config.toml")?;

    // Connecting runs the migrations, so the table exists after this
    let db = Db::connect(&server_config.database_url, server_config.max_connections)
        .await
        .context("Failed to connect to database")?;
    log::info!("✅ Connected to database");

    if reset {
        println!("🧹 Removing existing dishes...");
        db.reset_dishes().await.context("Failed to reset dishes")?;
    }

    let existing = db.count_dishes().await.context("Failed to count dishes")?;
    if existing > 0 {
        println!("⊙ {} dishes already present, skipping seed (use --reset to reseed)", existing);
        return Ok(());
    }

    println!("🍽️  Inserting sample dishes...");
    for seed in &seed_config.dishes {
        let dish = db
            .create_dish(
                NewDish::new(seed.name.clone(), seed.image_url.clone())
                    .published(seed.is_published),
            )
            .await
            .with_context(|| format!("Failed to insert dish {}", seed.name))?;
        println!(
            "  ✓ {} {} ({})",
            dish.id,
            dish.name,
            if dish.is_published { "published" } else { "unpublished" }
        );
    }

    let count = db.count_dishes().await.context("Failed to count dishes")?;
    println!("\n✨ {} dishes inserted successfully", count);

    Ok(())
}
