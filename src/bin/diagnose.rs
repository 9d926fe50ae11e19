#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use activity_board::api::{ActivitiesClient, ActivityApi};
    use activity_board::config::BoardConfig;
    use std::path::Path;

    println!("🔍 Activity Board - Diagnostics Tool");
    println!("====================================");
    println!();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let config = if Path::new(&config_path).exists() {
        BoardConfig::load(&config_path)?
    } else {
        println!("ℹ️  {} not found, using defaults", config_path);
        BoardConfig::default()
    };

    println!("🌐 Server: {}", config.server.base_url);
    println!("⏱️  Message hide delay: {} ms", config.message.hide_after_ms);
    println!();

    let client = ActivitiesClient::new(&config.server.base_url)?;

    println!("Test 1: Fetching {} ...", client.activities_url()?);
    let catalog = match client.list_activities().await {
        Ok(catalog) => {
            println!("✅ Server reachable, {} activities", catalog.len());
            catalog
        }
        Err(e) => {
            println!("❌ Could not load activities");
            println!("   Error: {}", e);
            return Ok(());
        }
    };
    if catalog.is_empty() {
        println!("⚠️  The server offers no activities");
    }
    println!();

    println!("Test 2: Checking rosters...");
    let mut over_capacity = 0;
    for (name, activity) in catalog.iter() {
        let spots = activity.spots_left();
        let marker = if spots < 0 {
            over_capacity += 1;
            "⚠️ "
        } else {
            "  "
        };
        println!(
            "{} {}: {}/{} participants, {} spots left ({})",
            marker,
            name,
            activity.participants.len(),
            activity.max_participants,
            spots,
            activity.schedule
        );

        let mut seen = std::collections::HashSet::new();
        for email in &activity.participants {
            if !seen.insert(email.as_str()) {
                println!("     ⚠️  duplicate participant {}", email);
            }
        }
    }
    println!();

    if over_capacity == 0 {
        println!("✅ No activity is over capacity");
    } else {
        println!(
            "❌ {} activities have more participants than spots",
            over_capacity
        );
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
