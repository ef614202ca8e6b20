use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::time::sleep;

use card_dungeon::config::log_filter;
use card_dungeon::{
    event_channel, parse_legacy, AppError, EventReceiver, FightOutcome, GameConfig,
    PlayerInventory, SaveStore, World,
};

/// Runs dungeon fights from a legacy card catalog.
#[derive(Debug, Parser)]
#[command(name = "card_dungeon", version)]
struct Args {
    /// Semicolon-delimited catalog file.
    catalog: PathBuf,

    /// Dungeon to fight. Without it every dungeon is fought in order until the first loss.
    #[arg(long)]
    dungeon: Option<String>,

    /// 0 to 10; overrides CARD_DUNGEON_DIFFICULTY.
    #[arg(long)]
    difficulty: Option<u8>,

    /// Milliseconds the renderer spends on each event.
    #[arg(long)]
    pace_ms: Option<u64>,

    #[arg(long, default_value_t = 1)]
    world_id: u32,

    /// Write the world and the player save under the data directory.
    #[arg(long)]
    save: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = GameConfig::from_env();
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(pace) = args.pace_ms {
        config.event_pace_ms = pace;
    }

    let text = std::fs::read_to_string(&args.catalog)
        .map_err(|e| AppError::from_io(&args.catalog, e))?;
    let import = parse_legacy(&text)?;
    let template_name = args
        .catalog
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("world");
    let world = World::from_legacy(args.world_id, template_name, &import)?;
    let mut inventory = PlayerInventory::from_legacy(&world, &import, template_name, config.difficulty)?;
    tracing::info!("🎮 {}", inventory);

    let dungeons: Vec<String> = match &args.dungeon {
        Some(name) => vec![name.clone()],
        None => world
            .dungeons()
            .iter()
            .map(|dungeon| dungeon.name().to_string())
            .collect(),
    };

    for name in dungeons {
        let (emitter, receiver) = event_channel();
        let (report, ()) = tokio::join!(
            inventory.fight(&world, &name, emitter),
            render(receiver, Duration::from_millis(config.event_pace_ms)),
        );
        let report = report?;
        if report.outcome == FightOutcome::Loss {
            tracing::info!("💀 Lost in '{}', stopping", name);
            break;
        }
    }

    if args.save {
        let store = SaveStore::new(&config.data_dir);
        store.save_world(&world)?;
        store.save_player(&inventory.to_save(&world)?)?;
    }

    Ok(())
}

/// Console stand-in for the animation layer: logs each event, waits, acknowledges.
async fn render(mut receiver: EventReceiver, pace: Duration) {
    while let Some(pending) = receiver.next().await {
        let event = &pending.event;
        tracing::info!(
            "🎬 {} {}",
            event.name(),
            serde_json::Value::Object(event.values())
        );
        sleep(pace).await;
        pending.acknowledge();
    }
}
