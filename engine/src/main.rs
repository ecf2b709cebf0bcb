use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod engine;
mod scenario;

use engine::{EngineConfig, ShieldEngine};
use scenario::Escalation;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "shield_engine=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env()?;
    tracing::info!(
        threshold = config.trigger_threshold,
        autonomy = config.full_autonomy,
        speed = config.speed_multiplier,
        "Orbital Shield engine starting"
    );

    let fleet = catalog::demo_fleet()?;
    let stations = catalog::ground_stations();
    tracing::info!("   Catalog: {} objects", fleet.len());
    tracing::info!("   Downlink stations: {}", stations.len());

    let target = fleet
        .iter()
        .find(|o| o.id == catalog::USA_245_ID)
        .map(|o| o.elements)
        .context("demo target missing from catalog")?;
    let escalation = Escalation::new(catalog::SJ_26_ID, target);

    let (mut engine, mut commands) = ShieldEngine::new(config.clone(), fleet, stations);

    let mut now_s = 0.0;
    let mut interval = tokio::time::interval(config.tick_interval);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let prev_s = now_s;
                now_s += config.tick_interval.as_secs_f64() * config.speed_multiplier;

                let (elements, track) = escalation.track_at(now_s)?;
                engine.observe_track(escalation.threat_id(), elements, track, now_s);

                let events = escalation.events_between(prev_s, now_s);
                let report = engine.tick(now_s, &events).await;
                for id in &report.triggered {
                    tracing::warn!(
                        object = %id,
                        risk = report.risk.get(id).copied().unwrap_or(0.0),
                        "autonomous response engaged"
                    );
                }
            }
            Some(command) = commands.recv() => {
                engine.apply_command(&command, now_s)?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    Ok(())
}
