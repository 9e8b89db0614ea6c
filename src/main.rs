use std::path::Path;

use anyhow::{bail, Context};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use space_pirates_sim::config::SimConfig;
use space_pirates_sim::game::agent::ShipInput;
use space_pirates_sim::game::definition::{GameDefinition, MissionList};
use space_pirates_sim::game::session::Session;
use space_pirates_sim::game::tunables::Tunables;
use space_pirates_sim::input::device::{Axis, DeviceState};
use space_pirates_sim::input::{DeviceSettings, GamepadInput, GamepadLayout, InputDevice};

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();

    info!("Space Pirates simulation v{}", env!("CARGO_PKG_VERSION"));

    let config = SimConfig::load_or_default();
    config.validate().map_err(anyhow::Error::msg)?;

    let mut tunables = Tunables::default();
    if let Some(frames) = config.record_frames {
        tunables.record_frame_count = frames;
    }
    let mut definition = match &config.mission_file {
        Some(path) => load_mission(path, config.mission.as_deref())?,
        None => GameDefinition::skirmish(&tunables),
    };
    if let Some(seed) = config.seed {
        definition.seed = seed;
    }

    let mut session = Session::new(definition, tunables).context("invalid battle definition")?;

    // Headless pilot: trigger held, stick centred
    let mut pilot = GamepadInput::new(GamepadLayout::Xbox, DeviceSettings::default());
    let mut held = DeviceState::default();
    held.set_axis(Axis::RightTrigger, 1.0);
    pilot.feed(held);
    let human = session.state().ships.human();

    for _ in 0..config.frames {
        if let Some(human) = human {
            let mut input = ShipInput::default();
            pilot.apply(&mut input, session.tunables(), config.frame_ms);
            session.set_input(human, input);
        }
        session.simulate(config.frame_ms);
        if session.is_over() {
            break;
        }
    }

    let report = session.report();
    info!(
        "Battle ended after {} frames: {:?}, {} kills, crashes {:?}",
        session.frame(),
        report.outcome,
        report.total_kills,
        report.crashes
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to encode battle report")?
    );

    Ok(())
}

fn load_mission(path: &Path, name: Option<&str>) -> anyhow::Result<GameDefinition> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read mission file {}", path.display()))?;
    let list = MissionList::from_json(&json)
        .with_context(|| format!("failed to parse mission file {}", path.display()))?;

    let mission = match name {
        Some(name) => list.find(name)?,
        None => match list.missions.first() {
            Some(mission) => mission,
            None => bail!("mission file {} is empty", path.display()),
        },
    };
    info!("Mission '{}': {}", mission.name, mission.description);
    Ok(mission.game_definition.clone())
}
