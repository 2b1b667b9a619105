use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use clap::Parser;
use std::collections::BTreeMap;
use std::time::Duration;
use townsim::config::load_config;
use townsim::game_logic::schedule::ScheduleState;
use townsim::*;

#[derive(Parser)]
#[command(name = "townsim")]
#[command(about = "Run the townsfolk simulation headless")]
struct Args {
    /// Town file relative to the towns/ directory (defaults to the configured one)
    #[arg(long)]
    town: Option<String>,

    /// Number of simulated days to run
    #[arg(long, default_value = "1")]
    days: u32,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of townsfolk
    #[arg(long)]
    agents: Option<u32>,

    /// Demo town size when no town file can be loaded (format: COLUMNSxROWS)
    #[arg(long, default_value = "3x2")]
    demo: String,
}

fn parse_demo_size(size: &str) -> TownResult<(u32, u32)> {
    let invalid = || TownError::InvalidTownData {
        reason: format!("Invalid demo size '{size}'. Expected COLUMNSxROWS"),
    };
    let (columns, rows) = size.split_once('x').ok_or_else(invalid)?;
    let columns: u32 = columns.trim().parse().map_err(|_| invalid())?;
    let rows: u32 = rows.trim().parse().map_err(|_| invalid())?;
    if columns == 0 || rows == 0 {
        return Err(invalid());
    }
    Ok((columns, rows))
}

/// Load the configured town, falling back to a generated demo town
fn load_town(settings: &SimSettings, demo: &str) -> TownResult<TownLayout> {
    match TownLayout::load_from_file(&settings.town_file_path) {
        Ok(layout) => {
            info!("Loaded town '{}' from {}", layout.name, settings.town_file_path);
            Ok(layout)
        }
        Err(err) => {
            warn!("Failed to load town: {err}");
            let (columns, rows) = parse_demo_size(demo)?;
            info!("Using a {columns}x{rows} demo town");
            TownLayout::create_demo(columns, rows)
        }
    }
}

fn report_days(mut days: EventReader<DayStarted>, town: Res<TownState>) {
    for day in days.read() {
        let mut by_state: BTreeMap<String, usize> = BTreeMap::new();
        for view in town.0.agent_views() {
            *by_state.entry(view.state.to_string()).or_default() += 1;
        }
        info!("Day {} started: {by_state:?}", day.day);
    }
}

fn main() -> TownResult<()> {
    let args = Args::parse();

    let mut settings = load_config().settings;
    if let Some(town) = args.town {
        settings.town_file_path = town;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(agents) = args.agents {
        settings.agent_count = agents;
    }

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        LogPlugin::default(),
        TownPlugin::from_settings(&settings),
    ));

    let layout = load_town(&settings, &args.demo)?;
    let simulation = TownSimulation::new(layout, settings.clone())?;

    // One fixed tick per update, as fast as the machine allows
    app.insert_resource(TownState(simulation))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            settings.secs_per_tick(),
        )))
        .add_systems(Update, report_days);
    app.finish();
    app.cleanup();

    while app.world().resource::<TownState>().0.clock().day < args.days {
        app.update();
    }

    let simulation = &app.world().resource::<TownState>().0;
    let at_home = simulation
        .agents()
        .iter()
        .filter(|agent| agent.state == ScheduleState::AtHouse && agent.is_indoors())
        .count();
    info!(
        "Finished {} day(s): {}/{} townsfolk at home, grid generation {}",
        args.days,
        at_home,
        simulation.agents().len(),
        simulation.grid().generation()
    );
    Ok(())
}
