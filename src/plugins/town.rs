use crate::resources::SimSettings;
use crate::simulation::TownSimulation;
use bevy::prelude::*;

/// The running simulation, owned by the Bevy world
#[derive(Resource)]
pub struct TownState(pub TownSimulation);

/// Ask for the navigation grid to be rebuilt from the current town
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RebuildNavigation;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationControl {
    Pause,
    Resume,
    TogglePause,
}

/// Sent on the tick a new simulated day starts
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStarted {
    pub day: u32,
}

/// Drives [`TownState`] on `FixedUpdate`. Pausing `Time<Virtual>` stops the
/// fixed schedule, so the simulation clock and every timer derived from it stop too.
pub struct TownPlugin {
    pub ticks_per_second: f64,
}

impl TownPlugin {
    pub fn from_settings(settings: &SimSettings) -> Self {
        Self {
            ticks_per_second: settings.ticks_per_second.get() as f64,
        }
    }
}

impl Plugin for TownPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(self.ticks_per_second.max(1.0)))
            .add_event::<RebuildNavigation>()
            .add_event::<SimulationControl>()
            .add_event::<DayStarted>()
            .add_systems(
                FixedUpdate,
                tick_simulation.run_if(resource_exists::<TownState>),
            )
            // Update runs after the fixed loop, so the grid only changes between ticks
            .add_systems(
                Update,
                (
                    handle_simulation_control,
                    rebuild_navigation.run_if(resource_exists::<TownState>),
                ),
            );
    }
}

fn tick_simulation(mut town: ResMut<TownState>, mut days: EventWriter<DayStarted>) {
    if town.0.tick() {
        days.write(DayStarted {
            day: town.0.clock().day,
        });
    }
}

fn rebuild_navigation(mut requests: EventReader<RebuildNavigation>, mut town: ResMut<TownState>) {
    if requests.read().count() > 0 {
        town.0.rebuild_navigation();
    }
}

fn handle_simulation_control(
    mut controls: EventReader<SimulationControl>,
    mut time: ResMut<Time<Virtual>>,
) {
    for control in controls.read() {
        let pause = match control {
            SimulationControl::Pause => true,
            SimulationControl::Resume => false,
            SimulationControl::TogglePause => !time.is_paused(),
        };
        if pause == time.is_paused() {
            continue;
        }
        if pause {
            time.pause();
            info!("Simulation paused");
        } else {
            time.unpause();
            info!("Simulation resumed");
        }
    }
}
