//! Per-tick update of one agent: schedule, navigation, avoidance and integration

use crate::components::{Agent, Facing, NavPath, RecoveryHeading};
use crate::game_logic::avoidance::{Neighbor, NeighborKind, calculate_avoidance};
use crate::game_logic::errors::TownError;
use crate::game_logic::interior::{enter_building, exit_building};
use crate::game_logic::movement::{
    advance_waypoints, calculate_movement, has_arrived, should_replan_path,
};
use crate::game_logic::schedule::{ScheduleState, clock_transition};
use crate::game_logic::steering::{ClearanceProbe, choose_heading, local_steer};
use crate::map::{Address, Building, BuildingRegistry, Town, WorldQuery};
use crate::pathfinding::{NavigationGrid, find_path};
use crate::resources::NavigationSettings;
use bevy::prelude::*;

/// How long a heading picked by stuck recovery is followed before normal steering resumes
const RECOVERY_HOLD_SECS: f64 = 0.75;

/// Where an outdoor agent is heading, and the building it will enter there
#[derive(Debug, Clone, Copy)]
struct MovementTarget<'a> {
    point: Vec2,
    building: Option<&'a Building>,
}

/// Everything an agent may read or touch during its update
pub struct TickContext<'a> {
    pub town: &'a mut Town,
    pub grid: &'a NavigationGrid,
    pub hour: f32,
    /// Simulated seconds
    pub now: f64,
    /// Same-tick snapshot of every agent (and the player). Agents earlier in the
    /// update order have already moved.
    pub neighbors: &'a [Neighbor],
    pub settings: &'a NavigationSettings,
}

/// Run one state-machine and movement step
pub fn update_agent(agent: &mut Agent, ctx: &mut TickContext<'_>) {
    if let Some(next) = clock_transition(agent.state, ctx.hour, &agent.schedule) {
        agent.transition(next, ctx.now);
    }

    match agent.state {
        ScheduleState::AtHouse | ScheduleState::AtWork => agent.velocity = Vec2::ZERO,
        ScheduleState::ExitingHouse => {
            let (from, to) = (agent.home.clone(), agent.work.clone());
            leave_building(agent, ctx, &from, &to, ScheduleState::TravelingToWork);
        }
        ScheduleState::ExitingWork => {
            let (from, to) = (agent.work.clone(), agent.home.clone());
            leave_building(agent, ctx, &from, &to, ScheduleState::TravelingToHouse);
        }
        ScheduleState::TravelingToWork => {
            let work = agent.work.clone();
            travel(agent, ctx, &work, ScheduleState::EnteringWork, ScheduleState::AtWork);
        }
        ScheduleState::EnteringWork => {
            let work = agent.work.clone();
            enter(agent, ctx, &work, ScheduleState::AtWork);
        }
        ScheduleState::TravelingToHouse => {
            let home = agent.home.clone();
            travel(agent, ctx, &home, ScheduleState::EnteringHouse, ScheduleState::AtHouse);
        }
        ScheduleState::EnteringHouse => {
            let home = agent.home.clone();
            enter(agent, ctx, &home, ScheduleState::AtHouse);
        }
    }

    agent.facing = Facing::from_velocity(agent.velocity, agent.facing);
}

/// Hold the current state without a target. Warns once per stall.
fn stall(agent: &mut Agent, reason: TownError) {
    if !agent.stalled {
        warn!(
            "{} ({}) stalled in {}: {reason}",
            agent.name, agent.id, agent.state
        );
        agent.stalled = true;
    }
    agent.velocity = Vec2::ZERO;
}

/// Aim an outdoor agent at the south entrance of `destination`
fn aim_at(agent: &mut Agent, town: &Town, destination: &Address, settings: &NavigationSettings) {
    match town.building(destination) {
        Ok(building) => {
            agent.target = Some(building.approach_point(settings.entrance_offset.get()));
            agent.target_building = Some(destination.clone());
            agent.stalled = false;
        }
        Err(err) => stall(agent, err),
    }
}

/// Walk to the interior exit, step outside, then head for `destination`
fn leave_building(
    agent: &mut Agent,
    ctx: &mut TickContext<'_>,
    from: &Address,
    destination: &Address,
    next: ScheduleState,
) {
    if agent.is_indoors() {
        let inside = agent.current_interior().cloned().unwrap_or_else(|| from.clone());
        let Some(exit_point) = ctx.town.lookup(&inside).map(|b| b.interior.exit_point) else {
            stall(
                agent,
                TownError::UnresolvedAddress {
                    address: inside.to_string(),
                },
            );
            return;
        };

        agent.target = Some(exit_point);
        let step = calculate_movement(agent.position, exit_point, agent.speed);
        agent.position += step;
        agent.velocity = step;
        if agent.position.distance(exit_point) > ctx.settings.arrival_tolerance.get() {
            return;
        }

        exit_building(agent, ctx.town, &inside, ctx.settings.agent_radius.get());
    }

    agent.transition(next, ctx.now);
    aim_at(agent, ctx.town, destination, ctx.settings);
}

/// Walk toward `destination`; on arrival enter it within the same tick
fn travel(
    agent: &mut Agent,
    ctx: &mut TickContext<'_>,
    destination: &Address,
    entering: ScheduleState,
    inside: ScheduleState,
) {
    if let Some(current) = agent.current_interior().cloned() {
        exit_building(agent, ctx.town, &current, ctx.settings.agent_radius.get());
        agent.stuck.reset(agent.position, ctx.now);
    }
    if agent.target.is_none() || agent.target_building.is_none() {
        aim_at(agent, ctx.town, destination, ctx.settings);
    }
    let Some(target) = agent.target else {
        return;
    };

    let arrived = ctx
        .town
        .lookup(destination)
        .is_some_and(|building| has_arrived(agent.position, target, Some(building), ctx.settings));
    if arrived {
        debug!(
            "{} ({}) arrived at '{}' ({:.2} from its centre)",
            agent.name,
            agent.id,
            destination,
            ctx.town
                .lookup(destination)
                .map_or(0.0, |b| b.position.distance(agent.position))
        );
        agent.transition(entering, ctx.now);
        enter(agent, ctx, destination, inside);
        return;
    }

    move_outdoors(agent, ctx, target);
}

fn enter(agent: &mut Agent, ctx: &mut TickContext<'_>, address: &Address, next: ScheduleState) {
    let others: Vec<Vec2> = ctx
        .neighbors
        .iter()
        .filter(|n| n.kind != NeighborKind::Agent(agent.id))
        .filter(|n| n.location.current_interior() == Some(address))
        .map(|n| n.position)
        .collect();

    match enter_building(agent, ctx.town, address, &others, ctx.settings.agent_radius.get()) {
        Ok(()) => agent.transition(next, ctx.now),
        Err(err) => stall(agent, err),
    }
}

/// Plan a grid path toward `target`, leaving the agent without a path on failure
fn plan_path(agent: &mut Agent, grid: &NavigationGrid, target: Vec2, now: f64) {
    let first_attempt = agent.plan_attempted_at.is_none();
    let had_path = agent.path.is_some();
    agent.plan_attempted_at = Some(now);

    match find_path(grid, agent.position, target) {
        Some(waypoints) => {
            let mut path = NavPath::new(waypoints, now, grid.generation());
            // Already past the start cell centre
            let past_start = match path.waypoints() {
                [start, second, ..] => agent.position.distance(*second) <= start.distance(*second),
                _ => false,
            };
            if past_start {
                path.advance();
            }
            agent.path = Some(path);
        }
        None => {
            let err = TownError::PlanningFailure {
                start: agent.position,
                goal: target,
            };
            if (first_attempt || had_path) && grid.is_built() {
                warn!("{} ({}): {err}; steering directly", agent.name, agent.id);
            } else {
                debug!("{} ({}): {err}", agent.name, agent.id);
            }
            agent.path = None;
        }
    }
}

/// Velocity toward the next waypoint, or from local steering when there is none
fn steer(
    agent: &mut Agent,
    probe: &ClearanceProbe<'_, Town>,
    grid: &NavigationGrid,
    target: MovementTarget<'_>,
    now: f64,
) -> Vec2 {
    let settings = probe.settings;
    let position = agent.position;
    let reach = settings.waypoint_reach.get();

    let mut waypoint = agent
        .path
        .as_mut()
        .and_then(|path| advance_waypoints(path, position, reach));

    if waypoint.is_none() && agent.path.is_some() {
        // Path exhausted
        if has_arrived(position, target.point, target.building, settings) {
            return Vec2::ZERO;
        }
        agent.path = None;
        plan_path(agent, grid, target.point, now);
        waypoint = agent
            .path
            .as_mut()
            .and_then(|path| advance_waypoints(path, position, reach));
        if waypoint.is_none() {
            agent.path = None;
        }
    }

    match waypoint {
        Some(waypoint) => calculate_movement(position, waypoint, agent.speed),
        None => local_steer(
            probe,
            position,
            target.point,
            agent.speed.0,
            &agent.rejected_headings,
            &mut agent.rng,
        ),
    }
}

/// One tick of outdoor movement toward `target`
fn move_outdoors(agent: &mut Agent, ctx: &TickContext<'_>, target: Vec2) {
    let town: &Town = &*ctx.town;
    let settings = ctx.settings;
    let now = ctx.now;
    let target_building: Option<&Building> =
        agent.target_building.as_ref().and_then(|address| town.lookup(address));
    let probe = ClearanceProbe::new(town, target_building, settings);
    let movement_target = MovementTarget {
        point: target,
        building: target_building,
    };

    if agent.recovery.is_none() && should_replan_path(agent, now, ctx.grid, settings) {
        plan_path(agent, ctx.grid, target, now);
    }

    let desired = match agent.recovery {
        Some(recovery) if now < recovery.until => recovery.heading * agent.speed,
        _ => {
            agent.recovery = None;
            steer(agent, &probe, ctx.grid, movement_target, now)
        }
    };

    let avoidance = calculate_avoidance(
        agent.id,
        agent.position,
        desired,
        &agent.location,
        ctx.neighbors,
        settings.avoidance_radius.get(),
        settings.avoidance_strength * agent.speed.0,
    );

    let radius = settings.agent_radius.get();
    let velocity = desired + avoidance.total_force;
    agent.velocity = if velocity != Vec2::ZERO && town.area_clear(agent.position + velocity, radius)
    {
        velocity
    } else if desired != Vec2::ZERO && town.area_clear(agent.position + desired, radius) {
        desired
    } else {
        Vec2::ZERO
    };
    agent.position += agent.velocity;

    let window = settings.stuck_window.get() as f64;
    if agent
        .stuck
        .update(agent.position, now, window, settings.stuck_threshold.get())
        && !has_arrived(agent.position, target, target_building, settings)
    {
        let heading = if desired != Vec2::ZERO { desired } else { target - agent.position };
        agent.rejected_headings.remember(heading);

        let to_target = target - agent.position;
        let reach = probe.reach(to_target.length());
        let recovery = choose_heading(
            &probe,
            agent.position,
            to_target,
            reach,
            &agent.rejected_headings,
            &mut agent.rng,
        );
        debug!(
            "{} ({}) stuck at ({:.1}, {:.1}); recovering along ({:.2}, {:.2})",
            agent.name, agent.id, agent.position.x, agent.position.y, recovery.x, recovery.y
        );
        agent.recovery = Some(RecoveryHeading {
            heading: recovery,
            until: now + RECOVERY_HOLD_SECS,
        });
        agent.path = None;
        agent.plan_attempted_at = None;
    }
}
