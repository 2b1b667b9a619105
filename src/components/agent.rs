use crate::components::{AgentId, Facing, Location, Speed};
use crate::game_logic::schedule::{DailySchedule, ScheduleState};
use crate::game_logic::stuck::{RejectedHeadings, StuckDetector};
use crate::map::Address;
use bevy::prelude::*;
use rand_pcg::Pcg64;

/// Grid path owned by one agent
#[derive(Debug, Clone, PartialEq)]
pub struct NavPath {
    waypoints: Vec<Vec2>,
    cursor: usize,
    /// Simulated seconds at planning time
    pub planned_at: f64,
    /// Navigation grid generation the path was planned on
    pub grid_generation: u64,
}

impl NavPath {
    pub fn new(waypoints: Vec<Vec2>, planned_at: f64, grid_generation: u64) -> Self {
        Self {
            waypoints,
            cursor: 0,
            planned_at,
            grid_generation,
        }
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    pub fn current_waypoint(&self) -> Option<Vec2> {
        self.waypoints.get(self.cursor).copied()
    }

    pub fn advance(&mut self) {
        if self.cursor < self.waypoints.len() {
            self.cursor += 1;
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.waypoints.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn final_destination(&self) -> Option<Vec2> {
        self.waypoints.last().copied()
    }

    /// A path expires after `max_age` simulated seconds or once the grid is rebuilt
    pub fn is_stale(&self, now: f64, max_age: f64, grid_generation: u64) -> bool {
        now - self.planned_at >= max_age || self.grid_generation != grid_generation
    }
}

/// A heading held for a short time after stuck recovery picked it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryHeading {
    pub heading: Vec2,
    pub until: f64,
}

/// One townsperson
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub home: Address,
    pub work: Address,
    pub schedule: DailySchedule,
    pub state: ScheduleState,
    pub location: Location,
    /// World position outdoors, interior-local position indoors
    pub position: Vec2,
    /// Units per tick
    pub velocity: Vec2,
    pub facing: Facing,
    pub path: Option<NavPath>,
    /// When the last plan was attempted, successful or not
    pub plan_attempted_at: Option<f64>,
    pub target: Option<Vec2>,
    pub target_building: Option<Address>,
    pub stuck: StuckDetector,
    pub rejected_headings: RejectedHeadings,
    pub recovery: Option<RecoveryHeading>,
    /// Set while the current state cannot make progress; keeps the warning to one per stall
    pub stalled: bool,
    pub speed: Speed,
    pub rng: Pcg64,
}

impl Agent {
    pub fn new(
        id: AgentId,
        name: String,
        home: Address,
        work: Address,
        schedule: DailySchedule,
        speed: Speed,
        rng: Pcg64,
    ) -> Self {
        Self {
            id,
            name,
            home,
            work,
            schedule,
            state: ScheduleState::AtHouse,
            location: Location::Outdoors,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            facing: Facing::default(),
            path: None,
            plan_attempted_at: None,
            target: None,
            target_building: None,
            stuck: StuckDetector::new(Vec2::ZERO, 0.0),
            rejected_headings: RejectedHeadings::default(),
            recovery: None,
            stalled: false,
            speed,
            rng,
        }
    }

    pub fn is_indoors(&self) -> bool {
        self.location.is_indoors()
    }

    pub fn current_interior(&self) -> Option<&Address> {
        self.location.current_interior()
    }

    pub fn is_moving(&self) -> bool {
        self.velocity.length_squared() > 1e-10
    }

    /// Drop every piece of navigation state tied to the previous goal
    pub fn clear_navigation(&mut self) {
        self.path = None;
        self.plan_attempted_at = None;
        self.target = None;
        self.target_building = None;
        self.recovery = None;
        self.stalled = false;
        self.rejected_headings.clear();
    }

    /// Move to a new state, clearing references that no longer apply
    pub fn transition(&mut self, next: ScheduleState, now: f64) {
        if self.state == next {
            return;
        }
        debug!("{} ({}): {} -> {}", self.name, self.id, self.state, next);
        self.state = next;
        self.clear_navigation();
        self.velocity = Vec2::ZERO;
        self.stuck.reset(self.position, now);
    }

    pub fn view(&self) -> AgentView {
        AgentView {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            facing: self.facing,
            is_indoors: self.is_indoors(),
            current_interior: self.current_interior().cloned(),
            state: self.state,
        }
    }
}

/// Read-only snapshot for renderers and tools
#[derive(Debug, Clone, PartialEq)]
pub struct AgentView {
    pub id: AgentId,
    pub name: String,
    pub position: Vec2,
    pub facing: Facing,
    pub is_indoors: bool,
    pub current_interior: Option<Address>,
    pub state: ScheduleState,
}
