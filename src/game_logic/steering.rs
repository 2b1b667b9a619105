//! Obstacle-aware local steering used without a grid path and for stuck recovery

use crate::game_logic::stuck::RejectedHeadings;
use crate::map::{Building, BuildingRegistry};
use crate::pathfinding::Obstacle;
use crate::resources::NavigationSettings;
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

const SWEEP_HALF_ANGLE_DEG: i32 = 90;
const SWEEP_STEP_DEG: i32 = 10;
const ANGLE_WEIGHT: f32 = 0.6;
const CLEARANCE_WEIGHT: f32 = 0.4;
/// Share of the original target direction kept when blending in a swept heading
const TARGET_BLEND: f32 = 0.3;
const RANDOM_ATTEMPTS: u32 = 10;

/// Clearance queries against terrain and building outlines
pub struct ClearanceProbe<'a, W: BuildingRegistry + ?Sized> {
    pub world: &'a W,
    pub target_building: Option<&'a Building>,
    pub settings: &'a NavigationSettings,
}

impl<'a, W: BuildingRegistry + ?Sized> ClearanceProbe<'a, W> {
    pub fn new(
        world: &'a W,
        target_building: Option<&'a Building>,
        settings: &'a NavigationSettings,
    ) -> Self {
        Self {
            world,
            target_building,
            settings,
        }
    }

    /// Terrain-clear and far enough from every building outline. The target building
    /// only asks for the small entrance clearance inside its south entrance band.
    pub fn position_clear(&self, point: Vec2) -> bool {
        if !self.world.area_clear(point, self.settings.agent_radius.get()) {
            return false;
        }
        let building_clearance = self.settings.building_clearance.get();
        self.world.buildings().iter().all(|building| {
            let is_target = self
                .target_building
                .is_some_and(|target| target.address == building.address);
            let required = if is_target
                && building.in_entrance_band(point, self.settings.entrance_offset.get() + building_clearance)
            {
                self.settings.entrance_clearance.get()
            } else {
                building_clearance
            };
            building.clearance_distance(point) >= required
        })
    }

    /// How far along `heading` samples stay clear, up to `max_distance`
    pub fn clear_distance(&self, from: Vec2, heading: Vec2, max_distance: f32) -> f32 {
        let step = self.settings.lookahead_step.get();
        let mut clear = 0.0;
        let mut distance = step;
        while distance <= max_distance + 1e-4 {
            if !self.position_clear(from + heading * distance) {
                break;
            }
            clear = distance;
            distance += step;
        }
        clear
    }

    /// Lookahead for the current distance to the target
    pub fn lookahead(&self, distance_to_target: f32) -> f32 {
        if distance_to_target <= self.settings.close_range.get() {
            self.settings.close_lookahead.get()
        } else {
            self.settings.lookahead.get()
        }
    }

    /// Reach checked ahead of an agent `distance_to_target` away from its target
    pub fn reach(&self, distance_to_target: f32) -> f32 {
        self.lookahead(distance_to_target).min(distance_to_target)
    }

    /// Whether every sample along `heading` up to `limit` is clear
    pub fn ahead_clear(&self, from: Vec2, heading: Vec2, limit: f32) -> bool {
        let step = self.settings.lookahead_step.get();
        if limit < step {
            return self.position_clear(from + heading * limit);
        }
        self.clear_distance(from, heading, limit) + step > limit
    }

    /// Whether the stretch ahead toward a target is clear. Never samples past the target.
    pub fn path_ahead_clear(&self, from: Vec2, heading: Vec2, distance_to_target: f32) -> bool {
        self.ahead_clear(from, heading, self.reach(distance_to_target))
    }

    fn step_clear(&self, from: Vec2, heading: Vec2) -> bool {
        self.position_clear(from + heading * self.settings.lookahead_step.get())
    }
}

/// Pick a heading when the way toward `desired` is blocked. Always returns a unit vector.
///
/// Order: the best-scoring heading within ±90° of `desired` that is clear for `reach`
/// (skipping rejected headings, blended back toward the target where that stays
/// clear), then the perpendiculars, then reverse, then random headings, and finally
/// any heading at all.
pub fn choose_heading<W, R>(
    probe: &ClearanceProbe<'_, W>,
    position: Vec2,
    desired: Vec2,
    reach: f32,
    rejected: &RejectedHeadings,
    rng: &mut R,
) -> Vec2
where
    W: BuildingRegistry + ?Sized,
    R: Rng + ?Sized,
{
    let desired = desired.try_normalize().unwrap_or(Vec2::X);
    let lookahead = probe.settings.lookahead.get();

    let mut best: Option<(Vec2, f32)> = None;
    for angle in sweep_angles() {
        let heading = Vec2::from_angle((angle as f32).to_radians()).rotate(desired);
        if rejected.contains(heading) {
            continue;
        }
        if !probe.ahead_clear(position, heading, reach) {
            continue;
        }
        let clear = probe.clear_distance(position, heading, lookahead);
        let score = ANGLE_WEIGHT * (1.0 - angle.abs() as f32 / SWEEP_HALF_ANGLE_DEG as f32)
            + CLEARANCE_WEIGHT * (clear / lookahead);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((heading, score));
        }
    }
    if let Some((heading, _)) = best {
        // Blended heading only when it is as clear as the swept one
        return (desired * TARGET_BLEND + heading * (1.0 - TARGET_BLEND))
            .try_normalize()
            .filter(|blended| probe.ahead_clear(position, *blended, reach))
            .unwrap_or(heading);
    }

    let fallbacks = [desired.perp(), -desired.perp(), -desired];
    if let Some(heading) = fallbacks
        .into_iter()
        .find(|heading| probe.step_clear(position, *heading))
    {
        return heading;
    }

    for _ in 0..RANDOM_ATTEMPTS {
        let heading = Vec2::from_angle(rng.gen_range(0.0..TAU));
        if probe.step_clear(position, heading) {
            return heading;
        }
    }

    Vec2::from_angle(rng.gen_range(0.0..TAU))
}

/// 0, -10, +10, -20, +20 ... ±90 degrees
fn sweep_angles() -> impl Iterator<Item = i32> {
    std::iter::once(0).chain(
        (1..=SWEEP_HALF_ANGLE_DEG / SWEEP_STEP_DEG)
            .flat_map(|i| [-i * SWEEP_STEP_DEG, i * SWEEP_STEP_DEG]),
    )
}

/// Velocity for one tick of direct steering toward `target`. Goes straight when the
/// path ahead is clear, otherwise searches for an alternative heading.
pub fn local_steer<W, R>(
    probe: &ClearanceProbe<'_, W>,
    position: Vec2,
    target: Vec2,
    speed: f32,
    rejected: &RejectedHeadings,
    rng: &mut R,
) -> Vec2
where
    W: BuildingRegistry + ?Sized,
    R: Rng + ?Sized,
{
    let offset = target - position;
    let distance = offset.length();
    let Some(direction) = offset.try_normalize() else {
        return Vec2::ZERO;
    };

    if probe.path_ahead_clear(position, direction, distance) {
        return direction * speed.min(distance);
    }
    let reach = probe.reach(distance);
    choose_heading(probe, position, direction, reach, rejected, rng) * speed
}
