//! Hover-craft dynamics and collision response
//!
//! A craft is a planar rigid body held up by a single hover beam cast along
//! its local down axis. Beam force falls off exponentially with the beam's
//! length, so the craft settles where the beam is one unit long.
//!
//! A frame runs in three phases driven by the race:
//! 1. `update` integrates a trial `delta` without moving the craft,
//! 2. `collide` / `level_collide` resolve contacts against the trial pose,
//! 3. `commit` applies whatever delta survives.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::rkn::integrate_rkn;
use super::state::CraftState;
use super::trail::{TrailMarker, TrailSink};
use crate::geom::{Vec2Ext, segment_intersect};
use crate::normalize_angle;
use crate::terrain::TrackProfile;

// Handling
pub const TURN_RATE: f32 = 3.14;
pub const TURN_DAMP: f32 = 1.0;
pub const TURN_BACK: f32 = 2.0;
pub const GRAVITY: f32 = -2.0;
pub const HOVER_FORCE: f32 = 2.0;
pub const BOOST: f32 = 2.0;
pub const DAMP: f32 = 0.25;
/// Hover force multiplier while upside down
pub const INVERTED_FORCE_MOD: f32 = 0.2;
pub const BOOST_REFUEL: f32 = 0.3;
pub const BOOST_FUEL_USE: f32 = 1.0;

// Body
pub const WIDTH: f32 = 0.5;
pub const HEIGHT: f32 = 0.15;
pub const MASS: f32 = 1.0;
pub const INERTIA: f32 = MASS * (HEIGHT * HEIGHT + WIDTH * WIDTH) / 12.0;
pub const MAJOR_AXIS: f32 = 0.25;
pub const MINOR_AXIS: f32 = 0.075;

// Contacts
pub const CRAFT_RESTITUTION: f32 = 0.5;
pub const LEVEL_RESTITUTION: f32 = 0.5;
/// Largest impulse a single contact may apply
pub const MAX_IMPULSE: f32 = 5.0;
/// The testing craft's box is shrunk slightly so touching faces give two clean crossings
const BOX_SHRINK: f32 = 0.99;
/// Separation applied to each craft after a craft contact
const SEPARATION: f32 = 0.03;
/// Spin applied to each craft after a craft contact
const SPIN_KICK: f32 = 0.05;
/// Track penetration is over-corrected by this factor
const LEVEL_PUSH_OUT: f32 = 1.1;
/// Beam endpoints sit this fraction of the hull height off the hull
const BEAM_INSET: f32 = 0.55;

// Exhaust trail
const TRAIL_PERIOD: f32 = 0.4;
const BOOST_TRAIL_PERIOD: f32 = 0.2;
/// No exhaust when the beam is longer than this
const TRAIL_MAX_BEAM: f32 = 3.0;
const TRAIL_SPEED: f32 = 2.0;

/// Craft input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    /// Rotate counter-clockwise (nose up)
    RotateCcw,
    /// Rotate clockwise (nose down)
    RotateCw,
    Boost,
}

/// Held-down state of every control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub rotate_ccw: bool,
    pub rotate_cw: bool,
    pub boost: bool,
}

impl Controls {
    pub fn get(&self, control: Control) -> bool {
        match control {
            Control::RotateCcw => self.rotate_ccw,
            Control::RotateCw => self.rotate_cw,
            Control::Boost => self.boost,
        }
    }

    pub fn set(&mut self, control: Control, value: bool) {
        match control {
            Control::RotateCcw => self.rotate_ccw = value,
            Control::RotateCw => self.rotate_cw = value,
            Control::Boost => self.boost = value,
        }
    }
}

/// Segment through a craft's hull that stops other craft's hover beams
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamBlocker {
    /// Index of the craft the segment belongs to
    pub owner: usize,
    pub start: Vec2,
    pub end: Vec2,
}

/// What a craft's hover beam can hit during an update
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    pub track: &'a TrackProfile,
    pub blockers: &'a [BeamBlocker],
    /// Owner whose blocker is ignored (the craft being updated)
    pub skip: Option<usize>,
}

impl<'a> Surroundings<'a> {
    /// Track only, no other craft
    pub fn new(track: &'a TrackProfile) -> Self {
        Self {
            track,
            blockers: &[],
            skip: None,
        }
    }

    /// Add other craft's blockers, ignoring those owned by `own_index`
    pub fn with_blockers(mut self, blockers: &'a [BeamBlocker], own_index: usize) -> Self {
        self.blockers = blockers;
        self.skip = Some(own_index);
        self
    }
}

/// Push from a hover beam onto the craft it landed on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reaction {
    /// Index of the craft to push
    pub target: usize,
    pub force: Vec2,
}

/// Result of integrating one frame
#[derive(Debug, Clone, Default)]
pub struct CraftUpdate {
    /// Trial change in pose, not yet committed
    pub delta: CraftState,
    /// Forces to hand to other craft, one per beam hit
    pub reactions: Vec<Reaction>,
}

/// A single hover craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craft {
    state: CraftState,
    /// Velocity and angular velocity
    velocity: CraftState,
    /// Trial step from the last update
    delta: CraftState,
    /// Hull corners in body space
    vertices: [Vec2; 4],
    major_axis: f32,
    minor_axis: f32,
    mass: f32,
    inertia: f32,
    /// Hover beam from the last derivative evaluation
    beam: [Vec2; 2],
    /// External force, consumed by the next derivative evaluation
    force: Vec2,
    boost_fuel: f32,
    hover_force: f32,
    trail_timer: f32,
    controls: Controls,
    color: Vec3,
}

impl Default for Craft {
    fn default() -> Self {
        Self::new()
    }
}

impl Craft {
    pub fn new() -> Self {
        let (hw, hh) = (0.5 * WIDTH, 0.5 * HEIGHT);
        Self {
            state: CraftState::ZERO,
            velocity: CraftState::ZERO,
            delta: CraftState::ZERO,
            vertices: [
                Vec2::new(-hw, -hh),
                Vec2::new(hw, -hh),
                Vec2::new(hw, hh),
                Vec2::new(-hw, hh),
            ],
            major_axis: MAJOR_AXIS,
            minor_axis: MINOR_AXIS,
            mass: MASS,
            inertia: INERTIA,
            beam: [Vec2::ZERO; 2],
            force: Vec2::ZERO,
            boost_fuel: 1.0,
            hover_force: 0.0,
            trail_timer: 0.0,
            controls: Controls::default(),
            color: Vec3::ONE,
        }
    }

    /// Place at `pos`, level and at rest
    pub fn reset(&mut self, pos: Vec2) {
        self.state = CraftState::new(pos, 0.0);
        self.velocity = CraftState::ZERO;
        self.delta = CraftState::ZERO;
        self.force = Vec2::ZERO;
    }

    pub fn set_control(&mut self, control: Control, value: bool) {
        self.controls.set(control, value);
    }

    pub fn clear_controls(&mut self) {
        self.controls = Controls::default();
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn state(&self) -> CraftState {
        self.state
    }

    pub fn pos(&self) -> Vec2 {
        self.state.pos
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.state.pos = pos;
    }

    pub fn angle(&self) -> f32 {
        self.state.angle
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.state.angle = angle;
    }

    pub fn vel(&self) -> Vec2 {
        self.velocity.pos
    }

    pub fn set_vel(&mut self, vel: Vec2) {
        self.velocity.pos = vel;
    }

    pub fn omega(&self) -> f32 {
        self.velocity.angle
    }

    pub fn set_omega(&mut self, omega: f32) {
        self.velocity.angle = omega;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.pos.length()
    }

    /// Pending trial step
    pub fn delta(&self) -> CraftState {
        self.delta
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn boost_fuel(&self) -> f32 {
        self.boost_fuel
    }

    /// Beam force from the last derivative evaluation
    pub fn hover_force(&self) -> f32 {
        self.hover_force
    }

    /// Hover beam as `[start, end]`
    pub fn beam(&self) -> [Vec2; 2] {
        self.beam
    }

    /// Hull corners in world space at the committed pose
    pub fn hull(&self) -> [Vec2; 4] {
        self.vertices
            .map(|v| v.rotated(self.state.angle) + self.state.pos)
    }

    /// Segment other craft's beams collide with
    pub fn blocker(&self, owner: usize) -> BeamBlocker {
        let half = Vec2::new(0.5 * WIDTH, 0.0).rotated(self.state.angle);
        BeamBlocker {
            owner,
            start: self.state.pos + half,
            end: self.state.pos - half,
        }
    }

    /// Queue a force for the next derivative evaluation
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Apply an impulse at a world point
    ///
    /// The impulse is capped at `MAX_IMPULSE`. The pending trial step is
    /// discarded since it no longer matches the velocity.
    pub fn add_impulse(&mut self, impulse: Vec2, point: Vec2) {
        let impulse = impulse.clamp_length_max(MAX_IMPULSE);
        self.velocity.pos += impulse / self.mass;
        self.velocity.angle += (point - self.state.pos).cross(impulse) / self.inertia;
        self.delta = CraftState::ZERO;
    }

    /// Burn or refill boost fuel; true while the boost is actually firing
    fn burn_boost(&mut self, dt: f32) -> bool {
        if self.controls.boost {
            self.boost_fuel -= BOOST_FUEL_USE * dt;
            if self.boost_fuel < 0.0 {
                self.boost_fuel = 0.0;
                false
            } else {
                true
            }
        } else {
            self.boost_fuel = (self.boost_fuel + BOOST_REFUEL * dt).min(1.0);
            false
        }
    }

    /// Integrate one frame into a trial step
    ///
    /// The pose is left untouched; `delta` holds the step until `commit`.
    /// Exhaust markers go to `trails`.
    pub fn update(
        &mut self,
        dt: f32,
        surroundings: &Surroundings<'_>,
        trails: &mut impl TrailSink,
    ) -> CraftUpdate {
        let boosting = self.burn_boost(dt);

        self.trail_timer += dt;
        let period = if boosting {
            BOOST_TRAIL_PERIOD
        } else {
            TRAIL_PERIOD
        };
        if self.trail_timer > period {
            let beam = self.beam[1] - self.beam[0];
            let level = self.state.angle > -FRAC_PI_4 && self.state.angle < FRAC_PI_4;
            if level && beam.length() < TRAIL_MAX_BEAM {
                trails.spawn(TrailMarker::new(
                    self.state.pos,
                    self.state.angle,
                    beam.unit() * TRAIL_SPEED + self.velocity.pos,
                    self.color,
                ));
                self.trail_timer = 0.0;
            }
        }

        let mut reactions = Vec::new();
        let (state, velocity) = (self.state, self.velocity);
        let (delta, velocity) = integrate_rkn(0.0, state, velocity, dt, |_, s, ds| {
            self.derive(s, ds, surroundings, &mut reactions)
        });

        self.delta = delta;
        self.velocity = velocity;
        CraftUpdate { delta, reactions }
    }

    /// Acceleration at trial pose `s` with trial velocity `ds`
    fn derive(
        &mut self,
        s: CraftState,
        ds: CraftState,
        surroundings: &Surroundings<'_>,
        reactions: &mut Vec<Reaction>,
    ) -> CraftState {
        // Beam points straight down in world space, stretched by the tilt
        let dir = Vec2::new(s.pos.y * s.angle.tan(), -s.pos.y);
        let inset = dir.unit() * (BEAM_INSET * HEIGHT);
        let start = self.state.pos + inset;
        let mut end = start + dir - inset;

        if let Some(hit) = surroundings.track.ray_intersect(start, end) {
            end = hit;
        }

        let inverted = s.angle < -FRAC_PI_2 || s.angle > FRAC_PI_2;

        let mut length = (end - start).length();
        let mut struck = None;
        for blocker in surroundings.blockers {
            if Some(blocker.owner) == surroundings.skip {
                continue;
            }
            if let Some(hit) = segment_intersect(blocker.start, blocker.end, start, end) {
                let dist = (hit - start).length();
                if dist < length {
                    end = hit;
                    length = dist;
                    struck = Some(blocker.owner);
                }
            }
        }
        self.beam = [start, end];

        let mut force = (1.0 - length).exp() * HOVER_FORCE;
        if inverted {
            force *= INVERTED_FORCE_MOD;
        }
        if self.controls.boost && self.boost_fuel > 0.0 && !inverted {
            force *= BOOST;
        }
        self.hover_force = force;

        let push = (end - start).unit() * force;
        if let Some(target) = struck {
            reactions.push(Reaction {
                target,
                force: push,
            });
        }

        let linear = Vec2::new(0.0, GRAVITY) - push - DAMP * ds.pos + self.force;
        self.force = Vec2::ZERO;

        let angular = if self.controls.rotate_ccw {
            TURN_RATE
        } else if self.controls.rotate_cw {
            -TURN_RATE
        } else {
            -TURN_BACK * s.angle - TURN_DAMP * ds.angle
        };

        CraftState::new(linear, angular)
    }

    /// Apply the trial step and wrap the orientation
    pub fn commit(&mut self) {
        self.state += self.delta;
        self.state.angle = normalize_angle(self.state.angle);
        self.delta = CraftState::ZERO;
    }

    /// Hull corners at the trial pose, optionally scaled about the center
    fn trial_hull(&self, scale: f32) -> [Vec2; 4] {
        let angle = self.state.angle + self.delta.angle;
        let center = self.state.pos + self.delta.pos;
        self.vertices.map(|v| (scale * v).rotated(angle) + center)
    }

    /// Contact point and normal between the trial hulls, if they overlap
    ///
    /// The contact is the midpoint of the first two edge crossings found; the
    /// normal points away from `other`, back toward this craft.
    fn contact(&self, other: &Craft) -> Option<(Vec2, Vec2)> {
        let mine = self.trial_hull(BOX_SHRINK);
        let theirs = other.trial_hull(1.0);

        let mut crossings = [Vec2::ZERO; 2];
        let mut found = 0;
        for i in 0..4 {
            for j in 0..4 {
                let Some(p) =
                    segment_intersect(mine[i], mine[(i + 1) % 4], theirs[j], theirs[(j + 1) % 4])
                else {
                    continue;
                };
                crossings[found] = p;
                found += 1;
                if found < 2 {
                    continue;
                }

                let point = 0.5 * (crossings[0] + crossings[1]);
                let mut normal = (crossings[1] - crossings[0]).normal();
                normal.normalize_in_place();
                if (point - self.state.pos).unit().dot(normal) > 0.0 {
                    normal = -normal;
                }
                return Some((point, normal));
            }
        }
        None
    }

    /// Velocity of the body point at world position `point`
    fn point_velocity(&self, point: Vec2) -> Vec2 {
        let r = point - (self.state.pos + self.delta.pos);
        self.velocity.pos + self.velocity.angle * r.normal()
    }

    /// Detect and resolve a hull contact with `other`
    ///
    /// Returns false when the hulls do not touch. On contact both craft get
    /// equal and opposite impulses (only while closing) and are nudged and
    /// spun apart.
    pub fn collide(&mut self, other: &mut Craft) -> bool {
        let Some((point, normal)) = self.contact(other) else {
            return false;
        };

        let v1 = self.point_velocity(point);
        let v2 = other.point_velocity(point);
        let rel = v1 - v2;

        let r1 = (point - (self.state.pos + self.delta.pos)).cross(normal);
        let r2 = (point - (other.state.pos + other.delta.pos)).cross(normal);
        let j = -(1.0 + CRAFT_RESTITUTION) * rel.dot(normal)
            / (1.0 / self.mass
                + 1.0 / other.mass
                + r1 * r1 / self.inertia
                + r2 * r2 / other.inertia);
        let impulse = j * normal;

        // `normal` points back at this craft, so closing means `rel . normal < 0`
        if j > 0.0 {
            self.add_impulse(impulse, point);
            other.add_impulse(-impulse, point);
        }
        log::trace!("Craft contact at {point:?}, normal {normal:?}, impulse {j:.3}");

        // Nudge each craft along its own velocity line, away from the other
        let mut away = self.velocity.pos.unit();
        if (other.state.pos - self.state.pos).unit().dot(away) > 0.0 {
            away = -away;
        }
        self.state.pos += away * SEPARATION;

        let mut away = other.velocity.pos.unit();
        if (self.state.pos - other.state.pos).unit().dot(away) > 0.0 {
            away = -away;
        }
        other.state.pos += away * SEPARATION;

        let arm1 = (point - self.state.pos).rotated(self.velocity.angle);
        let arm2 = (point - other.state.pos).rotated(other.velocity.angle);
        let sign = if arm1.dot(arm2) > 0.0 { -1.0 } else { 1.0 };
        for craft in [&mut *self, &mut *other] {
            let spin = if craft.velocity.angle > 0.0 { sign } else { -sign };
            craft.state.angle += spin * SPIN_KICK;
        }

        true
    }

    /// Detect and resolve contact between the trial ellipse and the track
    pub fn level_collide(&mut self, track: &TrackProfile) -> bool {
        let Some(contact) = track.ellipse_intersect(
            self.state.pos + self.delta.pos,
            self.state.angle + self.delta.angle,
            self.major_axis,
            self.minor_axis,
        ) else {
            return false;
        };

        self.state.pos -= LEVEL_PUSH_OUT * contact.delta;

        let r = contact.point - (self.state.pos + self.delta.pos);
        let v = self.point_velocity(contact.point);
        let rn = r.cross(contact.normal);
        let j = -(1.0 + LEVEL_RESTITUTION) * v.dot(contact.normal)
            / (1.0 / self.mass + rn * rn / self.inertia);

        self.add_impulse(j * contact.normal, contact.point);
        log::trace!("Track contact at {:?}, impulse {j:.3}", contact.point);
        true
    }
}
