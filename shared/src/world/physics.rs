use std::time::Duration;

use log::{trace, warn};

use crate::{cbrt, sqrt, Body, BodyId, Float, InputEvent, InputKind, Vec2, World};

// 4π with 32 fractional bits
const FOUR_PI: Float = Float::from_bits(0xC_90FD_AA22);

/// Constants of the simulated universe. Both peers must run with identical
/// values or they will diverge on the first tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhysicsConfig {
    /// Fixed ticks per simulated second; the timestep is `1 / tick_rate_hz`
    pub tick_rate_hz: u32,
    /// Gravitational constant
    pub gravity: Float,
    /// Mass per unit volume, used to derive a body's radius from its mass
    pub density: Float,
    /// Added to squared distances so close encounters stay finite
    pub softening: Float,
    /// Velocity given to an impulse body per unit of drag distance
    pub impulse_scale: Float,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            gravity: Float::from_num(1),
            density: Float::from_num(1),
            softening: Float::from_num(0.15),
            impulse_scale: Float::from_num(0.6),
        }
    }
}

impl PhysicsConfig {
    fn tick_rate(&self) -> u32 {
        self.tick_rate_hz.max(1)
    }

    /// Simulated seconds per tick
    pub fn timestep(&self) -> Float {
        Float::from_num(1) / Float::from_num(self.tick_rate())
    }

    /// Wall-clock time per tick
    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.tick_rate()))
    }

    /// `cbrt(3 m / (4 π ρ))`
    pub fn radius_for_mass(&self, mass: Float) -> Float {
        let denominator = FOUR_PI.saturating_mul(self.density);
        if denominator <= Float::ZERO || mass <= Float::ZERO {
            return Float::ZERO;
        }
        let volume = mass.saturating_mul(Float::from_num(3)).saturating_div(denominator);
        cbrt(volume)
    }
}

/// What happened during one tick
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Bodies created by inputs, in application order
    pub spawned: Vec<BodyId>,
    /// Inputs refused because they could not be applied
    pub rejected: usize,
    /// `(survivor, absorbed)` pairs, in resolution order
    pub merged: Vec<(BodyId, BodyId)>,
}

impl World {
    /// A heavy sun at the origin with two light bodies circling it in
    /// opposite directions
    pub fn solar_system(config: &PhysicsConfig) -> Self {
        let mut world = World::new();
        let bodies = [
            (Vec2::ZERO, Vec2::ZERO, 10_000),
            (
                Vec2::new(Float::ZERO, Float::from_num(-100)),
                Vec2::new(Float::from_num(3), Float::ZERO),
                10,
            ),
            (
                Vec2::new(Float::ZERO, Float::from_num(100)),
                Vec2::new(Float::from_num(-3), Float::ZERO),
                10,
            ),
        ];
        for (position, velocity, mass) in bodies {
            let mass = Float::from_num(mass);
            world.spawn(position, velocity, mass, config.radius_for_mass(mass));
        }
        world
    }

    /// Advances the world by one fixed timestep.
    ///
    /// `inputs` must already be in `(frame, origin, sequence)` order. The
    /// result depends only on the world, the inputs and `config`, so peers
    /// that agree on all three compute bit-identical worlds.
    pub fn step(&mut self, config: &PhysicsConfig, inputs: &[InputEvent]) -> StepReport {
        let mut report = StepReport::default();

        for input in inputs {
            self.apply_input(config, input, &mut report);
        }

        self.integrate(config);
        self.resolve_collisions(&mut report);

        report
    }

    fn apply_input(&mut self, config: &PhysicsConfig, input: &InputEvent, report: &mut StepReport) {
        if let Err(error) = input.kind().validate() {
            warn!("Rejecting input {:?}: {}", input.key(), error);
            report.rejected += 1;
            return;
        }

        let (position, velocity, mass) = match *input.kind() {
            InputKind::Spawn { position, mass } => (position, Vec2::ZERO, mass),
            InputKind::Impulse {
                position,
                mass,
                target,
            } => (position, (target - position) * config.impulse_scale, mass),
        };

        let radius = config.radius_for_mass(mass);
        match self.spawn(position, velocity, mass, radius) {
            Some(id) => report.spawned.push(id),
            None => {
                warn!("Rejecting input {:?}: no free body id", input.key());
                report.rejected += 1;
            }
        }
    }

    // Semi-implicit Euler: velocities first, then positions from the new
    // velocities.
    fn integrate(&mut self, config: &PhysicsConfig) {
        let bodies: Vec<_> = self.iter().copied().collect();

        let accelerations: Vec<Vec2> = bodies
            .iter()
            .map(|body| {
                let mut acceleration = Vec2::ZERO;
                for other in &bodies {
                    if other.id == body.id {
                        continue;
                    }
                    let offset = other.position - body.position;
                    let softened = offset.length_squared().saturating_add(config.softening);
                    let denominator = softened.saturating_mul(sqrt(softened));
                    if denominator <= Float::ZERO {
                        continue;
                    }
                    let strength = config
                        .gravity
                        .saturating_mul(other.mass)
                        .saturating_div(denominator);
                    acceleration += offset * strength;
                }
                acceleration
            })
            .collect();

        let dt = config.timestep();
        for (body, acceleration) in bodies.iter().zip(accelerations) {
            if let Some(live) = self.get_mut(body.id) {
                live.velocity += acceleration * dt;
                live.position += live.velocity * dt;
            }
        }
    }

    fn resolve_collisions(&mut self, report: &mut StepReport) {
        let ids = self.ids();
        for (index, &first) in ids.iter().enumerate() {
            for &second in &ids[index + 1..] {
                let (Some(survivor), Some(absorbed)) = (self.get(first), self.get(second)) else {
                    continue;
                };
                if !survivor.overlaps(absorbed) {
                    continue;
                }
                let absorbed = *absorbed;
                if let Some(survivor) = self.get_mut(first) {
                    merge(survivor, &absorbed);
                }
                self.remove(second);
                trace!("Body {} absorbed body {}", first, second);
                report.merged.push((first, second));
            }
        }
    }
}

// Mass adds, the centre of mass and momentum are kept, and so is volume.
fn merge(survivor: &mut Body, absorbed: &Body) {
    let total = survivor.mass.saturating_add(absorbed.mass);
    let share = if total > Float::ZERO {
        absorbed.mass.saturating_div(total)
    } else {
        Float::ZERO
    };

    survivor.position += (absorbed.position - survivor.position) * share;
    survivor.velocity += (absorbed.velocity - survivor.velocity) * share;
    survivor.mass = total;

    let cube = |r: Float| r.saturating_mul(r).saturating_mul(r);
    survivor.radius = cbrt(cube(survivor.radius).saturating_add(cube(absorbed.radius)));
}
