use crate::{
    config::{DISTANCE_EPSILON, WorldParams},
    types::{Bounds, Rgb, Vec2},
};

use super::{Entity, Explosion, TickContext, body_pair_mut, collision, fragment};

#[derive(Clone, Debug)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    pub(crate) mass: f64,
    radius: f64,
    pub(crate) destroyed: bool,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, mass: f64, color: Rgb, params: &WorldParams) -> Self {
        let mut body = Self {
            pos,
            vel,
            color,
            mass,
            radius: 0.0,
            destroyed: false,
        };
        body.recompute_radius(params);
        body
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn speed(&self) -> f64 {
        self.vel.length()
    }

    /// Must follow every write to `mass`.
    pub fn recompute_radius(&mut self, params: &WorldParams) {
        self.radius = params.raw_radius(self.mass).max(params.min_radius);
    }

    pub fn is_overloaded(&self, params: &WorldParams) -> bool {
        self.mass.abs() > params.max_element_weight
    }

    /// Adds the pull of one other body to the velocity.
    pub fn accelerate_towards(&mut self, other_pos: Vec2, other_mass: f64, params: &WorldParams) {
        let delta = other_pos - self.pos;
        let mut distance = delta.length();
        if distance == 0.0 {
            distance = DISTANCE_EPSILON;
        }
        let scaled = distance / params.meter;
        let force = params.g * other_mass * self.mass / (scaled * scaled);
        let accel = force / self.mass;
        self.vel += delta * (accel / distance);
    }

    pub fn clamp_speed(&mut self, max_speed: f64) {
        let speed = self.speed();
        if speed > max_speed {
            self.vel = self.vel * (max_speed / speed);
        }
    }

    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    /// Bounces off the walls of `bounds`. Any hit halves the whole velocity,
    /// once per call.
    pub fn reflect(&mut self, bounds: Bounds) -> bool {
        let radius = self.radius;
        let hit_x = reflect_axis(&mut self.pos.x, &mut self.vel.x, radius, bounds.width);
        let hit_y = reflect_axis(&mut self.pos.y, &mut self.vel.y, radius, bounds.height);
        let hit = hit_x || hit_y;
        if hit {
            self.vel = self.vel * 0.5;
        }
        hit
    }

    /// Marks the body destroyed and leaves an explosion in its place.
    pub(crate) fn destroy(&mut self, ctx: &mut TickContext<'_>) {
        debug_assert!(!self.destroyed, "body destroyed twice");
        self.destroyed = true;
        ctx.spawn(Explosion::new(self.pos, self.radius).into());
    }
}

fn reflect_axis(pos: &mut f64, vel: &mut f64, radius: f64, extent: f64) -> bool {
    let below = *pos - radius < 0.0;
    if !below && *pos + radius <= extent {
        return false;
    }
    *vel = -*vel;
    *pos = if below { radius } else { extent - radius };
    true
}

/// One tick of the body stored at `idx`: pairwise gravity and collisions
/// against every other live body, then clamp, integrate, bounce and the
/// overload check.
pub(crate) fn update(entities: &mut [Entity], idx: usize, ctx: &mut TickContext<'_>) {
    for other_idx in 0..entities.len() {
        let other = &entities[other_idx];
        if !other.is_gravitating() || other.is_destroyed() {
            continue;
        }
        let Some((this, other)) = body_pair_mut(entities, idx, other_idx) else {
            continue;
        };
        this.accelerate_towards(other.pos, other.mass, ctx.params);
        collision::resolve(idx, this, other_idx, other, ctx);
        if this.is_destroyed() {
            return;
        }
    }

    let Some(Entity::Body(this)) = entities.get_mut(idx) else {
        return;
    };
    this.clamp_speed(ctx.params.max_element_speed);
    this.integrate();
    this.reflect(ctx.bounds);
    if this.is_overloaded(ctx.params) {
        fragment::blow_up(this, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;
    use rand::{SeedableRng, rngs::StdRng};

    fn make(pos: Vec2, vel: Vec2, mass: f64) -> Body {
        Body::new(pos, vel, mass, Rgb::new(100, 100, 100), &WorldParams::default())
    }

    mod radius {
        use super::*;

        #[test]
        fn follows_area_law() {
            let body = make(Vec2::ZERO, Vec2::ZERO, 100_000.0);
            let expected = (1_000.0 / std::f64::consts::PI).sqrt();
            assert!((body.radius() - expected).abs() < 1e-9);
        }

        #[test]
        fn is_floored_at_minimum() {
            let body = make(Vec2::ZERO, Vec2::ZERO, 10.0);
            assert_eq!(body.radius(), 3.0);
        }

        #[test]
        fn negative_mass_uses_magnitude() {
            let body = make(Vec2::ZERO, Vec2::ZERO, -100_000.0);
            let positive = make(Vec2::ZERO, Vec2::ZERO, 100_000.0);
            assert_eq!(body.radius(), positive.radius());
        }

        #[test]
        fn recompute_follows_mass_change() {
            let params = WorldParams::default();
            let mut body = make(Vec2::ZERO, Vec2::ZERO, 10_000.0);
            let before = body.radius();
            body.mass = 40_000.0;
            body.recompute_radius(&params);
            assert!((body.radius() - 2.0 * before).abs() < 1e-9);
        }
    }

    mod accelerate_towards {
        use super::*;

        #[test]
        fn pulls_towards_other_body() {
            let params = WorldParams::default();
            let mut body = make(Vec2::new(0.0, 0.0), Vec2::ZERO, 1_000.0);
            body.accelerate_towards(Vec2::new(100.0, 0.0), 100_000.0, &params);
            // G * 1e5 / (0.1)^2
            let expected = 6.67e-11 * 100_000.0 / 0.01;
            assert!((body.vel.x - expected).abs() < 1e-15);
            assert_eq!(body.vel.y, 0.0);
        }

        #[test]
        fn acceleration_is_independent_of_own_mass() {
            let params = WorldParams::default();
            let mut light = make(Vec2::ZERO, Vec2::ZERO, 10.0);
            let mut heavy = make(Vec2::ZERO, Vec2::ZERO, 150_000.0);
            light.accelerate_towards(Vec2::new(30.0, 40.0), 50_000.0, &params);
            heavy.accelerate_towards(Vec2::new(30.0, 40.0), 50_000.0, &params);
            assert!((light.vel.x - heavy.vel.x).abs() < 1e-12);
            assert!((light.vel.y - heavy.vel.y).abs() < 1e-12);
        }

        #[test]
        fn coincident_bodies_stay_finite() {
            let params = WorldParams::default();
            let mut body = make(Vec2::new(5.0, 5.0), Vec2::new(1.0, 1.0), 1_000.0);
            body.accelerate_towards(Vec2::new(5.0, 5.0), 1_000.0, &params);
            assert_eq!(body.vel, Vec2::new(1.0, 1.0));
        }
    }

    mod clamp_speed {
        use super::*;

        #[test]
        fn scales_down_to_exact_max() {
            let mut body = make(Vec2::ZERO, Vec2::new(30.0, 40.0), 1_000.0);
            body.clamp_speed(30.0);
            assert!((body.speed() - 30.0).abs() < 1e-12);
            assert!((body.vel.x / body.vel.y - 0.75).abs() < 1e-12);
        }

        #[test]
        fn leaves_slow_bodies_alone() {
            let mut body = make(Vec2::ZERO, Vec2::new(3.0, 4.0), 1_000.0);
            body.clamp_speed(30.0);
            assert_eq!(body.vel, Vec2::new(3.0, 4.0));
        }
    }

    mod reflect {
        use super::*;

        #[test]
        fn bounces_off_left_wall() {
            let mut body = make(Vec2::new(1.0, 50.0), Vec2::new(-4.0, 2.0), 10.0);
            assert!(body.reflect(Bounds::new(100.0, 100.0)));
            assert_eq!(body.pos, Vec2::new(3.0, 50.0));
            assert_eq!(body.vel, Vec2::new(2.0, 1.0));
        }

        #[test]
        fn corner_hit_halves_only_once() {
            let mut body = make(Vec2::new(99.0, 99.0), Vec2::new(4.0, 8.0), 10.0);
            assert!(body.reflect(Bounds::new(100.0, 100.0)));
            assert_eq!(body.pos, Vec2::new(97.0, 97.0));
            assert_eq!(body.vel, Vec2::new(-2.0, -4.0));
        }

        #[test]
        fn inside_body_is_untouched() {
            let mut body = make(Vec2::new(50.0, 50.0), Vec2::new(4.0, 8.0), 10.0);
            assert!(!body.reflect(Bounds::new(100.0, 100.0)));
            assert_eq!(body.vel, Vec2::new(4.0, 8.0));
        }
    }

    mod update_fn {
        use super::*;

        fn run(entities: &mut Vec<Entity>, idx: usize, rng: &mut StdRng) -> Vec<Entity> {
            let params = WorldParams::default();
            let mut pending = Vec::new();
            let mut events: Vec<Event> = Vec::new();
            let mut ctx = TickContext {
                params: &params,
                bounds: Bounds::new(1_000.0, 1_000.0),
                pending: &mut pending,
                rng,
                events: &mut events,
            };
            update(entities, idx, &mut ctx);
            pending
        }

        #[test]
        fn lone_body_moves_by_its_velocity() {
            let mut rng = StdRng::seed_from_u64(1);
            let mut entities: Vec<Entity> =
                vec![make(Vec2::new(100.0, 100.0), Vec2::new(2.0, -1.0), 1_000.0).into()];
            let pending = run(&mut entities, 0, &mut rng);
            assert!(pending.is_empty());
            let body = entities[0].as_body().unwrap();
            assert_eq!(body.pos, Vec2::new(102.0, 99.0));
        }

        #[test]
        fn ignores_explosions_and_destroyed_bodies() {
            let mut rng = StdRng::seed_from_u64(1);
            let mut ghost = make(Vec2::new(101.0, 100.0), Vec2::ZERO, 150_000.0);
            ghost.destroyed = true;
            let mut entities: Vec<Entity> = vec![
                make(Vec2::new(100.0, 100.0), Vec2::ZERO, 1_000.0).into(),
                Explosion::new(Vec2::new(100.0, 100.0), 10.0).into(),
                ghost.into(),
            ];
            run(&mut entities, 0, &mut rng);
            let body = entities[0].as_body().unwrap();
            assert_eq!(body.pos, Vec2::new(100.0, 100.0));
            assert_eq!(body.vel, Vec2::ZERO);
        }

        #[test]
        fn overloaded_body_blows_up() {
            let mut rng = StdRng::seed_from_u64(5);
            let mut entities: Vec<Entity> =
                vec![make(Vec2::new(500.0, 500.0), Vec2::ZERO, 250_000.0).into()];
            let pending = run(&mut entities, 0, &mut rng);
            assert!(entities[0].is_destroyed());
            let explosions = pending.iter().filter(|e| e.as_explosion().is_some()).count();
            assert_eq!(explosions, 1);
            assert!(pending.len() >= 1 + 6);
        }

        #[test]
        fn speed_is_clamped_before_integration() {
            let mut rng = StdRng::seed_from_u64(1);
            let mut entities: Vec<Entity> =
                vec![make(Vec2::new(500.0, 500.0), Vec2::new(300.0, 400.0), 1_000.0).into()];
            run(&mut entities, 0, &mut rng);
            let body = entities[0].as_body().unwrap();
            assert!((body.pos.x - 518.0).abs() < 1e-9);
            assert!((body.pos.y - 524.0).abs() < 1e-9);
        }
    }
}
