use crate::{
    config::{COLOR_BLEND_MIN_RATIO, WorldParams},
    types::{EntityIndex, Event},
};

use super::{Body, TickContext, fragment};

/// Handles contact between `this` and `other`. Only the heavier side of a
/// pair acts; with equal masses whichever body updates first wins.
pub(crate) fn resolve(
    this_idx: EntityIndex,
    this: &mut Body,
    other_idx: EntityIndex,
    other: &mut Body,
    ctx: &mut TickContext<'_>,
) {
    if this.mass < other.mass {
        return;
    }
    let gap = this.pos.distance(other.pos) - this.radius() - other.radius();
    if gap >= 0.0 {
        return;
    }

    let rel_speed = (this.vel - other.vel).length();
    if rel_speed > ctx.params.shatter_speed() {
        ctx.events.push(Event::Shatter {
            a: this_idx,
            b: other_idx,
            rel_speed,
        });
        fragment::blow_up(this, ctx);
        fragment::blow_up(other, ctx);
    } else {
        consume(this, other, ctx.params);
        other.destroy(ctx);
        ctx.events.push(Event::Merge {
            survivor: this_idx,
            consumed: other_idx,
            mass: this.mass,
        });
    }
}

/// Absorbs `prey` into `survivor`: summed mass, a colour tint when the prey
/// is not negligible, and a velocity blend weighted by the prey's share of
/// the new mass. The blend is not momentum-conserving.
pub fn consume(survivor: &mut Body, prey: &Body, params: &WorldParams) {
    let ratio = prey.mass / survivor.mass;
    survivor.mass += prey.mass;
    survivor.recompute_radius(params);

    if ratio > COLOR_BLEND_MIN_RATIO {
        survivor.color = survivor.color.blend(prey.color, ratio);
    }

    let share = prey.mass / survivor.mass;
    survivor.vel = prey.vel * share + survivor.vel * (1.0 - share);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::Entity,
        types::{Bounds, Rgb, Vec2},
    };
    use rand::{SeedableRng, rngs::StdRng};

    fn make(pos: Vec2, vel: Vec2, mass: f64, color: Rgb) -> Body {
        Body::new(pos, vel, mass, color, &WorldParams::default())
    }

    struct Outcome {
        pending: Vec<Entity>,
        events: Vec<Event>,
    }

    fn collide(this: &mut Body, other: &mut Body) -> Outcome {
        let params = WorldParams::default();
        let mut rng = StdRng::seed_from_u64(77);
        let mut pending = Vec::new();
        let mut events = Vec::new();
        let mut ctx = TickContext {
            params: &params,
            bounds: Bounds::new(1_000.0, 1_000.0),
            pending: &mut pending,
            rng: &mut rng,
            events: &mut events,
        };
        resolve(0, this, 1, other, &mut ctx);
        Outcome { pending, events }
    }

    mod consume_fn {
        use super::*;

        #[test]
        fn mass_is_summed_exactly() {
            let params = WorldParams::default();
            let mut big = make(Vec2::ZERO, Vec2::ZERO, 100_000.0, Rgb::new(50, 50, 50));
            let small = make(Vec2::ZERO, Vec2::ZERO, 5_000.0, Rgb::new(50, 50, 50));
            consume(&mut big, &small, &params);
            assert_eq!(big.mass(), 105_000.0);
            assert_eq!(big.radius(), params.raw_radius(105_000.0));
        }

        #[test]
        fn negligible_prey_keeps_colour() {
            let params = WorldParams::default();
            let mut big = make(Vec2::ZERO, Vec2::ZERO, 100_000.0, Rgb::new(50, 50, 50));
            let small = make(Vec2::ZERO, Vec2::ZERO, 5_000.0, Rgb::new(250, 250, 250));
            consume(&mut big, &small, &params);
            assert_eq!(big.color, Rgb::new(50, 50, 50));
        }

        #[test]
        fn sizeable_prey_tints_colour() {
            let params = WorldParams::default();
            let mut big = make(Vec2::ZERO, Vec2::ZERO, 100_000.0, Rgb::new(100, 100, 100));
            let small = make(Vec2::ZERO, Vec2::ZERO, 50_000.0, Rgb::new(200, 20, 100));
            consume(&mut big, &small, &params);
            assert_eq!(big.color, Rgb::new(150, 60, 100));
        }

        #[test]
        fn velocity_blend_uses_post_merge_share() {
            let params = WorldParams::default();
            let mut big = make(Vec2::ZERO, Vec2::new(3.0, 0.0), 100_000.0, Rgb::new(50, 50, 50));
            let small = make(Vec2::ZERO, Vec2::new(0.0, 6.0), 50_000.0, Rgb::new(50, 50, 50));
            consume(&mut big, &small, &params);
            let share = 50_000.0 / 150_000.0;
            assert!((big.vel.x - 3.0 * (1.0 - share)).abs() < 1e-12);
            assert!((big.vel.y - 6.0 * share).abs() < 1e-12);
        }
    }

    mod resolve_fn {
        use super::*;

        #[test]
        fn slow_overlap_merges_into_heavier() {
            let mut big = make(
                Vec2::new(100.0, 100.0),
                Vec2::new(1.0, 0.0),
                100_000.0,
                Rgb::new(80, 80, 80),
            );
            let mut small = make(
                Vec2::new(110.0, 100.0),
                Vec2::new(-1.0, 0.0),
                5_000.0,
                Rgb::new(80, 80, 80),
            );
            let out = collide(&mut big, &mut small);
            assert!(!big.is_destroyed());
            assert!(small.is_destroyed());
            assert_eq!(big.mass(), 105_000.0);
            assert_eq!(out.pending.len(), 1);
            let explosion = out.pending[0].as_explosion().unwrap();
            assert_eq!(explosion.pos, Vec2::new(110.0, 100.0));
            assert!(matches!(out.events[0], Event::Merge { survivor: 0, consumed: 1, .. }));
        }

        #[test]
        fn lighter_side_does_nothing() {
            let mut small = make(Vec2::new(100.0, 100.0), Vec2::ZERO, 5_000.0, Rgb::new(80, 80, 80));
            let mut big = make(Vec2::new(105.0, 100.0), Vec2::ZERO, 100_000.0, Rgb::new(80, 80, 80));
            let out = collide(&mut small, &mut big);
            assert!(out.pending.is_empty());
            assert!(!small.is_destroyed());
            assert!(!big.is_destroyed());
        }

        #[test]
        fn separated_bodies_do_nothing() {
            let mut a = make(Vec2::new(100.0, 100.0), Vec2::ZERO, 10_000.0, Rgb::new(80, 80, 80));
            let mut b = make(Vec2::new(200.0, 100.0), Vec2::ZERO, 10_000.0, Rgb::new(80, 80, 80));
            let out = collide(&mut a, &mut b);
            assert!(out.pending.is_empty());
            assert!(out.events.is_empty());
        }

        #[test]
        fn fast_overlap_destroys_both() {
            let mut a = make(
                Vec2::new(100.0, 100.0),
                Vec2::new(15.0, 0.0),
                20_000.0,
                Rgb::new(80, 80, 80),
            );
            let mut b = make(
                Vec2::new(105.0, 100.0),
                Vec2::new(-15.0, 0.0),
                20_000.0,
                Rgb::new(80, 80, 80),
            );
            let out = collide(&mut a, &mut b);
            assert!(a.is_destroyed());
            assert!(b.is_destroyed());
            assert_eq!(out.pending.len(), 2);
            assert!(out.pending.iter().all(|e| e.as_explosion().is_some()));
            assert!(matches!(out.events[0], Event::Shatter { .. }));
        }

        #[test]
        fn relative_speed_at_threshold_still_merges() {
            let mut a = make(
                Vec2::new(100.0, 100.0),
                Vec2::new(12.0, 0.0),
                20_000.0,
                Rgb::new(80, 80, 80),
            );
            let mut b = make(
                Vec2::new(105.0, 100.0),
                Vec2::new(-12.0, 0.0),
                10_000.0,
                Rgb::new(80, 80, 80),
            );
            collide(&mut a, &mut b);
            assert!(!a.is_destroyed());
            assert!(b.is_destroyed());
            assert_eq!(a.mass(), 30_000.0);
        }
    }
}
