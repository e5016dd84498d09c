use tracing::trace;

use crate::{
    config::{
        FRAGMENT_COUNT_MAX_FACTOR, FRAGMENT_COUNT_MIN, FRAGMENT_COUNT_MIN_FACTOR,
        FRAGMENT_MIN_WEIGHT_RATIO, FRAGMENT_SPEED_RATIO, WorldParams,
    },
    types::{Event, Rgb, Vec2},
};

use super::{Body, TickContext, random_int};

/// Inclusive bounds for the number of fragments a body of `mass` splits
/// into, before rounding.
pub fn fragment_count_window(mass: f64, params: &WorldParams) -> (f64, f64) {
    let ratio = mass / params.max_element_weight;
    (
        (ratio * FRAGMENT_COUNT_MIN_FACTOR).trunc(),
        (ratio * FRAGMENT_COUNT_MAX_FACTOR).trunc(),
    )
}

/// Destroys `body` and scatters its mass into randomly sized fragments
/// flying outward from its centre. Returns the number of fragments queued;
/// too few parts or too light parts leave only the explosion.
pub(crate) fn blow_up(body: &mut Body, ctx: &mut TickContext<'_>) -> usize {
    body.destroy(ctx);

    let params = ctx.params;
    let (lo, hi) = fragment_count_window(body.mass, params);
    let parts = random_int(ctx.rng, lo, hi);
    if parts < FRAGMENT_COUNT_MIN {
        trace!(mass = body.mass, parts, "too few fragments, nothing scattered");
        return 0;
    }

    let max_weight = (body.mass / parts as f64).trunc();
    if max_weight < params.max_element_weight * FRAGMENT_MIN_WEIGHT_RATIO {
        trace!(mass = body.mass, max_weight, "fragments too light, nothing scattered");
        return 0;
    }

    let reach = body.radius().trunc();
    let speed = params.max_element_speed * FRAGMENT_SPEED_RATIO;
    for _ in 0..parts {
        let mut pos = Vec2::new(
            body.pos.x - random_int(ctx.rng, -reach, reach) as f64,
            body.pos.y - random_int(ctx.rng, -reach, reach) as f64,
        );
        // Push one axis towards the rim so fragments don't bunch up.
        let rim = body.radius() * (random_int(ctx.rng, 0.0, 1.0) - 1) as f64;
        if random_int(ctx.rng, 0.0, 1.0) == 0 {
            pos.x += rim;
        } else {
            pos.y += rim;
        }

        // A fragment landing on the centre stays put.
        let vel = (pos - body.pos).normalize() * speed;
        let mass = random_int(ctx.rng, 1.0, max_weight) as f64;
        let color = Rgb::random(ctx.rng);
        ctx.spawn(Body::new(pos, vel, mass, color, params).into());
    }

    ctx.events.push(Event::Fragment {
        pos: body.pos,
        mass: body.mass,
        parts: parts as usize,
    });
    parts as usize
}
