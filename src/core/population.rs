use rand::Rng;

use crate::{
    config::{
        CLICK_MAX_RATIO, CLICK_MIN_RATIO, CORNER_BOTTOM_RIGHT_MAX_RATIO,
        CORNER_TOP_LEFT_MAX_RATIO, SEED_MARGIN, SEED_MAX_RATIO, SEED_MIN_RATIO, WorldParams,
    },
    types::{Bounds, Event, Rgb, Vec2},
};

use super::{Body, TickContext, random_int};

/// Most entities the world tops itself up to, by area and hard cap.
pub fn capacity(bounds: Bounds, params: &WorldParams) -> usize {
    let by_area = (bounds.area() / params.pixel_ratio / params.area_per_element)
        .trunc()
        .max(0.0) as usize;
    by_area.min(params.max_count_of_elements)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 2] = [Corner::TopLeft, Corner::BottomRight];

    fn max_ratio(self) -> f64 {
        match self {
            Corner::TopLeft => CORNER_TOP_LEFT_MAX_RATIO,
            Corner::BottomRight => CORNER_BOTTOM_RIGHT_MAX_RATIO,
        }
    }

    /// Sign of the inward direction on both axes.
    pub fn heading(self) -> f64 {
        match self {
            Corner::TopLeft => 1.0,
            Corner::BottomRight => -1.0,
        }
    }

    /// Spawn point for a body of `radius`, one diameter in from the corner.
    pub fn anchor(self, radius: f64, bounds: Bounds) -> Vec2 {
        match self {
            Corner::TopLeft => Vec2::new(2.0 * radius, 2.0 * radius),
            Corner::BottomRight => {
                Vec2::new(bounds.width - 2.0 * radius, bounds.height - 2.0 * radius)
            }
        }
    }
}

/// Rolls each corner independently and queues a drifting body on success.
pub(crate) fn inject(ctx: &mut TickContext<'_>) -> usize {
    let params = ctx.params;
    let odds = params.spawn_odds();
    let max = params.max_element_weight;
    let mut spawned = 0;
    for corner in Corner::ALL {
        if ctx.rng.gen_range(0..odds) != 0 {
            continue;
        }
        let mass = random_int(ctx.rng, max * SEED_MIN_RATIO, max * corner.max_ratio()) as f64;
        let pos = corner.anchor(params.raw_radius(mass), ctx.bounds);
        let vel = Vec2::new(
            corner.heading() * random_int(ctx.rng, 0.0, 1.0) as f64,
            corner.heading() * random_int(ctx.rng, 0.0, 1.0) as f64,
        );
        let color = Rgb::random(ctx.rng);
        ctx.spawn(Body::new(pos, vel, mass, color, params).into());
        ctx.events.push(Event::Spawn { pos, mass });
        spawned += 1;
    }
    spawned
}

/// Queues up to `capacity / 2` bodies scattered over the world. Stops at the
/// first body whose margin no longer fits the shorter side.
pub(crate) fn seed(ctx: &mut TickContext<'_>, capacity: usize) -> usize {
    let params = ctx.params;
    let max = params.max_element_weight;
    let bounds = ctx.bounds;
    let shortest = bounds.width.min(bounds.height);
    let count = capacity / 2;

    for seeded in 0..count {
        let mass = random_int(ctx.rng, max * SEED_MIN_RATIO, max * SEED_MAX_RATIO) as f64;
        let margin = 2.0 * params.raw_radius(mass) + SEED_MARGIN;
        if shortest < margin {
            return seeded;
        }
        let pos = Vec2::new(
            random_int(ctx.rng, margin, bounds.width - margin) as f64,
            random_int(ctx.rng, margin, bounds.height - margin) as f64,
        );
        let vel = Vec2::new(
            random_int(ctx.rng, -1.0, 1.0) as f64,
            random_int(ctx.rng, -1.0, 1.0) as f64,
        );
        let color = Rgb::random(ctx.rng);
        ctx.spawn(Body::new(pos, vel, mass, color, params).into());
    }
    count
}

/// A resting body of random colour and sizeable mass at `pos`.
pub(crate) fn click_body(pos: Vec2, ctx: &mut TickContext<'_>) -> Body {
    let params = ctx.params;
    let max = params.max_element_weight;
    let mass = random_int(
        ctx.rng,
        (max * CLICK_MIN_RATIO).trunc(),
        (max * CLICK_MAX_RATIO).trunc(),
    ) as f64;
    let color = Rgb::random(ctx.rng);
    Body::new(pos, Vec2::ZERO, mass, color, params)
}
