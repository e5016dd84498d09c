mod body;
mod collision;
mod explosion;
mod fragment;
mod population;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::{
    config::{
        COMPACT_DESTROYED_RATIO, COMPACT_MIN_LEN, ConfigError, EXPLOSION_COLOR, WorldParams,
    },
    render::Renderer,
    types::{Bounds, Event, Vec2, WorldStats},
};

pub use body::Body;
pub use collision::consume;
pub use explosion::Explosion;
pub use fragment::fragment_count_window;
pub use population::{Corner, capacity};

/// Everything a live entity may touch during its update besides the arena
/// itself.
pub struct TickContext<'a> {
    pub params: &'a WorldParams,
    pub bounds: Bounds,
    pub pending: &'a mut Vec<Entity>,
    pub rng: &'a mut StdRng,
    pub events: &'a mut Vec<Event>,
}

impl TickContext<'_> {
    /// Stages an entity; it joins the arena after the current pass.
    pub fn spawn(&mut self, entity: Entity) {
        self.pending.push(entity);
    }
}

#[derive(Clone, Debug)]
pub enum Entity {
    Body(Body),
    Explosion(Explosion),
}

impl Entity {
    pub fn is_gravitating(&self) -> bool {
        matches!(self, Entity::Body(_))
    }

    pub fn is_destroyed(&self) -> bool {
        match self {
            Entity::Body(body) => body.is_destroyed(),
            Entity::Explosion(explosion) => explosion.is_destroyed(),
        }
    }

    pub fn as_body(&self) -> Option<&Body> {
        match self {
            Entity::Body(body) => Some(body),
            Entity::Explosion(_) => None,
        }
    }

    pub fn as_explosion(&self) -> Option<&Explosion> {
        match self {
            Entity::Explosion(explosion) => Some(explosion),
            Entity::Body(_) => None,
        }
    }
}

impl From<Body> for Entity {
    fn from(body: Body) -> Self {
        Entity::Body(body)
    }
}

impl From<Explosion> for Entity {
    fn from(explosion: Explosion) -> Self {
        Entity::Explosion(explosion)
    }
}

/// Uniform integer on `[ceil(min), floor(max)]`; a collapsed or inverted
/// range yields `ceil(min)`.
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> i64 {
    let lo = min.ceil() as i64;
    let hi = max.floor() as i64;
    if hi <= lo {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

/// Mutable access to two distinct bodies of the arena. `None` when the
/// indices coincide or either slot holds a non-gravitating entity.
pub(crate) fn body_pair_mut(
    entities: &mut [Entity],
    a: usize,
    b: usize,
) -> Option<(&mut Body, &mut Body)> {
    if a == b || a >= entities.len() || b >= entities.len() {
        return None;
    }
    let (first, second) = if a < b {
        let (left, right) = entities.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = entities.split_at_mut(a);
        (&mut right[0], &mut left[b])
    };
    match (first, second) {
        (Entity::Body(x), Entity::Body(y)) => Some((x, y)),
        _ => None,
    }
}

pub struct World {
    params: WorldParams,
    bounds: Bounds,
    capacity: usize,
    entities: Vec<Entity>,
    pending: Vec<Entity>,
    /// Rings that faded out during the last tick; drawn one final time.
    fading: Vec<Explosion>,
    events: Vec<Event>,
    rng: StdRng,
    tick: u64,
}

impl World {
    pub fn new(params: WorldParams, bounds: Bounds) -> Result<Self, ConfigError> {
        params.validate()?;
        let rng = match params.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let capacity = population::capacity(bounds, &params);
        info!(
            width = bounds.width,
            height = bounds.height,
            capacity,
            seed = ?params.rng_seed,
            "world created"
        );
        Ok(Self {
            params,
            bounds,
            capacity,
            entities: Vec::new(),
            pending: Vec::new(),
            fading: Vec::new(),
            events: Vec::new(),
            rng,
            tick: 0,
        })
    }

    pub fn params(&self) -> &WorldParams {
        &self.params
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn pending(&self) -> &[Entity] {
        &self.pending
    }

    /// Events recorded during the most recent tick.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Queues an entity; it becomes live at the end of the next update.
    pub fn add_element(&mut self, entity: Entity) {
        self.pending.push(entity);
    }

    /// Queues roughly half of capacity as randomly placed bodies.
    pub fn init_first_elements(&mut self) -> usize {
        let capacity = self.capacity;
        let seeded = population::seed(&mut self.context(), capacity);
        info!(seeded, capacity, "seeded initial bodies");
        seeded
    }

    /// Queues a resting body at `pos`, as a click would.
    pub fn spawn_at(&mut self, pos: Vec2) {
        let body = population::click_body(pos, &mut self.context());
        debug!(x = pos.x, y = pos.y, mass = body.mass(), "spawn requested");
        self.pending.push(body.into());
    }

    pub fn resize(&mut self, bounds: Bounds) {
        if bounds == self.bounds {
            return;
        }
        self.bounds = bounds;
        self.capacity = population::capacity(bounds, &self.params);
        debug!(
            width = bounds.width,
            height = bounds.height,
            capacity = self.capacity,
            "world resized"
        );
    }

    /// Advances the simulation by one tick.
    pub fn update(&mut self) {
        self.tick += 1;
        self.events.clear();
        self.fading.clear();

        let mut destroyed = 0_usize;
        {
            let mut ctx = TickContext {
                params: &self.params,
                bounds: self.bounds,
                pending: &mut self.pending,
                rng: &mut self.rng,
                events: &mut self.events,
            };
            for idx in 0..self.entities.len() {
                if self.entities[idx].is_destroyed() {
                    destroyed += 1;
                    continue;
                }
                if let Entity::Explosion(explosion) = &mut self.entities[idx] {
                    explosion.decay();
                    if explosion.is_destroyed() {
                        self.fading.push(explosion.clone());
                    }
                    continue;
                }
                body::update(&mut self.entities, idx, &mut ctx);
            }
        }

        let len = self.entities.len();
        if len > COMPACT_MIN_LEN && destroyed as f64 / len as f64 > COMPACT_DESTROYED_RATIO {
            self.entities.retain(|entity| !entity.is_destroyed());
            debug!(
                tick = self.tick,
                before = len,
                after = self.entities.len(),
                "compacted arena"
            );
            destroyed = 0;
        }

        if !self.pending.is_empty() {
            self.entities.append(&mut self.pending);
        }

        let alive = self.entities.len() - destroyed;
        if alive < self.capacity {
            population::inject(&mut self.context());
        }

        for event in &self.events {
            debug!(tick = self.tick, ?event, "world event");
        }
    }

    /// Reports every visible entity to `renderer`.
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        for entity in &self.entities {
            match entity {
                Entity::Body(body) if !body.is_destroyed() => {
                    renderer.draw_gradient_circle(
                        body.pos,
                        body.radius(),
                        body.color,
                        self.params.visibility,
                    );
                }
                Entity::Explosion(explosion) if explosion.is_visible() => {
                    self.draw_ring(explosion, renderer);
                }
                _ => {}
            }
        }
        for explosion in &self.fading {
            self.draw_ring(explosion, renderer);
        }
    }

    fn draw_ring<R: Renderer + ?Sized>(&self, explosion: &Explosion, renderer: &mut R) {
        renderer.draw_stroked_circle(
            explosion.pos,
            explosion.current_radius(),
            EXPLOSION_COLOR,
            explosion.visibility() * self.params.visibility,
            explosion.stroke_width(),
        );
    }

    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats {
            tick: self.tick,
            pending: self.pending.len(),
            capacity: self.capacity,
            ..WorldStats::default()
        };
        for entity in &self.entities {
            match entity {
                _ if entity.is_destroyed() => stats.destroyed += 1,
                Entity::Body(body) => {
                    stats.bodies += 1;
                    stats.total_mass += body.mass();
                }
                Entity::Explosion(_) => stats.explosions += 1,
            }
        }
        stats
    }

    fn context(&mut self) -> TickContext<'_> {
        TickContext {
            params: &self.params,
            bounds: self.bounds,
            pending: &mut self.pending,
            rng: &mut self.rng,
            events: &mut self.events,
        }
    }
}
