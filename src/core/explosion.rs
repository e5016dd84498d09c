use crate::{
    config::{EXPLOSION_FADE_EXP, EXPLOSION_FADE_THRESHOLD, EXPLOSION_GROWTH_EXP},
    types::Vec2,
};

/// Expanding ring left behind by a destroyed body. Purely visual: it never
/// gravitates or collides.
#[derive(Clone, Debug)]
pub struct Explosion {
    pub pos: Vec2,
    initial_radius: f64,
    current_radius: f64,
    visibility: f64,
    age: u32,
    destroyed: bool,
}

impl Explosion {
    pub fn new(pos: Vec2, initial_radius: f64) -> Self {
        Self {
            pos,
            initial_radius,
            current_radius: initial_radius,
            visibility: 1.0,
            age: 0,
            destroyed: false,
        }
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn initial_radius(&self) -> f64 {
        self.initial_radius
    }

    pub fn current_radius(&self) -> f64 {
        self.current_radius
    }

    pub fn visibility(&self) -> f64 {
        self.visibility
    }

    pub fn stroke_width(&self) -> f64 {
        self.initial_radius * self.visibility
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Has decayed at least once and not yet faded out.
    pub fn is_visible(&self) -> bool {
        self.age > 0 && !self.destroyed
    }

    /// Radius grows as `age^0.8`; visibility falls with the fourth power of
    /// the radius ratio.
    pub fn decay(&mut self) {
        self.age += 1;
        self.current_radius = self.initial_radius + f64::from(self.age).powf(EXPLOSION_GROWTH_EXP);
        self.visibility = (self.initial_radius / self.current_radius).powi(EXPLOSION_FADE_EXP);
        if self.visibility < EXPLOSION_FADE_THRESHOLD {
            self.destroyed = true;
        }
    }
}
