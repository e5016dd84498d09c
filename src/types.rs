use std::ops::{Add, AddAssign, Mul, Sub};

use rand::Rng;

use crate::config::{COLOR_MAX, COLOR_MIN};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }

    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len > 0.0 {
            Vec2::new(self.x / len, self.y / len)
        } else {
            Vec2::ZERO
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uniform over the drawable channel range.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            r: rng.gen_range(COLOR_MIN..=COLOR_MAX),
            g: rng.gen_range(COLOR_MIN..=COLOR_MAX),
            b: rng.gen_range(COLOR_MIN..=COLOR_MAX),
        }
    }

    /// `self * (1 - ratio) + other * ratio`, per channel, clamped to the
    /// drawable range.
    pub fn blend(self, other: Rgb, ratio: f64) -> Rgb {
        let mix = |a: u8, b: u8| {
            let v = f64::from(a) * (1.0 - ratio) + f64::from(b) * ratio;
            v.round().clamp(f64::from(COLOR_MIN), f64::from(COLOR_MAX)) as u8
        };
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Adds `amount` to every channel, saturating at white.
    pub fn lighten(self, amount: u8) -> Rgb {
        Rgb {
            r: self.r.saturating_add(amount),
            g: self.g.saturating_add(amount),
            b: self.b.saturating_add(amount),
        }
    }
}

/// The simulated rectangle, `[0, width] x [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> f64 {
        self.width * self.height
    }

    pub fn contains_circle(self, center: Vec2, radius: f64) -> bool {
        center.x - radius >= 0.0
            && center.x + radius <= self.width
            && center.y - radius >= 0.0
            && center.y + radius <= self.height
    }
}

/// Arena slot of an entity during the tick it was recorded in.
pub type EntityIndex = usize;

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Merge {
        survivor: EntityIndex,
        consumed: EntityIndex,
        mass: f64,
    },
    Shatter {
        a: EntityIndex,
        b: EntityIndex,
        rel_speed: f64,
    },
    Fragment {
        pos: Vec2,
        mass: f64,
        parts: usize,
    },
    Spawn {
        pos: Vec2,
        mass: f64,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldStats {
    pub tick: u64,
    pub bodies: usize,
    pub explosions: usize,
    pub destroyed: usize,
    pub pending: usize,
    pub capacity: usize,
    pub total_mass: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    mod vec2_length {
        use super::*;

        #[test]
        fn calculates_length() {
            let v = Vec2::new(3.0, 4.0);
            assert_eq!(v.length(), 5.0);
        }

        #[test]
        fn distance_is_symmetric() {
            let a = Vec2::new(1.0, 1.0);
            let b = Vec2::new(4.0, 5.0);
            assert_eq!(a.distance(b), 5.0);
            assert_eq!(b.distance(a), 5.0);
        }
    }

    mod vec2_normalize {
        use super::*;

        #[test]
        fn normalizes_non_zero_vector() {
            let v = Vec2::new(3.0, 4.0).normalize();
            assert!((v.x - 0.6).abs() < 1e-12);
            assert!((v.y - 0.8).abs() < 1e-12);
        }

        #[test]
        fn zero_vector_normalizes_to_zero() {
            assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        }
    }

    mod vec2_ops {
        use super::*;

        #[test]
        fn add_assign_and_sub() {
            let mut a = Vec2::new(1.0, 2.0);
            a += Vec2::new(3.0, 4.0);
            assert_eq!(a, Vec2::new(4.0, 6.0));
            assert_eq!(a - Vec2::new(1.0, 1.0), Vec2::new(3.0, 5.0));
        }

        #[test]
        fn scales_by_scalar() {
            assert_eq!(Vec2::new(2.0, 3.0) * 2.0, Vec2::new(4.0, 6.0));
        }
    }

    mod rgb_blend {
        use super::*;

        #[test]
        fn half_blend_averages_channels() {
            let c = Rgb::new(100, 200, 50).blend(Rgb::new(200, 100, 150), 0.5);
            assert_eq!(c, Rgb::new(150, 150, 100));
        }

        #[test]
        fn clamps_to_drawable_floor() {
            let c = Rgb::new(0, 0, 0).blend(Rgb::new(0, 0, 0), 0.3);
            assert_eq!(c, Rgb::new(10, 10, 10));
        }

        #[test]
        fn ratio_above_one_is_clamped_to_white() {
            let c = Rgb::new(10, 10, 10).blend(Rgb::new(255, 255, 255), 1.5);
            assert_eq!(c, Rgb::new(255, 255, 255));
        }
    }

    mod rgb_random {
        use super::*;

        #[test]
        fn channels_stay_in_range() {
            let mut rng = StdRng::seed_from_u64(11);
            for _ in 0..200 {
                let c = Rgb::random(&mut rng);
                for ch in [c.r, c.g, c.b] {
                    assert!(ch >= COLOR_MIN);
                }
            }
        }
    }

    mod bounds {
        use super::*;

        #[test]
        fn tangent_circle_is_contained() {
            let b = Bounds::new(100.0, 50.0);
            assert!(b.contains_circle(Vec2::new(5.0, 5.0), 5.0));
            assert!(!b.contains_circle(Vec2::new(96.0, 5.0), 5.0));
        }
    }
}
