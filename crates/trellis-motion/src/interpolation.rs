//! Value interpolation for animated changes
//!
//! The default interpolator depends on the category of the value type:
//! - integral numbers blend linearly and round down: `floor((to - from) * t) + from`
//! - floating point numbers blend linearly: `(to - from) * t + from`
//! - everything else steps from `from` to `to` once the animation completes
//! - types with a single value cannot be interpolated at all

use std::fmt;
use std::rc::Rc;
use trellis_core::{Datum, Error, Result};

/// How values of a type can be interpolated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCategory {
    Integral,
    Floating,
    /// Booleans, text, enumerations and opaque values
    Discrete,
    /// Types with a single value, such as `()`
    Empty,
}

/// A value that an animated change can drive
pub trait Animatable: Clone + PartialEq + fmt::Debug + 'static {
    const CATEGORY: ValueCategory;

    /// Linear blend between `from` and `to` at `coeff` in `[0, 1]`
    ///
    /// Discrete values keep `from` until the animation completes.
    fn lerp(from: &Self, to: &Self, coeff: f32) -> Self {
        step(from, to, coeff, 1.0)
    }
}

macro_rules! animatable_int {
    ($($t:ty),*) => {
        $(
            impl Animatable for $t {
                const CATEGORY: ValueCategory = ValueCategory::Integral;

                fn lerp(from: &Self, to: &Self, coeff: f32) -> Self {
                    let span = (*to as i128 - *from as i128) as f64;
                    let offset = (span * coeff as f64).floor() as i128;
                    (offset + *from as i128) as $t
                }
            }
        )*
    };
}

animatable_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Animatable for char {
    const CATEGORY: ValueCategory = ValueCategory::Integral;

    fn lerp(from: &Self, to: &Self, coeff: f32) -> Self {
        let code = u32::lerp(&(*from as u32), &(*to as u32), coeff);
        char::from_u32(code).unwrap_or(*from)
    }
}

impl Animatable for f32 {
    const CATEGORY: ValueCategory = ValueCategory::Floating;

    fn lerp(from: &Self, to: &Self, coeff: f32) -> Self {
        (to - from) * coeff + from
    }
}

impl Animatable for f64 {
    const CATEGORY: ValueCategory = ValueCategory::Floating;

    fn lerp(from: &Self, to: &Self, coeff: f32) -> Self {
        (to - from) * coeff as f64 + from
    }
}

impl Animatable for bool {
    const CATEGORY: ValueCategory = ValueCategory::Discrete;
}

impl Animatable for String {
    const CATEGORY: ValueCategory = ValueCategory::Discrete;
}

impl Animatable for Datum {
    const CATEGORY: ValueCategory = ValueCategory::Discrete;
}

impl Animatable for () {
    const CATEGORY: ValueCategory = ValueCategory::Empty;
}

/// Keep `from` below `threshold`, `to` at or after it
fn step<V: Clone>(from: &V, to: &V, coeff: f32, threshold: f32) -> V {
    if coeff < threshold {
        from.clone()
    } else {
        to.clone()
    }
}

/// Function computing an intermediate value
pub type InterpolateFn<V> = Rc<dyn Fn(&V, &V, f32) -> V>;

/// Strategy for computing intermediate values of an animation
pub enum Interpolator<V> {
    /// The type's own linear blend
    Linear,
    /// `from` until completion, then `to`
    Step,
    /// `from` for the first half, then `to`
    HalfwayStep,
    Custom(InterpolateFn<V>),
}

impl<V: Animatable> Interpolator<V> {
    /// Pick the interpolator matching the category of `V`
    ///
    /// Fails for single-valued types, which have nothing to interpolate.
    pub fn default_for() -> Result<Self> {
        match V::CATEGORY {
            ValueCategory::Integral | ValueCategory::Floating => Ok(Interpolator::Linear),
            ValueCategory::Discrete => Ok(Interpolator::Step),
            ValueCategory::Empty => Err(Error::EmptyInterpolation {
                type_name: std::any::type_name::<V>(),
            }),
        }
    }

    pub fn custom(f: impl Fn(&V, &V, f32) -> V + 'static) -> Self {
        Interpolator::Custom(Rc::new(f))
    }

    /// Value at completion coefficient `coeff`
    pub fn interpolate(&self, from: &V, to: &V, coeff: f32) -> V {
        match self {
            Interpolator::Linear => V::lerp(from, to, coeff),
            Interpolator::Step => step(from, to, coeff, 1.0),
            Interpolator::HalfwayStep => step(from, to, coeff, 0.5),
            Interpolator::Custom(f) => f(from, to, coeff),
        }
    }
}

impl<V> Clone for Interpolator<V> {
    fn clone(&self) -> Self {
        match self {
            Interpolator::Linear => Interpolator::Linear,
            Interpolator::Step => Interpolator::Step,
            Interpolator::HalfwayStep => Interpolator::HalfwayStep,
            Interpolator::Custom(f) => Interpolator::Custom(Rc::clone(f)),
        }
    }
}

impl<V> fmt::Debug for Interpolator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpolator::Linear => write!(f, "Linear"),
            Interpolator::Step => write!(f, "Step"),
            Interpolator::HalfwayStep => write!(f, "HalfwayStep"),
            Interpolator::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Maps linear progress to eased progress, both in `[0, 1]`
pub type Easing = fn(f32) -> f32;

/// Identity easing
pub fn linear(t: f32) -> f32 {
    t
}
