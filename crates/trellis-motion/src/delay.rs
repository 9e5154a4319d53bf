//! Delay recipes and the builder that produces them
//!
//! A [`Delay`] describes how a change should be carried out before it is tied
//! to a node and accessor. The mutation queue asks a [`DelayFactory`] for one
//! each time a value actually changes; returning `None` applies the value
//! immediately.

use crate::interpolation::{linear, Animatable, Easing, Interpolator, ValueCategory};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use trellis_core::{EngineConfig, NodeId, Result};

/// Hook run after a change completed, with the node and its final value
pub type CompletionHook<V> = Rc<dyn Fn(NodeId, &V)>;

/// Adjusts a freshly built delay before it is handed to the queue
pub type DelayModifier<V> = Rc<dyn Fn(&mut Delay<V>)>;

/// An animation session driving a value over time
#[derive(Debug, Clone)]
pub struct Transition<V> {
    pub duration: Duration,
    pub interpolator: Interpolator<V>,
    pub easing: Easing,
    /// End value fixed ahead of time. Replaces the requested value when set.
    pub target: Option<V>,
}

impl<V: Animatable> Transition<V> {
    /// Transition using the default interpolator for `V`
    pub fn new(duration: Duration) -> Result<Self> {
        Ok(Self {
            duration,
            interpolator: Interpolator::default_for()?,
            easing: linear,
            target: None,
        })
    }
}

/// How a change is carried out
#[derive(Debug, Clone)]
pub enum DelayKind<V> {
    /// Apply as soon as the change gets its turn
    Immediate,
    /// Apply the final value once, after a fixed delay
    Timed(Duration),
    /// Drive intermediate values every tick, then apply the final value
    Animated(Transition<V>),
}

/// An uninitialized change
pub struct Delay<V> {
    pub(crate) kind: DelayKind<V>,
    pub(crate) hooks: Vec<CompletionHook<V>>,
}

impl<V: Animatable> Delay<V> {
    pub fn new(kind: DelayKind<V>) -> Self {
        Self {
            kind,
            hooks: Vec::new(),
        }
    }

    pub fn immediate() -> Self {
        Self::new(DelayKind::Immediate)
    }

    pub fn timed(delay: Duration) -> Self {
        Self::new(DelayKind::Timed(delay))
    }

    /// Animated delay with the default interpolator for `V`
    pub fn animated(duration: Duration) -> Result<Self> {
        Ok(Self::new(DelayKind::Animated(Transition::new(duration)?)))
    }

    pub fn kind(&self) -> &DelayKind<V> {
        &self.kind
    }

    /// The transition, for animated delays
    pub fn transition_mut(&mut self) -> Option<&mut Transition<V>> {
        match &mut self.kind {
            DelayKind::Animated(transition) => Some(transition),
            _ => None,
        }
    }

    pub fn on_complete(&mut self, hook: impl Fn(NodeId, &V) + 'static) {
        self.hooks.push(Rc::new(hook));
    }
}

impl<V> fmt::Debug for Delay<V>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delay")
            .field("kind", &self.kind)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Produces the delay for a change from `from` to `to`
pub trait DelayFactory<V> {
    /// `Ok(None)` applies the change immediately
    fn delay_for(&self, from: &V, to: &V) -> Result<Option<Delay<V>>>;
}

impl<V, F> DelayFactory<V> for F
where
    F: Fn(&V, &V) -> Option<Delay<V>>,
{
    fn delay_for(&self, from: &V, to: &V) -> Result<Option<Delay<V>>> {
        Ok(self(from, to))
    }
}

#[derive(Debug, Clone, Copy)]
enum BuilderKind {
    Timed(Duration),
    Animated(Duration),
}

/// Reusable recipe for timed or animated delays
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use trellis_motion::{DelayBuilder, DelayFactory};
///
/// let fade = DelayBuilder::<f32>::animated(Duration::from_millis(200))
///     .easing(|t| t * t);
/// let delay = fade.delay_for(&0.0, &1.0).unwrap();
/// assert!(delay.is_some());
/// ```
pub struct DelayBuilder<V> {
    kind: BuilderKind,
    easing: Easing,
    interpolator: Option<Interpolator<V>>,
    target: Option<V>,
    halfway_step: bool,
    before_start: Vec<DelayModifier<V>>,
    after_complete: Vec<CompletionHook<V>>,
}

impl<V: Animatable> DelayBuilder<V> {
    fn with_kind(kind: BuilderKind) -> Self {
        Self {
            kind,
            easing: linear,
            interpolator: None,
            target: None,
            halfway_step: false,
            before_start: Vec::new(),
            after_complete: Vec::new(),
        }
    }

    pub fn timed(delay: Duration) -> Self {
        Self::with_kind(BuilderKind::Timed(delay))
    }

    pub fn animated(duration: Duration) -> Self {
        Self::with_kind(BuilderKind::Animated(duration))
    }

    /// Timed delay using the configured default delay
    pub fn timed_from_config(config: &EngineConfig) -> Self {
        Self::timed(config.default_delay())
    }

    /// Animation using the configured default duration and step policy
    pub fn animated_from_config(config: &EngineConfig) -> Self {
        let mut builder = Self::animated(config.default_animation());
        builder.halfway_step = config.halfway_step;
        builder
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn interpolator(mut self, interpolator: Interpolator<V>) -> Self {
        self.interpolator = Some(interpolator);
        self
    }

    /// Animate towards `target` regardless of the requested value
    pub fn target(mut self, target: V) -> Self {
        self.target = Some(target);
        self
    }

    /// Use the halfway step for discrete values
    pub fn halfway_step(mut self, enabled: bool) -> Self {
        self.halfway_step = enabled;
        self
    }

    /// Run `modifier` on every delay this builder produces
    pub fn before_start(mut self, modifier: impl Fn(&mut Delay<V>) + 'static) -> Self {
        self.before_start.push(Rc::new(modifier));
        self
    }

    /// Run `hook` whenever a produced change completes
    pub fn after_complete(mut self, hook: impl Fn(NodeId, &V) + 'static) -> Self {
        self.after_complete.push(Rc::new(hook));
        self
    }

    /// Build a fresh delay
    ///
    /// Fails when the default interpolator is needed and `V` has none.
    pub fn build(&self) -> Result<Delay<V>> {
        let kind = match self.kind {
            BuilderKind::Timed(delay) => DelayKind::Timed(delay),
            BuilderKind::Animated(duration) => {
                let interpolator = match &self.interpolator {
                    Some(interpolator) => interpolator.clone(),
                    None if self.halfway_step && V::CATEGORY == ValueCategory::Discrete => {
                        Interpolator::HalfwayStep
                    }
                    None => Interpolator::default_for()?,
                };
                DelayKind::Animated(Transition {
                    duration,
                    interpolator,
                    easing: self.easing,
                    target: self.target.clone(),
                })
            }
        };

        let mut delay = Delay::new(kind);
        delay.hooks.extend(self.after_complete.iter().cloned());
        for modifier in &self.before_start {
            modifier(&mut delay);
        }
        Ok(delay)
    }
}

impl<V: Animatable> DelayFactory<V> for DelayBuilder<V> {
    fn delay_for(&self, _from: &V, _to: &V) -> Result<Option<Delay<V>>> {
        self.build().map(Some)
    }
}

impl<V: Animatable> Clone for DelayBuilder<V> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            easing: self.easing,
            interpolator: self.interpolator.clone(),
            target: self.target.clone(),
            halfway_step: self.halfway_step,
            before_start: self.before_start.clone(),
            after_complete: self.after_complete.clone(),
        }
    }
}
