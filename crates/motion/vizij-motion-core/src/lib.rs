//! Vizij Motion Core (engine-agnostic)
//!
//! Declarative motion trees ([`Motion`]) are resolved against an initial
//! value into evaluable timelines ([`MotionData`]) and played back over real
//! time by a [`Driver`]. Hosts feed frame deltas through
//! [`Driver::advance`] (or a [`host::FrameLoop`]) and read values back
//! through observers or [`Driver::current_value`].

pub mod config;
pub mod curve;
pub mod data;
pub mod driver;
pub mod duration;
pub mod error;
pub mod facet;
pub mod host;
pub mod motion;
pub(crate) mod resolve;
pub mod value;

// Re-exports for consumers (hosts, adapters)
pub use config::Config;
pub use curve::{EasingCurve, Point};
pub use data::{Action, Lerp, MotionData, SideEffects};
pub use driver::{Direction, Driver, PlayOptions, PlaybackState, Subscription};
pub use duration::Duration;
pub use error::MotionError;
pub use facet::Facet;
pub use host::{Clock, FrameLoop, ManualClock, Playback, SystemClock};
pub use motion::{Motion, MotionKind};
pub use resolve::DEFAULT_UNIT_SECS;
pub use value::{Animatable, Value, ValueKind};

pub type Result<T> = std::result::Result<T, MotionError>;
