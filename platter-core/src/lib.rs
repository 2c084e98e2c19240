//! Record player core for platter - state machine, output rig, frame engine
//!
//! This crate provides the engine-agnostic record player:
//! - Player: Four-phase arm/platter animation with audio gating
//! - Rig: Output port and optional visual/audio parts
//! - Engine: Frame-thread state with command and event channels

mod engine;
mod player;
mod rig;

pub use engine::{EngineState, PlayerCommand, PlayerEngine, PlayerEvent, PlayerSnapshot};
pub use player::{Frame, Mode, RecordPlayer, Tuning};
pub use rig::{AudioOutput, Part, Pivot, PlayerOutputs, Rig, RigError, Spinner};
