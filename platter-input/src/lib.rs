//! Trigger-volume input handling for platter

mod trigger;

pub use trigger::{ColliderInfo, TriggerEvent, TriggerWatcher};
