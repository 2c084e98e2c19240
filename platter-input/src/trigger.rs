//! Trigger watcher - turns collider enter/exit into an activation signal
//!
//! The host reports every collider that enters or leaves the vinyl's trigger
//! volume. Only colliders that carry a record player change the signal.

use platter_core::PlayerCommand;
use tracing::info;

/// Collider reported by the host's physics layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColliderInfo {
    pub name: String,
    /// Whether the collider belongs to a record player
    pub has_record_player: bool,
}

impl ColliderInfo {
    pub fn record_player(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_record_player: true,
        }
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_record_player: false,
        }
    }
}

/// Trigger volume callbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    Enter(ColliderInfo),
    Exit(ColliderInfo),
}

/// Watches a trigger volume and converts record player contact into commands
#[derive(Debug, Default)]
pub struct TriggerWatcher {
    engaged: bool,
    /// Record player last touched, kept so exit can be attributed
    player_name: Option<String>,
}

impl TriggerWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last signal sent was "active"
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Name of the record player last entered
    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    /// Handle a trigger event and return a command if applicable
    pub fn handle(&mut self, event: &TriggerEvent) -> Option<PlayerCommand> {
        match event {
            TriggerEvent::Enter(collider) if collider.has_record_player => {
                info!(player = %collider.name, "vinyl placed on record player, activating");
                self.engaged = true;
                self.player_name = Some(collider.name.clone());
                Some(PlayerCommand::SetActive(true))
            }
            TriggerEvent::Exit(collider) if collider.has_record_player => {
                info!(player = %collider.name, "vinyl removed, stopping record player");
                self.engaged = false;
                Some(PlayerCommand::SetActive(false))
            }
            _ => None,
        }
    }
}
