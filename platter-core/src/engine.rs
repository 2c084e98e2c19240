//! Player engine - runs the record player on the frame thread

use crate::player::{Frame, Mode, RecordPlayer, Tuning};
use crate::rig::Rig;
use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, info};

/// Commands sent to the frame thread
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    /// Activation signal from a trigger watcher
    SetActive(bool),
    SetTuning(Tuning),
    Reset,
    // System
    Shutdown,
}

/// Point-in-time view of the player for observers
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerSnapshot {
    pub mode: Mode,
    pub arm_angle: f32,
    pub disc_angle: f32,
    pub disc_speed: f32,
    pub active: bool,
    pub audio_playing: bool,
}

impl From<&RecordPlayer> for PlayerSnapshot {
    fn from(player: &RecordPlayer) -> Self {
        Self {
            mode: player.mode(),
            arm_angle: player.arm_angle(),
            disc_angle: player.disc_angle(),
            disc_speed: player.disc_speed(),
            active: player.is_active(),
            audio_playing: player.audio_playing(),
        }
    }
}

/// Events sent from the frame thread
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Periodic state update
    StateUpdate(PlayerSnapshot),
    /// Animation phase changed
    ModeChanged { from: Mode, to: Mode },
    /// Audio started or stopped
    AudioChanged(bool),
}

/// Record player state (held in the frame thread)
pub struct EngineState {
    player: RecordPlayer,
    rig: Rig,
}

impl EngineState {
    pub fn new(rig: Rig) -> Self {
        Self::with_tuning(Tuning::default(), rig)
    }

    pub fn with_tuning(tuning: Tuning, rig: Rig) -> Self {
        rig.report_missing();
        Self {
            player: RecordPlayer::with_tuning(tuning),
            rig,
        }
    }

    /// Swap in a different rig; missing parts are reported once and the
    /// audio gate is reported again on the next tick
    pub fn set_rig(&mut self, rig: Rig) {
        rig.report_missing();
        self.rig = rig;
        self.player.resync_audio();
    }

    pub fn player(&self) -> &RecordPlayer {
        &self.player
    }

    /// Process a command
    pub fn handle_command(&mut self, cmd: PlayerCommand) {
        match cmd {
            PlayerCommand::SetActive(active) => {
                debug!(active, "activation signal");
                self.player.set_active(active);
            }
            PlayerCommand::SetTuning(tuning) => self.player.set_tuning(tuning),
            PlayerCommand::Reset => self.player.reset(),
            // Handled by the owner of the frame loop
            PlayerCommand::Shutdown => {}
        }
    }

    /// Advance one frame, drive the rig and report transitions
    pub fn tick(&mut self, dt: f32, events: &Sender<PlayerEvent>) -> Frame {
        let from = self.player.mode();
        let frame = self.player.drive(dt, &mut self.rig);
        let to = self.player.mode();

        if from != to {
            let _ = events.try_send(PlayerEvent::ModeChanged { from, to });
        }
        if frame.audio_changed {
            if frame.audio_playing {
                info!("record audio started");
            }
            let _ = events.try_send(PlayerEvent::AudioChanged(frame.audio_playing));
        }
        frame
    }

    /// Get current state for observers
    pub fn get_state(&self) -> PlayerEvent {
        PlayerEvent::StateUpdate(PlayerSnapshot::from(&self.player))
    }
}

/// Handle for the main thread to talk to the frame thread
pub struct PlayerEngine {
    /// Send commands to the frame thread
    pub command_tx: Sender<PlayerCommand>,
    /// Receive events from the frame thread
    pub event_rx: Receiver<PlayerEvent>,
}

impl PlayerEngine {
    /// Create channels for engine communication
    pub fn create_channels() -> (
        Sender<PlayerCommand>,
        Receiver<PlayerCommand>,
        Sender<PlayerEvent>,
        Receiver<PlayerEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(64);
        let (evt_tx, evt_rx) = bounded(1024);
        (cmd_tx, cmd_rx, evt_tx, evt_rx)
    }

    /// Create a new engine handle
    pub fn new(command_tx: Sender<PlayerCommand>, event_rx: Receiver<PlayerEvent>) -> Self {
        Self {
            command_tx,
            event_rx,
        }
    }

    /// Send a command to the frame thread
    pub fn send(&self, cmd: PlayerCommand) {
        let _ = self.command_tx.try_send(cmd);
    }

    /// Forward the activation signal
    pub fn set_active(&self, active: bool) {
        self.send(PlayerCommand::SetActive(active));
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        self.send(PlayerCommand::Shutdown);
    }
}
