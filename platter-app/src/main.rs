//! platter - headless record player host
//!
//! Runs the record player on a frame thread and plays a scripted session:
//! vinyl placed on the platter, held, removed, then wait for the player to stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use tracing::{info, trace, warn};
use tracing_subscriber::EnvFilter;

use platter_config::Config;
use platter_core::{
    AudioOutput, EngineState, Mode, Pivot, PlayerCommand, PlayerEngine, PlayerEvent, Rig, Spinner,
};
use platter_input::{ColliderInfo, TriggerEvent, TriggerWatcher};

/// How long the vinyl stays on the platter
const HOLD_TIME: Duration = Duration::from_secs(3);

/// Give up waiting for the player to stop after this long
const STOP_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between state snapshots sent to the main thread
const STATE_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    info!(fps = config.fps, "platter starting");

    // Create engine channels
    let (cmd_tx, cmd_rx, evt_tx, evt_rx) = PlayerEngine::create_channels();

    // Shutdown flag
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_frames = shutdown.clone();

    let state = EngineState::with_tuning(config.tuning, log_rig());
    let fps = config.fps;
    let frame_handle = thread::Builder::new()
        .name("platter-frames".into())
        .spawn(move || run_frame_thread(state, fps, cmd_rx, evt_tx, shutdown_frames))
        .context("failed to spawn frame thread")?;

    let engine = PlayerEngine::new(cmd_tx, evt_rx);
    let result = run_session(&engine);

    // Cleanup
    engine.shutdown();
    shutdown.store(true, Ordering::SeqCst);
    if frame_handle.join().is_err() {
        warn!("frame thread panicked");
    }

    result
}

fn run_frame_thread(
    mut state: EngineState,
    fps: u32,
    cmd_rx: Receiver<PlayerCommand>,
    evt_tx: Sender<PlayerEvent>,
    shutdown: Arc<AtomicBool>,
) {
    let frame_duration = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
    let mut last_frame = Instant::now();
    let mut last_state_update = Instant::now();

    while !shutdown.load(Ordering::Relaxed) {
        // Process commands until the next frame is due
        let wait = frame_duration.saturating_sub(last_frame.elapsed());
        match cmd_rx.recv_timeout(wait) {
            Ok(PlayerCommand::Shutdown) => break,
            Ok(cmd) => {
                state.handle_command(cmd);
                continue;
            }
            Err(_) => {}
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;
        state.tick(dt, &evt_tx);

        // Send state updates periodically
        if last_state_update.elapsed() >= STATE_UPDATE_INTERVAL {
            let _ = evt_tx.try_send(state.get_state());
            last_state_update = Instant::now();
        }
    }
}

fn run_session(engine: &PlayerEngine) -> anyhow::Result<()> {
    let mut watcher = TriggerWatcher::new();
    let turntable = ColliderInfo::record_player("record_player");

    // A hand brushing past the trigger volume does nothing
    let brush = TriggerEvent::Enter(ColliderInfo::other("left_hand"));
    if let Some(cmd) = watcher.handle(&brush) {
        engine.send(cmd);
    }

    if let Some(cmd) = watcher.handle(&TriggerEvent::Enter(turntable.clone())) {
        engine.send(cmd);
    }

    let hold_until = Instant::now() + HOLD_TIME;
    let mut mode = Mode::Off;
    while Instant::now() < hold_until {
        pump_events(engine, &mut mode, Duration::from_millis(50))?;
    }

    if let Some(cmd) = watcher.handle(&TriggerEvent::Exit(turntable)) {
        engine.send(cmd);
    }

    let deadline = Instant::now() + STOP_TIMEOUT;
    // Wait for the player to leave Running first, then to settle at Off
    let mut stopping_seen = false;
    loop {
        pump_events(engine, &mut mode, Duration::from_millis(50))?;
        stopping_seen |= mode == Mode::Stopping;
        if stopping_seen && mode == Mode::Off {
            info!("record player stopped");
            return Ok(());
        }
        if Instant::now() >= deadline {
            anyhow::bail!("record player did not stop within {:?}", STOP_TIMEOUT);
        }
    }
}

/// Log events from the frame thread, tracking the latest mode
fn pump_events(engine: &PlayerEngine, mode: &mut Mode, wait: Duration) -> anyhow::Result<()> {
    match engine.event_rx.recv_timeout(wait) {
        Ok(event) => {
            handle_event(event, mode);
            Ok(())
        }
        Err(crossbeam_channel::RecvTimeoutError::Timeout) => Ok(()),
        Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
            anyhow::bail!("frame thread exited unexpectedly")
        }
    }
}

fn handle_event(event: PlayerEvent, mode: &mut Mode) {
    match event {
        PlayerEvent::StateUpdate(snapshot) => {
            info!(
                mode = snapshot.mode.display_name(),
                arm = snapshot.arm_angle,
                speed = snapshot.disc_speed,
                audio = snapshot.audio_playing,
                "state"
            );
            *mode = snapshot.mode;
        }
        PlayerEvent::ModeChanged { from, to } => {
            info!(from = from.display_name(), to = to.display_name(), "mode changed");
            *mode = to;
        }
        PlayerEvent::AudioChanged(playing) => {
            info!(playing, "audio");
        }
    }
}

/// Rig whose parts log what a renderer or mixer would receive
fn log_rig() -> Rig {
    Rig::new()
        .with_arm(LogPivot("arm"))
        .with_disc(LogPivot("disc"))
        .with_vinyl(LogSpinner::default())
        .with_audio(LogAudio::default())
}

struct LogPivot(&'static str);

impl Pivot for LogPivot {
    fn set_yaw(&mut self, degrees: f32) {
        trace!(pivot = self.0, degrees, "yaw");
    }
}

#[derive(Default)]
struct LogSpinner {
    total: f32,
}

impl Spinner for LogSpinner {
    fn rotate_world_yaw(&mut self, delta_degrees: f32) {
        self.total = (self.total + delta_degrees) % 360.0;
        trace!(delta_degrees, total = self.total, "vinyl spin");
    }
}

#[derive(Default)]
struct LogAudio {
    playing: bool,
}

impl AudioOutput for LogAudio {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn play(&mut self) {
        self.playing = true;
        info!("audio output: play");
    }

    fn stop(&mut self) {
        self.playing = false;
        info!("audio output: stop");
    }
}
