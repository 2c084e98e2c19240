//! Record player animation state machine
//!
//! Models:
//! - Tonearm swing between rest (0°) and engaged (30°)
//! - Platter spin-up while the arm swings out, constant speed once engaged
//! - Spin-down and arm return when the activation signal drops
//! - Audio gating once the arm is engaged and the platter is turning

use tracing::debug;

use crate::rig::PlayerOutputs;

/// Animation phase of the record player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Fully stopped, arm at rest
    #[default]
    Off,
    /// Arm swinging out, platter spinning up
    ArmExtending,
    /// Arm engaged, platter at constant speed
    Running,
    /// Arm returning, platter braking
    Stopping,
}

impl Mode {
    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Off => "OFF",
            Mode::ArmExtending => "ARM EXTENDING",
            Mode::Running => "RUNNING",
            Mode::Stopping => "STOPPING",
        }
    }
}

/// Rates and thresholds that shape the animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    arm_swing_rate: f32,    // Degrees per second
    spin_ramp_rate: f32,    // Degrees per second squared
    arm_engaged_angle: f32, // Degrees
    audible_speed: f32,     // Degrees per second
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arm_swing_rate: 30.0,
            spin_ramp_rate: 80.0,
            arm_engaged_angle: 30.0,
            audible_speed: 0.1,
        }
    }
}

impl Tuning {
    /// Smallest accepted rate or angle; keeps every phase able to finish
    const MIN_RATE: f32 = 0.001;

    /// Arm swing rate in degrees per second
    pub fn arm_swing_rate(&self) -> f32 {
        self.arm_swing_rate
    }

    /// Platter acceleration and braking in degrees per second squared
    pub fn spin_ramp_rate(&self) -> f32 {
        self.spin_ramp_rate
    }

    /// Arm angle at which the needle is on the record
    pub fn arm_engaged_angle(&self) -> f32 {
        self.arm_engaged_angle
    }

    /// Platter speed above which audio may play
    pub fn audible_speed(&self) -> f32 {
        self.audible_speed
    }

    /// Set arm swing rate (ignored unless finite)
    pub fn set_arm_swing_rate(&mut self, degrees_per_sec: f32) {
        if degrees_per_sec.is_finite() {
            self.arm_swing_rate = degrees_per_sec.max(Self::MIN_RATE);
        }
    }

    /// Set spin ramp rate (ignored unless finite)
    pub fn set_spin_ramp_rate(&mut self, degrees_per_sec2: f32) {
        if degrees_per_sec2.is_finite() {
            self.spin_ramp_rate = degrees_per_sec2.max(Self::MIN_RATE);
        }
    }

    /// Set engaged arm angle (ignored unless finite)
    pub fn set_arm_engaged_angle(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.arm_engaged_angle = degrees.max(Self::MIN_RATE);
        }
    }

    /// Set audible speed threshold (ignored unless finite)
    pub fn set_audible_speed(&mut self, degrees_per_sec: f32) {
        if degrees_per_sec.is_finite() {
            self.audible_speed = degrees_per_sec.max(0.0);
        }
    }
}

/// Outputs produced by one tick of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    /// Local yaw of the arm pivot
    pub arm_angle: f32,
    /// Local yaw of the disc pivot
    pub disc_angle: f32,
    /// World-space yaw delta for the free-standing vinyl, if it should turn
    pub spin_delta: Option<f32>,
    /// Whether audio should be playing after this tick
    pub audio_playing: bool,
    /// Whether the audio gate flipped (or was resynced) this tick
    pub audio_changed: bool,
}

impl Frame {
    /// Push this frame to an output port
    pub fn apply(&self, outputs: &mut dyn PlayerOutputs) {
        outputs.set_arm_angle(self.arm_angle);
        outputs.set_disc_angle(self.disc_angle);
        if let Some(delta) = self.spin_delta {
            outputs.apply_world_spin(delta);
        }
        // Gate goes out every tick so outputs that stopped on their own recover
        outputs.set_audio_playing(self.audio_playing);
    }
}

/// Record player controller
///
/// Call `update()` (or `drive()`) once per rendered frame with the elapsed
/// time. The activation signal is sampled at the start of every tick.
#[derive(Debug, Clone)]
pub struct RecordPlayer {
    tuning: Tuning,

    // State
    mode: Mode,
    arm_angle: f32,
    disc_angle: f32, // Wrapped to [0, 360)
    disc_speed: f32,

    // Input
    active: bool,

    // Audio gate
    audio_playing: bool,
    audio_synced: bool, // Cleared to report the gate as changed on the next tick
}

impl Default for RecordPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordPlayer {
    /// Create a stopped record player with the reference tuning
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    /// Create a stopped record player with custom tuning
    pub fn with_tuning(tuning: Tuning) -> Self {
        Self {
            tuning,
            mode: Mode::Off,
            arm_angle: 0.0,
            disc_angle: 0.0,
            disc_speed: 0.0,
            active: false,
            audio_playing: false,
            audio_synced: false,
        }
    }

    /// Set the activation signal (sampled on the next tick)
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Check the activation signal
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Get tuning
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Replace tuning; the arm is clamped into the new engaged range
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
        self.arm_angle = self.arm_angle.min(tuning.arm_engaged_angle);
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get arm angle in degrees
    pub fn arm_angle(&self) -> f32 {
        self.arm_angle
    }

    /// Get disc angle in degrees, wrapped to [0, 360)
    pub fn disc_angle(&self) -> f32 {
        self.disc_angle
    }

    /// Get disc speed in degrees per second
    pub fn disc_speed(&self) -> f32 {
        self.disc_speed
    }

    /// Check whether audio is currently gated on
    pub fn audio_playing(&self) -> bool {
        self.audio_playing
    }

    /// Report the audio gate as changed on the next tick
    pub(crate) fn resync_audio(&mut self) {
        self.audio_synced = false;
    }

    fn advance_disc(&mut self, dt: f32) {
        self.disc_angle = (self.disc_angle + dt * self.disc_speed).rem_euclid(360.0);
    }

    /// Reset to initial state (activation signal and tuning are kept)
    pub fn reset(&mut self) {
        self.mode = Mode::Off;
        self.arm_angle = 0.0;
        self.disc_angle = 0.0;
        self.disc_speed = 0.0;
        self.audio_playing = false;
        self.audio_synced = false;
    }

    /// Advance the state machine by `dt` seconds
    pub fn update(&mut self, dt: f32) -> Frame {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            debug!(dt, "ignoring invalid frame delta");
            0.0
        };
        let previous = self.mode;

        // Activation signal transitions take effect this tick, so the arm is
        // engaged exactly 1 s after activation at the reference rates
        self.mode = match (self.mode, self.active) {
            (Mode::Off, true) | (Mode::Stopping, true) => Mode::ArmExtending,
            (Mode::ArmExtending, false) | (Mode::Running, false) => Mode::Stopping,
            (mode, _) => mode,
        };

        match self.mode {
            Mode::Off => {}
            Mode::ArmExtending => {
                self.arm_angle += dt * self.tuning.arm_swing_rate;
                if self.arm_angle >= self.tuning.arm_engaged_angle {
                    self.arm_angle = self.tuning.arm_engaged_angle;
                    self.mode = Mode::Running;
                }
                self.advance_disc(dt);
                self.disc_speed += dt * self.tuning.spin_ramp_rate;
            }
            Mode::Running => {
                self.advance_disc(dt);
            }
            Mode::Stopping => {
                self.arm_angle = (self.arm_angle - dt * self.tuning.arm_swing_rate).max(0.0);
                self.advance_disc(dt);
                self.disc_speed = (self.disc_speed - dt * self.tuning.spin_ramp_rate).max(0.0);
                if self.disc_speed == 0.0 && self.arm_angle == 0.0 {
                    self.mode = Mode::Off;
                }
            }
        }

        if self.mode != previous {
            debug!(
                from = previous.display_name(),
                to = self.mode.display_name(),
                "record player mode changed"
            );
        }

        let spin_delta = if self.active && self.disc_speed > 0.0 {
            Some(self.disc_speed * dt)
        } else {
            None
        };

        let audio_playing = self.mode == Mode::Running
            && self.active
            && self.disc_speed > self.tuning.audible_speed;
        let audio_changed = !self.audio_synced || audio_playing != self.audio_playing;
        self.audio_playing = audio_playing;
        self.audio_synced = true;

        Frame {
            arm_angle: self.arm_angle,
            disc_angle: self.disc_angle,
            spin_delta,
            audio_playing,
            audio_changed,
        }
    }

    /// Advance by `dt` seconds and push the resulting frame to `outputs`
    pub fn drive(&mut self, dt: f32, outputs: &mut dyn PlayerOutputs) -> Frame {
        let frame = self.update(dt);
        frame.apply(outputs);
        frame
    }
}
