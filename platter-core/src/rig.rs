//! Output rig - the visual and audio parts a record player drives
//!
//! A host connects whatever parts it has (arm pivot, disc pivot, free-standing
//! vinyl, audio output). Absent parts are skipped; the state machine keeps
//! running regardless.

use std::fmt;

use thiserror::Error;
use tracing::warn;

/// Output port fed by the record player every tick
pub trait PlayerOutputs {
    /// Local yaw of the tonearm pivot, degrees
    fn set_arm_angle(&mut self, degrees: f32);
    /// Local yaw of the disc pivot, degrees
    fn set_disc_angle(&mut self, degrees: f32);
    /// World-space yaw delta for the free-standing vinyl, degrees
    fn apply_world_spin(&mut self, delta_degrees: f32);
    /// Audio gate, sent every tick
    fn set_audio_playing(&mut self, playing: bool);
}

/// A sub-object rotated around its local vertical axis
pub trait Pivot: Send {
    fn set_yaw(&mut self, degrees: f32);
}

/// A free-standing object rotated around the world vertical axis
pub trait Spinner: Send {
    fn rotate_world_yaw(&mut self, delta_degrees: f32);
}

/// Audio playback sink
pub trait AudioOutput: Send {
    fn is_playing(&self) -> bool;
    fn play(&mut self);
    fn stop(&mut self);
}

/// Connectable rig parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Arm,
    Disc,
    Vinyl,
    Audio,
}

impl Part {
    pub const ALL: [Part; 4] = [Part::Arm, Part::Disc, Part::Vinyl, Part::Audio];

    pub fn display_name(&self) -> &'static str {
        match self {
            Part::Arm => "arm",
            Part::Disc => "disc",
            Part::Vinyl => "vinyl",
            Part::Audio => "audio",
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Errors reported when validating a rig
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RigError {
    #[error("rig part not connected: {0}")]
    Missing(Part),
    #[error("rig parts not connected: {0:?}")]
    MissingMany(Vec<Part>),
}

/// Set of optional output parts
#[derive(Default)]
pub struct Rig {
    arm: Option<Box<dyn Pivot>>,
    disc: Option<Box<dyn Pivot>>,
    vinyl: Option<Box<dyn Spinner>>,
    audio: Option<Box<dyn AudioOutput>>,
}

impl fmt::Debug for Rig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rig")
            .field("arm", &self.arm.is_some())
            .field("disc", &self.disc.is_some())
            .field("vinyl", &self.vinyl.is_some())
            .field("audio", &self.audio.is_some())
            .finish()
    }
}

impl Rig {
    /// Create an empty rig
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arm(mut self, arm: impl Pivot + 'static) -> Self {
        self.arm = Some(Box::new(arm));
        self
    }

    pub fn with_disc(mut self, disc: impl Pivot + 'static) -> Self {
        self.disc = Some(Box::new(disc));
        self
    }

    pub fn with_vinyl(mut self, vinyl: impl Spinner + 'static) -> Self {
        self.vinyl = Some(Box::new(vinyl));
        self
    }

    pub fn with_audio(mut self, audio: impl AudioOutput + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    /// Check whether a part is connected
    pub fn has(&self, part: Part) -> bool {
        match part {
            Part::Arm => self.arm.is_some(),
            Part::Disc => self.disc.is_some(),
            Part::Vinyl => self.vinyl.is_some(),
            Part::Audio => self.audio.is_some(),
        }
    }

    /// List parts that are not connected
    pub fn missing(&self) -> Vec<Part> {
        Part::ALL.into_iter().filter(|p| !self.has(*p)).collect()
    }

    /// Fail if any part is not connected
    pub fn validate(&self) -> Result<(), RigError> {
        let mut missing = self.missing();
        match missing.len() {
            0 => Ok(()),
            1 => Err(RigError::Missing(missing.remove(0))),
            _ => Err(RigError::MissingMany(missing)),
        }
    }

    /// Log each missing part once; returns them
    pub fn report_missing(&self) -> Vec<Part> {
        let missing = self.missing();
        for part in &missing {
            warn!(part = part.display_name(), "rig part not connected, its output is skipped");
        }
        missing
    }
}

impl PlayerOutputs for Rig {
    fn set_arm_angle(&mut self, degrees: f32) {
        if let Some(arm) = self.arm.as_mut() {
            arm.set_yaw(degrees);
        }
    }

    fn set_disc_angle(&mut self, degrees: f32) {
        if let Some(disc) = self.disc.as_mut() {
            disc.set_yaw(degrees);
        }
    }

    fn apply_world_spin(&mut self, delta_degrees: f32) {
        if let Some(vinyl) = self.vinyl.as_mut() {
            vinyl.rotate_world_yaw(delta_degrees);
        }
    }

    fn set_audio_playing(&mut self, playing: bool) {
        // Only command the output when it disagrees with the gate
        if let Some(audio) = self.audio.as_mut() {
            match (playing, audio.is_playing()) {
                (true, false) => audio.play(),
                (false, true) => audio.stop(),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedPivot(Arc<Mutex<f32>>);

    impl Pivot for SharedPivot {
        fn set_yaw(&mut self, degrees: f32) {
            *self.0.lock().unwrap() = degrees;
        }
    }

    #[derive(Clone, Default)]
    struct SharedSpinner(Arc<Mutex<f32>>);

    impl Spinner for SharedSpinner {
        fn rotate_world_yaw(&mut self, delta_degrees: f32) {
            *self.0.lock().unwrap() += delta_degrees;
        }
    }

    /// Audio sink logging play (true) and stop (false) commands
    #[derive(Clone, Default)]
    struct SharedAudio {
        playing: Arc<Mutex<bool>>,
        log: Arc<Mutex<Vec<bool>>>,
    }

    impl SharedAudio {
        fn finish_clip(&self) {
            *self.playing.lock().unwrap() = false;
        }
    }

    impl AudioOutput for SharedAudio {
        fn is_playing(&self) -> bool {
            *self.playing.lock().unwrap()
        }
        fn play(&mut self) {
            *self.playing.lock().unwrap() = true;
            self.log.lock().unwrap().push(true);
        }
        fn stop(&mut self) {
            *self.playing.lock().unwrap() = false;
            self.log.lock().unwrap().push(false);
        }
    }

    #[test]
    fn test_empty_rig_missing_all() {
        let rig = Rig::new();
        assert_eq!(rig.missing(), Part::ALL.to_vec());
        assert_eq!(rig.validate(), Err(RigError::MissingMany(Part::ALL.to_vec())));
    }

    #[test]
    fn test_full_rig_validates() {
        let rig = Rig::new()
            .with_arm(SharedPivot::default())
            .with_disc(SharedPivot::default())
            .with_vinyl(SharedSpinner::default())
            .with_audio(SharedAudio::default());
        assert!(rig.missing().is_empty());
        assert!(rig.validate().is_ok());
    }

    #[test]
    fn test_single_missing_part() {
        let rig = Rig::new()
            .with_arm(SharedPivot::default())
            .with_disc(SharedPivot::default())
            .with_vinyl(SharedSpinner::default());
        assert_eq!(rig.validate(), Err(RigError::Missing(Part::Audio)));
        assert_eq!(
            RigError::Missing(Part::Audio).to_string(),
            "rig part not connected: audio"
        );
    }

    #[test]
    fn test_rig_routes_outputs() {
        let arm = SharedPivot::default();
        let disc = SharedPivot::default();
        let vinyl = SharedSpinner::default();
        let audio = SharedAudio::default();
        let mut rig = Rig::new()
            .with_arm(arm.clone())
            .with_disc(disc.clone())
            .with_vinyl(vinyl.clone())
            .with_audio(audio.clone());

        rig.set_arm_angle(12.0);
        rig.set_disc_angle(90.0);
        rig.apply_world_spin(4.0);
        rig.apply_world_spin(4.0);
        rig.set_audio_playing(true);
        rig.set_audio_playing(false);

        assert_eq!(*arm.0.lock().unwrap(), 12.0);
        assert_eq!(*disc.0.lock().unwrap(), 90.0);
        assert_eq!(*vinyl.0.lock().unwrap(), 8.0);
        assert_eq!(*audio.log.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_audio_commands_follow_output_state() {
        let audio = SharedAudio::default();
        let mut rig = Rig::new().with_audio(audio.clone());

        // Repeated gate values do not repeat commands
        rig.set_audio_playing(false);
        rig.set_audio_playing(true);
        rig.set_audio_playing(true);
        assert_eq!(*audio.log.lock().unwrap(), vec![true]);

        // Clip ended on its own; the next gate restarts it
        audio.finish_clip();
        rig.set_audio_playing(true);
        assert_eq!(*audio.log.lock().unwrap(), vec![true, true]);
        assert!(audio.is_playing());
    }

    #[test]
    fn test_missing_parts_are_skipped() {
        let disc = SharedPivot::default();
        let mut rig = Rig::new().with_disc(disc.clone());

        rig.set_arm_angle(30.0);
        rig.set_disc_angle(45.0);
        rig.apply_world_spin(1.0);
        rig.set_audio_playing(true);

        assert_eq!(*disc.0.lock().unwrap(), 45.0);
        assert_eq!(rig.report_missing(), vec![Part::Arm, Part::Vinyl, Part::Audio]);
    }
}
