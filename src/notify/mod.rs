//! Audible alert cues.
//!
//! The detector hands every emitted alert to a [`Notifier`]. The default
//! writes a terminal bell; with the `audio` feature the synthesized tone is
//! played on the default output device instead.

#[cfg(feature = "audio")]
mod audio;
mod tone;

#[cfg(feature = "audio")]
pub use audio::ToneNotifier;
pub use tone::ToneSpec;

use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::data::{AlertKind, CrewAlert};

/// Receives alerts raised by the detector.
pub trait Notifier: Send {
    fn notify(&mut self, alert: &CrewAlert);
}

/// Rings the terminal bell: once for stressed, twice for critical.
///
/// The bell goes to stderr so it never lands in the middle of a frame that
/// ratatui is writing to stdout.
#[derive(Debug, Default)]
pub struct BellNotifier;

impl BellNotifier {
    /// Write the bell for `kind` to `out`.
    pub fn ring<W: Write>(&self, kind: AlertKind, out: &mut W) -> std::io::Result<()> {
        let bell: &[u8] = match kind {
            AlertKind::Critical => b"\x07\x07",
            AlertKind::Stressed => b"\x07",
        };
        out.write_all(bell)?;
        out.flush()
    }
}

impl Notifier for BellNotifier {
    fn notify(&mut self, alert: &CrewAlert) {
        if let Err(e) = self.ring(alert.kind, &mut std::io::stderr()) {
            warn!(error = %e, "failed to ring terminal bell");
        }
    }
}

/// Visual alerts only.
#[derive(Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&mut self, alert: &CrewAlert) {
        debug!(kind = alert.kind.label(), "sound disabled, skipping cue");
    }
}

/// Keeps every alert it receives. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<CrewAlert>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<CrewAlert> {
        self.alerts.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn kinds(&self) -> Vec<AlertKind> {
        self.alerts().iter().map(|a| a.kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, alert: &CrewAlert) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(alert.clone());
        }
    }
}

/// Pick the notifier for the given settings.
///
/// With `sound` off alerts stay visual. With the `audio` feature the tone
/// player is tried first and the bell is the fallback.
pub fn from_settings(sound: bool) -> Box<dyn Notifier> {
    if !sound {
        return Box::new(SilentNotifier);
    }

    #[cfg(feature = "audio")]
    {
        match ToneNotifier::new() {
            Ok(notifier) => return Box::new(notifier),
            Err(e) => warn!(error = %e, "audio output unavailable, using terminal bell"),
        }
    }

    Box::new(BellNotifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(kind: AlertKind) -> CrewAlert {
        CrewAlert {
            kind,
            astronaut_id: "a1".to_string(),
            astronaut_name: "Ana Torres".to_string(),
        }
    }

    #[test]
    fn test_recording_notifier_shares_log() {
        let recorder = RecordingNotifier::new();
        let mut handle = recorder.clone();
        handle.notify(&alert(AlertKind::Stressed));
        handle.notify(&alert(AlertKind::Critical));

        assert_eq!(recorder.kinds(), vec![AlertKind::Stressed, AlertKind::Critical]);
        assert_eq!(recorder.alerts()[0].astronaut_name, "Ana Torres");
    }

    #[test]
    fn test_bell_rings_per_kind() {
        let mut out = Vec::new();
        BellNotifier.ring(AlertKind::Critical, &mut out).unwrap();
        assert_eq!(out, b"\x07\x07");

        out.clear();
        BellNotifier.ring(AlertKind::Stressed, &mut out).unwrap();
        assert_eq!(out, b"\x07");
    }

    #[test]
    fn test_silent_notifier_does_nothing() {
        let mut notifier = from_settings(false);
        notifier.notify(&alert(AlertKind::Critical));
    }
}
