//! Capture backends.
//!
//! The traits live in `mockreel-platform-core`; this module provides the
//! implementations and picks one by name.

use std::str::FromStr;

use mockreel_common::error::{MockreelError, MockreelResult};
pub use mockreel_platform_core::{CaptureBackend, CaptureStream, MediaRecorder};
use mockreel_platform_core::StageRect;

#[cfg(feature = "gst")]
pub mod gst;
pub mod simulated;

#[cfg(feature = "gst")]
pub use gst::GstBackend;
pub use simulated::{SimulatedBackend, SimulatedConfig, SimulatedProbe};

/// Available backend implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Headless backend with a synthetic recorder.
    #[default]
    Simulated,
    /// X11 capture through GStreamer.
    Gstreamer,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::Gstreamer => "gstreamer",
        }
    }

    /// Whether this build can construct the backend.
    pub fn is_available(self) -> bool {
        match self {
            Self::Simulated => true,
            Self::Gstreamer => cfg!(feature = "gst"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = MockreelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simulated" | "sim" => Ok(Self::Simulated),
            "gstreamer" | "gst" | "x11" => Ok(Self::Gstreamer),
            other => Err(MockreelError::config(format!("Unknown backend '{other}'"))),
        }
    }
}

/// Construct a backend. `stage` is the stage region on screen.
pub fn get_backend(
    kind: BackendKind,
    stage: Option<StageRect>,
) -> MockreelResult<Box<dyn CaptureBackend>> {
    match kind {
        BackendKind::Simulated => Ok(Box::new(SimulatedBackend::new(SimulatedConfig {
            stage,
            ..SimulatedConfig::default()
        }))),
        #[cfg(feature = "gst")]
        BackendKind::Gstreamer => Ok(Box::new(GstBackend::new(
            stage,
            std::env::var("DISPLAY").ok(),
        ))),
        #[cfg(not(feature = "gst"))]
        BackendKind::Gstreamer => Err(MockreelError::unsupported(
            "This build has no GStreamer support; rebuild with --features gst",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("SIM".parse::<BackendKind>().unwrap(), BackendKind::Simulated);
        assert_eq!("x11".parse::<BackendKind>().unwrap(), BackendKind::Gstreamer);
        assert!("wayland".parse::<BackendKind>().is_err());
    }

    #[test]
    fn simulated_backend_uses_given_stage() {
        let stage = StageRect::new(5.0, 5.0, 100.0, 200.0);
        let backend = get_backend(BackendKind::Simulated, Some(stage)).unwrap();
        assert_eq!(backend.name(), "simulated");
        assert_eq!(backend.stage_bounds(), Some(stage));
    }

    #[cfg(not(feature = "gst"))]
    #[test]
    fn gstreamer_requires_feature() {
        assert!(!BackendKind::Gstreamer.is_available());
        let err = get_backend(BackendKind::Gstreamer, None).err().unwrap();
        assert!(err.is_capability_failure());
    }
}
