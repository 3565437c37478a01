//! MockReel Capture Engine
//!
//! Records an automated pass over every scene in the store: one display
//! stream, one recorder, and a scene sequence that pauses, switches, resets
//! and resumes the stage between scenes so every captured frame shows a
//! settled scene.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 RecordingSession                 │
//! │  ┌───────────┐  effects  ┌────────────────────┐  │
//! │  │ Sequencer │ ────────▶ │ SessionStore       │  │
//! │  └─────▲─────┘           │ (scene store)      │  │
//! │        │ timers          └─────────┬──────────┘  │
//! │  ┌─────┴─────┐                     │ pulse       │
//! │  │ Scheduler │           ┌─────────▼──────────┐  │
//! │  └───────────┘           │ Stage              │  │
//! │                          └────────────────────┘  │
//! │  CaptureBackend ─▶ CaptureStream ─▶ MediaRecorder │
//! │                                   │ events       │
//! │                                   ▼              │
//! │                               Artifact           │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod artifact;
pub mod backend;
pub mod driver;
pub mod scheduler;
pub mod sequence;
pub mod session;
pub mod stage;

pub use artifact::Artifact;
pub use backend::{get_backend, BackendKind, SimulatedBackend, SimulatedConfig, SimulatedProbe};
pub use driver::{drive, DriveOptions, DriveReport, Pace, TimelineEntry, TimelineEvent};
pub use scheduler::{Scheduler, TaskId};
pub use sequence::{Effect, SequencePhase, Sequencer, Timer};
pub use session::{RecordingSession, SessionConfig, SessionState};
pub use stage::{pass_duration, Stage, TimedStage};
