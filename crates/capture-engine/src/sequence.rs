//! Scene sequencing as an explicit state machine.
//!
//! The sequencer is pure: it never touches the store or a clock. Each input
//! (start, an animation-finished pulse, a fired timer) returns the list of
//! [`Effect`]s the orchestrator must apply, in order.
//!
//! ```text
//!  start ──▶ Starting ──Resume──▶ WaitingForFinish ──pulse──▶ Pausing
//!                                    ▲                           │ Switch
//!                                    │ Resume                    ▼
//!                                 Resetting ◀──Reset────── Switching
//!
//!  pulse on the last scene ──▶ Done
//! ```
//!
//! The resume step is instantaneous: the `Resume` timer takes `Starting` or
//! `Resetting` straight back to `WaitingForFinish`.

use std::time::Duration;

use mockreel_common::config::SequenceTimings;

/// Where the sequence currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencePhase {
    /// No recording pass in progress.
    Idle,
    /// First scene shown and reset; waiting for the start delay.
    Starting,
    /// Scene `scene` is playing; waiting for its finished pulse.
    WaitingForFinish { scene: usize },
    /// Playback paused; waiting to switch to `next`.
    Pausing { next: usize },
    /// Switched to `scene`; waiting for its enter transition.
    Switching { scene: usize },
    /// Reset issued for `scene`; waiting to resume playback.
    Resetting { scene: usize },
    /// Pass complete or cancelled.
    Done,
}

/// Delayed steps of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Activate scene `to`.
    Switch { to: usize },
    /// Restart the animation of `scene`.
    Reset { scene: usize },
    /// Start playing `scene`.
    Resume { scene: usize },
}

/// A single action for the orchestrator to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ClearFinished,
    SetPlaying(bool),
    ActivateScene(usize),
    TriggerReset,
    Schedule { after: Duration, timer: Timer },
    FinishRecording,
}

/// Drives one recording pass across the scene list.
#[derive(Debug, Clone)]
pub struct Sequencer {
    timings: SequenceTimings,
    phase: SequencePhase,
}

impl Sequencer {
    pub fn new(timings: SequenceTimings) -> Self {
        Self {
            timings,
            phase: SequencePhase::Idle,
        }
    }

    pub fn phase(&self) -> SequencePhase {
        self.phase
    }

    pub fn timings(&self) -> &SequenceTimings {
        &self.timings
    }

    /// Begin a pass at the first scene.
    pub fn start(&mut self) -> Vec<Effect> {
        self.phase = SequencePhase::Starting;
        vec![
            Effect::ActivateScene(0),
            Effect::TriggerReset,
            Effect::Schedule {
                after: self.timings.start_delay(),
                timer: Timer::Resume { scene: 0 },
            },
        ]
    }

    /// Handle the rendering layer's "animation finished" pulse.
    ///
    /// The pulse is always consumed. It only advances the sequence while a
    /// scene is playing; anywhere else it is a late or duplicate pulse.
    pub fn on_animation_finished(&mut self, current: usize, scene_count: usize) -> Vec<Effect> {
        let mut effects = vec![Effect::ClearFinished];

        let SequencePhase::WaitingForFinish { scene } = self.phase else {
            tracing::debug!(phase = ?self.phase, "Ignoring animation pulse outside playback");
            return effects;
        };
        if scene != current {
            tracing::debug!(expected = scene, current, "Active scene moved during playback");
        }

        let next = current + 1;
        if next < scene_count {
            tracing::debug!(from = current, to = next, "Scene finished, advancing");
            self.phase = SequencePhase::Pausing { next };
            effects.push(Effect::SetPlaying(false));
            effects.push(Effect::Schedule {
                after: self.timings.settle(),
                timer: Timer::Switch { to: next },
            });
        } else {
            tracing::debug!(scene = current, "Last scene finished");
            self.phase = SequencePhase::Done;
            effects.push(Effect::FinishRecording);
        }
        effects
    }

    /// Handle a fired timer. Timers that no longer match the phase are stale
    /// and produce no effects.
    pub fn on_timer(&mut self, timer: Timer) -> Vec<Effect> {
        match (self.phase, timer) {
            (SequencePhase::Pausing { next }, Timer::Switch { to }) if next == to => {
                self.phase = SequencePhase::Switching { scene: to };
                vec![
                    Effect::ActivateScene(to),
                    Effect::Schedule {
                        after: self.timings.transition(),
                        timer: Timer::Reset { scene: to },
                    },
                ]
            }
            (SequencePhase::Switching { scene }, Timer::Reset { scene: target })
                if scene == target =>
            {
                self.phase = SequencePhase::Resetting { scene };
                vec![
                    Effect::TriggerReset,
                    Effect::Schedule {
                        after: self.timings.resume_delay(),
                        timer: Timer::Resume { scene },
                    },
                ]
            }
            (SequencePhase::Starting, Timer::Resume { scene: 0 }) => {
                self.phase = SequencePhase::WaitingForFinish { scene: 0 };
                vec![Effect::SetPlaying(true)]
            }
            (SequencePhase::Resetting { scene }, Timer::Resume { scene: target })
                if scene == target =>
            {
                self.phase = SequencePhase::WaitingForFinish { scene };
                vec![Effect::SetPlaying(true)]
            }
            (phase, timer) => {
                tracing::debug!(?phase, ?timer, "Dropping stale sequence timer");
                Vec::new()
            }
        }
    }

    /// End the pass early.
    pub fn cancel(&mut self) {
        if self.phase != SequencePhase::Idle {
            self.phase = SequencePhase::Done;
        }
    }

    /// Whether the pass is still in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, SequencePhase::Idle | SequencePhase::Done)
    }
}
