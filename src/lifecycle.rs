//! Show/hide lifecycle for a maze round, modelled as an explicit finite
//! state machine. The machine owns no clock: a collaborator feeds it elapsed
//! time through `tick` and reads the state and animation progress back. It
//! is independent of the maze core - regenerating a grid between rounds is
//! the caller's business (discard rendered geometry, generate, show again).

/// The states a maze round moves through. `ShowingComplete` and
/// `HidingComplete` are observed for one tick before the machine settles
/// into `Running` or waits for `begin_show`.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum LifecycleState {
    Startup,
    Showing,
    ShowingComplete,
    Running,
    Hiding,
    HidingComplete,
}

#[derive(Debug, Copy, Clone)]
pub struct MazeLifecycle {
    state: LifecycleState,
    elapsed_seconds: f32,
    show_seconds: f32,
    hide_seconds: f32,
}

impl MazeLifecycle {
    pub fn new(show_seconds: f32, hide_seconds: f32) -> MazeLifecycle {
        MazeLifecycle {
            state: LifecycleState::Startup,
            elapsed_seconds: 0.0,
            show_seconds,
            hide_seconds,
        }
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Start revealing a maze. Valid from `Startup` and from
    /// `HidingComplete` (a new round); ignored elsewhere.
    pub fn begin_show(&mut self) {
        match self.state {
            LifecycleState::Startup | LifecycleState::HidingComplete => {
                self.state = LifecycleState::Showing;
                self.elapsed_seconds = 0.0;
            }
            _ => {}
        }
    }

    /// Start hiding the current maze, e.g. when the finish marker is
    /// triggered. Valid from `Running`; ignored elsewhere.
    pub fn begin_hide(&mut self) {
        if self.state == LifecycleState::Running {
            self.state = LifecycleState::Hiding;
            self.elapsed_seconds = 0.0;
        }
    }

    /// Advance the machine by an externally measured time slice and return
    /// the state after the transition.
    pub fn tick(&mut self, elapsed_seconds: f32) -> LifecycleState {
        match self.state {
            LifecycleState::Showing => {
                self.elapsed_seconds += elapsed_seconds;
                if self.elapsed_seconds >= self.show_seconds {
                    self.state = LifecycleState::ShowingComplete;
                }
            }
            LifecycleState::ShowingComplete => {
                self.state = LifecycleState::Running;
            }
            LifecycleState::Hiding => {
                self.elapsed_seconds += elapsed_seconds;
                if self.elapsed_seconds >= self.hide_seconds {
                    self.state = LifecycleState::HidingComplete;
                }
            }
            LifecycleState::Startup | LifecycleState::Running | LifecycleState::HidingComplete => {}
        }
        self.state
    }

    /// Animation progress in 0..1 for the active transition: how far the
    /// show or hide has come. Settled states report 0 (nothing visible yet /
    /// hidden again) or 1 (fully shown).
    pub fn progress(&self) -> f32 {
        let ratio = |elapsed: f32, duration: f32| {
            if duration <= 0.0 {
                1.0
            } else {
                (elapsed / duration).min(1.0)
            }
        };
        match self.state {
            LifecycleState::Startup => 0.0,
            LifecycleState::Showing => ratio(self.elapsed_seconds, self.show_seconds),
            LifecycleState::ShowingComplete | LifecycleState::Running => 1.0,
            LifecycleState::Hiding => 1.0 - ratio(self.elapsed_seconds, self.hide_seconds),
            LifecycleState::HidingComplete => 0.0,
        }
    }
}
