//! Simulated input sequences for panels without real buttons.
//!
//! [`DemoScript`] is a pure step function advanced once per second;
//! [`DemoDriver`] runs it on a periodic task against shared
//! [`MockButton`]s.
//!
//! ## `all`
//!
//! ```text
//!  step:   0   1   2  ..  N-1  N  ..  N+9  N+10  N+11
//!          ▲   ▲   ▲       ▲   └─ hold ─┘   ▲    └ idle ┘
//!       press 0,1,2 ... N-1             release all
//! ```
//!
//! ## `random`
//!
//! Even steps give a random connect a random level; odd steps force
//! connect 0 pressed.  The reset button stays released.

use std::time::Duration;

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::DemoMode;
use crate::drivers::button::MockButton;
use crate::scheduler::PeriodicTask;

/// One script step per second.
pub const DEMO_STEP: Duration = Duration::from_secs(1);
/// Steps with every connect held in `all` mode.
const HOLD_STEPS: u64 = 10;
/// Steps with every connect released in `all` mode.
const IDLE_STEPS: u64 = 2;

/// The demo's schedule position.
pub struct DemoScript {
    mode: DemoMode,
    step: u64,
    rng: SmallRng,
}

impl DemoScript {
    /// `seed == 0` draws the RNG from OS entropy.
    pub fn new(mode: DemoMode, seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { mode, step: 0, rng }
    }

    pub fn mode(&self) -> DemoMode {
        self.mode
    }

    /// Length of one `all` cycle for `connects` batteries.
    pub fn all_cycle_len(connects: usize) -> u64 {
        connects as u64 + HOLD_STEPS + IDLE_STEPS
    }

    /// Apply the next step to the buttons.
    pub fn step(&mut self, reset: &MockButton, connects: &[MockButton]) {
        if connects.is_empty() {
            return;
        }
        match self.mode {
            DemoMode::All => self.step_all(connects),
            DemoMode::Random => self.step_random(reset, connects),
            DemoMode::Off => {}
        }
        self.step += 1;
    }

    fn step_all(&mut self, connects: &[MockButton]) {
        let n = connects.len() as u64;
        let pos = self.step % Self::all_cycle_len(connects.len());

        if pos < n {
            connects[pos as usize].set_pressed(true);
        } else if pos == n + HOLD_STEPS {
            debug!("Demo: releasing all connects");
            release_all(connects);
        }
    }

    fn step_random(&mut self, reset: &MockButton, connects: &[MockButton]) {
        reset.set_pressed(false);
        if self.step % 2 == 0 {
            let which = self.rng.gen_range(0..connects.len());
            let pressed = self.rng.gen_bool(0.5);
            debug!("Demo: connect {} -> {}", which, pressed);
            connects[which].set_pressed(pressed);
        } else {
            connects[0].set_pressed(true);
        }
    }
}

fn release_all(buttons: &[MockButton]) {
    for b in buttons {
        b.set_pressed(false);
    }
}

/// Runs a [`DemoScript`] in the background.
pub struct DemoDriver {
    reset: MockButton,
    connects: Vec<MockButton>,
    task: PeriodicTask,
}

impl DemoDriver {
    /// Start stepping `script` every `step`.  Buttons are clones that share
    /// state with the ones wired into the panel.
    pub fn start(
        mut script: DemoScript,
        reset: MockButton,
        connects: Vec<MockButton>,
        step: Duration,
    ) -> Self {
        info!("Demo: {:?} mode on {} connects", script.mode(), connects.len());

        let task = {
            let reset = reset.clone();
            let connects = connects.clone();
            PeriodicTask::spawn("demo", step, move || script.step(&reset, &connects))
        };

        Self {
            reset,
            connects,
            task,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }

    /// Stop stepping and release every button.  Idempotent.
    pub fn stop(&mut self) {
        if !self.task.is_running() {
            return;
        }
        self.task.stop();
        self.reset.set_pressed(false);
        release_all(&self.connects);
        info!("Demo: stopped");
    }
}

impl Drop for DemoDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
