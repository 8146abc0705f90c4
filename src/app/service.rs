//! Application service: the panel.
//!
//! [`Panel`] owns the batteries, the inputs that drive them and the strip
//! that shows them.  All I/O flows through port traits, making the whole
//! panel testable with mock adapters.
//!
//! ```text
//!  InputPort (reset)    ──▶ ┌──────────────────────────┐ ──▶ LedStripPort
//!  InputPort (connect)* ──▶ │          Panel           │
//!                           │  Battery* · Renderer     │ ──▶ EventSink
//!                           └──────────────────────────┘
//! ```
//!
//! Batteries poll themselves; the panel only pushes input samples into them
//! and renders their snapshots.  [`PanelRunner`] calls [`Panel::update`] on
//! a periodic task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};
use parking_lot::Mutex;

use crate::battery::{Battery, BatteryInfo};
use crate::drivers::led_patterns::{Section, SectionRenderer};
use crate::error::{Error, Result};
use crate::fsm::SystemState;
use crate::scheduler::PeriodicTask;

use super::events::{AppEvent, TelemetryData};
use super::ports::{Clock, EventSink, InputPort, LedStripPort, Rgb};

/// Dark LEDs between two battery sections unless configured otherwise.
pub const DEFAULT_SPACING_LEDS: usize = 4;
/// 20 Hz.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(50);

// ───────────────────────────────────────────────────────────────
// Layout
// ───────────────────────────────────────────────────────────────

/// How the strip is split between batteries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    pub sections: usize,
    pub section_len: usize,
    pub spacing: usize,
}

impl PanelLayout {
    /// `section_len = (leds - spacing * (sections - 1)) / sections`, which
    /// must leave at least one LED per battery.
    pub fn new(leds: usize, sections: usize, spacing: usize) -> Result<Self> {
        if sections == 0 {
            return Err(Error::Config("panel needs at least one battery"));
        }
        let gaps = spacing.saturating_mul(sections - 1);
        let section_len = leds.saturating_sub(gaps) / sections;
        if section_len == 0 {
            return Err(Error::Config("strip too short for battery sections"));
        }
        Ok(Self {
            sections,
            section_len,
            spacing,
        })
    }

    pub fn section(&self, index: usize) -> Section {
        Section {
            start: index * (self.section_len + self.spacing),
            len: self.section_len,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Panel
// ───────────────────────────────────────────────────────────────

/// Everything a panel is assembled from.
pub struct PanelParts<S, I> {
    pub batteries: Vec<Battery>,
    /// Held: every battery is forced `Charged`.
    pub reset: I,
    /// One per battery: pressed means the load is connected.
    pub connects: Vec<I>,
    pub strip: S,
}

pub struct Panel<S, I> {
    batteries: Vec<Battery>,
    reset: I,
    connects: Vec<I>,
    strip: S,
    layout: PanelLayout,
    renderer: SectionRenderer,
    clock: Arc<dyn Clock>,
    last_update: Instant,
    /// Last reset reading pushed into the batteries.
    override_held: bool,
    /// State of each battery as of the previous update.
    last_states: Vec<SystemState>,
    updates: u64,
    stopped: bool,
}

impl<S: LedStripPort, I: InputPort> Panel<S, I> {
    /// Assemble a panel.  Fails if the inputs do not match the batteries or
    /// the strip cannot fit a section per battery.
    pub fn new(
        parts: PanelParts<S, I>,
        spacing: usize,
        clock: Arc<dyn Clock>,
        seed: u64,
    ) -> Result<Self> {
        let PanelParts {
            batteries,
            reset,
            connects,
            strip,
        } = parts;

        if connects.len() != batteries.len() {
            return Err(Error::Config("one connect input is needed per battery"));
        }
        let layout = PanelLayout::new(strip.len(), batteries.len(), spacing)?;
        let last_states = batteries.iter().map(|b| b.info().state).collect();

        info!(
            "Panel: {} batteries, {} LEDs each, {} spacing",
            layout.sections, layout.section_len, layout.spacing
        );

        Ok(Self {
            batteries,
            reset,
            connects,
            strip,
            layout,
            renderer: SectionRenderer::new(seed),
            last_update: clock.now(),
            clock,
            override_held: false,
            last_states,
            updates: 0,
            stopped: false,
        })
    }

    // ── Per-update orchestration ──────────────────────────────

    /// Run one panel cycle: inputs → batteries → animation → strip.
    pub fn update(&mut self, sink: &mut impl EventSink) {
        if self.stopped {
            return;
        }
        self.updates += 1;

        let now = self.clock.now();
        let dt = now.saturating_duration_since(self.last_update);
        self.last_update = now;

        // 1. Reset input drives the override of every battery
        let reset = self.reset.is_pressed();
        if reset != self.override_held {
            self.override_held = reset;
            for battery in &self.batteries {
                battery.set_charged_override(reset);
            }
            sink.emit(&AppEvent::OverrideChanged { active: reset });
        }

        // 2. Connect inputs drive the drain flags
        for (battery, connect) in self.batteries.iter().zip(self.connects.iter_mut()) {
            battery.set_is_draining(connect.is_pressed());
        }

        // 3. Animation phases follow real elapsed time
        self.renderer.advance(dt);

        // 4. Redraw every section from a fresh snapshot
        self.strip.fill(Rgb::BLACK);
        for (i, battery) in self.batteries.iter().enumerate() {
            let info = battery.info();
            if info.state != self.last_states[i] {
                sink.emit(&AppEvent::StateChanged {
                    battery: i,
                    from: self.last_states[i],
                    to: info.state,
                });
                self.last_states[i] = info.state;
            }
            self.renderer
                .render(&mut self.strip, self.layout.section(i), &info);
        }
        self.strip.show();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn infos(&self) -> Vec<BatteryInfo> {
        self.batteries.iter().map(Battery::info).collect()
    }

    /// Snapshot of one battery, `None` for an invalid index.
    pub fn battery_info(&self, index: usize) -> Option<BatteryInfo> {
        self.batteries.get(index).map(Battery::info)
    }

    pub fn telemetry(&self) -> TelemetryData {
        TelemetryData {
            batteries: self.infos(),
        }
    }

    pub fn batteries(&self) -> &[Battery] {
        &self.batteries
    }

    pub fn layout(&self) -> PanelLayout {
        self.layout
    }

    pub fn strip(&self) -> &S {
        &self.strip
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Stop every battery and blank the strip.  Idempotent.
    pub fn shutdown(&mut self, sink: &mut impl EventSink) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        for battery in &self.batteries {
            battery.stop();
        }
        self.strip.fill(Rgb::BLACK);
        self.strip.show();

        sink.emit(&AppEvent::Stopped);
        info!("Panel: shut down after {} updates", self.updates);
    }
}

// ───────────────────────────────────────────────────────────────
// PanelRunner
// ───────────────────────────────────────────────────────────────

/// Drives a [`Panel`] from its own periodic task.
pub struct PanelRunner<S, I, K> {
    panel: Arc<Mutex<Panel<S, I>>>,
    sink: Arc<Mutex<K>>,
    task: PeriodicTask,
}

impl<S, I, K> PanelRunner<S, I, K>
where
    S: LedStripPort + Send + 'static,
    I: InputPort + Send + 'static,
    K: EventSink + Send + 'static,
{
    /// Emit `Started` and begin updating every `interval`.
    pub fn start(panel: Panel<S, I>, sink: K, interval: Duration) -> Self {
        let batteries = panel.batteries().len();
        let panel = Arc::new(Mutex::new(panel));
        let sink = Arc::new(Mutex::new(sink));

        sink.lock().emit(&AppEvent::Started { batteries });

        let task = {
            let panel = Arc::clone(&panel);
            let sink = Arc::clone(&sink);
            PeriodicTask::spawn("panel-update", interval, move || {
                let mut sink = sink.lock();
                panel.lock().update(&mut *sink);
            })
        };
        debug!("PanelRunner: updating every {:?}", interval);

        Self { panel, sink, task }
    }

    /// Run `f` against the panel under its lock.
    pub fn with_panel<R>(&self, f: impl FnOnce(&Panel<S, I>) -> R) -> R {
        let guard = self.panel.lock();
        f(&*guard)
    }

    /// Forward an event to the runner's sink (telemetry from the host).
    pub fn emit(&self, event: &AppEvent) {
        self.sink.lock().emit(event);
    }

    pub fn emit_telemetry(&self) {
        let telemetry = self.panel.lock().telemetry();
        self.emit(&AppEvent::Telemetry(telemetry));
    }

    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }

    /// Stop updating, then shut the panel down.  Idempotent.
    pub fn stop(&mut self) {
        if !self.task.is_running() {
            return;
        }
        self.task.stop();
        let mut sink = self.sink.lock();
        self.panel.lock().shutdown(&mut *sink);
    }
}
