//! Battery panel: host entry point.
//!
//! Builds a panel of simulated batteries on an in-memory strip, drives the
//! inputs from the demo script and logs telemetry until told to stop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  MonotonicClock   LogEventSink   MemoryLedStrip   MockButton*  │
//! │  (Clock)          (EventSink)    (LedStripPort)   (InputPort)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Panel (pure logic)                        │    │
//! │  │  Battery* (FSM + poll task) · SectionRenderer          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  PanelRunner (20 Hz) · DemoDriver (1 Hz)                       │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use log::info;

use battery_panel::adapters::led_strip::MemoryLedStrip;
use battery_panel::adapters::log_sink::LogEventSink;
use battery_panel::adapters::time::MonotonicClock;
use battery_panel::app::demo::{DEMO_STEP, DemoDriver, DemoScript};
use battery_panel::app::ports::Clock;
use battery_panel::app::service::{Panel, PanelParts, PanelRunner};
use battery_panel::battery::Battery;
use battery_panel::config::{DemoMode, Preset, SystemConfig};
use battery_panel::drivers::button::MockButton;

// ── Command line ──────────────────────────────────────────────

#[derive(Debug, Default)]
struct Args {
    config_path: Option<String>,
    preset: Option<Preset>,
    demo: Option<DemoMode>,
    run_secs: Option<u64>,
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = std::env::args().collect();
    let mut result = Args::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .with_context(|| format!("{} needs a value", flag))
        };
        match flag {
            "--config" | "-c" => result.config_path = Some(value()?),
            "--preset" | "-p" => result.preset = Some(value()?.parse()?),
            "--demo" | "-d" => result.demo = Some(value()?.parse()?),
            "--seconds" | "-s" => {
                let v = value()?;
                result.run_secs = Some(v.parse().with_context(|| format!("bad --seconds {}", v))?);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                print_help();
                bail!("unknown argument: {}", other);
            }
        }
        i += 1;
    }

    Ok(result)
}

fn print_help() {
    println!("battery-panel - battery charge-state simulator and LED panel");
    println!();
    println!("USAGE:");
    println!("    battery-panel [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>      JSON configuration file");
    println!("    -p, --preset <NAME>      default | fast | standard");
    println!("    -d, --demo <MODE>        all | random | off");
    println!("    -s, --seconds <N>        Stop after N seconds (0 = run forever)");
    println!("    -h, --help               Print help information");
    println!();
    println!("Set RUST_LOG=debug for per-input detail.");
}

fn load_config(args: &Args) -> Result<SystemConfig> {
    let mut config = match &args.config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path))?;
            SystemConfig::from_json(&text).with_context(|| format!("parsing config {}", path))?
        }
        None => SystemConfig::default(),
    };

    if let Some(preset) = args.preset {
        config.preset = Some(preset);
    }
    if let Some(demo) = args.demo {
        config.demo = demo;
    }
    if let Some(secs) = args.run_secs {
        config.run_secs = secs;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    // ── 2. Configuration ──────────────────────────────────────
    let args = parse_args()?;
    let config = load_config(&args)?;
    let battery_config = config.battery_config();

    info!("battery-panel v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "  {} batteries on {} LEDs, demo {:?}, preset {:?}",
        config.battery_count, config.led_count, config.demo, config.preset
    );

    // ── 3. Adapters ───────────────────────────────────────────
    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
    let reset = MockButton::new();
    let connects: Vec<MockButton> = (0..config.battery_count).map(|_| MockButton::new()).collect();
    let strip = MemoryLedStrip::new(config.led_count).context("allocating LED strip")?;

    // ── 4. Domain ─────────────────────────────────────────────
    let batteries = (0..config.battery_count)
        .map(|i| {
            Battery::with_clock(
                format!("battery-{}", i),
                &battery_config,
                Arc::clone(&clock),
                config.poll_interval(),
            )
        })
        .collect();

    let panel = Panel::new(
        PanelParts {
            batteries,
            reset: reset.clone(),
            connects: connects.clone(),
            strip,
        },
        config.spacing_leds,
        Arc::clone(&clock),
        config.demo_seed,
    )
    .context("assembling panel")?;

    let mut runner = PanelRunner::start(panel, LogEventSink::new(), config.panel_update_interval());
    let mut demo = (config.demo != DemoMode::Off).then(|| {
        DemoDriver::start(
            DemoScript::new(config.demo, config.demo_seed),
            reset,
            connects,
            DEMO_STEP,
        )
    });

    // ── 5. Telemetry loop ─────────────────────────────────────
    let started = Instant::now();
    let telemetry_every = Duration::from_secs(config.telemetry_interval_secs);
    let run_for = (config.run_secs > 0).then(|| Duration::from_secs(config.run_secs));

    loop {
        let wait = match run_for {
            Some(limit) => {
                let left = limit.saturating_sub(started.elapsed());
                if left.is_zero() {
                    break;
                }
                left.min(telemetry_every)
            }
            None => telemetry_every,
        };
        thread::sleep(wait);
        runner.emit_telemetry();
    }

    // ── 6. Shutdown ───────────────────────────────────────────
    if let Some(demo) = demo.as_mut() {
        demo.stop();
    }
    runner.stop();
    info!("battery-panel stopped after {:.1}s", started.elapsed().as_secs_f64());
    Ok(())
}
