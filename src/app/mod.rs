//! Headless host: loads config and report data, drives a [`Deck`] at a fixed
//! frame rate, replays an optional script and logs what a renderer would see.

mod runtime_loop;
pub mod script;

use crate::animation::{PropertyValue, PropertyWrite};
use crate::audio::AudioManager;
use crate::cli::CliOptions;
use crate::config::DeckConfig;
use crate::deck::{Deck, DeckCollaborators};
use crate::feedback::NoAffordance;
use crate::navigation::NavigationState;
use crate::report::ReportData;
use crate::scene::{RenderSink, SceneTree, PIVOT_ID};
use crate::time::{Clock, ManualClock, SystemClock, Time};
use anyhow::{Context, Result};
use runtime_loop::RuntimeLoop;
use script::{Script, ScriptPlayer};
use std::time::Duration;

/// Longest real-time backlog paid out in one go.
const MAX_BACKLOG_SECONDS: f32 = 0.25;

/// Totals for one headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub writes: u64,
    pub rebuilds: u64,
    pub events: u64,
    pub final_state: NavigationState,
    pub final_pivot_angle: f32,
}

/// Render sink that records counts and logs a summary once per simulated second.
#[derive(Debug, Default)]
pub struct LogSink {
    rebuilds: u64,
    writes: u64,
    window_writes: u64,
    window_rotation: Option<f32>,
}

impl LogSink {
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn flush_window(&mut self, second: u64) {
        tracing::info!(
            target: "render",
            second,
            writes = self.window_writes,
            pivot_rotation = self.window_rotation.map(f32::to_degrees),
            "frame window"
        );
        self.window_writes = 0;
    }
}

impl RenderSink for LogSink {
    fn rebuild(&mut self, tree: &SceneTree) {
        self.rebuilds += 1;
        tracing::info!(target: "render", title = %tree.title, view = ?tree.view, nodes = tree.nodes.len(), "scene rebuilt");
    }

    fn apply(&mut self, writes: &[PropertyWrite]) {
        self.writes += writes.len() as u64;
        self.window_writes += writes.len() as u64;
        for write in writes {
            if let PropertyValue::RotationY(angle) = write.value {
                if write.element.as_str() == PIVOT_ID {
                    self.window_rotation = Some(angle);
                }
            }
        }
    }
}

pub fn run(options: CliOptions) -> Result<RunSummary> {
    let mut config = DeckConfig::load_or_default(&options.config);
    if !options.overrides.is_empty() {
        tracing::info!(target: "app", fields = ?options.overrides.applied_fields(), "applying CLI overrides");
        config.apply_overrides(&options.overrides);
    }
    let report = ReportData::load(&options.report)
        .with_context(|| format!("Failed to load report data from {}", options.report.display()))?;
    let script = match &options.script {
        Some(path) => Script::load(path)?,
        None => Script::default(),
    };

    let audio = AudioManager::with_assets(config.audio.cue_log_capacity, &config.audio.assets());
    let manual_clock = ManualClock::new();
    let clock: Box<dyn Clock> =
        if options.realtime { Box::new(SystemClock::new()) } else { Box::new(manual_clock.clone()) };
    let deck = Deck::new(
        config,
        report,
        DeckCollaborators { audio: Box::new(audio), cursor: Box::new(NoAffordance), clock },
    );
    let mut host = Host { deck, player: ScriptPlayer::new(script), sink: LogSink::default(), frames: 0, events: 0 };

    let fixed_dt = 1.0 / options.fps as f32;
    tracing::info!(
        target: "app",
        seconds = options.seconds,
        fps = options.fps,
        realtime = options.realtime,
        "starting headless run"
    );
    if options.realtime {
        host.run_realtime(options.seconds, fixed_dt);
    } else {
        host.run_simulated(options.seconds, options.fps, &manual_clock);
    }
    Ok(host.finish())
}

struct Host {
    deck: Deck,
    player: ScriptPlayer,
    sink: LogSink,
    frames: u64,
    events: u64,
}

impl Host {
    fn run_simulated(&mut self, seconds: f32, fps: u32, clock: &ManualClock) {
        let total_frames = (seconds * fps as f32).ceil() as u64;
        let frame = Duration::from_secs_f64(1.0 / f64::from(fps));
        for index in 0..total_frames {
            let elapsed = index as f32 / fps as f32;
            self.step(elapsed, frame.as_secs_f32());
            clock.advance(frame);
            if (index + 1) % u64::from(fps) == 0 {
                self.sink.flush_window((index + 1) / u64::from(fps));
            }
        }
    }

    fn run_realtime(&mut self, seconds: f32, fixed_dt: f32) {
        let mut runtime = RuntimeLoop::new(Time::new(), fixed_dt);
        let mut simulated = 0.0_f32;
        let mut next_flush = 1.0_f32;
        while runtime.time().elapsed_seconds() < seconds {
            let tick = runtime.tick(MAX_BACKLOG_SECONDS);
            if let Some(dropped) = tick.dropped_backlog {
                tracing::debug!(target: "app", dropped, "frame backlog clamped");
            }
            while let Some(dt) = runtime.pop_fixed_step() {
                self.step(simulated, dt);
                simulated += dt;
                if simulated >= next_flush {
                    self.sink.flush_window(next_flush as u64);
                    next_flush += 1.0;
                }
            }
            std::thread::sleep(Duration::from_secs_f32(runtime.fixed_dt() * 0.5));
        }
    }

    fn step(&mut self, elapsed: f32, dt: f32) {
        for action in self.player.due(elapsed) {
            tracing::debug!(target: "script", at = elapsed, ?action, "replaying");
            script::apply(&mut self.deck, &action);
        }
        self.deck.tick(dt, &mut self.sink);
        self.frames += 1;
        for event in self.deck.drain_events() {
            self.events += 1;
            tracing::debug!(target: "deck", "{event}");
        }
    }

    fn finish(self) -> RunSummary {
        if self.player.remaining() > 0 {
            tracing::warn!(target: "script", remaining = self.player.remaining(), "run ended before every script step");
        }
        let summary = RunSummary {
            frames: self.frames,
            writes: self.sink.writes(),
            rebuilds: self.sink.rebuilds(),
            events: self.events,
            final_state: self.deck.state(),
            final_pivot_angle: self.deck.oscillator().angle(),
        };
        tracing::info!(target: "app", ?summary, "headless run finished");
        summary
    }
}
