#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context;
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use duotris::{Command, Controller, Duel, EventLog, MatchEvent, MatchSettings, Side};
#[cfg(not(target_arch = "wasm32"))]
use std::collections::VecDeque;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
#[cfg(not(target_arch = "wasm32"))]
use tokio::io::{AsyncBufReadExt, BufReader};
#[cfg(not(target_arch = "wasm32"))]
use tokio::time::{Instant, sleep_until};
#[cfg(not(target_arch = "wasm32"))]
use tracing::{Level, debug, info, warn};
#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::prelude::*;

/// Plays a duel in the terminal. Type `a`/`d`/`s`/`w` (or left/right/down/rotate)
/// followed by Enter to steer the player board.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
struct Opts {
    /// JSON file with match settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for piece generation, overrides the config
    #[arg(long)]
    seed: Option<u64>,
    /// Let the heuristic steer the player board as well
    #[arg(long)]
    autopilot: bool,
    /// Scales every interval; 0.1 plays ten times faster
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,
    /// Redraw both boards whenever one changes
    #[arg(long)]
    render: bool,
    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
    /// Stop after this many ticks across both boards
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wake {
    Tick(Side),
    EndSlowdown,
}

#[cfg(not(target_arch = "wasm32"))]
struct Scheduler {
    next_tick: [Instant; 2],
    intervals: [u32; 2],
    slowdown_ends: VecDeque<Instant>,
    slowdown_ms: u32,
    time_scale: f64,
}

#[cfg(not(target_arch = "wasm32"))]
impl Scheduler {
    fn new(duel: &Duel, time_scale: f64) -> Self {
        let now = Instant::now();
        let intervals = Side::both().map(|side| duel.drop_interval(side));
        let mut scheduler = Self {
            next_tick: [now; 2],
            intervals,
            slowdown_ends: VecDeque::new(),
            slowdown_ms: duel.settings().slowdown_duration_ms,
            time_scale,
        };
        for side in Side::both() {
            scheduler.next_tick[side.index()] = now + scheduler.scaled(intervals[side.index()]);
        }
        scheduler
    }

    fn scaled(&self, ms: u32) -> Duration {
        Duration::from_secs_f64(ms as f64 / 1000.0 * self.time_scale)
    }

    fn next_wake(&self) -> (Wake, Instant) {
        let [player, autoplayer] = self.next_tick;
        let mut wake = if autoplayer < player {
            (Wake::Tick(Side::Autoplayer), autoplayer)
        } else {
            (Wake::Tick(Side::Player), player)
        };
        if let Some(&end) = self.slowdown_ends.front() {
            if end <= wake.1 {
                wake = (Wake::EndSlowdown, end);
            }
        }
        wake
    }

    fn ticked(&mut self, side: Side, now: Instant) {
        self.next_tick[side.index()] = now + self.scaled(self.intervals[side.index()]);
    }

    fn slowdown_ended(&mut self) {
        self.slowdown_ends.pop_front();
    }

    fn observe(&mut self, event: &MatchEvent, now: Instant) {
        match event {
            MatchEvent::IntervalChanged { side, interval_ms } => {
                self.intervals[side.index()] = *interval_ms;
                self.ticked(*side, now);
            }
            MatchEvent::SlowdownStarted { .. } => {
                self.slowdown_ends
                    .push_back(now + self.scaled(self.slowdown_ms));
            }
            _ => {}
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings(opts: &Opts) -> anyhow::Result<MatchSettings> {
    let mut settings = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            MatchSettings::from_json(&text)
                .with_context(|| format!("parsing match settings in {}", path.display()))?
        }
        None => MatchSettings::default(),
    };
    if let Some(seed) = opts.seed {
        settings.seed = Some(seed);
    }
    if opts.autopilot {
        settings.player_controller = Controller::Autoplayer;
    }
    if !(opts.time_scale.is_finite() && opts.time_scale > 0.0) {
        anyhow::bail!("--time-scale must be positive");
    }
    settings
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid match settings")?;
    Ok(settings)
}

#[cfg(not(target_arch = "wasm32"))]
fn report(event: &MatchEvent) {
    match event {
        MatchEvent::GiftTriggered { from, to } => info!("{from} sent an easy piece to {to}"),
        MatchEvent::ExchangeTriggered {
            from,
            from_row,
            to,
            to_row,
        } => info!("{from} row {from_row} exchanged with {to} row {to_row}"),
        MatchEvent::SlowdownStarted { .. } => info!("slowdown for both boards"),
        MatchEvent::SlowdownEnded { .. } => info!("speed restored"),
        MatchEvent::ScoreChanged { side, score } => info!("{side} score {score}"),
        MatchEvent::GameOver { winner, loser } => info!("{loser} topped out, {winner} wins"),
        other => debug!(?other, "event"),
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_tracing(opts.verbose);
    let settings = load_settings(&opts)?;
    info!(?settings, "starting duel");

    let mut duel = Duel::new(settings, EventLog::new());
    let mut scheduler = Scheduler::new(&duel, opts.time_scale);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = !opts.autopilot;
    let mut ticks = 0u64;

    loop {
        let (wake, deadline) = scheduler.next_wake();
        tokio::select! {
            _ = sleep_until(deadline) => {
                let now = Instant::now();
                match wake {
                    Wake::Tick(side) => {
                        duel.tick(side);
                        scheduler.ticked(side, now);
                        ticks += 1;
                    }
                    Wake::EndSlowdown => {
                        scheduler.slowdown_ended();
                        duel.end_slowdown();
                    }
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line.context("reading stdin")? {
                    Some(line) => {
                        for token in line.split_whitespace() {
                            match token.parse::<Command>() {
                                Ok(command) => {
                                    if let Err(e) = duel.apply_input(Side::Player, command) {
                                        warn!("{e}");
                                    }
                                }
                                Err(e) => warn!("{e}"),
                            }
                        }
                    }
                    None => stdin_open = false,
                }
            }
        }

        let now = Instant::now();
        let mut redraw = false;
        for event in duel.observer_mut().drain() {
            scheduler.observe(&event, now);
            redraw |= matches!(event, MatchEvent::BoardChanged { .. });
            report(&event);
        }
        if redraw && opts.render {
            println!("{}", duel.snapshot().render_text());
        }
        if duel.is_finished() {
            break;
        }
        if opts.max_ticks.is_some_and(|max| ticks >= max) {
            info!(ticks, "tick limit reached");
            break;
        }
    }

    let snapshot = duel.snapshot();
    println!("{}", snapshot.render_text());
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    fn scheduler() -> (Duel, Scheduler) {
        let duel = Duel::new(MatchSettings::default().with_seed(3), EventLog::new());
        let scheduler = Scheduler::new(&duel, 1.0);
        (duel, scheduler)
    }

    #[test]
    fn earliest_deadline_wakes_first() {
        let (_, mut s) = scheduler();
        let now = Instant::now();
        s.next_tick = [now + Duration::from_millis(50), now + Duration::from_millis(20)];
        assert_eq!(s.next_wake().0, Wake::Tick(Side::Autoplayer));

        s.next_tick = [now + Duration::from_millis(20), now + Duration::from_millis(50)];
        assert_eq!(s.next_wake().0, Wake::Tick(Side::Player));

        // ties go to the player board
        s.next_tick = [now; 2];
        assert_eq!(s.next_wake(), (Wake::Tick(Side::Player), now));

        s.slowdown_ends.push_back(now);
        assert_eq!(s.next_wake(), (Wake::EndSlowdown, now));
    }

    #[test]
    fn interval_change_reschedules_that_side() {
        let (mut duel, mut s) = scheduler();
        let before = s.next_tick;
        let now = Instant::now();
        duel.start_slowdown();
        for event in duel.observer_mut().drain() {
            s.observe(&event, now);
        }
        assert_eq!(s.intervals, [360, 360]);
        for side in Side::both() {
            assert_eq!(s.next_tick[side.index()], now + s.scaled(360));
            assert_ne!(s.next_tick[side.index()], before[side.index()]);
        }
        assert_eq!(s.slowdown_ends.len(), 1);
    }

    #[test]
    fn overlapping_slowdowns_end_in_start_order() {
        let (_, mut s) = scheduler();
        let first = Instant::now();
        let second = first + Duration::from_secs(3);
        let started = MatchEvent::SlowdownStarted {
            sides: Side::both().to_vec(),
        };
        s.observe(&started, first);
        s.observe(&started, second);
        s.next_tick = [second + Duration::from_secs(60); 2];

        assert_eq!(s.next_wake(), (Wake::EndSlowdown, first + s.scaled(10_000)));
        s.slowdown_ended();
        assert_eq!(s.next_wake(), (Wake::EndSlowdown, second + s.scaled(10_000)));
        s.slowdown_ended();
        assert_eq!(s.next_wake().0, Wake::Tick(Side::Player));
    }

    #[test]
    fn time_scale_shrinks_intervals() {
        let duel = Duel::new(MatchSettings::default().with_seed(3), EventLog::new());
        let fast = Scheduler::new(&duel, 0.5);
        assert_eq!(fast.scaled(300), Duration::from_secs_f64(0.15));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let opts = Opts::try_parse_from(["duel_cli", "--time-scale", "0"]).unwrap();
        assert!(load_settings(&opts).is_err());

        let path = std::env::temp_dir().join(format!("duotris-settings-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "base_interval_ms": 0, "slowdown_factor": -1.0 }"#).unwrap();
        let opts = Opts::try_parse_from(["duel_cli", "--config", path.to_str().unwrap()]).unwrap();
        let err = load_settings(&opts).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(format!("{err:#}").contains("base_interval_ms"));

        let opts = Opts::try_parse_from(["duel_cli", "--seed", "7", "--autopilot"]).unwrap();
        let settings = load_settings(&opts).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.player_controller, Controller::Autoplayer);
    }
}
