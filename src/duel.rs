use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::autoplayer::{Placement, make_ai_move};
use crate::events::{EventLog, MatchObserver};
use crate::log;
use crate::pieces::PieceKind;
use crate::session::{ClearReport, Session, Side, TickOutcome};
use crate::settings::{Controller, MatchSettings};
use crate::view::DuelView;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "h" | "left" | "move_left" => Ok(Command::MoveLeft),
            "d" | "l" | "right" | "move_right" => Ok(Command::MoveRight),
            "s" | "j" | "down" | "soft_drop" => Ok(Command::SoftDrop),
            "w" | "k" | "up" | "rotate" => Ok(Command::Rotate),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

pub struct Duel<O: MatchObserver = EventLog> {
    sessions: [Session; 2],
    settings: MatchSettings,
    observer: O,
    winner: Option<Side>,
    targets: [Option<Placement>; 2],
}

impl<O: MatchObserver> Duel<O> {
    pub fn new(settings: MatchSettings, observer: O) -> Self {
        let mut seeder = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let player = Session::new(
            Side::Player,
            settings.player_controller,
            settings.base_interval_ms,
            StdRng::seed_from_u64(seeder.r#gen()),
        );
        let autoplayer = Session::new(
            Side::Autoplayer,
            Controller::Autoplayer,
            settings.base_interval_ms,
            StdRng::seed_from_u64(seeder.r#gen()),
        );
        Self {
            sessions: [player, autoplayer],
            settings,
            observer,
            winner: None,
            targets: [None, None],
        }
    }

    pub fn session(&self, side: Side) -> &Session {
        &self.sessions[side.index()]
    }

    pub fn session_mut(&mut self, side: Side) -> &mut Session {
        &mut self.sessions[side.index()]
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn drop_interval(&self, side: Side) -> u32 {
        self.sessions[side.index()].drop_interval()
    }

    pub fn target(&self, side: Side) -> Option<&Placement> {
        self.targets[side.index()].as_ref()
    }

    pub fn snapshot(&self) -> DuelView {
        DuelView::capture(&self.sessions, self.winner, &self.settings)
    }

    fn pair_mut(&mut self, side: Side) -> (&mut Session, &mut Session) {
        let [player, autoplayer] = &mut self.sessions;
        match side {
            Side::Player => (player, autoplayer),
            Side::Autoplayer => (autoplayer, player),
        }
    }

    /// One gravity step for `side`. A piece that cannot fall locks, its clears
    /// are scored and their effects applied, then the next piece spawns.
    /// Autoplayer-controlled sides also take one steering step.
    pub fn tick(&mut self, side: Side) -> TickOutcome {
        if self.is_finished() {
            return TickOutcome::Idle;
        }
        let idx = side.index();
        let outcome = match self.sessions[idx].fall_or_lock() {
            None => TickOutcome::Fell,
            Some(report) => self.settle(side, report),
        };

        if !self.is_finished() && self.sessions[idx].controller() == Controller::Autoplayer {
            self.targets[idx] = make_ai_move(&mut self.sessions[idx]);
        }
        self.observer.on_board_changed(&self.sessions[idx]);
        outcome
    }

    // Effects land between lock and spawn.
    fn settle(&mut self, side: Side, report: ClearReport) -> TickOutcome {
        let idx = side.index();
        if report.cleared > 0 {
            self.observer
                .on_score_changed(&self.sessions[idx], report.score);
            self.apply_clear_effects(side, &report);
        }
        let spawned = self.sessions[idx].spawn();
        self.observer.on_next_piece_changed(&self.sessions[idx]);
        if !spawned {
            self.finish(side);
        }
        TickOutcome::Locked {
            report,
            topped_out: !spawned,
        }
    }

    fn apply_clear_effects(&mut self, side: Side, report: &ClearReport) {
        match report.cleared {
            2 => {
                self.gift(side);
            }
            4 => {
                self.exchange(side);
            }
            _ => {}
        }
        if report.milestone_crossed() {
            self.start_slowdown();
        }
    }

    pub fn gift(&mut self, from: Side) -> PieceKind {
        let to = from.opponent();
        let easy = PieceKind::easy();
        let pick = self.sessions[from.index()]
            .rng()
            .gen_range(0..easy.len());
        let kind = easy[pick];
        self.sessions[to.index()].set_next(kind);
        log(&format!("[{from}] gift: {to} gets {kind:?} next"));
        self.observer.on_gift_triggered(from, to);
        self.observer
            .on_next_piece_changed(&self.sessions[to.index()]);
        kind
    }

    /// Swaps the bottom-most full row of `from` with the bottom-most empty row
    /// of its opponent, or does nothing when either row is missing.
    ///
    /// Unlike a plain swap, this is also skipped when the opponent's falling
    /// piece has a cell in that empty row, since the incoming full row would
    /// overlap it. During a tick rows are cleared before this runs, so the
    /// extra check only matters for boards set up by hand.
    pub fn exchange(&mut self, from: Side) -> Option<(usize, usize)> {
        let (me, opponent) = self.pair_mut(from);
        let row = me.board().bottom_full_row()?;
        let opponent_row = opponent.board().bottom_empty_row()?;
        if opponent
            .active()
            .cells()
            .any(|(_, y)| y == opponent_row as i32)
        {
            return None;
        }
        me.board_mut()
            .swap_row(row, opponent.board_mut(), opponent_row);

        let to = from.opponent();
        log(&format!(
            "[{from}] exchange: row {row} swapped with {to} row {opponent_row}"
        ));
        self.observer
            .on_exchange_triggered(from, row, to, opponent_row);
        for session in &self.sessions {
            self.observer.on_board_changed(session);
        }
        Some((row, opponent_row))
    }

    /// Slows both sessions down and disables their soft drop.
    pub fn start_slowdown(&mut self) {
        for session in &mut self.sessions {
            session.start_slowdown(&self.settings);
        }
        log(&format!(
            "slowdown: intervals now {} / {}",
            self.sessions[0].drop_interval(),
            self.sessions[1].drop_interval()
        ));
        let sides = Side::both();
        self.observer.on_slowdown_started(&sides);
        for session in &self.sessions {
            self.observer
                .on_interval_changed(session.side(), session.drop_interval());
        }
    }

    /// Called by the scheduler once the slowdown duration has elapsed.
    pub fn end_slowdown(&mut self) {
        for session in &mut self.sessions {
            session.end_slowdown();
        }
        let sides = Side::both();
        self.observer.on_slowdown_ended(&sides);
        for session in &self.sessions {
            self.observer
                .on_interval_changed(session.side(), session.drop_interval());
        }
    }

    fn finish(&mut self, loser: Side) {
        if self.winner.is_some() {
            return;
        }
        let winner = loser.opponent();
        self.winner = Some(winner);
        log(&format!(
            "game over: {winner} wins {} to {}",
            self.sessions[winner.index()].score(),
            self.sessions[loser.index()].score()
        ));
        self.observer.on_game_over(winner, loser);
    }

    /// Applies a command to a human-controlled session.
    ///
    /// Returns whether the piece moved. Rejected moves and commands after the
    /// match has ended are not errors.
    pub fn apply_input(&mut self, side: Side, command: Command) -> Result<bool, String> {
        if self.sessions[side.index()].controller() == Controller::Autoplayer {
            return Err(format!("{side} is driven by the autoplayer"));
        }
        if self.is_finished() {
            return Ok(false);
        }
        let session = &mut self.sessions[side.index()];
        let changed = match command {
            Command::MoveLeft => session.move_horizontal(-1),
            Command::MoveRight => session.move_horizontal(1),
            Command::SoftDrop => session.soft_drop(),
            Command::Rotate => session.rotate(),
        };
        if changed {
            self.observer.on_board_changed(&self.sessions[side.index()]);
        }
        Ok(changed)
    }
}
