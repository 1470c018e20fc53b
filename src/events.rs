use serde::Serialize;

use crate::session::{Session, Side};

/// Notifications the core sends to its rendering and scheduling collaborators.
///
/// Every hook runs synchronously after the mutation it reports has been
/// committed. Implementations only override what they care about.
pub trait MatchObserver {
    fn on_board_changed(&mut self, _session: &Session) {}
    fn on_next_piece_changed(&mut self, _session: &Session) {}
    fn on_score_changed(&mut self, _session: &Session, _score: u32) {}
    fn on_gift_triggered(&mut self, _from: Side, _to: Side) {}
    fn on_exchange_triggered(&mut self, _from: Side, _from_row: usize, _to: Side, _to_row: usize) {
    }
    fn on_slowdown_started(&mut self, _sides: &[Side]) {}
    /// The scheduler calls `Duel::end_slowdown` once the slowdown duration elapses.
    fn on_slowdown_ended(&mut self, _sides: &[Side]) {}
    /// A session's gravity period changed; schedulers re-read it here.
    fn on_interval_changed(&mut self, _side: Side, _interval_ms: u32) {}
    /// Fired once per match. Scheduling of both sides stops.
    fn on_game_over(&mut self, _winner: Side, _loser: Side) {}
}

#[derive(Default, Debug, Clone, Copy)]
pub struct NullObserver;

impl MatchObserver for NullObserver {}

#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MatchEvent {
    BoardChanged { side: Side },
    NextPieceChanged { side: Side },
    ScoreChanged { side: Side, score: u32 },
    GiftTriggered { from: Side, to: Side },
    ExchangeTriggered { from: Side, from_row: usize, to: Side, to_row: usize },
    SlowdownStarted { sides: Vec<Side> },
    SlowdownEnded { sides: Vec<Side> },
    IntervalChanged { side: Side, interval_ms: u32 },
    GameOver { winner: Side, loser: Side },
}

#[derive(Default, Debug, Clone)]
pub struct EventLog {
    events: Vec<MatchEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, pred: impl Fn(&MatchEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl MatchObserver for EventLog {
    fn on_board_changed(&mut self, session: &Session) {
        self.events.push(MatchEvent::BoardChanged {
            side: session.side(),
        });
    }

    fn on_next_piece_changed(&mut self, session: &Session) {
        self.events.push(MatchEvent::NextPieceChanged {
            side: session.side(),
        });
    }

    fn on_score_changed(&mut self, session: &Session, score: u32) {
        self.events.push(MatchEvent::ScoreChanged {
            side: session.side(),
            score,
        });
    }

    fn on_gift_triggered(&mut self, from: Side, to: Side) {
        self.events.push(MatchEvent::GiftTriggered { from, to });
    }

    fn on_exchange_triggered(&mut self, from: Side, from_row: usize, to: Side, to_row: usize) {
        self.events.push(MatchEvent::ExchangeTriggered {
            from,
            from_row,
            to,
            to_row,
        });
    }

    fn on_slowdown_started(&mut self, sides: &[Side]) {
        self.events.push(MatchEvent::SlowdownStarted {
            sides: sides.to_vec(),
        });
    }

    fn on_slowdown_ended(&mut self, sides: &[Side]) {
        self.events.push(MatchEvent::SlowdownEnded {
            sides: sides.to_vec(),
        });
    }

    fn on_interval_changed(&mut self, side: Side, interval_ms: u32) {
        self.events
            .push(MatchEvent::IntervalChanged { side, interval_ms });
    }

    fn on_game_over(&mut self, winner: Side, loser: Side) {
        self.events.push(MatchEvent::GameOver { winner, loser });
    }
}
