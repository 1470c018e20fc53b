use std::fmt;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Board;
use crate::pieces::{PieceKind, Shape};
use crate::settings::{Controller, MatchSettings};
use crate::transform::{find_valid_rotation, rotate_clockwise};
use crate::{WIDTH, log};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Autoplayer,
}

impl Side {
    pub fn both() -> [Side; 2] {
        [Side::Player, Side::Autoplayer]
    }

    pub fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Autoplayer => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Side> {
        Self::both().get(index).copied()
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Autoplayer,
            Side::Autoplayer => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("player"),
            Side::Autoplayer => f.write_str("autoplayer"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    /// Catalog shape of `kind`, centered horizontally on the top row.
    pub fn spawn(kind: PieceKind) -> Self {
        let shape = kind.shape();
        let x = (WIDTH / 2) as i32 - (shape.width() / 2) as i32;
        Self { kind, shape, x, y: 0 }
    }

    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .filled_cells()
            .map(|(dx, dy)| (self.x + dx, self.y + dy))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NextPiece {
    pub kind: PieceKind,
    pub shape: Shape,
}

impl NextPiece {
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: kind.shape(),
        }
    }
}

pub fn points_for(lines: usize) -> u32 {
    match lines {
        1 => 50,
        2 => 100,
        3 => 200,
        4 => 300,
        _ => 0,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClearReport {
    pub cleared: usize,
    pub points: u32,
    pub previous_score: u32,
    pub score: u32,
}

impl ClearReport {
    /// True when the update moved the score into a different thousand.
    pub fn milestone_crossed(&self) -> bool {
        self.previous_score / 1000 != self.score / 1000
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Fell,
    Locked { report: ClearReport, topped_out: bool },
    Idle,
}

pub struct Session {
    side: Side,
    controller: Controller,
    board: Board,
    active: ActivePiece,
    next: NextPiece,
    score: u32,
    game_over: bool,
    drop_interval: u32,
    base_interval: u32,
    is_slowdown: bool,
    rng: StdRng,
}

impl Session {
    pub fn new(side: Side, controller: Controller, base_interval: u32, mut rng: StdRng) -> Self {
        let first = PieceKind::random(&mut rng);
        let next = PieceKind::random(&mut rng);
        Self {
            side,
            controller,
            board: Board::new(),
            active: ActivePiece::spawn(first),
            next: NextPiece::new(next),
            score: 0,
            game_over: false,
            drop_interval: base_interval,
            base_interval,
            is_slowdown: false,
            rng,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn controller(&self) -> Controller {
        self.controller
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> &ActivePiece {
        &self.active
    }

    /// Replaces the falling piece. The caller picks a collision-free position.
    pub fn set_active(&mut self, piece: ActivePiece) {
        self.active = piece;
    }

    pub fn next(&self) -> &NextPiece {
        &self.next
    }

    pub fn set_next(&mut self, kind: PieceKind) {
        self.next = NextPiece::new(kind);
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    #[cfg(test)]
    pub(crate) fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn drop_interval(&self) -> u32 {
        self.drop_interval
    }

    pub fn base_interval(&self) -> u32 {
        self.base_interval
    }

    pub fn is_slowdown(&self) -> bool {
        self.is_slowdown
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Promotes the next piece and draws a new one. Returns false on top out.
    pub fn spawn(&mut self) -> bool {
        let kind = PieceKind::random(&mut self.rng);
        let promoted = std::mem::replace(&mut self.next, NextPiece::new(kind));
        self.active = ActivePiece::spawn(promoted.kind);
        if self.collides_at(self.active.x, self.active.y, &self.active.shape) {
            self.game_over = true;
            log(&format!("[{}] top out on spawn", self.side));
            return false;
        }
        true
    }

    fn collides_at(&self, x: i32, y: i32, shape: &Shape) -> bool {
        self.board.collides(x, y, shape)
    }

    pub fn step_down(&mut self) -> bool {
        if self.collides_at(self.active.x, self.active.y + 1, &self.active.shape) {
            return false;
        }
        self.active.y += 1;
        true
    }

    pub(crate) fn lock_piece(&mut self) -> ClearReport {
        let piece = &self.active;
        self.board
            .merge(piece.x, piece.y, &piece.shape, piece.kind.index());
        let cleared = self.board.clear_full_rows();
        let points = points_for(cleared);
        let previous_score = self.score;
        self.score += points;
        if cleared > 0 {
            debug!(side = %self.side, cleared, score = self.score, "rows cleared");
        }
        ClearReport {
            cleared,
            points,
            previous_score,
            score: self.score,
        }
    }

    /// Moves the piece down, or locks it when blocked. A locked piece leaves
    /// the session without a spawned successor until `spawn` is called.
    pub(crate) fn fall_or_lock(&mut self) -> Option<ClearReport> {
        if self.step_down() {
            return None;
        }
        Some(self.lock_piece())
    }

    #[cfg(test)]
    pub(crate) fn tick(&mut self) -> TickOutcome {
        if self.game_over {
            return TickOutcome::Idle;
        }
        match self.fall_or_lock() {
            None => TickOutcome::Fell,
            Some(report) => TickOutcome::Locked {
                report,
                topped_out: !self.spawn(),
            },
        }
    }

    pub fn move_horizontal(&mut self, dx: i32) -> bool {
        if self.game_over || self.collides_at(self.active.x + dx, self.active.y, &self.active.shape)
        {
            return false;
        }
        self.active.x += dx;
        true
    }

    /// One-row descent on demand. Never locks, and is disabled during a slowdown.
    pub fn soft_drop(&mut self) -> bool {
        if self.game_over || self.is_slowdown {
            return false;
        }
        self.step_down()
    }

    pub fn find_valid_rotation(&self, rotated: &Shape) -> Option<i32> {
        find_valid_rotation(&self.board, self.active.x, self.active.y, rotated)
    }

    pub fn rotate(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let rotated = rotate_clockwise(&self.active.shape);
        match self.find_valid_rotation(&rotated) {
            Some(dx) => {
                self.active.shape = rotated;
                self.active.x += dx;
                true
            }
            None => false,
        }
    }

    pub(crate) fn start_slowdown(&mut self, settings: &MatchSettings) {
        self.is_slowdown = true;
        self.drop_interval = settings.slowed(self.drop_interval);
    }

    pub(crate) fn end_slowdown(&mut self) {
        self.is_slowdown = false;
        self.drop_interval = self.base_interval;
    }
}
