use serde::Serialize;
use tracing::debug;

use crate::board::Board;
use crate::pieces::Shape;
use crate::session::{ActivePiece, Session};
use crate::transform::rotate_clockwise;
use crate::{HEIGHT, WIDTH};

/// Score given to resting positions that are off the board or overlap it.
pub const UNUSABLE: i64 = -1_000_000_000;

const FULL_ROW_BONUS: i64 = 10_000;
const HOLE_PENALTY: i64 = 3_000;
const MAX_HEIGHT_PENALTY: i64 = 50;
const HEIGHT_SPREAD_PENALTY: i64 = 100;
const NEARLY_FULL_BONUS: i64 = 500;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub rotation: u8,
    pub shape: Shape,
    pub score: i64,
}

/// Row where `shape` comes to rest when dropped straight down from `start_y`.
pub fn resting_row(board: &Board, x: i32, start_y: i32, shape: &Shape) -> i32 {
    let mut y = start_y;
    while !board.collides(x, y + 1, shape) {
        y += 1;
    }
    y
}

/// Scores the board that would result from locking `shape` at `(x, y)`.
/// Higher is better. Rows are counted, not cleared.
pub fn evaluate_placement(board: &Board, x: i32, y: i32, shape: &Shape) -> i64 {
    if board.collides(x, y, shape) {
        return UNUSABLE;
    }
    let mut overlay = board.clone();
    overlay.merge(x, y, shape, 0);

    let full_rows = overlay.full_row_count() as i64;
    let mut score = full_rows * FULL_ROW_BONUS;

    score -= overlay.hole_count() as i64 * HOLE_PENALTY;

    let heights = overlay.column_heights();
    let max_height = heights.iter().copied().max().unwrap_or(0) as i64;
    let min_height = heights.iter().copied().min().unwrap_or(0) as i64;
    score -= max_height * MAX_HEIGHT_PENALTY;
    score -= (max_height - min_height) * HEIGHT_SPREAD_PENALTY;

    if full_rows == 0 {
        let nearly_full = (0..HEIGHT)
            .filter(|&row| overlay.row_fill(row) >= WIDTH - 2)
            .count() as i64;
        score += nearly_full * NEARLY_FULL_BONUS;
    }
    score
}

/// Exhaustive search over four rotations and every column in `[-2, WIDTH + 2)`.
///
/// Rotations are raw quarter turns with no kicks. Ties keep the first
/// candidate found. `None` when no resting position is usable.
pub fn find_best_placement(board: &Board, piece: &ActivePiece) -> Option<Placement> {
    let mut best: Option<Placement> = None;
    let mut shape = piece.shape.clone();
    for rotation in 0..4u8 {
        for x in -2..WIDTH as i32 + 2 {
            let y = resting_row(board, x, piece.y, &shape);
            let score = evaluate_placement(board, x, y, &shape);
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(Placement {
                    x,
                    y,
                    rotation,
                    shape: shape.clone(),
                    score,
                });
            }
        }
        shape = rotate_clockwise(&shape);
    }
    best.filter(|b| b.score > UNUSABLE)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AiStep {
    pub moved: bool,
    pub rotated: bool,
}

/// Moves at most one column toward `target`, then rotates once if the held
/// shape differs from the target shape.
pub fn actuate(session: &mut Session, target: &Placement) -> AiStep {
    let dx = (target.x - session.active().x).signum();
    let moved = dx != 0 && session.move_horizontal(dx);
    let rotated = session.active().shape != target.shape && session.rotate();
    AiStep { moved, rotated }
}

pub fn make_ai_move(session: &mut Session) -> Option<Placement> {
    if session.is_game_over() {
        return None;
    }
    let target = find_best_placement(session.board(), session.active())?;
    let step = actuate(session, &target);
    debug!(
        side = %session.side(),
        x = target.x,
        rotation = target.rotation,
        score = target.score,
        moved = step.moved,
        rotated = step.rotated,
        "autoplayer step"
    );
    Some(target)
}
