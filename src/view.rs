use serde::Serialize;

use crate::pieces::{PieceKind, Shape};
use crate::session::{Session, Side};
use crate::settings::{Controller, MatchSettings};
use crate::{HEIGHT, WIDTH};

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Serialize, Debug, Clone)]
pub struct SessionView {
    pub side: Side,
    pub controller: Controller,
    pub field: Vec<Vec<u8>>,
    pub active: Vec<Point>,
    pub active_piece: PieceKind,
    pub active_color: &'static str,
    pub next_piece: PieceKind,
    pub next_shape: Shape,
    pub next_color: &'static str,
    pub score: u32,
    pub drop_interval: u32,
    pub slowdown: bool,
    pub game_over: bool,
}

impl SessionView {
    pub fn capture(session: &Session) -> Self {
        let active = session.active();
        let next = session.next();
        Self {
            side: session.side(),
            controller: session.controller(),
            field: session.board().rows().iter().map(|r| r.to_vec()).collect(),
            active: active
                .cells()
                .filter(|&(_, y)| y >= 0)
                .map(|(x, y)| Point { x, y })
                .collect(),
            active_piece: active.kind,
            active_color: active.kind.color(),
            next_piece: next.kind,
            next_shape: next.shape.clone(),
            next_color: next.kind.color(),
            score: session.score(),
            drop_interval: session.drop_interval(),
            slowdown: session.is_slowdown(),
            game_over: session.is_game_over(),
        }
    }

    /// Text rendering: `#` for the falling piece, the catalog digit for locked cells.
    pub fn text_rows(&self) -> Vec<String> {
        let mut grid: Vec<Vec<char>> = self
            .field
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&c| match c {
                        0 => '.',
                        n => char::from(b'0' + n),
                    })
                    .collect()
            })
            .collect();
        for p in &self.active {
            if (0..WIDTH as i32).contains(&p.x) && (0..HEIGHT as i32).contains(&p.y) {
                grid[p.y as usize][p.x as usize] = '#';
            }
        }
        grid.into_iter().map(|row| row.into_iter().collect()).collect()
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct DuelView {
    pub sessions: Vec<SessionView>,
    pub winner: Option<Side>,
    pub settings: MatchSettings,
}

impl DuelView {
    pub fn capture(sessions: &[Session], winner: Option<Side>, settings: &MatchSettings) -> Self {
        Self {
            sessions: sessions.iter().map(SessionView::capture).collect(),
            winner,
            settings: settings.clone(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let header: Vec<String> = self
            .sessions
            .iter()
            .map(|s| format!("{:<width$}", format!("{} {}", s.side, s.score), width = WIDTH))
            .collect();
        out.push_str(&header.join("   "));
        out.push('\n');
        let columns: Vec<Vec<String>> = self.sessions.iter().map(|s| s.text_rows()).collect();
        for y in 0..HEIGHT {
            let line: Vec<&str> = columns.iter().map(|rows| rows[y].as_str()).collect();
            out.push_str(&line.join("   "));
            out.push('\n');
        }
        out
    }
}
