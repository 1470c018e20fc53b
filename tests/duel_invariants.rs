//! Invariants that must hold for any board contents or any seeded match.

use duotris::transform::rotate_clockwise;
use duotris::{
    ActivePiece, Board, Controller, Duel, EventLog, HEIGHT, MatchEvent, MatchSettings, PieceKind,
    Side, TickOutcome, WIDTH, find_best_placement,
};
use proptest::prelude::*;

fn board_strategy() -> impl Strategy<Value = [[u8; WIDTH]; HEIGHT]> {
    // Bias rows toward full so clears actually happen.
    let row = prop_oneof![
        2 => Just([1u8; WIDTH]),
        3 => prop::array::uniform12(0u8..=7),
        1 => Just([0u8; WIDTH]),
    ];
    prop::array::uniform20(row)
}

fn autopilot_duel(seed: u64) -> Duel {
    let settings = MatchSettings {
        seed: Some(seed),
        player_controller: Controller::Autoplayer,
        ..MatchSettings::default()
    };
    Duel::new(settings, EventLog::new())
}

proptest! {
    #[test]
    fn clearing_removes_exactly_the_full_rows(rows in board_strategy()) {
        let mut board = Board::from_rows(rows);
        let survivors: Vec<[u8; WIDTH]> = rows
            .iter()
            .filter(|r| !r.iter().all(|&c| c != 0))
            .copied()
            .collect();
        let full = HEIGHT - survivors.len();

        prop_assert_eq!(board.clear_full_rows(), full);
        prop_assert_eq!(board.rows().len(), HEIGHT);
        for y in 0..full {
            prop_assert!(board.is_row_empty(y));
        }
        for (i, row) in survivors.iter().enumerate() {
            prop_assert_eq!(board.row(full + i), row);
        }
        prop_assert_eq!(board.full_row_count(), 0);
    }

    #[test]
    fn out_of_bounds_cells_always_collide(
        rows in board_strategy(),
        kind_idx in 0usize..7,
        turns in 0usize..4,
        x in -8i32..20,
        y in -4i32..28,
    ) {
        let board = Board::from_rows(rows);
        let mut shape = PieceKind::from_index(kind_idx).unwrap().shape();
        for _ in 0..turns {
            shape = rotate_clockwise(&shape);
        }
        let outside = shape.filled_cells().any(|(dx, dy)| {
            let (cx, cy) = (x + dx, y + dy);
            cx < 0 || cx >= WIDTH as i32 || cy >= HEIGHT as i32
        });
        if outside {
            prop_assert!(board.collides(x, y, &shape));
        }
        if !outside && Board::new().collides(x, y, &shape) {
            prop_assert!(false, "empty board collided inside bounds");
        }
    }

    #[test]
    fn search_depends_only_on_board_and_piece(rows in board_strategy(), kind_idx in 0usize..7) {
        let mut rows = rows;
        // keep the spawn rows clear so the piece starts in a legal spot
        rows[0] = [0; WIDTH];
        rows[1] = [0; WIDTH];
        let board = Board::from_rows(rows);
        let piece = ActivePiece::spawn(PieceKind::from_index(kind_idx).unwrap());
        prop_assert_eq!(
            find_best_placement(&board, &piece),
            find_best_placement(&board, &piece)
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn seeded_rollouts_keep_boards_valid(seed in any::<u64>(), ticks in 1usize..1500) {
        let mut duel = autopilot_duel(seed);
        for i in 0..ticks {
            let side = if i % 2 == 0 { Side::Player } else { Side::Autoplayer };
            if duel.tick(side) == TickOutcome::Idle {
                break;
            }
            for side in Side::both() {
                let board = duel.session(side).board();
                prop_assert!(board.rows().iter().flatten().all(|&c| c <= 7));
            }
        }
        let game_overs = duel
            .observer()
            .count(|e| matches!(e, MatchEvent::GameOver { .. }));
        prop_assert_eq!(game_overs, usize::from(duel.is_finished()));
    }
}

#[test]
fn same_seed_replays_the_same_match() {
    let mut a = autopilot_duel(2024);
    let mut b = autopilot_duel(2024);
    for i in 0..600 {
        let side = Side::from_index(i % 2).unwrap();
        assert_eq!(a.tick(side), b.tick(side));
    }
    for side in Side::both() {
        assert_eq!(a.session(side).board(), b.session(side).board());
        assert_eq!(a.session(side).score(), b.session(side).score());
    }
    assert_eq!(a.observer().events(), b.observer().events());
}

#[test]
fn autoplayer_clears_lines_on_its_own() {
    let mut duel = autopilot_duel(17);
    let mut cleared = 0;
    for _ in 0..4000 {
        if let TickOutcome::Locked { report, .. } = duel.tick(Side::Autoplayer) {
            cleared += report.cleared;
        }
        if duel.is_finished() {
            break;
        }
    }
    assert!(cleared > 0, "autoplayer never cleared a row");
}
