use crate::board::Board;
use crate::pieces::Shape;

/// Horizontal offsets tried, in order, when a rotation collides in place.
pub const KICK_OFFSETS: [i32; 5] = [0, -1, 1, -2, 2];

/// Rotates a shape a quarter turn clockwise.
///
/// Bars do not keep a rotation phase: any 1×N or N×1 shape becomes the
/// vertical bar if it was horizontal and the horizontal bar otherwise.
pub fn rotate_clockwise(shape: &Shape) -> Shape {
    let rows = shape.height();
    let cols = shape.width();
    if rows == 1 || cols == 1 {
        return if cols == 1 {
            Shape::from_rows(vec![vec![1, 1, 1, 1]])
        } else {
            Shape::from_rows(vec![vec![1]; 4])
        };
    }

    let mut rotated = vec![vec![0u8; rows]; cols];
    for (r, row) in shape.rows().iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            rotated[c][rows - 1 - r] = v;
        }
    }
    Shape::from_rows(rotated)
}

pub fn find_valid_rotation(board: &Board, x: i32, y: i32, rotated: &Shape) -> Option<i32> {
    KICK_OFFSETS
        .iter()
        .copied()
        .find(|&dx| !board.collides(x + dx, y, rotated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PieceKind;
    use crate::{HEIGHT, WIDTH};

    #[test]
    fn rotates_t_clockwise() {
        let rotated = rotate_clockwise(&PieceKind::T.shape());
        assert_eq!(
            rotated,
            Shape::from_rows(vec![vec![0, 1], vec![1, 1], vec![0, 1]])
        );
    }

    #[test]
    fn four_turns_restore_non_bar_shapes() {
        for kind in PieceKind::all().into_iter().filter(|k| *k != PieceKind::I) {
            let original = kind.shape();
            let mut shape = original.clone();
            for _ in 0..4 {
                shape = rotate_clockwise(&shape);
            }
            assert_eq!(shape.height(), original.height(), "{kind:?}");
            assert_eq!(shape.width(), original.width(), "{kind:?}");
            assert_eq!(shape, original, "{kind:?}");
        }
    }

    #[test]
    fn bar_toggles_between_two_orientations() {
        let flat = PieceKind::I.shape();
        let upright = rotate_clockwise(&flat);
        assert_eq!(upright.height(), 4);
        assert_eq!(upright.width(), 1);
        assert_eq!(rotate_clockwise(&upright), flat);
    }

    #[test]
    fn kicks_off_the_right_wall() {
        let board = Board::new();
        let flat = PieceKind::I.shape();
        // upright bar in the last column, turning flat needs to shift left
        let x = WIDTH as i32 - 1;
        assert_eq!(find_valid_rotation(&board, x, 5, &flat), None);
        assert_eq!(find_valid_rotation(&board, x - 2, 5, &flat), Some(-1));
        assert_eq!(find_valid_rotation(&board, x - 3, 5, &flat), Some(0));
    }

    #[test]
    fn kick_order_prefers_left() {
        let mut board = Board::new();
        let y = HEIGHT as i32 - 4;
        let upright = rotate_clockwise(&PieceKind::I.shape());
        for row in (y as usize)..HEIGHT {
            board.set_cell(row, 5, 1);
        }
        assert_eq!(find_valid_rotation(&board, 5, y, &upright), Some(-1));
    }
}
