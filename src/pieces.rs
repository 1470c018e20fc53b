use rand::Rng;
use serde::{Deserialize, Serialize};

pub const COLORS: [&str; 7] = [
    "#FF0D72", "#0DC2FF", "#0DFF72", "#F538FF", "#FF8E0D", "#FFE138", "#3877FF",
];

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    pub fn all() -> [PieceKind; 7] {
        [
            PieceKind::I,
            PieceKind::O,
            PieceKind::T,
            PieceKind::L,
            PieceKind::J,
            PieceKind::S,
            PieceKind::Z,
        ]
    }

    /// The two shapes handed to an opponent as a gift.
    pub fn easy() -> [PieceKind; 2] {
        [PieceKind::I, PieceKind::O]
    }

    pub fn index(self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::O => 1,
            PieceKind::T => 2,
            PieceKind::L => 3,
            PieceKind::J => 4,
            PieceKind::S => 5,
            PieceKind::Z => 6,
        }
    }

    pub fn from_index(index: usize) -> Option<PieceKind> {
        Self::all().get(index).copied()
    }

    /// Board cell value written when this piece locks.
    pub fn color_id(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn color(self) -> &'static str {
        COLORS[self.index()]
    }

    pub fn shape(self) -> Shape {
        let rows: &[&[u8]] = match self {
            PieceKind::I => &[&[1, 1, 1, 1]],
            PieceKind::O => &[&[1, 1], &[1, 1]],
            PieceKind::T => &[&[1, 1, 1], &[0, 1, 0]],
            PieceKind::L => &[&[1, 1, 1], &[1, 0, 0]],
            PieceKind::J => &[&[1, 1, 1], &[0, 0, 1]],
            PieceKind::S => &[&[1, 1, 0], &[0, 1, 1]],
            PieceKind::Z => &[&[0, 1, 1], &[1, 1, 0]],
        };
        Shape::from_rows(rows.iter().map(|r| r.to_vec()).collect())
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> PieceKind {
        Self::all()[rng.gen_range(0..7)]
    }
}

#[derive(Clone, Serialize, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: Vec<Vec<u8>>,
}

impl Shape {
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Self {
        assert!(!rows.is_empty() && !rows[0].is_empty(), "empty shape");
        assert!(
            rows.iter().all(|r| r.len() == rows[0].len()),
            "shape rows must have equal length"
        );
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.rows[row][col] != 0
    }

    /// Offsets `(dx, dy)` of every filled cell relative to the top-left anchor.
    pub fn filled_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.rows.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| **v != 0)
                .map(move |(dx, _)| (dx as i32, dy as i32))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn catalog_shapes_have_four_cells() {
        for kind in PieceKind::all() {
            assert_eq!(kind.shape().filled_cells().count(), 4, "{kind:?}");
        }
    }

    #[test]
    fn color_ids_follow_catalog_order() {
        let ids: Vec<u8> = PieceKind::all().iter().map(|k| k.color_id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(PieceKind::from_index(3), Some(PieceKind::L));
        assert_eq!(PieceKind::from_index(7), None);
        assert_eq!(PieceKind::Z.color(), "#3877FF");
    }

    #[test]
    fn seeded_draws_repeat() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let seq_a: Vec<_> = (0..32).map(|_| PieceKind::random(&mut a)).collect();
        let seq_b: Vec<_> = (0..32).map(|_| PieceKind::random(&mut b)).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn filled_cells_of_t() {
        let cells: Vec<_> = PieceKind::T.shape().filled_cells().collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (2, 0), (1, 1)]);
    }
}
