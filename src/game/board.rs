use std::str::FromStr;

use super::{GameOutcome, Player};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Line directions as (row step, column step). Row 0 is the top of the board.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    One,
    Two,
}

impl Cell {
    /// The player owning this cell, if any.
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::One => Some(Player::One),
            Cell::Two => Some(Player::Two),
        }
    }

    fn glyph(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::One => 'X',
            Cell::Two => 'O',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("column {0} is out of range")]
    InvalidColumn(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardParseError {
    #[error("board text has no rows")]
    Empty,

    #[error("unexpected character {glyph:?} at row {row}, column {col}")]
    InvalidGlyph { glyph: char, row: usize, col: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("piece at row {row}, column {col} has an empty cell below it")]
    FloatingPiece { row: usize, col: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("board must have at least one row and one column, got {rows}x{cols}")]
pub struct GeometryError {
    pub rows: usize,
    pub cols: usize,
}

/// A straight run of cells: anchor plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub row: usize,
    pub col: usize,
    pub step: (isize, isize),
}

/// Gravity grid. Cells are stored row-major with row 0 at the top; pieces
/// settle in the lowest empty row of their column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty 6x7 board
    pub fn new() -> Self {
        Self::empty(ROWS, COLS)
    }

    /// Create an empty board of the given geometry.
    pub fn with_size(rows: usize, cols: usize) -> Result<Self, GeometryError> {
        if rows == 0 || cols == 0 {
            return Err(GeometryError { rows, cols });
        }
        Ok(Self::empty(rows, cols))
    }

    fn empty(rows: usize, cols: usize) -> Self {
        Board {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the cell at a specific position
    /// Row 0 is the top, row `rows - 1` is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    /// Check if a column is full. Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= self.cols {
            return true;
        }
        self.get(0, col) != Cell::Empty
    }

    /// Number of pieces stacked in a column. Out-of-range columns hold none.
    pub fn column_height(&self, col: usize) -> usize {
        if col >= self.cols {
            return 0;
        }
        (0..self.rows)
            .filter(|&row| self.get(row, col) != Cell::Empty)
            .count()
    }

    /// Columns that can still take a piece, ascending.
    pub fn legal_actions(&self) -> Vec<usize> {
        (0..self.cols)
            .filter(|&col| !self.is_column_full(col))
            .collect()
    }

    /// Return a new board with `player`'s piece dropped into `col`.
    /// The receiver is never modified.
    pub fn apply(&self, col: usize, player: Player) -> Result<Board, MoveError> {
        let mut next = self.clone();
        next.drop_piece(col, player.to_cell())?;
        Ok(next)
    }

    /// Drop a piece in a column, returns the row where it landed
    fn drop_piece(&mut self, col: usize, cell: Cell) -> Result<usize, MoveError> {
        if col >= self.cols {
            return Err(MoveError::InvalidColumn(col));
        }

        if self.is_column_full(col) {
            return Err(MoveError::ColumnFull(col));
        }

        let row = self.rows - 1 - self.column_height(col);
        self.cells[row * self.cols + col] = cell;
        Ok(row)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..self.cols).all(|col| self.is_column_full(col))
    }

    pub fn piece_count(&self, player: Player) -> usize {
        let cell = player.to_cell();
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// Whose turn it is, derived from piece-count parity: player one moves
    /// whenever the counts are level. Holds only because turns strictly
    /// alternate starting with player one.
    pub fn player_to_move(&self) -> Player {
        if self.piece_count(Player::One) > self.piece_count(Player::Two) {
            Player::Two
        } else {
            Player::One
        }
    }

    /// Every window of `len` cells that fits on the board, over rows,
    /// columns and both diagonals.
    pub fn windows(&self, len: usize) -> impl Iterator<Item = Window> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).flat_map(move |col| {
                DIRECTIONS
                    .iter()
                    .map(move |&step| Window { row, col, step })
                    .filter(move |w| len > 0 && self.fits(w, len))
            })
        })
    }

    fn fits(&self, window: &Window, len: usize) -> bool {
        let reach = len as isize - 1;
        let end_row = window.row as isize + window.step.0 * reach;
        let end_col = window.col as isize + window.step.1 * reach;
        end_row >= 0 && end_row < self.rows as isize && end_col >= 0 && end_col < self.cols as isize
    }

    /// True if all `len` cells of the window hold `player`'s pieces.
    pub fn window_owned_by(&self, window: &Window, len: usize, player: Player) -> bool {
        let cell = player.to_cell();
        (0..len as isize).all(|i| {
            let row = (window.row as isize + window.step.0 * i) as usize;
            let col = (window.col as isize + window.step.1 * i) as usize;
            self.get(row, col) == cell
        })
    }

    /// Full-board scan for `n` consecutive pieces of `player` in any
    /// direction.
    pub fn has_connect_n(&self, player: Player, n: usize) -> bool {
        self.windows(n).any(|w| self.window_owned_by(&w, n, player))
    }

    /// Outcome from `player`'s point of view: a win is checked before a draw.
    pub fn outcome(&self, player: Player, n: usize) -> GameOutcome {
        if self.has_connect_n(player, n) {
            GameOutcome::Winner(player)
        } else if self.is_full() {
            GameOutcome::Draw
        } else {
            GameOutcome::Ongoing
        }
    }

    /// Outcome right after a piece landed on top of `col`, only scanning lines
    /// through that piece. Agrees with [`Board::outcome`] for the mover as long
    /// as the board was not already won.
    pub fn outcome_after(&self, col: usize, n: usize) -> GameOutcome {
        let height = self.column_height(col);
        if height > 0 {
            let row = self.rows - height;
            let cell = self.get(row, col);
            if let Some(player) = cell.owner() {
                if self.connects_through(row, col, cell, n) {
                    return GameOutcome::Winner(player);
                }
            }
        }
        if self.is_full() {
            GameOutcome::Draw
        } else {
            GameOutcome::Ongoing
        }
    }

    fn connects_through(&self, row: usize, col: usize, cell: Cell, n: usize) -> bool {
        DIRECTIONS.iter().any(|&(dr, dc)| {
            1 + self.count_from(row, col, dr, dc, cell) + self.count_from(row, col, -dr, -dc, cell)
                >= n
        })
    }

    /// Count matching cells walking away from (row, col), excluding it.
    fn count_from(&self, row: usize, col: usize, dr: isize, dc: isize, cell: Cell) -> usize {
        let mut count = 0;
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        while r >= 0
            && r < self.rows as isize
            && c >= 0
            && c < self.cols as isize
            && self.get(r as usize, c as usize) == cell
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    /// Compact text form: rows top to bottom separated by `/`.
    pub fn to_text(&self) -> String {
        (0..self.rows)
            .map(|row| (0..self.cols).map(|col| self.get(row, col).glyph()).collect::<String>())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Parse rows top to bottom, `.` empty, `X` player one, `O` player two.
    /// Rows are separated by `/` or newlines.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .split(|c: char| c == '/' || c == '\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let expected = match lines.first() {
            Some(first) => first.chars().count(),
            None => return Err(BoardParseError::Empty),
        };

        let mut board = Board::empty(lines.len(), expected);
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != expected {
                return Err(BoardParseError::RaggedRow {
                    row,
                    found,
                    expected,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let cell = match glyph {
                    '.' => Cell::Empty,
                    'X' | 'x' => Cell::One,
                    'O' | 'o' => Cell::Two,
                    _ => return Err(BoardParseError::InvalidGlyph { glyph, row, col }),
                };
                board.cells[row * expected + col] = cell;
            }
        }

        for col in 0..board.cols {
            for row in 0..board.rows - 1 {
                if board.get(row, col) != Cell::Empty && board.get(row + 1, col) == Cell::Empty {
                    return Err(BoardParseError::FloatingPiece { row, col });
                }
            }
        }

        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(board: &Board, moves: &[(usize, Player)]) -> Board {
        moves
            .iter()
            .fold(board.clone(), |b, &(col, player)| b.apply(col, player).unwrap())
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert_eq!(board.rows(), ROWS);
        assert_eq!(board.cols(), COLS);
        for row in 0..ROWS {
            for col in 0..COLS {
                assert_eq!(board.get(row, col), Cell::Empty);
            }
        }
        assert_eq!(board.legal_actions(), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_apply_stacks_pieces() {
        let board = Board::new();
        let once = board.apply(3, Player::One).unwrap();
        let twice = once.apply(3, Player::Two).unwrap();

        assert_eq!(twice.get(5, 3), Cell::One);
        assert_eq!(twice.get(4, 3), Cell::Two);
        assert_eq!(twice.column_height(3), 2);
        for col in (0..COLS).filter(|&c| c != 3) {
            assert_eq!(twice.column_height(col), 0);
        }
        // Inputs are untouched
        assert_eq!(board, Board::new());
        assert_eq!(once.column_height(3), 1);
    }

    #[test]
    fn test_column_full() {
        let mut board = Board::new();
        for i in 0..ROWS {
            let player = if i % 2 == 0 { Player::One } else { Player::Two };
            board = board.apply(0, player).unwrap();
        }

        assert!(board.is_column_full(0));
        let before = board.clone();
        assert_eq!(board.apply(0, Player::One), Err(MoveError::ColumnFull(0)));
        assert_eq!(board, before);
        assert!(!board.legal_actions().contains(&0));
    }

    #[test]
    fn test_invalid_column() {
        let board = Board::new();
        assert_eq!(board.apply(7, Player::One), Err(MoveError::InvalidColumn(7)));
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new();
        for col in 0..COLS {
            for _ in 0..ROWS {
                board = board.apply(col, Player::One).unwrap();
            }
        }
        assert!(board.is_full());
        assert!(board.legal_actions().is_empty());
    }

    #[test]
    fn test_horizontal_win() {
        let board = "......./......./......./......./......./XXXX...".parse::<Board>().unwrap();
        assert!(board.has_connect_n(Player::One, 4));
        assert!(!board.has_connect_n(Player::Two, 4));
        assert_eq!(board.outcome(Player::One, 4), GameOutcome::Winner(Player::One));
        assert_eq!(board.outcome_after(3, 4), GameOutcome::Winner(Player::One));
    }

    #[test]
    fn test_vertical_win() {
        let board = "......./......./...O.../...O.../...O.../..XOXX.".parse::<Board>().unwrap();
        assert!(board.has_connect_n(Player::Two, 4));
        assert!(!board.has_connect_n(Player::One, 4));
        assert_eq!(board.outcome_after(3, 4), GameOutcome::Winner(Player::Two));
    }

    #[test]
    fn test_diagonal_up_win() {
        // Bottom-left to top-right
        let board = Board::new();
        let board = play(
            &board,
            &[
                (0, Player::One),
                (1, Player::Two),
                (1, Player::One),
                (2, Player::Two),
                (2, Player::Two),
                (2, Player::One),
                (3, Player::Two),
                (3, Player::Two),
                (3, Player::Two),
                (3, Player::One),
            ],
        );
        assert!(board.has_connect_n(Player::One, 4));
        assert_eq!(board.outcome_after(3, 4), GameOutcome::Winner(Player::One));
    }

    #[test]
    fn test_diagonal_down_win() {
        // Top-left to bottom-right
        let board = "......./......./O....../XO...../XXO..../XXXO...".parse::<Board>().unwrap();
        assert!(board.has_connect_n(Player::Two, 4));
        assert!(!board.has_connect_n(Player::One, 4));
        assert_eq!(board.outcome_after(0, 4), GameOutcome::Winner(Player::Two));
    }

    #[test]
    fn test_no_win_with_three() {
        let board = "......./......./......./......./......./XXX.OOO".parse::<Board>().unwrap();
        assert!(!board.has_connect_n(Player::One, 4));
        assert!(!board.has_connect_n(Player::Two, 4));
        assert!(board.has_connect_n(Player::One, 3));
        assert_eq!(board.outcome(Player::One, 4), GameOutcome::Ongoing);
    }

    #[test]
    fn test_alternating_fill_is_draw_only_at_the_end() {
        // Column pairs shifted by one row never line up four in any direction.
        let order = [0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0, 2, 3, 2, 3, 2, 3, 3, 2, 3, 2, 3, 2, 4, 5,
            4, 5, 4, 5, 5, 4, 5, 4, 5, 4, 6, 6, 6, 6, 6, 6];
        let mut board = Board::new();
        for (i, &col) in order.iter().enumerate() {
            let player = board.player_to_move();
            board = board.apply(col, player).unwrap();
            let outcome = board.outcome(player, 4);
            if i + 1 < order.len() {
                assert_eq!(outcome, GameOutcome::Ongoing, "move {i} ended the game early");
            } else {
                assert_eq!(outcome, GameOutcome::Draw);
            }
        }
        assert!(board.is_full());
    }

    #[test]
    fn test_player_to_move_parity() {
        let board = Board::new();
        assert_eq!(board.player_to_move(), Player::One);
        let board = board.apply(2, Player::One).unwrap();
        assert_eq!(board.player_to_move(), Player::Two);
        let board = board.apply(2, Player::Two).unwrap();
        assert_eq!(board.player_to_move(), Player::One);
    }

    #[test]
    fn test_windows_count() {
        let board = Board::new();
        // 24 horizontal, 21 vertical, 12 per diagonal direction
        assert_eq!(board.windows(4).count(), 24 + 21 + 12 + 12);
        assert_eq!(board.windows(1).count(), 4 * ROWS * COLS);
        assert_eq!(board.windows(0).count(), 0);
        assert_eq!(board.windows(8).count(), 0);
    }

    #[test]
    fn test_text_roundtrip() {
        let text = "......./......./......./......./...O.../..XXO..";
        let board: Board = text.parse().unwrap();
        assert_eq!(board.to_text(), text);
        assert_eq!(board.piece_count(Player::One), 2);
        assert_eq!(board.piece_count(Player::Two), 2);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("".parse::<Board>(), Err(BoardParseError::Empty));
        assert_eq!(
            "..../...".parse::<Board>(),
            Err(BoardParseError::RaggedRow {
                row: 1,
                found: 3,
                expected: 4
            })
        );
        assert!(matches!(
            "..?./....".parse::<Board>(),
            Err(BoardParseError::InvalidGlyph { glyph: '?', .. })
        ));
        assert_eq!(
            "X.../....".parse::<Board>(),
            Err(BoardParseError::FloatingPiece { row: 0, col: 0 })
        );
    }

    #[test]
    fn test_custom_geometry() {
        let board = Board::with_size(4, 5).unwrap();
        assert_eq!(board.legal_actions().len(), 5);
        let board = play(
            &board,
            &[(0, Player::One), (1, Player::One), (2, Player::One)],
        );
        assert!(board.has_connect_n(Player::One, 3));
        assert!(!board.has_connect_n(Player::One, 4));
    }

    #[test]
    fn test_zero_sized_board_is_rejected() {
        assert_eq!(Board::with_size(0, 7), Err(GeometryError { rows: 0, cols: 7 }));
        assert_eq!(Board::with_size(6, 0), Err(GeometryError { rows: 6, cols: 0 }));
    }

    #[test]
    fn test_column_height_out_of_range() {
        let board = Board::new().apply(6, Player::One).unwrap();
        assert_eq!(board.column_height(6), 1);
        assert_eq!(board.column_height(7), 0);
        assert_eq!(board.column_height(100), 0);
        assert_eq!(board.outcome_after(7, 4), GameOutcome::Ongoing);
    }
}
