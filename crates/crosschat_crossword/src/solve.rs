use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crosschat_core::Grid;
use serde::{Deserialize, Serialize};

use crate::{ClueId, Direction, Error, Puzzle, Result, Status, parse_answer};

/// The mutable solve of one channel: the puzzle, the partial fill, the
/// per-clue filled maps, the status machine and the timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveState {
    pub status: Status,
    pub puzzle: Puzzle,

    /// Current fill, same shape as the puzzle; blocks and unfilled cells
    /// are empty strings
    pub cells: Grid<String>,

    /// Per-clue flags: true iff every cell of the entry is non-empty.
    /// Filled does not imply correct.
    pub across_clues_filled: BTreeMap<u32, bool>,
    pub down_clues_filled: BTreeMap<u32, bool>,

    /// Set iff the status is [`Solving`](Status::Solving)
    pub last_start_time: Option<DateTime<Utc>>,

    /// Accumulated wall time spent solving
    #[serde(with = "duration_secs")]
    pub total_solve_duration: Duration,
}

impl SolveState {
    /// Fresh state for a just-selected puzzle
    pub fn new(puzzle: Puzzle) -> Self {
        let cells = Grid::filled(puzzle.rows, puzzle.cols, String::new());

        let across_clues_filled = puzzle.clues_across.keys().map(|&num| (num, false)).collect();
        let down_clues_filled = puzzle.clues_down.keys().map(|&num| (num, false)).collect();

        Self {
            status: Status::Created,
            puzzle,
            cells,
            across_clues_filled,
            down_clues_filled,
            last_start_time: None,
            total_solve_duration: Duration::ZERO,
        }
    }

    /// Flip between solving and paused, starting or stopping the timer.
    ///
    /// A completed solve can no longer be toggled.
    pub fn toggle_status(&mut self) -> Result<Status> {
        match self.status {
            Status::Created | Status::Paused => {
                self.status = Status::Solving;
                self.last_start_time = Some(Utc::now());
            }
            Status::Solving => {
                self.status = Status::Paused;
                self.stop_timer();
            }
            Status::Complete => {
                return Err(Error::StateConflict {
                    status: self.status,
                });
            }
        }

        Ok(self.status)
    }

    /// Apply an answer to a clue.
    ///
    /// The clue identifier and answer are parsed, the answer must cover the
    /// entry exactly, and with `only_correct` any write that would place an
    /// incorrect letter or disturb an already-placed one is rejected before
    /// anything changes. Filling the last cell correctly completes the
    /// solve and stops the timer.
    pub fn apply_answer(&mut self, clue: &str, answer: &str, only_correct: bool) -> Result<()> {
        if self.status != Status::Solving {
            return Err(Error::StateConflict {
                status: self.status,
            });
        }

        let id: ClueId = clue.parse()?;
        let contents = parse_answer(answer)?;

        let coordinates = self.puzzle.answer_coordinates(id.number, id.direction)?;
        let positions = Puzzle::entry_positions(coordinates);

        if contents.len() != positions.len() {
            return Err(Error::LengthMismatch {
                expected: positions.len(),
                found: contents.len(),
            });
        }

        if only_correct {
            for (&pos, desired) in positions.iter().zip(&contents) {
                let existing = &self.cells[pos];
                let expected = &self.puzzle.cells[pos];

                if !existing.is_empty() && desired != existing {
                    return Err(Error::ChangesCorrect { pos });
                }

                if !desired.is_empty() && desired != expected {
                    return Err(Error::WritesIncorrect { pos });
                }
            }
        }

        for (pos, content) in positions.into_iter().zip(contents) {
            self.cells[pos] = content;
        }

        self.update_filled_clues();
        self.check_complete();

        Ok(())
    }

    /// Recompute both filled maps from the current fill
    pub fn update_filled_clues(&mut self) {
        self.across_clues_filled = filled_map(&self.puzzle, &self.cells, Direction::Across);
        self.down_clues_filled = filled_map(&self.puzzle, &self.cells, Direction::Down);
    }

    /// Blank every non-block cell whose content differs from the solution
    pub fn clear_incorrect_cells(&mut self) {
        for (pos, content) in self.cells.iter_indexed_mut() {
            if !content.is_empty() && *content != self.puzzle.cells[pos] {
                content.clear();
            }
        }

        self.update_filled_clues();
    }

    /// Completion: the fill matches the solution pointwise
    fn check_complete(&mut self) {
        if self.cells != self.puzzle.cells {
            return;
        }

        if self.status == Status::Solving {
            self.stop_timer();
        }

        self.status = Status::Complete;
    }

    fn stop_timer(&mut self) {
        if let Some(start) = self.last_start_time.take() {
            let elapsed = (Utc::now() - start).to_std().unwrap_or_default();
            self.total_solve_duration += elapsed;
        }
    }
}

/// One direction's filled flags: true iff every cell of the entry is
/// non-empty in `cells`
fn filled_map(
    puzzle: &Puzzle,
    cells: &Grid<String>,
    direction: Direction,
) -> BTreeMap<u32, bool> {
    let clues = match direction {
        Direction::Across => &puzzle.clues_across,
        Direction::Down => &puzzle.clues_down,
    };

    clues
        .keys()
        .map(|&number| {
            let filled = puzzle
                .answer_coordinates(number, direction)
                .map(Puzzle::entry_positions)
                .is_ok_and(|positions| positions.iter().all(|&pos| !cells[pos].is_empty()));

            (number, filled)
        })
        .collect()
}

/// Durations travel as fractional seconds
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;

        Ok(Duration::try_from_secs_f64(secs).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use crate::puzzle::tests::puzzle_from_rows;

    use super::*;

    fn solving() -> SolveState {
        let mut state = SolveState::new(puzzle_from_rows(&["QANDA", "U.O.N", "IDEAS"]));
        state.toggle_status().unwrap();

        state
    }

    #[test]
    fn fresh_state_is_created_and_empty() {
        let state = SolveState::new(puzzle_from_rows(&["AB", "CD"]));

        assert_eq!(state.status, Status::Created);
        assert!(state.cells.iter().all(String::is_empty));
        assert!(state.last_start_time.is_none());
        assert_eq!(state.across_clues_filled, BTreeMap::from([(1, false)]));
    }

    #[test]
    fn answers_fill_cells_and_clue_maps() {
        let mut state = solving();

        state.apply_answer("1a", "QANDA", false).unwrap();

        for (col, letter) in ["Q", "A", "N", "D", "A"].iter().enumerate() {
            assert_eq!(&state.cells[(0, col)], letter);
        }

        assert_eq!(state.across_clues_filled[&1], true);
        assert_eq!(state.across_clues_filled[&4], false);
        assert_eq!(state.down_clues_filled[&1], false);
        assert_eq!(state.status, Status::Solving);
    }

    #[test]
    fn answers_require_the_solving_status() {
        let mut state = SolveState::new(puzzle_from_rows(&["AB", "CD"]));

        let err = state.apply_answer("1a", "AB", false).unwrap_err();
        assert!(matches!(err, Error::StateConflict { .. }));
    }

    #[test]
    fn length_mismatches_are_rejected() {
        let mut state = solving();

        let err = state.apply_answer("1a", "QAND", false).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                expected: 5,
                found: 4
            }
        ));
    }

    #[test]
    fn rebus_cells_count_as_one() {
        let mut state = solving();

        // 1-down has three cells; a rebus group fills the first
        state.apply_answer("1d", "(QU)UI", false).unwrap();

        assert_eq!(&state.cells[(0, 0)], "QU");
        assert_eq!(state.down_clues_filled[&1], true);
    }

    #[test]
    fn unknown_markers_leave_cells_empty() {
        let mut state = solving();

        state.apply_answer("1a", "Q..DA", false).unwrap();

        assert_eq!(&state.cells[(0, 1)], "");
        assert_eq!(state.across_clues_filled[&1], false);
    }

    #[test]
    fn only_correct_rejects_incorrect_letters() {
        let mut state = solving();

        let err = state.apply_answer("1a", "RANDA", true).unwrap_err();
        assert!(matches!(err, Error::WritesIncorrect { .. }));
        assert!(state.cells.iter().all(String::is_empty));
    }

    #[test]
    fn only_correct_rejects_changing_placed_letters() {
        let mut state = solving();
        state.apply_answer("1a", "QANDA", false).unwrap();

        // Overwriting the Q, even with an unknown marker, is rejected
        let err = state.apply_answer("1a", ".ANDA", true).unwrap_err();
        assert!(matches!(err, Error::ChangesCorrect { .. }));

        // Re-placing the same letters is fine
        state.apply_answer("1a", "QANDA", true).unwrap();
    }

    #[test]
    fn only_correct_allows_filling_empty_cells() {
        let mut state = solving();

        state.apply_answer("1a", "Q....", true).unwrap();
        state.apply_answer("1a", "QANDA", true).unwrap();

        assert_eq!(state.across_clues_filled[&1], true);
    }

    #[test]
    fn clear_incorrect_cells_is_idempotent() {
        let mut state = solving();
        state.apply_answer("1a", "QNORA", false).unwrap();

        state.clear_incorrect_cells();

        assert_eq!(&state.cells[(0, 0)], "Q");
        assert_eq!(&state.cells[(0, 1)], "");
        assert_eq!(&state.cells[(0, 4)], "A");
        assert_eq!(state.across_clues_filled[&1], false);

        let before = state.cells.clone();
        state.clear_incorrect_cells();
        assert_eq!(state.cells, before);
    }

    #[test]
    fn toggling_pauses_and_resumes_the_timer() {
        let mut state = SolveState::new(puzzle_from_rows(&["AB", "CD"]));

        assert_eq!(state.toggle_status().unwrap(), Status::Solving);
        assert!(state.last_start_time.is_some());

        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(state.toggle_status().unwrap(), Status::Paused);
        assert!(state.last_start_time.is_none());
        assert!(state.total_solve_duration > Duration::ZERO);

        assert_eq!(state.toggle_status().unwrap(), Status::Solving);
        assert!(state.last_start_time.is_some());
    }

    #[test]
    fn completion_stops_the_timer_and_is_terminal() {
        let mut state = solving();
        std::thread::sleep(Duration::from_millis(5));

        // Solving every across entry also fills every down entry
        state.apply_answer("1a", "QANDA", false).unwrap();
        state.apply_answer("4a", "IDEAS", false).unwrap();
        state.apply_answer("1d", "QUI", false).unwrap();
        state.apply_answer("2d", "NOE", false).unwrap();
        assert_eq!(state.status, Status::Solving);

        state.apply_answer("3d", "ANS", false).unwrap();

        assert_eq!(state.status, Status::Complete);
        assert!(state.last_start_time.is_none());
        assert!(state.total_solve_duration > Duration::ZERO);

        let err = state.toggle_status().unwrap_err();
        assert!(matches!(err, Error::StateConflict { .. }));

        let err = state.apply_answer("1a", "QANDA", false).unwrap_err();
        assert!(matches!(err, Error::StateConflict { .. }));
    }

    #[test]
    fn state_serializes_with_wire_names() {
        let state = solving();
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["status"], "solving");
        assert_eq!(json["cells"][0][0], "");
        assert!(json["across_clues_filled"]["1"].is_boolean());
        assert!(json["last_start_time"].is_string());
        assert!(json["total_solve_duration"].is_number());

        // The puzzle solution is intact here; elision happens on the way out
        assert_eq!(json["puzzle"]["cells"][0][0], "Q");

        let back: SolveState = serde_json::from_value(json).unwrap();
        assert_eq!(back.status, Status::Solving);
        assert_eq!(back.puzzle, state.puzzle);
    }
}
