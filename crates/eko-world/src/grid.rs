//! Quadrant grid labels and 4-connected adjacency.
//!
//! A label is a column letter followed by a row number (`"B3"`). Two
//! quadrants are neighbours when they share a column and their rows differ
//! by one, or share a row and their columns differ by one letter. There is
//! no wraparound, so edge and corner cells have fewer neighbours.

use std::fmt;

use eko_types::Quadrant;

use crate::error::WorldError;

/// Columns of the grid generated for every new terrain.
pub const STANDARD_COLUMNS: [char; 3] = ['A', 'B', 'C'];

/// Rows of the grid generated for every new terrain.
pub const STANDARD_ROWS: u32 = 5;

/// A parsed quadrant label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridLabel {
    column: char,
    row: u32,
}

impl GridLabel {
    /// Build a label from an uppercase ASCII column and a row of at least 1.
    pub const fn new(column: char, row: u32) -> Option<Self> {
        if column.is_ascii_uppercase() && row >= 1 {
            Some(Self { column, row })
        } else {
            None
        }
    }

    /// Parse `"<letter><number>"`. The letter is case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, WorldError> {
        let invalid = || WorldError::InvalidLabel(raw.to_owned());
        let trimmed = raw.trim();
        let mut chars = trimmed.chars();
        let column = chars
            .next()
            .filter(char::is_ascii_alphabetic)
            .ok_or_else(invalid)?
            .to_ascii_uppercase();
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let row: u32 = digits.parse().map_err(|_e| invalid())?;
        Self::new(column, row).ok_or_else(invalid)
    }

    /// The column letter.
    pub const fn column(self) -> char {
        self.column
    }

    /// The row number.
    pub const fn row(self) -> u32 {
        self.row
    }

    fn shift_column(self, step: i8) -> Option<Self> {
        let code = u8::try_from(self.column).ok()?;
        let shifted = code.checked_add_signed(step)?;
        Self::new(char::from(shifted), self.row)
    }

    /// The up-to-four labels adjacent to this one. Labels off the grid's
    /// lower edges (column before `A`, row 0) are never produced.
    pub fn neighbours(self) -> Vec<Self> {
        let up = self.row.checked_sub(1).and_then(|r| Self::new(self.column, r));
        let down = self.row.checked_add(1).and_then(|r| Self::new(self.column, r));
        [self.shift_column(-1), self.shift_column(1), up, down]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Whether `other` is one of this label's 4-connected neighbours.
    pub fn is_adjacent(self, other: Self) -> bool {
        let same_column = self.column == other.column && self.row.abs_diff(other.row) == 1;
        let same_row =
            self.row == other.row && u32::from(self.column).abs_diff(u32::from(other.column)) == 1;
        same_column || same_row
    }
}

impl fmt::Display for GridLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// The 15 labels `A1..C5` every new terrain is created with.
pub fn standard_grid() -> Vec<GridLabel> {
    STANDARD_COLUMNS
        .iter()
        .flat_map(|&column| (1..=STANDARD_ROWS).filter_map(move |row| GridLabel::new(column, row)))
        .collect()
}

/// The quadrants in `candidates` adjacent to `target`.
///
/// Candidates whose labels do not parse are skipped with a warning; the
/// target itself is never returned.
pub fn resolve_neighbours<'a>(target: &Quadrant, candidates: &'a [Quadrant]) -> Vec<&'a Quadrant> {
    let Ok(origin) = GridLabel::parse(&target.label) else {
        tracing::warn!(quadrant_id = %target.id, label = %target.label, "unparseable quadrant label");
        return Vec::new();
    };
    candidates
        .iter()
        .filter(|candidate| candidate.terrain_id == target.terrain_id && candidate.id != target.id)
        .filter(|candidate| match GridLabel::parse(&candidate.label) {
            Ok(label) => origin.is_adjacent(label),
            Err(_) => {
                tracing::warn!(
                    quadrant_id = %candidate.id,
                    label = %candidate.label,
                    "skipping quadrant with unparseable label"
                );
                false
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use eko_types::{QuadrantId, SoilParameters, TerrainId};

    use super::*;

    fn label(raw: &str) -> GridLabel {
        GridLabel::parse(raw).unwrap()
    }

    fn quadrant(terrain_id: TerrainId, raw: &str) -> Quadrant {
        Quadrant {
            id: QuadrantId::new(),
            terrain_id,
            label: raw.to_owned(),
            soil: SoilParameters::default(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parses_and_normalises_case() {
        assert_eq!(label("b3"), label("B3"));
        assert_eq!(label("C12").row(), 12);
        assert_eq!(label("C12").to_string(), "C12");
    }

    #[test]
    fn rejects_malformed_labels() {
        for raw in ["", "3B", "B", "B0", "BB3", "B-1", "Ç3"] {
            assert!(GridLabel::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn interior_cell_has_four_neighbours() {
        let mut got: Vec<String> = label("B3").neighbours().iter().map(ToString::to_string).collect();
        got.sort();
        assert_eq!(got, vec!["A3", "B2", "B4", "C3"]);
    }

    #[test]
    fn corner_cell_has_no_wraparound() {
        let mut got: Vec<String> = label("A1").neighbours().iter().map(ToString::to_string).collect();
        got.sort();
        assert_eq!(got, vec!["A2", "B1"]);
    }

    #[test]
    fn diagonals_are_not_adjacent() {
        assert!(!label("B3").is_adjacent(label("A2")));
        assert!(!label("B3").is_adjacent(label("B3")));
        assert!(label("B3").is_adjacent(label("B4")));
    }

    #[test]
    fn standard_grid_is_a1_to_c5() {
        let grid = standard_grid();
        assert_eq!(grid.len(), 15);
        assert_eq!(grid.first().map(ToString::to_string).as_deref(), Some("A1"));
        assert_eq!(grid.last().map(ToString::to_string).as_deref(), Some("C5"));
    }

    #[test]
    fn resolves_neighbours_within_terrain_only() {
        let terrain = TerrainId::new();
        let other = TerrainId::new();
        let quadrants: Vec<Quadrant> = standard_grid()
            .iter()
            .map(|l| quadrant(terrain, &l.to_string()))
            .chain(std::iter::once(quadrant(other, "B2")))
            .collect();
        let target = quadrants.iter().find(|q| q.label == "B3").unwrap();
        let mut labels: Vec<&str> = resolve_neighbours(target, &quadrants)
            .iter()
            .map(|q| q.label.as_str())
            .collect();
        labels.sort_unstable();
        assert_eq!(labels, vec!["A3", "B2", "B4", "C3"]);

        let edge = quadrants.iter().find(|q| q.label == "C5").unwrap();
        assert_eq!(resolve_neighbours(edge, &quadrants).len(), 2);
    }
}
