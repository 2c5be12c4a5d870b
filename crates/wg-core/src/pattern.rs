//! Neighborhood pattern matching
//!
//! A template is an odd-by-odd grid of [`PatternCell`]s centered on the cell
//! being tested. `template[i][j]` constrains the tile at
//! `(x + i - w/2, y + j - h/2)`, so templates follow the same `[x][y]`
//! layout as grids.

use std::collections::BTreeMap;

use crate::error::{GenError, GenResult};
use crate::grid::{TileGrid, TileId};

/// One constraint in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCell {
    /// The tile must equal this value.
    Exact(TileId),
    /// Matches anything.
    Any,
    /// Every cell with the same id must hold the same (unconstrained) value.
    Var(usize),
}

/// A cell accepted by one of the matchers passed to
/// [`TileGrid::match_patterns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<K> {
    pub key: K,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExactNode {
    dx: i32,
    dy: i32,
    value: TileId,
}

/// Compiled template, evaluated many times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatcher {
    exact: Vec<ExactNode>,
    variables: Vec<Vec<(i32, i32)>>,
}

impl PatternMatcher {
    /// Compile a template. Fails unless every dimension is odd.
    pub fn new(template: &[Vec<PatternCell>]) -> GenResult<Self> {
        let width = template.len();
        let height = template.first().map_or(0, Vec::len);
        if width % 2 == 0 || height % 2 == 0 {
            return Err(GenError::InvalidPatternShape {
                rows: width,
                cols: height,
            });
        }
        if let Some(column) = template.iter().find(|c| c.len() != height) {
            return Err(GenError::InvalidPatternShape {
                rows: width,
                cols: column.len(),
            });
        }

        let x_offset = -((width / 2) as i32);
        let y_offset = -((height / 2) as i32);
        let mut exact = Vec::new();
        let mut by_var: BTreeMap<usize, Vec<(i32, i32)>> = BTreeMap::new();

        for (i, column) in template.iter().enumerate() {
            for (j, cell) in column.iter().enumerate() {
                let dx = i as i32 + x_offset;
                let dy = j as i32 + y_offset;
                match *cell {
                    PatternCell::Any => {}
                    PatternCell::Exact(value) => exact.push(ExactNode { dx, dy, value }),
                    PatternCell::Var(id) => by_var.entry(id).or_default().push((dx, dy)),
                }
            }
        }

        Ok(Self {
            exact,
            variables: by_var.into_values().collect(),
        })
    }

    /// Test the template centered on `(x, y)`.
    pub fn matches<G: TileGrid>(&self, grid: &G, x: i32, y: i32) -> bool {
        for node in &self.exact {
            if grid.get(x + node.dx, y + node.dy) != Some(node.value) {
                return false;
            }
        }

        for occurrences in &self.variables {
            let Some(&(fx, fy)) = occurrences.first() else {
                continue;
            };
            let reference = grid.get(x + fx, y + fy);
            if occurrences[1..]
                .iter()
                .any(|&(dx, dy)| grid.get(x + dx, y + dy) != reference)
            {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use PatternCell::{Any, Exact, Var};

    #[test]
    fn test_even_dimensions_rejected() {
        let two_columns = vec![vec![Any, Any, Any], vec![Any, Any, Any]];
        assert_eq!(
            PatternMatcher::new(&two_columns),
            Err(GenError::InvalidPatternShape { rows: 2, cols: 3 })
        );

        let two_rows = vec![vec![Any, Any]];
        assert_eq!(
            PatternMatcher::new(&two_rows),
            Err(GenError::InvalidPatternShape { rows: 1, cols: 2 })
        );

        assert!(PatternMatcher::new(&[]).is_err());
    }

    #[test]
    fn test_ragged_template_rejected() {
        let ragged = vec![vec![Any], vec![Any, Any, Any], vec![Any]];
        assert!(PatternMatcher::new(&ragged).is_err());
    }

    #[test]
    fn test_exact_offsets_follow_xy_layout() {
        // (x - 1, y) must be 7
        let matcher =
            PatternMatcher::new(&[vec![Any, Exact(7), Any], vec![Any; 3], vec![Any; 3]]).unwrap();
        let mut grid = Grid::new(3, 0);
        assert!(!matcher.matches(&grid, 1, 1));
        grid.set(0, 1, 7);
        assert!(matcher.matches(&grid, 1, 1));
    }

    #[test]
    fn test_repeated_variable_must_agree() {
        let matcher = PatternMatcher::new(&[vec![Var(0)], vec![Any], vec![Var(0)]]).unwrap();
        let mut grid = Grid::from_rows(&[vec![1, 1, 1], vec![1, 1, 1], vec![1, 1, 1]]);
        assert!(matcher.matches(&grid, 1, 1));
        grid.set(2, 1, 5);
        assert!(!matcher.matches(&grid, 1, 1));
    }

    #[test]
    fn test_unresolvable_cells() {
        let exact = PatternMatcher::new(&[vec![Exact(0)], vec![Any], vec![Any]]).unwrap();
        let grid = Grid::new(3, 0);
        assert!(!exact.matches(&grid, 0, 0));

        // Both occurrences fall outside the grid and compare equal.
        let var = PatternMatcher::new(&[vec![Var(3)], vec![Any], vec![Var(3)]]).unwrap();
        let tiny = Grid::new(1, 0);
        assert!(var.matches(&tiny, 0, 0));
    }

    #[test]
    fn test_match_patterns_reports_first_matching_entry() {
        let grid = Grid::from_rows(&[vec![1, 2], vec![2, 2]]);
        let entries = vec![
            ("one", PatternMatcher::new(&[vec![Exact(1)]]).unwrap()),
            ("any", PatternMatcher::new(&[vec![Any]]).unwrap()),
        ];
        let found = grid.match_patterns(&entries);
        assert_eq!(found.len(), 4);
        assert_eq!(found[0], PatternMatch { key: "one", x: 0, y: 0 });
        assert!(found[1..].iter().all(|m| m.key == "any"));
    }
}
