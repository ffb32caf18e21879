//! Table grid reconstruction
//!
//! A raw table lists, per row, the cells as stored in the document: each
//! with a horizontal span and a vertical-merge marker. [`Grid::build`]
//! places them into a dense matrix so that every slot is either owned by
//! exactly one cell or covered by a span, and computes row spans from the
//! continuation markers below each owner.

use quizdoc_ast::{Table, TableCell, VMerge};

/// A cell placed in the matrix
#[derive(Debug, Clone, Copy)]
pub struct GridCell<'a> {
    /// The raw cell providing the content
    pub cell: &'a TableCell,
    /// Rows covered, at least 1
    pub row_span: usize,
    /// Columns covered, at least 1
    pub col_span: usize,
}

/// One matrix position
#[derive(Debug, Clone, Copy)]
pub enum Slot<'a> {
    /// No cell reaches this position (short row)
    Empty,
    /// Top-left corner of a cell
    Owner(GridCell<'a>),
    /// Covered by a span or a continuation marker
    Covered,
}

impl Slot<'_> {
    fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// Reconstructed table matrix
#[derive(Debug, Clone)]
pub struct Grid<'a> {
    rows: Vec<Vec<Slot<'a>>>,
    width: usize,
}

/// Raw cells of one row with their logical start column
struct PlacedRow<'a> {
    cells: Vec<(usize, &'a TableCell)>,
}

impl<'a> PlacedRow<'a> {
    fn new(cells: &'a [TableCell]) -> Self {
        let mut cursor = 0;
        let cells = cells
            .iter()
            .map(|cell| {
                let start = cursor;
                cursor += cell.col_span.max(1);
                (start, cell)
            })
            .collect();
        Self { cells }
    }

    /// The raw cell covering a logical column
    fn covering(&self, col: usize) -> Option<&'a TableCell> {
        self.cells
            .iter()
            .find(|(start, cell)| *start <= col && col < start + cell.col_span.max(1))
            .map(|(_, cell)| *cell)
    }
}

impl<'a> Grid<'a> {
    /// Build the matrix for a table
    pub fn build(table: &'a Table) -> Self {
        let placed: Vec<PlacedRow<'a>> = table
            .rows
            .iter()
            .map(|row| PlacedRow::new(&row.cells))
            .collect();

        let width = table
            .rows
            .iter()
            .map(|row| row.cells.iter().map(|c| c.col_span.max(1)).sum::<usize>())
            .max()
            .unwrap_or(0);

        let mut grid = Grid {
            rows: vec![Vec::new(); table.rows.len()],
            width,
        };

        for (r, row) in table.rows.iter().enumerate() {
            let mut cursor = 0;
            for cell in &row.cells {
                let span = cell.col_span.max(1);
                let owned_above = cell.v_merge == VMerge::Continue
                    && matches!(grid.slot(r, cursor), Some(Slot::Covered));

                if owned_above {
                    let wider = (cursor..cursor + span)
                        .any(|c| !matches!(grid.slot(r, c), Some(Slot::Covered)));
                    if wider {
                        log::debug!(
                            "Continuation cell at row {} spans {} columns, wider than the merge above",
                            r,
                            span
                        );
                    }
                    for c in cursor..cursor + span {
                        grid.claim(r, c, Slot::Covered);
                    }
                    cursor += span;
                    continue;
                }

                if cell.v_merge == VMerge::Continue {
                    log::debug!("Continuation cell at row {} has no owner above", r);
                }

                // Malformed spans may have covered this slot already
                let start = cursor;
                while !grid.slot(r, cursor).map_or(true, |s| s.is_empty()) {
                    cursor += 1;
                }
                if cursor != start {
                    log::debug!(
                        "Cell at row {} moved from column {} to {} past a wider merge",
                        r,
                        start,
                        cursor
                    );
                }

                let row_span = 1 + placed[r + 1..]
                    .iter()
                    .take_while(|later| {
                        later
                            .covering(cursor)
                            .is_some_and(|c| c.v_merge == VMerge::Continue)
                    })
                    .count();

                for rr in r..r + row_span {
                    for c in cursor..cursor + span {
                        grid.claim(rr, c, Slot::Covered);
                    }
                }
                grid.set(
                    r,
                    cursor,
                    Slot::Owner(GridCell {
                        cell,
                        row_span,
                        col_span: span,
                    }),
                );
                cursor += span;
            }
        }

        grid.width = grid.rows.iter().map(Vec::len).max().unwrap_or(0).max(width);
        for row in &mut grid.rows {
            row.resize(grid.width, Slot::Empty);
        }
        grid
    }

    /// Matrix rows, each exactly [`Grid::width`] slots long
    pub fn rows(&self) -> &[Vec<Slot<'a>>] {
        &self.rows
    }

    /// Number of logical columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Owning cells in row-major order
    pub fn owners(&self) -> impl Iterator<Item = &GridCell<'a>> {
        self.rows.iter().flatten().filter_map(|slot| match slot {
            Slot::Owner(cell) => Some(cell),
            _ => None,
        })
    }

    fn slot(&self, row: usize, col: usize) -> Option<&Slot<'a>> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    fn set(&mut self, row: usize, col: usize, slot: Slot<'a>) {
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, Slot::Empty);
        }
        cells[col] = slot;
    }

    /// Set a slot only if nothing occupies it yet
    fn claim(&mut self, row: usize, col: usize, slot: Slot<'a>) {
        if self.slot(row, col).map_or(true, |s| s.is_empty()) {
            self.set(row, col, slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(grid: &Grid) -> Vec<(usize, usize)> {
        grid.owners().map(|c| (c.row_span, c.col_span)).collect()
    }

    #[test]
    fn test_plain_table() {
        let table = Table::from_rows(vec![
            vec![TableCell::from_text("a"), TableCell::from_text("b")],
            vec![TableCell::from_text("c"), TableCell::from_text("d")],
            vec![TableCell::from_text("e"), TableCell::from_text("f")],
        ]);
        let grid = Grid::build(&table);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.owners().count(), 6);
        assert!(spans(&grid).iter().all(|&s| s == (1, 1)));
    }

    #[test]
    fn test_vertical_merge_with_col_span() {
        // 2 wide cell merged down across 2 continuation rows
        let table = Table::from_rows(vec![
            vec![
                TableCell::from_text("a").with_col_span(2).with_v_merge(VMerge::Start),
                TableCell::from_text("b"),
            ],
            vec![TableCell::continuation().with_col_span(2), TableCell::from_text("c")],
            vec![TableCell::continuation().with_col_span(2), TableCell::from_text("d")],
            vec![TableCell::from_text("e"), TableCell::from_text("f"), TableCell::from_text("g")],
        ]);
        let grid = Grid::build(&table);
        assert_eq!(grid.width(), 3);
        assert_eq!(
            spans(&grid),
            vec![(3, 2), (1, 1), (1, 1), (1, 1), (1, 1), (1, 1), (1, 1)]
        );
        assert!(matches!(grid.rows()[1][0], Slot::Covered));
        assert!(matches!(grid.rows()[2][1], Slot::Covered));
        assert!(matches!(grid.rows()[1][2], Slot::Owner(_)));
    }

    #[test]
    fn test_merge_stops_at_first_non_continuation() {
        let table = Table::from_rows(vec![
            vec![TableCell::from_text("a").with_v_merge(VMerge::Start)],
            vec![TableCell::continuation()],
            vec![TableCell::from_text("b")],
            vec![TableCell::continuation()],
        ]);
        let grid = Grid::build(&table);
        // Row 3 continues "b"
        assert_eq!(spans(&grid), vec![(2, 1), (2, 1)]);
    }

    #[test]
    fn test_orphan_continuation_is_ordinary_cell() {
        let table = Table::from_rows(vec![vec![TableCell::continuation(), TableCell::from_text("x")]]);
        let grid = Grid::build(&table);
        assert_eq!(grid.owners().count(), 2);
        assert!(spans(&grid).iter().all(|&s| s == (1, 1)));
    }

    #[test]
    fn test_continuation_narrower_than_owner() {
        let table = Table::from_rows(vec![
            vec![
                TableCell::from_text("a").with_col_span(2).with_v_merge(VMerge::Start),
                TableCell::from_text("b"),
            ],
            vec![
                TableCell::continuation(),
                TableCell::from_text("c"),
                TableCell::from_text("d"),
            ],
        ]);
        let grid = Grid::build(&table);
        // "c" and "d" shift right of the 2 wide merge
        assert_eq!(grid.width(), 4);
        assert_eq!(spans(&grid), vec![(2, 2), (1, 1), (1, 1), (1, 1)]);
        assert!(matches!(grid.rows()[1][1], Slot::Covered));
        assert!(matches!(grid.rows()[1][2], Slot::Owner(c) if c.cell.blocks[0].plain_text() == "c"));
        assert!(matches!(grid.rows()[0][3], Slot::Empty));
    }

    #[test]
    fn test_continuation_wider_than_owner() {
        let table = Table::from_rows(vec![
            vec![TableCell::from_text("a").with_v_merge(VMerge::Start)],
            vec![TableCell::continuation().with_col_span(2)],
        ]);
        let grid = Grid::build(&table);
        assert_eq!(grid.width(), 2);
        assert_eq!(spans(&grid), vec![(2, 1)]);
        assert!(matches!(grid.rows()[1][1], Slot::Covered));
        assert!(matches!(grid.rows()[0][1], Slot::Empty));
    }

    #[test]
    fn test_short_rows_padded() {
        let table = Table::from_rows(vec![
            vec![
                TableCell::from_text("a"),
                TableCell::from_text("b"),
                TableCell::from_text("c"),
            ],
            vec![TableCell::from_text("d")],
        ]);
        let grid = Grid::build(&table);
        assert_eq!(grid.rows()[1].len(), 3);
        assert!(matches!(grid.rows()[1][1], Slot::Empty));
    }

    #[test]
    fn test_every_slot_accounted_for() {
        let table = Table::from_rows(vec![
            vec![
                TableCell::from_text("a").with_v_merge(VMerge::Start),
                TableCell::from_text("b").with_col_span(2),
            ],
            vec![
                TableCell::continuation(),
                TableCell::from_text("c"),
                TableCell::from_text("d").with_v_merge(VMerge::Start),
            ],
            vec![
                TableCell::continuation(),
                TableCell::from_text("e"),
                TableCell::continuation(),
            ],
        ]);
        let grid = Grid::build(&table);
        let covered_by_owners: usize = grid.owners().map(|c| c.row_span * c.col_span).sum();
        assert_eq!(covered_by_owners, 3 * 3);
        assert!(grid.rows().iter().flatten().all(|s| !s.is_empty()));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::default();
        let grid = Grid::build(&table);
        assert_eq!(grid.width(), 0);
        assert_eq!(grid.owners().count(), 0);
    }
}
