//! Table rendering on top of the reconstructed grid

use quizdoc_ast::{Block, Table};

use super::Renderer;
use crate::grid::{Grid, Slot};

impl Renderer<'_> {
    /// Render a table with row and column spans
    pub fn table(&self, table: &Table) -> String {
        let grid = Grid::build(table);
        let mut html = format!(r#"<table class="{}">"#, self.settings.table_class);

        for row in grid.rows() {
            html.push_str("<tr>");
            for slot in row {
                match slot {
                    Slot::Owner(cell) => {
                        html.push_str("<td");
                        if cell.row_span > 1 {
                            html.push_str(&format!(r#" rowspan="{}""#, cell.row_span));
                        }
                        if cell.col_span > 1 {
                            html.push_str(&format!(r#" colspan="{}""#, cell.col_span));
                        }
                        html.push('>');
                        let blocks: Vec<&Block> = cell.cell.blocks.iter().collect();
                        let content = self.join_blocks(&blocks, &[]);
                        if content.trim().is_empty() {
                            html.push_str("&nbsp;");
                        } else {
                            html.push_str(&content);
                        }
                        html.push_str("</td>");
                    }
                    Slot::Empty => html.push_str("<td>&nbsp;</td>"),
                    Slot::Covered => {}
                }
            }
            html.push_str("</tr>");
        }

        html.push_str("</table>");
        html
    }
}
