use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use matmul_codec::Matrix;
use matmul_session::Reporter;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MatrixOutput<'a> {
    kind: &'a str,
    round: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    operand: Option<usize>,
    dimension: usize,
    rows: Vec<&'a [u32]>,
}

/// Prints operands and results to stdout as a session runs.
pub struct ConsoleReporter {
    format: OutputFormat,
    show_inputs: bool,
}

impl ConsoleReporter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_inputs: true,
        }
    }

    /// Print only results.
    pub fn results_only(mut self) -> Self {
        self.show_inputs = false;
        self
    }
}

impl Reporter for ConsoleReporter {
    fn batch(&self, round: u64, operands: &[Matrix]) {
        if !self.show_inputs {
            return;
        }
        let rendered: Vec<String> = operands
            .iter()
            .enumerate()
            .map(|(index, matrix)| {
                let title = format!("Round {round} input matrix {index}");
                render_matrix(self.format, "input", round, Some(index), &title, matrix)
            })
            .collect();
        print_block(&rendered.join("\n"));
    }

    fn result(&self, round: u64, product: &Matrix) {
        let title = format!("Round {round} result");
        print_block(&render_matrix(
            self.format,
            "result",
            round,
            None,
            &title,
            product,
        ));
    }
}

fn render_matrix(
    format: OutputFormat,
    kind: &str,
    round: u64,
    operand: Option<usize>,
    title: &str,
    matrix: &Matrix,
) -> String {
    match format {
        OutputFormat::Json => {
            let out = MatrixOutput {
                kind,
                round,
                operand,
                dimension: matrix.dimension(),
                rows: matrix.rows().collect(),
            };
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![title.to_string()]);
            for row in matrix.rows() {
                table.add_row(row.iter().map(u32::to_string).collect::<Vec<_>>());
            }
            table.to_string()
        }
        OutputFormat::Pretty => {
            let width = matrix
                .elements()
                .iter()
                .map(|value| value.to_string().len())
                .max()
                .unwrap_or(1);
            let mut out = format!("{title}:");
            for row in matrix.rows() {
                out.push('\n');
                let cells: Vec<String> = row.iter().map(|v| format!("{v:>width$}")).collect();
                out.push_str("  ");
                out.push_str(&cells.join(" "));
            }
            out
        }
    }
}

// One write per block so lines from the two tasks never interleave.
fn print_block(text: &str) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "{text}");
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        Matrix::from_rows(&[[19, 22], [43, 50]]).unwrap()
    }

    #[test]
    fn json_result_has_rows_and_no_operand() {
        let line = render_matrix(OutputFormat::Json, "result", 3, None, "", &sample());
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["kind"], "result");
        assert_eq!(value["round"], 3);
        assert_eq!(value["dimension"], 2);
        assert_eq!(value["rows"], serde_json::json!([[19, 22], [43, 50]]));
        assert!(value.get("operand").is_none());
    }

    #[test]
    fn json_input_carries_operand_index() {
        let line = render_matrix(OutputFormat::Json, "input", 0, Some(1), "", &sample());
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["kind"], "input");
        assert_eq!(value["operand"], 1);
    }

    #[test]
    fn pretty_aligns_columns() {
        let matrix = Matrix::from_rows(&[[1, 100], [7, 8]]).unwrap();
        let text = render_matrix(OutputFormat::Pretty, "result", 0, None, "Round 0 result", &matrix);
        assert_eq!(text, "Round 0 result:\n    1 100\n    7   8");
    }

    #[test]
    fn table_lists_every_element() {
        let text = render_matrix(OutputFormat::Table, "result", 0, None, "Round 0 result", &sample());
        for value in ["Round 0 result", "19", "22", "43", "50"] {
            assert!(text.contains(value), "missing {value} in\n{text}");
        }
    }
}
