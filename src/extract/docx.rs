//! DOCX text extraction using the `docx-rs` reader.
//!
//! Walks the body in document order. Every paragraph becomes one line; table
//! rows become one line per row with cells separated by tabs. Within a run,
//! tab and break elements map to `\t` and `\n`. Content controls, tracked
//! insertions and nested tables are walked like ordinary content; deleted
//! runs, headers and footers are not emitted.

use docx_rs::{
    DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild, StructuredDataTag,
    StructuredDataTagChild, Table, TableCellContent, TableChild, TableRowChild,
};

use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::{ContentParser, DocumentFormat};

/// DOCX parser backed by `docx-rs`.
pub struct DocxParser;

impl ContentParser for DocxParser {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn parse(&self, data: &[u8]) -> ExtractResult<String> {
        let docx = docx_rs::read_docx(data)
            .map_err(|e| ExtractError::failed(DocumentFormat::Docx, e.to_string()))?;

        let mut lines = Vec::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(para) => lines.push(paragraph_text(para)),
                DocumentChild::Table(table) => table_lines(table, &mut lines),
                DocumentChild::StructuredDataTag(sdt) => sdt_lines(sdt, &mut lines),
                _ => {}
            }
        }

        let mut text = lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        Ok(text)
    }
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut out = String::new();
    push_paragraph_children(&para.children, &mut out);
    out
}

fn push_run(run: &Run, out: &mut String) {
    for rc in &run.children {
        match rc {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

fn push_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, out),
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, out),
            ParagraphChild::Insert(ins) => {
                for ic in &ins.children {
                    if let InsertChild::Run(run) = ic {
                        push_run(run, out);
                    }
                }
            }
            ParagraphChild::StructuredDataTag(sdt) => push_inline_sdt(sdt, out),
            _ => {}
        }
    }
}

/// Inline content control: its runs continue the surrounding paragraph.
fn push_inline_sdt(sdt: &StructuredDataTag, out: &mut String) {
    for child in &sdt.children {
        match child {
            StructuredDataTagChild::Run(run) => push_run(run, out),
            StructuredDataTagChild::Paragraph(para) => {
                push_paragraph_children(&para.children, out)
            }
            _ => {}
        }
    }
}

/// Block content control: paragraphs and tables become lines of their own.
fn sdt_lines(sdt: &StructuredDataTag, lines: &mut Vec<String>) {
    let mut loose = String::new();
    for child in &sdt.children {
        match child {
            StructuredDataTagChild::Paragraph(para) => lines.push(paragraph_text(para)),
            StructuredDataTagChild::Table(table) => table_lines(table, lines),
            StructuredDataTagChild::Run(run) => push_run(run, &mut loose),
            _ => {}
        }
    }
    if !loose.is_empty() {
        lines.push(loose);
    }
}

// docx-rs models rows and cells as single-variant enums.
#[allow(irrefutable_let_patterns)]
fn table_lines(table: &Table, lines: &mut Vec<String>) {
    for child in &table.rows {
        let TableChild::TableRow(row) = child else {
            continue;
        };
        let mut cells = Vec::new();
        for cell in &row.cells {
            if let TableRowChild::TableCell(cell) = cell {
                let mut parts = Vec::new();
                for content in &cell.children {
                    match content {
                        TableCellContent::Paragraph(para) => parts.push(paragraph_text(para)),
                        TableCellContent::Table(nested) => table_lines(nested, &mut parts),
                        _ => {}
                    }
                }
                cells.push(parts.join(" "));
            }
        }
        lines.push(cells.join("\t"));
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use docx_rs::{
        BreakType, Docx, Hyperlink, HyperlinkType, Insert, TableCell, TableRow,
    };

    use super::*;

    fn pack(doc: Docx) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        doc.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut doc = Docx::new();
        for p in paragraphs {
            doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*p)));
        }
        pack(doc)
    }

    fn text_para(text: &str) -> Paragraph {
        Paragraph::new().add_run(Run::new().add_text(text))
    }

    fn cell(text: &str) -> TableCell {
        TableCell::new().add_paragraph(text_para(text))
    }

    #[test]
    fn paragraphs_in_order_one_per_line() {
        let data = docx_bytes(&["Quarterly report", "Revenue grew 12%."]);
        let text = DocxParser.parse(&data).unwrap();
        assert_eq!(text, "Quarterly report\nRevenue grew 12%.\n");
    }

    #[test]
    fn runs_are_concatenated() {
        let para = Paragraph::new()
            .add_run(Run::new().add_text("Hello, "))
            .add_run(Run::new().add_text("world"));
        let text = DocxParser.parse(&pack(Docx::new().add_paragraph(para))).unwrap();
        assert_eq!(text.trim_end(), "Hello, world");
    }

    #[test]
    fn tabs_and_breaks_inside_runs() {
        let para = Paragraph::new().add_run(
            Run::new()
                .add_text("Name")
                .add_tab()
                .add_text("Ada")
                .add_break(BreakType::TextWrapping)
                .add_text("Role")
                .add_tab()
                .add_text("Engineer"),
        );
        let text = DocxParser.parse(&pack(Docx::new().add_paragraph(para))).unwrap();
        assert_eq!(text, "Name\tAda\nRole\tEngineer\n");
    }

    #[test]
    fn table_rows_become_tab_separated_lines() {
        let table = Table::new(vec![
            TableRow::new(vec![cell("Item"), cell("Price")]),
            TableRow::new(vec![cell("Tea"), cell("3.50")]),
        ]);
        let text = DocxParser.parse(&pack(Docx::new().add_table(table))).unwrap();
        assert_eq!(text, "Item\tPrice\nTea\t3.50\n");
    }

    #[test]
    fn nested_table_text_stays_in_its_cell() {
        let inner = Table::new(vec![TableRow::new(vec![cell("Inner")])]);
        let outer = Table::new(vec![TableRow::new(vec![
            TableCell::new().add_paragraph(text_para("Outer")).add_table(inner),
            cell("Side"),
        ])]);
        let text = DocxParser.parse(&pack(Docx::new().add_table(outer))).unwrap();
        assert_eq!(text, "Outer Inner\tSide\n");
    }

    #[test]
    fn hyperlink_text_is_kept() {
        let para = Paragraph::new()
            .add_run(Run::new().add_text("See "))
            .add_hyperlink(
                Hyperlink::new("terms", HyperlinkType::Anchor)
                    .add_run(Run::new().add_text("the terms")),
            )
            .add_run(Run::new().add_text("."));
        let text = DocxParser.parse(&pack(Docx::new().add_paragraph(para))).unwrap();
        assert_eq!(text, "See the terms.\n");
    }

    #[test]
    fn tracked_insertions_are_kept() {
        let para = Paragraph::new()
            .add_run(Run::new().add_text("Pay within "))
            .add_insert(Insert::new(Run::new().add_text("30 days")));
        let text = DocxParser.parse(&pack(Docx::new().add_paragraph(para))).unwrap();
        assert_eq!(text, "Pay within 30 days\n");
    }

    #[test]
    fn block_content_control_is_walked() {
        let sdt = StructuredDataTag::new()
            .add_paragraph(text_para("Clause 1"))
            .add_paragraph(text_para("Clause 2"));
        let doc = Docx::new()
            .add_paragraph(text_para("Terms"))
            .add_structured_data_tag(sdt);
        let text = DocxParser.parse(&pack(doc)).unwrap();
        assert_eq!(text, "Terms\nClause 1\nClause 2\n");
    }

    #[test]
    fn inline_content_control_continues_the_paragraph() {
        let para = Paragraph::new()
            .add_run(Run::new().add_text("Signed by "))
            .add_structured_data_tag(
                StructuredDataTag::new().add_run(Run::new().add_text("J. Doe")),
            );
        assert_eq!(paragraph_text(&para), "Signed by J. Doe");
    }

    #[test]
    fn garbage_is_docx_failure() {
        let err = DocxParser.parse(b"PK not really a zip").unwrap_err();
        assert!(err.to_string().starts_with("Error extracting text from DOCX: "));
    }
}
