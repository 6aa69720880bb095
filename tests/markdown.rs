//! Markdown parser tests
//!
//! Whole-document behavior: block boundaries, tables, lists and inline runs.

use chatmark::markdown::{parse, plain_text, Block, InlineRun, InlineStyle, TableAlign};

fn paragraph(text: &str) -> Block {
    Block::Paragraph {
        inlines: vec![InlineRun::plain(text)],
    }
}

// ========================================================================
// Code Fences
// ========================================================================

#[test]
fn test_fence_round_trip() {
    let code = "fn main() {\n\n    println!(\"hi\");\n}";
    let blocks = parse(&format!("```rust\n{}\n```", code));
    assert_eq!(
        blocks,
        vec![Block::CodeBlock {
            text: code.to_string(),
            language: Some("rust".to_string()),
        }]
    );
}

#[test]
fn test_fence_without_language() {
    let blocks = parse("```\nplain\n```");
    assert_eq!(
        blocks,
        vec![Block::CodeBlock {
            text: "plain".into(),
            language: None,
        }]
    );
}

#[test]
fn test_unterminated_fence_runs_to_end() {
    let blocks = parse("before\n```py\nx = 1\n\ny = 2");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0], paragraph("before"));
    assert_eq!(
        blocks[1],
        Block::CodeBlock {
            text: "x = 1\n\ny = 2".into(),
            language: Some("py".into()),
        }
    );
}

#[test]
fn test_markdown_inside_fence_is_verbatim() {
    let blocks = parse("```md\n# not a heading\n- not a list\n| a | b |\n|---|---|\n```");
    assert_eq!(blocks.len(), 1);
    let Block::CodeBlock { text, .. } = &blocks[0] else {
        panic!("expected code block");
    };
    assert_eq!(text, "# not a heading\n- not a list\n| a | b |\n|---|---|");
}

#[test]
fn test_blank_lines_at_fence_edges_are_trimmed_once() {
    let blocks = parse("```\n\n\nbody\n\n\n```");
    let Block::CodeBlock { text, .. } = &blocks[0] else {
        panic!("expected code block");
    };
    assert_eq!(text, "\nbody\n");
}

// ========================================================================
// Headings and Paragraphs
// ========================================================================

#[test]
fn test_heading_levels() {
    for level in 1..=6u8 {
        let line = format!("{} Title", "#".repeat(level as usize));
        let blocks = parse(&line);
        assert_eq!(
            blocks,
            vec![Block::Heading {
                level,
                inlines: vec![InlineRun::plain("Title")],
            }]
        );
    }
    assert_eq!(parse("####### Seven"), vec![paragraph("####### Seven")]);
    assert_eq!(parse("#hashtag"), vec![paragraph("#hashtag")]);
}

#[test]
fn test_heading_keeps_inline_styles() {
    let blocks = parse("## Use `cargo` **now**  ");
    let Block::Heading { level, inlines } = &blocks[0] else {
        panic!("expected heading");
    };
    assert_eq!(*level, 2);
    assert_eq!(inlines[1], InlineRun::styled("cargo", InlineStyle::CODE));
    assert_eq!(inlines[3], InlineRun::styled("now", InlineStyle::BOLD));
}

#[test]
fn test_paragraph_lines_join_until_blank() {
    let blocks = parse("line one\nline two   \n\nnext");
    assert_eq!(blocks, vec![paragraph("line one\nline two"), paragraph("next")]);
}

#[test]
fn test_crlf_input() {
    let blocks = parse("# Hi\r\n\r\ntext\r\n```sh\r\nls\r\n```\r\n");
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[1], paragraph("text"));
    assert_eq!(
        blocks[2],
        Block::CodeBlock {
            text: "ls".into(),
            language: Some("sh".into()),
        }
    );
}

#[test]
fn test_empty_input_is_one_empty_paragraph() {
    assert_eq!(parse(""), vec![Block::empty_paragraph()]);
    assert_eq!(parse("\n\n   \n"), vec![Block::empty_paragraph()]);
}

// ========================================================================
// Lists
// ========================================================================

#[test]
fn test_bullet_then_numbered_are_separate_blocks() {
    let blocks = parse("- a\n* b\n+ c\n1. one\n2) two");
    assert_eq!(blocks.len(), 2);

    let Block::BulletList { items } = &blocks[0] else {
        panic!("expected bullet list");
    };
    let texts: Vec<_> = items.iter().map(|i| plain_text(&i.inlines)).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);

    let Block::NumberedList { items } = &blocks[1] else {
        panic!("expected numbered list");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(plain_text(&items[1].inlines), "two");
}

#[test]
fn test_nested_indent_levels() {
    let blocks = parse("- top\n  - child\n    - grandchild\n\t- tabbed");
    let Block::BulletList { items } = &blocks[0] else {
        panic!("expected bullet list");
    };
    let levels: Vec<_> = items.iter().map(|i| i.indent_level).collect();
    assert_eq!(levels, vec![0, 1, 2, 2]);
}

#[test]
fn test_blank_line_ends_list() {
    let blocks = parse("- a\n\n- b");
    assert_eq!(blocks.len(), 2);
    assert!(matches!(&blocks[0], Block::BulletList { items } if items.len() == 1));
    assert!(matches!(&blocks[1], Block::BulletList { items } if items.len() == 1));
}

#[test]
fn test_list_item_inline_styles() {
    let blocks = parse("1. **Install** with `pip`");
    let Block::NumberedList { items } = &blocks[0] else {
        panic!("expected numbered list");
    };
    assert_eq!(
        items[0].inlines,
        vec![
            InlineRun::styled("Install", InlineStyle::BOLD),
            InlineRun::plain(" with "),
            InlineRun::styled("pip", InlineStyle::CODE),
        ]
    );
}

#[test]
fn test_paragraph_then_list() {
    let blocks = parse("Steps:\n- first\n- second");
    assert_eq!(blocks[0], paragraph("Steps:"));
    assert!(matches!(&blocks[1], Block::BulletList { items } if items.len() == 2));
}

// ========================================================================
// Tables
// ========================================================================

#[test]
fn test_table_shape() {
    let blocks = parse("|A|B|\n|---|:--:|\n|1|2|");
    let [Block::Table(table)] = blocks.as_slice() else {
        panic!("expected one table, got {:?}", blocks);
    };
    assert_eq!(table.alignments, vec![TableAlign::Left, TableAlign::Center]);
    assert_eq!(table.header, vec![vec![InlineRun::plain("A")], vec![InlineRun::plain("B")]]);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].len(), 2);
    assert_eq!(plain_text(&table.rows[0][1]), "2");
}

#[test]
fn test_table_rows_are_padded_and_truncated() {
    let blocks = parse("| a | b | c |\n|---|---|--:|\n| 1 |\n| 1 | 2 | 3 | 4 |");
    let Block::Table(table) = &blocks[0] else {
        panic!("expected table");
    };
    assert_eq!(table.column_count(), 3);
    assert_eq!(table.alignments[2], TableAlign::Right);
    for row in &table.rows {
        assert_eq!(row.len(), 3);
    }
    assert_eq!(plain_text(&table.rows[0][2]), "");
}

#[test]
fn test_header_without_separator_is_paragraph() {
    let blocks = parse("a | b\nnot a separator");
    assert_eq!(blocks, vec![paragraph("a | b\nnot a separator")]);
}

#[test]
fn test_table_ends_at_blank_line() {
    let blocks = parse("| x |\n|---|\n| 1 |\n\nafter");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1], paragraph("after"));
}

#[test]
fn test_table_cells_parse_inlines() {
    let blocks = parse("| name | link |\n|---|---|\n| **x** | https://a.dev |");
    let Block::Table(table) = &blocks[0] else {
        panic!("expected table");
    };
    assert_eq!(table.rows[0][0], vec![InlineRun::styled("x", InlineStyle::BOLD)]);
    assert!(table.rows[0][1][0].is_link());
}

// ========================================================================
// Inline Runs in Context
// ========================================================================

#[test]
fn test_identifiers_with_underscores_stay_plain() {
    assert_eq!(
        parse("call snake_case_name or a__b here"),
        vec![paragraph("call snake_case_name or a__b here")]
    );
}

#[test]
fn test_autolink_trailing_punctuation() {
    let blocks = parse("Docs at https://docs.rs/regex.");
    let Block::Paragraph { inlines } = &blocks[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(
        inlines,
        &vec![
            InlineRun::plain("Docs at "),
            InlineRun::link("https://docs.rs/regex", "https://docs.rs/regex", InlineStyle::NONE),
            InlineRun::plain("."),
        ]
    );
}

// ========================================================================
// Serialization
// ========================================================================

#[test]
fn test_document_serializes_to_json() {
    let blocks = parse("# T\n\n| a |\n|---|\n| **b** |");
    let json = serde_json::to_value(&blocks).unwrap();
    assert_eq!(json[0]["type"], "heading");
    assert_eq!(json[0]["level"], 1);
    assert_eq!(json[1]["type"], "table");
    assert_eq!(json[1]["alignments"][0], "Left");
    assert_eq!(json[1]["rows"][0][0][0]["style"][0], "bold");
}
