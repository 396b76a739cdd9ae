//! Integration tests for the content parser.
//!
//! Covers the totality guarantee, normalization rules (whitespace, `<br>`
//! runs, paragraph merging, wrapper unwrapping), and structural detection
//! for every block variant.

use proptest::prelude::*;
use travelbook::{parse, ContentBlock, HeadingLevel, InfoVariant};

#[test]
fn parse_spec_list_fixture() {
    let blocks = parse("<ul><li>Пункт 1</li><li>Пункт 2</li></ul>");
    assert_eq!(
        blocks,
        vec![ContentBlock::List {
            items: vec!["Пункт 1".to_string(), "Пункт 2".to_string()],
            ordered: false,
        }]
    );
}

#[test]
fn parse_spec_quote_fixture() {
    let blocks = parse("<blockquote>Мудрость<cite>Автор</cite></blockquote>");
    assert_eq!(
        blocks,
        vec![ContentBlock::Quote {
            text: "Мудрость".to_string(),
            author: Some("Автор".to_string()),
        }]
    );
}

#[test]
fn parse_spec_table_fixture() {
    let blocks = parse(
        "<table>\
           <tr><th>Колонка</th><th>Значение</th></tr>\
           <tr><td>Один</td><td>Два</td></tr>\
         </table>",
    );
    assert_eq!(
        blocks,
        vec![ContentBlock::Table {
            headers: vec!["Колонка".to_string(), "Значение".to_string()],
            rows: vec![vec!["Один".to_string(), "Два".to_string()]],
        }]
    );
}

#[test]
fn table_with_zero_data_rows_is_still_a_table() {
    let blocks = parse("<table><tr><th>Колонка</th><th>Значение</th></tr></table>");
    assert_eq!(blocks.len(), 1);
    match &blocks[0] {
        ContentBlock::Table { headers, rows } => {
            assert_eq!(headers.len(), 2);
            assert!(rows.is_empty());
        }
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn adjacent_paragraphs_merge_into_one_block() {
    let blocks = parse("<p>Дорога заняла день.</p><p>Вечером были на месте.</p>");
    assert_eq!(
        blocks,
        vec![ContentBlock::Paragraph {
            text: "Дорога заняла день. Вечером были на месте.".to_string(),
        }]
    );
}

#[test]
fn every_structural_tag_breaks_the_merge() {
    let fixtures = [
        "<h2>з</h2>",
        "<h3>з</h3>",
        "<ul><li>з</li></ul>",
        "<ol><li>з</li></ol>",
        "<blockquote>з</blockquote>",
        "<figure><img src=\"a.jpg\"></figure>",
        "<table><tr><td>з</td></tr></table>",
    ];
    for structural in fixtures {
        let html = format!("<p>до</p>{}<p>после</p>", structural);
        let blocks = parse(&html);
        assert_eq!(blocks.len(), 3, "merge crossed {}", structural);
        assert_eq!(
            blocks[0],
            ContentBlock::Paragraph {
                text: "до".to_string()
            },
            "for {}",
            structural
        );
        assert_eq!(
            blocks[2],
            ContentBlock::Paragraph {
                text: "после".to_string()
            },
            "for {}",
            structural
        );
    }
}

#[test]
fn br_separated_run_joins_with_spaces() {
    let blocks = parse("<p>Ялта<br>Судак<br>Феодосия</p>");
    assert_eq!(
        blocks,
        vec![ContentBlock::Paragraph {
            text: "Ялта Судак Феодосия".to_string(),
        }]
    );
}

#[test]
fn special_spaces_are_normalized() {
    let blocks = parse("<p>сто\u{00A0}км</p><p>дву\u{200B}х</p>");
    assert_eq!(
        blocks,
        vec![ContentBlock::Paragraph {
            text: "сто км дву х".to_string(),
        }]
    );
}

#[test]
fn legacy_wrappers_unwrap_in_place() {
    let blocks = parse(
        "<div><section><p>начало</p></section></div>\
         <center><h2>Середина</h2></center>\
         <font color=\"red\"><p>конец</p></font>",
    );
    assert_eq!(blocks.len(), 3);
    assert_eq!(
        blocks[1],
        ContentBlock::Heading {
            level: HeadingLevel::H2,
            text: "Середина".to_string(),
        }
    );
}

#[test]
fn heading_levels_map_to_tags() {
    let blocks = parse("<h2>Большой</h2><h3>Маленький</h3>");
    assert_eq!(
        blocks,
        vec![
            ContentBlock::Heading {
                level: HeadingLevel::H2,
                text: "Большой".to_string(),
            },
            ContentBlock::Heading {
                level: HeadingLevel::H3,
                text: "Маленький".to_string(),
            },
        ]
    );
}

#[test]
fn gallery_columns_equal_image_count() {
    let blocks = parse(
        "<figure><img src=\"1.jpg\"><img src=\"2.jpg\"><img src=\"3.jpg\"><img src=\"4.jpg\"></figure>",
    );
    match &blocks[0] {
        ContentBlock::ImageGallery { images, columns } => {
            assert_eq!(images.len(), 4);
            assert_eq!(*columns, 4);
        }
        other => panic!("expected gallery, got {:?}", other),
    }
}

#[test]
fn callout_variants_from_lead_in_words() {
    let cases = [
        ("Важно", InfoVariant::Important),
        ("Внимание", InfoVariant::Warning),
        ("Совет", InfoVariant::Tip),
        ("Примечание", InfoVariant::Tip),
    ];
    for (word, expected) in cases {
        let html = format!("<p><b>{}:</b> текст заметки</p>", word);
        let blocks = parse(&html);
        match &blocks[0] {
            ContentBlock::Info { variant, title, text } => {
                assert_eq!(*variant, expected, "for {}", word);
                assert_eq!(title.as_deref(), Some(format!("{}:", word).as_str()));
                assert_eq!(text, "текст заметки");
            }
            other => panic!("expected info block for {}, got {:?}", word, other),
        }
    }
}

#[test]
fn malformed_editor_output_survives() {
    // Unclosed tags, stray closers, boolean attributes, nested junk
    let blocks = parse(
        "<p>день первый<div><ul><li>пункт<li>ещё</ul>\
         </span></em><table><tr><td>яч</table><p>хвост",
    );
    assert!(!blocks.is_empty());
    assert!(blocks.iter().any(|b| b.kind() == "list"));
    assert!(blocks.iter().any(|b| b.kind() == "table"));
}

#[test]
fn whitespace_only_documents_are_empty() {
    assert!(parse("").is_empty());
    assert!(parse("   \n\r\t ").is_empty());
    assert!(parse("<p> </p><p>\u{00A0}\u{200B}</p>").is_empty());
    assert!(parse("<!-- только комментарий -->").is_empty());
}

proptest! {
    /// The parser is total: any string resolves to a block list.
    #[test]
    fn parse_is_total(input in any::<String>()) {
        let _ = parse(&input);
    }

    /// Tag soup built from fragments of real markup never panics either.
    #[test]
    fn parse_survives_tag_soup(
        pieces in proptest::collection::vec(
            prop_oneof![
                Just("<p>".to_string()),
                Just("</p>".to_string()),
                Just("<ul><li>".to_string()),
                Just("<table><tr>".to_string()),
                Just("<blockquote>".to_string()),
                Just("<img src=".to_string()),
                Just("текст".to_string()),
                Just("&nbsp;&#x27;".to_string()),
                Just("<!--".to_string()),
                "[a-z<>/\"=]{0,8}",
            ],
            0..24,
        )
    ) {
        let soup: String = pieces.concat();
        let _ = parse(&soup);
    }
}
