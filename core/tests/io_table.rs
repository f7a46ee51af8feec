use rte_core::{
    deserialize, flat_text, link_keyword, serialize, templates, Align, Block, CellRef,
    CommandStatus, Document, Editor, Inline, ListItem, ListStyle, Marks, Selection, TableCell,
    TableEditor, TableRow, TextRun,
};
use std::sync::Arc;

const CANONICAL: &str = concat!(
    r#"<h1 style="text-align: center">Title</h1>"#,
    r#"<p><strong><em>bold italic</em></strong> and "#,
    r#"<span style="font-family: Georgia; font-size: large; color: #333333; "#,
    r#"background-color: yellow"><u>styled</u></span></p>"#,
    r#"<ul data-list-style="square"><li>one<ol><li>two</li></ol></li><li>three</li></ul>"#,
    r#"<p>line<br>next</p>"#,
    r#"<table><thead><tr><th>H</th><th>I</th></tr></thead><tbody><tr>"#,
    r#"<td><a href="https://x.test" title="X" "#,
    r#"target="_blank" rel="noopener noreferrer">x</a></td>"#,
    r#"<td>y</td>"#,
    r#"</tr></tbody></table>"#,
    r#"<p><img src="a.png" alt="A" width="10" height="20"></p>"#,
);

#[test]
fn canonical_markup_roundtrips() {
    let doc = deserialize(CANONICAL);
    assert_eq!(doc.blocks.len(), 6);
    assert_eq!(serialize(&doc), CANONICAL);
}

/// Small deterministic generator so every run sees the same trees.
struct Gen(u64);

impl Gen {
    fn below(&mut self, n: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) % n as u64) as usize
    }

    fn chance(&mut self, percent: usize) -> bool {
        self.below(100) < percent
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.below(items.len())]
    }

    fn text(&mut self) -> String {
        const WORDS: &[&str] = &[
            "a", "Rust", "é", " & ", "<b>", "\"q\"", " ", "  two", "★", "x y",
        ];
        (0..1 + self.below(3)).map(|_| self.pick(WORDS)).collect()
    }

    fn run(&mut self) -> TextRun {
        let mut run = TextRun::plain(self.text());
        run.marks = Marks {
            bold: self.chance(30),
            italic: self.chance(30),
            underline: self.chance(20),
        };
        if self.chance(20) {
            let family = self.pick(&["Georgia", "Times New Roman", "monospace"]);
            run.font_family = Some(Arc::from(family));
        }
        if self.chance(20) {
            run.font_size = Some(1 + self.below(7) as u8);
        }
        if self.chance(20) {
            run.fore_color = Some(Arc::from(self.pick(&["#333333", "red", "rgb(1, 2, 3)"])));
        }
        if self.chance(15) {
            run.highlight_color = Some(Arc::from(self.pick(&["yellow", "#ff0"])));
        }
        run
    }

    fn inlines(&mut self, in_link: bool) -> Vec<Inline> {
        (0..self.below(5))
            .map(|_| match self.below(10) {
                0..=5 => Inline::Text(self.run()),
                6 if !in_link => Inline::Link {
                    url: Arc::from(self.pick(&["https://x.test/a?b=1&c=2", "/docs", "#top"])),
                    title: self.chance(50).then(|| Arc::from("Some \"title\"")),
                    new_tab: self.chance(50),
                    content: {
                        let mut content = self.inlines(true);
                        content.push(Inline::Text(self.run()));
                        content
                    },
                },
                7 => Inline::Image {
                    src: Arc::from(self.pick(&["a.png", "data:image/png;base64,AA"])),
                    alt: Arc::from(self.pick(&["", "A \"pic\""])),
                    width: self.chance(50).then(|| 1 + self.below(500) as u32),
                    height: self.chance(50).then(|| 1 + self.below(500) as u32),
                },
                _ => Inline::LineBreak,
            })
            .collect()
    }

    fn align(&mut self) -> Option<Align> {
        self.pick(&[
            None,
            Some(Align::Left),
            Some(Align::Center),
            Some(Align::Right),
            Some(Align::Justify),
        ])
    }

    fn list(&mut self, depth: usize) -> Block {
        let ordered = self.chance(50);
        let style = if ordered {
            self.pick(&[
                ListStyle::Default,
                ListStyle::Decimal,
                ListStyle::LowerRoman,
                ListStyle::UpperAlpha,
            ])
        } else {
            self.pick(&[ListStyle::Default, ListStyle::Disc, ListStyle::Square, ListStyle::Check])
        };
        let items = (0..1 + self.below(3))
            .map(|_| ListItem {
                content: self.inlines(false),
                sublists: if depth < 2 && self.chance(30) {
                    vec![self.list(depth + 1)]
                } else {
                    Vec::new()
                },
            })
            .collect();
        Block::List { ordered, style, align: self.align(), items }
    }

    fn table(&mut self) -> Block {
        let has_header_row = self.chance(50);
        let width = 1 + self.below(3);
        let rows = (0..1 + self.below(3))
            .map(|r| TableRow {
                cells: (0..width)
                    .map(|_| TableCell {
                        is_header: (has_header_row && r == 0) || self.chance(10),
                        content: self.inlines(false),
                    })
                    .collect(),
            })
            .collect();
        Block::Table { has_header_row, rows }
    }

    fn document(&mut self) -> Document {
        let blocks = (0..1 + self.below(5))
            .map(|_| match self.below(4) {
                0 => Block::Paragraph { align: self.align(), content: self.inlines(false) },
                1 => Block::Heading {
                    level: 1 + self.below(6) as u8,
                    align: self.align(),
                    content: self.inlines(false),
                },
                2 => self.list(0),
                _ => self.table(),
            })
            .collect();
        let mut doc = Document::from_blocks(blocks);
        doc.normalize();
        doc
    }
}

#[test]
fn generated_trees_roundtrip() {
    for seed in 0..300 {
        let doc = Gen(seed).document();
        let markup = serialize(&doc);
        let back = deserialize(&markup);
        assert!(
            back.same_content(&doc),
            "seed {}: {}\n  came back as {}",
            seed,
            markup,
            serialize(&back)
        );
    }
}

#[test]
fn whitespace_item_before_sublist_survives() {
    let inner = Block::List {
        ordered: true,
        style: ListStyle::Default,
        align: None,
        items: vec![ListItem::new(vec![Inline::text("x")])],
    };
    let doc = Document::from_blocks(vec![Block::List {
        ordered: false,
        style: ListStyle::Default,
        align: None,
        items: vec![ListItem { content: vec![Inline::text(" ")], sublists: vec![inner] }],
    }]);
    assert_eq!(serialize(&doc), "<ul><li> <ol><li>x</li></ol></li></ul>");
    assert!(deserialize(&serialize(&doc)).same_content(&doc));

    let indented =
        deserialize("<ul>\n  <li>one\n    <ol>\n      <li>x</li>\n    </ol>\n  </li>\n</ul>");
    assert_eq!(serialize(&indented), "<ul><li>one <ol><li>x</li></ol></li></ul>");
}

#[test]
fn loose_markup_is_normalized() {
    let doc = deserialize(
        "<div><b>Hi</b>\n   there</div><section><h2 align=right>T</h2></section><i></i>",
    );
    assert_eq!(
        serialize(&doc),
        r#"<p><strong>Hi</strong> there</p><h2 style="text-align: right">T</h2>"#
    );
}

#[test]
fn empty_input_is_one_paragraph() {
    assert_eq!(serialize(&deserialize("")), "<p></p>");
    assert_eq!(serialize(&deserialize("   \n ")), "<p></p>");
}

#[test]
fn bare_rows_detect_a_header() {
    let doc = deserialize("<table><tr><th>a</th><th>b</th></tr><tr><td>1</td></tr></table>");
    match &doc.blocks[0] {
        Block::Table { has_header_row, rows } => {
            assert!(*has_header_row);
            assert_eq!(rows[1].cells.len(), 2);
        }
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn table_editor_ops() {
    let mut block = TableEditor::build(2, 2, true);
    assert_eq!(TableEditor::dimensions(&block), Some((2, 2)));

    assert!(TableEditor::insert_row(&mut block, CellRef::new(0, 0)));
    assert!(TableEditor::insert_column(&mut block, CellRef::new(0, 1)));
    assert_eq!(TableEditor::dimensions(&block), Some((3, 3)));
    assert!(TableEditor::set_cell_text(&mut block, CellRef::new(1, 1), "b"));
    assert!(!TableEditor::set_cell_text(&mut block, CellRef::new(9, 0), "x"));

    if let Block::Table { rows, .. } = &block {
        assert!(rows[0].cells[1].is_header);
        assert!(!rows[1].cells[0].is_header);
        assert_eq!(flat_text(&rows[1].cells[1].content), "b");
        assert_eq!(flat_text(&rows[2].cells[0].content), "Cell 2-1");
    }

    assert!(TableEditor::delete_row(&mut block, CellRef::new(0, 0)));
    assert!(TableEditor::delete_column(&mut block, CellRef::new(0, 0)));
    assert_eq!(TableEditor::dimensions(&block), Some((2, 2)));
    if let Block::Table { has_header_row, .. } = &block {
        assert!(!*has_header_row);
    }
    assert_eq!(TableEditor::clamp(&block, CellRef::new(7, 7)), Some(CellRef::new(1, 1)));
}

#[test]
fn table_editor_keeps_one_row_and_column() {
    let mut block = TableEditor::build(1, 1, false);
    assert!(!TableEditor::delete_row(&mut block, CellRef::new(0, 0)));
    assert!(!TableEditor::delete_column(&mut block, CellRef::new(0, 0)));
    let mut para = Block::empty_paragraph();
    assert!(!TableEditor::insert_row(&mut para, CellRef::new(0, 0)));
    assert_eq!(TableEditor::dimensions(&para), None);
}

#[test]
fn keyword_linking_is_idempotent() {
    let mut doc = deserialize("<p>Rust and rust and Rusty. Rust!</p>");
    assert_eq!(link_keyword(&mut doc, "Rust", "https://r.test", None, true), 2);
    assert_eq!(link_keyword(&mut doc, "Rust", "https://r.test", None, true), 0);
    let links = match &doc.blocks[0] {
        Block::Paragraph { content, .. } => content
            .iter()
            .filter(|i| matches!(i, Inline::Link { .. }))
            .count(),
        _ => 0,
    };
    assert_eq!(links, 2);
}

#[test]
fn every_template_inserts() {
    assert_eq!(templates::catalogue().len(), 6);
    for template in templates::catalogue() {
        let mut editor = Editor::default();
        let out = editor
            .apply("fragment:insert", Selection::caret(vec![0], 0), Some(template.content.into()))
            .unwrap();
        assert_eq!(out.status, CommandStatus::Applied, "{}", template.id);
        assert_eq!(serialize(&deserialize(&out.markup)), out.markup, "{}", template.id);
    }
    let comparison = templates::get("product-comparison").unwrap();
    let doc = deserialize(comparison.content);
    assert!(doc
        .blocks
        .iter()
        .any(|b| matches!(b, Block::Table { has_header_row: true, rows } if rows.len() == 4)));
    assert!(templates::get("missing").is_none());
}
