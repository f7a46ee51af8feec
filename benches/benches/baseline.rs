use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rte_core::{
    deserialize, link_keyword, serialize, CellRef, Editor, EditorCommand, Mark, Sanitizer,
    Selection, TableEditor,
};

fn build_large_markup(blocks: usize) -> String {
    let mut out = String::new();
    for i in 0..blocks {
        match i % 4 {
            0 => out.push_str(&format!("<h2>Section {}</h2>", i)),
            1 => out.push_str(&format!(
                "<p>Paragraph {} with <strong>bold</strong> and \
                 <a href=\"https://x.test\">a link</a> about Rust.</p>",
                i
            )),
            2 => out.push_str("<ul><li>first item</li><li>second <em>item</em></li></ul>"),
            _ => out.push_str(
                "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>",
            ),
        }
    }
    out
}

fn build_hostile_markup(blocks: usize) -> String {
    let mut out = String::new();
    for i in 0..blocks {
        out.push_str(&format!(
            "<div onclick=\"x()\">{}</div>\
             <p style=\"color: red; position: fixed\">text {}<script>evil()</script></p>\
             <a href=\"javascript:alert(1)\">bad</a><span><span><b>deep</b></span></span>",
            i, i
        ));
    }
    out
}

fn deserialize_markup(c: &mut Criterion) {
    let markup = build_large_markup(400);
    c.bench_function("deserialize_markup", |b| b.iter(|| deserialize(&markup)));
}

fn serialize_markup(c: &mut Criterion) {
    let doc = deserialize(&build_large_markup(400));
    c.bench_function("serialize_markup", |b| b.iter(|| serialize(&doc)));
}

fn sanitize_hostile(c: &mut Criterion) {
    let markup = build_hostile_markup(200);
    let sanitizer = Sanitizer::new();
    c.bench_function("sanitize_hostile", |b| b.iter(|| sanitizer.sanitize(&markup)));
}

fn bold_whole_paragraph(c: &mut Criterion) {
    let text = "word ".repeat(2_000);
    let len = text.chars().count();
    let mut editor = Editor::from_markup(&format!("<p>{}</p>", text));
    c.bench_function("bold_whole_paragraph", |b| {
        b.iter(|| {
            let all = Selection::within(vec![0], 0, len);
            editor.execute(EditorCommand::ToggleMark(Mark::Bold), all)
        })
    });
}

fn keyword_link_large(c: &mut Criterion) {
    let doc = deserialize(&build_large_markup(400));
    c.bench_function("keyword_link_large", |b| {
        b.iter_batched(
            || doc.clone(),
            |mut doc| link_keyword(&mut doc, "Rust", "https://www.rust-lang.org", None, true),
            BatchSize::SmallInput,
        )
    });
}

fn table_grow_100(c: &mut Criterion) {
    c.bench_function("table_grow_100", |b| {
        b.iter(|| {
            let mut block = TableEditor::build(3, 3, true);
            for i in 0..100 {
                TableEditor::insert_row(&mut block, CellRef::new(i % 3, 0));
                TableEditor::insert_column(&mut block, CellRef::new(0, i % 3));
            }
            block
        })
    });
}

fn undo_100_ops(c: &mut Criterion) {
    c.bench_function("undo_100_ops", |b| {
        b.iter_batched(
            || {
                let mut editor = Editor::from_markup("<p>hello world</p>");
                let marks = [Mark::Bold, Mark::Italic, Mark::Underline];
                for i in 0..100 {
                    let _ = editor.execute(
                        EditorCommand::ToggleMark(marks[i % 3]),
                        Selection::within(vec![0], i % 5, 11),
                    );
                }
                editor
            },
            |mut editor| {
                for _ in 0..100 {
                    let _ = editor.execute(EditorCommand::Undo, Selection::default());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    deserialize_markup,
    serialize_markup,
    sanitize_hostile,
    bold_whole_paragraph,
    keyword_link_large,
    table_grow_100,
    undo_100_ops
);
criterion_main!(benches);
