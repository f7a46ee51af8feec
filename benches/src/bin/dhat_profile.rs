use rte_core::{Editor, Selection};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() {
    let _profiler = dhat::Profiler::new_heap();
    let mut markup = String::new();
    for i in 0..2000 {
        let body = "sample ".repeat(10);
        markup.push_str(&format!("<p>Paragraph {}: <strong>{}</strong></p>", i, body));
    }
    let mut editor = Editor::from_markup(&markup);
    for i in 0..50 {
        let _ = editor.apply("italic", Selection::within(vec![i], 0, 12), None);
    }
    let _ = serde_json::to_string(editor.document()).unwrap();
    let _ = editor.markup();
}
