use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Reads markup through the editor and writes it back in canonical form.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: rte_normalize <input_markup> <output_markup>");
        std::process::exit(2);
    }
    let input = PathBuf::from(&args[1]);
    let output = PathBuf::from(&args[2]);
    let raw = match std::fs::read_to_string(&input) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("read failed: {:?}", err);
            std::process::exit(1);
        }
    };
    let editor = rte_core::Editor::from_markup(&raw);
    tracing::debug!(blocks = editor.document().blocks.len(), "normalized");
    if let Err(err) = std::fs::write(&output, editor.markup()) {
        eprintln!("write failed: {:?}", err);
        std::process::exit(1);
    }
}
