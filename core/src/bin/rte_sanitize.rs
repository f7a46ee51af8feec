use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: rte_sanitize <input_markup> <output_markup> [config.json]");
        std::process::exit(2);
    }
    let input = PathBuf::from(&args[1]);
    let output = PathBuf::from(&args[2]);
    let config = match args.get(3) {
        Some(path) => match rte_core::EditorConfig::from_path(std::path::Path::new(path)) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("config failed: {}", err);
                std::process::exit(1);
            }
        },
        None => rte_core::EditorConfig::default(),
    };
    let raw = match std::fs::read_to_string(&input) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("read failed: {:?}", err);
            std::process::exit(1);
        }
    };
    let clean = rte_core::Sanitizer::with_max_depth(config.max_sanitize_depth).sanitize(&raw);
    if let Err(err) = std::fs::write(&output, clean) {
        eprintln!("write failed: {:?}", err);
        std::process::exit(1);
    }
}
