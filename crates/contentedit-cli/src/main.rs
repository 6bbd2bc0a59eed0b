use anyhow::{Context, Result};
use contentedit_config::Config;
use contentedit_engine::{
    Anchor, Dom, EditingSurface, MarkdownDocument, Position, SelectionRange, SelectionSource,
    SimulatedHost, dom_from_markdown_with, leaves,
};
use std::{env, path::PathBuf, process};

/// Everything the inspector prints for one document
fn describe(doc: MarkdownDocument) -> Vec<String> {
    let MarkdownDocument {
        dom,
        body,
        content_root,
    } = doc;

    let mut lines = vec![dom.to_html(content_root), String::new()];

    lines.push("Leaves:".to_string());
    for leaf in leaves(&dom, content_root) {
        let begin = Position::new(leaf, Anchor::Begin).normalize(&dom);
        let end = Position::new(leaf, Anchor::End).normalize(&dom);
        let label = match dom.tag(leaf) {
            Some(tag) => format!("<{tag}>"),
            None => format!("{:?}", SelectionRange::new(&dom, begin, end).text_content(&dom)),
        };
        lines.push(format!("  {leaf}  {begin} .. {end}  {label}"));
    }

    let host = SimulatedHost::new(body).with_focusable(content_root);
    let mut surface = EditingSurface::new(dom, content_root, host);
    let outcome = surface.focus();

    lines.push(String::new());
    let selection = match outcome.selection {
        SelectionSource::InSync => "already in sync".to_string(),
        SelectionSource::CachedRange => "restored cached range".to_string(),
        SelectionSource::ContentBegin { position, applied } => {
            format!("beginning of content at {position} (applied: {applied})")
        }
    };
    lines.push(format!("Focus: {selection}"));
    if let Some(range) = surface.live_range() {
        lines.push(format!("Caret: {}", range.start()));
    }
    if outcome.forced_focus {
        lines.push("Focus was forced onto the content root".to_string());
    }

    lines
}

/// Config written by `--init-config`, optionally pointing at a document
fn starter_config(default_document: Option<PathBuf>) -> Config {
    Config {
        default_document,
        ..Config::default()
    }
}

fn main() -> Result<()> {
    // RUST_LOG overrides the default level
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    // Determine document path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    if args.get(1).map(String::as_str) == Some("--init-config") {
        if args.len() > 3 {
            eprintln!("Usage: {} --init-config [markdown-file]", args[0]);
            process::exit(1);
        }
        if config_path.exists() {
            eprintln!("Error: {} already exists", config_path.display());
            process::exit(1);
        }
        starter_config(args.get(2).map(PathBuf::from))
            .save()
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let document_path = match args.len() {
        2 => PathBuf::from(&args[1]),
        1 => match config.default_document.clone() {
            Some(path) => path,
            None => {
                eprintln!("Error: No document provided and no default_document configured");
                eprintln!("Usage: {} <markdown-file>", args[0]);
                eprintln!("Or set default_document in {}", config_path.display());
                process::exit(1);
            }
        },
        _ => {
            eprintln!("Usage: {} [markdown-file | --init-config [markdown-file]]", args[0]);
            process::exit(1);
        }
    };
    log::info!("Inspecting {}", document_path.display());

    let source = std::fs::read_to_string(&document_path)
        .with_context(|| format!("Failed to read {}", document_path.display()))?;

    let mut dom = Dom::new();
    for tag in &config.extra_void_tags {
        dom.register_void_tag(tag);
    }
    let doc = dom_from_markdown_with(dom, &source)
        .with_context(|| format!("Failed to build a tree from {}", document_path.display()))?;

    for line in describe(doc) {
        println!("{line}");
    }
    Ok(())
}
