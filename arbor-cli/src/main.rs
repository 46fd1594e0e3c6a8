//! Arbor CLI
//!
//! Replays a stream of JSON tokens through tree construction and prints the
//! resulting document.
//!
//! - arbor tokens.json          # colored html5lib-style dump
//! - arbor --json < tokens.json # document as JSON

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use arbor_dom::{DomTree, NodeId, NodeType};
use arbor_html::{
    ConstructorOptions, Token, TokenSource, TokenizerState, TreeConstructor, dump_tree,
};
use clap::Parser;
use log::{debug, info};
use owo_colors::OwoColorize;
use serde_json::{Value, json};
use serde_json::de::IoRead;

/// Arbor: build an HTML document from a token stream
#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"TOKENS FORMAT:
    One JSON object per token, concatenated or newline separated:
    {"type":"doctype","name":"html"}
    {"type":"start_tag","name":"p","attributes":[{"name":"id","value":"a"}]}
    {"type":"character","data":"x"}
    {"type":"end_of_file"}

EXAMPLES:
    # Dump the tree built from a file
    arbor tokens.json

    # Read tokens from stdin and print the document as JSON
    cat tokens.json | arbor --json

    # Fail on the first parse error
    arbor --strict tokens.json
"#)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// File of JSON tokens; `-` or absent reads stdin
    #[arg(value_name = "TOKENS")]
    tokens: Option<PathBuf>,

    /// Print the document as JSON instead of the text dump
    #[arg(long)]
    json: bool,

    /// Print the text dump without colors
    #[arg(long, conflicts_with = "json")]
    plain: bool,

    /// Stop at the first parse error
    #[arg(long)]
    strict: bool,

    /// Build with the scripting flag enabled
    #[arg(long)]
    scripting: bool,

    /// Treat the input as an iframe srcdoc document
    #[arg(long)]
    iframe_srcdoc: bool,

    /// Do not process an end-of-file token when the stream runs out
    #[arg(long)]
    no_eof: bool,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Tokens decoded lazily from a JSON reader.
///
/// Decoding stops at the first malformed token; the error is kept so the
/// caller can report it after the run.
struct JsonTokenStream<R: Read> {
    tokens: serde_json::StreamDeserializer<'static, IoRead<R>, Token>,
    error: Option<serde_json::Error>,
}

impl<R: Read> JsonTokenStream<R> {
    fn new(reader: R) -> Self {
        Self {
            tokens: serde_json::Deserializer::from_reader(reader).into_iter(),
            error: None,
        }
    }
}

impl<R: Read> TokenSource for JsonTokenStream<R> {
    fn next_token(&mut self) -> Option<Token> {
        match self.tokens.next()? {
            Ok(token) => Some(token),
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    fn switch_state(&mut self, state: TokenizerState) {
        // Tokens are already lexed; the request is only reported.
        debug!("tree construction asked for the {state} tokenizer state");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let reader = open_tokens(cli.tokens.as_deref())?;
    let mut source = JsonTokenStream::new(reader);
    let mut constructor = TreeConstructor::with_options(ConstructorOptions {
        strict: cli.strict,
        scripting: cli.scripting,
        iframe_srcdoc: cli.iframe_srcdoc,
    });

    let mut result = constructor.run(&mut source);
    if let Some(e) = source.error.take() {
        return Err(e).context("malformed token in input");
    }
    if result.is_ok() && !cli.no_eof {
        result = constructor.finish();
    }
    info!(
        "stopped in {} after {} parse error(s)",
        constructor.insertion_mode(),
        constructor.parse_errors().len()
    );

    for error in constructor.parse_errors() {
        eprintln!("{} {error}", "parse error:".yellow());
    }

    let tree = constructor.take_document();
    if cli.json {
        let document = document_json(&tree);
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else if cli.plain {
        print!("{}", dump_tree(&tree));
    } else {
        print_colored(&dump_tree(&tree));
    }

    result.context("tree construction stopped early")
}

/// `-v` steps the default filter from warn up to trace. `RUST_LOG` wins
/// when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn open_tokens(path: Option<&Path>) -> anyhow::Result<Box<dyn Read>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

/// Print dump lines, colored by the kind of node each line shows.
fn print_colored(dump: &str) {
    for line in dump.lines() {
        let Some(rest) = line.strip_prefix("| ") else {
            println!("{line}");
            continue;
        };
        let content = rest.trim_start_matches(' ');
        let indent = &rest[..rest.len() - content.len()];
        let bar = "|".dimmed();
        if content.starts_with("<!--") {
            println!("{bar} {indent}{}", content.dimmed());
        } else if content.starts_with("<!DOCTYPE") {
            println!("{bar} {indent}{}", content.magenta());
        } else if content.starts_with('<') {
            println!("{bar} {indent}{}", content.cyan());
        } else if content.starts_with('"') {
            println!("{bar} {indent}{}", content.green());
        } else {
            println!("{bar} {indent}{}", content.yellow());
        }
    }
}

fn document_json(tree: &DomTree) -> Value {
    json!({
        "quirks_mode": tree.quirks_mode().to_string(),
        "children": tree
            .children(NodeId::ROOT)
            .iter()
            .map(|&child| node_json(tree, child))
            .collect::<Vec<_>>(),
    })
}

fn node_json(tree: &DomTree, id: NodeId) -> Value {
    let Some(node) = tree.get(id) else {
        return Value::Null;
    };
    let children: Vec<Value> = tree
        .children(id)
        .iter()
        .map(|&child| node_json(tree, child))
        .collect();

    match &node.node_type {
        NodeType::Document => json!({ "type": "document", "children": children }),
        NodeType::DocumentType(doctype) => json!({
            "type": "doctype",
            "name": doctype.name,
            "public_id": doctype.public_id,
            "system_id": doctype.system_id,
        }),
        NodeType::DocumentFragment | NodeType::ShadowRoot => {
            json!({ "type": "fragment", "children": children })
        }
        NodeType::Element(element) => {
            let attributes: serde_json::Map<String, Value> = element
                .attrs
                .iter()
                .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                .collect();
            json!({
                "type": "element",
                "name": element.local_name,
                "namespace": element.namespace.to_string(),
                "attributes": attributes,
                "children": children,
            })
        }
        NodeType::Attr(attr) => json!({ "type": "attr", "name": attr.name, "value": attr.value }),
        NodeType::Text(data) => json!({ "type": "text", "data": data.data() }),
        NodeType::CdataSection(data) => json!({ "type": "cdata", "data": data.data() }),
        NodeType::Comment(data) => json!({ "type": "comment", "data": data.data() }),
        NodeType::ProcessingInstruction(pi) => json!({
            "type": "processing_instruction",
            "target": pi.target,
            "data": pi.data.data(),
        }),
    }
}
