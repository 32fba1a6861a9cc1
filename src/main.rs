//! Layout Stack CLI
//!
//! Usage:
//!   layout-stack --layouts <FILE> [OPTIONS] [PAGE]
//!
//! Options:
//!   -l, --layouts <FILE>  TOML file with configuration and layouts
//!   -L, --layout <NAME>   Starting layout (defaults to the configured one)
//!   --stack               Print the resolved stack and exit
//!   --data                Print the merged data as JSON after the output
//!   --plain               Don't expand template syntax in layouts
//!   -v, --verbose         Log resolution steps to stderr
//!   -h, --help            Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use layout_stack::{LayoutFile, Layouts, PassthroughRenderer};

#[derive(Parser, Debug)]
#[command(name = "layout-stack")]
#[command(about = "Wrap content in a stack of nested layouts")]
struct Cli {
    /// Page file (reads from stdin if not provided)
    page: Option<PathBuf>,

    /// TOML file with configuration and layouts
    #[arg(short, long)]
    layouts: PathBuf,

    /// Starting layout (defaults to the configured default layout)
    #[arg(short = 'L', long)]
    layout: Option<String>,

    /// Print the resolved stack, outermost layout first, and exit
    #[arg(long)]
    stack: bool,

    /// Print the merged data as JSON after the rendered output
    #[arg(long)]
    data: bool,

    /// Insert content without expanding template syntax in layouts
    #[arg(long)]
    plain: bool,

    /// Log resolution steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// The starting reference: an explicit name, or "use the default"
    fn start(&self) -> Value {
        self.layout.clone().map_or(Value::Bool(true), Value::String)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(message) = run(&cli) {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "layout_stack=debug"
    } else {
        "layout_stack=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let file = LayoutFile::from_file(&cli.layouts)
        .map_err(|e| format!("loading layouts '{}': {}", cli.layouts.display(), e))?;
    tracing::info!(layouts = %cli.layouts.display(), "layout file loaded");

    let layouts = if cli.plain {
        let mut layouts = Layouts::with_renderer(file.config, PassthroughRenderer)
            .map_err(|e| e.to_string())?;
        layouts.put_all(file.layouts).map_err(|e| e.to_string())?;
        layouts
    } else {
        Layouts::from_layout_file(file).map_err(|e| e.to_string())?
    };

    if cli.stack {
        for name in layouts.resolve(cli.start()).map_err(|e| e.to_string())? {
            println!("{}", name);
        }
        return Ok(());
    }

    let page = read_page(cli.page.as_ref())?;
    let rendered = layouts
        .render(&page, cli.start())
        .map_err(|e| e.to_string())?;
    print!("{}", rendered.content);

    if cli.data {
        let data = serde_json::to_string_pretty(&rendered.data).map_err(|e| e.to_string())?;
        println!();
        println!("{}", data);
    }
    Ok(())
}

fn read_page(path: Option<&PathBuf>) -> Result<String, String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("reading file '{}': {}", path.display(), e)),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("reading from stdin: {}", e))?;
            Ok(buffer)
        }
    }
}
