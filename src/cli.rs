use crate::config::{LayoutConfig, load_config};
use crate::error::read_to_string;
use crate::ir::{CardVariant, Contact, Diagram};
use crate::layout_dump::{LayoutDump, write_json};
use crate::ops::{auto_cluster, reflow, resize};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "orgflow", version, about = "Org-chart layout and relationship tool")]
pub struct Args {
    /// Diagram JSON file or '-' for stdin. A new diagram is created if omitted.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Contacts JSON array
    #[arg(long = "contacts")]
    pub contacts: Option<PathBuf>,

    /// Layout config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Operation to apply
    #[arg(long = "op", value_enum, default_value = "reflow")]
    pub op: Operation,

    /// Card variant for `resize`
    #[arg(long = "variant", value_parser = parse_variant)]
    pub variant: Option<CardVariant>,

    /// Name for a newly created diagram
    #[arg(long = "name", default_value = "Untitled")]
    pub name: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Reflow,
    AutoCluster,
    Resize,
    Dump,
}

fn parse_variant(token: &str) -> std::result::Result<CardVariant, String> {
    CardVariant::from_token(token).ok_or_else(|| format!("unknown card variant `{token}`"))
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();
    let config = load_config(args.config.as_deref())?;
    let contacts = match args.contacts.as_deref() {
        Some(path) => read_contacts(path)?,
        None => Vec::new(),
    };
    let diagram = match args.input.as_deref() {
        Some(path) => parse_diagram(&read_input(path)?)?,
        None => Diagram::new(&args.name, Utc::now(), &config),
    };
    tracing::info!(op = ?args.op, nodes = diagram.nodes.len(), "running");

    let output = args.output.as_deref();
    match apply(&args, &diagram, &contacts, &config)? {
        Outcome::Diagram(next) => write_json(&next, output)?,
        Outcome::Dump(dump) => write_json(&dump, output)?,
    }
    Ok(())
}

enum Outcome {
    Diagram(Diagram),
    Dump(LayoutDump),
}

fn apply(
    args: &Args,
    diagram: &Diagram,
    contacts: &[Contact],
    config: &LayoutConfig,
) -> Result<Outcome> {
    let now = Utc::now();
    let outcome = match args.op {
        Operation::Reflow => Outcome::Diagram(reflow(diagram, contacts, config).touched(now)),
        Operation::AutoCluster => {
            if args.contacts.is_none() {
                return Err(anyhow::anyhow!("auto-cluster requires --contacts"));
            }
            Outcome::Diagram(auto_cluster(diagram, contacts, config).touched(now))
        }
        Operation::Resize => {
            let variant = args
                .variant
                .ok_or_else(|| anyhow::anyhow!("resize requires --variant"))?;
            Outcome::Diagram(resize(diagram, variant, contacts, config).touched(now))
        }
        Operation::Dump => Outcome::Dump(LayoutDump::from_diagram(diagram, contacts, config)),
    };
    Ok(outcome)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(read_to_string(path)?)
}

fn parse_diagram(contents: &str) -> Result<Diagram> {
    serde_json::from_str(contents).context("invalid diagram JSON")
}

fn read_contacts(path: &Path) -> Result<Vec<Contact>> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid contacts JSON in {}", path.display()))
}
