use anyhow::{Context, Result as AnyhowResult};
use clap::{Parser, Subcommand};
use lsif_fs::config::Config;
use lsif_fs::fs::{FileKind, FileSystemProvider, LsifFileSystem};
use lsif_fs::services::rpc::uri;
use lsif_fs::services::tracing_setup;
use std::io::Write;
use std::path::PathBuf;
use url::Url;

/// Browse a remote LSIF content index as a read-only filesystem
#[derive(Parser, Debug)]
#[command(name = "lsif-fs")]
#[command(about = "Browse a remote LSIF content index as a read-only filesystem", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Index server address, overrides the config file
    #[arg(long, value_name = "HOST:PORT")]
    address: Option<String>,

    /// Skip the LSP initialize handshake
    #[arg(long)]
    no_handshake: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print metadata for an entry
    Stat { uri: String },
    /// List a directory in server order
    Ls { uri: String },
    /// Write a file's content to stdout
    Cat { uri: String },
    /// Recursively list a directory
    Tree {
        uri: String,
        /// Maximum depth to descend (unlimited by default)
        #[arg(long)]
        depth: Option<usize>,
    },
}

/// Accept either a full URI or `authority/path`, which is placed in `scheme`.
fn parse_uri(arg: &str, scheme: &str) -> AnyhowResult<Url> {
    let text = if arg.contains("://") {
        arg.to_string()
    } else {
        format!("{scheme}://{}", arg.trim_start_matches('/'))
    };
    Url::parse(&text).with_context(|| format!("Invalid URI '{arg}'"))
}

fn load_config(args: &Args) -> AnyhowResult<Config> {
    let mut config =
        Config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(address) = &args.address {
        config.server.address = address.clone();
    }
    if args.no_handshake {
        config.server.handshake = false;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn print_tree(
    fs: &LsifFileSystem,
    root: &Url,
    max_depth: Option<usize>,
    out: &mut impl Write,
) -> AnyhowResult<()> {
    writeln!(out, "{root}")?;

    // Depth-first, keeping the server's order among siblings
    let mut stack = vec![(root.clone(), 0usize)];
    while let Some((dir, depth)) = stack.pop() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }
        let entries = fs
            .read_directory(&dir)
            .await
            .with_context(|| format!("Failed to list {dir}"))?;

        let mut subdirs = Vec::new();
        for entry in &entries {
            writeln!(out, "{}{}", "  ".repeat(depth + 1), entry.name)?;
            if entry.kind == FileKind::Directory {
                subdirs.push((uri::child(&dir, &entry.name)?, depth + 1));
            }
        }
        stack.extend(subdirs.into_iter().rev());
    }
    Ok(())
}

async fn run(args: Args, config: Config) -> AnyhowResult<()> {
    let fs = LsifFileSystem::from_config(&config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &args.command {
        Command::Stat { uri } => {
            let uri = parse_uri(uri, &config.scheme)?;
            let stat = fs.stat(&uri).await?;
            writeln!(out, "kind:     {}", stat.kind)?;
            writeln!(out, "size:     {}", stat.size)?;
            writeln!(out, "created:  {}", stat.created_at)?;
            writeln!(out, "modified: {}", stat.modified_at)?;
        }
        Command::Ls { uri } => {
            let uri = parse_uri(uri, &config.scheme)?;
            for entry in fs.read_directory(&uri).await? {
                writeln!(out, "{}\t{}", entry.kind, entry.name)?;
            }
        }
        Command::Cat { uri } => {
            let uri = parse_uri(uri, &config.scheme)?;
            let content = fs.read_file(&uri).await?;
            out.write_all(&content)?;
        }
        Command::Tree { uri, depth } => {
            let uri = parse_uri(uri, &config.scheme)?;
            print_tree(&fs, &uri, *depth, &mut out).await?;
        }
    }

    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> AnyhowResult<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    tracing_setup::init_global(args.log_file.as_deref(), &config.log_level)
        .context("Failed to initialize logging")?;
    tracing::debug!("Using index server at {}", config.server.address);

    run(args, config).await
}
