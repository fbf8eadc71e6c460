//! Command-line front end for editing stored family trees

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use famtree::{
    Confirm, EditorConfig, FamilyConsole, Field, FsBlobStore, FsDocumentStore,
    MemoryPreviewHost, NodePath, StaticAuth, TreeSession,
};

#[derive(Parser, Debug)]
#[command(name = "famtree", version, about = "Edit family trees stored as documents")]
struct Cli {
    /// Directory holding documents and photos
    #[arg(long, env = "FAMTREE_STORE", default_value = "famtree-data")]
    store: PathBuf,

    /// JSON editor configuration
    #[arg(long, env = "FAMTREE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a tree, one person per line
    Show {
        /// Root id of the tree
        tree: String,
    },
    /// Print the family size
    Count {
        /// Root id of the tree
        tree: String,
    },
    /// Normalize a JSON record and store it under its root id
    Import {
        /// File holding the raw record
        file: PathBuf,
    },
    /// Print the canonical stored document
    Export {
        /// Root id of the tree
        tree: String,
    },
    /// Set one field of a person; omit the value to clear it
    Set {
        /// Root id of the tree
        tree: String,
        /// Node path, e.g. `/0/s`
        path: NodePath,
        /// name, image, address, phone, occupation or status
        field: Field,
        /// New value
        value: Option<String>,
    },
    /// Give a person a spouse
    AddSpouse {
        /// Root id of the tree
        tree: String,
        /// Node path of the holder
        path: NodePath,
        /// Spouse name
        name: String,
    },
    /// Append a child to a person
    AddChild {
        /// Root id of the tree
        tree: String,
        /// Node path of the parent
        path: NodePath,
        /// Child name
        name: String,
    },
    /// Delete a person and everyone they hold
    Delete {
        /// Root id of the tree
        tree: String,
        /// Node path of the person
        path: NodePath,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Upload a photo for a person
    AttachImage {
        /// Root id of the tree
        tree: String,
        /// Node path of the person
        path: NodePath,
        /// Image file
        file: PathBuf,
    },
    /// Clear a person's photo
    RemoveImage {
        /// Root id of the tree
        tree: String,
        /// Node path of the person
        path: NodePath,
    },
}

struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("famtree=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let console = build_console(&cli).await?;
    run(&console, cli.command).await
}

async fn build_console(cli: &Cli) -> anyhow::Result<FamilyConsole> {
    let config = match &cli.config {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading config {}", path.display()))?;
            EditorConfig::from_json_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EditorConfig::default(),
    };

    let user = std::env::var("USER").unwrap_or_else(|_| "local".to_string());
    let console = FamilyConsole::new(
        config,
        Arc::new(StaticAuth::signed_in(user)),
        Arc::new(FsDocumentStore::new(cli.store.join("documents"))),
        Arc::new(FsBlobStore::new(cli.store.join("blobs"))),
        Arc::new(MemoryPreviewHost::new()),
    )?;
    Ok(console)
}

async fn open(console: &FamilyConsole, tree: &str) -> anyhow::Result<TreeSession> {
    match console.open(tree).await.ready() {
        Some(session) => Ok(session),
        None => bail!("tree `{}` is not available (see log for details)", tree),
    }
}

async fn run(console: &FamilyConsole, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Show { tree } => {
            let session = open(console, &tree).await?;
            for entry in session.walk() {
                let marker = if entry.is_spouse { "⚭ " } else { "" };
                let deceased = if entry.deceased { " †" } else { "" };
                println!(
                    "{}{}{} [{}] {}{}",
                    "  ".repeat(entry.depth),
                    marker,
                    entry.name,
                    entry.id,
                    entry.path,
                    deceased
                );
            }
        }
        Command::Count { tree } => {
            let size = console
                .family_size(&tree)
                .await
                .with_context(|| format!("tree `{}` is not available", tree))?;
            println!("{}", size);
        }
        Command::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let raw: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", file.display()))?;
            let session = console.import(&raw).await?;
            println!(
                "imported tree `{}` with {} members",
                session.root().id,
                session.member_count()
            );
        }
        Command::Export { tree } => {
            let session = open(console, &tree).await?;
            println!("{}", serde_json::to_string_pretty(&session.to_document()?)?);
        }
        Command::Set {
            tree,
            path,
            field,
            value,
        } => {
            let mut session = open(console, &tree).await?;
            session.editor_at(&path)?.edit(field, value.as_deref());
            console.save(&session).await?;
        }
        Command::AddSpouse { tree, path, name } => {
            let mut session = open(console, &tree).await?;
            let mut editor = session.editor_at(&path)?;
            if editor.person().spouse.is_some() {
                bail!("{} already has a spouse", path);
            }
            match editor.add_spouse(&name) {
                Some(id) => {
                    console.save(&session).await?;
                    println!("{}", id);
                }
                None => bail!("a spouse needs a name"),
            }
        }
        Command::AddChild { tree, path, name } => {
            let mut session = open(console, &tree).await?;
            match session.editor_at(&path)?.add_child(&name) {
                Some(id) => {
                    console.save(&session).await?;
                    println!("{}", id);
                }
                None => bail!("a child needs a name"),
            }
        }
        Command::Delete { tree, path, yes } => {
            let mut session = open(console, &tree).await?;
            let deleted = if yes {
                session.delete(&path, &|_: &str| true)?
            } else {
                session.delete(&path, &StdinConfirm)?
            };
            if deleted {
                console.save(&session).await?;
            }
        }
        Command::AttachImage { tree, path, file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let mut session = open(console, &tree).await?;
            let reference = session
                .editor_at(&path)?
                .attach_image(bytes, console.blobs())
                .await?;
            console.save(&session).await?;
            println!("{}", reference);
        }
        Command::RemoveImage { tree, path } => {
            let mut session = open(console, &tree).await?;
            session.editor_at(&path)?.remove_image();
            console.save(&session).await?;
        }
    }
    Ok(())
}
