//! sharefile CLI - Browse and transfer files in a ShareFile account.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use sharefile::item_id::extract_item_id;
use sharefile::{Credentials, Item, ShareFileClient};

/// CLI tool for interacting with ShareFile.
#[derive(Parser)]
#[command(name = "sharefile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    auth: AuthArgs,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AuthArgs {
    /// Path to a JSON credentials file (subdomain, clientId, clientSecret, username, password).
    #[arg(long, env = "SHAREFILE_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Account subdomain, e.g. "acme" for acme.sharefile.com.
    #[arg(long, env = "SHAREFILE_SUBDOMAIN")]
    subdomain: Option<String>,

    #[arg(long, env = "SHAREFILE_CLIENT_ID")]
    client_id: Option<String>,

    #[arg(long, env = "SHAREFILE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    #[arg(long, env = "SHAREFILE_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "SHAREFILE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl AuthArgs {
    fn into_credentials(self) -> Result<Credentials> {
        if let Some(path) = self.credentials {
            return Credentials::from_file(&path)
                .with_context(|| format!("Failed to load credentials from {:?}", path));
        }

        let credentials = Credentials::new(
            self.subdomain.unwrap_or_default(),
            self.client_id.unwrap_or_default(),
            self.client_secret.unwrap_or_default(),
            self.username.unwrap_or_default(),
            self.password.unwrap_or_default(),
        );
        credentials.validate()?;
        Ok(credentials)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show an item by path or id.
    Get {
        /// Item path (e.g. /Folder/file.txt) or id.
        item: String,
    },

    /// List the children of a folder.
    Ls {
        /// Folder path or id.
        folder: String,

        /// Include deleted items.
        #[arg(long)]
        deleted: bool,
    },

    /// Download a file to the local filesystem.
    Download {
        /// File path or id.
        file: String,

        /// Local destination path (file or directory).
        #[arg(long, short = 't', default_value = ".")]
        to: PathBuf,
    },

    /// Print the two-phase download descriptor of a file.
    DownloadSpec {
        /// File path or id.
        file: String,
    },

    /// Upload files to a folder.
    Upload {
        /// File patterns to upload (supports glob patterns like *.pdf, file_{1,2,3}.txt).
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Destination folder path or id.
        #[arg(long, short = 't')]
        to: String,
    },

    /// Rename an item.
    Rename {
        /// Item path or id.
        item: String,

        /// New name.
        name: String,
    },

    /// Move an item to another folder.
    Move {
        /// Item path or id.
        item: String,

        /// Destination folder id or API item URL.
        folder: String,
    },

    /// List folder templates, or show one by id.
    Templates {
        id: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "sharefile=debug" } else { "sharefile=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let credentials = cli.auth.into_credentials()?;
    let client = ShareFileClient::new(credentials).context("Failed to create ShareFile client")?;

    match cli.command {
        Commands::Get { item } => {
            let item = fetch(&client, &item).await?;
            println!("{}", serde_json::to_string_pretty(item.model())?);
        }

        Commands::Ls { folder, deleted } => {
            let folder = fetch(&client, &folder).await?;
            let children = folder
                .children(deleted)
                .await
                .with_context(|| format!("Failed to list children of {}", folder.url()))?;

            if children.is_empty() {
                println!("No items found.");
            } else {
                println!("{:<44} {:>10} {:<8} {}", "ID", "SIZE", "TYPE", "NAME");
                println!("{}", "-".repeat(100));
                for child in children {
                    println!("{}", child);
                }
            }
        }

        Commands::Download { file, to } => {
            let item = fetch(&client, &file).await?;
            prepare_destination(&to)?;

            print!("Downloading {}... ", item.name().unwrap_or(&file));

            let (path, bytes) = item
                .download_to(&to, false, false)
                .await
                .with_context(|| format!("Failed to download: {}", file))?;

            println!("OK ({})", sharefile::models::format_size(bytes));
            println!("Saved to: {:?}", path);
        }

        Commands::DownloadSpec { file } => {
            let item = fetch(&client, &file).await?;
            let descriptor = item
                .download_specification(false, false)
                .await
                .with_context(|| format!("Failed to prepare download: {}", file))?;

            println!("Token: {}", descriptor.token);
            println!("URL:   {}", descriptor.url);
            if let Some(status) = descriptor.prep_status_url {
                println!("Prep:  {}", status);
            }
        }

        Commands::Upload { patterns, to } => {
            let folder = fetch(&client, &to).await?;
            let local_files = collect_files(&patterns)?;
            let total = local_files.len();

            println!(
                "Uploading {} file(s) to {}...",
                total,
                folder.name().unwrap_or(&to)
            );

            let mut failed = 0usize;
            for (n, local) in local_files.iter().enumerate() {
                let name = local
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                print!("[{}/{}] {} ... ", n + 1, total, name);

                let contents = tokio::fs::read(local)
                    .await
                    .with_context(|| format!("Failed to read {:?}", local))?;

                match folder.upload(contents, &name).await {
                    Ok(result) => println!("OK ({})", result.id.as_deref().unwrap_or("-")),
                    Err(err) => {
                        failed += 1;
                        println!("FAILED");
                        eprintln!("  {}", err);
                    }
                }
            }

            if failed > 0 {
                anyhow::bail!("{} of {} upload(s) failed", failed, total);
            }
            println!("Done.");
        }

        Commands::Rename { item, name } => {
            let mut item = fetch(&client, &item).await?;
            item.rename_to(&name)
                .await
                .with_context(|| format!("Failed to rename to {}", name))?;
            println!("{}", item);
        }

        Commands::Move { item, folder } => {
            let folder_id = if folder.starts_with("http") {
                extract_item_id(&folder)?
            } else {
                folder
            };
            let mut item = fetch(&client, &item).await?;
            item.move_to(&folder_id)
                .await
                .with_context(|| format!("Failed to move to {}", folder_id))?;
            println!("{}", item);
        }

        Commands::Templates { id } => match id {
            Some(id) => {
                let template = client
                    .get_folder_template(&id)
                    .await
                    .with_context(|| format!("Failed to fetch folder template {}", id))?;
                println!("{}", serde_json::to_string_pretty(&template)?);
            }
            None => {
                let templates = client
                    .list_folder_templates()
                    .await
                    .context("Failed to list folder templates")?;
                for template in templates {
                    println!(
                        "{}\t{}",
                        template.id.as_deref().unwrap_or("-"),
                        template.name.as_deref().unwrap_or("-")
                    );
                }
            }
        },
    }

    Ok(())
}

async fn fetch(client: &ShareFileClient, identifier: &str) -> Result<Item> {
    client
        .items(identifier)
        .await
        .with_context(|| format!("Failed to fetch item: {}", identifier))
}

/// Create the directory a download will land in. A path ending in `/` or
/// naming an existing directory is a directory; otherwise its parent is.
fn prepare_destination(to: &Path) -> Result<()> {
    let dir = if to.is_dir() || to.to_string_lossy().ends_with('/') {
        Some(to)
    } else {
        to.parent().filter(|p| !p.as_os_str().is_empty())
    };

    if let Some(dir) = dir {
        std::fs::create_dir_all(dir).with_context(|| format!("Cannot create {:?}", dir))?;
    }
    Ok(())
}

/// Resolve upload arguments to a sorted, de-duplicated list of local files.
///
/// Each argument is brace-expanded, then globbed. An expansion with no glob
/// match is kept only if it names an existing file.
fn collect_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for candidate in patterns.iter().flat_map(|p| expand_braces(p)) {
        let matches: Vec<PathBuf> = glob(&candidate)
            .with_context(|| format!("Invalid glob pattern: {}", candidate))?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();

        if !matches.is_empty() {
            files.extend(matches);
        } else {
            let literal = PathBuf::from(&candidate);
            if literal.is_file() {
                files.insert(literal);
            } else {
                warn!(pattern = %candidate, "No files matched pattern");
            }
        }
    }

    if files.is_empty() {
        anyhow::bail!("No files to upload");
    }
    Ok(files.into_iter().collect())
}

/// `a_{1,2}.txt` becomes `a_1.txt` and `a_2.txt`. Groups expand left to
/// right; an unclosed `{` is left as is.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some((head, rest)) = pattern.split_once('{') else {
        return vec![pattern.to_string()];
    };
    let Some((group, tail)) = rest.split_once('}') else {
        return vec![pattern.to_string()];
    };

    group
        .split(',')
        .flat_map(|choice| expand_braces(&format!("{}{}{}", head, choice.trim(), tail)))
        .collect()
}
