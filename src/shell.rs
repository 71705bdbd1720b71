//! Line-oriented command shell over the Boxlite services.
//!
//! Each input line is one command; each result is printed as one line of
//! JSON, either `{"ok": ...}` or `{"error": {"kind": ..., "message": ...}}`.

use bytes::Bytes;
use clap::error::ErrorKind as ClapErrorKind;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use boxlite_core::error::AppError;
use boxlite_core::result::AppResult;
use boxlite_core::types::id::{FileId, FolderId, UserId};
use boxlite_entity::share::SharePermission;
use boxlite_entity::sync::VersionDescriptor;
use boxlite_service::ServiceContainer;

/// One shell line. The first word names the command.
#[derive(Debug, Parser)]
#[command(multicall = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

/// Shell commands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Upload text content
    Store {
        /// Owner user ID
        user: String,
        /// File name
        name: String,
        /// Content, words joined by single spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Print a file and its content
    Fetch {
        /// File ID
        file_id: String,
    },
    /// List files, newest first
    List {
        /// Owner user ID
        user: String,
        /// Folder ID (root when omitted)
        folder: Option<String>,
    },
    /// Move a file (no folder = root)
    Move {
        /// File ID
        file_id: String,
        /// Requesting user ID
        user: String,
        /// Destination folder ID
        folder: Option<String>,
    },
    /// Delete a file
    Delete {
        /// File ID
        file_id: String,
        /// Requesting user ID
        user: String,
    },
    /// Create a share link
    Share {
        /// Owner user ID
        user: String,
        /// File ID
        file_id: String,
        /// read, write or none
        permission: String,
        /// Days until expiry (configured default when omitted)
        #[arg(allow_negative_numbers = true)]
        ttl_days: Option<i64>,
    },
    /// Validate a share token
    Validate {
        /// Share token
        #[arg(allow_hyphen_values = true)]
        token: String,
    },
    /// Read a file through a share token
    Open {
        /// Share token
        #[arg(allow_hyphen_values = true)]
        token: String,
    },
    /// Revoke a share
    Revoke {
        /// Share token
        #[arg(allow_hyphen_values = true)]
        token: String,
        /// Requesting user ID
        user: String,
    },
    /// List active shares
    Shares {
        /// Owner user ID
        user: String,
    },
    /// Files changed after a timestamp
    Updated {
        /// User ID
        user: String,
        /// Unix epoch milliseconds
        #[arg(allow_negative_numbers = true)]
        since_ms: i64,
    },
    /// Check a client version against the stored file
    Resolve {
        /// File ID
        file_id: String,
        /// Version descriptor as JSON
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        descriptor: Vec<String>,
    },
    /// Reclaim orphaned content
    Gc,
    /// Exit the shell
    #[command(alias = "exit")]
    Quit,
}

/// What the loop should do after a command.
#[derive(Debug)]
pub enum Outcome {
    /// Print the value and read the next line.
    Reply(Value),
    /// Stop reading.
    Quit,
}

/// Parses and executes shell commands.
#[derive(Debug, Clone)]
pub struct Shell {
    services: ServiceContainer,
}

impl Shell {
    /// Creates a shell over the given services.
    pub fn new(services: ServiceContainer) -> Self {
        Self { services }
    }

    /// Reads commands from `input` until EOF or `quit`, writing one JSON
    /// line per command to `output`.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let reply = match self.execute(&line).await {
                Ok(Outcome::Reply(value)) => json!({ "ok": value }),
                Ok(Outcome::Quit) => break,
                Err(e) => {
                    debug!(error = %e, "Command failed");
                    json!({ "error": { "kind": e.kind.to_string(), "message": e.message } })
                }
            };
            output.write_all(reply.to_string().as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
        info!("Shell input closed");
        Ok(())
    }

    /// Executes a single command line.
    ///
    /// Malformed lines, including missing or surplus arguments, fail with
    /// `InvalidArgument` before any service is called. `help` and
    /// `<command> --help` reply with usage text.
    pub async fn execute(&self, line: &str) -> AppResult<Outcome> {
        let command = match ShellLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed.command,
            Err(e)
                if matches!(
                    e.kind(),
                    ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
                ) =>
            {
                let usage = e.to_string().trim_end().to_string();
                return Ok(Outcome::Reply(Value::String(usage)));
            }
            Err(e) => return Err(AppError::invalid_argument(e.to_string().trim_end())),
        };
        self.dispatch(command).await
    }

    async fn dispatch(&self, command: Command) -> AppResult<Outcome> {
        let services = &self.services;

        let value = match command {
            Command::Store { user, name, text } => {
                let record = services
                    .files
                    .store(&UserId::from(user), Bytes::from(text.join(" ")), &name, None)
                    .await?;
                serde_json::to_value(record)?
            }
            Command::Fetch { file_id } => {
                let (record, data) = services.files.fetch(&FileId::from(file_id)).await?;
                json!({
                    "file": record,
                    "content": String::from_utf8_lossy(&data),
                })
            }
            Command::List { user, folder } => {
                let folder = folder.map(FolderId::from);
                let files = services
                    .files
                    .list(&UserId::from(user), folder.as_ref())
                    .await?;
                serde_json::to_value(files)?
            }
            Command::Move {
                file_id,
                user,
                folder,
            } => {
                let record = services
                    .files
                    .move_file(
                        &FileId::from(file_id),
                        &UserId::from(user),
                        folder.map(FolderId::from),
                    )
                    .await?;
                serde_json::to_value(record)?
            }
            Command::Delete { file_id, user } => {
                let file_id = FileId::from(file_id);
                services.files.delete(&file_id, &UserId::from(user)).await?;
                json!({ "deleted": file_id })
            }
            Command::Share {
                user,
                file_id,
                permission,
                ttl_days,
            } => {
                let permission: SharePermission = permission.parse()?;
                let share = services.shares.create_link(
                    &UserId::from(user),
                    &FileId::from(file_id),
                    permission,
                    ttl_days,
                )?;
                serde_json::to_value(share)?
            }
            Command::Validate { token } => {
                serde_json::to_value(services.shares.validate(&token)?)?
            }
            Command::Open { token } => {
                let shared = services.access.open_shared(&token).await?;
                json!({
                    "share": shared.share,
                    "file": shared.file,
                    "content": String::from_utf8_lossy(&shared.data),
                })
            }
            Command::Revoke { token, user } => {
                services.shares.revoke(&token, &UserId::from(user))?;
                json!({ "revoked": true })
            }
            Command::Shares { user } => {
                serde_json::to_value(services.shares.list_active(&UserId::from(user)))?
            }
            Command::Updated { user, since_ms } => {
                let files = services
                    .sync
                    .get_updated_files(&UserId::from(user), since_ms)
                    .await?;
                serde_json::to_value(files)?
            }
            Command::Resolve {
                file_id,
                descriptor,
            } => {
                let remote: VersionDescriptor = serde_json::from_str(&descriptor.join(" "))?;
                let resolved = services.sync.check(&FileId::from(file_id), &remote).await?;
                serde_json::to_value(resolved)?
            }
            Command::Gc => json!({ "reclaimed": services.files.reclaim_orphans().await? }),
            Command::Quit => return Ok(Outcome::Quit),
        };

        Ok(Outcome::Reply(value))
    }
}
