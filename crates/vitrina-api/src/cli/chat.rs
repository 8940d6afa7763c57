//! `vitrina chat`: a terminal transport for the bot.
//!
//! Each input line becomes one [`InboundEvent`] from the chosen user.
//! Besides plain text and `/commands`:
//!
//! - `cat_sneakers` / `cat_clothing` press the category buttons
//! - `:foto <url>` and `:video <url>` send platform-hosted media
//! - `:archivo <path>` uploads a local file
//! - `:salir` (or EOF) quits

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use vitrina_core::media::VIDEO_EXTENSIONS;
use vitrina_core::session::spawn_idle_sweeper;
use vitrina_types::event::{EventPayload, InboundEvent, MediaAttachment, MediaSource, Sender};
use vitrina_types::product::MediaKind;

use crate::render::render;
use crate::state::{AppState, ConcreteBot};

/// One parsed console line.
#[derive(Debug, PartialEq)]
pub enum ConsoleLine {
    Empty,
    Quit,
    Event(EventPayload),
    /// A local file to upload.
    File(String),
}

pub fn parse_line(line: &str) -> ConsoleLine {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleLine::Empty;
    }

    if let Some(rest) = line.strip_prefix(':') {
        let (verb, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let arg = arg.trim();
        return match verb {
            "salir" | "q" | "quit" => ConsoleLine::Quit,
            "foto" if !arg.is_empty() => platform_media(MediaKind::Image, arg),
            "video" if !arg.is_empty() => platform_media(MediaKind::Video, arg),
            "archivo" if !arg.is_empty() => ConsoleLine::File(arg.to_string()),
            _ => ConsoleLine::Event(EventPayload::from_message(line)),
        };
    }

    if line.starts_with("cat_") && !line.contains(char::is_whitespace) {
        return ConsoleLine::Event(EventPayload::Callback {
            data: line.to_string(),
        });
    }

    ConsoleLine::Event(EventPayload::from_message(line))
}

fn platform_media(kind: MediaKind, url: &str) -> ConsoleLine {
    ConsoleLine::Event(EventPayload::Media {
        attachment: MediaAttachment {
            kind,
            source: MediaSource::PlatformUrl(url.to_string()),
        },
    })
}

async fn file_payload(path: &str) -> Result<EventPayload> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("could not read {path}"))?;
    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    let kind = if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        MediaKind::Video
    } else {
        MediaKind::Image
    };
    Ok(EventPayload::Media {
        attachment: MediaAttachment {
            kind,
            source: MediaSource::Bytes { data, file_name },
        },
    })
}

/// Run the interactive console until `:salir` or EOF.
pub async fn chat(state: &AppState, user: Option<i64>, name: Option<String>, json: bool) -> Result<()> {
    let user = user
        .or_else(|| state.config.admin_ids.first().copied())
        .context("no admin ids configured; pass --user")?;
    let sender = Sender {
        id: user,
        display_name: name.or_else(|| std::env::var("USER").ok()),
    };

    let products = state.store.hydrate().await;
    if !json {
        println!();
        println!(
            "  {} Vitrina console as user {} ({} products). {} to quit.",
            style("💬").bold(),
            style(user).cyan(),
            products.len(),
            style(":salir").dim()
        );
        println!();
    }

    let cancel = CancellationToken::new();
    let sweeper = spawn_idle_sweeper(state.sessions.clone(), cancel.clone());

    let stdin = BufReader::new(tokio::io::stdin());
    let result = run_console(&state.bot, &sender, stdin, &mut std::io::stdout(), json).await;

    cancel.cancel();
    let _ = sweeper.await;
    result
}

/// Feed every line of `input` to the bot and write rendered replies to `out`.
pub async fn run_console<R, W>(
    bot: &Arc<ConcreteBot>,
    sender: &Sender,
    input: R,
    out: &mut W,
    json: bool,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let chat_id = sender.id;
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let payload = match parse_line(&line) {
            ConsoleLine::Empty => continue,
            ConsoleLine::Quit => break,
            ConsoleLine::Event(payload) => payload,
            ConsoleLine::File(path) => match file_payload(&path).await {
                Ok(payload) => payload,
                Err(e) => {
                    writeln!(out, "{} {e:#}", style("✗").red())?;
                    continue;
                }
            },
        };

        let replies = bot
            .handle(InboundEvent::new(sender.clone(), chat_id, payload))
            .await;
        for reply in &replies {
            if json {
                writeln!(out, "{}", serde_json::to_string(reply)?)?;
            } else {
                writeln!(out, "{} {}\n", style("bot ›").green().bold(), render(reply))?;
            }
        }
        out.flush()?;
    }
    Ok(())
}
