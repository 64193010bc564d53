//! Line-oriented terminal front end.
//!
//! Renders each published [`Snapshot`] and turns typed commands into
//! controller intents. Fetches run on spawned tasks so the prompt stays
//! responsive while a request is pending.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::models::{CatImage, Decision};
use crate::reveal::{RevealController, Snapshot};

pub const CONTINUE_TEXT: &str = "Tap anywhere for more!";
pub const FEEDBACK_PROMPT: &str = "Enjoyed? Do you like this one? [y/n]";

/// A typed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ShowImage,
    Advance,
    Refresh,
    Reset,
    Quit,
    Help,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "i" | "image" | "what?" => Some(Self::ShowImage),
            "" | "next" => Some(Self::Advance),
            "r" | "refresh" => Some(Self::Refresh),
            "reset" => Some(Self::Reset),
            "q" | "quit" | "exit" => Some(Self::Quit),
            "h" | "help" | "?" => Some(Self::Help),
            _ => None,
        }
    }
}

const HELP: &str = "commands: i = show image, <enter> = next, r = refresh, reset = zero tally, q = quit";

/// Render one frame.
pub fn render(snapshot: &Snapshot, saved_image: Option<&Path>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>40}\n\n", snapshot.tally.to_string()));
    out.push_str(&snapshot.text);
    out.push('\n');

    if let Some(notice) = &snapshot.notice {
        out.push_str(&format!("! {}\n", notice));
    }

    if let Some(image) = &snapshot.image {
        out.push_str(&format!("[{} image, {} bytes", image.format(), image.len()));
        if let Some(path) = saved_image {
            out.push_str(&format!(", saved to {}", path.display()));
        }
        out.push_str("]\n");
    }

    out.push('\n');
    if snapshot.can_advance {
        out.push_str(CONTINUE_TEXT);
    } else if snapshot.can_request_image {
        out.push_str("[i] What?   [r] another fact");
    } else if snapshot.state.is_busy() {
        out.push_str("…");
    } else {
        out.push_str("[r] try again");
    }
    out.push('\n');
    out
}

/// Where the current image is written when an image directory is configured.
pub fn image_path(dir: &Path, image: &CatImage) -> PathBuf {
    dir.join(format!("current.{}", image.format().extension()))
}

/// Write one block of text to the shared output.
fn emit<W: Write>(output: &Mutex<W>, text: &str) -> std::io::Result<()> {
    let mut output = output.lock().unwrap_or_else(|e| e.into_inner());
    writeln!(output, "{}", text)?;
    output.flush()
}

/// Run the interactive loop until the user quits or `input` closes.
///
/// Every published snapshot is rendered to `output` from a background task;
/// command echoes and prompts go to the same writer.
pub async fn run<R, W>(
    controller: Arc<RevealController>,
    input: R,
    output: W,
    image_dir: Option<PathBuf>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send + 'static,
{
    let output = Arc::new(Mutex::new(output));
    let mut updates = controller.subscribe();
    let renderer = {
        let output = output.clone();
        tokio::spawn(async move {
            let mut last_image: Option<Arc<CatImage>> = None;
            let mut saved: Option<PathBuf> = None;
            loop {
                let snapshot = updates.borrow_and_update().clone();

                match (&snapshot.image, &image_dir) {
                    (Some(image), Some(dir)) => {
                        let unchanged = last_image
                            .as_ref()
                            .map(|last| Arc::ptr_eq(last, image))
                            .unwrap_or(false);
                        if !unchanged {
                            saved = save_image(dir, image).await;
                            last_image = Some(image.clone());
                        }
                    }
                    _ => {
                        last_image = None;
                        saved = None;
                    }
                }

                if let Err(e) = emit(&output, &render(&snapshot, saved.as_deref())) {
                    tracing::warn!("Failed to render snapshot: {}", e);
                }

                if updates.changed().await.is_err() {
                    break;
                }
            }
        })
    };

    controller.spawn_refresh();

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let Some(command) = Command::parse(&line) else {
            emit(&output, HELP)?;
            continue;
        };

        match command {
            Command::Quit => break,
            Command::Help => emit(&output, HELP)?,
            Command::Refresh => {
                controller.spawn_refresh();
            }
            Command::Reset => {
                controller.reset_tally();
            }
            Command::ShowImage => {
                if controller.snapshot().can_request_image {
                    let controller = controller.clone();
                    tokio::spawn(async move {
                        controller.reveal_image().await;
                    });
                }
            }
            Command::Advance => {
                if !controller.snapshot().can_advance {
                    continue;
                }
                emit(&output, FEEDBACK_PROMPT)?;
                let decision = loop {
                    match lines.next_line().await.context("Failed to read input")? {
                        Some(answer) => match Decision::from_str(&answer) {
                            Some(decision) => break Some(decision),
                            None => emit(&output, FEEDBACK_PROMPT)?,
                        },
                        None => break None,
                    }
                };
                let Some(decision) = decision else { break };
                let controller = controller.clone();
                tokio::spawn(async move {
                    controller.advance(decision).await;
                });
            }
        }
    }

    renderer.abort();
    Ok(())
}

async fn save_image(dir: &Path, image: &CatImage) -> Option<PathBuf> {
    let path = image_path(dir, image);
    let result = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, image.bytes()).await
    }
    .await;
    match result {
        Ok(()) => Some(path),
        Err(e) => {
            tracing::warn!("Failed to save image to {}: {}", path.display(), e);
            None
        }
    }
}
