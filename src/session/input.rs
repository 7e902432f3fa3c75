use std::path::PathBuf;

use anyhow::Result;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::app::{
    commands::Action,
    keyboard::{Focus, Key, KeyEvent, Modifiers},
};

/// Something the user did in an interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Key(KeyEvent),
    /// Text typed into the note field, appended to the draft.
    Type(String),
    Action(Action),
    Export(Option<PathBuf>),
    Import(PathBuf),
    Config(PathBuf),
    Help,
    Unknown(String),
    Quit,
}

pub const HELP: &str = "\
Type a note and press Enter to save it. End a line with \\ to continue on the next one.
  /<digit>          select category by hotkey
  /space            pause or resume the timer
  /pause, /resume   pause or resume the timer
  /expand           toggle expanded input
  /more             show all notes or only the latest
  /edit <id> <text> replace the text of a note
  /delete <id>      delete a note
  /undo             restore the last deleted note
  /export [path]    export notes as JSON
  /import <path>    import notes from a JSON export
  /config <path>    apply categories from a JSON file
  /quit             leave the session";

/// Turns one line of input into what the user meant. A plain line is typed into the note field and
/// followed by Enter. Lines starting with `/` are pressed with focus outside the note field.
pub fn parse_line(line: &str) -> Vec<SessionInput> {
    let Some(command) = line.strip_prefix('/') else {
        if let Some(continued) = line.strip_suffix('\\') {
            return vec![
                SessionInput::Type(continued.to_string()),
                SessionInput::Key(
                    KeyEvent::new(Key::Enter, Focus::TextField).with_modifiers(Modifiers {
                        shift: true,
                        ..Modifiers::NONE
                    }),
                ),
                SessionInput::Type("\n".into()),
            ];
        }
        return vec![
            SessionInput::Type(line.to_string()),
            SessionInput::Key(KeyEvent::new(Key::Enter, Focus::TextField)),
        ];
    };

    let (name, rest) = command
        .trim()
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((command.trim(), ""));

    let input = match name {
        digit if digit.len() == 1 && digit.chars().all(|v| v.is_ascii_digit()) => {
            let digit = digit.as_bytes()[0] - b'0';
            SessionInput::Key(KeyEvent::new(Key::Digit(digit), Focus::Elsewhere))
        }
        "space" => SessionInput::Key(KeyEvent::new(Key::Space, Focus::Elsewhere)),
        "expand" => SessionInput::Key(
            KeyEvent::new(Key::Enter, Focus::TextField).with_modifiers(Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            }),
        ),
        "pause" => SessionInput::Action(Action::Pause),
        "resume" => SessionInput::Action(Action::Resume),
        "undo" => SessionInput::Action(Action::UndoDelete),
        "more" => SessionInput::Action(Action::ToggleShowAll),
        "delete" if !rest.is_empty() => SessionInput::Action(Action::DeleteNote {
            id: rest.to_string(),
        }),
        "edit" => match rest.split_once(char::is_whitespace) {
            Some((id, text)) => SessionInput::Action(Action::UpdateNote {
                id: id.to_string(),
                text: text.to_string(),
            }),
            None => SessionInput::Unknown(line.to_string()),
        },
        "export" if rest.is_empty() => SessionInput::Export(None),
        "export" => SessionInput::Export(Some(rest.into())),
        "import" if !rest.is_empty() => SessionInput::Import(rest.into()),
        "config" if !rest.is_empty() => SessionInput::Config(rest.into()),
        "help" => SessionInput::Help,
        "quit" | "q" => SessionInput::Quit,
        _ => SessionInput::Unknown(line.to_string()),
    };
    vec![input]
}

/// Reads lines and forwards parsed input to the session controller.
pub struct InputReader {
    next: mpsc::Sender<SessionInput>,
    shutdown: CancellationToken,
}

impl InputReader {
    pub fn new(next: mpsc::Sender<SessionInput>, shutdown: CancellationToken) -> Self {
        Self { next, shutdown }
    }

    /// Executes the reader loop. Ends when input is exhausted or the session shuts down; dropping
    /// the sender then stops the controller as well.
    pub async fn run(self, lines: impl Stream<Item = std::io::Result<String>>) -> Result<()> {
        let mut lines = std::pin::pin!(lines);
        loop {
            let line = tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                line = lines.next() => line,
            };
            let line = match line {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    error!("Failed to read input {e:?}");
                    return Err(e.into());
                }
                None => {
                    info!("Input closed");
                    return Ok(());
                }
            };

            for input in parse_line(&line) {
                debug!("Sending input {:?}", input);
                if self.next.send(input).await.is_err() {
                    // Controller is gone, nothing left to feed.
                    return Ok(());
                }
            }
        }
    }
}
