//! # relay-cli
//!
//! Terminal front end for the relay: a [`TerminalView`] that draws the
//! conversation as plain lines, plus the one-shot and interactive loops the
//! `relay` binary runs.

use parking_lot::Mutex;
use relay_client::{ChatClient, MessageId, MessageView, Role};
use std::collections::HashMap;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const TYPING: &str = "assistant is typing...";
const CLEAR_LINE: &str = "\r\x1b[2K";

fn label(role: Role) -> &'static str {
    match role {
        Role::User => "you> ",
        Role::Assistant => "assistant> ",
    }
}

struct Screen<W, E> {
    out: W,
    err: E,
    next_id: u64,
    typing: bool,
    /// Text currently printed for each open assistant line.
    shown: HashMap<MessageId, (Role, String)>,
}

impl<W: Write, E: Write> Screen<W, E> {
    fn emit(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(err) = result {
            tracing::debug!(error = %err, "terminal write failed");
        }
    }
}

/// A [`MessageView`] that prints to a terminal.
///
/// Assistant text is printed incrementally: each update only writes the
/// characters that were not on screen yet. Warnings go to the error sink.
pub struct TerminalView<W, E> {
    screen: Mutex<Screen<W, E>>,
    echo_user: bool,
}

impl TerminalView<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<W: Write, E: Write> TerminalView<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self {
            screen: Mutex::new(Screen {
                out,
                err,
                next_id: 0,
                typing: false,
                shown: HashMap::new(),
            }),
            echo_user: true,
        }
    }

    /// Whether user messages are printed. Interactive sessions already show
    /// what was typed.
    pub fn with_echo_user(mut self, echo: bool) -> Self {
        self.echo_user = echo;
        self
    }

    /// Consume the view and return its sinks.
    pub fn into_inner(self) -> (W, E) {
        let screen = self.screen.into_inner();
        (screen.out, screen.err)
    }
}

impl<W, E> MessageView for TerminalView<W, E>
where
    W: Write + Send,
    E: Write + Send,
{
    fn show_typing_indicator(&self) {
        let mut screen = self.screen.lock();
        screen.typing = true;
        screen.emit(TYPING);
    }

    fn remove_typing_indicator(&self) {
        let mut screen = self.screen.lock();
        if screen.typing {
            screen.typing = false;
            screen.emit(CLEAR_LINE);
        }
    }

    fn add_message(&self, role: Role, content: &str) -> MessageId {
        let mut screen = self.screen.lock();
        screen.next_id += 1;
        let id = MessageId::new(screen.next_id);
        match role {
            Role::User => {
                if self.echo_user {
                    screen.emit(&format!("{}{content}\n", label(role)));
                }
            }
            Role::Assistant => {
                screen.emit(&format!("{}{content}", label(role)));
                screen.shown.insert(id, (role, content.to_string()));
            }
        }
        id
    }

    fn update_message(&self, id: MessageId, content: &str) {
        let mut screen = self.screen.lock();
        let Some((role, shown)) = screen.shown.get(&id).cloned() else {
            return;
        };
        let text = match content.strip_prefix(shown.as_str()) {
            Some(suffix) => suffix.to_string(),
            // Earlier lines are out of reach of CLEAR_LINE.
            None if shown.contains('\n') => format!("\n{}{content}", label(role)),
            None => format!("{CLEAR_LINE}{}{content}", label(role)),
        };
        screen.emit(&text);
        screen.shown.insert(id, (role, content.to_string()));
    }

    fn finish_message(&self, id: MessageId) {
        let mut screen = self.screen.lock();
        if screen.shown.remove(&id).is_some() {
            screen.emit("\n");
        }
    }

    fn warn(&self, message: &str) {
        let mut screen = self.screen.lock();
        let result = writeln!(screen.err, "warning: {message}");
        if let Err(err) = result {
            tracing::debug!(error = %err, "terminal write failed");
        }
    }
}

/// Read messages line by line from `input` and send each one.
///
/// Stops at end of input or on `/quit`. Failed sends were already shown as a
/// warning by the view, so the loop just moves on.
pub async fn interactive<R, P>(client: &ChatClient, input: R, prompt: &mut P) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    P: Write,
{
    let mut lines = input.lines();
    loop {
        write!(prompt, "> ")?;
        prompt.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(prompt)?;
            return Ok(());
        };
        if line.trim() == "/quit" {
            return Ok(());
        }
        if let Err(err) = client.send(&line).await {
            tracing::debug!(error = %err, "message not delivered");
        }
    }
}
