//! Line-oriented terminal driver for a calculator [`Session`].
//!
//! Each input line is one action. Plain text is typed into the buffer at the
//! cursor; `=` commits; lines starting with `:` are commands.

use crate::calculator::{ERROR_DISPLAY, Session, Slot, copy_to_clipboard, keypad};
use crate::error::SessionError;
use std::io::{self, BufRead, Write};

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Insert(String),
    Commit,
    Left,
    Right,
    Backspace,
    Clear,
    InsertAnswer,
    Key(String),
    Save(String),
    Use(String),
    ResetAll,
    ShowHistory,
    Recall(usize),
    ShowMemory,
    Copy,
    Help,
    Quit,
    Unknown(String),
}

/// Parse one input line.
pub fn parse_action(line: &str) -> Action {
    let trimmed = line.trim();

    if trimmed == "=" {
        return Action::Commit;
    }
    let Some(command) = trimmed.strip_prefix(':') else {
        return Action::Insert(trimmed.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match (name, arg) {
        ("left" | "h", "") => Action::Left,
        ("right" | "l", "") => Action::Right,
        ("bs" | "backspace", "") => Action::Backspace,
        ("clear" | "ac", "") => Action::Clear,
        ("ans", "") => Action::InsertAnswer,
        ("key" | "k", key) if !key.is_empty() => Action::Key(key.to_string()),
        ("save" | "s", slot) if !slot.is_empty() => Action::Save(slot.to_string()),
        ("use" | "u", slot) if !slot.is_empty() => Action::Use(slot.to_string()),
        ("reset", "") => Action::ResetAll,
        ("history", "") => Action::ShowHistory,
        ("recall" | "r", n) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Action::Recall(n),
            _ => Action::Unknown(trimmed.to_string()),
        },
        ("memory" | "mem", "") => Action::ShowMemory,
        ("copy", "") => Action::Copy,
        ("help" | "?", "") => Action::Help,
        ("quit" | "q", "") => Action::Quit,
        _ => Action::Unknown(trimmed.to_string()),
    }
}

/// Whether the loop keeps going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Terminal front end over a session.
pub struct Repl<'a> {
    session: &'a mut Session,
    cursor_marker: String,
}

impl<'a> Repl<'a> {
    pub fn new(session: &'a mut Session, cursor_marker: impl Into<String>) -> Self {
        Self {
            session,
            cursor_marker: cursor_marker.into(),
        }
    }

    /// Read actions until end of input or `:quit`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "Type an expression, `=` to commit, `:help` for commands.")?;
        self.session.apply_pending_seed();
        self.render(out)?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let flow = self.apply(parse_action(&line), out)?;
            if flow == Flow::Quit {
                break;
            }

            self.session.apply_pending_seed();
            self.render(out)?;
        }

        Ok(())
    }

    /// Apply one action, printing any notice or listing it produces.
    pub fn apply<W: Write>(&mut self, action: Action, out: &mut W) -> io::Result<Flow> {
        tracing::trace!(?action, "applying action");

        let outcome: Result<(), SessionError> = match action {
            Action::Insert(text) => {
                self.session.insert(&text);
                Ok(())
            }
            Action::Commit => {
                if let Some(entry) = self.session.commit() {
                    let shown = if entry.result.is_empty() {
                        ERROR_DISPLAY
                    } else {
                        entry.result.as_str()
                    };
                    writeln!(out, "{} = {}", entry.expression, shown)?;
                }
                Ok(())
            }
            Action::Left => {
                self.session.move_left();
                Ok(())
            }
            Action::Right => {
                self.session.move_right();
                Ok(())
            }
            Action::Backspace => {
                self.session.backspace();
                Ok(())
            }
            Action::Clear => {
                self.session.clear();
                Ok(())
            }
            Action::InsertAnswer => {
                if !self.session.insert_answer() {
                    writeln!(out, "no answer to insert")?;
                }
                Ok(())
            }
            Action::Key(label) => self.session.press_key(&label),
            Action::Save(slot) => {
                Slot::parse(&slot).and_then(|slot| self.session.save_to_slot(slot))
            }
            Action::Use(slot) => Slot::parse(&slot).and_then(|slot| self.session.use_slot(slot)),
            Action::ResetAll => {
                self.session.reset_all();
                writeln!(out, "memory and answer reset")?;
                Ok(())
            }
            Action::ShowHistory => {
                write_history(self.session, out)?;
                Ok(())
            }
            Action::Recall(n) => self.session.recall(n - 1),
            Action::ShowMemory => {
                write_memory(self.session, out)?;
                Ok(())
            }
            Action::Copy => {
                match copy_to_clipboard(self.session.answer()) {
                    Ok(()) => writeln!(out, "copied {}", self.session.answer())?,
                    Err(err) => writeln!(out, "error: {err:#}")?,
                }
                Ok(())
            }
            Action::Help => {
                write_help(out)?;
                Ok(())
            }
            Action::Quit => return Ok(Flow::Quit),
            Action::Unknown(line) => {
                writeln!(out, "unknown command `{line}`, try :help")?;
                Ok(())
            }
        };

        if let Err(notice) = outcome {
            writeln!(out, "error: {notice}")?;
        }
        Ok(Flow::Continue)
    }

    fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let (before, after) = self.session.buffer().split_at_cursor();
        writeln!(out, "> {before}{}{after}", self.cursor_marker)?;

        let result = self.session.result().display();
        if !result.is_empty() {
            writeln!(out, "  {result}")?;
        }
        Ok(())
    }
}

/// Print the history, newest first, numbered from 1.
pub fn write_history<W: Write>(session: &Session, out: &mut W) -> io::Result<()> {
    if session.history().is_empty() {
        return writeln!(out, "no history yet");
    }

    for (i, entry) in session.history().entries().iter().enumerate() {
        writeln!(out, "{:>2}. {} = {}", i + 1, entry.expression, entry.result)?;
    }
    Ok(())
}

/// Print every memory slot.
pub fn write_memory<W: Write>(session: &Session, out: &mut W) -> io::Result<()> {
    writeln!(out, "ans = {}", session.answer())?;
    for (slot, value) in session.memory().iter() {
        let value = if value.is_empty() { "-" } else { value };
        writeln!(out, "{slot}: {value}")?;
    }
    Ok(())
}

fn write_help<W: Write>(out: &mut W) -> io::Result<()> {
    let keys: Vec<&str> = keypad::labels().collect();
    writeln!(out, "<text>          type text at the cursor")?;
    writeln!(out, "=               commit the expression")?;
    writeln!(out, ":left :right    move the cursor")?;
    writeln!(out, ":bs :clear      delete before the cursor / clear the buffer")?;
    writeln!(out, ":ans            insert the last answer")?;
    writeln!(out, ":key <label>    press a keypad key ({})", keys.join(" "))?;
    writeln!(out, ":save <A-L>     store the last answer in a slot")?;
    writeln!(out, ":use <A-L>      insert a slot's value")?;
    writeln!(out, ":memory         list slots")?;
    writeln!(out, ":reset          empty every slot and reset the answer")?;
    writeln!(out, ":history        list recent calculations")?;
    writeln!(out, ":recall <n>     resume history entry n")?;
    writeln!(out, ":copy           copy the last answer to the clipboard")?;
    writeln!(out, ":quit")
}
