//! Confirmation gate between scanning and live deletion.

use crate::config::RunConfig;

use std::io::{self, BufRead, Write};

/// Something that can answer a yes/no question.
///
/// Any `FnMut(&str) -> bool` closure works, which keeps tests off stdin.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Interactive prompt on stdin/stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        let mut stdout = io::stdout().lock();
        if write!(stdout, "{prompt} (y/n): ")
            .and_then(|()| stdout.flush())
            .is_err()
        {
            return false;
        }
        drop(stdout);

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_affirmative(&line),
        }
    }
}

/// `y` or `yes` in any case; everything else is a no
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// What the pipeline should do with the scanned tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Report what would be removed, remove nothing
    Simulate,
    Proceed,
    Abort,
}

/// Decide whether deletion goes ahead. Only prompts when neither
/// `dry_run` nor `force` is set.
pub fn gate<C>(config: &RunConfig, confirm: &mut C, prompt: &str) -> Decision
where
    C: Confirm + ?Sized,
{
    if config.dry_run {
        Decision::Simulate
    } else if config.force || confirm.confirm(prompt) {
        Decision::Proceed
    } else {
        Decision::Abort
    }
}
