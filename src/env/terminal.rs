//! Terminal prompts for the headless host

use std::io::{self, Write};

use crate::error::Result;

/// What a line typed at a numbered menu means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAnswer {
    /// Empty input closes the menu without a choice.
    Dismissed,
    /// Zero-based index of the chosen entry.
    Picked(usize),
    /// Anything else; the menu asks again.
    Unrecognized,
}

impl MenuAnswer {
    /// Entries are numbered from 1 on screen.
    pub fn parse(input: &str, entries: usize) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return MenuAnswer::Dismissed;
        }
        match input.parse::<usize>() {
            Ok(n) if (1..=entries).contains(&n) => MenuAnswer::Picked(n - 1),
            _ => MenuAnswer::Unrecognized,
        }
    }
}

fn render_menu(message: &str, choices: &[String]) -> String {
    let entries: String = choices
        .iter()
        .zip(1..)
        .map(|(choice, n)| format!("  {n}. {choice}\n"))
        .collect();
    format!(
        "{message}\n{entries}Pick 1-{} (empty to dismiss): ",
        choices.len()
    )
}

fn ask(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Reads answers from stdin.
///
/// With `assume_yes` every prompt answers itself with its first choice or its
/// default, which is how the binary runs unattended.
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompter {
    assume_yes: bool,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    pub fn assume_yes(&self) -> bool {
        self.assume_yes
    }

    pub async fn prompt_yes_no(&self, message: &str) -> Result<bool> {
        let question = format!("{message} [y/N]: ");
        if self.assume_yes {
            println!("{question}y");
            return Ok(true);
        }
        let answer = ask(&question)?.to_lowercase();
        Ok(matches!(answer.as_str(), "y" | "yes"))
    }

    /// Empty input keeps `default`; with no default it dismisses the prompt.
    pub async fn prompt_text(&self, message: &str, default: Option<&str>) -> Result<Option<String>> {
        if self.assume_yes {
            return Ok(default.map(str::to_string));
        }
        let question = match default {
            Some(value) => format!("{message} [{value}]: "),
            None => format!("{message}: "),
        };
        let answer = ask(&question)?;
        Ok(if answer.is_empty() {
            default.map(str::to_string)
        } else {
            Some(answer)
        })
    }

    /// Numbered menu; returns the picked index, or `None` when dismissed.
    pub async fn prompt_choice(&self, message: &str, choices: &[String]) -> Result<Option<usize>> {
        if choices.is_empty() {
            return Ok(None);
        }
        let mut question = render_menu(message, choices);
        if self.assume_yes {
            println!("{question}1");
            return Ok(Some(0));
        }
        loop {
            match MenuAnswer::parse(&ask(&question)?, choices.len()) {
                MenuAnswer::Dismissed => return Ok(None),
                MenuAnswer::Picked(index) => return Ok(Some(index)),
                MenuAnswer::Unrecognized => {
                    question = format!("Not a menu entry. Pick 1-{}: ", choices.len());
                }
            }
        }
    }
}
