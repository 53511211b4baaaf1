// ABOUTME: Terminal implementation of the Prompt trait using dialoguer.
// ABOUTME: Passwords are masked and never echoed; colouring stays in this layer.

use colored::Colorize;
use sshgrant_core::broker::Prompt;
use sshgrant_core::error::{Result, WorkflowError};

/// Interactive terminal prompt. The masked password prompt never echoes
/// or logs what was typed.
#[derive(Clone, Default)]
pub struct TermPrompt;

impl TermPrompt {
    pub fn new() -> Self {
        TermPrompt
    }
}

impl Prompt for TermPrompt {
    fn show(&self, text: &str) {
        println!();
        println!("{}", "━".repeat(50).dimmed());
        println!("{}", text);
        println!("{}", "━".repeat(50).dimmed());
        println!();
    }

    fn input(&self, prompt: &str) -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| WorkflowError::Prompt(e.to_string()))
    }

    fn password(&self, prompt: &str) -> Result<String> {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|e| WorkflowError::Prompt(e.to_string()))
    }

    fn confirm(&self, prompt: &str, default_yes: bool) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default_yes)
            .interact()
            .map_err(|e| WorkflowError::Prompt(e.to_string()))
    }
}
