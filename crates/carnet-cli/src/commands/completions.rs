use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::aot::Generator;
use clap_complete::{generate, shells};

use crate::cli::{Cli, CompletionShell};
use crate::error::CliError;

/// Write the completion script to `output_path`, or stdout when omitted.
pub fn run_completions(shell: CompletionShell, output_path: Option<&Path>) -> Result<(), CliError> {
    let script = render_completions(shell);
    match output_path {
        Some(path) => {
            std::fs::write(path, &script)?;
            println!("Wrote {shell:?} completions to {}", path.display());
        }
        None => io::stdout().write_all(&script)?,
    }
    Ok(())
}

pub fn render_completions(shell: CompletionShell) -> Vec<u8> {
    let mut command = Cli::command();
    match shell {
        CompletionShell::Bash => render_with(shells::Bash, &mut command),
        CompletionShell::Zsh => render_with(shells::Zsh, &mut command),
        CompletionShell::Fish => render_with(shells::Fish, &mut command),
    }
}

fn render_with<G: Generator>(generator: G, command: &mut clap::Command) -> Vec<u8> {
    let bin_name = command.get_name().to_string();
    let mut buffer = Vec::new();
    generate(generator, command, bin_name, &mut buffer);
    buffer
}
