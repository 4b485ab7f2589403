//! Shell completion and man page generation.

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;

use crate::Cli;

fn cli_command() -> clap::Command {
    Cli::command()
}

/// Print completions for the given shell to stdout.
pub fn handle_completions(shell: clap_complete::Shell) -> Result<(), Box<dyn std::error::Error>> {
    let mut command = cli_command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
    Ok(())
}

/// Render the man page, to a directory or stdout.
pub fn handle_man(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            clap_mangen::generate_to(cli_command(), &dir)?;
            eprintln!("Man pages written to {}", dir.display());
        }
        None => {
            let man = clap_mangen::Man::new(cli_command());
            man.render(&mut io::stdout())?;
        }
    }
    Ok(())
}
