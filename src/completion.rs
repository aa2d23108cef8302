//! # Shell Completion Module
//!
//! Completion scripts come from clap's own generators. The hidden
//! `complete-songs` command prints song names so custom scripts can
//! complete seed arguments.
//!
//! ## Usage
//!
//! ```bash
//! tunegraph completion bash > ~/.local/share/bash-completion/completions/tunegraph
//! tunegraph completion zsh > ~/.config/zsh/completions/_tunegraph
//! ```

use crate::graph::GenreGraph;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::collections::BTreeSet;
use std::io::{self, Write};

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

#[must_use]
pub fn shell_to_completion_shell(shell: &crate::cli::Shell) -> CompletionShell {
    match shell {
        crate::cli::Shell::Bash => CompletionShell::Bash,
        crate::cli::Shell::Zsh => CompletionShell::Zsh,
        crate::cli::Shell::Fish => CompletionShell::Fish,
        crate::cli::Shell::PowerShell => CompletionShell::PowerShell,
        crate::cli::Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Distinct song names, sorted, one per line.
///
/// # Errors
///
/// Write failures on `out`.
pub fn write_song_completions<W: Write>(graph: &GenreGraph, out: &mut W) -> io::Result<()> {
    let names: BTreeSet<&str> = graph.songs().map(|s| s.name.as_str()).collect();
    for name in names {
        writeln!(out, "{name}")?;
    }
    Ok(())
}
