//! `generate` subcommand: shell completions and man pages for `cpath`.
use anyhow::{Context, Result};
use clap::Command;
use clap_complete::Shell;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes the completion script for `shell` to `out`.
pub fn write_completions<W: Write>(shell: Shell, cmd: &mut Command, out: &mut W) {
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, cmd, name, out);
}

/// Renders the man page of `cmd` and of every nested subcommand into
/// `output_dir`, or the current directory if none is given. Returns the
/// written paths.
///
/// # Errors
///
/// Returns an error if the output directory or a page cannot be written.
pub fn generate_man_pages(
    cmd: &Command,
    output_dir: Option<PathBuf>,
) -> Result<Vec<PathBuf>> {
    let output_dir = match output_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Opening current directory")?,
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;

    let mut written = Vec::new();
    let name = cmd.get_name().to_string();
    render_page(cmd.clone(), &output_dir, &name, &mut written)?;
    Ok(written)
}

/// Renders `cmd` as `<page_name>.1`, then recurses into its subcommands as
/// `<page_name>-<sub>.1`.
fn render_page(
    cmd: Command,
    output_dir: &Path,
    page_name: &str,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let path = output_dir.join(format!("{page_name}.1"));
    let mut file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    // clap_mangen prints the command name in NAME and SYNOPSIS, so nested
    // pages are renamed to their dashed page name first. The leak is bounded
    // by the number of subcommands of a one-shot invocation.
    let leaked_name: &'static str = Box::leak(page_name.to_string().into_boxed_str());
    let renamed = cmd.clone().name(leaked_name).disable_help_subcommand(true);
    clap_mangen::Man::new(renamed)
        .render(&mut file)
        .with_context(|| format!("failed to render {}", path.display()))?;
    log::info!("generated {}", path.display());
    written.push(path);

    for sub in cmd.get_subcommands() {
        let sub_name = format!("{page_name}-{}", sub.get_name());
        render_page(sub.clone(), output_dir, &sub_name, written)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Command {
        Command::new("cpath")
            .about("Query snapshots")
            .subcommand(Command::new("generate").subcommand(Command::new("man")))
    }

    #[test]
    fn writes_nested_pages() {
        let dir = tempfile::tempdir().unwrap();
        let written =
            generate_man_pages(&command(), Some(dir.path().to_path_buf())).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["cpath.1", "cpath-generate.1", "cpath-generate-man.1"]);
        assert!(dir.path().join("cpath-generate-man.1").exists());
    }

    #[test]
    fn completions_name_the_binary() {
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut command(), &mut out);
        assert!(String::from_utf8(out).unwrap().contains("cpath"));
    }
}
