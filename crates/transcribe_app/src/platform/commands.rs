use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;
use transcribe_core::JobInput;

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(PathBuf),
    Simulate { name: String, size_bytes: u64 },
    Start,
    Stop,
    Status,
    Save(Option<PathBuf>),
    Help,
    Quit { force: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, type `help` for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid size `{0}`")]
    InvalidSize(String),
}

pub const HELP: &str = "\
commands:
  select <path>            choose an audio file
  simulate <name> <bytes>  choose a made-up file of the given size
  start                    start transcribing the selected file
  stop                     cancel the running job
  status                   show the current state
  save [path]              write the finished transcript to disk
  help                     show this list
  quit                     leave (asks first while a job is running; `quit!` skips the question)";

/// Parses a prompt line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "select" | "open" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("select <path>"));
            }
            Command::Select(PathBuf::from(rest))
        }
        "simulate" => {
            let (name, size) = rest
                .rsplit_once(char::is_whitespace)
                .ok_or(CommandError::Usage("simulate <name> <bytes>"))?;
            let size_bytes = size
                .replace('_', "")
                .parse::<u64>()
                .map_err(|_| CommandError::InvalidSize(size.to_string()))?;
            Command::Simulate {
                name: name.trim().to_string(),
                size_bytes,
            }
        }
        "start" => Command::Start,
        "stop" | "cancel" => Command::Stop,
        "status" => Command::Status,
        "save" => Command::Save((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit { force: false },
        "quit!" | "exit!" => Command::Quit { force: true },
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Builds a job input from a file on disk, using its byte length.
pub fn input_from_path(path: &Path) -> anyhow::Result<JobInput> {
    let metadata =
        std::fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
    anyhow::ensure!(metadata.is_file(), "{} is not a file", path.display());
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(JobInput::new(name, metadata.len()))
}
