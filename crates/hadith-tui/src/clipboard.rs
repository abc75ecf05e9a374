use anyhow::{anyhow, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Clipboard helpers, tried in order until one accepts the text
const PROVIDERS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
];

pub fn copy_to_clipboard(text: &str) -> Result<()> {
    for (program, args) in PROVIDERS {
        let Ok(mut child) = Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        else {
            continue;
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        if child.wait()?.success() {
            debug!(program, chars = text.chars().count(), "Copied to clipboard");
            return Ok(());
        }
    }

    Err(anyhow!("no clipboard helper available (tried pbcopy, wl-copy, xclip, xsel)"))
}
