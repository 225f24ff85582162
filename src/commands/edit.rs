//! `dlgedit edit` — open the raw JSON document in an editor.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

use crate::config;

pub fn run(file: &Path) -> Result<()> {
    if !file.exists() {
        bail!(
            "{} does not exist — run `dlgedit new` to create it",
            file.display()
        );
    }
    let editor = resolve_editor(config::load().editor);

    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("no editor configured for `dlgedit edit`"))?;
    let args: Vec<String> = parts.map(ToString::to_string).collect();

    let status = Command::new(program)
        .args(&args)
        .arg(file)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("failed to launch editor {:?} for {}", editor, file.display()))?;

    if !status.success() {
        bail!("editor exited with status {}", status);
    }

    Ok(())
}

fn resolve_editor(config_editor: Option<String>) -> String {
    if let Some(e) = config_editor.filter(|v| !v.trim().is_empty()) {
        return e;
    }
    if let Some(e) = std::env::var("DLGEDIT_EDITOR")
        .ok()
        .filter(|v| !v.trim().is_empty())
    {
        return e;
    }
    if let Some(e) = std::env::var("VISUAL")
        .ok()
        .filter(|v| !v.trim().is_empty())
    {
        return e;
    }
    if let Some(e) = std::env::var("EDITOR")
        .ok()
        .filter(|v| !v.trim().is_empty())
    {
        return e;
    }
    if cfg!(windows) {
        "notepad".to_string()
    } else {
        "vi".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_editor_takes_priority() {
        let picked = resolve_editor(Some("nvim".to_string()));
        assert_eq!(picked, "nvim");
    }

    #[test]
    fn blank_config_editor_is_skipped() {
        let picked = resolve_editor(Some("   ".to_string()));
        assert_ne!(picked, "   ");
    }
}
