//! One-shot modes: push a file, pull a file, run a script.
//!
//! Straight calls into the remote editor adapter with no queue and no
//! debounce.

use anyhow::{Context, Result};
use editor_sync_core::{RemoteEditor, ScriptEvaluator};
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

/// A file argument where `-` means stdin (push) or stdout (pull).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileArg {
    Stdio,
    Path(PathBuf),
}

impl From<&str> for FileArg {
    fn from(arg: &str) -> Self {
        if arg == "-" {
            FileArg::Stdio
        } else {
            FileArg::Path(PathBuf::from(arg))
        }
    }
}

/// Push the contents of `file` into the editor at `index`.
pub async fn push<E: ScriptEvaluator>(
    editor: &RemoteEditor<E>,
    file: &FileArg,
    index: usize,
) -> Result<()> {
    let code = match file {
        FileArg::Stdio => {
            let mut code = String::new();
            tokio::io::stdin()
                .read_to_string(&mut code)
                .await
                .context("Failed to read stdin")?;
            code
        }
        FileArg::Path(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
    };

    debug!("Pushing {:?} into editor {}", file, index);
    editor.set_value(index, &code).await?;
    Ok(())
}

/// Write the text of the editor at `index` to `file`.
pub async fn pull<E: ScriptEvaluator>(
    editor: &RemoteEditor<E>,
    file: &FileArg,
    index: usize,
) -> Result<()> {
    let code = editor.get_value(index).await?;
    debug!("Pulled {} bytes from editor {} into {:?}", code.len(), index, file);

    match file {
        FileArg::Stdio => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(code.as_bytes()).await?;
            stdout.flush().await?;
        }
        FileArg::Path(path) => tokio::fs::write(path, code)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?,
    }
    Ok(())
}

/// Run `script` in the page and return the raw response.
pub async fn execjs<E: ScriptEvaluator>(editor: &RemoteEditor<E>, script: &str) -> Result<String> {
    Ok(editor.execute(script).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_arg_parsing() {
        assert_eq!(FileArg::from("-"), FileArg::Stdio);
        assert_eq!(FileArg::from("a.js"), FileArg::Path(PathBuf::from("a.js")));
    }
}
