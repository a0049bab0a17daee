//! PDF rendering collaborator
//!
//! Rendering is delegated to an external HTML-to-PDF program. The default
//! invocation is `weasyprint - <output>`, reading the document on stdin.

use crate::error::{ReportError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Placeholder replaced by the output path in configured arguments
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Turns an HTML document into a PDF file
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Render `html` into a PDF at `output`
    async fn render(&self, html: &str, output: &Path) -> Result<()>;
}

/// External program settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfCommandConfig {
    /// Program to run
    pub command: String,

    /// Arguments; `{output}` is replaced by the target path
    pub args: Vec<String>,
}

impl Default for PdfCommandConfig {
    fn default() -> Self {
        Self {
            command: "weasyprint".to_string(),
            args: vec!["-".to_string(), OUTPUT_PLACEHOLDER.to_string()],
        }
    }
}

/// Renderer that pipes HTML into an external program
#[derive(Debug, Clone)]
pub struct CommandPdfRenderer {
    config: PdfCommandConfig,
}

impl CommandPdfRenderer {
    /// Create a renderer for the given program settings
    pub fn new(config: PdfCommandConfig) -> Self {
        Self { config }
    }

    fn args_for(&self, output: &Path) -> Vec<String> {
        let output = output.to_string_lossy();
        self.config
            .args
            .iter()
            .map(|arg| arg.replace(OUTPUT_PLACEHOLDER, &output))
            .collect()
    }
}

#[async_trait]
impl PdfRenderer for CommandPdfRenderer {
    async fn render(&self, html: &str, output: &Path) -> Result<()> {
        let args = self.args_for(output);
        debug!(command = %self.config.command, ?args, "Rendering PDF");

        let mut child = Command::new(&self.config.command)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ReportError::RendererUnavailable {
                command: self.config.command.clone(),
                reason: e.to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(html.as_bytes()).await {
                Ok(()) => {}
                // The program quit without reading; its exit status says why
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!(command = %self.config.command, "Renderer closed stdin early");
                }
                Err(e) => return Err(e.into()),
            }
            // Dropping stdin closes the pipe so the program sees EOF
        }

        let result = child.wait_with_output().await?;
        if !result.status.success() {
            return Err(ReportError::RendererFailed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
