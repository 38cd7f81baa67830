//! Code block extraction and local execution for the developer agent

use lazy_static::lazy_static;
use regex::Regex;
use std::io::Write;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::{DeveloperConfig, TimeoutConfig, SETTINGS};
use crate::error::{PipelineError, Result};

lazy_static! {
    static ref FENCE_RE: Regex =
        Regex::new(r"(?s)```([A-Za-z0-9_+-]*)[ \t]*\r?\n(.*?)```").expect("valid fence regex");
}

/// A fenced code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

/// Piece of a model reply: prose or code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Code(CodeBlock),
}

/// Split a reply into prose and fenced code, in order
pub fn split_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in FENCE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };

        let prose = text[last..whole.start()].trim();
        if !prose.is_empty() {
            segments.push(Segment::Text(prose.to_string()));
        }

        segments.push(Segment::Code(CodeBlock {
            language: caps[1].to_lowercase(),
            code: caps[2].trim_end().to_string(),
        }));
        last = whole.end();
    }

    let tail = text[last..].trim();
    if !tail.is_empty() {
        segments.push(Segment::Text(tail.to_string()));
    }

    segments
}

/// Languages the runner can execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Shell,
}

impl Language {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "python" | "python3" | "py" => Some(Self::Python),
            "sh" | "bash" | "shell" | "zsh" => Some(Self::Shell),
            _ => None,
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::Python => ".py",
            Self::Shell => ".sh",
        }
    }
}

/// Captured result of running a code block
#[derive(Debug, Clone, Default)]
pub struct ExecutionOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ExecutionOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Human readable output for the conversation
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.stdout.trim().is_empty() {
            out.push_str(self.stdout.trim_end());
            out.push('\n');
        }
        if !self.stderr.trim().is_empty() {
            out.push_str(&format!("[stderr]\n{}\n", self.stderr.trim_end()));
        }
        if self.timed_out {
            out.push_str("[timed out]\n");
        } else if let Some(code) = self.exit_code.filter(|c| *c != 0) {
            out.push_str(&format!("[exit code {}]\n", code));
        }
        if out.is_empty() {
            out.push_str("(no output)\n");
        }
        out
    }
}

/// Runs code blocks through local interpreters
#[derive(Debug, Clone)]
pub struct CodeRunner {
    python: String,
    shell: String,
    timeout: Duration,
}

impl Default for CodeRunner {
    fn default() -> Self {
        Self::from_config(
            &SETTINGS.developer,
            TimeoutConfig::duration(SETTINGS.timeouts.code_execution),
        )
    }
}

impl CodeRunner {
    pub fn from_config(config: &DeveloperConfig, timeout: Duration) -> Self {
        Self {
            python: config.python.clone(),
            shell: config.shell.clone(),
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn supports(&self, block: &CodeBlock) -> bool {
        Language::from_tag(&block.language).is_some()
    }

    fn interpreter(&self, language: Language) -> &str {
        match language {
            Language::Python => &self.python,
            Language::Shell => &self.shell,
        }
    }

    /// Write the block to a temp file and run it
    pub async fn run(&self, block: &CodeBlock) -> Result<ExecutionOutput> {
        let language = Language::from_tag(&block.language).ok_or_else(|| {
            PipelineError::CommandFailed(format!("unsupported language '{}'", block.language))
        })?;

        let mut file = tempfile::Builder::new()
            .prefix("agent-code-")
            .suffix(language.extension())
            .tempfile()?;
        file.write_all(block.code.as_bytes())?;
        file.flush()?;

        let interpreter = self.interpreter(language);
        info!("Executing {} block with {}", block.language, interpreter);

        let child = Command::new(interpreter)
            .arg(file.path())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match timeout(self.timeout, child).await {
            Ok(output) => {
                let output = output?;
                debug!(status = ?output.status, "Code block finished");
                Ok(ExecutionOutput {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    timed_out: false,
                })
            }
            Err(_) => Ok(ExecutionOutput {
                timed_out: true,
                ..Default::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_segments() {
        let text = "First I compute.\n```python\nprint(1 + 1)\n```\nThen list files.\n```bash\nls\n```\nDone.";
        let segments = split_segments(text);
        assert_eq!(
            segments,
            vec![
                Segment::Text("First I compute.".to_string()),
                Segment::Code(CodeBlock {
                    language: "python".to_string(),
                    code: "print(1 + 1)".to_string(),
                }),
                Segment::Text("Then list files.".to_string()),
                Segment::Code(CodeBlock {
                    language: "bash".to_string(),
                    code: "ls".to_string(),
                }),
                Segment::Text("Done.".to_string()),
            ]
        );
    }

    #[test]
    fn test_split_without_code() {
        assert_eq!(
            split_segments("just words"),
            vec![Segment::Text("just words".to_string())]
        );
        assert!(split_segments("   ").is_empty());
    }

    #[test]
    fn test_language_tags() {
        assert_eq!(Language::from_tag("py"), Some(Language::Python));
        assert_eq!(Language::from_tag("bash"), Some(Language::Shell));
        assert_eq!(Language::from_tag("rust"), None);
        assert_eq!(Language::from_tag(""), None);
    }

    #[test]
    fn test_render_output() {
        let output = ExecutionOutput {
            exit_code: Some(2),
            stdout: "partial\n".to_string(),
            stderr: "boom".to_string(),
            timed_out: false,
        };
        assert_eq!(output.render(), "partial\n[stderr]\nboom\n[exit code 2]\n");
        assert_eq!(ExecutionOutput::default().render(), "(no output)\n");
    }

    fn shell_runner() -> CodeRunner {
        CodeRunner::from_config(
            &DeveloperConfig {
                auto_run: true,
                safe_mode: crate::config::SafeMode::Auto,
                python: "python3".to_string(),
                shell: "sh".to_string(),
            },
            Duration::from_secs(10),
        )
    }

    #[tokio::test]
    async fn test_run_shell_block() {
        let block = CodeBlock {
            language: "sh".to_string(),
            code: "echo hello; echo oops >&2; exit 3".to_string(),
        };
        let output = shell_runner().run(&block).await.unwrap();
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.stderr.trim(), "oops");
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let block = CodeBlock {
            language: "sh".to_string(),
            code: "sleep 5".to_string(),
        };
        let output = shell_runner()
            .with_timeout(Duration::from_millis(200))
            .run(&block)
            .await
            .unwrap();
        assert!(output.timed_out);
    }

    #[tokio::test]
    async fn test_run_unsupported_language() {
        let block = CodeBlock {
            language: "cobol".to_string(),
            code: "DISPLAY 'HI'.".to_string(),
        };
        assert!(shell_runner().run(&block).await.is_err());
    }
}
