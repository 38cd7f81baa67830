//! Sub-agents the supervisor can delegate to

use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task;
use tracing::{info, warn};

use super::interpreter::{split_segments, CodeBlock, CodeRunner, Segment};
use crate::config::{DeveloperConfig, SafeMode, DEVELOPER_PROMPT, SETTINGS};
use crate::error::Result;
use crate::model::{ChatMessage, ChatModel};
use crate::services::research::DEFAULT_REPORT_TYPE;
use crate::services::ResearchClient;

/// A sub-agent that turns a supervisor instruction into a report
#[async_trait]
pub trait Worker: Send + Sync {
    /// Short name used in logs and banners
    fn name(&self) -> &str;

    /// Heading put in front of the worker's message, e.g. `Research Report`
    fn heading(&self) -> &str;

    async fn handle(&self, instruction: &str) -> Result<String>;
}

/// Gathers information through the research service
pub struct ResearcherAgent {
    client: ResearchClient,
    report_type: String,
}

impl Default for ResearcherAgent {
    fn default() -> Self {
        Self::new(ResearchClient::default())
    }
}

impl ResearcherAgent {
    pub fn new(client: ResearchClient) -> Self {
        Self {
            client,
            report_type: DEFAULT_REPORT_TYPE.to_string(),
        }
    }

    pub fn with_report_type(mut self, report_type: impl Into<String>) -> Self {
        self.report_type = report_type.into();
        self
    }
}

#[async_trait]
impl Worker for ResearcherAgent {
    fn name(&self) -> &str {
        "researcher"
    }

    fn heading(&self) -> &str {
        "Research Report"
    }

    async fn handle(&self, instruction: &str) -> Result<String> {
        info!("Researching: {}", instruction);
        let report = self
            .client
            .write_report(instruction, &self.report_type)
            .await?;
        info!("Research complete: {} characters", report.len());
        Ok(report)
    }
}

/// Callback type for confirming code execution
pub type ConfirmationCallback = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Writes code with the model and runs it under the execution policy
pub struct DeveloperAgent {
    model: Arc<dyn ChatModel>,
    runner: CodeRunner,
    config: DeveloperConfig,
    confirmation_callback: ConfirmationCallback,
}

impl DeveloperAgent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        config: Option<DeveloperConfig>,
        confirmation_callback: Option<ConfirmationCallback>,
    ) -> Self {
        Self {
            model,
            runner: CodeRunner::default(),
            config: config.unwrap_or_else(|| SETTINGS.developer.clone()),
            confirmation_callback: confirmation_callback
                .unwrap_or_else(|| Box::new(default_confirmation)),
        }
    }

    pub fn with_runner(mut self, runner: CodeRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Whether a block may run, asking for confirmation when required
    fn approve(&self, block: &CodeBlock) -> bool {
        if !self.runner.supports(block) {
            return false;
        }
        if self.config.auto_run {
            return true;
        }
        match self.config.safe_mode {
            SafeMode::Auto => true,
            SafeMode::Off => false,
            SafeMode::Ask => {
                let prompt = format!("Run this {} code?\n{}", block.language, block.code);
                self.confirm(&prompt)
            }
        }
    }

    /// Run the confirmation callback; on a multi-threaded runtime the worker
    /// thread is handed off first since the callback may block on stdin
    fn confirm(&self, prompt: &str) -> bool {
        let callback = &self.confirmation_callback;
        match Handle::try_current().map(|handle| handle.runtime_flavor()) {
            Ok(RuntimeFlavor::MultiThread) => task::block_in_place(|| callback(prompt)),
            _ => callback(prompt),
        }
    }
}

#[async_trait]
impl Worker for DeveloperAgent {
    fn name(&self) -> &str {
        "developer"
    }

    fn heading(&self) -> &str {
        "Development Output"
    }

    async fn handle(&self, instruction: &str) -> Result<String> {
        let preview: String = instruction.chars().take(100).collect();
        info!("Developing: {}...", preview);

        let messages = [
            ChatMessage::system(DEVELOPER_PROMPT),
            ChatMessage::user(instruction),
        ];
        let response = self.model.chat(&messages).await?;

        let mut output_text = String::new();
        for segment in split_segments(&response.content) {
            match segment {
                Segment::Text(text) => {
                    output_text.push_str(&text);
                    output_text.push('\n');
                }
                Segment::Code(block) if self.approve(&block) => {
                    output_text.push_str(&format!("\nCode executed:\n```\n{}\n```\n", block.code));
                    match self.runner.run(&block).await {
                        Ok(result) => {
                            output_text.push_str(&format!("Output:\n```\n{}```\n", result.render()))
                        }
                        Err(e) => {
                            warn!("Code execution failed: {}", e);
                            output_text.push_str(&format!("Execution error: {}\n", e));
                        }
                    }
                }
                Segment::Code(block) => {
                    output_text.push_str(&format!(
                        "\nCode (not executed):\n```{}\n{}\n```\n",
                        block.language, block.code
                    ));
                }
            }
        }

        info!("Development complete");
        Ok(output_text)
    }
}

/// Default confirmation callback using console input
fn default_confirmation(message: &str) -> bool {
    print!("{}\nConfirm? (Y/N): ", message);
    io::stdout().flush().ok();

    let mut response = String::new();
    io::stdin().read_line(&mut response).ok();
    response.trim().eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Canned(&'static str);

    #[async_trait]
    impl ChatModel for Canned {
        async fn chat(&self, _messages: &[ChatMessage]) -> Result<ModelResponse> {
            Ok(ModelResponse::from_raw(self.0))
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    const REPLY: &str = "Printing a greeting.\n```sh\necho hi\n```\nThat is all.";

    fn config(auto_run: bool, safe_mode: SafeMode) -> DeveloperConfig {
        DeveloperConfig {
            auto_run,
            safe_mode,
            python: "python3".to_string(),
            shell: "sh".to_string(),
        }
    }

    fn developer(config: DeveloperConfig, callback: ConfirmationCallback) -> DeveloperAgent {
        let runner = CodeRunner::from_config(&config, Duration::from_secs(10));
        DeveloperAgent::new(Arc::new(Canned(REPLY)), Some(config), Some(callback))
            .with_runner(runner)
    }

    #[tokio::test]
    async fn test_auto_run_executes() {
        let agent = developer(config(true, SafeMode::Ask), Box::new(|_: &str| false));
        let output = agent.handle("greet").await.unwrap();

        assert!(output.starts_with("Printing a greeting.\n"));
        assert!(output.contains("\nCode executed:\n```\necho hi\n```\n"));
        assert!(output.contains("Output:\n```\nhi\n```\n"));
        assert!(output.ends_with("That is all.\n"));
    }

    #[tokio::test]
    async fn test_ask_mode_uses_callback() {
        let asked = Arc::new(AtomicUsize::new(0));
        let counter = asked.clone();
        let agent = developer(
            config(false, SafeMode::Ask),
            Box::new(move |_: &str| {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }),
        );

        let output = agent.handle("greet").await.unwrap();
        assert_eq!(asked.load(Ordering::SeqCst), 1);
        assert!(output.contains("Code (not executed):\n```sh\necho hi\n```"));
        assert!(!output.contains("Code executed"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_ask_mode_on_multi_thread_runtime() {
        let asked = Arc::new(AtomicUsize::new(0));
        let counter = asked.clone();
        let agent = developer(
            config(false, SafeMode::Ask),
            Box::new(move |prompt: &str| {
                assert!(prompt.starts_with("Run this sh code?\necho hi"));
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        );

        let output = agent.handle("greet").await.unwrap();
        assert_eq!(asked.load(Ordering::SeqCst), 1);
        assert!(output.contains("Output:\n```\nhi\n```\n"));
    }

    #[tokio::test]
    async fn test_safe_mode_off_never_runs() {
        let agent = developer(config(false, SafeMode::Off), Box::new(|_: &str| true));
        let output = agent.handle("greet").await.unwrap();
        assert!(output.contains("Code (not executed)"));
    }

    #[test]
    fn test_worker_headings() {
        let researcher = ResearcherAgent::new(ResearchClient::new("http://unused"));
        assert_eq!(researcher.name(), "researcher");
        assert_eq!(researcher.heading(), "Research Report");

        let developer = developer(config(false, SafeMode::Off), Box::new(|_: &str| true));
        assert_eq!(developer.heading(), "Development Output");
    }
}
