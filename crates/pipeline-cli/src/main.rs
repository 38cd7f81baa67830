//! agent-pipeline CLI - agents over a local LLM runtime and its companion services
//!
//! Usage:
//!     agent-pipeline [OPTIONS] <COMMAND>
//!
//! Environment Variables:
//!     OLLAMA_BASE_URL: Local LLM runtime (default: http://localhost:11434/v1)
//!     OPENAI_API_BASE: Endpoint for the supervisor and developer (default: OLLAMA_BASE_URL)
//!     OPENAI_API_KEY: API key for model authentication (default: not-needed)
//!     PIPELINE_MODEL: Model name (default: qwen2.5:7b)
//!     NEWS_SERVICE_URL, AGENT_WRAPPER_URL, WORKFLOW_ENGINE_URL, RESEARCH_SERVICE_URL
//!     DEVELOPER_AUTO_RUN, DEVELOPER_SAFE_MODE: Code execution policy
//!
//! A `.env` file in the working directory is loaded first.

mod logger;

use agent_pipeline::{
    check_all, ChatModel, DeveloperAgent, ModelClient, ModelConfig, NewsClient, Pipeline,
    PipelineConfig, ResearcherAgent, RouterAgent, SafeMode, StopReason, Supervisor,
    TimeoutConfig, ToolAgent, ToolRegistry, TranscriptSaver, WorkflowClient, SETTINGS,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Stop sequence keeping the model from writing its own observations
const REACT_STOP: &str = "\nObservation:";

/// Agent Pipeline - router, tool agent and supervisor pipeline
#[derive(Parser, Debug)]
#[command(name = "agent-pipeline")]
#[command(about = "Agent Pipeline - LLM agents over local research and workflow services")]
#[command(after_help = r#"Examples:
    # Classify and dispatch tasks
    agent-pipeline route "Latest AI news" "Write a haiku about Rust"

    # Ask the tool-calling agent
    agent-pipeline tools "What happened in quantum computing this week?"

    # Run the supervisor pipeline once, executing generated code without asking
    agent-pipeline pipeline --auto-run "Build a moving average crossover backtest"

    # Interactive pipeline session with saved transcripts
    agent-pipeline pipeline --transcript-dir ./transcripts

    # Check that every service is reachable
    agent-pipeline check

    # Hand a task to another agent through a workflow webhook
    agent-pipeline webhook a2a-handoff --payload '{"task": "summarize"}'
"#)]
struct Cli {
    /// Local LLM runtime base URL
    #[arg(long, global = true, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434/v1")]
    base_url: String,

    /// OpenAI-compatible endpoint for the supervisor and developer
    #[arg(long, global = true, env = "OPENAI_API_BASE")]
    openai_base_url: Option<String>,

    /// Model name
    #[arg(long, global = true, env = "PIPELINE_MODEL", default_value = "qwen2.5:7b")]
    model: String,

    /// API key for model authentication
    #[arg(long, global = true, env = "OPENAI_API_KEY", default_value = "not-needed")]
    apikey: String,

    /// Echo model tokens as they stream in
    #[arg(long, global = true)]
    stream: bool,

    /// Suppress verbose output
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Debug logging for the library
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify each task and run the matching handler
    Route {
        #[arg(required = true)]
        tasks: Vec<String>,
    },

    /// Answer questions with the news search and research workflow tools
    Tools {
        #[arg(required = true)]
        queries: Vec<String>,

        /// Maximum reasoning iterations per question
        #[arg(long, default_value = "15")]
        max_iterations: usize,
    },

    /// Run the supervisor / researcher / developer pipeline
    Pipeline {
        /// Query to run (interactive mode if not provided)
        query: Option<String>,

        /// Maximum node executions per run
        #[arg(long, env = "PIPELINE_MAX_STEPS", default_value = "25")]
        max_steps: usize,

        /// Model for the supervisor (default: --model)
        #[arg(long, env = "SUPERVISOR_MODEL")]
        supervisor_model: Option<String>,

        /// Model for the developer (default: --model)
        #[arg(long, env = "DEVELOPER_MODEL")]
        developer_model: Option<String>,

        /// Run generated code without confirmation
        #[arg(long)]
        auto_run: bool,

        /// Code execution policy: off, ask or auto
        #[arg(long, env = "DEVELOPER_SAFE_MODE")]
        safe_mode: Option<SafeMode>,

        /// Directory to save run transcripts (creates timestamped subdirectory per session)
        #[arg(long, env = "PIPELINE_TRANSCRIPT_DIR")]
        transcript_dir: Option<PathBuf>,
    },

    /// Check that the services and the model endpoint respond
    Check,

    /// Trigger a workflow engine webhook
    Webhook {
        /// Webhook path, e.g. a2a-handoff
        path: String,

        /// JSON payload
        #[arg(long, default_value = "{}")]
        payload: String,
    },
}

impl Cli {
    fn model_config(&self, base_url: &str, model: &str) -> ModelConfig {
        ModelConfig::new(base_url, model)
            .with_api_key(&self.apikey)
            .with_stream(self.stream)
    }

    fn local_model(&self) -> ModelConfig {
        self.model_config(&self.base_url, &self.model)
    }

    fn openai_base_url(&self) -> &str {
        self.openai_base_url.as_deref().unwrap_or(&self.base_url)
    }
}

fn print_header(title: &str, rows: &[(&str, &str)]) {
    println!("{}", "=".repeat(50));
    println!("{}", title);
    println!("{}", "=".repeat(50));
    for (label, value) in rows {
        println!("{}: {}", label, value);
    }
    println!("{}", "=".repeat(50));
}

async fn run_route(cli: &Cli, tasks: &[String]) -> Result<()> {
    let model = Arc::new(ModelClient::new(cli.local_model()));
    let router = RouterAgent::new(model, NewsClient::default()).with_verbose(!cli.quiet);

    print_header(
        "Router Agent - classify and dispatch",
        &[("Model", cli.model.as_str()), ("Base URL", cli.base_url.as_str())],
    );

    for task in tasks {
        println!("\nTask: {}\n", task);
        let state = router.route(task).await?;

        match state.error {
            Some(error) => println!("\u{274C} {}", error),
            None => println!("\nResult:\n{}", state.result),
        }
        println!("{}", "-".repeat(50));
    }

    Ok(())
}

async fn run_tools(cli: &Cli, queries: &[String], max_iterations: usize) -> Result<()> {
    let model = Arc::new(ModelClient::new(cli.local_model().with_stop(REACT_STOP)));
    let agent = ToolAgent::new(model, ToolRegistry::local_services())
        .with_max_iterations(max_iterations)
        .with_verbose(!cli.quiet);

    let tool_names = agent.tools().render_names();
    print_header(
        "Tool Agent - news search and research workflow",
        &[("Model", cli.model.as_str()), ("Tools", tool_names.as_str())],
    );

    for query in queries {
        println!("\nQuestion: {}\n", query);
        let run = agent.run(query).await?;
        println!("\nAnswer: {}", run.answer);
        if run.stopped_early {
            println!("(stopped after {} tool calls)", run.steps.len());
        }
        println!("{}", "-".repeat(50));
    }

    Ok(())
}

struct PipelineArgs<'a> {
    query: Option<&'a str>,
    max_steps: usize,
    supervisor_model: Option<&'a str>,
    developer_model: Option<&'a str>,
    auto_run: bool,
    safe_mode: Option<SafeMode>,
    transcript_dir: Option<&'a PathBuf>,
}

async fn run_pipeline(cli: &Cli, args: PipelineArgs<'_>) -> Result<()> {
    let base_url = cli.openai_base_url();
    let supervisor_model = args.supervisor_model.unwrap_or(&cli.model);
    let developer_model = args.developer_model.unwrap_or(&cli.model);

    let supervisor = Supervisor::new(Arc::new(ModelClient::new(
        cli.model_config(base_url, supervisor_model),
    )));

    let mut developer_config = SETTINGS.developer.clone();
    developer_config.auto_run |= args.auto_run;
    if let Some(safe_mode) = args.safe_mode {
        developer_config.safe_mode = safe_mode;
    }
    let developer = DeveloperAgent::new(
        Arc::new(ModelClient::new(cli.model_config(base_url, developer_model))),
        Some(developer_config.clone()),
        None,
    );

    let config = PipelineConfig::new()
        .with_max_steps(args.max_steps)
        .with_verbose(!cli.quiet);

    let mut pipeline = Pipeline::new(
        supervisor,
        Arc::new(ResearcherAgent::default()),
        Arc::new(developer),
        Some(config),
    );

    if let Some(dir) = args.transcript_dir {
        let saver = TranscriptSaver::new(dir)
            .await
            .with_context(|| format!("cannot create transcript directory {}", dir.display()))?;
        println!("Transcripts: {}", saver.session_dir().display());
        pipeline = pipeline.with_transcript(saver);
    }

    let max_steps = args.max_steps.to_string();
    let auto_run = developer_config.auto_run.to_string();
    let safe_mode = format!("{:?}", developer_config.safe_mode);
    print_header(
        "Research Pipeline - supervisor, researcher, developer",
        &[
            ("Supervisor", supervisor_model),
            ("Developer", developer_model),
            ("Base URL", base_url),
            ("Research", SETTINGS.services.research_url.as_str()),
            ("Max Steps", max_steps.as_str()),
            ("Auto Run", auto_run.as_str()),
            ("Safe Mode", safe_mode.as_str()),
        ],
    );

    match args.query {
        Some(query) => {
            println!("\nQuery: {}\n", query);
            run_once(&mut pipeline, query).await
        }
        None => run_interactive_mode(&mut pipeline).await,
    }
}

async fn run_once(pipeline: &mut Pipeline, query: &str) -> Result<()> {
    let outcome = pipeline.run(query).await?;

    println!("\n{}", "=".repeat(50));
    if outcome.stop_reason == StopReason::StepLimit {
        println!("\u{26A0}\u{FE0F} Step limit reached after {} steps", outcome.steps);
    }
    println!("Final message:\n{}", outcome.final_message);
    Ok(())
}

async fn run_interactive_mode(pipeline: &mut Pipeline) -> Result<()> {
    println!("\nEntering interactive mode. Type 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("Enter your query: ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(_) => {
                println!("\n\nInterrupted. Goodbye!");
                break;
            }
        }

        let query = input.trim();

        if query.eq_ignore_ascii_case("quit")
            || query.eq_ignore_ascii_case("exit")
            || query.eq_ignore_ascii_case("q")
        {
            println!("Goodbye!");
            break;
        }

        if query.is_empty() {
            continue;
        }

        println!();
        if let Err(e) = run_once(pipeline, query).await {
            eprintln!("\nError: {}\n", e);
        }
        println!();
    }

    Ok(())
}

/// Check services, then the model endpoint, then local interpreters
async fn run_check(cli: &Cli) -> bool {
    println!("\u{1F50D} Checking services...");
    println!("{}", "-".repeat(50));

    let mut services = SETTINGS.services.clone();
    services.llm_base_url = cli.base_url.clone();
    let timeout = TimeoutConfig::duration(SETTINGS.timeouts.health_check);

    let mut all_passed = true;
    for (i, result) in check_all(&services, timeout).await.iter().enumerate() {
        print!("{}. {} ({})... ", i + 1, result.name, result.url);
        if result.reachable {
            let status = result
                .status
                .map(|s| format!("HTTP {}", s))
                .unwrap_or_default();
            println!(
                "\u{2705} OK ({}, {} ms)",
                status,
                result.latency.as_millis()
            );
        } else {
            println!("\u{274C} FAILED");
            println!(
                "   Error: {}",
                result.error.as_deref().unwrap_or("unreachable")
            );
            all_passed = false;
        }
    }

    println!("{}", "-".repeat(50));
    println!("\u{1F50D} Checking model API...");
    println!("{}", "-".repeat(50));

    let client = ModelClient::new(cli.local_model().with_stream(false));

    print!("1. Checking model list ({})... ", cli.base_url);
    io::stdout().flush().ok();
    match client.list_models().await {
        Ok(models) if models.iter().any(|m| m == &cli.model) => {
            println!("\u{2705} OK ({} models)", models.len())
        }
        Ok(models) => {
            println!("\u{274C} FAILED");
            println!("   Error: model '{}' is not served", cli.model);
            println!("   Available: {}", models.join(", "));
            println!("   Solution: ollama pull {}", cli.model);
            all_passed = false;
        }
        Err(e) => {
            println!("\u{274C} FAILED");
            println!("   Error: {}", e);
            all_passed = false;
        }
    }

    print!("2. Checking chat completion ({})... ", client.model_name());
    io::stdout().flush().ok();
    match client.test_connection().await {
        Ok(_) => println!("\u{2705} OK"),
        Err(e) => {
            println!("\u{274C} FAILED");
            let error_msg = e.to_string();
            if error_msg.to_lowercase().contains("timed out") {
                println!("   Error: Connection to {} timed out", cli.base_url);
            } else {
                println!("   Error: {}", error_msg);
            }
            all_passed = false;
        }
    }

    // Code execution is optional; a missing interpreter is only a warning
    print!("3. Checking {} for the developer... ", SETTINGS.developer.python);
    io::stdout().flush().ok();
    match which::which(&SETTINGS.developer.python) {
        Ok(path) => println!("\u{2705} OK ({})", path.display()),
        Err(_) => {
            println!("\u{26A0}\u{FE0F} not found");
            println!("   Python blocks from the developer will fail to run.");
        }
    }

    println!("{}", "-".repeat(50));
    if all_passed {
        println!("\u{2705} All checks passed!\n");
    } else {
        println!("\u{274C} Check failed. Please fix the issues above.");
    }

    all_passed
}

async fn run_webhook(path: &str, payload: &str) -> Result<()> {
    let payload: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| anyhow!("Invalid JSON payload: {}", e))?;

    let client = WorkflowClient::default();
    println!("Triggering {}", client.webhook_url(path));

    let reply = client.trigger_webhook(path, &payload).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.quiet);

    match &cli.command {
        Commands::Route { tasks } => run_route(&cli, tasks).await?,
        Commands::Tools {
            queries,
            max_iterations,
        } => run_tools(&cli, queries, *max_iterations).await?,
        Commands::Pipeline {
            query,
            max_steps,
            supervisor_model,
            developer_model,
            auto_run,
            safe_mode,
            transcript_dir,
        } => {
            let args = PipelineArgs {
                query: query.as_deref(),
                max_steps: *max_steps,
                supervisor_model: supervisor_model.as_deref(),
                developer_model: developer_model.as_deref(),
                auto_run: *auto_run,
                safe_mode: *safe_mode,
                transcript_dir: transcript_dir.as_ref(),
            };
            run_pipeline(&cli, args).await?
        }
        Commands::Check => {
            if !run_check(&cli).await {
                std::process::exit(1);
            }
        }
        Commands::Webhook { path, payload } => run_webhook(path, payload).await?,
    }

    Ok(())
}
