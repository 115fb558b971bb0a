//! Play twenty questions between two LLM agents, or evaluate many games.
//!
//! Reads the API key from the `OPENROUTER_KEY` environment variable.
//!
//! # Examples
//!
//! ```sh
//! # One game with the default topic and prompts
//! twentyq play
//!
//! # A specific topic on a specific model, no closing remark
//! twentyq play --topic "polar bear" --model anthropic/claude-sonnet-4 --no-closing-remark
//!
//! # Parameters from a JSON file
//! twentyq play --params game.json
//!
//! # Sweep guesser temperatures, 20 games per variant
//! twentyq eval guessing-temperature --trials 20 --output-dir evals
//!
//! # Keep going when individual games fail
//! twentyq eval topic --exclude-failed
//! ```

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use twentyq::prelude::*;

const HOST_COLOR: &str = "\x1b[93m";
const GUESSER_COLOR: &str = "\x1b[94m";
const LOG_COLOR: &str = "\x1b[95m";
const RESET: &str = "\x1b[0m";

/// Play twenty questions between two LLM agents.
///
/// Reads the API key from the OPENROUTER_KEY environment variable.
#[derive(Parser)]
#[command(name = "twentyq", version)]
struct Cli {
    /// OpenRouter API key
    #[arg(long, env = "OPENROUTER_KEY", hide_env_values = true)]
    api_key: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play one game with live console output
    Play(PlayArgs),
    /// Run every variant of a sweep and write one record per variant
    Eval(EvalArgs),
}

#[derive(Args)]
struct GameArgs {
    /// Model used by both agents
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Guesser turns allowed before the game is lost
    #[arg(long, default_value_t = DEFAULT_MAX_QUESTIONS)]
    max_questions: u32,

    /// Skip the host's closing remark after the game ends
    #[arg(long)]
    no_closing_remark: bool,
}

impl GameArgs {
    fn config(&self) -> GameConfig {
        GameConfig::default()
            .with_model(&self.model)
            .with_max_questions(self.max_questions)
            .with_closing_remark(!self.no_closing_remark)
    }
}

#[derive(Args)]
struct PlayArgs {
    /// Secret topic (overrides the one in --params)
    #[arg(long)]
    topic: Option<String>,

    /// JSON file with game parameters (camelCase keys)
    #[arg(long)]
    params: Option<PathBuf>,

    #[command(flatten)]
    game: GameArgs,
}

#[derive(Args)]
struct EvalArgs {
    /// Which parameter to sweep
    #[arg(value_enum)]
    sweep: Sweep,

    /// Games per variant
    #[arg(long, default_value_t = 10)]
    trials: usize,

    /// Confidence level of the success-rate interval
    #[arg(long, default_value_t = 0.95)]
    confidence: f64,

    /// Games in flight at once [default: available parallelism]
    #[arg(long)]
    concurrency: Option<usize>,

    /// Directory the result files are written to
    #[arg(long, default_value = "evals")]
    output_dir: PathBuf,

    /// Drop failed games instead of failing the whole variant
    #[arg(long)]
    exclude_failed: bool,

    #[command(flatten)]
    game: GameArgs,
}

/// Prints each utterance color-coded by role, plus game-level log lines.
struct ConsoleHandler {
    host: String,
    guesser: String,
}

impl EventHandler for ConsoleHandler {
    fn on_event(&self, event: &GameEvent<'_>) {
        match event {
            GameEvent::Utterance { agent, content, .. } => {
                let color = if *agent == self.host {
                    HOST_COLOR
                } else {
                    GUESSER_COLOR
                };
                println!("{color}{agent}: {content}{RESET}");
            }
            GameEvent::Guessed {
                number_of_questions,
            } => {
                println!(
                    "{LOG_COLOR}{} guessed the secret topic in {number_of_questions} questions!{RESET}",
                    self.guesser
                );
            }
            GameEvent::BudgetExhausted { .. } => {
                println!("{LOG_COLOR}Game over, too many questions asked.{RESET}");
            }
            GameEvent::Interrupted { .. } => {
                println!("{LOG_COLOR}Stopping game.{RESET}");
            }
            _ => {}
        }
    }
}

fn client(api_key: String) -> Result<OpenRouterClient, String> {
    OpenRouterClient::new(api_key).map_err(|e| format!("failed to create API client: {e}"))
}

/// Ctrl-C cancels the returned token; running games stop at their next
/// gateway call.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });
    token
}

async fn play(api_key: String, args: PlayArgs) -> Result<(), String> {
    let mut params = match &args.params {
        Some(path) => GameParameters::from_json_file(path).map_err(|e| e.to_string())?,
        None => GameParameters::new("pear")
            .with_host_instructions(default_host_instructions())
            .with_guessing_instructions(default_guessing_instructions()),
    };
    if let Some(topic) = args.topic {
        params = params.with_topic(topic);
    }

    let gateway = client(api_key)?;
    let config = args.game.config();
    let handler = CompositeEventHandler::new()
        .with(LoggingHandler)
        .with(ConsoleHandler {
            host: config.host_name.clone(),
            guesser: config.guesser_name.clone(),
        });

    let result = GameEngine::new(&gateway, params, config)
        .map_err(|e| e.to_string())?
        .with_event_handler(&handler)
        .with_cancellation(interrupt_token())
        .run()
        .await
        .map_err(|e| e.to_string())?;

    println!("Game ID: {}", result.id);
    println!("Game success: {}", result.success);
    match result.number_of_questions {
        Some(n) => println!("Number of questions: {n}"),
        None => println!("Number of questions: none"),
    }
    Ok(())
}

async fn eval(api_key: String, args: EvalArgs) -> Result<(), String> {
    let policy = if args.exclude_failed {
        FailurePolicy::ExcludeFailed
    } else {
        FailurePolicy::AbortBatch
    };
    let mut config = EvalConfig::default()
        .with_trials(args.trials)
        .with_confidence(args.confidence)
        .with_output_dir(&args.output_dir)
        .with_failure_policy(policy)
        .with_game_config(args.game.config());
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    config.validate().map_err(|e| e.to_string())?;

    let gateway: Arc<dyn CompletionGateway> = Arc::new(client(api_key)?);
    let evaluator = Evaluator::new(gateway, config).with_cancellation(interrupt_token());

    let mut failed = 0usize;
    for (variant, outcome) in evaluator.run_sweep(args.sweep).await {
        match outcome {
            Ok(path) => eprintln!(
                "  {} = {} -> {}",
                variant.parameter,
                variant.value,
                path.display()
            ),
            Err(e) => {
                failed += 1;
                eprintln!("  {} = {} failed: {e}", variant.parameter, variant.value);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} variant(s) failed"));
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Play(args) => play(cli.api_key, args).await,
        Command::Eval(args) => eval(cli.api_key, args).await,
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
