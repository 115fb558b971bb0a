//! Evaluation harness runs against scripted gateways, writing into temp dirs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use tokio_util::sync::CancellationToken;
use twentyq::agent::prompt::HOST_PREAMBLE;
use twentyq::eval::record::file_name;
use twentyq::eval::{Variant, binomial_interval};
use twentyq::prelude::*;

fn variant(topic: &str) -> Variant {
    Variant::new(
        "topic",
        json!(topic),
        GameParameters::new(topic)
            .with_host_instructions(default_host_instructions())
            .with_guessing_instructions(default_guessing_instructions()),
    )
}

fn config(dir: &std::path::Path) -> EvalConfig {
    EvalConfig::default()
        .with_trials(8)
        .with_concurrency(4)
        .with_output_dir(dir)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn always_winning_guesser_has_degenerate_interval_at_one() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Arc::new(ScriptedGateway::constant("Go ahead.", "Is it an apple?"));
    let evaluator = Evaluator::new(gateway.clone(), config(dir.path()));

    let record = evaluator.run_variant(&variant("apple")).await.unwrap();
    assert_eq!(record.n_runs, 8);
    assert_eq!(record.success_rate, 1.0);
    assert_eq!((record.ci_lower, record.ci_upper), (1.0, 1.0));
    assert_eq!(record.mean_number_of_questions, Some(1.0));
    assert_eq!(record.failed_trials, 0);
    // Three calls per game: host, winning guess, closing remark.
    assert_eq!(gateway.calls(), 8 * 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn never_winning_guesser_has_no_mean() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Arc::new(ScriptedGateway::constant("No.", "Is it a vegetable?"));
    let game = GameConfig::default().with_max_questions(3);
    let evaluator = Evaluator::new(gateway, config(dir.path()).with_game_config(game));

    let record = evaluator.run_variant(&variant("strawberry")).await.unwrap();
    assert_eq!(record.success_rate, 0.0);
    assert_eq!((record.ci_lower, record.ci_upper), (0.0, 0.0));
    assert_eq!(record.mean_number_of_questions, None);
    assert!(
        record
            .game_results
            .iter()
            .all(|r| !r.success && r.number_of_questions == Some(4))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn evaluate_writes_one_record_per_variant() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Arc::new(ScriptedGateway::constant("Yes.", "Polar bear?"));
    let evaluator = Evaluator::new(gateway, config(dir.path()));

    let path = evaluator.evaluate(&variant("polar bear")).await.unwrap();
    assert_eq!(path, dir.path().join(file_name("topic", &json!("polar bear"))));
    assert!(path.ends_with("test_results_topic_polar_bear.json"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["parameter"], "topic");
    assert_eq!(json["value"], "polar bear");
    assert_eq!(json["nRuns"], 8);
    assert_eq!(json["confidence"], 0.95);
    assert_eq!(json["successRate"], 1.0);
    assert_eq!(json["gameVariables"]["topic"], "polar bear");
    let results = json["gameResults"].as_array().unwrap();
    assert_eq!(results.len(), 8);
    assert_eq!(results[0]["numberOfQuestions"], 1);
    assert_eq!(results[0]["chatHistory"][0]["role"], "Host Agent");
    assert_eq!(results[0]["chatHistory"][1]["content"], "Polar bear?");

    // Same variant again overwrites rather than adding a file.
    evaluator.evaluate(&variant("polar bear")).await.unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn abort_batch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let failures = Arc::new(AtomicUsize::new(0));
    let f = failures.clone();
    // Every fourth host opening fails.
    let gateway = Arc::new(ScriptedGateway::new(
        move |turn| {
            if turn == 0 && f.fetch_add(1, Ordering::SeqCst) % 4 == 0 {
                Err(GatewayError::Http {
                    status: 429,
                    body: "slow down".into(),
                })
            } else {
                Ok("Yes.".into())
            }
        },
        |_| Ok("Apple!".into()),
    ));
    let evaluator = Evaluator::new(gateway, config(&out));

    let err = evaluator.evaluate(&variant("apple")).await.unwrap_err();
    assert!(matches!(err, EvalError::Trial { .. }));
    assert!(!out.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exclude_failed_aggregates_the_survivors() {
    let dir = tempfile::tempdir().unwrap();
    let openings = Arc::new(AtomicUsize::new(0));
    let o = openings.clone();
    // Exactly two of the eight games fail on their opening call.
    let gateway = Arc::new(ScriptedGateway::new(
        move |turn| {
            if turn == 0 && o.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(GatewayError::Api("provider error".into()))
            } else {
                Ok("Yes.".into())
            }
        },
        |_| Ok("Is it an apple?".into()),
    ));
    let evaluator = Evaluator::new(
        gateway,
        config(dir.path()).with_failure_policy(FailurePolicy::ExcludeFailed),
    );

    let record = evaluator.run_variant(&variant("apple")).await.unwrap();
    assert_eq!(record.n_runs, 6);
    assert_eq!(record.failed_trials, 2);
    assert_eq!(record.success_rate, 1.0);
    assert_eq!(record.game_results.len(), 6);
}

/// Alternates games between a guesser that names the topic at once and one
/// that never does. Which kind a game gets is fixed by the host's opening
/// line, so concurrent games cannot interfere.
struct AlternatingGateway {
    openings: AtomicUsize,
}

impl CompletionGateway for AlternatingGateway {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> GatewayFuture<'a> {
        let reply = if request.instructions.starts_with(HOST_PREAMBLE) {
            if request.transcript.is_empty() {
                let n = self.openings.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 { "Even." } else { "Odd." }
            } else {
                "No."
            }
        } else if request.transcript[0].content == "Even." {
            "Is it a notebook?"
        } else {
            "Is it a pen?"
        };
        Box::pin(async move { Ok(reply.to_string()) })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_outcomes_match_binomial_interval() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Arc::new(AlternatingGateway {
        openings: AtomicUsize::new(0),
    });
    let evaluator = Evaluator::new(gateway, config(dir.path()).with_trials(10));

    let record = evaluator.run_variant(&variant("notebook")).await.unwrap();
    assert_eq!(record.success_rate, 0.5);
    assert_eq!((record.ci_lower, record.ci_upper), (0.2, 0.8));
    assert_eq!(
        (record.ci_lower, record.ci_upper),
        binomial_interval(10, 0.5, 0.95)
    );
    assert_eq!(record.mean_number_of_questions, Some(1.0));
    let losses: Vec<_> = record.game_results.iter().filter(|r| !r.success).collect();
    assert_eq!(losses.len(), 5);
    assert!(losses.iter().all(|r| r.number_of_questions == Some(21)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_sweep_starts_no_variants() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Arc::new(ScriptedGateway::constant("Yes.", "Penguin?"));
    let token = CancellationToken::new();
    token.cancel();
    let evaluator = Evaluator::new(gateway.clone(), config(dir.path())).with_cancellation(token);

    let outcomes = evaluator.run_sweep(Sweep::Topic).await;
    assert!(outcomes.is_empty());
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn topic_sweep_writes_every_variant() {
    let dir = tempfile::tempdir().unwrap();
    // The guesser lists every sweep topic at once, so each game wins.
    let gateway = Arc::new(ScriptedGateway::constant(
        "Yes.",
        "Penguin, polar bear, apple, strawberry, or notebook?",
    ));
    let evaluator = Evaluator::new(gateway, config(dir.path()).with_trials(3));

    let outcomes = evaluator.run_sweep(Sweep::Topic).await;
    assert_eq!(outcomes.len(), 5);
    for (variant, outcome) in outcomes {
        let path = outcome.unwrap();
        assert!(path.exists(), "missing record for {}", variant.value);
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 5);
}

/// Host says no; the guesser asks two questions, then never answers again.
struct StallingGuesser;

impl CompletionGateway for StallingGuesser {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> GatewayFuture<'a> {
        let host = request.instructions.starts_with(HOST_PREAMBLE);
        let asked = request
            .transcript
            .iter()
            .filter(|m| m.role == twentyq::MessageRole::Assistant)
            .count();
        Box::pin(async move {
            if !host && asked >= 2 {
                std::future::pending::<()>().await;
            }
            Ok(if host { "No." } else { "Is it a vegetable?" }.to_string())
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelled_variant_keeps_the_previous_record() {
    let dir = tempfile::tempdir().unwrap();
    let previous = dir.path().join(file_name("topic", &json!("apple")));
    std::fs::write(&previous, "{}").unwrap();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        trigger.cancel();
    });
    let evaluator = Evaluator::new(Arc::new(StallingGuesser), config(dir.path()).with_trials(4))
        .with_cancellation(token);

    let err = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        evaluator.evaluate(&variant("apple")),
    )
    .await
    .expect("cancelled evaluation should return promptly")
    .unwrap_err();
    assert!(matches!(err, EvalError::Cancelled));
    assert_eq!(std::fs::read_to_string(&previous).unwrap(), "{}");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
