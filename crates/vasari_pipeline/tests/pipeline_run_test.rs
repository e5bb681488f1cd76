//! End-to-end orchestrator behavior against scripted backends.

use std::sync::Arc;
use std::time::Duration;
use vasari_client::ScriptedCompletion;
use vasari_core::{RunId, Schema};
use vasari_interface::{RunStatus, StageStatus, StageStore, StoreKey};
use vasari_pipeline::{CompletionController, Pipeline, PipelineRunner, StageSpec};
use vasari_store::MemoryStore;

fn fast_controller() -> CompletionController {
    CompletionController::new().with_backoff_base(1)
}

fn outline_response() -> String {
    r#"{"title":"Lisbon","chapters":["harbor","hills"]}"#.to_string()
}

fn chapters_response() -> String {
    r#"{"sections":[{"name":"harbor","body":"..."}]}"#.to_string()
}

/// outline -> chapters, chapters consumes the outline title.
fn two_stage_pipeline() -> Pipeline {
    let outline = StageSpec::builder("outline")
        .prompt_text("Outline a guide. Output ONLY valid JSON.")
        .schema(Schema::new(["title", "chapters"]))
        .build()
        .unwrap();

    let chapters = StageSpec::builder("chapters")
        .depends_on(["outline"])
        .prompt(|inputs| {
            let title = inputs
                .get_path("outline.title")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(format!("Expand the guide titled '{title}'."))
        })
        .schema(Schema::new(["sections"]))
        .build()
        .unwrap();

    Pipeline::new(vec![outline, chapters]).unwrap()
}

#[tokio::test]
async fn test_run_completes_in_declared_order() {
    let backend = Arc::new(ScriptedCompletion::new([
        outline_response(),
        chapters_response(),
    ]));
    let store = Arc::new(MemoryStore::new());
    let runner = PipelineRunner::new(backend.clone(), store.clone())
        .with_controller(fast_controller());

    let report = runner
        .run(&RunId::new("run-1"), &two_stage_pipeline())
        .await
        .unwrap();

    assert_eq!(report.overall, RunStatus::Completed);
    assert_eq!(report.stages[0].status, StageStatus::Completed);
    assert_eq!(report.stages[1].status, StageStatus::Completed);
    assert_eq!(backend.call_count(), 2);

    // The dependency record flowed into the second stage's prompt
    assert!(backend.prompts()[1].contains("Lisbon"));
}

#[tokio::test]
async fn test_second_run_reads_store_and_makes_no_calls() {
    let store = Arc::new(MemoryStore::new());
    let run_id = RunId::new("run-1");

    let first_backend = Arc::new(ScriptedCompletion::new([
        outline_response(),
        chapters_response(),
    ]));
    let first_report = PipelineRunner::new(first_backend, store.clone())
        .with_controller(fast_controller())
        .run(&run_id, &two_stage_pipeline())
        .await
        .unwrap();

    // Nothing scripted: any completion call would fail the run
    let second_backend = Arc::new(ScriptedCompletion::new([]));
    let second_report = PipelineRunner::new(second_backend.clone(), store.clone())
        .with_controller(fast_controller())
        .run(&run_id, &two_stage_pipeline())
        .await
        .unwrap();

    assert_eq!(second_backend.call_count(), 0);
    assert_eq!(second_report, first_report);
}

#[tokio::test]
async fn test_failed_stage_halts_run_and_persists_nothing() {
    // outline succeeds; chapters returns prose three times and exhausts
    let backend = Arc::new(ScriptedCompletion::new([
        outline_response(),
        "no payload".to_string(),
        "still no payload".to_string(),
        "nothing".to_string(),
    ]));
    let store = Arc::new(MemoryStore::new());
    let run_id = RunId::new("run-1");

    let report = PipelineRunner::new(backend, store.clone())
        .with_controller(fast_controller())
        .run(&run_id, &two_stage_pipeline())
        .await
        .unwrap();

    assert_eq!(report.overall, RunStatus::Failed);
    assert_eq!(report.failing_stage().unwrap().stage_id, "chapters");
    assert!(report.failing_stage().unwrap().error.is_some());

    // The failed stage left no entry behind
    let key = StoreKey::new(run_id, "chapters");
    assert_eq!(store.get(&key).await.unwrap(), None);
}

#[tokio::test]
async fn test_rerun_resumes_exactly_at_failed_stage() {
    let store = Arc::new(MemoryStore::new());
    let run_id = RunId::new("run-1");

    let failing = Arc::new(ScriptedCompletion::new([
        outline_response(),
        "garbage".to_string(),
        "garbage".to_string(),
        "garbage".to_string(),
    ]));
    PipelineRunner::new(failing, store.clone())
        .with_controller(fast_controller())
        .run(&run_id, &two_stage_pipeline())
        .await
        .unwrap();

    let retry = Arc::new(ScriptedCompletion::new([chapters_response()]));
    let report = PipelineRunner::new(retry.clone(), store.clone())
        .with_controller(fast_controller())
        .run(&run_id, &two_stage_pipeline())
        .await
        .unwrap();

    assert_eq!(report.overall, RunStatus::Completed);
    // Only the previously-failed stage executed
    assert_eq!(retry.call_count(), 1);
}

/// a -> b (guarded) -> c; the guard is false, so b and everything
/// downstream of b skips without a completion call.
fn guarded_pipeline() -> Pipeline {
    let a = StageSpec::builder("a")
        .prompt_text("Produce the flags. Output ONLY valid JSON.")
        .schema(Schema::new(["include_extras"]))
        .build()
        .unwrap();

    let b = StageSpec::builder("b")
        .depends_on(["a"])
        .prompt_text("Expand the extras.")
        .applicable_when(|inputs| {
            inputs
                .get_path("a.include_extras")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
        })
        .build()
        .unwrap();

    let c = StageSpec::builder("c")
        .depends_on(["b"])
        .prompt_text("Summarize the extras.")
        .build()
        .unwrap();

    Pipeline::new(vec![a, b, c]).unwrap()
}

#[tokio::test]
async fn test_inapplicable_stage_skips_transitive_dependents() {
    let backend = Arc::new(ScriptedCompletion::new([
        r#"{"include_extras": false}"#.to_string(),
    ]));
    let store = Arc::new(MemoryStore::new());

    let report = PipelineRunner::new(backend.clone(), store.clone())
        .with_controller(fast_controller())
        .run(&RunId::new("run-1"), &guarded_pipeline())
        .await
        .unwrap();

    assert_eq!(report.overall, RunStatus::PartiallyComplete);
    assert_eq!(report.stages[1].status, StageStatus::SkippedByApplicability);
    assert_eq!(report.stages[2].status, StageStatus::SkippedByDependency);
    // Only stage a reached the backend
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_resumed_skips_keep_their_reason() {
    let store = Arc::new(MemoryStore::new());
    let run_id = RunId::new("run-1");

    let backend = Arc::new(ScriptedCompletion::new([
        r#"{"include_extras": false}"#.to_string(),
    ]));
    let first = PipelineRunner::new(backend, store.clone())
        .with_controller(fast_controller())
        .run(&run_id, &guarded_pipeline())
        .await
        .unwrap();

    let second = PipelineRunner::new(Arc::new(ScriptedCompletion::new([])), store.clone())
        .with_controller(fast_controller())
        .run(&run_id, &guarded_pipeline())
        .await
        .unwrap();

    assert_eq!(second, first);
    assert_eq!(second.stages[1].status, StageStatus::SkippedByApplicability);
    assert_eq!(second.stages[2].status, StageStatus::SkippedByDependency);
}

#[tokio::test]
async fn test_expired_entries_re_execute() {
    let store = Arc::new(MemoryStore::new());
    let run_id = RunId::new("run-1");

    let backend = Arc::new(ScriptedCompletion::new([
        outline_response(),
        chapters_response(),
    ]));
    PipelineRunner::new(backend, store.clone())
        .with_controller(fast_controller())
        .with_ttl(Duration::from_millis(5))
        .run(&run_id, &two_stage_pipeline())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(25)).await;

    let fresh = Arc::new(ScriptedCompletion::new([
        outline_response(),
        chapters_response(),
    ]));
    let report = PipelineRunner::new(fresh.clone(), store.clone())
        .with_controller(fast_controller())
        .run(&run_id, &two_stage_pipeline())
        .await
        .unwrap();

    assert_eq!(report.overall, RunStatus::Completed);
    assert_eq!(fresh.call_count(), 2);
}

#[tokio::test]
async fn test_permanent_upstream_failure_marks_stage_failed() {
    use vasari_error::{CompletionError, CompletionErrorKind};

    let backend = Arc::new(ScriptedCompletion::from_results([Err(
        CompletionError::new(CompletionErrorKind::Permanent("bad credentials".to_string())),
    )]));
    let store = Arc::new(MemoryStore::new());

    let report = PipelineRunner::new(backend, store)
        .with_controller(fast_controller())
        .run(&RunId::new("run-1"), &two_stage_pipeline())
        .await
        .unwrap();

    assert_eq!(report.overall, RunStatus::Failed);
    assert_eq!(report.failing_stage().unwrap().stage_id, "outline");
    assert_eq!(report.stages[1].status, StageStatus::Pending);
}

#[tokio::test]
async fn test_artifacts_written_for_completed_stages() {
    use tempfile::TempDir;
    use vasari_render::ArtifactWriter;

    let temp_dir = TempDir::new().unwrap();
    let backend = Arc::new(ScriptedCompletion::new([
        outline_response(),
        chapters_response(),
    ]));
    let store = Arc::new(MemoryStore::new());

    let runner = PipelineRunner::new(backend, store)
        .with_controller(fast_controller())
        .with_writer(ArtifactWriter::new(temp_dir.path()).unwrap());

    runner
        .run(&RunId::new("run-1"), &two_stage_pipeline())
        .await
        .unwrap();

    assert!(temp_dir
        .path()
        .join("run-1")
        .join("outline")
        .join("record.json")
        .exists());
    assert!(temp_dir
        .path()
        .join("run-1")
        .join("chapters")
        .join("record.json")
        .exists());
}
