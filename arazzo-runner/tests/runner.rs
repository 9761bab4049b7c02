use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arazzo_runner::{
    Event, EventSink, ExecutionRegistry, ExecutionStatus, FailureMode, HttpClient, HttpError,
    HttpRequestParts, HttpResponseParts, Runner, RunnerConfig, RunnerError, StepOutcome,
};
use arazzo_runner_core::{parse_document_str, DocumentFormat};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

const WORKFLOW_DOC: &str = r#"
arazzo: "1.0.1"
info:
  title: User content journeys
  version: "1.0.0"
sourceDescriptions:
  - name: jsonplaceholder
    url: https://example.test/openapi.json
    type: openapi
workflows:
  - workflowId: getUserInfo
    inputs:
      type: object
      properties:
        userId:
          type: integer
          default: 1
    steps:
      - stepId: fetchUser
        operationId: getUser
        parameters:
          - name: id
            in: path
            value: $inputs.userId
        successCriteria:
          - condition: $statusCode == 200
        outputs:
          user: $response.body
    outputs:
      user: $steps.fetchUser.outputs.user
  - workflowId: getUserContent
    inputs:
      type: object
      properties:
        userId:
          type: integer
          default: 1
    steps:
      - stepId: fetchUser
        operationId: getUser
        parameters:
          - name: id
            in: path
            value: $inputs.userId
        successCriteria:
          - condition: $statusCode == 200
        outputs:
          user: $response.body
      - stepId: fetchPosts
        operationId: getPostsByUser
        parameters:
          - name: userId
            in: query
            value: $inputs.userId
        outputs:
          posts: $response.body
      - stepId: fetchComments
        operationId: getCommentsByPost
        parameters:
          - name: postId
            in: query
            value: $steps.fetchPosts.outputs.posts[0].id
        outputs:
          comments: $response.body
    outputs:
      user: $steps.fetchUser.outputs.user
      posts: $steps.fetchPosts.outputs.posts
      comments: $steps.fetchComments.outputs.comments
"#;

const OPENAPI_DOC: &str = r#"{
  "openapi": "3.0.3",
  "info": { "title": "JSONPlaceholder", "version": "1.0.0" },
  "servers": [ { "url": "https://api.test" } ],
  "paths": {
    "/users/{id}": { "get": { "operationId": "getUser" } },
    "/posts": { "get": { "operationId": "getPostsByUser" } },
    "/comments": { "get": { "operationId": "getCommentsByPost" } }
  }
}"#;

/// Serves jsonplaceholder-shaped fixtures and records every call.
struct FixtureClient {
    calls: Mutex<Vec<String>>,
    posts_per_user: usize,
    posts_status: u16,
}

impl FixtureClient {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            posts_per_user: 2,
            posts_status: 200,
        }
    }

    fn with_posts(posts_per_user: usize) -> Self {
        Self {
            posts_per_user,
            ..Self::new()
        }
    }

    fn with_posts_status(posts_status: u16) -> Self {
        Self {
            posts_status,
            ..Self::new()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn ok(body: JsonValue) -> HttpResponseParts {
    with_status(200, body)
}

fn with_status(status: u16, body: JsonValue) -> HttpResponseParts {
    HttpResponseParts {
        status,
        headers: BTreeMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]),
        body: serde_json::to_vec(&body).unwrap(),
    }
}

#[async_trait]
impl HttpClient for FixtureClient {
    async fn send(
        &self,
        req: HttpRequestParts,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        let path = req.url.path().to_string();
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", req.method, path));

        let query: BTreeMap<String, String> = req
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if let Some(id) = path.strip_prefix("/users/") {
            let username = match id {
                "1" => "Bret",
                "2" => "Antonette",
                _ => return Ok(with_status(404, json!({ "error": "not found" }))),
            };
            return Ok(ok(json!({ "id": id.parse::<i64>().unwrap(), "username": username })));
        }

        if path == "/posts" {
            if self.posts_status != 200 {
                return Ok(with_status(self.posts_status, json!({ "error": "boom" })));
            }
            let user_id: i64 = query["userId"].parse().unwrap();
            let posts: Vec<JsonValue> = (0..self.posts_per_user)
                .map(|i| {
                    json!({
                        "id": user_id * 10 + i as i64 + 1,
                        "userId": user_id,
                        "title": format!("post {}", i + 1),
                    })
                })
                .collect();
            return Ok(ok(JsonValue::Array(posts)));
        }

        if path == "/comments" {
            let post_id: i64 = query["postId"].parse().unwrap();
            return Ok(ok(json!([
                { "id": 501, "postId": post_id, "body": "first!" },
                { "id": 502, "postId": post_id, "body": "second" },
            ])));
        }

        Ok(with_status(404, json!({ "error": "no route" })))
    }
}

fn build_runner(client: Arc<FixtureClient>) -> Runner {
    build_runner_with_config(client, RunnerConfig::default())
}

fn build_runner_with_config(client: Arc<FixtureClient>, config: RunnerConfig) -> Runner {
    let document = parse_document_str(WORKFLOW_DOC, DocumentFormat::Yaml)
        .unwrap()
        .document;
    let openapi: JsonValue = serde_json::from_str(OPENAPI_DOC).unwrap();
    let sources = BTreeMap::from([("jsonplaceholder".to_string(), openapi)]);
    Runner::new(document, sources)
        .unwrap()
        .with_http_client(client)
        .with_config(config)
}

#[tokio::test]
async fn executes_steps_in_declared_order() {
    let client = Arc::new(FixtureClient::new());
    let runner = build_runner(Arc::clone(&client));

    let result = runner.execute_workflow("getUserContent", None).await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Complete);
    assert_eq!(
        client.calls(),
        vec!["GET /users/1", "GET /posts", "GET /comments"]
    );
}

#[tokio::test]
async fn workflow_outputs_follow_the_response_chain() {
    let client = Arc::new(FixtureClient::new());
    let runner = build_runner(Arc::clone(&client));

    let result = runner.execute_workflow("getUserContent", None).await.unwrap();
    assert_eq!(result.outputs["user"]["username"], json!("Bret"));
    let posts = result.outputs["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    // Comments were fetched for the first post of the fetched list.
    assert_eq!(result.outputs["comments"][0]["postId"], posts[0]["id"]);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn explicit_inputs_override_schema_defaults() {
    let client = Arc::new(FixtureClient::new());
    let runner = build_runner(Arc::clone(&client));

    let result = runner
        .execute_workflow("getUserInfo", Some(json!({ "userId": 2 })))
        .await
        .unwrap();
    assert_eq!(result.status, ExecutionStatus::Complete);
    assert_eq!(result.outputs["user"]["username"], json!("Antonette"));
    assert_eq!(client.calls(), vec!["GET /users/2"]);
}

#[tokio::test]
async fn omitted_inputs_fall_back_to_schema_defaults() {
    let client = Arc::new(FixtureClient::new());
    let runner = build_runner(Arc::clone(&client));

    let result = runner.execute_workflow("getUserInfo", None).await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Complete);
    assert_eq!(result.outputs["user"]["username"], json!("Bret"));
    assert_eq!(client.calls(), vec!["GET /users/1"]);
}

#[tokio::test]
async fn step_by_step_advancement_reports_each_outcome() {
    let client = Arc::new(FixtureClient::new());
    let runner = build_runner(Arc::clone(&client));

    let id = runner.start_workflow("getUserContent", None).await.unwrap();
    assert!(client.calls().is_empty(), "starting must not execute steps");
    assert!(runner.is_advanceable(id).await.unwrap());

    for expected in ["fetchUser", "fetchPosts", "fetchComments"] {
        match runner.execute_next_step(id).await.unwrap() {
            StepOutcome::StepComplete { step_id } => assert_eq!(step_id, expected),
            other => panic!("expected StepComplete, got {other:?}"),
        }
    }

    match runner.execute_next_step(id).await.unwrap() {
        StepOutcome::WorkflowComplete { outputs } => {
            assert_eq!(outputs["user"]["username"], json!("Bret"));
            assert!(outputs.get("posts").is_some());
            assert!(outputs.get("comments").is_some());
        }
        other => panic!("expected WorkflowComplete, got {other:?}"),
    }
    assert!(!runner.is_advanceable(id).await.unwrap());
}

#[tokio::test]
async fn terminal_outcome_replays_without_reexecuting() {
    let client = Arc::new(FixtureClient::new());
    let runner = build_runner(Arc::clone(&client));

    let id = runner.start_workflow("getUserContent", None).await.unwrap();
    for _ in 0..4 {
        runner.execute_next_step(id).await.unwrap();
    }
    let calls_before = client.calls().len();

    for _ in 0..3 {
        match runner.execute_next_step(id).await.unwrap() {
            StepOutcome::WorkflowComplete { .. } => {}
            other => panic!("expected replayed WorkflowComplete, got {other:?}"),
        }
    }
    assert_eq!(client.calls().len(), calls_before);
}

#[tokio::test]
async fn empty_first_array_fails_the_dependent_step() {
    let client = Arc::new(FixtureClient::with_posts(0));
    let runner = build_runner(Arc::clone(&client));

    let result = runner.execute_workflow("getUserContent", None).await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Failed);
    let error = result.error.unwrap();
    assert!(error.contains("fetchComments"), "unexpected error: {error}");
    assert!(error.contains("out of bounds"), "unexpected error: {error}");
    // The failing step never reached the network.
    assert_eq!(client.calls(), vec!["GET /users/1", "GET /posts"]);
}

#[tokio::test]
async fn non_success_status_fails_the_step() {
    let client = Arc::new(FixtureClient::with_posts_status(500));
    let runner = build_runner(Arc::clone(&client));

    let result = runner.execute_workflow("getUserContent", None).await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Failed);
    assert!(result.error.unwrap().contains("fetchPosts"));
    assert_eq!(client.calls(), vec!["GET /users/1", "GET /posts"]);
}

#[tokio::test]
async fn continue_mode_records_failures_and_keeps_advancing() {
    let client = Arc::new(FixtureClient::with_posts_status(500));
    let config = RunnerConfig {
        failure_mode: FailureMode::Continue,
        ..RunnerConfig::default()
    };
    let runner = build_runner_with_config(Arc::clone(&client), config);

    let id = runner.start_workflow("getUserContent", None).await.unwrap();
    assert!(matches!(
        runner.execute_next_step(id).await.unwrap(),
        StepOutcome::StepComplete { .. }
    ));
    assert!(matches!(
        runner.execute_next_step(id).await.unwrap(),
        StepOutcome::StepFailed { .. }
    ));
    // fetchComments depends on fetchPosts outputs and fails in turn.
    match runner.execute_next_step(id).await.unwrap() {
        StepOutcome::StepFailed { step_id, .. } => assert_eq!(step_id, "fetchComments"),
        other => panic!("expected StepFailed, got {other:?}"),
    }
    assert!(matches!(
        runner.execute_next_step(id).await.unwrap(),
        StepOutcome::Failed { .. }
    ));

    let snap = runner.execution_snapshot(id).await.unwrap();
    assert_eq!(snap.status, ExecutionStatus::Failed);
    assert_eq!(snap.completed_steps, vec!["fetchUser"]);
    assert_eq!(snap.failed_steps.len(), 2);
}

#[tokio::test]
async fn unknown_workflow_is_rejected_before_any_state_is_created() {
    let client = Arc::new(FixtureClient::new());
    let runner = build_runner(client);

    let err = runner.start_workflow("noSuchWorkflow", None).await.unwrap_err();
    assert!(matches!(err, RunnerError::UnknownWorkflow(id) if id == "noSuchWorkflow"));
}

#[tokio::test]
async fn unknown_execution_id_is_rejected() {
    let client = Arc::new(FixtureClient::new());
    let runner = build_runner(client);

    let err = runner.execute_next_step(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, RunnerError::UnknownExecution(_)));
}

#[tokio::test]
async fn unknown_operation_fails_construction() {
    let doc_text = WORKFLOW_DOC.replace("operationId: getUser", "operationId: missingOp");
    let document = parse_document_str(&doc_text, DocumentFormat::Yaml)
        .unwrap()
        .document;
    let openapi: JsonValue = serde_json::from_str(OPENAPI_DOC).unwrap();
    let sources = BTreeMap::from([("jsonplaceholder".to_string(), openapi)]);

    let err = Runner::new(document, sources).err().unwrap();
    assert!(matches!(err, RunnerError::Source(_)));
}

#[tokio::test]
async fn cancelled_execution_refuses_to_advance() {
    let client = Arc::new(FixtureClient::new());
    let runner = build_runner(Arc::clone(&client));

    let id = runner.start_workflow("getUserContent", None).await.unwrap();
    runner.execute_next_step(id).await.unwrap();
    runner.cancel(id).await.unwrap();

    assert!(!runner.is_advanceable(id).await.unwrap());
    let err = runner.execute_next_step(id).await.unwrap_err();
    assert!(matches!(err, RunnerError::Cancelled(cancelled) if cancelled == id));
    assert_eq!(client.calls().len(), 1);

    let snap = runner.execution_snapshot(id).await.unwrap();
    assert_eq!(snap.status, ExecutionStatus::Cancelled);
}

#[tokio::test]
async fn snapshot_tracks_cursor_and_completed_steps() {
    let client = Arc::new(FixtureClient::new());
    let runner = build_runner(Arc::clone(&client));

    let id = runner.start_workflow("getUserContent", None).await.unwrap();
    runner.execute_next_step(id).await.unwrap();
    runner.execute_next_step(id).await.unwrap();

    let snap = runner.execution_snapshot(id).await.unwrap();
    assert_eq!(snap.workflow_id, "getUserContent");
    assert_eq!(snap.status, ExecutionStatus::InProgress);
    assert_eq!(snap.cursor, 2);
    assert_eq!(snap.completed_steps, vec!["fetchUser", "fetchPosts"]);
}

#[tokio::test]
async fn concurrent_executions_do_not_share_state() {
    let client = Arc::new(FixtureClient::new());
    let runner = Arc::new(build_runner(Arc::clone(&client)));

    let a = runner.start_workflow("getUserInfo", None).await.unwrap();
    let b = runner
        .start_workflow("getUserInfo", Some(json!({ "userId": 2 })))
        .await
        .unwrap();
    assert_ne!(a, b);

    let (ra, rb) = tokio::join!(
        async {
            let r = Arc::clone(&runner);
            loop {
                if let StepOutcome::WorkflowComplete { outputs } =
                    r.execute_next_step(a).await.unwrap()
                {
                    break outputs;
                }
            }
        },
        async {
            let r = Arc::clone(&runner);
            loop {
                if let StepOutcome::WorkflowComplete { outputs } =
                    r.execute_next_step(b).await.unwrap()
                {
                    break outputs;
                }
            }
        },
    );
    assert_eq!(ra["user"]["username"], json!("Bret"));
    assert_eq!(rb["user"]["username"], json!("Antonette"));
}

#[tokio::test]
async fn removed_execution_is_gone() {
    let client = Arc::new(FixtureClient::new());
    let runner = build_runner(client);

    let id = runner.start_workflow("getUserContent", None).await.unwrap();
    runner.remove_execution(id).await.unwrap();
    assert!(matches!(
        runner.execution_snapshot(id).await.unwrap_err(),
        RunnerError::UnknownExecution(_)
    ));
}

#[tokio::test]
async fn from_file_loads_relative_source_descriptions() {
    let dir = tempfile::tempdir().unwrap();

    let mut api = std::fs::File::create(dir.path().join("openapi.json")).unwrap();
    api.write_all(OPENAPI_DOC.as_bytes()).unwrap();

    let doc_text = WORKFLOW_DOC.replace("https://example.test/openapi.json", "openapi.json");
    let doc_path = dir.path().join("journeys.arazzo.yaml");
    std::fs::write(&doc_path, doc_text).unwrap();

    let client = Arc::new(FixtureClient::new());
    let runner = Runner::from_file(&doc_path)
        .await
        .unwrap()
        .with_http_client(client.clone());

    let result = runner.execute_workflow("getUserInfo", None).await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Complete);
    assert_eq!(result.outputs["user"]["username"], json!("Bret"));
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| match e {
                Event::WorkflowStarted { .. } => "workflow.started",
                Event::StepStarted { .. } => "step.started",
                Event::StepCompleted { .. } => "step.completed",
                Event::StepFailed { .. } => "step.failed",
                Event::WorkflowCompleted { .. } => "workflow.completed",
                Event::WorkflowFailed { .. } => "workflow.failed",
                Event::ExecutionCancelled { .. } => "execution.cancelled",
            })
            .collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[tokio::test]
async fn event_sink_observes_the_workflow_lifecycle() {
    let client = Arc::new(FixtureClient::new());
    let sink = Arc::new(RecordingSink::default());
    let runner = build_runner(Arc::clone(&client)).with_event_sink(sink.clone());

    let result = runner.execute_workflow("getUserInfo", None).await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Complete);
    assert_eq!(
        sink.kinds(),
        vec![
            "workflow.started",
            "step.started",
            "step.completed",
            "workflow.completed",
        ]
    );
}

#[tokio::test]
async fn shared_execution_registry_tracks_live_executions() {
    let client = Arc::new(FixtureClient::new());
    let registry = Arc::new(ExecutionRegistry::new());
    let runner = build_runner(Arc::clone(&client)).with_execution_registry(Arc::clone(&registry));

    assert!(registry.is_empty().await);

    let id = runner.start_workflow("getUserContent", None).await.unwrap();
    assert_eq!(registry.len().await, 1);
    assert!(registry.get(id).await.is_some());

    runner.remove_execution(id).await.unwrap();
    assert!(registry.is_empty().await);
}
