//! Controller tests against `StubGateway`, and `HttpGateway` tests against a
//! local axum backend.

use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use argumem_core::{
  Error, Guard,
  confirm::ClearPhase,
  credential::{Credential, MemoryCredentialStore},
  gateway::{Gateway, fallback},
  load::Load,
  model::NewMemory,
  testing::{Op, StubGateway},
  view::{ViewKind, ViewState},
};
use axum::{
  Json, Router,
  extract::State,
  http::{HeaderMap, StatusCode},
  routing::{delete, get, post},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
  app::{App, Fetched, Pane},
  client::{ApiConfig, HttpGateway},
  form::Outcome,
};

type TestApp = App<StubGateway, MemoryCredentialStore>;

fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

fn ctrl(c: char) -> KeyEvent {
  KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn type_text(app: &mut TestApp, text: &str) {
  for c in text.chars() {
    app.handle_key(key(KeyCode::Char(c)));
  }
}

fn with_key(gw: StubGateway) -> (TestApp, UnboundedReceiver<Fetched>) {
  let key = Credential::new("sk-test").unwrap();
  App::new(gw, MemoryCredentialStore::with(key))
}

/// Apply every response that arrives before the channel goes quiet.
async fn settle(app: &mut TestApp, rx: &mut UnboundedReceiver<Fetched>) {
  while let Ok(Some(msg)) =
    tokio::time::timeout(Duration::from_millis(200), rx.recv()).await
  {
    app.apply(msg);
  }
}

// ─── Credential prompt ───────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credential_opens_a_prompt_only_saving_closes() {
  let (mut app, _rx) = App::new(StubGateway::new(), MemoryCredentialStore::new());
  assert!(app.prompt.is_some());

  app.handle_key(key(KeyCode::Esc));
  assert!(app.prompt.is_some(), "Esc must not dismiss the prompt");

  // Blank input is rejected and the prompt stays.
  app.handle_key(key(KeyCode::Enter));
  assert!(app.prompt.as_ref().unwrap().error.is_some());

  type_text(&mut app, "  sk-abc  ");
  app.handle_key(key(KeyCode::Enter));
  assert!(app.prompt.is_none());
  assert_eq!(app.credential.as_ref().map(Credential::as_str), Some("sk-abc"));
}

#[tokio::test]
async fn clearing_the_saved_key_drops_the_active_credential() {
  let (mut app, _rx) = with_key(StubGateway::new());
  assert!(app.prompt.is_none());

  app.handle_key(key(KeyCode::Char('a')));
  assert_eq!(app.prompt.as_ref().unwrap().input, "sk-test");

  app.handle_key(ctrl('r'));
  assert!(app.prompt.as_ref().unwrap().reveal);

  app.handle_key(ctrl('x'));
  assert!(app.credential.is_none());
  assert!(app.prompt.as_ref().unwrap().input.is_empty());
}

// ─── Detail views ────────────────────────────────────────────────────────────

#[tokio::test]
async fn source_detail_fetches_each_half_once() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());
  app.open_source(1);
  settle(&mut app, &mut rx).await;

  let Pane::SourceDetail(Load::Ready(detail)) = &app.pane else {
    panic!("expected a ready source detail, got {:?}", app.pane);
  };
  assert_eq!(detail.source.title.as_deref(), Some("On Liberty"));
  assert_eq!(detail.quotations.len(), 2);
  assert_eq!(app.gateway().calls(Op::GetSource), 1);
  assert_eq!(app.gateway().calls(Op::QuotationsForSource), 1);
  assert_eq!(app.heading().title, "Source #1");
}

#[tokio::test]
async fn stale_detail_response_never_overwrites_the_current_one() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());
  app.open_quotation(10);
  app.open_quotation(11);

  let mut responses = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
  // Apply the current response first and the stale one last.
  responses.sort_by_key(|msg| match msg {
    Fetched::QuotationDetail(_, Ok(view)) if view.quotation.id == 11 => 0,
    _ => 1,
  });
  for msg in responses {
    app.apply(msg);
  }

  assert_eq!(app.view(), ViewState::QuotationDetail(11));
  let Pane::QuotationDetail(Load::Ready(view)) = &app.pane else {
    panic!("expected a ready quotation view, got {:?}", app.pane);
  };
  assert_eq!(view.quotation.id, 11);
}

#[tokio::test]
async fn detail_failure_renders_one_error_and_back_returns_to_the_list() {
  let gw = StubGateway::seeded();
  gw.fail(Op::QuotationsForSource);
  let (mut app, mut rx) = with_key(gw);

  app.open_source(1);
  settle(&mut app, &mut rx).await;
  assert!(matches!(
    &app.pane,
    Pane::SourceDetail(Load::Failed(m)) if m == "stub failure: QuotationsForSource"
  ));

  app.handle_key(key(KeyCode::Esc));
  assert_eq!(app.view(), ViewState::Sources);
  assert!(matches!(app.pane, Pane::Sources(Load::Pending(_))));
}

#[tokio::test]
async fn quotation_detail_links_to_its_source() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());
  app.open_quotation(10);
  settle(&mut app, &mut rx).await;

  app.handle_key(key(KeyCode::Char('s')));
  assert_eq!(app.view(), ViewState::SourceDetail(1));
}

// ─── Lists ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_rows_open_their_detail_view() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());
  app.handle_key(key(KeyCode::Char('3')));
  assert_eq!(app.view(), ViewState::Sources);
  settle(&mut app, &mut rx).await;

  // Newest first: #2 then #1.
  app.handle_key(key(KeyCode::Char('j')));
  app.handle_key(key(KeyCode::Enter));
  assert_eq!(app.view(), ViewState::SourceDetail(1));
  assert_eq!(app.view().section(), ViewKind::Sources);
}

#[tokio::test]
async fn quotation_filter_with_one_match_opens_it() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());
  app.go_to_view(ViewKind::Quotations);
  settle(&mut app, &mut rx).await;
  assert_eq!(app.visible_quotations().len(), 2);

  app.handle_key(key(KeyCode::Char('/')));
  type_text(&mut app, "coll");
  assert_eq!(app.visible_quotations().len(), 1);
  app.handle_key(key(KeyCode::Enter));
  assert_eq!(app.view(), ViewState::QuotationDetail(10));
}

#[tokio::test]
async fn quotation_row_jumps_to_its_owning_source() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());
  app.go_to_view(ViewKind::Quotations);
  settle(&mut app, &mut rx).await;

  app.handle_key(key(KeyCode::Char('s')));
  assert_eq!(app.view(), ViewState::SourceDetail(1));
}

#[tokio::test]
async fn recent_items_navigate_by_kind() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());
  app.go_to_view(ViewKind::Recent);
  settle(&mut app, &mut rx).await;

  // Feed order: source 2, source 1, quotation 11, quotation 10.
  for _ in 0..2 {
    app.handle_key(key(KeyCode::Down));
  }
  app.handle_key(key(KeyCode::Enter));
  assert_eq!(app.view(), ViewState::QuotationDetail(11));
}

#[tokio::test]
async fn empty_list_is_ready_not_an_error() {
  let (mut app, mut rx) = with_key(StubGateway::new());
  app.go_to_view(ViewKind::Sources);
  settle(&mut app, &mut rx).await;
  assert!(matches!(&app.pane, Pane::Sources(Load::Ready(s)) if s.is_empty()));

  // Nothing to open.
  app.handle_key(key(KeyCode::Enter));
  assert_eq!(app.view(), ViewState::Sources);
}

// ─── Memory form ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_without_credential_issues_no_request() {
  let (mut app, mut rx) = App::new(StubGateway::seeded(), MemoryCredentialStore::new());
  app.form.context = "test".into();
  app.form.content = "X said 'Y'.".into();

  app.submit_memory();
  settle(&mut app, &mut rx).await;

  assert_eq!(app.gateway().calls(Op::CreateSource), 0);
  assert!(app.prompt.is_some());
  assert_eq!(app.status_msg, Guard::NoCredential.to_string());
  assert_eq!(app.form.content, "X said 'Y'.");
}

#[tokio::test]
async fn successful_submit_shows_extracted_quotations_and_refreshes() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());

  // Context has focus first.
  app.handle_key(key(KeyCode::Enter));
  type_text(&mut app, "test");
  app.handle_key(key(KeyCode::Tab));
  type_text(&mut app, "X said 'Y'.");
  app.handle_key(ctrl('s'));
  assert!(app.form.submitting);

  settle(&mut app, &mut rx).await;

  let Some(Outcome::Created {
    source_id,
    quotations,
    ..
  }) = &app.form.outcome
  else {
    panic!("expected a created outcome, got {:?}", app.form.outcome);
  };
  assert_eq!(*source_id, 3);
  assert_eq!(quotations.len(), 1);
  assert!(app.form.content.is_empty());
  assert_eq!(app.gateway().last_credential().as_deref(), Some("sk-test"));
  assert_eq!(app.gateway().calls(Op::Stats), 1);
  assert_eq!(app.stats.ready().map(|s| s.total_sources), Some(3));

  app.handle_key(key(KeyCode::Char('o')));
  assert_eq!(app.view(), ViewState::SourceDetail(3));
}

#[tokio::test]
async fn invalid_draft_is_rejected_before_any_request() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());
  app.form.content = "text".into();

  app.handle_key(ctrl('s'));
  settle(&mut app, &mut rx).await;

  assert_eq!(app.gateway().calls(Op::CreateSource), 0);
  assert_eq!(
    app.form.outcome,
    Some(Outcome::Failed("Context is required".into()))
  );
}

#[tokio::test]
async fn failed_create_ends_the_submission_and_reports_the_error() {
  let gw = StubGateway::seeded();
  gw.fail(Op::CreateSource);
  let (mut app, mut rx) = with_key(gw);
  app.form.context = "test".into();
  app.form.content = "X said 'Y'.".into();

  app.submit_memory();
  assert_eq!(app.status_msg, "Processing memory…");
  settle(&mut app, &mut rx).await;

  assert!(!app.form.submitting);
  assert_eq!(
    app.form.outcome,
    Some(Outcome::Failed("stub failure: CreateSource".into()))
  );
  assert_eq!(app.status_msg, "Error: stub failure: CreateSource");
  // Fields are kept for another attempt and nothing was refreshed.
  assert_eq!(app.form.content, "X said 'Y'.");
  assert_eq!(app.gateway().calls(Op::Stats), 0);
}

#[tokio::test]
async fn quotation_fetch_failure_after_create_still_succeeds() {
  let gw = StubGateway::seeded();
  gw.fail(Op::QuotationsForSource);
  let (mut app, mut rx) = with_key(gw);
  app.form.context = "test".into();
  app.form.content = "X said 'Y'.".into();

  app.submit_memory();
  settle(&mut app, &mut rx).await;

  assert!(matches!(
    &app.form.outcome,
    Some(Outcome::Created { quotations, .. }) if quotations.is_empty()
  ));
}

// ─── Clear database ──────────────────────────────────────────────────────────

#[tokio::test]
async fn confirmed_clear_empties_the_open_list() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());
  app.start();
  app.go_to_view(ViewKind::Sources);
  settle(&mut app, &mut rx).await;
  assert_eq!(app.visible_sources().len(), 2);

  app.handle_key(key(KeyCode::Char('X')));
  assert_eq!(app.confirmer.phase(), ClearPhase::ConfirmPending);
  app.handle_key(key(KeyCode::Char('y')));
  assert_eq!(app.confirmer.phase(), ClearPhase::Clearing);

  // Keys other than the modal's are swallowed while clearing.
  app.handle_key(key(KeyCode::Char('y')));
  app.handle_key(key(KeyCode::Char('4')));
  assert_eq!(app.view(), ViewState::Sources);

  settle(&mut app, &mut rx).await;
  assert_eq!(app.gateway().calls(Op::ClearDatabase), 1);
  assert_eq!(app.confirmer.phase(), ClearPhase::Idle);
  assert!(app.stats.ready().is_some_and(|s| s.is_empty()));
  assert!(matches!(&app.pane, Pane::Sources(Load::Ready(s)) if s.is_empty()));

  // Nothing left to clear.
  app.handle_key(key(KeyCode::Char('X')));
  assert_eq!(app.confirmer.phase(), ClearPhase::Idle);
  assert_eq!(app.status_msg, Guard::NothingToClear.to_string());
}

#[tokio::test]
async fn cancelled_clear_issues_no_request() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());
  app.start();
  settle(&mut app, &mut rx).await;

  app.handle_key(key(KeyCode::Char('X')));
  app.handle_key(key(KeyCode::Esc));
  settle(&mut app, &mut rx).await;

  assert_eq!(app.confirmer.phase(), ClearPhase::Idle);
  assert_eq!(app.gateway().calls(Op::ClearDatabase), 0);
}

#[tokio::test]
async fn failed_clear_returns_to_idle_with_the_message() {
  let gw = StubGateway::seeded();
  gw.fail(Op::ClearDatabase);
  let (mut app, mut rx) = with_key(gw);
  app.start();
  settle(&mut app, &mut rx).await;

  app.request_clear();
  app.confirm_clear();
  settle(&mut app, &mut rx).await;

  assert_eq!(app.confirmer.phase(), ClearPhase::Idle);
  assert_eq!(app.status_msg, "Error: stub failure: ClearDatabase");
  assert!(app.stats.ready().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn clear_is_refused_before_stats_arrive() {
  let (mut app, _rx) = with_key(StubGateway::seeded());
  app.request_clear();
  assert_eq!(app.confirmer.phase(), ClearPhase::Idle);
  assert_eq!(app.status_msg, Guard::StatsUnavailable.to_string());
}

#[tokio::test]
async fn clear_is_refused_when_stats_failed_to_load() {
  let gw = StubGateway::seeded();
  gw.fail(Op::Stats);
  let (mut app, mut rx) = with_key(gw);
  app.start();
  settle(&mut app, &mut rx).await;
  assert!(matches!(app.stats, Load::Failed(_)));

  app.handle_key(key(KeyCode::Char('X')));
  assert_eq!(app.confirmer.phase(), ClearPhase::Idle);
  assert_eq!(app.status_msg, Guard::StatsUnavailable.to_string());
  assert_ne!(app.status_msg, Guard::NothingToClear.to_string());
}

// ─── Navigation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn back_outside_detail_views_does_nothing() {
  let (mut app, _rx) = with_key(StubGateway::seeded());
  app.handle_key(key(KeyCode::Esc));
  assert_eq!(app.view(), ViewState::Add);

  app.go_to_view(ViewKind::Recent);
  app.handle_key(key(KeyCode::Esc));
  assert_eq!(app.view(), ViewState::Recent);
}

#[tokio::test]
async fn refresh_refetches_the_current_view() {
  let (mut app, mut rx) = with_key(StubGateway::seeded());
  app.go_to_view(ViewKind::Sources);
  settle(&mut app, &mut rx).await;

  app.handle_key(key(KeyCode::Char('r')));
  settle(&mut app, &mut rx).await;
  assert_eq!(app.gateway().calls(Op::ListSources), 2);
  assert_eq!(app.gateway().calls(Op::Stats), 1);
}

#[tokio::test]
async fn quit_keys() {
  let (mut app, _rx) = with_key(StubGateway::new());
  assert!(!app.handle_key(key(KeyCode::Char('q'))));
  assert!(!app.handle_key(ctrl('c')));
}

// ─── HttpGateway ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Backend {
  seen_key: Arc<Mutex<Option<String>>>,
}

async fn create_memory(
  State(backend): State<Backend>,
  headers: HeaderMap,
  Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
  let key = headers
    .get("X-OpenAI-API-Key")
    .and_then(|v| v.to_str().ok())
    .map(str::to_string);
  *backend.seen_key.lock().unwrap() = key;

  if body["context"] == "reject" {
    return (
      StatusCode::BAD_REQUEST,
      Json(json!({ "detail": "Invalid OpenAI API key" })),
    );
  }
  (
    StatusCode::OK,
    Json(json!({ "source_id": 7, "message": "Memory added successfully with ID 7" })),
  )
}

fn backend_router(backend: Backend) -> Router {
  Router::new()
    .route("/", get(|| async { Json(json!({ "message": "ArguMem API is running" })) }))
    .route("/memories", post(create_memory))
    .route(
      "/sources",
      get(|| async {
        Json(json!([
          { "id": 2, "timestamp": "2024-05-01T09:00:00", "title": null,
            "context": "Notebook", "raw_text": "..." },
          { "id": 1, "timestamp": "2024-04-30T09:00:00", "title": "On Liberty",
            "context": "Chapter II", "raw_text": "..." },
        ]))
      }),
    )
    .route(
      "/sources/404",
      get(|| async {
        (StatusCode::NOT_FOUND, Json(json!({ "detail": "Source not found" })))
      }),
    )
    .route(
      "/quotations",
      get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    )
    .route("/recent", get(|| async { StatusCode::NOT_FOUND }))
    .route(
      "/sources/recent",
      get(|| async {
        Json(json!([
          { "id": 1, "title": "On Liberty", "created_at": "2024-04-30T09:00:00",
            "last_edited": "2024-04-30T09:00:00" },
        ]))
      }),
    )
    .route("/database/info", get(|| async { "not json" }))
    .route(
      "/database",
      delete(|| async { Json(json!({ "message": "Database cleared" })) }),
    )
    .with_state(backend)
}

async fn serve(backend: Backend) -> HttpGateway {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, backend_router(backend)).await.unwrap();
  });
  HttpGateway::new(ApiConfig {
    base_url: format!("http://{addr}/"),
    timeout:  Duration::from_secs(5),
  })
  .unwrap()
}

#[tokio::test]
async fn http_create_forwards_the_credential_header() {
  let backend = Backend::default();
  let gw = serve(backend.clone()).await;

  let memory = NewMemory::new("X said 'Y'.", "test", "").unwrap();
  let key = Credential::new("sk-live").unwrap();
  let created = gw.create_source(&memory, &key).await.unwrap();

  assert_eq!(created.source_id, 7);
  assert_eq!(backend.seen_key.lock().unwrap().as_deref(), Some("sk-live"));
}

#[tokio::test]
async fn http_error_detail_is_surfaced_verbatim() {
  let gw = serve(Backend::default()).await;

  let memory = NewMemory::new("text", "reject", "").unwrap();
  let key = Credential::new("sk-bad").unwrap();
  let err = gw.create_source(&memory, &key).await.unwrap_err();
  assert_eq!(err, Error::ServerError {
    status:  400,
    message: "Invalid OpenAI API key".into(),
  });

  let err = gw.get_source(404).await.unwrap_err();
  assert_eq!(err, Error::NotFound("Source not found".into()));
}

#[tokio::test]
async fn http_errors_without_detail_use_the_fallback() {
  let gw = serve(Backend::default()).await;

  let err = gw.list_quotations().await.unwrap_err();
  assert_eq!(err.to_string(), fallback::LIST_QUOTATIONS);

  // Undecodable success body.
  let err = gw.stats().await.unwrap_err();
  assert_eq!(err.to_string(), fallback::STATS);
}

#[tokio::test]
async fn http_lists_decode_and_legacy_recent_is_used() {
  let gw = serve(Backend::default()).await;

  let sources = gw.list_sources().await.unwrap();
  assert_eq!(sources.len(), 2);
  assert_eq!(sources[0].display_title(), "Source #2");

  let recent = argumem_core::aggregate::load_recent(&gw).await.unwrap();
  assert_eq!(recent.len(), 1);
  assert_eq!(recent[0].target(), Some(ViewState::SourceDetail(1)));

  gw.clear_database().await.unwrap();
  assert_eq!(gw.health().await.unwrap(), "ArguMem API is running");
}

#[tokio::test]
async fn http_unreachable_backend_is_a_network_failure() {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);

  let gw = HttpGateway::new(ApiConfig {
    base_url: format!("http://{addr}"),
    timeout:  Duration::from_secs(5),
  })
  .unwrap();
  let err = gw.stats().await.unwrap_err();
  assert_eq!(err, Error::NetworkFailure(fallback::STATS.into()));
}
