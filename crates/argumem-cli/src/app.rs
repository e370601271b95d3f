//! Application controller: owns the view state and dispatches key events.
//!
//! Network calls never run on the UI loop. Each one is spawned onto tokio and
//! reports back as a [`Fetched`] message; the loop hands those to
//! [`App::apply`]. Every view activation draws a new generation, so a
//! response for a view the user has already left finds no matching pending
//! slot and is dropped.

use std::{future::Future, sync::Arc};

use argumem_core::{
  Error, Guard, Result,
  aggregate::{
    QuotationView, SourceDetail, load_quotation_view, load_recent,
    load_source_detail,
  },
  confirm::{ClearConfirmer, ClearPhase, clear_and_refresh},
  credential::{Credential, CredentialStore},
  gateway::Gateway,
  load::{Generation, GenerationCounter, Load},
  model::{
    DatabaseStats, MemoryCreated, Quotation, QuotationId, Source, SourceId,
  },
  recent::RecentItem,
  view::{Heading, Navigator, ViewKind, ViewState},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::form::MemoryForm;

// ─── Pane ─────────────────────────────────────────────────────────────────────

/// Data held by the active view. Always matches `Navigator::current()`.
#[derive(Debug)]
pub enum Pane {
  Add,
  Sources(Load<Vec<Source>>),
  Quotations(Load<Vec<Quotation>>),
  Recent(Load<Vec<RecentItem>>),
  SourceDetail(Load<SourceDetail>),
  QuotationDetail(Load<QuotationView>),
}

// ─── Messages ─────────────────────────────────────────────────────────────────

/// Results reported back by spawned requests.
#[derive(Debug)]
pub enum Fetched {
  Sources(Generation, Result<Vec<Source>>),
  Quotations(Generation, Result<Vec<Quotation>>),
  Recent(Generation, Result<Vec<RecentItem>>),
  SourceDetail(Generation, Result<SourceDetail>),
  QuotationDetail(Generation, Result<QuotationView>),
  Stats(Generation, Result<DatabaseStats>),
  Created(Result<(MemoryCreated, Vec<Quotation>)>),
  Cleared(Result<DatabaseStats>),
  Health(Result<String>),
}

impl Fetched {
  fn label(&self) -> &'static str {
    match self {
      Self::Sources(..) => "sources",
      Self::Quotations(..) => "quotations",
      Self::Recent(..) => "recent",
      Self::SourceDetail(..) => "source detail",
      Self::QuotationDetail(..) => "quotation detail",
      Self::Stats(..) => "stats",
      Self::Created(_) => "created",
      Self::Cleared(_) => "cleared",
      Self::Health(_) => "health",
    }
  }
}

// ─── Credential prompt ────────────────────────────────────────────────────────

/// The API-key modal. Only saving a value closes it.
#[derive(Debug, Default)]
pub struct CredentialPrompt {
  pub input:  String,
  /// Show the key in clear text instead of bullets.
  pub reveal: bool,
  pub error:  Option<String>,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<G, C> {
  /// Single owner of the current view.
  pub navigator: Navigator,

  /// Snapshot fetched for the current view.
  pub pane: Pane,

  /// Header stats; also gates the clear-all action.
  pub stats: Load<DatabaseStats>,

  /// The active API key, if any.
  pub credential: Option<Credential>,

  /// Open while the user is entering an API key.
  pub prompt: Option<CredentialPrompt>,

  pub confirmer: ClearConfirmer,

  pub form: MemoryForm,

  /// Cursor within the active list (or the children of a detail view).
  pub cursor: usize,

  /// Fuzzy filter for the Sources and Quotations lists.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  generation:       GenerationCounter,
  stats_generation: GenerationCounter,
  gateway:          Arc<G>,
  credentials:      C,
  tx:               UnboundedSender<Fetched>,
}

impl<G, C> App<G, C>
where
  G: Gateway + 'static,
  C: CredentialStore,
{
  /// Create the controller and the channel its requests report back on.
  ///
  /// With no saved credential the API-key prompt starts open.
  pub fn new(gateway: G, credentials: C) -> (Self, UnboundedReceiver<Fetched>) {
    let (tx, rx) = unbounded_channel();
    let mut stats_generation = GenerationCounter::new();
    let stats = Load::Pending(stats_generation.advance());

    let mut app = Self {
      navigator: Navigator::new(),
      pane: Pane::Add,
      stats,
      credential: None,
      prompt: None,
      confirmer: ClearConfirmer::new(),
      form: MemoryForm::default(),
      cursor: 0,
      filter: String::new(),
      filter_active: false,
      status_msg: String::new(),
      generation: GenerationCounter::new(),
      stats_generation,
      gateway: Arc::new(gateway),
      credentials,
      tx,
    };

    match app.credentials.load() {
      Ok(Some(credential)) => app.credential = Some(credential),
      Ok(None) => app.open_prompt(),
      Err(e) => {
        tracing::warn!(error = %e, "could not read saved API key");
        app.open_prompt();
        if let Some(prompt) = app.prompt.as_mut() {
          prompt.error = Some(e.to_string());
        }
      }
    }
    (app, rx)
  }

  /// Kick off the initial fetches. Must run inside a tokio runtime.
  pub fn start(&mut self) {
    self.spawn(|gw| async move { gw.health().await }, Fetched::Health);
    self.refresh_stats();
    self.activate();
  }

  #[cfg(test)]
  pub fn gateway(&self) -> &G { &self.gateway }

  pub fn view(&self) -> ViewState { self.navigator.current() }

  pub fn heading(&self) -> Heading { self.view().heading() }

  // ── Requests ──────────────────────────────────────────────────────────────

  fn spawn<T, F, Fut, W>(&self, request: F, wrap: W)
  where
    T: Send + 'static,
    F: FnOnce(Arc<G>) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
    W: FnOnce(Result<T>) -> Fetched + Send + 'static,
  {
    let fut = request(Arc::clone(&self.gateway));
    let tx = self.tx.clone();
    tokio::spawn(async move {
      // The receiver only goes away on shutdown.
      let _ = tx.send(wrap(fut.await));
    });
  }

  /// Enter the current view: new generation, fresh fetch, reset cursor.
  fn activate(&mut self) {
    let generation = self.generation.advance();
    self.cursor = 0;
    self.filter.clear();
    self.filter_active = false;

    let view = self.view();
    tracing::debug!(?view, ?generation, "activating view");
    self.pane = match view {
      ViewState::Add => Pane::Add,
      ViewState::Sources => {
        self.spawn(
          |gw| async move { gw.list_sources().await },
          move |r| Fetched::Sources(generation, r),
        );
        Pane::Sources(Load::Pending(generation))
      }
      ViewState::Quotations => {
        self.spawn(
          |gw| async move { gw.list_quotations().await },
          move |r| Fetched::Quotations(generation, r),
        );
        Pane::Quotations(Load::Pending(generation))
      }
      ViewState::Recent => {
        self.spawn(
          |gw| async move { load_recent(&*gw).await },
          move |r| Fetched::Recent(generation, r),
        );
        Pane::Recent(Load::Pending(generation))
      }
      ViewState::SourceDetail(id) => {
        self.spawn(
          move |gw| async move { load_source_detail(&*gw, id).await },
          move |r| Fetched::SourceDetail(generation, r),
        );
        Pane::SourceDetail(Load::Pending(generation))
      }
      ViewState::QuotationDetail(id) => {
        self.spawn(
          move |gw| async move { load_quotation_view(&*gw, id).await },
          move |r| Fetched::QuotationDetail(generation, r),
        );
        Pane::QuotationDetail(Load::Pending(generation))
      }
    };
  }

  fn refresh_stats(&mut self) {
    let generation = self.stats_generation.advance();
    self.stats = Load::Pending(generation);
    self.spawn(
      |gw| async move { gw.stats().await },
      move |r| Fetched::Stats(generation, r),
    );
  }

  /// Invalidate everything on screen and fetch it again.
  pub fn refresh(&mut self) {
    self.refresh_stats();
    self.activate();
  }

  // ── Navigation ────────────────────────────────────────────────────────────

  pub fn go_to_view(&mut self, kind: ViewKind) {
    self.navigator.navigate_to_view(kind);
    self.status_msg.clear();
    self.activate();
  }

  pub fn open_source(&mut self, id: SourceId) {
    self.navigator.navigate_to_source(id);
    self.status_msg.clear();
    self.activate();
  }

  pub fn open_quotation(&mut self, id: QuotationId) {
    self.navigator.navigate_to_quotation(id);
    self.status_msg.clear();
    self.activate();
  }

  pub fn go_to(&mut self, state: ViewState) {
    self.navigator.navigate_to(state);
    self.status_msg.clear();
    self.activate();
  }

  pub fn go_back(&mut self) {
    if self.navigator.navigate_back() {
      self.status_msg.clear();
      self.activate();
    }
  }

  // ── Responses ─────────────────────────────────────────────────────────────

  /// Fold a finished request into the state.
  pub fn apply(&mut self, msg: Fetched) {
    let label = msg.label();
    let applied = match msg {
      Fetched::Stats(g, r) => self.stats.resolve(g, r),
      Fetched::Created(r) => {
        self.apply_created(r);
        true
      }
      Fetched::Cleared(r) => {
        self.apply_cleared(r);
        true
      }
      Fetched::Health(r) => {
        match r {
          Ok(banner) => tracing::info!(%banner, "backend reachable"),
          Err(e) => self.status_msg = format!("Error: {e}"),
        }
        true
      }
      view => self.apply_view(view),
    };

    if !applied {
      tracing::debug!(response = label, "discarded stale response");
    }
  }

  /// Resolve the pane's pending slot; false if it belongs to another view.
  fn apply_view(&mut self, msg: Fetched) -> bool {
    match (&mut self.pane, msg) {
      (Pane::Sources(load), Fetched::Sources(g, r)) => load.resolve(g, r),
      (Pane::Quotations(load), Fetched::Quotations(g, r)) => load.resolve(g, r),
      (Pane::Recent(load), Fetched::Recent(g, r)) => load.resolve(g, r),
      (Pane::SourceDetail(load), Fetched::SourceDetail(g, r)) => {
        load.resolve(g, r)
      }
      (Pane::QuotationDetail(load), Fetched::QuotationDetail(g, r)) => {
        load.resolve(g, r)
      }
      _ => false,
    }
  }

  fn apply_created(&mut self, result: Result<(MemoryCreated, Vec<Quotation>)>) {
    let failure = result.as_ref().err().map(|e| format!("Error: {e}"));
    self.form.finish(result);
    match failure {
      None => {
        self.status_msg = "Memory added".into();
        self.refresh();
      }
      Some(message) => self.status_msg = message,
    }
  }

  fn apply_cleared(&mut self, result: Result<DatabaseStats>) {
    self.confirmer.finish();
    match result {
      Ok(stats) => {
        // Drop any stats request still in flight from before the wipe.
        self.stats_generation.advance();
        self.stats = Load::Ready(stats);
        self.activate();
        self.status_msg = "All data cleared".into();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  // ── Credential ────────────────────────────────────────────────────────────

  pub fn open_prompt(&mut self) {
    self.prompt = Some(CredentialPrompt {
      input: self
        .credential
        .as_ref()
        .map(|c| c.as_str().to_string())
        .unwrap_or_default(),
      ..CredentialPrompt::default()
    });
  }

  fn save_prompt(&mut self) {
    let Some(prompt) = self.prompt.as_mut() else {
      return;
    };
    let saved = Credential::new(&prompt.input).and_then(|credential| {
      self.credentials.save(&credential)?;
      Ok(credential)
    });
    match saved {
      Ok(credential) => {
        self.credential = Some(credential);
        self.prompt = None;
        self.status_msg = "API key saved".into();
      }
      Err(e) => prompt.error = Some(e.to_string()),
    }
  }

  fn clear_saved_credential(&mut self) {
    let Some(prompt) = self.prompt.as_mut() else {
      return;
    };
    match self.credentials.clear() {
      Ok(()) => {
        self.credential = None;
        prompt.input.clear();
        prompt.error = None;
        self.status_msg = "Saved API key cleared".into();
      }
      Err(e) => prompt.error = Some(e.to_string()),
    }
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Submit the memory form. Blocked client-side without a credential.
  pub fn submit_memory(&mut self) {
    match self.form.prepare(self.credential.as_ref()) {
      Ok(Some((draft, credential))) => {
        self.status_msg = "Processing memory…".into();
        self.spawn(
          move |gw| async move {
            let created = gw.create_source(&draft, &credential).await?;
            let quotations =
              match gw.quotations_for_source(created.source_id).await {
                Ok(quotations) => quotations,
                Err(e) => {
                  tracing::warn!(error = %e, "failed to fetch new quotations");
                  Vec::new()
                }
              };
            Ok::<_, Error>((created, quotations))
          },
          Fetched::Created,
        );
      }
      Ok(None) => {}
      Err(Error::GuardViolation(Guard::NoCredential)) => {
        self.status_msg = Guard::NoCredential.to_string();
        self.open_prompt();
      }
      Err(e) => self.status_msg = e.to_string(),
    }
  }

  pub fn request_clear(&mut self) {
    if let Err(e) = self.confirmer.request(self.stats.ready()) {
      self.status_msg = e.to_string();
    }
  }

  pub fn confirm_clear(&mut self) {
    match self.confirmer.confirm() {
      Ok(()) => {
        self.status_msg = "Clearing…".into();
        self.spawn(
          |gw| async move { clear_and_refresh(&*gw).await },
          Fetched::Cleared,
        );
      }
      Err(e) => self.status_msg = e.to_string(),
    }
  }

  // ── Lists ─────────────────────────────────────────────────────────────────

  /// Sources in the list view that match the current filter.
  pub fn visible_sources(&self) -> Vec<&Source> {
    let Pane::Sources(Load::Ready(sources)) = &self.pane else {
      return Vec::new();
    };
    let matcher = SkimMatcherV2::default();
    sources
      .iter()
      .filter(|s| {
        self.filter.is_empty()
          || matcher.fuzzy_match(&s.display_title(), &self.filter).is_some()
          || matcher.fuzzy_match(&s.context, &self.filter).is_some()
      })
      .collect()
  }

  /// Quotations in the list view that match the current filter.
  pub fn visible_quotations(&self) -> Vec<&Quotation> {
    let Pane::Quotations(Load::Ready(quotations)) = &self.pane else {
      return Vec::new();
    };
    let matcher = SkimMatcherV2::default();
    quotations
      .iter()
      .filter(|q| {
        self.filter.is_empty()
          || matcher.fuzzy_match(&q.quotation_text, &self.filter).is_some()
          || q
            .source_label()
            .is_some_and(|l| matcher.fuzzy_match(&l, &self.filter).is_some())
      })
      .collect()
  }

  /// Number of rows the cursor can move over.
  fn row_count(&self) -> usize {
    match &self.pane {
      Pane::Add => 0,
      Pane::Sources(_) => self.visible_sources().len(),
      Pane::Quotations(_) => self.visible_quotations().len(),
      Pane::Recent(load) => load.ready().map_or(0, Vec::len),
      Pane::SourceDetail(load) => load.ready().map_or(0, |d| d.quotations.len()),
      Pane::QuotationDetail(load) => {
        load.ready().map_or(0, |v| v.propositions.len())
      }
    }
  }

  /// Where `Enter` on the current row leads.
  pub fn selected_target(&self) -> Option<ViewState> {
    match &self.pane {
      Pane::Add => self.form.created_source().map(ViewState::SourceDetail),
      Pane::Sources(_) => self
        .visible_sources()
        .get(self.cursor)
        .map(|s| ViewState::SourceDetail(s.id)),
      Pane::Quotations(_) => self
        .visible_quotations()
        .get(self.cursor)
        .map(|q| ViewState::QuotationDetail(q.id)),
      Pane::Recent(load) => load
        .ready()
        .and_then(|items| items.get(self.cursor))
        .and_then(RecentItem::target),
      Pane::SourceDetail(load) => load
        .ready()
        .and_then(|d| d.quotations.get(self.cursor))
        .map(|q| ViewState::QuotationDetail(q.id)),
      Pane::QuotationDetail(load) => load
        .ready()
        .map(|v| ViewState::SourceDetail(v.quotation.source_id)),
    }
  }

  /// The source that owns the selected quotation, where there is one.
  pub fn selected_owner(&self) -> Option<SourceId> {
    match &self.pane {
      Pane::Quotations(_) => self
        .visible_quotations()
        .get(self.cursor)
        .and_then(|q| q.source_id),
      Pane::QuotationDetail(load) => load.ready().map(|v| v.quotation.source_id),
      _ => None,
    }
  }

  fn open_selected(&mut self) {
    if let Some(target) = self.selected_target() {
      self.go_to(target);
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global: Ctrl-C quits from anywhere.
    if ctrl && key.code == KeyCode::Char('c') {
      return false;
    }

    // Modals capture every other key.
    if self.prompt.is_some() {
      self.handle_prompt_key(key);
      return true;
    }
    if self.confirmer.phase() != ClearPhase::Idle {
      self.handle_confirm_key(key);
      return true;
    }
    if self.filter_active {
      self.handle_filter_key(key);
      return true;
    }
    if ctrl && key.code == KeyCode::Char('s') && self.view() == ViewState::Add {
      self.submit_memory();
      return true;
    }
    if self.form.editing && self.view() == ViewState::Add {
      self.handle_edit_key(key);
      return true;
    }

    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Char('1') => self.go_to_view(ViewKind::ALL[0]),
      KeyCode::Char('2') => self.go_to_view(ViewKind::ALL[1]),
      KeyCode::Char('3') => self.go_to_view(ViewKind::ALL[2]),
      KeyCode::Char('4') => self.go_to_view(ViewKind::ALL[3]),
      KeyCode::Char('a') => self.open_prompt(),
      KeyCode::Char('X') => self.request_clear(),
      KeyCode::Char('r') => self.refresh(),
      _ => match self.view() {
        ViewState::Add => self.handle_form_key(key),
        _ => self.handle_browse_key(key),
      },
    }
    true
  }

  fn handle_prompt_key(&mut self, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Enter => return self.save_prompt(),
      KeyCode::Char('x') if ctrl => return self.clear_saved_credential(),
      _ => {}
    }
    let Some(prompt) = self.prompt.as_mut() else {
      return;
    };
    match key.code {
      KeyCode::Char('r') if ctrl => prompt.reveal = !prompt.reveal,
      KeyCode::Backspace => {
        prompt.input.pop();
      }
      KeyCode::Char(c) if !ctrl => {
        prompt.input.push(c);
        prompt.error = None;
      }
      _ => {}
    }
  }

  fn handle_confirm_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('y') | KeyCode::Enter => {
        if self.confirmer.can_confirm() {
          self.confirm_clear();
        }
      }
      KeyCode::Char('n') | KeyCode::Esc => {
        self.confirmer.cancel();
      }
      _ => {}
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.cursor = 0;
        // Open straight away if there's exactly one match.
        if self.row_count() == 1 {
          self.open_selected();
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.cursor = 0;
      }
      _ => {}
    }
  }

  fn handle_edit_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => self.form.editing = false,
      KeyCode::Tab => self.form.focus_next(),
      KeyCode::BackTab => self.form.focus_prev(),
      KeyCode::Enter => self.form.newline(),
      KeyCode::Backspace => self.form.backspace(),
      KeyCode::Char(c) => self.form.insert(c),
      _ => {}
    }
  }

  fn handle_form_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => self.form.focus_next(),
      KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
        self.form.focus_prev()
      }
      KeyCode::Enter | KeyCode::Char('i') => self.form.editing = true,
      KeyCode::Char('o') => self.open_selected(),
      _ => {}
    }
  }

  fn handle_browse_key(&mut self, key: KeyEvent) {
    match key.code {
      // Back to the owning list
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') | KeyCode::Backspace => {
        self.go_back()
      }

      // Cursor
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.row_count() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      // Open detail
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => self.open_selected(),

      // Owning source of a quotation
      KeyCode::Char('s') => {
        if let Some(id) = self.selected_owner() {
          self.open_source(id);
        }
      }

      // Filter
      KeyCode::Char('/') => {
        if matches!(self.pane, Pane::Sources(_) | Pane::Quotations(_)) {
          self.filter_active = true;
          self.filter.clear();
          self.cursor = 0;
        }
      }

      _ => {}
    }
  }
}
