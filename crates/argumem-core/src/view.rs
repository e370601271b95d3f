//! The view-state machine that stands in for a URL router.
//!
//! Exactly one [`ViewState`] is current at any time. It is owned by a
//! [`Navigator`]; everything else reads it and asks for transitions. Changing
//! state never fetches anything; the controller reacts to the new value.

use crate::model::{QuotationId, SourceId};

/// The four top-level screens reachable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
  Add,
  Sources,
  Quotations,
  Recent,
}

impl ViewKind {
  /// Sidebar order.
  pub const ALL: [ViewKind; 4] =
    [Self::Add, Self::Recent, Self::Sources, Self::Quotations];

  pub fn label(self) -> &'static str {
    match self {
      Self::Add => "Add Memory",
      Self::Sources => "Sources",
      Self::Quotations => "Quotations",
      Self::Recent => "Recent",
    }
  }
}

/// The client's sole notion of "current screen".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
  Add,
  Sources,
  Quotations,
  Recent,
  SourceDetail(SourceId),
  QuotationDetail(QuotationId),
}

impl From<ViewKind> for ViewState {
  fn from(kind: ViewKind) -> Self {
    match kind {
      ViewKind::Add => Self::Add,
      ViewKind::Sources => Self::Sources,
      ViewKind::Quotations => Self::Quotations,
      ViewKind::Recent => Self::Recent,
    }
  }
}

/// Title and subtitle shown above the active view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
  pub title:    String,
  pub subtitle: &'static str,
}

impl ViewState {
  pub fn heading(&self) -> Heading {
    let (title, subtitle) = match self {
      Self::Add => (
        "Add Memory".to_string(),
        "Process and store new argumentative content",
      ),
      Self::Sources => (
        "Sources".to_string(),
        "View and manage your stored sources",
      ),
      Self::Quotations => (
        "Quotations".to_string(),
        "Browse extracted quotations from your sources",
      ),
      Self::Recent => (
        "Recent Activity".to_string(),
        "View recently added sources, quotations, and propositions",
      ),
      Self::SourceDetail(id) => (
        format!("Source #{id}"),
        "View source details and related quotations",
      ),
      Self::QuotationDetail(id) => (
        format!("Quotation #{id}"),
        "View quotation details, source, and propositions",
      ),
    };
    Heading { title, subtitle }
  }

  /// The sidebar entry this state belongs to. Detail states highlight the
  /// list that owns them.
  pub fn section(&self) -> ViewKind {
    match self {
      Self::Add => ViewKind::Add,
      Self::Sources | Self::SourceDetail(_) => ViewKind::Sources,
      Self::Quotations | Self::QuotationDetail(_) => ViewKind::Quotations,
      Self::Recent => ViewKind::Recent,
    }
  }

  pub fn is_detail(&self) -> bool {
    matches!(self, Self::SourceDetail(_) | Self::QuotationDetail(_))
  }
}

// ─── Navigator ───────────────────────────────────────────────────────────────

/// Single owner of the current [`ViewState`].
///
/// Transitions are plain assignments: no queue, no intermediate states and no
/// history beyond "back to the owning list".
#[derive(Debug, Clone)]
pub struct Navigator {
  state: ViewState,
}

impl Default for Navigator {
  fn default() -> Self { Self::new() }
}

impl Navigator {
  pub fn new() -> Self {
    Self {
      state: ViewState::Add,
    }
  }

  pub fn current(&self) -> ViewState { self.state }

  pub fn navigate_to_view(&mut self, kind: ViewKind) {
    self.state = kind.into();
  }

  pub fn navigate_to_source(&mut self, id: SourceId) {
    self.state = ViewState::SourceDetail(id);
  }

  pub fn navigate_to_quotation(&mut self, id: QuotationId) {
    self.state = ViewState::QuotationDetail(id);
  }

  /// Jump to an arbitrary state, e.g. the target of a recent item.
  pub fn navigate_to(&mut self, state: ViewState) { self.state = state; }

  /// Return from a detail view to its owning list. Returns `false` (and
  /// leaves the state alone) from any non-detail state.
  pub fn navigate_back(&mut self) -> bool {
    let parent = match self.state {
      ViewState::SourceDetail(_) => ViewState::Sources,
      ViewState::QuotationDetail(_) => ViewState::Quotations,
      _ => return false,
    };
    self.state = parent;
    true
  }
}
