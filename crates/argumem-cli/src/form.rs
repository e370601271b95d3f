//! The "Add Memory" form: field buffers, focus, and the submission guard.

use argumem_core::{
  Error, Guard, Result,
  credential::Credential,
  model::{MemoryCreated, NewMemory, Quotation, SourceId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Title,
  Context,
  Content,
}

impl Field {
  pub const ALL: [Field; 3] = [Self::Title, Self::Context, Self::Content];

  pub fn label(self) -> &'static str {
    match self {
      Self::Title => "Title (optional)",
      Self::Context => "Context",
      Self::Content => "Content",
    }
  }

  fn next(self) -> Self {
    match self {
      Self::Title => Self::Context,
      Self::Context => Self::Content,
      Self::Content => Self::Title,
    }
  }

  fn prev(self) -> Self {
    match self {
      Self::Title => Self::Content,
      Self::Context => Self::Title,
      Self::Content => Self::Context,
    }
  }
}

/// Result of the last submission, shown under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Created {
    source_id:  SourceId,
    message:    String,
    /// Quotations extracted from the new source. Empty is a valid outcome.
    quotations: Vec<Quotation>,
  },
  Failed(String),
}

#[derive(Debug, Clone)]
pub struct MemoryForm {
  pub title:      String,
  pub context:    String,
  pub content:    String,
  pub focus:      Field,
  /// Keys go into the focused field rather than to navigation.
  pub editing:    bool,
  pub submitting: bool,
  pub outcome:    Option<Outcome>,
}

impl Default for MemoryForm {
  fn default() -> Self {
    Self {
      title:      String::new(),
      context:    String::new(),
      content:    String::new(),
      focus:      Field::Context,
      editing:    false,
      submitting: false,
      outcome:    None,
    }
  }
}

impl MemoryForm {
  pub fn value(&self, field: Field) -> &str {
    match field {
      Field::Title => &self.title,
      Field::Context => &self.context,
      Field::Content => &self.content,
    }
  }

  fn focused_mut(&mut self) -> &mut String {
    match self.focus {
      Field::Title => &mut self.title,
      Field::Context => &mut self.context,
      Field::Content => &mut self.content,
    }
  }

  pub fn focus_next(&mut self) { self.focus = self.focus.next(); }

  pub fn focus_prev(&mut self) { self.focus = self.focus.prev(); }

  pub fn insert(&mut self, c: char) { self.focused_mut().push(c); }

  pub fn backspace(&mut self) { self.focused_mut().pop(); }

  /// `Enter` while editing: a line break in the content, otherwise move on.
  pub fn newline(&mut self) {
    if self.focus == Field::Content {
      self.content.push('\n');
    } else {
      self.focus_next();
    }
  }

  /// The source id of the last successful submission.
  pub fn created_source(&self) -> Option<SourceId> {
    match &self.outcome {
      Some(Outcome::Created { source_id, .. }) => Some(*source_id),
      _ => None,
    }
  }

  /// Check every precondition and, if they hold, mark the form as
  /// submitting.
  ///
  /// Returns `Ok(None)` while a previous submission is still in flight.
  /// Without a credential this is a [`Guard::NoCredential`] violation and no
  /// request may be issued.
  pub fn prepare(
    &mut self,
    credential: Option<&Credential>,
  ) -> Result<Option<(NewMemory, Credential)>> {
    if self.submitting {
      return Ok(None);
    }
    let outcome = self.check(credential);
    match outcome {
      Ok((draft, credential)) => {
        self.submitting = true;
        self.editing = false;
        self.outcome = None;
        Ok(Some((draft, credential)))
      }
      Err(e) => {
        self.outcome = Some(Outcome::Failed(e.to_string()));
        Err(e)
      }
    }
  }

  fn check(&self, credential: Option<&Credential>) -> Result<(NewMemory, Credential)> {
    let credential = credential.cloned().ok_or(Error::from(Guard::NoCredential))?;
    let draft = NewMemory::new(&self.content, &self.context, &self.title)?;
    Ok((draft, credential))
  }

  /// Apply the result of a submission started by [`MemoryForm::prepare`].
  pub fn finish(&mut self, result: Result<(MemoryCreated, Vec<Quotation>)>) {
    self.submitting = false;
    self.outcome = Some(match result {
      Ok((created, quotations)) => {
        self.title.clear();
        self.context.clear();
        self.content.clear();
        self.focus = Field::Context;
        Outcome::Created {
          source_id: created.source_id,
          message: created.message,
          quotations,
        }
      }
      Err(e) => Outcome::Failed(e.to_string()),
    });
  }
}
