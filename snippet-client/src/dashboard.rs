//! Presentation state of the snippet dashboard.
//!
//! The list moves `Idle -> Loading -> Loaded | Failed`; a failed load is
//! terminal until the next explicit [`Dashboard::begin_load`]. Once loaded, a
//! single snippet may be open in the detail view, where it can be copied,
//! edited, or deleted. Network calls live in
//! [`crate::controller::DashboardController`]; this type only records their
//! outcomes.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::{
    api::{Snippet, SnippetEdit},
    clipboard::Clipboard,
    features::FeatureFlags,
};

/// How long the "copied" indicator stays on after a copy.
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);

/// Number of placeholder cards shown while the list is loading.
pub const SKELETON_CARDS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub heading: String,
    pub code: String,
    pub language: String,
}

impl EditDraft {
    fn from_snippet(snippet: &Snippet) -> Self {
        Self {
            heading: snippet.heading.clone(),
            code: snippet.code.clone(),
            language: snippet.language.clone(),
        }
    }

    /// Fields that differ from `snippet`.
    fn changes_against(&self, snippet: &Snippet) -> SnippetEdit {
        fn changed(draft: &str, stored: &str) -> Option<String> {
            (draft != stored).then(|| draft.to_string())
        }

        SnippetEdit {
            heading: changed(&self.heading, &snippet.heading),
            code: changed(&self.code, &snippet.code),
            language: changed(&self.language, &snippet.language),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailMode {
    Viewing,
    Editing(EditDraft),
    ConfirmingDelete,
}

#[derive(Debug)]
struct Detail {
    snippet_id: i64,
    mode: DetailMode,
    copied_at: Option<Instant>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("snippets are not loaded")]
    NotLoaded,
    #[error("no snippet with id {0}")]
    UnknownSnippet(i64),
    #[error("no snippet is open")]
    NoDetail,
    #[error("editing is disabled")]
    EditingDisabled,
    #[error("not allowed while {0}")]
    WrongMode(&'static str),
    #[error("copy failed: {0}")]
    Clipboard(String),
}

/// What the list area should show right now.
#[derive(Debug, PartialEq)]
pub enum View<'a> {
    Loading { placeholders: usize },
    Error(&'a str),
    Empty { illustration: bool },
    Cards(&'a [Snippet]),
}

#[derive(Debug)]
pub struct Dashboard {
    features: FeatureFlags,
    load: LoadState,
    snippets: Vec<Snippet>,
    detail: Option<Detail>,
    action_error: Option<String>,
}

impl Dashboard {
    pub fn new(features: FeatureFlags) -> Self {
        Self {
            features,
            load: LoadState::Idle,
            snippets: Vec::new(),
            detail: None,
            action_error: None,
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    /// Last failed update or delete, if it has not been dismissed.
    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn dismiss_action_error(&mut self) {
        self.action_error = None;
    }

    pub fn view(&self) -> View<'_> {
        match &self.load {
            LoadState::Idle | LoadState::Loading => View::Loading { placeholders: SKELETON_CARDS },
            LoadState::Failed(message) => View::Error(message),
            LoadState::Loaded if self.snippets.is_empty() => View::Empty {
                illustration: self.features.empty_state_illustration,
            },
            LoadState::Loaded => View::Cards(&self.snippets),
        }
    }

    pub fn begin_load(&mut self) {
        self.load = LoadState::Loading;
        self.detail = None;
        self.action_error = None;
    }

    pub fn finish_load(&mut self, result: Result<Vec<Snippet>, String>) {
        match result {
            Ok(snippets) => {
                self.snippets = snippets;
                self.load = LoadState::Loaded;
            }
            Err(message) => {
                self.snippets.clear();
                self.load = LoadState::Failed(message);
            }
        }
    }

    /// Replaces the listed copy of a snippet with a newer one from the service.
    pub fn refresh(&mut self, snippet: Snippet) {
        if let Some(index) = self.index_of(snippet.id) {
            self.snippets[index] = snippet;
        }
    }

    // ______________________________________ Detail ______________________________________

    pub fn select(&mut self, id: i64) -> Result<&Snippet, DashboardError> {
        if self.load != LoadState::Loaded {
            return Err(DashboardError::NotLoaded);
        }
        let index = self.index_of(id).ok_or(DashboardError::UnknownSnippet(id))?;
        self.detail = Some(Detail { snippet_id: id, mode: DetailMode::Viewing, copied_at: None });
        Ok(&self.snippets[index])
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn selected(&self) -> Option<&Snippet> {
        let detail = self.detail.as_ref()?;
        self.snippets.iter().find(|s| s.id == detail.snippet_id)
    }

    pub fn detail_mode(&self) -> Option<&DetailMode> {
        self.detail.as_ref().map(|d| &d.mode)
    }

    /// Puts the open snippet's code on `clipboard`. The "copied" indicator
    /// only starts when the clipboard accepted it.
    pub fn copy_code<C>(&mut self, clipboard: &mut C, now: Instant) -> Result<(), DashboardError>
    where
        C: Clipboard + ?Sized,
    {
        let code = &self.selected().ok_or(DashboardError::NoDetail)?.code;
        clipboard.set_text(code).map_err(DashboardError::Clipboard)?;
        if let Some(detail) = self.detail.as_mut() {
            detail.copied_at = Some(now);
        }
        Ok(())
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.detail
            .as_ref()
            .and_then(|d| d.copied_at)
            .is_some_and(|at| now.saturating_duration_since(at) < COPY_FEEDBACK)
    }

    // ______________________________________ Edit ______________________________________

    pub fn start_edit(&mut self) -> Result<(), DashboardError> {
        if !self.features.edit_mode {
            return Err(DashboardError::EditingDisabled);
        }
        let draft = EditDraft::from_snippet(self.selected().ok_or(DashboardError::NoDetail)?);
        let detail = self.detail_in(|mode| matches!(mode, DetailMode::Viewing), "not viewing")?;
        detail.mode = DetailMode::Editing(draft);
        Ok(())
    }

    pub fn draft_mut(&mut self) -> Option<&mut EditDraft> {
        match &mut self.detail.as_mut()?.mode {
            DetailMode::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn cancel_edit(&mut self) {
        if let Some(detail) = self.detail.as_mut() {
            if matches!(detail.mode, DetailMode::Editing(_)) {
                detail.mode = DetailMode::Viewing;
            }
        }
    }

    /// The update to send for the current draft, or `None` when nothing changed.
    pub fn pending_save(&self) -> Result<Option<(i64, SnippetEdit)>, DashboardError> {
        let detail = self.detail.as_ref().ok_or(DashboardError::NoDetail)?;
        let DetailMode::Editing(draft) = &detail.mode else {
            return Err(DashboardError::WrongMode("not editing"));
        };
        let snippet = self.selected().ok_or(DashboardError::NoDetail)?;

        let edit = draft.changes_against(snippet);
        Ok((!edit.is_empty()).then_some((snippet.id, edit)))
    }

    /// Applies the outcome of a save. A failure keeps the draft open and records the error.
    pub fn finish_save(&mut self, result: Result<Snippet, String>) {
        match result {
            Ok(updated) => {
                self.refresh(updated);
                self.cancel_edit();
                self.action_error = None;
            }
            Err(message) => {
                log::warn!("saving snippet failed: {message}");
                self.action_error = Some(message);
            }
        }
    }

    // ______________________________________ Delete ______________________________________

    pub fn request_delete(&mut self) -> Result<(), DashboardError> {
        let detail = self.detail_in(|mode| matches!(mode, DetailMode::Viewing), "not viewing")?;
        detail.mode = DetailMode::ConfirmingDelete;
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        if let Some(detail) = self.detail.as_mut() {
            if detail.mode == DetailMode::ConfirmingDelete {
                detail.mode = DetailMode::Viewing;
            }
        }
    }

    /// Id to delete once the user has confirmed.
    pub fn confirm_delete(&self) -> Result<i64, DashboardError> {
        match &self.detail {
            Some(Detail { snippet_id, mode: DetailMode::ConfirmingDelete, .. }) => Ok(*snippet_id),
            Some(_) => Err(DashboardError::WrongMode("not confirming a delete")),
            None => Err(DashboardError::NoDetail),
        }
    }

    /// Removes the snippet and closes the detail on success; otherwise leaves state as is.
    pub fn finish_delete(&mut self, id: i64, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.snippets.retain(|s| s.id != id);
                if self.detail.as_ref().is_some_and(|d| d.snippet_id == id) {
                    self.detail = None;
                }
                self.action_error = None;
            }
            Err(message) => {
                log::warn!("deleting snippet {id} failed: {message}");
                self.action_error = Some(message);
            }
        }
    }

    fn index_of(&self, id: i64) -> Option<usize> {
        self.snippets.iter().position(|s| s.id == id)
    }

    fn detail_in(
        &mut self,
        allowed: impl Fn(&DetailMode) -> bool,
        otherwise: &'static str,
    ) -> Result<&mut Detail, DashboardError> {
        let detail = self.detail.as_mut().ok_or(DashboardError::NoDetail)?;
        if allowed(&detail.mode) {
            Ok(detail)
        } else {
            Err(DashboardError::WrongMode(otherwise))
        }
    }
}
