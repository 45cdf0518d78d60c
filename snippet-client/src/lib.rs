//! Client side of the snippet manager: HTTP access to the snippet service,
//! dashboard and form state, and text rendering of snippet cards.

pub mod api;
pub mod clipboard;
pub mod controller;
pub mod dashboard;
pub mod features;
pub mod form;
pub mod render;

pub use api::{ClientError, HttpSnippetApi, NewSnippet, Snippet, SnippetApi, SnippetEdit, Tag};
pub use clipboard::{Clipboard, SystemClipboard};
pub use controller::{ActionError, DashboardController};
pub use dashboard::{Dashboard, DashboardError, DetailMode, EditDraft, LoadState, View};
pub use features::FeatureFlags;
pub use form::{FormError, NewSnippetForm};
