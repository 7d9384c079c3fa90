//! Bluesky labeler label definitions.
//!
//! [`LabelValueDefinition`] is the custom-label shape of an `app.bsky.labeler.service`
//! record. Definitions created during a session are kept in a shared [`LabelBook`], read
//! and written by the feedback agent's [`GetLabelTool`] and [`CreateLabelTool`], and
//! exported as a [`LabelerServiceRecord`].

mod book;
mod definition;
mod record;
mod tools;

pub use book::LabelBook;
pub use definition::{Blurs, DefaultSetting, LabelError, LabelValueDefinition, Locale, Severity};
pub use record::{LabelerServiceRecord, LABELER_SERVICE_TYPE};
pub use tools::{CreateLabelTool, GetLabelTool, TOOL_CREATE_LABEL, TOOL_GET_LABEL};
