//! Note templates

pub mod builtin;
pub mod manager;

pub use manager::{NotePlan, TemplateInfo, TemplateManager, daily_note_plan, weekly_review_plan};
