//! Data models for Study Buddy.

mod document;
mod flashcard;
mod highlight;
mod invite;
mod quiz;
mod user;

pub use document::{Document, DocumentStatus};
pub use flashcard::{Flashcard, FlashcardSet};
pub use highlight::{group_by_page, Highlight, HighlightGroup};
pub use invite::{generate_invite_code, InviteCode, MarkUsed};
pub use quiz::{Question, Quiz, QuizResult};
pub use user::{AuthUser, Role};
