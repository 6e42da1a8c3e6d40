//! Placeholder resolution for `@name` mentions
//!
//! Turns human-authored `@alice` / `@{alice}` placeholders into Slack mention
//! syntax using a configured mapping. Code spans, fenced blocks and quotes are
//! never rewritten.

mod mapping;
mod resolver;
mod scanner;

pub use mapping::{MentionEntry, MentionKind, MentionMapping, RawMentions};
pub use resolver::{Resolution, ResolutionSummary, resolve};
pub use scanner::{LineEntry, PlaceholderForm, PlaceholderToken, ScanState, tokenize};
