mod attempt;
mod diagnostic;
mod error;
mod flashcard;
mod item;
mod mastery;
mod subskill;

pub use attempt::{Attempt, AttemptSummary, ErrorCategory, ErrorLogEntry, SessionStats};
pub use diagnostic::{DiagnosticResult, SubskillEstimate};
pub use error::{CatalogError, DomainError, EngineError};
pub use flashcard::{Flashcard, ReviewQuality};
pub use item::{IrtParams, Item, ItemKind};
pub use mastery::{MasteryLevel, MasteryState};
pub use subskill::{Section, SubskillId};
