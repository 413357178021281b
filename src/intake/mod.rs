//! The two-node intake workflow: collect the record, then review it.

pub mod collector;
pub mod profile;
pub mod prompts;
pub mod reviewer;
pub mod session;
pub mod state;

pub use collector::Collector;
pub use profile::{ApplicantProfile, ChangeSet, CollectedRecord, Gender, RentType};
pub use reviewer::Reviewer;
pub use session::{IntakeRunner, StepOutcome};
pub use state::{Branch, IntakePhase, IntakeSession};
