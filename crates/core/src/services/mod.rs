//! Business logic services.

#![allow(missing_docs)]

pub mod abuse;
pub mod code;
pub mod copy;
pub mod suspension;
pub mod user;

pub use abuse::is_rapid_copying;
pub use code::{CodeOwner, CodeService, CodeStats, CreateCodeInput, ListedCode, UpdateCodeInput};
pub use copy::{CopyOutcome, CopyService};
pub use suspension::{SuspensionService, SuspensionStatus};
pub use user::{CreateUserInput, RecentCopy, UpdateProfileInput, UserActivity, UserService};
