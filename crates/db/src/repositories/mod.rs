//! Database repositories.

pub mod copy;
pub mod misuse_log;
pub mod redeem_code;
pub mod suspension;
pub mod user;

pub use copy::CopyRepository;
pub use misuse_log::MisuseLogRepository;
pub use redeem_code::{RedeemCodeRepository, ARCHIVE_THRESHOLD};
pub use suspension::SuspensionRepository;
pub use user::UserRepository;
