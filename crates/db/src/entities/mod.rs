//! Database entities.

pub mod copy;
pub mod misuse_log;
pub mod redeem_code;
pub mod suspension;
pub mod user;

pub use copy::Entity as Copy;
pub use misuse_log::Entity as MisuseLog;
pub use redeem_code::Entity as RedeemCode;
pub use suspension::Entity as Suspension;
pub use user::Entity as User;
