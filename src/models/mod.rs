pub mod user;

pub use user::{NewUser, StoredUser, UserRecord, UserView};
