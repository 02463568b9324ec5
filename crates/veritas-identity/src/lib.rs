pub mod account;
pub mod activation;
pub mod anchor;
pub mod error;
pub mod invite;
pub mod login;
pub mod session;

pub use account::{AccountPolicyView, AccountRecord, AccountStore, StorageAccountStore};
pub use activation::{activate, ActivationRequest};
pub use anchor::{AnchorRef, EthereumAnchorClient};
pub use error::{AnchorError, AuthError, InviteError};
pub use invite::{ActivationToken, InviteStore, StorageInviteStore};
pub use login::login;
pub use session::{Session, SessionRecord, SessionStore};
