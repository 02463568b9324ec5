use crate::error::AnchorError;

/// Opaque reference to a transaction that anchored a super-root on a public
/// chain. Left as a plain string (e.g. a transaction hash) since this
/// workspace never constructs one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorRef(pub String);

/// Collaborator interface for periodically anchoring a ledger super-root to
/// a public chain (spec §4.6/§6 non-goal: no implementation ships here).
/// A deployment wires this to whatever chain client it uses and calls it
/// from outside this workspace.
pub trait EthereumAnchorClient {
    fn anchor(&self, super_root: &[u8]) -> Result<AnchorRef, AnchorError>;
}
