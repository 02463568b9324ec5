/// Which storage tier(s) a record class is allowed to land in, and whether
/// that copy is privacy-sensitive (spec §4.4: "fast/hot", "durable/versioned",
/// "public, immutable-by-digest" tiers; privacy-aware metadata projection).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordClass {
    /// Spec §4.4's `UserMetadata` class: `kv, object; system-encrypted`.
    Account,
    Session,
    /// Spec §4.4's `ActivationToken` class: `object; system-encrypted`.
    Invite,
    SystemKey,
    /// Spec §4.4's `ChainBlock` class: `kv, object, content-addressed; no
    /// encryption; publicly verifiable`.
    Block,
    /// Spec §4.4's `AssetMetadata` class, private-tier copy: `kv, object...
    /// no encryption on private-tier copy`.
    AssetMetadataPrivate,
    /// The same `AssetMetadata` class's privacy-aware content-addressed
    /// projection — only written when `publiclySearchable = true`.
    AssetMetadataPublic,
    /// Spec §4.4's `Document` class: `object, content-addressed;
    /// user-encrypted`.
    DocumentContent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TierKind {
    Kv,
    Object,
    ContentAddressed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoragePolicy {
    /// Every tier this record class is replicated into, in the fallback
    /// order `get` should try them (spec §4.4: "prefer the fastest tier
    /// declared by policy; fall back in declared order").
    pub tiers: &'static [TierKind],
    /// Whether `put` must reject a write with no encryption key supplied
    /// (spec §4.4 step 1: `PolicyError::EncryptionRequired`).
    pub encrypt_at_rest: bool,
    /// Whether this class's content-addressed copy, if any, is reachable
    /// without an owning session (spec §4.4/§4.8: public vs private views).
    pub public: bool,
}

impl RecordClass {
    /// The routing table a record class is committed under. Ledger/identity
    /// code consults this rather than hardcoding a tier per call site.
    pub fn policy(self) -> StoragePolicy {
        match self {
            RecordClass::Account => StoragePolicy {
                tiers: &[TierKind::Kv, TierKind::Object],
                encrypt_at_rest: true,
                public: false,
            },
            RecordClass::Session => StoragePolicy {
                tiers: &[TierKind::Kv],
                encrypt_at_rest: false,
                public: false,
            },
            RecordClass::Invite => StoragePolicy {
                tiers: &[TierKind::Object],
                encrypt_at_rest: true,
                public: false,
            },
            RecordClass::SystemKey => StoragePolicy {
                tiers: &[TierKind::Kv],
                encrypt_at_rest: false,
                public: false,
            },
            RecordClass::Block => StoragePolicy {
                tiers: &[TierKind::Kv, TierKind::Object, TierKind::ContentAddressed],
                encrypt_at_rest: false,
                public: true,
            },
            RecordClass::AssetMetadataPrivate => StoragePolicy {
                tiers: &[TierKind::Kv, TierKind::Object],
                encrypt_at_rest: false,
                public: false,
            },
            RecordClass::AssetMetadataPublic => StoragePolicy {
                tiers: &[TierKind::ContentAddressed],
                encrypt_at_rest: false,
                public: true,
            },
            RecordClass::DocumentContent => StoragePolicy {
                tiers: &[TierKind::Object, TierKind::ContentAddressed],
                encrypt_at_rest: true,
                public: false,
            },
        }
    }
}
