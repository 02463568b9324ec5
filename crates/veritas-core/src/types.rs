use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Unix timestamp in milliseconds (UTC). All protocol timestamps — transaction,
/// block, login challenge — are expressed in this unit; spec test vectors such
/// as `1_700_000_000_000` are milliseconds, not seconds.
pub type Timestamp = i64;

// ── Digest ───────────────────────────────────────────────────────────────────

/// A 32-byte BLAKE3 digest: block hashes, transaction ids, content digests,
/// and Merkle nodes all share this representation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(pub [u8; 32]);

// Wire representation is base64url (spec §6's canonical serialization rule),
// not hex and not a JSON array of integers — matches how `Envelope`'s byte
// fields are already represented on the wire.
impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&URL_SAFE_NO_PAD.encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = URL_SAFE_NO_PAD.decode(s.as_bytes()).map_err(DeError::custom)?;
        if bytes.len() != 32 {
            return Err(DeError::custom("digest must decode to exactly 32 bytes"));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Digest(arr))
    }
}

impl Digest {
    pub const ZERO: Digest = Digest([0u8; 32]);

    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let mut arr = [0u8; 32];
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}…)", &self.to_hex()[..12])
    }
}

/// Transaction identifier: a `Digest` over the canonical `(id, type, timestamp,
/// data)` tuple is *not* how the id itself is derived — the id is issuer-chosen
/// (spec §3: "stable across retries") — but it is represented the same way.
pub type TxId = String;

/// Identifier for an asset / document record anchored in the ledger.
pub type AssetId = String;

/// Logical identifier for a user account (spec §3/§6: `userId`, `ownerId`,
/// `creatorId`, `fromOwnerId`, `toOwnerId`).
pub type UserId = String;

// ── Key / signature material ──────────────────────────────────────────────────

// Same base64url-on-the-wire treatment as `Digest`, for the variable-length
// key/signature byte buffers.
macro_rules! base64url_bytes_newtype {
    ($ty:ident, $label:literal) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&URL_SAFE_NO_PAD.encode(&self.0))
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                let bytes = URL_SAFE_NO_PAD.decode(s.as_bytes()).map_err(DeError::custom)?;
                Ok($ty(bytes))
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({}b)"), self.0.len())
            }
        }
    };
}

/// A KEM public key (Kyber768). Envelope recipients are addressed by this key.
#[derive(Clone, PartialEq, Eq)]
pub struct KemPublicKey(pub Vec<u8>);
base64url_bytes_newtype!(KemPublicKey, "KemPublicKey");

/// A signature public key (Dilithium2).
#[derive(Clone, PartialEq, Eq)]
pub struct SigPublicKey(pub Vec<u8>);
base64url_bytes_newtype!(SigPublicKey, "SigPublicKey");

/// A detached Dilithium2 signature.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);
base64url_bytes_newtype!(Signature, "Signature");

/// Monotonic version number for the system signing key; rotation (§4.3)
/// increments this and registers a new public key without invalidating the
/// verifiability of historical blocks signed under earlier versions.
pub type KeyVersion = u32;
