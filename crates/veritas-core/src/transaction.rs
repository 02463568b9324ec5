use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::error::CoreError;
use crate::types::{AssetId, Digest, KemPublicKey, KeyVersion, SigPublicKey, Signature, Timestamp, TxId, UserId};

// ── Transaction type & payload schemas (spec §6) ──────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "USER_REGISTRATION")]
    UserRegistration,
    #[serde(rename = "DOCUMENT_CREATION")]
    DocumentCreation,
    #[serde(rename = "ASSET_TRANSFER")]
    AssetTransfer,
    #[serde(rename = "ADMIN_ACTION")]
    AdminAction,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::UserRegistration => "USER_REGISTRATION",
            TransactionType::DocumentCreation => "DOCUMENT_CREATION",
            TransactionType::AssetTransfer => "ASSET_TRANSFER",
            TransactionType::AdminAction => "ADMIN_ACTION",
        }
    }
}

/// The `accountType` carried by a `USER_REGISTRATION` transaction. `Invited`
/// is the only type a fresh activation may assign (spec §4.6: "accountType
/// copied from the invite, not client-chosen"); `Admin` accounts are created
/// out of band (genesis, or by a prior `ADMIN_ACTION`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "invited")]
    Invited,
    #[serde(rename = "admin")]
    Admin,
}

/// The type-specific payload of a transaction (spec §6 table). Kept as a
/// tagged sum rather than a free-form map so that every field required for a
/// given `type` is enforced at compile time once constructed; the canonical
/// encoder (in `veritas-crypto`) still walks this generically via `Serialize`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionData {
    #[serde(rename = "USER_REGISTRATION")]
    UserRegistration {
        #[serde(rename = "userId")]
        user_id: UserId,
        email: String,
        #[serde(rename = "kemPublicKey")]
        kem_public_key: KemPublicKey,
        #[serde(rename = "sigPublicKey")]
        sig_public_key: SigPublicKey,
        #[serde(rename = "encryptedUserData")]
        encrypted_user_data: Envelope,
        #[serde(rename = "accountType")]
        account_type: AccountType,
    },
    #[serde(rename = "DOCUMENT_CREATION")]
    DocumentCreation {
        #[serde(rename = "assetId")]
        asset_id: AssetId,
        #[serde(rename = "ownerId")]
        owner_id: UserId,
        #[serde(rename = "contentDigest")]
        content_digest: Digest,
        #[serde(rename = "documentType")]
        document_type: String,
        #[serde(rename = "publiclySearchable")]
        publicly_searchable: bool,
        #[serde(rename = "createdAt")]
        created_at: Timestamp,
    },
    #[serde(rename = "ASSET_TRANSFER")]
    AssetTransfer {
        #[serde(rename = "assetId")]
        asset_id: AssetId,
        #[serde(rename = "fromOwnerId")]
        from_owner_id: UserId,
        #[serde(rename = "toOwnerId")]
        to_owner_id: UserId,
    },
    #[serde(rename = "ADMIN_ACTION")]
    AdminAction {
        action: String,
        payload: serde_json::Value,
    },
}

impl TransactionData {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionData::UserRegistration { .. } => TransactionType::UserRegistration,
            TransactionData::DocumentCreation { .. } => TransactionType::DocumentCreation,
            TransactionData::AssetTransfer { .. } => TransactionType::AssetTransfer,
            TransactionData::AdminAction { .. } => TransactionType::AdminAction,
        }
    }

    /// Structural validation beyond what the type system already guarantees
    /// (non-empty strings where the protocol has no sensible empty value).
    pub fn validate_shape(&self) -> Result<(), CoreError> {
        match self {
            TransactionData::UserRegistration { user_id, email, .. } => {
                if user_id.is_empty() {
                    return Err(CoreError::MissingField("userId"));
                }
                if email.is_empty() || !email.contains('@') {
                    return Err(CoreError::Malformed("invalid email".into()));
                }
                Ok(())
            }
            TransactionData::DocumentCreation { asset_id, owner_id, .. } => {
                if asset_id.is_empty() {
                    return Err(CoreError::MissingField("assetId"));
                }
                if owner_id.is_empty() {
                    return Err(CoreError::MissingField("ownerId"));
                }
                Ok(())
            }
            TransactionData::AssetTransfer {
                asset_id,
                from_owner_id,
                to_owner_id,
            } => {
                if asset_id.is_empty() {
                    return Err(CoreError::MissingField("assetId"));
                }
                if from_owner_id == to_owner_id {
                    return Err(CoreError::Malformed(
                        "fromOwnerId and toOwnerId must differ".into(),
                    ));
                }
                Ok(())
            }
            TransactionData::AdminAction { action, .. } => {
                if action.is_empty() {
                    return Err(CoreError::MissingField("action"));
                }
                Ok(())
            }
        }
    }
}

// ── Signatures ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSignature {
    #[serde(rename = "publicKey")]
    pub public_key: SigPublicKey,
    pub signature: Signature,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemSignature {
    #[serde(rename = "publicKey")]
    pub public_key: SigPublicKey,
    pub signature: Signature,
    #[serde(rename = "keyVersion")]
    pub key_version: KeyVersion,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionSignatures {
    pub user: Option<UserSignature>,
    pub system: Option<SystemSignature>,
}

// ── Transaction ───────────────────────────────────────────────────────────────

/// A fully-formed transaction (spec §3). Immutable once both signatures are
/// attached and it has entered the pending pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub timestamp: Timestamp,
    pub data: TransactionData,
    pub signatures: TransactionSignatures,
}

/// The exact tuple that both signatures cover: `(id, type, timestamp, data)`.
/// Kept as a separate type (rather than reusing `Transaction` with
/// `signatures` skipped) so the signed bytes can never accidentally drift if
/// a field is added to `Transaction` later without updating this struct.
#[derive(Serialize)]
pub struct SignedBody<'a> {
    pub id: &'a TxId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub timestamp: Timestamp,
    pub data: &'a TransactionData,
}

impl Transaction {
    pub fn new(id: TxId, timestamp: Timestamp, data: TransactionData) -> Self {
        let transaction_type = data.transaction_type();
        Self {
            id,
            transaction_type,
            timestamp,
            data,
            signatures: TransactionSignatures::default(),
        }
    }

    pub fn signed_body(&self) -> SignedBody<'_> {
        SignedBody {
            id: &self.id,
            transaction_type: self.transaction_type,
            timestamp: self.timestamp,
            data: &self.data,
        }
    }

    pub fn validate_structure(&self) -> Result<(), CoreError> {
        if self.id.is_empty() {
            return Err(CoreError::EmptyTransactionId);
        }
        if self.transaction_type != self.data.transaction_type() {
            return Err(CoreError::Malformed(
                "declared type does not match data variant".into(),
            ));
        }
        self.data.validate_shape()
    }
}
