use serde::{Deserialize, Serialize};

use veritas_core::{AssetId, Digest, SigPublicKey, Timestamp};

/// The content-addressed tier's private view of an asset: everything that
/// identifies the document and its key holders, nothing else (spec §6's
/// "Content-addressed metadata projection" — private record emits exactly
/// these six fields).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetMetadataPrivate {
    pub id: AssetId,
    #[serde(rename = "contentDigest")]
    pub content_digest: Digest,
    #[serde(rename = "createdAt")]
    pub created_at: Timestamp,
    #[serde(rename = "publiclySearchable")]
    pub publicly_searchable: bool,
    #[serde(rename = "ownerPublicKey")]
    pub owner_public_key: SigPublicKey,
    #[serde(rename = "creatorPublicKey")]
    pub creator_public_key: SigPublicKey,
}

/// Everything the private record carries, plus the descriptive fields a
/// publicly searchable asset may additionally expose (spec §6: "public
/// record emits the above plus title, description, documentType, ownerId,
/// creatorId, publicExtras"). No other fields ever appear here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetMetadataPublic {
    pub id: AssetId,
    #[serde(rename = "contentDigest")]
    pub content_digest: Digest,
    #[serde(rename = "createdAt")]
    pub created_at: Timestamp,
    #[serde(rename = "publiclySearchable")]
    pub publicly_searchable: bool,
    #[serde(rename = "ownerPublicKey")]
    pub owner_public_key: SigPublicKey,
    #[serde(rename = "creatorPublicKey")]
    pub creator_public_key: SigPublicKey,
    pub title: String,
    pub description: String,
    #[serde(rename = "documentType")]
    pub document_type: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    #[serde(rename = "creatorId")]
    pub creator_id: String,
    #[serde(rename = "publicExtras", skip_serializing_if = "Option::is_none")]
    pub public_extras: Option<serde_json::Value>,
}

/// The descriptive fields that only exist when an asset is publicly
/// searchable, passed alongside the private record to build its public
/// projection. Kept out of `AssetMetadataPrivate` itself so the private
/// struct's field set matches the spec exactly even when these values are
/// tracked elsewhere (the `DOCUMENT_CREATION` transaction, the ledger).
pub struct PublicFields<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub document_type: &'a str,
    pub owner_id: &'a str,
    pub creator_id: &'a str,
    pub public_extras: Option<serde_json::Value>,
}

/// Project a private record into its public view, or `None` if the asset was
/// never marked publicly searchable — in which case no public copy should
/// exist at all, not even a redacted one.
pub fn project_public(private: &AssetMetadataPrivate, public_fields: PublicFields<'_>) -> Option<AssetMetadataPublic> {
    if !private.publicly_searchable {
        return None;
    }
    Some(AssetMetadataPublic {
        id: private.id.clone(),
        content_digest: private.content_digest,
        created_at: private.created_at,
        publicly_searchable: true,
        owner_public_key: private.owner_public_key.clone(),
        creator_public_key: private.creator_public_key.clone(),
        title: public_fields.title.to_string(),
        description: public_fields.description.to_string(),
        document_type: public_fields.document_type.to_string(),
        owner_id: public_fields.owner_id.to_string(),
        creator_id: public_fields.creator_id.to_string(),
        public_extras: public_fields.public_extras,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(publicly_searchable: bool) -> AssetMetadataPrivate {
        AssetMetadataPrivate {
            id: "asset-1".into(),
            content_digest: Digest::ZERO,
            created_at: 1_700_000_000_000,
            publicly_searchable,
            owner_public_key: SigPublicKey(vec![1, 2, 3]),
            creator_public_key: SigPublicKey(vec![4, 5, 6]),
        }
    }

    fn fields() -> PublicFields<'static> {
        PublicFields {
            title: "Deed of Title",
            description: "Warranty deed",
            document_type: "deed",
            owner_id: "user-1",
            creator_id: "user-1",
            public_extras: None,
        }
    }

    #[test]
    fn private_asset_has_no_public_projection() {
        assert!(project_public(&sample(false), fields()).is_none());
    }

    #[test]
    fn public_projection_carries_descriptive_fields() {
        let public = project_public(&sample(true), fields()).unwrap();
        assert_eq!(public.id, "asset-1");
        assert_eq!(public.title, "Deed of Title");
        assert_eq!(public.owner_id, "user-1");
        assert!(public.public_extras.is_none());
    }
}
