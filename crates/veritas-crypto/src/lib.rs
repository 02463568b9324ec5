pub mod canonical;
pub mod envelope;
pub mod primitives;

pub use canonical::{canonical_bytes, CanonicalError};
pub use envelope::{open, seal, EnvelopeError};
pub use primitives::{
    aead_open, aead_seal, content_hash, kdf_derive, kem_decap, kem_encap, kem_keygen, sig_keygen,
    sig_sign, sig_verify, CryptoError, KdfCost,
};
