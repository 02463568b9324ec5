//! ─── Veritas Documents Chain protocol constants ─────────────────────────────

// ── Canonical envelope / keypack versioning ───────────────────────────────────

/// Current envelope wire-format version (spec §4.2/§6).
pub const ENVELOPE_VERSION: &str = "1.0";

/// Current keypack file format identifier (spec §6).
pub const KEYPACK_FORMAT: &str = "veritas-keypack-v1";

/// Current keypack inner-bundle version.
pub const KEYPACK_VERSION: &str = "1.0";

/// AAD bound into every keypack envelope seal (spec §4.5).
pub const KEYPACK_AAD: &[u8] = b"veritas-keypack-v1";

// ── Login challenge ───────────────────────────────────────────────────────────

/// Maximum allowed clock skew between a login challenge timestamp and the
/// server's wall clock, in milliseconds. Spec §4.6 step 2: "bounded, e.g. 5
/// minutes".
pub const CHALLENGE_SKEW_WINDOW_MS: i64 = 5 * 60 * 1000;

/// Bearer session token lifetime, in milliseconds (24 hours).
pub const SESSION_LIFETIME_MS: i64 = 24 * 60 * 60 * 1000;

// ── Transaction timestamp skew ────────────────────────────────────────────────

/// Maximum allowed skew between a submitted transaction's timestamp and the
/// server's wall clock, in milliseconds (spec §3: "server may reject if
/// skewed beyond a bounded window").
pub const TRANSACTION_SKEW_WINDOW_MS: i64 = 10 * 60 * 1000;

// ── Keypack KDF cost parameters (argon2id) ────────────────────────────────────

/// Argon2id memory cost, in KiB. ~19 MiB, OWASP's minimum recommendation.
pub const KDF_MEMORY_KIB: u32 = 19 * 1024;

/// Argon2id time cost (iterations).
pub const KDF_ITERATIONS: u32 = 2;

/// Argon2id parallelism (lanes).
pub const KDF_PARALLELISM: u32 = 1;

/// Minimum salt length, in bytes (spec §3: "≥16 random bytes").
pub const KDF_SALT_LEN: usize = 16;

/// AEAD nonce length for XChaCha20-Poly1305, in bytes.
pub const AEAD_NONCE_LEN: usize = 24;

// ── BIP39-style passphrase ────────────────────────────────────────────────────

/// Number of words drawn for a keypack passphrase.
pub const PASSPHRASE_WORD_COUNT: usize = 12;

/// Size of the word list a passphrase is drawn from.
pub const PASSPHRASE_WORDLIST_LEN: usize = 2048;

// ── Block / Merkle ────────────────────────────────────────────────────────────

/// Genesis block number.
pub const GENESIS_BLOCK_NUMBER: u64 = 0;

/// Genesis system signing key version.
pub const GENESIS_KEY_VERSION: u32 = 0;
