//! A 2048-entry BIP39-style word list (spec §4.5). Rather than hand-carry a
//! 2048-line literal, the list is generated deterministically from three
//! small syllable tables whose sizes multiply out to exactly 2048
//! (8 onsets × 16 nuclei × 16 codas) — every index maps to one word and back.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use veritas_core::PASSPHRASE_WORDLIST_LEN;

const ONSETS: [&str; 8] = ["b", "d", "f", "g", "k", "m", "r", "t"];
const NUCLEI: [&str; 16] = [
    "a", "e", "i", "o", "u", "ya", "ye", "yo", "ai", "au", "ea", "oa", "io", "ou", "ue", "ui",
];
const CODAS: [&str; 16] = [
    "n", "r", "s", "t", "l", "d", "m", "k", "nt", "rk", "st", "ld", "mp", "sk", "rt", "nd",
];

/// The word at `index` (0..2048).
pub fn word_at(index: usize) -> String {
    assert!(index < PASSPHRASE_WORDLIST_LEN, "word index out of range");
    let onset = ONSETS[index / 256];
    let rem = index % 256;
    let nucleus = NUCLEI[rem / 16];
    let coda = CODAS[rem % 16];
    format!("{onset}{nucleus}{coda}")
}

static INDEX: Lazy<HashMap<&'static str, u16>> = Lazy::new(|| {
    // Leaked once per process, bounded at 2048 entries; acceptable for a
    // list that lives for the process lifetime.
    let mut map = HashMap::with_capacity(PASSPHRASE_WORDLIST_LEN);
    for i in 0..PASSPHRASE_WORDLIST_LEN {
        let word: &'static str = Box::leak(word_at(i).into_boxed_str());
        map.insert(word, i as u16);
    }
    map
});

pub fn index_of(word: &str) -> Option<u16> {
    INDEX.get(word).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_index_round_trips() {
        for i in 0..PASSPHRASE_WORDLIST_LEN {
            let word = word_at(i);
            assert_eq!(index_of(&word), Some(i as u16));
        }
    }

    #[test]
    fn all_words_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for i in 0..PASSPHRASE_WORDLIST_LEN {
            assert!(seen.insert(word_at(i)));
        }
    }
}
