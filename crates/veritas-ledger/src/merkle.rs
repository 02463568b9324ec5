use veritas_core::Digest;
use veritas_crypto::content_hash;

/// Which side of a hash-pair a sibling sits on, needed to reproduce the
/// parent hash in the right order during proof verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofStep {
    pub sibling: Digest,
    pub side: Side,
}

fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut bytes = Vec::with_capacity(64);
    bytes.extend_from_slice(left.as_bytes());
    bytes.extend_from_slice(right.as_bytes());
    content_hash(&bytes)
}

/// Merkle root over `leaves`. An odd node at any level is promoted unchanged
/// to the next level rather than hashed with a duplicate of itself — spec's
/// chosen defense against the CVE-2012-2459-style duplication attack.
pub fn merkle_root(leaves: &[Digest]) -> Digest {
    if leaves.is_empty() {
        return Digest::ZERO;
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut i = 0;
        while i < level.len() {
            if i + 1 < level.len() {
                next.push(hash_pair(&level[i], &level[i + 1]));
                i += 2;
            } else {
                next.push(level[i]);
                i += 1;
            }
        }
        level = next;
    }
    level[0]
}

/// Build an inclusion proof for the leaf at `index`. Returns an empty proof
/// when there is only one leaf (the root equals the leaf itself).
pub fn merkle_proof(leaves: &[Digest], mut index: usize) -> Vec<ProofStep> {
    let mut level = leaves.to_vec();
    let mut proof = Vec::new();

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut i = 0;
        while i < level.len() {
            if i + 1 < level.len() {
                if i == index {
                    proof.push(ProofStep {
                        sibling: level[i + 1],
                        side: Side::Right,
                    });
                    index = next.len();
                } else if i + 1 == index {
                    proof.push(ProofStep {
                        sibling: level[i],
                        side: Side::Left,
                    });
                    index = next.len();
                }
                next.push(hash_pair(&level[i], &level[i + 1]));
                i += 2;
            } else {
                if i == index {
                    index = next.len();
                }
                next.push(level[i]);
                i += 1;
            }
        }
        level = next;
    }
    proof
}

/// Recompute the root implied by `leaf` and `proof`, and compare to `root`.
pub fn verify_proof(leaf: Digest, proof: &[ProofStep], root: Digest) -> bool {
    let mut current = leaf;
    for step in proof {
        current = match step.side {
            Side::Left => hash_pair(&step.sibling, &current),
            Side::Right => hash_pair(&current, &step.sibling),
        };
    }
    current == root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> Digest {
        content_hash(&[byte])
    }

    #[test]
    fn empty_tree_has_zero_root() {
        assert_eq!(merkle_root(&[]), Digest::ZERO);
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        let l = leaf(1);
        assert_eq!(merkle_root(&[l]), l);
    }

    #[test]
    fn odd_leaf_count_promotes_rather_than_duplicates() {
        let leaves = vec![leaf(1), leaf(2), leaf(3)];
        let root = merkle_root(&leaves);
        // manual construction: pair (1,2), promote 3, then pair result with 3
        let expected = hash_pair(&hash_pair(&leaves[0], &leaves[1]), &leaves[2]);
        assert_eq!(root, expected);
    }

    #[test]
    fn proof_verifies_for_every_leaf_in_even_tree() {
        let leaves: Vec<Digest> = (0..8).map(leaf).collect();
        let root = merkle_root(&leaves);
        for (i, l) in leaves.iter().enumerate() {
            let proof = merkle_proof(&leaves, i);
            assert!(verify_proof(*l, &proof, root), "leaf {i} failed to verify");
        }
    }

    #[test]
    fn proof_verifies_for_every_leaf_in_odd_tree() {
        let leaves: Vec<Digest> = (0..5).map(leaf).collect();
        let root = merkle_root(&leaves);
        for (i, l) in leaves.iter().enumerate() {
            let proof = merkle_proof(&leaves, i);
            assert!(verify_proof(*l, &proof, root), "leaf {i} failed to verify");
        }
    }

    #[test]
    fn tampered_leaf_fails_proof() {
        let leaves: Vec<Digest> = (0..4).map(leaf).collect();
        let root = merkle_root(&leaves);
        let proof = merkle_proof(&leaves, 2);
        assert!(!verify_proof(leaf(99), &proof, root));
    }
}
