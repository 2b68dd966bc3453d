use core::cmp::Reverse;
use core::mem;

use crate::group::group_by_fixed_bits;
use crate::tree::DecodeNode;
use crate::{BitPattern, Error, Uid};

/// Branch under construction. Completed child branches are referenced by
/// arena index; indices always point forward (a child slot is allocated
/// after its parent).
struct Slot {
    pat: Option<BitPattern>,
    children: Vec<ChildRef>,
}

enum ChildRef {
    Leaf { pat: BitPattern, uid: Uid },
    Branch(usize),
}

fn child_specificity(child: &ChildRef, slots: &[Slot]) -> u32 {
    match child {
        ChildRef::Leaf { pat, .. } => pat.specificity(),
        ChildRef::Branch(idx) => slots[*idx].pat.map_or(0, |p| p.specificity()),
    }
}

/// Builds the dispatch tree for a set of patterns.
///
/// Every pattern is first widened to `decoder_width` bits (MSB aligned),
/// then the set is partitioned round by round: patterns agreeing on their
/// shared fixed bits form a branch keyed by those bits, and the branch's
/// residuals are partitioned again until every pattern sits in a leaf of
/// its own. A bucket whose members share no fixed bit at all cannot be
/// split further; its patterns stay siblings and match in child order.
///
/// Children of every branch end up sorted by descending specificity, ties
/// keeping insertion order. The worklist terminates because every round
/// strips the shared mask from its residuals.
///
/// Fails with [`Error::WidthOverflow`] when a pattern is wider than
/// `decoder_width` and with [`Error::ConflictingPatterns`] when two inputs
/// cannot be told apart on any bit of a group's residual mask.
pub fn build_decode_tree(
    pats: &[(BitPattern, Uid)],
    decoder_width: u32,
) -> Result<DecodeNode<Uid>, Error> {
    let mut widened = Vec::with_capacity(pats.len());
    for (pat, uid) in pats {
        widened.push((pat.extend_and_shift_to_msb(decoder_width)?, *uid));
    }

    let mut slots = vec![Slot {
        pat: None,
        children: Vec::new(),
    }];
    let mut work = vec![(0usize, widened)];

    while let Some((slot_idx, leaves)) = work.pop() {
        if leaves.is_empty() {
            continue;
        }

        let groups = group_by_fixed_bits(&leaves)?;
        let mut children = Vec::new();

        for (shared, residuals) in groups {
            if let [(outer, uid)] = residuals.as_slice() {
                children.push(ChildRef::Leaf {
                    pat: shared.combine(outer)?,
                    uid: *uid,
                });
            } else if shared.fixed_mask() == 0 {
                // No bit distinguishes these patterns within this branch;
                // earlier siblings win at decode time.
                children.extend(
                    residuals
                        .into_iter()
                        .map(|(pat, uid)| ChildRef::Leaf { pat, uid }),
                );
            } else {
                let child_idx = slots.len();
                slots.push(Slot {
                    pat: Some(shared),
                    children: Vec::new(),
                });
                children.push(ChildRef::Branch(child_idx));
                work.push((child_idx, residuals));
            }
        }

        children.sort_by_key(|c| Reverse(child_specificity(c, &slots)));
        slots[slot_idx].children = children;
    }

    Ok(assemble(slots))
}

/// Turns the slot arena into an owned tree, children before parents.
fn assemble(mut slots: Vec<Slot>) -> DecodeNode<Uid> {
    let mut built: Vec<Option<DecodeNode<Uid>>> = slots.iter().map(|_| None).collect();

    for idx in (0..slots.len()).rev() {
        let children = mem::take(&mut slots[idx].children)
            .into_iter()
            .map(|child| match child {
                ChildRef::Leaf { pat, uid } => DecodeNode::Leaf { pat, uid },
                ChildRef::Branch(j) => built[j]
                    .take()
                    .expect("child slots are assembled before their parents"),
            })
            .collect();
        built[idx] = Some(DecodeNode::Branch {
            pat: slots[idx].pat,
            children,
        });
    }

    built[0]
        .take()
        .expect("the root slot always exists")
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pat(s: &str) -> BitPattern {
        s.parse().unwrap()
    }

    fn leaf(s: &str, uid: usize) -> DecodeNode<Uid> {
        DecodeNode::Leaf {
            pat: pat(s),
            uid: Uid::new(uid),
        }
    }

    fn with_uids(pats: &[&str]) -> Vec<(BitPattern, Uid)> {
        pats.iter()
            .enumerate()
            .map(|(i, s)| (pat(s), Uid::new(i)))
            .collect()
    }

    #[test]
    fn test_single_pattern_becomes_one_leaf_under_the_root() {
        let tree = build_decode_tree(&with_uids(&["11x00x11"]), 8).unwrap();

        assert_eq!(
            tree,
            DecodeNode::Branch {
                pat: None,
                children: vec![leaf("11x00x11", 0)],
            }
        );
    }

    #[test]
    fn test_shared_prefix_forms_a_branch_with_residual_leaves() {
        let tree = build_decode_tree(&with_uids(&["11x00x11", "11xxx0xx"]), 8).unwrap();

        assert_eq!(
            tree,
            DecodeNode::Branch {
                pat: None,
                children: vec![DecodeNode::Branch {
                    pat: Some(pat("11xxxxxx")),
                    children: vec![leaf("xxx00x11", 0), leaf("xxxxx0xx", 1)],
                }],
            }
        );
    }

    #[test]
    fn test_exclusive_low_bits_split_into_nested_branch() {
        let tree =
            build_decode_tree(&with_uids(&["11xxxxx0", "11xxxx01", "11xxxx11"]), 8).unwrap();

        assert_eq!(
            tree,
            DecodeNode::Branch {
                pat: None,
                children: vec![
                    leaf("11xxxxx0", 0),
                    DecodeNode::Branch {
                        pat: Some(pat("11xxxxx1")),
                        children: vec![leaf("xxxxxx0x", 1), leaf("xxxxxx1x", 2)],
                    },
                ],
            }
        );
    }

    #[test]
    fn test_children_sort_by_descending_specificity() {
        let tree = build_decode_tree(&with_uids(&["0x", "11"]), 2).unwrap();

        assert_eq!(
            tree,
            DecodeNode::Branch {
                pat: None,
                children: vec![leaf("11", 1), leaf("0x", 0)],
            }
        );
    }

    #[test]
    fn test_narrow_patterns_are_extended_to_the_decoder_width() {
        let tree = build_decode_tree(&with_uids(&["0x", "11"]), 4).unwrap();

        assert_eq!(
            tree,
            DecodeNode::Branch {
                pat: None,
                children: vec![leaf("11xx", 1), leaf("0xxx", 0)],
            }
        );
    }

    #[test]
    fn test_indistinguishable_patterns_stay_siblings_in_insertion_order() {
        let tree = build_decode_tree(&with_uids(&["1010", "1010"]), 4).unwrap();

        assert_eq!(
            tree,
            DecodeNode::Branch {
                pat: None,
                children: vec![DecodeNode::Branch {
                    pat: Some(pat("1010")),
                    children: vec![leaf("xxxx", 0), leaf("xxxx", 1)],
                }],
            }
        );
    }

    #[test]
    fn test_empty_input_yields_an_empty_root() {
        let tree = build_decode_tree(&[], 8).unwrap();

        assert_eq!(
            tree,
            DecodeNode::Branch {
                pat: None,
                children: vec![],
            }
        );
    }

    #[test]
    fn test_pattern_wider_than_decoder_width_fails() {
        let err = build_decode_tree(&with_uids(&["11x00x11"]), 4);
        assert_eq!(err, Err(Error::WidthOverflow { width: 8, max: 4 }));
    }
}
