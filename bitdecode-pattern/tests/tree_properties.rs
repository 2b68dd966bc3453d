//! Whole-tree invariants over representative pattern sets.

use bitdecode_pattern::tree::{build_decode_tree, flatten_tree, DecodeNode, FlatNode};
use bitdecode_pattern::{BitPattern, Uid};

use rstest::rstest;

fn with_uids(pats: &[&str]) -> Vec<(BitPattern, Uid)> {
    pats.iter()
        .enumerate()
        .map(|(i, s)| (s.parse().unwrap(), Uid::new(i)))
        .collect()
}

/// Thumb-flavored mix: narrow and wide encodings, catch-alls, overlaps.
const MIXED_ISA: &[&str] = &[
    "11x00x11",
    "11xxx0xx",
    "11xxxxx0",
    "0101xxxx",
    "0100xxxx",
    "00xxxxxx",
    "1110",
    "10",
];

#[rstest]
#[case(&["11x00x11"], 8)]
#[case(&["11x00x11", "11xxx0xx"], 8)]
#[case(&["11xxxxx0", "11xxxx01", "11xxxx11"], 8)]
#[case(&["1010", "1010", "10xx"], 4)]
#[case(MIXED_ISA, 8)]
fn test_every_input_has_exactly_one_leaf(#[case] pats: &[&str], #[case] width: u32) {
    let input = with_uids(pats);
    let flat = flatten_tree(&build_decode_tree(&input, width).unwrap());

    let mut leaf_uids: Vec<usize> = flat
        .iter()
        .filter_map(|row| row.uid)
        .map(|uid| uid.index())
        .collect();
    leaf_uids.sort_unstable();

    assert_eq!(leaf_uids, (0..pats.len()).collect::<Vec<_>>());
}

#[rstest]
#[case(&["11x00x11", "11xxx0xx"], 8)]
#[case(&["11xxxxx0", "11xxxx01", "11xxxx11"], 8)]
#[case(&["0x", "11"], 4)]
#[case(MIXED_ISA, 8)]
fn test_leaf_and_ancestors_reconstruct_the_aligned_input(
    #[case] pats: &[&str],
    #[case] width: u32,
) {
    let input = with_uids(pats);
    let flat = flatten_tree(&build_decode_tree(&input, width).unwrap());

    // Branch patterns per open depth, maintained while scanning pre-order.
    let mut ancestors: Vec<BitPattern> = Vec::new();
    for row in &flat {
        ancestors.truncate(row.depth as usize);
        match row.uid {
            None => ancestors.push(row.pat),
            Some(uid) => {
                let combined = ancestors
                    .iter()
                    .try_fold(row.pat, |acc, branch| acc.combine(branch))
                    .unwrap();
                let original = input[uid.index()]
                    .0
                    .extend_and_shift_to_msb(width)
                    .unwrap();
                assert_eq!(
                    combined, original,
                    "leaf {} does not reassemble its input",
                    uid
                );
            }
        }
    }
}

#[rstest]
#[case(&["11xxxxx0", "11xxxx01", "11xxxx11"], 8)]
#[case(&["0x", "11"], 4)]
#[case(MIXED_ISA, 8)]
fn test_children_are_sorted_by_descending_specificity(#[case] pats: &[&str], #[case] width: u32) {
    fn check<Id>(node: &DecodeNode<Id>) {
        let specs: Vec<u32> = node.children().iter().map(DecodeNode::specificity).collect();
        assert!(
            specs.windows(2).all(|w| w[0] >= w[1]),
            "children out of order: {specs:?}"
        );
        node.children().iter().for_each(check);
    }

    check(&build_decode_tree(&with_uids(pats), width).unwrap());
}

#[test]
fn test_identical_input_builds_identical_flat_trees() {
    let a: Vec<FlatNode<Uid>> =
        flatten_tree(&build_decode_tree(&with_uids(MIXED_ISA), 8).unwrap());
    let b: Vec<FlatNode<Uid>> =
        flatten_tree(&build_decode_tree(&with_uids(MIXED_ISA), 8).unwrap());
    assert_eq!(a, b);
}

#[test]
fn test_distinct_inputs_never_produce_identical_siblings() {
    // Overlapping patterns may end up as siblings matched in child order,
    // but only duplicate inputs may yield structurally equal ones.
    let tree = build_decode_tree(&with_uids(MIXED_ISA), 8).unwrap();

    fn check<Id>(node: &DecodeNode<Id>) {
        let leaves: Vec<&BitPattern> = node
            .children()
            .iter()
            .filter(|c| c.is_leaf())
            .filter_map(|c| c.pattern())
            .collect();
        for (i, a) in leaves.iter().enumerate() {
            for b in &leaves[i + 1..] {
                assert_ne!(*a, *b, "identical siblings for distinct inputs");
            }
        }
        node.children().iter().for_each(check);
    }

    check(&tree);
}
