use itertools::Itertools;

use crate::bits::byte_len;
use crate::tree::{DecodeNode, FlatNode};
use crate::{BitPattern, DataUid, Error, Uid};

/// A decode tree minimized to distinguish only instruction lengths.
///
/// Leaves carry [`DataUid`] tokens; `lengths[uid.index()]` is the bit
/// length the token stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeTree {
    /// Root of the minimized tree.
    pub root: DecodeNode<DataUid>,
    /// Bit length per data token, in first-discovery order.
    pub lengths: Vec<u32>,
}

/// How many leading bits the size probe must inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeProbe {
    /// Highest fixed-bit position the size tree tests.
    pub bits: u32,
    /// `bits` rounded up to whole fetchable bytes.
    pub bytes: u32,
}

/// Collapses a decode tree into its size tree.
///
/// Every leaf's pattern token is replaced by a [`DataUid`] keyed on the
/// originating pattern's bit length (`len_of`), so patterns of equal
/// length become indistinguishable. Bottom up, a branch whose children
/// are all leaves sharing one data token folds into a single leaf made of
/// the branch's own pattern and that token.
///
/// Returns `None` when at most one distinct length remains; a decoder
/// then uses a constant size and needs no probe at all.
pub fn minimize_size_tree<F>(tree: &DecodeNode<Uid>, len_of: F) -> Option<SizeTree>
where
    F: Fn(Uid) -> u32,
{
    struct Entry {
        pat: Option<BitPattern>,
        uid: Option<DataUid>,
        children: Vec<usize>,
    }

    // Pre-order linearization; data tokens are minted in visit order so
    // reruns on identical input mint identical tokens.
    let mut lengths: Vec<u32> = Vec::new();
    let mut entries: Vec<Entry> = Vec::new();
    let mut stack: Vec<(&DecodeNode<Uid>, Option<usize>)> = vec![(tree, None)];

    while let Some((node, parent)) = stack.pop() {
        let idx = entries.len();
        let entry = match node {
            DecodeNode::Leaf { pat, uid } => {
                let len = len_of(*uid);
                let data_uid = match lengths.iter().position(|l| *l == len) {
                    Some(slot) => DataUid::new(slot),
                    None => {
                        lengths.push(len);
                        DataUid::new(lengths.len() - 1)
                    }
                };
                Entry {
                    pat: Some(*pat),
                    uid: Some(data_uid),
                    children: Vec::new(),
                }
            }
            DecodeNode::Branch { pat, children } => {
                stack.extend(children.iter().rev().map(|child| (child, Some(idx))));
                Entry {
                    pat: *pat,
                    uid: None,
                    children: Vec::new(),
                }
            }
        };
        entries.push(entry);
        if let Some(parent) = parent {
            entries[parent].children.push(idx);
        }
    }

    if lengths.len() < 2 {
        return None;
    }

    // Children before parents, folding single-length branches as we go.
    let mut built: Vec<Option<DecodeNode<DataUid>>> = entries.iter().map(|_| None).collect();
    for idx in (0..entries.len()).rev() {
        let entry = &entries[idx];
        if let (Some(pat), Some(uid)) = (entry.pat, entry.uid) {
            built[idx] = Some(DecodeNode::Leaf { pat, uid });
            continue;
        }

        let children: Vec<DecodeNode<DataUid>> = entry
            .children
            .iter()
            .map(|j| built[*j].take().expect("children are built before parents"))
            .collect();

        let leaf_uids: Option<Vec<DataUid>> = children
            .iter()
            .map(|child| match child {
                DecodeNode::Leaf { uid, .. } => Some(*uid),
                DecodeNode::Branch { .. } => None,
            })
            .collect();

        built[idx] = Some(match (entry.pat, leaf_uids) {
            (Some(pat), Some(uids)) if !uids.is_empty() && uids.iter().all_equal() => {
                DecodeNode::Leaf { pat, uid: uids[0] }
            }
            _ => DecodeNode::Branch {
                pat: entry.pat,
                children,
            },
        });
    }

    let root = built[0].take().expect("the root entry always exists");
    Some(SizeTree { root, lengths })
}

/// Computes how many leading bits the flattened size tree inspects.
///
/// The probe width is the deepest fixed-bit position tested anywhere in
/// the size tree, rounded up to whole bytes. Fails with
/// [`Error::SizeProbeOverflow`] when fetching that many bytes would read
/// past the narrowest instruction.
pub fn probe_width(
    flat: &[FlatNode<DataUid>],
    decoder_width: u32,
    narrowest_bits: u32,
) -> Result<SizeProbe, Error> {
    let bits = flat
        .iter()
        .map(|row| decoder_width - row.pat.trailing_wildcards())
        .max()
        .unwrap_or(0);
    let bytes = byte_len(bits);

    if bytes * 8 > narrowest_bits {
        return Err(Error::SizeProbeOverflow {
            probe_bits: bytes * 8,
            narrowest_bits,
        });
    }

    Ok(SizeProbe { bits, bytes })
}
