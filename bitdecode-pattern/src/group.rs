//! Shared-fixed-bits grouping over pattern sets.

use indexmap::IndexMap;

use crate::{BitPattern, Error, Word};

/// Intersection of the fixed masks of every pattern in the set.
///
/// Fails with [`Error::EmptyPatternSet`] on empty input.
pub fn common_fixed_mask<'a, I>(pats: I) -> Result<Word, Error>
where
    I: IntoIterator<Item = &'a BitPattern>,
{
    let mut pats = pats.into_iter();
    let first = pats.next().ok_or(Error::EmptyPatternSet)?;
    Ok(pats.fold(first.fixed_mask(), |mask, p| mask & p.fixed_mask()))
}

/// Buckets patterns by the bits they share under the common fixed mask.
///
/// Every pattern is split into the part selected by the common mask (the
/// group key) and the residual part. The result maps each shared-bits
/// signature to the residuals that carry it, each paired with its payload
/// (the original pattern, an identity token, ...). Both the bucket order
/// and the order within a bucket follow input order.
pub fn group_by_fixed_bits<T: Clone>(
    pats: &[(BitPattern, T)],
) -> Result<IndexMap<BitPattern, Vec<(BitPattern, T)>>, Error> {
    let mask = common_fixed_mask(pats.iter().map(|(p, _)| p))?;

    let mut groups: IndexMap<BitPattern, Vec<(BitPattern, T)>> = IndexMap::new();
    for (pat, payload) in pats {
        let (inner, outer) = pat.split_by_mask(mask)?;
        groups
            .entry(inner)
            .or_default()
            .push((outer, payload.clone()));
    }

    Ok(groups)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pat(s: &str) -> BitPattern {
        s.parse().unwrap()
    }

    fn with_self(pats: &[BitPattern]) -> Vec<(BitPattern, BitPattern)> {
        pats.iter().map(|p| (*p, *p)).collect()
    }

    #[test]
    fn test_common_fixed_mask_of_equal_patterns() {
        let mask = common_fixed_mask([pat("11x00x11"), pat("11x00x11")].iter()).unwrap();
        assert_eq!(mask, 0xdb);
    }

    #[test]
    fn test_common_fixed_mask_of_different_patterns() {
        let mask = common_fixed_mask([pat("11x00x11"), pat("11xxxxxx")].iter()).unwrap();
        assert_eq!(mask, 0xc0);

        let mask =
            common_fixed_mask([pat("11x00x11"), pat("11xxxxxx"), pat("01xxxxxx")].iter()).unwrap();
        assert_eq!(mask, 0x80);
    }

    #[test]
    fn test_common_fixed_mask_of_empty_set_fails() {
        let empty: [BitPattern; 0] = [];
        assert_eq!(common_fixed_mask(empty.iter()), Err(Error::EmptyPatternSet));
    }

    #[test]
    fn test_group_by_fixed_bits_buckets_on_shared_signature() {
        let pats = with_self(&[pat("11xxxxx0"), pat("11xxxx01"), pat("11xxxx11")]);
        let groups = group_by_fixed_bits(&pats).unwrap();

        let expected: IndexMap<_, Vec<(BitPattern, BitPattern)>> = IndexMap::from([
            (
                pat("11xxxxx0"),
                vec![(BitPattern::new(0x0, 0x0, 8).unwrap(), pat("11xxxxx0"))],
            ),
            (
                pat("11xxxxx1"),
                vec![
                    (pat("xxxxxx0x"), pat("11xxxx01")),
                    (pat("xxxxxx1x"), pat("11xxxx11")),
                ],
            ),
        ]);
        assert_eq!(groups, expected);
    }

    #[test]
    fn test_group_by_fixed_bits_keeps_insertion_order() {
        let pats = with_self(&[pat("1xx1"), pat("0xx0"), pat("1xx0")]);
        let groups = group_by_fixed_bits(&pats).unwrap();

        let keys: Vec<_> = groups.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["1xxx", "0xxx"]);
        assert_eq!(groups[&pat("1xxx")].len(), 2);
    }

    #[test]
    fn test_group_by_fixed_bits_with_no_shared_mask_yields_one_bucket() {
        let pats = with_self(&[pat("1xxx"), pat("xxx0")]);
        let groups = group_by_fixed_bits(&pats).unwrap();

        assert_eq!(groups.len(), 1);
        let residuals = &groups[&BitPattern::new(0x0, 0x0, 4).unwrap()];
        assert_eq!(residuals[0].0, pat("1xxx"));
        assert_eq!(residuals[1].0, pat("xxx0"));
    }
}
