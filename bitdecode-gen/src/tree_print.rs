//! Human-readable rendering of a flattened decode tree.

use std::io;

use bitdecode_pattern::tree::FlatNode;

use crate::emit::Printer;

/// Column where the pattern starts, so gutters line up across depths.
const TREE_INDENT_WIDTH: usize = 20;

/// Renders one line per flat-tree row.
///
/// Branch rows open a subtree (`├─┐`); leaf rows print their pattern and
/// the label the resolver supplies for their token, with the last child of
/// a subtree drawn as `└─`. A blank line precedes every depth-0 row.
///
/// ```text
/// ├─ x               | 11xxxxx0 | ADD
/// └─┐                | 11xxxxx1
/// │ ├─ x             | xxxxxx0x | LDR
/// │ └─ x             | xxxxxx1x | STR
/// ```
pub fn print_tree<Id: Copy, F>(
    printer: &mut dyn Printer,
    flat_tree: &[FlatNode<Id>],
    label: F,
) -> io::Result<()>
where
    F: Fn(Id) -> String,
{
    for row in flat_tree {
        let indent = "│ ".repeat(row.depth as usize);
        if row.depth == 0 {
            printer.print("")?;
        }

        match row.uid {
            Some(uid) => {
                let marker = if row.is_last_child { "└─ x" } else { "├─ x" };
                let gutter = format!("{indent}{marker}");
                printer.print(&format!(
                    "{gutter:<TREE_INDENT_WIDTH$}| {} | {}",
                    row.pat,
                    label(uid)
                ))?;
            }
            None => {
                let gutter = format!("{indent}├─┐");
                printer.print(&format!("{gutter:<TREE_INDENT_WIDTH$}| {}", row.pat))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::emit::StringPrinter;
    use bitdecode_pattern::tree::{build_decode_tree, flatten_tree};
    use bitdecode_pattern::{BitPattern, Uid};
    use pretty_assertions::assert_eq;

    fn flat(pats: &[&str], width: u32) -> Vec<FlatNode<Uid>> {
        let parsed: Vec<(BitPattern, Uid)> = pats
            .iter()
            .enumerate()
            .map(|(i, s)| (s.parse().unwrap(), Uid::new(i)))
            .collect();
        flatten_tree(&build_decode_tree(&parsed, width).unwrap())
    }

    #[test]
    fn test_single_leaf_renders_one_labelled_line() {
        let mut printer = StringPrinter::new();
        print_tree(&mut printer, &flat(&["11x00x11"], 8), |uid: Uid| {
            format!("pat{}", uid.index())
        })
        .unwrap();

        assert_eq!(
            printer.as_str(),
            "\n└─ x                | 11x00x11 | pat0\n"
        );
    }

    #[test]
    fn test_branches_open_a_gutter_for_their_children() {
        let mut printer = StringPrinter::new();
        print_tree(&mut printer, &flat(&["11x00x11", "11xxx0xx"], 8), |uid: Uid| {
            format!("pat{}", uid.index())
        })
        .unwrap();

        assert_eq!(
            printer.as_str(),
            concat!(
                "\n",
                "├─┐                 | 11xxxxxx\n",
                "│ ├─ x              | xxx00x11 | pat0\n",
                "│ └─ x              | xxxxx0xx | pat1\n",
            )
        );
    }
}
