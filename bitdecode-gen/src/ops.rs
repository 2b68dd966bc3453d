//! Extraction-operation definitions and their association with patterns.

use indexmap::IndexMap;

use bitdecode_pattern::Uid;

use crate::input::{OpMeta, PatternTable};
use crate::Error;

/// A named extraction operation.
///
/// `op` is an operator tag interpreted by the emitter (often the name of a
/// `deffun` function invoked through the transpiler); `args` reference
/// constants or placeholder names.
#[derive(Debug, Clone, PartialEq)]
pub struct OpsDef {
    /// Operation name as written in the input.
    pub name: String,
    /// Field of the target record the result lands in.
    pub dest: String,
    /// Operator tag.
    pub op: String,
    /// Operator arguments.
    pub args: Vec<serde_yaml::Value>,
}

/// Maps every pattern to its ordered extraction operations.
#[derive(Debug, Clone)]
pub struct OpsRepo {
    ops: IndexMap<String, OpsDef>,
    by_uid: Vec<Vec<String>>,
}

impl OpsRepo {
    /// Builds the repository from the `operations` section and the pattern
    /// arena. A pattern listing an undefined operation is rejected with
    /// [`Error::UnknownOperation`].
    pub fn build(
        operations: &IndexMap<String, OpMeta>,
        patterns: &PatternTable,
    ) -> Result<Self, Error> {
        let ops: IndexMap<String, OpsDef> = operations
            .iter()
            .map(|(name, meta)| {
                (
                    name.clone(),
                    OpsDef {
                        name: name.clone(),
                        dest: meta.dest.clone(),
                        op: meta.op.clone(),
                        args: meta.args.clone(),
                    },
                )
            })
            .collect();

        let mut by_uid = Vec::with_capacity(patterns.len());
        for (_, record) in patterns.iter() {
            for name in &record.ops {
                if !ops.contains_key(name) {
                    return Err(Error::UnknownOperation {
                        name: name.clone(),
                        pattern: record.source.clone(),
                    });
                }
            }
            by_uid.push(record.ops.clone());
        }

        Ok(Self { ops, by_uid })
    }

    /// All defined operations, in input order.
    pub fn ops(&self) -> impl Iterator<Item = &OpsDef> {
        self.ops.values()
    }

    /// The operations to run when a pattern matches, in listed order.
    /// Foreign tokens resolve to no operations.
    pub fn ops_for(&self, uid: Uid) -> impl Iterator<Item = &OpsDef> {
        self.by_uid
            .get(uid.index())
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|name| self.ops.get(name))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::input::InputDoc;
    use pretty_assertions::assert_eq;

    fn build(yaml: &str) -> Result<(OpsRepo, PatternTable), Error> {
        let doc = InputDoc::from_yaml(yaml).unwrap();
        let table = PatternTable::parse(&doc.patterns)?;
        let repo = OpsRepo::build(&doc.operations, &table)?;
        Ok((repo, table))
    }

    #[test]
    fn test_patterns_without_ops_resolve_to_nothing() {
        let (repo, table) = build("patterns:\n  '1010': {}\n").unwrap();
        let (uid, _) = table.iter().next().unwrap();
        assert_eq!(repo.ops_for(uid).count(), 0);
    }

    #[test]
    fn test_ops_keep_their_listed_order() {
        let yaml = "patterns:\n  '1010': {ops: [imm, flags]}\noperations:\n  flags:\n    dest: f\n    op: call\n    args: []\n  imm:\n    dest: imm32\n    op: call\n    args: [$msb]\n";
        let (repo, table) = build(yaml).unwrap();
        let (uid, _) = table.iter().next().unwrap();

        let order: Vec<_> = repo.ops_for(uid).map(|op| op.name.as_str()).collect();
        assert_eq!(order, vec!["imm", "flags"]);
        assert_eq!(repo.ops().count(), 2);
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        let err = build("patterns:\n  '1010': {ops: [missing]}\n");
        assert!(matches!(
            err,
            Err(Error::UnknownOperation { name, .. }) if name == "missing"
        ));
    }
}
