//! Record-type definitions and their association with patterns.

use indexmap::IndexMap;

use bitdecode_pattern::Uid;

use crate::input::{PatternTable, StructMeta};
use crate::Error;

/// Name of the built-in fallback struct. Patterns without a `to` entry
/// resolve to it; users may not define it themselves.
pub const UNDEF_STRUCT: &str = "Undef";

/// A named record type with ordered members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    /// Type name as written in the input.
    pub name: String,
    /// Member names, in declaration order.
    pub members: Vec<String>,
}

/// Maps every pattern to the record type its decode produces.
#[derive(Debug, Clone)]
pub struct StructRepo {
    structs: IndexMap<String, StructDef>,
    by_uid: Vec<String>,
}

impl StructRepo {
    /// Builds the repository from the `struct_def` section and the pattern
    /// arena.
    ///
    /// The reserved [`UNDEF_STRUCT`] (single member `code`) is appended for
    /// internal use; a user definition of that name is rejected with
    /// [`Error::ReservedName`]. A pattern naming an undefined struct is
    /// rejected with [`Error::UnknownStruct`].
    pub fn build(
        struct_def: &IndexMap<String, StructMeta>,
        patterns: &PatternTable,
    ) -> Result<Self, Error> {
        let mut structs: IndexMap<String, StructDef> = struct_def
            .iter()
            .map(|(name, meta)| {
                (
                    name.clone(),
                    StructDef {
                        name: name.clone(),
                        members: meta.members.clone(),
                    },
                )
            })
            .collect();

        if structs.contains_key(UNDEF_STRUCT) {
            return Err(Error::ReservedName(UNDEF_STRUCT.into()));
        }
        structs.insert(
            UNDEF_STRUCT.into(),
            StructDef {
                name: UNDEF_STRUCT.into(),
                members: vec!["code".into()],
            },
        );

        let mut by_uid = Vec::with_capacity(patterns.len());
        for (_, record) in patterns.iter() {
            let name = record.to.as_deref().unwrap_or(UNDEF_STRUCT);
            if !structs.contains_key(name) {
                return Err(Error::UnknownStruct {
                    name: name.into(),
                    pattern: record.source.clone(),
                });
            }
            by_uid.push(name.to_owned());
        }

        Ok(Self { structs, by_uid })
    }

    /// All known structs, user definitions first, `Undef` last.
    pub fn structs(&self) -> impl Iterator<Item = &StructDef> {
        self.structs.values()
    }

    /// The record type a pattern decodes into. Foreign tokens resolve to
    /// the `Undef` struct.
    pub fn struct_for(&self, uid: Uid) -> &StructDef {
        self.by_uid
            .get(uid.index())
            .and_then(|name| self.structs.get(name))
            .unwrap_or(&self.structs[UNDEF_STRUCT])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::input::InputDoc;
    use pretty_assertions::assert_eq;

    fn build(yaml: &str) -> Result<(StructRepo, PatternTable), Error> {
        let doc = InputDoc::from_yaml(yaml).unwrap();
        let table = PatternTable::parse(&doc.patterns)?;
        let repo = StructRepo::build(&doc.struct_def, &table)?;
        Ok((repo, table))
    }

    #[test]
    fn test_undef_struct_is_always_present() {
        let (repo, _) = build("").unwrap();
        let names: Vec<_> = repo.structs().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![UNDEF_STRUCT]);
        assert_eq!(repo.structs().next().unwrap().members, vec!["code"]);
    }

    #[test]
    fn test_patterns_default_to_undef() {
        let (repo, table) = build("patterns:\n  '1010': {}\n").unwrap();
        let (uid, _) = table.iter().next().unwrap();
        assert_eq!(repo.struct_for(uid).name, UNDEF_STRUCT);
    }

    #[test]
    fn test_patterns_resolve_their_target_struct() {
        let (repo, table) = build(
            "patterns:\n  '1010': {to: Load}\nstruct_def:\n  Load:\n    members: [d, imm32]\n",
        )
        .unwrap();
        let (uid, _) = table.iter().next().unwrap();
        assert_eq!(repo.struct_for(uid).name, "Load");
        assert_eq!(repo.struct_for(uid).members, vec!["d", "imm32"]);
    }

    #[test]
    fn test_user_defined_undef_is_rejected() {
        let err = build("struct_def:\n  Undef:\n    members: [a]\n");
        assert!(matches!(err, Err(Error::ReservedName(_))));
    }

    #[test]
    fn test_unknown_target_struct_is_rejected() {
        let err = build("patterns:\n  '1010': {to: Missing}\n");
        assert!(matches!(
            err,
            Err(Error::UnknownStruct { name, .. }) if name == "Missing"
        ));
    }
}
