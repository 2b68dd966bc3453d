//! The parsed input document and the pattern arena built from it.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Deserialize;

use bitdecode_pattern::{BitPattern, Uid};

use crate::action::Action;
use crate::Error;

/// Declarative decoder description, usually read from a YAML file.
///
/// Every section is optional; map sections keep their insertion order,
/// which fixes the order of every derived structure. Unknown top-level
/// keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputDoc {
    /// Pattern string to per-pattern metadata.
    #[serde(default)]
    pub patterns: IndexMap<String, PatternMeta>,
    /// Record type definitions.
    #[serde(default)]
    pub struct_def: IndexMap<String, StructMeta>,
    /// Named extraction operations.
    #[serde(default)]
    pub operations: IndexMap<String, OpMeta>,
    /// User-defined helper functions for the action transpiler.
    #[serde(default)]
    pub deffun: IndexMap<String, Action>,
    /// Free-form payload handed through to the emitter untouched.
    #[serde(default)]
    pub context: serde_yaml::Value,
}

impl InputDoc {
    /// Parses a YAML document; an empty document yields all defaults.
    pub fn from_yaml(text: &str) -> Result<Self, Error> {
        let doc: Option<Self> = serde_yaml::from_str(text)?;
        Ok(doc.unwrap_or_default())
    }
}

/// Metadata attached to one pattern entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternMeta {
    /// Target record type; defaults to the reserved `Undef` struct.
    #[serde(default)]
    pub to: Option<String>,
    /// Extraction operations to run on a match, in order.
    #[serde(default)]
    pub ops: Vec<String>,
    /// Human label used by the tree printer.
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of a `struct_def` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructMeta {
    /// Member names, in declaration order.
    #[serde(default)]
    pub members: Vec<String>,
}

/// Body of an `operations` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct OpMeta {
    /// Field of the target record the operation assigns to.
    pub dest: String,
    /// Operator tag interpreted by the emitter.
    pub op: String,
    /// Operator arguments: constants or placeholder names.
    #[serde(default)]
    pub args: Vec<serde_yaml::Value>,
}

/// One ingested pattern with its identity token implied by position.
#[derive(Debug, Clone)]
pub struct PatternRecord {
    /// The pattern string as written in the input.
    pub source: String,
    /// The parsed pattern.
    pub pattern: BitPattern,
    /// Human label, when given.
    pub name: Option<String>,
    /// Target struct name, when given.
    pub to: Option<String>,
    /// Names of the associated operations.
    pub ops: Vec<String>,
}

/// Arena of ingested patterns; a [`Uid`] is an index into it.
///
/// Records keep the insertion order of the input document, which makes
/// minted tokens and everything derived from them deterministic.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    records: Vec<PatternRecord>,
}

impl PatternTable {
    /// Parses every pattern of the input section, minting tokens in
    /// insertion order.
    pub fn parse(patterns: &IndexMap<String, PatternMeta>) -> Result<Self, Error> {
        let mut records = Vec::with_capacity(patterns.len());
        for (source, meta) in patterns {
            let pattern = source.parse::<BitPattern>()?;
            records.push(PatternRecord {
                source: source.clone(),
                pattern,
                name: meta.name.clone(),
                to: meta.to.clone(),
                ops: meta.ops.clone(),
            });
        }
        Ok(Self { records })
    }

    /// Tokens and records, in mint order.
    pub fn iter(&self) -> impl Iterator<Item = (Uid, &PatternRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(idx, record)| (Uid::new(idx), record))
    }

    /// The record behind a token.
    pub fn get(&self, uid: Uid) -> Option<&PatternRecord> {
        self.records.get(uid.index())
    }

    /// Bit length of the pattern behind a token; zero for a foreign token.
    pub fn bit_length(&self, uid: Uid) -> u32 {
        self.get(uid).map_or(0, |r| r.pattern.bit_length())
    }

    /// Printable label for a token: the `name` metadata when present,
    /// otherwise the pattern string as written.
    pub fn label(&self, uid: Uid) -> String {
        match self.get(uid) {
            Some(record) => record
                .name
                .clone()
                .unwrap_or_else(|| record.source.clone()),
            None => uid.to_string(),
        }
    }

    /// Number of ingested patterns.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no pattern was ingested.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Width of the narrowest pattern.
    pub fn min_bit_length(&self) -> Option<u32> {
        self.records
            .iter()
            .map(|r| r.pattern.bit_length())
            .min()
    }

    /// Number of structurally distinct patterns.
    pub fn distinct_patterns(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.pattern)
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_yaml_defaults_missing_sections() {
        let doc = InputDoc::from_yaml("patterns:\n  '1010': {}\n").unwrap();
        assert_eq!(doc.patterns.len(), 1);
        assert!(doc.struct_def.is_empty());
        assert!(doc.operations.is_empty());
        assert!(doc.deffun.is_empty());
        assert!(doc.context.is_null());
    }

    #[test]
    fn test_from_yaml_accepts_empty_document() {
        let doc = InputDoc::from_yaml("").unwrap();
        assert!(doc.patterns.is_empty());
    }

    #[test]
    fn test_pattern_meta_fields() {
        let doc = InputDoc::from_yaml(
            "patterns:\n  '10x1':\n    to: Load\n    ops: [imm]\n    name: LDR\n",
        )
        .unwrap();
        let meta = &doc.patterns["10x1"];
        assert_eq!(meta.to.as_deref(), Some("Load"));
        assert_eq!(meta.ops, vec!["imm"]);
        assert_eq!(meta.name.as_deref(), Some("LDR"));
    }

    #[test]
    fn test_parse_mints_uids_in_insertion_order() {
        let doc = InputDoc::from_yaml("patterns:\n  '1xxx': {}\n  '0xxx': {}\n").unwrap();
        let table = PatternTable::parse(&doc.patterns).unwrap();

        let sources: Vec<_> = table.iter().map(|(_, r)| r.source.as_str()).collect();
        assert_eq!(sources, vec!["1xxx", "0xxx"]);
        assert_eq!(table.label(Uid::new(0)), "1xxx");
    }

    #[test]
    fn test_parse_rejects_malformed_patterns() {
        let doc = InputDoc::from_yaml("patterns:\n  '1q': {}\n").unwrap();
        assert!(matches!(
            PatternTable::parse(&doc.patterns),
            Err(Error::Pattern(bitdecode_pattern::Error::IllegalBitChar('q')))
        ));
    }

    #[test]
    fn test_distinct_patterns_ignores_wildcard_spelling() {
        let doc = InputDoc::from_yaml("patterns:\n  '1x.O': {}\n  '1xxx': {}\n  '0xxx': {}\n")
            .unwrap();
        let table = PatternTable::parse(&doc.patterns).unwrap();
        assert_eq!(table.distinct_patterns(), 2);
        assert_eq!(table.min_bit_length(), Some(4));
    }
}
