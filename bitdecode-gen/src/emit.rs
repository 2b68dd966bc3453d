//! Collaborator seams and the context handed to the code emitter.

use std::io::{self, Write};

use bitdecode_pattern::bits::byte_len;
use bitdecode_pattern::tree::{FlatNode, SizeProbe};
use bitdecode_pattern::{BitPattern, DataUid, Uid};

use crate::action::Transpiler;
use crate::input::PatternTable;
use crate::ops::OpsRepo;
use crate::structs::StructRepo;
use crate::Error;

/// Line sink for everything the generator produces.
pub trait Printer {
    /// Writes one line, without its terminator.
    fn print(&mut self, line: &str) -> io::Result<()>;
}

/// Renders the emission context into target-language source.
///
/// Implementations live outside this crate (template packs, ad-hoc
/// emitters in tests); the generator only contracts for a synchronous
/// one-shot rendering.
pub trait TemplateEngine {
    /// Produces the full generated source for `ctx`.
    fn generate(&self, ctx: &EmissionContext<'_>) -> Result<String, Error>;
}

/// [`Printer`] writing to any byte sink, one line per call.
pub struct StreamPrinter<W> {
    out: W,
}

impl<W: Write> StreamPrinter<W> {
    /// Printer over `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Printer for StreamPrinter<W> {
    fn print(&mut self, line: &str) -> io::Result<()> {
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")
    }
}

/// [`Printer`] collecting lines in memory; the test-side sink.
#[derive(Debug, Default)]
pub struct StringPrinter {
    buf: String,
}

impl StringPrinter {
    /// An empty printer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed so far, newline-terminated.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// The printed lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.buf.lines()
    }
}

impl Printer for StringPrinter {
    fn print(&mut self, line: &str) -> io::Result<()> {
        self.buf.push_str(line);
        self.buf.push('\n');
        Ok(())
    }
}

/// How the generated decoder learns an instruction's size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeDecode {
    /// All patterns share one length; no probe is emitted.
    Uniform {
        /// The common instruction length in bits.
        bits: u32,
    },
    /// Mixed lengths; the decoder first probes the leading bytes.
    Probe {
        /// Flattened size tree.
        flat_tree: Vec<FlatNode<DataUid>>,
        /// Bit length per data token.
        lengths: Vec<u32>,
        /// Leading bits the probe inspects.
        probe: SizeProbe,
    },
}

impl SizeDecode {
    /// Bytes the caller must fetch before the size can be decided.
    pub fn size_eval_bytes(&self) -> u32 {
        match self {
            Self::Uniform { bits } => byte_len(*bits),
            Self::Probe { probe, .. } => probe.bytes,
        }
    }

    /// The instruction length a size-tree token stands for, in bits.
    pub fn length_of(&self, uid: DataUid) -> Option<u32> {
        match self {
            Self::Uniform { .. } => None,
            Self::Probe { lengths, .. } => lengths.get(uid.index()).copied(),
        }
    }
}

/// Everything the template engine needs to render a decoder.
pub struct EmissionContext<'a> {
    /// Width every pattern was extended to.
    pub decoder_width: u32,
    /// The ingested pattern arena.
    pub patterns: &'a PatternTable,
    /// Record types per pattern.
    pub structs: &'a StructRepo,
    /// Extraction operations per pattern.
    pub ops: &'a OpsRepo,
    /// Flattened decode tree, one row per match probe.
    pub flat_tree: &'a [FlatNode<Uid>],
    /// Size decoding strategy.
    pub size: &'a SizeDecode,
    /// Transpiler over the document's `deffun` section.
    pub transpiler: Transpiler<'a>,
    /// Free-form input payload, passed through untouched.
    pub context: &'a serde_yaml::Value,
}

impl EmissionContext<'_> {
    /// Bytes the full decoder inspects per instruction word.
    pub fn decoder_eval_bytes(&self) -> u32 {
        byte_len(self.decoder_width)
    }

    /// Bytes the size probe inspects; equals [`Self::decoder_eval_bytes`]
    /// for uniform-size instruction sets fetched in one piece.
    pub fn size_eval_bytes(&self) -> u32 {
        self.size.size_eval_bytes()
    }

    /// The leading slice of a size-tree pattern the probe actually tests.
    pub fn probe_pattern(&self, row: &FlatNode<DataUid>) -> Result<BitPattern, Error> {
        let bits = match self.size {
            SizeDecode::Uniform { .. } => self.decoder_width,
            SizeDecode::Probe { probe, .. } => probe.bytes * 8,
        };
        Ok(row.pat.extract_from_msb(bits.min(row.pat.bit_length()))?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_printer_collects_lines() {
        let mut printer = StringPrinter::new();
        printer.print("a").unwrap();
        printer.print("b").unwrap();
        assert_eq!(printer.as_str(), "a\nb\n");
        assert_eq!(printer.lines().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_stream_printer_terminates_lines() {
        let mut out = Vec::new();
        StreamPrinter::new(&mut out).print("decode").unwrap();
        assert_eq!(out, b"decode\n");
    }

    #[test]
    fn test_uniform_size_eval_bytes() {
        assert_eq!(SizeDecode::Uniform { bits: 16 }.size_eval_bytes(), 2);
        assert_eq!(SizeDecode::Uniform { bits: 12 }.size_eval_bytes(), 2);
    }
}
