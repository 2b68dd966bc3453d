//! The generation driver: from input document to printed artifact.

use tracing::{debug, info};

use bitdecode_pattern::tree::{
    build_decode_tree, flatten_tree, minimize_size_tree, probe_width, DecodeNode, FlatNode,
};
use bitdecode_pattern::{BitPattern, Uid};

use crate::action::{PythonVisitor, Transpiler};
use crate::emit::{EmissionContext, Printer, SizeDecode, TemplateEngine};
use crate::input::{InputDoc, PatternTable};
use crate::ops::OpsRepo;
use crate::structs::StructRepo;
use crate::tree_print::print_tree;
use crate::Error;

/// Everything derived from one input document: the pattern arena, the
/// associated repositories, the decode tree and the size strategy.
#[derive(Debug)]
pub struct DecoderModel {
    /// Width every pattern was extended to.
    pub decoder_width: u32,
    /// The ingested pattern arena.
    pub patterns: PatternTable,
    /// Record types per pattern.
    pub structs: StructRepo,
    /// Extraction operations per pattern.
    pub ops: OpsRepo,
    /// The dispatch tree.
    pub tree: DecodeNode<Uid>,
    /// The dispatch tree, linearized for emission.
    pub flat_tree: Vec<FlatNode<Uid>>,
    /// Size decoding strategy.
    pub size: SizeDecode,
}

impl DecoderModel {
    /// Builds the model for `doc` with patterns extended to
    /// `decoder_width` bits.
    pub fn build(doc: &InputDoc, decoder_width: u32) -> Result<Self, Error> {
        let patterns = PatternTable::parse(&doc.patterns)?;
        let structs = StructRepo::build(&doc.struct_def, &patterns)?;
        let ops = OpsRepo::build(&doc.operations, &patterns)?;

        let pairs: Vec<(BitPattern, Uid)> =
            patterns.iter().map(|(uid, r)| (r.pattern, uid)).collect();
        let tree = build_decode_tree(&pairs, decoder_width)?;
        let flat_tree = flatten_tree(&tree);

        let size = Self::size_decode(&tree, &patterns, decoder_width)?;
        debug!(
            patterns = patterns.len(),
            probes = flat_tree.len(),
            size_probe = matches!(size, SizeDecode::Probe { .. }),
            "decoder model built"
        );

        Ok(Self {
            decoder_width,
            patterns,
            structs,
            ops,
            tree,
            flat_tree,
            size,
        })
    }

    /// Derives the size strategy: a probe tree when at least two distinct
    /// patterns with differing lengths exist, a constant otherwise.
    fn size_decode(
        tree: &DecodeNode<Uid>,
        patterns: &PatternTable,
        decoder_width: u32,
    ) -> Result<SizeDecode, Error> {
        let uniform = SizeDecode::Uniform {
            bits: patterns.min_bit_length().unwrap_or(0),
        };
        if patterns.distinct_patterns() < 2 {
            return Ok(uniform);
        }

        match minimize_size_tree(tree, |uid| patterns.bit_length(uid)) {
            Some(size_tree) => {
                let flat_tree = flatten_tree(&size_tree.root);
                let narrowest = patterns.min_bit_length().unwrap_or(decoder_width);
                let probe = probe_width(&flat_tree, decoder_width, narrowest)?;
                Ok(SizeDecode::Probe {
                    flat_tree,
                    lengths: size_tree.lengths,
                    probe,
                })
            }
            None => Ok(uniform),
        }
    }
}

/// Generates decoder source for `doc` and prints it line by line.
///
/// The emission context is assembled from the decoder model plus the
/// document's `deffun` functions and pass-through `context` payload, then
/// handed to the template engine; its rendering flows through `printer`.
/// Nothing is printed when any stage fails.
pub fn generate_code(
    doc: &InputDoc,
    decoder_width: u32,
    engine: &dyn TemplateEngine,
    printer: &mut dyn Printer,
) -> Result<(), Error> {
    info!("generate_code");
    let model = DecoderModel::build(doc, decoder_width)?;

    let visitor = PythonVisitor;
    let ctx = EmissionContext {
        decoder_width,
        patterns: &model.patterns,
        structs: &model.structs,
        ops: &model.ops,
        flat_tree: &model.flat_tree,
        size: &model.size,
        transpiler: Transpiler::new(&doc.deffun, &visitor),
        context: &doc.context,
    };

    let rendered = engine.generate(&ctx)?;
    for line in rendered.lines() {
        printer.print(line)?;
    }
    Ok(())
}

/// Renders the decode tree of `doc` through `printer`.
///
/// Leaves are labelled with their pattern's `name` metadata, falling back
/// to the pattern string as written.
pub fn show_decode_tree(
    doc: &InputDoc,
    decoder_width: u32,
    printer: &mut dyn Printer,
) -> Result<(), Error> {
    info!("show_decode_tree");
    let model = DecoderModel::build(doc, decoder_width)?;
    print_tree(printer, &model.flat_tree, |uid| model.patterns.label(uid))?;
    Ok(())
}

/// Renders the minimized size tree of `doc` through `printer`, or reports
/// the uniform instruction size when no probe is needed.
pub fn show_size_tree(
    doc: &InputDoc,
    decoder_width: u32,
    printer: &mut dyn Printer,
) -> Result<(), Error> {
    info!("show_size_tree");
    let model = DecoderModel::build(doc, decoder_width)?;
    match &model.size {
        SizeDecode::Uniform { bits } => {
            printer.print(&format!("uniform instruction size: {bits} bits"))?;
        }
        SizeDecode::Probe {
            flat_tree,
            lengths,
            probe,
        } => {
            printer.print(&format!(
                "size probe reads {} byte(s) ({} significant bits)",
                probe.bytes, probe.bits
            ))?;
            print_tree(printer, flat_tree, |uid| {
                format!("len={} bits", lengths[uid.index()])
            })?;
        }
    }
    Ok(())
}
