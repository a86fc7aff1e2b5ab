//! Pretty-printing for graphs
//!
//! Provides human-readable output for debugging. Dumping never changes the graph.

use super::block::BlockFlags;
use super::graph::Graph;
use super::ids::{BlockId, InstId};
use crate::config::DumpOptions;
use crate::error::IrResult;
use std::fmt::Write as _;
use std::io;

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Graph {
    fn pretty_print(&self) -> String {
        self.render(DumpOptions::default())
    }
}

const FLAG_NAMES: [(BlockFlags, &str); 7] = [
    (BlockFlags::START, "start"),
    (BlockFlags::END, "end"),
    (BlockFlags::TRY_BEGIN, "try_begin"),
    (BlockFlags::TRY, "try"),
    (BlockFlags::TRY_END, "try_end"),
    (BlockFlags::CATCH_BEGIN, "catch_begin"),
    (BlockFlags::CATCH, "catch"),
];

pub(crate) fn flag_names(flags: BlockFlags) -> Vec<&'static str> {
    FLAG_NAMES
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, name)| *name)
        .collect()
}

impl Graph {
    /// Write the text dump to `sink`
    pub fn dump<W: io::Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        self.dump_with(sink, DumpOptions::default())
    }

    pub fn dump_with<W: io::Write + ?Sized>(
        &self,
        sink: &mut W,
        options: DumpOptions,
    ) -> io::Result<()> {
        sink.write_all(self.render(options).as_bytes())
    }

    /// Text dump as a string
    pub fn render(&self, options: DumpOptions) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "{} ({:?}, {} blocks)",
            self.id(),
            self.isa(),
            self.block_count()
        )
        .unwrap();
        for (index, _) in self.blocks.iter() {
            self.render_block(&mut output, index, options);
        }
        output
    }

    pub fn dump_block(&self, bb: BlockId) -> IrResult<String> {
        let index = self.check_block(bb)?;
        let mut output = String::new();
        self.render_block(&mut output, index, DumpOptions::default());
        Ok(output)
    }

    pub fn dump_inst(&self, inst: InstId) -> IrResult<String> {
        let index = self.check_inst(inst)?;
        let mut output = String::new();
        self.render_inst(&mut output, index, DumpOptions::default());
        Ok(output)
    }

    fn render_block(&self, output: &mut String, index: u32, options: DumpOptions) {
        let block = &self.blocks[index];
        let names = |list: &[u32]| {
            list.iter()
                .map(|&b| format!("bb{}", b))
                .collect::<Vec<_>>()
                .join(", ")
        };

        write!(output, "bb{}", index).unwrap();
        let flags = flag_names(block.flags);
        if !flags.is_empty() {
            write!(output, " [{}]", flags.join(", ")).unwrap();
        }
        writeln!(
            output,
            " preds: [{}] succs: [{}]",
            names(&block.preds),
            names(&block.succs)
        )
        .unwrap();

        for &inst in &block.insts {
            output.push_str("  ");
            self.render_inst(output, inst, options);
            output.push('\n');
        }
    }

    fn render_inst(&self, output: &mut String, index: u32, options: DumpOptions) {
        let data = &self.insts[index];
        if options.show_types {
            write!(output, "v{}: {} = {}", index, data.ty, data.op).unwrap();
        } else {
            write!(output, "v{} = {}", index, data.op).unwrap();
        }

        if !data.inputs.is_empty() {
            let inputs: Vec<String> = data.inputs.iter().map(|i| format!("v{}", i)).collect();
            write!(output, " {}", inputs.join(", ")).unwrap();
        }
        for imm in &data.imms {
            write!(output, " #{}:{}", imm.value, imm.width.bits()).unwrap();
        }

        let operands = &data.operands;
        if let Some(f) = operands.function {
            write!(output, " function{}", f.index()).unwrap();
        }
        if let Some(c) = operands.class {
            write!(output, " class{}", c.index()).unwrap();
        }
        if let Some(f) = operands.field {
            write!(output, " field{}", f.index()).unwrap();
        }
        if let Some(s) = operands.string {
            write!(output, " string{}", s.index()).unwrap();
        }
        if let Some(a) = operands.literal_array {
            write!(output, " literals{}", a.index()).unwrap();
        }
        if let Some(ty) = operands.target_type {
            write!(output, " to {}", ty).unwrap();
        }
        if let Some(cc) = data.cc {
            write!(output, " cc:{}", cc.name()).unwrap();
        }

        if options.show_users && !data.users.is_empty() {
            let users: Vec<String> = data.users.iter().map(|u| format!("v{}", u)).collect();
            write!(output, " ; users: {}", users.join(", ")).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::File;
    use crate::ir::{IsaKind, TypeId};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_block_dump() {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[TypeId::I32], TypeId::Void);
        let mut g = file.create_graph(f).unwrap();
        g.find_or_create_constant_i64(-2);

        let dump = g.dump_block(g.start_block()).unwrap();
        assert_eq!(
            dump,
            "bb0 [start] preds: [] succs: [bb1]\n  v0: i32 = parameter 0\n  v1: i64 = constant -2\n"
        );
    }

    #[test]
    fn test_dump_options() {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[TypeId::I32], TypeId::Void);
        let mut g = file.create_graph(f).unwrap();
        let p = g.parameter(0).unwrap();
        let bb = g.create_empty_block();
        g.create_phi(bb, &[p]).unwrap();

        let text = g.render(DumpOptions {
            show_users: true,
            show_types: false,
        });
        assert!(text.contains("v0 = parameter 0 ; users: v1"));
        assert!(text.contains("bb2 preds: [] succs: []"));
    }

    #[test]
    fn test_dump_to_writer() {
        let mut file = File::new(IsaKind::Dynamic);
        let f = file.add_function("f", &[], TypeId::Void);
        let g = file.create_graph(f).unwrap();

        let mut sink = Vec::new();
        g.dump(&mut sink).unwrap();
        let text = String::from_utf8(sink).unwrap();
        assert_eq!(text, g.pretty_print());
        assert!(text.contains("bb1 [end] preds: [bb0] succs: []"));
    }
}
