//! Structural verifier
//!
//! Checks the invariants every operation is supposed to preserve and reports the
//! first violation found.

use super::block::BlockFlags;
use super::graph::Graph;
use super::opcode::Op;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Graph invariant violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Start or end block missing or not flagged as such
    #[error("Missing {0} block")]
    MissingSentinel(&'static str),

    /// Start block has predecessors
    #[error("Start block bb{0} has predecessors")]
    StartHasPredecessors(u32),

    /// End block has successors
    #[error("End block bb{0} has successors")]
    EndHasSuccessors(u32),

    /// Edge refers to a removed block
    #[error("Edge bb{from} -> bb{to} refers to a removed block")]
    DanglingEdge {
        /// Source block
        from: u32,
        /// Target block
        to: u32,
    },

    /// Successor and predecessor lists disagree
    #[error("Edge bb{from} -> bb{to} is recorded {succs} time(s) as successor, {preds} time(s) as predecessor")]
    EdgeMismatch {
        /// Source block
        from: u32,
        /// Target block
        to: u32,
        /// Occurrences in the source's successor list
        succs: usize,
        /// Occurrences in the target's predecessor list
        preds: usize,
    },

    /// Input refers to a removed instruction
    #[error("v{inst} uses removed instruction v{input}")]
    DeadInput {
        /// User instruction
        inst: u32,
        /// Missing input
        input: u32,
    },

    /// Input and user lists disagree
    #[error("v{inst} uses v{input} {uses} time(s) but is listed {users} time(s) as its user")]
    UseMismatch {
        /// User instruction
        inst: u32,
        /// Used instruction
        input: u32,
        /// Occurrences in the input list
        uses: usize,
        /// Occurrences in the user list
        users: usize,
    },

    /// Instruction and block disagree about placement
    #[error("v{inst} is not listed exactly once by its block bb{block}")]
    PlacementMismatch {
        /// Instruction
        inst: u32,
        /// Block it claims or is listed by
        block: u32,
    },

    /// Constant or parameter outside the start block
    #[error("v{inst} ({what}) must live in the start block")]
    MisplacedInstruction {
        /// Instruction
        inst: u32,
        /// Kind of instruction
        what: &'static str,
    },

    /// Immediate value wider than its declared width
    #[error("Immediate {index} of v{inst} ({value}) does not fit in {bits} bits")]
    ImmediateOverflow {
        /// Instruction
        inst: u32,
        /// Immediate index
        index: usize,
        /// Stored value
        value: u64,
        /// Declared width
        bits: u32,
    },

    /// Phi left without inputs
    #[error("Phi v{0} has no inputs")]
    EmptyPhi(u32),

    /// Call input count disagrees with its function operand
    #[error("v{inst} has {inputs} inputs, its function operand expects {expected}")]
    ArityMismatch {
        /// Instruction
        inst: u32,
        /// Actual input count
        inputs: usize,
        /// Count implied by the function operand
        expected: usize,
    },

    /// Range count immediate disagrees with the input list
    #[error("Count immediate of v{inst} is {count}, its inputs imply {expected}")]
    RangeCountMismatch {
        /// Instruction
        inst: u32,
        /// Stored count
        count: u64,
        /// Count implied by the inputs
        expected: u64,
    },
}

impl Graph {
    /// Check every structural invariant of the graph
    pub fn verify(&self) -> Result<(), VerifyError> {
        self.verify_sentinels()?;
        self.verify_edges()?;
        self.verify_placement()?;
        self.verify_uses()?;
        self.verify_immediates()?;
        self.verify_input_counts()
    }

    fn verify_sentinels(&self) -> Result<(), VerifyError> {
        let start = self
            .blocks
            .get(self.start)
            .filter(|b| b.flags.contains(BlockFlags::START))
            .ok_or(VerifyError::MissingSentinel("start"))?;
        let end = self
            .blocks
            .get(self.end)
            .filter(|b| b.flags.contains(BlockFlags::END))
            .ok_or(VerifyError::MissingSentinel("end"))?;
        if !start.preds.is_empty() {
            return Err(VerifyError::StartHasPredecessors(self.start));
        }
        if !end.succs.is_empty() {
            return Err(VerifyError::EndHasSuccessors(self.end));
        }
        Ok(())
    }

    fn verify_edges(&self) -> Result<(), VerifyError> {
        let mut succs: FxHashMap<(u32, u32), usize> = FxHashMap::default();
        let mut preds: FxHashMap<(u32, u32), usize> = FxHashMap::default();

        for (index, block) in self.blocks.iter() {
            for &to in &block.succs {
                if !self.blocks.contains(to) {
                    return Err(VerifyError::DanglingEdge { from: index, to });
                }
                *succs.entry((index, to)).or_default() += 1;
            }
            for &from in &block.preds {
                if !self.blocks.contains(from) {
                    return Err(VerifyError::DanglingEdge { from, to: index });
                }
                *preds.entry((from, index)).or_default() += 1;
            }
        }

        for &(from, to) in succs.keys().chain(preds.keys()) {
            let s = succs.get(&(from, to)).copied().unwrap_or(0);
            let p = preds.get(&(from, to)).copied().unwrap_or(0);
            if s != p {
                return Err(VerifyError::EdgeMismatch {
                    from,
                    to,
                    succs: s,
                    preds: p,
                });
            }
        }
        Ok(())
    }

    fn verify_placement(&self) -> Result<(), VerifyError> {
        for (block_index, block) in self.blocks.iter() {
            for &inst in &block.insts {
                let claims = self.insts.get(inst).and_then(|d| d.block);
                let listed = block.insts.iter().filter(|&&i| i == inst).count();
                if claims != Some(block_index) || listed != 1 {
                    return Err(VerifyError::PlacementMismatch {
                        inst,
                        block: block_index,
                    });
                }
            }
        }

        for (index, data) in self.insts.iter() {
            if let Some(block) = data.block {
                if !self.blocks.contains(block) {
                    return Err(VerifyError::PlacementMismatch { inst: index, block });
                }
                let listed = self.blocks[block].insts.contains(&index);
                if !listed {
                    return Err(VerifyError::PlacementMismatch { inst: index, block });
                }
            }
            let what = if data.op.is_constant() {
                Some("constant")
            } else if data.op.is_parameter() {
                Some("parameter")
            } else {
                None
            };
            if let Some(what) = what {
                if data.block != Some(self.start) {
                    return Err(VerifyError::MisplacedInstruction { inst: index, what });
                }
            }
        }
        Ok(())
    }

    fn verify_uses(&self) -> Result<(), VerifyError> {
        let mut uses: FxHashMap<(u32, u32), usize> = FxHashMap::default();
        let mut users: FxHashMap<(u32, u32), usize> = FxHashMap::default();

        for (index, data) in self.insts.iter() {
            for &input in &data.inputs {
                if !self.insts.contains(input) {
                    return Err(VerifyError::DeadInput { inst: index, input });
                }
                *uses.entry((index, input)).or_default() += 1;
            }
            for &user in &data.users {
                if !self.insts.contains(user) {
                    return Err(VerifyError::DeadInput {
                        inst: user,
                        input: index,
                    });
                }
                *users.entry((user, index)).or_default() += 1;
            }
        }

        for &(inst, input) in uses.keys().chain(users.keys()) {
            let u = uses.get(&(inst, input)).copied().unwrap_or(0);
            let r = users.get(&(inst, input)).copied().unwrap_or(0);
            if u != r {
                return Err(VerifyError::UseMismatch {
                    inst,
                    input,
                    uses: u,
                    users: r,
                });
            }
        }
        Ok(())
    }

    fn verify_immediates(&self) -> Result<(), VerifyError> {
        for (index, data) in self.insts.iter() {
            for (i, imm) in data.imms.iter().enumerate() {
                if !imm.width.fits(imm.value) {
                    return Err(VerifyError::ImmediateOverflow {
                        inst: index,
                        index: i,
                        value: imm.value,
                        bits: imm.width.bits(),
                    });
                }
            }
        }
        Ok(())
    }

    fn verify_input_counts(&self) -> Result<(), VerifyError> {
        for (index, data) in self.insts.iter() {
            let inputs = data.inputs.len();
            if data.op == Op::Phi && inputs == 0 {
                return Err(VerifyError::EmptyPhi(index));
            }
            if let (Some(receivers), Some(function)) =
                (data.op.call_receivers(), data.operands.function)
            {
                let expected = function.arity() as usize + receivers;
                if inputs != expected {
                    return Err(VerifyError::ArityMismatch {
                        inst: index,
                        inputs,
                        expected,
                    });
                }
            }
            if let Some((implicit, _)) = data.op.range_layout() {
                let expected = inputs.saturating_sub(implicit) as u64;
                let count = data.imms.first().map(|imm| imm.value);
                if count != Some(expected) {
                    return Err(VerifyError::RangeCountMismatch {
                        inst: index,
                        count: count.unwrap_or_default(),
                        expected,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::File;
    use crate::ir::{IsaKind, TypeId};

    fn graph() -> Graph {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[TypeId::I32], TypeId::Void);
        file.create_graph(f).unwrap()
    }

    #[test]
    fn test_fresh_graph_verifies() {
        graph().verify().unwrap();
    }

    #[test]
    fn test_detects_half_edge() {
        let mut g = graph();
        let bb = g.create_empty_block();
        g.blocks[bb.as_u32()].succs.push(g.end);
        assert!(matches!(
            g.verify(),
            Err(VerifyError::EdgeMismatch { succs: 1, preds: 0, .. })
        ));
    }

    #[test]
    fn test_detects_half_use() {
        let mut g = graph();
        let p = g.parameter(0).unwrap().as_u32();
        let bb = g.create_empty_block();
        let c = g.find_or_create_constant_i32(1);
        let phi = g.create_phi(bb, &[c]).unwrap();
        g.insts[phi.as_u32()].inputs.push(p);
        assert!(matches!(g.verify(), Err(VerifyError::UseMismatch { .. })));
    }

    #[test]
    fn test_detects_end_successor() {
        let mut g = graph();
        let bb = g.create_empty_block().as_u32();
        let end = g.end;
        g.blocks[end].succs.push(bb);
        g.blocks[bb].preds.push(end);
        assert_eq!(g.verify(), Err(VerifyError::EndHasSuccessors(end)));
    }

    #[test]
    fn test_detects_empty_phi() {
        let mut g = graph();
        let p = g.parameter(0).unwrap();
        let bb = g.create_empty_block();
        let phi = g.create_phi(bb, &[p]).unwrap();
        g.insts[phi.as_u32()].inputs.clear();
        g.insts[p.as_u32()].users.clear();
        assert_eq!(g.verify(), Err(VerifyError::EmptyPhi(phi.as_u32())));
    }

    #[test]
    fn test_detects_call_arity_mismatch() {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[TypeId::I32], TypeId::Void);
        let callee = file.add_function("callee", &[TypeId::I32], TypeId::I32);
        let mut g = file.create_graph(f).unwrap();
        let p = g.parameter(0).unwrap();
        let call = g.static_isa().create_call_static(callee, &[p]).unwrap();
        g.verify().unwrap();

        let (c, p) = (call.as_u32(), p.as_u32());
        g.insts[c].inputs.push(p);
        g.insts[p].users.push(c);
        assert_eq!(
            g.verify(),
            Err(VerifyError::ArityMismatch {
                inst: c,
                inputs: 2,
                expected: 1,
            })
        );
    }

    #[test]
    fn test_detects_stale_range_count() {
        let mut file = File::new(IsaKind::Dynamic);
        let f = file.add_function("f", &[TypeId::Any], TypeId::Any);
        let mut g = file.create_graph(f).unwrap();
        let p = g.parameter(0).unwrap();
        let call = g.dynamic_isa().create_callrange(p, &[p]).unwrap();
        g.verify().unwrap();

        let (c, p) = (call.as_u32(), p.as_u32());
        g.insts[c].inputs.push(p);
        g.insts[p].users.push(c);
        assert_eq!(
            g.verify(),
            Err(VerifyError::RangeCountMismatch {
                inst: c,
                count: 1,
                expected: 2,
            })
        );
    }

    #[test]
    fn test_error_message() {
        let err = VerifyError::ImmediateOverflow {
            inst: 4,
            index: 0,
            value: 300,
            bits: 8,
        };
        assert_eq!(
            err.to_string(),
            "Immediate 0 of v4 (300) does not fit in 8 bits"
        );
    }
}
