//! Serializable snapshot of a graph

use super::graph::Graph;
use super::inst::Operands;
use super::opcode::Op;
use super::pretty::flag_names;
use super::types::{ConditionCode, Imm, IsaKind, TypeId};
use serde::Serialize;

/// Plain-data view of a graph, suitable for JSON
#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot {
    pub graph: u32,
    pub isa: IsaKind,
    pub start: u32,
    pub end: u32,
    pub parameters: Vec<u32>,
    pub blocks: Vec<BlockSnapshot>,
    pub instructions: Vec<InstSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockSnapshot {
    pub id: u32,
    pub flags: Vec<&'static str>,
    pub preds: Vec<u32>,
    pub succs: Vec<u32>,
    pub insts: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstSnapshot {
    pub id: u32,
    pub block: Option<u32>,
    pub op: Op,
    pub ty: TypeId,
    pub inputs: Vec<u32>,
    pub users: Vec<u32>,
    pub imms: Vec<Imm>,
    pub operands: Operands,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<ConditionCode>,
}

impl Graph {
    pub fn snapshot(&self) -> GraphSnapshot {
        let blocks = self
            .blocks
            .iter()
            .map(|(id, data)| BlockSnapshot {
                id,
                flags: flag_names(data.flags),
                preds: data.preds.clone(),
                succs: data.succs.clone(),
                insts: data.insts.clone(),
            })
            .collect();
        let instructions = self
            .insts
            .iter()
            .map(|(id, data)| InstSnapshot {
                id,
                block: data.block,
                op: data.op,
                ty: data.ty,
                inputs: data.inputs.clone(),
                users: data.users.clone(),
                imms: data.imms.clone(),
                operands: data.operands,
                cc: data.cc,
            })
            .collect();

        GraphSnapshot {
            graph: self.id().as_u32(),
            isa: self.isa(),
            start: self.start,
            end: self.end,
            parameters: self.params.clone(),
            blocks,
            instructions,
        }
    }

    /// JSON rendering of [`Graph::snapshot`]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use crate::file::File;
    use crate::ir::{IsaKind, TypeId};

    #[test]
    fn test_json_shape() {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[TypeId::I32], TypeId::I32);
        let mut g = file.create_graph(f).unwrap();
        g.find_or_create_constant_i32(7);

        let json: serde_json::Value = serde_json::from_str(&g.to_json().unwrap()).unwrap();
        assert_eq!(json["isa"], "Static");
        assert_eq!(json["blocks"].as_array().unwrap().len(), 2);
        assert_eq!(json["blocks"][0]["flags"][0], "start");
        assert_eq!(json["blocks"][0]["succs"][0], 1);
        assert_eq!(json["instructions"][1]["op"]["Constant"]["I32"], 7);
        assert_eq!(json["instructions"][0]["op"]["Parameter"], 0);
    }
}
