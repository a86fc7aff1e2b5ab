//! Identity handles for graphs, blocks and instructions

use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};

/// Process-unique graph identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GraphId(u32);

impl GraphId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "graph{}", self.0)
    }
}

/// Basic block handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlockId {
    graph: GraphId,
    index: u32,
}

impl BlockId {
    /// Rebuild a handle from its parts; the graph rejects it if it does not name a live block
    pub fn from_raw(graph: GraphId, index: u32) -> Self {
        Self { graph, index }
    }

    /// Graph this block belongs to
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    /// Block id, unique within its graph
    pub fn as_u32(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bb{}", self.index)
    }
}

/// Instruction handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InstId {
    graph: GraphId,
    index: u32,
}

impl InstId {
    /// Rebuild a handle from its parts; the graph rejects it if it does not name a live instruction
    pub fn from_raw(graph: GraphId, index: u32) -> Self {
        Self { graph, index }
    }

    /// Graph this instruction belongs to
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    /// Instruction id, unique within its graph
    pub fn as_u32(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for InstId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.index)
    }
}
