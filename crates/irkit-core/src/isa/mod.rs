//! ISA extension layers
//!
//! Each family wraps a `&mut Graph` and adds opcode-specific constructors and
//! accessors. Every call first checks that the graph belongs to the family
//! (`WrongMode` otherwise); constructed instructions are owned by the graph and
//! unlinked until the caller places them.

/// Declare an opcode enum with its mnemonics
macro_rules! opcodes {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $mnemonic:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            /// Every opcode of the family
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn mnemonic(self) -> &'static str {
                match self {
                    $($name::$variant => $mnemonic),*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.mnemonic())
            }
        }
    };
}

pub mod dynamic_isa;
pub mod static_isa;

pub use dynamic_isa::{DynamicIsa, DynamicOpcode};
pub use static_isa::{StaticIsa, StaticOpcode};

use crate::error::{IrError, IrResult};
use crate::ir::{Graph, IsaKind};

impl Graph {
    /// Static-family view of this graph
    pub fn static_isa(&mut self) -> StaticIsa<'_> {
        StaticIsa::new(self)
    }

    /// Dynamic-family view of this graph
    pub fn dynamic_isa(&mut self) -> DynamicIsa<'_> {
        DynamicIsa::new(self)
    }

    pub(crate) fn check_mode(&self, expected: IsaKind) -> IrResult<()> {
        if self.isa() != expected {
            return Err(IrError::wrong_mode(format!(
                "operation needs a {:?} graph, this graph is {:?}",
                expected,
                self.isa()
            )));
        }
        Ok(())
    }
}
