//! In-memory file: functions, classes, fields, strings and literal arrays
//!
//! A `File` is where graphs come from and where they go back. Each function stores
//! its current body; `create_graph` hands out a working copy with a fresh identity and
//! `commit_graph` verifies a finished graph and stores it as the new body.

use crate::config::GraphOptions;
use crate::error::{IrError, IrResult};
use crate::ir::{Graph, IsaKind, TypeId};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

/// File identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FileId(u32);

impl FileId {
    fn fresh() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Function handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Function {
    file: FileId,
    index: u32,
    ret: TypeId,
    arity: u32,
}

impl Function {
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Declared return type
    pub fn return_type(&self) -> TypeId {
        self.ret
    }

    /// Number of declared parameters
    pub fn arity(&self) -> u32 {
        self.arity
    }
}

/// Class handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Class {
    file: FileId,
    index: u32,
}

impl Class {
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Field handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Field {
    file: FileId,
    index: u32,
    ty: TypeId,
}

impl Field {
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Declared value type
    pub fn value_type(&self) -> TypeId {
        self.ty
    }
}

/// Interned string handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StringRef {
    file: FileId,
    index: u32,
}

impl StringRef {
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Literal array handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LiteralArray {
    file: FileId,
    index: u32,
}

impl LiteralArray {
    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

/// One element of a literal array
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Literal {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(StringRef),
    Method(Function),
}

#[derive(Debug)]
struct FunctionData {
    name: String,
    params: Vec<TypeId>,
    body: Graph,
}

#[derive(Debug)]
struct ClassData {
    name: String,
    fields: Vec<Field>,
}

#[derive(Debug)]
struct FieldData {
    class: Class,
    name: String,
}

/// In-memory file of one ISA family
#[derive(Debug)]
pub struct File {
    id: FileId,
    isa: IsaKind,
    options: GraphOptions,
    functions: Vec<FunctionData>,
    classes: Vec<ClassData>,
    fields: Vec<FieldData>,
    strings: Vec<String>,
    string_index: FxHashMap<String, u32>,
    literal_arrays: Vec<Vec<Literal>>,
}

impl File {
    /// Create an empty file with default graph options
    pub fn new(isa: IsaKind) -> Self {
        Self::with_options(isa, GraphOptions::default())
    }

    /// Create an empty file whose graphs carry `options`
    pub fn with_options(isa: IsaKind, options: GraphOptions) -> Self {
        Self {
            id: FileId::fresh(),
            isa,
            options,
            functions: Vec::new(),
            classes: Vec::new(),
            fields: Vec::new(),
            strings: Vec::new(),
            string_index: FxHashMap::default(),
            literal_arrays: Vec::new(),
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn isa(&self) -> IsaKind {
        self.isa
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    // ========================================================================
    // Entity creation
    // ========================================================================

    /// Declare a function; its initial body holds only the parameters
    pub fn add_function(&mut self, name: &str, params: &[TypeId], ret: TypeId) -> Function {
        let function = Function {
            file: self.id,
            index: self.functions.len() as u32,
            ret,
            arity: params.len() as u32,
        };
        let body = Graph::new_body(self.id, function, self.isa, params, self.options);
        self.functions.push(FunctionData {
            name: name.to_string(),
            params: params.to_vec(),
            body,
        });
        function
    }

    pub fn add_class(&mut self, name: &str) -> Class {
        let class = Class {
            file: self.id,
            index: self.classes.len() as u32,
        };
        self.classes.push(ClassData {
            name: name.to_string(),
            fields: Vec::new(),
        });
        class
    }

    pub fn add_field(&mut self, class: Class, name: &str, ty: TypeId) -> IrResult<Field> {
        self.check_owner(class.file, "class")?;
        let field = Field {
            file: self.id,
            index: self.fields.len() as u32,
            ty,
        };
        let data = self
            .classes
            .get_mut(class.index as usize)
            .ok_or_else(|| IrError::bad_argument("unknown class"))?;
        data.fields.push(field);
        self.fields.push(FieldData {
            class,
            name: name.to_string(),
        });
        Ok(field)
    }

    /// Intern a string; equal texts give the same handle
    pub fn create_string(&mut self, text: &str) -> StringRef {
        if let Some(&index) = self.string_index.get(text) {
            return StringRef {
                file: self.id,
                index,
            };
        }
        let index = self.strings.len() as u32;
        self.strings.push(text.to_string());
        self.string_index.insert(text.to_string(), index);
        StringRef {
            file: self.id,
            index,
        }
    }

    pub fn add_literal_array(&mut self, literals: &[Literal]) -> IrResult<LiteralArray> {
        for literal in literals {
            match literal {
                Literal::String(s) => self.check_owner(s.file, "string literal")?,
                Literal::Method(f) => self.check_owner(f.file, "method literal")?,
                _ => {}
            }
        }
        let array = LiteralArray {
            file: self.id,
            index: self.literal_arrays.len() as u32,
        };
        self.literal_arrays.push(literals.to_vec());
        Ok(array)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn functions(&self) -> impl Iterator<Item = Function> + '_ {
        self.functions.iter().enumerate().map(move |(i, data)| Function {
            file: self.id,
            index: i as u32,
            ret: data.body.function().ret,
            arity: data.params.len() as u32,
        })
    }

    pub fn function_by_name(&self, name: &str) -> Option<Function> {
        self.functions().find(|f| self.functions[f.index as usize].name == name)
    }

    pub fn function_name(&self, function: Function) -> IrResult<&str> {
        Ok(&self.function_data(function)?.name)
    }

    pub fn function_params(&self, function: Function) -> IrResult<&[TypeId]> {
        Ok(&self.function_data(function)?.params)
    }

    /// Last committed body of a function
    pub fn function_body(&self, function: Function) -> IrResult<&Graph> {
        Ok(&self.function_data(function)?.body)
    }

    pub fn class_name(&self, class: Class) -> IrResult<&str> {
        self.check_owner(class.file, "class")?;
        self.classes
            .get(class.index as usize)
            .map(|c| c.name.as_str())
            .ok_or_else(|| IrError::bad_argument("unknown class"))
    }

    pub fn class_fields(&self, class: Class) -> IrResult<&[Field]> {
        self.check_owner(class.file, "class")?;
        self.classes
            .get(class.index as usize)
            .map(|c| c.fields.as_slice())
            .ok_or_else(|| IrError::bad_argument("unknown class"))
    }

    pub fn field_name(&self, field: Field) -> IrResult<&str> {
        Ok(&self.field_data(field)?.name)
    }

    pub fn field_class(&self, field: Field) -> IrResult<Class> {
        Ok(self.field_data(field)?.class)
    }

    pub fn string_text(&self, string: StringRef) -> IrResult<&str> {
        self.check_owner(string.file, "string")?;
        self.strings
            .get(string.index as usize)
            .map(String::as_str)
            .ok_or_else(|| IrError::bad_argument("unknown string"))
    }

    pub fn literal_array(&self, array: LiteralArray) -> IrResult<&[Literal]> {
        self.check_owner(array.file, "literal array")?;
        self.literal_arrays
            .get(array.index as usize)
            .map(Vec::as_slice)
            .ok_or_else(|| IrError::bad_argument("unknown literal array"))
    }

    // ========================================================================
    // Graph exchange
    // ========================================================================

    /// Build a working graph from the function's stored body
    pub fn create_graph(&self, function: Function) -> IrResult<Graph> {
        let data = self.function_data(function)?;
        let graph = data.body.fork();
        debug!(
            function = %data.name,
            graph = %graph.id(),
            blocks = graph.block_count(),
            "created graph"
        );
        Ok(graph)
    }

    /// Verify `graph` and store it as the body of `function`
    pub fn commit_graph(&mut self, function: Function, graph: Graph) -> IrResult<()> {
        self.check_owner(function.file, "function")?;
        if graph.file() != self.id {
            return Err(IrError::wrong_ctx("graph was created from another file"));
        }
        if graph.function() != function {
            return Err(IrError::wrong_ctx(
                "graph was not created for this function",
            ));
        }
        graph
            .verify()
            .map_err(|e| IrError::bad_argument(format!("graph failed verification: {}", e)))?;

        let data = self
            .functions
            .get_mut(function.index as usize)
            .ok_or_else(|| IrError::bad_argument("unknown function"))?;
        debug!(
            function = %data.name,
            graph = %graph.id(),
            blocks = graph.block_count(),
            "committed graph"
        );
        data.body = graph;
        Ok(())
    }

    fn function_data(&self, function: Function) -> IrResult<&FunctionData> {
        self.check_owner(function.file, "function")?;
        self.functions
            .get(function.index as usize)
            .ok_or_else(|| IrError::bad_argument("unknown function"))
    }

    fn field_data(&self, field: Field) -> IrResult<&FieldData> {
        self.check_owner(field.file, "field")?;
        self.fields
            .get(field.index as usize)
            .ok_or_else(|| IrError::bad_argument("unknown field"))
    }

    fn check_owner(&self, owner: FileId, what: &str) -> IrResult<()> {
        if owner != self.id {
            return Err(IrError::wrong_ctx(format!("{} belongs to another file", what)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_interning() {
        let mut file = File::new(IsaKind::Dynamic);
        let a = file.create_string("print");
        let b = file.create_string("print");
        let c = file.create_string("log");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(file.string_text(c).unwrap(), "log");
    }

    #[test]
    fn test_function_handles() {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("sum", &[TypeId::I32, TypeId::I32], TypeId::I32);
        assert_eq!(f.arity(), 2);
        assert_eq!(f.return_type(), TypeId::I32);
        assert_eq!(file.function_name(f).unwrap(), "sum");
        assert_eq!(file.function_by_name("sum"), Some(f));
        assert_eq!(file.functions().count(), 1);
    }

    #[test]
    fn test_foreign_handles_rejected() {
        let mut a = File::new(IsaKind::Static);
        let mut b = File::new(IsaKind::Static);
        let f = a.add_function("f", &[], TypeId::Void);
        let class = a.add_class("Point");
        let s = a.create_string("x");

        assert!(matches!(b.create_graph(f), Err(IrError::WrongCtx(_))));
        assert!(matches!(
            b.add_field(class, "x", TypeId::I32),
            Err(IrError::WrongCtx(_))
        ));
        assert!(matches!(
            b.add_literal_array(&[Literal::String(s)]),
            Err(IrError::WrongCtx(_))
        ));
    }

    #[test]
    fn test_class_fields() {
        let mut file = File::new(IsaKind::Static);
        let class = file.add_class("Point");
        let x = file.add_field(class, "x", TypeId::I32).unwrap();
        let y = file.add_field(class, "y", TypeId::F64).unwrap();
        assert_eq!(file.class_fields(class).unwrap(), &[x, y]);
        assert_eq!(file.field_name(y).unwrap(), "y");
        assert_eq!(file.field_class(x).unwrap(), class);
        assert_eq!(y.value_type(), TypeId::F64);
    }

    #[test]
    fn test_create_graph_fresh_identity() {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[TypeId::I64], TypeId::Void);
        let g1 = file.create_graph(f).unwrap();
        let g2 = file.create_graph(f).unwrap();
        assert_ne!(g1.id(), g2.id());
        assert_eq!(g1.parameter_count(), 1);
        assert_eq!(g1.isa(), IsaKind::Static);
    }

    #[test]
    fn test_commit_checks_function() {
        let mut file = File::new(IsaKind::Static);
        let f = file.add_function("f", &[], TypeId::Void);
        let g = file.add_function("g", &[], TypeId::Void);
        let graph = file.create_graph(f).unwrap();
        assert!(matches!(
            file.commit_graph(g, graph),
            Err(IrError::WrongCtx(_))
        ));

        let graph = file.create_graph(f).unwrap();
        let committed_blocks = graph.block_count();
        file.commit_graph(f, graph).unwrap();
        assert_eq!(file.function_body(f).unwrap().block_count(), committed_blocks);
    }
}
