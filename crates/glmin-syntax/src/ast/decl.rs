//! Declarations, types and function signatures.

use alloc::{string::String, vec::Vec};

use super::{expr::Expr, stmt::Statement};

/// Storage qualifier of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeQualifier {
    Const,
    Attribute,
    Varying,
    InvariantVarying,
    Uniform,
}

impl TypeQualifier {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeQualifier::Const => "const",
            TypeQualifier::Attribute => "attribute",
            TypeQualifier::Varying => "varying",
            TypeQualifier::InvariantVarying => "invariant varying",
            TypeQualifier::Uniform => "uniform",
        }
    }

    /// Whether names declared with this qualifier are part of the interface
    /// between the application, the vertex stage and the fragment stage.
    pub fn is_linked(self) -> bool {
        matches!(
            self,
            TypeQualifier::Attribute
                | TypeQualifier::Varying
                | TypeQualifier::InvariantVarying
                | TypeQualifier::Uniform
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    High,
    Medium,
    Low,
}

impl Precision {
    pub fn as_str(self) -> &'static str {
        match self {
            Precision::High => "highp",
            Precision::Medium => "mediump",
            Precision::Low => "lowp",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "highp" => Some(Precision::High),
            "mediump" => Some(Precision::Medium),
            "lowp" => Some(Precision::Low),
            _ => None,
        }
    }
}

/// The type part of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpecifier {
    /// A built-in type (`vec4`, `sampler2D`, ...) or a struct name.
    Named(String),
    Struct(StructSpecifier),
}

impl TypeSpecifier {
    pub fn is_void(&self) -> bool {
        matches!(self, TypeSpecifier::Named(name) if name == "void")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructSpecifier {
    pub name: Option<String>,
    pub members: Vec<StructMember>,
}

/// One `type a, b[2];` line inside a struct body.
#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    pub precision: Option<Precision>,
    pub ty: String,
    pub declarators: Vec<StructDeclarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDeclarator {
    pub name: String,
    /// Struct member arrays always carry a size.
    pub array_size: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullySpecifiedType {
    pub qualifier: Option<TypeQualifier>,
    pub precision: Option<Precision>,
    pub specifier: TypeSpecifier,
}

impl FullySpecifiedType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            precision: None,
            specifier: TypeSpecifier::Named(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArraySize {
    /// `a[]`
    Unsized,
    Sized(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub array: Option<ArraySize>,
    pub initializer: Option<Expr>,
}

impl Declarator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            array: None,
            initializer: None,
        }
    }
}

/// Where a variable declaration appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclScope {
    /// Top level of a shader.
    Global,
    /// Inside a function body.
    Local,
}

/// A variable (or bare struct) declaration: one type, many declarators.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub ty: FullySpecifiedType,
    pub declarators: Vec<Declarator>,
}

/// `precision highp float;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecisionDeclaration {
    pub precision: Precision,
    pub ty: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterDirection {
    In,
    Out,
    InOut,
}

impl ParameterDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterDirection::In => "in",
            ParameterDirection::Out => "out",
            ParameterDirection::InOut => "inout",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "in" => Some(ParameterDirection::In),
            "out" => Some(ParameterDirection::Out),
            "inout" => Some(ParameterDirection::InOut),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub constant: bool,
    /// `None` when the direction is left implicit.
    pub direction: Option<ParameterDirection>,
    pub precision: Option<Precision>,
    pub ty: String,
    /// Prototypes may omit parameter names.
    pub name: Option<String>,
    pub array_size: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionPrototype {
    pub return_type: FullySpecifiedType,
    pub name: String,
    pub params: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub prototype: FunctionPrototype,
    pub body: Vec<Statement>,
}
