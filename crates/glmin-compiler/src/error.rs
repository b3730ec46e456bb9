//! Error types for shader program compilation.

use alloc::string::String;

use glmin_syntax::SyntaxError;

/// Result type for compiler operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Error that can occur while compiling a shader program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Shader source did not parse.
    Syntax(SyntaxError),
    /// A pass found the program in a shape it cannot handle, such as a
    /// missing stage or a stage without `main`.
    StructuralInvariant(String),
}

impl CompileError {
    /// Create a new structural invariant error.
    pub fn structural(msg: impl Into<String>) -> Self {
        CompileError::StructuralInvariant(msg.into())
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, CompileError::Syntax(_))
    }
}

impl From<SyntaxError> for CompileError {
    fn from(err: SyntaxError) -> Self {
        CompileError::Syntax(err)
    }
}

impl core::fmt::Display for CompileError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CompileError::Syntax(err) => write!(f, "{}", err),
            CompileError::StructuralInvariant(msg) => {
                write!(f, "Structural invariant violated: {}", msg)
            }
        }
    }
}

impl core::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            CompileError::Syntax(err) => Some(err),
            CompileError::StructuralInvariant(_) => None,
        }
    }
}
