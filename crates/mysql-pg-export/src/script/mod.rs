//! PostgreSQL script generation.

mod assembler;

pub use assembler::{assemble, Script, TOOL_NAME};

pub(crate) use assembler::ScriptAssembler;
