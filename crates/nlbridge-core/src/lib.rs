//! Translate compiled AMPL nonlinear models into symbolic constraint systems.
//!
//! A reader fills a [`ModelGraph`]; [`ModelTranslator`] turns it into
//! expression DAGs and declares variables, objective and constraints on a
//! [`SystemBuilder`](nlbridge_solver::SystemBuilder).

pub mod assembler;
pub mod builder;
mod cache;
pub mod error;
pub mod graph;
mod linear;
pub mod opcode;
pub mod system;
pub mod translator;

#[cfg(test)]
mod tests;

pub use assembler::{AssembledConstraint, BoundShape, ConstraintAssembler};
pub use builder::{DEFAULT_MAX_DEPTH, ExpressionBuilder};
pub use error::TranslateError;
pub use graph::{
    ConstraintLinear, ConstraintRecord, DefinedVariable, GraphNode, LinearTerm, ModelGraph,
    NodeId, ObjectiveRecord, Operands, VariableRecord,
};
pub use opcode::{OpTag, OpcodeTable};
pub use system::{ConstraintDecl, ObjectiveDecl, System, VariableDecl};
pub use translator::{ModelTranslator, TranslateConfig, Translation};
