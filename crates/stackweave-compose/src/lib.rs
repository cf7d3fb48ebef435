//! # stackweave-compose
//!
//! Declarative model of an infrastructure application and its resolution.
//!
//! Handles:
//! - **Descriptor**: Typed resource declarations with references and imports.
//! - **Group / Construct**: Composite groups assembled by sub-builders.
//! - **Stack**: Deployable units with dependencies and declared outputs.
//! - **Graph**: Dependency graphs with deterministic topological resolution.
//! - **Validator / Resolver**: Whole-application checks and ordering.
//! - **Output**: Late-bound stack outputs and the operator report.
//! - **Template**: Per-stack template synthesis in JSON or YAML.

pub mod construct;
pub mod descriptor;
pub mod expr;
pub mod graph;
pub mod group;
pub mod output;
pub mod resolver;
pub mod stack;
pub mod template;
pub mod validator;
