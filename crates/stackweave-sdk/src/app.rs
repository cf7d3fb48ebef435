//! An application: the set of declared stacks.

use std::path::{Path, PathBuf};

use stackweave_common::error::Result;
use stackweave_compose::resolver::{self, ResolvedApp};
use stackweave_compose::stack::Stack;
use stackweave_compose::template::{self, StackTemplate, TemplateFormat};

/// Declared stacks, kept in declaration order.
///
/// Declaration order is the tie-break between stacks with no dependency
/// relation, so the same declarations always resolve to the same order.
#[derive(Debug, Clone, Default)]
pub struct App {
    stacks: Vec<Stack>,
}

impl App {
    /// Creates an empty application.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a stack.
    pub fn declare(&mut self, stack: Stack) -> &mut Self {
        self.stacks.push(stack);
        self
    }

    /// Declared stacks in declaration order.
    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Validates and resolves every stack.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a cyclic dependency error.
    pub fn resolve(&self) -> Result<ResolvedApp> {
        resolver::resolve(&self.stacks)
    }

    /// Resolves the application and synthesizes one template per stack.
    ///
    /// # Errors
    ///
    /// Returns any resolution error.
    pub fn synth(&self) -> Result<Vec<StackTemplate>> {
        Ok(template::synthesize(&self.resolve()?))
    }

    /// Synthesizes and writes every template into `dir`.
    ///
    /// # Errors
    ///
    /// Returns any resolution, serialization, or I/O error. Nothing is
    /// written if resolution fails.
    pub fn synth_to(&self, dir: &Path, format: TemplateFormat) -> Result<Vec<PathBuf>> {
        let templates = self.synth()?;
        template::write_templates(&templates, dir, format)
    }
}

impl FromIterator<Stack> for App {
    fn from_iter<I: IntoIterator<Item = Stack>>(iter: I) -> Self {
        Self {
            stacks: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use stackweave_common::error::StackweaveError;
    use stackweave_common::types::Environment;

    use super::*;

    fn stack(name: &str, deps: &[&str]) -> Stack {
        let mut stack = Stack::new(name, Environment::new("123456789012", "us-east-1"));
        for dep in deps {
            stack.add_dependency(*dep);
        }
        stack
    }

    #[test]
    fn resolve_follows_dependencies() {
        let mut app = App::new();
        let _ = app.declare(stack("B", &["A"])).declare(stack("A", &[]));
        let resolved = app.resolve().expect("resolve");
        let order: Vec<&str> = resolved.order().iter().map(|n| n.as_str()).collect();
        assert_eq!(order, vec!["A", "B"]);
    }

    #[test]
    fn cyclic_app_writes_nothing() {
        let app: App = vec![stack("A", &["B"]), stack("B", &["A"])]
            .into_iter()
            .collect();
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("out");
        let err = app.synth_to(&out, TemplateFormat::Json).unwrap_err();
        assert!(matches!(err, StackweaveError::CyclicDependency { .. }));
        assert!(!out.exists());
    }
}
