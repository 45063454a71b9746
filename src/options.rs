//! Compilation configuration.

use ember_compiler::{AssemblyReference, BindOptions};

/// How top-level statements are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Statements form `main`; a user `main` may be declared instead.
    #[default]
    Program,
    /// Statements form `$eval`, whose value is the last expression.
    Script,
}

/// Options for a [`Compilation`](crate::Compilation) or
/// [`Session`](crate::Session).
///
/// # Example
///
/// ```
/// use ember::{AssemblyReference, CompilationOptions, Mode};
///
/// let options = CompilationOptions::script()
///     .with_reference(AssemblyReference::new("game"))
///     .check_return_paths(false);
/// assert_eq!(options.mode, Mode::Script);
/// assert_eq!(options.references().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CompilationOptions {
    pub mode: Mode,
    /// Libraries imported in addition to the core library.
    pub references: Vec<AssemblyReference>,
    /// Import `System.Predef` (`println`, `print`, `readLine`).
    pub include_core_library: bool,
    /// Report `NotAllPathsReturn` for non-Unit bodies.
    pub check_return_paths: bool,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Program,
            references: Vec::new(),
            include_core_library: true,
            check_return_paths: true,
        }
    }
}

impl CompilationOptions {
    pub fn program() -> Self {
        Self::default()
    }

    pub fn script() -> Self {
        Self {
            mode: Mode::Script,
            ..Self::default()
        }
    }

    pub fn with_reference(mut self, reference: AssemblyReference) -> Self {
        self.references.push(reference);
        self
    }

    pub fn without_core_library(mut self) -> Self {
        self.include_core_library = false;
        self
    }

    pub fn check_return_paths(mut self, enabled: bool) -> Self {
        self.check_return_paths = enabled;
        self
    }

    pub fn is_script(&self) -> bool {
        self.mode == Mode::Script
    }

    /// Every library to import, core library first.
    pub fn references(&self) -> Vec<AssemblyReference> {
        let mut references = Vec::with_capacity(self.references.len() + 1);
        if self.include_core_library {
            references.push(AssemblyReference::core_library());
        }
        references.extend(self.references.iter().cloned());
        references
    }

    pub(crate) fn bind_options(&self) -> BindOptions {
        BindOptions {
            check_return_paths: self.check_return_paths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_program_with_core_library() {
        let options = CompilationOptions::default();
        assert_eq!(options.mode, Mode::Program);
        assert!(options.check_return_paths);
        let references = options.references();
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].name, "ember.core");
    }

    #[test]
    fn core_library_can_be_left_out() {
        let options = CompilationOptions::script().without_core_library();
        assert!(options.is_script());
        assert!(options.references().is_empty());
    }

    #[test]
    fn return_path_check_is_forwarded() {
        let options = CompilationOptions::program().check_return_paths(false);
        assert!(!options.bind_options().check_return_paths);
    }
}
