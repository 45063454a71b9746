//! Read-eval-print submissions.
//!
//! Every submission is bound in script mode on top of the last successful
//! one, so earlier declarations stay visible and earlier bodies are not
//! bound again. A submission with diagnostics is returned but not chained.

use std::sync::Arc;

use bumpalo::Bump;
use ember_compiler::{TypedAssembly, bind_assembly_with};
use ember_core::FileId;
use ember_parser::Parser;

use crate::error::CompilationError;
use crate::options::{CompilationOptions, Mode};

/// A chain of script submissions.
///
/// # Example
///
/// ```
/// use ember::Session;
///
/// let mut session = Session::default();
/// let first = session.submit("def twice(n: int): int = n * 2").unwrap();
/// assert!(!first.has_errors());
///
/// let second = session.submit("twice(21)").unwrap();
/// assert!(!second.has_errors());
/// assert_eq!(second.submission, 1);
/// ```
#[derive(Debug)]
pub struct Session {
    options: CompilationOptions,
    /// Last submission without diagnostics.
    previous: Option<Arc<TypedAssembly>>,
    /// Submissions seen so far; numbers the file of the next one.
    submitted: u32,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CompilationOptions::script())
    }
}

impl Session {
    /// Start a session. The mode of `options` is always script.
    pub fn new(options: CompilationOptions) -> Self {
        Self {
            options: CompilationOptions {
                mode: Mode::Script,
                ..options
            },
            previous: None,
            submitted: 0,
        }
    }

    /// Bind one submission.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn submit(&mut self, source: &str) -> Result<Arc<TypedAssembly>, CompilationError> {
        let file = FileId::new(self.submitted);
        self.submitted += 1;

        let arena = Bump::new();
        let tree = Parser::parse(source, file, &arena);
        let assembly = Arc::new(bind_assembly_with(
            true,
            &[tree],
            self.previous.clone(),
            &self.options.references(),
            &self.options.bind_options(),
        )?);

        if assembly.has_errors() {
            tracing::debug!(
                diagnostics = assembly.diagnostics.len(),
                "submission not chained"
            );
        } else {
            self.previous = Some(Arc::clone(&assembly));
        }
        Ok(assembly)
    }

    /// The submission the next one is chained onto.
    pub fn last(&self) -> Option<&Arc<TypedAssembly>> {
        self.previous.as_ref()
    }

    /// Forget every submission.
    pub fn reset(&mut self) {
        self.previous = None;
        self.submitted = 0;
    }
}
