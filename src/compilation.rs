//! Compilation API.
//!
//! Register named source files, compile them together, and read the
//! resulting [`TypedAssembly`]. Files are numbered in the order they were
//! added; that number is the [`FileId`] of every diagnostic reported in the
//! file.
//!
//! # Example
//!
//! ```
//! use ember::{Compilation, CompilationOptions};
//!
//! let mut compilation = Compilation::new(CompilationOptions::program());
//! compilation.add_source(
//!     "point.em",
//!     "class Point(x: int, y: int) {\n def sum(): int = x + y\n}",
//! )?;
//! compilation.add_source("main.em", "println(new Point(1, 2).sum())")?;
//!
//! let assembly = compilation.compile()?;
//! for diagnostic in &assembly.diagnostics {
//!     eprintln!("{}", compilation.render(diagnostic));
//! }
//! assert!(!assembly.has_errors());
//!
//! // Hot reload: change one file and compile again.
//! assert!(compilation.update_source("main.em", "println(new Point(3, 4).sum())")?);
//! let assembly = compilation.recompile()?;
//! assert!(!assembly.has_errors());
//! # Ok::<(), ember::CompilationError>(())
//! ```

use std::sync::Arc;

use bumpalo::Bump;
use ember_compiler::{TypedAssembly, bind_assembly_with};
use ember_core::{Diagnostic, FileId};
use ember_parser::{Parser, SyntaxTree};
use rustc_hash::{FxHashMap, FxHashSet};
use xxhash_rust::xxh64::xxh64;

use crate::error::CompilationError;
use crate::options::CompilationOptions;

#[derive(Debug)]
struct SourceFile {
    name: String,
    text: String,
    hash: u64,
}

/// A set of source files compiled together into one assembly.
#[derive(Debug)]
pub struct Compilation {
    options: CompilationOptions,

    /// Sources in registration order; the index is the file ID.
    sources: Vec<SourceFile>,

    /// Source name to index into `sources`.
    by_name: FxHashMap<String, usize>,

    /// Files changed since the last compile.
    dirty_files: FxHashSet<String>,

    /// Memory arena for syntax trees, reset by every compile.
    arena: Bump,

    assembly: Option<Arc<TypedAssembly>>,
}

impl Default for Compilation {
    fn default() -> Self {
        Self::new(CompilationOptions::default())
    }
}

impl Compilation {
    pub fn new(options: CompilationOptions) -> Self {
        Self {
            options,
            sources: Vec::new(),
            by_name: FxHashMap::default(),
            dirty_files: FxHashSet::default(),
            arena: Bump::new(),
            assembly: None,
        }
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    fn hash_source(source: &str) -> u64 {
        xxh64(source.as_bytes(), 0)
    }

    /// Add a source file.
    ///
    /// # Errors
    ///
    /// Fails once the compilation has run (use [`update_source`](Self::update_source)
    /// or [`clear`](Self::clear)), or when `name` is already taken.
    pub fn add_source(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<FileId, CompilationError> {
        if self.assembly.is_some() {
            return Err(CompilationError::AlreadyCompiled);
        }

        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(CompilationError::DuplicateSource(name));
        }

        let text = source.into();
        let index = self.sources.len();
        self.sources.push(SourceFile {
            name: name.clone(),
            hash: Self::hash_source(&text),
            text,
        });
        self.by_name.insert(name.clone(), index);
        self.dirty_files.insert(name);

        Ok(FileId::new(index as u32))
    }

    /// Replace the text of an existing source file.
    ///
    /// Returns `true` if the text actually changed; the file is then marked
    /// for [`recompile`](Self::recompile).
    pub fn update_source(
        &mut self,
        name: impl AsRef<str>,
        source: impl Into<String>,
    ) -> Result<bool, CompilationError> {
        let name = name.as_ref();
        let index = *self
            .by_name
            .get(name)
            .ok_or_else(|| CompilationError::SourceNotFound(name.to_string()))?;

        let text = source.into();
        let hash = Self::hash_source(&text);
        let file = &mut self.sources[index];
        if file.hash == hash {
            return Ok(false);
        }

        file.text = text;
        file.hash = hash;
        self.dirty_files.insert(name.to_string());
        Ok(true)
    }

    /// Whether sources changed since the last compile.
    pub fn has_pending_changes(&self) -> bool {
        !self.dirty_files.is_empty()
    }

    pub fn dirty_files(&self) -> &FxHashSet<String> {
        &self.dirty_files
    }

    /// Parse and bind every source file.
    ///
    /// Syntax and semantic problems are reported as diagnostics on the
    /// assembly; only API misuse and binder defects are errors.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&mut self) -> Result<Arc<TypedAssembly>, CompilationError> {
        if self.assembly.is_some() {
            return Err(CompilationError::AlreadyCompiled);
        }
        if self.sources.is_empty() {
            return Err(CompilationError::NoSources);
        }

        let span = tracing::debug_span!("compile", files = self.sources.len());
        let _guard = span.enter();

        self.arena.reset();
        let assembly = {
            let trees: Vec<SyntaxTree<'_>> = self
                .sources
                .iter()
                .enumerate()
                .map(|(index, file)| {
                    Parser::parse(&file.text, FileId::new(index as u32), &self.arena)
                })
                .collect();

            bind_assembly_with(
                self.options.is_script(),
                &trees,
                None,
                &self.options.references(),
                &self.options.bind_options(),
            )?
        };

        tracing::debug!(
            diagnostics = assembly.diagnostics.len(),
            bodies = assembly.bodies.len(),
            "compilation finished"
        );

        let assembly = Arc::new(assembly);
        self.assembly = Some(Arc::clone(&assembly));
        self.dirty_files.clear();
        Ok(assembly)
    }

    /// Compile again if sources changed, otherwise return the current
    /// assembly. Compiles for the first time if needed.
    pub fn recompile(&mut self) -> Result<Arc<TypedAssembly>, CompilationError> {
        match &self.assembly {
            Some(assembly) if self.dirty_files.is_empty() => Ok(Arc::clone(assembly)),
            _ => {
                self.assembly = None;
                self.compile()
            }
        }
    }

    /// The assembly of the last compile.
    pub fn assembly(&self) -> Option<&Arc<TypedAssembly>> {
        self.assembly.as_ref()
    }

    pub fn is_compiled(&self) -> bool {
        self.assembly.is_some()
    }

    /// Remove every source and the compiled assembly.
    pub fn clear(&mut self) {
        self.sources.clear();
        self.by_name.clear();
        self.dirty_files.clear();
        self.arena.reset();
        self.assembly = None;
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// The name a file was added under.
    pub fn source_name(&self, file: FileId) -> Option<&str> {
        self.sources
            .get(file.index() as usize)
            .map(|source| source.name.as_str())
    }

    /// Format a diagnostic as `name(line, col): message`.
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        match self.source_name(diagnostic.location.file) {
            Some(name) => format!("{}{}", name, diagnostic),
            None => format!("{}{}", diagnostic.location.file, diagnostic),
        }
    }
}
