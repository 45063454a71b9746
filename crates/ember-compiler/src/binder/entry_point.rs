//! Top-level statements and entry-point selection.
//!
//! A script collects the statements of all files into `$eval`, whose value
//! is the last expression statement. A program runs a user `main`, or a
//! synthesized `main` holding the top-level statements of its only file
//! that has any.

use ember_core::{InternalError, SemanticError, Span, SymbolFlags, SymbolId, SymbolKind, Type};
use ember_parser::ast::Item;

use super::declarations::{FileUnit, PendingFunction};
use super::{Binder, Context, Result};
use crate::assembly::EntryPoint;
use crate::typed::{Expr, Stmt};

const MAIN: &str = "main";
const EVAL: &str = "$eval";

/// The outcome of entry-point selection.
pub(crate) struct EntryPlan {
    pub entry_point: Option<EntryPoint>,
    /// A synthesized entry method and its bound statements, lowered in
    /// phase 5.
    pub synthesized: Option<(SymbolId, Vec<Stmt>)>,
}

impl EntryPlan {
    fn none() -> Self {
        Self {
            entry_point: None,
            synthesized: None,
        }
    }
}

fn first_statement(unit: &FileUnit<'_>) -> Option<Span> {
    unit.items.iter().find_map(|item| match item {
        Item::Statement(stmt) => Some(stmt.span()),
        _ => None,
    })
}

impl Binder {
    pub(super) fn bind_entry_point(
        &mut self,
        files: &[FileUnit<'_>],
        functions: &[PendingFunction<'_>],
    ) -> Result<EntryPlan> {
        let statement_files: Vec<&FileUnit<'_>> = files
            .iter()
            .filter(|unit| first_statement(unit).is_some())
            .collect();

        if self.is_script {
            return self.bind_script_entry(&statement_files);
        }

        let main = functions
            .iter()
            .find(|function| function.top_level && self.table.get(function.symbol).name == MAIN);
        if let Some(main) = main {
            return self.bind_user_main(main, &statement_files);
        }

        match statement_files.as_slice() {
            [] => Ok(EntryPlan::none()),
            [single] => {
                let entry = self.synthesize_main()?;
                let statements = self.bind_file_statements(single, entry)?;
                Ok(program_plan(entry, statements))
            }
            several => {
                let entry = self.synthesize_main()?;
                for unit in several {
                    if let Some(span) = first_statement(unit) {
                        self.context.file = unit.file;
                        self.report(SemanticError::GlobalStatementsInMultipleFiles, span);
                    }
                    self.bind_file_statements(unit, entry)?;
                }
                Ok(program_plan(entry, Vec::new()))
            }
        }
    }

    fn bind_script_entry(&mut self, statement_files: &[&FileUnit<'_>]) -> Result<EntryPlan> {
        if statement_files.is_empty() {
            return Ok(EntryPlan::none());
        }

        let root = self.table.root();
        let container = self.script_container(root)?;
        let eval = self.table.create(
            container,
            SymbolKind::Method,
            EVAL,
            SymbolFlags::STATIC | SymbolFlags::ENTRY_POINT | SymbolFlags::SYNTHESIZED,
            None,
        );
        self.table.set_type(eval, Type::Any)?;
        if !self.table.define(eval) {
            return Err(InternalError::Invariant {
                message: format!("{} declared twice in submission {}", EVAL, self.submission),
            });
        }

        let mut statements = Vec::new();
        for unit in statement_files {
            statements.extend(self.bind_file_statements(unit, eval)?);
        }

        let value = match statements.pop() {
            Some(Stmt::Expression(value)) => value,
            Some(other) => {
                statements.push(other);
                Expr::unit(Span::default())
            }
            None => Expr::unit(Span::default()),
        };
        let value = self.convert(value, &Type::Any, false);
        statements.push(Stmt::Expression(value));

        Ok(EntryPlan {
            entry_point: Some(EntryPoint {
                is_script: true,
                symbol: eval,
            }),
            synthesized: Some((eval, statements)),
        })
    }

    fn bind_user_main(
        &mut self,
        main: &PendingFunction<'_>,
        statement_files: &[&FileUnit<'_>],
    ) -> Result<EntryPlan> {
        let symbol = main.symbol;
        self.table.add_flags(symbol, SymbolFlags::ENTRY_POINT);
        self.context.file = main.file;

        let returns_unit = self.table.type_or_error(symbol).is_unit();
        if !self.table.parameters(symbol).is_empty() || !returns_unit {
            self.report(SemanticError::InvalidMainSignature, main.decl.name.span);
        }

        if !statement_files.is_empty() {
            self.context.file = main.file;
            self.report(SemanticError::MainWithGlobalStatements, main.decl.name.span);
            for unit in statement_files {
                if let Some(span) = first_statement(unit) {
                    self.context.file = unit.file;
                    self.report(SemanticError::MainWithGlobalStatements, span);
                }
                // Top-level values still become fields functions can see.
                self.bind_file_statements(unit, symbol)?;
            }
        }

        Ok(EntryPlan {
            entry_point: Some(EntryPoint {
                is_script: false,
                symbol,
            }),
            synthesized: None,
        })
    }

    fn synthesize_main(&mut self) -> Result<SymbolId> {
        let root = self.table.root();
        let main = self.table.create(
            root,
            SymbolKind::Method,
            MAIN,
            SymbolFlags::STATIC | SymbolFlags::ENTRY_POINT | SymbolFlags::SYNTHESIZED,
            None,
        );
        self.table.set_type(main, Type::Unit)?;
        if !self.table.define(main) {
            tracing::debug!("synthesized main is shadowed by a root member");
        }
        Ok(main)
    }

    /// Bind the top-level statements of one file for `owner`.
    fn bind_file_statements(&mut self, unit: &FileUnit<'_>, owner: SymbolId) -> Result<Vec<Stmt>> {
        let saved = self.enter(Context {
            file: unit.file,
            scope: unit.scope,
            owner,
            this_type: None,
        });
        let saved_loops = std::mem::take(&mut self.loops);

        let mut statements = Vec::new();
        for item in unit.items {
            if let Item::Statement(stmt) = item {
                statements.push(self.bind_stmt(stmt)?);
            }
        }

        self.loops = saved_loops;
        self.leave(saved);
        Ok(statements)
    }
}

fn program_plan(entry: SymbolId, statements: Vec<Stmt>) -> EntryPlan {
    EntryPlan {
        entry_point: Some(EntryPoint {
            is_script: false,
            symbol: entry,
        }),
        synthesized: Some((entry, statements)),
    }
}
