//! Statement Rewriter
//!
//! Applies the syntax-rewrite functions to a statement before SQLite sees
//! it. `least(a, b)` becomes `min(a, b)`, `get_lock(..)` becomes `1=1`, and
//! so on; SQLite's own functions then finish the evaluation.

use crate::error::FunctionError;
use crate::registry::FunctionRegistry;
use sqlparser::ast::{visit_expressions_mut, Expr, FunctionArguments};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use std::borrow::Cow;
use std::ops::ControlFlow;
use tracing::debug;

pub struct StatementRewriter<'r> {
    registry: &'r FunctionRegistry,
    names: Vec<&'static str>,
    dialect: SQLiteDialect,
}

impl<'r> StatementRewriter<'r> {
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Self {
            registry,
            names: registry.rewrite_names(),
            dialect: SQLiteDialect {},
        }
    }

    /// Rewrite `sql`, borrowing it unchanged when no rewrite function occurs.
    ///
    /// Text the parser cannot handle is passed through as is; SQLite will
    /// report anything it cannot run.
    pub fn rewrite<'s>(&self, sql: &'s str) -> Result<Cow<'s, str>, FunctionError> {
        let lowered = sql.to_lowercase();
        if !self.names.iter().any(|name| lowered.contains(name)) {
            return Ok(Cow::Borrowed(sql));
        }

        let mut statements = match Parser::parse_sql(&self.dialect, sql) {
            Ok(statements) => statements,
            Err(e) => {
                debug!(error = %e, "Statement not parseable, passing through");
                return Ok(Cow::Borrowed(sql));
            }
        };

        let mut rewritten = 0usize;
        for statement in statements.iter_mut() {
            let flow = visit_expressions_mut(statement, |expr| match self.rewrite_expr(expr) {
                Ok(changed) => {
                    rewritten += changed as usize;
                    ControlFlow::Continue(())
                }
                Err(e) => ControlFlow::Break(e),
            });
            if let ControlFlow::Break(e) = flow {
                return Err(e);
            }
        }

        if rewritten == 0 {
            return Ok(Cow::Borrowed(sql));
        }
        debug!(rewritten, "Applied syntax-rewrite functions");

        Ok(Cow::Owned(
            statements
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        ))
    }

    fn rewrite_expr(&self, expr: &mut Expr) -> Result<bool, FunctionError> {
        let fragment = match expr {
            Expr::Function(func) => {
                let name = func.name.to_string().to_lowercase();
                let args: Vec<String> = match &func.args {
                    FunctionArguments::List(list) => {
                        list.args.iter().map(|a| a.to_string()).collect()
                    }
                    FunctionArguments::None => Vec::new(),
                    FunctionArguments::Subquery(_) => return Ok(false),
                };
                self.registry.fragment(&name, &args)?
            }
            // SUBSTRING(x FROM a FOR b) and SUBSTRING(x, a, b) parse to a
            // dedicated node rather than a function call.
            Expr::Substring {
                expr: inner,
                substring_from,
                substring_for,
                ..
            } => {
                let mut args = vec![inner.to_string()];
                args.extend(substring_from.iter().map(|e| e.to_string()));
                args.extend(substring_for.iter().map(|e| e.to_string()));
                self.registry.fragment("substring", &args)?
            }
            _ => None,
        };

        let Some(fragment) = fragment else {
            return Ok(false);
        };
        *expr = Parser::new(&self.dialect)
            .try_with_sql(&fragment)?
            .parse_expr()?;
        Ok(true)
    }
}
