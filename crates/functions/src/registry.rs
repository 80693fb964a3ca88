//! Function Registry
//!
//! Name-keyed table of MySQL built-ins emulated on top of SQLite. Every entry
//! is either a value function (computes the final scalar) or a syntax-rewrite
//! function (emits a SQLite-native fragment for the engine to finish).

use crate::error::FunctionError;
use crate::metadata::{SchemaMetadata, StaticSchema};
use crate::value::sql_literal;
use crate::{datetime, misc, numeric, string};
use mylite_common::config::DEFAULT_VERSION_STRING;
use rusqlite::types::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Accepted argument counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(e) => n == e,
            Arity::Range(lo, hi) => (lo..=hi).contains(&n),
            Arity::AtLeast(min) => n >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(lo, hi) => write!(f, "{}..={}", lo, hi),
            Arity::AtLeast(min) => write!(f, "at least {}", min),
        }
    }
}

pub type ValueFn = fn(&Call<'_>) -> Result<Value, FunctionError>;
pub type RewriteFn = fn(&[String]) -> String;

#[derive(Clone, Copy)]
pub enum FunctionKind {
    Value(ValueFn),
    Rewrite(RewriteFn),
}

impl fmt::Debug for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Value(_) => f.write_str("Value"),
            FunctionKind::Rewrite(_) => f.write_str("Rewrite"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FunctionSpec {
    /// Canonical name; aliases point at the same spec.
    pub name: &'static str,
    pub arity: Arity,
    pub kind: FunctionKind,
    /// Same inputs always give the same output (lets SQLite cache results).
    pub deterministic: bool,
}

impl FunctionSpec {
    fn check_arity(&self, actual: usize) -> Result<(), FunctionError> {
        if self.arity.accepts(actual) {
            Ok(())
        } else {
            Err(FunctionError::Arity {
                function: self.name,
                expected: self.arity.to_string(),
                actual,
            })
        }
    }
}

/// Host-provided inputs some functions read.
#[derive(Debug, Clone)]
pub struct FunctionEnv {
    pub schema: Arc<dyn SchemaMetadata>,
    /// Literal returned by `version()`.
    pub version: String,
}

impl Default for FunctionEnv {
    fn default() -> Self {
        Self {
            schema: Arc::new(StaticSchema::empty()),
            version: DEFAULT_VERSION_STRING.to_string(),
        }
    }
}

/// One invocation of a value function.
pub struct Call<'a> {
    pub name: &'static str,
    pub args: &'a [Value],
    pub env: &'a FunctionEnv,
}

impl<'a> Call<'a> {
    pub fn arg(&self, i: usize) -> &'a Value {
        &self.args[i]
    }

    pub fn opt_arg(&self, i: usize) -> Option<&'a Value> {
        self.args.get(i)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Value(Value),
    Fragment(String),
}

/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    specs: HashMap<&'static str, FunctionSpec>,
    env: FunctionEnv,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::mysql(FunctionEnv::default())
    }
}

impl FunctionRegistry {
    pub fn new(env: FunctionEnv) -> Self {
        Self {
            specs: HashMap::new(),
            env,
        }
    }

    /// Add a deterministic value function
    pub fn value(self, name: &'static str, arity: Arity, f: ValueFn) -> Self {
        self.insert(name, arity, FunctionKind::Value(f), true)
    }

    /// Add a value function whose result varies between calls (clock, RNG)
    pub fn volatile(self, name: &'static str, arity: Arity, f: ValueFn) -> Self {
        self.insert(name, arity, FunctionKind::Value(f), false)
    }

    /// Add a syntax-rewrite function
    pub fn rewrite(self, name: &'static str, arity: Arity, f: RewriteFn) -> Self {
        self.insert(name, arity, FunctionKind::Rewrite(f), true)
    }

    /// Register `alias` as another name for an existing entry.
    ///
    /// The target must already be registered; a missing target is a bug in
    /// the table and panics in debug builds.
    pub fn alias(mut self, alias: &'static str, target: &'static str) -> Self {
        match self.specs.get(target).copied() {
            Some(spec) => {
                self.specs.insert(alias, spec);
            }
            None => {
                debug_assert!(false, "alias '{}' targets unknown function '{}'", alias, target);
                warn!(alias, target, "Alias targets an unregistered function, skipping");
            }
        }
        self
    }

    fn insert(
        mut self,
        name: &'static str,
        arity: Arity,
        kind: FunctionKind,
        deterministic: bool,
    ) -> Self {
        self.specs.insert(
            name,
            FunctionSpec {
                name,
                arity,
                kind,
                deterministic,
            },
        );
        self
    }

    /// The full MySQL compatibility table.
    pub fn mysql(env: FunctionEnv) -> Self {
        use Arity::*;

        Self::new(env)
            // date/time
            .value("month", Exact(1), datetime::month)
            .value("year", Exact(1), datetime::year)
            .value("day", Exact(1), datetime::day)
            .value("hour", Exact(1), datetime::hour)
            .value("minute", Exact(1), datetime::minute)
            .value("second", Exact(1), datetime::second)
            .volatile("unix_timestamp", Range(0, 1), datetime::unix_timestamp)
            .volatile("now", Exact(0), datetime::now)
            .volatile("curdate", Exact(0), datetime::curdate)
            .volatile("utc_date", Exact(0), datetime::utc_date)
            .volatile("utc_time", Exact(0), datetime::utc_time)
            .volatile("utc_timestamp", Exact(0), datetime::utc_timestamp)
            .volatile("from_unixtime", Range(1, 2), datetime::from_unixtime)
            .value("date_format", Exact(2), datetime::date_format)
            .volatile("date_add", Exact(2), datetime::date_add)
            .volatile("date_sub", Exact(2), datetime::date_sub)
            .value("datediff", Exact(2), datetime::datediff)
            // string
            .value("char_length", Exact(1), string::char_length)
            .value("md5", Exact(1), string::md5)
            .value("concat", AtLeast(0), string::concat)
            .value("field", AtLeast(0), string::field)
            .value("locate", Range(2, 3), string::locate)
            .value("regexp", Exact(2), string::regexp)
            .value("inet_ntoa", Exact(1), string::inet_ntoa)
            .value("inet_aton", Exact(1), string::inet_aton)
            .rewrite("substring", Range(2, 3), string::substring)
            .rewrite("ucase", Exact(1), string::ucase)
            .rewrite("lcase", Exact(1), string::lcase)
            // numeric
            .volatile("rand", Exact(0), numeric::rand)
            .value("log", AtLeast(0), numeric::log)
            .rewrite("least", AtLeast(2), numeric::least)
            .rewrite("greatest", AtLeast(2), numeric::greatest)
            // misc
            .value("isnull", Exact(1), misc::isnull)
            .value("_if", Exact(3), misc::if_)
            .value("version", Exact(0), misc::version)
            .rewrite("get_lock", Exact(2), misc::get_lock)
            .rewrite("release_lock", Exact(1), misc::release_lock)
            // aliases
            .alias("dayofmonth", "day")
            .alias("adddate", "date_add")
            .alias("subdate", "date_sub")
            .alias("localtime", "now")
            .alias("localtimestamp", "now")
            .alias("if", "_if")
            .alias("regexpp", "regexp")
    }

    pub fn env(&self) -> &FunctionEnv {
        &self.env
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.specs.get(name.to_lowercase().as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names (aliases included), sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.specs.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// `(name, spec)` pairs for every value function, for engine binding.
    pub fn value_functions(&self) -> impl Iterator<Item = (&'static str, &FunctionSpec)> + '_ {
        self.specs
            .iter()
            .filter(|(_, spec)| matches!(spec.kind, FunctionKind::Value(_)))
            .map(|(name, spec)| (*name, spec))
    }

    fn lookup(&self, name: &str) -> Result<&FunctionSpec, FunctionError> {
        self.get(name).ok_or_else(|| FunctionError::Unsupported {
            name: name.to_string(),
            known: self.names().into_iter().map(String::from).collect(),
        })
    }

    /// Evaluate any registered function directly.
    ///
    /// Rewrite functions render their arguments as SQL literals.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<CallOutcome, FunctionError> {
        let spec = self.lookup(name)?;
        spec.check_arity(args.len())?;
        match spec.kind {
            FunctionKind::Value(f) => {
                let call = Call {
                    name: spec.name,
                    args,
                    env: &self.env,
                };
                f(&call).map(CallOutcome::Value)
            }
            FunctionKind::Rewrite(f) => {
                let rendered: Vec<String> = args.iter().map(sql_literal).collect();
                Ok(CallOutcome::Fragment(f(&rendered)))
            }
        }
    }

    /// Evaluate a value function. Rewrite functions are an error here.
    pub fn evaluate(&self, name: &str, args: &[Value]) -> Result<Value, FunctionError> {
        match self.call(name, args)? {
            CallOutcome::Value(v) => Ok(v),
            CallOutcome::Fragment(_) => Err(FunctionError::InvalidArgument {
                function: self.lookup(name)?.name,
                message: "syntax-rewrite function cannot be evaluated to a value".to_string(),
            }),
        }
    }

    /// Fragment for a rewrite function applied to SQL argument text.
    ///
    /// `Ok(None)` when `name` is not a rewrite function.
    pub fn fragment(&self, name: &str, args: &[String]) -> Result<Option<String>, FunctionError> {
        match self.get(name) {
            Some(spec) => match spec.kind {
                FunctionKind::Rewrite(f) => {
                    spec.check_arity(args.len())?;
                    Ok(Some(f(args)))
                }
                FunctionKind::Value(_) => Ok(None),
            },
            None => Ok(None),
        }
    }

    /// Names of the rewrite functions (aliases included).
    pub fn rewrite_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .specs
            .iter()
            .filter(|(_, spec)| matches!(spec.kind, FunctionKind::Rewrite(_)))
            .map(|(name, _)| *name)
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FunctionRegistry {
        FunctionRegistry::default()
    }

    #[test]
    fn test_aliases_share_implementation() {
        let r = registry();
        let spec = r.get("DAYOFMONTH").unwrap();
        assert_eq!(spec.name, "day");
        assert_eq!(r.get("if").unwrap().name, "_if");
        assert_eq!(r.get("localtimestamp").unwrap().name, "now");
    }

    #[test]
    fn test_every_alias_resolves() {
        let r = registry();
        for (alias, target) in [
            ("dayofmonth", "day"),
            ("adddate", "date_add"),
            ("subdate", "date_sub"),
            ("localtime", "now"),
            ("localtimestamp", "now"),
            ("if", "_if"),
            ("regexpp", "regexp"),
        ] {
            assert_eq!(r.get(alias).map(|s| s.name), Some(target), "{}", alias);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "targets unknown function")]
    fn test_alias_to_missing_target_panics_in_debug() {
        let _ = FunctionRegistry::new(FunctionEnv::default()).alias("dayofmonth", "dya");
    }

    #[test]
    fn test_default_version_matches_config_default() {
        assert_eq!(registry().env().version, DEFAULT_VERSION_STRING);
    }

    #[test]
    fn test_unknown_function_is_unsupported() {
        let err = registry().call("str_to_date", &[]).unwrap_err();
        match err {
            FunctionError::Unsupported { name, known } => {
                assert_eq!(name, "str_to_date");
                assert!(known.contains(&"date_format".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_arity_checked_before_evaluation() {
        let err = registry()
            .call("month", &[Value::Text("2024-01-01".into()), Value::Null])
            .unwrap_err();
        assert!(matches!(
            err,
            FunctionError::Arity {
                function: "month",
                actual: 2,
                ..
            }
        ));

        let err = registry()
            .call("least", &[Value::Integer(1)])
            .unwrap_err();
        assert!(matches!(err, FunctionError::Arity { function: "least", .. }));
    }

    #[test]
    fn test_rewrite_function_yields_fragment() {
        let out = registry()
            .call("greatest", &[Value::Integer(3), Value::Text("a".into())])
            .unwrap();
        assert_eq!(out, CallOutcome::Fragment("max(3, 'a')".to_string()));
    }

    #[test]
    fn test_evaluate_rejects_rewrite_function() {
        let err = registry().evaluate("ucase", &[Value::Text("a".into())]);
        assert!(matches!(err, Err(FunctionError::InvalidArgument { .. })));
    }

    #[test]
    fn test_fragment_ignores_value_functions() {
        let r = registry();
        assert_eq!(r.fragment("md5", &["'a'".to_string()]).unwrap(), None);
        assert_eq!(r.fragment("nope", &[]).unwrap(), None);
        assert_eq!(
            r.fragment("LCASE", &["name".to_string()]).unwrap(),
            Some("lower(name)".to_string())
        );
    }

    #[test]
    fn test_volatile_functions_are_not_deterministic() {
        let r = registry();
        assert!(!r.get("rand").unwrap().deterministic);
        assert!(!r.get("now").unwrap().deterministic);
        assert!(r.get("md5").unwrap().deterministic);
    }

    #[test]
    fn test_rewrite_names() {
        assert_eq!(
            registry().rewrite_names(),
            vec![
                "get_lock",
                "greatest",
                "lcase",
                "least",
                "release_lock",
                "substring",
                "ucase"
            ]
        );
    }
}
