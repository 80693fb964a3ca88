use crate::error::FunctionError;
use crate::registry::Call;
use crate::value;
use rusqlite::types::Value;

/// Returns 0 or 1 only.
///
/// Callers use `rand()` for coin flips such as `ORDER BY rand()`; this is
/// not a general random number source.
pub fn rand(_call: &Call<'_>) -> Result<Value, FunctionError> {
    Ok(Value::Integer(rand::random::<bool>() as i64))
}

/// `LOG(X)` is the natural log, `LOG(B, X)` the log of X in base B.
///
/// NULL for non-positive inputs, a base of 1, or any other argument count.
pub fn log(call: &Call<'_>) -> Result<Value, FunctionError> {
    let positive = |v: &Value| value::to_f64(v).filter(|f| *f > 0.0);

    let result = match call.args {
        [x] => positive(x).map(f64::ln),
        [base, x] => match (positive(base), positive(x)) {
            (Some(b), Some(x)) if b != 1.0 => Some(x.ln() / b.ln()),
            _ => None,
        },
        _ => None,
    };
    Ok(result.map(Value::Real).unwrap_or(Value::Null))
}

pub fn least(args: &[String]) -> String {
    format!("min({})", args.join(", "))
}

pub fn greatest(args: &[String]) -> String {
    format!("max({})", args.join(", "))
}

#[cfg(test)]
mod tests {
    use crate::registry::FunctionRegistry;
    use rusqlite::types::Value;

    fn eval(name: &str, args: &[Value]) -> Value {
        FunctionRegistry::default().evaluate(name, args).unwrap()
    }

    fn real(v: Value) -> f64 {
        match v {
            Value::Real(f) => f,
            other => panic!("expected real, got {:?}", other),
        }
    }

    #[test]
    fn test_rand_is_zero_or_one() {
        let registry = FunctionRegistry::default();
        let mut seen = [false; 2];
        for _ in 0..1000 {
            match registry.evaluate("rand", &[]).unwrap() {
                Value::Integer(n @ 0..=1) => seen[n as usize] = true,
                other => panic!("rand() returned {:?}", other),
            }
        }
        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn test_log_natural() {
        let v = real(eval("log", &[Value::Real(std::f64::consts::E)]));
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_with_base() {
        let v = real(eval("log", &[Value::Integer(2), Value::Integer(65536)]));
        assert!((v - 16.0).abs() < 1e-9);
        let v = real(eval(
            "log",
            &[Value::Text("10".into()), Value::Text("100".into())],
        ));
        assert!((v - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_domain_and_arity() {
        assert_eq!(eval("log", &[Value::Integer(0)]), Value::Null);
        assert_eq!(eval("log", &[Value::Integer(-4)]), Value::Null);
        assert_eq!(eval("log", &[Value::Integer(1), Value::Integer(8)]), Value::Null);
        assert_eq!(eval("log", &[Value::Null]), Value::Null);
        assert_eq!(eval("log", &[]), Value::Null);
        assert_eq!(
            eval(
                "log",
                &[Value::Integer(2), Value::Integer(4), Value::Integer(8)]
            ),
            Value::Null
        );
    }

    #[test]
    fn test_least_greatest_fragments() {
        let args = vec!["a".to_string(), "b".to_string(), "3".to_string()];
        assert_eq!(super::least(&args), "min(a, b, 3)");
        assert_eq!(super::greatest(&args), "max(a, b, 3)");
    }
}
