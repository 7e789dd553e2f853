use log::warn;
use lox_value::{BuiltinVars, Value};

/// Returns the default [`BuiltinVars`] that should be used.
pub fn default_builtin_vars() -> BuiltinVars {
    let mut builtin_vars = BuiltinVars::new();
    builtin_vars.add_native_fn("clock", &clock, 0);
    builtin_vars
}

/// Seconds elapsed since the unix epoch.
pub fn clock(_args: &mut [Value]) -> Value {
    let now = std::time::SystemTime::now();
    match now.duration_since(std::time::UNIX_EPOCH) {
        Ok(since_the_epoch) => Value::Number(since_the_epoch.as_secs_f64()),
        Err(err) => {
            warn!("system clock is before the unix epoch: {}", err);
            Value::Number(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic_enough() {
        let first = clock(&mut []).cast_to_number().unwrap();
        let second = clock(&mut []).cast_to_number().unwrap();
        assert!(first > 0.0);
        assert!(second >= first);
    }

    #[test]
    fn test_default_builtins() {
        let builtins = default_builtin_vars();
        let names: Vec<&str> = builtins.values.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["clock"]);
    }
}
