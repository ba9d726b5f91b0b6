//! The base scope: bindings available before any user code runs

use std::io::Write;

use super::error::Fault;
use super::value::{checked_len, Builtin, BuiltinFn, Value};

/// Immutable set of base bindings, copied into every fresh environment
#[derive(Debug, Clone)]
pub struct BaseScope {
    bindings: Vec<(&'static str, Value)>,
}

const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("print", print),
    ("len", len),
    ("str", str),
    ("int", int),
    ("float", float),
    ("type", type_of),
    ("range", range),
    ("push", push),
];

impl BaseScope {
    pub fn capture() -> Self {
        let bindings = BUILTINS
            .iter()
            .map(|&(name, call)| (name, Value::Builtin(Builtin { name, call })))
            .collect();
        Self { bindings }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.bindings.iter().map(|(name, value)| (*name, value))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.bindings.iter().map(|(name, _)| *name).collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), Fault> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Fault::Arity {
            name: name.to_string(),
            expected,
            given: args.len(),
        })
    }
}

fn print(out: &mut dyn Write, args: &[Value]) -> Result<Value, Fault> {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "{line}").map_err(|e| Fault::Output(e.to_string()))?;
    Ok(Value::Nil)
}

fn len(_: &mut dyn Write, args: &[Value]) -> Result<Value, Fault> {
    arity("len", args, 1)?;
    let n = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.borrow().len(),
        other => {
            return Err(Fault::Type(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )))
        }
    };
    i64::try_from(n).map(Value::Int).map_err(|_| Fault::Overflow)
}

fn str(_: &mut dyn Write, args: &[Value]) -> Result<Value, Fault> {
    arity("str", args, 1)?;
    Ok(Value::str(args[0].to_string()))
}

fn int(_: &mut dyn Write, args: &[Value]) -> Result<Value, Fault> {
    arity("int", args, 1)?;
    match &args[0] {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(x) if x.is_finite() => Ok(Value::Int(x.trunc() as i64)),
        Value::Str(s) => s
            .trim()
            .parse()
            .map(Value::Int)
            .map_err(|_| Fault::Type(format!("invalid literal for int(): {}", Value::Str(s.clone()).repr()))),
        other => Err(Fault::Type(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn float(_: &mut dyn Write, args: &[Value]) -> Result<Value, Fault> {
    arity("float", args, 1)?;
    match &args[0] {
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Float(x) => Ok(Value::Float(*x)),
        Value::Str(s) => s
            .trim()
            .parse()
            .map(Value::Float)
            .map_err(|_| Fault::Type(format!("could not convert string to float: {}", Value::Str(s.clone()).repr()))),
        other => Err(Fault::Type(format!(
            "float() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn type_of(_: &mut dyn Write, args: &[Value]) -> Result<Value, Fault> {
    arity("type", args, 1)?;
    Ok(Value::str(args[0].type_name()))
}

fn range(_: &mut dyn Write, args: &[Value]) -> Result<Value, Fault> {
    let (start, end) = match args {
        [Value::Int(end)] => (0, *end),
        [Value::Int(start), Value::Int(end)] => (*start, *end),
        [_] | [_, _] => return Err(Fault::Type("range() arguments must be int".to_string())),
        _ => {
            return Err(Fault::Type(format!(
                "range() takes 1 or 2 arguments but {} were given",
                args.len()
            )))
        }
    };
    let len = usize::try_from((i128::from(end) - i128::from(start)).max(0)).unwrap_or(usize::MAX);
    checked_len(Some(len))?;
    Ok(Value::list((start..end).map(Value::Int).collect()))
}

fn push(_: &mut dyn Write, args: &[Value]) -> Result<Value, Fault> {
    arity("push", args, 2)?;
    match &args[0] {
        Value::List(items) => {
            checked_len(items.borrow().len().checked_add(1))?;
            items.borrow_mut().push(args[1].clone());
            Ok(Value::Nil)
        }
        other => Err(Fault::Type(format!(
            "push() expects a list, not '{}'",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Result<Value, Fault> {
        let base = BaseScope::capture();
        let (_, value) = base.iter().find(|(n, _)| *n == name).unwrap();
        let Value::Builtin(builtin) = value else {
            panic!("{name} is not a builtin");
        };
        (builtin.call)(&mut Vec::new(), args)
    }

    #[test]
    fn print_joins_arguments_with_spaces() {
        let mut out = Vec::new();
        print(&mut out, &[Value::str("x ="), Value::Int(3)]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "x = 3\n");
    }

    #[test]
    fn len_counts_characters_and_items() {
        assert_eq!(call("len", &[Value::str("héllo")]).unwrap(), Value::Int(5));
        assert_eq!(
            call("len", &[Value::list(vec![Value::Nil, Value::Nil])]).unwrap(),
            Value::Int(2)
        );
        assert!(call("len", &[Value::Int(1)]).is_err());
    }

    #[test]
    fn range_with_one_or_two_bounds() {
        assert_eq!(
            call("range", &[Value::Int(3)]).unwrap(),
            Value::list(vec![Value::Int(0), Value::Int(1), Value::Int(2)])
        );
        assert_eq!(
            call("range", &[Value::Int(2), Value::Int(4)]).unwrap(),
            Value::list(vec![Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn range_refuses_oversized_lists() {
        assert_eq!(call("range", &[Value::Int(i64::MAX)]), Err(Fault::TooLarge));
        assert_eq!(
            call("range", &[Value::Int(i64::MIN), Value::Int(i64::MAX)]),
            Err(Fault::TooLarge)
        );
        assert_eq!(call("range", &[Value::Int(5), Value::Int(1)]).unwrap(), Value::list(vec![]));
    }

    #[test]
    fn int_parses_strings() {
        assert_eq!(call("int", &[Value::str(" 42 ")]).unwrap(), Value::Int(42));
        assert!(matches!(
            call("int", &[Value::str("nope")]),
            Err(Fault::Type(_))
        ));
    }

    #[test]
    fn wrong_arity_is_a_fault() {
        assert_eq!(
            call("str", &[]),
            Err(Fault::Arity {
                name: "str".to_string(),
                expected: 1,
                given: 0
            })
        );
    }

    #[test]
    fn base_scope_lists_every_builtin() {
        let base = BaseScope::capture();
        assert_eq!(base.len(), BUILTINS.len());
        assert!(base.names().contains(&"print"));
    }
}
