//! Runtime values

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use super::ast::{quote, FnDecl};
use super::environment::{Environment, WeakEnvironment};
use super::error::Fault;

/// Signature of a native function from the base scope
pub type BuiltinFn = fn(&mut dyn Write, &[Value]) -> Result<Value, Fault>;

/// A native function
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub call: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<builtin {}>", self.name)
    }
}

/// A user-defined function together with the globals it resolves names in
#[derive(Debug)]
pub struct Function {
    pub decl: Rc<FnDecl>,
    pub globals: WeakEnvironment,
}

/// Upper bound on the length of any list or string built in one operation
pub const MAX_SEQUENCE_LEN: usize = 1 << 24;

/// Accept a computed sequence length, or fail when it overflowed or exceeds
/// [`MAX_SEQUENCE_LEN`]
pub fn checked_len(len: Option<usize>) -> Result<usize, Fault> {
    match len {
        Some(len) if len <= MAX_SEQUENCE_LEN => Ok(len),
        _ => Err(Fault::TooLarge),
    }
}

type ListCell = RefCell<Vec<Value>>;

thread_local! {
    // Lists currently being rendered or compared further up the stack
    static ACTIVE_LISTS: RefCell<Vec<(*const ListCell, *const ListCell)>> =
        const { RefCell::new(Vec::new()) };
}

/// Run `f` with the pair marked active, or return `None` when the pair is
/// already being visited.
fn visiting<T>(pair: (*const ListCell, *const ListCell), f: impl FnOnce() -> T) -> Option<T> {
    let entered = ACTIVE_LISTS.with(|active| {
        let mut active = active.borrow_mut();
        if active.contains(&pair) {
            false
        } else {
            active.push(pair);
            true
        }
    });
    if !entered {
        return None;
    }
    let result = f();
    ACTIVE_LISTS.with(|active| {
        let mut active = active.borrow_mut();
        if let Some(at) = active.iter().rposition(|p| *p == pair) {
            active.remove(at);
        }
    });
    Some(result)
}

/// A loaded module: its own environment plus where it came from
#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub path: PathBuf,
    pub env: Environment,
}

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<ListCell>),
    Function(Rc<Function>),
    Builtin(Builtin),
    Module(Rc<Module>),
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin",
            Value::Module(_) => "module",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Function(_) | Value::Builtin(_) | Value::Module(_) => true,
        }
    }

    /// Representation used inside lists: strings are quoted
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => quote(s),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            // A pair already under comparison is assumed equal, so cyclic
            // lists compare structurally instead of recursing forever.
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b)
                    || visiting((Rc::as_ptr(a), Rc::as_ptr(b)), || {
                        *a.borrow() == *b.borrow()
                    })
                    .unwrap_or(true)
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                let ptr = Rc::as_ptr(items);
                visiting((ptr, ptr), || {
                    write!(f, "[")?;
                    for (i, item) in items.borrow().iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", item.repr())?;
                    }
                    write!(f, "]")
                })
                .unwrap_or_else(|| write!(f, "[...]"))
            }
            Value::Function(func) => write!(f, "<fn {}>", func.decl.name),
            Value::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name),
            Value::Module(module) => write!(f, "<module {}>", module.name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::List(_) => write!(f, "List({self})"),
            other => write!(f, "{other}"),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}
