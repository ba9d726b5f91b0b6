//! Tree-walking evaluator
//!
//! Executes statements against an [`Environment`], keeping a process-wide
//! registry of loaded modules so re-running an `import` reuses the module
//! instead of re-reading it. [`Executor::reload_module`] is the only way a
//! cached module is refreshed from disk.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::domain::ports::Executor;

use super::ast::{BinaryOp, Expr, Statement, Stmt, UnaryOp};
use super::builtins::BaseScope;
use super::environment::Environment;
use super::error::Fault;
use super::parser::parse_program;
use super::value::{checked_len, Function, Module, Value};

/// Deepest allowed chain of nested function calls
pub const MAX_CALL_DEPTH: usize = 100;

/// Module file extension used when the watched script has none
pub const DEFAULT_EXTENSION: &str = "it";

enum Flow {
    Next,
    Return(Value),
    Break,
    Continue,
}

struct Frame {
    globals: Environment,
    locals: Option<HashMap<String, Value>>,
}

impl Frame {
    fn global(env: &Environment) -> Self {
        Self {
            globals: env.clone(),
            locals: None,
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, Fault> {
        self.locals
            .as_ref()
            .and_then(|locals| locals.get(name).cloned())
            .or_else(|| self.globals.get(name))
            .ok_or_else(|| Fault::UndefinedName(name.to_string()))
    }

    fn assign(&mut self, name: &str, value: Value) {
        match &mut self.locals {
            Some(locals) => {
                locals.insert(name.to_string(), value);
            }
            None => self.globals.set(name, value),
        }
    }
}

pub struct Interpreter {
    base: BaseScope,
    modules: HashMap<String, Rc<Module>>,
    loading: Vec<String>,
    extension: String,
    out: Box<dyn Write>,
    depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter printing to stdout
    pub fn new() -> Self {
        Self {
            base: BaseScope::capture(),
            modules: HashMap::new(),
            loading: Vec::new(),
            extension: DEFAULT_EXTENSION.to_string(),
            out: Box::new(io::stdout()),
            depth: 0,
        }
    }

    /// An interpreter resolving modules with the same extension as `script`
    pub fn for_script(script: &Path) -> Self {
        let extension = script
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(DEFAULT_EXTENSION);
        Self::new().with_extension(extension)
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    /// Redirect script output (`print`)
    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Names of every module currently held in the registry, sorted
    pub fn loaded_modules(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn run_top_level(&mut self, stmt: &Stmt, env: &Environment) -> Result<(), Fault> {
        let mut frame = Frame::global(env);
        match self.exec(stmt, &mut frame)? {
            Flow::Next => Ok(()),
            Flow::Return(_) => Err(Fault::Misplaced("return", "function")),
            Flow::Break => Err(Fault::Misplaced("break", "loop")),
            Flow::Continue => Err(Fault::Misplaced("continue", "loop")),
        }
    }

    fn exec_block(&mut self, body: &[Stmt], frame: &mut Frame) -> Result<Flow, Fault> {
        for stmt in body {
            match self.exec(stmt, frame)? {
                Flow::Next => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Next)
    }

    fn exec(&mut self, stmt: &Stmt, frame: &mut Frame) -> Result<Flow, Fault> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval(expr, frame)?;
            }
            Stmt::Assign(target, value) => {
                let value = self.eval(value, frame)?;
                self.assign(target, value, frame)?;
            }
            Stmt::Fn(decl) => {
                let function = Function {
                    decl: Rc::clone(decl),
                    globals: frame.globals.downgrade(),
                };
                frame.assign(&decl.name, Value::Function(Rc::new(function)));
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond, frame)?.is_truthy() {
                    return self.exec_block(then, frame);
                }
                if let Some(body) = otherwise {
                    return self.exec_block(body, frame);
                }
            }
            Stmt::While { cond, body } => {
                while self.eval(cond, frame)?.is_truthy() {
                    match self.exec_block(body, frame)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Next | Flow::Continue => {}
                    }
                }
            }
            Stmt::For { var, iter, body } => {
                let items: Vec<Value> = match self.eval(iter, frame)? {
                    Value::List(items) => items.borrow().clone(),
                    Value::Str(s) => s.chars().map(|c| Value::str(c.to_string())).collect(),
                    other => {
                        return Err(Fault::Type(format!(
                            "'{}' object is not iterable",
                            other.type_name()
                        )))
                    }
                };
                for item in items {
                    frame.assign(var, item);
                    match self.exec_block(body, frame)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Next | Flow::Continue => {}
                    }
                }
            }
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, frame)?,
                    None => Value::Nil,
                };
                return Ok(Flow::Return(value));
            }
            Stmt::Break => return Ok(Flow::Break),
            Stmt::Continue => return Ok(Flow::Continue),
            Stmt::Raise(value) => {
                let value = self.eval(value, frame)?;
                return Err(Fault::Raised(value.to_string()));
            }
            Stmt::Import(targets) => {
                for target in targets {
                    let module = self.import(&target.path, &frame.globals)?;
                    frame.assign(target.binding(), Value::Module(module));
                }
            }
            Stmt::FromImport { path, names } => {
                let module = self.import(path, &frame.globals)?;
                for item in names {
                    let value = module.env.get(&item.name).ok_or_else(|| Fault::ImportName {
                        module: module.name.clone(),
                        name: item.name.clone(),
                    })?;
                    frame.assign(item.binding(), value);
                }
            }
        }
        Ok(Flow::Next)
    }

    fn assign(&mut self, target: &Expr, value: Value, frame: &mut Frame) -> Result<(), Fault> {
        match target {
            Expr::Name(name) => frame.assign(name, value),
            Expr::Index(container, index) => {
                let container = self.eval(container, frame)?;
                let index = self.eval(index, frame)?;
                let Value::List(items) = container else {
                    return Err(Fault::Type(format!(
                        "'{}' object does not support item assignment",
                        container.type_name()
                    )));
                };
                let mut items = items.borrow_mut();
                let i = resolve_index(&index, items.len())?;
                items[i] = value;
            }
            Expr::Attr(owner, name) => match self.eval(owner, frame)? {
                Value::Module(module) => module.env.set(name.as_str(), value),
                other => {
                    return Err(Fault::Type(format!(
                        "cannot set attribute '{name}' on '{}' object",
                        other.type_name()
                    )))
                }
            },
            other => return Err(Fault::Type(format!("cannot assign to {other}"))),
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Expr, frame: &mut Frame) -> Result<Value, Fault> {
        let value = match expr {
            Expr::Nil => Value::Nil,
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Int(i) => Value::Int(*i),
            Expr::Float(x) => Value::Float(*x),
            Expr::Str(s) => Value::str(s),
            Expr::List(items) => Value::list(self.eval_all(items, frame)?),
            Expr::Name(name) => frame.lookup(name)?,
            Expr::Unary(op, operand) => {
                let value = self.eval(operand, frame)?;
                unary(*op, value)?
            }
            Expr::Binary(BinaryOp::And, left, right) => {
                let left = self.eval(left, frame)?;
                if left.is_truthy() {
                    self.eval(right, frame)?
                } else {
                    left
                }
            }
            Expr::Binary(BinaryOp::Or, left, right) => {
                let left = self.eval(left, frame)?;
                if left.is_truthy() {
                    left
                } else {
                    self.eval(right, frame)?
                }
            }
            Expr::Binary(op, left, right) => {
                let left = self.eval(left, frame)?;
                let right = self.eval(right, frame)?;
                binary(*op, &left, &right)?
            }
            Expr::Call(callee, args) => {
                let callee = self.eval(callee, frame)?;
                let args = self.eval_all(args, frame)?;
                self.call(callee, args)?
            }
            Expr::Index(target, index) => {
                let target = self.eval(target, frame)?;
                let index = self.eval(index, frame)?;
                index_value(&target, &index)?
            }
            Expr::Attr(owner, name) => match self.eval(owner, frame)? {
                Value::Module(module) => {
                    module
                        .env
                        .get(name)
                        .ok_or_else(|| Fault::UnknownAttribute {
                            module: module.name.clone(),
                            name: name.clone(),
                        })?
                }
                other => {
                    return Err(Fault::Type(format!(
                        "'{}' object has no attribute '{name}'",
                        other.type_name()
                    )))
                }
            },
        };
        Ok(value)
    }

    fn eval_all(&mut self, exprs: &[Expr], frame: &mut Frame) -> Result<Vec<Value>, Fault> {
        exprs.iter().map(|expr| self.eval(expr, frame)).collect()
    }

    fn call(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, Fault> {
        match callee {
            Value::Builtin(builtin) => (builtin.call)(self.out.as_mut(), &args),
            Value::Function(function) => self.call_function(&function, args),
            other => Err(Fault::NotCallable(other.type_name())),
        }
    }

    fn call_function(&mut self, function: &Function, args: Vec<Value>) -> Result<Value, Fault> {
        let decl = &function.decl;
        if args.len() != decl.params.len() {
            return Err(Fault::Arity {
                name: decl.name.clone(),
                expected: decl.params.len(),
                given: args.len(),
            });
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err(Fault::RecursionLimit);
        }
        let globals = function
            .globals
            .upgrade()
            .ok_or_else(|| Fault::Detached(decl.name.clone()))?;

        let mut frame = Frame {
            globals,
            locals: Some(decl.params.iter().cloned().zip(args).collect()),
        };
        self.depth += 1;
        let flow = self.exec_block(&decl.body, &mut frame);
        self.depth -= 1;

        match flow? {
            Flow::Next => Ok(Value::Nil),
            Flow::Return(value) => Ok(value),
            Flow::Break => Err(Fault::Misplaced("break", "loop")),
            Flow::Continue => Err(Fault::Misplaced("continue", "loop")),
        }
    }

    fn import(&mut self, path: &[String], importer: &Environment) -> Result<Rc<Module>, Fault> {
        let key = path.join(".");
        if let Some(module) = self.modules.get(&key) {
            return Ok(Rc::clone(module));
        }
        let module = self.load_module(&key, path, importer)?;
        self.modules.insert(key, Rc::clone(&module));
        Ok(module)
    }

    fn load_module(
        &mut self,
        key: &str,
        path: &[String],
        importer: &Environment,
    ) -> Result<Rc<Module>, Fault> {
        if self.loading.iter().any(|loading| loading == key) {
            return Err(Fault::CircularImport(key.to_string()));
        }

        let search_path = search_path(importer);
        let file = self
            .resolve(path, &search_path)
            .ok_or_else(|| Fault::ModuleNotFound(key.to_string()))?;
        let source = fs::read_to_string(&file).map_err(|e| Fault::ModuleIo {
            module: key.to_string(),
            message: e.to_string(),
        })?;
        let statements = parse_program(&source).map_err(|error| Fault::ModuleSyntax {
            module: key.to_string(),
            error,
        })?;

        let env = Environment::from_base(&self.base);
        env.set("__name__", Value::str(key));
        env.set("__file__", Value::str(file.display().to_string()));
        env.set(
            "__path__",
            Value::list(
                search_path
                    .iter()
                    .map(|dir| Value::str(dir.display().to_string()))
                    .collect(),
            ),
        );

        self.loading.push(key.to_string());
        let result = statements
            .iter()
            .try_for_each(|statement| self.run_top_level(statement.node(), &env));
        self.loading.pop();
        result.map_err(|cause| Fault::InModule {
            module: key.to_string(),
            cause: Box::new(cause),
        })?;

        Ok(Rc::new(Module {
            name: key.to_string(),
            path: file,
            env,
        }))
    }

    fn resolve(&self, path: &[String], search_path: &[PathBuf]) -> Option<PathBuf> {
        let relative = path
            .iter()
            .collect::<PathBuf>()
            .with_extension(&self.extension);
        search_path
            .iter()
            .map(|dir| dir.join(&relative))
            .find(|candidate| candidate.is_file())
    }
}

impl Executor for Interpreter {
    fn base_scope(&self) -> BaseScope {
        self.base.clone()
    }

    fn execute(&mut self, statement: &Statement, env: &mut Environment) -> Result<(), Fault> {
        self.depth = 0;
        self.run_top_level(statement.node(), env)
    }

    fn reload_module(&mut self, module: &str, env: &mut Environment) -> Result<(), Fault> {
        let mut keys: Vec<String> = self
            .modules
            .keys()
            .filter(|key| top_level(key) == module)
            .cloned()
            .collect();
        keys.sort();
        if keys.is_empty() {
            keys.push(module.to_string());
        }

        for key in keys {
            let previous = self.modules.remove(&key);
            let path: Vec<String> = key.split('.').map(str::to_string).collect();
            let fresh = self.import(&path, env)?;
            if let Some(previous) = previous {
                env.replace_module(&previous, &fresh);
            }
        }
        Ok(())
    }

    fn is_loaded(&self, module: &str) -> bool {
        self.modules.keys().any(|key| top_level(key) == module)
    }

    fn module_extension(&self) -> &str {
        &self.extension
    }
}

fn top_level(key: &str) -> &str {
    key.split('.').next().unwrap_or(key)
}

/// Directories listed in the environment's `__path__`, or the working directory
fn search_path(env: &Environment) -> Vec<PathBuf> {
    let dirs: Vec<PathBuf> = match env.get("__path__") {
        Some(Value::List(items)) => items
            .borrow()
            .iter()
            .filter_map(|item| match item {
                Value::Str(dir) => Some(PathBuf::from(dir.as_ref())),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    if dirs.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        dirs
    }
}

fn resolve_index(index: &Value, len: usize) -> Result<usize, Fault> {
    let Value::Int(i) = *index else {
        return Err(Fault::Type(format!(
            "indices must be int, not '{}'",
            index.type_name()
        )));
    };
    let signed_len = i64::try_from(len).map_err(|_| Fault::Overflow)?;
    let resolved = if i < 0 { i + signed_len } else { i };
    if (0..signed_len).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(Fault::IndexOutOfRange { index: i, len })
    }
}

fn index_value(target: &Value, index: &Value) -> Result<Value, Fault> {
    match target {
        Value::List(items) => {
            let items = items.borrow();
            let i = resolve_index(index, items.len())?;
            Ok(items[i].clone())
        }
        Value::Str(s) => {
            let i = resolve_index(index, s.chars().count())?;
            Ok(s.chars()
                .nth(i)
                .map(|c| Value::str(c.to_string()))
                .unwrap_or(Value::Nil))
        }
        other => Err(Fault::Type(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value, Fault> {
    match (op, value) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Int(i)) => i.checked_neg().map(Value::Int).ok_or(Fault::Overflow),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Neg, other) => Err(Fault::Type(format!(
            "bad operand type for unary -: '{}'",
            other.type_name()
        ))),
    }
}

fn numeric_pair(left: &Value, right: &Value) -> Option<(f64, f64)> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some((*a as f64, *b as f64)),
        (Value::Int(a), Value::Float(b)) => Some((*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Some((*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Some((*a, *b)),
        _ => None,
    }
}

fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => numeric_pair(left, right).and_then(|(a, b)| a.partial_cmp(&b)),
    }
}

/// Integer arithmetic when both sides are ints, float arithmetic otherwise
fn arithmetic(
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Option<Result<Value, Fault>> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            Some(int_op(*a, *b).map(Value::Int).ok_or(Fault::Overflow))
        }
        _ => numeric_pair(left, right).map(|(a, b)| Ok(Value::Float(float_op(a, b)))),
    }
}

fn is_zero(value: &Value) -> bool {
    matches!(value, Value::Int(0)) || matches!(value, Value::Float(x) if *x == 0.0)
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, Fault> {
    let mismatch = || Fault::Operands {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    };
    let compare = |test: fn(Ordering) -> bool| {
        ordering(left, right)
            .map(|o| Value::Bool(test(o)))
            .ok_or_else(mismatch)
    };

    match op {
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::Ne => Ok(Value::Bool(left != right)),
        BinaryOp::Lt => compare(Ordering::is_lt),
        BinaryOp::Le => compare(Ordering::is_le),
        BinaryOp::Gt => compare(Ordering::is_gt),
        BinaryOp::Ge => compare(Ordering::is_ge),
        BinaryOp::Add => match (left, right) {
            (Value::Str(a), Value::Str(b)) => {
                checked_len(a.len().checked_add(b.len()))?;
                Ok(Value::str(format!("{a}{b}")))
            }
            (Value::List(a), Value::List(b)) => {
                checked_len(a.borrow().len().checked_add(b.borrow().len()))?;
                let mut items = a.borrow().clone();
                items.extend(b.borrow().iter().cloned());
                Ok(Value::list(items))
            }
            _ => arithmetic(left, right, i64::checked_add, |a, b| a + b)
                .unwrap_or_else(|| Err(mismatch())),
        },
        BinaryOp::Sub => arithmetic(left, right, i64::checked_sub, |a, b| a - b)
            .unwrap_or_else(|| Err(mismatch())),
        BinaryOp::Mul => match (left, right) {
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                let count = usize::try_from((*n).max(0)).unwrap_or(usize::MAX);
                checked_len(s.len().checked_mul(count))?;
                Ok(Value::str(s.repeat(count)))
            }
            _ => arithmetic(left, right, i64::checked_mul, |a, b| a * b)
                .unwrap_or_else(|| Err(mismatch())),
        },
        BinaryOp::Div | BinaryOp::Rem if is_zero(right) && numeric_pair(left, right).is_some() => {
            Err(Fault::DivisionByZero)
        }
        // Integer division truncates; `%` follows the sign of the divisor.
        BinaryOp::Div => arithmetic(left, right, i64::checked_div, |a, b| a / b)
            .unwrap_or_else(|| Err(mismatch())),
        BinaryOp::Rem => arithmetic(left, right, i64::checked_rem_euclid, f64::rem_euclid)
            .unwrap_or_else(|| Err(mismatch())),
        BinaryOp::And | BinaryOp::Or => Ok(if left.is_truthy() == (op == BinaryOp::And) {
            right.clone()
        } else {
            left.clone()
        }),
    }
}
