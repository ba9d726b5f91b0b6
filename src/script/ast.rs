//! Syntax tree for watched scripts
//!
//! Nodes carry no positions, so two statements compare equal whenever their
//! structure is equal, regardless of whitespace, comments or location in the
//! file. `Display` re-serializes a node to canonical source text.

use std::fmt;
use std::rc::Rc;

/// Maximum length of a statement preview in log lines
pub const PREVIEW_WIDTH: usize = 80;

const INDENT: &str = "    ";

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
        }
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Expr>),
    Name(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Attr(Box<Expr>, String),
}

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(op, _, _) => op.precedence(),
            Expr::Unary(UnaryOp::Not, _) => 3,
            Expr::Unary(UnaryOp::Neg, _) => 7,
            Expr::Call(..) | Expr::Index(..) | Expr::Attr(..) => 8,
            _ => 9,
        }
    }

    /// Whether the expression may appear on the left of `=`
    pub fn is_assignable(&self) -> bool {
        matches!(self, Expr::Name(_) | Expr::Index(..) | Expr::Attr(..))
    }
}

/// A function definition, shared between the syntax tree and runtime values
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// `import a.b as c`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    pub path: Vec<String>,
    pub alias: Option<String>,
}

impl ImportTarget {
    /// Name the module is bound to in the importing environment
    pub fn binding(&self) -> &str {
        self.alias
            .as_deref()
            .or_else(|| self.path.last().map(String::as_str))
            .unwrap_or_default()
    }
}

/// `x` or `x as y` in `from m import x as y`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportName {
    pub fn binding(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Assign(Expr, Expr),
    Fn(Rc<FnDecl>),
    If {
        cond: Expr,
        then: Vec<Stmt>,
        otherwise: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    For {
        var: String,
        iter: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Raise(Expr),
    Import(Vec<ImportTarget>),
    FromImport {
        path: Vec<String>,
        names: Vec<ImportName>,
    },
}

impl Stmt {
    /// Visit the module path of every import reachable from this statement,
    /// including imports nested in function bodies and blocks.
    pub fn visit_imports<'a>(&'a self, visit: &mut impl FnMut(&'a [String])) {
        match self {
            Stmt::Import(targets) => targets.iter().for_each(|t| visit(&t.path)),
            Stmt::FromImport { path, .. } => visit(path),
            Stmt::Fn(decl) => decl.body.iter().for_each(|s| s.visit_imports(visit)),
            Stmt::If {
                then, otherwise, ..
            } => {
                then.iter().for_each(|s| s.visit_imports(visit));
                if let Some(body) = otherwise {
                    body.iter().for_each(|s| s.visit_imports(visit));
                }
            }
            Stmt::While { body, .. } | Stmt::For { body, .. } => {
                body.iter().for_each(|s| s.visit_imports(visit))
            }
            _ => {}
        }
    }
}

/// One top-level statement of a snapshot
///
/// Cheap to clone and never mutated once parsed.
#[derive(Debug, Clone)]
pub struct Statement(Rc<Stmt>);

impl Statement {
    pub fn new(stmt: Stmt) -> Self {
        Self(Rc::new(stmt))
    }

    pub fn node(&self) -> &Stmt {
        &self.0
    }

    /// Re-serialized source text of the statement
    pub fn source(&self) -> String {
        self.0.to_string()
    }

    /// First line of the re-serialized source, truncated for log output
    pub fn preview(&self) -> String {
        let source = self.source();
        source
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(PREVIEW_WIDTH)
            .collect()
    }

    /// Top-level names of every module this statement imports
    pub fn imported_modules(&self) -> Vec<&str> {
        let mut modules = Vec::new();
        self.0.visit_imports(&mut |path| {
            if let Some(first) = path.first() {
                modules.push(first.as_str());
            }
        });
        modules
    }
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl From<Stmt> for Statement {
    fn from(stmt: Stmt) -> Self {
        Self::new(stmt)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, &self.0, 0)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    match stmt {
        Stmt::Expr(expr) => write!(f, "{expr}"),
        Stmt::Assign(target, value) => write!(f, "{target} = {value}"),
        Stmt::Fn(decl) => {
            write!(f, "fn {}({}) ", decl.name, decl.params.join(", "))?;
            write_block(f, &decl.body, depth)
        }
        Stmt::If {
            cond,
            then,
            otherwise,
        } => {
            write!(f, "if {cond} ")?;
            write_block(f, then, depth)?;
            match otherwise.as_deref() {
                None => Ok(()),
                Some([nested @ Stmt::If { .. }]) => {
                    write!(f, " else ")?;
                    write_stmt(f, nested, depth)
                }
                Some(body) => {
                    write!(f, " else ")?;
                    write_block(f, body, depth)
                }
            }
        }
        Stmt::While { cond, body } => {
            write!(f, "while {cond} ")?;
            write_block(f, body, depth)
        }
        Stmt::For { var, iter, body } => {
            write!(f, "for {var} in {iter} ")?;
            write_block(f, body, depth)
        }
        Stmt::Return(None) => write!(f, "return"),
        Stmt::Return(Some(value)) => write!(f, "return {value}"),
        Stmt::Break => write!(f, "break"),
        Stmt::Continue => write!(f, "continue"),
        Stmt::Raise(value) => write!(f, "raise {value}"),
        Stmt::Import(targets) => {
            write!(f, "import ")?;
            for (i, target) in targets.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", target.path.join("."))?;
                if let Some(alias) = &target.alias {
                    write!(f, " as {alias}")?;
                }
            }
            Ok(())
        }
        Stmt::FromImport { path, names } => {
            write!(f, "from {} import ", path.join("."))?;
            for (i, item) in names.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item.name)?;
                if let Some(alias) = &item.alias {
                    write!(f, " as {alias}")?;
                }
            }
            Ok(())
        }
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, body: &[Stmt], depth: usize) -> fmt::Result {
    if body.is_empty() {
        return write!(f, "{{}}");
    }
    writeln!(f, "{{")?;
    for stmt in body {
        write!(f, "{}", INDENT.repeat(depth + 1))?;
        write_stmt(f, stmt, depth + 1)?;
        writeln!(f)?;
    }
    write!(f, "{}}}", INDENT.repeat(depth))
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if expr.precedence() < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Quote a string literal the way the lexer reads it back
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Nil => write!(f, "nil"),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Int(i) => write!(f, "{i}"),
            Expr::Float(x) => write!(f, "{x:?}"),
            Expr::Str(s) => write!(f, "{}", quote(s)),
            Expr::List(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            Expr::Name(name) => write!(f, "{name}"),
            Expr::Unary(UnaryOp::Neg, operand) => {
                write!(f, "-")?;
                write_operand(f, operand, 7)
            }
            Expr::Unary(UnaryOp::Not, operand) => {
                write!(f, "not ")?;
                write_operand(f, operand, 3)
            }
            Expr::Binary(op, left, right) => {
                let p = op.precedence();
                write_operand(f, left, p)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, right, p + 1)
            }
            Expr::Call(callee, args) => {
                write_operand(f, callee, 8)?;
                write!(f, "(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Expr::Index(target, index) => {
                write_operand(f, target, 8)?;
                write!(f, "[{index}]")
            }
            Expr::Attr(target, name) => {
                write_operand(f, target, 8)?;
                write!(f, ".{name}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Box<Expr> {
        Box::new(Expr::Name(n.to_string()))
    }

    #[test]
    fn binary_operands_are_parenthesized_by_precedence() {
        let sum = Expr::Binary(BinaryOp::Add, name("a"), name("b"));
        let product = Expr::Binary(BinaryOp::Mul, Box::new(sum), name("c"));
        assert_eq!(product.to_string(), "(a + b) * c");

        let chained = Expr::Binary(
            BinaryOp::Sub,
            Box::new(Expr::Binary(BinaryOp::Sub, name("a"), name("b"))),
            name("c"),
        );
        assert_eq!(chained.to_string(), "a - b - c");
    }

    #[test]
    fn preview_keeps_first_line_only() {
        let stmt = Statement::new(Stmt::Fn(Rc::new(FnDecl {
            name: "f".to_string(),
            params: vec!["x".to_string()],
            body: vec![Stmt::Return(Some(Expr::Name("x".to_string())))],
        })));
        assert_eq!(stmt.source(), "fn f(x) {\n    return x\n}");
        assert_eq!(stmt.preview(), "fn f(x) {");
    }

    #[test]
    fn preview_truncates_long_lines() {
        let stmt = Statement::new(Stmt::Expr(Expr::Str("x".repeat(200))));
        assert_eq!(stmt.preview().chars().count(), PREVIEW_WIDTH);
    }

    #[test]
    fn imported_modules_include_nested_imports() {
        let stmt = Statement::new(Stmt::Fn(Rc::new(FnDecl {
            name: "load".to_string(),
            params: vec![],
            body: vec![Stmt::Import(vec![ImportTarget {
                path: vec!["pkg".to_string(), "sub".to_string()],
                alias: None,
            }])],
        })));
        assert_eq!(stmt.imported_modules(), vec!["pkg"]);
    }

    #[test]
    fn quote_escapes_special_characters() {
        assert_eq!(quote("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    }
}
