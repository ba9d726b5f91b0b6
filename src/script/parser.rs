//! Recursive-descent parser producing top-level statements

use std::rc::Rc;

use super::ast::{
    BinaryOp, Expr, FnDecl, ImportName, ImportTarget, Statement, Stmt, UnaryOp,
};
use super::error::ParseError;
use super::lexer::{tokenize, Spanned, Token};

/// Parse a whole script into its ordered top-level statements
pub fn parse_program(source: &str) -> Result<Vec<Statement>, ParseError> {
    let mut parser = Parser::new(tokenize(source)?);
    let mut statements = Vec::new();
    loop {
        parser.skip_terminators();
        if parser.at_eof() {
            return Ok(statements);
        }
        statements.push(Statement::new(parser.statement()?));
        parser.end_of_statement()?;
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let (line, column) = self
            .tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| (s.line, s.column))
            .unwrap_or((1, 1));
        ParseError::new(line, column, message)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let found = match self.peek() {
            Token::Ident(name) => format!("'{name}'"),
            Token::Int(i) => i.to_string(),
            Token::Float(x) => x.to_string(),
            Token::Str(_) => "string literal".to_string(),
            Token::Kw(kw) => format!("'{kw}'"),
            Token::Sym(sym) => format!("'{sym}'"),
            Token::Newline => "end of line".to_string(),
            Token::Eof => "end of file".to_string(),
        };
        self.error(format!("expected {expected}, found {found}"))
    }

    fn eat_sym(&mut self, sym: &str) -> bool {
        if matches!(self.peek(), Token::Sym(s) if *s == sym) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        if matches!(self.peek(), Token::Kw(k) if *k == kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_sym(&mut self, sym: &str) -> Result<(), ParseError> {
        if self.eat_sym(sym) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{sym}'")))
        }
    }

    fn expect_kw(&mut self, kw: &str) -> Result<(), ParseError> {
        if self.eat_kw(kw) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{kw}'")))
        }
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Token::Ident(name) => {
                let name = name.clone();
                self.bump();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn skip_terminators(&mut self) {
        while matches!(self.peek(), Token::Newline | Token::Sym(";")) {
            self.bump();
        }
    }

    fn at_terminator(&self) -> bool {
        matches!(
            self.peek(),
            Token::Newline | Token::Eof | Token::Sym(";") | Token::Sym("}")
        )
    }

    fn end_of_statement(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Token::Newline | Token::Sym(";") => {
                self.bump();
                Ok(())
            }
            Token::Eof | Token::Sym("}") => Ok(()),
            _ => Err(self.unexpected("end of statement")),
        }
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect_sym("{")?;
        let mut body = Vec::new();
        loop {
            self.skip_terminators();
            if self.eat_sym("}") {
                return Ok(body);
            }
            if self.at_eof() {
                return Err(self.error("unclosed block, expected '}'"));
            }
            body.push(self.statement()?);
            self.end_of_statement()?;
        }
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = match self.peek() {
            Token::Kw(kw) => Some(*kw),
            _ => None,
        };
        match keyword {
            Some("fn") => self.fn_decl(),
            Some("if") => self.if_stmt(),
            Some("while") => {
                self.bump();
                let cond = self.expression()?;
                let body = self.block()?;
                Ok(Stmt::While { cond, body })
            }
            Some("for") => {
                self.bump();
                let var = self.ident()?;
                self.expect_kw("in")?;
                let iter = self.expression()?;
                let body = self.block()?;
                Ok(Stmt::For { var, iter, body })
            }
            Some("return") => {
                self.bump();
                if self.at_terminator() {
                    Ok(Stmt::Return(None))
                } else {
                    Ok(Stmt::Return(Some(self.expression()?)))
                }
            }
            Some("break") => {
                self.bump();
                Ok(Stmt::Break)
            }
            Some("continue") => {
                self.bump();
                Ok(Stmt::Continue)
            }
            Some("raise") => {
                self.bump();
                Ok(Stmt::Raise(self.expression()?))
            }
            Some("import") => self.import(),
            Some("from") => self.from_import(),
            _ => {
                let expr = self.expression()?;
                if !self.eat_sym("=") {
                    return Ok(Stmt::Expr(expr));
                }
                if !expr.is_assignable() {
                    return Err(self.error(format!("cannot assign to {expr}")));
                }
                let value = self.expression()?;
                Ok(Stmt::Assign(expr, value))
            }
        }
    }

    fn fn_decl(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("fn")?;
        let name = self.ident()?;
        self.expect_sym("(")?;
        let mut params = Vec::new();
        while !self.eat_sym(")") {
            let param = self.ident()?;
            if params.contains(&param) {
                return Err(self.error(format!("duplicate parameter '{param}'")));
            }
            params.push(param);
            if !self.eat_sym(",") {
                self.expect_sym(")")?;
                break;
            }
        }
        let body = self.block()?;
        Ok(Stmt::Fn(Rc::new(FnDecl { name, params, body })))
    }

    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("if")?;
        let cond = self.expression()?;
        let then = self.block()?;

        // `else` may start on the line after the closing brace
        let mut lookahead = 0;
        while matches!(self.peek_nth(lookahead), Token::Newline) {
            lookahead += 1;
        }
        if !matches!(self.peek_nth(lookahead), Token::Kw("else")) {
            return Ok(Stmt::If {
                cond,
                then,
                otherwise: None,
            });
        }
        self.pos += lookahead + 1;

        let otherwise = if matches!(self.peek(), Token::Kw("if")) {
            vec![self.if_stmt()?]
        } else {
            self.block()?
        };
        Ok(Stmt::If {
            cond,
            then,
            otherwise: Some(otherwise),
        })
    }

    fn module_path(&mut self) -> Result<Vec<String>, ParseError> {
        let mut path = vec![self.ident()?];
        while self.eat_sym(".") {
            path.push(self.ident()?);
        }
        Ok(path)
    }

    fn alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.eat_kw("as") {
            Ok(Some(self.ident()?))
        } else {
            Ok(None)
        }
    }

    fn import(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("import")?;
        let mut targets = Vec::new();
        loop {
            let path = self.module_path()?;
            let alias = self.alias()?;
            targets.push(ImportTarget { path, alias });
            if !self.eat_sym(",") {
                return Ok(Stmt::Import(targets));
            }
        }
    }

    fn from_import(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("from")?;
        let path = self.module_path()?;
        self.expect_kw("import")?;
        let mut names = Vec::new();
        loop {
            let name = self.ident()?;
            let alias = self.alias()?;
            names.push(ImportName { name, alias });
            if !self.eat_sym(",") {
                return Ok(Stmt::FromImport { path, names });
            }
        }
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and()?;
        while self.eat_kw("or") {
            let right = self.and()?;
            expr = Expr::Binary(BinaryOp::Or, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.not()?;
        while self.eat_kw("and") {
            let right = self.not()?;
            expr = Expr::Binary(BinaryOp::And, Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    fn not(&mut self) -> Result<Expr, ParseError> {
        if self.eat_kw("not") {
            let operand = self.not()?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.additive()?;
        loop {
            let op = match self.peek() {
                Token::Sym("==") => BinaryOp::Eq,
                Token::Sym("!=") => BinaryOp::Ne,
                Token::Sym("<") => BinaryOp::Lt,
                Token::Sym("<=") => BinaryOp::Le,
                Token::Sym(">") => BinaryOp::Gt,
                Token::Sym(">=") => BinaryOp::Ge,
                _ => return Ok(expr),
            };
            self.bump();
            let right = self.additive()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Sym("+") => BinaryOp::Add,
                Token::Sym("-") => BinaryOp::Sub,
                _ => return Ok(expr),
            };
            self.bump();
            let right = self.multiplicative()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.peek() {
                Token::Sym("*") => BinaryOp::Mul,
                Token::Sym("/") => BinaryOp::Div,
                Token::Sym("%") => BinaryOp::Rem,
                _ => return Ok(expr),
            };
            self.bump();
            let right = self.unary()?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat_sym("-") {
            let operand = self.unary()?;
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.eat_sym("(") {
                let args = self.list_items(")")?;
                expr = Expr::Call(Box::new(expr), args);
            } else if self.eat_sym("[") {
                let index = self.expression()?;
                self.expect_sym("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else if self.eat_sym(".") {
                let name = self.ident()?;
                expr = Expr::Attr(Box::new(expr), name);
            } else {
                return Ok(expr);
            }
        }
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed
    fn list_items(&mut self, close: &str) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        while !self.eat_sym(close) {
            items.push(self.expression()?);
            if !self.eat_sym(",") {
                self.expect_sym(close)?;
                break;
            }
        }
        Ok(items)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match self.peek() {
            Token::Int(i) => Expr::Int(*i),
            Token::Float(x) => Expr::Float(*x),
            Token::Str(s) => Expr::Str(s.clone()),
            Token::Ident(name) => Expr::Name(name.clone()),
            Token::Kw("true") => Expr::Bool(true),
            Token::Kw("false") => Expr::Bool(false),
            Token::Kw("nil") => Expr::Nil,
            Token::Sym("(") => {
                self.bump();
                let inner = self.expression()?;
                self.expect_sym(")")?;
                return Ok(inner);
            }
            Token::Sym("[") => {
                self.bump();
                return Ok(Expr::List(self.list_items("]")?));
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.bump();
        Ok(expr)
    }
}
