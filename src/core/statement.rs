use crate::{
    JSError,
    core::{NestingGuard, Token, TokenData, parse_expression, parse_parameters},
    raise_parse_error,
    stack::ensure_sufficient_stack,
};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    StrictEqual,
    NotEqual,
    StrictNotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Number(f64),
    StringLit(Vec<u16>),
    Boolean(bool),
    Null,
    Undefined,
    This,
    Var(String),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Function(Option<String>, Vec<String>, Rc<Vec<Statement>>), // name, params, body
    Property(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    Assign(Box<Expr>, Box<Expr>),
    AddAssign(Box<Expr>, Box<Expr>),
    SubAssign(Box<Expr>, Box<Expr>),
    Increment(Box<Expr>, bool), // target, is_prefix
    Decrement(Box<Expr>, bool),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    LogicalAnd(Box<Expr>, Box<Expr>),
    LogicalOr(Box<Expr>, Box<Expr>),
    LogicalNot(Box<Expr>),
    UnaryNeg(Box<Expr>),
    TypeOf(Box<Expr>),
}

#[derive(Clone, Debug)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: usize,
    pub column: usize,
}

impl From<StatementKind> for Statement {
    fn from(kind: StatementKind) -> Self {
        Statement { kind, line: 0, column: 0 }
    }
}

#[derive(Clone, Debug)]
pub enum StatementKind {
    Var(Vec<(String, Option<Expr>)>),
    Let(Vec<(String, Option<Expr>)>),
    Const(Vec<(String, Expr)>),
    FunctionDeclaration(String, Vec<String>, Rc<Vec<Statement>>), // name, params, body
    Expr(Expr),
    Return(Option<Expr>),
    If(Expr, Vec<Statement>, Option<Vec<Statement>>), // condition, then_body, else_body
    For(Option<Box<Statement>>, Option<Expr>, Option<Expr>, Vec<Statement>), // init, condition, update, body
    While(Expr, Vec<Statement>),
    Block(Vec<Statement>),
    Break,
    Continue,
    Empty,
}

pub(crate) fn peek<'a>(tokens: &'a [TokenData], index: usize) -> &'a TokenData {
    // The tokenizer always terminates the stream with EOF.
    &tokens[index.min(tokens.len() - 1)]
}

pub(crate) fn expect(tokens: &[TokenData], index: &mut usize, expected: Token, what: &str) -> Result<(), JSError> {
    let t = peek(tokens, *index);
    if t.token != expected {
        return Err(raise_parse_error!(format!("expected {what}, found {:?}", t.token), t));
    }
    *index += 1;
    Ok(())
}

fn consume_semicolon(tokens: &[TokenData], index: &mut usize) -> Result<(), JSError> {
    let t = peek(tokens, *index);
    match t.token {
        Token::Semicolon => {
            *index += 1;
            Ok(())
        }
        // automatic insertion before `}` and at end of input
        Token::RBrace | Token::EOF => Ok(()),
        _ => Err(raise_parse_error!(format!("expected ';', found {:?}", t.token), t)),
    }
}

/// Parse a whole program; every token up to EOF must belong to a statement.
pub fn parse_program(tokens: &[TokenData]) -> Result<Vec<Statement>, JSError> {
    let mut index = 0;
    let statements = parse_statements(tokens, &mut index)?;
    let t = peek(tokens, index);
    if t.token != Token::EOF {
        return Err(raise_parse_error!(format!("unexpected token {:?}", t.token), t));
    }
    log::trace!("parsed program: {:#?}", statements);
    Ok(statements)
}

/// Parse statements until `}` or EOF (neither is consumed).
pub fn parse_statements(tokens: &[TokenData], index: &mut usize) -> Result<Vec<Statement>, JSError> {
    let mut statements = Vec::new();
    while !matches!(peek(tokens, *index).token, Token::RBrace | Token::EOF) {
        statements.push(parse_statement(tokens, index)?);
    }
    Ok(statements)
}

pub fn parse_statement_block(tokens: &[TokenData], index: &mut usize) -> Result<Vec<Statement>, JSError> {
    expect(tokens, index, Token::LBrace, "'{'")?;
    let body = parse_statements(tokens, index)?;
    expect(tokens, index, Token::RBrace, "'}'")?;
    Ok(body)
}

// Loop and branch bodies may be a block or a single statement.
fn parse_body(tokens: &[TokenData], index: &mut usize) -> Result<Vec<Statement>, JSError> {
    if peek(tokens, *index).token == Token::LBrace {
        parse_statement_block(tokens, index)
    } else {
        Ok(vec![parse_statement(tokens, index)?])
    }
}

fn parse_binding_name(tokens: &[TokenData], index: &mut usize) -> Result<String, JSError> {
    let t = peek(tokens, *index);
    if let Token::Identifier(name) = &t.token {
        *index += 1;
        Ok(name.clone())
    } else {
        Err(raise_parse_error!(format!("expected identifier, found {:?}", t.token), t))
    }
}

fn parse_declarations(tokens: &[TokenData], index: &mut usize) -> Result<Vec<(String, Option<Expr>)>, JSError> {
    let mut decls = Vec::new();
    loop {
        let name = parse_binding_name(tokens, index)?;
        let init = if peek(tokens, *index).token == Token::Assign {
            *index += 1;
            Some(parse_expression(tokens, index)?)
        } else {
            None
        };
        decls.push((name, init));
        if peek(tokens, *index).token != Token::Comma {
            break;
        }
        *index += 1;
    }
    Ok(decls)
}

// Declaration without the trailing semicolon, shared by `for` initializers.
fn parse_declaration_kind(tokens: &[TokenData], index: &mut usize) -> Result<StatementKind, JSError> {
    let t = peek(tokens, *index);
    let keyword = t.token.clone();
    *index += 1;
    let decls = parse_declarations(tokens, index)?;
    match keyword {
        Token::Var => Ok(StatementKind::Var(decls)),
        Token::Let => Ok(StatementKind::Let(decls)),
        _ => {
            let mut consts = Vec::with_capacity(decls.len());
            for (name, init) in decls {
                match init {
                    Some(e) => consts.push((name, e)),
                    None => return Err(raise_parse_error!("missing initializer in const declaration", t)),
                }
            }
            Ok(StatementKind::Const(consts))
        }
    }
}

pub fn parse_statement(tokens: &[TokenData], index: &mut usize) -> Result<Statement, JSError> {
    let _level = NestingGuard::enter(peek(tokens, *index))?;
    ensure_sufficient_stack(|| parse_statement_inner(tokens, index))
}

fn parse_statement_inner(tokens: &[TokenData], index: &mut usize) -> Result<Statement, JSError> {
    let start = peek(tokens, *index);
    let (line, column) = (start.line, start.column);
    let kind = match &start.token {
        Token::Semicolon => {
            *index += 1;
            StatementKind::Empty
        }
        Token::LBrace => StatementKind::Block(parse_statement_block(tokens, index)?),
        Token::Var | Token::Let | Token::Const => {
            let kind = parse_declaration_kind(tokens, index)?;
            consume_semicolon(tokens, index)?;
            kind
        }
        Token::Function if matches!(peek(tokens, *index + 1).token, Token::Identifier(_)) => {
            *index += 1;
            let name = parse_binding_name(tokens, index)?;
            expect(tokens, index, Token::LParen, "'('")?;
            let params = parse_parameters(tokens, index)?;
            let body = parse_statement_block(tokens, index)?;
            StatementKind::FunctionDeclaration(name, params, Rc::new(body))
        }
        Token::Return => {
            *index += 1;
            let value = if matches!(peek(tokens, *index).token, Token::Semicolon | Token::RBrace | Token::EOF) {
                None
            } else {
                Some(parse_expression(tokens, index)?)
            };
            consume_semicolon(tokens, index)?;
            StatementKind::Return(value)
        }
        Token::If => {
            *index += 1;
            expect(tokens, index, Token::LParen, "'('")?;
            let condition = parse_expression(tokens, index)?;
            expect(tokens, index, Token::RParen, "')'")?;
            let then_body = parse_body(tokens, index)?;
            let else_body = if peek(tokens, *index).token == Token::Else {
                *index += 1;
                Some(parse_body(tokens, index)?)
            } else {
                None
            };
            StatementKind::If(condition, then_body, else_body)
        }
        Token::For => {
            *index += 1;
            expect(tokens, index, Token::LParen, "'('")?;
            let init_tok = peek(tokens, *index);
            let init = match init_tok.token {
                Token::Semicolon => None,
                Token::Var | Token::Let | Token::Const => {
                    let (l, c) = (init_tok.line, init_tok.column);
                    let kind = parse_declaration_kind(tokens, index)?;
                    Some(Box::new(Statement { kind, line: l, column: c }))
                }
                _ => {
                    let (l, c) = (init_tok.line, init_tok.column);
                    let e = parse_expression(tokens, index)?;
                    Some(Box::new(Statement {
                        kind: StatementKind::Expr(e),
                        line: l,
                        column: c,
                    }))
                }
            };
            expect(tokens, index, Token::Semicolon, "';' after for initializer")?;
            let condition = if peek(tokens, *index).token == Token::Semicolon {
                None
            } else {
                Some(parse_expression(tokens, index)?)
            };
            expect(tokens, index, Token::Semicolon, "';' after for condition")?;
            let update = if peek(tokens, *index).token == Token::RParen {
                None
            } else {
                Some(parse_expression(tokens, index)?)
            };
            expect(tokens, index, Token::RParen, "')'")?;
            let body = parse_body(tokens, index)?;
            StatementKind::For(init, condition, update, body)
        }
        Token::While => {
            *index += 1;
            expect(tokens, index, Token::LParen, "'('")?;
            let condition = parse_expression(tokens, index)?;
            expect(tokens, index, Token::RParen, "')'")?;
            let body = parse_body(tokens, index)?;
            StatementKind::While(condition, body)
        }
        Token::Break => {
            *index += 1;
            consume_semicolon(tokens, index)?;
            StatementKind::Break
        }
        Token::Continue => {
            *index += 1;
            consume_semicolon(tokens, index)?;
            StatementKind::Continue
        }
        _ => {
            let e = parse_expression(tokens, index)?;
            consume_semicolon(tokens, index)?;
            StatementKind::Expr(e)
        }
    };
    Ok(Statement { kind, line, column })
}
