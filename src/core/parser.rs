use crate::{
    JSError,
    core::{BinaryOp, Expr, Token, TokenData, expect, parse_statement_block, peek},
    raise_parse_error,
    stack::ensure_sufficient_stack,
};
use std::cell::Cell;
use std::rc::Rc;

/// Deepest nesting of expressions and statements the parser accepts.
pub const MAX_NESTING_DEPTH: usize = 1000;

thread_local! {
    static NESTING_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Held while one nested construct is parsed. Dropping it leaves the level.
pub struct NestingGuard(());

impl NestingGuard {
    pub fn enter(at: &TokenData) -> Result<Self, JSError> {
        let depth = NESTING_DEPTH.with(|d| {
            let depth = d.get() + 1;
            d.set(depth);
            depth
        });
        let guard = NestingGuard(());
        if depth > MAX_NESTING_DEPTH {
            return Err(raise_parse_error!(format!("nesting deeper than {MAX_NESTING_DEPTH} levels"), at));
        }
        Ok(guard)
    }
}

impl Drop for NestingGuard {
    fn drop(&mut self) {
        NESTING_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Parse a parameter list after the opening `(`, consuming the closing `)`.
pub fn parse_parameters(tokens: &[TokenData], index: &mut usize) -> Result<Vec<String>, JSError> {
    let mut params = Vec::new();
    if peek(tokens, *index).token == Token::RParen {
        *index += 1;
        return Ok(params);
    }
    loop {
        let t = peek(tokens, *index);
        match &t.token {
            Token::Identifier(name) => {
                params.push(name.clone());
                *index += 1;
            }
            other => return Err(raise_parse_error!(format!("expected parameter name, found {other:?}"), t)),
        }
        let t = peek(tokens, *index);
        match t.token {
            Token::Comma => *index += 1,
            Token::RParen => {
                *index += 1;
                return Ok(params);
            }
            ref other => return Err(raise_parse_error!(format!("expected ',' or ')', found {other:?}"), t)),
        }
    }
}

pub fn parse_expression(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let _level = NestingGuard::enter(peek(tokens, *index))?;
    ensure_sufficient_stack(|| parse_assignment(tokens, index))
}

fn is_assignment_target(expr: &Expr) -> bool {
    matches!(expr, Expr::Var(_) | Expr::Property(..) | Expr::Index(..))
}

fn parse_assignment(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let left = parse_logical_or(tokens, index)?;
    let t = peek(tokens, *index);
    let make: fn(Box<Expr>, Box<Expr>) -> Expr = match t.token {
        Token::Assign => Expr::Assign,
        Token::AddAssign => Expr::AddAssign,
        Token::SubAssign => Expr::SubAssign,
        _ => return Ok(left),
    };
    if !is_assignment_target(&left) {
        return Err(raise_parse_error!("invalid assignment target", t));
    }
    *index += 1;
    // right associative: a = b = c
    let right = parse_expression(tokens, index)?;
    Ok(make(Box::new(left), Box::new(right)))
}

fn parse_logical_or(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let mut left = parse_logical_and(tokens, index)?;
    while peek(tokens, *index).token == Token::LogicalOr {
        *index += 1;
        let right = parse_logical_and(tokens, index)?;
        left = Expr::LogicalOr(Box::new(left), Box::new(right));
    }
    Ok(left)
}

fn parse_logical_and(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let mut left = parse_equality(tokens, index)?;
    while peek(tokens, *index).token == Token::LogicalAnd {
        *index += 1;
        let right = parse_equality(tokens, index)?;
        left = Expr::LogicalAnd(Box::new(left), Box::new(right));
    }
    Ok(left)
}

fn parse_equality(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let mut left = parse_relational(tokens, index)?;
    loop {
        let op = match peek(tokens, *index).token {
            Token::Equal => BinaryOp::Equal,
            Token::StrictEqual => BinaryOp::StrictEqual,
            Token::NotEqual => BinaryOp::NotEqual,
            Token::StrictNotEqual => BinaryOp::StrictNotEqual,
            _ => return Ok(left),
        };
        *index += 1;
        let right = parse_relational(tokens, index)?;
        left = Expr::Binary(Box::new(left), op, Box::new(right));
    }
}

fn parse_relational(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let mut left = parse_additive(tokens, index)?;
    loop {
        let op = match peek(tokens, *index).token {
            Token::LessThan => BinaryOp::LessThan,
            Token::GreaterThan => BinaryOp::GreaterThan,
            Token::LessEqual => BinaryOp::LessEqual,
            Token::GreaterEqual => BinaryOp::GreaterEqual,
            _ => return Ok(left),
        };
        *index += 1;
        let right = parse_additive(tokens, index)?;
        left = Expr::Binary(Box::new(left), op, Box::new(right));
    }
}

fn parse_additive(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let mut left = parse_multiplicative(tokens, index)?;
    loop {
        let op = match peek(tokens, *index).token {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
            _ => return Ok(left),
        };
        *index += 1;
        let right = parse_multiplicative(tokens, index)?;
        left = Expr::Binary(Box::new(left), op, Box::new(right));
    }
}

fn parse_multiplicative(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let mut left = parse_unary(tokens, index)?;
    loop {
        let op = match peek(tokens, *index).token {
            Token::Multiply => BinaryOp::Mul,
            Token::Divide => BinaryOp::Div,
            Token::Mod => BinaryOp::Mod,
            _ => return Ok(left),
        };
        *index += 1;
        let right = parse_unary(tokens, index)?;
        left = Expr::Binary(Box::new(left), op, Box::new(right));
    }
}

// Operand of a prefix operator, one nesting level below it.
fn parse_unary_operand(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let _level = NestingGuard::enter(peek(tokens, *index))?;
    ensure_sufficient_stack(|| parse_unary(tokens, index))
}

fn parse_unary(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let t = peek(tokens, *index);
    match t.token {
        Token::LogicalNot => {
            *index += 1;
            Ok(Expr::LogicalNot(Box::new(parse_unary_operand(tokens, index)?)))
        }
        Token::Minus => {
            *index += 1;
            Ok(Expr::UnaryNeg(Box::new(parse_unary_operand(tokens, index)?)))
        }
        Token::TypeOf => {
            *index += 1;
            Ok(Expr::TypeOf(Box::new(parse_unary_operand(tokens, index)?)))
        }
        Token::Increment | Token::Decrement => {
            let is_inc = t.token == Token::Increment;
            *index += 1;
            let target = parse_unary_operand(tokens, index)?;
            if !is_assignment_target(&target) {
                return Err(raise_parse_error!("invalid update target", t));
            }
            Ok(if is_inc {
                Expr::Increment(Box::new(target), true)
            } else {
                Expr::Decrement(Box::new(target), true)
            })
        }
        _ => parse_postfix(tokens, index),
    }
}

fn parse_postfix(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let expr = parse_call_member(tokens, index)?;
    let t = peek(tokens, *index);
    match t.token {
        Token::Increment | Token::Decrement if is_assignment_target(&expr) => {
            *index += 1;
            Ok(if t.token == Token::Increment {
                Expr::Increment(Box::new(expr), false)
            } else {
                Expr::Decrement(Box::new(expr), false)
            })
        }
        _ => Ok(expr),
    }
}

fn parse_arguments(tokens: &[TokenData], index: &mut usize) -> Result<Vec<Expr>, JSError> {
    let mut args = Vec::new();
    if peek(tokens, *index).token == Token::RParen {
        *index += 1;
        return Ok(args);
    }
    loop {
        args.push(parse_expression(tokens, index)?);
        let t = peek(tokens, *index);
        match t.token {
            Token::Comma => *index += 1,
            Token::RParen => {
                *index += 1;
                return Ok(args);
            }
            ref other => return Err(raise_parse_error!(format!("expected ',' or ')', found {other:?}"), t)),
        }
    }
}

fn parse_call_member(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let mut expr = parse_primary(tokens, index)?;
    loop {
        let t = peek(tokens, *index);
        match t.token {
            Token::Dot => {
                *index += 1;
                let name_tok = peek(tokens, *index);
                let Some(name) = name_tok.token.as_identifier_string() else {
                    return Err(raise_parse_error!(format!("expected property name, found {:?}", name_tok.token), name_tok));
                };
                *index += 1;
                expr = Expr::Property(Box::new(expr), name);
            }
            Token::LBracket => {
                *index += 1;
                let key = parse_expression(tokens, index)?;
                expect(tokens, index, Token::RBracket, "']'")?;
                expr = Expr::Index(Box::new(expr), Box::new(key));
            }
            Token::LParen => {
                *index += 1;
                let args = parse_arguments(tokens, index)?;
                expr = Expr::Call(Box::new(expr), args);
            }
            _ => return Ok(expr),
        }
    }
}

fn parse_array_literal(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let mut elements = Vec::new();
    loop {
        if peek(tokens, *index).token == Token::RBracket {
            *index += 1;
            return Ok(Expr::Array(elements));
        }
        elements.push(parse_expression(tokens, index)?);
        let t = peek(tokens, *index);
        match t.token {
            // trailing comma allowed
            Token::Comma => *index += 1,
            Token::RBracket => {}
            ref other => return Err(raise_parse_error!(format!("expected ',' or ']', found {other:?}"), t)),
        }
    }
}

fn parse_object_literal(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let mut props = Vec::new();
    loop {
        let t = peek(tokens, *index);
        let key = match &t.token {
            Token::RBrace => {
                *index += 1;
                return Ok(Expr::Object(props));
            }
            Token::StringLit(s) => crate::unicode::utf16_to_utf8(s),
            Token::Number(n) => crate::core::format_js_number(*n),
            other => match other.as_identifier_string() {
                Some(name) => name,
                None => return Err(raise_parse_error!(format!("expected property key, found {other:?}"), t)),
            },
        };
        *index += 1;
        expect(tokens, index, Token::Colon, "':'")?;
        let value = parse_expression(tokens, index)?;
        props.push((key, value));
        let t = peek(tokens, *index);
        match t.token {
            Token::Comma => *index += 1,
            Token::RBrace => {}
            ref other => return Err(raise_parse_error!(format!("expected ',' or '}}', found {other:?}"), t)),
        }
    }
}

fn parse_function_expression(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let name = match &peek(tokens, *index).token {
        Token::Identifier(n) => {
            let n = n.clone();
            *index += 1;
            Some(n)
        }
        _ => None,
    };
    expect(tokens, index, Token::LParen, "'('")?;
    let params = parse_parameters(tokens, index)?;
    let body = parse_statement_block(tokens, index)?;
    Ok(Expr::Function(name, params, Rc::new(body)))
}

fn parse_primary(tokens: &[TokenData], index: &mut usize) -> Result<Expr, JSError> {
    let t = peek(tokens, *index);
    *index += 1;
    match &t.token {
        Token::Number(n) => Ok(Expr::Number(*n)),
        Token::StringLit(s) => Ok(Expr::StringLit(s.clone())),
        Token::True => Ok(Expr::Boolean(true)),
        Token::False => Ok(Expr::Boolean(false)),
        Token::Null => Ok(Expr::Null),
        Token::Undefined => Ok(Expr::Undefined),
        Token::This => Ok(Expr::This),
        Token::Identifier(name) => Ok(Expr::Var(name.clone())),
        Token::LParen => {
            let e = parse_expression(tokens, index)?;
            expect(tokens, index, Token::RParen, "')'")?;
            Ok(e)
        }
        Token::LBracket => parse_array_literal(tokens, index),
        Token::LBrace => parse_object_literal(tokens, index),
        Token::Function => parse_function_expression(tokens, index),
        other => {
            *index -= 1;
            Err(raise_parse_error!(format!("unexpected token {other:?}"), t))
        }
    }
}
