use crate::JSError;
use crate::unicode::utf8_to_utf16;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    StringLit(Vec<u16>),
    Identifier(String),
    Plus,
    Minus,
    Multiply,
    Divide,
    Mod,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    Dot,
    Comma,
    Semicolon,
    Assign,
    AddAssign,
    SubAssign,
    Increment,
    Decrement,
    Equal,
    StrictEqual,
    NotEqual,
    StrictNotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    LogicalNot,
    LogicalAnd,
    LogicalOr,
    Var,
    Let,
    Const,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Break,
    Continue,
    True,
    False,
    Null,
    Undefined,
    This,
    TypeOf,
    EOF,
}

impl Token {
    /// Get the string representation of a token that can be used as a property name
    /// after `.` or as an object literal key.
    pub fn as_identifier_string(&self) -> Option<String> {
        let s = match self {
            Token::Identifier(s) => return Some(s.clone()),
            Token::Var => "var",
            Token::Let => "let",
            Token::Const => "const",
            Token::Function => "function",
            Token::Return => "return",
            Token::If => "if",
            Token::Else => "else",
            Token::For => "for",
            Token::While => "while",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::Undefined => "undefined",
            Token::This => "this",
            Token::TypeOf => "typeof",
            _ => return None,
        };
        Some(s.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct TokenData {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

fn keyword_or_identifier(word: String) -> Token {
    match word.as_str() {
        "var" => Token::Var,
        "let" => Token::Let,
        "const" => Token::Const,
        "function" => Token::Function,
        "return" => Token::Return,
        "if" => Token::If,
        "else" => Token::Else,
        "for" => Token::For,
        "while" => Token::While,
        "break" => Token::Break,
        "continue" => Token::Continue,
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        "undefined" => Token::Undefined,
        "this" => Token::This,
        "typeof" => Token::TypeOf,
        _ => Token::Identifier(word),
    }
}

// Longest punctuators first so `===` wins over `==` and `=`.
const PUNCTUATORS: &[(&str, Token)] = &[
    ("===", Token::StrictEqual),
    ("!==", Token::StrictNotEqual),
    ("==", Token::Equal),
    ("!=", Token::NotEqual),
    ("<=", Token::LessEqual),
    (">=", Token::GreaterEqual),
    ("&&", Token::LogicalAnd),
    ("||", Token::LogicalOr),
    ("++", Token::Increment),
    ("--", Token::Decrement),
    ("+=", Token::AddAssign),
    ("-=", Token::SubAssign),
    ("+", Token::Plus),
    ("-", Token::Minus),
    ("*", Token::Multiply),
    ("/", Token::Divide),
    ("%", Token::Mod),
    ("(", Token::LParen),
    (")", Token::RParen),
    ("[", Token::LBracket),
    ("]", Token::RBracket),
    ("{", Token::LBrace),
    ("}", Token::RBrace),
    (":", Token::Colon),
    (".", Token::Dot),
    (",", Token::Comma),
    (";", Token::Semicolon),
    ("=", Token::Assign),
    ("<", Token::LessThan),
    (">", Token::GreaterThan),
    ("!", Token::LogicalNot),
];

pub fn tokenize(source: &str) -> Result<Vec<TokenData>, JSError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1;
    let mut column = 1;

    macro_rules! advance {
        ($n:expr) => {{
            for _ in 0..$n {
                if chars[i] == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
                i += 1;
            }
        }};
    }

    while i < chars.len() {
        let ch = chars[i];
        let (start_line, start_column) = (line, column);

        if ch.is_whitespace() {
            advance!(1);
            continue;
        }

        if ch == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                advance!(1);
            }
            continue;
        }

        if ch == '/' && chars.get(i + 1) == Some(&'*') {
            advance!(2);
            loop {
                if i + 1 >= chars.len() {
                    return Err(JSError::TokenizationError {
                        message: "unterminated block comment".to_string(),
                        line: start_line,
                        column: start_column,
                    });
                }
                if chars[i] == '*' && chars[i + 1] == '/' {
                    advance!(2);
                    break;
                }
                advance!(1);
            }
            continue;
        }

        let token = if ch.is_ascii_digit() || (ch == '.' && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())) {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                advance!(1);
            }
            if i < chars.len() && chars[i] == '.' {
                advance!(1);
                while i < chars.len() && chars[i].is_ascii_digit() {
                    advance!(1);
                }
            }
            let text: String = chars[start..i].iter().collect();
            let n = text.parse::<f64>().map_err(|e| JSError::TokenizationError {
                message: format!("invalid number literal '{text}': {e}"),
                line: start_line,
                column: start_column,
            })?;
            Token::Number(n)
        } else if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
                advance!(1);
            }
            keyword_or_identifier(chars[start..i].iter().collect())
        } else if ch == '\'' || ch == '"' {
            let quote = ch;
            advance!(1);
            let mut s = String::new();
            loop {
                let Some(&c) = chars.get(i) else {
                    return Err(JSError::TokenizationError {
                        message: "unterminated string literal".to_string(),
                        line: start_line,
                        column: start_column,
                    });
                };
                if c == quote {
                    advance!(1);
                    break;
                }
                if c == '\n' {
                    return Err(JSError::TokenizationError {
                        message: "newline in string literal".to_string(),
                        line: start_line,
                        column: start_column,
                    });
                }
                if c == '\\' {
                    let Some(&escaped) = chars.get(i + 1) else {
                        return Err(JSError::TokenizationError {
                            message: "unterminated string literal".to_string(),
                            line: start_line,
                            column: start_column,
                        });
                    };
                    s.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        other => other,
                    });
                    advance!(2);
                    continue;
                }
                s.push(c);
                advance!(1);
            }
            Token::StringLit(utf8_to_utf16(&s))
        } else {
            let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();
            match PUNCTUATORS.iter().find(|(p, _)| rest.starts_with(p)) {
                Some((p, tok)) => {
                    advance!(p.len());
                    tok.clone()
                }
                None => {
                    return Err(JSError::TokenizationError {
                        message: format!("unexpected character '{ch}'"),
                        line: start_line,
                        column: start_column,
                    });
                }
            }
        };

        tokens.push(TokenData {
            token,
            line: start_line,
            column: start_column,
        });
    }

    tokens.push(TokenData {
        token: Token::EOF,
        line,
        column,
    });
    Ok(tokens)
}
