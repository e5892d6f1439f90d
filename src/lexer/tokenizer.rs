use super::*;
use super::scanner::{bump, peek_second, skip_whitespace};

pub(super) fn next_token(lexer: &mut Lexer) -> Result<Token, CfgError> {
    skip_whitespace(lexer);

    let token = match lexer.peek {
        Some('(') => tokenize_symbol(lexer, Token::LParen),
        Some(')') => tokenize_symbol(lexer, Token::RParen),
        Some('[') => tokenize_symbol(lexer, Token::LBracket),
        Some(']') => tokenize_symbol(lexer, Token::RBracket),
        Some(',') => tokenize_symbol(lexer, Token::Comma),
        Some('.') if peek_second(lexer).is_some_and(|c| c.is_ascii_digit()) => tokenize_number(lexer),
        Some('.') => tokenize_symbol(lexer, Token::Dot),
        Some('=') => tokenize_pair(lexer, '=', Token::EqEq, Token::Assign),
        Some('!') => tokenize_pair(lexer, '=', Token::NotEq, Token::Not),
        Some('<') => tokenize_pair(lexer, '=', Token::LtE, Token::Lt),
        Some('>') => tokenize_pair(lexer, '=', Token::GtE, Token::Gt),
        Some('&') => tokenize_pair(lexer, '&', Token::And, Token::Operator("&".into())),
        Some('|') => tokenize_pair(lexer, '|', Token::Or, Token::Operator("|".into())),
        Some('*') => tokenize_pair(lexer, '*', Token::Operator("**".into()), Token::Operator("*".into())),
        Some('/') => tokenize_pair(lexer, '/', Token::Operator("//".into()), Token::Operator("/".into())),
        Some(':') => tokenize_pair(lexer, '=', Token::Assign, Token::Operator(":".into())),
        Some(c @ ('+' | '-' | '%' | '^' | '~' | '@')) => tokenize_symbol(lexer, Token::Operator(c.to_string())),
        Some('"') | Some('\'') => tokenize_string(lexer),
        Some(c) if c.is_ascii_digit() => tokenize_number(lexer),
        Some(c) if c.is_alphabetic() || c == '_' => tokenize_identifier_or_keyword(lexer),
        Some(ch) => tokenize_unexpected_char(lexer, ch),
        None => Ok(Token::Eof),
    };

    token
}

fn tokenize_symbol(lexer: &mut Lexer, token: Token) -> Result<Token, CfgError> {
    bump(lexer);
    Ok(token)
}

/// One- or two-character symbol: `double` when the next char is `second`.
fn tokenize_pair(lexer: &mut Lexer, second: char, double: Token, single: Token) -> Result<Token, CfgError> {
    bump(lexer);
    if lexer.peek == Some(second) {
        bump(lexer);
        Ok(double)
    } else {
        Ok(single)
    }
}

fn tokenize_string(lexer: &mut Lexer) -> Result<Token, CfgError> {
    let Some(quote) = bump(lexer) else {
        return Ok(Token::Eof);
    };
    let mut content = String::new();
    let mut closed = false;

    while let Some(ch) = bump(lexer) {
        if ch == quote {
            closed = true;
            break;
        }

        if ch == '\\' {
            let Some(next_ch) = bump(lexer) else {
                return Err(lexer.error(
                    "Trailing backslash in string",
                    Some("Escape the backslash as \\\\"),
                    103,
                ));
            };
            let escaped = match next_ch {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                other => other,
            };
            content.push(escaped);
        } else {
            content.push(ch);
        }
    }

    if !closed {
        return Err(lexer.error(
            format!("Unclosed string starting with {}", quote),
            Some("String literal not closed"),
            103,
        ));
    }

    Ok(Token::String(content))
}

fn tokenize_number(lexer: &mut Lexer) -> Result<Token, CfgError> {
    let mut num = String::new();
    let mut is_float = false;

    while let Some(ch) = lexer.peek {
        match ch {
            '0'..='9' | '_' => {
                num.push(ch);
                bump(lexer);
            }
            '.' if !is_float => {
                is_float = true;
                num.push(ch);
                bump(lexer);
            }
            'e' | 'E' => {
                is_float = true;
                num.push(ch);
                bump(lexer);
                if let Some(sign @ ('+' | '-')) = lexer.peek {
                    num.push(sign);
                    bump(lexer);
                }
            }
            _ => break,
        }
    }

    let digits: String = num.chars().filter(|c| *c != '_').collect();
    let number = if is_float {
        digits.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        digits
            .parse::<i64>()
            .map(Number::from)
            .or_else(|_| digits.parse::<u64>().map(Number::from))
            .ok()
            .or_else(|| digits.parse::<f64>().ok().and_then(Number::from_f64))
    };

    number.map(Token::Number).ok_or_else(|| {
        lexer.error(format!("Invalid number '{}'", num), None, 102)
    })
}

fn tokenize_identifier_or_keyword(lexer: &mut Lexer) -> Result<Token, CfgError> {
    let mut ident = String::new();

    while let Some(ch) = lexer.peek {
        if ch.is_alphanumeric() || ch == '_' {
            ident.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    // Map keywords to their respective tokens
    let token = match ident.as_str() {
        "true" | "True" => Token::Bool(true),
        "false" | "False" => Token::Bool(false),
        "null" | "None" => Token::Null,
        "if" => Token::If,
        "else" => Token::Else,
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "in" => Token::In,
        "is" => Token::Is,
        "lambda" => Token::Lambda,
        _ => Token::Ident(ident),
    };

    Ok(token)
}

fn tokenize_unexpected_char(lexer: &mut Lexer, ch: char) -> Result<Token, CfgError> {
    bump(lexer);
    Err(lexer.error(
        format!("Unexpected character '{}'", ch),
        Some("Conditionals only support literals, names, comparisons, and/or and if/else"),
        104,
    ))
}
