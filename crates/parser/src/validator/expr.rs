//! Validator expressions such as `str(min=1, upper_start=True)`
//!
//! Grammar:
//! ```text
//! call  := ident [ "(" [ arg ( "," arg )* ] ")" ]
//! arg   := ident "=" value | value
//! value := string | number | True | False | None | call
//! ```

use super::{Constraint, Validator};
use docgen_common::{DocGenError, Result};
use serde_yaml::Value;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Open,
    Close,
    Comma,
    Equals,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Arg {
    Str(String),
    Num(f64),
    Bool(bool),
    None,
    Call(Call),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub name: String,
    pub args: Vec<Arg>,
    pub kwargs: Vec<(String, Arg)>,
}

fn schema_err(expr: &str, message: impl std::fmt::Display) -> DocGenError {
    DocGenError::Schema(format!("{message} in {expr:?}"))
}

fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::Open);
                i += 1;
            }
            ')' => {
                tokens.push(Token::Close);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Equals);
                i += 1;
            }
            '\'' | '"' => {
                let quote = ch;
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(schema_err(expr, "unterminated string")),
                        Some('\\') => {
                            if let Some(next) = chars.get(i + 1) {
                                // Keep regex escapes intact; only quotes and backslashes collapse
                                if *next != quote && *next != '\\' {
                                    s.push('\\');
                                }
                                s.push(*next);
                            }
                            i += 2;
                        }
                        Some(c) if *c == quote => {
                            i += 1;
                            break;
                        }
                        Some(c) => {
                            s.push(*c);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| schema_err(expr, format!("invalid number {text}")))?;
                tokens.push(Token::Num(n));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(schema_err(expr, format!("unexpected character {other:?}"))),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    expr: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            other => Err(schema_err(
                self.expr,
                format!("expected {token:?}, found {other:?}"),
            )),
        }
    }

    fn call(&mut self) -> Result<Call> {
        let name = match self.next() {
            Some(Token::Ident(name)) => name,
            other => {
                return Err(schema_err(
                    self.expr,
                    format!("expected validator name, found {other:?}"),
                ))
            }
        };
        self.call_rest(name)
    }

    fn call_rest(&mut self, name: String) -> Result<Call> {
        let mut call = Call {
            name,
            args: Vec::new(),
            kwargs: Vec::new(),
        };
        if self.peek() != Some(&Token::Open) {
            return Ok(call);
        }
        self.expect(Token::Open)?;
        if self.peek() == Some(&Token::Close) {
            self.pos += 1;
            return Ok(call);
        }

        loop {
            let is_kwarg = matches!(self.peek(), Some(Token::Ident(_)))
                && self.tokens.get(self.pos + 1) == Some(&Token::Equals);
            if is_kwarg {
                let Some(Token::Ident(key)) = self.next() else {
                    unreachable!("checked above")
                };
                self.expect(Token::Equals)?;
                let value = self.value()?;
                call.kwargs.push((key, value));
            } else {
                if !call.kwargs.is_empty() {
                    return Err(schema_err(self.expr, "positional argument after keyword"));
                }
                let value = self.value()?;
                call.args.push(value);
            }

            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::Close) => break,
                other => {
                    return Err(schema_err(
                        self.expr,
                        format!("expected ',' or ')', found {other:?}"),
                    ))
                }
            }
        }

        Ok(call)
    }

    fn value(&mut self) -> Result<Arg> {
        match self.next() {
            Some(Token::Str(s)) => Ok(Arg::Str(s)),
            Some(Token::Num(n)) => Ok(Arg::Num(n)),
            Some(Token::Ident(name)) => match name.as_str() {
                "True" | "true" => Ok(Arg::Bool(true)),
                "False" | "false" => Ok(Arg::Bool(false)),
                "None" | "null" if self.peek() != Some(&Token::Open) => Ok(Arg::None),
                _ => Ok(Arg::Call(self.call_rest(name)?)),
            },
            other => Err(schema_err(
                self.expr,
                format!("expected a value, found {other:?}"),
            )),
        }
    }
}

pub(crate) fn parse_call(expr: &str) -> Result<Call> {
    let mut parser = Parser {
        expr,
        tokens: tokenize(expr)?,
        pos: 0,
    };
    let call = parser.call()?;
    if parser.pos < parser.tokens.len() {
        return Err(schema_err(expr, "trailing input"));
    }
    Ok(call)
}

/// Build a validator from an expression string
pub fn parse_validator(expr: &str) -> Result<Validator> {
    build(&parse_call(expr)?, expr)
}

fn build(call: &Call, expr: &str) -> Result<Validator> {
    let children = || -> Result<Vec<Validator>> {
        call.args
            .iter()
            .map(|arg| match arg {
                Arg::Call(inner) => build(inner, expr),
                other => Err(schema_err(
                    expr,
                    format!("{} expects validators, got {other:?}", call.name),
                )),
            })
            .collect()
    };
    let strings = || -> Result<Vec<String>> {
        call.args
            .iter()
            .map(|arg| match arg {
                Arg::Str(s) => Ok(s.clone()),
                other => Err(schema_err(
                    expr,
                    format!("{} expects strings, got {other:?}", call.name),
                )),
            })
            .collect()
    };

    let mut validator = match call.name.as_str() {
        "str" | "string" => Validator::string(),
        "num" | "number" => Validator::number(),
        "int" | "integer" => Validator::integer(),
        "bool" | "boolean" => Validator::boolean(),
        "null" => Validator::null(),
        "enum" => Validator::enumeration(call.args.iter().map(arg_to_value).collect())?,
        "regex" => {
            let patterns = strings()?;
            let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
            let name = kwarg_str(call, "name");
            Validator::regex(&patterns, name.as_deref())?
        }
        "ip" => {
            let version = match kwarg(call, "version") {
                Some(Arg::Num(n)) if (0.0..=255.0).contains(n) && n.fract() == 0.0 => Some(*n as u8),
                Some(Arg::Num(n)) => {
                    return Err(schema_err(expr, format!("invalid ip version {n}")))
                }
                _ => None,
            };
            Validator::ip(version)?
        }
        "map" => {
            let keys = match kwarg(call, "key") {
                Some(Arg::Call(inner)) => vec![build(inner, expr)?],
                Some(other) => {
                    return Err(schema_err(expr, format!("map key must be a validator, got {other:?}")))
                }
                None => Vec::new(),
            };
            Validator::map(children()?, keys)
        }
        "list" => Validator::list(children()?),
        "any" => Validator::any(children()?),
        "subset" => Validator::subset(children()?)?,
        "include" => {
            let names = strings()?;
            match names.as_slice() {
                [name] => Validator::include(name),
                _ => return Err(schema_err(expr, "include takes exactly one name")),
            }
        }
        other => return Err(schema_err(expr, format!("unknown validator {other}"))),
    };

    for (key, value) in &call.kwargs {
        match (key.as_str(), value) {
            ("required", Arg::Bool(required)) => validator.required = *required,
            ("name" | "key" | "version" | "none", _) => {}
            ("min", Arg::Num(n)) => validator.constraints.push(match validator.tag() {
                "num" | "int" => Constraint::Min(*n),
                _ => Constraint::LengthMin(*n as usize),
            }),
            ("max", Arg::Num(n)) => validator.constraints.push(match validator.tag() {
                "num" | "int" => Constraint::Max(*n),
                _ => Constraint::LengthMax(*n as usize),
            }),
            ("exclude", Arg::Str(chars)) => {
                validator.constraints.push(Constraint::Exclude(chars.clone()))
            }
            ("multiline", Arg::Bool(allowed)) => {
                validator.constraints.push(Constraint::Multiline(*allowed))
            }
            (flag, Arg::Bool(enabled)) => {
                let constraint = match flag {
                    "upper_start" => Constraint::UpperStart,
                    "lower_start" => Constraint::LowerStart,
                    "end_punc" => Constraint::EndPunc,
                    "no_end_punc" => Constraint::NoEndPunc,
                    "end_punc_or_colon" => Constraint::EndPuncOrColon,
                    "check_aws" => Constraint::CheckAws,
                    _ => return Err(schema_err(expr, format!("unknown option {flag}"))),
                };
                if *enabled {
                    validator.constraints.push(constraint);
                }
            }
            (key, value) => {
                return Err(schema_err(
                    expr,
                    format!("invalid option {key}={value:?}"),
                ))
            }
        }
    }

    Ok(validator)
}

fn kwarg<'c>(call: &'c Call, key: &str) -> Option<&'c Arg> {
    call.kwargs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn kwarg_str(call: &Call, key: &str) -> Option<String> {
    match kwarg(call, key) {
        Some(Arg::Str(s)) => Some(s.clone()),
        _ => None,
    }
}

fn arg_to_value(arg: &Arg) -> Value {
    match arg {
        Arg::Str(s) => Value::String(s.clone()),
        Arg::Num(n) if n.fract() == 0.0 => Value::Number((*n as i64).into()),
        Arg::Num(n) => Value::Number((*n).into()),
        Arg::Bool(b) => Value::Bool(*b),
        Arg::None | Arg::Call(_) => Value::Null,
    }
}
