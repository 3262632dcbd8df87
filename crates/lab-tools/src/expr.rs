//! Arithmetic Expression Evaluator
//!
//! Recursive-descent parser over a fixed grammar; nothing is ever handed to
//! a general-purpose interpreter.
//!
//! ```text
//! expr    := term   (('+' | '-') term)*
//! term    := unary  (('*' | '/' | '//' | '%') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('**' unary)?
//! primary := NUMBER | '(' expr ')'
//! ```
//!
//! Integers stay integral until `/` or a negative exponent turns them into
//! floats. `//` and `%` floor toward negative infinity.
//!
//! Parentheses and `**` exponents are the only recursive rules; both count
//! toward [`MAX_DEPTH`]. Sign prefixes are folded in a loop.

use std::fmt;

use crate::error::{ExprError, Result};

/// Deepest nesting of parentheses and `**` exponents accepted
pub const MAX_DEPTH: usize = 200;

/// Evaluate an arithmetic expression
pub fn evaluate(source: &str) -> Result<Number> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };

    let value = parser.expr()?;
    match parser.peek() {
        None => Ok(value),
        Some(Token::RParen) => Err(ExprError::UnbalancedParentheses),
        Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
    }
}

/// Result of an evaluation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    fn negate(self) -> Result<Self> {
        match self {
            Self::Int(i) => i.checked_neg().map(Self::Int).ok_or(ExprError::Overflow),
            Self::Float(f) => Ok(Self::Float(-f)),
        }
    }

    fn plus(self, rhs: Self) -> Result<Self> {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => {
                a.checked_add(b).map(Self::Int).ok_or(ExprError::Overflow)
            }
            (a, b) => Ok(Self::Float(a.as_f64() + b.as_f64())),
        }
    }

    fn minus(self, rhs: Self) -> Result<Self> {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => {
                a.checked_sub(b).map(Self::Int).ok_or(ExprError::Overflow)
            }
            (a, b) => Ok(Self::Float(a.as_f64() - b.as_f64())),
        }
    }

    fn times(self, rhs: Self) -> Result<Self> {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => {
                a.checked_mul(b).map(Self::Int).ok_or(ExprError::Overflow)
            }
            (a, b) => Ok(Self::Float(a.as_f64() * b.as_f64())),
        }
    }

    fn true_div(self, rhs: Self) -> Result<Self> {
        let divisor = rhs.as_f64();
        if divisor == 0.0 {
            return Err(ExprError::DivisionByZero);
        }
        Ok(Self::Float(self.as_f64() / divisor))
    }

    fn floor_div(self, rhs: Self) -> Result<Self> {
        match (self, rhs) {
            (Self::Int(_), Self::Int(0)) => Err(ExprError::DivisionByZero),
            (Self::Int(a), Self::Int(b)) => {
                let q = a.checked_div(b).ok_or(ExprError::Overflow)?;
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    Ok(Self::Int(q - 1))
                } else {
                    Ok(Self::Int(q))
                }
            }
            (a, b) => {
                let divisor = b.as_f64();
                if divisor == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                Ok(Self::Float((a.as_f64() / divisor).floor()))
            }
        }
    }

    fn modulo(self, rhs: Self) -> Result<Self> {
        match (self, rhs) {
            (Self::Int(_), Self::Int(0)) => Err(ExprError::DivisionByZero),
            (Self::Int(a), Self::Int(b)) => {
                let r = a.checked_rem(b).ok_or(ExprError::Overflow)?;
                if r != 0 && ((r < 0) != (b < 0)) {
                    Ok(Self::Int(r + b))
                } else {
                    Ok(Self::Int(r))
                }
            }
            (a, b) => {
                let divisor = b.as_f64();
                if divisor == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                let r = a.as_f64() % divisor;
                if r != 0.0 && ((r < 0.0) != (divisor < 0.0)) {
                    Ok(Self::Float(r + divisor))
                } else {
                    Ok(Self::Float(r))
                }
            }
        }
    }

    fn raise(self, rhs: Self) -> Result<Self> {
        if let (Self::Int(base), Self::Int(exp)) = (self, rhs) {
            if exp >= 0 {
                let exp = u32::try_from(exp).map_err(|_| ExprError::Overflow)?;
                return base.checked_pow(exp).map(Self::Int).ok_or(ExprError::Overflow);
            }
        }

        let (base, exp) = (self.as_f64(), rhs.as_f64());
        if base == 0.0 && exp < 0.0 {
            return Err(ExprError::DivisionByZero);
        }
        if base < 0.0 && exp.fract() != 0.0 {
            return Err(ExprError::ComplexResult);
        }

        let value = base.powf(exp);
        if value.is_infinite() && base.is_finite() && exp.is_finite() {
            return Err(ExprError::Overflow);
        }
        Ok(Self::Float(value))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/// Shortest round-trip form; integral values keep a `.0`, very large or
/// very small magnitudes switch to `1e+20` / `1e-05` notation.
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".into() } else { "-inf".into() };
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0".into() } else { "0.0".into() };
    }

    if (1e-4..1e16).contains(&x.abs()) {
        let s = format!("{x}");
        return if s.contains('.') { s } else { format!("{s}.0") };
    }

    let sci = format!("{x:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Pow,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::Slash => f.write_str("/"),
            Self::DoubleSlash => f.write_str("//"),
            Self::Percent => f.write_str("%"),
            Self::Pow => f.write_str("**"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '0'..='9' | '.' => {
                let mut end = start + c.len_utf8();
                while let Some(&(idx, next)) = chars.peek() {
                    if !(next.is_ascii_digit() || next == '.') {
                        break;
                    }
                    end = idx + next.len_utf8();
                    chars.next();
                }
                Token::Num(parse_number(&source[start..end])?)
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' if chars.next_if(|&(_, n)| n == '*').is_some() => Token::Pow,
            '*' => Token::Star,
            '/' if chars.next_if(|&(_, n)| n == '/').is_some() => Token::DoubleSlash,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => return Err(ExprError::UnexpectedChar(other)),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Number> {
    let invalid = || ExprError::InvalidNumber(literal.to_string());

    if literal.contains('.') {
        if literal == "." || literal.matches('.').count() > 1 {
            return Err(invalid());
        }
        return literal.parse::<f64>().map(Number::Float).map_err(|_| invalid());
    }

    // `007` is rejected, `0` and `000` are fine
    if literal.len() > 1 && literal.starts_with('0') && literal.bytes().any(|b| b != b'0') {
        return Err(invalid());
    }
    literal.parse::<i128>().map(Number::Int).map_err(|_| ExprError::Overflow)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Number> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value = value.plus(self.term()?)?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value = value.minus(self.term()?)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<Number> {
        let mut value = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(op @ (Token::Star | Token::Slash | Token::DoubleSlash | Token::Percent)) => op,
                _ => return Ok(value),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value.times(rhs)?,
                Token::Slash => value.true_div(rhs)?,
                Token::DoubleSlash => value.floor_div(rhs)?,
                _ => value.modulo(rhs)?,
            };
        }
    }

    fn unary(&mut self) -> Result<Number> {
        let mut negative = false;
        loop {
            match self.peek() {
                Some(Token::Minus) => negative = !negative,
                Some(Token::Plus) => {}
                _ => break,
            }
            self.pos += 1;
        }

        let value = self.power()?;
        if negative { value.negate() } else { Ok(value) }
    }

    fn power(&mut self) -> Result<Number> {
        let base = self.primary()?;
        if self.peek() == Some(Token::Pow) {
            self.pos += 1;
            self.descend()?;
            let exp = self.unary()?;
            self.depth -= 1;
            return base.raise(exp);
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Number> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    None => Err(ExprError::UnbalancedParentheses),
                    Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
                }
            }
            Some(Token::RParen) => Err(ExprError::UnbalancedParentheses),
            Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str) -> String {
        evaluate(src).unwrap().to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 2"), "4");
        assert_eq!(eval("3 * 4"), "12");
        assert_eq!(eval("2 + 3 * 4"), "14");
        assert_eq!(eval("(2 + 3) * 4"), "20");
        assert_eq!(eval("10 - 4 - 3"), "3");
        assert_eq!(eval("2 * 3 ** 2"), "18");
    }

    #[test]
    fn test_power_binds_tighter_than_unary_minus() {
        assert_eq!(eval("-2 ** 2"), "-4");
        assert_eq!(eval("(-2) ** 2"), "4");
        assert_eq!(eval("2 ** 3 ** 2"), "512");
        assert_eq!(eval("2 ** -1"), "0.5");
    }

    #[test]
    fn test_division_yields_float() {
        assert_eq!(eval("10 / 4"), "2.5");
        assert_eq!(eval("10 / 2"), "5.0");
        assert_eq!(eval("0.1 + 0.2"), "0.30000000000000004");
    }

    #[test]
    fn test_floor_semantics() {
        assert_eq!(eval("7 // 2"), "3");
        assert_eq!(eval("-7 // 2"), "-4");
        assert_eq!(eval("7 % 3"), "1");
        assert_eq!(eval("-7 % 3"), "2");
        assert_eq!(eval("7 % -3"), "-2");
        assert_eq!(eval("7.5 % 2"), "1.5");
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(eval("1.5 * 2"), "3.0");
        assert_eq!(eval("10.0 ** 20"), "1e+20");
        assert_eq!(eval("1 / 100000"), "1e-05");
        assert_eq!(eval(".5 + 2."), "2.5");
    }

    #[test]
    fn test_errors() {
        assert_eq!(evaluate("10 / 0"), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("10 % 0"), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("1 // 0.0"), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("0 ** -1"), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("(-8) ** 0.5"), Err(ExprError::ComplexResult));
        assert_eq!(evaluate("2 ** 200"), Err(ExprError::Overflow));
        assert_eq!(evaluate("2 +"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("1.2.3"), Err(ExprError::InvalidNumber("1.2.3".into())));
        assert_eq!(evaluate("007"), Err(ExprError::InvalidNumber("007".into())));
        assert_eq!(evaluate("2 * * 3"), Err(ExprError::UnexpectedToken("*".into())));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(eval(&nested(MAX_DEPTH)), "1");
        assert_eq!(evaluate(&nested(MAX_DEPTH + 1)), Err(ExprError::TooDeep));
        assert_eq!(evaluate(&nested(10_000)), Err(ExprError::TooDeep));
        assert_eq!(evaluate(&"(".repeat(10_000)), Err(ExprError::TooDeep));

        let tower = format!("1{}", " ** 1".repeat(10_000));
        assert_eq!(evaluate(&tower), Err(ExprError::TooDeep));

        // siblings do not accumulate depth
        let flat = vec!["(1)"; 10_000].join(" + ");
        assert_eq!(eval(&flat), "10000");
    }

    #[test]
    fn test_long_sign_chains() {
        assert_eq!(eval(&format!("{}1", "-".repeat(10_000))), "1");
        assert_eq!(eval(&format!("{}1", "-".repeat(10_001))), "-1");
        assert_eq!(eval(&format!("{}2.5", "+-".repeat(10_001))), "-2.5");
        assert_eq!(eval("2 ** --2"), "4");
        assert_eq!(eval("--2 ** 2"), "4");
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(evaluate("(2 + 3"), Err(ExprError::UnbalancedParentheses));
        assert_eq!(evaluate("2 + 3)"), Err(ExprError::UnbalancedParentheses));
        assert_eq!(evaluate("((1)"), Err(ExprError::UnbalancedParentheses));
        assert_eq!(evaluate(")("), Err(ExprError::UnbalancedParentheses));
    }
}
