//! Parameter value parsing.

use mixsim_core::units;
use mixsim_core::{DataKind, Scalar, Value, ValueType};
use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token, TokenKind};

/// Parse one value of the declared type from the lexer.
///
/// Array types must be written as `[ e1 e2 ... ]` with at least one
/// element. Complex elements are written `< re im >`. The first bad
/// element aborts the whole value.
pub fn parse_value(lexer: &mut Lexer<'_>, ty: ValueType) -> Result<Value> {
    if ty.is_array {
        match lexer.next_token() {
            Some(t) if t.is(TokenKind::LArray) => {}
            _ => return Err(Error::ArrayExpected),
        }
    }

    let mut elements = Vec::new();
    loop {
        let token = lexer.next_token().ok_or(Error::UnexpectedEnd)?;

        if ty.is_array && token.is(TokenKind::RArray) {
            if elements.is_empty() {
                return Err(Error::EmptyArray);
            }
            break;
        }

        let element = parse_element(lexer, token, ty.kind)?;
        if !ty.is_array {
            return Ok(Value::Scalar(element));
        }
        elements.push(element);
    }

    Ok(Value::Array {
        kind: ty.kind,
        elements,
    })
}

fn parse_element(lexer: &mut Lexer<'_>, token: Token<'_>, kind: DataKind) -> Result<Scalar> {
    match kind {
        DataKind::Boolean => parse_boolean(token.text).map(Scalar::Boolean),
        DataKind::Integer => parse_integer(token.text).map(Scalar::Integer),
        DataKind::Real => parse_real(token.text).map(Scalar::Real),
        DataKind::String => Ok(Scalar::String(token.text.to_string())),
        DataKind::Complex => parse_complex(lexer, token).map(Scalar::Complex),
    }
}

fn parse_boolean(text: &str) -> Result<bool> {
    match text {
        "t" | "true" => Ok(true),
        "f" | "false" => Ok(false),
        _ => Err(Error::BadBoolean {
            token: text.to_string(),
        }),
    }
}

fn parse_integer(text: &str) -> Result<i64> {
    // Engineering suffixes fail the literal parse, so fall back to the
    // unit evaluator and round to the nearest integer.
    units::parse_integer_literal(text)
        .or_else(|| {
            let v = units::parse_value(text)?.round();
            (i64::MIN as f64..i64::MAX as f64)
                .contains(&v)
                .then_some(v as i64)
        })
        .ok_or_else(|| Error::BadInteger {
            token: text.to_string(),
        })
}

fn parse_real(text: &str) -> Result<f64> {
    finite(text).ok_or_else(|| Error::BadReal {
        token: text.to_string(),
    })
}

/// Evaluate a number, rejecting results that overflow to infinity.
fn finite(text: &str) -> Option<f64> {
    units::parse_value(text).filter(|v| v.is_finite())
}

fn parse_complex(lexer: &mut Lexer<'_>, open: Token<'_>) -> Result<Complex64> {
    if !open.is(TokenKind::LComplex) {
        return Err(Error::BadComplex);
    }
    let re = complex_part(lexer)?;
    let im = complex_part(lexer)?;
    match lexer.next_token() {
        Some(t) if t.is(TokenKind::RComplex) => Ok(Complex64::new(re, im)),
        _ => Err(Error::BadComplex),
    }
}

fn complex_part(lexer: &mut Lexer<'_>) -> Result<f64> {
    match lexer.next_token() {
        Some(t) if t.is(TokenKind::String) => finite(t.text).ok_or(Error::BadComplex),
        _ => Err(Error::BadComplex),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str, ty: ValueType) -> Result<Value> {
        parse_value(&mut Lexer::new(input), ty)
    }

    fn scalar(input: &str, kind: DataKind) -> Result<Scalar> {
        parse(input, ValueType::scalar(kind)).map(|v| v.elements()[0].clone())
    }

    #[test]
    fn test_boolean() {
        assert_eq!(scalar("t", DataKind::Boolean).unwrap(), Scalar::Boolean(true));
        assert_eq!(scalar("false", DataKind::Boolean).unwrap(), Scalar::Boolean(false));
        let err = scalar("TRUE", DataKind::Boolean).unwrap_err();
        assert_eq!(err.to_string(), "Bad boolean value");
    }

    #[test]
    fn test_integer_bases() {
        assert_eq!(scalar("0x1F", DataKind::Integer).unwrap(), Scalar::Integer(31));
        assert_eq!(scalar("010", DataKind::Integer).unwrap(), Scalar::Integer(8));
        assert_eq!(scalar("-7", DataKind::Integer).unwrap(), Scalar::Integer(-7));
    }

    #[test]
    fn test_integer_suffix_rounds_away_from_zero() {
        assert_eq!(scalar("2k", DataKind::Integer).unwrap(), Scalar::Integer(2000));
        assert_eq!(scalar("2.5", DataKind::Integer).unwrap(), Scalar::Integer(3));
        assert_eq!(scalar("-2.5", DataKind::Integer).unwrap(), Scalar::Integer(-3));
        assert_eq!(scalar("1.4", DataKind::Integer).unwrap(), Scalar::Integer(1));
    }

    #[test]
    fn test_integer_out_of_range() {
        for input in ["1e30", "-1e19", "1e999"] {
            assert_eq!(
                scalar(input, DataKind::Integer).unwrap_err(),
                Error::BadInteger {
                    token: input.into()
                },
                "input {input:?}"
            );
        }
        assert_eq!(
            scalar("-9e18", DataKind::Integer).unwrap(),
            Scalar::Integer(-9_000_000_000_000_000_000)
        );
    }

    #[test]
    fn test_real_overflow() {
        assert_eq!(
            scalar("1e999", DataKind::Real).unwrap_err(),
            Error::BadReal {
                token: "1e999".into()
            }
        );
        assert_eq!(
            scalar("< 1e999 0 >", DataKind::Complex).unwrap_err(),
            Error::BadComplex
        );
    }

    #[test]
    fn test_integer_invalid() {
        let err = scalar("ten", DataKind::Integer).unwrap_err();
        assert_eq!(err.to_string(), "Bad integer, octal, or hex value");
    }

    #[test]
    fn test_real() {
        assert_eq!(scalar("2.5k", DataKind::Real).unwrap(), Scalar::Real(2500.0));
        assert_eq!(scalar("1e-3", DataKind::Real).unwrap(), Scalar::Real(1e-3));
        assert_eq!(
            scalar("volts", DataKind::Real).unwrap_err().to_string(),
            "Bad real value"
        );
    }

    #[test]
    fn test_string_is_verbatim() {
        assert_eq!(
            scalar("\"Hello World\"", DataKind::String).unwrap(),
            Scalar::String("Hello World".into())
        );
        assert_eq!(
            scalar("0x1F", DataKind::String).unwrap(),
            Scalar::String("0x1F".into())
        );
    }

    #[test]
    fn test_complex() {
        assert_eq!(
            scalar("< 1.0 2.0 >", DataKind::Complex).unwrap(),
            Scalar::Complex(Complex64::new(1.0, 2.0))
        );
        assert_eq!(
            scalar("<1k, -1m>", DataKind::Complex).unwrap(),
            Scalar::Complex(Complex64::new(1e3, -1e-3))
        );
    }

    #[test]
    fn test_complex_malformed() {
        for input in ["1.0", "< 1.0 >", "< 1.0 2.0", "< 1.0 x >", "< 1 2 3 >", "< [ 2 >"] {
            assert_eq!(
                scalar(input, DataKind::Complex).unwrap_err(),
                Error::BadComplex,
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_array() {
        let v = parse("[1 2 0x10]", ValueType::array(DataKind::Integer)).unwrap();
        assert_eq!(v.count(), Some(3));
        assert_eq!(
            v.elements(),
            &[Scalar::Integer(1), Scalar::Integer(2), Scalar::Integer(16)]
        );

        let c = parse("[<1 0> <0 1>]", ValueType::array(DataKind::Complex)).unwrap();
        assert_eq!(c.count(), Some(2));
    }

    #[test]
    fn test_array_requires_delimiter() {
        assert_eq!(
            parse("1 2", ValueType::array(DataKind::Real)).unwrap_err(),
            Error::ArrayExpected
        );
    }

    #[test]
    fn test_unterminated_array() {
        assert_eq!(
            parse("[1 2", ValueType::array(DataKind::Real)).unwrap_err(),
            Error::UnexpectedEnd
        );
        assert_eq!(
            parse("", ValueType::scalar(DataKind::Real)).unwrap_err(),
            Error::UnexpectedEnd
        );
    }

    #[test]
    fn test_first_bad_element_aborts() {
        let err = parse("[t maybe f]", ValueType::array(DataKind::Boolean)).unwrap_err();
        assert_eq!(
            err,
            Error::BadBoolean {
                token: "maybe".into()
            }
        );
    }

    #[test]
    fn test_scalar_leaves_rest_unconsumed() {
        let mut lexer = Lexer::new("1.5 next=2");
        parse_value(&mut lexer, ValueType::scalar(DataKind::Real)).unwrap();
        assert_eq!(lexer.rest(), "next=2");
    }
}
