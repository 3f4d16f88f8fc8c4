//! Connection text parsing for code-model instance cards.
//!
//! A connection is either `null`, a single port, or for array connections
//! a bracketed list of ports:
//!
//! ```text
//! in           single-ended node, default kind
//! %vd (p n)    differential voltage input between p and n
//! %vnam V1     current through voltage source V1
//! ~q           inverted event port
//! [a null %i b]
//! ```

use mixsim_core::PortKind;

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token, TokenKind};

/// Where a port is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortTarget {
    /// Unconnected port.
    Null,
    /// Single node, referenced to ground.
    Node(String),
    /// Explicit positive and negative nodes.
    Differential { pos: String, neg: String },
    /// Name of an independent voltage source whose current is sensed.
    Source(String),
}

/// One parsed port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub kind: PortKind,
    pub invert: bool,
    pub target: PortTarget,
}

impl PortSpec {
    pub fn is_null(&self) -> bool {
        self.target == PortTarget::Null
    }
}

/// One parsed connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSpec {
    Null,
    Scalar(PortSpec),
    Array(Vec<PortSpec>),
}

impl ConnectionSpec {
    /// Ports of the connection, empty for a null connection.
    pub fn ports(&self) -> &[PortSpec] {
        match self {
            ConnectionSpec::Null => &[],
            ConnectionSpec::Scalar(port) => std::slice::from_ref(port),
            ConnectionSpec::Array(ports) => ports,
        }
    }
}

/// Parse the text of one connection.
///
/// `default_kind` is the connection's declared port kind, overridable with
/// a `%kind` prefix on the whole connection or on individual array ports.
pub fn parse_connection(
    lexer: &mut Lexer<'_>,
    default_kind: PortKind,
    is_array: bool,
) -> Result<ConnectionSpec> {
    let mut token = next(lexer)?;
    if token.is(TokenKind::Null) {
        return Ok(ConnectionSpec::Null);
    }

    let mut kind = default_kind;
    if token.is(TokenKind::Percent) {
        kind = parse_kind(lexer)?;
        token = next(lexer)?;
    }

    if !is_array {
        if token.is(TokenKind::LArray) {
            return Err(Error::UnexpectedToken(token.text.to_string()));
        }
        return parse_port(lexer, token, kind).map(ConnectionSpec::Scalar);
    }

    if !token.is(TokenKind::LArray) {
        return Err(Error::ArrayConnectionExpected);
    }

    let mut ports = Vec::new();
    loop {
        let token = next(lexer)?;
        if token.is(TokenKind::RArray) {
            break;
        }
        ports.push(parse_port(lexer, token, kind)?);
    }

    if ports.is_empty() {
        return Err(Error::EmptyConnectionArray);
    }
    Ok(ConnectionSpec::Array(ports))
}

fn next<'a>(lexer: &mut Lexer<'a>) -> Result<Token<'a>> {
    lexer.next_token().ok_or(Error::UnexpectedEnd)
}

fn parse_kind(lexer: &mut Lexer<'_>) -> Result<PortKind> {
    let token = next(lexer)?;
    if !token.is(TokenKind::String) {
        return Err(Error::UnexpectedToken(token.text.to_string()));
    }
    PortKind::from_prefix(token.text).ok_or_else(|| Error::UnknownPortType(token.text.to_string()))
}

fn node_name(lexer: &mut Lexer<'_>) -> Result<String> {
    let token = next(lexer)?;
    if token.is(TokenKind::String) {
        Ok(token.text.to_string())
    } else {
        Err(Error::UnexpectedToken(token.text.to_string()))
    }
}

fn parse_port(lexer: &mut Lexer<'_>, first: Token<'_>, default_kind: PortKind) -> Result<PortSpec> {
    let mut token = first;
    let mut kind = default_kind;

    if token.is(TokenKind::Percent) {
        kind = parse_kind(lexer)?;
        token = next(lexer)?;
    }

    if token.is(TokenKind::Null) {
        return Ok(PortSpec {
            kind,
            invert: false,
            target: PortTarget::Null,
        });
    }

    let invert = token.is(TokenKind::Tilde);
    if invert {
        if kind.is_analog() {
            return Err(Error::InvertedAnalogPort);
        }
        token = next(lexer)?;
    }

    if !token.is(TokenKind::String) {
        return Err(Error::UnexpectedToken(token.text.to_string()));
    }
    let first = token.text.to_string();

    let target = if kind == PortKind::VsourceCurrent {
        PortTarget::Source(first)
    } else if kind.is_differential() {
        PortTarget::Differential {
            pos: first,
            neg: node_name(lexer)?,
        }
    } else {
        PortTarget::Node(first)
    };

    Ok(PortSpec {
        kind,
        invert,
        target,
    })
}
