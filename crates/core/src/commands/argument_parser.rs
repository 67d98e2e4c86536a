use crate::commands::{
    argument::{ArgumentType, Consumed},
    context::ResolutionContext,
    error::ParseError,
    spec::NodeDescriptor,
    value::Value,
};
use std::str::FromStr;

/// An empty token (`Some("")`) is still a token: it is what the cursor sits
/// on after a trailing space.
pub fn consume_token<'i>(
    descriptor: &NodeDescriptor,
    input: Option<&'i str>,
) -> Result<Consumed<'i>, ParseError> {
    let Some(input) = input else {
        let default = descriptor.parameter("default");
        if default.is_none() && descriptor.parameter("required").unwrap_or("true") == "true" {
            return Err(ParseError::RequiredArgument);
        }
        return Ok(Consumed {
            token: default.map(str::to_string),
            rest: None,
        });
    };

    let (token, rest) = match input.split_once(' ') {
        Some((token, rest)) => (token, Some(rest)),
        None => (input, None),
    };

    Ok(Consumed {
        token: Some(token.to_string()),
        rest,
    })
}

fn bound<T: FromStr>(descriptor: &NodeDescriptor, key: &str) -> Option<T> {
    descriptor
        .parameter(key)
        .and_then(|value| value.trim().parse().ok())
}

fn check_bounds<T>(value: T, descriptor: &NodeDescriptor) -> Result<T, ParseError>
where
    T: FromStr + PartialOrd + std::fmt::Display + Copy,
{
    if let Some(min) = bound::<T>(descriptor, "min") {
        if value < min {
            return Err(ParseError::invalid(format!("{value} is less than {min}")));
        }
    }
    if let Some(max) = bound::<T>(descriptor, "max") {
        if value > max {
            return Err(ParseError::invalid(format!("{value} is greater than {max}")));
        }
    }
    Ok(value)
}

pub struct LiteralType;

impl<E> ArgumentType<E> for LiteralType {
    fn result(
        &self,
        token: &str,
        descriptor: &NodeDescriptor,
        _ctx: &ResolutionContext<'_, E>,
    ) -> Result<Value, ParseError> {
        if descriptor
            .aliases()
            .any(|alias| alias == "*" || alias == token)
        {
            Ok(Value::from(token))
        } else {
            Err(ParseError::NoResult)
        }
    }

    fn complete(
        &self,
        token: &str,
        descriptor: &NodeDescriptor,
        _ctx: &ResolutionContext<'_, E>,
    ) -> Vec<String> {
        for alias in descriptor.aliases() {
            if alias == "*" {
                return vec![token.to_string()];
            }
            if alias.starts_with(token) {
                return vec![alias.to_string()];
            }
        }
        Vec::new()
    }

    fn default_parameter(&self, key: &str) -> Option<&'static str> {
        match key {
            "suppress" => Some("true"),
            _ => None,
        }
    }
}

pub struct StringType;

impl<E> ArgumentType<E> for StringType {
    fn result(
        &self,
        token: &str,
        _descriptor: &NodeDescriptor,
        _ctx: &ResolutionContext<'_, E>,
    ) -> Result<Value, ParseError> {
        Ok(Value::from(token))
    }
}

pub struct IntegerType;

impl<E> ArgumentType<E> for IntegerType {
    fn result(
        &self,
        token: &str,
        descriptor: &NodeDescriptor,
        _ctx: &ResolutionContext<'_, E>,
    ) -> Result<Value, ParseError> {
        let value = token
            .parse::<i32>()
            .map_err(|_| ParseError::invalid(format!("'{token}' is not a valid integer")))?;
        check_bounds(value, descriptor).map(Value::Integer)
    }

    fn complete(
        &self,
        token: &str,
        descriptor: &NodeDescriptor,
        ctx: &ResolutionContext<'_, E>,
    ) -> Vec<String> {
        let Some(max) = bound::<i32>(descriptor, "max") else {
            return Vec::new();
        };
        let min = bound::<i32>(descriptor, "min").unwrap_or(0);
        integer_candidates(token, min, max, ctx.completion_limit())
    }
}

/// Numbers in `min..=max` whose text starts with `prefix`, shortest first.
fn integer_candidates(prefix: &str, min: i32, max: i32, limit: usize) -> Vec<String> {
    if prefix.is_empty() {
        return (min..=max).take(limit).map(|i| i.to_string()).collect();
    }

    let (negative, digits) = match prefix.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, prefix),
    };
    let leading_zero = digits.len() > 1 && digits.starts_with('0');
    if leading_zero || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Vec::new();
    }

    // Bounds on the magnitude of the candidates.
    let (min, max) = (i64::from(min), i64::from(max));
    let (low, high) = if negative {
        (1_i64.max(-max), -min)
    } else {
        (0_i64.max(min), max)
    };

    let (mut from, mut to) = if digits.is_empty() {
        (1, 9)
    } else {
        match digits.parse::<i64>() {
            Ok(n) => (n, n),
            Err(_) => return Vec::new(),
        }
    };

    let mut candidates = Vec::new();
    while from <= high && candidates.len() < limit {
        for n in from.max(low)..=to.min(high) {
            if candidates.len() == limit {
                break;
            }
            candidates.push(if negative { format!("-{n}") } else { n.to_string() });
        }
        // Nothing longer starts with a lone zero.
        if from == 0 {
            break;
        }
        from *= 10;
        to = to * 10 + 9;
    }
    candidates
}

pub struct DoubleType;

impl<E> ArgumentType<E> for DoubleType {
    fn result(
        &self,
        token: &str,
        descriptor: &NodeDescriptor,
        _ctx: &ResolutionContext<'_, E>,
    ) -> Result<Value, ParseError> {
        let value = token
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ParseError::invalid(format!("'{token}' is not a valid number")))?;
        check_bounds(value, descriptor).map(Value::Double)
    }
}
