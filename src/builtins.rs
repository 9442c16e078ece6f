//! The built-in function catalog.
//!
//! Every builtin is a plain function over `Vec<Value>`; [`register_all`]
//! wires them into a registry together with their declared signatures.

use std::collections::HashMap;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::{
    ast::BinOp,
    error::DrlError,
    evaluator::apply_binop,
    functions::{FunctionRegistry, ParamType, typed},
    resolver::normalize_index,
    value::Value,
};

use ParamType::{Any, Array, Boolean, Float, Integer, String as Str};

pub(crate) fn register_all(registry: &mut FunctionRegistry) {
    // control and conversion
    registry.register("if", typed(&[Boolean, Any, Any], if_function));
    registry.register("int", int);
    registry.register("float", float);
    registry.register("str", str_function);
    registry.register("bool", bool_function);
    registry.register("len", len);
    registry.register("add", add);
    registry.register("min", min);
    registry.register("max", max);
    registry.register("all", all);
    registry.register("any", any);
    registry.register("round", typed(&[Float, Integer], round));

    // strings
    registry.register("upper", typed(&[Str], upper));
    registry.register("lower", typed(&[Str], lower));
    registry.register("capitalize", typed(&[Str], capitalize));
    registry.register("strip", typed(&[Str, Str], strip));
    registry.register("replace", typed(&[Str, Str, Str, Integer], replace));
    registry.register("find", typed(&[Str, Str], find));
    registry.register("join", typed(&[Str, Array], join));
    registry.register("split", typed(&[Str, Str], split));

    // regex
    registry.register("regex_search", typed(&[Str, Str], regex_search));
    registry.register("regex_match", typed(&[Str, Str], regex_match));
    registry.register("regex_findall", typed(&[Str, Str], regex_findall));
    registry.register("regex_sub", typed(&[Str, Str, Str], regex_sub));
    registry.register("regex_split", typed(&[Str, Str], regex_split));
    registry.register("regex_extract", typed(&[Str, Str, Integer], regex_extract));

    // lists
    registry.register("list_get", typed(&[Array, Integer, Any], list_get));
    registry.register("list_slice", typed(&[Array, Integer, Integer, Integer], list_slice));
    registry.register("list_append", typed(&[Array, Any], list_append));
    registry.register("list_concat", typed(&[Array, Array], list_concat));
    registry.register("list_contains", typed(&[Array, Any], list_contains));
    registry.register("list_index", typed(&[Array, Any, Integer], list_index));
    registry.register("list_reverse", typed(&[Array], list_reverse));
    registry.register("reversed", typed(&[Array], list_reverse));
    registry.register("list_unique", typed(&[Array], list_unique));
    registry.register("list_flatten", typed(&[Array], list_flatten));
    registry.register("sorted", typed(&[Array, Boolean], sorted));

    // higher-order
    registry.register("map", typed(&[Str, Array, Any], map_list));
    registry.register("filter", typed(&[Str, Array, Any], filter_list));
    registry.register("reduce", typed(&[Str, Array, Any, Any], reduce_list));
}

// --- Argument helpers ---

fn arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a Value, DrlError> {
    args.get(index).ok_or_else(|| {
        DrlError::type_error(format!(
            "{}() missing required argument {}",
            name,
            index + 1
        ))
    })
}

/// An optional trailing argument; explicit null counts as absent.
fn opt_arg<'a>(args: &'a [Value], index: usize) -> Option<&'a Value> {
    args.get(index).filter(|v| !v.is_null())
}

fn wrong_type(name: &str, index: usize, expected: &str, got: &Value) -> DrlError {
    DrlError::type_error(format!(
        "{}() argument {} must be {}, not {}",
        name,
        index + 1,
        expected,
        got.type_name()
    ))
}

fn str_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a str, DrlError> {
    let value = arg(name, args, index)?;
    value
        .as_str()
        .ok_or_else(|| wrong_type(name, index, "a string", value))
}

fn list_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a [Value], DrlError> {
    let value = arg(name, args, index)?;
    value
        .as_array()
        .ok_or_else(|| wrong_type(name, index, "an array", value))
}

fn opt_int_arg(name: &str, args: &[Value], index: usize) -> Result<Option<i64>, DrlError> {
    match opt_arg(args, index) {
        None => Ok(None),
        Some(Value::Integer(n)) => Ok(Some(*n)),
        Some(other) => Err(wrong_type(name, index, "an integer", other)),
    }
}

/// Functions like `min(a, b, c)` also accept a single array: `min([a, b, c])`.
fn items<'a>(args: &'a [Value]) -> &'a [Value] {
    match args {
        [Value::Array(arr)] => arr.as_slice(),
        _ => args,
    }
}

fn compile(pattern: &str) -> Result<Regex, DrlError> {
    Regex::new(pattern).map_err(|e| {
        DrlError::internal(format!("Invalid regular expression '{}': {}", pattern, e))
    })
}

// --- Control and conversion ---

fn if_function(args: Vec<Value>) -> Result<Value, DrlError> {
    let condition = arg("if", &args, 0)?.is_truthy();
    let chosen = if condition { 1 } else { 2 };
    Ok(arg("if", &args, chosen)?.clone())
}

fn int(args: Vec<Value>) -> Result<Value, DrlError> {
    match arg("int", &args, 0)? {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Float(n) if n.is_finite() => Ok(Value::Integer(n.trunc() as i64)),
        Value::Boolean(b) => Ok(Value::Integer(*b as i64)),
        Value::String(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
            DrlError::type_error(format!("invalid literal for int(): '{}'", s))
        }),
        other => Err(wrong_type("int", 0, "a number or string", other)),
    }
}

fn float(args: Vec<Value>) -> Result<Value, DrlError> {
    match arg("float", &args, 0)? {
        Value::Integer(n) => Ok(Value::Float(*n as f64)),
        Value::Float(n) => Ok(Value::Float(*n)),
        Value::Boolean(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            DrlError::type_error(format!("could not convert string to float: '{}'", s))
        }),
        other => Err(wrong_type("float", 0, "a number or string", other)),
    }
}

fn str_function(args: Vec<Value>) -> Result<Value, DrlError> {
    Ok(Value::String(arg("str", &args, 0)?.to_string()))
}

fn bool_function(args: Vec<Value>) -> Result<Value, DrlError> {
    Ok(Value::Boolean(args.first().is_some_and(Value::is_truthy)))
}

fn len(args: Vec<Value>) -> Result<Value, DrlError> {
    let n = match arg("len", &args, 0)? {
        Value::String(s) => s.chars().count(),
        Value::Array(arr) => arr.len(),
        Value::Object(obj) => obj.len(),
        other => return Err(wrong_type("len", 0, "a string, array or object", other)),
    };
    Ok(Value::Integer(n as i64))
}

fn add(args: Vec<Value>) -> Result<Value, DrlError> {
    items(&args).iter().try_fold(Value::Integer(0), |total, item| {
        if !item.is_number() {
            return Err(DrlError::type_error(format!(
                "add() cannot sum {} values",
                item.type_name()
            )));
        }
        apply_binop(BinOp::Add, &total, item)
    })
}

fn extreme(name: &str, args: &[Value], keep: std::cmp::Ordering) -> Result<Value, DrlError> {
    let values = items(args);
    let Some((first, rest)) = values.split_first() else {
        return Err(DrlError::type_error(format!("{}() arg is an empty sequence", name)));
    };
    let mut best = first;
    for candidate in rest {
        match candidate.compare(best) {
            Some(order) if order == keep => best = candidate,
            Some(_) => {}
            None => {
                return Err(DrlError::type_error(format!(
                    "{}() cannot compare {} and {}",
                    name,
                    candidate.type_name(),
                    best.type_name()
                )));
            }
        }
    }
    Ok(best.clone())
}

fn min(args: Vec<Value>) -> Result<Value, DrlError> {
    extreme("min", &args, std::cmp::Ordering::Less)
}

fn max(args: Vec<Value>) -> Result<Value, DrlError> {
    extreme("max", &args, std::cmp::Ordering::Greater)
}

fn all(args: Vec<Value>) -> Result<Value, DrlError> {
    Ok(Value::Boolean(list_arg("all", &args, 0)?.iter().all(Value::is_truthy)))
}

fn any(args: Vec<Value>) -> Result<Value, DrlError> {
    Ok(Value::Boolean(list_arg("any", &args, 0)?.iter().any(Value::is_truthy)))
}

/// `round(x)` gives an integer, `round(x, n)` a float with `n` decimals.
/// Halves round away from zero.
fn round(args: Vec<Value>) -> Result<Value, DrlError> {
    let x = match arg("round", &args, 0)? {
        Value::Float(n) => *n,
        Value::Integer(n) => *n as f64,
        other => return Err(wrong_type("round", 0, "a number", other)),
    };
    let digits = opt_int_arg("round", &args, 1)?;

    let rounded = match digits {
        Some(d) if d < 0 => {
            let scale = 10f64.powi(d.unsigned_abs().min(308) as i32);
            (x / scale).round() * scale
        }
        _ => {
            let dp = digits.unwrap_or(0).min(28) as u32;
            match Decimal::from_f64(x) {
                Some(d) => d
                    .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
                    .to_f64()
                    .unwrap_or(x),
                None => x,
            }
        }
    };

    match digits {
        Some(_) => Ok(Value::Float(rounded)),
        None if rounded.is_finite() => Ok(Value::Integer(rounded as i64)),
        None => Err(DrlError::type_error(format!("cannot round {} to an integer", x))),
    }
}

// --- Strings ---

fn upper(args: Vec<Value>) -> Result<Value, DrlError> {
    Ok(Value::from(str_arg("upper", &args, 0)?.to_uppercase()))
}

fn lower(args: Vec<Value>) -> Result<Value, DrlError> {
    Ok(Value::from(str_arg("lower", &args, 0)?.to_lowercase()))
}

fn capitalize(args: Vec<Value>) -> Result<Value, DrlError> {
    let s = str_arg("capitalize", &args, 0)?;
    let mut chars = s.chars();
    let out = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    };
    Ok(Value::String(out))
}

fn strip(args: Vec<Value>) -> Result<Value, DrlError> {
    let s = str_arg("strip", &args, 0)?;
    let out = match opt_arg(&args, 1) {
        Some(Value::String(chars)) => s.trim_matches(|c| chars.contains(c)),
        Some(other) => return Err(wrong_type("strip", 1, "a string", other)),
        None => s.trim(),
    };
    Ok(Value::from(out))
}

fn replace(args: Vec<Value>) -> Result<Value, DrlError> {
    let s = str_arg("replace", &args, 0)?;
    let old = str_arg("replace", &args, 1)?;
    let new = str_arg("replace", &args, 2)?;
    let out = match opt_int_arg("replace", &args, 3)? {
        Some(count) if count >= 0 => s.replacen(old, new, count as usize),
        _ => s.replace(old, new),
    };
    Ok(Value::String(out))
}

fn find(args: Vec<Value>) -> Result<Value, DrlError> {
    let s = str_arg("find", &args, 0)?;
    let needle = str_arg("find", &args, 1)?;
    let index = s
        .find(needle)
        .map(|byte| s[..byte].chars().count() as i64)
        .unwrap_or(-1);
    Ok(Value::Integer(index))
}

fn join(args: Vec<Value>) -> Result<Value, DrlError> {
    let sep = str_arg("join", &args, 0)?;
    let parts = list_arg("join", &args, 1)?
        .iter()
        .map(|item| {
            item.as_str().ok_or_else(|| {
                DrlError::type_error(format!(
                    "join() expected string items, found {}",
                    item.type_name()
                ))
            })
        })
        .collect::<Result<Vec<&str>, DrlError>>()?;
    Ok(Value::String(parts.join(sep)))
}

fn split(args: Vec<Value>) -> Result<Value, DrlError> {
    let s = str_arg("split", &args, 0)?;
    let parts: Vec<Value> = match opt_arg(&args, 1) {
        None => s.split_whitespace().map(Value::from).collect(),
        Some(Value::String(sep)) if sep.is_empty() => {
            return Err(DrlError::type_error("split() separator cannot be empty"));
        }
        Some(Value::String(sep)) => s.split(sep.as_str()).map(Value::from).collect(),
        Some(other) => return Err(wrong_type("split", 1, "a string", other)),
    };
    Ok(Value::Array(parts))
}

// --- Regex ---

fn regex_search(args: Vec<Value>) -> Result<Value, DrlError> {
    let re = compile(str_arg("regex_search", &args, 0)?)?;
    Ok(Value::Boolean(re.is_match(str_arg("regex_search", &args, 1)?)))
}

/// Like `regex_search`, but the match must begin at the start of the string.
fn regex_match(args: Vec<Value>) -> Result<Value, DrlError> {
    let re = compile(str_arg("regex_match", &args, 0)?)?;
    let s = str_arg("regex_match", &args, 1)?;
    Ok(Value::Boolean(re.find(s).is_some_and(|m| m.start() == 0)))
}

/// Whole matches without groups, group 1 with one group, arrays of groups otherwise.
fn regex_findall(args: Vec<Value>) -> Result<Value, DrlError> {
    let re = compile(str_arg("regex_findall", &args, 0)?)?;
    let s = str_arg("regex_findall", &args, 1)?;
    let group_text = |caps: &regex::Captures, i: usize| {
        Value::from(caps.get(i).map(|m| m.as_str()).unwrap_or(""))
    };

    let found = re
        .captures_iter(s)
        .map(|caps| match re.captures_len() {
            1 => group_text(&caps, 0),
            2 => group_text(&caps, 1),
            n => Value::Array((1..n).map(|i| group_text(&caps, i)).collect()),
        })
        .collect();
    Ok(Value::Array(found))
}

fn regex_sub(args: Vec<Value>) -> Result<Value, DrlError> {
    let re = compile(str_arg("regex_sub", &args, 0)?)?;
    let replacement = str_arg("regex_sub", &args, 1)?;
    let s = str_arg("regex_sub", &args, 2)?;
    Ok(Value::String(re.replace_all(s, replacement).into_owned()))
}

fn regex_split(args: Vec<Value>) -> Result<Value, DrlError> {
    let re = compile(str_arg("regex_split", &args, 0)?)?;
    let s = str_arg("regex_split", &args, 1)?;
    Ok(Value::Array(re.split(s).map(Value::from).collect()))
}

/// First match (or one of its groups); empty string when nothing matches.
fn regex_extract(args: Vec<Value>) -> Result<Value, DrlError> {
    let re = compile(str_arg("regex_extract", &args, 0)?)?;
    let s = str_arg("regex_extract", &args, 1)?;
    let group = opt_int_arg("regex_extract", &args, 2)?.unwrap_or(0);
    if group < 0 || group as usize >= re.captures_len() {
        return Err(DrlError::type_error(format!("regex_extract(): no such group {}", group)));
    }

    Ok(match re.captures(s) {
        Some(caps) => caps
            .get(group as usize)
            .map(|m| Value::from(m.as_str()))
            .unwrap_or(Value::Null),
        None => Value::from(""),
    })
}

// --- Lists ---

fn list_get(args: Vec<Value>) -> Result<Value, DrlError> {
    let default = args.get(2).cloned().unwrap_or(Value::Null);
    let (Some(Value::Array(list)), Some(Value::Integer(index))) = (args.first(), args.get(1))
    else {
        return Ok(default);
    };
    Ok(normalize_index(*index, list.len())
        .map(|i| list[i].clone())
        .unwrap_or(default))
}

/// Python slice semantics: negative bounds count from the end, bounds clamp.
fn list_slice(args: Vec<Value>) -> Result<Value, DrlError> {
    let list = list_arg("list_slice", &args, 0)?;
    let start = opt_int_arg("list_slice", &args, 1)?;
    let end = opt_int_arg("list_slice", &args, 2)?;
    let step = opt_int_arg("list_slice", &args, 3)?.unwrap_or(1);
    if step == 0 {
        return Err(DrlError::type_error("list_slice() step cannot be zero"));
    }

    let len = list.len() as i64;
    let clamp = |bound: i64, low: i64, high: i64| {
        let bound = if bound < 0 { bound + len } else { bound };
        bound.clamp(low, high)
    };

    let mut out = Vec::new();
    if step > 0 {
        let mut i = start.map_or(0, |s| clamp(s, 0, len));
        let stop = end.map_or(len, |e| clamp(e, 0, len));
        while i < stop {
            out.push(list[i as usize].clone());
            i = i.saturating_add(step);
        }
    } else {
        let mut i = start.map_or(len - 1, |s| clamp(s, -1, len - 1));
        let stop = end.map_or(-1, |e| clamp(e, -1, len - 1));
        while i > stop {
            out.push(list[i as usize].clone());
            i = i.saturating_add(step);
        }
    }
    Ok(Value::Array(out))
}

fn list_append(args: Vec<Value>) -> Result<Value, DrlError> {
    let mut list = list_arg("list_append", &args, 0)?.to_vec();
    list.push(arg("list_append", &args, 1)?.clone());
    Ok(Value::Array(list))
}

fn list_concat(args: Vec<Value>) -> Result<Value, DrlError> {
    let mut list = list_arg("list_concat", &args, 0)?.to_vec();
    list.extend_from_slice(list_arg("list_concat", &args, 1)?);
    Ok(Value::Array(list))
}

fn list_contains(args: Vec<Value>) -> Result<Value, DrlError> {
    let list = list_arg("list_contains", &args, 0)?;
    let item = arg("list_contains", &args, 1)?;
    Ok(Value::Boolean(list.iter().any(|v| v.loose_eq(item))))
}

fn list_index(args: Vec<Value>) -> Result<Value, DrlError> {
    let list = list_arg("list_index", &args, 0)?;
    let item = arg("list_index", &args, 1)?;
    let default = opt_int_arg("list_index", &args, 2)?.unwrap_or(-1);
    let index = list
        .iter()
        .position(|v| v.loose_eq(item))
        .map_or(default, |i| i as i64);
    Ok(Value::Integer(index))
}

fn list_reverse(args: Vec<Value>) -> Result<Value, DrlError> {
    let list = list_arg("list_reverse", &args, 0)?;
    Ok(Value::Array(list.iter().rev().cloned().collect()))
}

/// Drops repeated items, keeping first occurrences in order.
fn list_unique(args: Vec<Value>) -> Result<Value, DrlError> {
    let mut seen: Vec<Value> = Vec::new();
    for item in list_arg("list_unique", &args, 0)? {
        if !seen.iter().any(|v| v.loose_eq(item)) {
            seen.push(item.clone());
        }
    }
    Ok(Value::Array(seen))
}

/// Flattens exactly one level of nesting.
fn list_flatten(args: Vec<Value>) -> Result<Value, DrlError> {
    let mut out = Vec::new();
    for item in list_arg("list_flatten", &args, 0)? {
        match item {
            Value::Array(inner) => out.extend_from_slice(inner),
            other => out.push(other.clone()),
        }
    }
    Ok(Value::Array(out))
}

fn sorted(args: Vec<Value>) -> Result<Value, DrlError> {
    let mut list = list_arg("sorted", &args, 0)?.to_vec();
    let reverse = opt_arg(&args, 1).is_some_and(Value::is_truthy);

    let mut mismatch = None;
    list.sort_by(|a, b| {
        a.compare(b).unwrap_or_else(|| {
            mismatch.get_or_insert((a.type_name(), b.type_name()));
            std::cmp::Ordering::Equal
        })
    });
    if let Some((a, b)) = mismatch {
        return Err(DrlError::type_error(format!(
            "sorted() cannot compare {} and {}",
            a, b
        )));
    }
    if reverse {
        list.reverse();
    }
    Ok(Value::Array(list))
}

// --- Higher-order ---

/// Base scope for `map`/`filter`/`reduce`: the optional context argument,
/// with a non-object context exposed as `$value`.
fn scope(context: Option<&Value>) -> HashMap<String, Value> {
    match context {
        None => HashMap::new(),
        Some(Value::Object(obj)) => obj.clone(),
        Some(other) => HashMap::from([("value".to_string(), other.clone())]),
    }
}

fn map_list(args: Vec<Value>) -> Result<Value, DrlError> {
    let expression = str_arg("map", &args, 0)?;
    let list = list_arg("map", &args, 1)?;
    let mut ctx = scope(opt_arg(&args, 2));

    let mut out = Vec::with_capacity(list.len());
    for (index, item) in list.iter().enumerate() {
        ctx.insert("item".to_string(), item.clone());
        ctx.insert("index".to_string(), Value::Integer(index as i64));
        out.push(crate::interpret(expression, &Value::Object(ctx.clone()), None)?);
    }
    Ok(Value::Array(out))
}

fn filter_list(args: Vec<Value>) -> Result<Value, DrlError> {
    let expression = str_arg("filter", &args, 0)?;
    let list = list_arg("filter", &args, 1)?;
    let mut ctx = scope(opt_arg(&args, 2));

    let mut out = Vec::new();
    for (index, item) in list.iter().enumerate() {
        ctx.insert("item".to_string(), item.clone());
        ctx.insert("index".to_string(), Value::Integer(index as i64));
        if crate::interpret(expression, &Value::Object(ctx.clone()), None)?.is_truthy() {
            out.push(item.clone());
        }
    }
    Ok(Value::Array(out))
}

/// Without an initial value the first item seeds the accumulator.
fn reduce_list(args: Vec<Value>) -> Result<Value, DrlError> {
    let expression = str_arg("reduce", &args, 0)?;
    let list = list_arg("reduce", &args, 1)?;
    let initial = opt_arg(&args, 2).cloned();
    let mut ctx = scope(opt_arg(&args, 3));

    let (mut acc, rest) = match (initial, list.split_first()) {
        (initial, None) => return Ok(initial.unwrap_or(Value::Null)),
        (Some(initial), Some(_)) => (initial, list),
        (None, Some((first, rest))) => (first.clone(), rest),
    };
    for item in rest {
        ctx.insert("acc".to_string(), acc);
        ctx.insert("item".to_string(), item.clone());
        acc = crate::interpret(expression, &Value::Object(ctx.clone()), None)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Value {
        Value::Array(values.iter().copied().map(Value::Integer).collect())
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round(vec![Value::Float(2.5)]).unwrap(), Value::Integer(3));
        assert_eq!(round(vec![Value::Float(-2.5)]).unwrap(), Value::Integer(-3));
        assert_eq!(
            round(vec![Value::Float(3.14159), Value::Integer(2)]).unwrap(),
            Value::Float(3.14)
        );
        assert_eq!(
            round(vec![Value::Float(1250.0), Value::Integer(-2)]).unwrap(),
            Value::Float(1300.0)
        );
    }

    #[test]
    fn test_list_slice_python_semantics() {
        let list = ints(&[1, 2, 3, 4, 5]);
        let slice = |rest: Vec<Value>| {
            let mut args = vec![list.clone()];
            args.extend(rest);
            list_slice(args).unwrap()
        };
        assert_eq!(slice(vec![Value::Integer(1), Value::Integer(4)]), ints(&[2, 3, 4]));
        assert_eq!(
            slice(vec![Value::Integer(0), Value::Integer(5), Value::Integer(2)]),
            ints(&[1, 3, 5])
        );
        assert_eq!(slice(vec![Value::Integer(-2)]), ints(&[4, 5]));
        assert_eq!(
            slice(vec![Value::Null, Value::Null, Value::Integer(-1)]),
            ints(&[5, 4, 3, 2, 1])
        );
        assert!(list_slice(vec![list.clone(), Value::Null, Value::Null, Value::Integer(0)]).is_err());
    }

    #[test]
    fn test_findall_groups() {
        let result = regex_findall(vec![Value::from(r"(\w)=(\d)"), Value::from("a=1 b=2")]).unwrap();
        assert_eq!(
            result,
            Value::Array(vec![
                Value::Array(vec![Value::from("a"), Value::from("1")]),
                Value::Array(vec![Value::from("b"), Value::from("2")]),
            ])
        );
    }

    #[test]
    fn test_invalid_regex_is_internal_error() {
        let err = regex_search(vec![Value::from("("), Value::from("x")]).unwrap_err();
        assert!(matches!(err, DrlError::Internal(_)));
    }

    #[test]
    fn test_min_max_mixed_numbers() {
        assert_eq!(
            max(vec![Value::Integer(1), Value::Float(2.5), Value::Integer(2)]).unwrap(),
            Value::Float(2.5)
        );
        assert_eq!(min(vec![ints(&[4, 2, 9])]).unwrap(), Value::Integer(2));
        assert!(min(vec![]).is_err());
        assert!(max(vec![Value::Integer(1), Value::from("a")]).is_err());
    }

    #[test]
    fn test_sorted_rejects_mixed_kinds() {
        assert_eq!(sorted(vec![ints(&[3, 1, 2])]).unwrap(), ints(&[1, 2, 3]));
        let mixed = Value::Array(vec![Value::Integer(1), Value::from("a")]);
        assert!(sorted(vec![mixed]).is_err());
    }
}
