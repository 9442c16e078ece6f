//! JSON rendering for interpreter results.
//!
//! Object keys are written in sorted order so output is deterministic even
//! though objects are hash maps. Whole floats keep a `.0` suffix so the
//! integer/float distinction survives a round trip through text.
//!
//! ```
//! use drlang::Value;
//! use drlang::output::{to_json, to_json_pretty};
//!
//! let value = Value::Array(vec![Value::Integer(1), Value::Float(2.0)]);
//! assert_eq!(to_json(&value), "[1,2.0]");
//! assert_eq!(to_json_pretty(&value), "[\n  1,\n  2.0\n]");
//! ```

use std::fmt::Write;

use crate::value::Value;

pub struct JsonPrinter {
    pretty: bool,
    out: String,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter {
            pretty,
            out: String::new(),
        }
    }

    pub fn print(mut self, value: &Value) -> String {
        self.write_value(value, 0);
        self.out
    }

    fn write_value(&mut self, value: &Value, indent: usize) {
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Boolean(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => {
                let _ = write!(self.out, "{}", n);
            }
            Value::Float(n) if !n.is_finite() => self.out.push_str("null"),
            Value::Float(n) if n.fract() == 0.0 => {
                let _ = write!(self.out, "{:.1}", n);
            }
            Value::Float(n) => {
                let _ = write!(self.out, "{}", n);
            }
            Value::String(s) => self.write_string(s),
            Value::Array(arr) => {
                if arr.is_empty() {
                    self.out.push_str("[]");
                    return;
                }
                self.out.push('[');
                for (i, item) in arr.iter().enumerate() {
                    self.separator(i, indent + 1);
                    self.write_value(item, indent + 1);
                }
                self.close(']', indent);
            }
            Value::Object(obj) => {
                if obj.is_empty() {
                    self.out.push_str("{}");
                    return;
                }
                let mut keys: Vec<&String> = obj.keys().collect();
                keys.sort();

                self.out.push('{');
                for (i, key) in keys.into_iter().enumerate() {
                    self.separator(i, indent + 1);
                    self.write_string(key);
                    self.out.push(':');
                    if self.pretty {
                        self.out.push(' ');
                    }
                    self.write_value(&obj[key], indent + 1);
                }
                self.close('}', indent);
            }
        }
    }

    fn separator(&mut self, index: usize, indent: usize) {
        if index > 0 {
            self.out.push(',');
        }
        if self.pretty {
            self.out.push('\n');
            self.out.push_str(&"  ".repeat(indent));
        }
    }

    fn close(&mut self, bracket: char, indent: usize) {
        if self.pretty {
            self.out.push('\n');
            self.out.push_str(&"  ".repeat(indent));
        }
        self.out.push(bracket);
    }

    fn write_string(&mut self, s: &str) {
        self.out.push('"');
        for c in s.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if c.is_control() => {
                    let _ = write!(self.out, "\\u{:04x}", c as u32);
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}

/// Compact JSON with sorted object keys.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Two-space indented JSON with sorted object keys.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
