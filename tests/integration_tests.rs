use drlang::{Config, DrlError, Value, interpret};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn eval_expr(expr_str: &str, doc: &Value) -> Result<Value, DrlError> {
    interpret(expr_str, doc, None)
}

fn json_object(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = HashMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    Value::Object(map)
}

fn json_array(values: Vec<Value>) -> Value {
    Value::Array(values)
}

fn empty() -> Value {
    json_object(vec![])
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_precedence() {
    let test_cases = vec![
        ("2 + 3 * 4", Value::Integer(14)),
        ("2 * 3 ^ 2", Value::Integer(18)),
        ("(2 + 3) * 4", Value::Integer(20)),
        ("10 - 4 - 3", Value::Integer(3)),
        ("2 ^ 3 ^ 2", Value::Integer(64)),
        ("-3 + 5", Value::Integer(2)),
        ("10 % 4 + 1", Value::Integer(3)),
    ];

    for (input, expected) in test_cases {
        assert_eq!(eval_expr(input, &empty()).unwrap(), expected, "input {:?}", input);
    }
}

#[test]
fn test_numeric_kinds() {
    assert_eq!(eval_expr("10 / 2", &empty()).unwrap(), Value::Integer(5));
    assert_eq!(eval_expr("7 / 2", &empty()).unwrap(), Value::Float(3.5));
    assert_eq!(eval_expr("1.5 + 1", &empty()).unwrap(), Value::Float(2.5));
    assert_eq!(eval_expr("-7 % 3", &empty()).unwrap(), Value::Integer(2));
    assert_eq!(eval_expr("2 ^ -1", &empty()).unwrap(), Value::Float(0.5));
}

#[test]
fn test_arithmetic_on_references() {
    let doc = json_object(vec![
        ("value", Value::Integer(5)),
        ("price", Value::Float(2.5)),
    ]);

    assert_eq!(eval_expr("$value * 2 + 10", &doc).unwrap(), Value::Integer(20));
    assert_eq!(eval_expr("$price*4", &doc).unwrap(), Value::Float(10.0));
}

#[test]
fn test_string_and_array_concatenation() {
    let doc = json_object(vec![
        ("first", Value::from("John")),
        ("last", Value::from("Doe")),
        ("xs", json_array(vec![Value::Integer(1)])),
        ("ys", json_array(vec![Value::Integer(2)])),
    ]);

    assert_eq!(
        eval_expr(r#"$first + " " + $last"#, &doc).unwrap(),
        Value::from("John Doe")
    );
    assert_eq!(
        eval_expr("$xs + $ys", &doc).unwrap(),
        json_array(vec![Value::Integer(1), Value::Integer(2)])
    );
}

#[test]
fn test_division_by_zero() {
    for input in ["1 / 0", "1.5 / 0", "5 % 0", "5 % 0.0"] {
        let err = eval_expr(input, &empty()).unwrap_err();
        assert!(matches!(err, DrlError::Type(_)), "input {:?} gave {}", input, err);
    }
    assert_eq!(eval_expr("1 / 0", &empty()).unwrap_err().message(), "Division by zero");
    assert_eq!(eval_expr("5 % 0", &empty()).unwrap_err().message(), "Modulo by zero");
}

#[test]
fn test_operand_type_errors() {
    let err = eval_expr("1 + 'a'", &empty()).unwrap_err();
    assert!(matches!(err, DrlError::Type(_)));
    assert_eq!(err.message(), "Cannot add integer and string with '+'");

    assert!(matches!(eval_expr("'a' * 2", &empty()), Err(DrlError::Type(_))));
    assert!(matches!(eval_expr("0 ^ -1", &empty()), Err(DrlError::Type(_))));
}

// ============================================================================
// Comparison and Logic
// ============================================================================

#[test]
fn test_comparisons() {
    let doc = json_object(vec![("age", Value::Integer(25))]);

    let test_cases = vec![
        ("$age > 18", true),
        ("$age >= 25", true),
        ("$age < 25", false),
        ("$age == 25.0", true),
        ("$age != 25", false),
        ("'abc' < 'abd'", true),
        ("True == True", true),
    ];

    for (input, expected) in test_cases {
        assert_eq!(eval_expr(input, &doc).unwrap(), Value::Boolean(expected), "input {:?}", input);
    }
}

#[test]
fn test_comparison_type_policy() {
    let doc = json_object(vec![("nothing", Value::Null)]);

    // Null compares equal only to null
    assert_eq!(eval_expr("$nothing == 0", &doc).unwrap(), Value::Boolean(false));
    assert_eq!(eval_expr("$nothing != 'x'", &doc).unwrap(), Value::Boolean(true));

    assert!(matches!(eval_expr("1 == '1'", &doc), Err(DrlError::Type(_))));
    assert!(matches!(eval_expr("1 < 'a'", &doc), Err(DrlError::Type(_))));
    assert!(matches!(eval_expr("$nothing < 1", &doc), Err(DrlError::Type(_))));
}

#[test]
fn test_logical_operators_return_booleans() {
    let doc = json_object(vec![
        ("age", Value::Integer(25)),
        ("verified", Value::Boolean(true)),
        ("name", Value::from("Ada")),
        ("blank", Value::from("")),
    ]);

    let test_cases = vec![
        ("$age > 18 and $verified == True", true),
        ("$name and $blank", false),
        ("$blank or $name", true),
        ("not $blank", true),
        ("not $age > 18", false),
        ("$verified and not $blank", true),
    ];

    for (input, expected) in test_cases {
        assert_eq!(eval_expr(input, &doc).unwrap(), Value::Boolean(expected), "input {:?}", input);
    }
}

#[test]
fn test_logical_operators_evaluate_both_sides() {
    // A failing right operand is still reached
    let err = eval_expr("False and $missing", &empty()).unwrap_err();
    assert!(matches!(err, DrlError::Reference(_)));
    let err = eval_expr("True or 1 / 0", &empty()).unwrap_err();
    assert!(matches!(err, DrlError::Type(_)));
}

#[test]
fn test_logical_operators_call_both_sides() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let config = Config::default().with_function(
        "tick",
        move |_args: Vec<Value>| -> Result<Value, DrlError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Boolean(true))
        },
    );

    let result = interpret("False and tick()", &empty(), Some(&config)).unwrap();
    assert_eq!(result, Value::Boolean(false));
    let result = interpret("True or tick()", &empty(), Some(&config)).unwrap();
    assert_eq!(result, Value::Boolean(true));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ============================================================================
// References
// ============================================================================

#[test]
fn test_reference_behaviors() {
    let doc = json_object(vec![(
        "user",
        json_object(vec![("name", Value::from("Ada"))]),
    )]);

    assert_eq!(eval_expr("$user>name", &doc).unwrap(), Value::from("Ada"));
    assert_eq!(eval_expr("$(user>name)", &doc).unwrap(), Value::from("Ada"));
    assert_eq!(eval_expr("$[user>email]", &doc).unwrap(), Value::Null);
    assert_eq!(eval_expr("${user>email}", &doc).unwrap(), Value::from("${user>email}"));

    let err = eval_expr("$user>email", &doc).unwrap_err();
    assert!(matches!(err, DrlError::Reference(_)));
    assert_eq!(err.message(), "Reference key 'email' not found in context");
}

#[test]
fn test_nested_reference() {
    let doc = json_object(vec![
        (
            "a",
            json_object(vec![(
                "b",
                json_object(vec![("c", Value::from("silver"))]),
            )]),
        ),
        ("ptr", json_object(vec![("sel", Value::from("b"))])),
    ]);

    assert_eq!(eval_expr("$(a>$(ptr>sel)>c)", &doc).unwrap(), Value::from("silver"));
    assert_eq!(eval_expr("$[a>$(ptr>sel)>zzz]", &doc).unwrap(), Value::Null);
}

#[test]
fn test_keys_with_spaces_and_indexes() {
    let doc = json_object(vec![(
        "user",
        json_object(vec![
            ("first name", Value::from("Ada")),
            (
                "tags",
                json_array(vec![Value::from("x"), Value::from("y")]),
            ),
        ]),
    )]);

    assert_eq!(
        eval_expr("$user>first name == 'Ada'", &doc).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(eval_expr("$(user>tags>-1)", &doc).unwrap(), Value::from("y"));
}

#[test]
fn test_custom_syntax() {
    let doc = json_object(vec![(
        "user",
        json_object(vec![("age", Value::Integer(40))]),
    )]);
    let config = Config::new('@', ".").unwrap();

    assert_eq!(
        interpret("@user.age > 30", &doc, Some(&config)).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        interpret("@[user.missing]", &doc, Some(&config)).unwrap(),
        Value::Null
    );
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_builtin_calls() {
    let doc = json_object(vec![
        ("age", Value::Integer(15)),
        ("data", json_object(vec![("names", Value::from("a,b,c"))])),
    ]);

    assert_eq!(
        eval_expr(r#"if($age >= 18, "adult", "minor")"#, &doc).unwrap(),
        Value::from("minor")
    );
    assert_eq!(
        eval_expr(r#"split($data>names, ",")"#, &doc).unwrap(),
        json_array(vec![Value::from("a"), Value::from("b"), Value::from("c")])
    );
    assert_eq!(
        eval_expr(r#"upper(join("-", split($data>names, ",")))"#, &doc).unwrap(),
        Value::from("A-B-C")
    );
}

#[test]
fn test_unknown_function() {
    let err = eval_expr("frobnicate(1)", &empty()).unwrap_err();
    assert!(matches!(err, DrlError::Name(_)));
    assert!(err.message().contains("frobnicate"));
    assert_eq!(err.position(), Some(0));
}

#[test]
fn test_argument_errors_carry_context() {
    let err = eval_expr("upper(1 / 0)", &empty()).unwrap_err();
    assert!(matches!(err, DrlError::Type(_)));
    assert_eq!(err.context(), Some("While evaluating argument 1 of 'upper'"));
}

#[test]
fn test_argument_context_keeps_inner_detail() {
    let doc = json_object(vec![("a", Value::Integer(1))]);
    let err = eval_expr("upper($missing)", &doc).unwrap_err();
    assert!(matches!(err, DrlError::Reference(_)));
    let context = err.context().unwrap_or_default();
    assert!(context.contains("Failed at: missing"), "context was {:?}", context);
    assert!(context.contains("While evaluating argument 1 of 'upper'"), "context was {:?}", context);

    // Nested calls stack one line per level
    let err = eval_expr("lower(upper($missing))", &doc).unwrap_err();
    let context = err.context().unwrap_or_default();
    assert!(context.ends_with(
        "While evaluating argument 1 of 'upper'\n  While evaluating argument 1 of 'lower'"
    ));
}

// ============================================================================
// Error Reporting
// ============================================================================

#[test]
fn test_error_rendering() {
    let err = eval_expr("1 + (2 * 3", &empty()).unwrap_err();
    assert!(matches!(err, DrlError::Syntax(_)));
    let rendered = err.to_string();
    assert!(rendered.starts_with("Syntax error: Missing closing parenthesis ')'"));
    assert!(rendered.contains("Expression: 1 + (2 * 3"));
}

#[test]
fn test_reference_error_position() {
    let err = eval_expr("1 + $nope", &empty()).unwrap_err();
    assert_eq!(err.position(), Some(4));
    assert!(err.to_string().contains("    1 + $nope\n        ^"));
}

#[test]
fn test_end_of_input_error_has_caret() {
    let err = eval_expr("1 +", &empty()).unwrap_err();
    assert!(matches!(err, DrlError::Syntax(_)));
    assert_eq!(err.position(), Some(3));
    let rendered = err.to_string();
    assert!(rendered.contains("Position 3:"), "rendered {}", rendered);
    assert!(rendered.contains("    1 +\n       ^"), "rendered {}", rendered);
}

#[test]
fn test_empty_expression() {
    assert_eq!(eval_expr("", &empty()).unwrap(), Value::Null);
}
