//! Parser tests for MicroScala.
//!
//! These tests verify grammar coverage, the `"X expected"` diagnostics,
//! and the round-trip property: pretty-printing a parsed program and
//! parsing the output again yields a structurally identical tree.

use microscala::ast::{Expr, Literal, Program, Stmt, Type, UNDEFINED};
use microscala::error::ParseError;
use microscala::parser::Parser;
use pretty_assertions::assert_eq;

/// Helper to parse a string and return the program.
fn parse(input: &str) -> Result<Program, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse()
}

/// Helper wrapping an expression into a minimal program and returning the
/// parsed expression back.
fn parse_expr(input: &str) -> Expr {
    let source = format!(
        "object P {{ def main(args : Array[String]) {{ x = {}; }} }}",
        input
    );
    let program = parse(&source).expect("parse failed");
    match program.main.body.into_iter().next() {
        Some(Stmt::Assign { value, .. }) => value,
        other => panic!("expected assignment, got {:?}", other),
    }
}

// ============================================
// 1. Compilation Unit Tests
// ============================================

#[test]
fn test_parse_program_shape() {
    let input = r#"
object Shapes {
    var total : Int = 0;
    var xs : List[Int] = Nil;

    def area(w : Int, h : Int) : Int = {
        return w * h;
    }

    def main(args : Array[String]) {
        var local : Int = 1;
        total = area(3, 4);
        println(total);
    }
}
"#;
    let program = parse(input).expect("parse failed");

    assert_eq!(program.name, "Shapes");
    assert_eq!(program.globals.len(), 2);
    assert_eq!(program.globals[0].ty, Type::Int);
    assert_eq!(program.globals[1].ty, Type::IntList);
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.functions[0].name, "area");
    assert_eq!(program.functions[0].return_type, Some(Type::Int));
    assert_eq!(program.main.locals.len(), 1);
    assert_eq!(program.main.body.len(), 2);
}

#[test]
fn test_main_has_inert_args_param() {
    let program = parse("object P { def main(args : Array[String]) { println(1); } }")
        .expect("parse failed");
    assert_eq!(program.main.params.len(), 1);
    assert_eq!(program.main.params[0].name, "args");
    assert_eq!(program.main.params[0].ty, Type::StringArray);
    assert_eq!(program.main.return_type, None);
}

#[test]
fn test_function_body_ends_with_return() {
    let program = parse(
        "object P { \
            def id(n : Int) : Int = { return n; } \
            def main(args : Array[String]) { println(id(3)); } \
        }",
    )
    .expect("parse failed");
    assert!(matches!(
        program.functions[0].body.last(),
        Some(Stmt::Return(_))
    ));
}

#[test]
fn test_param_placeholders() {
    let program = parse(
        "object P { \
            def f(n : Int, xs : List[Int]) : List[Int] = { return xs; } \
            def main(args : Array[String]) { println(1); } \
        }",
    )
    .expect("parse failed");
    let params = &program.functions[0].params;
    assert_eq!(params[0].value, Literal::Int(UNDEFINED));
    assert_eq!(params[1].value, Literal::Nil);
}

// ============================================
// 2. Statement Tests
// ============================================

#[test]
fn test_if_without_else() {
    let program = parse(
        "object P { def main(args : Array[String]) { if (1) println(1); } }",
    )
    .expect("parse failed");
    match &program.main.body[0] {
        Stmt::If { else_branch, .. } => assert!(else_branch.is_none()),
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_dangling_else_binds_inner_if() {
    let program = parse(
        "object P { def main(args : Array[String]) { \
            if (1) if (0) println(1); else println(2); \
        } }",
    )
    .expect("parse failed");
    match &program.main.body[0] {
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            assert!(else_branch.is_none());
            assert!(matches!(
                **then_branch,
                Stmt::If {
                    else_branch: Some(_),
                    ..
                }
            ));
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_braced_block_with_two_statements() {
    let program = parse(
        "object P { def main(args : Array[String]) { \
            while (0) { println(1); println(2); } \
        } }",
    )
    .expect("parse failed");
    match &program.main.body[0] {
        Stmt::While { body, .. } => match &**body {
            Stmt::Block(stmts) => assert_eq!(stmts.len(), 2),
            other => panic!("expected block, got {:?}", other),
        },
        other => panic!("expected while, got {:?}", other),
    }
}

// ============================================
// 3. Expression Structure Tests
// ============================================

#[test]
fn test_precedence_ladder() {
    assert_eq!(parse_expr("1 + 2 * 3").to_string(), "(1 + (2 * 3))");
    assert_eq!(parse_expr("1 * 2 + 3").to_string(), "((1 * 2) + 3)");
    assert_eq!(parse_expr("8 / 4 / 2").to_string(), "((8 / 4) / 2)");
    assert_eq!(parse_expr("1 - 2 + 3").to_string(), "((1 - 2) + 3)");
}

#[test]
fn test_cons_right_associative_over_add() {
    assert_eq!(
        parse_expr("1 + 2 :: 3 :: Nil").to_string(),
        "((1 + 2) :: (3 :: Nil))"
    );
}

#[test]
fn test_parenthesized_expression() {
    assert_eq!(parse_expr("(1 + 2) * 3").to_string(), "((1 + 2) * 3)");
}

#[test]
fn test_method_calls_then_sign() {
    assert_eq!(parse_expr("-xs.head").to_string(), "(-(xs.head))");
    assert_eq!(
        parse_expr("xs.tail.isEmpty").to_string(),
        "((xs.tail).isEmpty)"
    );
}

#[test]
fn test_call_with_expression_arguments() {
    assert_eq!(
        parse_expr("f(1 + 2, g(xs), 3 :: Nil)").to_string(),
        "f((1 + 2), g(xs), (3 :: Nil))"
    );
}

#[test]
fn test_condition_operators() {
    let program = parse(
        "object P { def main(args : Array[String]) { \
            if (!x == 1 && y <= 2 || z) println(1); \
        } }",
    )
    .expect("parse failed");
    match &program.main.body[0] {
        Stmt::If { cond, .. } => {
            // ! wraps the comparison; && binds over ||
            assert_eq!(cond.to_string(), "(((!(x == 1)) && (y <= 2)) || z)");
        }
        other => panic!("expected if, got {:?}", other),
    }
}

// ============================================
// 4. Diagnostics
// ============================================

#[test]
fn test_expected_diagnostics() {
    let cases = [
        ("", "object expected"),
        ("object", "id expected"),
        ("object P", "{ expected"),
        ("object P {", "main expected"),
        ("object P { def", "id expected"),
        ("object P { def main", "( expected"),
        ("object P { def main(", "args expected"),
        ("object P { def main(args", ": expected"),
        ("object P { def main(args :", "Array expected"),
        ("object P { def main(args : Array", "[ expected"),
        ("object P { def main(args : Array[", "String expected"),
        ("object P { def main(args : Array[String", "] expected"),
        ("object P { def main(args : Array[String]", ") expected"),
        ("object P { def main(args : Array[String])", "{ expected"),
        ("object P { var x : = 1; }", "type expected"),
        ("object P { var x : Int 1; }", "= expected"),
        ("object P { var x : Int = y; }", "literal expected"),
        ("object P { var x : Int = 1 }", "; expected"),
        (
            "object P { def main(args : Array[String]) { x = xs. ; } }",
            "(head | tail | isEmpty) expected",
        ),
        (
            "object P { def main(args : Array[String]) { xs.head; } }",
            "= expected",
        ),
        (
            "object P { def main(args : Array[String]) { return 1; } }",
            "} expected",
        ),
    ];

    for (input, expected) in cases {
        let err = parse(input).expect_err(input);
        assert_eq!(err.to_string(), expected, "input {:?}", input);
    }
}

#[test]
fn test_diagnostic_caret_render() {
    let err = parse("object P { var x : Int = Nil }").expect_err("parse should fail");
    let rendered = err.render();
    let lines: Vec<_> = rendered.lines().collect();
    assert_eq!(lines[0], "object P { var x : Int = Nil }");
    // caret sits under the `}` where `;` was required
    let pos = lines[0].rfind('}').unwrap();
    assert_eq!(lines[1], format!("{}^", " ".repeat(pos)));
    assert_eq!(lines[2], format!("; expected at pos={}", pos));
}

#[test]
fn test_integer_out_of_range() {
    let err = parse("object P { var x : Int = 99999999999999999999; }")
        .expect_err("parse should fail");
    assert_eq!(err.to_string(), "integer literal out of range");
}

#[test]
fn test_unknown_character_is_fatal() {
    let err = parse("object P ? { }").expect_err("parse should fail");
    assert_eq!(err.to_string(), "{ expected");
}

// ============================================
// 5. Round-Trip
// ============================================

fn assert_round_trips(source: &str) {
    let program = parse(source).expect("parse failed");
    let printed = program.to_string();
    let reparsed = parse(&printed)
        .unwrap_or_else(|err| panic!("pretty output failed to parse: {}\n{}", err, printed));
    assert_eq!(program, reparsed, "pretty output:\n{}", printed);
}

#[test]
fn test_round_trip_minimal() {
    assert_round_trips("object P { def main(args : Array[String]) { println(1); } }");
}

#[test]
fn test_round_trip_full_program() {
    assert_round_trips(
        r#"
object Full {
    var total : Int = 0;
    var xs : List[Int] = Nil;

    def sum(ys : List[Int], acc : Int) : Int = {
        var n : Int = 0;
        while (!ys.isEmpty) {
            n = ys.head;
            acc = acc + n;
            ys = ys.tail;
        }
        return acc;
    }

    def pick(a : Int, b : Int) : Int = {
        if (a >= b) a = a - b; else b = b - a;
        return a + b;
    }

    def main(args : Array[String]) {
        var k : Int = 3;
        xs = 1 :: 2 :: 3 :: Nil;
        total = sum(xs, 0);
        if (total == 6 && k < 4 || xs.isEmpty) {
            println(total);
            println(-xs.head);
        } else {
            println(0 - total);
        }
        while (k > 0) { k = k - 1; println(k); }
        println((1 + 2) * k :: Nil);
    }
}
"#,
    );
}

#[test]
fn test_round_trip_nested_control_flow() {
    assert_round_trips(
        "object N { def main(args : Array[String]) { \
            if (1) { if (0) println(1); else println(2); } else { println(3); println(4); } \
        } }",
    );
}
