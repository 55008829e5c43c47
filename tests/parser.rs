use rox as lox;

use lox::ast::{Expr, Stmt};
use lox::ast_printer::AstPrinter;
use lox::parser::Parser;
use lox::scanner::Scanner;
use lox::token::Token;
use pretty_assertions::assert_eq;

fn tokens(source: &str) -> Vec<Token<'_>> {
    let (tokens, errors) = Scanner::new(source.as_bytes()).scan_all();
    assert!(errors.is_empty(), "{:?}", errors);
    tokens
}

/// Printed statements and error messages.
fn parse(source: &str) -> (Vec<String>, Vec<String>) {
    let tokens = tokens(source);
    let mut parser = Parser::new(&tokens);
    let statements = parser.parse();

    (
        statements.iter().map(AstPrinter::print_stmt).collect(),
        parser.errors().iter().map(ToString::to_string).collect(),
    )
}

#[test]
fn binary_precedence_and_associativity() {
    let (printed, errors) = parse("print 1 + 2 * 3 - 4 / 2;");

    assert!(errors.is_empty());
    assert_eq!(printed, vec!["(print (- (+ 1.0 (* 2.0 3.0)) (/ 4.0 2.0)))"]);
}

#[test]
fn logical_and_equality() {
    let (printed, _) = parse("print a or b and !c == d;");

    assert_eq!(printed, vec!["(print (or a (and b (== (! c) d))))"]);
}

#[test]
fn assignment_is_right_associative() {
    let (printed, _) = parse("a = b = c; obj.field = 1;");

    assert_eq!(printed, vec!["(; (= a (= b c)))", "(; (= (. obj field) 1.0))"]);
}

#[test]
fn call_arguments_are_not_comma_expressions() {
    let (printed, _) = parse("f(1, (2, 3));");

    assert_eq!(printed, vec!["(; (call f 1.0 (group (, 2.0 3.0))))"]);
}

#[test]
fn conditional_nests_to_the_right() {
    let (printed, _) = parse("print a ? b : c ? d : e;");

    assert_eq!(printed, vec!["(print (?: a b (?: c d e)))"]);
}

#[test]
fn for_loop_keeps_its_clauses() {
    let (printed, errors) = parse("for (var i = 0; i < 3; i = i + 1) print i;");

    assert!(errors.is_empty());
    assert_eq!(
        printed,
        vec!["(for (var i 0.0) (< i 3.0) (= i (+ i 1.0)) (print i))"]
    );
}

#[test]
fn anonymous_function_expression() {
    let (printed, errors) = parse("var f = fun (a, b) { return a; };");

    assert!(errors.is_empty());
    assert_eq!(printed, vec!["(var f (fun (a b) (block (return a))))"]);
}

#[test]
fn recovers_and_reports_every_bad_declaration() {
    let (printed, errors) = parse("var = 1;\nprint 2;\nvar b 3;\nprint 4;");

    assert_eq!(printed, vec!["(print 2.0)", "(print 4.0)"]);
    assert_eq!(
        errors,
        vec![
            "[line 1] Error at '=': Expected variable name.",
            "[line 3] Error at '3': Expected ';' after variable declaration.",
        ]
    );
}

#[test]
fn error_at_end_of_input() {
    let (_, errors) = parse("print 1");

    assert_eq!(errors, vec!["[line 1] Error at end: Expected ';' after value."]);
}

#[test]
fn invalid_assignment_target_is_reported_without_aborting() {
    let (printed, errors) = parse("1 = 2;\nprint 3;");

    assert_eq!(printed, vec!["(; 1.0)", "(print 3.0)"]);
    assert_eq!(errors, vec!["[line 1] Error at '=': Invalid assignment target."]);
}

#[test]
fn binary_operator_missing_left_operand() {
    let (_, errors) = parse("print + 1;\nprint == 2;");

    assert_eq!(
        errors,
        vec![
            "[line 1] Error at '+': Expected expression before operator.",
            "[line 2] Error at '==': Expected expression before operator.",
        ]
    );
}

#[test]
fn break_and_continue_need_an_enclosing_loop() {
    let (_, errors) = parse("break;\nwhile (true) { fun f() { continue; } }");

    assert_eq!(
        errors,
        vec![
            "[line 1] Error at 'break': Can't use 'break' outside of a loop.",
            "[line 2] Error at 'continue': Can't use 'continue' outside of a loop.",
        ]
    );

    let (_, errors) = parse("while (true) { if (true) break; else continue; }");
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn too_many_arguments_is_reported() {
    let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let source = format!("f({});", args.join(", "));

    let (printed, errors) = parse(&source);

    assert_eq!(printed.len(), 1);
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0].ends_with("Can't have more than 255 arguments."),
        "{}",
        errors[0]
    );
}

#[test]
fn class_members_getters_and_traits() {
    let source = "class Circle < Shape {\n\
                    use Printable, Comparable;\n\
                    init(r) { this.r = r; }\n\
                    area { return 3 * this.r * this.r; }\n\
                    class unit() { return Circle(1); }\n\
                  }";
    let tokens = tokens(source);
    let mut parser = Parser::new(&tokens);
    let statements = parser.parse();

    assert!(!parser.had_error(), "{:?}", parser.errors());

    let Stmt::Class {
        name,
        superclass,
        body,
    } = &statements[0]
    else {
        panic!("expected a class, got {:?}", statements[0]);
    };

    assert_eq!(name.lexeme, "Circle");
    assert!(matches!(superclass, Some(Expr::Variable { name, .. }) if name.lexeme == "Shape"));
    assert_eq!(body.traits.len(), 2);

    let methods: Vec<(&str, usize, bool)> = body
        .methods
        .iter()
        .map(|m| (m.name.map_or("", |t| t.lexeme), m.params.len(), m.is_getter))
        .collect();
    assert_eq!(methods, vec![("init", 1, false), ("area", 0, true)]);

    assert_eq!(body.class_methods.len(), 1);
    assert!(!body.class_methods[0].is_getter);
}

#[test]
fn trait_declaration() {
    let (printed, errors) = parse("trait T { use U; hello() { print 1; } }");

    assert!(errors.is_empty());
    assert_eq!(
        printed,
        vec!["(trait T (use U) (method hello () (block (print 1.0))))"]
    );
}

#[test]
fn every_name_expression_gets_its_own_id() {
    let tokens = tokens("a; a;");
    let mut parser = Parser::new(&tokens);
    let statements = parser.parse();

    let ids: Vec<_> = statements
        .iter()
        .map(|stmt| match stmt {
            Stmt::Expression(Expr::Variable { id, .. }) => *id,
            other => panic!("unexpected {:?}", other),
        })
        .collect();

    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[test]
fn single_expression_for_the_repl() {
    let tokens = tokens("1 + 2");
    let mut parser = Parser::new(&tokens);

    let expr = parser.parse_expression().expect("expression");
    assert_eq!(AstPrinter::print(&expr), "(+ 1.0 2.0)");
    assert!(!parser.had_error());
}
