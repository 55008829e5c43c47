mod common;

use rox as lox;

use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use pretty_assertions::assert_eq;

/// Messages (without locations) reported by the resolver for `source`.
fn resolve_messages(source: &str) -> Vec<String> {
    let (tokens, _) = Scanner::new(source.as_bytes()).scan_all();
    let mut parser = Parser::new(&tokens);
    let statements = parser.parse();
    assert!(!parser.had_error(), "{:?}", parser.errors());

    let mut interpreter = Interpreter::new();
    match Resolver::new(&mut interpreter).resolve(&statements) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(|e| e.message()).collect(),
    }
}

#[test]
fn local_read_in_own_initializer() {
    assert_eq!(
        resolve_messages("{ var a = a; }"),
        vec!["Can't read local variable in its own initializer."]
    );
}

#[test]
fn global_read_in_own_initializer_is_a_runtime_matter() {
    assert_eq!(
        common::runtime_error("var a = a;"),
        "Undefined variable 'a'.\n[line 1]"
    );
}

#[test]
fn duplicate_local_declaration() {
    assert_eq!(
        common::static_errors("{\n  var a = 1;\n  var a = 2;\n  print a;\n}"),
        vec!["[line 3] Error at 'a': Already a variable with this name in this scope."]
    );
}

#[test]
fn duplicate_global_declaration_is_legal() {
    assert_eq!(common::output_lines("var a = 1; var a = 2; print a;"), vec!["2"]);
}

#[test]
fn return_outside_function() {
    assert_eq!(
        common::static_errors("return 1;"),
        vec!["[line 1] Error at 'return': Can't return from top-level code."]
    );
}

#[test]
fn initializer_cannot_return_a_value() {
    assert_eq!(
        resolve_messages("class A { init() { return 1; } }"),
        vec!["Can't return a value from an initializer."]
    );
    assert!(resolve_messages("class A { init() { return; } }").is_empty());
}

#[test]
fn this_outside_class() {
    assert_eq!(
        resolve_messages("print this;\nfun f() { return this; }"),
        vec![
            "Can't use 'this' outside of a class.",
            "Can't use 'this' outside of a class.",
        ]
    );
}

#[test]
fn super_misuse() {
    assert_eq!(
        resolve_messages("print super.x;"),
        vec!["Can't use 'super' outside of a class."]
    );
    assert_eq!(
        resolve_messages("class A { m() { return super.m(); } }"),
        vec!["Can't use 'super' in a class with no superclass."]
    );
}

#[test]
fn class_inheriting_from_itself() {
    assert_eq!(
        resolve_messages("class A < A {}"),
        vec!["A class can't inherit from itself."]
    );
}

#[test]
fn unused_locals_are_errors() {
    assert_eq!(
        common::static_errors("{\n  var unused = 1;\n}"),
        vec!["[line 2] Error at 'unused': Local variable 'unused' is never used."]
    );

    // assignment is not a use
    assert_eq!(
        resolve_messages("{ var a; a = 1; }"),
        vec!["Local variable 'a' is never used."]
    );

    // local functions and classes count too, reported in line order
    assert_eq!(
        resolve_messages("fun outer() {\n  class Unused {}\n  fun helper() {}\n}\nouter();"),
        vec![
            "Local variable 'Unused' is never used.",
            "Local variable 'helper' is never used.",
        ]
    );
}

#[test]
fn parameters_and_implicit_bindings_are_exempt() {
    let source = "fun ignore(a, b) { return 1; }\n\
                  class A { m() { return 1; } }\n\
                  class B < A { m() { return 2; } }\n\
                  print ignore(1, 2);";

    assert!(resolve_messages(source).is_empty());
}

#[test]
fn all_errors_are_reported_in_one_pass() {
    assert_eq!(
        resolve_messages("{ var a = 1; var a = 2; }\nreturn 3;\nprint this;"),
        vec![
            "Already a variable with this name in this scope.",
            "Local variable 'a' is never used.",
            "Can't return from top-level code.",
            "Can't use 'this' outside of a class.",
        ]
    );
}

#[test]
fn closures_bind_to_the_declaration_in_scope() {
    let source = "var a = \"global\";\n\
                  {\n\
                    fun show() { print a; }\n\
                    show();\n\
                    var a = \"local\";\n\
                    show();\n\
                    print a;\n\
                  }";

    assert_eq!(
        common::output_lines(source),
        vec!["global", "global", "local"]
    );
}

#[test]
fn resolution_table_spans_separate_programs() {
    let first = "var counter = 0;";
    let second = "{ var step = 2; counter = counter + step; } print counter;";

    let (first_tokens, _) = Scanner::new(first.as_bytes()).scan_all();
    let (second_tokens, _) = Scanner::new(second.as_bytes()).scan_all();
    let first_statements = Parser::new(&first_tokens).parse();
    let second_statements = Parser::new(&second_tokens).parse();

    let buffer = common::SharedBuffer::default();
    let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));

    for statements in [&first_statements, &second_statements] {
        Resolver::new(&mut interpreter)
            .resolve(statements)
            .expect("resolves");
        interpreter.interpret(statements).expect("runs");
    }

    assert_eq!(buffer.contents(), "2\n");
}
