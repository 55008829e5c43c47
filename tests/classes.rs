mod common;

use common::{output_lines, runtime_error};
use pretty_assertions::assert_eq;

#[test]
fn fields_methods_and_display() {
    let source = "class Point {\n\
                    init(x, y) { this.x = x; this.y = y; }\n\
                    sum() { return this.x + this.y; }\n\
                  }\n\
                  var p = Point(1, 2);\n\
                  print p.sum();\n\
                  p.x = 10;\n\
                  print p.sum();\n\
                  print p;\n\
                  print Point;";

    assert_eq!(
        output_lines(source),
        vec!["3", "12", "<instance Point>", "<class Point>"]
    );
}

#[test]
fn construction_checks_init_arity() {
    assert_eq!(
        runtime_error("class A { init(a) {} }\nA();"),
        "Expected 1 arguments but got 0.\n[line 2]"
    );
    assert_eq!(
        runtime_error("class B {}\nB(1);"),
        "Expected 0 arguments but got 1.\n[line 2]"
    );
}

#[test]
fn initializer_always_yields_the_instance() {
    let source = "class A {\n\
                    init() { this.v = 1; return; }\n\
                  }\n\
                  var a = A();\n\
                  print a.v;\n\
                  print a.init() == a;";

    assert_eq!(output_lines(source), vec!["1", "true"]);
}

#[test]
fn bound_methods_remember_their_receiver() {
    let source = "class Person {\n\
                    init(name) { this.name = name; }\n\
                    greet() { return \"hi \" + this.name; }\n\
                  }\n\
                  var greet = Person(\"ann\").greet;\n\
                  print greet();";

    assert_eq!(output_lines(source), vec!["hi ann"]);
}

#[test]
fn this_is_captured_by_nested_functions() {
    let source = "class Counter {\n\
                    init() { this.n = 0; }\n\
                    incrementer() {\n\
                      fun inc() { this.n = this.n + 1; return this.n; }\n\
                      return inc;\n\
                    }\n\
                  }\n\
                  var inc = Counter().incrementer();\n\
                  inc();\n\
                  print inc();";

    assert_eq!(output_lines(source), vec!["2"]);
}

#[test]
fn fields_shadow_methods() {
    let source = "class A { m() { return 1; } }\n\
                  var a = A();\n\
                  a.m = fun () { return 2; };\n\
                  print a.m();\n\
                  print A().m();";

    assert_eq!(output_lines(source), vec!["2", "1"]);
}

#[test]
fn getters_run_on_access() {
    let source = "class Circle {\n\
                    init(r) { this.r = r; }\n\
                    area { return 3 * this.r * this.r; }\n\
                  }\n\
                  print Circle(2).area;";

    assert_eq!(output_lines(source), vec!["12"]);
}

#[test]
fn static_methods_fields_and_getters() {
    let source = "class Math {\n\
                    class square(n) { return n * n; }\n\
                    class answer { return 42; }\n\
                  }\n\
                  print Math.square(3);\n\
                  print Math.answer;\n\
                  Math.count = 1;\n\
                  print Math.count;";

    assert_eq!(output_lines(source), vec!["9", "42", "1"]);
}

#[test]
fn static_methods_are_inherited() {
    let source = "class A { class make() { return \"A\"; } }\n\
                  class B < A {}\n\
                  print B.make();";

    assert_eq!(output_lines(source), vec!["A"]);
}

#[test]
fn super_in_instance_methods() {
    let source = "class A { greet() { return \"A\"; } }\n\
                  class B < A { greet() { return super.greet() + \"B\"; } }\n\
                  print B().greet();";

    assert_eq!(output_lines(source), vec!["AB"]);
}

#[test]
fn super_in_class_methods_uses_the_metaclass() {
    let source = "class A { class make() { return \"A\"; } }\n\
                  class B < A { class make() { return super.make() + \"B\"; } }\n\
                  print B.make();";

    assert_eq!(output_lines(source), vec!["AB"]);
}

#[test]
fn initializers_are_inherited() {
    let source = "class A { init(x) { this.x = x; } }\n\
                  class B < A {}\n\
                  print B(5).x;";

    assert_eq!(output_lines(source), vec!["5"]);
}

#[test]
fn superclass_must_be_a_class() {
    assert_eq!(
        runtime_error("var NotAClass = 1;\nclass A < NotAClass {}"),
        "Superclass must be a class.\n[line 2]"
    );
}

#[test]
fn property_errors() {
    assert_eq!(
        runtime_error("class A {}\nprint A().nope;"),
        "Undefined property 'nope'.\n[line 2]"
    );
    assert_eq!(
        runtime_error("var n = 1;\nprint n.x;"),
        "Only instances have properties.\n[line 2]"
    );
    assert_eq!(
        runtime_error("var n = 1;\nn.x = 2;"),
        "Only instances have fields.\n[line 2]"
    );
    assert_eq!(
        runtime_error("class A {}\nclass B < A { m() { return super.m(); } }\nB().m();"),
        "Undefined property 'm'.\n[line 2]"
    );
}

#[test]
fn traits_provide_methods_and_class_methods() {
    let source = "trait Greets { greet() { return \"hello \" + this.name(); } }\n\
                  trait Named { class kind() { return \"named\"; } }\n\
                  class Person {\n\
                    use Greets, Named;\n\
                    name() { return \"ann\"; }\n\
                  }\n\
                  print Person().greet();\n\
                  print Person.kind();\n\
                  print Greets;";

    assert_eq!(
        output_lines(source),
        vec!["hello ann", "named", "<trait Greets>"]
    );
}

#[test]
fn class_methods_override_trait_methods() {
    let source = "trait T { m() { return \"trait\"; } }\n\
                  class C { use T; m() { return \"class\"; } }\n\
                  print C().m();";

    assert_eq!(output_lines(source), vec!["class"]);
}

#[test]
fn traits_can_use_traits() {
    let source = "trait Hello { hello() { return \"hello\"; } }\n\
                  trait Both { use Hello; world() { return \"world\"; } }\n\
                  class C { use Both; }\n\
                  var c = C();\n\
                  print c.hello() + \" \" + c.world();";

    assert_eq!(output_lines(source), vec!["hello world"]);
}

#[test]
fn conflicting_traits_name_the_method() {
    let source = "trait A { foo() { return 1; } }\n\
                  trait B { foo() { return 2; } }\n\
                  class C { use A, B; }";

    assert_eq!(
        runtime_error(source),
        "A previously used trait already provides method 'foo'.\n[line 3]"
    );

    let source = "trait A { class foo() { return 1; } }\n\
                  trait B { class foo() { return 2; } }\n\
                  class C { use A, B; }";

    assert_eq!(
        runtime_error(source),
        "A previously used trait already provides class method 'foo'.\n[line 3]"
    );
}

#[test]
fn trait_method_conflicting_with_a_used_trait() {
    let source = "trait A { foo() { return 1; } }\n\
                  trait B { use A; foo() { return 2; } }";

    assert_eq!(
        runtime_error(source),
        "A previously used trait already provides method 'foo'.\n[line 2]"
    );
}

#[test]
fn only_traits_can_be_used() {
    assert_eq!(
        runtime_error("class K {}\nclass C { use K; }"),
        "'K' is not a trait.\n[line 2]"
    );
}
