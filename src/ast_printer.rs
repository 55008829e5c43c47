use crate::ast::{ClassBody, ControlFlow, Expr, FunctionDecl, LiteralValue, Stmt};

/// Renders expressions and statements in parenthesised prefix form, e.g.
/// `(+ 1.0 (group (* 2.0 3.0)))`.  Used by the `parse` subcommand.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr<'_>) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => s.clone(),

                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        // 3 → 3.0
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }
            },

            Expr::Grouping(inner) => format!("(group {})", Self::print(inner)),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => format!(
                "(?: {} {} {})",
                Self::print(condition),
                Self::print(then_branch),
                Self::print(else_branch)
            ),

            Expr::Variable { name, .. } => name.lexeme.into(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::Function { decl, .. } => Self::function("fun", decl),

            Expr::Get { object, name } => format!("(. {} {})", Self::print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(= (. {} {}) {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),

            Expr::This { .. } => "this".into(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),
        }
    }

    pub fn print_stmt(stmt: &Stmt<'_>) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", Self::print(expr)),

            Stmt::Print(expr) => format!("(print {})", Self::print(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(expr) => format!("(var {} {})", name.lexeme, Self::print(expr)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => Self::block(statements),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch),
                    Self::print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                Self::print(condition),
                Self::print_stmt(body)
            ),

            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => format!(
                "(for {} {} {} {})",
                initializer
                    .as_deref()
                    .map_or_else(|| "nil".to_string(), Self::print_stmt),
                condition
                    .as_ref()
                    .map_or_else(|| "nil".to_string(), Self::print),
                increment
                    .as_ref()
                    .map_or_else(|| "nil".to_string(), Self::print),
                Self::print_stmt(body)
            ),

            Stmt::ControlFlow { kind, .. } => match kind {
                ControlFlow::Break => "(break)".into(),
                ControlFlow::Continue => "(continue)".into(),
            },

            Stmt::Function(decl) => Self::function("fun", decl),

            Stmt::Return { value, .. } => match value {
                Some(expr) => format!("(return {})", Self::print(expr)),
                None => "(return)".into(),
            },

            Stmt::Class {
                name,
                superclass,
                body,
            } => {
                let head = match superclass {
                    Some(superclass) => format!("class {} < {}", name.lexeme, Self::print(superclass)),
                    None => format!("class {}", name.lexeme),
                };
                Self::members(&head, body)
            }

            Stmt::Trait { name, body } => Self::members(&format!("trait {}", name.lexeme), body),
        }
    }

    fn block(statements: &[Stmt<'_>]) -> String {
        let mut s = String::from("(block");
        for stmt in statements {
            s.push(' ');
            s.push_str(&Self::print_stmt(stmt));
        }
        s.push(')');
        s
    }

    fn function(keyword: &str, decl: &FunctionDecl<'_>) -> String {
        let mut s = format!("({}", keyword);
        if let Some(name) = decl.name {
            s.push(' ');
            s.push_str(name.lexeme);
        }
        if !decl.is_getter {
            let params: Vec<&str> = decl.params.iter().map(|p| p.lexeme).collect();
            s.push_str(&format!(" ({})", params.join(" ")));
        }
        s.push(' ');
        s.push_str(&Self::block(&decl.body));
        s.push(')');
        s
    }

    fn members(head: &str, body: &ClassBody<'_>) -> String {
        let mut s = format!("({}", head);
        for used in &body.traits {
            s.push_str(&format!(" (use {})", Self::print(used)));
        }
        for method in &body.class_methods {
            s.push(' ');
            s.push_str(&Self::function("class", method));
        }
        for method in &body.methods {
            s.push(' ');
            s.push_str(&Self::function("method", method));
        }
        s.push(')');
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;
    use pretty_assertions::assert_eq;

    fn print_program(src: &str) -> Vec<String> {
        let (tokens, errors) = Scanner::new(src.as_bytes()).scan_all();
        assert!(errors.is_empty(), "{:?}", errors);

        let mut parser = Parser::new(&tokens);
        let statements = parser.parse();
        assert!(!parser.had_error(), "{:?}", parser.errors());

        statements.iter().map(AstPrinter::print_stmt).collect()
    }

    #[test]
    fn expressions_follow_precedence() {
        assert_eq!(
            print_program("print -1 + 2 * (3 - 4);"),
            vec!["(print (+ (- 1.0) (* 2.0 (group (- 3.0 4.0)))))"]
        );
    }

    #[test]
    fn comma_and_conditional() {
        assert_eq!(
            print_program("a = 1, b ? c : d ? e : f;"),
            vec!["(; (, (= a 1.0) (?: b c (?: d e f))))"]
        );
    }

    #[test]
    fn class_with_getter_and_static_method() {
        assert_eq!(
            print_program("class A < B { use T; class make() { return A(); } area { return 1; } }"),
            vec![
                "(class A < B (use T) (class make () (block (return (call A)))) \
                 (method area (block (return 1.0))))"
            ]
        );
    }
}
