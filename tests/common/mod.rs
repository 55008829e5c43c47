#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rox as lox;

use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;

/// `Write` sink whose contents stay readable after the interpreter that
/// owns a clone of it is gone.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Everything observable from one run of a program.
#[derive(Debug)]
pub struct Run {
    pub output: String,
    pub static_errors: Vec<String>,
    pub runtime_error: Option<String>,
}

impl Run {
    pub fn lines(&self) -> Vec<&str> {
        self.output.lines().collect()
    }
}

/// Scan, parse, resolve and interpret `source` the way `rox run` does.
pub fn run(source: &str) -> Run {
    run_with(source, |_| {})
}

/// Like [`run`], with a hook to customise the interpreter first.
pub fn run_with<F>(source: &str, setup: F) -> Run
where
    F: FnOnce(&mut Interpreter<'_>),
{
    let (tokens, lex_errors) = Scanner::new(source.as_bytes()).scan_all();

    let mut parser = Parser::new(&tokens);
    let statements = parser.parse();

    let mut static_errors: Vec<String> = lex_errors
        .iter()
        .chain(parser.errors())
        .map(ToString::to_string)
        .collect();

    let buffer = SharedBuffer::default();
    let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
    setup(&mut interpreter);

    let mut runtime_error = None;

    if static_errors.is_empty() {
        match Resolver::new(&mut interpreter).resolve(&statements) {
            Ok(()) => {
                if let Err(e) = interpreter.interpret(&statements) {
                    runtime_error = Some(e.to_string());
                }
            }
            Err(errors) => static_errors.extend(errors.iter().map(ToString::to_string)),
        }
    }

    Run {
        output: buffer.contents(),
        static_errors,
        runtime_error,
    }
}

/// Output lines of a program that must run cleanly.
pub fn output_lines(source: &str) -> Vec<String> {
    let run = run(source);

    assert!(
        run.static_errors.is_empty(),
        "unexpected static errors: {:#?}",
        run.static_errors
    );
    assert!(
        run.runtime_error.is_none(),
        "unexpected runtime error: {:?}",
        run.runtime_error
    );

    run.lines().into_iter().map(str::to_string).collect()
}

/// The runtime error message of a program that must fail at runtime.
pub fn runtime_error(source: &str) -> String {
    let run = run(source);

    assert!(
        run.static_errors.is_empty(),
        "unexpected static errors: {:#?}",
        run.static_errors
    );

    run.runtime_error
        .unwrap_or_else(|| panic!("expected a runtime error, output was {:?}", run.output))
}

/// Static errors of a program that must not reach execution.
pub fn static_errors(source: &str) -> Vec<String> {
    let run = run(source);

    assert!(
        !run.static_errors.is_empty(),
        "expected static errors, output was {:?}",
        run.output
    );

    run.static_errors
}
