//! Built-in host functions installed into every default interpreter.

use std::io::{self, BufRead};

use chrono::Utc;
use log::debug;
use rand::Rng;

use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::value::Value;

pub fn install(interpreter: &mut Interpreter<'_>) {
    interpreter.define_native("clock", 0, clock);
    interpreter.define_native("randint", 2, randint);
    interpreter.define_native("input", 1, input);
}

/// Seconds since the Unix epoch, with sub-second precision.
fn clock<'a>(_: &mut Interpreter<'a>, _: &[Value<'a>]) -> Result<Value<'a>> {
    let now = Utc::now();
    let seconds = now.timestamp_micros() as f64 / 1_000_000.0;

    debug!("clock() -> {}", seconds);
    Ok(Value::Number(seconds))
}

/// Uniform integer in the inclusive range `[lo, hi]`.
fn randint<'a>(_: &mut Interpreter<'a>, args: &[Value<'a>]) -> Result<Value<'a>> {
    let (lo, hi) = match args {
        [Value::Number(lo), Value::Number(hi)] => (lo.ceil() as i64, hi.floor() as i64),
        _ => {
            return Err(LoxError::runtime(
                None,
                "Invalid arguments for randint(), expected (number, number).",
            ))
        }
    };

    if lo > hi {
        return Err(LoxError::runtime(
            None,
            format!("randint() range is empty: {} > {}.", lo, hi),
        ));
    }

    let n = rand::thread_rng().gen_range(lo..=hi);

    debug!("randint({}, {}) -> {}", lo, hi, n);
    Ok(Value::Number(n as f64))
}

/// Print `prompt`, then read one line from stdin without its line ending.
/// Yields `nil` at end of input.
fn input<'a>(interpreter: &mut Interpreter<'a>, args: &[Value<'a>]) -> Result<Value<'a>> {
    let prompt = match args {
        [Value::String(prompt)] => prompt,
        _ => {
            return Err(LoxError::runtime(
                None,
                "Invalid argument for input(), expected a string prompt.",
            ))
        }
    };

    let out = interpreter.output();
    write!(out, "{}", prompt)?;
    out.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(Value::Nil);
    }

    let trimmed = line.trim_end_matches(['\n', '\r']);
    Ok(Value::from(trimmed))
}
