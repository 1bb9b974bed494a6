//! The interactive prompt.
//!
//! Lines accumulate until they form a complete chunk, so multi-line
//! functions and loops type naturally. Expressions are wrapped in `return`
//! first so their value prints without an explicit `print` call.

use anyhow::Result;
use mlua::{Lua, MultiValue, Value};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = "> ";
const CONTINUATION: &str = ">> ";

pub fn run(lua: &Lua) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { PROMPT } else { CONTINUATION };
        match editor.readline(prompt) {
            Ok(line) => {
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                match eval(lua, &buffer) {
                    Ok(values) => {
                        let _ = editor.add_history_entry(&buffer);
                        buffer.clear();
                        let rendered = render(&values);
                        if !rendered.is_empty() {
                            println!("{rendered}");
                        }
                    }
                    Err(mlua::Error::SyntaxError {
                        incomplete_input: true,
                        ..
                    }) => {}
                    Err(e) => {
                        let _ = editor.add_history_entry(&buffer);
                        buffer.clear();
                        eprintln!("{e}");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                if buffer.is_empty() {
                    break;
                }
                buffer.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Evaluate a chunk, preferring to treat it as an expression.
fn eval<'lua>(lua: &'lua Lua, src: &str) -> mlua::Result<MultiValue<'lua>> {
    let as_expression = lua
        .load(format!("return {src}"))
        .set_name("repl")
        .eval::<MultiValue>();
    match as_expression {
        Err(mlua::Error::SyntaxError { .. }) => {
            lua.load(src).set_name("repl").eval::<MultiValue>()
        }
        other => other,
    }
}

fn render(values: &MultiValue) -> String {
    values
        .iter()
        .filter(|v| !matches!(v, Value::Nil))
        .map(|v| match serde_json::to_string_pretty(v) {
            Ok(json) => json,
            Err(_) => format!("{v:?}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions_render_without_return() {
        let lua = Lua::new();
        let values = eval(&lua, "1 + 2").unwrap();
        assert_eq!(render(&values), "3");
    }

    #[test]
    fn statements_still_execute() {
        let lua = Lua::new();
        eval(&lua, "x = 21 * 2").unwrap();
        let values = eval(&lua, "x").unwrap();
        assert_eq!(render(&values), "42");
    }

    #[test]
    fn incomplete_chunks_ask_for_more() {
        let lua = Lua::new();
        match eval(&lua, "function f()") {
            Err(mlua::Error::SyntaxError {
                incomplete_input, ..
            }) => assert!(incomplete_input),
            other => panic!("expected a syntax error, got {other:?}"),
        };
    }

    #[test]
    fn nil_results_render_empty() {
        let lua = Lua::new();
        let values = eval(&lua, "nil").unwrap();
        assert_eq!(render(&values), "");
    }
}
