//! Bounded agentic tool loop.
//!
//! The loop drives an adapter through a tool-use conversation with explicit
//! termination semantics: every iteration issues exactly one adapter
//! invocation, and the loop ends when a response carries no tool directive or
//! when the iteration cap is reached. Total outbound calls are therefore
//! bounded by `max_iterations`.
//!
//! Tool directives use a fixed single-line convention: the model requests a
//! tool by emitting a line of the form `TOOL:<name>:<input>`; the tool's
//! result is appended to the transcript and the loop continues.

use std::time::Instant;

use crate::adapter::Adapter;
use crate::input::Input;

/// Description of a tool offered to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    /// Tool name used in directives
    pub name: String,
    /// One-line description included in the prompt
    pub description: String,
}

/// A callable tool.
///
/// Tool failures are returned as text (an `Error: ...` string) rather than
/// aborting the loop; the model sees the failure and may retry or answer
/// without the tool.
pub trait Tool: Send + Sync {
    /// Tool metadata
    fn spec(&self) -> ToolSpec;

    /// Run the tool on one input line
    fn call(&self, input: &str) -> String;
}

/// Calculator tool: evaluates arithmetic expressions (`+ - * / ** ( )`)
pub struct Calculator;

impl Tool for Calculator {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "calculator".to_string(),
            description: "Calculator for math operations. Input: mathematical expression."
                .to_string(),
        }
    }

    fn call(&self, input: &str) -> String {
        match eval_expression(input) {
            Ok(value) => format_number(value),
            Err(message) => format!("Error: {message}"),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Evaluate an arithmetic expression.
///
/// Supports `+ - * /`, exponentiation `**` (right-associative), unary minus,
/// and parentheses over f64 values.
///
/// # Errors
/// Returns a message describing the first syntax or arithmetic problem.
pub fn eval_expression(input: &str) -> Result<f64, String> {
    let mut parser = ExprParser {
        src: input.as_bytes(),
        pos: 0,
    };
    let value = parser.expr()?;
    parser.skip_ws();
    if parser.pos < parser.src.len() {
        return Err(format!("unexpected input at position {}", parser.pos));
    }
    Ok(value)
}

struct ExprParser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl ExprParser<'_> {
    fn skip_ws(&mut self) {
        while self.src.get(self.pos) == Some(&b' ') {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                b'+' => {
                    self.pos += 1;
                    value += self.term()?;
                }
                b'-' => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // term := power (('*' | '/') power)*   ('**' belongs to power)
    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.power()?;
        while let Some(op) = self.peek() {
            match op {
                b'*' if self.src.get(self.pos + 1) != Some(&b'*') => {
                    self.pos += 1;
                    value *= self.power()?;
                }
                b'/' => {
                    self.pos += 1;
                    let divisor = self.power()?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // power := unary ('**' power)?   (right-associative)
    fn power(&mut self) -> Result<f64, String> {
        let base = self.unary()?;
        if self.peek() == Some(b'*') && self.src.get(self.pos + 1) == Some(&b'*') {
            self.pos += 2;
            let exponent = self.power()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<f64, String> {
        if self.peek() == Some(b'-') {
            self.pos += 1;
            return Ok(-self.unary()?);
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let value = self.expr()?;
                if self.peek() != Some(b')') {
                    return Err(format!("expected ')' at position {}", self.pos));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            Some(c) => Err(format!("unexpected character '{}'", char::from(c))),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn number(&mut self) -> Result<f64, String> {
        let start = self.pos;
        while let Some(&c) = self.src.get(self.pos) {
            if c.is_ascii_digit() || c == b'.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| "invalid number".to_string())?;
        text.parse::<f64>()
            .map_err(|_| format!("invalid number '{text}'"))
    }
}

/// Outcome of one agent-loop run
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutcome {
    /// Final response text (the last response when the cap was hit)
    pub final_text: String,
    /// Iterations executed (equals outbound calls issued)
    pub iterations: usize,
    /// Tool calls performed
    pub tool_calls: usize,
    /// Total wall-clock seconds across the whole loop
    pub total_secs: f64,
    /// Whether the loop stopped at the iteration cap
    pub hit_cap: bool,
    /// Whether an invocation failed (the loop stops on the first failure)
    pub failed: bool,
}

/// Driver for a bounded tool-use conversation over one adapter
pub struct AgentLoop<'a> {
    adapter: &'a dyn Adapter,
    tools: Vec<Box<dyn Tool>>,
    max_iterations: usize,
}

impl<'a> AgentLoop<'a> {
    /// Create a loop over the adapter with an explicit iteration cap.
    ///
    /// A cap of 0 is treated as 1.
    #[must_use]
    pub fn new(adapter: &'a dyn Adapter, tools: Vec<Box<dyn Tool>>, max_iterations: usize) -> Self {
        Self {
            adapter,
            tools,
            max_iterations: max_iterations.max(1),
        }
    }

    fn instructions(&self, task: &str) -> String {
        let mut prompt = String::from(
            "You're a financial advisor. Use tools when needed. Be concise.\n\nTools:\n",
        );
        for tool in &self.tools {
            let spec = tool.spec();
            prompt.push_str(&format!("- {}: {}\n", spec.name, spec.description));
        }
        prompt.push_str(
            "\nTo call a tool, reply with a single line: TOOL:<name>:<input>\n\
             Otherwise, answer the question directly.\n\nQuestion: ",
        );
        prompt.push_str(task);
        prompt
    }

    fn find_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|tool| tool.spec().name == name)
            .map(AsRef::as_ref)
    }

    /// Run the loop on one task.
    ///
    /// Terminates when a response carries no tool directive, when an
    /// invocation fails, or after `max_iterations` iterations — whichever
    /// comes first.
    #[must_use]
    pub fn run(&self, task: &str) -> AgentOutcome {
        let started = Instant::now();
        let mut transcript = self.instructions(task);
        let mut tool_calls = 0;
        let mut last_text = String::new();

        for iteration in 1..=self.max_iterations {
            let invocation = self.adapter.invoke(&Input::Text(transcript.clone()));

            let Some(text) = invocation.text().map(str::to_string) else {
                return AgentOutcome {
                    final_text: last_text,
                    iterations: iteration,
                    tool_calls,
                    total_secs: started.elapsed().as_secs_f64(),
                    hit_cap: false,
                    failed: true,
                };
            };
            last_text = text.clone();

            let Some((tool_name, tool_input)) = parse_tool_directive(&text) else {
                // No directive: this is the final answer
                return AgentOutcome {
                    final_text: text,
                    iterations: iteration,
                    tool_calls,
                    total_secs: started.elapsed().as_secs_f64(),
                    hit_cap: false,
                    failed: false,
                };
            };

            let result = match self.find_tool(&tool_name) {
                Some(tool) => {
                    tool_calls += 1;
                    tool.call(&tool_input)
                }
                None => format!("Error: unknown tool '{tool_name}'"),
            };

            transcript.push_str(&format!(
                "\n\nTOOL RESULT ({tool_name}): {result}\nContinue."
            ));
        }

        AgentOutcome {
            final_text: last_text,
            iterations: self.max_iterations,
            tool_calls,
            total_secs: started.elapsed().as_secs_f64(),
            hit_cap: true,
            failed: false,
        }
    }
}

/// Extract the first `TOOL:<name>:<input>` directive line, if any
#[must_use]
pub fn parse_tool_directive(text: &str) -> Option<(String, String)> {
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("TOOL:") {
            // A malformed directive line must not hide a later well-formed one
            let Some((name, input)) = rest.split_once(':') else {
                continue;
            };
            return Some((name.trim().to_string(), input.trim().to_string()));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{ErrorKind, MockAdapter, MockStep};
    use crate::config::ProfileConfig;

    #[test]
    fn test_calculator_basic_operations() {
        let calc = Calculator;
        assert_eq!(calc.call("5 + 10 * 2"), "25");
        assert_eq!(calc.call("(5 + 10) * 2"), "30");
        assert_eq!(calc.call("500000 * 0.045 / 12"), "1875");
        assert_eq!(calc.call("-3 + 1"), "-2");
    }

    #[test]
    fn test_calculator_exponentiation() {
        assert_eq!(eval_expression("2 ** 10").expect("eval"), 1024.0);
        // Right-associative: 2 ** (3 ** 2) = 512
        assert_eq!(eval_expression("2 ** 3 ** 2").expect("eval"), 512.0);

        let compound = eval_expression("1000 * (1 + 0.05) ** 30").expect("eval");
        assert!((compound - 4321.942_375).abs() < 1e-3);
    }

    #[test]
    fn test_calculator_errors_as_text() {
        let calc = Calculator;
        assert!(calc.call("1 / 0").starts_with("Error:"));
        assert!(calc.call("2 +").starts_with("Error:"));
        assert!(calc.call("hello").starts_with("Error:"));
        assert!(calc.call("(1 + 2").starts_with("Error:"));
    }

    #[test]
    fn test_parse_tool_directive() {
        assert_eq!(
            parse_tool_directive("TOOL:calculator:1 + 2"),
            Some(("calculator".to_string(), "1 + 2".to_string()))
        );
        assert_eq!(
            parse_tool_directive("Let me compute that.\nTOOL:calculator: 3*4 "),
            Some(("calculator".to_string(), "3*4".to_string()))
        );
        assert_eq!(parse_tool_directive("The answer is 42."), None);
    }

    #[test]
    fn test_malformed_directive_does_not_hide_later_one() {
        assert_eq!(parse_tool_directive("TOOL:calculator"), None);
        assert_eq!(
            parse_tool_directive("TOOL:calculator\nTOOL:calculator:1 + 2"),
            Some(("calculator".to_string(), "1 + 2".to_string()))
        );
    }

    #[test]
    fn test_loop_ends_on_direct_answer() {
        let adapter = MockAdapter::new(
            ProfileConfig::standard(),
            vec![MockStep::ok_with_text(0.5, "The answer is 42.")],
        );
        let agent = AgentLoop::new(&adapter, vec![Box::new(Calculator)], 5);

        let outcome = agent.run("What is the answer?");
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.tool_calls, 0);
        assert!(!outcome.hit_cap);
        assert!(!outcome.failed);
        assert_eq!(outcome.final_text, "The answer is 42.");
    }

    #[test]
    fn test_loop_runs_tool_then_answers() {
        let adapter = MockAdapter::new(
            ProfileConfig::standard(),
            vec![
                MockStep::ok_with_text(0.5, "TOOL:calculator:10000 * (1 + 0.005) ** 240"),
                MockStep::ok_with_text(0.5, "You would have about $33,102."),
            ],
        );
        let agent = AgentLoop::new(&adapter, vec![Box::new(Calculator)], 5);

        let outcome = agent.run("Compound interest after 20 years?");
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.tool_calls, 1);
        assert!(!outcome.hit_cap);
        assert_eq!(outcome.final_text, "You would have about $33,102.");
    }

    #[test]
    fn test_loop_terminates_at_cap() {
        // Model that always asks for the tool never escapes the cap
        let adapter = MockAdapter::new(
            ProfileConfig::standard(),
            vec![MockStep::ok_with_text(0.1, "TOOL:calculator:1+1")],
        );
        let agent = AgentLoop::new(&adapter, vec![Box::new(Calculator)], 3);

        let outcome = agent.run("Loop forever");
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.tool_calls, 3);
        assert!(outcome.hit_cap);
    }

    #[test]
    fn test_loop_stops_on_invocation_failure() {
        let adapter = MockAdapter::new(
            ProfileConfig::standard(),
            vec![
                MockStep::ok_with_text(0.5, "TOOL:calculator:1+1"),
                MockStep::failed(60.0, ErrorKind::ReadTimeout),
            ],
        );
        let agent = AgentLoop::new(&adapter, vec![Box::new(Calculator)], 5);

        let outcome = agent.run("task");
        assert_eq!(outcome.iterations, 2);
        assert!(outcome.failed);
        assert!(!outcome.hit_cap);
    }

    #[test]
    fn test_unknown_tool_reported_to_model() {
        let adapter = MockAdapter::new(
            ProfileConfig::standard(),
            vec![
                MockStep::ok_with_text(0.1, "TOOL:websearch:rust"),
                MockStep::ok_with_text(0.1, "I cannot search the web."),
            ],
        );
        let agent = AgentLoop::new(&adapter, vec![Box::new(Calculator)], 5);

        let outcome = agent.run("task");
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.tool_calls, 0);
        assert_eq!(outcome.final_text, "I cannot search the web.");
    }
}
