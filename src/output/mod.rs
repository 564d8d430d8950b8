//! Rendering of search results for the command line.

use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::io::{IsTerminal, Write};

use crate::config::OutputFormat;
use crate::error::{Error, Result};
use crate::types::MatchResult;

/// Styles one span of human output.
type Style = fn(&str) -> ColoredString;

#[derive(Serialize)]
struct JsonResults<'a> {
    symbol: &'a str,
    count: usize,
    results: &'a [MatchResult],
}

#[derive(Serialize)]
struct JsonError<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<&'a str>,
}

/// Writes results and errors in one concrete format.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    format: OutputFormat,
    color: bool,
}

impl Formatter {
    /// Resolve `Auto` and colour against the real stdout.
    ///
    /// Also sets `colored`'s global override to the resolved choice.
    pub fn new(format: OutputFormat, color: Option<bool>) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        let color = if no_color_env { Some(false) } else { color };
        let formatter = Self::for_terminal(format, color, std::io::stdout().is_terminal());
        colored::control::set_override(formatter.color);
        formatter
    }

    /// Resolve `Auto` and colour as if stdout were (or were not) a terminal.
    pub fn for_terminal(format: OutputFormat, color: Option<bool>, is_terminal: bool) -> Self {
        let format = match format {
            OutputFormat::Auto if is_terminal => OutputFormat::Human,
            OutputFormat::Auto => OutputFormat::Plain,
            other => other,
        };
        let color = format == OutputFormat::Human && color.unwrap_or(is_terminal);
        Self { format, color }
    }

    /// The resolved format; never `Auto`.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn format_results<W: Write>(
        &self,
        w: &mut W,
        symbol: &str,
        results: &[MatchResult],
    ) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let body = JsonResults {
                    symbol,
                    count: results.len(),
                    results,
                };
                serde_json::to_writer_pretty(&mut *w, &body)?;
                writeln!(w)?;
            }
            OutputFormat::Plain => {
                for r in results {
                    writeln!(w, "{}:{}:{}:{}", r.path.display(), r.line, r.kind, r.text)?;
                }
            }
            OutputFormat::Human | OutputFormat::Auto => {
                for (i, r) in results.iter().enumerate() {
                    if i > 0 {
                        writeln!(w)?;
                    }
                    self.write_human(w, r)?;
                }
            }
        }
        Ok(())
    }

    pub fn format_error<W: Write>(&self, w: &mut W, err: &Error) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let body = JsonError {
                    error: err.to_string(),
                    symbol: err.symbol(),
                };
                serde_json::to_writer_pretty(&mut *w, &body)?;
                writeln!(w)?;
            }
            OutputFormat::Plain => writeln!(w, "{}", err)?,
            OutputFormat::Human | OutputFormat::Auto => {
                let tint: Style = if err.is_not_found() {
                    |s| s.yellow()
                } else {
                    |s| s.red()
                };
                writeln!(w, "{}", self.paint(&err.to_string(), tint))?;
            }
        }
        Ok(())
    }

    fn write_human<W: Write>(&self, w: &mut W, r: &MatchResult) -> Result<()> {
        let location = format!("{}:{}", r.path.display(), r.line);
        writeln!(
            w,
            "{}  {}",
            self.paint(&location, |s| s.cyan()),
            self.paint(&format!("[{}]", r.kind), |s| s.dimmed())
        )?;

        let Some(ctx) = &r.context else {
            writeln!(w, "  {}", self.paint(&r.text, |s| s.bold()))?;
            return Ok(());
        };

        let mut number = ctx.start_line;
        for line in &ctx.before {
            writeln!(w, "  {:>5} | {}", number, line)?;
            number += 1;
        }
        writeln!(
            w,
            "{} {:>5} | {}",
            self.paint(">", |s| s.green()),
            r.line,
            self.paint(&r.text, |s| s.bold())
        )?;
        for (offset, line) in ctx.after.iter().enumerate() {
            writeln!(w, "  {:>5} | {}", r.line + 1 + offset, line)?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::Language;
    use crate::types::{ContextWindow, DefinitionKind};
    use std::path::PathBuf;

    fn sample(context: Option<ContextWindow>) -> MatchResult {
        MatchResult {
            path: PathBuf::from("internal/user.go"),
            line: 10,
            kind: DefinitionKind::Function,
            language: Language::Go,
            text: "func GetUser(id int) *User {".to_string(),
            context,
        }
    }

    fn render(format: OutputFormat, results: &[MatchResult]) -> String {
        let formatter = Formatter::for_terminal(format, Some(false), false);
        let mut out = Vec::new();
        formatter.format_results(&mut out, "GetUser", results).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_auto_resolves_by_terminal() {
        assert_eq!(
            Formatter::for_terminal(OutputFormat::Auto, None, true).format(),
            OutputFormat::Human
        );
        assert_eq!(
            Formatter::for_terminal(OutputFormat::Auto, None, false).format(),
            OutputFormat::Plain
        );
        assert_eq!(
            Formatter::for_terminal(OutputFormat::Json, None, true).format(),
            OutputFormat::Json
        );
    }

    #[test]
    fn test_color_only_for_human() {
        assert!(Formatter::for_terminal(OutputFormat::Human, None, true).color());
        assert!(!Formatter::for_terminal(OutputFormat::Human, Some(false), true).color());
        assert!(Formatter::for_terminal(OutputFormat::Human, Some(true), false).color());
        assert!(!Formatter::for_terminal(OutputFormat::Json, Some(true), true).color());
    }

    #[test]
    fn test_plain_output() {
        let out = render(OutputFormat::Plain, &[sample(None)]);
        assert_eq!(out, "internal/user.go:10:function:func GetUser(id int) *User {\n");
    }

    #[test]
    fn test_json_output() {
        let out = render(OutputFormat::Json, &[sample(None)]);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["symbol"], "GetUser");
        assert_eq!(value["count"], 1);
        assert_eq!(value["results"][0]["line"], 10);
        assert_eq!(value["results"][0]["kind"], "function");
        assert_eq!(value["results"][0]["path"], "internal/user.go");
    }

    #[test]
    fn test_human_output_with_context() {
        let context = ContextWindow {
            start_line: 9,
            before: vec!["// GetUser loads a user.".to_string()],
            after: vec!["\treturn nil".to_string()],
        };
        let out = render(OutputFormat::Human, &[sample(Some(context))]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "internal/user.go:10  [function]");
        assert_eq!(lines[1], "      9 | // GetUser loads a user.");
        assert_eq!(lines[2], ">    10 | func GetUser(id int) *User {");
        assert_eq!(lines[3], "     11 | \treturn nil");
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_human_output_separates_results() {
        let out = render(OutputFormat::Human, &[sample(None), sample(None)]);
        assert_eq!(out.matches("internal/user.go:10").count(), 2);
        assert!(out.contains("\n\n"));
    }

    #[test]
    fn test_not_found_error() {
        let err = Error::not_found("Missing");

        let formatter = Formatter::for_terminal(OutputFormat::Json, None, false);
        let mut out = Vec::new();
        formatter.format_error(&mut out, &err).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["error"], "No definition found for Missing");
        assert_eq!(value["symbol"], "Missing");

        let formatter = Formatter::for_terminal(OutputFormat::Human, Some(false), false);
        let mut out = Vec::new();
        formatter.format_error(&mut out, &err).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No definition found for Missing\n");
    }

    #[test]
    fn test_human_output_colored() {
        colored::control::set_override(true);
        let formatter = Formatter::for_terminal(OutputFormat::Human, Some(true), false);
        let mut out = Vec::new();
        formatter
            .format_results(&mut out, "GetUser", &[sample(None)])
            .unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains(&"internal/user.go:10".cyan().to_string()));
        assert!(out.contains(&"[function]".dimmed().to_string()));
        assert!(out.contains(&"func GetUser(id int) *User {".bold().to_string()));
        assert!(out.contains("\x1b["));

        let mut out = Vec::new();
        formatter
            .format_error(&mut out, &Error::not_found("Missing"))
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, format!("{}\n", "No definition found for Missing".yellow()));
    }

    #[test]
    fn test_other_errors_have_no_symbol() {
        let formatter = Formatter::for_terminal(OutputFormat::Json, None, false);
        let mut out = Vec::new();
        formatter
            .format_error(&mut out, &Error::Timeout { millis: 500 })
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value.get("symbol").is_none());
    }
}
