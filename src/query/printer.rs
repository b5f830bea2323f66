use super::ast::{Argument, Node, Operator};
use chrono::{DateTime, FixedOffset, SecondsFormat, Timelike};
use std::fmt;

/// Renders `root` as canonical FICUM query text.
pub fn render(root: &Node) -> String {
    let mut out = String::new();
    walk(root, &mut out, false);
    out
}

/// Appends `node` to `out`. `preceded` is true while the walk is beneath a
/// conjunction; the returned flag is what the next sibling sees.
///
/// A conjunction clears the flag when it finishes instead of restoring the
/// caller's value, so a disjunction following a nested conjunction is left
/// unwrapped: `And(And(a, b), Or(c, d))` renders as `a,b,c;d`.
fn walk(node: &Node, out: &mut String, preceded: bool) -> bool {
    match node {
        Node::And(left, right) => {
            let after_left = walk(left, out, true);
            out.push_str(Operator::And.sign());
            walk(right, out, after_left);
            false
        }
        Node::Or(left, right) => {
            if preceded {
                out.push('(');
            }
            let after_left = walk(left, out, preceded);
            out.push_str(Operator::Or.sign());
            let after_right = walk(right, out, after_left);
            if preceded {
                out.push(')');
            }
            after_right
        }
        Node::Constraint {
            selector,
            comparison,
            argument,
        } => {
            out.push_str(selector);
            out.push_str(comparison.sign());
            encode_into(out, argument);
            preceded
        }
    }
}

pub fn encode(argument: &Argument) -> String {
    let mut out = String::new();
    encode_into(&mut out, argument);
    out
}

pub fn encode_into(out: &mut String, argument: &Argument) {
    match argument {
        Argument::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Argument::Byte(n) => out.push_str(&n.to_string()),
        Argument::Short(n) => out.push_str(&n.to_string()),
        Argument::Int(n) => out.push_str(&n.to_string()),
        Argument::Float(n) => push_decimal(out, n.to_string(), f64::from(*n)),
        Argument::Long(n) => {
            out.push_str(&n.to_string());
            out.push('l');
        }
        Argument::Double(n) => {
            push_decimal(out, n.to_string(), *n);
            out.push('d');
        }
        Argument::Calendar(dt) => push_calendar(out, dt),
        Argument::LocalDate(date) => out.push_str(&date.format("%Y-%m-%d").to_string()),
        Argument::Instant(dt) => push_date_time(out, dt),
        Argument::Enum(name) => push_quoted(out, name),
        Argument::Text(s) => push_quoted(out, s),
        Argument::Other(value) => push_quoted(out, value),
    }
}

fn push_decimal(out: &mut String, text: String, value: f64) {
    if value.is_nan() {
        out.push_str("NaN");
    } else if value.is_infinite() {
        out.push_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        let fractional = text.contains('.');
        out.push_str(&text);
        if !fractional {
            out.push_str(".0");
        }
    }
}

/// Date-times print at millisecond precision, so midnight is judged at that
/// precision too.
fn push_calendar(out: &mut String, dt: &DateTime<FixedOffset>) {
    let millis = dt.nanosecond() / 1_000_000;
    if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 && millis == 0 {
        out.push_str(&dt.format("%Y-%m-%d").to_string());
    } else {
        push_date_time(out, dt);
    }
}

fn push_date_time(out: &mut String, dt: &DateTime<FixedOffset>) {
    out.push_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true));
}

fn push_quoted(out: &mut String, value: impl fmt::Display) {
    out.push('\'');
    out.push_str(&value.to_string());
    out.push('\'');
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}
