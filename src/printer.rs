use crate::node::{Literal, Node};
use std::fmt::Write as _;

const INDENT: &str = "    ";

pub fn print(node: &Node, pretty: bool) -> String {
    let mut out = String::new();
    if pretty {
        write_pretty(node, 0, &mut out);
    } else {
        write_compact(node, &mut out);
    }
    out
}

fn write_compact(node: &Node, out: &mut String) {
    match node {
        Node::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_compact(item, out);
            }
            out.push(']');
        }
        Node::Object(entries) => {
            out.push('{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_compact(value, out);
            }
            out.push('}');
        }
        Node::Scalar(lit) => write_literal(lit, out),
    }
}

fn write_pretty(node: &Node, level: usize, out: &mut String) {
    match node {
        Node::Array(items) if items.is_empty() => out.push_str("[]"),
        Node::Object(entries) if entries.is_empty() => out.push_str("{}"),
        Node::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                indent(level + 1, out);
                write_pretty(item, level + 1, out);
            }
            out.push('\n');
            indent(level, out);
            out.push(']');
        }
        Node::Object(entries) => {
            out.push_str("{\n");
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                indent(level + 1, out);
                write_string(key, out);
                out.push_str(": ");
                write_pretty(value, level + 1, out);
            }
            out.push('\n');
            indent(level, out);
            out.push('}');
        }
        Node::Scalar(lit) => write_literal(lit, out),
    }
}

fn indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn write_literal(lit: &Literal, out: &mut String) {
    match lit {
        Literal::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        // f64 Display never switches to exponent notation.
        Literal::Number(n) => {
            write!(out, "{}", n).ok();
        }
        Literal::Str(s) => write_string(s, out),
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => {
                write!(out, "\\u{:04x}", c as u32).ok();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
