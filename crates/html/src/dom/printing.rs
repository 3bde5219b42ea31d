use core::fmt;

use super::{DOM, DOMNode, NodeKind};
use indextree::NodeId;

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

// -----------------------
// Module-scope helpers
// -----------------------

fn escape_html(out: &mut String, text: &str, in_attribute: bool) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '<' if !in_attribute => out.push_str("&lt;"),
            '>' if !in_attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn serialize_children(dom: &DOM, id: NodeId, out: &mut String) {
    let raw = dom
        .tag(id)
        .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
    for child in id.children(&dom.dom) {
        match dom.node(child).map(|node| &node.kind) {
            Some(NodeKind::Text { text }) if raw => out.push_str(text),
            _ => serialize_node(dom, child, out),
        }
    }
}

fn serialize_node(dom: &DOM, id: NodeId, out: &mut String) {
    let Some(DOMNode { kind, attrs, .. }) = dom.node(id) else {
        return;
    };
    match kind {
        NodeKind::Document | NodeKind::Fragment => serialize_children(dom, id, out),
        NodeKind::Element { tag } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_html(out, value, true);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }
            serialize_children(dom, id, out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeKind::Text { text } => escape_html(out, text, false),
        NodeKind::Comment { text } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

fn escape_debug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

fn fmt_node(dom: &DOM, id: NodeId, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    let Some(DOMNode { kind, attrs, .. }) = dom.node(id) else {
        return Ok(());
    };
    let indent = "  ".repeat(depth);
    match kind {
        NodeKind::Document => writeln!(f, "{indent}#document")?,
        NodeKind::Fragment => writeln!(f, "{indent}#fragment")?,
        NodeKind::Element { tag } => {
            write!(f, "{indent}<{tag}")?;
            let mut pairs: Vec<&(String, String)> = attrs.iter().collect();
            pairs.sort_by(|left, right| left.0.cmp(&right.0));
            for (key, value) in pairs {
                write!(f, " {key}=\"{}\"", escape_debug(value))?;
            }
            writeln!(f, ">")?;
        }
        NodeKind::Text { text } => {
            // Whitespace-only text is noise in tree dumps.
            if text.chars().all(char::is_whitespace) {
                return Ok(());
            }
            writeln!(f, "{indent}\"{}\"", escape_debug(text))?;
        }
        NodeKind::Comment { text } => writeln!(f, "{indent}<!--{}-->", escape_debug(text))?,
    }
    for child in id.children(&dom.dom) {
        fmt_node(dom, child, f, depth + 1)?;
    }
    Ok(())
}

impl fmt::Debug for DOM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DOM")?;
        fmt_node(self, self.root, f, 0)
    }
}

impl DOM {
    /// Serialized markup of the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize_children(self, id, &mut out);
        out
    }

    /// Serialized markup of `id` itself.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize_node(self, id, &mut out);
        out
    }
}
