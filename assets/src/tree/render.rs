//! Textual renderings of an [AssetTree]: a nested HTML list and an XML
//! fragment. Neither talks to the asset service.
use std::fmt::Write;

use super::{AssetTree, TreeChild};
use crate::Node;

const INDENT_STEP: usize = 2;

/// Escapes a string for use in markup text or a double-quoted attribute.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

impl Node {
    /// A single `<li>` line: `type path id`.
    pub fn to_li_string(&self) -> String {
        format!(
            "<li>{} {} {}</li>",
            self.type_tag,
            escape(&self.path.path),
            self.id
        )
    }

    /// A self-closing XML element, indented by `indent` spaces.
    pub fn to_xml(&self, indent: usize) -> String {
        format!(
            "{:indent$}<{} path=\"{}\" id=\"{}\"{}/>\n",
            "",
            self.type_tag,
            escape(&self.path.path),
            self.id,
            if self.recycled { " recycled=\"true\"" } else { "" },
            indent = indent
        )
    }
}

impl AssetTree {
    /// Renders the tree as nested `<ul>` lists, one `<li>` per node.
    ///
    /// A node's children get their own inner `<ul>` only when at least one
    /// of them is a subtree; leaf-only children sit directly in the
    /// parent's `<li>`.
    pub fn to_list_string(&self) -> String {
        let mut out = String::from("<ul>\n");
        self.write_list_item(&mut out, INDENT_STEP);
        out.push_str("</ul>\n");
        out
    }

    fn write_list_item(&self, out: &mut String, indent: usize) {
        let root = self.root();
        let _ = write!(
            out,
            "{:indent$}<li>{} {} {}",
            "",
            root.type_tag(),
            escape(root.path()),
            root.id(),
            indent = indent
        );

        let Some(children) = self.children() else {
            out.push_str("</li>\n");
            return;
        };

        out.push('\n');
        let nested = children
            .iter()
            .any(|child| matches!(child, TreeChild::Tree(_)));
        let inner = indent + INDENT_STEP;
        let item_indent = if nested {
            let _ = writeln!(out, "{:inner$}<ul>", "", inner = inner);
            inner + INDENT_STEP
        } else {
            inner
        };

        for child in children {
            match child {
                TreeChild::Tree(tree) => tree.write_list_item(out, item_indent),
                TreeChild::Node(node) => {
                    let _ = writeln!(
                        out,
                        "{:indent$}{}",
                        "",
                        node.to_li_string(),
                        indent = item_indent
                    );
                }
            }
        }

        if nested {
            let _ = writeln!(out, "{:inner$}</ul>", "", inner = inner);
        }
        let _ = writeln!(out, "{:indent$}</li>", "", indent = indent);
    }

    /// Renders the tree as an XML fragment, the root element indented by
    /// `indent` spaces and every level below by two more.
    pub fn to_xml(&self, indent: usize) -> String {
        let root = self.root();
        let open = format!(
            "{:indent$}<{} path=\"{}\" id=\"{}\"",
            "",
            root.type_tag(),
            escape(root.path()),
            root.id(),
            indent = indent
        );

        let Some(children) = self.children() else {
            return open + "/>\n";
        };

        let mut out = open + ">\n";
        for child in children {
            match child {
                TreeChild::Tree(tree) => out.push_str(&tree.to_xml(indent + INDENT_STEP)),
                TreeChild::Node(node) => out.push_str(&node.to_xml(indent + INDENT_STEP)),
            }
        }
        let _ = writeln!(out, "{:indent$}</{}>", "", root.type_tag(), indent = indent);
        out
    }
}
