//! Parser interface and the AST-dump front end.
//!
//! Source languages are parsed outside this crate. The engine only needs a
//! [`Parser`] that turns text into a [`Tree`]. [`AstDumpParser`] reads the
//! indented dump format that [`dump_tree`] prints:
//!
//! ```text
//! COMPILATION_UNIT -> COMPILATION_UNIT [1:0]
//! `--CLASS_DEF -> CLASS_DEF [1:0]
//!     |--MODIFIERS -> MODIFIERS [1:0]
//!     |--LITERAL_CLASS -> class [1:0]
//!     |--IDENT -> A [1:6]
//!     `--OBJBLOCK -> OBJBLOCK [1:8]
//! ```

use std::fmt::Write as _;
use std::path::Path;

use crate::tokens::TokenKind;
use crate::tree::{NodeId, NodeRef, Tree, TreeBuilder};

/// A file could not be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    /// 1-based line of the failure.
    pub line: usize,
    /// 0-based column of the failure.
    pub column: usize,
    /// What went wrong.
    pub message: String,
}

impl ParseError {
    fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column: 0,
            message: message.into(),
        }
    }
}

/// Turns source text into a tree.
pub trait Parser: Send + Sync {
    /// Parses one file.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the text is not valid input.
    fn parse(&self, source: &str, path: &Path) -> Result<Tree, ParseError>;
}

/// Reads trees printed by [`dump_tree`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AstDumpParser;

const BRANCH: &str = "|--";
const LAST_BRANCH: &str = "`--";
const PIPE_INDENT: &str = "|   ";
const BLANK_INDENT: &str = "    ";

impl Parser for AstDumpParser {
    fn parse(&self, source: &str, _path: &Path) -> Result<Tree, ParseError> {
        let mut builder: Option<TreeBuilder> = None;
        // open ancestors, indexed by depth
        let mut open: Vec<NodeId> = Vec::new();

        for (index, raw) in source.lines().enumerate() {
            let line_no = index + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let (depth, entry) = split_indent(raw);
            let (kind, text, line, column) = parse_entry(entry, line_no)?;

            match builder.as_mut() {
                None => {
                    if depth != 0 {
                        return Err(ParseError::at(line_no, "first node must be the root"));
                    }
                    let b = TreeBuilder::new(kind, text, line, column);
                    open.push(b.root());
                    builder = Some(b);
                }
                Some(b) => {
                    if depth == 0 {
                        return Err(ParseError::at(line_no, "more than one root node"));
                    }
                    if depth > open.len() {
                        return Err(ParseError::at(line_no, "node is indented past its parent"));
                    }
                    open.truncate(depth);
                    let parent = open[depth - 1];
                    let id = b
                        .try_child(parent, kind, text, line, column)
                        .map_err(|e| ParseError::at(line_no, e.to_string()))?;
                    open.push(id);
                }
            }
        }

        builder
            .map(TreeBuilder::build)
            .ok_or_else(|| ParseError::at(1, "no nodes in input"))
    }
}

fn split_indent(raw: &str) -> (usize, &str) {
    let mut rest = raw;
    let mut depth = 0;
    loop {
        if let Some(r) = rest.strip_prefix(PIPE_INDENT).or_else(|| rest.strip_prefix(BLANK_INDENT)) {
            rest = r;
            depth += 1;
        } else if let Some(r) = rest.strip_prefix(BRANCH).or_else(|| rest.strip_prefix(LAST_BRANCH)) {
            return (depth + 1, r);
        } else {
            return (depth, rest.trim_start());
        }
    }
}

fn parse_entry(entry: &str, line_no: usize) -> Result<(TokenKind, String, usize, usize), ParseError> {
    let malformed = || ParseError::at(line_no, format!("expected `KIND -> text [line:column]`, found `{entry}`"));

    let (name, rest) = entry.split_once(" -> ").ok_or_else(malformed)?;
    let kind = TokenKind::from_name(name.trim()).map_err(|e| ParseError::at(line_no, e.to_string()))?;

    let rest = rest.trim_end();
    let open = rest.rfind(" [").ok_or_else(malformed)?;
    let position = rest[open + 2..].strip_suffix(']').ok_or_else(malformed)?;
    let (line, column) = position.split_once(':').ok_or_else(malformed)?;
    let line = line.trim().parse().map_err(|_| malformed())?;
    let column = column.trim().parse().map_err(|_| malformed())?;

    Ok((kind, unescape(&rest[..open]), line, column))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn write_entry(out: &mut String, node: NodeRef<'_>) {
    let _ = writeln!(
        out,
        "{} -> {} [{}:{}]",
        node.kind(),
        escape(node.text()),
        node.line(),
        node.column()
    );
}

/// Prints a tree in the dump format read by [`AstDumpParser`].
#[must_use]
pub fn dump_tree(tree: &Tree) -> String {
    let mut out = String::new();
    let root = tree.root();
    write_entry(&mut out, root);

    // (node, indent of its line, is last child)
    let mut stack: Vec<(NodeRef<'_>, String, bool)> = Vec::new();
    let count = root.child_count();
    for (i, child) in root.children().enumerate().rev() {
        stack.push((child, String::new(), i + 1 == count));
    }

    while let Some((node, indent, last)) = stack.pop() {
        out.push_str(&indent);
        out.push_str(if last { LAST_BRANCH } else { BRANCH });
        write_entry(&mut out, node);

        let child_indent = format!("{indent}{}", if last { BLANK_INDENT } else { PIPE_INDENT });
        let count = node.child_count();
        for (i, child) in node.children().enumerate().rev() {
            stack.push((child, child_indent.clone(), i + 1 == count));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        let mut b = TreeBuilder::new(TokenKind::CompilationUnit, "COMPILATION_UNIT", 1, 0);
        let root = b.root();
        let class = b.structural(root, TokenKind::ClassDef, 1, 0);
        let mods = b.structural(class, TokenKind::Modifiers, 1, 0);
        b.child(mods, TokenKind::LiteralPublic, "public", 1, 0);
        b.child(class, TokenKind::Ident, "A", 1, 13);
        let obj = b.structural(class, TokenKind::Objblock, 1, 15);
        b.child(obj, TokenKind::StringLiteral, "\"a\\tb\"\n", 2, 4);
        let comment = b.child(root, TokenKind::SingleLineComment, "//", 3, 0);
        b.child(comment, TokenKind::CommentContent, " note\n", 3, 2);
        b.build()
    }

    #[test]
    fn dump_format() {
        insta::assert_snapshot!(dump_tree(&sample()), @r###"
        COMPILATION_UNIT -> COMPILATION_UNIT [1:0]
        |--CLASS_DEF -> CLASS_DEF [1:0]
        |   |--MODIFIERS -> MODIFIERS [1:0]
        |   |   `--LITERAL_PUBLIC -> public [1:0]
        |   |--IDENT -> A [1:13]
        |   `--OBJBLOCK -> OBJBLOCK [1:15]
        |       `--STRING_LITERAL -> "a\\tb"\n [2:4]
        `--SINGLE_LINE_COMMENT -> // [3:0]
            `--COMMENT_CONTENT ->  note\n [3:2]
        "###);
    }

    #[test]
    fn parse_reads_back_what_dump_prints() {
        let original = sample();
        let dumped = dump_tree(&original);
        let parsed = AstDumpParser.parse(&dumped, Path::new("A.ast")).unwrap();

        assert_eq!(parsed.len(), original.len());
        for (a, b) in original.root().descendants().zip(parsed.root().descendants()) {
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.text(), b.text());
            assert_eq!((a.line(), a.column()), (b.line(), b.column()));
            assert_eq!(a.depth(), b.depth());
        }
        assert_eq!(dump_tree(&parsed), dumped);
    }

    #[test]
    fn parse_errors_carry_the_line() {
        let err = AstDumpParser
            .parse("COMPILATION_UNIT -> COMPILATION_UNIT [1:0]\n|--NOT_A_KIND -> x [1:0]\n", Path::new("x"))
            .unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("NOT_A_KIND"));

        let err = AstDumpParser
            .parse("COMPILATION_UNIT -> COMPILATION_UNIT [1:0]\n|   |--IDENT -> x [1:0]\n", Path::new("x"))
            .unwrap_err();
        assert_eq!(err.message, "node is indented past its parent");

        let err = AstDumpParser
            .parse("IDENT -> a [1:0]\nIDENT -> b [2:0]\n", Path::new("x"))
            .unwrap_err();
        assert_eq!(err.line, 2);

        let err = AstDumpParser.parse("IDENT -> a [1:x]", Path::new("x")).unwrap_err();
        assert!(err.message.starts_with("expected"));

        assert!(AstDumpParser.parse("\n\n", Path::new("x")).is_err());
    }
}
