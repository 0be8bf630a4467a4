// Flowchart extractor.
//
// Reads the `graph` / `flowchart` subset of Mermaid line by line:
// - `---` toggles a front-matter block (skipped)
// - `graph ...`, `flowchart ...`, `%...` lines are headers/comments
// - `subgraph NAME` ... `end` tags every node seen inside with NAME
// - `classDef`, `class` and `A:::style` lines are styling (skipped)
// - links: A --> B, A[Label] --> B[Label], A -->|text| B, A --> B & C,
//          A --> B --> C, A & B --> C
// - labelled links are collapsed first:
//     A -- text --> B   =>  A --> B
//     A -. text .-> B   =>  A --> B
//     A -.-> B, A ==> B =>  A --> B
//     A --- B           =>  A --> B
// - standalone nodes: A[Label] or a bare A
// - node shapes: A(round), A((circle)), A{rhombus}, A[(db)], A>flag], ...
//   all read as a label
// - `;` separates statements on one line
//
// Anything else is ignored. No grammar, no recovery: a line either yields
// nodes/edges or is dropped.

use crate::parser::types::FlowGraph;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Parse error at {line}:{col}: {msg}")]
pub struct ParseError {
    pub line: usize, // 1-based
    pub col: usize,  // 1-based best-effort
    pub msg: String,
}

const LINK: &str = "-->";

pub fn parse_flowchart(input: &str) -> Result<FlowGraph, ParseError> {
    let mut p = Parser::new(input);
    p.parse_lines();

    if p.graph.is_empty() {
        return Err(ParseError {
            line: p.lines.len().max(1),
            col: 1,
            msg: "no valid flowchart nodes found".into(),
        });
    }

    tracing::debug!(
        nodes = p.graph.len(),
        edges = p.graph.edges().len(),
        "parsed flowchart"
    );
    Ok(p.graph)
}

/// A node reference inside a statement: `A` or `A[Label]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeRef<'a> {
    id: &'a str,
    label: Option<String>,
}

struct Parser<'a> {
    lines: Vec<&'a str>,
    i: usize,
    in_front_matter: bool,
    current_group: Option<String>,
    graph: FlowGraph,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        let lines = input
            .trim()
            .lines()
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect::<Vec<_>>();
        Self {
            lines,
            i: 0,
            in_front_matter: false,
            current_group: None,
            graph: FlowGraph::new(),
        }
    }

    fn eof(&self) -> bool {
        self.i >= self.lines.len()
    }

    fn line_no(&self) -> usize {
        self.i + 1
    }

    fn advance(&mut self) {
        self.i += 1;
    }

    fn parse_lines(&mut self) {
        while !self.eof() {
            let t = self.lines[self.i].trim();
            self.parse_line(t);
            self.advance();
        }
    }

    fn parse_line(&mut self, t: &str) {
        if t.is_empty() {
            return;
        }

        if t.starts_with("---") {
            self.in_front_matter = !self.in_front_matter;
            return;
        }
        if self.in_front_matter {
            return;
        }

        if t.starts_with("graph") || t.starts_with("flowchart") || t.starts_with('%') {
            return;
        }

        if t == "subgraph" || t.starts_with("subgraph ") {
            let (name, _) = take_ident_prefix(&t["subgraph".len()..]);
            self.current_group = name.map(str::to_string);
            return;
        }
        if t == "end" {
            self.current_group = None;
            return;
        }

        if t.starts_with("classDef ") || t.starts_with("class ") || t.contains(":::") {
            return;
        }

        let t = match t.find("%%") {
            Some(idx) => t[..idx].trim(),
            None => t,
        };

        for stmt in split_top_level(t, ";") {
            self.parse_statement(stmt.trim());
        }
    }

    fn parse_statement(&mut self, stmt: &str) {
        if stmt.is_empty() {
            return;
        }

        let normalized = normalize_links(stmt);
        let handled = if normalized.contains(LINK) {
            self.parse_link_chain(&normalized)
        } else {
            self.parse_standalone(&normalized)
        };

        if !handled {
            tracing::debug!(line = self.line_no(), text = stmt, "ignoring statement");
        }
    }

    /// `a1 & a2 --> b1 & b2 -->|text| c` : every source of one segment links
    /// to every target of the next.
    fn parse_link_chain(&mut self, line: &str) -> bool {
        let mut segments: Vec<Vec<NodeRef<'_>>> = Vec::new();
        for (idx, seg) in split_top_level(line, LINK).into_iter().enumerate() {
            let seg = if idx == 0 { seg } else { strip_link_text(seg) };
            match parse_ref_list(seg) {
                Some(refs) => segments.push(refs),
                None => return false,
            }
        }
        if segments.len() < 2 {
            return false;
        }

        let group = self.current_group.clone();
        for pair in segments.windows(2) {
            let (sources, targets) = (&pair[0], &pair[1]);
            for r in sources.iter().chain(targets.iter()) {
                self.graph.register_node(r.id, r.label.as_deref(), group.as_deref());
            }
            for s in sources {
                for t in targets {
                    self.graph.add_edge(s.id, t.id);
                }
            }
        }
        true
    }

    fn parse_standalone(&mut self, line: &str) -> bool {
        let Some(r) = parse_node_ref(line) else {
            return false;
        };
        let group = self.current_group.clone();
        self.graph.register_node(r.id, r.label.as_deref(), group.as_deref());
        true
    }
}

// ---------- link normalisation ----------

fn normalize_links(line: &str) -> String {
    let line = collapse_labelled_link(line, " --", "-->");
    let line = collapse_labelled_link(&line, " -.", ".->");
    collapse_arrow_runs(&line).replace("---", LINK)
}

/// `A <open> text <close> B` => `A --> B`. The text must be non-empty and
/// must not contain '>', and the opener must follow a node reference.
fn collapse_labelled_link(line: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(start) = rest.find(open) {
        let after_open = &rest[start + open.len()..];
        let after_node = rest[..start]
            .chars()
            .next_back()
            .is_some_and(|c| is_word_char(c) || matches!(c, ']' | ')' | '}'));

        match after_open.find(close) {
            Some(end) if after_node && end > 0 && !after_open[..end].contains('>') => {
                out.push_str(&rest[..start]);
                out.push_str(" -->");
                rest = &after_open[end + close.len()..];
            }
            _ => {
                out.push_str(&rest[..start + open.len()]);
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Any run of two or more `-`, `.` or `=` ending in `>` becomes `-->`.
fn collapse_arrow_runs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut run = String::new();

    for c in line.chars() {
        if matches!(c, '-' | '.' | '=') {
            run.push(c);
            continue;
        }
        if c == '>' && run.len() >= 2 {
            out.push_str(LINK);
        } else {
            out.push_str(&run);
            out.push(c);
        }
        run.clear();
    }

    out.push_str(&run);
    out
}

// ---------- helpers ----------

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn take_ident_prefix(s: &str) -> (Option<&str>, &str) {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(s.len(), |(i, _)| i);
    if end == 0 {
        (None, s)
    } else {
        (Some(&s[..end]), &s[end..])
    }
}

/// Split on `pat`, ignoring occurrences inside `[...]`, `(...)` or `{...}`.
fn split_top_level<'s>(s: &'s str, pat: &str) -> Vec<&'s str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut i = 0usize;

    while i < s.len() {
        let c = s[i..].chars().next().unwrap_or(' ');
        match c {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && s[i..].starts_with(pat) {
            parts.push(&s[start..i]);
            i += pat.len();
            start = i;
            continue;
        }
        i += c.len_utf8();
    }

    parts.push(&s[start..]);
    parts
}

/// Drop a leading `|text|` link label.
fn strip_link_text(seg: &str) -> &str {
    let t = seg.trim_start();
    if let Some(inner) = t.strip_prefix('|') {
        if let Some(close) = inner.find('|') {
            return &inner[close + 1..];
        }
    }
    t
}

fn parse_ref_list(seg: &str) -> Option<Vec<NodeRef<'_>>> {
    let mut refs = Vec::new();
    for part in split_top_level(seg, "&") {
        if part.trim().is_empty() {
            continue;
        }
        refs.push(parse_node_ref(part)?);
    }
    if refs.is_empty() { None } else { Some(refs) }
}

fn parse_node_ref(s: &str) -> Option<NodeRef<'_>> {
    let (id, rest) = take_ident_prefix(s);
    let id = id?;
    let rest = rest.trim();

    if rest.is_empty() {
        return Some(NodeRef { id, label: None });
    }

    let inner = strip_shape(rest)?;
    Some(NodeRef {
        id,
        label: Some(clean_label(inner)),
    })
}

/// Outer delimiters of the node shapes: `[box]`, `(round)`, `{rhombus}`,
/// `>flag]` and every nesting of them (`((circle))`, `[(db)]`, `{{hex}}`).
const SHAPES: [(char, char); 4] = [('[', ']'), ('(', ')'), ('{', '}'), ('>', ']')];

/// Parallelogram and trapezoid slashes, only valid inside a bracket.
const SLANTS: [(char, char); 4] = [('/', '/'), ('\\', '\\'), ('/', '\\'), ('\\', '/')];

/// Peel shape delimiters off `rest`; `None` if it is not a shape at all.
fn strip_shape(rest: &str) -> Option<&str> {
    let mut inner = peel(rest, &SHAPES)?;
    while let Some(next) = peel(inner, &SHAPES).or_else(|| peel(inner, &SLANTS)) {
        if next.is_empty() {
            break;
        }
        inner = next;
    }
    Some(inner)
}

fn peel<'s>(s: &'s str, pairs: &[(char, char)]) -> Option<&'s str> {
    pairs.iter().find_map(|&(open, close)| {
        let inner = s.strip_prefix(open)?.strip_suffix(close)?;
        brackets_balanced(inner).then_some(inner)
    })
}

fn brackets_balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Trim and strip one pair of surrounding quotes.
fn clean_label(label: &str) -> String {
    let s = label.trim();
    let unquoted = s
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')));
    match unquoted {
        Some(inner) if s.len() >= 2 => inner.trim().to_string(),
        _ => s.to_string(),
    }
}
