//! Handlebars template parser.
//!
//! Recognizes mustache statements, blocks, partials, comments and
//! sub-expressions; markup between them is not represented. Spans are
//! reported as line/column pairs.

use anyhow::{Result, bail};

use crate::core::syntax::{LineIndex, NodeKind, Span, SyntaxNode};

/// Parse a template into a syntax tree with line/column spans.
pub fn parse_template(code: &str) -> Result<SyntaxNode> {
    TemplateParser::new(code).parse()
}

struct TemplateParser<'a> {
    src: &'a str,
    index: LineIndex<'a>,
    pos: usize,
    blocks: Vec<(String, usize)>,
}

impl<'a> TemplateParser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            index: LineIndex::new(src),
            pos: 0,
            blocks: Vec::new(),
        }
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::LineColumn {
            start: self.index.position(start),
            end: self.index.position(end),
        }
    }

    fn location(&self, offset: usize) -> String {
        let position = self.index.position(offset);
        format!("{}:{}", position.line, position.col + 1)
    }

    fn parse(mut self) -> Result<SyntaxNode> {
        let mut program = SyntaxNode::new(NodeKind::Program, self.span(0, self.src.len()));

        while let Some(found) = self.src[self.pos..].find("{{") {
            let start = self.pos + found;
            if start > 0 && self.src.as_bytes()[start - 1] == b'\\' {
                self.pos = start + 2;
                continue;
            }
            if let Some(node) = self.parse_mustache(start)? {
                program.push("body", node);
            }
        }

        if let Some((name, start)) = self.blocks.last() {
            bail!("Unclosed block '{{{{#{}}}}}' at {}", name, self.location(*start));
        }
        Ok(program)
    }

    fn parse_mustache(&mut self, start: usize) -> Result<Option<SyntaxNode>> {
        let rest = &self.src[start..];

        if rest.starts_with("{{!--") {
            let Some(close) = rest.find("--}}") else {
                bail!("Unclosed comment at {}", self.location(start));
            };
            self.pos = start + close + 4;
            return Ok(None);
        }
        if rest.starts_with("{{!") {
            let Some(close) = rest.find("}}") else {
                bail!("Unclosed comment at {}", self.location(start));
            };
            self.pos = start + close + 2;
            return Ok(None);
        }

        let (open, close_token) = if rest.starts_with("{{{") {
            (3, "}}}")
        } else {
            (2, "}}")
        };
        let close = self.find_close(start + open, close_token)?;
        let end = close + close_token.len();
        self.pos = end;

        let mut body_start = start + open;
        let mut body_end = close;
        if self.src[body_start..body_end].starts_with('~') {
            body_start += 1;
        }
        if self.src[body_start..body_end].ends_with('~') {
            body_end -= 1;
        }

        let body = &self.src[body_start..body_end];
        let trimmed = body.trim_start();
        let lead = body.len() - trimmed.len();

        let node = match trimmed.chars().next() {
            Some('#') | Some('^') if open == 2 => {
                let mut sigil_len = 1;
                if trimmed[1..].starts_with('>') || trimmed[1..].starts_with('*') {
                    sigil_len = 2;
                }
                if trimmed[sigil_len..].trim().is_empty() {
                    // `{{^}}` is an else
                    return Ok(None);
                }
                let node = self.parse_call(
                    NodeKind::BlockStatement,
                    start,
                    end,
                    body_start + lead + sigil_len,
                    body_end,
                )?;
                let name = node.value_at("path").unwrap_or_default().to_string();
                self.blocks.push((name, start));
                node
            }
            Some('/') if open == 2 => {
                let name = trimmed[1..].trim();
                match self.blocks.pop() {
                    Some((open_name, _)) if open_name == name => return Ok(None),
                    Some((open_name, open_start)) => bail!(
                        "'{{{{/{}}}}}' at {} does not match '{{{{#{}}}}}' at {}",
                        name,
                        self.location(start),
                        open_name,
                        self.location(open_start)
                    ),
                    None => bail!(
                        "'{{{{/{}}}}}' at {} closes no block",
                        name,
                        self.location(start)
                    ),
                }
            }
            Some('>') | Some('&') => self.parse_call(
                if trimmed.starts_with('>') {
                    NodeKind::Other
                } else {
                    NodeKind::MustacheStatement
                },
                start,
                end,
                body_start + lead + 1,
                body_end,
            )?,
            _ if trimmed.trim_end() == "else" => return Ok(None),
            _ if trimmed.starts_with("else ") => {
                self.parse_call(NodeKind::Other, start, end, body_start + lead + 5, body_end)?
            }
            Some(_) => self.parse_call(
                NodeKind::MustacheStatement,
                start,
                end,
                body_start,
                body_end,
            )?,
            None => bail!("Empty mustache at {}", self.location(start)),
        };
        Ok(Some(node))
    }

    /// Find the closing token, skipping quoted strings.
    fn find_close(&self, from: usize, close_token: &str) -> Result<usize> {
        let mut quote: Option<char> = None;
        let mut chars = self.src[from..].char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            let at = from + i;
            match quote {
                Some(q) => {
                    if c == '\\' && chars.peek().is_some_and(|&(_, next)| next == q) {
                        chars.next();
                    } else if c == q {
                        quote = None;
                    }
                }
                None => {
                    if c == '\'' || c == '"' {
                        quote = Some(c);
                    } else if self.src[at..].starts_with(close_token) {
                        return Ok(at);
                    }
                }
            }
        }
        bail!("Unclosed mustache at {}", self.location(from))
    }

    /// Parse `path params... key=value...` between `body_start` and `body_end`.
    fn parse_call(
        &self,
        kind: NodeKind,
        start: usize,
        end: usize,
        body_start: usize,
        body_end: usize,
    ) -> Result<SyntaxNode> {
        let mut node = SyntaxNode::new(kind, self.span(start, end));
        let mut cursor = Cursor {
            parser: self,
            pos: body_start,
            end: body_end,
        };
        cursor.parse_arguments(&mut node, None)?;
        if node.get("path").is_none() {
            bail!("Missing helper name at {}", self.location(start));
        }
        Ok(node)
    }
}

struct Cursor<'p, 'a> {
    parser: &'p TemplateParser<'a>,
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'_, 'a> {
    fn rest(&self) -> &'a str {
        &self.parser.src[self.pos..self.end]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Fill `node` with its path, params and hash pairs. Stops at `until`
    /// (a closing paren for sub-expressions) or at the end of the body.
    fn parse_arguments(&mut self, node: &mut SyntaxNode, until: Option<char>) -> Result<()> {
        let mut has_path = false;
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                if let Some(expected) = until {
                    bail!(
                        "Expected '{}' at {}",
                        expected,
                        self.parser.location(self.pos)
                    );
                }
                return Ok(());
            };
            if Some(c) == until {
                self.pos += 1;
                return Ok(());
            }
            if c == ')' {
                bail!("Unexpected ')' at {}", self.parser.location(self.pos));
            }

            if let Some(key) = self.hash_key() {
                let key_start = self.pos;
                self.pos += key.len() + 1;
                self.skip_whitespace();
                let value = self.parse_value()?;
                let (_, value_end) = value.span.resolve(&self.parser.index);
                let mut pair = SyntaxNode::new(
                    NodeKind::HashPair,
                    self.parser.span(key_start, value_end),
                )
                .with_value(key);
                pair.push("value", value);
                node.push("hash", pair);
                continue;
            }

            if c == '|' || self.rest().starts_with("as |") {
                self.skip_block_params()?;
                continue;
            }

            let value = self.parse_value()?;
            if has_path {
                node.push("params", value);
            } else {
                has_path = true;
                node.push("path", value);
            }
        }
    }

    fn hash_key(&self) -> Option<String> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-' || c == '@'))
            .unwrap_or(rest.len());
        if len > 0 && rest[len..].starts_with('=') {
            Some(rest[..len].to_string())
        } else {
            None
        }
    }

    fn skip_block_params(&mut self) -> Result<()> {
        let Some(open) = self.rest().find('|') else {
            return Ok(());
        };
        let after = self.pos + open + 1;
        let Some(close) = self.parser.src[after..self.end].find('|') else {
            bail!("Unclosed block params at {}", self.parser.location(self.pos));
        };
        self.pos = after + close + 1;
        Ok(())
    }

    fn parse_value(&mut self) -> Result<SyntaxNode> {
        let start = self.pos;
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let mut sub = SyntaxNode::new(NodeKind::SubExpression, self.parser.span(start, start));
                self.parse_arguments(&mut sub, Some(')'))?;
                if sub.get("path").is_none() {
                    bail!("Missing helper name at {}", self.parser.location(start));
                }
                sub.span = self.parser.span(start, self.pos);
                Ok(sub)
            }
            Some(quote @ ('\'' | '"')) => {
                // Only the delimiting quote can be escaped.
                let mut value = String::new();
                let mut chars = self.rest()[1..].char_indices().peekable();
                while let Some((i, c)) = chars.next() {
                    if c == '\\' && chars.peek().is_some_and(|&(_, next)| next == quote) {
                        value.push(quote);
                        chars.next();
                    } else if c == quote {
                        self.pos = start + 1 + i + 1;
                        return Ok(SyntaxNode::new(
                            NodeKind::StringLiteral,
                            self.parser.span(start, self.pos),
                        )
                        .with_value(value));
                    } else {
                        value.push(c);
                    }
                }
                bail!("Unclosed string at {}", self.parser.location(start))
            }
            _ => {
                let word = self.word();
                if word.is_empty() {
                    bail!(
                        "Unexpected character at {}",
                        self.parser.location(start)
                    );
                }
                self.pos += word.len();
                let span = self.parser.span(start, self.pos);
                let is_number = word.parse::<f64>().is_ok();
                let kind = if is_number || matches!(word, "true" | "false" | "null" | "undefined")
                {
                    NodeKind::Literal
                } else {
                    NodeKind::PathExpression
                };
                Ok(SyntaxNode::new(kind, span).with_value(word))
            }
        }
    }

    /// A path or literal word; `[...]` segments may contain spaces.
    fn word(&self) -> &'a str {
        let rest = self.rest();
        let mut in_brackets = false;
        for (i, c) in rest.char_indices() {
            match c {
                '[' => in_brackets = true,
                ']' => in_brackets = false,
                _ if in_brackets => {}
                c if c.is_whitespace() || matches!(c, '(' | ')' | '=' | '\'' | '"' | '|') => {
                    return &rest[..i];
                }
                _ => {}
            }
        }
        rest
    }
}

#[cfg(test)]
mod tests {
    use crate::core::parsers::template::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_helper_call_with_params_and_hash() {
        let code = "<p>{{MSG 'Привет' \"ctx\" count=3}}</p>";
        let ast = parse_template(code).unwrap();
        let index = LineIndex::new(code);

        let mustache = &ast.children[0].node;
        assert_eq!(mustache.kind, NodeKind::MustacheStatement);
        assert_eq!(mustache.value_at("path"), Some("MSG"));
        assert_eq!(mustache.value_at("params[0]"), Some("Привет"));
        assert_eq!(mustache.value_at("params[1]"), Some("ctx"));
        assert_eq!(mustache.value_at("hash"), Some("count"));
        assert_eq!(mustache.kind_at("hash.value"), Some(NodeKind::Literal));

        let (start, end) = mustache.get("params[0]").unwrap().span.resolve(&index);
        assert_eq!(&code[start..end], "'Привет'");
        assert!(matches!(mustache.span, Span::LineColumn { .. }));
    }

    #[test]
    fn test_only_the_delimiting_quote_is_unescaped() {
        let ast = parse_template(r#"{{MSG 'Д\'Артаньян \ "x"' "a\"b\'"}}"#).unwrap();
        let mustache = &ast.children[0].node;
        assert_eq!(mustache.value_at("params[0]"), Some(r#"Д'Артаньян \ "x""#));
        assert_eq!(mustache.value_at("params[1]"), Some(r#"a"b\'"#));
    }

    #[test]
    fn test_parses_sub_expressions_and_blocks() {
        let code = "{{#if ok}}\n  {{link (MSG 'Ссылка') href=url}}\n{{else}}x{{/if}}";
        let ast = parse_template(code).unwrap();
        let index = LineIndex::new(code);

        let kinds: Vec<NodeKind> = ast.children.iter().map(|c| c.node.kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::BlockStatement, NodeKind::MustacheStatement]
        );
        let sub = ast.children[1].node.get("params[0]").unwrap();
        assert_eq!(sub.kind, NodeKind::SubExpression);
        assert_eq!(sub.value_at("path"), Some("MSG"));
        let (start, end) = sub.span.resolve(&index);
        assert_eq!(&code[start..end], "(MSG 'Ссылка')");
    }

    #[test]
    fn test_skips_comments_and_escaped_mustaches() {
        let code = "{{!-- {{MSG 'a'}} --}}{{! note }}\\{{MSG 'b'}}";
        let ast = parse_template(code).unwrap();
        assert!(ast.children.is_empty());
    }

    #[test]
    fn test_reports_structural_errors() {
        assert!(parse_template("{{MSG 'a'").is_err());
        assert!(parse_template("{{MSG 'a}}").is_err());
        assert!(parse_template("{{#if a}}x{{/each}}").is_err());
        assert!(parse_template("{{#if a}}x").is_err());
        assert!(parse_template("{{link (MSG 'a' }}").is_err());
    }
}
