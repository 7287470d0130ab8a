//! Selector dialects understood by the markup accessor
//!
//! Both dialects compile down to one or more CSS selectors plus a terminal that says
//! what to read from each matched element.
//!
//! **Structural path** (XPath-like subset):
//!
//! ```text
//! //meta[@property="og:title"]/@content
//! //title/text()
//! //div[contains(@class, "story")]//p/text()
//! ```
//!
//! **Shorthand** (CSS with a pseudo-element terminal):
//!
//! ```text
//! h1::text
//! time::attr(datetime)
//! div.article-body p::text, article p::text
//! ```

use crate::ParseError;
use scraper::{ElementRef, Selector};

/// What a query reads from each matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    /// Direct child text nodes, one value per node
    Text,
    /// All descendant text nodes, one value per node
    DescendantText,
    /// The value of an attribute, when present
    Attr(String),
    /// The element's whole text content as a single value
    Content,
}

impl Terminal {
    /// Appends the values this terminal reads from `element`
    fn read_into(&self, element: &ElementRef, out: &mut Vec<String>) {
        match self {
            Self::Text => out.extend(
                element
                    .children()
                    .filter_map(|child| child.value().as_text())
                    .map(|text| String::from(&**text)),
            ),
            Self::DescendantText => out.extend(element.text().map(str::to_string)),
            Self::Attr(name) => {
                if let Some(value) = element.value().attr(name) {
                    out.push(value.to_string());
                }
            }
            Self::Content => out.push(element.text().collect()),
        }
    }
}

/// One alternative of a query: a compiled selector and its terminal
#[derive(Debug)]
struct Alternative {
    selector: Selector,
    terminal: Terminal,
}

/// A compiled query in either dialect
///
/// Alternatives form a union: matches are reported in document order, and an element
/// matched by several alternatives with the same terminal is reported once.
#[derive(Debug)]
pub struct Query {
    alternatives: Vec<Alternative>,
}

impl Query {
    /// Compiles a shorthand (CSS + `::text` / `::attr(name)`) query
    pub fn shorthand(expr: &str) -> Result<Self, ParseError> {
        let alternatives = split_top_level(expr, ',')
            .into_iter()
            .map(|part| compile_shorthand(expr, part.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        if alternatives.is_empty() {
            return Err(selector_error(expr, "empty selector"));
        }

        Ok(Self { alternatives })
    }

    /// Compiles a structural path query
    pub fn path(expr: &str) -> Result<Self, ParseError> {
        let alternatives = split_top_level(expr, '|')
            .into_iter()
            .map(|part| compile_path(expr, part.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { alternatives })
    }

    /// Returns true if `expr` is written in the structural path dialect
    ///
    /// Expressions starting with `/` are structural paths; anything else is shorthand.
    pub fn is_path(expr: &str) -> bool {
        expr.trim_start().starts_with('/')
    }

    /// Compiles a query, picking the dialect from its shape
    pub fn parse(expr: &str) -> Result<Self, ParseError> {
        if Self::is_path(expr) {
            Self::path(expr)
        } else {
            Self::shorthand(expr)
        }
    }

    /// Runs the query over every element under `root`, in document order
    pub fn evaluate(&self, root: ElementRef) -> Vec<String> {
        let mut values = Vec::new();
        let mut seen: Vec<&Terminal> = Vec::new();

        for element in root.descendants().filter_map(ElementRef::wrap) {
            seen.clear();
            for alternative in &self.alternatives {
                if seen.contains(&&alternative.terminal) {
                    continue;
                }
                if alternative.selector.matches(&element) {
                    alternative.terminal.read_into(&element, &mut values);
                    seen.push(&alternative.terminal);
                }
            }
        }

        values
    }
}

fn selector_error(expr: &str, message: impl Into<String>) -> ParseError {
    ParseError::Selector {
        selector: expr.to_string(),
        message: message.into(),
    }
}

fn compile_css(expr: &str, css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| selector_error(expr, format!("{:?}", e)))
}

/// Compiles one comma-separated part of a shorthand query
fn compile_shorthand(expr: &str, part: &str) -> Result<Alternative, ParseError> {
    if part.is_empty() {
        return Err(selector_error(expr, "empty alternative"));
    }

    let (css, terminal) = if let Some(css) = part.strip_suffix("::text") {
        (css, Terminal::Text)
    } else if let Some(idx) = part.rfind("::attr(") {
        let name = part[idx + "::attr(".len()..]
            .strip_suffix(')')
            .map(|n| n.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|n| !n.is_empty())
            .ok_or_else(|| selector_error(expr, "malformed ::attr() terminal"))?;
        (&part[..idx], Terminal::Attr(name.to_string()))
    } else {
        (part, Terminal::Content)
    };

    let css = css.trim();
    if css.is_empty() {
        return Err(selector_error(expr, "terminal without a selector"));
    }

    Ok(Alternative {
        selector: compile_css(expr, css)?,
        terminal,
    })
}

/// Compiles one `|`-separated part of a structural path query
fn compile_path(expr: &str, part: &str) -> Result<Alternative, ParseError> {
    let mut cursor = PathCursor::new(part);
    let mut css = String::new();
    let mut terminal = Terminal::Content;
    let mut first = true;

    while !cursor.at_end() {
        let descendant = if cursor.eat("//") {
            true
        } else if cursor.eat("/") {
            false
        } else {
            return Err(selector_error(expr, format!("expected '/' at '{}'", cursor.rest())));
        };

        if cursor.eat("@") {
            let name = cursor.name();
            if name.is_empty() || !cursor.at_end() {
                return Err(selector_error(expr, "attribute step must be last"));
            }
            terminal = Terminal::Attr(name.to_string());
            break;
        }

        if cursor.eat("text()") {
            if !cursor.at_end() {
                return Err(selector_error(expr, "text() step must be last"));
            }
            terminal = if descendant {
                Terminal::DescendantText
            } else {
                Terminal::Text
            };
            break;
        }

        let tag = if cursor.eat("*") { "*" } else { cursor.name() };
        if tag.is_empty() {
            return Err(selector_error(expr, format!("expected a tag at '{}'", cursor.rest())));
        }

        if first {
            css.push_str(tag);
            if !descendant {
                css.push_str(":root");
            }
        } else {
            css.push_str(if descendant { " " } else { " > " });
            css.push_str(tag);
        }
        first = false;

        while cursor.eat("[") {
            css.push_str(&cursor.predicate().map_err(|m| selector_error(expr, m))?);
        }
    }

    if first {
        return Err(selector_error(expr, "path has no element step"));
    }

    Ok(Alternative {
        selector: compile_css(expr, &css)?,
        terminal,
    })
}

/// Minimal cursor over a structural path expression
struct PathCursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> PathCursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Reads a tag or attribute name (may contain `:`, `-`, `_`, `.`)
    fn name(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn quoted(&mut self) -> Result<&'a str, String> {
        self.skip_ws();
        let quote = match self.rest().chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(format!("expected a quoted value at '{}'", self.rest())),
        };
        self.pos += 1;
        let rest = self.rest();
        let end = rest
            .find(quote)
            .ok_or_else(|| "unterminated string".to_string())?;
        self.pos += end + 1;
        Ok(&rest[..end])
    }

    /// Parses a predicate body after `[`, returning the CSS attribute selector
    fn predicate(&mut self) -> Result<String, String> {
        self.skip_ws();
        let css = if self.eat("contains(") {
            self.skip_ws();
            if !self.eat("@") {
                return Err("contains() expects an attribute".to_string());
            }
            let attr = self.name();
            self.skip_ws();
            if !self.eat(",") {
                return Err("contains() expects two arguments".to_string());
            }
            let value = self.quoted()?;
            self.skip_ws();
            if !self.eat(")") {
                return Err("unterminated contains()".to_string());
            }
            format!("[{}*=\"{}\"]", css_attr_name(attr), value)
        } else if self.eat("@") {
            let attr = self.name();
            if attr.is_empty() {
                return Err("expected an attribute name".to_string());
            }
            self.skip_ws();
            if self.eat("=") {
                let value = self.quoted()?;
                format!("[{}=\"{}\"]", css_attr_name(attr), value)
            } else {
                format!("[{}]", css_attr_name(attr))
            }
        } else {
            return Err(format!("unsupported predicate at '{}'", self.rest()));
        };

        self.skip_ws();
        if !self.eat("]") {
            return Err("unterminated predicate".to_string());
        }
        Ok(css)
    }
}

/// Escapes characters CSS does not allow bare in attribute names
fn css_attr_name(name: &str) -> String {
    name.replace(':', "\\:").replace('.', "\\.")
}

/// Splits on `sep` outside of brackets, parentheses and quotes
fn split_top_level(expr: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in expr.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth -= 1,
            (None, c) if c == sep && depth == 0 => {
                parts.push(&expr[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&expr[start..]);
    parts
}
