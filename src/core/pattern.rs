//! Key path patterns.
//!
//! A pattern names a position in a parameter tree: keys separated by `/`,
//! `*` standing for exactly one key of any name, and `{a,b,...}` groups that
//! expand the pattern into alternatives. Groups may sit anywhere, may span
//! several segments and may nest:
//!
//! - `{ren1,sub/*/ren1}` -> `ren1`, `sub/*/ren1`
//! - `sub/{a,b}/leaf`    -> `sub/a/leaf`, `sub/b/leaf`
//! - `x{1,2}`            -> `x1`, `x2`
//!
//! Literal segments compare case-insensitively but keep their original
//! spelling so errors and `Display` show what the author wrote.

use crate::error::{Error, Result};
use std::fmt;

/// One step of a compiled key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Wildcard,
}

impl Segment {
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Segment::Wildcard => true,
            Segment::Literal(literal) => eq_fold(literal, key),
        }
    }
}

/// Whole-string folding, the same rule keys go through, so context-sensitive
/// mappings such as a word-final capital sigma agree on both sides.
fn eq_fold(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// A fully expanded pattern: a non-empty, fixed-length list of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when `path` has exactly as many keys as the pattern has
    /// segments and every key satisfies its segment.
    pub fn matches<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.segments.len() == path.len()
            && self
                .segments
                .iter()
                .zip(path)
                .all(|(segment, key)| segment.matches(key.as_ref()))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match segment {
                Segment::Literal(literal) => f.write_str(literal)?,
                Segment::Wildcard => f.write_str("*")?,
            }
        }
        Ok(())
    }
}

/// Compile one pattern string into all of its alternatives.
pub fn compile(raw: &str) -> Result<Vec<PathPattern>> {
    if raw.is_empty() {
        return Err(Error::pattern_syntax(raw, "pattern is empty", None));
    }

    let alternatives = Expander::new(raw).expand()?;

    alternatives
        .iter()
        .map(|alternative| parse_segments(raw, alternative))
        .collect()
}

fn parse_segments(raw: &str, alternative: &str) -> Result<PathPattern> {
    if alternative.is_empty() {
        return Err(Error::pattern_syntax(
            raw,
            "alternative has no segments",
            None,
        ));
    }

    let segments = alternative
        .split('/')
        .map(|segment| match segment {
            "" => Err(Error::pattern_syntax(
                raw,
                format!("empty segment in '{}'", alternative),
                None,
            )),
            "*" => Ok(Segment::Wildcard),
            s if s.contains('*') => Err(Error::pattern_syntax(
                raw,
                format!("'*' must be a whole segment, found '{}'", s),
                None,
            )),
            s => Ok(Segment::Literal(s.to_string())),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PathPattern { segments })
}

/// Brace expansion over the raw pattern text.
///
/// `sequence := (text | group)*`, `group := '{' sequence (',' sequence)* '}'`.
/// Commas outside any group are ordinary characters.
struct Expander<'a> {
    raw: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Expander<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            chars: raw.char_indices().collect(),
            pos: 0,
        }
    }

    fn expand(mut self) -> Result<Vec<String>> {
        self.sequence(0)
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn sequence(&mut self, depth: usize) -> Result<Vec<String>> {
        let mut acc = vec![String::new()];

        while let Some((offset, c)) = self.peek() {
            match c {
                '}' if depth == 0 => {
                    return Err(Error::pattern_syntax(
                        self.raw,
                        "unmatched '}'",
                        Some(offset),
                    ));
                }
                '}' | ',' if depth > 0 => return Ok(acc),
                '{' => {
                    self.pos += 1;
                    let alternatives = self.group(offset, depth + 1)?;
                    acc = acc
                        .iter()
                        .flat_map(|prefix| {
                            alternatives
                                .iter()
                                .map(move |alternative| format!("{}{}", prefix, alternative))
                        })
                        .collect();
                }
                _ => {
                    self.pos += 1;
                    acc.iter_mut().for_each(|prefix| prefix.push(c));
                }
            }
        }

        Ok(acc)
    }

    /// Parse the inside of a group whose `{` sits at `open`.
    fn group(&mut self, open: usize, depth: usize) -> Result<Vec<String>> {
        let mut alternatives = Vec::new();
        let mut count = 0usize;

        loop {
            let start = self.pos;
            let part = self.sequence(depth)?;
            let empty = self.pos == start;

            match self.peek() {
                Some((offset, ',')) => {
                    if empty {
                        return Err(Error::pattern_syntax(
                            self.raw,
                            "empty alternative",
                            Some(offset),
                        ));
                    }
                    self.pos += 1;
                }
                Some((offset, '}')) => {
                    if empty {
                        let problem = if count == 0 {
                            "empty alternation group"
                        } else {
                            "empty alternative"
                        };
                        return Err(Error::pattern_syntax(self.raw, problem, Some(offset)));
                    }
                    self.pos += 1;
                    alternatives.extend(part);
                    return Ok(alternatives);
                }
                _ => {
                    return Err(Error::pattern_syntax(
                        self.raw,
                        "unclosed '{'",
                        Some(open),
                    ));
                }
            }

            alternatives.extend(part);
            count += 1;
        }
    }
}

/// A set of alternative patterns that all rename to one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRule {
    patterns: Vec<PathPattern>,
    replacement: String,
}

impl RenameRule {
    /// Compile every raw pattern and bind them to `replacement`.
    ///
    /// The replacement is stored lower-cased, the form it takes in `Params`.
    pub fn compile<S: AsRef<str>>(replacement: &str, raw_patterns: &[S]) -> Result<Self> {
        let label = raw_patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join(", ");

        if replacement.trim().is_empty() {
            return Err(Error::pattern_syntax(label, "replacement key is empty", None));
        }

        if raw_patterns.is_empty() {
            return Err(Error::pattern_syntax(
                label,
                format!("no patterns given for '{}'", replacement),
                None,
            ));
        }

        let mut patterns = Vec::new();
        for raw in raw_patterns {
            patterns.extend(compile(raw.as_ref())?);
        }

        Ok(Self {
            patterns,
            replacement: replacement.to_lowercase(),
        })
    }

    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn matches<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }
}
