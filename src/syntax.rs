//! Tolerant C# surface scanning
//!
//! The pipeline only needs to handle namespace declarations, using directives,
//! and top-level type declarations precisely; full semantic analysis is not
//! required. This module is a tolerant token scanner over the raw text: it
//! skips comments, string/char literals and everything else it does not
//! recognize, and reports byte spans so callers can rewrite in place without
//! disturbing surrounding formatting.

use std::collections::HashSet;
use std::ops::Range;
use thiserror::Error;

/// Surface-grammar failure. Mapped to `AssemblyError::ParseFailure` together
/// with the offending file name by the caller.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SyntaxError(pub String);

/// A namespace declaration found in a file. `span` is the byte range of the
/// dotted path itself, not the whole declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub path: String,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(Range<usize>),
    Sym(char),
}

/// Scan `text` into words and punctuation, skipping whitespace, line and
/// block comments, and string/char literals (including verbatim `@"..."`).
fn scan_tokens(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
            }
            b'@' if i + 1 < bytes.len() && bytes[i + 1] == b'"' => {
                // Verbatim string: "" is an escaped quote
                i += 2;
                while i < bytes.len() {
                    if bytes[i] == b'"' {
                        if i + 1 < bytes.len() && bytes[i + 1] == b'"' {
                            i += 2;
                            continue;
                        }
                        i += 1;
                        break;
                    }
                    i += 1;
                }
            }
            b'"' => {
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' => i += 2,
                        b'"' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
            }
            b'\'' => {
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' => i += 2,
                        b'\'' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
            }
            _ if b == b'_' || b.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                    i += 1;
                }
                tokens.push(Token::Word(start..i));
            }
            _ if b.is_ascii_whitespace() => i += 1,
            _ => {
                tokens.push(Token::Sym(b as char));
                i += 1;
            }
        }
    }
    tokens
}

/// Find the first namespace declaration at file scope.
///
/// Returns `Ok(None)` for files with no declaration. A `namespace` keyword
/// not followed by a dotted identifier is a syntax error.
pub fn find_namespace(text: &str) -> Result<Option<NamespaceDecl>, SyntaxError> {
    let tokens = scan_tokens(text);
    let mut depth: i32 = 0;
    let mut idx = 0;
    while idx < tokens.len() {
        match &tokens[idx] {
            Token::Sym('{') => depth += 1,
            Token::Sym('}') => depth -= 1,
            Token::Word(span) if depth == 0 && &text[span.clone()] == "namespace" => {
                let (path, path_span) = parse_dotted_path(text, &tokens, idx + 1)
                    .ok_or_else(|| {
                        SyntaxError("namespace keyword not followed by an identifier".to_string())
                    })?;
                return Ok(Some(NamespaceDecl {
                    path,
                    span: path_span,
                }));
            }
            _ => {}
        }
        idx += 1;
    }
    Ok(None)
}

/// Parse `Ident(.Ident)*` starting at token `start`; returns the joined path
/// and the byte span from the first to the last identifier.
fn parse_dotted_path(
    text: &str,
    tokens: &[Token],
    start: usize,
) -> Option<(String, Range<usize>)> {
    let first = match tokens.get(start) {
        Some(Token::Word(span)) => span.clone(),
        _ => return None,
    };
    let mut end = first.end;
    let mut idx = start + 1;
    while idx + 1 < tokens.len() {
        match (&tokens[idx], &tokens[idx + 1]) {
            (Token::Sym('.'), Token::Word(span)) => {
                end = span.end;
                idx += 2;
            }
            _ => break,
        }
    }
    let span = first.start..end;
    Some((text[span.clone()].to_string(), span))
}

const TYPE_KEYWORDS: [&str; 5] = ["class", "struct", "interface", "enum", "record"];

/// Scan top-level type declaration names.
///
/// Top-level means brace depth 0 (file-scoped namespace) or 1 (inside a block
/// namespace); nested types are not recorded. `record class` / `record
/// struct` yield the name after the second keyword.
pub fn scan_type_names(text: &str) -> Vec<String> {
    let tokens = scan_tokens(text);
    let mut names = Vec::new();
    let mut depth: i32 = 0;
    let mut idx = 0;
    while idx < tokens.len() {
        match &tokens[idx] {
            Token::Sym('{') => depth += 1,
            Token::Sym('}') => depth -= 1,
            Token::Word(span) if depth <= 1 => {
                let word = &text[span.clone()];
                if TYPE_KEYWORDS.contains(&word) {
                    let mut name_idx = idx + 1;
                    if word == "record" {
                        if let Some(Token::Word(next)) = tokens.get(name_idx) {
                            let next_word = &text[next.clone()];
                            if next_word == "class" || next_word == "struct" {
                                name_idx += 1;
                            }
                        }
                    }
                    if let Some(Token::Word(name_span)) = tokens.get(name_idx) {
                        names.push(text[name_span.clone()].to_string());
                        idx = name_idx;
                    }
                }
            }
            _ => {}
        }
        idx += 1;
    }
    names
}

/// Collect every bare identifier token in the text.
///
/// Deliberately imprecise: a local variable sharing a name with an indexed
/// type produces a harmless extra import, never a missing one.
pub fn scan_identifiers(text: &str) -> HashSet<String> {
    scan_tokens(text)
        .into_iter()
        .filter_map(|token| match token {
            Token::Word(span) => Some(text[span].to_string()),
            Token::Sym(_) => None,
        })
        .collect()
}

/// Collect the identifiers referenced in the file body.
///
/// Using-directive lines and the namespace declaration path are excluded:
/// their dotted segments are import plumbing, not code references, and
/// scanning them would let a freshly inserted directive feed new identifiers
/// into the next reconciliation run.
pub fn body_identifiers(text: &str) -> Result<HashSet<String>, SyntaxError> {
    let mut body: String = text
        .split_inclusive('\n')
        .filter(|line| using_target(line).is_none())
        .collect();
    if let Some(decl) = find_namespace(&body)? {
        body.replace_range(decl.span, "");
    }
    Ok(scan_identifiers(&body))
}

/// Extract the target of a using-directive line, if the line is one.
///
/// Handles `using X.Y;`, `global using X.Y;`, `using static T;`, alias forms
/// `using A = B;` (the right-hand side is the target), and a trailing `//`
/// comment after the semicolon. `using (...)` statements and `using var`
/// declarations are not directives.
pub fn using_target(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let trimmed = match trimmed.split_once("//") {
        Some((before, _)) => before.trim_end(),
        None => trimmed,
    };
    let trimmed = match trimmed.strip_prefix("global") {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_whitespace()) => rest.trim_start(),
        _ => trimmed,
    };
    let rest = trimmed.strip_prefix("using")?;
    if !rest.starts_with(|c: char| c.is_ascii_whitespace()) {
        return None;
    }
    let body = rest.trim().strip_suffix(';')?.trim();
    let body = match body.strip_prefix("static") {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_whitespace()) => rest.trim_start(),
        _ => body,
    };
    let body = match body.split_once('=') {
        Some((_, rhs)) => rhs.trim(),
        None => body,
    };
    if body.is_empty()
        || !body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return None;
    }
    Some(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_namespace_block_scoped() {
        let text = "using System;\n\nnamespace Old.Ns\n{\n    class A { }\n}\n";
        let decl = find_namespace(text).unwrap().unwrap();
        assert_eq!(decl.path, "Old.Ns");
        assert_eq!(&text[decl.span], "Old.Ns");
    }

    #[test]
    fn test_find_namespace_file_scoped() {
        let text = "namespace Old.Ns;\n\nclass A { }\n";
        let decl = find_namespace(text).unwrap().unwrap();
        assert_eq!(decl.path, "Old.Ns");
    }

    #[test]
    fn test_find_namespace_absent() {
        assert_eq!(find_namespace("class A { }\n").unwrap(), None);
    }

    #[test]
    fn test_find_namespace_ignores_comments_and_strings() {
        let text = "// namespace Commented.Out\nvar s = \"namespace Fake\";\n";
        assert_eq!(find_namespace(text).unwrap(), None);
    }

    #[test]
    fn test_find_namespace_malformed_is_error() {
        assert!(find_namespace("namespace ;\n").is_err());
        assert!(find_namespace("namespace").is_err());
    }

    #[test]
    fn test_scan_type_names_top_level_only() {
        let text = r#"
namespace Ns
{
    public class Outer
    {
        class Nested { }
    }
    internal interface IThing { }
    enum Color { Red }
    public record struct Point(int X, int Y);
}
"#;
        let names = scan_type_names(text);
        assert_eq!(names, vec!["Outer", "IThing", "Color", "Point"]);
    }

    #[test]
    fn test_scan_type_names_file_scoped_namespace() {
        let text = "namespace Ns;\n\npublic class Widget { }\n";
        assert_eq!(scan_type_names(text), vec!["Widget"]);
    }

    #[test]
    fn test_scan_identifiers_skips_literals() {
        let text = "var x = Helper.Run(\"NotAnIdent\"); // NorThis\n";
        let idents = scan_identifiers(text);
        assert!(idents.contains("Helper"));
        assert!(idents.contains("Run"));
        assert!(idents.contains("x"));
        assert!(!idents.contains("NotAnIdent"));
        assert!(!idents.contains("NorThis"));
    }

    #[test]
    fn test_using_target_forms() {
        assert_eq!(using_target("using System.Linq;"), Some("System.Linq".into()));
        assert_eq!(
            using_target("  global using My.Stuff;"),
            Some("My.Stuff".into())
        );
        assert_eq!(
            using_target("using static System.Math;"),
            Some("System.Math".into())
        );
        assert_eq!(using_target("using Alias = Real.Target;"), Some("Real.Target".into()));
    }

    #[test]
    fn test_using_target_tolerates_trailing_comment() {
        assert_eq!(
            using_target("using X.Y; // legacy dependency"),
            Some("X.Y".into())
        );
        assert_eq!(using_target("using X.Y;// note"), Some("X.Y".into()));
        assert_eq!(using_target("// using X.Y;"), None);
    }

    #[test]
    fn test_using_target_tolerates_extra_whitespace() {
        assert_eq!(using_target("global\tusing My.Stuff;"), Some("My.Stuff".into()));
        assert_eq!(
            using_target("using static  System.Math;"),
            Some("System.Math".into())
        );
    }

    #[test]
    fn test_body_identifiers_excludes_directives_and_namespace() {
        let text =
            "using Base.Models;\n\nnamespace Base.Services;\n\nclass A { Widget w; }\n";
        let idents = body_identifiers(text).unwrap();
        assert!(idents.contains("Widget"));
        assert!(idents.contains("A"));
        assert!(!idents.contains("Models"));
        assert!(!idents.contains("Services"));
        assert!(!idents.contains("Base"));
    }

    #[test]
    fn test_using_target_rejects_statements() {
        assert_eq!(using_target("using (var f = File.Open(p))"), None);
        assert_eq!(using_target("using var scope = logger.Begin();"), None);
        assert_eq!(using_target("user.Sing();"), None);
    }
}
