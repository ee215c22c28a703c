//! Cheap inspection of stored contract code.
//!
//! Removing a contract is only allowed if its current code declares no
//! enumerated type. The full parser is not available to this layer, so
//! the check goes through [`ProgramInspector`]; [`DeclarationScanner`] is
//! the built-in implementation.

use thiserror::Error;

/// Reasons stored code could not be inspected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("code is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    #[error("unterminated block comment starting at byte {offset}")]
    UnterminatedComment { offset: usize },

    #[error("unterminated string literal starting at byte {offset}")]
    UnterminatedString { offset: usize },

    #[error("unexpected `{found}` at byte {offset}")]
    UnexpectedDelimiter { offset: usize, found: char },

    #[error("`{open}` at byte {offset} is never closed")]
    UnclosedDelimiter { offset: usize, open: char },
}

/// Answers whether a program declares an enumerated type.
pub trait ProgramInspector {
    fn declares_enum(&self, code: &[u8]) -> Result<bool, ParseError>;
}

/// Token-level scanner for enum declarations.
///
/// Comments and string literals are skipped, brackets must balance, and
/// the keyword `enum` followed by an identifier counts as a declaration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationScanner;

fn closer(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

impl ProgramInspector for DeclarationScanner {
    fn declares_enum(&self, code: &[u8]) -> Result<bool, ParseError> {
        let source = std::str::from_utf8(code).map_err(|e| ParseError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })?;
        let mut chars = source.char_indices().peekable();
        let mut open: Vec<(usize, char)> = Vec::new();
        let mut after_enum_keyword = false;
        let mut found = false;

        while let Some((offset, c)) = chars.next() {
            match c {
                '/' if chars.peek().map(|&(_, n)| n) == Some('/') => {
                    for (_, n) in chars.by_ref() {
                        if n == '\n' {
                            break;
                        }
                    }
                }
                '/' if chars.peek().map(|&(_, n)| n) == Some('*') => {
                    chars.next();
                    let mut depth = 1usize;
                    while depth > 0 {
                        match chars.next() {
                            Some((_, '*')) if chars.peek().map(|&(_, n)| n) == Some('/') => {
                                chars.next();
                                depth -= 1;
                            }
                            Some((_, '/')) if chars.peek().map(|&(_, n)| n) == Some('*') => {
                                chars.next();
                                depth += 1;
                            }
                            Some(_) => {}
                            None => return Err(ParseError::UnterminatedComment { offset }),
                        }
                    }
                }
                '"' => {
                    after_enum_keyword = false;
                    loop {
                        match chars.next() {
                            Some((_, '\\')) => {
                                chars.next();
                            }
                            Some((_, '"')) => break,
                            Some(_) => {}
                            None => return Err(ParseError::UnterminatedString { offset }),
                        }
                    }
                }
                '(' | '[' | '{' => {
                    after_enum_keyword = false;
                    open.push((offset, c));
                }
                ')' | ']' | '}' => {
                    after_enum_keyword = false;
                    match open.pop() {
                        Some((_, o)) if closer(o) == c => {}
                        _ => return Err(ParseError::UnexpectedDelimiter { offset, found: c }),
                    }
                }
                c if is_ident_start(c) => {
                    let mut end = offset + c.len_utf8();
                    while let Some(&(i, n)) = chars.peek() {
                        if !is_ident_continue(n) {
                            break;
                        }
                        end = i + n.len_utf8();
                        chars.next();
                    }
                    let ident = &source[offset..end];
                    if after_enum_keyword {
                        found = true;
                    }
                    after_enum_keyword = ident == "enum";
                }
                c if c.is_whitespace() => {}
                _ => after_enum_keyword = false,
            }
        }

        if let Some(&(offset, open)) = open.last() {
            return Err(ParseError::UnclosedDelimiter { offset, open });
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(code: &str) -> Result<bool, ParseError> {
        DeclarationScanner.declares_enum(code.as_bytes())
    }

    #[test]
    fn test_plain_contract_has_no_enum() {
        let code = "access(all) contract Foo {\n  access(all) fun hello(): String { return \"hi\" }\n}";
        assert_eq!(scan(code), Ok(false));
    }

    #[test]
    fn test_detects_enum_declaration() {
        let code = "access(all) contract Foo {\n  access(all) enum Color: UInt8 {\n    access(all) case red\n  }\n}";
        assert_eq!(scan(code), Ok(true));
    }

    #[test]
    fn test_enum_in_comments_and_strings_ignored() {
        let code = "// enum Old\ncontract Foo { /* enum A /* enum B */ */ let s = \"enum C\" }";
        assert_eq!(scan(code), Ok(false));
    }

    #[test]
    fn test_enum_keyword_alone_is_not_a_declaration() {
        assert_eq!(scan("contract Foo { let enum = 1 }"), Ok(false));
        assert_eq!(scan("contract Foo { enum /* c */ Kind {} }"), Ok(true));
    }

    #[test]
    fn test_escaped_quote_in_string() {
        assert_eq!(scan(r#"contract Foo { let s = "a \" enum X" }"#), Ok(false));
    }

    #[test]
    fn test_identifier_containing_enum() {
        assert_eq!(scan("contract Foo { let enumerate = 1 }"), Ok(false));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            scan("contract Foo {"),
            Err(ParseError::UnclosedDelimiter { offset: 13, open: '{' })
        );
        assert_eq!(
            scan("contract Foo )"),
            Err(ParseError::UnexpectedDelimiter { offset: 13, found: ')' })
        );
        assert!(matches!(scan("/* open"), Err(ParseError::UnterminatedComment { .. })));
        assert!(matches!(scan("\"open"), Err(ParseError::UnterminatedString { .. })));
        assert!(matches!(
            DeclarationScanner.declares_enum(&[0xff, 0xfe]),
            Err(ParseError::InvalidUtf8 { valid_up_to: 0 })
        ));
    }
}
