/*
 * Character Codes
 *
 * Character constants and predicates used by the markup lexer
 */
#![allow(dead_code)]

pub const EOF: char = '\0';
pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const NEWLINE: char = '\n';
pub const FF: char = '\x0C';
pub const CR: char = '\r';
pub const SPACE: char = ' ';
pub const NBSP: char = '\u{00A0}';

pub const BANG: char = '!';
pub const DQ: char = '"';
pub const HASH: char = '#';
pub const AMPERSAND: char = '&';
pub const SQ: char = '\'';
pub const MINUS: char = '-';
pub const SLASH: char = '/';
pub const SEMICOLON: char = ';';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const LBRACKET: char = '[';

pub fn is_whitespace(code: char) -> bool {
    matches!(code, SPACE | TAB | LF | CR | FF)
}

pub fn is_digit(code: char) -> bool {
    code.is_ascii_digit()
}

pub fn is_ascii_letter(code: char) -> bool {
    code.is_ascii_alphabetic()
}

pub fn is_ascii_hex_digit(code: char) -> bool {
    code.is_ascii_hexdigit()
}

pub fn is_quote(code: char) -> bool {
    code == SQ || code == DQ
}
