//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers
//! - Numeric literals, including malformed runs of dots
//! - Punctuation
//! - Comments
//! - Line/column tracking

use super::{
    lexer::{tokenize, Lexer},
    tokens::TokenKind,
};

#[test]
fn test_tokenize_keywords() {
    let source = "def extern if then else for in binary unary var".to_string();
    let tokens = tokenize(source, Some("test.ks".to_string()));

    assert_eq!(tokens[0].kind, TokenKind::Def);
    assert_eq!(tokens[1].kind, TokenKind::Extern);
    assert_eq!(tokens[2].kind, TokenKind::If);
    assert_eq!(tokens[3].kind, TokenKind::Then);
    assert_eq!(tokens[4].kind, TokenKind::Else);
    assert_eq!(tokens[5].kind, TokenKind::For);
    assert_eq!(tokens[6].kind, TokenKind::In);
    assert_eq!(tokens[7].kind, TokenKind::Binary);
    assert_eq!(tokens[8].kind, TokenKind::Unary);
    assert_eq!(tokens[9].kind, TokenKind::Var);
    assert_eq!(tokens[10].kind, TokenKind::EOF);
    assert_eq!(tokens.len(), 11);
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo bar9 CamelCase definitely ifx".to_string();
    let tokens = tokenize(source, Some("test.ks".to_string()));

    let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, vec!["foo", "bar9", "CamelCase", "definitely", "ifx", "EOF"]);
    assert!(tokens[..5].iter().all(|t| t.kind == TokenKind::Identifier));
}

#[test]
fn test_underscore_is_not_an_identifier_character() {
    let tokens = tokenize("a_b".to_string(), None);

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "a");
    assert_eq!(tokens[1].kind, TokenKind::Punct('_'));
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
    assert_eq!(tokens[2].value, "b");
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 3.14 0 .5 100.".to_string();
    let tokens = tokenize(source, Some("test.ks".to_string()));

    assert!(tokens[..5].iter().all(|t| t.kind == TokenKind::Number));
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].value, "0");
    assert_eq!(tokens[3].value, ".5");
    assert_eq!(tokens[4].value, "100.");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_number_with_many_dots_is_one_token() {
    let tokens = tokenize("1.2.3+4".to_string(), None);

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "1.2.3");
    assert_eq!(tokens[1].kind, TokenKind::Punct('+'));
    assert_eq!(tokens[2].value, "4");
}

#[test]
fn test_tokenize_punctuation() {
    let source = "( ) , ; + - * < = ! | ^".to_string();
    let tokens = tokenize(source, Some("test.ks".to_string()));

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Punct('('),
            TokenKind::Punct(')'),
            TokenKind::Punct(','),
            TokenKind::Punct(';'),
            TokenKind::Punct('+'),
            TokenKind::Punct('-'),
            TokenKind::Punct('*'),
            TokenKind::Punct('<'),
            TokenKind::Punct('='),
            TokenKind::Punct('!'),
            TokenKind::Punct('|'),
            TokenKind::Punct('^'),
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_operators_are_single_characters() {
    let tokens = tokenize("a==b".to_string(), None);

    assert_eq!(tokens[1].kind, TokenKind::Punct('='));
    assert_eq!(tokens[2].kind, TokenKind::Punct('='));
}

#[test]
fn test_tokenize_comments() {
    let source = "x # comment with def and 1.2\ny # another\n#last".to_string();
    let tokens = tokenize(source, Some("test.ks".to_string()));

    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0].value, "x");
    assert_eq!(tokens[1].value, "y");
    assert_eq!(tokens[2].kind, TokenKind::EOF);
}

#[test]
fn test_empty_source() {
    let tokens = tokenize(String::new(), None);

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::EOF);
}

#[test]
fn test_token_locations() {
    let source = "def f(x)\n  x+1\r\ny".to_string();
    let tokens = tokenize(source, Some("test.ks".to_string()));

    let def = &tokens[0];
    assert_eq!((def.span.start.line, def.span.start.col), (1, 1));
    assert_eq!(def.span.end.col, 4);

    let f = &tokens[1];
    assert_eq!((f.span.start.line, f.span.start.col), (1, 5));

    let x = &tokens[5];
    assert_eq!(x.value, "x");
    assert_eq!((x.span.start.line, x.span.start.col), (2, 3));

    let plus = &tokens[6];
    assert_eq!((plus.span.start.line, plus.span.start.col), (2, 4));

    let y = &tokens[8];
    assert_eq!(y.value, "y");
    assert_eq!((y.span.start.line, y.span.start.col), (3, 1));
    assert_eq!(y.span.start.offset, 16);
    assert_eq!(y.span.start.file.as_str(), "test.ks");
}

#[test]
fn test_pull_lexer_repeats_eof() {
    let mut lexer = Lexer::new("a".to_string(), None);

    assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
    assert_eq!(lexer.next_token().kind, TokenKind::EOF);
    assert!(lexer.at_eof());
    assert_eq!(lexer.next_token().kind, TokenKind::EOF);
}

#[test]
fn test_default_file_name() {
    let lexer = Lexer::new("a".to_string(), None);
    assert_eq!(lexer.file().as_str(), "shell");
}

#[test]
fn test_token_debug() {
    let tokens = tokenize("foo 4 +".to_string(), None);

    assert_eq!(tokens[0].debug(), "Identifier (foo)");
    assert_eq!(tokens[1].debug(), "Number (4)");
    assert_eq!(tokens[2].debug(), "'+' ()");
    assert!(TokenKind::Var.is_keyword());
    assert!(!TokenKind::Identifier.is_keyword());
}
