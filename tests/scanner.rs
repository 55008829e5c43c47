#[cfg(test)]
mod scanner_tests {
    use rox as lox;

    use lox::error::LoxError;
    use lox::scanner::*;
    use lox::token::*;
    use pretty_assertions::assert_eq;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    fn assert_token_matches(
        result: &Result<Token, LoxError>,
        expected_type: TokenType,
        expected_lexeme: &str,
    ) {
        match result {
            Ok(token) => {
                assert_eq!(
                    token.token_type, expected_type,
                    "Expected token type {:?}, got {:?}",
                    expected_type, token.token_type
                );
                assert_eq!(
                    token.lexeme, expected_lexeme,
                    "Expected lexeme '{}', got '{}'",
                    expected_lexeme, token.lexeme
                );
            }
            Err(e) => panic!("Expected token but got error: {}", e),
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})?:",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::QUESTION, "?"),
                (TokenType::COLON, ":"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_operators() {
        assert_token_sequence(
            "! != = == < <= > >= / -",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::MINUS, "-"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "trait use break continue class classy _x",
            &[
                (TokenType::TRAIT, "trait"),
                (TokenType::USE, "use"),
                (TokenType::BREAK, "break"),
                (TokenType::CONTINUE, "continue"),
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "classy"),
                (TokenType::IDENTIFIER, "_x"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_literals() {
        let (tokens, errors) = Scanner::new(b"\"hi there\" 42 3.25 7.").scan_all();
        assert!(errors.is_empty());

        let printed: Vec<String> = tokens.iter().map(ToString::to_string).collect();
        assert_eq!(
            printed,
            vec![
                "STRING \"hi there\" hi there",
                "NUMBER 42 42.0",
                "NUMBER 3.25 3.25",
                "NUMBER 7 7.0",
                "DOT . null",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn test_scanner_05_comments_and_lines() {
        let source = "// line comment\n/* block /* nested */\n still comment */ a\n/**/ b";
        let (tokens, errors) = Scanner::new(source.as_bytes()).scan_all();
        assert!(errors.is_empty(), "{:?}", errors);

        let seen: Vec<(&str, usize)> = tokens.iter().map(|t| (t.lexeme, t.line)).collect();
        assert_eq!(seen, vec![("a", 3), ("b", 4), ("", 4)]);
    }

    #[test]
    fn test_scanner_06_comment_errors() {
        let (_, errors) = Scanner::new(b"/* never closed").scan_all();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error: Unterminated block comment at end of file."
        );

        let (tokens, errors) = Scanner::new(b"a */ b").scan_all();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "Unexpected end of comment outside block comment."
        );
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_scanner_07_unterminated_string() {
        let (tokens, errors) = Scanner::new(b"\"abc\ndef").scan_all();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 2] Error: Unterminated string.");
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_scanner_08_single_eof() {
        let mut scanner = Scanner::new(b"x");

        assert!(scanner.next().is_some());
        assert_token_matches(&scanner.next().expect("eof"), TokenType::EOF, "");
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source.as_bytes());

        let results: Vec<_> = scanner.collect();

        // 0: COMMA ','
        // 1: DOT '.'
        // 2: Error for '$'
        // 3: LEFT_PAREN '('
        // 4: Error for '#'
        // 5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let messages: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            messages,
            vec![
                "[line 1] Error: Unexpected character: $",
                "[line 1] Error: Unexpected character: #",
            ]
        );
    }

    #[test]
    fn test_tokens_serialize_to_json() {
        let (tokens, _) = Scanner::new(b"x = 1;").scan_all();
        let json = serde_json_value(&tokens[2]);

        assert!(json.contains("\"NUMBER\":1.0"), "{}", json);
        assert!(json.contains("\"lexeme\":\"1\""), "{}", json);
        assert!(json.contains("\"line\":1"), "{}", json);
    }

    fn serde_json_value(token: &Token<'_>) -> String {
        serde_json::to_string(token).expect("token serializes")
    }
}
