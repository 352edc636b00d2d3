#[cfg(test)]
mod scanner_tests {
    use kin_lang as kin;

    use kin::scanner::*;
    use kin::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})[]:;",
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
                (TokenType::LEFT_BRACKET, "["),
                (TokenType::RIGHT_BRACKET, "]"),
                (TokenType::COLON, ":"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_one_or_two_char_operators() {
        assert_token_sequence(
            "= == ! != < <= > >= && || ++ -- & ^ %",
            &[
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::AND, "&&"),
                (TokenType::OR, "||"),
                (TokenType::INCREMENT, "++"),
                (TokenType::DECREMENT, "--"),
                (TokenType::AMPERSAND, "&"),
                (TokenType::CARET, "^"),
                (TokenType::PERCENT, "%"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords() {
        assert_token_sequence(
            "reka ntahinduka niba nanone_niba niba_byanze subiramo_niba \
             porogaramu_ntoya tanga gereranya usanze ibindi rekaa",
            &[
                (TokenType::REKA, "reka"),
                (TokenType::NTAHINDUKA, "ntahinduka"),
                (TokenType::NIBA, "niba"),
                (TokenType::NANONE_NIBA, "nanone_niba"),
                (TokenType::NIBA_BYANZE, "niba_byanze"),
                (TokenType::SUBIRAMO_NIBA, "subiramo_niba"),
                (TokenType::POROGARAMU_NTOYA, "porogaramu_ntoya"),
                (TokenType::TANGA, "tanga"),
                (TokenType::GERERANYA, "gereranya"),
                (TokenType::USANZE, "usanze"),
                (TokenType::IBINDI, "ibindi"),
                // A keyword prefix followed by more identifier characters is
                // an ordinary identifier.
                (TokenType::IDENTIFIER, "rekaa"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_numbers() {
        let tokens: Vec<Token> = Scanner::new("12 3.14 7.").tokenize().unwrap();

        assert!(matches!(tokens[0].token_type, TokenType::INTEGER(n) if n == 12.0));
        assert_eq!(tokens[0].lexeme, "12");

        assert!(matches!(tokens[1].token_type, TokenType::FLOAT(n) if n == 3.14));
        assert_eq!(tokens[1].lexeme, "3.14");

        // A dot not followed by a digit stays a separate DOT token.
        assert!(matches!(tokens[2].token_type, TokenType::INTEGER(n) if n == 7.0));
        assert_eq!(tokens[3].token_type, TokenType::DOT);

        assert_eq!(tokens[4].token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_05_strings() {
        let tokens: Vec<Token> = Scanner::new("\"muraho neza\"").tokenize().unwrap();

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "muraho neza"),
            other => panic!("expected STRING, got {:?}", other),
        }

        // The lexeme keeps the surrounding quotes.
        assert_eq!(tokens[0].lexeme, "\"muraho neza\"");
    }

    #[test]
    fn test_scanner_06_unterminated_string_at_eof() {
        let result = Scanner::new("\"muraho").tokenize();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Unterminated string literal"));
    }

    #[test]
    fn test_scanner_07_unterminated_string_at_newline() {
        let result = Scanner::new("\"muraho\nneza\"").tokenize();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Unterminated string literal"));
    }

    #[test]
    fn test_scanner_08_comments_and_lines() {
        let source = "reka x # ibisobanuro birengagizwa\n= 5";
        let tokens: Vec<Token> = Scanner::new(source).tokenize().unwrap();

        assert_eq!(tokens[0].token_type, TokenType::REKA);
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].token_type, TokenType::IDENTIFIER);
        assert_eq!(tokens[2].token_type, TokenType::EQUAL);
        assert_eq!(tokens[2].line, 2);
        assert!(matches!(tokens[3].token_type, TokenType::INTEGER(n) if n == 5.0));
        assert_eq!(tokens[4].token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_09_bare_pipe_is_an_error() {
        let result = Scanner::new("a | b").tokenize();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Unexpected character: |"));
    }

    #[test]
    fn test_scanner_10_lexemes_are_source_slices() {
        let source = "reka umubare = 42 + 3.5 # inyuma\ntangaza_amakuru(umubare)";
        let tokens: Vec<Token> = Scanner::new(source).tokenize().unwrap();

        // Every lexeme must reappear in the source, in order.
        let mut cursor: usize = 0;

        for token in &tokens {
            if token.token_type == TokenType::EOF {
                continue;
            }

            let at = source[cursor..]
                .find(token.lexeme)
                .unwrap_or_else(|| panic!("lexeme '{}' not found after {}", token.lexeme, cursor));

            cursor += at + token.lexeme.len();
        }
    }

    #[test]
    fn test_scanner_11_exactly_one_eof() {
        let tokens: Vec<Token> = Scanner::new("").tokenize().unwrap();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_type, TokenType::EOF);
        assert_eq!(tokens[0].lexeme, "");

        // The iterator is fused after EOF.
        let mut scanner = Scanner::new("");
        assert!(scanner.next().is_some());
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
