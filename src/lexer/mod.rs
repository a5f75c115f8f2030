pub mod token;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{anychar, char, digit1},
    combinator::{eof, map, recognize, rest},
    sequence::{delimited, preceded},
    IResult,
};
use token::{lookup_ident, Token, TokenType};
use tracing::trace;

type LexResult<'a> = IResult<&'a str, Token>;

/// Pull-based tokenizer. Each call to [`Lexer::next_token`] scans exactly one
/// token off the front of the remaining input; once the input is exhausted it
/// keeps returning [`TokenType::Eof`].
pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    pub fn next_token(&mut self) -> Token {
        match Self::lex_token(self.input) {
            Ok((rest, token)) => {
                if token.token_type == TokenType::Illegal {
                    trace!(literal = %token.literal, "illegal token");
                }
                self.input = rest;
                token
            }
            Err(_) => {
                self.input = "";
                Token::eof()
            }
        }
    }

    /// Drains the lexer, returning every token up to and including the first `Eof`.
    pub fn lex_input(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.token_type == TokenType::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn lex_token(input: &str) -> LexResult<'_> {
        preceded(
            Self::whitespace,
            alt((
                Self::end_of_input,
                Self::operator,
                Self::delimiter,
                Self::string_literal,
                Self::number,
                Self::word,
                Self::illegal,
            )),
        )(input)
    }

    fn end_of_input(input: &str) -> LexResult<'_> {
        map(eof, |_| Token::eof())(input)
    }

    // Two-character operators come first so `==` never lexes as `=` `=`.
    fn operator(input: &str) -> LexResult<'_> {
        alt((
            Self::static_token_lexer_generator("==", TokenType::Eq),
            Self::static_token_lexer_generator("!=", TokenType::NotEq),
            Self::static_token_lexer_generator("=", TokenType::Assign),
            Self::static_token_lexer_generator("!", TokenType::Bang),
            Self::static_token_lexer_generator("+", TokenType::Plus),
            Self::static_token_lexer_generator("-", TokenType::Minus),
            Self::static_token_lexer_generator("*", TokenType::Asterisk),
            Self::static_token_lexer_generator("/", TokenType::Slash),
            Self::static_token_lexer_generator("<", TokenType::Lt),
            Self::static_token_lexer_generator(">", TokenType::Gt),
        ))(input)
    }

    fn delimiter(input: &str) -> LexResult<'_> {
        alt((
            Self::static_token_lexer_generator(",", TokenType::Comma),
            Self::static_token_lexer_generator(";", TokenType::Semicolon),
            Self::static_token_lexer_generator("(", TokenType::LParen),
            Self::static_token_lexer_generator(")", TokenType::RParen),
            Self::static_token_lexer_generator("{", TokenType::LBrace),
            Self::static_token_lexer_generator("}", TokenType::RBrace),
            Self::static_token_lexer_generator("[", TokenType::LBracket),
            Self::static_token_lexer_generator("]", TokenType::RBracket),
        ))(input)
    }

    fn static_token_lexer_generator<'b>(
        symbol: &'static str,
        token_type: TokenType,
    ) -> impl FnMut(&'b str) -> LexResult<'b> {
        map(tag(symbol), move |literal: &str| {
            Token::new(token_type, literal)
        })
    }

    // An unterminated string swallows the rest of the input as one illegal token.
    fn string_literal(input: &str) -> LexResult<'_> {
        alt((
            map(
                delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
                |contents: &str| Token::new(TokenType::String, contents),
            ),
            map(recognize(preceded(char('"'), rest)), |unterminated: &str| {
                Token::new(TokenType::Illegal, unterminated)
            }),
        ))(input)
    }

    fn number(input: &str) -> LexResult<'_> {
        map(digit1, |number: &str| Token::new(TokenType::Int, number))(input)
    }

    fn word(input: &str) -> LexResult<'_> {
        map(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
            |word: &str| Token::new(lookup_ident(word), word),
        )(input)
    }

    fn illegal(input: &str) -> LexResult<'_> {
        map(recognize(anychar), |c: &str| Token::new(TokenType::Illegal, c))(input)
    }

    fn whitespace(input: &str) -> IResult<&str, &str> {
        take_while(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r'))(input)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lex(input: &str) -> Vec<(TokenType, String)> {
        Lexer::new(input)
            .lex_input()
            .into_iter()
            .map(|token| (token.token_type, token.literal))
            .collect()
    }

    fn expected(tokens: &[(TokenType, &str)]) -> Vec<(TokenType, String)> {
        tokens
            .iter()
            .map(|(token_type, literal)| (*token_type, literal.to_string()))
            .collect()
    }

    #[test]
    fn tokens_simple() {
        let input = "=+(){},;[]";

        let expected_tokens = expected(&[
            (TokenType::Assign, "="),
            (TokenType::Plus, "+"),
            (TokenType::LParen, "("),
            (TokenType::RParen, ")"),
            (TokenType::LBrace, "{"),
            (TokenType::RBrace, "}"),
            (TokenType::Comma, ","),
            (TokenType::Semicolon, ";"),
            (TokenType::LBracket, "["),
            (TokenType::RBracket, "]"),
            (TokenType::Eof, ""),
        ]);

        assert_eq!(lex(input), expected_tokens);
    }

    #[test]
    fn let_statement_tokens() {
        let expected_tokens = expected(&[
            (TokenType::Let, "let"),
            (TokenType::Ident, "x"),
            (TokenType::Assign, "="),
            (TokenType::Int, "5"),
            (TokenType::Plus, "+"),
            (TokenType::Int, "10"),
            (TokenType::Semicolon, ";"),
            (TokenType::Eof, ""),
        ]);

        assert_eq!(lex("let x = 5 + 10;"), expected_tokens);
    }

    #[test]
    fn tokens_complex() {
        let input = r#"let five = 5;
let ten = 10;

let add = fn(x, y) {
  x + y;
};

let result = add(five, ten);
!-/*5;
5 < 10 > 5;

if (5 < 10) {
    return true;
} else {
    return false;
}

10 == 10;
10 != 9;
"foobar"
"foo bar"
[1, 2];
        "#;

        let expected_tokens = expected(&[
            (TokenType::Let, "let"),
            (TokenType::Ident, "five"),
            (TokenType::Assign, "="),
            (TokenType::Int, "5"),
            (TokenType::Semicolon, ";"),
            (TokenType::Let, "let"),
            (TokenType::Ident, "ten"),
            (TokenType::Assign, "="),
            (TokenType::Int, "10"),
            (TokenType::Semicolon, ";"),
            (TokenType::Let, "let"),
            (TokenType::Ident, "add"),
            (TokenType::Assign, "="),
            (TokenType::Function, "fn"),
            (TokenType::LParen, "("),
            (TokenType::Ident, "x"),
            (TokenType::Comma, ","),
            (TokenType::Ident, "y"),
            (TokenType::RParen, ")"),
            (TokenType::LBrace, "{"),
            (TokenType::Ident, "x"),
            (TokenType::Plus, "+"),
            (TokenType::Ident, "y"),
            (TokenType::Semicolon, ";"),
            (TokenType::RBrace, "}"),
            (TokenType::Semicolon, ";"),
            (TokenType::Let, "let"),
            (TokenType::Ident, "result"),
            (TokenType::Assign, "="),
            (TokenType::Ident, "add"),
            (TokenType::LParen, "("),
            (TokenType::Ident, "five"),
            (TokenType::Comma, ","),
            (TokenType::Ident, "ten"),
            (TokenType::RParen, ")"),
            (TokenType::Semicolon, ";"),
            (TokenType::Bang, "!"),
            (TokenType::Minus, "-"),
            (TokenType::Slash, "/"),
            (TokenType::Asterisk, "*"),
            (TokenType::Int, "5"),
            (TokenType::Semicolon, ";"),
            (TokenType::Int, "5"),
            (TokenType::Lt, "<"),
            (TokenType::Int, "10"),
            (TokenType::Gt, ">"),
            (TokenType::Int, "5"),
            (TokenType::Semicolon, ";"),
            (TokenType::If, "if"),
            (TokenType::LParen, "("),
            (TokenType::Int, "5"),
            (TokenType::Lt, "<"),
            (TokenType::Int, "10"),
            (TokenType::RParen, ")"),
            (TokenType::LBrace, "{"),
            (TokenType::Return, "return"),
            (TokenType::True, "true"),
            (TokenType::Semicolon, ";"),
            (TokenType::RBrace, "}"),
            (TokenType::Else, "else"),
            (TokenType::LBrace, "{"),
            (TokenType::Return, "return"),
            (TokenType::False, "false"),
            (TokenType::Semicolon, ";"),
            (TokenType::RBrace, "}"),
            (TokenType::Int, "10"),
            (TokenType::Eq, "=="),
            (TokenType::Int, "10"),
            (TokenType::Semicolon, ";"),
            (TokenType::Int, "10"),
            (TokenType::NotEq, "!="),
            (TokenType::Int, "9"),
            (TokenType::Semicolon, ";"),
            (TokenType::String, "foobar"),
            (TokenType::String, "foo bar"),
            (TokenType::LBracket, "["),
            (TokenType::Int, "1"),
            (TokenType::Comma, ","),
            (TokenType::Int, "2"),
            (TokenType::RBracket, "]"),
            (TokenType::Semicolon, ";"),
            (TokenType::Eof, ""),
        ]);

        let actual_tokens = lex(input);

        assert_eq!(actual_tokens.len(), expected_tokens.len());

        expected_tokens
            .into_iter()
            .zip(actual_tokens)
            .for_each(|(expected, actual)| assert_eq!(actual, expected));
    }

    #[test]
    fn identifiers() {
        let inputs = vec![
            ("five", vec![(TokenType::Ident, "five")]),
            ("_private_ident", vec![(TokenType::Ident, "_private_ident")]),
            ("letter", vec![(TokenType::Ident, "letter")]),
            ("iffy", vec![(TokenType::Ident, "iffy")]),
            (
                "my_thing2",
                vec![(TokenType::Ident, "my_thing"), (TokenType::Int, "2")],
            ),
            (
                "1nvalid",
                vec![(TokenType::Int, "1"), (TokenType::Ident, "nvalid")],
            ),
        ];

        inputs.into_iter().for_each(|(input, tokens)| {
            let mut expected_tokens = expected(&tokens);
            expected_tokens.push((TokenType::Eof, String::new()));
            assert_eq!(lex(input), expected_tokens);
        });
    }

    #[test]
    fn eof_repeats_forever() {
        let mut lexer = Lexer::new("x");

        assert_eq!(lexer.next_token(), Token::new(TokenType::Ident, "x"));
        for _ in 0..3 {
            assert_eq!(lexer.next_token(), Token::eof());
        }
    }

    #[test]
    fn illegal_characters() {
        let expected_tokens = expected(&[
            (TokenType::Int, "1"),
            (TokenType::Illegal, "@"),
            (TokenType::Int, "2"),
            (TokenType::Illegal, "é"),
            (TokenType::Eof, ""),
        ]);

        assert_eq!(lex("1 @ 2 é"), expected_tokens);
    }

    #[test]
    fn unterminated_string() {
        let expected_tokens = expected(&[
            (TokenType::Let, "let"),
            (TokenType::Ident, "s"),
            (TokenType::Assign, "="),
            (TokenType::Illegal, "\"abc; 5"),
            (TokenType::Eof, ""),
        ]);

        assert_eq!(lex("let s = \"abc; 5"), expected_tokens);
    }

    #[test]
    fn empty_string_literal() {
        let expected_tokens = expected(&[(TokenType::String, ""), (TokenType::Eof, "")]);

        assert_eq!(lex(r#""""#), expected_tokens);
    }
}
