use libmonkey::{
    eval::{object::Object, Evaluator},
    lexer::{token::TokenType, Lexer},
    parser::parse,
};
use pretty_assertions::assert_eq;

fn run(source: &str) -> String {
    let program = parse(source).unwrap();

    Evaluator::new().eval(&program).to_string()
}

#[test]
fn lexes_a_whole_program() {
    let tokens = Lexer::new(r#"let add = fn(x, y) { x + y; }; add(1, "two")[0] != !true"#)
        .lex_input()
        .into_iter()
        .map(|token| token.token_type)
        .collect::<Vec<_>>();

    assert_eq!(
        tokens,
        vec![
            TokenType::Let,
            TokenType::Ident,
            TokenType::Assign,
            TokenType::Function,
            TokenType::LParen,
            TokenType::Ident,
            TokenType::Comma,
            TokenType::Ident,
            TokenType::RParen,
            TokenType::LBrace,
            TokenType::Ident,
            TokenType::Plus,
            TokenType::Ident,
            TokenType::Semicolon,
            TokenType::RBrace,
            TokenType::Semicolon,
            TokenType::Ident,
            TokenType::LParen,
            TokenType::Int,
            TokenType::Comma,
            TokenType::String,
            TokenType::RParen,
            TokenType::LBracket,
            TokenType::Int,
            TokenType::RBracket,
            TokenType::NotEq,
            TokenType::Bang,
            TokenType::True,
            TokenType::Eof,
        ]
    );
}

#[test]
fn renders_parsed_programs() {
    let program = parse("let x = a + b * c; if (x > 1) { return x; } else { -x }; f(x)[0]").unwrap();

    assert_eq!(
        program.to_string(),
        "let x = (a + (b * c)); if ((x > 1)) { return x } else { (-x) }; (f(x)[0])"
    );
}

#[test]
fn map_and_reduce() {
    let source = r#"
        let map = fn(arr, f) {
            let iter = fn(arr, accumulated) {
                if (len(arr) == 0) {
                    accumulated
                } else {
                    iter(rest(arr), push(accumulated, f(first(arr))));
                }
            };
            iter(arr, []);
        };

        let reduce = fn(arr, initial, f) {
            let iter = fn(arr, result) {
                if (len(arr) == 0) {
                    result
                } else {
                    iter(rest(arr), f(result, first(arr)));
                }
            };
            iter(arr, initial);
        };

        let double = fn(x) { x * 2 };
        let sum = fn(arr) { reduce(arr, 0, fn(acc, el) { acc + el }) };

        [map([1, 2, 3, 4], double), sum(map([1, 2, 3, 4], double))]
    "#;

    assert_eq!(run(source), "[[2, 4, 6, 8], 20]");
}

#[test]
fn recursive_fibonacci() {
    let source = r#"
        let fibonacci = fn(x) {
            if (x == 0) {
                return 0;
            }
            if (x == 1) {
                return 1;
            }
            fibonacci(x - 1) + fibonacci(x - 2);
        };
        fibonacci(15);
    "#;

    assert_eq!(run(source), "610");
}

#[test]
fn closures_capture_their_scope() {
    let source = r#"
        let newAdder = fn(x) { fn(y) { x + y } };
        let addTwo = newAdder(2);
        let addTen = newAdder(10);
        [addTwo(3), addTen(3)]
    "#;

    assert_eq!(run(source), "[5, 13]");
}

#[test]
fn early_return_from_a_nested_if_value() {
    let source = r#"
        let find = fn(arr, target) {
            let search = fn(rest_of, index) {
                let found = if (len(rest_of) == 0) {
                    return -1;
                } else {
                    if (first(rest_of) == target) {
                        return index;
                    }
                    false
                };
                search(rest(rest_of), index + 1);
            };
            search(arr, 0);
        };

        [find([4, 8, 15, 16], 15), find([4, 8], 23), len([find([1], 1)])]
    "#;

    assert_eq!(run(source), "[2, -1, 1]");
}

#[test]
fn strings_and_builtins() {
    let source = r#"
        let greeting = "Hello" + ", " + "World!";
        [greeting, len(greeting), last([greeting, len])]
    "#;

    assert_eq!(
        run(source),
        "[Hello, World!, 13, builtin function: len]"
    );
}

#[test]
fn errors_stop_evaluation() {
    let source = r#"
        let f = fn(x) { x + true; 99 };
        let y = f(1);
        y
    "#;

    let program = parse(source).unwrap();
    let result = Evaluator::new().eval(&program);

    assert!(matches!(result, Object::Error(_)));
    assert_eq!(result.to_string(), "ERROR: type mismatch: INTEGER + BOOLEAN");
}

#[test]
fn parse_errors_are_collected() {
    let errors = parse("let x 5; let = 10; let 838383;").unwrap_err();

    assert_eq!(
        errors.to_string(),
        "parser errors:\n\
         \texpected next token to be =, got INT(5) instead\n\
         \texpected next token to be IDENT, got = instead\n\
         \texpected next token to be IDENT, got INT(838383) instead\n"
    );
}
