//! Parser for condition expressions
//!
//! Turns a condition string into an expression tree that the evaluator
//! checks against a world snapshot.
//!
//! **Supported Syntax:**
//! - Calls: `has_flag("ccPantry")`, `season("fall")`, `day_between(1, 7)`
//! - Bare identifiers: `ccPantry` (shorthand for `has_flag("ccPantry")`)
//! - Comparisons: `$day >= 15`, `$weather != "rain"`
//! - Operators: `&&`, `||`, `!`, `?` / `:` (ternary)
//! - Variables: `$season`, `$day`, `$year`, `$weather`, `$location`, `$weekday`

use std::fmt;

/// Token types for lexical analysis
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Identifiers and literals
    Identifier(String),
    String(String),
    Number(i64),
    Bool(bool),
    Variable(String), // $season, $day, etc.

    // Operators
    And,          // &&
    Or,           // ||
    Not,          // !
    Question,     // ?
    Colon,        // :
    Equal,        // ==
    NotEqual,     // !=
    Greater,      // >
    Less,         // <
    GreaterEqual, // >=
    LessEqual,    // <=

    // Delimiters
    LeftParen,  // (
    RightParen, // )
    Comma,      // ,

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(s) => write!(f, "identifier '{}'", s),
            Token::String(s) => write!(f, "string \"{}\"", s),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Variable(v) => write!(f, "variable ${}", v),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Not => write!(f, "!"),
            Token::Question => write!(f, "?"),
            Token::Colon => write!(f, ":"),
            Token::Equal => write!(f, "=="),
            Token::NotEqual => write!(f, "!="),
            Token::Greater => write!(f, ">"),
            Token::Less => write!(f, "<"),
            Token::GreaterEqual => write!(f, ">="),
            Token::LessEqual => write!(f, "<="),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// Expression tree node types
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Call {
        name: String,
        args: Vec<Expr>,
    },

    Not(Box<Expr>),

    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    // Literals
    Str(String),
    Int(i64),
    Bool(bool),
    Variable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    And,
    Or,
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOperator::And => write!(f, "&&"),
            BinaryOperator::Or => write!(f, "||"),
            BinaryOperator::Equal => write!(f, "=="),
            BinaryOperator::NotEqual => write!(f, "!="),
            BinaryOperator::Greater => write!(f, ">"),
            BinaryOperator::Less => write!(f, "<"),
            BinaryOperator::GreaterEqual => write!(f, ">="),
            BinaryOperator::LessEqual => write!(f, "<="),
        }
    }
}

/// Tokenizer for condition expressions
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        self.position += 1;
        ch
    }

    /// Consume `next` if it is the current character.
    fn eat(&mut self, next: char) -> bool {
        if self.current() == Some(next) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    fn read_string(&mut self, quote: char) -> Result<String, String> {
        let mut result = String::new();

        while let Some(ch) = self.advance() {
            if ch == quote {
                return Ok(result);
            }
            if ch == '\\' {
                match self.advance() {
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some(escaped) => result.push(escaped),
                    None => break,
                }
            } else {
                result.push(ch);
            }
        }

        Err("Unterminated string literal".to_string())
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_number(&mut self) -> Result<i64, String> {
        let mut result = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
            .parse()
            .map_err(|_| format!("Number out of range: {}", result))
    }

    pub fn next_token(&mut self) -> Result<Token, String> {
        self.skip_whitespace();

        let Some(ch) = self.current() else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '(' | ')' | ',' | '?' | ':' => {
                self.advance();
                match ch {
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    ',' => Token::Comma,
                    '?' => Token::Question,
                    _ => Token::Colon,
                }
            }
            '&' => {
                self.advance();
                if !self.eat('&') {
                    return Err("Expected '&&', found single '&'".to_string());
                }
                Token::And
            }
            '|' => {
                self.advance();
                if !self.eat('|') {
                    return Err("Expected '||', found single '|'".to_string());
                }
                Token::Or
            }
            '=' => {
                self.advance();
                if !self.eat('=') {
                    return Err("Expected '==', found single '='".to_string());
                }
                Token::Equal
            }
            '!' => {
                self.advance();
                if self.eat('=') {
                    Token::NotEqual
                } else {
                    Token::Not
                }
            }
            '>' => {
                self.advance();
                if self.eat('=') {
                    Token::GreaterEqual
                } else {
                    Token::Greater
                }
            }
            '<' => {
                self.advance();
                if self.eat('=') {
                    Token::LessEqual
                } else {
                    Token::Less
                }
            }
            '"' | '\'' => {
                self.advance();
                Token::String(self.read_string(ch)?)
            }
            '$' => {
                self.advance();
                let name = self.read_identifier();
                if name.is_empty() {
                    return Err("Expected variable name after '$'".to_string());
                }
                Token::Variable(name)
            }
            c if c.is_ascii_digit() => Token::Number(self.read_number()?),
            c if c.is_alphabetic() || c == '_' => match self.read_identifier().as_str() {
                "true" => Token::Bool(true),
                "false" => Token::Bool(false),
                ident => Token::Identifier(ident.to_string()),
            },
            c => return Err(format!("Unexpected character: '{}'", c)),
        };

        Ok(token)
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// Recursive-descent parser over a token stream
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, max_depth: usize) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            max_depth,
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        if *self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(format!("Expected {}, found {}", expected, self.current()))
        }
    }

    fn enter(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(format!("Expression nested deeper than {}", self.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Literals, variables, calls, negation and parenthesized expressions
    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.current().clone() {
            Token::String(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Int(n))
            }
            Token::Bool(b) => {
                self.advance();
                Ok(Expr::Bool(b))
            }
            Token::Variable(v) => {
                self.advance();
                Ok(Expr::Variable(v))
            }
            Token::Not => {
                self.advance();
                self.enter()?;
                let inner = self.parse_primary()?;
                self.leave();
                Ok(Expr::Not(Box::new(inner)))
            }
            Token::Identifier(name) => {
                self.advance();
                let mut args = Vec::new();
                if *self.current() == Token::LeftParen {
                    self.advance();
                    if *self.current() != Token::RightParen {
                        loop {
                            args.push(self.parse_ternary()?);
                            if *self.current() == Token::Comma {
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    self.expect(Token::RightParen)?;
                }
                Ok(Expr::Call { name, args })
            }
            Token::LeftParen => {
                self.advance();
                let expr = self.parse_ternary()?;
                self.expect(Token::RightParen)?;
                Ok(expr)
            }
            token => Err(format!("Unexpected token in expression: {}", token)),
        }
    }

    fn comparison_operator(&self) -> Option<BinaryOperator> {
        match self.current() {
            Token::Equal => Some(BinaryOperator::Equal),
            Token::NotEqual => Some(BinaryOperator::NotEqual),
            Token::Greater => Some(BinaryOperator::Greater),
            Token::Less => Some(BinaryOperator::Less),
            Token::GreaterEqual => Some(BinaryOperator::GreaterEqual),
            Token::LessEqual => Some(BinaryOperator::LessEqual),
            _ => None,
        }
    }

    /// Comparison operators (==, !=, >, <, >=, <=)
    fn parse_comparison(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_primary()?;
        while let Some(op) = self.comparison_operator() {
            self.advance();
            let right = self.parse_primary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_comparison()?;
        while *self.current() == Token::And {
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::Binary {
                op: BinaryOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and()?;
        while *self.current() == Token::Or {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Binary {
                op: BinaryOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// condition ? then : else
    fn parse_ternary(&mut self) -> Result<Expr, String> {
        self.enter()?;
        let condition = self.parse_or()?;

        let expr = if *self.current() == Token::Question {
            self.advance();
            let then_branch = self.parse_or()?;
            self.expect(Token::Colon)?;
            let else_branch = self.parse_ternary()?;
            Expr::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            }
        } else {
            condition
        };

        self.leave();
        Ok(expr)
    }

    pub fn parse(&mut self) -> Result<Expr, String> {
        let expr = self.parse_ternary()?;
        if *self.current() != Token::Eof {
            return Err(format!("Unexpected token after expression: {}", self.current()));
        }
        Ok(expr)
    }
}

/// Parse a condition expression into a tree
pub fn parse_condition(source: &str, max_depth: usize) -> Result<Expr, String> {
    let tokens = Tokenizer::new(source).tokenize()?;
    Parser::new(tokens, max_depth).parse()
}
