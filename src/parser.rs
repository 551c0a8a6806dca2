use crate::ast::*;
use crate::lexer::{LexError, Lexer, Token};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("Unexpected token: {0:?}, expected {1}")]
    Unexpected(Token, &'static str),
    #[error("Unknown relationship kind: {0}")]
    UnknownKind(String),
}

/// Parser for the textual class-diagram notation.
///
/// Element ids are the class names; relationships are numbered `rel-1`,
/// `rel-2`, ... in declaration order.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self { tokens, pos: 0 })
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> &Token {
        let tok = self.tokens.get(self.pos).unwrap_or(&Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.advance().clone() {
            Token::Ident(s) => Ok(s),
            tok => Err(ParseError::Unexpected(tok, "identifier")),
        }
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> Result<(), ParseError> {
        let tok = self.advance().clone();
        if tok == expected {
            Ok(())
        } else {
            Err(ParseError::Unexpected(tok, what))
        }
    }

    fn check_ident(&self, name: &str) -> bool {
        matches!(self.peek(), Token::Ident(s) if s == name)
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Token::Comma | Token::Semicolon) {
            self.advance();
        }
    }

    pub fn parse(&mut self) -> Result<LogicalModel, ParseError> {
        let mut elements = Vec::new();
        let mut relationships = Vec::new();

        while *self.peek() != Token::Eof {
            if self.check_ident("class") {
                self.advance();
                elements.push(self.parse_element(ElementType::Class)?);
            } else if self.check_ident("abstract") {
                self.advance();
                if self.check_ident("class") {
                    self.advance();
                }
                elements.push(self.parse_element(ElementType::Abstract)?);
            } else if self.check_ident("interface") {
                self.advance();
                elements.push(self.parse_element(ElementType::Interface)?);
            } else if self.check_ident("enum") {
                self.advance();
                elements.push(self.parse_enum()?);
            } else if self.check_ident("rel") {
                self.advance();
                self.parse_rel_block(&mut relationships)?;
            } else {
                return Err(ParseError::Unexpected(
                    self.peek().clone(),
                    "class, abstract, interface, enum, or rel",
                ));
            }
        }

        Ok(LogicalModel {
            elements,
            relationships,
        })
    }

    fn parse_element(&mut self, element_type: ElementType) -> Result<Element, ParseError> {
        let name = self.expect_ident()?;
        self.expect(Token::LBrace, "'{'")?;

        let mut attributes = Vec::new();
        let mut methods = Vec::new();

        loop {
            self.skip_separators();
            if *self.peek() == Token::RBrace {
                break;
            }

            let member = self.expect_ident()?;
            match self.peek() {
                Token::Colon => {
                    self.advance();
                    let typ = self.parse_type()?;
                    let optional = if *self.peek() == Token::Question {
                        self.advance();
                        "?"
                    } else {
                        ""
                    };
                    attributes.push(format!("{}: {}{}", member, typ, optional));
                }
                Token::LParen => {
                    methods.push(self.parse_method(member)?);
                }
                tok => return Err(ParseError::Unexpected(tok.clone(), "':' or '('")),
            }
        }

        self.expect(Token::RBrace, "'}'")?;

        Ok(Element {
            id: name.clone(),
            class_name: name,
            attributes,
            methods,
            element_type,
            position: Position::default(),
        })
    }

    fn parse_method(&mut self, name: String) -> Result<String, ParseError> {
        self.expect(Token::LParen, "'('")?;
        let mut params = Vec::new();

        while *self.peek() != Token::RParen {
            let pname = self.expect_ident()?;
            self.expect(Token::Colon, "':'")?;
            let ptype = self.parse_type()?;
            params.push(format!("{}: {}", pname, ptype));

            if *self.peek() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RParen, "')'")?;

        let mut sig = format!("{}({})", name, params.join(", "));
        if *self.peek() == Token::Colon {
            self.advance();
            sig.push_str(": ");
            sig.push_str(&self.parse_type()?);
        }
        Ok(sig)
    }

    /// `Name`, `java.util.Name`, or `Name<Arg, ...>`
    fn parse_type(&mut self) -> Result<String, ParseError> {
        let mut typ = self.expect_ident()?;
        while *self.peek() == Token::Dot {
            self.advance();
            typ.push('.');
            typ.push_str(&self.expect_ident()?);
        }

        if *self.peek() == Token::Lt {
            self.advance();
            let mut args = vec![self.parse_type()?];
            while *self.peek() == Token::Comma {
                self.advance();
                args.push(self.parse_type()?);
            }
            self.expect(Token::Gt, "'>'")?;
            typ = format!("{}<{}>", typ, args.join(", "));
        }

        Ok(typ)
    }

    fn parse_enum(&mut self) -> Result<Element, ParseError> {
        let name = self.expect_ident()?;
        self.expect(Token::LBrace, "'{'")?;

        let mut constants = Vec::new();
        loop {
            self.skip_separators();
            if *self.peek() == Token::RBrace {
                break;
            }
            constants.push(self.expect_ident()?);
        }
        self.expect(Token::RBrace, "'}'")?;

        Ok(Element {
            id: name.clone(),
            class_name: name,
            attributes: constants,
            methods: vec![],
            element_type: ElementType::Enum,
            position: Position::default(),
        })
    }

    fn parse_rel_block(&mut self, rels: &mut Vec<Relationship>) -> Result<(), ParseError> {
        self.expect(Token::LBrace, "'{'")?;

        loop {
            self.skip_separators();
            if *self.peek() == Token::RBrace {
                break;
            }
            let id = format!("rel-{}", rels.len() + 1);
            rels.push(self.parse_relationship(id)?);
        }

        self.expect(Token::RBrace, "'}'")?;
        Ok(())
    }

    fn parse_relationship(&mut self, id: String) -> Result<Relationship, ParseError> {
        let source_id = self.expect_ident()?;
        let source_cardinality = if *self.peek() == Token::Dash {
            String::new()
        } else {
            self.parse_cardinality()?
        };

        self.expect(Token::Dash, "'--'")?;

        let starts_cardinality = match self.peek() {
            Token::Star | Token::Num(_) => true,
            Token::Ident(s) if s == "n" || s == "N" => {
                matches!(self.peek_at(1), Token::Ident(_))
            }
            _ => false,
        };
        let target_cardinality = if starts_cardinality {
            self.parse_cardinality()?
        } else {
            String::new()
        };
        let target_id = self.expect_ident()?;

        let relationship = if *self.peek() == Token::Colon {
            self.advance();
            let kind = self.expect_ident()?;
            RelationshipKind::from_str(&kind).ok_or(ParseError::UnknownKind(kind))?
        } else {
            RelationshipKind::Association
        };

        Ok(Relationship {
            id,
            source_id,
            target_id,
            relationship,
            source_cardinality,
            target_cardinality,
        })
    }

    fn parse_upper_bound(&mut self, lower: i64) -> Result<String, ParseError> {
        match self.advance().clone() {
            Token::Star => Ok(format!("{}..*", lower)),
            Token::Num(1) if lower == 0 => Ok("0..1".to_string()),
            Token::Ident(s) if s == "n" || s == "N" => Ok(format!("{}..n", lower)),
            tok => Err(ParseError::Unexpected(tok, "upper bound (1, *, n)")),
        }
    }

    fn parse_cardinality(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            Token::Star => {
                self.advance();
                Ok("*".to_string())
            }
            Token::Ident(s) if s == "n" || s == "N" => {
                self.advance();
                Ok("n".to_string())
            }
            Token::Num(0) => {
                self.advance();
                self.expect(Token::DotDot, "'..'")?;
                self.parse_upper_bound(0)
            }
            Token::Num(1) => {
                self.advance();
                if *self.peek() == Token::DotDot {
                    self.advance();
                    self.parse_upper_bound(1)
                } else {
                    Ok("1".to_string())
                }
            }
            tok => Err(ParseError::Unexpected(
                tok,
                "cardinality (1, 0..1, *, 0..*, 1..*, n)",
            )),
        }
    }
}
