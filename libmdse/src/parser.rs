//
// parser.rs
// The MDSE REST Compiler
//

//! This module contains the recursive descent parsers of the three
//! model grammars: requirements (`api`), platform-independent models
//! (`pim`), and platform-specific models (`psm`). Each parser consumes
//! significant tokens (see `lexer::lex_significant()`) and builds the
//! corresponding IR directly; there is no separate syntax tree.

use std::slice;
use std::collections::HashMap;
use std::str::FromStr;
use crate::error::{ Error, Result };
use crate::lexer::{ self, Token, TokenKind, Range, unquote };
use crate::reqir::*;
use crate::pim::*;
use crate::psm::*;


/// Parses a requirements model, written in the `api` grammar.
///
/// # Arguments:
///
/// * `tokens`: significant tokens, i.e. without whitespace and comments.
///
/// # Return value:
///
/// * `Ok(RequirementsModel)` if the tokens form exactly one `api` block.
/// * `Err(Error::Syntax)` if they don't.
/// * `Err(Error::Semantic)` if a resource declares the same field twice.
pub fn parse_requirements(tokens: &[Token]) -> Result<RequirementsModel> {
    let mut parser = Parser::new(tokens);
    let model = parser.parse_api()?;
    parser.expect_end()?;
    Ok(model)
}

/// Parses a platform-independent model, written in the `pim` grammar.
/// See `parse_requirements()` for the meaning of the arguments and the
/// possible errors.
pub fn parse_pim(tokens: &[Token]) -> Result<PimModel> {
    let mut parser = Parser::new(tokens);
    let model = parser.parse_pim()?;
    parser.expect_end()?;
    Ok(model)
}

/// Parses a platform-specific model, written in the `psm` grammar.
/// An unsupported platform tag is reported as a semantic error.
pub fn parse_psm(tokens: &[Token]) -> Result<PsmModel> {
    let mut parser = Parser::new(tokens);
    let model = parser.parse_psm()?;
    parser.expect_end()?;
    Ok(model)
}

/// Lexes and parses a requirements model from source text.
pub fn requirements_from_str(source: &str) -> Result<RequirementsModel> {
    parse_requirements(&lexer::lex_significant(&[source])?)
}

/// Lexes and parses a platform-independent model from source text.
pub fn pim_from_str(source: &str) -> Result<PimModel> {
    parse_pim(&lexer::lex_significant(&[source])?)
}

/// Lexes and parses a platform-specific model from source text.
pub fn psm_from_str(source: &str) -> Result<PsmModel> {
    parse_psm(&lexer::lex_significant(&[source])?)
}

#[derive(Debug)]
struct Parser<'a> {
    tokens: slice::Iter<'a, Token<'a>>,
    eof_range: Range,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        let eof_range = tokens.last().map_or_else(Range::default, |last| Range {
            start: last.range.end,
            end:   last.range.end,
        });

        Parser {
            tokens: tokens.iter(),
            eof_range,
        }
    }

    //
    // Lexer helpers
    //

    fn has_tokens(&self) -> bool {
        self.tokens.len() > 0
    }

    fn next_token(&self) -> Option<&'a Token<'a>> {
        self.tokens.as_slice().first()
    }

    fn advance(&mut self) -> Option<&'a Token<'a>> {
        self.tokens.next()
    }

    fn expectation_error(&self, expected: &str) -> Error {
        let token = self.next_token();
        let actual = token.map_or("end of input".to_owned(), |t| format!("'{}'", t.value));

        Error::Syntax {
            message: format!("Expected {}; found {}", expected, actual),
            range:   token.map_or(self.eof_range, |t| t.range),
        }
    }

    fn accept_by<P>(&mut self, pred: P) -> Option<&'a Token<'a>>
        where P: FnOnce(&Token) -> bool {

        match self.next_token() {
            Some(token) if pred(token) => self.advance(),
            _ => None,
        }
    }

    fn accept(&mut self, lexeme: &str) -> Option<&'a Token<'a>> {
        self.accept_by(|token| token.value == lexeme && token.kind != TokenKind::String)
    }

    fn expect(&mut self, lexeme: &str) -> Result<&'a Token<'a>> {
        match self.accept(lexeme) {
            Some(token) => Ok(token),
            None => Err(self.expectation_error(&format!("'{}'", lexeme))),
        }
    }

    fn expect_kind(&mut self, kind: TokenKind, description: &str) -> Result<&'a Token<'a>> {
        match self.accept_by(|token| token.kind == kind) {
            Some(token) => Ok(token),
            None => Err(self.expectation_error(description)),
        }
    }

    fn expect_identifier(&mut self) -> Result<&'a Token<'a>> {
        self.expect_kind(TokenKind::Word, "identifier")
    }

    fn expect_named<T: FromStr>(&mut self, description: &str) -> Result<T> {
        let parsed = self.next_token().and_then(
            |token| if token.kind == TokenKind::Word { token.value.parse::<T>().ok() } else { None }
        );

        match parsed {
            Some(value) => {
                self.advance();
                Ok(value)
            },
            None => Err(self.expectation_error(description)),
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.has_tokens() {
            Err(self.expectation_error("end of input"))
        } else {
            Ok(())
        }
    }

    fn is_at(&self, lexeme: &str) -> bool {
        match self.next_token() {
            Some(token) => token.value == lexeme && token.kind != TokenKind::String,
            None        => false,
        }
    }

    //
    // Shared productions
    //

    fn parse_fields<T>(
        &mut self,
        owner: &str,
        parse_type: fn(&mut Self) -> Result<T>,
    ) -> Result<Vec<(String, T)>> {
        let mut fields = Vec::new();
        let mut seen = HashMap::new();

        while self.has_tokens() && !self.is_at("}") {
            let name = self.expect_identifier()?;

            if seen.insert(name.value, name.range).is_some() {
                return Err(Error::Semantic {
                    message: format!("Duplicate field '{}' in '{}'", name.value, owner),
                    range:   Some(name.range),
                });
            }

            self.expect(":")?;
            fields.push((name.value.to_owned(), parse_type(self)?));
        }

        Ok(fields)
    }

    fn parse_abstract_type(&mut self) -> Result<AbstractType> {
        self.expect_named("one of Text, Number, Bool, Date")
    }

    fn parse_concrete_type(&mut self) -> Result<ConcreteType> {
        self.expect_named("one of str, int, float, bool, datetime")
    }

    fn parse_summary(&mut self) -> Result<String> {
        self.expect("summary")?;
        self.expect(":")?;
        let token = self.expect_kind(TokenKind::String, "string literal")?;
        unquote(token.value, token.range)
    }

    fn parse_method(&mut self) -> Result<HttpMethod> {
        self.expect_named("one of GET, POST, PUT, DELETE")
    }

    /// Parses `Name` or `List[Name]`, returning `(name, is_list)`.
    /// Sentinels such as `Message` come back as plain names.
    fn parse_response_shape(&mut self) -> Result<(String, bool)> {
        let name = self.expect_identifier()?;

        if name.value == "List" && self.accept("[").is_some() {
            let element = self.expect_identifier()?;
            self.expect("]")?;
            Ok((element.value.to_owned(), true))
        } else {
            Ok((name.value.to_owned(), false))
        }
    }

    //
    // Requirements grammar
    //

    fn parse_api(&mut self) -> Result<RequirementsModel> {
        let mut resources = Vec::new();

        self.expect("api")?;
        let name = self.expect_identifier()?;
        self.expect("{")?;

        while self.is_at("resource") {
            resources.push(self.parse_resource()?);
        }

        self.expect("}")?;

        Ok(RequirementsModel {
            name: name.value.to_owned(),
            resources,
        })
    }

    fn parse_resource(&mut self) -> Result<ResourceDecl> {
        let mut operations = Vec::new();

        self.expect("resource")?;
        let name = self.expect_identifier()?;
        self.expect("{")?;

        if self.accept("operations").is_some() {
            self.expect(":")?;

            loop {
                operations.push(self.expect_identifier()?.value.to_owned());

                if self.accept(",").is_none() {
                    break
                }
            }
        }

        self.expect("fields")?;
        self.expect("{")?;
        let fields = self.parse_fields(name.value, Self::parse_abstract_type)?;
        self.expect("}")?;
        self.expect("}")?;

        Ok(ResourceDecl {
            name: name.value.to_owned(),
            operations,
            fields: fields.into_iter().map(|(name, ty)| FieldDecl { name, ty }).collect(),
        })
    }

    //
    // PIM grammar
    //

    fn parse_pim(&mut self) -> Result<PimModel> {
        let mut model_classes = Vec::new();
        let mut endpoints = Vec::new();

        self.expect("pim")?;
        let name = self.expect_identifier()?;
        self.expect("{")?;

        while self.is_at("modelClass") {
            model_classes.push(self.parse_model_class()?);
        }

        while self.is_at("endpoint") {
            endpoints.push(self.parse_endpoint()?);
        }

        self.expect("}")?;

        Ok(PimModel {
            name: name.value.to_owned(),
            model_classes,
            endpoints,
        })
    }

    fn parse_model_class(&mut self) -> Result<ModelClassDecl> {
        self.expect("modelClass")?;
        let name = self.expect_identifier()?;
        self.expect("{")?;
        let fields = self.parse_fields(name.value, Self::parse_abstract_type)?;
        self.expect("}")?;

        Ok(ModelClassDecl {
            name: name.value.to_owned(),
            fields: fields.into_iter().map(|(name, ty)| FieldDecl { name, ty }).collect(),
        })
    }

    fn parse_endpoint(&mut self) -> Result<EndpointDecl> {
        self.expect("endpoint")?;
        let method = self.parse_method()?;
        let path = self.expect_kind(TokenKind::Path, "path")?;
        self.expect("{")?;
        let summary = self.parse_summary()?;
        let params = self.parse_params()?;

        self.expect("response")?;
        self.expect(":")?;

        let response = match self.parse_response_shape()? {
            (name, true) => ResponseType::List(name),
            (ref name, false) if name == MESSAGE_TYPE_NAME => ResponseType::Message,
            (name, false) => ResponseType::Entity(name),
        };

        self.expect("}")?;

        Ok(EndpointDecl {
            method,
            path: path.value.to_owned(),
            summary,
            params,
            response,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();

        self.expect("params")?;
        self.expect(":")?;

        if self.accept("none").is_some() {
            return Ok(params)
        }

        loop {
            let name = self.expect_identifier()?;
            self.expect(":")?;
            let ty = self.expect_identifier()?;
            let ty = match ty.value.parse::<AbstractType>() {
                Ok(primitive) => TypeRef::Primitive(primitive),
                Err(()) => TypeRef::Entity(ty.value.to_owned()),
            };

            params.push(Param { name: name.value.to_owned(), ty });

            if self.accept(",").is_none() {
                return Ok(params)
            }
        }
    }

    //
    // PSM grammar
    //

    fn parse_psm(&mut self) -> Result<PsmModel> {
        let mut schemas = Vec::new();
        let mut routes = Vec::new();

        self.expect("psm")?;
        let platform_token = self.expect_identifier()?;
        let platform = platform_token.value.parse::<Platform>().map_err(|()| Error::Semantic {
            message: format!("Unsupported platform '{}'", platform_token.value),
            range:   Some(platform_token.range),
        })?;
        let name = self.expect_identifier()?;
        self.expect("{")?;

        while self.is_at("schema") {
            schemas.push(self.parse_schema()?);
        }

        while self.is_at("route") {
            routes.push(self.parse_route()?);
        }

        self.expect("}")?;

        Ok(PsmModel {
            platform,
            name: name.value.to_owned(),
            schemas,
            routes,
        })
    }

    fn parse_schema(&mut self) -> Result<SchemaDecl> {
        self.expect("schema")?;
        let name = self.expect_identifier()?;
        let key = match self.accept("key") {
            Some(_) => Some(self.expect_identifier()?),
            None    => None,
        };

        self.expect("{")?;
        let fields = self.parse_fields(name.value, Self::parse_concrete_type)?;
        self.expect("}")?;

        let identity = match key {
            None => Identity::Positional,
            Some(key) if fields.iter().any(|&(ref field, _)| field == key.value) => {
                Identity::Field(key.value.to_owned())
            },
            Some(key) => return Err(Error::Semantic {
                message: format!("Key '{}' is not a field of '{}'", key.value, name.value),
                range:   Some(key.range),
            }),
        };

        Ok(SchemaDecl {
            name: name.value.to_owned(),
            fields: fields.into_iter().map(|(name, ty)| SchemaField { name, ty }).collect(),
            identity,
        })
    }

    fn parse_route(&mut self) -> Result<RouteDecl> {
        self.expect("route")?;
        let method = self.parse_method()?;
        let path = self.expect_kind(TokenKind::String, "path string")?;
        let path = unquote(path.value, path.range)?;
        self.expect("{")?;
        let summary = self.parse_summary()?;

        let path_param = match self.accept("path_param") {
            Some(_) => {
                self.expect(":")?;
                let name = self.expect_identifier()?;
                self.expect(":")?;
                let ty = self.parse_concrete_type()?;
                Some(PathParam { name: name.value.to_owned(), ty })
            },
            None => None,
        };

        let body = match self.accept("body") {
            Some(_) => {
                self.expect(":")?;
                Some(self.expect_identifier()?.value.to_owned())
            },
            None => None,
        };

        self.expect("response")?;
        self.expect(":")?;

        let response = match self.parse_response_shape()? {
            (name, true) => PsmResponse::List(name),
            (ref name, false) if name == MAP_TYPE_NAME => PsmResponse::Map,
            (name, false) => PsmResponse::Entity(name),
        };

        self.expect("status")?;
        self.expect(":")?;
        let status_token = self.expect_kind(TokenKind::Numeric, "status code")?;
        let status = status_token.value.parse::<u16>().map_err(|_| Error::Syntax {
            message: format!("Invalid status code {}", status_token.value),
            range:   status_token.range,
        })?;

        self.expect("}")?;

        Ok(RouteDecl {
            method,
            path,
            summary,
            path_param,
            body,
            response,
            status,
        })
    }
}
