//! The types language: packages of types that extend and implement each other.
//!
//! ```text
//! Model    := Element*
//! Element  := Package | Type
//! Package  := 'package' Ident '{' Element* '}'
//! Type     := 'type' Ident ('extends' QName)? ('implements' QName (',' QName)*)? ';'?
//! QName    := Ident ('.' Ident)*
//! ```
//!
//! `extends` and `implements` are cross-references: the parser stores the
//! written name as a proxy and leaves binding to the linker.

use std::sync::Arc;

use smol_str::SmolStr;

use super::lexer::{Lexer, Token, TokenKind};
use super::{ParseOutput, Parser};
use crate::base::constants::{NAME_FEATURE, TYPES_FILE_EXTENSION, TYPES_NS_URI};
use crate::base::{TextRange, TextSize};
use crate::model::{Classifier, FeatureDef, NodeId, Package, Proxy};
use crate::naming::QualifiedName;
use crate::resource::{Diagnostic, DiagnosticKind, codes};

/// Classifiers of the types language.
#[derive(Clone, Debug)]
pub struct TypesMetamodel {
    package: Arc<Package>,
    model: Arc<Classifier>,
    element: Arc<Classifier>,
    package_decl: Arc<Classifier>,
    type_decl: Arc<Classifier>,
}

impl TypesMetamodel {
    pub const ELEMENTS: &'static str = "elements";
    pub const EXTENDS: &'static str = "extends";
    pub const IMPLEMENTS: &'static str = "implements";

    pub fn new() -> Self {
        let element = Classifier::builder("Element")
            .feature(FeatureDef::attribute(NAME_FEATURE))
            .build();
        let model = Classifier::builder("Model")
            .feature(FeatureDef::containment(Self::ELEMENTS, "Element").many())
            .build();
        let package_decl = Classifier::builder("Package")
            .super_type(&element)
            .feature(FeatureDef::containment(Self::ELEMENTS, "Element").many())
            .build();
        let type_decl = Classifier::builder("Type")
            .super_type(&element)
            .feature(FeatureDef::reference(Self::EXTENDS, "Type").cross_reference())
            .feature(
                FeatureDef::reference(Self::IMPLEMENTS, "Type")
                    .many()
                    .cross_reference(),
            )
            .build();
        let package = Arc::new(
            Package::new(TYPES_NS_URI, "types")
                .with_classifier(Arc::clone(&model))
                .with_classifier(Arc::clone(&element))
                .with_classifier(Arc::clone(&package_decl))
                .with_classifier(Arc::clone(&type_decl)),
        );
        Self {
            package,
            model,
            element,
            package_decl,
            type_decl,
        }
    }

    pub fn package(&self) -> &Arc<Package> {
        &self.package
    }

    pub fn model(&self) -> &Arc<Classifier> {
        &self.model
    }

    pub fn element(&self) -> &Arc<Classifier> {
        &self.element
    }

    pub fn package_decl(&self) -> &Arc<Classifier> {
        &self.package_decl
    }

    pub fn type_decl(&self) -> &Arc<Classifier> {
        &self.type_decl
    }
}

impl Default for TypesMetamodel {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Parser`] for `.types` files.
#[derive(Clone, Debug, Default)]
pub struct TypesLanguage {
    metamodel: TypesMetamodel,
}

impl TypesLanguage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metamodel(&self) -> &TypesMetamodel {
        &self.metamodel
    }
}

impl Parser for TypesLanguage {
    fn package(&self) -> Arc<Package> {
        Arc::clone(&self.metamodel.package)
    }

    fn file_extensions(&self) -> &[&str] {
        &[TYPES_FILE_EXTENSION]
    }

    fn parse(&self, text: &str) -> ParseOutput {
        TypesParser::new(&self.metamodel, text).parse()
    }
}

// ============================================================================
// RECURSIVE DESCENT
// ============================================================================

struct TypesParser<'a> {
    metamodel: &'a TypesMetamodel,
    tokens: Vec<Token<'a>>,
    pos: usize,
    end: TextSize,
    output: ParseOutput,
}

impl<'a> TypesParser<'a> {
    fn new(metamodel: &'a TypesMetamodel, text: &'a str) -> Self {
        Self {
            metamodel,
            tokens: Lexer::new(text).filter(|t| !t.kind.is_trivia()).collect(),
            pos: 0,
            end: TextSize::of(text),
            output: ParseOutput::default(),
        }
    }

    fn parse(mut self) -> ParseOutput {
        let root = self.output.tree.create_node(&self.metamodel.model);
        let installed = self.output.tree.set_root(root);
        self.check(installed);
        self.output.tree.set_range(root, TextRange::up_to(self.end));

        while !self.at_end() {
            if self.at(TokenKind::RBrace) {
                self.error_here("unexpected '}'");
                self.bump();
                continue;
            }
            self.element(root);
        }
        self.output
    }

    fn element(&mut self, container: NodeId) {
        match self.peek() {
            Some(TokenKind::TypeKw) => self.type_decl(container),
            Some(TokenKind::PackageKw) => self.package_decl(container),
            _ => {
                self.error_here("expected 'type' or 'package'");
                self.recover();
            }
        }
    }

    fn package_decl(&mut self, container: NodeId) {
        let start = self.offset();
        self.bump();
        let metamodel = self.metamodel;
        let node = self.new_element(container, &metamodel.package_decl);
        self.name(node, "expected package name");

        if !self.eat(TokenKind::LBrace) {
            self.error_here("expected '{'");
        }
        while !self.at_end() && !self.at(TokenKind::RBrace) {
            self.element(node);
        }
        if !self.eat(TokenKind::RBrace) {
            self.error_here("expected '}'");
        }
        self.finish(node, start);
    }

    fn type_decl(&mut self, container: NodeId) {
        let start = self.offset();
        self.bump();
        let metamodel = self.metamodel;
        let node = self.new_element(container, &metamodel.type_decl);
        self.name(node, "expected type name");

        if self.eat(TokenKind::ExtendsKw) {
            match self.qualified_name() {
                Some(name) => self.proxy(node, TypesMetamodel::EXTENDS, name),
                None => self.error_here("expected type name after 'extends'"),
            }
        }
        if self.eat(TokenKind::ImplementsKw) {
            loop {
                match self.qualified_name() {
                    Some(name) => self.proxy(node, TypesMetamodel::IMPLEMENTS, name),
                    None => {
                        self.error_here("expected type name after 'implements'");
                        break;
                    }
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.eat(TokenKind::Semicolon);
        self.finish(node, start);
    }

    fn qualified_name(&mut self) -> Option<QualifiedName> {
        let mut segments: Vec<SmolStr> = vec![self.ident()?];
        while self.eat(TokenKind::Dot) {
            match self.ident() {
                Some(segment) => segments.push(segment),
                None => {
                    self.error_here("expected identifier after '.'");
                    break;
                }
            }
        }
        Some(QualifiedName::new(segments))
    }

    fn name(&mut self, node: NodeId, message: &str) {
        match self.ident() {
            Some(name) => {
                let result = self.output.tree.set_attribute(node, NAME_FEATURE, name);
                self.check(result);
            }
            None => self.error_here(message),
        }
    }

    fn new_element(&mut self, container: NodeId, classifier: &Arc<Classifier>) -> NodeId {
        let node = self.output.tree.create_node(classifier);
        let result = self
            .output
            .tree
            .attach(container, TypesMetamodel::ELEMENTS, None, node);
        self.check(result);
        node
    }

    fn proxy(&mut self, node: NodeId, feature: &str, name: QualifiedName) {
        match self.output.tree.add_proxy(node, feature, Proxy::Name(name)) {
            Ok(pending) => self.output.unresolved.push(pending),
            Err(e) => self.internal_error(e),
        }
    }

    fn finish(&mut self, node: NodeId, start: TextSize) {
        let end = self
            .pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.range().end())
            .unwrap_or(start);
        self.output
            .tree
            .set_range(node, TextRange::new(start, end.max(start)));
    }

    // ------------------------------------------------------------------------
    // token helpers
    // ------------------------------------------------------------------------

    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn bump(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<SmolStr> {
        let token = self.tokens.get(self.pos)?;
        if token.kind != TokenKind::Ident {
            return None;
        }
        let text = SmolStr::new(token.text);
        self.bump();
        Some(text)
    }

    fn offset(&self) -> TextSize {
        self.tokens
            .get(self.pos)
            .map(|t| t.offset)
            .unwrap_or(self.end)
    }

    /// Skip at least one token, then up to the next element start or `}`.
    fn recover(&mut self) {
        self.bump();
        while let Some(kind) = self.peek() {
            if matches!(
                kind,
                TokenKind::TypeKw | TokenKind::PackageKw | TokenKind::RBrace
            ) {
                break;
            }
            self.bump();
        }
    }

    fn error_here(&mut self, message: &str) {
        let (message, range) = match self.tokens.get(self.pos) {
            Some(token) if token.kind == TokenKind::Error => (
                format!("{message}, found invalid character '{}'", token.text),
                token.range(),
            ),
            Some(token) => (format!("{message}, found '{}'", token.text), token.range()),
            None => (
                format!("{message}, found end of file"),
                TextRange::empty(self.end),
            ),
        };
        self.push_syntax_error(message, range);
    }

    fn push_syntax_error(&mut self, message: String, range: TextRange) {
        self.output.diagnostics.push(
            Diagnostic::error(DiagnosticKind::Syntax, message)
                .with_code(codes::SYNTAX_ERROR)
                .with_range(Some(range)),
        );
    }

    fn check(&mut self, result: crate::Result<()>) {
        if let Err(e) = result {
            self.internal_error(e);
        }
    }

    fn internal_error(&mut self, error: crate::Error) {
        let range = TextRange::empty(self.offset());
        self.push_syntax_error(format!("cannot build node: {error}"), range);
    }
}
