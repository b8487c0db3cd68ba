use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{
    parser::Parser,
    tree::{ParseTree, Rule, RuleNode},
};

fn unexpected(parser: &Parser, message: &str) -> Error {
    Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from(message),
        },
        parser.get_position(),
    )
}

pub fn parse_top_stat(parser: &mut Parser) -> Result<ParseTree, Error> {
    match parser.current_token_kind() {
        TokenKind::Import => parse_import_stat(parser),
        TokenKind::Let => parse_define(parser),
        TokenKind::Fn => parse_fn_define(parser),
        TokenKind::Plus if parser.peek_kind(1) == TokenKind::Fn => parse_fn_define(parser),
        TokenKind::Plus | TokenKind::Identifier => parse_var_define(parser),
        TokenKind::Type => parse_type_define(parser),
        TokenKind::Trait => parse_trait_define(parser),
        TokenKind::Impl => parse_impl_block(parser),
        _ => Err(unexpected(parser, "expected a top-level declaration")),
    }
}

pub fn parse_import_stat(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::ImportStat);
    node.push_token(parser.expect(TokenKind::Import)?);
    node.push_token(parser.expect(TokenKind::Identifier)?);

    while let Some(separator) = parser.accept(TokenKind::ColonColon) {
        node.push_token(separator);
        node.push_token(parser.expect(TokenKind::Identifier)?);
    }

    Ok(ParseTree::Rule(node))
}

/// `let [mut] varDefine (, varDefine)*`
pub fn parse_define(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::Define);
    node.push_token(parser.expect(TokenKind::Let)?);
    if let Some(mutable) = parser.accept(TokenKind::Mut) {
        node.push_token(mutable);
    }

    node.push(parse_var_define(parser)?);
    while let Some(comma) = parser.accept(TokenKind::Comma) {
        node.push_token(comma);
        node.push(parse_var_define(parser)?);
    }

    Ok(ParseTree::Rule(node))
}

/// `[+] name [: Type] = expr`
pub fn parse_var_define(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::VarDefine);
    if let Some(export) = parser.accept(TokenKind::Plus) {
        node.push_token(export);
    }

    let error = unexpected(parser, "expected identifier during variable definition");
    node.push_token(parser.expect_error(TokenKind::Identifier, Some(error))?);

    if let Some(colon) = parser.accept(TokenKind::Colon) {
        node.push_token(colon);
        node.push(parse_type_form(parser)?);
    }

    node.push_token(parser.expect(TokenKind::Assignment)?);
    node.push(parse_expr(parser, BindingPower::Default)?);

    Ok(ParseTree::Rule(node))
}

pub fn parse_type_form(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::TypeForm);
    let error = unexpected(parser, "expected a type name");
    node.push_token(parser.expect_error(TokenKind::Identifier, Some(error))?);

    Ok(ParseTree::Rule(node))
}

fn parse_param(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::Param);
    node.push_token(parser.expect(TokenKind::Identifier)?);
    node.push_token(parser.expect(TokenKind::Colon)?);
    node.push(parse_type_form(parser)?);

    Ok(ParseTree::Rule(node))
}

/// `( param, ... ) [-> Type]`, shared by functions and trait methods.
fn parse_signature(parser: &mut Parser, node: &mut RuleNode) -> Result<(), Error> {
    node.push_token(parser.expect(TokenKind::OpenParen)?);
    if parser.current_token_kind() != TokenKind::CloseParen {
        node.push(parse_param(parser)?);
        while let Some(comma) = parser.accept(TokenKind::Comma) {
            node.push_token(comma);
            node.push(parse_param(parser)?);
        }
    }
    node.push_token(parser.expect(TokenKind::CloseParen)?);

    if let Some(arrow) = parser.accept(TokenKind::Arrow) {
        node.push_token(arrow);
        node.push(parse_type_form(parser)?);
    }

    Ok(())
}

/// `[+] fn name(params) [-> Type] { stat* }`
pub fn parse_fn_define(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::FnDefine);
    if let Some(export) = parser.accept(TokenKind::Plus) {
        node.push_token(export);
    }
    node.push_token(parser.expect(TokenKind::Fn)?);
    node.push_token(parser.expect(TokenKind::Identifier)?);
    parse_signature(parser, &mut node)?;

    node.push_token(parser.expect(TokenKind::OpenCurly)?);
    while parser.current_token_kind() != TokenKind::CloseCurly && parser.has_tokens() {
        let start = parser.pos();
        let stat = parse_stat(parser)?;
        if parser.pos() == start {
            return Err(unexpected(parser, "expected a statement"));
        }
        node.push(stat);
    }
    node.push_token(parser.expect(TokenKind::CloseCurly)?);

    Ok(ParseTree::Rule(node))
}

/// `type [+] Name (attr, ...)`
pub fn parse_type_define(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::TypeDefine);
    node.push_token(parser.expect(TokenKind::Type)?);
    if let Some(export) = parser.accept(TokenKind::Plus) {
        node.push_token(export);
    }
    node.push_token(parser.expect(TokenKind::Identifier)?);
    node.push_token(parser.expect(TokenKind::OpenParen)?);

    loop {
        let mut attr = RuleNode::new(Rule::Attr);
        attr.push_token(parser.expect(TokenKind::Identifier)?);
        attr.push_token(parser.expect(TokenKind::Colon)?);
        attr.push(parse_type_form(parser)?);
        node.push(ParseTree::Rule(attr));

        match parser.accept(TokenKind::Comma) {
            Some(comma) => node.push_token(comma),
            None => break,
        }
    }
    node.push_token(parser.expect(TokenKind::CloseParen)?);

    Ok(ParseTree::Rule(node))
}

/// `trait [+] Name { method(params) [-> Type] ... }`
pub fn parse_trait_define(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::TraitDefine);
    node.push_token(parser.expect(TokenKind::Trait)?);
    if let Some(export) = parser.accept(TokenKind::Plus) {
        node.push_token(export);
    }
    node.push_token(parser.expect(TokenKind::Identifier)?);
    node.push_token(parser.expect(TokenKind::OpenCurly)?);

    while parser.current_token_kind() == TokenKind::Identifier {
        let mut method = RuleNode::new(Rule::TMethod);
        method.push_token(parser.advance());
        parse_signature(parser, &mut method)?;
        node.push(ParseTree::Rule(method));

        if let Some(comma) = parser.accept(TokenKind::Comma) {
            node.push_token(comma);
        }
    }
    node.push_token(parser.expect(TokenKind::CloseCurly)?);

    Ok(ParseTree::Rule(node))
}

/// `impl Name [: Trait, ...] { fnDefine* }`
pub fn parse_impl_block(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::ImplBlock);
    node.push_token(parser.expect(TokenKind::Impl)?);
    node.push_token(parser.expect(TokenKind::Identifier)?);

    if let Some(colon) = parser.accept(TokenKind::Colon) {
        node.push_token(colon);
        node.push(parse_type_form(parser)?);
        while let Some(comma) = parser.accept(TokenKind::Comma) {
            node.push_token(comma);
            node.push(parse_type_form(parser)?);
        }
    }

    node.push_token(parser.expect(TokenKind::OpenCurly)?);
    while parser.current_token_kind() != TokenKind::CloseCurly && parser.has_tokens() {
        node.push(parse_fn_define(parser)?);
    }
    node.push_token(parser.expect(TokenKind::CloseCurly)?);

    Ok(ParseTree::Rule(node))
}

pub fn parse_stat(parser: &mut Parser) -> Result<ParseTree, Error> {
    match parser.current_token_kind() {
        TokenKind::Let => parse_define(parser),
        TokenKind::Return => parse_return_stat(parser),
        TokenKind::Match => parse_match_rule(parser),
        TokenKind::Identifier if parser.peek_kind(1) == TokenKind::Assignment => {
            let mut node = RuleNode::new(Rule::Assign);
            node.push_token(parser.advance());
            node.push_token(parser.advance());
            node.push(parse_expr(parser, BindingPower::Default)?);
            Ok(ParseTree::Rule(node))
        }
        _ => {
            let mut node = RuleNode::new(Rule::ExprStat);
            node.push(parse_expr(parser, BindingPower::Default)?);
            Ok(ParseTree::Rule(node))
        }
    }
}

fn parse_return_stat(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::ReturnStat);
    node.push_token(parser.expect(TokenKind::Return)?);

    // A bare `return` ends at the line break.
    if parser.at_expression_start() && !parser.current_token().newline_before {
        node.push(parse_expr(parser, BindingPower::Default)?);
    }

    Ok(ParseTree::Rule(node))
}

/// `match expr { pattern => stat, ... }`
fn parse_match_rule(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::MatchRule);
    node.push_token(parser.expect(TokenKind::Match)?);
    node.push(parse_expr(parser, BindingPower::Default)?);
    node.push_token(parser.expect(TokenKind::OpenCurly)?);

    while parser.current_token_kind() != TokenKind::CloseCurly && parser.has_tokens() {
        let start = parser.pos();
        let mut arm = RuleNode::new(Rule::MatchArm);
        arm.push(parse_expr(parser, BindingPower::Default)?);
        arm.push_token(parser.expect(TokenKind::FatArrow)?);
        arm.push(parse_stat(parser)?);
        node.push(ParseTree::Rule(arm));

        if let Some(comma) = parser.accept(TokenKind::Comma) {
            node.push_token(comma);
        }
        if parser.pos() == start {
            return Err(unexpected(parser, "expected a match arm"));
        }
    }
    node.push_token(parser.expect(TokenKind::CloseCurly)?);

    Ok(ParseTree::Rule(node))
}
