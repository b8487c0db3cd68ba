use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    tree::{ParseTree, Rule, RuleNode},
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<ParseTree, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => {
            let token = parser.current_token().clone();
            let error = Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: token.value,
                    message: String::from("expected an expression"),
                },
                token.span.start,
            );
            return Ok(parser.recover(error));
        }
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs.
    // An operator that starts a new line begins the next declaration instead.
    loop {
        let token = parser.current_token();
        if token.newline_before {
            break;
        }
        let kind = token.kind;
        let Some(led) = parser.get_led_lookup().get(&kind).copied() else {
            break;
        };
        let next_bp = parser
            .get_bp_lookup()
            .get(&kind)
            .copied()
            .unwrap_or(BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<ParseTree, Error> {
    let token = parser.advance();
    let rule = match token.kind {
        TokenKind::Number if token.number_parts().0.contains('.') => Rule::Float,
        TokenKind::Number => Rule::Int,
        TokenKind::String => Rule::Str,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    let mut node = RuleNode::new(rule);
    node.push_token(token);
    Ok(ParseTree::Rule(node))
}

/// `name`, `Type::name` or a call `name(args)`.
pub fn parse_symbol_expr(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::Id);
    node.push_token(parser.expect(TokenKind::Identifier)?);

    while parser.current_token_kind() == TokenKind::ColonColon {
        node.push_token(parser.advance());
        node.push_token(parser.expect(TokenKind::Identifier)?);
    }

    if parser.current_token_kind() == TokenKind::OpenParen && !parser.current_token().newline_before
    {
        node.rule = Rule::FnCall;
        node.push_token(parser.advance());

        if parser.current_token_kind() != TokenKind::CloseParen {
            node.push(parse_expr(parser, BindingPower::Default)?);
            while let Some(comma) = parser.accept(TokenKind::Comma) {
                node.push_token(comma);
                node.push(parse_expr(parser, BindingPower::Default)?);
            }
        }

        node.push_token(parser.expect(TokenKind::CloseParen)?);
    }

    Ok(ParseTree::Rule(node))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::Paren);
    node.push_token(parser.expect(TokenKind::OpenParen)?);
    node.push(parse_expr(parser, BindingPower::Default)?);
    node.push_token(parser.expect(TokenKind::CloseParen)?);

    Ok(ParseTree::Rule(node))
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: ParseTree,
    bp: BindingPower,
) -> Result<ParseTree, Error> {
    let operator_token = parser.advance();
    let rule = match operator_token.kind {
        TokenKind::Plus | TokenKind::Dash => Rule::AddOrSub,
        TokenKind::Star | TokenKind::Slash => Rule::MulOrDiv,
        _ => Rule::Compare,
    };

    let right = parse_expr(parser, bp)?;

    let mut node = RuleNode::new(rule);
    node.push(left);
    node.push_token(operator_token);
    node.push(right);
    Ok(ParseTree::Rule(node))
}

/// `^` binds to the right: `2 ^ 3 ^ 2` is `2 ^ (3 ^ 2)`.
pub fn parse_power_expr(
    parser: &mut Parser,
    left: ParseTree,
    _bp: BindingPower,
) -> Result<ParseTree, Error> {
    let operator_token = parser.advance();
    let right = parse_expr(parser, BindingPower::Multiplicative)?;

    let mut node = RuleNode::new(Rule::Pow);
    node.push(left);
    node.push_token(operator_token);
    node.push(right);
    Ok(ParseTree::Rule(node))
}

pub fn parse_ternary_expr(
    parser: &mut Parser,
    condition: ParseTree,
    _bp: BindingPower,
) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::Ternary);
    node.push(condition);
    node.push_token(parser.expect(TokenKind::Question)?);
    node.push(parse_expr(parser, BindingPower::Default)?);
    node.push_token(parser.expect(TokenKind::Colon)?);
    node.push(parse_expr(parser, BindingPower::Default)?);

    Ok(ParseTree::Rule(node))
}

pub fn parse_member_expr(
    parser: &mut Parser,
    left: ParseTree,
    _bp: BindingPower,
) -> Result<ParseTree, Error> {
    let mut node = RuleNode::new(Rule::Access);
    node.push(left);
    node.push_token(parser.expect(TokenKind::Dot)?);
    node.push_token(parser.expect(TokenKind::Identifier)?);

    Ok(ParseTree::Rule(node))
}
