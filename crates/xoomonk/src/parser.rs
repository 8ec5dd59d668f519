//! C3: the recursive-descent parser.
//!
//! One function per grammar production in §4.2, grounded on the shape of hand-written
//! recursive-descent parsers elsewhere in the retrieval pack: each `parse_x` consumes
//! exactly the tokens production `x` covers and returns once the next token belongs to
//! whatever follows `x`, relying on the scanner's one-token (and, for the `print` keyword
//! ambiguity, two-token) lookahead rather than backtracking.

use std::rc::Rc;

use crate::{
    ast::{Block, Expr, NamePart, PrintKind, Program, Ref, Stmt},
    error::XoomonkError,
    lexer::{Lexer, TokenKind},
};

/// Parses a full program from source text.
///
/// # Errors
/// Returns a `SyntaxError` on the first malformed token or construct.
pub fn parse(source: &str) -> Result<Program, XoomonkError> {
    let mut lexer = Lexer::new(source)?;
    let mut statements = Vec::new();
    while lexer.peek_kind() != TokenKind::Eof {
        statements.push(parse_stmt(&mut lexer)?);
    }
    Ok(Program { statements })
}

fn parse_stmt(lexer: &mut Lexer<'_>) -> Result<Stmt, XoomonkError> {
    if is_print_keyword(lexer)? {
        parse_print_stmt(lexer)
    } else {
        parse_assignment(lexer)
    }
}

/// `print` only introduces a print-statement when it isn't itself the name being assigned
/// to or dotted into, i.e. when it is *not* immediately followed by `:=` or `.`.
fn is_print_keyword(lexer: &mut Lexer<'_>) -> Result<bool, XoomonkError> {
    let token = lexer.peek();
    if token.kind != TokenKind::Identifier || token.lexeme != "print" {
        return Ok(false);
    }
    let next = lexer.peek2()?;
    Ok(next.lexeme != ":=" && next.lexeme != ".")
}

fn parse_assignment(lexer: &mut Lexer<'_>) -> Result<Stmt, XoomonkError> {
    let target = parse_ref(lexer)?;
    let position = target.position;
    lexer.expect(":=")?;
    let value = parse_expr(lexer)?;
    Ok(Stmt::Assignment { target, value, position })
}

fn parse_print_stmt(lexer: &mut Lexer<'_>) -> Result<Stmt, XoomonkError> {
    lexer.expect("print")?;
    let print = if is_keyword(lexer, "string") {
        lexer.advance()?;
        let token = lexer.peek().clone();
        lexer.check_type(TokenKind::String)?;
        lexer.advance()?;
        PrintKind::String(token.lexeme, token.position)
    } else if is_keyword(lexer, "char") {
        lexer.advance()?;
        PrintKind::Char(parse_expr(lexer)?)
    } else {
        PrintKind::Value(parse_expr(lexer)?)
    };
    let had_semicolon = lexer.consume(";")?;
    Ok(Stmt::Print { print, newline: !had_semicolon })
}

fn is_keyword(lexer: &Lexer<'_>, keyword: &str) -> bool {
    let token = lexer.peek();
    token.kind == TokenKind::Identifier && token.lexeme == keyword
}

fn parse_expr(lexer: &mut Lexer<'_>) -> Result<Expr, XoomonkError> {
    let primary = parse_primary(lexer)?;
    if lexer.consume("*")? {
        let position = primary.position();
        Ok(Expr::CopyOf(Box::new(primary), position))
    } else {
        Ok(primary)
    }
}

fn parse_primary(lexer: &mut Lexer<'_>) -> Result<Expr, XoomonkError> {
    let token = lexer.peek().clone();
    match token.kind {
        TokenKind::Operator if token.lexeme == "{" => Ok(Expr::Block(parse_block(lexer)?)),
        TokenKind::Integer => {
            lexer.advance()?;
            let value = token.lexeme.parse().map_err(|_| {
                XoomonkError::syntax(format!("invalid integer literal '{}'", token.lexeme), token.position)
            })?;
            Ok(Expr::IntLit(value, token.position))
        }
        TokenKind::Identifier | TokenKind::Operator => Ok(Expr::Ref(parse_ref(lexer)?)),
        _ => Err(XoomonkError::syntax(
            format!("unexpected token '{}' while parsing an expression", token.lexeme),
            token.position,
        )),
    }
}

fn parse_block(lexer: &mut Lexer<'_>) -> Result<Block, XoomonkError> {
    let open = lexer.expect("{")?;
    let mut statements = Vec::new();
    while lexer.peek().lexeme != "}" {
        if lexer.peek_kind() == TokenKind::Eof {
            return Err(XoomonkError::syntax("unterminated block, expected '}'", open.position));
        }
        statements.push(parse_stmt(lexer)?);
    }
    lexer.expect("}")?;
    Ok(Block {
        statements: Rc::from(statements),
        position: open.position,
    })
}

fn parse_ref(lexer: &mut Lexer<'_>) -> Result<Ref, XoomonkError> {
    let position = lexer.peek().position;
    let mut parts = vec![parse_name(lexer)?];
    while lexer.consume(".")? {
        parts.push(parse_name(lexer)?);
    }
    Ok(Ref { parts, position })
}

fn parse_name(lexer: &mut Lexer<'_>) -> Result<NamePart, XoomonkError> {
    let token = lexer.peek().clone();
    match (token.kind, token.lexeme.as_str()) {
        (TokenKind::Operator, "^") => {
            lexer.advance()?;
            Ok(NamePart::Upvalue)
        }
        (TokenKind::Operator, "$") => {
            lexer.advance()?;
            let name_token = lexer.peek().clone();
            lexer.check_type(TokenKind::Identifier)?;
            lexer.advance()?;
            Ok(NamePart::Dollar(name_token.lexeme))
        }
        (TokenKind::Identifier, _) => {
            lexer.advance()?;
            Ok(NamePart::Identifier(token.lexeme))
        }
        _ => Err(XoomonkError::syntax(
            format!("expected a name ('^', '$name', or an identifier) but found '{}'", token.lexeme),
            token.position,
        )),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::dump;

    #[test]
    fn parses_bare_print_with_newline() {
        let program = parse("print 42").unwrap();
        assert_eq!(program.statements.len(), 1);
        assert!(program.statements[0].has_newline_wrapper());
    }

    #[test]
    fn semicolon_suppresses_newline() {
        let program = parse("print 42;").unwrap();
        assert!(!program.statements[0].has_newline_wrapper());
    }

    #[test]
    fn print_keyword_vs_print_variable() {
        let program = parse("print := 1 print print;").unwrap();
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.statements[0].kind(), crate::ast::Kind::Assignment);
        assert_eq!(program.statements[1].kind(), crate::ast::Kind::Print);
    }

    #[test]
    fn dotted_ref_assignment() {
        let program = parse("r.x.y := 1").unwrap();
        match &program.statements[0] {
            Stmt::Assignment { target, .. } => assert_eq!(target.parts.len(), 3),
            Stmt::Print { .. } => panic!("expected an assignment"),
        }
    }

    #[test]
    fn copy_of_suffix() {
        let program = parse("a := r*").unwrap();
        match &program.statements[0] {
            Stmt::Assignment { value, .. } => assert!(matches!(value, Expr::CopyOf(..))),
            Stmt::Print { .. } => panic!("expected an assignment"),
        }
    }

    #[test]
    fn upvalue_and_dollar_names() {
        let program = parse("a := ^ b := $g").unwrap();
        match &program.statements[0] {
            Stmt::Assignment { value: Expr::Ref(r), .. } => assert_eq!(*r.head(), NamePart::Upvalue),
            _ => panic!("expected a ref expression"),
        }
        match &program.statements[1] {
            Stmt::Assignment { value: Expr::Ref(r), .. } => {
                assert_eq!(*r.head(), NamePart::Dollar("g".to_owned()));
            }
            _ => panic!("expected a ref expression"),
        }
    }

    #[test]
    fn unterminated_block_is_syntax_error() {
        let err = parse("a := { b := 1").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::SyntaxError);
    }

    #[test]
    fn dump_is_deterministic_for_the_same_program() {
        let program = parse("r := { a := 1 b := a } print r.b").unwrap();
        assert_eq!(dump(&program), dump(&program));
    }
}
