//! Recursive-descent parser for the DDL subset that defines tables.

use std::collections::HashMap;

use crudforge_ir::{
    ColumnType, ForeignKey, ParsedSchema, ReferentialAction, SqlColumn, SqlTable, TableOrigin,
};
use miette::SourceSpan;

use super::{
    lexer::{Tok, Token},
    types::{self, TypeArgs},
};
use crate::{Result, error::SourceContext};

/// A column name used by a constraint, checked once the table is complete.
struct ColumnUse {
    name: String,
    span: SourceSpan,
}

pub(crate) struct Parser<'a> {
    ctx: &'a SourceContext,
    tokens: Vec<Token>,
    pos: usize,
    schema: ParsedSchema,
    /// `CREATE TYPE name AS ENUM (...)` definitions, by lowercase name.
    enums: HashMap<String, Vec<String>>,
}

impl<'a> Parser<'a> {
    pub fn new(ctx: &'a SourceContext, tokens: Vec<Token>, schema: ParsedSchema) -> Self {
        Self {
            ctx,
            tokens,
            pos: 0,
            schema,
            enums: HashMap::new(),
        }
    }

    pub fn parse(mut self) -> Result<ParsedSchema> {
        while let Some(tok) = self.peek() {
            if tok.tok == Tok::Semicolon {
                self.pos += 1;
            } else if tok.is_kw("CREATE") {
                self.create_statement()?;
            } else if tok.is_kw("ALTER") {
                self.alter_statement()?;
            } else if tok.is_kw("COMMENT") {
                self.comment_statement()?;
            } else {
                self.skip_statement()?;
            }
        }
        Ok(self.schema)
    }

    // Token cursor

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn peek_kw(&self, kw: &str) -> bool {
        self.peek().is_some_and(|t| t.is_kw(kw))
    }

    fn peek_tok(&self, tok: &Tok) -> bool {
        self.peek().is_some_and(|t| &t.tok == tok)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        if self.peek_kw(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_tok(&mut self, tok: &Tok) -> bool {
        if self.peek_tok(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Span for error labels: the current token, or the end of input.
    fn here(&self) -> SourceSpan {
        match self.peek() {
            Some(t) => (t.offset, t.len.max(1)).into(),
            None => (self.ctx.src().len().saturating_sub(1), 1).into(),
        }
    }

    fn describe_current(&self) -> String {
        match self.peek() {
            Some(t) => format!("'{}'", &self.ctx.src()[t.offset..t.end()]),
            None => "end of input".to_string(),
        }
    }

    fn unexpected(&self, expected: &str) -> Box<crate::Error> {
        self.ctx.sql_error(
            format!("expected {}, found {}", expected, self.describe_current()),
            self.here(),
            None,
        )
    }

    fn expect_kw(&mut self, kw: &str) -> Result<()> {
        if self.eat_kw(kw) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", kw)))
        }
    }

    fn expect_tok(&mut self, tok: Tok, what: &str) -> Result<Token> {
        match self.peek() {
            Some(t) if t.tok == tok => {
                self.pos += 1;
                Ok(self.tokens[self.pos - 1].clone())
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Unquoted names fold to lowercase, as the database stores them.
    /// Quoted names keep their case.
    fn expect_ident(&mut self, what: &str) -> Result<(String, SourceSpan)> {
        let Some(t) = self.peek() else {
            return Err(self.unexpected(what));
        };
        let name = match &t.tok {
            Tok::Word(word) => word.to_lowercase(),
            Tok::Quoted(quoted) => quoted.clone(),
            _ => return Err(self.unexpected(what)),
        };
        let span = (t.offset, t.len).into();
        self.pos += 1;
        Ok((name, span))
    }

    /// `[catalog.][schema.]name`, returning the last segment.
    fn qualified_name(&mut self, what: &str) -> Result<(String, SourceSpan)> {
        let mut name = self.expect_ident(what)?;
        while self.peek_tok(&Tok::Dot) {
            self.pos += 1;
            name = self.expect_ident(what)?;
        }
        Ok(name)
    }

    /// Consume a balanced `( ... )` group, returning the inner tokens.
    fn paren_group(&mut self) -> Result<Vec<Token>> {
        let open = self.expect_tok(Tok::LParen, "'('")?;
        let mut depth = 1;
        let mut inner = Vec::new();
        while let Some(tok) = self.advance() {
            match tok.tok {
                Tok::LParen => depth += 1,
                Tok::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(inner);
                    }
                }
                Tok::Semicolon if depth == 1 => break,
                _ => {}
            }
            inner.push(tok);
        }
        Err(self.ctx.sql_error(
            "unbalanced parentheses",
            (open.offset, 1),
            Some("add the missing ')'".into()),
        ))
    }

    /// `(a, b, c)` identifier list.
    fn column_list(&mut self) -> Result<Vec<ColumnUse>> {
        let open = self.expect_tok(Tok::LParen, "'('")?;
        let mut cols = Vec::new();
        loop {
            let (name, span) = self.expect_ident("column name")?;
            // MySQL prefix length and ordering: `name(10) DESC`
            if self.peek_tok(&Tok::LParen) {
                self.paren_group()?;
            }
            let _ = self.eat_kw("ASC") || self.eat_kw("DESC");
            cols.push(ColumnUse { name, span });
            if self.eat_tok(&Tok::Comma) {
                continue;
            }
            if self.eat_tok(&Tok::RParen) {
                return Ok(cols);
            }
            if self.peek().is_none() || self.peek_tok(&Tok::Semicolon) {
                return Err(self.ctx.sql_error(
                    "unbalanced parentheses",
                    (open.offset, 1),
                    Some("add the missing ')'".into()),
                ));
            }
            return Err(self.unexpected("',' or ')'"));
        }
    }

    /// Skip to just past the next top-level `;`.
    fn skip_statement(&mut self) -> Result<()> {
        let mut depth = 0usize;
        while let Some(tok) = self.advance() {
            match tok.tok {
                Tok::LParen => depth += 1,
                Tok::RParen => depth = depth.saturating_sub(1),
                Tok::Semicolon if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Ok(())
    }

    /// Skip tokens up to a top-level `,` or `)` of the enclosing list.
    fn skip_list_item(&mut self) -> Result<()> {
        while let Some(tok) = self.peek() {
            match tok.tok {
                Tok::Comma | Tok::RParen | Tok::Semicolon => return Ok(()),
                Tok::LParen => {
                    self.paren_group()?;
                }
                _ => self.pos += 1,
            }
        }
        Ok(())
    }

    // Statements

    fn create_statement(&mut self) -> Result<()> {
        let start = self.pos;
        self.expect_kw("CREATE")?;
        if self.eat_kw("OR") {
            self.expect_kw("REPLACE")?;
        }
        while self.eat_kw("TEMPORARY")
            || self.eat_kw("TEMP")
            || self.eat_kw("UNLOGGED")
            || self.eat_kw("GLOBAL")
            || self.eat_kw("LOCAL")
        {}

        if self.eat_kw("TABLE") {
            return self.create_table(start);
        }
        if self.eat_kw("TYPE") {
            return self.create_type();
        }
        self.skip_statement()
    }

    /// `CREATE TYPE name AS ENUM ('a', 'b')`
    fn create_type(&mut self) -> Result<()> {
        let (name, _) = self.qualified_name("type name")?;
        if self.eat_kw("AS") && self.eat_kw("ENUM") {
            let values = self
                .paren_group()?
                .into_iter()
                .filter_map(|t| match t.tok {
                    Tok::Str(s) => Some(s),
                    _ => None,
                })
                .collect();
            self.enums.insert(name.to_ascii_lowercase(), values);
        }
        self.skip_statement()
    }

    fn create_table(&mut self, start: usize) -> Result<()> {
        if self.eat_kw("IF") {
            self.expect_kw("NOT")?;
            self.expect_kw("EXISTS")?;
        }
        let (name, _) = self.qualified_name("table name")?;

        // CREATE TABLE x AS SELECT ... / LIKE ... carry no column definitions
        if !self.peek_tok(&Tok::LParen) {
            tracing::debug!(table = %name, "skipping table without column list");
            return self.skip_statement();
        }
        let open = self.expect_tok(Tok::LParen, "'('")?;

        let offset = self.tokens[start].offset;
        let mut table = SqlTable::new(&name, TableOrigin::Ddl { offset, len: 0 });
        let mut table_pk: Option<Vec<ColumnUse>> = None;
        let mut uses: Vec<ColumnUse> = Vec::new();

        if !self.eat_tok(&Tok::RParen) {
            loop {
                if self.starts_table_constraint() {
                    self.table_constraint(&mut table, &mut table_pk, &mut uses)?;
                } else {
                    self.column_definition(&mut table)?;
                }

                if self.eat_tok(&Tok::Comma) {
                    continue;
                }
                if self.eat_tok(&Tok::RParen) {
                    break;
                }
                if self.peek().is_none() || self.peek_tok(&Tok::Semicolon) {
                    return Err(self.ctx.sql_error(
                        format!("unbalanced parentheses in table '{}'", name),
                        (open.offset, 1),
                        Some("add the missing ')' after the last column".into()),
                    ));
                }
                return Err(self.unexpected("',' or ')' after column definition"));
            }
        }

        // Table options: ENGINE=..., COMMENT='...', WITHOUT ROWID, ...
        let mut end = self.tokens[self.pos - 1].end();
        while let Some(tok) = self.peek() {
            if tok.tok == Tok::Semicolon {
                break;
            }
            if tok.is_kw("COMMENT") {
                self.pos += 1;
                self.eat_tok(&Tok::Punct('='));
                if let Some(Token {
                    tok: Tok::Str(comment),
                    ..
                }) = self.peek().cloned()
                {
                    table.comment = Some(comment);
                    self.pos += 1;
                }
                continue;
            }
            end = tok.end();
            self.pos += 1;
        }
        self.eat_tok(&Tok::Semicolon);

        if let Some(pk) = table_pk {
            uses.extend(pk.iter().map(|c| ColumnUse {
                name: c.name.clone(),
                span: c.span,
            }));
            table.set_primary_key(pk.into_iter().map(|c| c.name).collect());
        } else {
            let inline: Vec<String> = table
                .columns
                .iter()
                .filter(|c| c.primary_key)
                .map(|c| c.name.clone())
                .collect();
            table.set_primary_key(inline);
        }

        self.check_columns(&table, &uses)?;
        let single_unique: Vec<String> = table
            .unique_constraints
            .iter()
            .filter(|cols| cols.len() == 1)
            .map(|cols| cols[0].clone())
            .collect();
        for name in single_unique {
            if let Some(col) = table.column_mut(&name) {
                col.unique = true;
            }
        }
        table.origin = TableOrigin::Ddl {
            offset,
            len: end - offset,
        };
        tracing::debug!(
            table = %table.name,
            columns = table.columns.len(),
            foreign_keys = table.foreign_keys.len(),
            "parsed table"
        );
        self.schema.tables.push(table);
        Ok(())
    }

    /// Whether the next list item is a table constraint rather than a column.
    ///
    /// Columns may be named like keywords (`key`, `index`, `check`), so the
    /// token after the keyword decides.
    fn starts_table_constraint(&self) -> bool {
        let Some(tok) = self.peek() else {
            return false;
        };
        let next = self.peek_at(1);
        let next_is = |kw: &str| next.is_some_and(|t| t.is_kw(kw));
        let next_is_paren = next.is_some_and(|t| t.tok == Tok::LParen);
        let then_paren = self.peek_at(2).is_some_and(|t| t.tok == Tok::LParen);

        if tok.is_kw("CONSTRAINT") {
            true
        } else if tok.is_kw("PRIMARY") || tok.is_kw("FOREIGN") {
            next_is("KEY")
        } else if tok.is_kw("CHECK") {
            next_is_paren
        } else if tok.is_kw("EXCLUDE") {
            next_is_paren || next_is("USING")
        } else if tok.is_kw("UNIQUE") || tok.is_kw("FULLTEXT") || tok.is_kw("SPATIAL") {
            next_is_paren || next_is("KEY") || next_is("INDEX") || then_paren
        } else if tok.is_kw("KEY") || tok.is_kw("INDEX") {
            next_is_paren || then_paren
        } else {
            false
        }
    }

    fn check_columns(&self, table: &SqlTable, uses: &[ColumnUse]) -> Result<()> {
        for col in uses {
            if table.column(&col.name).is_none() {
                return Err(self.ctx.sql_error(
                    format!("unknown column '{}' in table '{}'", col.name, table.name),
                    col.span,
                    Some(format!(
                        "columns of '{}' are: {}",
                        table.name,
                        table
                            .columns
                            .iter()
                            .map(|c| c.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )),
                ));
            }
        }
        Ok(())
    }

    fn column_definition(&mut self, table: &mut SqlTable) -> Result<()> {
        let (name, _) = self.expect_ident("column name")?;
        let (ty, raw_type, serial) = self.column_type()?;

        let mut column = SqlColumn::new(&name, ty);
        column.raw_type = raw_type;
        column.auto_increment = serial;

        while let Some(tok) = self.peek() {
            if matches!(tok.tok, Tok::Comma | Tok::RParen | Tok::Semicolon) {
                break;
            }
            if self.eat_kw("CONSTRAINT") {
                self.expect_ident("constraint name")?;
            } else if self.eat_kw("NOT") {
                self.expect_kw("NULL")?;
                column.nullable = false;
            } else if self.eat_kw("NULL") {
                column.nullable = true;
            } else if self.eat_kw("PRIMARY") {
                self.expect_kw("KEY")?;
                let _ = self.eat_kw("ASC") || self.eat_kw("DESC");
                column.primary_key = true;
                column.nullable = false;
            } else if self.eat_kw("UNIQUE") {
                self.eat_kw("KEY");
                column.unique = true;
            } else if self.eat_kw("DEFAULT") {
                column.default = Some(self.default_expression()?);
            } else if self.eat_kw("REFERENCES") {
                let fk = self.references(vec![name.clone()])?;
                table.foreign_keys.push(fk);
            } else if self.eat_kw("AUTO_INCREMENT") || self.eat_kw("AUTOINCREMENT") {
                column.auto_increment = true;
            } else if self.eat_kw("IDENTITY") {
                if self.peek_tok(&Tok::LParen) {
                    self.paren_group()?;
                }
                column.auto_increment = true;
            } else if self.eat_kw("GENERATED") {
                self.generated_clause(&mut column)?;
            } else if self.eat_kw("CHECK") {
                self.paren_group()?;
            } else if self.eat_kw("COLLATE") {
                self.expect_ident("collation")?;
            } else if self.eat_kw("CHARACTER") || self.eat_kw("CHARSET") {
                self.eat_kw("SET");
                self.expect_ident("character set")?;
            } else if self.eat_kw("COMMENT") {
                match self.advance() {
                    Some(Token {
                        tok: Tok::Str(text),
                        ..
                    }) => column.comment = Some(text),
                    _ => return Err(self.unexpected("comment string")),
                }
            } else if self.eat_kw("ON") {
                // MySQL `ON UPDATE CURRENT_TIMESTAMP`
                self.expect_kw("UPDATE")?;
                self.default_expression()?;
            } else {
                tracing::debug!(
                    column = %name,
                    token = %self.describe_current(),
                    "ignoring unsupported column option"
                );
                self.pos += 1;
            }
        }

        table.columns.push(column);
        Ok(())
    }

    /// `GENERATED {ALWAYS | BY DEFAULT} AS {IDENTITY [(...)] | (expr) [STORED]}`
    fn generated_clause(&mut self, column: &mut SqlColumn) -> Result<()> {
        if !self.eat_kw("ALWAYS") {
            self.expect_kw("BY")?;
            self.expect_kw("DEFAULT")?;
            if self.eat_kw("ON") {
                self.expect_kw("NULL")?;
            }
        }
        self.expect_kw("AS")?;
        if self.eat_kw("IDENTITY") {
            if self.peek_tok(&Tok::LParen) {
                self.paren_group()?;
            }
            column.auto_increment = true;
        } else {
            self.paren_group()?;
            let _ = self.eat_kw("STORED") || self.eat_kw("VIRTUAL");
            column.read_only = true;
        }
        Ok(())
    }

    /// Parse a column type, returning (type, raw text, implies auto-increment).
    fn column_type(&mut self) -> Result<(ColumnType, String, bool)> {
        let first = match self.peek() {
            Some(t) if matches!(t.tok, Tok::Word(_) | Tok::Quoted(_)) => t.clone(),
            _ => return Err(self.unexpected("column type")),
        };
        self.pos += 1;
        let start = first.offset;
        let mut name = first.ident().unwrap_or_default().to_ascii_lowercase();

        // Multi-word type names
        match name.as_str() {
            "double" => {
                if self.eat_kw("PRECISION") {
                    name.push_str(" precision");
                }
            }
            "character" | "char" | "national" => {
                if name == "national" {
                    let _ = self.eat_kw("CHARACTER") || self.eat_kw("CHAR");
                    name = "character".into();
                }
                if self.eat_kw("VARYING") {
                    name = "character varying".into();
                }
            }
            _ => {}
        }

        let mut args = TypeArgs::default();
        if self.peek_tok(&Tok::LParen) {
            for tok in self.paren_group()? {
                match tok.tok {
                    Tok::Number(n) => {
                        if let Ok(n) = n.parse() {
                            args.numbers.push(n);
                        }
                    }
                    Tok::Str(s) => args.strings.push(s),
                    // `varchar(max)`
                    _ => {}
                }
            }
        }

        if name == "timestamp" || name == "time" {
            let with = self.peek_kw("WITH") && self.peek_at(1).is_some_and(|t| t.is_kw("TIME"));
            let without =
                self.peek_kw("WITHOUT") && self.peek_at(1).is_some_and(|t| t.is_kw("TIME"));
            if with || without {
                self.pos += 3;
                name.push_str(if with {
                    " with time zone"
                } else {
                    " without time zone"
                });
            }
        }

        let mut is_array = false;
        while self.eat_tok(&Tok::ArraySuffix) {
            is_array = true;
        }
        if self.eat_kw("ARRAY") {
            is_array = true;
        }
        while self.eat_kw("UNSIGNED") || self.eat_kw("SIGNED") || self.eat_kw("ZEROFILL") {}

        let end = self.tokens[self.pos - 1].end();
        let raw = self.ctx.src()[start..end].to_string();

        if is_array {
            return Ok((ColumnType::Json, raw, false));
        }
        if let Some(values) = self.enums.get(&name) {
            return Ok((ColumnType::Enum(values.clone()), raw, false));
        }
        let resolved = types::resolve(&name, &args, &raw);
        Ok((resolved.ty, raw, resolved.auto_increment))
    }

    /// Capture a default expression verbatim from the source.
    fn default_expression(&mut self) -> Result<String> {
        let start = match self.peek() {
            Some(t) => t.offset,
            None => return Err(self.unexpected("default value")),
        };

        if self.peek_tok(&Tok::LParen) {
            self.paren_group()?;
        } else {
            let tok = self.tokens[self.pos].clone();
            self.pos += 1;
            if matches!(tok.tok, Tok::Punct('-') | Tok::Punct('+')) {
                self.advance();
            }
            if matches!(tok.tok, Tok::Word(_)) && self.peek_tok(&Tok::LParen) {
                self.paren_group()?;
            }
        }
        while self.eat_tok(&Tok::Cast) {
            self.column_type()?;
        }

        let end = self.tokens[self.pos - 1].end();
        Ok(self.ctx.src()[start..end].to_string())
    }

    /// `REFERENCES table [(cols)] [ON DELETE a] [ON UPDATE a] [MATCH x] [DEFERRABLE ...]`
    fn references(&mut self, columns: Vec<String>) -> Result<ForeignKey> {
        let (ref_table, _) = self.qualified_name("referenced table")?;
        let ref_columns = if self.peek_tok(&Tok::LParen) {
            self.column_list()?.into_iter().map(|c| c.name).collect()
        } else {
            Vec::new()
        };
        let mut fk = ForeignKey::new(columns, ref_table, ref_columns);

        loop {
            if self.peek_kw("ON")
                && self
                    .peek_at(1)
                    .is_some_and(|t| t.is_kw("DELETE") || t.is_kw("UPDATE"))
            {
                self.pos += 1;
                let is_delete = self.eat_kw("DELETE");
                if !is_delete {
                    self.expect_kw("UPDATE")?;
                }
                let action = self.referential_action()?;
                if is_delete {
                    fk.on_delete = Some(action);
                } else {
                    fk.on_update = Some(action);
                }
            } else if self.eat_kw("MATCH") {
                self.expect_ident("match type")?;
            } else if self.eat_kw("DEFERRABLE") {
                if self.eat_kw("INITIALLY") {
                    let _ = self.eat_kw("DEFERRED") || self.eat_kw("IMMEDIATE");
                }
            } else if self.peek_kw("NOT") && self.peek_at(1).is_some_and(|t| t.is_kw("DEFERRABLE"))
            {
                self.pos += 2;
            } else {
                return Ok(fk);
            }
        }
    }

    fn referential_action(&mut self) -> Result<ReferentialAction> {
        if self.eat_kw("CASCADE") {
            return Ok(ReferentialAction::Cascade);
        }
        if self.eat_kw("RESTRICT") {
            return Ok(ReferentialAction::Restrict);
        }
        if self.eat_kw("SET") {
            if self.eat_kw("NULL") {
                return Ok(ReferentialAction::SetNull);
            }
            self.expect_kw("DEFAULT")?;
            return Ok(ReferentialAction::SetDefault);
        }
        if self.eat_kw("NO") {
            self.expect_kw("ACTION")?;
            return Ok(ReferentialAction::NoAction);
        }
        Err(self.unexpected("CASCADE, RESTRICT, SET NULL, SET DEFAULT or NO ACTION"))
    }

    fn table_constraint(
        &mut self,
        table: &mut SqlTable,
        table_pk: &mut Option<Vec<ColumnUse>>,
        uses: &mut Vec<ColumnUse>,
    ) -> Result<()> {
        let mut name = None;
        if self.eat_kw("CONSTRAINT") {
            name = Some(self.expect_ident("constraint name")?.0);
        }

        if self.eat_kw("PRIMARY") {
            self.expect_kw("KEY")?;
            let cols = self.column_list()?;
            *table_pk = Some(cols);
        } else if self.eat_kw("UNIQUE") {
            let _ = self.eat_kw("KEY") || self.eat_kw("INDEX");
            if !self.peek_tok(&Tok::LParen) {
                self.expect_ident("index name")?;
            }
            let cols = self.column_list()?;
            table
                .unique_constraints
                .push(cols.iter().map(|c| c.name.clone()).collect());
            uses.extend(cols);
        } else if self.eat_kw("FOREIGN") {
            self.expect_kw("KEY")?;
            if !self.peek_tok(&Tok::LParen) {
                self.expect_ident("index name")?;
            }
            let cols = self.column_list()?;
            self.expect_kw("REFERENCES")?;
            let mut fk = self.references(cols.iter().map(|c| c.name.clone()).collect())?;
            fk.name = name;
            table.foreign_keys.push(fk);
            uses.extend(cols);
        } else {
            // CHECK, KEY, INDEX, FULLTEXT, SPATIAL, EXCLUDE
            self.skip_list_item()?;
            return Ok(());
        }

        self.skip_list_item()
    }

    /// `ALTER TABLE [IF EXISTS] [ONLY] name action [, action ...]`
    fn alter_statement(&mut self) -> Result<()> {
        self.expect_kw("ALTER")?;
        if !self.eat_kw("TABLE") {
            return self.skip_statement();
        }
        if self.eat_kw("IF") {
            self.expect_kw("EXISTS")?;
        }
        self.eat_kw("ONLY");
        let (name, name_span) = self.qualified_name("table name")?;

        loop {
            if self.eat_kw("ADD") {
                self.alter_add(&name, name_span)?;
            } else {
                self.skip_list_item()?;
            }
            if !self.eat_tok(&Tok::Comma) {
                break;
            }
        }
        self.skip_statement()
    }

    fn alter_add(&mut self, name: &str, name_span: SourceSpan) -> Result<()> {
        let adds_constraint = self.peek().is_some_and(|t| {
            ["CONSTRAINT", "PRIMARY", "UNIQUE", "FOREIGN", "CHECK"]
                .iter()
                .any(|kw| t.is_kw(kw))
        });
        let adds_column = !adds_constraint && !self.peek_kw("INDEX") && !self.peek_kw("KEY");

        if !adds_constraint && !adds_column {
            return self.skip_list_item();
        }

        let mut table = match self.schema.table(name) {
            Some(t) => t.clone(),
            None => {
                return Err(self.ctx.sql_error(
                    format!("ALTER TABLE references unknown table '{}'", name),
                    name_span,
                    Some("declare the table with CREATE TABLE before altering it".into()),
                ));
            }
        };

        if adds_column {
            self.eat_kw("COLUMN");
            if self.eat_kw("IF") {
                self.expect_kw("NOT")?;
                self.expect_kw("EXISTS")?;
            }
            self.column_definition(&mut table)?;
            if table.columns.last().is_some_and(|c| c.primary_key) {
                let mut pk = table.primary_key.clone();
                pk.push(table.columns.last().map(|c| c.name.clone()).unwrap_or_default());
                table.set_primary_key(pk);
            }
        } else {
            let mut table_pk = None;
            let mut uses = Vec::new();
            self.table_constraint(&mut table, &mut table_pk, &mut uses)?;
            if let Some(pk) = table_pk {
                uses.extend(pk.iter().map(|c| ColumnUse {
                    name: c.name.clone(),
                    span: c.span,
                }));
                table.set_primary_key(pk.into_iter().map(|c| c.name).collect());
            }
            self.check_columns(&table, &uses)?;
        }

        if let Some(slot) = self.schema.table_mut(name) {
            *slot = table;
        }
        Ok(())
    }

    /// `COMMENT ON {TABLE t | COLUMN t.c} IS '...'`
    fn comment_statement(&mut self) -> Result<()> {
        self.expect_kw("COMMENT")?;
        if !self.eat_kw("ON") {
            return self.skip_statement();
        }
        let on_table = self.eat_kw("TABLE");
        let on_column = !on_table && self.eat_kw("COLUMN");
        if !on_table && !on_column {
            return self.skip_statement();
        }

        let mut path = vec![self.expect_ident("name")?.0];
        while self.eat_tok(&Tok::Dot) {
            path.push(self.expect_ident("name")?.0);
        }
        self.expect_kw("IS")?;
        let text = match self.advance() {
            Some(Token {
                tok: Tok::Str(s), ..
            }) => Some(s),
            Some(t) if t.is_kw("NULL") => None,
            _ => return Err(self.unexpected("comment string")),
        };

        if on_table {
            let table_name = path.last().cloned().unwrap_or_default();
            if let Some(table) = self.schema.table_mut(&table_name) {
                table.comment = text;
            }
        } else if path.len() >= 2 {
            let column_name = &path[path.len() - 1];
            let table_name = &path[path.len() - 2];
            if let Some(col) = self
                .schema
                .table_mut(table_name)
                .and_then(|t| t.column_mut(column_name))
            {
                col.comment = text;
            }
        }
        self.skip_statement()
    }
}
