//! Entity tree display formatting, used by `forge inspect`.
//!
//! ```ignore
//! use crudforge_codegen::schema::{DisplayStyle, EntityTreeDisplay};
//!
//! let display = EntityTreeDisplay::new(&model).style(DisplayStyle::TreeBox);
//! println!("{}", display);
//! ```

use std::fmt;

use crudforge_ir::{DomainModel, Entity, Field, Relation, RelationKind};

/// Display style for entity trees.
#[derive(Debug, Clone, Copy, Default)]
pub enum DisplayStyle {
    /// Entity names with their tables.
    ///
    /// ```text
    /// User (users)
    /// Post (posts)
    /// ```
    #[default]
    Simple,

    /// Entities with their fields and relations.
    ///
    /// ```text
    /// Post (posts)
    ///   id: bigint [pk, generated]
    ///   author_id: bigint [fk users.id]
    ///   -> author: User (many-to-one)
    /// ```
    WithFields,

    /// Relations drawn with box-drawing characters.
    ///
    /// ```text
    /// ├─ User (users, 3 fields)
    /// │  └─ posts → Post [one-to-many]
    /// └─ Post (posts, 4 fields)
    ///    └─ author → User [many-to-one]
    /// ```
    TreeBox,
}

/// Declarative entity tree formatter.
#[derive(Debug, Clone)]
pub struct EntityTreeDisplay<'a> {
    model: &'a DomainModel,
    style: DisplayStyle,
    indent_str: &'a str,
}

impl<'a> EntityTreeDisplay<'a> {
    pub fn new(model: &'a DomainModel) -> Self {
        Self {
            model,
            style: DisplayStyle::default(),
            indent_str: "  ",
        }
    }

    pub fn style(mut self, style: DisplayStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the indentation string (default: two spaces).
    pub fn indent(mut self, indent: &'a str) -> Self {
        self.indent_str = indent;
        self
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        match self.style {
            DisplayStyle::Simple => self.render_simple(&mut output),
            DisplayStyle::WithFields => self.render_with_fields(&mut output),
            DisplayStyle::TreeBox => self.render_tree_box(&mut output),
        }
        if !self.model.junctions.is_empty() && !matches!(self.style, DisplayStyle::Simple) {
            output.push('\n');
            output.push_str("junctions:\n");
            for junction in &self.model.junctions {
                output.push_str(self.indent_str);
                output.push_str(&format!(
                    "{} ({} <-> {}){}\n",
                    junction.table,
                    junction.left.entity,
                    junction.right.entity,
                    if junction.synthesized { " [synthesized]" } else { "" }
                ));
            }
        }
        output
    }

    fn render_simple(&self, output: &mut String) {
        for entity in &self.model.entities {
            output.push_str(&format!("{} ({})\n", entity.name, entity.table));
        }
    }

    fn render_with_fields(&self, output: &mut String) {
        for entity in &self.model.entities {
            output.push_str(&format!("{} ({})\n", entity.name, entity.table));
            for field in &entity.fields {
                output.push_str(self.indent_str);
                output.push_str(&format_field(field));
                output.push('\n');
            }
            for relation in &entity.relations {
                output.push_str(self.indent_str);
                output.push_str(&format!(
                    "-> {}: {} ({})\n",
                    relation.name,
                    relation.target,
                    kind_label(relation.kind)
                ));
            }
        }
    }

    fn render_tree_box(&self, output: &mut String) {
        let total = self.model.entities.len();
        for (i, entity) in self.model.entities.iter().enumerate() {
            let is_last = i + 1 == total;
            self.render_entity_box(output, entity, is_last);
        }
    }

    fn render_entity_box(&self, output: &mut String, entity: &Entity, is_last: bool) {
        let connector = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let count = entity.fields.len();
        output.push_str(&format!(
            "{} {} ({}, {} field{})\n",
            connector,
            entity.name,
            entity.table,
            count,
            if count == 1 { "" } else { "s" }
        ));

        let total = entity.relations.len();
        for (i, relation) in entity.relations.iter().enumerate() {
            let connector = if i + 1 == total { "└─" } else { "├─" };
            output.push_str(child_prefix);
            output.push_str(connector);
            output.push(' ');
            output.push_str(&format_relation(relation));
            output.push('\n');
        }
    }
}

fn format_field(field: &Field) -> String {
    let mut flags = Vec::new();
    if field.primary_key {
        flags.push("pk".to_string());
    }
    if field.unique {
        flags.push("unique".to_string());
    }
    if field.generated {
        flags.push("generated".to_string());
    }
    if let Some(reference) = &field.references {
        flags.push(format!("fk {}.{}", reference.table, reference.column));
    }

    let optional = if field.nullable { "?" } else { "" };
    if flags.is_empty() {
        format!("{}: {}{}", field.name, field.ty, optional)
    } else {
        format!("{}: {}{} [{}]", field.name, field.ty, optional, flags.join(", "))
    }
}

fn format_relation(relation: &Relation) -> String {
    let arrow = match relation.kind {
        RelationKind::ManyToMany => "↔",
        _ => "→",
    };
    let via = relation
        .junction
        .as_ref()
        .map(|j| format!(" via {}", j.table))
        .unwrap_or_default();
    format!(
        "{} {} {} [{}]{}",
        relation.name,
        arrow,
        relation.target,
        kind_label(relation.kind),
        via
    )
}

fn kind_label(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::ManyToOne => "many-to-one",
        RelationKind::OneToMany => "one-to-many",
        RelationKind::ManyToMany => "many-to-many",
    }
}

impl fmt::Display for EntityTreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render().trim_end())
    }
}

#[cfg(test)]
mod tests {
    use crudforge_schema::{ProjectConfig, Target, parse_sql};

    use super::*;
    use crate::pipeline::phases::lower_schema;

    fn model() -> DomainModel {
        let schema = parse_sql(
            "CREATE TABLE users (id SERIAL PRIMARY KEY, email TEXT UNIQUE NOT NULL);
             CREATE TABLE posts (
                id SERIAL PRIMARY KEY,
                author_id INT NOT NULL REFERENCES users(id),
                subtitle TEXT
             );
             CREATE TABLE tags (id SERIAL PRIMARY KEY);
             CREATE TABLE post_tags (
                post_id INT REFERENCES posts(id),
                tag_id INT REFERENCES tags(id),
                PRIMARY KEY (post_id, tag_id)
             );",
            "schema.sql",
        )
        .unwrap();
        let meta = ProjectConfig::new("blog", "schema.sql", Target::RustAxum).meta();
        lower_schema(meta, &schema).0
    }

    #[test]
    fn test_display_style_default() {
        assert!(matches!(DisplayStyle::default(), DisplayStyle::Simple));
    }

    #[test]
    fn test_simple() {
        let model = model();
        assert_eq!(
            EntityTreeDisplay::new(&model).to_string(),
            "User (users)\nPost (posts)\nTag (tags)"
        );
    }

    #[test]
    fn test_with_fields() {
        let model = model();
        let out = EntityTreeDisplay::new(&model)
            .style(DisplayStyle::WithFields)
            .render();
        assert!(out.contains("  id: integer [pk, generated]\n"));
        assert!(out.contains("  email: text [unique]\n"));
        assert!(out.contains("  author_id: integer [fk users.id]\n"));
        assert!(out.contains("  subtitle: text?\n"));
        assert!(out.contains("  -> author: User (many-to-one)\n"));
        assert!(out.contains("junctions:\n  post_tags (Post <-> Tag)\n"));
    }

    #[test]
    fn test_tree_box() {
        let model = model();
        let out = EntityTreeDisplay::new(&model)
            .style(DisplayStyle::TreeBox)
            .render();
        assert!(out.starts_with("├─ User (users, 2 fields)\n│  └─ posts → Post [one-to-many]\n"));
        assert!(out.contains("└─ Tag (tags, 1 field)\n   └─ posts ↔ Post [many-to-many] via post_tags\n"));
    }
}
