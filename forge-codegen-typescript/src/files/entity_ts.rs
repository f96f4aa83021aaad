use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{ColumnType, Entity, Field, Relation, RelationKind};

use crate::{
    ast::{Class, Property},
    code_file::CodeFile,
    project::TsProject,
};

/// `src/<entity>/<entity>.entity.ts`: the TypeORM entity.
pub struct EntityTs<'a> {
    project: TsProject<'a>,
    entity: &'a Entity,
}

impl<'a> EntityTs<'a> {
    pub fn new(project: TsProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }

    fn column_options(&self, field: &Field) -> Vec<String> {
        let mut options = self
            .project
            .types
            .column_options(field, self.project.model.meta.database);
        let prop = self.project.prop(field);
        if prop != field.name {
            options.insert(0, format!("name: '{}'", field.name));
        }
        options
    }

    fn column(&self, field: &Field, file: &mut CodeFile) -> Property {
        let prop = self.project.prop(field);
        let ty = self.project.field_type(field);
        let mut options = self.column_options(field);

        let decorator = if field.primary_key {
            if field.generated && field.ty.is_integer() {
                // TypeORM only allows the integer types on increment keys
                options.retain(|o| !o.starts_with("transformer"));
                file.imports_mut().add("typeorm", "PrimaryGeneratedColumn");
                format!("PrimaryGeneratedColumn({{ {} }})", options.join(", "))
            } else if field.generated && (field.ty == ColumnType::Uuid || field.ty.is_textual()) {
                file.imports_mut().add("typeorm", "PrimaryGeneratedColumn");
                let name = options
                    .iter()
                    .find(|o| o.starts_with("name:"))
                    .map(|o| format!(", {{ {} }}", o))
                    .unwrap_or_default();
                format!("PrimaryGeneratedColumn('uuid'{})", name)
            } else {
                file.imports_mut().add("typeorm", "PrimaryColumn");
                format!("PrimaryColumn({{ {} }})", options.join(", "))
            }
        } else {
            if field.nullable {
                options.push("nullable: true".into());
            }
            if field.unique {
                options.push("unique: true".into());
            }
            if field.generated {
                options.push("insert: false".into());
                options.push("update: false".into());
            }
            file.imports_mut().add("typeorm", "Column");
            format!("Column({{ {} }})", options.join(", "))
        };

        if matches!(field.ty, ColumnType::Decimal { .. }) {
            file.imports_mut()
                .add("../common/transformers", "decimalTransformer");
        }

        let mut property = Property::new(prop, ty).decorator(decorator);
        if let Some(description) = &field.description {
            property = property.doc(description.clone());
        }
        property
    }

    fn relation(&self, relation: &Relation, file: &mut CodeFile) -> Option<Property> {
        let target = self.project.navigable(self.entity, relation)?;
        if target.name != self.entity.name {
            file.imports_mut()
                .add(&self.project.sibling_import(target, "entity"), &target.name);
        }
        let inverse = self.project.inverse(self.entity, relation).map(|inverse| {
            let param = target.camel_name();
            format!(", ({}) => {}.{}", param, param, inverse.camel_name())
        });
        let inverse = inverse.unwrap_or_default();
        let prop = relation.camel_name();

        let property = match relation.kind {
            RelationKind::ManyToOne => {
                file.imports_mut().add("typeorm", "ManyToOne");
                file.imports_mut().add("typeorm", "JoinColumn");
                Property::new(prop, &target.name)
                    .decorator(format!("ManyToOne(() => {}{})", target.name, inverse))
                    .decorator(format!(
                        "JoinColumn({{ name: '{}', referencedColumnName: '{}' }})",
                        relation.local_column,
                        self.project.prop_of(target, &relation.remote_column)
                    ))
            }
            RelationKind::OneToMany => {
                file.imports_mut().add("typeorm", "OneToMany");
                Property::new(prop, format!("{}[]", target.name))
                    .decorator(format!("OneToMany(() => {}{})", target.name, inverse))
            }
            RelationKind::ManyToMany => {
                file.imports_mut().add("typeorm", "ManyToMany");
                let mut property = Property::new(prop, format!("{}[]", target.name))
                    .decorator(format!("ManyToMany(() => {}{})", target.name, inverse));
                if let (true, Some(junction)) =
                    (self.project.owns_junction(relation), &relation.junction)
                {
                    file.imports_mut().add("typeorm", "JoinTable");
                    property = property.decorator(format!(
                        "JoinTable({{\n  name: '{}',\n  joinColumn: {{ name: '{}', referencedColumnName: '{}' }},\n  inverseJoinColumn: {{ name: '{}', referencedColumnName: '{}' }},\n}})",
                        junction.table,
                        junction.local_column,
                        self.project.prop_of(self.entity, &relation.local_column),
                        junction.remote_column,
                        self.project.prop_of(target, &relation.remote_column),
                    ));
                }
                property
            }
        };
        Some(property.optional())
    }
}

impl GeneratedFile for EntityTs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        let dir = self.project.dir(self.entity);
        base.join("src").join(&dir).join(format!("{}.entity.ts", dir))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let mut file = CodeFile::new().import("typeorm", "Entity");
        let mut properties = Vec::new();
        for field in &self.entity.fields {
            properties.push(self.column(field, &mut file));
        }
        for relation in &self.entity.relations {
            if let Some(property) = self.relation(relation, &mut file) {
                properties.push(property);
            }
        }

        let class = Class::new(&self.entity.name)
            .decorator(format!("Entity({{ name: '{}' }})", self.entity.table))
            .properties(properties);
        file.add(&class).render()
    }
}
