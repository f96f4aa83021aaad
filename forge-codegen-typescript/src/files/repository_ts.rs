use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile, singularize, to_pascal_case};
use crudforge_ir::{Entity, Field, Relation, RelationKind};

use crate::{code_file::CodeFile, project::TsProject};

/// Names of the repository methods behind a relation route:
/// the lookup, then link and unlink for many-to-many.
pub fn relation_methods(relation: &Relation) -> [String; 3] {
    let one = to_pascal_case(&singularize(&relation.name));
    [
        format!("find{}", relation.pascal_name()),
        format!("add{}", one),
        format!("remove{}", one),
    ]
}

/// `src/<entity>/<entity>.repository.ts`: data access over TypeORM.
pub struct RepositoryTs<'a> {
    project: TsProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> RepositoryTs<'a> {
    pub fn new(project: TsProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    pub fn class_name(entity: &Entity) -> String {
        format!("{}Repository", entity.name)
    }

    fn key_type(&self) -> &'static str {
        self.project.key_type(self.entity, &self.key.name)
    }

    fn crud(&self) -> String {
        let name = &self.entity.name;
        let key = self.project.prop(self.key);
        let id = self.key_type();
        let by_id = self.project.key_where(self.key, "id");
        let by_saved = self.project.key_where(self.key, &format!("saved.{}", key));
        format!(
            r#"  list(take: number, skip: number): Promise<{name}[]> {{
    return this.rows.find({{ order: {{ {key}: 'ASC' }}, take, skip }});
  }}

  findById(id: {id}): Promise<{name} | null> {{
    return this.rows.findOneBy({by_id});
  }}

  async create(values: Partial<{name}>): Promise<{name}> {{
    const saved = await this.rows.save(this.rows.create(values));
    return this.rows.findOneByOrFail({by_saved});
  }}

  /** Returns null when no row has this key. */
  async update(id: {id}, values: Partial<{name}>): Promise<{name} | null> {{
    const row = await this.rows.findOneBy({by_id});
    if (!row) {{
      return null;
    }}
    this.rows.merge(row, values);
    await this.rows.save(row);
    return this.rows.findOneByOrFail({by_id});
  }}

  async delete(id: {id}): Promise<boolean> {{
    const result = await this.rows.delete({by_id});
    return (result.affected ?? 0) > 0;
  }}"#
        )
    }

    fn relation(&self, relation: &Relation, target: &Entity, file: &mut CodeFile) -> String {
        let name = &self.entity.name;
        let id = self.key_type();
        let by_id = self.project.key_where(self.key, "id");
        let prop = relation.camel_name();
        let methods = relation_methods(relation);
        if target.name != self.entity.name {
            file.imports_mut()
                .add(&self.project.sibling_import(target, "entity"), &target.name);
        }

        match relation.kind {
            RelationKind::ManyToOne => format!(
                r#"  async {find}(id: {id}): Promise<{target} | null> {{
    const row = await this.rows.findOne({{ where: {by_id}, relations: {{ {prop}: true }} }});
    return row?.{prop} ?? null;
  }}"#,
                find = methods[0],
                target = target.name,
            ),
            RelationKind::OneToMany => format!(
                r#"  /** Returns null when the parent row does not exist. */
  async {find}(id: {id}): Promise<{target}[] | null> {{
    const row = await this.rows.findOne({{ where: {by_id}, relations: {{ {prop}: true }} }});
    return row ? (row.{prop} ?? []) : null;
  }}"#,
                find = methods[0],
                target = target.name,
            ),
            RelationKind::ManyToMany => {
                let other = self.project.key_type(target, &relation.remote_column);
                let other_prop = self.project.prop_of(target, &relation.remote_column);
                let key = self.project.prop(self.key);
                let param = format!("{}Id", singularize(&prop));
                format!(
                    r#"  /** Returns null when the parent row does not exist. */
  async {find}(id: {id}): Promise<{target}[] | null> {{
    const row = await this.rows.findOne({{ where: {by_id}, relations: {{ {prop}: true }} }});
    return row ? (row.{prop} ?? []) : null;
  }}

  async {add}(id: {id}, {param}: {other}): Promise<void> {{
    await this.rows.createQueryBuilder().relation({name}, '{prop}').of(id).add({param});
  }}

  /** Returns false when the two rows were not linked. */
  async {remove}(id: {id}, {param}: {other}): Promise<boolean> {{
    const linked = await this.rows.countBy({{ {key}: id, {prop}: {{ {other_prop}: {param} }} }});
    if (linked === 0) {{
      return false;
    }}
    await this.rows.createQueryBuilder().relation({name}, '{prop}').of(id).remove({param});
    return true;
  }}"#,
                    find = methods[0],
                    add = methods[1],
                    remove = methods[2],
                    target = target.name,
                )
            }
        }
    }
}

impl GeneratedFile for RepositoryTs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        let dir = self.project.dir(self.entity);
        base.join("src")
            .join(&dir)
            .join(format!("{}.repository.ts", dir))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let name = &self.entity.name;
        let mut file = CodeFile::new()
            .import("@nestjs/common", "Injectable")
            .import("@nestjs/typeorm", "InjectRepository")
            .import("typeorm", "Repository")
            .import(&format!("./{}.entity", self.project.dir(self.entity)), name);

        let mut methods = vec![self.crud()];
        for relation in &self.entity.relations {
            if let Some(target) = self.project.navigable(self.entity, relation) {
                methods.push(self.relation(relation, target, &mut file));
            }
        }

        file.raw(format!(
            "@Injectable()\nexport class {class} {{\n  constructor(\n    @InjectRepository({name})\n    private readonly rows: Repository<{name}>,\n  ) {{}}\n\n{methods}\n}}",
            class = Self::class_name(self.entity),
            methods = methods.join("\n\n"),
        ))
        .render()
    }
}
