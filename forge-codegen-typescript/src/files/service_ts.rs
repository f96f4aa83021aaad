use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{Entity, Field};

use super::{
    dto_ts::{DtoKind, RequestDtoTs, ResponseDtoTs},
    mapper_ts::MapperTs,
    repository_ts::RepositoryTs,
};
use crate::{code_file::CodeFile, project::TsProject};

/// `src/<entity>/<entity>.service.ts`: business rules, owned by the user
/// once written.
pub struct ServiceTs<'a> {
    project: TsProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> ServiceTs<'a> {
    pub fn new(project: TsProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    pub fn class_name(entity: &Entity) -> String {
        format!("{}Service", entity.name)
    }

    /// Statements hashing the password in `dto` before it is stored.
    fn hash_lines(&self, kind: DtoKind) -> String {
        let Some(field) = self.project.hashed_field(self.entity) else {
            return String::new();
        };
        let prop = self.project.prop(field);
        if kind == DtoKind::Create && field.required_on_create() {
            format!("    dto.{prop} = await hashPassword(dto.{prop});\n")
        } else {
            format!(
                "    if (dto.{prop} != null) {{\n      dto.{prop} = await hashPassword(dto.{prop});\n    }}\n"
            )
        }
    }
}

impl GeneratedFile for ServiceTs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        let dir = self.project.dir(self.entity);
        base.join("src").join(&dir).join(format!("{}.service.ts", dir))
    }

    fn rules(&self) -> FileRules {
        FileRules::stub("//")
    }

    fn render(&self) -> String {
        let dir = self.project.dir(self.entity);
        let response = ResponseDtoTs::class_name(self.entity);
        let create = RequestDtoTs::class_name(self.entity, DtoKind::Create);
        let update = RequestDtoTs::class_name(self.entity, DtoKind::Update);
        let mapper = MapperTs::class_name(self.entity);
        let repository = RepositoryTs::class_name(self.entity);
        let id = self.project.key_type(self.entity, &self.key.name);
        let label = self.entity.kebab_name().replace('-', " ");

        let mut file = CodeFile::new()
            .import_all("@nestjs/common", ["Injectable", "NotFoundException"])
            .import_all("../common/pagination", ["PaginationQuery", "page"])
            .import(&format!("./dto/create-{}.dto", dir), &create)
            .import(&format!("./dto/{}-response.dto", dir), &response)
            .import(&format!("./dto/update-{}.dto", dir), &update)
            .import(&format!("./{}.mapper", dir), &mapper)
            .import(&format!("./{}.repository", dir), &repository);
        if self.project.hashed_field(self.entity).is_some() {
            file = file.import("../auth/password", "hashPassword");
        }

        file.raw(format!(
            r#"@Injectable()
export class {class} {{
  constructor(private readonly repository: {repository}) {{}}

  async list(query: PaginationQuery): Promise<{response}[]> {{
    const {{ take, skip }} = page(query);
    const rows = await this.repository.list(take, skip);
    return rows.map((row) => {mapper}.toResponse(row));
  }}

  async get(id: {id}): Promise<{response}> {{
    const row = await this.repository.findById(id);
    if (!row) {{
      throw new NotFoundException(`{label} ${{id}} not found`);
    }}
    return {mapper}.toResponse(row);
  }}

  async create(dto: {create}): Promise<{response}> {{
{hash_create}    const row = await this.repository.create({mapper}.fromCreate(dto));
    return {mapper}.toResponse(row);
  }}

  async update(id: {id}, dto: {update}): Promise<{response}> {{
{hash_update}    const row = await this.repository.update(id, {mapper}.fromUpdate(dto));
    if (!row) {{
      throw new NotFoundException(`{label} ${{id}} not found`);
    }}
    return {mapper}.toResponse(row);
  }}

  async remove(id: {id}): Promise<void> {{
    if (!(await this.repository.delete(id))) {{
      throw new NotFoundException(`{label} ${{id}} not found`);
    }}
  }}
}}"#,
            class = Self::class_name(self.entity),
            hash_create = self.hash_lines(DtoKind::Create),
            hash_update = self.hash_lines(DtoKind::Update),
        ))
        .render()
    }
}
