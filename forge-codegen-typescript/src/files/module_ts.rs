use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::Entity;

use super::{controller_ts::ControllerTs, repository_ts::RepositoryTs, service_ts::ServiceTs};
use crate::{ast::Class, code_file::CodeFile, project::TsProject};

/// `src/<entity>/<entity>.module.ts`: binds the controller, service and
/// repository of one entity.
pub struct ModuleTs<'a> {
    project: TsProject<'a>,
    entity: &'a Entity,
}

impl<'a> ModuleTs<'a> {
    pub fn new(project: TsProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }
}

impl GeneratedFile for ModuleTs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        let dir = self.project.dir(self.entity);
        base.join("src").join(&dir).join(format!("{}.module.ts", dir))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let dir = self.project.dir(self.entity);
        let name = &self.entity.name;
        let controller = ControllerTs::class_name(self.entity);
        let service = ServiceTs::class_name(self.entity);
        let repository = RepositoryTs::class_name(self.entity);

        let module = Class::new(format!("{}Module", name)).decorator(format!(
            "Module({{\n  imports: [TypeOrmModule.forFeature([{name}])],\n  controllers: [{controller}],\n  providers: [{service}, {repository}],\n  exports: [{service}, {repository}],\n}})"
        ));
        CodeFile::new()
            .import("@nestjs/common", "Module")
            .import("@nestjs/typeorm", "TypeOrmModule")
            .import(&format!("./{}.controller", dir), &controller)
            .import(&format!("./{}.entity", dir), name)
            .import(&format!("./{}.repository", dir), &repository)
            .import(&format!("./{}.service", dir), &service)
            .add(&module)
            .render()
    }
}
