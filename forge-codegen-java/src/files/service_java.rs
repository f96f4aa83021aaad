use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{Entity, Field};

use crate::{files::RepositoryJava, java_file::JavaFile, project::JavaProject};

/// `<entity>/<Entity>Service.java`: business rules, owned by the user once
/// written.
pub struct ServiceJava<'a> {
    project: JavaProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> ServiceJava<'a> {
    pub fn new(project: JavaProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    pub fn class_name(entity: &Entity) -> String {
        format!("{}Service", entity.name)
    }

    fn not_found(&self) -> String {
        format!(
            "ApiException.notFound(\"{} \" + id + \" not found\")",
            self.entity.file_stem().replace('_', " ")
        )
    }
}

impl GeneratedFile for ServiceJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project.source_path(
            base,
            &self.project.entity_package(self.entity),
            &Self::class_name(self.entity),
        )
    }

    fn rules(&self) -> FileRules {
        FileRules::stub("//")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let p = self.project;
        let name = &entity.name;
        let class = Self::class_name(entity);
        let repo = RepositoryJava::class_name(entity);
        let key_type = p.key_type(entity, &self.key.name);
        let not_found = self.not_found();

        let mut file = JavaFile::new(p.entity_package(entity)).import_all([
            "jakarta.persistence.EntityManager",
            "java.util.List",
            "java.util.function.Consumer",
            "org.springframework.data.domain.Sort",
            "org.springframework.stereotype.Service",
            "org.springframework.transaction.annotation.Transactional",
        ]);
        file = file
            .import(&format!("{}.ApiException", p.package("common")))
            .import(&format!("{}.Paging", p.package("common")));
        p.use_type(file.imports_mut(), &self.key.ty);

        let hashed = p.hashed_field(entity);
        let (encoder_field, encoder_param, encoder_init, hash_create, hash_update) = match hashed {
            Some(field) => {
                file = file
                    .import("java.util.Objects")
                    .import("org.springframework.security.crypto.password.PasswordEncoder");
                let stem = p.accessor(field);
                (
                    "    private final PasswordEncoder passwordEncoder;\n".to_string(),
                    ", PasswordEncoder passwordEncoder".to_string(),
                    "        this.passwordEncoder = passwordEncoder;\n".to_string(),
                    format!("        entity.set{stem}(passwordEncoder.encode(entity.get{stem}()));\n"),
                    (
                        format!("        String previous = entity.get{stem}();\n"),
                        format!(
                            "        if (!Objects.equals(previous, entity.get{stem}())) {{\n            entity.set{stem}(passwordEncoder.encode(entity.get{stem}()));\n        }}\n"
                        ),
                    ),
                )
            }
            None => Default::default(),
        };
        let (before_update, after_update) = hash_update;

        file.raw(format!(
            r#"@Service
@Transactional
public class {class} {{

    private final {repo} repository;
    private final EntityManager entityManager;
{encoder_field}
    public {class}({repo} repository, EntityManager entityManager{encoder_param}) {{
        this.repository = repository;
        this.entityManager = entityManager;
{encoder_init}    }}

    @Transactional(readOnly = true)
    public List<{name}> list(Paging paging) {{
        return repository.findAll(paging.pageable(Sort.by("{key}"))).getContent();
    }}

    @Transactional(readOnly = true)
    public {name} get({key_type} id) {{
        return repository.findById(id).orElseThrow(() -> {not_found});
    }}

    public {name} create({name} entity) {{
{hash_create}        {name} saved = repository.saveAndFlush(entity);
        // Read back the values the database filled in.
        entityManager.refresh(saved);
        return saved;
    }}

    public {name} update({key_type} id, Consumer<{name}> changes) {{
        {name} entity = get(id);
{before_update}        changes.accept(entity);
{after_update}        return repository.saveAndFlush(entity);
    }}

    public void delete({key_type} id) {{
        if (!repository.existsById(id)) {{
            throw {not_found};
        }}
        repository.deleteById(id);
        repository.flush();
    }}
}}"#,
            key = p.prop(self.key),
        ))
        .render()
    }
}
