//! The `storage` package: a `Storage` port, the local-disk adapter and the
//! upload routes.

use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

use crate::{java_file::JavaFile, project::JavaProject};

/// `storage/Storage.java` and `storage/LocalStorage.java`.
pub struct StorageJava<'a> {
    project: JavaProject<'a>,
    local: bool,
}

impl<'a> StorageJava<'a> {
    /// The `Storage` interface.
    pub fn port(project: JavaProject<'a>) -> Self {
        Self {
            project,
            local: false,
        }
    }

    /// The adapter writing under `app.upload-dir`.
    pub fn local(project: JavaProject<'a>) -> Self {
        Self {
            project,
            local: true,
        }
    }

    fn render_port(&self) -> String {
        JavaFile::new(self.project.package("storage"))
            .import_all(["java.io.IOException", "java.util.Optional"])
            .raw(
                r#"public interface Storage {

    void put(String key, byte[] data) throws IOException;

    /** Empty when nothing is stored under the key. */
    Optional<byte[]> get(String key) throws IOException;

    /** Whether something was stored under the key. */
    boolean delete(String key) throws IOException;

    /** Public address of a stored object. */
    String url(String key);

    /** Reduces a client-supplied name to [A-Za-z0-9._-] with no leading dots. */
    static String sanitizeKey(String name) {
        String cleaned = name.replaceAll("[^A-Za-z0-9._-]", "_").replaceFirst("^\\.+", "");
        return cleaned.isEmpty() ? "upload" : cleaned;
    }
}"#,
            )
            .render()
    }

    fn render_local(&self) -> String {
        JavaFile::new(self.project.package("storage"))
            .import_all([
                "java.io.IOException",
                "java.nio.file.Files",
                "java.nio.file.Path",
                "java.util.Optional",
                "org.springframework.stereotype.Component",
            ])
            .import(&format!("{}.AppProperties", self.project.package("config")))
            .raw(
                r#"@Component
public class LocalStorage implements Storage {

    private final Path root;

    public LocalStorage(AppProperties properties) throws IOException {
        this.root = Path.of(properties.uploadDir());
        Files.createDirectories(root);
    }

    private Path path(String key) {
        return root.resolve(Storage.sanitizeKey(key));
    }

    @Override
    public void put(String key, byte[] data) throws IOException {
        Files.write(path(key), data);
    }

    @Override
    public Optional<byte[]> get(String key) throws IOException {
        Path file = path(key);
        if (!Files.isRegularFile(file)) {
            return Optional.empty();
        }
        return Optional.of(Files.readAllBytes(file));
    }

    @Override
    public boolean delete(String key) throws IOException {
        return Files.deleteIfExists(path(key));
    }

    @Override
    public String url(String key) {
        return "/uploads/" + Storage.sanitizeKey(key);
    }
}"#,
            )
            .render()
    }
}

impl GeneratedFile for StorageJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        let class = if self.local { "LocalStorage" } else { "Storage" };
        self.project
            .source_path(base, &self.project.package("storage"), class)
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        if self.local {
            self.render_local()
        } else {
            self.render_port()
        }
    }
}

/// `storage/UploadController.java`: multipart upload, download and delete.
/// Writes follow the API's auth rules.
pub struct UploadControllerJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> UploadControllerJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for UploadControllerJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("storage"), "UploadController")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        JavaFile::new(self.project.package("storage"))
            .import_all([
                "java.io.IOException",
                "org.slf4j.Logger",
                "org.slf4j.LoggerFactory",
                "org.springframework.http.HttpStatus",
                "org.springframework.http.MediaType",
                "org.springframework.http.ResponseEntity",
                "org.springframework.web.bind.annotation.DeleteMapping",
                "org.springframework.web.bind.annotation.GetMapping",
                "org.springframework.web.bind.annotation.PathVariable",
                "org.springframework.web.bind.annotation.PostMapping",
                "org.springframework.web.bind.annotation.RequestMapping",
                "org.springframework.web.bind.annotation.RequestParam",
                "org.springframework.web.bind.annotation.ResponseStatus",
                "org.springframework.web.bind.annotation.RestController",
                "org.springframework.web.multipart.MultipartFile",
            ])
            .import(&format!("{}.ApiException", self.project.package("common")))
            .raw(
                r#"@RestController
@RequestMapping("/uploads")
public class UploadController {

    private static final Logger log = LoggerFactory.getLogger(UploadController.class);

    public record UploadResponse(String key, String url, long size) {
    }

    private final Storage storage;

    public UploadController(Storage storage) {
        this.storage = storage;
    }

    @PostMapping(consumes = MediaType.MULTIPART_FORM_DATA_VALUE)
    @ResponseStatus(HttpStatus.CREATED)
    public UploadResponse upload(@RequestParam("file") MultipartFile file) throws IOException {
        byte[] data = file.getBytes();
        String name = file.getOriginalFilename() == null ? "" : file.getOriginalFilename();
        String key = System.currentTimeMillis() + "-" + Storage.sanitizeKey(name);
        storage.put(key, data);
        log.info("stored upload {} ({} bytes)", key, data.length);
        return new UploadResponse(key, storage.url(key), data.length);
    }

    @GetMapping("/{key}")
    public ResponseEntity<byte[]> download(@PathVariable String key) throws IOException {
        byte[] data = storage.get(key).orElseThrow(() -> ApiException.notFound("upload " + key + " not found"));
        return ResponseEntity.ok().contentType(MediaType.APPLICATION_OCTET_STREAM).body(data);
    }

    @DeleteMapping("/{key}")
    @ResponseStatus(HttpStatus.NO_CONTENT)
    public void remove(@PathVariable String key) throws IOException {
        if (!storage.delete(key)) {
            throw ApiException.notFound("upload " + key + " not found");
        }
    }
}"#,
            )
            .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, all_features, compile_sql_with};
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_storage_files() {
        let ctx = compile_sql_with(BLOG_SQL, Target::JavaSpring, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = JavaProject::new(&model, &computed);

        let port = StorageJava::port(project);
        assert_eq!(
            port.path(Path::new("")),
            Path::new("src/main/java/com/example/blog/storage/Storage.java")
        );
        assert!(port.render().contains("public interface Storage {\n"));

        let local = StorageJava::local(project).render();
        assert!(local.contains("public class LocalStorage implements Storage {\n"));
        assert!(local.contains("        return \"/uploads/\" + Storage.sanitizeKey(key);\n"));
    }

    #[test]
    fn test_upload_routes() {
        let ctx = compile_sql_with(BLOG_SQL, Target::JavaSpring, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = UploadControllerJava::new(JavaProject::new(&model, &computed)).render();
        assert!(out.contains("    public UploadResponse upload(@RequestParam(\"file\") MultipartFile file) throws IOException {\n"));
        assert!(out.contains("        log.info(\"stored upload {} ({} bytes)\", key, data.length);\n"));
        assert!(out.contains("ApiException.notFound(\"upload \" + key + \" not found\")"));
    }
}
