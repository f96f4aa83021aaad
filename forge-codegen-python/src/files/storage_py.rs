use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

use crate::{project::PyProject, py_file::PyFile};

/// `app/storage.py`: the storage protocol and the local-disk adapter.
pub struct StoragePy;

impl GeneratedFile for StoragePy {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app").join("storage.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        PyFile::new()
            .doc("File storage behind the upload routes.")
            .import_module("re")
            .import("pathlib", "Path")
            .import("typing", "Protocol")
            .raw(
                r#"class Storage(Protocol):
    """Missing keys raise FileNotFoundError."""

    def put(self, key: str, data: bytes) -> None: ...

    def get(self, key: str) -> bytes: ...

    def delete(self, key: str) -> None: ...

    def url(self, key: str) -> str:
        """Public address of a stored object."""
        ..."#,
            )
            .raw(
                r#"def sanitize_key(name: str) -> str:
    """Reduce a client-supplied name to [A-Za-z0-9._-] with no leading dots."""
    cleaned = re.sub(r"[^A-Za-z0-9._-]", "_", name).lstrip(".")
    return cleaned or "upload""#,
            )
            .raw(
                r#"class LocalStorage:
    """Keeps objects as files under one directory."""

    def __init__(self, root: str) -> None:
        self.root = Path(root)
        self.root.mkdir(parents=True, exist_ok=True)

    def _path(self, key: str) -> Path:
        return self.root / sanitize_key(key)

    def put(self, key: str, data: bytes) -> None:
        self._path(key).write_bytes(data)

    def get(self, key: str) -> bytes:
        return self._path(key).read_bytes()

    def delete(self, key: str) -> None:
        self._path(key).unlink()

    def url(self, key: str) -> str:
        return "/uploads/" + sanitize_key(key)"#,
            )
            .render()
    }
}

/// `app/routers/uploads.py`: multipart upload, download and delete.
pub struct UploadsPy<'a> {
    project: PyProject<'a>,
}

impl<'a> UploadsPy<'a> {
    pub fn new(project: PyProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for UploadsPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app").join("routers").join("uploads.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let auth = self.project.features().auth;
        let mut file = PyFile::new()
            .doc("Uploads. Downloads are public; writes follow the API's auth rules.")
            .import_module("logging")
            .import_module("time")
            .import("typing", "Annotated")
            .import_all(
                "fastapi",
                ["APIRouter", "Depends", "Request", "Response", "UploadFile", "status"],
            )
            .import("pydantic", "BaseModel")
            .import("app.errors", "ApiError")
            .import_all("app.storage", ["Storage", "sanitize_key"]);
        let write = if auth {
            file = file.import("app.auth", "require_user");
            ", dependencies=[Depends(require_user)]"
        } else {
            ""
        };

        file.raw("logger = logging.getLogger(__name__)\n\nrouter = APIRouter(prefix=\"/uploads\", tags=[\"uploads\"])")
            .raw("class UploadResponse(BaseModel):\n    key: str\n    url: str\n    size: int")
            .raw(
                r#"def get_storage(request: Request) -> Storage:
    return request.app.state.storage


Store = Annotated[Storage, Depends(get_storage)]"#,
            )
            .raw(
                r#"def upload_key(filename: str | None) -> str:
    return f"{time.time_ns() // 1_000_000}-{sanitize_key(filename or '')}""#,
            )
            .raw(format!(
                r#"@router.post("", status_code=status.HTTP_201_CREATED{write})
async def upload(file: UploadFile, store: Store) -> UploadResponse:
    data = await file.read()
    key = upload_key(file.filename)
    store.put(key, data)
    logger.info("stored upload %s (%d bytes)", key, len(data))
    return UploadResponse(key=key, url=store.url(key), size=len(data))"#
            ))
            .raw(
                r#"@router.get("/{key}")
def download(key: str, store: Store) -> Response:
    try:
        data = store.get(key)
    except FileNotFoundError as error:
        raise ApiError.not_found(f"upload {key} not found") from error
    return Response(content=data, media_type="application/octet-stream")"#,
            )
            .raw(format!(
                r#"@router.delete("/{{key}}", status_code=status.HTTP_204_NO_CONTENT{write})
def remove(key: str, store: Store) -> Response:
    try:
        store.delete(key)
    except FileNotFoundError as error:
        raise ApiError.not_found(f"upload {{key}} not found") from error
    return Response(status_code=status.HTTP_204_NO_CONTENT)"#
            ))
            .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, all_features, compile_sql_with};
    use crudforge_ir::Features;
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_local_storage() {
        let out = StoragePy.render();
        assert!(out.contains("class Storage(Protocol):\n"));
        assert!(out.contains("    cleaned = re.sub(r\"[^A-Za-z0-9._-]\", \"_\", name).lstrip(\".\")\n"));
        assert!(out.contains("        return \"/uploads/\" + sanitize_key(key)\n"));
    }

    #[test]
    fn test_upload_routes_follow_auth() {
        let features = Features {
            file_storage: true,
            ..Features::default()
        };
        let ctx = compile_sql_with(BLOG_SQL, Target::PythonFastapi, features).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = UploadsPy::new(PyProject::new(&model, &computed)).render();
        assert!(out.contains("@router.post(\"\", status_code=status.HTTP_201_CREATED)\n"));
        assert!(out.contains("@router.get(\"/{key}\")\n"));
        assert!(!out.contains("require_user"));

        let ctx = compile_sql_with(BLOG_SQL, Target::PythonFastapi, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = UploadsPy::new(PyProject::new(&model, &computed)).render();
        assert!(out.contains(
            "@router.delete(\"/{key}\", status_code=status.HTTP_204_NO_CONTENT, dependencies=[Depends(require_user)])\n"
        ));
    }
}
