use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

use crate::{
    go_file::GoFile,
    project::{Flavor, GoProject},
};

/// `internal/storage/storage.go`: where uploaded files live.
pub struct StorageGo;

impl GeneratedFile for StorageGo {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal").join("storage").join("storage.go")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        GoFile::new("storage")
            .doc("Package storage keeps uploaded blobs. Swap Local for an object store\nadapter in router.New.")
            .import("context")
            .import("errors")
            .import("io/fs")
            .import("os")
            .import("path/filepath")
            .import("strings")
            .raw(
                r#"// ErrNotFound is returned when no object has the key.
var ErrNotFound = errors.New("object not found")

type Storage interface {
	Put(ctx context.Context, key string, data []byte) error
	Get(ctx context.Context, key string) ([]byte, error)
	Delete(ctx context.Context, key string) error
	// URL is the public address of a stored object.
	URL(key string) string
}

// Local stores objects as files under a directory.
type Local struct {
	root string
}

func NewLocal(root string) (*Local, error) {
	if err := os.MkdirAll(root, 0o755); err != nil {
		return nil, err
	}
	return &Local{root: root}, nil
}

func (l *Local) path(key string) string {
	return filepath.Join(l.root, SanitizeKey(key))
}

func (l *Local) Put(_ context.Context, key string, data []byte) error {
	return os.WriteFile(l.path(key), data, 0o644)
}

func (l *Local) Get(_ context.Context, key string) ([]byte, error) {
	data, err := os.ReadFile(l.path(key))
	if errors.Is(err, fs.ErrNotExist) {
		return nil, ErrNotFound
	}
	return data, err
}

func (l *Local) Delete(_ context.Context, key string) error {
	err := os.Remove(l.path(key))
	if errors.Is(err, fs.ErrNotExist) {
		return ErrNotFound
	}
	return err
}

func (l *Local) URL(key string) string {
	return "/uploads/" + SanitizeKey(key)
}

// SanitizeKey reduces a client-supplied name to [A-Za-z0-9._-] with no
// leading dots.
func SanitizeKey(name string) string {
	cleaned := strings.Map(func(r rune) rune {
		switch {
		case r >= 'a' && r <= 'z', r >= 'A' && r <= 'Z', r >= '0' && r <= '9', r == '.', r == '-', r == '_':
			return r
		default:
			return '_'
		}
	}, name)
	cleaned = strings.TrimLeft(cleaned, ".")
	if cleaned == "" {
		return "upload"
	}
	return cleaned
}"#,
            )
            .render()
    }
}

/// `internal/handlers/uploads.go`: multipart upload, download and delete.
pub struct UploadsGo<'a> {
    project: GoProject<'a>,
}

impl<'a> UploadsGo<'a> {
    pub fn new(project: GoProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for UploadsGo<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal").join("handlers").join("uploads.go")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let project = self.project;
        let file = GoFile::new("handlers")
            .import("errors")
            .import("fmt")
            .import("io")
            .import("log/slog")
            .import("net/http")
            .import("time")
            .import(project.flavor.import())
            .import(&project.internal("apierr"))
            .import(&project.internal("storage"))
            .raw(
                r#"// maxUpload caps the size of one uploaded file.
const maxUpload = 32 << 20

type uploadResponse struct {
	Key  string `json:"key"`
	URL  string `json:"url"`
	Size int    `json:"size"`
}

// UploadHandler serves /uploads. Downloads are public; uploads and
// deletes pass through the guard.
type UploadHandler struct {
	store storage.Storage
}

func NewUploadHandler(store storage.Storage) *UploadHandler {
	return &UploadHandler{store: store}
}

func uploadKey(filename string) string {
	return fmt.Sprintf("%d-%s", time.Now().UnixMilli(), storage.SanitizeKey(filename))
}

func missing(key string, err error) error {
	if errors.Is(err, storage.ErrNotFound) {
		return apierr.NotFound("upload " + key + " not found")
	}
	return err
}"#,
            );

        match project.flavor {
            Flavor::Gin => file.raw(
                r#"func (h *UploadHandler) Register(r gin.IRouter, guard ...gin.HandlerFunc) {
	g := r.Group("/uploads")
	g.GET("/:key", h.download)
	w := g.Group("", guard...)
	w.POST("", h.upload)
	w.DELETE("/:key", h.remove)
}

func (h *UploadHandler) upload(c *gin.Context) {
	c.Request.Body = http.MaxBytesReader(c.Writer, c.Request.Body, maxUpload)
	header, err := c.FormFile("file")
	if err != nil {
		fail(c, apierr.BadRequest("multipart field \"file\" is required"))
		return
	}
	f, err := header.Open()
	if err != nil {
		fail(c, err)
		return
	}
	defer f.Close()
	data, err := io.ReadAll(f)
	if err != nil {
		fail(c, apierr.BadRequest(err.Error()))
		return
	}

	key := uploadKey(header.Filename)
	if err := h.store.Put(c.Request.Context(), key, data); err != nil {
		fail(c, err)
		return
	}
	slog.Info("stored upload", "key", key, "size", len(data))
	c.JSON(http.StatusCreated, uploadResponse{Key: key, URL: h.store.URL(key), Size: len(data)})
}

func (h *UploadHandler) download(c *gin.Context) {
	key := c.Param("key")
	data, err := h.store.Get(c.Request.Context(), key)
	if err != nil {
		fail(c, missing(key, err))
		return
	}
	c.Data(http.StatusOK, "application/octet-stream", data)
}

func (h *UploadHandler) remove(c *gin.Context) {
	key := c.Param("key")
	if err := h.store.Delete(c.Request.Context(), key); err != nil {
		fail(c, missing(key, err))
		return
	}
	c.Status(http.StatusNoContent)
}"#,
            ),
            Flavor::Chi => file.raw(
                r#"func (h *UploadHandler) Routes(guard ...func(http.Handler) http.Handler) chi.Router {
	r := chi.NewRouter()
	r.Get("/{key}", h.download)
	r.Group(func(r chi.Router) {
		r.Use(guard...)
		r.Post("/", h.upload)
		r.Delete("/{key}", h.remove)
	})
	return r
}

func (h *UploadHandler) upload(w http.ResponseWriter, r *http.Request) {
	r.Body = http.MaxBytesReader(w, r.Body, maxUpload)
	f, header, err := r.FormFile("file")
	if err != nil {
		fail(w, r, apierr.BadRequest("multipart field \"file\" is required"))
		return
	}
	defer f.Close()
	data, err := io.ReadAll(f)
	if err != nil {
		fail(w, r, apierr.BadRequest(err.Error()))
		return
	}

	key := uploadKey(header.Filename)
	if err := h.store.Put(r.Context(), key, data); err != nil {
		fail(w, r, err)
		return
	}
	slog.Info("stored upload", "key", key, "size", len(data))
	writeJSON(w, http.StatusCreated, uploadResponse{Key: key, URL: h.store.URL(key), Size: len(data)})
}

func (h *UploadHandler) download(w http.ResponseWriter, r *http.Request) {
	key := chi.URLParam(r, "key")
	data, err := h.store.Get(r.Context(), key)
	if err != nil {
		fail(w, r, missing(key, err))
		return
	}
	w.Header().Set("Content-Type", "application/octet-stream")
	_, _ = w.Write(data)
}

func (h *UploadHandler) remove(w http.ResponseWriter, r *http.Request) {
	key := chi.URLParam(r, "key")
	if err := h.store.Delete(r.Context(), key); err != nil {
		fail(w, r, missing(key, err))
		return
	}
	w.WriteHeader(http.StatusNoContent)
}"#,
            ),
        }
        .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, all_features, compile_sql_with};
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_storage_sanitizes_keys() {
        let out = StorageGo.render();
        assert!(out.contains("func SanitizeKey(name string) string {"));
        assert!(out.contains("return nil, ErrNotFound"));
    }

    #[test]
    fn test_upload_routes_per_flavor() {
        let ctx = compile_sql_with(BLOG_SQL, Target::GoChi, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();

        let chi = UploadsGo::new(GoProject::new(&model, &computed, Flavor::Chi)).render();
        assert!(chi.contains("r.Get(\"/{key}\", h.download)"));
        assert!(chi.contains("f, header, err := r.FormFile(\"file\")"));

        let gin = UploadsGo::new(GoProject::new(&model, &computed, Flavor::Gin)).render();
        assert!(gin.contains("g.GET(\"/:key\", h.download)"));
        assert!(gin.contains("c.Data(http.StatusOK, \"application/octet-stream\", data)"));
    }
}
