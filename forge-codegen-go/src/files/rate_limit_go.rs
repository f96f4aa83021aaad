use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

use crate::{go_file::GoFile, project::Flavor};

const LIMITER: &str = r#"// Limiter keeps one token bucket per client address.
type Limiter struct {
	mu       sync.Mutex
	buckets  map[string]*rate.Limiter
	capacity int
	refill   rate.Limit
}

// New returns a limiter whose buckets hold capacity tokens and regain
// refillPerSec tokens each second.
func New(capacity int, refillPerSec float64) *Limiter {
	return &Limiter{
		buckets:  make(map[string]*rate.Limiter),
		capacity: capacity,
		refill:   rate.Limit(refillPerSec),
	}
}

// Allow takes one token for client; false when its bucket is empty.
func (l *Limiter) Allow(client string) bool {
	l.mu.Lock()
	bucket, ok := l.buckets[client]
	if !ok {
		bucket = rate.NewLimiter(l.refill, l.capacity)
		l.buckets[client] = bucket
	}
	l.mu.Unlock()
	return bucket.Allow()
}"#;

/// `internal/ratelimit/ratelimit.go`: a per-client token bucket.
pub struct RateLimitGo {
    pub flavor: Flavor,
}

impl GeneratedFile for RateLimitGo {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal").join("ratelimit").join("ratelimit.go")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let file = GoFile::new("ratelimit")
            .doc("Package ratelimit answers 429 once a client spends its token bucket.")
            .import("log/slog")
            .import("net/http")
            .import("sync")
            .import("golang.org/x/time/rate")
            .raw(LIMITER);

        match self.flavor {
            Flavor::Gin => file.import(Flavor::Gin.import()).raw(
                r#"func (l *Limiter) Middleware() gin.HandlerFunc {
	return func(c *gin.Context) {
		client := c.ClientIP()
		if !l.Allow(client) {
			slog.Warn("rate limit exceeded", "client", client, "path", c.Request.URL.Path)
			c.Header("Retry-After", "1")
			c.AbortWithStatusJSON(http.StatusTooManyRequests, gin.H{"error": "too many requests"})
			return
		}
		c.Next()
	}
}"#,
            ),
            Flavor::Chi => file.import("encoding/json").import("net").raw(
                r#"func (l *Limiter) Middleware(next http.Handler) http.Handler {
	return http.HandlerFunc(func(w http.ResponseWriter, r *http.Request) {
		client, _, err := net.SplitHostPort(r.RemoteAddr)
		if err != nil {
			client = r.RemoteAddr
		}
		if !l.Allow(client) {
			slog.Warn("rate limit exceeded", "client", client, "path", r.URL.Path)
			w.Header().Set("Content-Type", "application/json")
			w.Header().Set("Retry-After", "1")
			w.WriteHeader(http.StatusTooManyRequests)
			_ = json.NewEncoder(w).Encode(map[string]string{"error": "too many requests"})
			return
		}
		next.ServeHTTP(w, r)
	})
}"#,
            ),
        }
        .render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chi_limiter_reads_remote_addr() {
        let out = RateLimitGo { flavor: Flavor::Chi }.render();
        assert!(out.contains("net.SplitHostPort(r.RemoteAddr)"));
        assert!(out.contains("\t\"golang.org/x/time/rate\"\n"));
        assert!(!out.contains("gin"));
    }

    #[test]
    fn test_gin_limiter_uses_client_ip() {
        let out = RateLimitGo { flavor: Flavor::Gin }.render();
        assert!(out.contains("client := c.ClientIP()"));
        assert!(out.contains("http.StatusTooManyRequests"));
    }
}
