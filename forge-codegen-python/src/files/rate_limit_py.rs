use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

use crate::py_file::PyFile;

/// `app/rate_limit.py`: a token bucket per client address, applied as
/// Starlette middleware.
pub struct RateLimitPy;

impl GeneratedFile for RateLimitPy {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app").join("rate_limit.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        PyFile::new()
            .doc("Per-client token bucket rate limiting.")
            .import_module("logging")
            .import_module("math")
            .import_module("threading")
            .import_module("time")
            .import("dataclasses", "dataclass")
            .import("fastapi", "Request")
            .import("fastapi.responses", "JSONResponse")
            .import("starlette.middleware.base", "BaseHTTPMiddleware")
            .import("starlette.types", "ASGIApp")
            .raw("logger = logging.getLogger(__name__)")
            .raw(
                r#"@dataclass
class TokenBucket:
    tokens: float
    updated: float"#,
            )
            .raw(
                r#"class RateLimiter:
    """Hands out `capacity` requests per client, refilled continuously."""

    def __init__(self, capacity: int, refill_per_sec: float) -> None:
        self.capacity = capacity
        self.refill_per_sec = refill_per_sec
        self._buckets: dict[str, TokenBucket] = {}
        self._lock = threading.Lock()

    def check(self, client: str) -> float | None:
        """Take a token. Returns the seconds to wait when none is left."""
        now = time.monotonic()
        with self._lock:
            bucket = self._buckets.get(client)
            if bucket is None:
                bucket = self._buckets[client] = TokenBucket(float(self.capacity), now)
            elapsed = now - bucket.updated
            bucket.tokens = min(self.capacity, bucket.tokens + elapsed * self.refill_per_sec)
            bucket.updated = now
            if bucket.tokens >= 1:
                bucket.tokens -= 1
                return None
            return (1 - bucket.tokens) / self.refill_per_sec"#,
            )
            .raw(
                r#"class RateLimitMiddleware(BaseHTTPMiddleware):
    def __init__(self, app: ASGIApp, limiter: RateLimiter) -> None:
        super().__init__(app)
        self.limiter = limiter

    async def dispatch(self, request: Request, call_next):
        client = request.client.host if request.client else "unknown"
        wait = self.limiter.check(client)
        if wait is None:
            return await call_next(request)
        logger.warning("rate limit exceeded for %s", client)
        return JSONResponse(
            status_code=429,
            content={"error": "too many requests"},
            headers={"Retry-After": str(max(1, math.ceil(wait)))},
        )"#,
            )
            .render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middleware_rejects_with_retry_after() {
        let out = RateLimitPy.render();
        assert!(out.contains("import math\nimport threading\nimport time\n"));
        assert!(out.contains("class RateLimitMiddleware(BaseHTTPMiddleware):\n"));
        assert!(out.contains("            status_code=429,\n"));
        assert!(out.contains("headers={\"Retry-After\": str(max(1, math.ceil(wait)))}"));
    }
}
