use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

use crate::{java_file::JavaFile, project::JavaProject};

/// `config/RateLimitFilter.java`: a Bucket4j token bucket per client address,
/// ahead of every other filter.
pub struct RateLimitFilterJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> RateLimitFilterJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for RateLimitFilterJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("config"), "RateLimitFilter")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        JavaFile::new(self.project.package("config"))
            .import_all([
                "io.github.bucket4j.Bandwidth",
                "io.github.bucket4j.Bucket",
                "io.github.bucket4j.ConsumptionProbe",
                "jakarta.servlet.FilterChain",
                "jakarta.servlet.ServletException",
                "jakarta.servlet.http.HttpServletRequest",
                "jakarta.servlet.http.HttpServletResponse",
                "java.io.IOException",
                "java.time.Duration",
                "java.util.Map",
                "java.util.concurrent.ConcurrentHashMap",
                "java.util.concurrent.TimeUnit",
                "org.slf4j.Logger",
                "org.slf4j.LoggerFactory",
                "org.springframework.core.Ordered",
                "org.springframework.core.annotation.Order",
                "org.springframework.http.HttpHeaders",
                "org.springframework.http.MediaType",
                "org.springframework.stereotype.Component",
                "org.springframework.web.filter.OncePerRequestFilter",
            ])
            .raw(
                r#"@Component
@Order(Ordered.HIGHEST_PRECEDENCE)
public class RateLimitFilter extends OncePerRequestFilter {

    private static final Logger log = LoggerFactory.getLogger(RateLimitFilter.class);

    private final Map<String, Bucket> buckets = new ConcurrentHashMap<>();
    private final long capacity;
    private final long refillPerSecond;

    public RateLimitFilter(AppProperties properties) {
        this.capacity = properties.rateLimitCapacity();
        this.refillPerSecond = Math.max(1, properties.rateLimitRefillPerSecond());
    }

    private Bucket newBucket(String client) {
        return Bucket.builder()
                .addLimit(limit -> limit.capacity(capacity).refillGreedy(refillPerSecond, Duration.ofSeconds(1)))
                .build();
    }

    @Override
    protected void doFilterInternal(
            HttpServletRequest request,
            HttpServletResponse response,
            FilterChain chain) throws ServletException, IOException {
        String client = request.getRemoteAddr();
        ConsumptionProbe probe = buckets.computeIfAbsent(client, this::newBucket).tryConsumeAndReturnRemaining(1);
        if (probe.isConsumed()) {
            chain.doFilter(request, response);
            return;
        }
        long wait = Math.max(1, TimeUnit.NANOSECONDS.toSeconds(probe.getNanosToWaitForRefill() + 999_999_999L));
        log.warn("rate limit exceeded for {}", client);
        response.setStatus(429);
        response.setHeader(HttpHeaders.RETRY_AFTER, Long.toString(wait));
        response.setContentType(MediaType.APPLICATION_JSON_VALUE);
        response.getWriter().write("{\"error\":\"too many requests\"}");
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
    fn test_rate_limit_filter() {
        let ctx = compile_sql_with(BLOG_SQL, Target::JavaSpring, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let file = RateLimitFilterJava::new(JavaProject::new(&model, &computed));
        assert_eq!(
            file.path(Path::new("")),
            Path::new("src/main/java/com/example/blog/config/RateLimitFilter.java")
        );

        let out = file.render();
        assert!(out.contains("@Component\n@Order(Ordered.HIGHEST_PRECEDENCE)\n"));
        assert!(out.contains("        response.setStatus(429);\n"));
        assert!(out.contains("        response.setHeader(HttpHeaders.RETRY_AFTER, Long.toString(wait));\n"));
        assert!(out.contains("        log.warn(\"rate limit exceeded for {}\", client);\n"));
    }
}
