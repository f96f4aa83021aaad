//! Request and response snippets in each router's dialect.

use crate::project::Flavor;

impl Flavor {
    /// Import path of the router package.
    pub fn import(&self) -> &'static str {
        self.requirement().0
    }

    /// Signature of a handler method, without `func`.
    pub fn handler(&self, receiver: &str, name: &str) -> String {
        match self {
            Flavor::Gin => format!("({receiver}) {name}(c *gin.Context)"),
            Flavor::Chi => format!("({receiver}) {name}(w http.ResponseWriter, r *http.Request)"),
        }
    }

    /// Path segment of a route parameter.
    pub fn segment(&self, name: &str) -> String {
        match self {
            Flavor::Gin => format!(":{name}"),
            Flavor::Chi => format!("{{{name}}}"),
        }
    }

    pub fn param(&self, name: &str) -> String {
        match self {
            Flavor::Gin => format!("c.Param(\"{name}\")"),
            Flavor::Chi => format!("chi.URLParam(r, \"{name}\")"),
        }
    }

    /// Request context expression.
    pub fn ctx(&self) -> &'static str {
        match self {
            Flavor::Gin => "c.Request.Context()",
            Flavor::Chi => "r.Context()",
        }
    }

    pub fn json(&self, status: &str, body: &str) -> String {
        match self {
            Flavor::Gin => format!("c.JSON({status}, {body})"),
            Flavor::Chi => format!("writeJSON(w, {status}, {body})"),
        }
    }

    pub fn no_content(&self) -> &'static str {
        match self {
            Flavor::Gin => "c.Status(http.StatusNoContent)",
            Flavor::Chi => "w.WriteHeader(http.StatusNoContent)",
        }
    }

    pub fn fail(&self, err: &str) -> String {
        match self {
            Flavor::Gin => format!("fail(c, {err})"),
            Flavor::Chi => format!("fail(w, r, {err})"),
        }
    }

    /// Decode and validate the JSON body into `dst`.
    pub fn bind(&self, dst: &str) -> String {
        match self {
            Flavor::Gin => format!("bind(c, {dst})"),
            Flavor::Chi => format!("decode(r, {dst})"),
        }
    }

    /// `limit, offset, err` from the query string.
    pub fn page(&self) -> &'static str {
        match self {
            Flavor::Gin => "page(c)",
            Flavor::Chi => "page(r)",
        }
    }

    /// Fail and return when `err` is set.
    pub fn check(&self) -> String {
        format!("if err != nil {{\n\t{}\n\treturn\n}}", self.fail("err"))
    }
}
