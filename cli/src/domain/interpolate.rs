//! Template interpolation for paths and generated configuration text.
//!
//! Supported expressions:
//! - `{{ .Name }}` resolves a user variable;
//! - ``{{ build `Name` }}`` resolves data generated by the image build
//!   (for example the builder's `SSHHost`).
//!
//! Text outside `{{ ... }}` is copied unchanged.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::TemplateError;

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // constant pattern
    Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_]*)$").unwrap()
});

static BUILD_DATA: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // constant pattern
    Regex::new(r"^build\s+`([A-Za-z_][A-Za-z0-9_]*)`$").unwrap()
});

/// Values available to `render`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpolationContext {
    pub vars: BTreeMap<String, String>,
    pub generated: BTreeMap<String, String>,
}

impl InterpolationContext {
    #[must_use]
    pub fn with_generated(generated: BTreeMap<String, String>) -> Self {
        Self {
            vars: BTreeMap::new(),
            generated,
        }
    }

    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

/// Resolve every `{{ ... }}` expression in `template`.
///
/// # Errors
///
/// Returns `TemplateError::Undefined` for names missing from `ctx`, and
/// `TemplateError::Malformed` for unterminated or unsupported expressions.
pub fn render(template: &str, ctx: &InterpolationContext) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            return Err(TemplateError::Malformed {
                offset: offset + start,
                expr: rest[start..].to_string(),
            });
        };
        let expr = after_open[..end].trim();
        out.push_str(resolve(expr, ctx, offset + start)?);

        let consumed = start + 2 + end + 2;
        rest = &rest[consumed..];
        offset += consumed;
    }
    out.push_str(rest);
    Ok(out)
}

fn resolve<'a>(
    expr: &str,
    ctx: &'a InterpolationContext,
    offset: usize,
) -> Result<&'a str, TemplateError> {
    if let Some(caps) = VARIABLE.captures(expr) {
        let name = &caps[1];
        return ctx
            .vars
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| TemplateError::Undefined {
                kind: "variable",
                name: name.to_string(),
            });
    }
    if let Some(caps) = BUILD_DATA.captures(expr) {
        let name = &caps[1];
        return ctx
            .generated
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| TemplateError::Undefined {
                kind: "build data",
                name: name.to_string(),
            });
    }
    Err(TemplateError::Malformed {
        offset,
        expr: expr.to_string(),
    })
}
