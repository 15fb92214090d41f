//! Whitelisted placeholder substitution for file rule templates.
//!
//! Templates may reference a fixed set of `{name}` placeholders. Anything
//! outside the whitelist is rejected at configuration load time, before any
//! render context exists, so a broken template never reaches a generation run.
use crate::error::{Result, SetupError};
use regex::Regex;
use std::sync::OnceLock;

pub const ALLOWED_PLACEHOLDERS: [&str; 3] = ["lang", "lang_folder", "project_name"];

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern"))
}

/// Values substituted into file rule templates for one generation run.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub lang: String,
    pub lang_folder: String,
    pub project_name: String,
}

impl RenderContext {
    pub fn new(lang: &str, lang_folder: &str, project_name: &str) -> Self {
        RenderContext {
            lang: lang.to_string(),
            lang_folder: lang_folder.to_string(),
            project_name: project_name.to_string(),
        }
    }

    fn value_of(&self, name: &str) -> Option<&str> {
        match name {
            "lang" => Some(&self.lang),
            "lang_folder" => Some(&self.lang_folder),
            "project_name" => Some(&self.project_name),
            _ => None,
        }
    }
}

/// Check a template against the whitelist without rendering it.
pub fn validate(template: &str, label: &str) -> Result<()> {
    for captures in placeholder_pattern().captures_iter(template) {
        let name = &captures[1];
        if !ALLOWED_PLACEHOLDERS.contains(&name) {
            return Err(SetupError::UnsupportedPlaceholder {
                label: label.to_string(),
                name: name.to_string(),
                allowed: ALLOWED_PLACEHOLDERS.join(", "),
            });
        }
    }
    Ok(())
}

/// Substitute every whitelisted placeholder, then fail on anything left over.
pub fn render(template: &str, ctx: &RenderContext, label: &str) -> Result<String> {
    let mut rendered = template.to_string();
    for name in ALLOWED_PLACEHOLDERS {
        if let Some(value) = ctx.value_of(name) {
            rendered = rendered.replace(&format!("{{{name}}}"), value);
        }
    }
    if let Some(captures) = placeholder_pattern().captures(&rendered) {
        return Err(SetupError::UnresolvedPlaceholder {
            label: label.to_string(),
            name: captures[1].to_string(),
        });
    }
    Ok(rendered)
}
