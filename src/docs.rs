//! HTML documentation site builder.
//!
//! Reads the requirement YAML documents and architecture diagrams from a
//! `Docs/` tree and writes a static site into `Docs/build/`. Validation and
//! rendering problems are collected into the report rather than aborting:
//! a broken entry or an unreachable render endpoint still yields a browsable
//! site.
use crate::diagram::{self, escape_html, DiagramRenderer};
use crate::error::{Result, SetupError};
use crate::requirements::{self, LinkIndex, Requirement, ValidationReport};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

pub const HIGH_LEVEL_REQUIREMENTS_REL: &str = "requirements/high_level_requirements.yaml";
pub const SOFTWARE_REQUIREMENTS_REL: &str = "requirements/software_requirements.yaml";

const DIAGRAM_PAGES: [(&str, &str, &str); 3] = [
    ("runtime", "runtime_diagram.puml", "Runtime Diagram"),
    ("class", "class_diagram.puml", "Class Diagram"),
    ("block", "block_diagram.puml", "Block Diagram"),
];

/// Outcome of one docs build: pages written plus every collected issue.
#[derive(Debug)]
pub struct DocsReport {
    pub pages: Vec<String>,
    pub issues: Vec<String>,
}

/// Build the docs site under `<docs_root>/build`.
///
/// `renderer` is `None` for offline builds; diagrams then use the embedded
/// text fallback without any network request.
pub fn build_docs(docs_root: &Path, renderer: Option<&DiagramRenderer>) -> Result<DocsReport> {
    let build_root = docs_root.join("build");
    fs::create_dir_all(&build_root).map_err(|err| SetupError::io("create", &build_root, err))?;

    let mut issues = Vec::new();
    let high_doc = load_yaml(&docs_root.join(HIGH_LEVEL_REQUIREMENTS_REL), &mut issues);
    let software_doc = load_yaml(&docs_root.join(SOFTWARE_REQUIREMENTS_REL), &mut issues);

    let report = requirements::validate(&high_doc, &software_doc);
    issues.extend(report.issues.iter().map(|issue| issue.to_string()));

    let mut pages = Vec::new();
    let mut write_page = |name: &str, html: String| -> Result<()> {
        let path = build_root.join(format!("{name}.html"));
        fs::write(&path, html).map_err(|err| SetupError::io("write", &path, err))?;
        pages.push(format!("{name}.html"));
        Ok(())
    };

    write_page("index", index_page())?;
    write_page("architecture", architecture_page())?;
    for (slug, file_name, title) in DIAGRAM_PAGES {
        let html = diagram_page(docs_root, file_name, title, renderer, &mut issues);
        write_page(slug, html)?;
    }
    write_page(
        "high_level",
        requirements_page(&report, "High-Level Requirements", "high_level"),
    )?;
    write_page(
        "software",
        requirements_page(&report, "Software Requirements", "software"),
    )?;

    tracing::info!(
        pages = pages.len(),
        issues = issues.len(),
        "docs build complete"
    );
    Ok(DocsReport { pages, issues })
}

fn load_yaml(path: &Path, issues: &mut Vec<String>) -> Value {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            issues.push(format!("Could not load {}: {err}", path.display()));
            return Value::Null;
        }
    };
    match serde_yaml::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            issues.push(format!("Invalid YAML in {}: {err}", path.display()));
            Value::Null
        }
    }
}

fn diagram_page(
    docs_root: &Path,
    file_name: &str,
    title: &str,
    renderer: Option<&DiagramRenderer>,
    issues: &mut Vec<String>,
) -> String {
    let path = docs_root.join("architecture").join(file_name);
    let body = match fs::read_to_string(&path) {
        Ok(source) => match renderer {
            Some(renderer) => renderer.render_svg(&source),
            None => diagram::fallback_html(&source, "Offline build; diagram not rendered."),
        },
        Err(err) => {
            issues.push(format!("Could not load {}: {err}", path.display()));
            format!(
                "<div class=\"puml-fallback\"><p>Missing or unreadable file: {}</p></div>",
                escape_html(file_name)
            )
        }
    };
    page(
        title,
        "architecture",
        &format!(
            "<h1>{title}</h1>\
             <p>Rendered from {file_name}. Edit the PUML file and rebuild docs to refresh.</p>\
             <div class=\"diagram\">{body}</div>\
             <p><a class=\"btn\" href=\"architecture.html\">Back to Architecture</a></p>"
        ),
    )
}

fn index_page() -> String {
    page(
        "Home",
        "index",
        "<h1>Project Documentation</h1>\
         <p>Architecture diagrams and requirement documents for this project. \
          Use the navigation above to explore each section.</p>\
         <ul>\
         <li><a href=\"architecture.html\">Architecture diagrams</a></li>\
         <li><a href=\"high_level.html\">High-level requirements</a></li>\
         <li><a href=\"software.html\">Software requirements</a></li>\
         </ul>",
    )
}

fn architecture_page() -> String {
    let cards: String = DIAGRAM_PAGES
        .iter()
        .map(|(slug, _, title)| {
            format!(
                "<div class=\"requirement\"><h3>{title}</h3>\
                 <a class=\"btn\" href=\"{slug}.html\">Open {title}</a></div>"
            )
        })
        .collect();
    page(
        "Architecture",
        "architecture",
        &format!(
            "<h1>System Architecture Diagrams</h1>\
             <p>Select a diagram to view it on its dedicated page.</p>{cards}"
        ),
    )
}

fn requirements_page(report: &ValidationReport, title: &str, slug: &str) -> String {
    let (entries, links) = match slug {
        "software" => (&report.software, &report.links),
        _ => (&report.high_level, &report.links),
    };
    let mut body = format!(
        "<h1>{title}</h1>\
         <p>All {} with their current status and details.</p>",
        title.to_lowercase()
    );
    for requirement in entries {
        body.push_str(&requirement_card(requirement, slug, links));
    }
    page(title, slug, &body)
}

fn requirement_card(requirement: &Requirement, slug: &str, links: &LinkIndex) -> String {
    let status_slug = requirement.status.to_lowercase().replace(' ', "-");
    let refines = match requirement.refines.as_deref() {
        Some(refines) if links.forward.contains_key(&requirement.id) => {
            format!("<a href=\"high_level.html#{refines}\">{}</a>", escape_html(refines))
        }
        Some(refines) => escape_html(refines),
        None => "N/A".to_string(),
    };

    let mut card = format!(
        "<div class=\"requirement status-{status_slug}\" id=\"{id}\">\
         <h3>{id}: {name}</h3>\
         <p><strong>Status:</strong> <span class=\"status-badge badge-{status_slug}\">{status}</span></p>\
         <p><strong>Refines:</strong> {refines}</p>\
         <p><strong>Description:</strong></p>\
         <p>{description}</p>",
        id = escape_html(&requirement.id),
        name = escape_html(&requirement.name),
        status = escape_html(&requirement.status),
        description = escape_html(requirement.description.trim()),
    );
    if slug == "high_level" {
        if let Some(refined_by) = links.backward.get(&requirement.id) {
            if !refined_by.is_empty() {
                card.push_str("<p><strong>Refined by:</strong></p><ul>");
                for software_id in refined_by {
                    card.push_str(&format!(
                        "<li><a href=\"software.html#{software_id}\">{}</a></li>",
                        escape_html(software_id)
                    ));
                }
                card.push_str("</ul>");
            }
        }
    }
    card.push_str("</div>");
    card
}

fn navigation(current: &str) -> String {
    let pages = [
        ("index", "Home"),
        ("architecture", "Architecture"),
        ("high_level", "High-Level Requirements"),
        ("software", "Software Requirements"),
    ];
    let mut nav = String::from("<nav>");
    for (slug, title) in pages {
        let class = if slug == current { " class=\"active\"" } else { "" };
        nav.push_str(&format!("<a href=\"{slug}.html\"{class}>{title}</a>"));
    }
    nav.push_str("</nav>");
    nav
}

fn page(title: &str, current: &str, main: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title} - Project Documentation</title>\n\
         <style>{STYLE}</style>\n</head>\n<body>\n\
         <header><h1>Project Documentation</h1></header>\n\
         {nav}\n<main>\n{main}\n</main>\n\
         <footer><p>Generated automatically.</p></footer>\n\
         </body>\n</html>\n",
        nav = navigation(current),
    )
}

const STYLE: &str = "\
body { font-family: sans-serif; line-height: 1.6; margin: 0 auto; max-width: 1100px; }\
header { background: #4facfe; color: white; padding: 1.5rem; text-align: center; }\
nav { background: #f8f9fa; padding: 0.75rem; border-bottom: 1px solid #e9ecef; }\
nav a { margin-right: 1rem; text-decoration: none; color: #495057; font-weight: 500; }\
nav a.active { color: #007bff; }\
main { padding: 1.5rem; }\
.requirement { background: #f8f9fa; border: 1px solid #dee2e6; border-left: 5px solid #dee2e6;\
 border-radius: 8px; padding: 1rem; margin-bottom: 1rem; }\
.status-draft { border-left-color: #ffc107; }\
.status-in-progress { border-left-color: #17a2b8; }\
.status-in-review { border-left-color: #6c757d; }\
.status-finished { border-left-color: #28a745; }\
.status-badge { padding: 0.2rem 0.6rem; border-radius: 20px; font-size: 0.85rem; font-weight: 600; }\
.badge-draft { background: #fff3cd; color: #856404; }\
.badge-in-progress { background: #d1ecf1; color: #0c5460; }\
.badge-in-review { background: #e2e3e5; color: #383d41; }\
.badge-finished { background: #d4edda; color: #155724; }\
.diagram { border: 1px solid #dee2e6; border-radius: 8px; padding: 1rem; text-align: center; }\
.puml-fallback pre { background: #f8f9fa; border: 1px solid #dee2e6; padding: 1rem;\
 white-space: pre-wrap; text-align: left; }\
.btn { display: inline-block; background: #007bff; color: white; padding: 0.4rem 0.9rem;\
 text-decoration: none; border-radius: 5px; }\
footer { background: #343a40; color: white; text-align: center; padding: 0.75rem; }";

#[cfg(test)]
#[path = "docs_tests.rs"]
mod tests;
