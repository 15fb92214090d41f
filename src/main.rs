use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::fs;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod diagram;
mod docs;
mod error;
mod generate;
mod paths;
mod placeholders;
mod registry;
mod requirements;

use cli::{BuildDocsArgs, Command, GenerateArgs, ListArgs, RegisterArgs, RootArgs, StubArgs};
use diagram::{DiagramRenderer, RENDER_TIMEOUT};
use placeholders::RenderContext;
use registry::{RegistryEntry, RegistryIndex, Scope, UpsertDisposition};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = RootArgs::parse();
    match args.command {
        Command::List(args) => cmd_list(args),
        Command::Generate(args) => cmd_generate(args),
        Command::Register(args) => cmd_register(args),
        Command::Stub(args) => cmd_stub(args),
        Command::BuildDocs(args) => cmd_build_docs(args),
    }
}

fn cmd_list(args: ListArgs) -> Result<()> {
    let loaded = registry::load(&args.configurations_root)?;
    for item in &loaded {
        let configuration = &item.configuration;
        let description = if configuration.description.is_empty() {
            String::new()
        } else {
            format!(" - {}", configuration.description)
        };
        println!(
            "[{}] {} ({}){}",
            item.scope.as_str(),
            configuration.name,
            configuration.id,
            description
        );
    }
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let loaded = registry::load(&args.configurations_root)?;
    let selected = loaded
        .iter()
        .find(|item| item.configuration.id == args.config)
        .ok_or_else(|| {
            let known: Vec<&str> = loaded
                .iter()
                .map(|item| item.configuration.id.as_str())
                .collect();
            anyhow!(
                "unknown configuration id {:?} (known: {})",
                args.config,
                known.join(", ")
            )
        })?;

    let project_name = args.project_name.trim();
    if project_name.is_empty() {
        bail!("project name cannot be empty");
    }
    let project_root = args.dest.join(project_name);
    if project_root.exists() {
        bail!(
            "target directory {} already exists, choose a different project name",
            project_root.display()
        );
    }
    fs::create_dir_all(&project_root)
        .with_context(|| format!("create {}", project_root.display()))?;

    let lang_folder = args.lang_folder.as_deref().unwrap_or(&args.lang);
    let ctx = RenderContext::new(&args.lang, lang_folder, project_name);
    let generated = generate::generate(
        &project_root,
        &args.artifacts_root,
        &selected.configuration,
        &ctx,
    )?;

    println!(
        "Generated project '{project_name}' at {} ({} files):",
        project_root.display(),
        generated.len()
    );
    for path in &generated {
        println!("  {path}");
    }

    // Provisioning is a collaborator concern; report what it needs.
    let runtime = &selected.configuration.runtime;
    if runtime.setup_docs_venv {
        println!(
            "Docs environment requested: {} (packages: {})",
            runtime.docs_venv_path,
            runtime.docs_packages.join(", ")
        );
    }
    if generated.iter().any(|path| path == "setup.sh") {
        println!("Run ./setup.sh inside the project to finish environment setup.");
    }
    Ok(())
}

fn cmd_register(args: RegisterArgs) -> Result<()> {
    let configuration = config::load(&args.file, "configuration document")?;

    let index_path = args.configurations_root.join(registry::INDEX_FILE);
    let mut index = if index_path.exists() {
        registry::load_index(&args.configurations_root)?
    } else {
        RegistryIndex::empty()
    };

    let relative_path = format!("user_generated/{}.json", configuration.id);
    let entry = RegistryEntry {
        id: configuration.id.clone(),
        path: relative_path.clone(),
        scope: Scope::UserGenerated,
    };
    match registry::plan_upsert(&index.configurations, &entry.id, entry.scope)? {
        UpsertDisposition::Append => index.configurations.push(entry),
        UpsertDisposition::Overwrite { index: position } => {
            if !args.force {
                bail!(
                    "configuration id {:?} already exists in the index, pass --force to overwrite",
                    configuration.id
                );
            }
            index.configurations[position] = entry;
        }
    }

    let document_path = args.configurations_root.join(&relative_path);
    if let Some(parent) = document_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut text = serde_json::to_string_pretty(&configuration)
        .context("serialize normalized configuration")?;
    text.push('\n');
    fs::write(&document_path, text)
        .with_context(|| format!("write {}", document_path.display()))?;
    registry::save_index(&args.configurations_root, &mut index)?;

    println!("Registered configuration '{}'", configuration.id);
    println!("  file: {}", document_path.display());
    println!("  scope: {}", Scope::UserGenerated.as_str());
    Ok(())
}

fn cmd_stub(args: StubArgs) -> Result<()> {
    let stub = config::configuration_stub();
    match args.out {
        Some(path) => {
            fs::write(&path, format!("{stub}\n"))
                .with_context(|| format!("write {}", path.display()))?;
            println!("Wrote configuration stub to {}", path.display());
        }
        None => println!("{stub}"),
    }
    Ok(())
}

fn cmd_build_docs(args: BuildDocsArgs) -> Result<()> {
    if !args.docs.exists() {
        bail!("docs directory {} not found", args.docs.display());
    }
    let renderer =
        (!args.offline).then(|| DiagramRenderer::new(&args.render_endpoint, RENDER_TIMEOUT));
    let report = docs::build_docs(&args.docs, renderer.as_ref())?;

    if report.issues.is_empty() {
        println!("Documentation built successfully in {}", args.docs.join("build").display());
    } else {
        println!("Build completed with issues:");
        for issue in &report.issues {
            println!(" - {issue}");
        }
    }
    println!(
        "Open {} in your browser to view the documentation.",
        args.docs.join("build/index.html").display()
    );
    Ok(())
}
