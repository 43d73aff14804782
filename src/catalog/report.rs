//! Human-readable Markdown rendering of a catalog.

use std::fmt;
use std::fs;
use std::path::Path;

use super::{Catalog, License, Resource, Source};
use crate::error::DatasetError;

/// Displays a catalog as a Markdown document.
pub struct Markdown<'a>(pub &'a Catalog);

impl fmt::Display for Markdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let catalog = self.0;
        let package = &catalog.package;

        writeln!(f, "# {} {}", package.name, package.version)?;
        writeln!(f)?;
        writeln!(f, "{}", package.description)?;
        writeln!(f)?;
        writeln!(f, "- Homepage: <{}>", package.homepage)?;
        writeln!(f, "- Generated: {}", package.created)?;
        if !package.licenses.is_empty() {
            writeln!(f, "- Licenses: {}", license_links(&package.licenses))?;
        }
        writeln!(f, "- Resources: {}", catalog.resources.len())?;

        for resource in &catalog.resources {
            writeln!(f)?;
            write_resource(f, resource)?;
        }

        Ok(())
    }
}

fn write_resource(f: &mut fmt::Formatter<'_>, resource: &Resource) -> fmt::Result {
    writeln!(f, "## `{}`", resource.path)?;
    writeln!(f)?;
    if let Some(description) = &resource.description {
        writeln!(f, "{}", description)?;
        writeln!(f)?;
    }
    writeln!(
        f,
        "Format: {} ({}), {} bytes",
        resource.format, resource.mediatype, resource.bytes
    )?;

    if let Some(schema) = &resource.schema {
        writeln!(f)?;
        writeln!(f, "| Field | Type | Description |")?;
        writeln!(f, "|-------|------|-------------|")?;
        for field in &schema.fields {
            let mut description = field.description.clone().unwrap_or_default();
            if let Some(categories) = &field.categories {
                if !description.is_empty() {
                    description.push(' ');
                }
                description.push_str(&format!("Categories: {}", categories.join(", ")));
            }
            writeln!(
                f,
                "| `{}` | {} | {} |",
                field.name,
                field.field_type,
                escape_cell(&description)
            )?;
        }
    }

    if !resource.sources.is_empty() {
        writeln!(f)?;
        writeln!(f, "Sources: {}", source_links(&resource.sources))?;
    }
    if !resource.licenses.is_empty() {
        writeln!(f)?;
        writeln!(f, "Licenses: {}", license_links(&resource.licenses))?;
    }

    Ok(())
}

fn source_links(sources: &[Source]) -> String {
    sources
        .iter()
        .map(|source| match &source.title {
            Some(title) => format!("[{}]({})", title, source.path),
            None => format!("<{}>", source.path),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn license_links(licenses: &[License]) -> String {
    licenses
        .iter()
        .map(|license| {
            let label = license.title.as_deref().unwrap_or(&license.name);
            format!("[{}]({})", label, license.path)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Writes the Markdown rendering of `catalog` to `path`.
pub fn write_markdown(path: &Path, catalog: &Catalog) -> Result<(), DatasetError> {
    tracing::info!("Writing {}", path.display());
    fs::write(path, Markdown(catalog).to_string()).map_err(DatasetError::Io)
}
