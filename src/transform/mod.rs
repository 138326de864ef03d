//! Transformation steps applied to the assets of a stream
//!
//! A stream's steps are an ordered list of [`Transform`]s. Each step maps the
//! current set of assets to a new set; every step is 1:1 except
//! [`Transform::Concat`], which folds all assets into one. The first failing
//! step aborts the chain.

pub mod compress;
pub mod markdown;
pub mod markup;
pub mod script;

use crate::core::Asset;
use crate::error::TaskError;
use std::fmt;

/// A single transformation step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Minify HTML, including inline styles and scripts
    MinifyHtml,
    /// Minify a stylesheet with the markup minifier
    MinifyCss,
    /// Minify JavaScript; `toplevel` allows renaming top-level names
    MinifyJs { toplevel: bool },
    /// Gzip and append `.gz` to the file name
    Gzip,
    /// Replace the file name
    Rename(String),
    /// Join all assets, newline separated, into a single file
    Concat(String),
    /// Render Markdown to an HTML document and switch the extension to `.html`
    Markdown,
}

impl Transform {
    /// Step name as written in task configuration
    pub fn name(&self) -> &'static str {
        match self {
            Transform::MinifyHtml => "minify_html",
            Transform::MinifyCss => "minify_css",
            Transform::MinifyJs { .. } => "minify_js",
            Transform::Gzip => "gzip",
            Transform::Rename(_) => "rename",
            Transform::Concat(_) => "concat",
            Transform::Markdown => "markdown",
        }
    }

    /// Apply this step to a set of assets
    pub fn apply(&self, assets: Vec<Asset>) -> Result<Vec<Asset>, TaskError> {
        match self {
            Transform::Concat(name) => Ok(concat(assets, name).into_iter().collect()),
            _ => assets.into_iter().map(|asset| self.apply_one(asset)).collect(),
        }
    }

    fn apply_one(&self, mut asset: Asset) -> Result<Asset, TaskError> {
        match self {
            Transform::MinifyHtml => {
                asset.contents = markup::minify_markup(&asset.contents)
                    .map_err(|e| TaskError::transform(asset.source_path(), e))?;
            }
            Transform::MinifyCss => {
                asset.contents = markup::minify_stylesheet(&asset.contents)
                    .map_err(|e| TaskError::transform(asset.source_path(), e))?;
            }
            Transform::MinifyJs { toplevel } => {
                asset.contents = script::minify_script(&asset.contents, *toplevel)
                    .map_err(|e| TaskError::transform(asset.source_path(), e))?;
            }
            Transform::Gzip => {
                asset.contents = compress::gzip(&asset.contents)
                    .map_err(|e| TaskError::filesystem("compress", asset.source_path(), e))?;
                asset.append_extension("gz");
            }
            Transform::Rename(name) => asset.set_file_name(name),
            Transform::Markdown => {
                let text = asset.text().map_err(|e| {
                    TaskError::transform(asset.source_path(), format!("not valid UTF-8: {}", e))
                })?;
                let title = asset
                    .relative
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                asset.contents = markdown::render_document(text, &title).into_bytes();
                asset.set_extension("html");
            }
            Transform::Concat(_) => unreachable!("concat is applied to the whole set"),
        }
        Ok(asset)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::MinifyJs { toplevel: true } => write!(f, "minify_js(toplevel)"),
            Transform::Rename(name) | Transform::Concat(name) => {
                write!(f, "{}({})", self.name(), name)
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// Apply `steps` in order, stopping at the first failure
pub fn apply_chain(steps: &[Transform], mut assets: Vec<Asset>) -> Result<Vec<Asset>, TaskError> {
    for step in steps {
        assets = step.apply(assets)?;
    }
    Ok(assets)
}

fn concat(assets: Vec<Asset>, name: &str) -> Option<Asset> {
    let base = assets.first()?.base.clone();
    let mut contents = Vec::with_capacity(assets.iter().map(|a| a.contents.len() + 1).sum());

    for (i, asset) in assets.into_iter().enumerate() {
        if i > 0 {
            contents.push(b'\n');
        }
        contents.extend(asset.contents);
    }

    Some(Asset::new(base, name, contents))
}
