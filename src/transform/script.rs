//! JavaScript minification

use minify_js::{minify, Session, TopLevelMode};

/// Minify a script
///
/// With `toplevel` the file is minified as a module, so top-level
/// declarations may be renamed or merged. Callers must not rely on global
/// names surviving.
pub fn minify_script(source: &[u8], toplevel: bool) -> Result<Vec<u8>, String> {
    let mode = if toplevel {
        TopLevelMode::Module
    } else {
        TopLevelMode::Global
    };

    let session = Session::new();
    let mut output = Vec::new();
    minify(&session, mode, source, &mut output).map_err(|e| format!("{:?}", e))?;
    Ok(output)
}
