//! Unified-diff text generation for whole files and single definitions.
//!
//! Output is plain `diffy`-rendered unified diff, trimmed of trailing
//! newlines so the UI can append it directly. Identical inputs yield an
//! empty string.

use diffy::DiffOptions;

/// Unified diff for a whole file, labelled `a/<path>` / `b/<path>`.
pub fn build_file_diff(path: &str, old: &str, new: &str) -> String {
    unified(old, new, format!("a/{path}"), format!("b/{path}"))
}

/// Unified diff for a single definition, labelled
/// `<path>:<name>:old` / `<path>:<name>:new`.
///
/// Pass an empty string for the missing side of an added or removed
/// definition.
pub fn build_definition_diff(path: &str, name: &str, old: &str, new: &str) -> String {
    unified(old, new, format!("{path}:{name}:old"), format!("{path}:{name}:new"))
}

fn unified(old: &str, new: &str, from_label: String, to_label: String) -> String {
    if old == new {
        return String::new();
    }

    let mut options = DiffOptions::new();
    options.set_original_filename(from_label);
    options.set_modified_filename(to_label);
    let patch = options.create_patch(old, new);

    patch.to_string().trim_end_matches('\n').to_string()
}
