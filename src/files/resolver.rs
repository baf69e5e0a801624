use std::path::{Component, Path, PathBuf};

use crate::http::parser::ParseError;

/// Lexically normalizes a path: drops `.`, folds `name/..` pairs and
/// redundant separators. `..` at the root of an absolute path is dropped;
/// leading `..` in a relative path is kept. The filesystem is never touched.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();

    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                Some(Component::ParentDir) | Some(Component::CurDir) | None => out.push(comp),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.into_iter().collect()
}

/// Maps a request target onto a file under `root`.
///
/// `root` is expected to be absolute and already cleaned. A target ending in
/// `/` names `index_file` inside that directory. The target is cleaned before
/// it is joined, and the joined result is checked to still lie under `root`,
/// so `..` segments can never reach outside it.
pub fn resolve(root: &Path, target: &str, index_file: &str) -> Result<PathBuf, ParseError> {
    if target.is_empty() {
        return Err(ParseError::EmptyTarget);
    }
    let Some(rest) = target.strip_prefix('/') else {
        return Err(ParseError::RelativeTarget(target.to_string()));
    };

    let mut relative = rest.to_string();
    if target.ends_with('/') {
        relative.push_str(index_file);
    }

    // Join by appending: a target like "//etc" stays under the root.
    let relative: PathBuf = clean(Path::new(&relative))
        .components()
        .filter(|c| matches!(c, Component::Normal(_) | Component::ParentDir))
        .collect();
    let resolved = clean(&root.join(relative));

    // Component-wise, unlike a "starts with .." string test: "/..hidden"
    // names a file inside the root and is served.
    if resolved.strip_prefix(root).is_err() {
        return Err(ParseError::PathEscape(target.to_string()));
    }
    Ok(resolved)
}
