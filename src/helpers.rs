use std::path::{Path, PathBuf};

/// Sanitizes a client supplied argument: strips control characters that
/// would let a client smuggle a second command into a reply line.
pub fn sanitize_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Resolves `arg` against the virtual working directory `cwd`.
///
/// The result is always an absolute virtual path. `..` never climbs above
/// `/`, so the returned path cannot escape the server root once joined
/// with [`physical_path`].
pub fn resolve_virtual_path(cwd: &str, arg: &str) -> String {
    let arg = sanitize_input(arg).replace('\\', "/");
    let joined = if arg.starts_with('/') {
        arg
    } else {
        format!("{}/{}", cwd.trim_end_matches('/'), arg)
    };

    let mut parts: Vec<&str> = Vec::new();
    for component in joined.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    format!("/{}", parts.join("/"))
}

/// Maps a virtual path onto the filesystem below `root`.
pub fn physical_path(root: &Path, virtual_path: &str) -> PathBuf {
    let relative = virtual_path.trim_start_matches('/');
    if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    }
}

/// Last component of a virtual path, used in replies.
pub fn file_name(virtual_path: &str) -> &str {
    virtual_path
        .rsplit('/')
        .find(|part| !part.is_empty())
        .unwrap_or("/")
}
