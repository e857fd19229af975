//! Pure string path resolution for document relative references.
//!
//! Maps, tilesets and templates reference each other by relative path.
//! Resolution never touches the filesystem, so in-memory documents and
//! files behave the same, and the separator style of the authoring
//! platform is preserved only where it cannot be normalised away.

/// Whether `\` separators and drive letter prefixes are recognised.
const WINDOWS_SEPARATORS: bool = cfg!(windows);

/// Resolves `path` against `working_dir`.
///
/// Separators are normalised to `/`, empty and `.` components dropped and
/// `X/..` pairs collapsed left to right. `..` components that cannot be
/// resolved are preserved. If `path` is absolute, `working_dir` is
/// ignored; if only `working_dir` is absolute its prefix carries over.
pub fn resolve(path: &str, working_dir: &str) -> String {
    resolve_with(path, working_dir, WINDOWS_SEPARATORS)
}

/// Returns the absolute prefix of `path` (`"/"` or a drive like `"C:/"`),
/// or `None` when the path is relative.
pub fn absolute_prefix(path: &str) -> Option<String> {
    absolute_prefix_with(path, WINDOWS_SEPARATORS)
}

/// Returns the directory portion of `path`, up to and including the last
/// separator, or an empty string when there is none.
pub fn dirname(path: &str) -> String {
    dirname_with(path, WINDOWS_SEPARATORS)
}

fn resolve_with(path: &str, working_dir: &str, windows: bool) -> String {
    let path = normalise(path, windows);
    let dir = normalise(working_dir, windows);

    let mut parts: Vec<&str> = Vec::new();
    let prefix;
    if let Some(p) = prefix_of(&path) {
        prefix = p;
        push_parts(&mut parts, &path[p.len()..]);
    } else if let Some(p) = prefix_of(&dir) {
        prefix = p;
        push_parts(&mut parts, &dir[p.len()..]);
        push_parts(&mut parts, &path);
    } else {
        prefix = "";
        push_parts(&mut parts, &dir);
        push_parts(&mut parts, &path);
    }

    // Collapse X/.. pairs, re-checking the element before each collapse
    // so chains like a/b/../../c resolve fully.
    let mut i = 0;
    while i + 1 < parts.len() {
        if parts[i] != ".." && parts[i + 1] == ".." {
            parts.drain(i..=i + 1);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }

    format!("{}{}", prefix, parts.join("/"))
}

fn absolute_prefix_with(path: &str, windows: bool) -> Option<String> {
    let path = normalise(path, windows);
    prefix_of(&path).map(str::to_owned)
}

fn dirname_with(path: &str, windows: bool) -> String {
    if windows {
        if let Some(i) = path.rfind('\\') {
            return path[..=i].to_owned();
        }
    }
    match path.rfind('/') {
        Some(i) => path[..=i].to_owned(),
        None => String::new(),
    }
}

fn normalise(s: &str, windows: bool) -> String {
    if windows {
        s.replace('\\', "/")
    } else {
        s.to_owned()
    }
}

// Expects separators already normalised.
fn prefix_of(path: &str) -> Option<&str> {
    if path.starts_with('/') {
        return Some(&path[..1]);
    }
    let b = path.as_bytes();
    if b.len() >= 3 && b[0].is_ascii_alphabetic() && b[1] == b':' && b[2] == b'/' {
        return Some(&path[..3]);
    }
    None
}

fn push_parts<'a>(parts: &mut Vec<&'a str>, s: &'a str) {
    for part in s.split('/') {
        if !part.is_empty() && part != "." {
            parts.push(part);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_path_to_working_dir() {
        assert_eq!(resolve_with("a/b/c", "A/B/C", true), "A/B/C/a/b/c");
    }

    #[test]
    fn collapses_parent_references() {
        assert_eq!(resolve_with("../a/b/c", "A/B/C", true), "A/B/a/b/c");
        assert_eq!(resolve_with("x/../y", "A", true), "A/y");
    }

    #[test]
    fn keeps_unresolvable_parent_references() {
        assert_eq!(resolve_with("../../../../a/b/c", "A/B/C", true), "../a/b/c");
    }

    #[test]
    fn absolute_path_ignores_working_dir() {
        assert_eq!(resolve_with("/a/b/c", "A/B/C", true), "/a/b/c");
    }

    #[test]
    fn keeps_drive_prefix_while_collapsing() {
        assert_eq!(resolve_with("C:/a/../b/c", "A/B/C", true), "C:/b/c");
        assert_eq!(resolve_with("C:\\a\\..\\b\\c", "A/B/C", true), "C:/b/c");
    }

    #[test]
    fn drops_empty_and_dot_components() {
        assert_eq!(resolve_with("a///b//c", "A//B///C", true), "A/B/C/a/b/c");
        assert_eq!(resolve_with("./a/./b", "A/.", true), "A/a/b");
    }

    #[test]
    fn absolute_working_dir_prefixes_relative_path() {
        assert_eq!(resolve_with("../x", "/A/B", true), "/A/x");
    }

    #[test]
    fn recognises_absolute_prefixes() {
        assert_eq!(absolute_prefix_with("/a/b", true).as_deref(), Some("/"));
        assert_eq!(absolute_prefix_with("\\a\\b", true).as_deref(), Some("/"));
        assert_eq!(absolute_prefix_with("c:\\maps", true).as_deref(), Some("c:/"));
        assert_eq!(absolute_prefix_with("D:/maps", true).as_deref(), Some("D:/"));
        assert_eq!(absolute_prefix_with("a/b", true), None);
        assert_eq!(absolute_prefix_with("C:", true), None);
    }

    #[test]
    fn backslashes_are_plain_characters_without_windows_handling() {
        assert_eq!(resolve_with("a\\b", "X", false), "X/a\\b");
        assert_eq!(absolute_prefix_with("\\a", false), None);
    }

    #[test]
    fn dirname_keeps_trailing_separator() {
        assert_eq!(dirname_with("maps/town.tmx", true), "maps/");
        assert_eq!(dirname_with("a/b/c.tsx", true), "a/b/");
        assert_eq!(dirname_with("town.tmx", true), "");
        assert_eq!(dirname_with("maps\\town.tmx", true), "maps\\");
        assert_eq!(dirname_with("maps\\sub/town.tmx", true), "maps\\");
    }
}
