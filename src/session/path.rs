//! Remote path resolution for `cd` arguments.
//!
//! Nothing here touches a filesystem: the remote side is authoritative for
//! anything beyond `~`, `.` and `..`.

use crate::error::{Result, SessionError};

/// Compute the next remote path for a `cd` argument.
///
/// `~` maps to the home directory, `.` keeps `current`, `..` takes the parent
/// of `current`. Any other argument is returned verbatim for the backend to
/// resolve.
pub fn resolve(current: &str, home: Option<&str>, arg: &str) -> Result<String> {
    match arg {
        "~" => home
            .map(str::to_string)
            .ok_or(SessionError::UnresolvedHome),
        "." => Ok(current.to_string()),
        ".." => Ok(parent(current)),
        other => Ok(other.to_string()),
    }
}

/// Parent of a remote path. The root is its own parent.
pub fn parent(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') {
            "/".to_string()
        } else {
            ".".to_string()
        };
    }

    match trimmed.rfind('/') {
        Some(idx) => {
            let head = trimmed[..idx].trim_end_matches('/');
            if head.is_empty() {
                "/".to_string()
            } else {
                head.to_string()
            }
        }
        None => ".".to_string(),
    }
}

/// Join a child name onto a remote directory.
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Render `path` for the prompt, abbreviating the home prefix as `~`.
pub fn abbreviate_home(path: &str, home: Option<&str>) -> String {
    match home {
        Some(home) if !home.is_empty() && home != "/" => match path.strip_prefix(home) {
            Some("") => "~".to_string(),
            Some(rest) if rest.starts_with('/') => format!("~{}", rest),
            _ => path.to_string(),
        },
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tilde_resolves_to_home() {
        for home in ["/home/bob", "/", "/srv/data/"] {
            assert_eq!(resolve("/tmp", Some(home), "~").unwrap(), home);
        }
    }

    #[test]
    fn test_tilde_without_home_fails() {
        let err = resolve("/tmp", None, "~").unwrap_err();
        assert!(matches!(err, SessionError::UnresolvedHome));
    }

    #[test]
    fn test_dot_keeps_current() {
        assert_eq!(resolve("/var/log", Some("/home/bob"), ".").unwrap(), "/var/log");
    }

    #[test]
    fn test_dotdot_takes_parent() {
        assert_eq!(resolve("/a/b", Some("/h"), "..").unwrap(), "/a");
        assert_eq!(resolve("/a/b/", Some("/h"), "..").unwrap(), "/a");
        assert_eq!(resolve("/a", Some("/h"), "..").unwrap(), "/");
    }

    #[test]
    fn test_dotdot_is_idempotent_at_root() {
        assert_eq!(resolve("/", None, "..").unwrap(), "/");
        assert_eq!(resolve("///", None, "..").unwrap(), "/");
    }

    #[test]
    fn test_other_arguments_are_forwarded_verbatim() {
        assert_eq!(resolve("/home/bob", Some("/home/bob"), "/tmp").unwrap(), "/tmp");
        assert_eq!(resolve("/home/bob", Some("/home/bob"), "src/lib").unwrap(), "src/lib");
        assert_eq!(resolve("/home/bob", None, "~/docs").unwrap(), "~/docs");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let first = resolve("/x/y/z", Some("/h"), "..").unwrap();
        let second = resolve("/x/y/z", Some("/h"), "..").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parent_of_relative_and_doubled_separators() {
        assert_eq!(parent("docs"), ".");
        assert_eq!(parent("a/b"), "a");
        assert_eq!(parent("/a//b"), "/a");
        assert_eq!(parent(""), ".");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "etc"), "/etc");
        assert_eq!(join("/home/bob", "a.txt"), "/home/bob/a.txt");
    }

    #[test]
    fn test_abbreviate_home() {
        let home = Some("/home/bob");
        assert_eq!(abbreviate_home("/home/bob", home), "~");
        assert_eq!(abbreviate_home("/home/bob/src", home), "~/src");
        assert_eq!(abbreviate_home("/home/bobby", home), "/home/bobby");
        assert_eq!(abbreviate_home("/etc", home), "/etc");
        assert_eq!(abbreviate_home("/etc", None), "/etc");
    }
}
