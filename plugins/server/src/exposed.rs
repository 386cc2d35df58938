//! Discovery of the actions a controller file exposes

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn action_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Top-level `def name():` without arguments
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^def\s+([a-zA-Z0-9]\w*)\(\s*\)\s*:").expect("valid action pattern")
    })
}

/// Controller name for files under `controllers/`, e.g. `default` for `controllers/default.py`
pub fn controller_name(relative_path: &str) -> Option<String> {
    let path = Path::new(relative_path.trim_start_matches('/'));
    let mut components = path.components();
    let first = components.next()?.as_os_str();
    if first != "controllers" || components.count() != 1 {
        return None;
    }
    if path.extension()? != "py" {
        return None;
    }
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

/// Names of the exposed actions, in source order. Names starting with `_` are private.
pub fn find_exposed_functions(source: &str) -> Vec<String> {
    action_pattern()
        .captures_iter(source)
        .map(|captures| captures[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_name() {
        assert_eq!(
            controller_name("controllers/default.py"),
            Some("default".to_string())
        );
        assert_eq!(controller_name("/controllers/appadmin.py"), Some("appadmin".to_string()));
        assert_eq!(controller_name("models/db.py"), None);
        assert_eq!(controller_name("controllers/sub/x.py"), None);
        assert_eq!(controller_name("controllers/readme.txt"), None);
    }

    #[test]
    fn test_find_exposed_functions() {
        let source = "\
def index():
    return dict()

def user( ):
    return dict(form=auth())

def _private():
    pass

def download(name):
    pass

class Thing:
    def method():
        pass
";
        assert_eq!(find_exposed_functions(source), vec!["index", "user"]);
        assert!(find_exposed_functions("x = 1\n").is_empty());
    }
}
