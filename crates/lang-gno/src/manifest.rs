//! Reader for `gno.mod`, the per-directory package manifest.
//!
//! The syntax is the go.mod line syntax: one directive per line, or a
//! parenthesized block of entries for `require` and `replace`. Only the
//! parts the driver needs are kept.

use crate::error::ManifestError;
use gnodriver_plugin::ManifestInfo;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

pub const MANIFEST_FILE: &str = "gno.mod";

static PATH_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._~+-]+$").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub old_path: String,
    pub old_version: Option<String>,
    pub new_path: String,
    pub new_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GnoMod {
    pub module: Option<String>,
    pub draft: bool,
    pub gno_version: Option<String>,
    pub requires: Vec<Requirement>,
    pub replaces: Vec<Replacement>,
}

#[derive(Clone, Copy)]
enum Block {
    Require,
    Replace,
}

impl GnoMod {
    /// Parse, sanitize and validate in one go.
    pub fn read(path: &Path, data: &str) -> Result<Self, ManifestError> {
        let mut gno_mod = Self::parse(path, data)?;
        gno_mod.sanitize();
        gno_mod.validate(path)?;
        Ok(gno_mod)
    }

    pub fn parse(path: &Path, data: &str) -> Result<Self, ManifestError> {
        let mut gno_mod = GnoMod::default();
        let mut block: Option<(Block, usize)> = None;
        let mut draft_comment = false;

        for (idx, raw_line) in data.lines().enumerate() {
            let line_no = idx + 1;
            let err = |msg: String| ManifestError::Parse {
                path: path.display().to_string(),
                line: line_no,
                msg,
            };

            let (tokens, comment) = tokenize(raw_line).map_err(err)?;
            if tokens.is_empty() {
                if comment.is_some_and(|c| c.trim() == "Draft") && gno_mod.module.is_none() {
                    draft_comment = true;
                }
                continue;
            }

            if let Some((kind, _)) = block {
                if tokens.len() == 1 && tokens[0] == ")" {
                    block = None;
                    continue;
                }
                match kind {
                    Block::Require => gno_mod.requires.push(parse_require(&tokens).map_err(err)?),
                    Block::Replace => gno_mod.replaces.push(parse_replace(&tokens).map_err(err)?),
                }
                continue;
            }

            let (verb, args) = (tokens[0].as_str(), &tokens[1..]);
            match verb {
                "module" => {
                    if gno_mod.module.is_some() {
                        return Err(err("repeated module statement".to_string()));
                    }
                    let [module] = args else {
                        return Err(err("usage: module module/path".to_string()));
                    };
                    gno_mod.module = Some(module.clone());
                    gno_mod.draft = draft_comment;
                }
                "gno" | "go" => {
                    let [version] = args else {
                        return Err(err(format!("usage: {verb} 1.23")));
                    };
                    gno_mod.gno_version = Some(version.clone());
                }
                "require" | "replace" => {
                    let kind = if verb == "require" {
                        Block::Require
                    } else {
                        Block::Replace
                    };
                    if args.len() == 1 && args[0] == "(" {
                        block = Some((kind, line_no));
                        continue;
                    }
                    match kind {
                        Block::Require => gno_mod.requires.push(parse_require(args).map_err(err)?),
                        Block::Replace => gno_mod.replaces.push(parse_replace(args).map_err(err)?),
                    }
                }
                other => return Err(err(format!("unknown directive: {other}"))),
            }
        }

        if let Some((_, opened_at)) = block {
            return Err(ManifestError::Parse {
                path: path.display().to_string(),
                line: opened_at,
                msg: "unterminated block".to_string(),
            });
        }

        Ok(gno_mod)
    }

    /// Normalize the parsed contents: trim paths, collapse repeated
    /// requirements onto their last version and drop no-op entries.
    pub fn sanitize(&mut self) {
        if let Some(module) = self.module.as_mut() {
            *module = module.trim().to_string();
        }

        let mut requires: Vec<Requirement> = Vec::with_capacity(self.requires.len());
        for req in self.requires.drain(..) {
            let path = req.path.trim().to_string();
            let version = req.version.trim().to_string();
            if path.is_empty() || self.module.as_deref() == Some(path.as_str()) {
                continue;
            }
            match requires.iter_mut().find(|r| r.path == path) {
                Some(existing) => existing.version = version,
                None => requires.push(Requirement { path, version }),
            }
        }
        self.requires = requires;

        self.replaces
            .retain(|r| !(r.old_path == r.new_path && r.old_version == r.new_version));
    }

    pub fn validate(&self, path: &Path) -> Result<(), ManifestError> {
        let invalid = |msg: String| ManifestError::Invalid {
            path: path.display().to_string(),
            msg,
        };

        let module = self
            .module
            .as_deref()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| invalid("requires a module statement".to_string()))?;
        check_module_path(module).map_err(|e| invalid(format!("module {module:?}: {e}")))?;

        for req in &self.requires {
            check_module_path(&req.path)
                .map_err(|e| invalid(format!("require {:?}: {e}", req.path)))?;
            if req.version.is_empty() {
                return Err(invalid(format!("require {:?}: missing version", req.path)));
            }
        }

        for rep in &self.replaces {
            check_module_path(&rep.old_path)
                .map_err(|e| invalid(format!("replace {:?}: {e}", rep.old_path)))?;
            if !is_local_path(&rep.new_path) {
                check_module_path(&rep.new_path)
                    .map_err(|e| invalid(format!("replace {:?}: {e}", rep.new_path)))?;
                if rep.new_version.is_none() {
                    return Err(invalid(format!(
                        "replace {:?}: module replacement needs a version",
                        rep.new_path
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn module_path(&self) -> &str {
        self.module.as_deref().unwrap_or_default()
    }

    pub fn info(&self) -> ManifestInfo {
        ManifestInfo {
            module_path: self.module_path().to_string(),
            draft: self.draft,
            requires: self.requires.iter().map(|r| r.path.clone()).collect(),
        }
    }
}

fn check_module_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("empty path".to_string());
    }
    for elem in path.split('/') {
        if elem.is_empty() {
            return Err("empty path element".to_string());
        }
        if elem == "." || elem == ".." {
            return Err(format!("invalid path element {elem:?}"));
        }
        if elem.ends_with('.') {
            return Err(format!("trailing dot in path element {elem:?}"));
        }
        if !PATH_ELEMENT.is_match(elem) {
            return Err(format!("invalid char in path element {elem:?}"));
        }
    }
    Ok(())
}

fn is_local_path(path: &str) -> bool {
    path.starts_with("./") || path.starts_with("../") || path.starts_with('/')
}

fn parse_require(args: &[String]) -> Result<Requirement, String> {
    match args {
        [path, version] => Ok(Requirement {
            path: path.clone(),
            version: version.clone(),
        }),
        _ => Err("usage: require module/path v1.2.3".to_string()),
    }
}

fn parse_replace(args: &[String]) -> Result<Replacement, String> {
    const USAGE: &str = "usage: replace module/path [v1.2.3] => other/module v1.4\n\t or replace module/path [v1.2.3] => ../local/directory";

    let arrow = args
        .iter()
        .position(|t| t == "=>")
        .ok_or_else(|| USAGE.to_string())?;
    let (old, new) = (&args[..arrow], &args[arrow + 1..]);

    let (old_path, old_version) = match old {
        [path] => (path.clone(), None),
        [path, version] => (path.clone(), Some(version.clone())),
        _ => return Err(USAGE.to_string()),
    };
    let (new_path, new_version) = match new {
        [path] => (path.clone(), None),
        [path, version] => (path.clone(), Some(version.clone())),
        _ => return Err(USAGE.to_string()),
    };

    Ok(Replacement {
        old_path,
        old_version,
        new_path,
        new_version,
    })
}

/// Split one line into tokens and its trailing `//` comment, if any.
///
/// Double-quoted and back-quoted strings form a single token with the
/// quotes removed. Parentheses are tokens of their own.
fn tokenize(line: &str) -> Result<(Vec<String>, Option<&str>), String> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' if line[start..].starts_with("//") => {
                return Ok((tokens, Some(&line[start + 2..])));
            }
            '(' | ')' => {
                tokens.push(c.to_string());
                chars.next();
            }
            '"' | '`' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, ch)) = chars.next() {
                    if ch == c {
                        closed = true;
                        break;
                    }
                    if ch == '\\' && c == '"' {
                        match chars.next() {
                            Some((_, escaped)) => text.push(escaped),
                            None => break,
                        }
                        continue;
                    }
                    text.push(ch);
                }
                if !closed {
                    return Err("unterminated quoted string".to_string());
                }
                tokens.push(text);
            }
            _ => {
                let mut end = line.len();
                while let Some(&(idx, ch)) = chars.peek() {
                    if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' || ch == '`' {
                        end = idx;
                        break;
                    }
                    if line[idx..].starts_with("//") {
                        end = idx;
                        break;
                    }
                    chars.next();
                }
                tokens.push(line[start..end].to_string());
            }
        }
    }

    Ok((tokens, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(data: &str) -> Result<GnoMod, ManifestError> {
        GnoMod::read(Path::new("/work/gno.mod"), data)
    }

    #[test]
    fn test_full_manifest() {
        let gno_mod = read(
            r#"// Draft

module gno.land/p/demo/foo // trailing comment

gno 0.9

require (
    gno.land/p/demo/avl v0.0.0-latest
    "gno.land/p/demo/ufmt" v0.0.0-latest
)

replace gno.land/p/demo/old => gno.land/p/demo/new v0.0.0-latest
replace gno.land/p/demo/local => ../local
"#,
        )
        .unwrap();

        assert_eq!(gno_mod.module_path(), "gno.land/p/demo/foo");
        assert!(gno_mod.draft);
        assert_eq!(gno_mod.gno_version.as_deref(), Some("0.9"));
        assert_eq!(gno_mod.requires.len(), 2);
        assert_eq!(gno_mod.requires[1].path, "gno.land/p/demo/ufmt");
        assert_eq!(gno_mod.replaces.len(), 2);
        assert_eq!(gno_mod.replaces[1].new_path, "../local");

        let info = gno_mod.info();
        assert_eq!(info.module_path, "gno.land/p/demo/foo");
        assert_eq!(
            info.requires,
            vec!["gno.land/p/demo/avl", "gno.land/p/demo/ufmt"]
        );
    }

    #[test]
    fn test_draft_only_before_module() {
        let gno_mod = read("module gno.land/r/demo/x\n// Draft\n").unwrap();
        assert!(!gno_mod.draft);

        let gno_mod = read("module \"gno.land/r/demo/x\"\n").unwrap();
        assert_eq!(gno_mod.module_path(), "gno.land/r/demo/x");
        assert!(!gno_mod.draft);
    }

    #[test]
    fn test_sanitize_requires() {
        let gno_mod = read(
            "module gno.land/p/demo/a\nrequire gno.land/p/demo/b v1\nrequire gno.land/p/demo/a v1\nrequire gno.land/p/demo/b v2\nreplace gno.land/p/demo/c => gno.land/p/demo/c\n",
        )
        .unwrap();
        assert_eq!(
            gno_mod.requires,
            vec![Requirement {
                path: "gno.land/p/demo/b".to_string(),
                version: "v2".to_string(),
            }]
        );
        assert!(gno_mod.replaces.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        let err = read("module a\nfrobnicate x\n").unwrap_err();
        assert_eq!(
            err,
            ManifestError::Parse {
                path: "/work/gno.mod".to_string(),
                line: 2,
                msg: "unknown directive: frobnicate".to_string(),
            }
        );

        assert!(matches!(
            read("module a\nrequire (\n  b v1\n"),
            Err(ManifestError::Parse { line: 2, .. })
        ));
        assert!(read("module \"unterminated\n").is_err());
        assert!(read("module a b\n").is_err());
        assert!(read("module a\nmodule b\n").is_err());
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(read(""), Err(ManifestError::Invalid { .. })));
        assert!(matches!(
            read("// just a comment\n"),
            Err(ManifestError::Invalid { .. })
        ));
        assert!(read("module gno.land/p/../x\n").is_err());
        assert!(read("module gno.land//x\n").is_err());
        assert!(read("module gno.land/p/x.\n").is_err());
        assert!(read("module gno.land/p/with space\n").is_err());
        assert!(read("module gno.land/p/x\nreplace gno.land/p/y => gno.land/p/z\n").is_err());
        assert!(read("module gno.land/p/ok-name_v2~1+x\n").is_ok());
    }
}
