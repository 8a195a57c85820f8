//! Offline import extraction with regular expressions.

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;

use super::{ImportScanner, is_relative};

/// Recognizes `import "path"`, `import alias "path"` and grouped `import ( ... )` blocks.
///
/// Line comments are removed first; block comments and imports spread over unusual layouts
/// are not handled.
#[derive(Debug, Clone)]
pub struct RegexImportScanner {
    line_comment: Regex,
    block: Regex,
    block_entry: Regex,
    single: Regex,
}

impl RegexImportScanner {
    /// Compiles the expressions.
    pub fn new() -> Result<Self> {
        Ok(Self {
            line_comment: Regex::new(r"(?m)//.*$")?,
            block: Regex::new(r"(?m)(?:^|;)\s*import\s*\(([^)]*)\)")?,
            block_entry: Regex::new(r#"(?:[\w.]+\s+)?"([^"]+)""#)?,
            single: Regex::new(r#"(?m)(?:^|;)\s*import\s+(?:[\w.]+\s+)?"([^"]+)""#)?,
        })
    }

    /// Import paths of one source text.
    pub fn scan_source(&self, source: &str) -> BTreeSet<String> {
        let source = self.line_comment.replace_all(source, "");
        let mut imports = BTreeSet::new();

        for block in self.block.captures_iter(&source) {
            if let Some(body) = block.get(1) {
                imports.extend(
                    self.block_entry
                        .captures_iter(body.as_str())
                        .filter_map(|entry| entry.get(1).map(|m| m.as_str().to_string())),
                );
            }
        }
        imports.extend(
            self.single
                .captures_iter(&source)
                .filter_map(|single| single.get(1).map(|m| m.as_str().to_string())),
        );

        imports.retain(|import| !is_relative(import));
        imports
    }
}

#[async_trait]
impl ImportScanner for RegexImportScanner {
    async fn scan_file(&self, file: &Path) -> Result<BTreeSet<String>> {
        let source = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        Ok(self.scan_source(&source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<String> {
        RegexImportScanner::new().unwrap().scan_source(source).into_iter().collect()
    }

    #[test]
    fn test_block_form() {
        assert_eq!(scan("import (\n\t\"fmt\"\n\t\"github.com/x/y\"\n)"), ["fmt", "github.com/x/y"]);
    }

    #[test]
    fn test_single_form() {
        assert_eq!(scan("import \"github.com/x/y\""), ["github.com/x/y"]);
    }

    #[test]
    fn test_aliases_and_blank_imports() {
        let source = r#"package main

import (
    yaml "gopkg.in/yaml.v2"
    _ "github.com/lib/pq"
    . "github.com/onsi/gomega"
    "os"
)

import errs "github.com/pkg/errors"
"#;
        assert_eq!(
            scan(source),
            ["github.com/lib/pq", "github.com/onsi/gomega", "github.com/pkg/errors", "gopkg.in/yaml.v2", "os"]
        );
    }

    #[test]
    fn test_commented_imports_are_ignored() {
        let source = "import (\n\t\"fmt\"\n\t// \"github.com/old/dep\"\n)\n// import \"github.com/gone\"\n";
        assert_eq!(scan(source), ["fmt"]);
    }

    #[test]
    fn test_relative_imports_are_dropped_and_duplicates_merged() {
        let source = "import \"./local\"\nimport \"../up\"\nimport \"fmt\"\nimport f \"fmt\"\n";
        assert_eq!(scan(source), ["fmt"]);
    }

    #[test]
    fn test_strings_outside_imports_are_ignored() {
        let source = "package main\n\nimport \"fmt\"\n\nfunc main() { fmt.Println(\"github.com/not/an/import\") }\n";
        assert_eq!(scan(source), ["fmt"]);
    }

    #[tokio::test]
    async fn test_scan_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("main.go");
        std::fs::write(&file, "package main\nimport \"github.com/x/y\"\n").unwrap();
        let imports = RegexImportScanner::new().unwrap().scan_file(&file).await.unwrap();
        assert!(imports.contains("github.com/x/y"));
    }
}
