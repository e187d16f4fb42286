//! Example index and selector
//!
//! The [`Scanner`] indexes every example under `"{language}:{sdk_version}:{service}"`
//! once, then splits the examples of one selected triple into the sections
//! of a README page.

use docgen_common::ToolConfig;
use docgen_parser::categories::{ACTIONS, BASICS, HELLO, KNOWN_CATEGORIES, SCENARIOS};
use docgen_parser::{DocGen, Example};
use docgen_snippets::SnippetIndex;
use std::collections::BTreeMap;
use tracing::warn;

/// Examples of one selection, split by README section
///
/// Every selected example lands in exactly one bucket.
#[derive(Debug, Clone, Default)]
pub struct Buckets<'a> {
    pub hello: Vec<&'a Example>,
    pub actions: Vec<&'a Example>,
    pub basics: Vec<&'a Example>,
    pub scenarios: Vec<&'a Example>,
    pub customs: Vec<&'a Example>,
    pub crosses: Vec<&'a Example>,
    pub cross_scenarios: Vec<&'a Example>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    service: String,
    language: String,
    sdk_version: u32,
}

pub struct Scanner<'a> {
    doc_gen: &'a DocGen,
    config: &'a ToolConfig,
    snippets: Option<&'a SnippetIndex>,
    index: BTreeMap<String, Vec<&'a Example>>,
    selection: Option<Selection>,
    buckets: Buckets<'a>,
}

pub fn example_key(language: &str, sdk_version: u32, service: &str) -> String {
    format!("{language}:{sdk_version}:{service}")
}

impl<'a> Scanner<'a> {
    pub fn new(
        doc_gen: &'a DocGen,
        config: &'a ToolConfig,
        snippets: Option<&'a SnippetIndex>,
    ) -> Self {
        let mut index: BTreeMap<String, Vec<&'a Example>> = BTreeMap::new();

        for example in doc_gen.examples.values() {
            for (language, lang) in &example.languages {
                for version in &lang.versions {
                    let services = example.services.keys().chain(version.add_services.keys());
                    for service in services {
                        let examples = index
                            .entry(example_key(language, version.sdk_version, service))
                            .or_default();
                        if !examples.iter().any(|e| e.id == example.id) {
                            examples.push(example);
                        }
                    }
                }
            }
        }

        Self {
            doc_gen,
            config,
            snippets,
            index,
            selection: None,
            buckets: Buckets::default(),
        }
    }

    pub fn doc_gen(&self) -> &'a DocGen {
        self.doc_gen
    }

    /// Examples indexed for one triple, in id order
    pub fn examples(&self, language: &str, sdk_version: u32, service: &str) -> &[&'a Example] {
        self.index
            .get(&example_key(language, sdk_version, service))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Select a triple and split its examples into buckets
    ///
    /// Cross-service ids go to the cross buckets whatever their category,
    /// then Hello, Actions, Basics and Scenarios are matched in that order.
    /// Any other category is custom.
    pub fn set_example(&mut self, service: &str, language: &str, sdk_version: u32) -> &Buckets<'a> {
        let mut buckets = Buckets::default();

        for &example in self.examples(language, sdk_version, service) {
            let category = example.category.as_str();
            if example.is_cross_service() {
                if category == SCENARIOS {
                    buckets.cross_scenarios.push(example);
                } else {
                    buckets.crosses.push(example);
                }
            } else if category == HELLO {
                buckets.hello.push(example);
            } else if category == ACTIONS {
                buckets.actions.push(example);
            } else if category == BASICS {
                buckets.basics.push(example);
            } else if category == SCENARIOS {
                buckets.scenarios.push(example);
            } else if !KNOWN_CATEGORIES.contains(&category) {
                buckets.customs.push(example);
            }
        }

        self.selection = Some(Selection {
            service: service.to_string(),
            language: language.to_string(),
            sdk_version,
        });
        self.buckets = buckets;
        &self.buckets
    }

    /// Selected language and SDK version
    pub fn selection(&self) -> Option<(&str, u32)> {
        self.selection
            .as_ref()
            .map(|s| (s.language.as_str(), s.sdk_version))
    }

    /// Relative link to an example's code from the README in `readme_folder`
    ///
    /// Excerpt tags are sorted and the first containing `api_name` wins,
    /// else the first tag; it links to `"{path}#L{line}"`. Examples without
    /// excerpts link to their `github` folder, and cross-service examples to
    /// `../cross-services/{name}`. The result depends only on its inputs.
    pub fn snippet(&self, example: &Example, readme_folder: &str, api_name: &str) -> Option<String> {
        let selection = self.selection.as_ref()?;
        let version = example.version(&selection.language, selection.sdk_version)?;

        let mut tags: Vec<&str> = version.snippet_tags().collect();
        if !tags.is_empty() {
            tags.sort_unstable();
            let tag = tags
                .iter()
                .find(|tag| !api_name.is_empty() && tag.contains(api_name))
                .unwrap_or(&tags[0]);

            return match self.snippets.and_then(|index| index.get(tag)) {
                Some(snippet) => Some(format!(
                    "{}#L{}",
                    relative_path(readme_folder, &snippet.file),
                    snippet.line_start
                )),
                None => {
                    warn!("Snippet tag {} of {} is not in the snippet index", tag, example.id);
                    None
                }
            };
        }

        if version.block_content.is_some() {
            let github = version.github.as_deref()?.trim_end_matches('/');
            if example.is_cross_service() {
                let base = self
                    .config
                    .language(&selection.language, selection.sdk_version)
                    .map(|cfg| cfg.base_folder.as_str())
                    .unwrap_or("");
                let rest = github
                    .strip_prefix(base)
                    .unwrap_or(github)
                    .trim_start_matches('/');
                let name = rest.rsplit('/').next().filter(|n| !n.is_empty())?;
                return Some(format!("../cross-services/{name}"));
            }
            return Some(relative_path(readme_folder, github));
        }

        None
    }
}

/// Path of `target` as seen from the folder `from`, both relative to the same root
pub fn relative_path(from: &str, target: &str) -> String {
    let from: Vec<&str> = from.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    let target: Vec<&str> = target.split('/').filter(|s| !s.is_empty() && *s != ".").collect();

    let common = from
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&target[common..]);
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgen_parser::{Excerpt, Language, Version};
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn example(id: &str, category: &str, version: Version) -> Example {
        Example {
            id: id.to_string(),
            file: "s3_metadata.yaml".to_string(),
            category: category.to_string(),
            languages: BTreeMap::from([(
                "Go".to_string(),
                Language {
                    name: "Go".to_string(),
                    property: "go".to_string(),
                    versions: vec![version],
                },
            )]),
            services: BTreeMap::from([("s3".to_string(), BTreeSet::from(["CreateBucket".to_string()]))]),
            ..Example::default()
        }
    }

    fn block(github: &str) -> Version {
        Version {
            sdk_version: 2,
            block_content: Some("block.xml".to_string()),
            github: Some(github.to_string()),
            ..Version::default()
        }
    }

    fn tagged(tags: &[&str]) -> Version {
        Version {
            sdk_version: 2,
            excerpts: vec![Excerpt {
                snippet_tags: tags.iter().map(|t| t.to_string()).collect(),
                ..Excerpt::default()
            }],
            ..Version::default()
        }
    }

    fn doc_gen(examples: Vec<Example>) -> DocGen {
        DocGen {
            examples: examples.into_iter().map(|e| (e.id.clone(), e)).collect(),
            ..DocGen::default()
        }
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("gov2/s3", "gov2/s3/actions/bucket.go"), "actions/bucket.go");
        assert_eq!(relative_path("gov2/s3", "gov2/workflows/x"), "../workflows/x");
        assert_eq!(relative_path("gov2/s3", "gov2/s3"), ".");
        assert_eq!(relative_path("", "gov2/s3/main.go"), "gov2/s3/main.go");
    }

    #[test]
    fn test_cross_prefix_beats_category() {
        let doc_gen = doc_gen(vec![
            example("cross_foo", SCENARIOS, block("gov2/cross/foo")),
            example("cross_bar", HELLO, block("gov2/cross/bar")),
            example("s3_Hello", HELLO, block("gov2/s3")),
            example("s3_Scenario", SCENARIOS, block("gov2/s3")),
            example("s3_Custom", "Serverless", block("gov2/s3")),
            example("s3_CreateBucket", ACTIONS, block("gov2/s3")),
        ]);
        let config = ToolConfig::default();
        let mut scanner = Scanner::new(&doc_gen, &config, None);
        let buckets = scanner.set_example("s3", "Go", 2);

        let ids = |examples: &[&Example]| examples.iter().map(|e| e.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&buckets.cross_scenarios), vec!["cross_foo"]);
        assert_eq!(ids(&buckets.crosses), vec!["cross_bar"]);
        assert_eq!(ids(&buckets.hello), vec!["s3_Hello"]);
        assert_eq!(ids(&buckets.scenarios), vec!["s3_Scenario"]);
        assert_eq!(ids(&buckets.customs), vec!["s3_Custom"]);
        assert_eq!(ids(&buckets.actions), vec!["s3_CreateBucket"]);
        assert!(buckets.basics.is_empty());
    }

    #[test]
    fn test_add_services_index_under_both_services() {
        let mut version = block("gov2/s3");
        version.add_services = BTreeMap::from([("sqs".to_string(), BTreeSet::new())]);
        let doc_gen = doc_gen(vec![example("s3_Notify", SCENARIOS, version)]);
        let config = ToolConfig::default();
        let scanner = Scanner::new(&doc_gen, &config, None);

        assert_eq!(scanner.examples("Go", 2, "s3").len(), 1);
        assert_eq!(scanner.examples("Go", 2, "sqs").len(), 1);
        assert!(scanner.examples("Go", 1, "s3").is_empty());
    }

    #[test]
    fn test_block_content_links() {
        let doc_gen = doc_gen(vec![
            example("cross_Messaging", SCENARIOS, block("gov2/workflows/message_processing/")),
            example("s3_Scenario", SCENARIOS, block("gov2/s3/scenarios")),
        ]);
        let config = ToolConfig::default();
        let mut scanner = Scanner::new(&doc_gen, &config, None);
        scanner.set_example("s3", "Go", 2);

        let cross = doc_gen.example("cross_Messaging").unwrap();
        let local = doc_gen.example("s3_Scenario").unwrap();
        assert_eq!(
            scanner.snippet(cross, "gov2/s3", "").as_deref(),
            Some("../cross-services/message_processing")
        );
        assert_eq!(scanner.snippet(local, "gov2/s3", "").as_deref(), Some("scenarios"));
    }

    #[test]
    fn test_snippet_without_selection_or_index() {
        let doc_gen = doc_gen(vec![example("s3_CreateBucket", ACTIONS, tagged(&["gov2.s3.CreateBucket"]))]);
        let config = ToolConfig::default();
        let mut scanner = Scanner::new(&doc_gen, &config, None);
        let example = doc_gen.example("s3_CreateBucket").unwrap();

        assert_eq!(scanner.snippet(example, "gov2/s3", "CreateBucket"), None);
        scanner.set_example("s3", "Go", 2);
        assert_eq!(scanner.snippet(example, "gov2/s3", "CreateBucket"), None);
    }

    #[test]
    fn test_snippet_tags_are_sorted_before_fallback() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("gov2/s3")).unwrap();
        fs::write(
            dir.path().join("gov2/s3/z.go"),
            "// snippet-start:[gov2.s3.Z]\nz\n// snippet-end:[gov2.s3.Z]\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("gov2/s3/a.go"),
            "package s3\n\n// snippet-start:[gov2.s3.A]\na\n// snippet-end:[gov2.s3.A]\n",
        )
        .unwrap();
        let (index, errors) = SnippetIndex::build(dir.path(), &[]).unwrap();
        assert!(errors.is_empty(), "{errors}");

        let doc_gen = doc_gen(vec![example("s3_Both", ACTIONS, tagged(&["gov2.s3.Z", "gov2.s3.A"]))]);
        let config = ToolConfig::default();
        let mut scanner = Scanner::new(&doc_gen, &config, Some(&index));
        scanner.set_example("s3", "Go", 2);
        let example = doc_gen.example("s3_Both").unwrap();

        let first = scanner.snippet(example, "gov2/s3", "DeleteBucket");
        assert_eq!(first.as_deref(), Some("a.go#L3"));
        assert_eq!(scanner.snippet(example, "gov2/s3", "DeleteBucket"), first);
        assert_eq!(
            scanner.snippet(example, "gov2/s3", "Z").as_deref(),
            Some("z.go#L1")
        );
    }
}
