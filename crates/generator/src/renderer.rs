//! Per-language, per-service README rendering

use crate::scanner::Scanner;
use crate::templates;
use docgen_common::{DocGenError, LanguageConfig, Result, ToolConfig};
use docgen_parser::{Category, DocGen, Example, TemplateVars, TitleField};
use docgen_snippets::SnippetIndex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::{debug, info};

/// One (language, SDK version, service) page
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReadmeTarget {
    pub language: String,
    pub sdk_version: u32,
    pub service: String,
}

/// What happened to a README file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
    /// Check mode only: the file on disk differs from the rendered text
    Stale,
}

#[derive(Serialize)]
struct SdkContext {
    name: String,
    long: String,
    short: String,
    guide: String,
    api_ref_name: Option<String>,
}

#[derive(Serialize)]
struct ServiceContext {
    name: String,
    long: String,
    short: String,
    blurb: Option<String>,
    guide_url: Option<String>,
    guide_subtitle: String,
    api_ref: Option<String>,
}

#[derive(Debug, Serialize)]
struct Entry {
    id: String,
    title: String,
    title_abbrev: String,
    synopsis: String,
    action: String,
    link: Option<String>,
    api_link: Option<String>,
}

#[derive(Serialize)]
struct CustomGroup {
    display: String,
    entries: Vec<Entry>,
}

#[derive(Serialize)]
struct ReadmeContext {
    sdk: SdkContext,
    service: ServiceContext,
    base_folder: String,
    language_readme: String,
    hello: Vec<Entry>,
    basics: Vec<Entry>,
    actions: Vec<Entry>,
    scenarios: Vec<Entry>,
    customs: Vec<CustomGroup>,
    crosses: Vec<Entry>,
}

/// Renders README pages from a loaded [`DocGen`]
pub struct ReadmeRenderer<'a> {
    scanner: Scanner<'a>,
    config: &'a ToolConfig,
    tera: Tera,
}

impl<'a> ReadmeRenderer<'a> {
    /// Build a renderer; entity expansions come from the metadata, then the config
    pub fn new(
        doc_gen: &'a DocGen,
        config: &'a ToolConfig,
        snippets: Option<&'a SnippetIndex>,
    ) -> Result<Self> {
        let mut entities = doc_gen.entities();
        for (entity, expansion) in &config.entities {
            entities.insert(entity, expansion);
        }

        Ok(Self {
            scanner: Scanner::new(doc_gen, config, snippets),
            config,
            tera: templates::load_readme_templates(entities)?,
        })
    }

    /// Every configured page that has at least one example, in sorted order
    pub fn targets(&self) -> Vec<ReadmeTarget> {
        let doc_gen = self.scanner.doc_gen();
        let mut targets = Vec::new();
        for (language, sdk_version, _) in self.config.language_versions() {
            if doc_gen.sdk(language).and_then(|sdk| sdk.version(sdk_version)).is_none() {
                continue;
            }
            for service in doc_gen.services.keys() {
                if !self.scanner.examples(language, sdk_version, service).is_empty() {
                    targets.push(ReadmeTarget {
                        language: language.to_string(),
                        sdk_version,
                        service: service.clone(),
                    });
                }
            }
        }
        targets
    }

    /// Path of a page's README, relative to the corpus root
    pub fn readme_path(&self, target: &ReadmeTarget) -> Result<PathBuf> {
        let layout = self.layout(target)?;
        Ok(PathBuf::from(layout.service_folder(&target.service)).join(&layout.readme))
    }

    /// Render one README to a string
    pub fn render(&mut self, target: &ReadmeTarget) -> Result<String> {
        let layout = self.layout(target)?;
        let doc_gen = self.scanner.doc_gen();

        let sdk = doc_gen.sdk(&target.language).ok_or_else(|| {
            DocGenError::Generation(format!("Unknown language {}", target.language))
        })?;
        let sdk_version = sdk.version(target.sdk_version).ok_or_else(|| {
            DocGenError::Generation(format!(
                "{} has no SDK version {}",
                target.language, target.sdk_version
            ))
        })?;
        let service = doc_gen.service(&target.service).ok_or_else(|| {
            DocGenError::Generation(format!("Unknown service {}", target.service))
        })?;

        let readme_folder = layout.service_folder(&target.service);
        let buckets = self
            .scanner
            .set_example(&target.service, &target.language, target.sdk_version)
            .clone();

        let entries = |examples: &[&Example]| -> Vec<Entry> {
            examples
                .iter()
                .map(|example| self.entry(example, &target.service, &service.short, &readme_folder))
                .collect()
        };

        let mut actions = entries(&buckets.actions);
        actions.sort_by(|a, b| a.title_abbrev.cmp(&b.title_abbrev));

        let mut crosses = entries(&buckets.cross_scenarios);
        crosses.extend(entries(&buckets.crosses));
        crosses.sort_by(|a, b| a.title_abbrev.cmp(&b.title_abbrev));

        let mut customs: Vec<CustomGroup> = Vec::new();
        for example in &buckets.customs {
            let display = doc_gen
                .category(&example.category)
                .map(|c| c.display.clone())
                .unwrap_or_else(|| example.category.clone());
            let entry = self.entry(example, &target.service, &service.short, &readme_folder);
            match customs.iter_mut().find(|g| g.display == display) {
                Some(group) => group.entries.push(entry),
                None => customs.push(CustomGroup {
                    display,
                    entries: vec![entry],
                }),
            }
        }
        customs.sort_by(|a, b| a.display.cmp(&b.display));

        let depth = readme_folder.split('/').filter(|s| !s.is_empty()).count();
        let base_depth = layout.base_folder.split('/').filter(|s| !s.is_empty()).count();
        let language_readme = if depth > base_depth {
            format!("{}README.md", "../".repeat(depth - base_depth))
        } else {
            "README.md".to_string()
        };

        let context = ReadmeContext {
            sdk: SdkContext {
                name: sdk.name.clone(),
                long: sdk_version
                    .expanded
                    .as_ref()
                    .map_or(&sdk_version.long, |e| &e.long)
                    .clone(),
                short: sdk_version
                    .expanded
                    .as_ref()
                    .map_or(&sdk_version.short, |e| &e.short)
                    .clone(),
                guide: sdk.guide.clone(),
                api_ref_name: sdk_version.api_ref.as_ref().map(|r| r.name.clone()),
            },
            service: ServiceContext {
                name: service.name.clone(),
                long: service.expanded.as_ref().map_or(&service.long, |e| &e.long).clone(),
                short: service.expanded.as_ref().map_or(&service.short, |e| &e.short).clone(),
                blurb: service.blurb.clone(),
                guide_url: service.guide.as_ref().map(|g| g.url.clone()),
                guide_subtitle: service
                    .guide
                    .as_ref()
                    .and_then(|g| g.subtitle.clone())
                    .unwrap_or_else(|| "User Guide".to_string()),
                api_ref: service.api_ref.clone(),
            },
            base_folder: layout.base_folder.clone(),
            language_readme,
            hello: entries(&buckets.hello),
            basics: entries(&buckets.basics),
            actions,
            scenarios: entries(&buckets.scenarios),
            customs,
            crosses,
        };

        let context = tera::Context::from_serialize(&context)
            .map_err(|e| DocGenError::Generation(format!("Template context error: {}", e)))?;
        self.tera
            .render("readme.md", &context)
            .map_err(|e| DocGenError::Generation(format!("Template error: {:?}", e)))
    }

    /// Render one README and write it under `root`
    ///
    /// With `check`, nothing is written and a differing file is reported
    /// as [`WriteOutcome::Stale`].
    pub fn write(&mut self, root: &Path, target: &ReadmeTarget, check: bool) -> Result<WriteOutcome> {
        let rendered = self.render(target)?;
        let path = root.join(self.readme_path(target)?);

        let current = fs::read_to_string(&path).ok();
        if current.as_deref() == Some(rendered.as_str()) {
            debug!("{} is up to date", path.display());
            return Ok(WriteOutcome::Unchanged);
        }
        if check {
            return Ok(WriteOutcome::Stale);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DocGenError::Generation(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }
        fs::write(&path, rendered)
            .map_err(|e| DocGenError::Generation(format!("Failed to write {:?}: {}", path, e)))?;

        info!("Wrote {}", path.display());
        Ok(WriteOutcome::Written)
    }

    fn layout(&self, target: &ReadmeTarget) -> Result<&'a LanguageConfig> {
        self.config
            .language(&target.language, target.sdk_version)
            .ok_or_else(|| {
                DocGenError::Generation(format!(
                    "No folder layout configured for {} {}",
                    target.language, target.sdk_version
                ))
            })
    }

    fn entry(&self, example: &Example, service: &str, service_short: &str, readme_folder: &str) -> Entry {
        let action = example.action(service).to_string();
        let fallback;
        let category = match self.scanner.doc_gen().category(&example.category) {
            Some(category) => category,
            None => {
                fallback = Category {
                    key: example.category.clone(),
                    display: example.category.clone(),
                    defaults: None,
                    overrides: None,
                    description: None,
                    synopsis_prefix: None,
                    more_info: None,
                };
                &fallback
            }
        };
        let vars = TemplateVars {
            service: service_short,
            action: &action,
        };

        let api_link = self.scanner.selection().and_then(|(language, sdk_version)| {
            self.scanner
                .doc_gen()
                .sdk(language)?
                .version(sdk_version)?
                .api_ref
                .as_ref()?
                .link(service, &action)
        });

        Entry {
            id: example.id.clone(),
            title: category.evaluate(example.title.as_deref(), TitleField::Title, vars),
            title_abbrev: category.evaluate(example.title_abbrev.as_deref(), TitleField::TitleAbbrev, vars),
            synopsis: category.evaluate(example.synopsis.as_deref(), TitleField::Synopsis, vars),
            link: self.scanner.snippet(example, readme_folder, &action),
            api_link,
            action,
        }
    }
}
