//! Component template loading and the page-lifetime template cache.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dom::{self, Fragment};
use crate::fetch::Fetcher;
use crate::{Error, Result};

/// A parsed component: the content of its `<template>` root
#[derive(Debug, PartialEq)]
pub struct Template {
    pub path: String,
    pub content: Fragment,
}

impl Template {
    /// Deep copy of the template content, ready to be bound and inserted
    pub fn instantiate(&self) -> Fragment {
        self.content.clone()
    }
}

/// Templates keyed by component path. Entries are never evicted.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: HashMap<String, Arc<Template>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Arc<Template>> {
        self.entries.get(path).cloned()
    }

    /// Insert unless the path is already cached; returns the handle that is cached
    pub fn insert(&mut self, template: Template) -> Arc<Template> {
        self.entries
            .entry(template.path.clone())
            .or_insert_with(|| Arc::new(template))
            .clone()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fetches components by path and memoizes them in an owned `TemplateCache`
pub struct TemplateLoader {
    fetcher: Arc<dyn Fetcher>,
    cache: TemplateCache,
}

impl TemplateLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            cache: TemplateCache::new(),
        }
    }

    /// Return the template for `path`, fetching it on first use.
    ///
    /// Once a path has loaded successfully the same handle is returned for
    /// the lifetime of the loader and no further requests are made.
    pub fn load(&mut self, path: &str) -> Result<Arc<Template>> {
        if let Some(tpl) = self.cache.get(path) {
            log::debug!("template cache hit: {}", path);
            return Ok(tpl);
        }

        log::debug!("fetching component {}", path);
        let resp = self.fetcher.get(path).map_err(|e| {
            log::warn!("component fetch for {} failed: {}", path, e);
            Error::LoadError(path.to_string())
        })?;
        if !resp.ok() {
            log::warn!("component {} returned status {}", path, resp.status);
            return Err(Error::LoadError(path.to_string()));
        }

        let content =
            dom::extract_template(&resp.body)?.ok_or_else(|| Error::TemplateMissing(path.to_string()))?;

        Ok(self.cache.insert(Template {
            path: path.to_string(),
            content,
        }))
    }

    /// Load every path up front; stops at the first failure
    pub fn preload<I, S>(&mut self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for p in paths {
            self.load(p.as_ref())?;
        }
        Ok(())
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.cache.contains(path)
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }
}
