//! Invalidation cache for inline templates.
//!
//! Extracting and parsing a template on every render would be wasteful,
//! so templates are cached per call site. A cache entry remembers the
//! mtime of the source file it was extracted from; when the file
//! changes, the entry is recompiled on next use. Entries are never
//! evicted otherwise, the set of call sites is bounded by the program
//! text.
//!
//! The cache is scoped per thread. Each thread pays its own extraction
//! cost on first use, but no lock is ever taken on the hot path. The
//! compiled programs themselves are shared process-wide, see
//! [`InlineTemplate`].
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use crate::config::get_config;

use super::source;
use super::template::{Context, Error, InlineTemplate};

/// Source location of a render call, the template's identity for
/// caching. Capture it with [`call_site!`](crate::call_site).
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    file: String,
    line: u32,
}

impl CallSite {
    pub fn new(file: &str, line: u32) -> Self {
        Self {
            file: file.to_string(),
            line,
        }
    }

    pub fn file(&self) -> &Path {
        Path::new(&self.file)
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// `file:line`, used in cache keys and error paths.
    pub fn identity(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

/// Where the template text comes from on a cache miss.
pub enum TemplateText<'a> {
    /// Extract from the comment lines below the call site.
    FromComments,
    /// The caller supplies the text directly. Still unindented.
    Literal(&'a str),
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    site: String,
    local_names: Vec<String>,
}

struct CacheEntry {
    template: Arc<InlineTemplate>,
    mtime: Option<SystemTime>,
}

#[derive(Default)]
struct TemplateCache {
    entries: HashMap<CacheKey, CacheEntry>,
}

thread_local! {
    static CACHE: RefCell<TemplateCache> = RefCell::new(TemplateCache::default());
}

/// Fetch the template for a call site, extracting and creating it if
/// this thread hasn't seen it yet or the source file changed.
///
/// The same call site used with different local-variable sets yields
/// independent entries; each template only ever sees the locals it was
/// first fetched with.
pub fn fetch(
    site: &CallSite,
    format: &str,
    context: &Context,
    text: TemplateText<'_>,
) -> Result<Arc<InlineTemplate>, Error> {
    let mut local_names: Vec<String> = context.keys().map(|name| name.to_string()).collect();
    local_names.sort();

    let key = CacheKey {
        site: site.identity(),
        local_names,
    };

    let current_mtime = mtime(site.file());

    CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();

        if get_config().cache_templates {
            if let Some(entry) = cache.entries.get(&key) {
                if entry.mtime == current_mtime {
                    return Ok(entry.template.clone());
                }

                tracing::debug!("template at {} is stale, recompiling", key.site);
            }
        }

        let source = match text {
            TemplateText::FromComments => source::locate(site.file(), site.line() as usize)?,
            TemplateText::Literal(text) => source::unindent(text),
        };

        let template = Arc::new(InlineTemplate::new(format, &source, &key.site));

        cache.entries.insert(
            key,
            CacheEntry {
                template: template.clone(),
                mtime: current_mtime,
            },
        );

        Ok(template)
    })
}

/// Clear this thread's cache. Templates are re-extracted and
/// recompiled on next use.
pub fn reset() {
    CACHE.with(|cache| cache.borrow_mut().entries.clear());
}

// A missing or unreadable file stats to None. A literal-text call site
// compiled into a binary without sources still renders; it just never
// goes stale.
fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
