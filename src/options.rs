//! Parser configuration and dialect-plugin composition (spec §4.4, §6).
//!
//! `ParserOptions` is the public-facing configuration struct; `Dialect` is
//! the resolved, internally-ordered plugin set a `Parser` actually
//! consults while running. Resolving a `ParserOptions::plugins` list into
//! a `Dialect` validates mutually-exclusive combinations and canonicalizes
//! ordering (spec §4.4 steps 1-2) and is cached by the ordered plugin-name
//! key (step 4), the same "per-factory cache keyed by composed identity"
//! shape as the teacher's own plugin/grammar-variant caching — except
//! implemented with `std::sync::OnceLock` rather than a third-party
//! lazy-static crate, since nothing else in this crate's dependency stack
//! already pulls one in.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceType {
    #[default]
    Script,
    Module,
}

/// One selectable plugin (spec §6's plugin set). Kept as a flat enum
/// rather than free-form strings: the combinations that conflict or
/// reorder are known statically, so invalid names are a compile error at
/// every call site instead of a runtime string-typo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Plugin {
    Estree,
    Flow,
    Jsx,
    TypeScript,
    DynamicImport,
    ImportMeta,
    Decorators,
    Decorators2,
    ClassProperties,
    ClassPrivateProperties,
    AsyncGenerators,
    BigInt,
    NumericSeparator,
    ObjectRestSpread,
    OptionalChaining,
    FunctionBind,
    FunctionSent,
    DoExpressions,
    ExportExtensions,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    #[error("cannot combine plugins 'decorators' and 'decorators2'")]
    DecoratorsConflict,
    #[error("cannot combine plugins 'flow' and 'typescript'")]
    TypingConflict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    pub source_type: SourceType,
    pub source_filename: Option<String>,
    pub start_line: u32,
    pub allow_return_outside_function: bool,
    pub allow_import_export_everywhere: bool,
    pub allow_super_outside_method: bool,
    pub plugins: Vec<Plugin>,
    /// `None` means "infer from `source_type`" (spec §6: module ⇒ strict).
    pub strict_mode: Option<bool>,
    pub ranges: bool,
    pub tokens: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            source_type: SourceType::Script,
            source_filename: None,
            start_line: 1,
            allow_return_outside_function: false,
            allow_import_export_everywhere: false,
            allow_super_outside_method: false,
            plugins: Vec::new(),
            strict_mode: None,
            ranges: false,
            tokens: false,
        }
    }
}

impl ParserOptions {
    pub fn initial_strict_mode(&self) -> bool {
        self.strict_mode
            .unwrap_or(matches!(self.source_type, SourceType::Module))
    }
}

/// The resolved, ordered, validated plugin set a running parse consults.
/// Cheap to query (`Dialect::has`) from any production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    ordered: Vec<Plugin>,
}

impl Dialect {
    pub fn has(&self, plugin: Plugin) -> bool {
        self.ordered.contains(&plugin)
    }

    pub fn ordered_key(&self) -> &[Plugin] {
        &self.ordered
    }
}

/// Validate and canonically order a requested plugin list (spec §4.4
/// steps 1-2): "estree" first, "flow"/"typescript" last, everything else
/// in between preserving relative input order.
fn resolve_uncached(requested: &[Plugin]) -> Result<Dialect, PluginError> {
    let has = |p: Plugin| requested.contains(&p);
    if has(Plugin::Decorators) && has(Plugin::Decorators2) {
        return Err(PluginError::DecoratorsConflict);
    }
    if has(Plugin::Flow) && has(Plugin::TypeScript) {
        return Err(PluginError::TypingConflict);
    }

    let mut ordered = Vec::with_capacity(requested.len());
    if has(Plugin::Estree) {
        ordered.push(Plugin::Estree);
    }
    for &p in requested {
        if !matches!(p, Plugin::Estree | Plugin::Flow | Plugin::TypeScript) {
            ordered.push(p);
        }
    }
    for &p in requested {
        if matches!(p, Plugin::Flow | Plugin::TypeScript) {
            ordered.push(p);
        }
    }
    Ok(Dialect { ordered })
}

type DialectCache = OnceLock<Mutex<HashMap<Vec<Plugin>, Arc<Dialect>>>>;
static DIALECT_CACHE: DialectCache = OnceLock::new();

/// Resolve `requested` into a cached, validated [`Dialect`]. The cache key
/// is the *input* order (not the canonicalized order), matching spec
/// §4.4's "caches variants by the ordered key" where the key is whatever
/// the caller supplied.
pub fn resolve_dialect(requested: &[Plugin]) -> Result<Arc<Dialect>, PluginError> {
    let cache = DIALECT_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().expect("dialect cache poisoned");
    if let Some(existing) = guard.get(requested) {
        return Ok(existing.clone());
    }
    let dialect = Arc::new(resolve_uncached(requested)?);
    guard.insert(requested.to_vec(), dialect.clone());
    Ok(dialect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_conflicting_typing_dialects() {
        let err = resolve_uncached(&[Plugin::Flow, Plugin::TypeScript]).unwrap_err();
        assert_eq!(err, PluginError::TypingConflict);
    }

    #[test]
    fn orders_estree_first_and_typing_last() {
        let dialect = resolve_uncached(&[Plugin::Jsx, Plugin::TypeScript, Plugin::Estree]).unwrap();
        assert_eq!(
            dialect.ordered_key(),
            &[Plugin::Estree, Plugin::Jsx, Plugin::TypeScript]
        );
    }

    #[test]
    fn cache_returns_same_arc_for_same_key() {
        let a = resolve_dialect(&[Plugin::Jsx]).unwrap();
        let b = resolve_dialect(&[Plugin::Jsx]).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
