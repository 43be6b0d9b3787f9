//! Model-key resolution
//!
//! Presentation entries are keyed by model class. Editors send short names
//! (`User`) or partial paths (`Blog/Post`); these are expanded against the
//! namespace that the configured models directory maps to.

use heck::ToUpperCamelCase;
use std::path::{Component, Path, PathBuf};

/// Namespace used when the models directory is outside the app directory
pub const FALLBACK_MODELS_NAMESPACE: &str = "App\\Models";

/// Location of the host application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Project root; relative settings paths are taken from here
    pub base_path: PathBuf,
    /// Root of the application sources
    pub app_path: PathBuf,
    /// Namespace the application sources live under
    pub root_namespace: String,
}

impl AppPaths {
    /// Conventional layout below `base_path` (`<base>/app`, namespace `App`)
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        Self {
            app_path: base_path.join("app"),
            base_path,
            root_namespace: "App".to_string(),
        }
    }

    /// Resolve a possibly relative path against the base path
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

/// The namespace model classes are expected under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNamespace {
    root: String,
    namespace: String,
}

impl ModelNamespace {
    /// Derive the namespace from a `models_path` setting
    pub fn from_models_path(models_path: &str, paths: &AppPaths) -> Self {
        let root = paths.root_namespace.trim_matches('\\').to_string();
        let models = normalize(&paths.resolve(&models_path.replace('\\', "/")));
        let app = normalize(&paths.app_path);

        let namespace = match strip_prefix_ignore_case(&models, &app) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                let mut namespace = root.clone();
                for segment in rest.split('/').filter(|s| !s.is_empty()) {
                    namespace.push('\\');
                    namespace.push_str(&segment.to_upper_camel_case());
                }
                namespace
            }
            _ => {
                tracing::debug!(
                    "Models path '{}' is outside '{}', using {}",
                    models,
                    app,
                    FALLBACK_MODELS_NAMESPACE
                );
                FALLBACK_MODELS_NAMESPACE.to_string()
            }
        };

        Self { root, namespace }
    }

    /// The models namespace, e.g. `App\Models`
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The application root namespace, e.g. `App`
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Expand a presentation key to a fully-qualified class
    ///
    /// Keys under the root namespace, or containing `\` at all, are already
    /// resolved. Bare names and `/`-separated partial names get the models
    /// namespace prefixed.
    pub fn resolve(&self, key: &str) -> String {
        let trimmed = key.trim().trim_start_matches('\\');
        if trimmed.is_empty() || self.is_under_root(trimmed) || trimmed.contains('\\') {
            return trimmed.to_string();
        }

        let partial = trimmed.trim_matches('/').replace('/', "\\");
        format!("{}\\{}", self.namespace, partial)
    }

    /// Check if a resolved key names a model class
    pub fn is_model_class(&self, key: &str) -> bool {
        if !is_class_path(key) {
            return false;
        }
        starts_with_ignore_case(key, &format!("{}\\", self.namespace))
            || key.starts_with(&format!("{FALLBACK_MODELS_NAMESPACE}\\"))
    }

    fn is_under_root(&self, key: &str) -> bool {
        !self.root.is_empty() && starts_with_ignore_case(key, &format!("{}\\", self.root))
    }
}

/// Check if `key` is a backslash-separated list of identifiers
pub fn is_class_path(key: &str) -> bool {
    !key.is_empty()
        && key.split('\\').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Render a path with `/` separators and without `.` components
fn normalize(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut absolute = false;
    for component in path.components() {
        match component {
            Component::RootDir => absolute = true,
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    parts.push("..".to_string());
                }
            }
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            Component::Prefix(p) => parts.push(p.as_os_str().to_string_lossy().into_owned()),
        }
    }
    let joined = parts.join("/");
    if absolute { format!("/{joined}") } else { joined }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    strip_prefix_ignore_case(value, prefix).is_some()
}

fn strip_prefix_ignore_case<'v>(value: &'v str, prefix: &str) -> Option<&'v str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &value[prefix.len()..])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paths() -> AppPaths {
        AppPaths::new("/srv/shop")
    }

    #[test]
    fn test_default_models_namespace() {
        let ns = ModelNamespace::from_models_path("app/Models", &paths());
        assert_eq!(ns.namespace(), "App\\Models");
        assert_eq!(ns.root(), "App");
    }

    #[test]
    fn test_nested_models_namespace() {
        let ns = ModelNamespace::from_models_path("app/domain/billing_models", &paths());
        assert_eq!(ns.namespace(), "App\\Domain\\BillingModels");

        let ns = ModelNamespace::from_models_path("/srv/shop/app/Entities", &paths());
        assert_eq!(ns.namespace(), "App\\Entities");

        let ns = ModelNamespace::from_models_path("app\\Models", &paths());
        assert_eq!(ns.namespace(), "App\\Models");
    }

    #[test]
    fn test_outside_app_falls_back() {
        let ns = ModelNamespace::from_models_path("src/Models", &paths());
        assert_eq!(ns.namespace(), FALLBACK_MODELS_NAMESPACE);

        let ns = ModelNamespace::from_models_path("application/Models", &paths());
        assert_eq!(ns.namespace(), FALLBACK_MODELS_NAMESPACE);
    }

    #[test]
    fn test_relative_base_path() {
        let ns = ModelNamespace::from_models_path("app/Models", &AppPaths::new("."));
        assert_eq!(ns.namespace(), "App\\Models");
    }

    #[test]
    fn test_resolve_keys() {
        let ns = ModelNamespace::from_models_path("app/Models", &paths());
        assert_eq!(ns.resolve("User"), "App\\Models\\User");
        assert_eq!(ns.resolve("Blog/Post"), "App\\Models\\Blog\\Post");
        assert_eq!(ns.resolve("App\\Models\\User"), "App\\Models\\User");
        assert_eq!(ns.resolve("\\App\\Models\\User"), "App\\Models\\User");
        assert_eq!(ns.resolve("Vendor\\Package\\Team"), "Vendor\\Package\\Team");
    }

    #[test]
    fn test_is_model_class() {
        let ns = ModelNamespace::from_models_path("app/Models", &paths());
        assert!(ns.is_model_class("App\\Models\\User"));
        assert!(!ns.is_model_class("App\\Models\\Not A Class"));
        assert!(!ns.is_model_class("Vendor\\Team"));
        assert!(!ns.is_model_class("icon"));
    }
}
