//! Rendering settings as a PHP array literal
//!
//! The host runtime loads the settings file with `include`, so the document
//! is written as `<?php return [...];` with one commented banner per section.
//! Rendering is pure: all formatting state travels in a [`FormatContext`]
//! passed down the recursion.

use crate::document::{PRESENTATION, SettingsDocument};
use crate::namespace::ModelNamespace;
use heck::ToTitleCase;
use serde_json::{Map, Number, Value};

/// Spaces per nesting level
pub const INDENT_WIDTH: usize = 4;

const BANNER_RULE: &str =
    "|--------------------------------------------------------------------------";

// ============================================================================
// FormatContext
// ============================================================================

/// Immutable formatting state for one level of the rendered literal
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    depth: usize,
    namespace: &'a ModelNamespace,
    class_keys: bool,
}

impl<'a> FormatContext<'a> {
    /// Context for the outermost array
    pub fn new(namespace: &'a ModelNamespace) -> Self {
        Self {
            depth: 0,
            namespace,
            class_keys: false,
        }
    }

    /// Nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Indentation of this level's closing bracket
    pub fn indent(&self) -> String {
        " ".repeat(self.depth * INDENT_WIDTH)
    }

    /// Indentation of this level's entries
    pub fn entry_indent(&self) -> String {
        " ".repeat((self.depth + 1) * INDENT_WIDTH)
    }

    /// Context for a value one level down
    pub fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            class_keys: false,
            ..*self
        }
    }

    /// Context whose keys may render as class constants
    pub fn with_class_keys(&self) -> Self {
        Self {
            class_keys: true,
            ..*self
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Render a whole settings file
pub fn render(document: &SettingsDocument, namespace: &ModelNamespace) -> String {
    let ctx = FormatContext::new(namespace);
    let inner = ctx.nested();
    let indent = ctx.entry_indent();

    let mut out = String::from("<?php\n\n// Draftsman settings\n\nreturn [\n");

    for (section, value) in document.as_map() {
        out.push('\n');
        out.push_str(&banner(section, &indent));
        out.push('\n');
        out.push_str(&indent);
        out.push_str(&quote(section));
        out.push_str(" => ");

        match value {
            Value::Object(entries) if section == PRESENTATION && entries.is_empty() => {
                out.push_str(&presentation_placeholder(&inner));
            }
            Value::Object(entries) if section == PRESENTATION => {
                out.push_str(&render_map(entries, &inner.with_class_keys()));
            }
            other => out.push_str(&render_value(other, &inner)),
        }
        out.push_str(",\n");
    }

    out.push_str("\n];\n");
    out
}

/// Render one value at the given level
pub fn render_value(value: &Value, ctx: &FormatContext<'_>) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n),
        Value::String(s) => quote(s),
        Value::Array(items) => render_list(items, ctx),
        Value::Object(entries) => render_map(entries, ctx),
    }
}

fn render_list(items: &[Value], ctx: &FormatContext<'_>) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }
    let entry_indent = ctx.entry_indent();
    let mut out = String::from("[\n");
    for item in items {
        out.push_str(&entry_indent);
        out.push_str(&render_value(item, &ctx.nested()));
        out.push_str(",\n");
    }
    out.push_str(&ctx.indent());
    out.push(']');
    out
}

fn render_map(entries: &Map<String, Value>, ctx: &FormatContext<'_>) -> String {
    if entries.is_empty() {
        return "[]".to_string();
    }
    let entry_indent = ctx.entry_indent();
    let mut out = String::from("[\n");
    for (key, value) in entries {
        out.push_str(&entry_indent);
        out.push_str(&render_key(key, ctx));
        out.push_str(" => ");
        out.push_str(&render_value(value, &ctx.nested()));
        out.push_str(",\n");
    }
    out.push_str(&ctx.indent());
    out.push(']');
    out
}

fn render_key(key: &str, ctx: &FormatContext<'_>) -> String {
    if ctx.class_keys && ctx.namespace.is_model_class(key) {
        format!("{key}::class")
    } else {
        quote(key)
    }
}

/// Floats always keep a fraction or exponent so they read back as floats
fn render_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => format!("{f:?}"),
        _ => n.to_string(),
    }
}

/// Single-quote a string, escaping `\` and `'`
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

fn banner(section: &str, indent: &str) -> String {
    let (title, description) = match section {
        "package" => (
            "Package".to_string(),
            Some("Where models and snapshots live, and how the .env file is kept in sync."),
        ),
        "front" => (
            "Front End".to_string(),
            Some("Editor preferences such as undo history and grid snapping."),
        ),
        "graph" => (
            "Graph".to_string(),
            Some("Canvas layout: grid, edge labels, column and gutter sizes."),
        ),
        "presentation" => (
            "Presentation".to_string(),
            Some("Per-model decoration, keyed by model class. Each entry may set an icon and a CSS class."),
        ),
        other => (other.to_title_case(), None),
    };

    let mut out = format!("{indent}/*\n{indent}{BANNER_RULE}\n{indent}| {title}\n{indent}{BANNER_RULE}\n");
    if let Some(description) = description {
        out.push_str(&format!("{indent}|\n{indent}| {description}\n{indent}|\n"));
    }
    out.push_str(&format!("{indent}*/\n"));
    out
}

fn presentation_placeholder(ctx: &FormatContext<'_>) -> String {
    let entry = ctx.entry_indent();
    let example = format!("{}\\User", ctx.namespace.namespace());
    format!(
        "[\n{entry}// {example}::class => [\n{entry}//     'icon' => 'user',\n{entry}//     'class' => 'bg-sky-500',\n{entry}// ],\n{indent}]",
        indent = ctx.indent(),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::AppPaths;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn namespace() -> ModelNamespace {
        ModelNamespace::from_models_path("app/Models", &AppPaths::new("/srv/shop"))
    }

    #[test]
    fn test_format_context_is_immutable() {
        let ns = namespace();
        let ctx = FormatContext::new(&ns);
        let nested = ctx.nested().nested();
        assert_eq!(ctx.depth(), 0);
        assert_eq!(nested.depth(), 2);
        assert_eq!(nested.indent(), " ".repeat(8));
        assert_eq!(nested.entry_indent(), " ".repeat(12));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "'plain'");
        assert_eq!(quote("it's"), "'it\\'s'");
        assert_eq!(quote("App\\Models"), "'App\\\\Models'");
    }

    #[test]
    fn test_render_scalars() {
        let ns = namespace();
        let ctx = FormatContext::new(&ns);
        assert_eq!(render_value(&json!(null), &ctx), "null");
        assert_eq!(render_value(&json!(true), &ctx), "true");
        assert_eq!(render_value(&json!(42), &ctx), "42");
        assert_eq!(render_value(&json!(-3), &ctx), "-3");
        assert_eq!(render_value(&json!(2.0), &ctx), "2.0");
        assert_eq!(render_value(&json!(0.25), &ctx), "0.25");
        assert_eq!(render_value(&json!([]), &ctx), "[]");
    }

    #[test]
    fn test_render_nested_list() {
        let ns = namespace();
        let ctx = FormatContext::new(&ns);
        assert_eq!(
            render_value(&json!(["a", {"b": 1}]), &ctx),
            "[\n    'a',\n    [\n        'b' => 1,\n    ],\n]"
        );
    }

    #[test]
    fn test_render_defaults() {
        let ns = namespace();
        let out = render(&SettingsDocument::defaults(), &ns);

        assert!(out.starts_with("<?php\n"));
        assert!(out.trim_end().ends_with("];"));
        assert!(out.contains("    'package' => [\n        'models_path' => 'app/Models',\n"));
        assert!(out.contains("        'update_env' => false,\n"));
        assert!(out.contains("        // App\\Models\\User::class => [\n"));

        let package = out.find("| Package").unwrap();
        let front = out.find("| Front End").unwrap();
        let graph = out.find("| Graph").unwrap();
        let presentation = out.find("| Presentation").unwrap();
        assert!(package < front && front < graph && graph < presentation);
    }

    #[test]
    fn test_render_class_keys_only_in_presentation() {
        let ns = namespace();
        let doc = SettingsDocument::new(
            json!({
                "package": {"App\\Models\\User": 1},
                "presentation": {
                    "App\\Models\\User": {"icon": "user"},
                    "Vendor\\Team": {"icon": "team"}
                }
            })
            .as_object()
            .cloned()
            .unwrap(),
        );

        let out = render(&doc, &ns);
        assert!(out.contains("        'App\\\\Models\\\\User' => 1,\n"));
        assert!(out.contains("        App\\Models\\User::class => [\n            'icon' => 'user',\n"));
        assert!(out.contains("        'Vendor\\\\Team' => [\n"));
    }
}
