//! Request handlers for the visual editor
//!
//! Each handler returns an HTTP-style status with a JSON body, so the same
//! functions back the command line and any HTTP front end.
//!
//! | Handler            | Success                             | Failure                 |
//! |--------------------|-------------------------------------|-------------------------|
//! | `models`           | 200 model array                     |                         |
//! | `models_presorted` | 200 model array, most related first |                         |
//! | `model`            | 200 model                           | 404 `{message}`         |
//! | `relations`        | 200 relationship array              |                         |
//! | `edges`            | 200 edge array                      |                         |
//! | `get_config`       | 200 `{config}`                      | 500 `{message, error}`  |
//! | `update_config`    | 200 `{message, config, env_updated}`| 422 / 500               |

use crate::workspace::Workspace;
use draftsman_ir::ClassifierOptions;
use serde::Serialize;
use serde_json::{Value, json};

pub const CONFIG_LOAD_FAILED: &str = "Failed to load Draftsman configuration.";
pub const CONFIG_UPDATE_FAILED: &str = "Failed to update Draftsman configuration.";
pub const INVALID_CONFIG_BODY: &str =
    "Invalid JSON body. Expecting an object matching draftsman.php structure.";

// ============================================================================
// ApiResponse
// ============================================================================

/// Status code and JSON body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::error(500, "Failed to encode response.", Some(e.to_string())),
        }
    }

    pub fn error(status: u16, message: &str, error: Option<String>) -> Self {
        let body = match error {
            Some(error) => json!({"message": message, "error": error}),
            None => json!({"message": message}),
        };
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// Graph handlers
// ============================================================================

/// Every model with its classified relationships
pub fn models(ws: &Workspace, options: ClassifierOptions) -> ApiResponse {
    ApiResponse::ok(ws.graph(options))
}

/// Models ordered by descending relation count
pub fn models_presorted(ws: &Workspace, options: ClassifierOptions) -> ApiResponse {
    ApiResponse::ok(ws.graph(options).presorted())
}

/// One model by identifier
pub fn model(ws: &Workspace, identifier: &str) -> ApiResponse {
    let graph = ws.graph(ClassifierOptions::default());
    match graph.model(identifier) {
        Some(node) => ApiResponse::ok(node),
        None => ApiResponse::error(404, &format!("Model not found: {identifier}"), None),
    }
}

/// All relationships, flattened
pub fn relations(ws: &Workspace) -> ApiResponse {
    let graph = ws.graph(ClassifierOptions::default());
    ApiResponse::ok(graph.relations())
}

/// Relationships grouped by pair
pub fn edges(ws: &Workspace) -> ApiResponse {
    let graph = ws.graph(ClassifierOptions::default());
    ApiResponse::ok(graph.edges())
}

// ============================================================================
// Settings handlers
// ============================================================================

/// The effective settings
pub fn get_config(ws: &Workspace) -> ApiResponse {
    match ws.settings().get_config() {
        Ok(config) => ApiResponse::ok(json!({"config": config})),
        Err(e) => {
            tracing::warn!("Loading settings failed: {}", e);
            ApiResponse::error(500, CONFIG_LOAD_FAILED, Some(e.to_string()))
        }
    }
}

/// Apply `{config: {...}}` to the stored settings
pub fn update_config(ws: &Workspace, body: &Value) -> ApiResponse {
    let Some(config) = body.get("config").filter(|c| c.is_object()) else {
        return ApiResponse::error(422, INVALID_CONFIG_BODY, None);
    };

    match ws.settings().update_config(config) {
        Ok(outcome) => ApiResponse::ok(outcome),
        Err(e) if e.is_client_error() => {
            ApiResponse::error(422, INVALID_CONFIG_BODY, Some(e.to_string()))
        }
        Err(e) => {
            tracing::warn!("Updating settings failed: {}", e);
            ApiResponse::error(500, CONFIG_UPDATE_FAILED, Some(e.to_string()))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::create_dir_all(base.join("app/Models")).unwrap();
        for name in ["User", "Post", "Broken"] {
            fs::write(base.join(format!("app/Models/{name}.php")), "<?php\n").unwrap();
        }
        fs::create_dir_all(base.join("storage/draftsman")).unwrap();
        fs::write(
            base.join("storage/draftsman/models.json"),
            json!({"models": [
                {"class": "App\\Models\\User", "attributes": [{"name": "id"}], "relations": [
                    {"name": "posts", "type": "HasMany", "related": "App\\Models\\Post",
                     "accessors": {"getLocalKeyName": "id", "getForeignKeyName": "user_id"}}
                ]},
                {"class": "App\\Models\\Post", "attributes": [{"name": "user_id", "nullable": false}], "relations": [
                    {"name": "user", "type": "BelongsTo", "related": "App\\Models\\User",
                     "accessors": {"getForeignKeyName": "user_id", "getOwnerKeyName": "id"}}
                ]},
                {"class": "App\\Models\\Broken", "error": "Class has syntax errors"}
            ]})
            .to_string(),
        )
        .unwrap();
        let ws = Workspace::new(base);
        (temp_dir, ws)
    }

    #[test]
    fn test_models_skip_broken() {
        let (_dir, ws) = workspace();
        let response = models(&ws, ClassifierOptions::default());
        assert_eq!(response.status, 200);
        let names: Vec<&str> = response
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["class"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["App\\Models\\Post", "App\\Models\\User"]);
    }

    #[test]
    fn test_model_not_found() {
        let (_dir, ws) = workspace();
        assert_eq!(model(&ws, "App\\Models\\User").status, 200);

        let response = model(&ws, "App\\Models\\Missing");
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
        assert!(response.body["message"].as_str().unwrap().contains("Missing"));
    }

    #[test]
    fn test_relations_and_edges() {
        let (_dir, ws) = workspace();
        assert_eq!(relations(&ws).body.as_array().unwrap().len(), 2);

        let edges = edges(&ws).body;
        assert_eq!(edges.as_array().unwrap().len(), 1);
        assert_eq!(edges[0]["relations"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_get_config_defaults() {
        let (_dir, ws) = workspace();
        let response = get_config(&ws);
        assert_eq!(response.status, 200);
        assert_eq!(response.body["config"]["package"]["editor"], json!("vscode"));
    }

    #[test]
    fn test_get_config_reports_broken_file() {
        let (_dir, ws) = workspace();
        fs::write(&ws.settings_path, "<?php return [").unwrap();

        let response = get_config(&ws);
        assert_eq!(response.status, 500);
        assert_eq!(response.body["message"], json!(CONFIG_LOAD_FAILED));
        assert!(response.body["error"].is_string());
    }

    #[test]
    fn test_update_config_scenario() {
        let (_dir, ws) = workspace();
        let response = update_config(
            &ws,
            &json!({"config": {"presentation": {"User": {"icon": "x", "class": "y", "extra": "z"}}}}),
        );

        assert_eq!(response.status, 200);
        assert_eq!(response.body["env_updated"], json!(false));
        assert_eq!(
            response.body["config"]["presentation"],
            json!({"App\\Models\\User": {"icon": "x", "class": "y"}})
        );
        assert!(ws.settings_path.is_file());
    }

    #[test]
    fn test_update_config_rejects_non_mapping() {
        let (_dir, ws) = workspace();
        for body in [json!({"config": "not-an-object"}), json!({}), json!([1, 2])] {
            let response = update_config(&ws, &body);
            assert_eq!(response.status, 422);
            assert_eq!(response.body["message"], json!(INVALID_CONFIG_BODY));
        }
        assert!(!ws.settings_path.exists());
    }

    #[test]
    fn test_update_config_write_failure() {
        let (_dir, ws) = workspace();
        // parent of the settings file is a regular file
        let blocked = ws.app_path.join("Models/User.php/config.php");
        let ws = ws.with_settings(blocked);

        let response = update_config(&ws, &json!({"config": {"graph": {"grid_width": 10}}}));
        assert_eq!(response.status, 500);
        assert_eq!(response.body["message"], json!(CONFIG_UPDATE_FAILED));
    }
}
