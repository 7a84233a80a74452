use serde_json::{json, Value};

use crate::config::{DocsConfig, PAGE_SIZE};

use super::format::{NAME_MAX_LENGTH, PRICE_DECIMAL_PLACES, PRICE_MAX_DIGITS};

pub const SCHEMA_PATH: &str = "/api/schema/";

const SWAGGER_UI_VERSION: &str = "5";
const REDOC_VERSION: &str = "2";

/// OpenAPI 3.0.3 description of every public route.
pub fn openapi_document(docs: &DocsConfig) -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": docs.title,
            "version": docs.version,
            "description": docs.description
        },
        "paths": {
            "/api/health/": health_path(),
            "/api/items/": items_collection_path(),
            "/api/items/{id}/": items_record_path(),
            "/api/token/": token_obtain_path(),
            "/api/token/refresh/": token_refresh_path()
        },
        "components": {
            "schemas": {
                "Item": item_schema(&["name", "price"]),
                "PatchedItem": item_schema(&[]),
                "PaginatedItemList": paginated_item_list_schema(),
                "TokenObtainPair": {
                    "type": "object",
                    "required": ["username", "password", "access", "refresh"],
                    "properties": {
                        "username": {"type": "string", "writeOnly": true},
                        "password": {"type": "string", "writeOnly": true},
                        "access": {"type": "string", "readOnly": true},
                        "refresh": {"type": "string", "readOnly": true}
                    }
                },
                "TokenRefresh": {
                    "type": "object",
                    "required": ["access", "refresh"],
                    "properties": {
                        "access": {"type": "string", "readOnly": true},
                        "refresh": {"type": "string", "writeOnly": true}
                    }
                },
                "Error": {
                    "type": "object",
                    "required": ["detail"],
                    "properties": {
                        "detail": {"type": "string"},
                        "code": {"type": "string"}
                    }
                }
            },
            "securitySchemes": {
                "jwtAuth": {"type": "http", "scheme": "bearer", "bearerFormat": "JWT"}
            }
        }
    })
}

fn schema_ref(name: &str) -> Value {
    json!({"$ref": format!("#/components/schemas/{}", name)})
}

fn json_content(schema: &str) -> Value {
    json!({"application/json": {"schema": schema_ref(schema)}})
}

fn error_response(description: &str) -> Value {
    json!({"description": description, "content": json_content("Error")})
}

fn item_response() -> Value {
    json!({"description": "", "content": json_content("Item")})
}

fn validation_response() -> Value {
    json!({"description": "Validation errors keyed by field"})
}

fn secured() -> Value {
    json!([{"jwtAuth": []}])
}

fn item_id_parameter() -> Value {
    json!({
        "in": "path",
        "name": "id",
        "schema": {"type": "integer"},
        "description": "A unique integer value identifying this item.",
        "required": true
    })
}

fn health_path() -> Value {
    json!({
        "get": {
            "operationId": "health_retrieve",
            "tags": ["health"],
            "security": [{}],
            "responses": {
                "200": {
                    "description": "Service is up",
                    "content": {"application/json": {"schema": {
                        "type": "object",
                        "properties": {"status": {"type": "string", "example": "ok"}}
                    }}}
                }
            }
        }
    })
}

fn items_collection_path() -> Value {
    json!({
        "get": {
            "operationId": "items_list",
            "tags": ["items"],
            "security": secured(),
            "parameters": [
                {"name": "name", "required": false, "in": "query", "schema": {"type": "string"}},
                {"name": "ordering", "required": false, "in": "query", "schema": {"type": "string"},
                 "description": "Which field to use when ordering the results."},
                {"name": "page", "required": false, "in": "query", "schema": {"type": "integer"},
                 "description": "A page number within the paginated result set."},
                {"name": "search", "required": false, "in": "query", "schema": {"type": "string"},
                 "description": "A search term."}
            ],
            "responses": {
                "200": {"description": "", "content": json_content("PaginatedItemList")},
                "401": error_response("Authentication required"),
                "404": error_response("Invalid page")
            }
        },
        "post": {
            "operationId": "items_create",
            "tags": ["items"],
            "security": secured(),
            "requestBody": {"content": json_content("Item"), "required": true},
            "responses": {
                "201": item_response(),
                "400": validation_response(),
                "401": error_response("Authentication required")
            }
        }
    })
}

fn items_record_path() -> Value {
    let operation = |operation_id: &str, body: Option<&str>, success: (&str, Value)| {
        let mut op = json!({
            "operationId": operation_id,
            "tags": ["items"],
            "security": secured(),
            "parameters": [item_id_parameter()],
            "responses": {
                "401": error_response("Authentication required"),
                "404": error_response("No such item")
            }
        });
        op["responses"][success.0] = success.1;
        if let Some(schema) = body {
            op["requestBody"] = json!({"content": json_content(schema), "required": schema == "Item"});
            op["responses"]["400"] = validation_response();
        }
        op
    };

    json!({
        "get": operation("items_retrieve", None, ("200", item_response())),
        "put": operation("items_update", Some("Item"), ("200", item_response())),
        "patch": operation("items_partial_update", Some("PatchedItem"), ("200", item_response())),
        "delete": operation("items_destroy", None, ("204", json!({"description": "No response body"})))
    })
}

fn token_obtain_path() -> Value {
    json!({
        "post": {
            "operationId": "token_create",
            "tags": ["token"],
            "description": "Takes a set of user credentials and returns an access and refresh JSON web token pair to prove the authentication of those credentials.",
            "security": [{}],
            "requestBody": {"content": json_content("TokenObtainPair"), "required": true},
            "responses": {
                "200": {"description": "", "content": json_content("TokenObtainPair")},
                "400": validation_response(),
                "401": error_response("No active account found with the given credentials")
            }
        }
    })
}

fn token_refresh_path() -> Value {
    json!({
        "post": {
            "operationId": "token_refresh_create",
            "tags": ["token"],
            "description": "Takes a refresh type JSON web token and returns an access type JSON web token if the refresh token is valid.",
            "security": [{}],
            "requestBody": {"content": json_content("TokenRefresh"), "required": true},
            "responses": {
                "200": {"description": "", "content": json_content("TokenRefresh")},
                "400": validation_response(),
                "401": error_response("Token is invalid or expired")
            }
        }
    })
}

fn paginated_item_list_schema() -> Value {
    json!({
        "type": "object",
        "required": ["count", "results"],
        "properties": {
            "count": {"type": "integer", "example": 123},
            "next": {"type": "string", "nullable": true, "format": "uri",
                     "example": "http://api.example.org/api/items/?page=4"},
            "previous": {"type": "string", "nullable": true, "format": "uri",
                         "example": "http://api.example.org/api/items/?page=2"},
            "results": {"type": "array", "items": schema_ref("Item"), "maxItems": PAGE_SIZE}
        }
    })
}

fn item_schema(required: &[&str]) -> Value {
    let mut all_required = vec!["id", "created_at"];
    all_required.extend_from_slice(required);

    let whole_digits = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;
    json!({
        "type": "object",
        "required": all_required,
        "properties": {
            "id": {"type": "integer", "readOnly": true},
            "name": {"type": "string", "maxLength": NAME_MAX_LENGTH},
            "price": {
                "type": "string",
                "format": "decimal",
                "pattern": format!("^-?\\d{{0,{}}}(?:\\.\\d{{0,{}}})?$", whole_digits, PRICE_DECIMAL_PLACES)
            },
            "created_at": {"type": "string", "format": "date-time", "readOnly": true}
        }
    })
}

pub fn swagger_ui_html(title: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
  <head>
    <title>{title}</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@{version}/swagger-ui.css">
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@{version}/swagger-ui-bundle.js"></script>
    <script>
      window.ui = SwaggerUIBundle({{
        url: "{schema}",
        dom_id: "#swagger-ui",
        deepLinking: true,
        persistAuthorization: true
      }});
    </script>
  </body>
</html>
"##,
        title = title,
        version = SWAGGER_UI_VERSION,
        schema = SCHEMA_PATH,
    )
}

pub fn redoc_html(title: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
  <head>
    <title>{title}</title>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1">
  </head>
  <body>
    <redoc spec-url="{schema}"></redoc>
    <script src="https://cdn.jsdelivr.net/npm/redoc@{version}/bundles/redoc.standalone.js"></script>
  </body>
</html>
"##,
        title = title,
        version = REDOC_VERSION,
        schema = SCHEMA_PATH,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn documents_every_route() {
        let doc = openapi_document(&AppConfig::default().docs);
        assert_eq!(doc["openapi"], "3.0.3");

        let paths = doc["paths"].as_object().unwrap();
        for path in ["/api/health/", "/api/items/", "/api/items/{id}/", "/api/token/", "/api/token/refresh/"] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
        for method in ["get", "put", "patch", "delete"] {
            assert!(doc["paths"]["/api/items/{id}/"][method].is_object());
        }
        assert_eq!(doc["components"]["securitySchemes"]["jwtAuth"]["scheme"], "bearer");
    }

    #[test]
    fn patched_item_requires_only_read_only_fields() {
        let doc = openapi_document(&AppConfig::default().docs);
        assert_eq!(
            doc["components"]["schemas"]["PatchedItem"]["required"],
            json!(["id", "created_at"])
        );
        assert_eq!(
            doc["components"]["schemas"]["Item"]["properties"]["price"]["pattern"],
            "^-?\\d{0,8}(?:\\.\\d{0,2})?$"
        );
    }

    #[test]
    fn docs_pages_point_at_schema() {
        let swagger = swagger_ui_html("Item API");
        assert!(swagger.contains("url: \"/api/schema/\""));
        assert!(swagger.contains("dom_id: \"#swagger-ui\""));
        assert!(swagger.trim_end().ends_with("</html>"));
        assert!(redoc_html("Item API").contains("spec-url=\"/api/schema/\""));
    }
}
