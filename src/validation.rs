//! Field-level validation for item payloads.
//!
//! Validators take the raw JSON value and return either the validated payload
//! or every field error found, so a response can report all problems at once.

use serde_json::Value;

use crate::models::{ItemPatch, NewItem};

pub const NOMBRE_MAX_LEN: usize = 100;
pub const DESCRIPCION_MAX_LEN: usize = 500;

/// One validation failure, tied to the field that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Joins field errors into the single message handlers return.
pub fn error_message(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates a create payload: `nombre` required (1–100 chars after trim),
/// `descripcion` optional (up to 500 chars after trim). Unknown fields are
/// ignored.
pub fn validate_create(body: &Value) -> Result<NewItem, Vec<FieldError>> {
    let mut errors = Vec::new();

    let nombre = match body.get("nombre") {
        None | Some(Value::Null) => {
            errors.push(FieldError::new("nombre", "El nombre es requerido"));
            None
        }
        Some(value) => validate_nombre(value, &mut errors),
    };

    let descripcion = match body.get("descripcion") {
        None | Some(Value::Null) => None,
        Some(value) => validate_descripcion(value, &mut errors),
    };

    match nombre {
        Some(nombre) if errors.is_empty() => Ok(NewItem { nombre, descripcion }),
        _ => Err(errors),
    }
}

/// Validates an update payload: same bounds as create, every field optional,
/// at least one recognized field required.
pub fn validate_update(body: &Value) -> Result<ItemPatch, Vec<FieldError>> {
    let mut errors = Vec::new();

    let nombre = match body.get("nombre") {
        None | Some(Value::Null) => None,
        Some(value) => validate_nombre(value, &mut errors),
    };

    let descripcion = match body.get("descripcion") {
        None | Some(Value::Null) => None,
        Some(value) => validate_descripcion(value, &mut errors),
    };

    let patch = ItemPatch { nombre, descripcion };

    if errors.is_empty() && patch.is_empty() {
        errors.push(FieldError::new(
            "body",
            "Se debe proporcionar al menos un campo para actualizar",
        ));
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

fn validate_nombre(value: &Value, errors: &mut Vec<FieldError>) -> Option<String> {
    let Some(raw) = value.as_str() else {
        errors.push(FieldError::new(
            "nombre",
            "El nombre debe ser una cadena de texto",
        ));
        return None;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new("nombre", "El nombre no puede estar vacío"));
        return None;
    }
    if trimmed.chars().count() > NOMBRE_MAX_LEN {
        errors.push(FieldError::new(
            "nombre",
            format!("El nombre no puede exceder {} caracteres", NOMBRE_MAX_LEN),
        ));
        return None;
    }

    Some(trimmed.to_string())
}

fn validate_descripcion(value: &Value, errors: &mut Vec<FieldError>) -> Option<String> {
    let Some(raw) = value.as_str() else {
        errors.push(FieldError::new(
            "descripcion",
            "La descripción debe ser una cadena de texto",
        ));
        return None;
    };

    let trimmed = raw.trim();
    if trimmed.chars().count() > DESCRIPCION_MAX_LEN {
        errors.push(FieldError::new(
            "descripcion",
            format!(
                "La descripción no puede exceder {} caracteres",
                DESCRIPCION_MAX_LEN
            ),
        ));
        return None;
    }

    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_create() {
        let body = json!({"nombre": "  Taladro  ", "descripcion": "Percutor 850W"});
        let item = validate_create(&body).unwrap();
        assert_eq!(item.nombre, "Taladro");
        assert_eq!(item.descripcion.as_deref(), Some("Percutor 850W"));
    }

    #[test]
    fn test_create_without_descripcion() {
        let body = json!({"nombre": "Taladro"});
        let item = validate_create(&body).unwrap();
        assert_eq!(item.descripcion, None);
    }

    #[test]
    fn test_create_requires_nombre() {
        let errors = validate_create(&json!({"descripcion": "sin nombre"})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "nombre");
        assert_eq!(errors[0].message, "El nombre es requerido");
    }

    #[test]
    fn test_create_rejects_blank_nombre() {
        let errors = validate_create(&json!({"nombre": "   "})).unwrap_err();
        assert_eq!(errors[0].message, "El nombre no puede estar vacío");
    }

    #[test]
    fn test_create_rejects_long_fields() {
        let body = json!({
            "nombre": "x".repeat(101),
            "descripcion": "y".repeat(501),
        });
        let errors = validate_create(&body).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "nombre");
        assert_eq!(errors[1].field, "descripcion");
    }

    #[test]
    fn test_create_rejects_non_string_types() {
        let errors = validate_create(&json!({"nombre": 42, "descripcion": true})).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_create_accepts_boundary_lengths() {
        let body = json!({
            "nombre": "x".repeat(100),
            "descripcion": "y".repeat(500),
        });
        assert!(validate_create(&body).is_ok());
    }

    #[test]
    fn test_create_ignores_unknown_fields() {
        let body = json!({"nombre": "Taladro", "precio": 99.5});
        assert!(validate_create(&body).is_ok());
    }

    #[test]
    fn test_update_requires_at_least_one_field() {
        let errors = validate_update(&json!({"precio": 10})).unwrap_err();
        assert_eq!(
            errors[0].message,
            "Se debe proporcionar al menos un campo para actualizar"
        );
    }

    #[test]
    fn test_update_single_field() {
        let patch = validate_update(&json!({"descripcion": "Nueva descripción"})).unwrap();
        assert_eq!(patch.nombre, None);
        assert_eq!(patch.descripcion.as_deref(), Some("Nueva descripción"));
    }

    #[test]
    fn test_update_validates_bounds() {
        let errors = validate_update(&json!({"nombre": "x".repeat(200)})).unwrap_err();
        assert_eq!(errors[0].field, "nombre");
    }

    #[test]
    fn test_error_message_joins_with_semicolon() {
        let errors = vec![
            FieldError::new("nombre", "El nombre es requerido"),
            FieldError::new("descripcion", "La descripción debe ser una cadena de texto"),
        ];
        assert_eq!(
            error_message(&errors),
            "El nombre es requerido; La descripción debe ser una cadena de texto"
        );
    }
}
