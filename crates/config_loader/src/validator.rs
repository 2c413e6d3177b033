//! 配置校验模块
//!
//! 校验规则：
//! - 派生规则 (`validator`): 尺寸范围、防抖与超时 > 0、api_url 为绝对地址
//! - session.api_url 仅允许 http/https
//! - session.id 不能为空白
//! - actual_viewport 宽高 > 0

use contracts::{ContractError, SessionBlueprint};
use validator::{Validate, ValidationErrors};

/// 校验 SessionBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    blueprint
        .session
        .validate()
        .map_err(|e| first_error("session", &e))?;
    blueprint
        .viewport
        .validate()
        .map_err(|e| first_error("viewport", &e))?;
    validate_api_url_scheme(blueprint)?;
    validate_session_id(blueprint)?;
    validate_actual_viewport(blueprint)?;
    Ok(())
}

/// 将派生校验错误转换为带字段路径的 ContractError
///
/// 结构体级规则记录在 `__all__` 下，对应路径即前缀本身。
fn first_error(prefix: &str, errors: &ValidationErrors) -> ContractError {
    let field_errors = errors.field_errors();
    let Some((field, errs)) = field_errors.iter().min_by(|a, b| a.0.cmp(b.0)) else {
        return ContractError::config_validation(prefix, errors.to_string());
    };

    let path = if *field == "__all__" {
        prefix.to_string()
    } else {
        format!("{prefix}.{field}")
    };
    let message = errs
        .first()
        .map(|e| match &e.message {
            Some(message) => message.to_string(),
            None => e.code.to_string(),
        })
        .unwrap_or_else(|| "invalid value".to_string());

    ContractError::config_validation(path, message)
}

fn validate_api_url_scheme(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    let scheme = blueprint
        .session
        .api_url
        .split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase());
    match scheme.as_deref() {
        Some("http") | Some("https") => Ok(()),
        _ => Err(ContractError::config_validation(
            "session.api_url",
            "must use http or https",
        )),
    }
}

fn validate_session_id(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    match &blueprint.session.id {
        Some(id) if id.trim().is_empty() => Err(ContractError::config_validation(
            "session.id",
            "session id cannot be blank; omit it to run without a session",
        )),
        _ => Ok(()),
    }
}

fn validate_actual_viewport(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    let Some(actual) = &blueprint.actual_viewport else {
        return Ok(());
    };
    if actual.width == 0 || actual.height == 0 {
        return Err(ContractError::config_validation(
            "actual_viewport",
            format!(
                "actual viewport must be non-empty, got {}x{}",
                actual.width, actual.height
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ActualViewport, SessionConfig};

    fn minimal_blueprint() -> SessionBlueprint {
        SessionBlueprint {
            version: Default::default(),
            session: SessionConfig {
                id: Some("rec-1".into()),
                api_url: "http://localhost:8000/api".into(),
            },
            viewport: Default::default(),
            actual_viewport: Some(ActualViewport::new(1920, 1080)),
        }
    }

    fn field_of(err: ContractError) -> String {
        match err {
            ContractError::ConfigValidation { field, .. } => field,
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&minimal_blueprint()).is_ok());
    }

    #[test]
    fn test_invalid_api_url() {
        let mut bp = minimal_blueprint();
        bp.session.api_url = "not a url".into();
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("must be an absolute URL"), "got: {err}");
        assert_eq!(field_of(err), "session.api_url");
    }

    #[test]
    fn test_non_http_api_url() {
        let mut bp = minimal_blueprint();
        bp.session.api_url = "ftp://recorder.example/api".into();
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("must use http or https"), "got: {err}");
        assert_eq!(field_of(err), "session.api_url");
    }

    #[test]
    fn test_https_api_url() {
        let mut bp = minimal_blueprint();
        bp.session.api_url = "HTTPS://recorder.example/api".into();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_zero_request_timeout() {
        let mut bp = minimal_blueprint();
        bp.viewport.request_timeout_ms = 0;
        let err = validate(&bp).unwrap_err();
        assert_eq!(field_of(err), "viewport.request_timeout_ms");
    }

    #[test]
    fn test_inverted_dimension_range() {
        let mut bp = minimal_blueprint();
        bp.viewport.min_dimension = 2000;
        bp.viewport.max_dimension = 1000;
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("min_dimension"), "got: {err}");
        assert_eq!(field_of(err), "viewport");
    }

    #[test]
    fn test_blank_session_id() {
        let mut bp = minimal_blueprint();
        bp.session.id = Some("  ".into());
        let err = validate(&bp).unwrap_err();
        assert_eq!(field_of(err), "session.id");
    }

    #[test]
    fn test_missing_session_id_is_valid() {
        let mut bp = minimal_blueprint();
        bp.session.id = None;
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_empty_actual_viewport() {
        let mut bp = minimal_blueprint();
        bp.actual_viewport = Some(ActualViewport::new(0, 1080));
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("0x1080"), "got: {err}");
    }
}
