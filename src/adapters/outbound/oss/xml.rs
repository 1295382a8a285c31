use super::error::OssError;
use crate::domain::models::RemoteRuleSet;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Render the `PUT ?lifecycle` request body
pub fn to_xml(rules: &RemoteRuleSet) -> Result<String, OssError> {
    let body = quick_xml::se::to_string(rules).map_err(|e| OssError::Xml(e.to_string()))?;
    Ok(format!("{}{}", XML_DECLARATION, body))
}

/// Parse a `GET ?lifecycle` response body
pub fn from_xml(xml: &str) -> Result<RemoteRuleSet, OssError> {
    quick_xml::de::from_str(xml).map_err(|e| OssError::Xml(e.to_string()))
}
