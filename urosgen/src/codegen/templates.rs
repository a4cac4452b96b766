//! Template set and placeholder substitution.
//!
//! Templates are plain text with `<||Key||>` placeholders. Substitution is a
//! single flat pass over the text, not recursive. A key with
//! no mapping entry renders as the literal marker `<unknown:Key>` so a
//! template/mapping mismatch shows up in the generated output instead of
//! aborting the run.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

/// Opening placeholder delimiter
pub const PLACEHOLDER_OPEN: &str = "<||";
/// Closing placeholder delimiter
pub const PLACEHOLDER_CLOSE: &str = "||>";

/// Errors loading a custom template set
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Template file is not a JSON object of strings: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Named templates used by the engine.
///
/// The default set targets the rclc runtime. A custom set may be loaded from
/// a JSON object mapping template name → template text; names absent from the
/// custom set fall back to nothing, so a full replacement must cover every
/// name the engine renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    templates: BTreeMap<String, String>,
}

impl TemplateSet {
    /// Load a template set from a JSON object of strings
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the file cannot be read or is not a JSON
    /// object mapping names to strings.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse a template set from JSON text
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::JsonError`] if the text is not a JSON object
    /// mapping names to strings.
    pub fn from_json_str(content: &str) -> Result<Self, TemplateError> {
        let templates: BTreeMap<String, String> = serde_json::from_str(content)?;
        Ok(TemplateSet { templates })
    }

    /// Look up a template by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Render a named template against a mapping; `None` if the set has no
    /// template of that name
    #[must_use]
    pub fn render(&self, name: &str, mapping: &BTreeMap<String, String>) -> Option<String> {
        self.get(name).map(|template| fill(template, mapping))
    }

    /// Template names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        let templates = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect();
        TemplateSet { templates }
    }
}

/// Substitute every `<||Key||>` span in `template` from `mapping`.
///
/// The scan walks delimiter spans explicitly; an unmatched key renders as
/// `<unknown:Key>` and an unterminated opener is emitted verbatim.
#[must_use]
pub fn fill(template: &str, mapping: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(PLACEHOLDER_OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + PLACEHOLDER_OPEN.len()..];

        let Some(end) = after_open.find(PLACEHOLDER_CLOSE) else {
            // No closing delimiter: keep the tail as-is
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after_open[..end];
        match mapping.get(key) {
            Some(value) => out.push_str(value),
            None => {
                out.push_str("<unknown:");
                out.push_str(key);
                out.push('>');
            }
        }
        rest = &after_open[end + PLACEHOLDER_CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

/// Built-in rclc templates, one per endpoint concern
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "rcl_publisher_t",
        r#"RCCHECK(rclc_publisher_init_<||Reliability||>(
    &<||HandlerObject||>,
    &node,
    ROSIDL_GET_MSG_TYPE_SUPPORT(<||TopicTypeComa||>),
    "<||TopicName||>"));"#,
    ),
    (
        "publish_data",
        "RCSOFTCHECK(rcl_publish(&<||HandlerObject||>, &<||MsgName||>, NULL));",
    ),
    (
        "rcl_subscription_t",
        r#"RCCHECK(rclc_subscription_init_<||Reliability||>(
    &<||HandlerObject||>,
    &node,
    ROSIDL_GET_MSG_TYPE_SUPPORT(<||TopicTypeComa||>),
    "<||TopicName||>"));"#,
    ),
    (
        "handler_subscription",
        "RCCHECK(rclc_executor_add_subscription(&executor, &<||HandlerObject||>, &<||MsgName||>, &<||CallBackName||>, ON_NEW_DATA));",
    ),
    (
        "call_back_subscription",
        r"void <||CallBackName||>(const void * msgin)
{
    const <||TopicType||> * msg = (const <||TopicType||> *)msgin;
    (void) msg;
    /* handle incoming <||TopicName||> messages here */
}",
    ),
    (
        "rcl_service_t",
        r#"RCCHECK(rclc_service_init_default(
    &<||HandlerObject||>,
    &node,
    ROSIDL_GET_SRV_TYPE_SUPPORT(<||ServiceTypeComa||>),
    "<||ServiceName||>"));"#,
    ),
    (
        "handler_service",
        "RCCHECK(rclc_executor_add_service(&executor, &<||HandlerObject||>, &<||RequestMsg||>, &<||ResponseMsg||>, <||CallBackName||>));",
    ),
    (
        "call_back_service",
        r"void <||CallBackName||>(const void * request_msg, void * response_msg)
{
    <||ServiceType||>_Request * request = (<||ServiceType||>_Request *)request_msg;
    <||ServiceType||>_Response * response = (<||ServiceType||>_Response *)response_msg;
    (void) request;
    (void) response;
    /* fill the <||ServiceName||> response here */
}",
    ),
    (
        "rcl_client_t",
        r#"RCCHECK(rclc_client_init_default(
    &<||HandlerObject||>,
    &node,
    ROSIDL_GET_SRV_TYPE_SUPPORT(<||ServiceTypeComa||>),
    "<||ServiceName||>"));"#,
    ),
    (
        "client_send",
        r"int64_t <||HandlerObject||>_sequence;
RCSOFTCHECK(rcl_send_request(&<||HandlerObject||>, &<||RequestMsg||>, &<||HandlerObject||>_sequence));",
    ),
    (
        "client_take",
        r"rmw_request_id_t <||HandlerObject||>_header;
RCSOFTCHECK(rcl_take_response(&<||HandlerObject||>, &<||HandlerObject||>_header, &<||ResponseMsg||>));",
    ),
    (
        "rcl_timer_t",
        r"RCCHECK(rclc_timer_init_default(
    &<||HandlerObject||>,
    &support,
    RCL_MS_TO_NS((int64_t)(1000.0 / <||TimerRate||>)),
    <||CallBackName||>));",
    ),
    (
        "handler_timer",
        "RCCHECK(rclc_executor_add_timer(&executor, &<||HandlerObject||>));",
    ),
    (
        "call_back_timer",
        r"void <||CallBackName||>(rcl_timer_t * timer, int64_t last_call_time)
{
    (void) last_call_time;
    if (timer == NULL) {
        return;
    }
    /* periodic work at <||TimerRate||> Hz */
}",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fill_basic_substitution() {
        let result = fill(
            "hello <||Name||>, again <||Name||>",
            &mapping(&[("Name", "world")]),
        );
        assert_eq!(result, "hello world, again world");
    }

    #[test]
    fn test_fill_missing_key_renders_marker() {
        let result = fill("value: <||Missing||>", &mapping(&[]));
        assert_eq!(result, "value: <unknown:Missing>");
    }

    #[test]
    fn test_fill_is_not_recursive() {
        let result = fill("<||A||>", &mapping(&[("A", "<||B||>"), ("B", "nope")]));
        assert_eq!(result, "<||B||>");
    }

    #[test]
    fn test_fill_unterminated_opener_kept_verbatim() {
        let result = fill("start <||Key", &mapping(&[("Key", "x")]));
        assert_eq!(result, "start <||Key");
    }

    #[test]
    fn test_fill_no_placeholders() {
        let text = "plain text, no markers";
        assert_eq!(fill(text, &mapping(&[])), text);
    }

    #[test]
    fn test_default_set_covers_engine_names() {
        let set = TemplateSet::default();
        for name in [
            "rcl_publisher_t",
            "publish_data",
            "rcl_subscription_t",
            "handler_subscription",
            "call_back_subscription",
            "rcl_service_t",
            "handler_service",
            "call_back_service",
            "rcl_client_t",
            "client_send",
            "client_take",
            "rcl_timer_t",
            "handler_timer",
            "call_back_timer",
        ] {
            assert!(set.get(name).is_some(), "missing builtin template {name}");
        }
    }

    #[test]
    fn test_custom_set_from_json() {
        let set = TemplateSet::from_json_str(r#"{"greeting": "hi <||Who||>"}"#).unwrap();
        let rendered = set
            .render("greeting", &mapping(&[("Who", "there")]))
            .unwrap();
        assert_eq!(rendered, "hi there");
        assert!(set.render("absent", &mapping(&[])).is_none());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(TemplateSet::from_json_str("[1, 2]").is_err());
        assert!(TemplateSet::from_json_str("{bad").is_err());
    }
}
