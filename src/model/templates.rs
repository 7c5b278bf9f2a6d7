//! The palette's static catalog of placeable element templates.

use serde::Serialize;

use super::{ElementKind, ElementStyles, TextAlign};

/// A palette entry describing what a freshly placed element starts as.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementTemplate {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_content: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_styles: Option<ElementStyles>,
}

/// The read-only template catalog, in palette order.
///
/// There is no runtime registration; the list is rebuilt on each call.
pub fn element_templates() -> Vec<ElementTemplate> {
    vec![
        ElementTemplate {
            kind: ElementKind::Text,
            label: "Text Block",
            icon: Some("text_fields"),
            default_content: Some("<p>Click to edit text</p>"),
            default_styles: Some(ElementStyles {
                color: Some("#333333".to_string()),
                font_size: Some("14px".to_string()),
                text_align: Some(TextAlign::Left),
                line_height: Some(1.5),
                ..Default::default()
            }),
        },
        ElementTemplate {
            kind: ElementKind::Image,
            label: "Image",
            icon: Some("image"),
            default_content: None,
            default_styles: Some(ElementStyles::default()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let templates = element_templates();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].kind, ElementKind::Text);
        assert_eq!(templates[0].label, "Text Block");
        assert_eq!(templates[1].kind, ElementKind::Image);
        assert!(templates[1].default_content.is_none());
    }

    #[test]
    fn test_catalog_serializes_camel_case() {
        let json = serde_json::to_value(element_templates()).unwrap();
        assert_eq!(json[0]["type"], "text");
        assert_eq!(json[0]["defaultStyles"]["fontSize"], "14px");
        assert_eq!(json[0]["defaultContent"], "<p>Click to edit text</p>");
    }
}
