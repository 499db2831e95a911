//! Properties: the UI schema a filter hands to its host.
//!
//! The host renders these as widgets bound to the settings keys of the
//! same name. Slider ranges are advisory; the filter still sanitizes what
//! it reads back.

use serde::{Deserialize, Serialize};

/// Widget kind with its constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyKind {
    Bool,
    FloatSlider { min: f64, max: f64, step: f64 },
}

/// One UI property bound to a settings key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub kind: PropertyKind,
}

/// Ordered collection of properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    items: Vec<Property>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bool(&mut self, name: &str, description: &str) {
        self.items.push(Property {
            name: name.to_string(),
            description: description.to_string(),
            kind: PropertyKind::Bool,
        });
    }

    pub fn add_float_slider(&mut self, name: &str, description: &str, min: f64, max: f64, step: f64) {
        self.items.push(Property {
            name: name.to_string(),
            description: description.to_string(),
            kind: PropertyKind::FloatSlider { min, max, step },
        });
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.items.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup() {
        let mut props = Properties::new();
        props.add_bool("show_uvs", "Show UVs");
        props.add_float_slider("border_top", "Top", 0.0, 49.0, 1.0);
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("show_uvs").unwrap().kind, PropertyKind::Bool);
        assert_eq!(
            props.get("border_top").unwrap().kind,
            PropertyKind::FloatSlider {
                min: 0.0,
                max: 49.0,
                step: 1.0
            }
        );
        assert!(props.get("missing").is_none());
    }

    #[test]
    fn order_is_preserved() {
        let mut props = Properties::new();
        props.add_bool("b", "B");
        props.add_bool("a", "A");
        let names: Vec<_> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn serializes_with_type_tag() {
        let mut props = Properties::new();
        props.add_float_slider("output_scale_x", "Scale X", 0.0, 20.0, 0.1);
        let json = serde_json::to_string(&props).unwrap();
        assert!(json.contains(r#""type":"float_slider""#));
        assert!(json.contains(r#""name":"output_scale_x""#));
        let back: Properties = serde_json::from_str(&json).unwrap();
        assert_eq!(back, props);
    }
}
