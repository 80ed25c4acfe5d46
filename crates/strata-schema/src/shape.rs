use core::fmt::Display;

use indexmap::IndexMap;
use strata_node::Node;

/// The shape a value must have.
///
/// `Ref` names another [`TypeSchema`] and is resolved lazily through a
/// [`SchemaSet`](crate::SchemaSet).
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Any,
    Null,
    Boolean,
    /// Integral numbers. Integral floats such as `2.0` are accepted.
    Integer,
    /// Any finite number, integers included.
    Number,
    String,
    /// A record of any type.
    Object,
    /// One of a fixed set of literal values.
    Enum(Vec<Node>),
    Array(Box<Shape>),
    Ref(String),
    /// Exactly one alternative must match.
    OneOf(Vec<Shape>),
    /// A string holding `format`-encoded content of shape `inner`, or a
    /// value of shape `inner` directly.
    Decode { format: String, inner: Box<Shape> },
}

impl Shape {
    pub fn array(items: Shape) -> Self {
        Shape::Array(Box::new(items))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Shape::Ref(name.into())
    }

    /// Names of every type this shape refers to, in order of appearance.
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Shape::Ref(name) => names.push(name),
            Shape::Array(items) => items.collect_references(names),
            Shape::OneOf(alternatives) => {
                for alternative in alternatives {
                    alternative.collect_references(names);
                }
            }
            Shape::Decode { inner, .. } => inner.collect_references(names),
            Shape::Any
            | Shape::Null
            | Shape::Boolean
            | Shape::Integer
            | Shape::Number
            | Shape::String
            | Shape::Object
            | Shape::Enum(_) => {}
        }
    }

    /// Whether a record whose discriminator is `type_name` selects this shape
    /// among union alternatives.
    pub fn names_type(&self, type_name: &str) -> bool {
        matches!(self, Shape::Ref(name) if name == type_name)
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Shape::Any => write!(f, "any"),
            Shape::Null => write!(f, "null"),
            Shape::Boolean => write!(f, "boolean"),
            Shape::Integer => write!(f, "integer"),
            Shape::Number => write!(f, "number"),
            Shape::String => write!(f, "string"),
            Shape::Object => write!(f, "object"),
            Shape::Enum(values) => write!(f, "one of {}", literals(values)),
            Shape::Array(items) => write!(f, "array of {items}"),
            Shape::Ref(name) => write!(f, "{name}"),
            Shape::OneOf(alternatives) => {
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i != 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{alternative}")?;
                }
                Ok(())
            }
            Shape::Decode { format, inner } => write!(f, "{inner} ({format}-encoded)"),
        }
    }
}

/// Renders a literal the way it would be written in JSON.
pub(crate) fn literal(node: &Node) -> String {
    match node.to_json() {
        Ok(value) => value.to_string(),
        Err(_) => format!("{node:?}"),
    }
}

pub(crate) fn literals(values: &[Node]) -> String {
    let rendered: Vec<String> = values.iter().map(literal).collect();
    format!("[{}]", rendered.join(", "))
}

/// A property declared by a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySchema {
    pub shape: Shape,
    /// Value filled in when the property is required but absent.
    pub default: Option<Node>,
    /// Alternative names accepted for this property.
    pub aliases: Vec<String>,
    pub description: Option<String>,
}

impl PropertySchema {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            default: None,
            aliases: Vec::new(),
            description: None,
        }
    }
}

/// A named type: either a record type with properties, or a union type
/// whose values match exactly one of `alternatives`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
    pub name: String,
    pub description: Option<String>,
    /// Declared properties, inherited ones first.
    pub properties: IndexMap<String, PropertySchema>,
    pub required: Vec<String>,
    /// Set for union types, which have no properties of their own.
    pub alternatives: Option<Vec<Shape>>,
    /// Alias to canonical property name.
    pub aliases: IndexMap<String, String>,
}

impl TypeSchema {
    pub fn is_union(&self) -> bool {
        self.alternatives.is_some()
    }

    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|required| required == name)
    }

    /// Names of every type referenced by this type's properties or
    /// alternatives, without duplicates.
    pub fn references(&self) -> Vec<String> {
        let shapes = self
            .properties
            .values()
            .map(|property| &property.shape)
            .chain(self.alternatives.iter().flatten());
        let mut names: Vec<String> = Vec::new();
        for shape in shapes {
            for name in shape.references() {
                if !names.iter().any(|seen| seen == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}
