//! Decoded manifest tree and the fields read from its root element.

use crate::error::{PackageError, Result};

/// A typed attribute value as stored in a compiled manifest or resource table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    String(String),
    /// A resource id (`@type/name`) to be looked up in the resource table.
    Reference(u32),
    Int(i64),
    Bool(bool),
    /// Any other value type (colors, dimensions, floats, ...), kept raw.
    Other { data_type: u8, data: u32 },
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Renders a literal value the way it would appear in source XML.
    ///
    /// References and raw values have no textual form and return `None`.
    pub fn to_plain_string(&self) -> Option<String> {
        match self {
            AttrValue::String(s) => Some(s.clone()),
            AttrValue::Int(n) => Some(n.to_string()),
            AttrValue::Bool(b) => Some(b.to_string()),
            AttrValue::Reference(_) | AttrValue::Other { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub value: AttrValue,
}

/// One element of the decoded manifest tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Looks up an attribute by local name (namespace prefixes are not kept).
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// The first child with the given name, i.e. `name[0]`.
    pub fn first_child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }
}

/// Identity and version fields of a package, plus the raw manifest tree for
/// everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestInfo {
    pub package: String,
    pub version_name: Option<String>,
    pub version_code: Option<u64>,
    pub root: XmlElement,
}

impl ManifestInfo {
    /// Builds the manifest summary from a decoded `<manifest>` root.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::MissingPackage`] if the root has no literal,
    /// non-empty `package` attribute.
    pub fn from_root(root: XmlElement) -> Result<Self> {
        if root.name != "manifest" {
            return Err(PackageError::MalformedChunk(format!(
                "expected <manifest> root element, found <{}>",
                root.name
            )));
        }

        let package = root
            .attr("package")
            .and_then(AttrValue::as_str)
            .filter(|package| !package.is_empty())
            .ok_or(PackageError::MissingPackage)?
            .to_string();

        let version_name = root.attr("versionName").and_then(AttrValue::to_plain_string);

        let version_code = root.attr("versionCode").and_then(|value| {
            match value {
                AttrValue::Int(n) => u64::try_from(*n).ok(),
                AttrValue::String(s) => s.trim().parse().ok(),
                _ => None,
            }
        });

        Ok(Self {
            package,
            version_name,
            version_code,
            root,
        })
    }

    /// The `<application>` element, if the manifest declares one.
    pub fn application(&self) -> Option<&XmlElement> {
        self.root.first_child("application")
    }

    pub fn application_label(&self) -> Option<&AttrValue> {
        self.application().and_then(|app| app.attr("label"))
    }
}
