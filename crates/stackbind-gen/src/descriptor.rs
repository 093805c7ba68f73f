//! Type, method and parameter descriptors
//!
//! Descriptors are immutable once obtained from a catalogue. They are plain
//! serde data so a catalogue can be stored as JSON next to the build.

use serde::{Deserialize, Serialize};

// ============================================================================
// Types
// ============================================================================

/// Marshalling category of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCategory {
    /// No value (return types only)
    Void,
    /// Fixed-width primitive
    Primitive,
    /// Native value type
    Struct,
    /// Native reference type
    Class,
    /// Native interface
    Interface,
    /// Immutable string
    String,
    /// Universal object type
    Any,
    /// The interpreter's own instance type
    Script,
}

/// Identity of a native type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Namespace, segments separated by `.` or `::` (empty for none)
    #[serde(default)]
    pub namespace: String,
    /// Simple name, possibly carrying an arity marker (`` Map`2 ``)
    pub name: String,
    /// Enclosing type for nested types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<TypeRef>>,
    /// Generic arguments in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_args: Vec<TypeRef>,
    /// Marshalling category
    pub category: TypeCategory,
    /// Reference type that cannot be derived from
    #[serde(default)]
    pub sealed: bool,
}

impl TypeRef {
    fn new(namespace: &str, name: &str, category: TypeCategory) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            parent: None,
            generic_args: Vec::new(),
            category,
            sealed: false,
        }
    }

    /// A primitive such as `i32` or `Int32`
    pub fn primitive(name: &str) -> Self {
        Self::new("", name, TypeCategory::Primitive)
    }

    /// The void return type
    pub fn void() -> Self {
        Self::new("", "()", TypeCategory::Void)
    }

    /// The string type
    pub fn string() -> Self {
        Self::new("", "String", TypeCategory::String)
    }

    /// The universal object type
    pub fn any() -> Self {
        Self::new("", "object", TypeCategory::Any)
    }

    /// The interpreter's instance type
    pub fn script() -> Self {
        Self::new("", "ScriptInstance", TypeCategory::Script)
    }

    /// A native reference type
    pub fn class(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeCategory::Class)
    }

    /// A native interface
    pub fn interface(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeCategory::Interface)
    }

    /// A native value type
    pub fn structure(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeCategory::Struct)
    }

    /// Nest this type inside `parent`
    pub fn nested_in(mut self, parent: TypeRef) -> Self {
        self.namespace = parent.namespace.clone();
        self.parent = Some(Box::new(parent));
        self
    }

    /// Instantiate with generic arguments
    pub fn with_args(mut self, args: Vec<TypeRef>) -> Self {
        self.generic_args = args;
        self
    }

    /// Mark as sealed
    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    /// Check if this is the void type
    pub fn is_void(&self) -> bool {
        self.category == TypeCategory::Void
    }

    /// Check if this is a primitive
    pub fn is_primitive(&self) -> bool {
        self.category == TypeCategory::Primitive
    }

    /// Check if values of this type are copied rather than shared
    pub fn is_value_type(&self) -> bool {
        matches!(self.category, TypeCategory::Primitive | TypeCategory::Struct)
    }

    /// Check if no subtype can exist.
    ///
    /// Primitives, structs and strings are always sealed.
    pub fn is_sealed(&self) -> bool {
        self.sealed
            || matches!(
                self.category,
                TypeCategory::Primitive | TypeCategory::Struct | TypeCategory::String | TypeCategory::Void
            )
    }

    /// Simple name with a matching arity marker removed.
    ///
    /// The marker is only dropped when it agrees with the argument count;
    /// otherwise the name is kept verbatim.
    pub fn base_name(&self) -> &str {
        if let Some((base, arity)) = self.name.rsplit_once('`') {
            if !self.generic_args.is_empty() && arity.parse::<usize>().ok() == Some(self.generic_args.len()) {
                return base;
            }
        }
        &self.name
    }

    /// Namespace segments, accepting both `.` and `::` as separators
    pub fn namespace_segments(&self) -> Vec<&str> {
        if self.namespace.is_empty() {
            return Vec::new();
        }
        self.namespace
            .split("::")
            .flat_map(|s| s.split('.'))
            .collect()
    }
}

/// A declared property, used for obsolescence of its accessors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: String,
    /// Deprecated property
    #[serde(default)]
    pub obsolete: bool,
}

/// A native type with its declared members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type identity
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Declared methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    /// Declared properties
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
    /// Deprecated type
    #[serde(default)]
    pub obsolete: bool,
}

impl TypeDescriptor {
    /// Describe `ty` with no members
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            methods: Vec::new(),
            properties: Vec::new(),
            obsolete: false,
        }
    }

    /// Add a method
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a property
    pub fn property(mut self, name: &str, obsolete: bool) -> Self {
        self.properties.push(PropertyDescriptor {
            name: name.to_string(),
            obsolete,
        });
        self
    }

    /// Mark as deprecated
    pub fn obsolete(mut self) -> Self {
        self.obsolete = true;
        self
    }

    /// Property named `name`
    pub fn find_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

// ============================================================================
// Methods
// ============================================================================

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Callable from anywhere
    #[default]
    Public,
    /// Subclasses only
    Protected,
    /// Same assembly only
    Internal,
    /// Declaring type only
    Private,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Name (readability of generated code only)
    pub name: String,
    /// Parameter type (element type for by-reference parameters)
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// `ref` or `out` parameter
    #[serde(default)]
    pub by_ref: bool,
    /// Zero-based position
    #[serde(default)]
    pub position: usize,
}

/// A declared method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name (`get_X`, `op_Addition`, ...)
    pub name: String,
    /// Visibility
    #[serde(default)]
    pub visibility: Visibility,
    /// Static method
    #[serde(default)]
    pub is_static: bool,
    /// Number of open generic parameters
    #[serde(default)]
    pub generic_params: usize,
    /// Property accessor, event accessor or operator
    #[serde(default)]
    pub special_name: bool,
    /// Deprecated method
    #[serde(default)]
    pub obsolete: bool,
    /// Parameters in declaration order
    #[serde(default)]
    pub params: Vec<ParameterDescriptor>,
    /// Return type; absent means void
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
}

impl MethodDescriptor {
    fn new(name: &str, is_static: bool) -> Self {
        Self {
            name: name.to_string(),
            visibility: Visibility::Public,
            is_static,
            generic_params: 0,
            special_name: false,
            obsolete: false,
            params: Vec::new(),
            return_type: None,
        }
    }

    /// A public static method
    pub fn static_method(name: &str) -> Self {
        Self::new(name, true)
    }

    /// A public instance method
    pub fn instance(name: &str) -> Self {
        Self::new(name, false)
    }

    /// Append a by-value parameter
    pub fn param(mut self, name: &str, ty: TypeRef) -> Self {
        let position = self.params.len();
        self.params.push(ParameterDescriptor {
            name: name.to_string(),
            ty,
            by_ref: false,
            position,
        });
        self
    }

    /// Append a by-reference parameter
    pub fn param_ref(mut self, name: &str, ty: TypeRef) -> Self {
        let position = self.params.len();
        self.params.push(ParameterDescriptor {
            name: name.to_string(),
            ty,
            by_ref: true,
            position,
        });
        self
    }

    /// Set the return type
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = Some(ty);
        self
    }

    /// Mark as special-named
    pub fn special(mut self) -> Self {
        self.special_name = true;
        self
    }

    /// Mark as deprecated
    pub fn obsolete(mut self) -> Self {
        self.obsolete = true;
        self
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Declare open generic parameters
    pub fn generic(mut self, count: usize) -> Self {
        self.generic_params = count;
        self
    }

    /// Return type, with void made explicit
    pub fn return_type(&self) -> TypeRef {
        self.return_type.clone().unwrap_or_else(TypeRef::void)
    }

    /// Split a special name into its prefix and the rest (`get_Count` into
    /// `get` and `Count`)
    pub fn special_parts(&self) -> Option<(&str, &str)> {
        if !self.special_name {
            return None;
        }
        self.name.split_once('_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_matching_marker() {
        let map = TypeRef::class("demo", "Map`2").with_args(vec![TypeRef::primitive("i32"), TypeRef::string()]);
        assert_eq!(map.base_name(), "Map");
        let odd = TypeRef::class("demo", "Map`3").with_args(vec![TypeRef::primitive("i32")]);
        assert_eq!(odd.base_name(), "Map`3");
        assert_eq!(TypeRef::class("demo", "Map`2").base_name(), "Map`2");
    }

    #[test]
    fn test_namespace_segments() {
        assert_eq!(TypeRef::class("System.Collections", "List").namespace_segments(), vec!["System", "Collections"]);
        assert_eq!(TypeRef::class("std::collections", "HashMap").namespace_segments(), vec!["std", "collections"]);
        assert!(TypeRef::primitive("i32").namespace_segments().is_empty());
    }

    #[test]
    fn test_sealed_categories() {
        assert!(TypeRef::structure("demo", "Vec2").is_sealed());
        assert!(TypeRef::string().is_sealed());
        assert!(!TypeRef::class("demo", "Actor").is_sealed());
        assert!(TypeRef::class("demo", "Actor").sealed().is_sealed());
    }

    #[test]
    fn test_special_parts() {
        let getter = MethodDescriptor::instance("get_Item_Count").special();
        assert_eq!(getter.special_parts(), Some(("get", "Item_Count")));
        assert_eq!(MethodDescriptor::instance("get_X").special_parts(), None);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "type": { "namespace": "demo", "name": "Math", "category": "Class" },
            "methods": [
                { "name": "Add", "is_static": true,
                  "params": [
                    { "name": "a", "type": { "name": "i32", "category": "Primitive" } },
                    { "name": "b", "type": { "name": "i32", "category": "Primitive" }, "position": 1 }
                  ],
                  "return_type": { "name": "i32", "category": "Primitive" } }
            ]
        }"#;
        let desc: TypeDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(desc.ty.name, "Math");
        assert_eq!(desc.methods[0].params.len(), 2);
        assert_eq!(desc.methods[0].visibility, Visibility::Public);
        assert!(!desc.obsolete);
    }
}
