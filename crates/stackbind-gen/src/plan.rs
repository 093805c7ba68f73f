//! Marshalling plans
//!
//! A [`TrampolinePlan`] is the backend-independent description of one
//! trampoline: which slots to pop and how to convert them, how to reach the
//! receiver, what to call, which by-reference arguments to write back and
//! how to push the result. Both backends execute or render plans in the
//! same fixed order:
//!
//! ```text
//! window   ret = esp - (params + receiver)
//! params   reverse declaration order, highest offset first; free object args
//! receiver slot below the first parameter; resolve for value types
//! dispatch static / instance / property / indexer / operator
//! writeback by-ref params, reverse declaration order, re-resolved
//! return   void: ret; numeric: tagged slot; object: heap push
//! ```

use std::fmt;

use stackbind_sdk::{Coercion, MethodSignature, ParamKey, ValueKind};

use crate::classify::{coercion_mode, value_kind};
use crate::descriptor::{MethodDescriptor, TypeRef};
use crate::error::{GenError, GenResult};
use crate::filter::Eligible;
use crate::naming::{reference_string, trampoline_ident};

// ============================================================================
// Operators
// ============================================================================

/// Supported operator overloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `a == b`
    Equality,
    /// `a != b`
    Inequality,
    /// `a + b`
    Addition,
    /// `a - b`
    Subtraction,
    /// `a * b`
    Multiply,
    /// `a / b`
    Division,
    /// `-a`
    UnaryNegation,
}

impl Operator {
    /// Operator for the part after `op_`
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Equality" => Operator::Equality,
            "Inequality" => Operator::Inequality,
            "Addition" => Operator::Addition,
            "Subtraction" => Operator::Subtraction,
            "Multiply" => Operator::Multiply,
            "Division" => Operator::Division,
            "UnaryNegation" => Operator::UnaryNegation,
            _ => return None,
        })
    }

    /// Number of operands
    pub fn arity(self) -> usize {
        match self {
            Operator::UnaryNegation => 1,
            _ => 2,
        }
    }

    /// Source symbol
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equality => "==",
            Operator::Inequality => "!=",
            Operator::Addition => "+",
            Operator::Subtraction => "-",
            Operator::Multiply => "*",
            Operator::Division => "/",
            Operator::UnaryNegation => "-",
        }
    }
}

// ============================================================================
// Plan IR
// ============================================================================

/// Read of one parameter slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamStep {
    /// Declaration index
    pub index: usize,
    /// Parameter name
    pub name: String,
    /// Distance below the stack top
    pub offset: usize,
    /// Declared type (element type for by-ref)
    pub ty: TypeRef,
    /// Marshalling kind
    pub kind: ValueKind,
    /// Type check for object kinds
    pub coercion: Option<Coercion>,
    /// Resolve the reference kind before reading
    pub by_ref: bool,
    /// Release the slot after conversion
    pub free: bool,
}

/// Read of the receiver slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverStep {
    /// Distance below the stack top (the whole window)
    pub offset: usize,
    /// Declaring type
    pub ty: TypeRef,
    /// Marshalling kind
    pub kind: ValueKind,
    /// Type check for object receivers
    pub coercion: Option<Coercion>,
    /// Value-type receivers may arrive as references
    pub resolve: bool,
    /// Release the window slot after conversion
    pub free: bool,
}

/// What the trampoline calls.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Static method call
    Static {
        /// Method name
        method: String,
    },
    /// Instance method call on the receiver
    Instance {
        /// Method name
        method: String,
    },
    /// Property or indexer read
    PropertyGet {
        /// Property name
        property: String,
        /// First parameter is the index
        indexer: bool,
    },
    /// Property or indexer write
    PropertySet {
        /// Property name
        property: String,
        /// First parameter is the index, second the value
        indexer: bool,
    },
    /// Operator overload over the parameters
    Operator(Operator),
}

/// Write-back of one by-reference parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteBack {
    /// Declaration index of the parameter
    pub index: usize,
    /// Distance below the stack top of the original parameter slot
    pub offset: usize,
    /// Marshalling kind
    pub kind: ValueKind,
}

/// How the result reaches the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnStep {
    /// Nothing is pushed
    Void,
    /// Tagged numeric slot
    Value(ValueKind),
    /// Heap push
    Object {
        /// Replace cross-binding adapters by their interpreted instance
        unwrap_adapter: bool,
    },
}

/// Complete marshalling plan of one trampoline.
#[derive(Debug, Clone, PartialEq)]
pub struct TrampolinePlan {
    /// Trampoline identifier
    pub ident: String,
    /// Per-type ordinal
    pub ordinal: usize,
    /// Registry key
    pub signature: MethodSignature,
    /// Declaring type
    pub declaring: TypeRef,
    /// Slots consumed
    pub window: usize,
    /// Parameter reads in pop order
    pub params: Vec<ParamStep>,
    /// Receiver read for instance methods
    pub receiver: Option<ReceiverStep>,
    /// Call
    pub dispatch: Dispatch,
    /// By-reference write-backs in reverse declaration order
    pub write_backs: Vec<WriteBack>,
    /// Return handling
    pub ret: ReturnStep,
    /// Declared return type
    pub return_type: TypeRef,
}

impl TrampolinePlan {
    /// Check if the method is static
    pub fn is_static(&self) -> bool {
        self.receiver.is_none()
    }

    /// Parameter steps in declaration order
    pub fn params_in_order(&self) -> Vec<&ParamStep> {
        let mut steps: Vec<_> = self.params.iter().collect();
        steps.sort_by_key(|s| s.index);
        steps
    }
}

impl fmt::Display for TrampolinePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.ident, self.signature)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Signature key of `method` declared on `ty`
pub fn method_signature(ty: &TypeRef, method: &MethodDescriptor) -> MethodSignature {
    let params = method
        .params
        .iter()
        .map(|p| {
            let key = reference_string(&p.ty);
            if p.by_ref {
                ParamKey::by_ref(key)
            } else {
                ParamKey::value(key)
            }
        })
        .collect();
    MethodSignature::new(reference_string(ty), method.name.clone(), params)
}

fn unsupported_kind(ty: &TypeRef, method: &MethodDescriptor, offending: &TypeRef) -> GenError {
    GenError::UnsupportedKind {
        method: format!("{}::{}", reference_string(ty), method.name),
        ty: reference_string(offending),
    }
}

fn dispatch_of(ty: &TypeRef, method: &MethodDescriptor) -> GenResult<Dispatch> {
    if !method.special_name {
        return Ok(if method.is_static {
            Dispatch::Static {
                method: method.name.clone(),
            }
        } else {
            Dispatch::Instance {
                method: method.name.clone(),
            }
        });
    }

    let params = method.params.len();
    let invalid_indexer = || GenError::InvalidIndexer {
        declaring: reference_string(ty),
        name: method.name.clone(),
        params,
    };
    match method.special_parts() {
        Some(("get", property)) => {
            if params > 1 {
                return Err(invalid_indexer());
            }
            Ok(Dispatch::PropertyGet {
                property: property.to_string(),
                indexer: params >= 1,
            })
        }
        Some(("set", property)) => {
            if params == 0 || params > 2 {
                return Err(invalid_indexer());
            }
            Ok(Dispatch::PropertySet {
                property: property.to_string(),
                indexer: params >= 2,
            })
        }
        Some(("op", name)) if method.is_static => match Operator::from_name(name) {
            Some(op) if op.arity() == params => Ok(Dispatch::Operator(op)),
            _ => Err(GenError::UnsupportedOperator {
                declaring: reference_string(ty),
                name: method.name.clone(),
            }),
        },
        _ => Err(GenError::UnsupportedSpecialName {
            declaring: reference_string(ty),
            name: method.name.clone(),
        }),
    }
}

/// Build the plan for an eligible method of `ty`.
pub fn build_plan(ty: &TypeRef, eligible: Eligible<'_>) -> GenResult<TrampolinePlan> {
    let method = eligible.method;
    let dispatch = dispatch_of(ty, method)?;
    let count = method.params.len();
    let window = count + usize::from(!method.is_static);

    let mut params = Vec::with_capacity(count);
    for (index, p) in method.params.iter().enumerate().rev() {
        let kind = value_kind(&p.ty).ok_or_else(|| unsupported_kind(ty, method, &p.ty))?;
        params.push(ParamStep {
            index,
            name: p.name.clone(),
            offset: count - index,
            ty: p.ty.clone(),
            kind,
            coercion: coercion_mode(&p.ty).map(|mode| Coercion::new(reference_string(&p.ty), mode)),
            by_ref: p.by_ref,
            free: !p.by_ref && kind == ValueKind::Object,
        });
    }

    let receiver = if method.is_static {
        None
    } else {
        let kind = value_kind(ty).ok_or_else(|| unsupported_kind(ty, method, ty))?;
        Some(ReceiverStep {
            offset: window,
            ty: ty.clone(),
            kind,
            coercion: coercion_mode(ty).map(|mode| Coercion::new(reference_string(ty), mode)),
            resolve: ty.is_value_type(),
            free: !ty.is_primitive(),
        })
    };

    let write_backs = params
        .iter()
        .filter(|s| s.by_ref)
        .map(|s| WriteBack {
            index: s.index,
            offset: s.offset,
            kind: s.kind,
        })
        .collect();

    let return_type = method.return_type();
    let ret = if return_type.is_void() {
        ReturnStep::Void
    } else {
        match value_kind(&return_type) {
            Some(ValueKind::Object) => ReturnStep::Object {
                unwrap_adapter: !return_type.is_sealed(),
            },
            Some(kind) => ReturnStep::Value(kind),
            None => return Err(unsupported_kind(ty, method, &return_type)),
        }
    };

    Ok(TrampolinePlan {
        ident: trampoline_ident(&method.name, eligible.ordinal),
        ordinal: eligible.ordinal,
        signature: method_signature(ty, method),
        declaring: ty.clone(),
        window,
        params,
        receiver,
        dispatch,
        write_backs,
        ret,
        return_type,
    })
}
