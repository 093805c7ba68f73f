//! Rust source backend
//!
//! Renders every binding module as a Rust source file built with `quote`,
//! plus the aggregate module that wires them into a registry. Reference
//! strings are parsed back with `syn` so every native path in the output
//! is a checked Rust type.
//!
//! Native types cross the boundary as follows:
//!
//! ```text
//! primitive        the Rust primitive (i32, f64, char, ...)
//! string           String
//! struct           the Rust type itself, unboxed by value
//! class, any, ...  NativeValue handles
//! ```
//!
//! Class and struct receivers are borrowed in place through
//! `with_native_mut`; primitive and string receivers are converted into a
//! local. Each call runs inside `catch_native`.

use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use sha2::{Digest, Sha256};

use stackbind_sdk::{Coercion, MethodSignature, ValueKind};

use crate::classify::primitive_kind;
use crate::descriptor::{TypeCategory, TypeRef};
use crate::error::{GenError, GenResult};
use crate::generate::Generation;
use crate::naming::{reference_string, sanitize};
use crate::options::GenerateOptions;
use crate::plan::{Dispatch, Operator, ParamStep, ReturnStep, TrampolinePlan};
use crate::table::{Aggregate, BindingModule, Diagnostic};

/// Prefix of the first line of every emitted file
pub const FINGERPRINT_HEADER: &str = "// fingerprint: ";

/// One rendered binding module
#[derive(Debug, Clone)]
pub struct RenderedModule {
    /// Binding identifier (file stem)
    pub ident: String,
    /// Fingerprint written to the header
    pub fingerprint: String,
    /// Complete file contents
    pub source: String,
    /// Trampolines registered by the module
    pub registrations: usize,
    /// Members the plan builder or the renderer rejected
    pub diagnostics: Vec<Diagnostic>,
}

/// A rendered generation: every module plus the aggregate
#[derive(Debug, Clone)]
pub struct RenderedGeneration {
    /// Modules in catalogue order
    pub modules: Vec<RenderedModule>,
    /// Aggregate module name (file stem)
    pub aggregate_name: String,
    /// Fingerprint of the aggregate
    pub aggregate_fingerprint: String,
    /// Aggregate file contents
    pub aggregate: String,
}

impl RenderedGeneration {
    /// Total number of registrations across modules
    pub fn registrations(&self) -> usize {
        self.modules.iter().map(|m| m.registrations).sum()
    }

    /// The aggregate with every module inlined as a `mod { ... }` block.
    ///
    /// `#[path]` module files cannot be reached from a build script's
    /// `OUT_DIR` through `include!`, so this is the form a build script
    /// writes there.
    pub fn single_file(&self) -> GenResult<String> {
        let parse = |name: &str, source: &str| {
            syn::parse_file(source).map_err(|e| GenError::Render(format!("{} does not parse: {}", name, e)))
        };
        let mut file = parse(&self.aggregate_name, &self.aggregate)?;
        for item in &mut file.items {
            let syn::Item::Mod(item_mod) = item else {
                continue;
            };
            if item_mod.content.is_some() {
                continue;
            }
            let name = item_mod.ident.to_string();
            let module = self
                .modules
                .iter()
                .find(|m| m.ident == name)
                .ok_or_else(|| GenError::Render(format!("aggregate names unknown module {}", name)))?;
            let inner = parse(&module.ident, &module.source)?;
            item_mod.attrs.retain(|attr| !attr.path().is_ident("path"));
            item_mod.attrs.extend(inner.attrs);
            item_mod.content = Some((syn::token::Brace::default(), inner.items));
            item_mod.semi = None;
        }
        Ok(format!(
            "{}{}\n// Generated by stackbind. Do not edit.\n\n{}",
            FINGERPRINT_HEADER,
            self.aggregate_fingerprint,
            prettyplease::unparse(&file)
        ))
    }
}

/// Render a whole generation
pub fn render(generation: &Generation, options: &GenerateOptions) -> GenResult<RenderedGeneration> {
    let emitter = Emitter::new(options)?;
    let modules = generation
        .modules
        .iter()
        .map(|module| emitter.module(module))
        .collect::<GenResult<Vec<_>>>()?;
    let aggregate_fingerprint = aggregate_fingerprint(&generation.aggregate, &modules);
    let aggregate = emitter.aggregate(&generation.aggregate, &aggregate_fingerprint)?;
    Ok(RenderedGeneration {
        modules,
        aggregate_name: generation.aggregate.name.clone(),
        aggregate_fingerprint,
        aggregate,
    })
}

/// Render one binding module
pub fn render_module(module: &BindingModule, options: &GenerateOptions) -> GenResult<RenderedModule> {
    Emitter::new(options)?.module(module)
}

/// Render the aggregate initializer over already rendered modules
pub fn render_aggregate(
    aggregate: &Aggregate,
    modules: &[RenderedModule],
    options: &GenerateOptions,
) -> GenResult<String> {
    let fingerprint = aggregate_fingerprint(aggregate, modules);
    Emitter::new(options)?.aggregate(aggregate, &fingerprint)
}

/// Fingerprint over the aggregate name and its modules' fingerprints
pub fn aggregate_fingerprint(aggregate: &Aggregate, modules: &[RenderedModule]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(aggregate.name.as_bytes());
    for module in modules {
        hasher.update(module.ident.as_bytes());
        hasher.update(module.fingerprint.as_bytes());
    }
    hex::encode(hasher.finalize())
}

// ============================================================================
// Emitter
// ============================================================================

fn ident(name: &str) -> GenResult<Ident> {
    syn::parse_str::<Ident>(name)
        .or_else(|_| syn::parse_str::<Ident>(&format!("r#{}", name)))
        .map_err(|_| GenError::Render(format!("{:?} is not a Rust identifier", name)))
}

fn param_var(step: &ParamStep) -> Ident {
    format_ident!("{}_{}", sanitize(&step.name), step.index)
}

/// Enum variant path segment for a runtime enum value
fn variant<T: std::fmt::Debug>(value: T) -> Ident {
    Ident::new(&format!("{:?}", value), Span::call_site())
}

/// How the receiver reaches the call
enum ReceiverUse {
    /// Static call, no receiver
    None,
    /// Converted into a local named `this`
    Local,
    /// Borrowed in place from the native payload
    Payload,
}

struct Emitter {
    rt: syn::Path,
}

impl Emitter {
    fn new(options: &GenerateOptions) -> GenResult<Self> {
        options.validate()?;
        let rt = syn::parse_str::<syn::Path>(&options.runtime_crate)
            .map_err(|e| GenError::InvalidOption(format!("runtime crate {:?}: {}", options.runtime_crate, e)))?;
        Ok(Self { rt })
    }

    /// Rust path of a native type
    fn native_type(&self, ty: &TypeRef) -> GenResult<syn::Type> {
        let reference = reference_string(ty);
        syn::parse_str::<syn::Type>(&reference)
            .map_err(|e| GenError::Render(format!("{} is not a Rust type: {}", reference, e)))
    }

    /// Rust type of a value of `ty` as seen by the native method
    fn value_type(&self, ty: &TypeRef) -> GenResult<TokenStream> {
        let rt = &self.rt;
        Ok(match ty.category {
            TypeCategory::Void => quote!(()),
            TypeCategory::Primitive => {
                let kind = primitive_kind(&ty.name)
                    .ok_or_else(|| GenError::Render(format!("unknown primitive {}", ty.name)))?;
                let name = ident(kind.rust_name())?;
                quote!(#name)
            }
            TypeCategory::String => quote!(String),
            TypeCategory::Struct => {
                let path = self.native_type(ty)?;
                quote!(#path)
            }
            TypeCategory::Class | TypeCategory::Interface | TypeCategory::Any | TypeCategory::Script => {
                quote!(#rt::NativeValue)
            }
        })
    }

    fn from_native(&self, ty: &TypeRef, value: TokenStream) -> GenResult<TokenStream> {
        let rt = &self.rt;
        if ty.category == TypeCategory::Struct {
            let path = self.native_type(ty)?;
            let reference = reference_string(ty);
            return Ok(quote!(#rt::unbox_native::<#path>(&#value, #reference)?));
        }
        let target = self.value_type(ty)?;
        Ok(quote!(<#target as #rt::FromNative>::from_native(#value)?))
    }

    fn into_native(&self, ty: &TypeRef, value: TokenStream) -> TokenStream {
        let rt = &self.rt;
        if ty.category == TypeCategory::Struct {
            let reference = reference_string(ty);
            quote!(#rt::box_native(#reference, #value))
        } else {
            quote!(#rt::IntoNative::into_native(#value))
        }
    }

    fn kind(&self, kind: ValueKind) -> TokenStream {
        let rt = &self.rt;
        let variant = variant(kind);
        quote!(#rt::ValueKind::#variant)
    }

    fn coercion(&self, coercion: Option<&Coercion>) -> TokenStream {
        let rt = &self.rt;
        match coercion {
            Some(c) => {
                let target = &c.target;
                let mode = variant(c.mode);
                quote!(Some(&#rt::Coercion::new(#target, #rt::CoercionMode::#mode)))
            }
            None => quote!(None),
        }
    }

    fn signature(&self, signature: &MethodSignature) -> TokenStream {
        let rt = &self.rt;
        let declaring = &signature.declaring;
        let name = &signature.name;
        let params = signature.params.iter().map(|p| {
            let ty = &p.ty;
            if p.by_ref {
                quote!(#rt::ParamKey::by_ref(#ty))
            } else {
                quote!(#rt::ParamKey::value(#ty))
            }
        });
        quote!(#rt::MethodSignature::new(#declaring, #name, vec![#(#params),*]))
    }

    fn param_read(&self, step: &ParamStep) -> GenResult<TokenStream> {
        let rt = &self.rt;
        let var = param_var(step);
        let ty = self.value_type(&step.ty)?;
        let offset = step.offset;
        let kind = self.kind(step.kind);
        let coercion = self.coercion(step.coercion.as_ref());
        let convert = self.from_native(&step.ty, quote!(value))?;
        let binding = if step.by_ref { quote!(mut #var) } else { quote!(#var) };
        let location = if step.by_ref {
            quote!(ctx.resolve_reference(at)?)
        } else {
            quote!(#rt::Location::Slot(at))
        };
        let free = if step.free { quote!(ctx.free(at)?;) } else { quote!() };
        Ok(quote! {
            let #binding: #ty = {
                let at = esp.minus(#offset)?;
                let location = #location;
                let value = ctx.load(location, #kind, #coercion)?;
                #free
                #convert
            };
        })
    }

    fn receiver_read(&self, plan: &TrampolinePlan) -> GenResult<(TokenStream, ReceiverUse)> {
        let rt = &self.rt;
        let Some(step) = &plan.receiver else {
            return Ok((quote!(), ReceiverUse::None));
        };
        let offset = step.offset;
        let kind = self.kind(step.kind);
        let coercion = self.coercion(step.coercion.as_ref());
        let location = if step.resolve {
            quote!(ctx.resolve_reference(at)?)
        } else {
            quote!(#rt::Location::Slot(at))
        };
        let free = if step.free { quote!(ctx.free(at)?;) } else { quote!() };
        let read = quote! {
            let this_value = {
                let at = esp.minus(#offset)?;
                let location = #location;
                let value = ctx.load(location, #kind, #coercion)?;
                if value.is_null() {
                    return Err(#rt::VmError::NullReference(format!("receiver of {}", method)));
                }
                #free
                value
            };
        };
        match step.ty.category {
            TypeCategory::Class | TypeCategory::Struct => Ok((read, ReceiverUse::Payload)),
            TypeCategory::Interface => Err(GenError::Render(format!(
                "{}: interface receivers have no payload type",
                plan.signature
            ))),
            _ => {
                let ty = self.value_type(&step.ty)?;
                let convert = self.from_native(&step.ty, quote!(this_value))?;
                Ok((
                    quote! {
                        #read
                        let mut this: #ty = #convert;
                    },
                    ReceiverUse::Local,
                ))
            }
        }
    }

    fn call(&self, plan: &TrampolinePlan) -> GenResult<TokenStream> {
        let ordered = plan.params_in_order();
        let vars: Vec<Ident> = ordered.iter().map(|s| param_var(s)).collect();
        let args: Vec<TokenStream> = ordered
            .iter()
            .zip(&vars)
            .map(|(step, var)| if step.by_ref { quote!(&mut #var) } else { quote!(#var) })
            .collect();
        let owner = if plan.is_static() {
            let ty = self.native_type(&plan.declaring)?;
            quote!(<#ty>::)
        } else {
            quote!(this.)
        };
        let static_indexer = || GenError::Render(format!("{}: static indexers have no Rust form", plan.signature));

        Ok(match &plan.dispatch {
            Dispatch::Static { method } | Dispatch::Instance { method } => {
                let method = ident(method)?;
                quote!(#owner #method(#(#args),*))
            }
            Dispatch::PropertyGet { property, indexer: false } => {
                let getter = ident(property)?;
                quote!(#owner #getter())
            }
            Dispatch::PropertyGet { indexer: true, .. } => {
                if plan.is_static() {
                    return Err(static_indexer());
                }
                let index = &vars[0];
                quote!(this[#index].clone())
            }
            Dispatch::PropertySet { property, indexer: false } => {
                let setter = ident(&format!("set_{}", property))?;
                quote!(#owner #setter(#(#args),*))
            }
            Dispatch::PropertySet { indexer: true, .. } => {
                if plan.is_static() {
                    return Err(static_indexer());
                }
                let (index, value) = (&vars[0], &vars[1]);
                quote!(this[#index] = #value)
            }
            Dispatch::Operator(op) => match op {
                Operator::UnaryNegation => {
                    let a = &vars[0];
                    quote!((-#a))
                }
                _ => {
                    let (a, b) = (&vars[0], &vars[1]);
                    let symbol: TokenStream = op
                        .symbol()
                        .parse()
                        .map_err(|_| GenError::Render(format!("operator {}", op.symbol())))?;
                    quote!((#a #symbol #b))
                }
            },
        })
    }

    fn trampoline(&self, plan: &TrampolinePlan) -> GenResult<TokenStream> {
        let rt = &self.rt;
        let name = ident(&plan.ident)?;
        let window = plan.window;

        let reads = plan
            .params
            .iter()
            .map(|step| self.param_read(step))
            .collect::<GenResult<Vec<_>>>()?;
        let (receiver, receiver_use) = self.receiver_read(plan)?;

        let call = self.call(plan)?;
        let void = plan.return_type.is_void();
        let body = if void { quote!({ #call; }) } else { call };
        let invoke = match receiver_use {
            ReceiverUse::None | ReceiverUse::Local => quote!(#rt::catch_native(method, || Ok(#body))?),
            ReceiverUse::Payload => {
                let ty = self.native_type(&plan.declaring)?;
                let reference = reference_string(&plan.declaring);
                quote! {
                    #rt::catch_native(method, || {
                        #rt::with_native_mut::<#ty, _>(&this_value, #reference, |this| #body)
                    })?
                }
            }
        };
        let invoke = if void {
            quote!(#invoke;)
        } else {
            let ret_ty = self.value_type(&plan.return_type)?;
            quote!(let result: #ret_ty = #invoke;)
        };

        let mut write_backs = Vec::with_capacity(plan.write_backs.len());
        for wb in &plan.write_backs {
            let step = plan
                .params
                .iter()
                .find(|s| s.index == wb.index)
                .ok_or_else(|| GenError::Render(format!("{}: no parameter {}", plan.signature, wb.index)))?;
            let offset = wb.offset;
            let kind = self.kind(wb.kind);
            let var = param_var(step);
            let value = self.into_native(&step.ty, quote!(#var));
            write_backs.push(quote! {
                let location = ctx.resolve_reference(esp.minus(#offset)?)?;
                ctx.store(location, #kind, #value)?;
            });
        }

        let finish = match plan.ret {
            ReturnStep::Void => quote!(Ok(ret)),
            ReturnStep::Value(kind) => {
                let kind = self.kind(kind);
                let value = self.into_native(&plan.return_type, quote!(result));
                quote!(ctx.push_value(ret, #kind, &#value))
            }
            ReturnStep::Object { unwrap_adapter } => {
                let value = self.into_native(&plan.return_type, quote!(result));
                quote!(ctx.push_object(ret, #value, #unwrap_adapter))
            }
        };

        Ok(quote! {
            fn #name(
                ctx: &mut #rt::CallContext<'_>,
                esp: #rt::StackPtr,
                method: &#rt::MethodSignature,
            ) -> #rt::VmResult<#rt::StackPtr> {
                let ret = esp.minus(#window)?;
                #(#reads)*
                #receiver
                #invoke
                #(#write_backs)*
                #finish
            }
        })
    }

    fn module(&self, module: &BindingModule) -> GenResult<RenderedModule> {
        let rt = &self.rt;
        let mut diagnostics = module.diagnostics.clone();
        let mut items = Vec::with_capacity(module.plans.len() + 2);
        let mut registrations = Vec::with_capacity(module.plans.len());

        let doc = format!(" Trampolines for `{}`", module.reference);
        items.push(quote! {
            #![doc = #doc]
            #![allow(unused_mut, unused_parens, unused_variables, non_snake_case, clippy::all)]
        });
        for plan in &module.plans {
            match self.trampoline(plan) {
                Ok(tokens) => {
                    let name = ident(&plan.ident)?;
                    let signature = self.signature(&plan.signature);
                    registrations.push(quote!(registry.register(#signature, std::sync::Arc::new(#name));));
                    items.push(tokens);
                }
                Err(err) if err.is_member_error() => {
                    log::warn!("{}: {}", plan.signature, err);
                    diagnostics.push(Diagnostic {
                        declaring: module.reference.clone(),
                        method: plan.signature.name.clone(),
                        message: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let count = registrations.len();
        items.push(quote! {
            /// Register every trampoline of this module
            pub fn register(registry: &mut #rt::MethodRegistry) {
                #(#registrations)*
            }
        });

        let header = format!(
            "{}{}\n// Generated by stackbind for {}. Do not edit.\n",
            FINGERPRINT_HEADER, module.fingerprint, module.reference
        );
        Ok(RenderedModule {
            ident: module.ident.clone(),
            fingerprint: module.fingerprint.clone(),
            source: assemble(&header, items)?,
            registrations: count,
            diagnostics,
        })
    }

    fn aggregate(&self, aggregate: &Aggregate, fingerprint: &str) -> GenResult<String> {
        let rt = &self.rt;
        let mut items = Vec::with_capacity(aggregate.modules.len() + 1);
        let mut calls = Vec::with_capacity(aggregate.modules.len());
        for module in &aggregate.modules {
            let name = ident(module)?;
            let file = format!("{}.rs", module);
            items.push(quote! {
                #[path = #file]
                pub mod #name;
            });
            calls.push(quote!(#name::register(registry);));
        }
        items.push(quote! {
            /// Register every generated binding. Fails if `registry` already
            /// holds bindings.
            pub fn initialize(registry: &mut #rt::MethodRegistry) -> #rt::VmResult<()> {
                registry.begin_bindings()?;
                #(#calls)*
                Ok(())
            }
        });
        let header = format!("{}{}\n// Generated by stackbind. Do not edit.\n", FINGERPRINT_HEADER, fingerprint);
        assemble(&header, items)
    }
}

/// Join items into a file and check that it parses
fn assemble(header: &str, items: Vec<TokenStream>) -> GenResult<String> {
    let file: TokenStream = items.into_iter().collect();
    let file = syn::parse2::<syn::File>(file)
        .map_err(|e| GenError::Render(format!("emitted code does not parse: {}", e)))?;
    Ok(format!("{}\n{}", header, prettyplease::unparse(&file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::StaticCatalogue;
    use crate::descriptor::{MethodDescriptor, TypeDescriptor};
    use crate::generate::Generator;

    fn fn_names(source: &str) -> Vec<String> {
        let file = syn::parse_file(source).unwrap();
        file.items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Fn(f) => Some(f.sig.ident.to_string()),
                _ => None,
            })
            .collect()
    }

    fn catalogue() -> StaticCatalogue {
        let i32_ty = TypeRef::primitive("i32");
        let vec2 = TypeRef::structure("demo", "Vec2");
        StaticCatalogue::from_types(vec![
            TypeDescriptor::new(TypeRef::class("demo", "Math"))
                .method(
                    MethodDescriptor::static_method("Add")
                        .param("a", i32_ty.clone())
                        .param("b", i32_ty.clone())
                        .returns(i32_ty.clone()),
                )
                .method(
                    MethodDescriptor::static_method("Swap")
                        .param_ref("a", i32_ty.clone())
                        .param_ref("b", i32_ty.clone()),
                )
                .method(MethodDescriptor::static_method("get_Pi").special().returns(TypeRef::primitive("f64"))),
            TypeDescriptor::new(vec2.clone())
                .method(
                    MethodDescriptor::static_method("op_Addition")
                        .special()
                        .param("a", vec2.clone())
                        .param("b", vec2.clone())
                        .returns(vec2.clone()),
                )
                .method(MethodDescriptor::instance("Length").returns(TypeRef::primitive("f32")))
                .method(MethodDescriptor::instance("set_X").special().param("v", TypeRef::primitive("f32"))),
            TypeDescriptor::new(TypeRef::class("demo", "Grid"))
                .method(
                    MethodDescriptor::instance("get_Item")
                        .special()
                        .param("i", i32_ty.clone())
                        .returns(TypeRef::string()),
                )
                .method(MethodDescriptor::instance("Clone").returns(TypeRef::class("demo", "Grid"))),
            TypeDescriptor::new(TypeRef::class("demo", "Table")).method(
                MethodDescriptor::static_method("get_Item")
                    .special()
                    .param("i", i32_ty)
                    .returns(TypeRef::string()),
            ),
        ]).unwrap()
    }

    #[test]
    fn test_render_modules_parse() {
        let catalogue = catalogue();
        let generation = Generator::new(&catalogue).generate().unwrap();
        let rendered = render(&generation, &GenerateOptions::default()).unwrap();

        let math = &rendered.modules[0];
        assert!(math.source.starts_with(FINGERPRINT_HEADER));
        assert_eq!(fn_names(&math.source), vec!["Add_0", "Swap_1", "get_Pi_2", "register"]);
        assert_eq!(math.registrations, 3);

        let vec2 = &rendered.modules[1];
        assert_eq!(fn_names(&vec2.source), vec!["op_Addition_0", "Length_1", "set_X_2", "register"]);

        let grid = &rendered.modules[2];
        assert_eq!(grid.registrations, 2);
        assert!(grid.diagnostics.is_empty());
    }

    #[test]
    fn test_static_indexer_becomes_diagnostic() {
        let catalogue = catalogue();
        let generation = Generator::new(&catalogue).generate().unwrap();
        let table = render_module(generation.module("demo_Table_Binding").unwrap(), &GenerateOptions::default())
            .unwrap();
        assert_eq!(table.registrations, 0);
        assert_eq!(table.diagnostics.len(), 1);
        assert_eq!(fn_names(&table.source), vec!["register"]);
    }

    #[test]
    fn test_aggregate_lists_modules_in_order() {
        let catalogue = catalogue();
        let generation = Generator::new(&catalogue).generate().unwrap();
        let rendered = render(&generation, &GenerateOptions::default()).unwrap();

        let file = syn::parse_file(&rendered.aggregate).unwrap();
        let mods: Vec<String> = file
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Mod(m) => Some(m.ident.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(
            mods,
            vec!["demo_Math_Binding", "demo_Vec2_Binding", "demo_Grid_Binding", "demo_Table_Binding"]
        );
        assert_eq!(fn_names(&rendered.aggregate), vec!["initialize"]);
    }

    #[test]
    fn test_empty_aggregate_registers_nothing() {
        let catalogue = StaticCatalogue::new();
        let generation = Generator::new(&catalogue).generate().unwrap();
        let rendered = render(&generation, &GenerateOptions::default()).unwrap();
        assert!(rendered.modules.is_empty());
        assert_eq!(rendered.registrations(), 0);
        assert!(!rendered.aggregate.contains("register("));
        assert_eq!(fn_names(&rendered.aggregate), vec!["initialize"]);
    }

    #[test]
    fn test_runtime_crate_path_is_used() {
        let catalogue = catalogue();
        let options = GenerateOptions {
            runtime_crate: "engine::sdk".to_string(),
            ..GenerateOptions::default()
        };
        let generation = Generator::with_options(&catalogue, options.clone()).generate().unwrap();
        let rendered = render(&generation, &options).unwrap();
        assert!(rendered.modules[0].source.contains("engine::sdk::CallContext"));
    }

    #[test]
    fn test_output_is_formatted() {
        let generation = Generator::new(&catalogue()).generate().unwrap();
        let rendered = render(&generation, &GenerateOptions::default()).unwrap();
        let source = &rendered.modules[0].source;
        assert!(source.starts_with(FINGERPRINT_HEADER));
        assert!(source.lines().count() > 20);
        assert!(source.lines().all(|line| line.len() < 200), "{}", source);
        assert!(rendered.aggregate.contains("#[path = \"demo_Math_Binding.rs\"]"));
    }

    #[test]
    fn test_single_file_inlines_modules() {
        let generation = Generator::new(&catalogue()).generate().unwrap();
        let rendered = render(&generation, &GenerateOptions::default()).unwrap();
        let source = rendered.single_file().unwrap();
        assert!(source.starts_with(FINGERPRINT_HEADER));
        assert!(!source.contains("#[path"));

        let file = syn::parse_file(&source).unwrap();
        let inlined: Vec<_> = file
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Mod(m) => Some((m.ident.to_string(), m.content.as_ref().map_or(0, |(_, items)| items.len()))),
                _ => None,
            })
            .collect();
        assert_eq!(inlined.len(), 4);
        assert_eq!(inlined[0].0, "demo_Math_Binding");
        // Add_0, Swap_1, get_Pi_2 and register
        assert_eq!(inlined[0].1, 4);
        assert_eq!(fn_names(&source), vec!["initialize"]);
    }

    #[test]
    fn test_keyword_method_names_are_raw() {
        assert_eq!(ident("match").unwrap().to_string(), "r#match");
        assert_eq!(ident("Add").unwrap().to_string(), "Add");
        assert!(ident("self").is_err());
        assert!(ident("a b").is_err());
    }
}
