//! In-memory backend: plans compiled to closure trampolines
//!
//! Each plan is paired with the native body bound to its signature and
//! wrapped in a [`Trampoline`] that walks the plan against the live stack.

use std::sync::Arc;

use stackbind_sdk::{
    catch_native, CallContext, Location, MethodRegistry, MethodSignature, NativeCall, NativeMethodFn,
    NativeMethods, NativeValue, StackPtr, Trampoline, VmError, VmResult,
};

use crate::generate::Generation;
use crate::plan::{ReturnStep, TrampolinePlan};

/// Run one plan against the stack.
///
/// Conversion of every argument completes before the native call, so a
/// coercion failure leaves no partial write-back behind.
pub fn execute(
    plan: &TrampolinePlan,
    native: &NativeMethodFn,
    ctx: &mut CallContext<'_>,
    esp: StackPtr,
) -> VmResult<StackPtr> {
    let ret = esp.minus(plan.window)?;

    let mut args = vec![NativeValue::Null; plan.params.len()];
    for step in &plan.params {
        let at = esp.minus(step.offset)?;
        let location = if step.by_ref {
            ctx.resolve_reference(at)?
        } else {
            Location::Slot(at)
        };
        args[step.index] = ctx.load(location, step.kind, step.coercion.as_ref())?;
        if step.free {
            ctx.free(at)?;
        }
    }

    let receiver = match &plan.receiver {
        Some(step) => {
            let at = esp.minus(step.offset)?;
            let location = if step.resolve {
                ctx.resolve_reference(at)?
            } else {
                Location::Slot(at)
            };
            let value = ctx.load(location, step.kind, step.coercion.as_ref())?;
            if value.is_null() {
                return Err(VmError::NullReference(format!("receiver of {}", plan.signature)));
            }
            if step.free {
                ctx.free(at)?;
            }
            Some(value)
        }
        None => None,
    };

    let mut call = NativeCall {
        method: &plan.signature,
        receiver,
        args,
    };
    let result = catch_native(&plan.signature, || native(&mut call))?;

    // Resolved again at write time, not cached from the read phase
    for wb in &plan.write_backs {
        let location = ctx.resolve_reference(esp.minus(wb.offset)?)?;
        let value = call.args.get(wb.index).cloned().unwrap_or_default();
        ctx.store(location, wb.kind, value)?;
    }

    match plan.ret {
        ReturnStep::Void => Ok(ret),
        ReturnStep::Value(kind) => ctx.push_value(ret, kind, &result),
        ReturnStep::Object { unwrap_adapter } => ctx.push_object(ret, result, unwrap_adapter),
    }
}

/// Compile a plan and its native body into a trampoline
pub fn compile(plan: TrampolinePlan, native: NativeMethodFn) -> Trampoline {
    let plan = Arc::new(plan);
    Arc::new(
        move |ctx: &mut CallContext<'_>, esp: StackPtr, _method: &MethodSignature| -> VmResult<StackPtr> {
            execute(&plan, &native, ctx, esp)
        },
    )
}

/// Outcome of installing a generation into a registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Trampolines registered
    pub registered: usize,
    /// Signatures with no native body
    pub missing: Vec<String>,
}

/// Aggregate initializer for the closure backend.
///
/// Registers every module's trampolines in catalogue order. Plans whose
/// signature has no native body are logged and skipped. Fails if bindings
/// were already installed into `registry`.
pub fn install(
    generation: &Generation,
    natives: &NativeMethods,
    registry: &mut MethodRegistry,
) -> VmResult<InstallReport> {
    registry.begin_bindings()?;
    let mut report = InstallReport::default();
    for module in &generation.modules {
        for plan in &module.plans {
            match natives.get(&plan.signature) {
                Some(native) => {
                    registry.register(plan.signature.clone(), compile(plan.clone(), native));
                    report.registered += 1;
                }
                None => {
                    log::warn!("no native entry for {}, skipping", plan.signature);
                    report.missing.push(plan.signature.to_string());
                }
            }
        }
    }
    log::info!(
        "installed {} trampolines ({} without native entry)",
        report.registered,
        report.missing.len()
    );
    Ok(report)
}
