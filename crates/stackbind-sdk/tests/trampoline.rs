//! A hand-written trampoline driven through the registry

use std::sync::Arc;

use stackbind_sdk::{
    CallContext, EvalStack, HeapObjects, MethodRegistry, MethodSignature, NativeValue, ParamKey,
    StackPtr, StackSlot, Trampoline, TypeTable, ValueKind, VmResult,
};

fn add_signature() -> MethodSignature {
    MethodSignature::new(
        "demo::Math",
        "add",
        vec![ParamKey::value("i32"), ParamKey::value("i32")],
    )
}

fn add_trampoline() -> Trampoline {
    Arc::new(
        |ctx: &mut CallContext<'_>, esp: StackPtr, _sig: &MethodSignature| -> VmResult<StackPtr> {
            let ret = esp.minus(2)?;
            let b = ctx.load(ctx.resolve_reference(esp.minus(1)?)?, ValueKind::Int32, None)?;
            let a = ctx.load(ctx.resolve_reference(esp.minus(2)?)?, ValueKind::Int32, None)?;
            let sum = match (a, b) {
                (NativeValue::I32(a), NativeValue::I32(b)) => a + b,
                _ => unreachable!(),
            };
            ctx.push_value(ret, ValueKind::Int32, &NativeValue::I32(sum))
        },
    )
}

#[test]
fn test_add_pops_window_and_pushes_result() {
    let mut registry = MethodRegistry::new();
    registry.begin_bindings().unwrap();
    registry.register(add_signature(), add_trampoline());

    let mut stack = EvalStack::new(8);
    let mut heap = HeapObjects::new();
    let types = TypeTable::new();
    stack.set(StackPtr::new(0), StackSlot::integer(2)).unwrap();
    stack.set(StackPtr::new(1), StackSlot::integer(3)).unwrap();

    let mut ctx = CallContext::new(&mut stack, &mut heap, &types);
    let esp = registry.invoke(&mut ctx, StackPtr::new(2), &add_signature()).unwrap();

    assert_eq!(esp, StackPtr::new(1));
    assert_eq!(*stack.get(StackPtr::new(0)).unwrap(), StackSlot::integer(5));
    assert!(heap.is_empty());
}

#[test]
fn test_window_underflow_is_reported() {
    let mut registry = MethodRegistry::new();
    registry.register(add_signature(), add_trampoline());

    let mut stack = EvalStack::new(4);
    let mut heap = HeapObjects::new();
    let types = TypeTable::new();
    let mut ctx = CallContext::new(&mut stack, &mut heap, &types);
    let err = registry
        .invoke(&mut ctx, StackPtr::new(1), &add_signature())
        .unwrap_err();
    assert!(matches!(err, stackbind_sdk::VmError::StackUnderflow { .. }));
}
