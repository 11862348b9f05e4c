//! Shared fixtures for engine integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use surrogate_engine::{
    ClassDescriptor, FnHook, Hook, HookError, HookInvocation, HookPhase, ImplementationTable, Literal,
    MethodDescriptor, ParameterDescriptor, PropertyDescriptor, PropertyStore, RuntimeError, Value,
    Visibility,
};

/// Class with one method per visibility, `fooMethod(bar, baz)` and
/// `publicProperty` defaulting to `"publicPropertyDefault"`
pub fn base_class() -> ClassDescriptor {
    ClassDescriptor::new("ProxyTest\\BaseClass")
        .with_method(MethodDescriptor::new("publicMethod"))
        .with_method(MethodDescriptor::new("protectedMethod").visibility(Visibility::Protected))
        .with_method(MethodDescriptor::new("privateMethod").visibility(Visibility::Private))
        .with_method(MethodDescriptor::new("publicTypeHintedMethod").with_param(
            ParameterDescriptor::new("param").typed("stdClass"),
        ))
        .with_method(
            MethodDescriptor::new("publicArrayHintedMethod")
                .with_param(ParameterDescriptor::new("param").typed("array")),
        )
        .with_method(MethodDescriptor::new("publicByReferenceMethod").by_reference())
        .with_method(
            MethodDescriptor::new("publicByReferenceParameterMethod")
                .with_param(ParameterDescriptor::new("param").by_reference())
                .with_param(ParameterDescriptor::new("byRefParam").by_reference()),
        )
        .with_method(
            MethodDescriptor::new("fooMethod")
                .with_param(ParameterDescriptor::new("bar"))
                .with_param(ParameterDescriptor::new("baz")),
        )
        .with_method(MethodDescriptor::new("staticMethod").as_static())
        .with_property(
            PropertyDescriptor::new("publicProperty")
                .with_default(Literal::Str("publicPropertyDefault".to_string())),
        )
        .with_property(
            PropertyDescriptor::new("protectedProperty")
                .visibility(Visibility::Protected)
                .with_default(Literal::Str("protectedPropertyDefault".to_string())),
        )
        .with_property(
            PropertyDescriptor::new("privateProperty")
                .visibility(Visibility::Private)
                .with_default(Literal::Str("privatePropertyDefault".to_string())),
        )
}

/// Interface counterpart of [`base_class`]
pub fn base_interface() -> ClassDescriptor {
    ClassDescriptor::interface("ProxyTest\\BaseInterface")
        .with_method(MethodDescriptor::new("publicMethod").as_abstract())
}

/// Class whose method returns its own type
pub fn class_with_self_hint() -> ClassDescriptor {
    ClassDescriptor::new("ProxyTest\\ClassWithSelfHint").with_method(
        MethodDescriptor::new("selfHintMethod")
            .with_param(ParameterDescriptor::new("parameter").typed("self"))
            .returns("self"),
    )
}

/// Class with a variadic method `buz(...names)`
pub fn class_with_variadic_method() -> ClassDescriptor {
    ClassDescriptor::new("ProxyTest\\ClassWithMethodWithVariadicFunction")
        .with_method(
            MethodDescriptor::new("buz").with_param(ParameterDescriptor::new("names").variadic()),
        )
        .with_method(
            MethodDescriptor::new("foo")
                .with_param(ParameterDescriptor::new("bar"))
                .with_param(ParameterDescriptor::new("names").typed("string").variadic()),
        )
}

/// Class with a method declared to return nothing
pub fn class_with_void_method() -> ClassDescriptor {
    ClassDescriptor::new("ProxyTest\\VoidCounter").with_method(
        MethodDescriptor::new("increment")
            .with_param(ParameterDescriptor::new("amount").optional(Literal::Int(1)))
            .returns("void"),
    )
}

/// Implementations for [`base_class`]; `fooMethod` returns `"foo"` and
/// counts its calls in `calls`
pub fn base_implementations(calls: Arc<AtomicUsize>) -> ImplementationTable {
    let noop = |_: &mut PropertyStore, _: &mut [Value]| -> Result<Value, RuntimeError> { Ok(Value::Null) };

    ImplementationTable::new()
        .with("publicMethod", noop)
        .with("protectedMethod", noop)
        .with("publicTypeHintedMethod", noop)
        .with("publicArrayHintedMethod", noop)
        .with("publicByReferenceMethod", noop)
        .with(
            "publicByReferenceParameterMethod",
            |_: &mut PropertyStore, args: &mut [Value]| -> Result<Value, RuntimeError> {
                args[1] = Value::from("modified");
                Ok(Value::Null)
            },
        )
        .with(
            "fooMethod",
            move |_: &mut PropertyStore, _: &mut [Value]| -> Result<Value, RuntimeError> {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from("foo"))
            },
        )
}

/// One recorded hook call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub phase: HookPhase,
    pub method: String,
    pub arguments: Vec<(String, Value)>,
    pub return_value: Option<Value>,
    pub target_is_proxy: bool,
}

/// Hook test double: records every call and answers with a fixed value
pub struct RecordingHook {
    name: String,
    answer: Value,
    return_early: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingHook {
    pub fn new(name: &str, answer: impl Into<Value>, return_early: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            answer: answer.into(),
            return_early,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Hook for RecordingHook {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, invocation: &mut HookInvocation<'_>) -> Result<Value, HookError> {
        self.calls.lock().unwrap().push(RecordedCall {
            phase: invocation.phase(),
            method: invocation.method.to_string(),
            arguments: invocation
                .arguments
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            return_value: invocation.return_value.cloned(),
            target_is_proxy: std::ptr::eq(invocation.proxy, invocation.target),
        });
        if self.return_early {
            invocation.return_early();
        }
        Ok(self.answer.clone())
    }
}

/// Hook that always fails
pub fn failing_hook(message: &'static str) -> Arc<dyn Hook> {
    FnHook::shared("failing", move |_| Err(HookError::new(message)))
}
