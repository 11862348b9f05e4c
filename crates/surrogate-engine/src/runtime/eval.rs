//! Body evaluation
//!
//! Walks a synthesized [`Body`] against one proxy instance. Locals live in
//! a [`Frame`]; early-return flags are ordinary boolean locals.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::body::{ArgumentRef, Body, Expr, HookPhase, Stmt};
use crate::builder::SynthesizedMethod;
use crate::error::RuntimeError;
use crate::interceptor::{ArgumentMap, HookInvocation};

use super::{ProxyClass, ProxyInstance, Value};

/// Parameters and locals of one call
#[derive(Debug, Default)]
pub(super) struct Frame {
    values: FxHashMap<String, Value>,
}

impl Frame {
    /// Bind caller arguments to the method's parameters
    ///
    /// Missing optional parameters take their default; a variadic parameter
    /// collects every remaining argument; surplus arguments are dropped.
    pub(super) fn bind(method: &SynthesizedMethod, arguments: &[Value]) -> Result<Self, RuntimeError> {
        let mut frame = Frame::default();

        for (position, param) in method.parameters.iter().enumerate() {
            let value = if param.is_variadic {
                Value::List(arguments.get(position..).unwrap_or_default().to_vec())
            } else if let Some(argument) = arguments.get(position) {
                argument.clone()
            } else if param.is_optional() {
                param.default.as_ref().map(Value::from).unwrap_or_default()
            } else {
                return Err(RuntimeError::MissingArgument {
                    method: method.name.clone(),
                    parameter: param.name.clone(),
                });
            };
            frame.values.insert(param.name.clone(), value);
        }

        Ok(frame)
    }

    /// Copy by-reference parameters back into the caller's arguments
    pub(super) fn write_back(&self, method: &SynthesizedMethod, arguments: &mut [Value]) {
        for (position, param) in method.parameters.iter().enumerate() {
            if !param.is_by_reference || position >= arguments.len() {
                continue;
            }
            let value = self.get(&param.name);
            if param.is_variadic {
                if let Value::List(items) = value {
                    for (slot, item) in arguments[position..].iter_mut().zip(items) {
                        *slot = item;
                    }
                }
            } else {
                arguments[position] = value;
            }
        }
    }

    fn get(&self, name: &str) -> Value {
        self.values.get(name).cloned().unwrap_or_default()
    }

    fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    fn arguments(&self, refs: &[ArgumentRef]) -> Vec<Value> {
        refs.iter().map(|a| self.get(&a.name)).collect()
    }

    fn argument_map(&self, refs: &[ArgumentRef]) -> ArgumentMap {
        refs.iter().map(|a| (a.name.clone(), self.get(&a.name))).collect()
    }
}

/// Control flow after a statement
enum Flow {
    Next,
    Return(Value),
}

/// Evaluates one method body
pub(super) struct Evaluator<'a> {
    pub(super) instance: &'a mut ProxyInstance,
    pub(super) class: &'a ProxyClass,
    pub(super) method: &'a str,
    pub(super) frame: Frame,
}

impl Evaluator<'_> {
    /// Run the body; falling off the end yields null
    pub(super) fn run(&mut self, body: &Body) -> Result<Value, RuntimeError> {
        match self.block(&body.statements)? {
            Flow::Return(value) => Ok(value),
            Flow::Next => Ok(Value::Null),
        }
    }

    fn block(&mut self, statements: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in statements {
            if let Flow::Return(value) = self.statement(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    fn statement(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Let { name, value } => {
                let value = self.expr(value)?;
                self.frame.set(name, value);
                Ok(Flow::Next)
            }
            Stmt::IfHookRegistered {
                storage,
                method,
                then,
            } => {
                if self.instance.hook(storage, method).is_some() {
                    self.block(then)
                } else {
                    Ok(Flow::Next)
                }
            }
            Stmt::IfSet { flag, then } => {
                if self.frame.get(flag).is_truthy() {
                    self.block(then)
                } else {
                    Ok(Flow::Next)
                }
            }
            Stmt::Return(value) => Ok(Flow::Return(self.expr(value)?)),
        }
    }

    fn expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::FreshFlag => Ok(Value::Bool(false)),
            Expr::Local { name } => Ok(self.frame.get(name)),
            Expr::Delegate { method, arguments } => self.delegate(method, arguments),
            Expr::CallHook {
                phase,
                storage,
                method,
                arguments,
                return_value,
                return_early,
            } => {
                let Some(hook) = self.instance.hook(storage, method) else {
                    return Ok(Value::Null);
                };
                trace!(method = %self.method, hook = hook.name(), ?phase, "calling hook");

                let argument_map = self.frame.argument_map(arguments);
                let delegated = return_value
                    .as_deref()
                    .map(|name| self.frame.get(name))
                    .unwrap_or_default();
                let proxy: &ProxyInstance = &*self.instance;
                let mut invocation = match phase {
                    HookPhase::Prefix => HookInvocation::prefix(proxy, method, &argument_map),
                    HookPhase::Suffix => {
                        HookInvocation::suffix(proxy, method, &argument_map, &delegated)
                    }
                };

                let result = hook.call(&mut invocation)?;
                let early = invocation.returns_early();
                self.frame.set(return_early, Value::Bool(early));
                Ok(result)
            }
        }
    }

    fn delegate(&mut self, method: &str, arguments: &[ArgumentRef]) -> Result<Value, RuntimeError> {
        let implementation =
            self.class
                .implementation(method)
                .ok_or_else(|| RuntimeError::Implementation {
                    method: method.to_string(),
                    message: "no implementation bound".to_string(),
                })?;

        let mut values = self.frame.arguments(arguments);
        let result = implementation.call(&mut self.instance.properties, &mut values)?;

        for (argument, value) in arguments.iter().zip(values) {
            if argument.is_by_reference {
                self.frame.set(&argument.name, value);
            }
        }
        Ok(result)
    }
}
