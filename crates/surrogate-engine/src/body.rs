//! Synthesized method bodies
//!
//! A body is a small, target-neutral statement tree. Synthesizers produce
//! it; materializers either print it as source or evaluate it directly.
//!
//! Bodies only ever contain straight-line code plus two kinds of guard:
//! "is a hook registered for this method" and "did the hook ask to
//! return early". Both guards can only end the body with a `return`.

use serde::Serialize;

use crate::descriptor::ParameterDescriptor;

/// Hook phase around the delegation statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookPhase {
    /// Before delegation
    Prefix,
    /// After delegation
    Suffix,
}

/// Reference to a method parameter inside a body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentRef {
    /// Parameter name
    pub name: String,
    /// Holds the collected variadic values
    pub is_variadic: bool,
    /// Passed by reference
    pub is_by_reference: bool,
}

impl From<&ParameterDescriptor> for ArgumentRef {
    fn from(param: &ParameterDescriptor) -> Self {
        Self {
            name: param.name.clone(),
            is_variadic: param.is_variadic,
            is_by_reference: param.is_by_reference,
        }
    }
}

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum Expr {
    /// The absence sentinel
    Null,
    /// A fresh early-return flag, initially unset
    FreshFlag,
    /// Read a local variable or parameter
    Local {
        /// Variable name
        name: String,
    },
    /// Call the original implementation of `method`
    Delegate {
        /// Method to call
        method: String,
        /// Forwarded parameters, in declaration order
        arguments: Vec<ArgumentRef>,
    },
    /// Invoke the hook registered for `method` in `storage`
    CallHook {
        /// Phase of the hook
        phase: HookPhase,
        /// Hook storage member
        storage: String,
        /// Key in the hook storage
        method: String,
        /// Parameters forming the name → value mapping
        arguments: Vec<ArgumentRef>,
        /// Local holding the delegation result (suffix phase only)
        return_value: Option<String>,
        /// Local holding the early-return flag
        return_early: String,
    },
}

impl Expr {
    /// Shorthand for [`Expr::Local`]
    pub fn local(name: impl Into<String>) -> Self {
        Expr::Local { name: name.into() }
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    /// Bind a local
    Let {
        /// Local name
        name: String,
        /// Bound value
        value: Expr,
    },
    /// Run `then` only if `storage` holds a hook for `method`
    IfHookRegistered {
        /// Hook storage member
        storage: String,
        /// Key in the hook storage
        method: String,
        /// Guarded statements
        then: Vec<Stmt>,
    },
    /// Run `then` only if the flag local is set
    IfSet {
        /// Flag local
        flag: String,
        /// Guarded statements
        then: Vec<Stmt>,
    },
    /// Leave the method with a value
    Return(Expr),
}

/// Complete method body
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Body {
    /// Top-level statements
    pub statements: Vec<Stmt>,
}

impl Body {
    /// Create a body from statements
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }

    /// Visit every statement, depth first
    pub fn walk(&self, visit: &mut impl FnMut(&Stmt)) {
        fn walk_all(statements: &[Stmt], visit: &mut impl FnMut(&Stmt)) {
            for stmt in statements {
                visit(stmt);
                match stmt {
                    Stmt::IfHookRegistered { then, .. } | Stmt::IfSet { then, .. } => {
                        walk_all(then, visit)
                    }
                    Stmt::Let { .. } | Stmt::Return(_) => {}
                }
            }
        }
        walk_all(&self.statements, visit);
    }

    /// Whether any statement calls the original implementation
    pub fn contains_delegation(&self) -> bool {
        let mut found = false;
        self.walk(&mut |stmt| {
            let expr = match stmt {
                Stmt::Let { value, .. } => value,
                Stmt::Return(value) => value,
                _ => return,
            };
            found |= matches!(expr, Expr::Delegate { .. });
        });
        found
    }

    /// Hook phases the body may invoke, in body order
    pub fn hook_phases(&self) -> Vec<HookPhase> {
        let mut phases = Vec::new();
        self.walk(&mut |stmt| {
            if let Stmt::Let {
                value: Expr::CallHook { phase, .. },
                ..
            } = stmt
            {
                phases.push(*phase);
            }
        });
        phases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_body_has_no_delegation() {
        let body = Body::new(vec![Stmt::Return(Expr::Null)]);
        assert!(!body.contains_delegation());
        assert!(body.hook_phases().is_empty());
    }

    #[test]
    fn test_walk_reaches_nested_statements() {
        let body = Body::new(vec![
            Stmt::IfHookRegistered {
                storage: "pre".to_string(),
                method: "run".to_string(),
                then: vec![Stmt::IfSet {
                    flag: "returnEarly".to_string(),
                    then: vec![Stmt::Return(Expr::Null)],
                }],
            },
            Stmt::Let {
                name: "returnValue".to_string(),
                value: Expr::Delegate {
                    method: "run".to_string(),
                    arguments: Vec::new(),
                },
            },
        ]);

        let mut count = 0;
        body.walk(&mut |_| count += 1);
        assert_eq!(count, 4);
        assert!(body.contains_delegation());
    }
}
