//! Tree-walking evaluator.
//!
//! `evaluate` dispatches over every AST node kind and drives execution:
//! function invocation, closures, and control-flow unwinding. Statement
//! evaluation yields a [`Completion`] rather than a bare value so a `tanga`
//! return travels as ordinary scoped control flow - each statement-sequence
//! runner checks it and short-circuits, and a function call converts it back
//! into a plain value at the call boundary. Nested and recursive calls each
//! carry their own in-flight completion; there is no shared did-return
//! state anywhere.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::ast::{BinaryOp, Expr, Program, Stmt};
use crate::environment::Environment;
use crate::error::{KinError, Result};
use crate::value::{KinFunction, KinObject, Value};

/// The outcome of evaluating a node: either it ran to the end producing a
/// value, or a return is in flight with this value.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Normal(Value),
    Return(Value),
}

impl Completion {
    /// The carried value, whichever channel it arrived on.
    pub fn value(self) -> Value {
        match self {
            Completion::Normal(v) | Completion::Return(v) => v,
        }
    }
}

/// Evaluate an expression to a plain [`Value`], forwarding an in-flight
/// return completion to the caller unchanged.
macro_rules! value_of {
    ($self:ident, $expr:expr, $env:expr) => {
        match $self.eval_expr($expr, $env)? {
            Completion::Normal(v) => v,
            ret @ Completion::Return(_) => return Ok(ret),
        }
    };
}

/// The tree-walking interpreter. Stateless: every evaluation threads the
/// environment chain explicitly, so closures can hold onto whichever scope
/// they were declared in.
#[derive(Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Interpreter
    }

    /// Execute each top-level statement in order in `env`. The result is
    /// the value of the last statement (useful for REPL display); `run`
    /// mode discards it. A top-level `tanga` ends the program early with
    /// its value.
    pub fn run_program(&self, program: &Program, env: &Rc<RefCell<Environment>>) -> Result<Value> {
        let mut last: Value = Value::Null;

        for stmt in &program.body {
            match self.evaluate(stmt, env)? {
                Completion::Normal(v) => last = v,
                Completion::Return(v) => return Ok(v),
            }
        }

        Ok(last)
    }

    /// Total dispatch over statement kinds.
    pub fn evaluate(&self, stmt: &Stmt, env: &Rc<RefCell<Environment>>) -> Result<Completion> {
        match stmt {
            Stmt::VariableDeclaration {
                constant,
                identifier,
                value,
            } => {
                let value: Value = match value {
                    Some(expr) => value_of!(self, expr, env),
                    None => Value::Null,
                };

                debug!("Declaring variable '{}' = {}", identifier, value);

                env.borrow_mut().declare(identifier, value.clone(), *constant)?;

                Ok(Completion::Normal(value))
            }

            Stmt::FunctionDeclaration {
                name,
                parameters,
                body,
            } => {
                // The closure captures the environment current at the
                // declaration site, not any later call site.
                let function = Value::Function(Rc::new(KinFunction {
                    name: name.clone(),
                    parameters: parameters.clone(),
                    body: Rc::clone(body),
                    declaration_env: Rc::clone(env),
                }));

                debug!(
                    "Declaring function '{}' with {} parameters",
                    name,
                    parameters.len()
                );

                env.borrow_mut().declare(name, function.clone(), true)?;

                Ok(Completion::Normal(function))
            }

            Stmt::Conditional {
                condition,
                body,
                alternate,
            } => {
                let test: Value = value_of!(self, condition, env);

                let Value::Bool(test) = test else {
                    return Err(KinError::type_error(format!(
                        "Condition must be a boolean, got {}",
                        test.type_name()
                    )));
                };

                if test {
                    self.eval_body(body, &Environment::child_of(env))
                } else if !alternate.is_empty() {
                    self.eval_body(alternate, &Environment::child_of(env))
                } else {
                    Ok(Completion::Normal(Value::Null))
                }
            }

            Stmt::Loop { condition, body } => {
                // One scope for the loop's lifetime; each iteration gets a
                // fresh child so body declarations don't leak across
                // iterations.
                let loop_env: Rc<RefCell<Environment>> = Environment::child_of(env);

                loop {
                    let test: Value = value_of!(self, condition, &loop_env);

                    let Value::Bool(test) = test else {
                        return Err(KinError::type_error(format!(
                            "Loop condition must be a boolean, got {}",
                            test.type_name()
                        )));
                    };

                    if !test {
                        break;
                    }

                    match self.eval_body(body, &Environment::child_of(&loop_env))? {
                        Completion::Normal(_) => {}
                        ret @ Completion::Return(_) => return Ok(ret),
                    }
                }

                Ok(Completion::Normal(Value::Null))
            }

            Stmt::Expression(expr) => self.eval_expr(expr, env),
        }
    }

    /// Run a statement sequence in `scope`, short-circuiting on an
    /// in-flight return and otherwise yielding the last statement's value.
    fn eval_body(&self, body: &[Stmt], scope: &Rc<RefCell<Environment>>) -> Result<Completion> {
        let mut last: Value = Value::Null;

        for stmt in body {
            match self.evaluate(stmt, scope)? {
                Completion::Normal(v) => last = v,
                ret @ Completion::Return(_) => return Ok(ret),
            }
        }

        Ok(Completion::Normal(last))
    }

    /// Total dispatch over expression kinds.
    fn eval_expr(&self, expr: &Expr, env: &Rc<RefCell<Environment>>) -> Result<Completion> {
        match expr {
            Expr::NumericLiteral(n) => Ok(Completion::Normal(Value::Number(*n))),

            Expr::StringLiteral(s) => Ok(Completion::Normal(Value::String(s.clone()))),

            Expr::Identifier(symbol) => {
                Ok(Completion::Normal(env.borrow().lookup(symbol)?))
            }

            Expr::ObjectLiteral(properties) => {
                let mut map: KinObject = KinObject::new();

                for property in properties {
                    // Shorthand `{key}` reads a variable named like the key
                    // from the enclosing scope.
                    let value: Value = match &property.value {
                        Some(expr) => value_of!(self, expr, env),
                        None => env.borrow().lookup(&property.key)?,
                    };

                    map.set(property.key.clone(), value);
                }

                Ok(Completion::Normal(Value::object(map)))
            }

            Expr::Binary {
                operator,
                left,
                right,
            } => {
                // Both operands evaluate eagerly; no short-circuit.
                let lhs: Value = value_of!(self, left, env);
                let rhs: Value = value_of!(self, right, env);

                Ok(Completion::Normal(self.apply_binary(*operator, lhs, rhs)?))
            }

            Expr::Assignment { assigne, value } => match assigne.as_ref() {
                Expr::Identifier(symbol) => {
                    let value: Value = value_of!(self, value, env);

                    Ok(Completion::Normal(
                        env.borrow_mut().assign(symbol, value)?,
                    ))
                }

                member @ Expr::Member { .. } => {
                    let value: Value = value_of!(self, value, env);

                    self.member_access(member, env, Some(value))
                }

                other => Err(KinError::type_error(format!(
                    "Invalid assignment target: {:?}",
                    other
                ))),
            },

            member @ Expr::Member { .. } => self.member_access(member, env, None),

            Expr::Call { caller, args } => {
                let callee: Value = value_of!(self, caller, env);

                let mut arguments: Vec<Value> = Vec::with_capacity(args.len());

                for arg in args {
                    arguments.push(value_of!(self, arg, env));
                }

                Ok(Completion::Normal(self.invoke(callee, &arguments, env)?))
            }

            Expr::Return(value) => {
                let value: Value = match value {
                    Some(expr) => value_of!(self, expr, env),
                    None => Value::Null,
                };

                Ok(Completion::Return(value))
            }
        }
    }

    /// Call a callable value with already-evaluated arguments.
    fn invoke(
        &self,
        callee: Value,
        arguments: &[Value],
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Value> {
        match callee {
            Value::NativeFunction(native) => {
                debug!("Calling native function '{}'", native.name);

                (native.func)(arguments, env)
            }

            Value::Function(func) => {
                debug!("Calling function '{}'", func.name);

                if arguments.len() != func.parameters.len() {
                    return Err(KinError::type_error(format!(
                        "Function '{}' expects {} arguments but got {}",
                        func.name,
                        func.parameters.len(),
                        arguments.len()
                    )));
                }

                // The new scope's parent is the function's declaration
                // environment, enforcing static scoping of closures.
                let scope: Rc<RefCell<Environment>> =
                    Environment::child_of(&func.declaration_env);

                for (parameter, argument) in func.parameters.iter().zip(arguments) {
                    scope.borrow_mut().declare(parameter, argument.clone(), false)?;
                }

                // The first return at any nesting depth within this call
                // becomes the call's result; fall-through yields null.
                for stmt in func.body.iter() {
                    if let Completion::Return(v) = self.evaluate(stmt, &scope)? {
                        return Ok(v);
                    }
                }

                Ok(Value::Null)
            }

            other => Err(KinError::type_error(format!(
                "Cannot call a value that is not a function: {}",
                other.type_name()
            ))),
        }
    }

    /// Nested-member reader/writer. Resolves the object side down to its
    /// backing storage, coerces the property to a string key (evaluating it
    /// first when computed), then reads the property - or writes `write`
    /// into it and echoes the written value.
    fn member_access(
        &self,
        member: &Expr,
        env: &Rc<RefCell<Environment>>,
        write: Option<Value>,
    ) -> Result<Completion> {
        let Expr::Member {
            object,
            property,
            computed,
        } = member
        else {
            return Err(KinError::type_error(format!(
                "Not a member expression: {:?}",
                member
            )));
        };

        // Chained members (`a.b.c`) resolve recursively through this same
        // dispatch: the object side of the outer member is itself a member
        // read on the root identifier's bound object.
        let target: Value = value_of!(self, object, env);

        let Value::Object(map) = target else {
            return Err(KinError::type_error(format!(
                "Cannot access a member of a non-object value of type {}",
                target.type_name()
            )));
        };

        let key: String = if *computed {
            let key: Value = value_of!(self, property, env);

            key.property_key().ok_or_else(|| {
                KinError::type_error(format!(
                    "A {} cannot be used as a property key",
                    key.type_name()
                ))
            })?
        } else {
            match property.as_ref() {
                Expr::Identifier(symbol) => symbol.clone(),
                other => {
                    return Err(KinError::type_error(format!(
                        "Member property must be an identifier, got {:?}",
                        other
                    )))
                }
            }
        };

        match write {
            Some(value) => {
                map.borrow_mut().set(key, value.clone());

                Ok(Completion::Normal(value))
            }

            // A missing property reads as null.
            None => Ok(Completion::Normal(
                map.borrow().get(&key).cloned().unwrap_or(Value::Null),
            )),
        }
    }

    /// Apply a binary operator to two already-evaluated operands.
    ///
    /// Arithmetic is defined only over numbers and quietly yields null for
    /// anything else; comparisons demand numbers; the logical operators
    /// demand booleans; equality is type-directed (see [`Value`]'s
    /// `PartialEq`).
    fn apply_binary(&self, operator: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
        match operator {
            BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),

            BinaryOp::Ne => Ok(Value::Bool(lhs != rhs)),

            BinaryOp::And | BinaryOp::Or => match (lhs, rhs) {
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match operator {
                    BinaryOp::And => a && b,
                    _ => a || b,
                })),

                (lhs, rhs) => Err(KinError::type_error(format!(
                    "Operands of '{}' must be booleans, got {} and {}",
                    operator,
                    lhs.type_name(),
                    rhs.type_name()
                ))),
            },

            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => match (lhs, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(match operator {
                    BinaryOp::Lt => a < b,
                    BinaryOp::Gt => a > b,
                    BinaryOp::Le => a <= b,
                    _ => a >= b,
                })),

                (lhs, rhs) => Err(KinError::type_error(format!(
                    "Operands of '{}' must be numbers, got {} and {}",
                    operator,
                    lhs.type_name(),
                    rhs.type_name()
                ))),
            },

            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Pow => match (lhs, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(match operator {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Mod => a % b,
                    _ => a.powf(b),
                })),

                // Non-numeric arithmetic produces null rather than failing.
                _ => Ok(Value::Null),
            },
        }
    }
}
