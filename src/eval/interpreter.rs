//! Tree-walking evaluator for MicroScala.
//!
//! This module implements evaluation of a parsed [`Program`]: globals are
//! installed into the environment, `main` runs in its own frame, and each
//! function call pushes a fresh frame for the activation. `println` output
//! goes to the writer the interpreter was constructed with.

use crate::ast::{BinaryOp, Expr, Function, Program, Stmt, Type, UnaryOp};
use crate::eval::value::{Environment, EvalError, Value};
use std::io::Write;

/// The MicroScala interpreter.
///
/// Walks the AST of one program. Construction takes the output sink for
/// `println`, so tests can capture output in a buffer while the CLI hands
/// in locked stdout.
///
/// # Example
///
/// ```rust
/// use microscala::eval::Interpreter;
/// use microscala::parse_source;
///
/// let program = parse_source(
///     "object P { def main(args : Array[String]) { println(1 + 2 * 3); } }",
/// )
/// .unwrap();
///
/// let mut out = Vec::new();
/// Interpreter::new(&program, &mut out).run().unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "7\n");
/// ```
#[derive(Debug)]
pub struct Interpreter<'p, W> {
    /// The program under evaluation
    program: &'p Program,

    /// The scope-stack environment
    env: Environment,

    /// Sink for `println` output
    out: W,
}

impl<'p, W: Write> Interpreter<'p, W> {
    /// Creates an interpreter for the given program, writing `println`
    /// output to `out`.
    pub fn new(program: &'p Program, out: W) -> Self {
        Self {
            program,
            env: Environment::new(),
            out,
        }
    }

    /// Returns the environment, for inspection after a run.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Runs the program: installs the globals, enters `main`, and executes
    /// its body. Every detectable runtime error is terminal.
    pub fn run(&mut self) -> Result<(), EvalError> {
        let program = self.program;

        if program.main.body.is_empty() {
            return Err(EvalError::new("empty file"));
        }

        for var in &program.globals {
            self.env.assign(&var.name, Value::from_literal(&var.value));
        }

        self.env.push_frame();
        for var in &program.main.locals {
            self.env.assign(&var.name, Value::from_literal(&var.value));
        }

        // main's frame stays in place after the run; only call frames are
        // transient.
        self.exec_block(&program.main.body).map(|_| ())
    }

    /// Executes a statement sequence, stopping at the first `return`.
    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<Option<Value>, EvalError> {
        for stmt in stmts {
            if let Some(value) = self.exec_stmt(stmt)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Executes one statement. Returns `Some` when a `return` produced the
    /// activation's result.
    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Option<Value>, EvalError> {
        match stmt {
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.exec_stmt(then_branch)
                } else if let Some(els) = else_branch {
                    self.exec_stmt(els)
                } else {
                    Ok(None)
                }
            }

            Stmt::While { cond, body } => {
                while self.eval_expr(cond)?.is_truthy() {
                    if let Some(value) = self.exec_stmt(body)? {
                        return Ok(Some(value));
                    }
                }
                Ok(None)
            }

            Stmt::Assign { name, value } => {
                let value = self.eval_expr(value)?;
                self.env.assign(name, value);
                Ok(None)
            }

            Stmt::Println { expr } => {
                let value = self.eval_expr(expr)?;
                writeln!(self.out, "{}", value)
                    .map_err(|err| EvalError::new(format!("write failed: {}", err)))?;
                Ok(None)
            }

            Stmt::Block(stmts) => self.exec_block(stmts),

            Stmt::Return(expr) => Ok(Some(self.eval_expr(expr)?)),
        }
    }

    /// Evaluates an expression to a value.
    ///
    /// Boolean-producing operators yield `Int(1)` or `Int(0)`; conditions
    /// are these values tested for truthiness.
    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),

            Expr::Nil => Ok(Value::List(Vec::new())),

            Expr::Var(name) => self
                .env
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvalError::undefined_variable(name)),

            Expr::Call { name, args } => self.call_function(name, args),

            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                self.eval_unary(*op, value)
            }

            Expr::Binary { op, lhs, rhs } => {
                // Both operands are always evaluated; && and || do not
                // short-circuit.
                let lhs = self.eval_expr(lhs)?;
                let rhs = self.eval_expr(rhs)?;
                self.eval_binary(*op, lhs, rhs)
            }
        }
    }

    /// Evaluates a unary operation on an already-evaluated operand.
    fn eval_unary(&self, op: UnaryOp, value: Value) -> Result<Value, EvalError> {
        match op {
            UnaryOp::Not => Ok(Value::Int(i64::from(!value.is_truthy()))),

            UnaryOp::Neg => match value {
                Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
                Value::List(_) => Err(EvalError::unsupported_operand("-", value.type_name())),
            },

            UnaryOp::Head => match value {
                Value::List(items) => match items.first() {
                    Some(first) => Ok(Value::Int(*first)),
                    None => Err(EvalError::head_of_empty()),
                },
                // head of an integer is the integer
                Value::Int(n) => Ok(Value::Int(n)),
            },

            UnaryOp::Tail => match value {
                Value::List(items) => {
                    if items.is_empty() {
                        return Err(EvalError::tail_of_empty());
                    }
                    // tail drops the first AND last elements; pinned
                    // language behavior, not an off-by-one.
                    let inner = if items.len() <= 2 {
                        Vec::new()
                    } else {
                        items[1..items.len() - 1].to_vec()
                    };
                    Ok(Value::List(inner))
                }
                // tail of an integer is the integer
                Value::Int(n) => Ok(Value::Int(n)),
            },

            UnaryOp::IsEmpty => match value {
                Value::List(items) => Ok(Value::Int(i64::from(items.is_empty()))),
                // integers have length zero for isEmpty purposes
                Value::Int(_) => Ok(Value::Int(1)),
            },
        }
    }

    /// Evaluates a binary operation on already-evaluated operands.
    fn eval_binary(&self, op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
        match op {
            BinaryOp::Add => match (&lhs, &rhs) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
                (Value::List(a), Value::List(b)) => {
                    let mut items = a.clone();
                    items.extend_from_slice(b);
                    Ok(Value::List(items))
                }
                _ => Err(self.binary_type_error(op, &lhs, &rhs)),
            },

            BinaryOp::Sub => match (&lhs, &rhs) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(*b))),
                _ => Err(self.binary_type_error(op, &lhs, &rhs)),
            },

            BinaryOp::Mul => match (&lhs, &rhs) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(*b))),
                _ => Err(self.binary_type_error(op, &lhs, &rhs)),
            },

            BinaryOp::Div => match (&lhs, &rhs) {
                (Value::Int(_), Value::Int(0)) => Err(EvalError::division_by_zero()),
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(floor_div(*a, *b))),
                _ => Err(self.binary_type_error(op, &lhs, &rhs)),
            },

            BinaryOp::Cons => Ok(cons(lhs, rhs)),

            BinaryOp::Eq => Ok(Value::Int(i64::from(values_equal(&lhs, &rhs)))),
            BinaryOp::Ne => Ok(Value::Int(i64::from(!values_equal(&lhs, &rhs)))),

            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => match (&lhs, &rhs) {
                (Value::Int(a), Value::Int(b)) => {
                    let holds = match op {
                        BinaryOp::Lt => a < b,
                        BinaryOp::Le => a <= b,
                        BinaryOp::Gt => a > b,
                        _ => a >= b,
                    };
                    Ok(Value::Int(i64::from(holds)))
                }
                _ => Err(self.binary_type_error(op, &lhs, &rhs)),
            },

            BinaryOp::And => Ok(Value::Int(i64::from(lhs.is_truthy() && rhs.is_truthy()))),
            BinaryOp::Or => Ok(Value::Int(i64::from(lhs.is_truthy() || rhs.is_truthy()))),
        }
    }

    fn binary_type_error(&self, op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalError {
        EvalError::unsupported_operand(
            &op.to_string(),
            &format!("{} and {}", lhs.type_name(), rhs.type_name()),
        )
    }

    /// Performs a function call.
    ///
    /// Resolves the callee by exact name, checks arity, evaluates the
    /// actuals in the caller's frame, type-checks them against the
    /// formals, then runs the body in a fresh frame. The frame is popped
    /// on the error path too, so the environment stays clean.
    fn call_function(&mut self, name: &str, args: &[Expr]) -> Result<Value, EvalError> {
        let program = self.program;
        let func = program
            .functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| EvalError::undefined_function(name))?;

        if args.len() < func.params.len() {
            return Err(EvalError::not_enough_arguments(
                name,
                args.len(),
                func.params.len(),
            ));
        }
        if args.len() > func.params.len() {
            return Err(EvalError::too_many_arguments(
                name,
                args.len(),
                func.params.len(),
            ));
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }

        for (formal, actual) in func.params.iter().zip(&values) {
            let matches = matches!(
                (formal.ty, actual),
                (Type::Int, Value::Int(_)) | (Type::IntList, Value::List(_))
            );
            if !matches {
                return Err(EvalError::type_mismatch(
                    name,
                    &formal.name,
                    actual.type_name(),
                    &formal.ty.to_string(),
                ));
            }
        }

        self.env.push_frame();
        for (formal, value) in func.params.iter().zip(values) {
            self.env.assign(&formal.name, value);
        }
        for var in &func.locals {
            self.env.assign(&var.name, Value::from_literal(&var.value));
        }

        let result = self.exec_block(&func.body);
        self.env.pop_frame();

        match result? {
            Some(value) => Ok(value),
            None => Err(missing_return(func)),
        }
    }
}

/// Floor division, matching the language's `/`. Rust's native `/`
/// truncates toward zero and would differ on negative operands.
fn floor_div(a: i64, b: i64) -> i64 {
    let quotient = a.wrapping_div(b);
    let remainder = a.wrapping_rem(b);
    if remainder != 0 && (remainder < 0) != (b < 0) {
        quotient - 1
    } else {
        quotient
    }
}

/// The `::` operator. An integer on the left prepends, a list on the left
/// concatenates; an integer on the right is treated as a singleton.
fn cons(lhs: Value, rhs: Value) -> Value {
    match (lhs, rhs) {
        (Value::Int(a), Value::List(xs)) => {
            let mut items = Vec::with_capacity(xs.len() + 1);
            items.push(a);
            items.extend(xs);
            Value::List(items)
        }
        (Value::List(mut xs), Value::List(ys)) => {
            xs.extend(ys);
            Value::List(xs)
        }
        (Value::Int(a), Value::Int(b)) => Value::List(vec![a, b]),
        (Value::List(mut xs), Value::Int(b)) => {
            xs.push(b);
            Value::List(xs)
        }
    }
}

/// Equality across the two value shapes: ints by value, lists element-wise
/// with equal lengths, mixed shapes never equal.
fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::List(a), Value::List(b)) => a == b,
        _ => false,
    }
}

fn missing_return(func: &Function) -> EvalError {
    EvalError::new(format!("Missing return in function {}", func.name))
}
