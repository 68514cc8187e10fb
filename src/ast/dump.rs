//! Textual forms of the AST.
//!
//! `to_sexpr` gives a compact one-line form that ignores locations, which is
//! what the tests compare against. `dump` gives an indented tree with each
//! node's `:line:col`.

use super::{
    ast::{Expr, TopLevel},
    statements::{FunctionDef, Prototype, PrototypeKind},
};

impl Expr {
    pub fn to_sexpr(&self) -> String {
        match self {
            Expr::Number(e) => format!("{}", e.value),
            Expr::Variable(e) => e.name.clone(),
            Expr::Unary(e) => format!("({} {})", e.opcode, e.operand.to_sexpr()),
            Expr::Binary(e) => format!("({} {} {})", e.opcode, e.lhs.to_sexpr(), e.rhs.to_sexpr()),
            Expr::Call(e) => {
                let mut out = format!("(call {}", e.callee);
                for arg in &e.args {
                    out.push(' ');
                    out.push_str(&arg.to_sexpr());
                }
                out.push(')');
                out
            }
            Expr::If(e) => format!(
                "(if {} {} {})",
                e.cond.to_sexpr(),
                e.then_branch.to_sexpr(),
                e.else_branch.to_sexpr()
            ),
            Expr::For(e) => format!(
                "(for {} {} {} {} {})",
                e.var_name,
                e.start.to_sexpr(),
                e.end.to_sexpr(),
                e.step.as_ref().map(|s| s.to_sexpr()).unwrap_or_else(|| "_".to_string()),
                e.body.to_sexpr()
            ),
            Expr::Var(e) => {
                let bindings: Vec<String> = e
                    .bindings
                    .iter()
                    .map(|(name, init)| match init {
                        Some(init) => format!("({} {})", name, init.to_sexpr()),
                        None => format!("({})", name),
                    })
                    .collect();
                format!("(var ({}) {})", bindings.join(" "), e.body.to_sexpr())
            }
        }
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        dump_expr(self, &mut out, 0);
        out
    }
}

impl Prototype {
    pub fn to_sexpr(&self) -> String {
        let kind = match self.kind {
            PrototypeKind::Function => String::new(),
            PrototypeKind::Unary(_) => " unary".to_string(),
            PrototypeKind::Binary(_, precedence) => format!(" binary {}", precedence),
        };
        format!("({}{} ({}))", self.name, kind, self.params.join(" "))
    }
}

impl FunctionDef {
    pub fn to_sexpr(&self) -> String {
        format!("(def {} {})", self.prototype.to_sexpr(), self.body.to_sexpr())
    }

    pub fn dump(&self) -> String {
        let start = &self.prototype.span.start;
        let mut out = format!(
            "function {}({}):{}:{}\n",
            self.prototype.name,
            self.prototype.params.join(", "),
            start.line,
            start.col
        );
        out.push_str("  Body:\n");
        dump_expr(&self.body, &mut out, 2);
        out
    }
}

impl TopLevel {
    pub fn dump(&self) -> String {
        match self {
            TopLevel::Definition(function) | TopLevel::Expression(function) => function.dump(),
            TopLevel::Extern(prototype) => {
                let start = &prototype.span.start;
                format!("extern {}:{}:{}\n", prototype.to_sexpr(), start.line, start.col)
            }
        }
    }
}

fn indent(ind: usize) -> String {
    "  ".repeat(ind)
}

fn line(out: &mut String, ind: usize, label: &str, expr: &Expr) {
    let start = &expr.get_span().start;
    out.push_str(&format!("{}{}:{}:{}\n", indent(ind), label, start.line, start.col));
}

fn dump_expr(expr: &Expr, out: &mut String, ind: usize) {
    match expr {
        Expr::Number(e) => line(out, ind, &format!("number {}", e.value), expr),
        Expr::Variable(e) => line(out, ind, &format!("variable {}", e.name), expr),
        Expr::Unary(e) => {
            line(out, ind, &format!("unary{}", e.opcode), expr);
            dump_expr(&e.operand, out, ind + 1);
        }
        Expr::Binary(e) => {
            line(out, ind, &format!("binary{}", e.opcode), expr);
            out.push_str(&format!("{}LHS:\n", indent(ind + 1)));
            dump_expr(&e.lhs, out, ind + 2);
            out.push_str(&format!("{}RHS:\n", indent(ind + 1)));
            dump_expr(&e.rhs, out, ind + 2);
        }
        Expr::Call(e) => {
            line(out, ind, &format!("call {}", e.callee), expr);
            for arg in &e.args {
                dump_expr(arg, out, ind + 1);
            }
        }
        Expr::If(e) => {
            line(out, ind, "if", expr);
            for (label, child) in [("Cond", &e.cond), ("Then", &e.then_branch), ("Else", &e.else_branch)] {
                out.push_str(&format!("{}{}:\n", indent(ind + 1), label));
                dump_expr(child, out, ind + 2);
            }
        }
        Expr::For(e) => {
            line(out, ind, &format!("for {}", e.var_name), expr);
            out.push_str(&format!("{}Start:\n", indent(ind + 1)));
            dump_expr(&e.start, out, ind + 2);
            out.push_str(&format!("{}End:\n", indent(ind + 1)));
            dump_expr(&e.end, out, ind + 2);
            if let Some(step) = &e.step {
                out.push_str(&format!("{}Step:\n", indent(ind + 1)));
                dump_expr(step, out, ind + 2);
            }
            out.push_str(&format!("{}Body:\n", indent(ind + 1)));
            dump_expr(&e.body, out, ind + 2);
        }
        Expr::Var(e) => {
            line(out, ind, "var", expr);
            for (name, init) in &e.bindings {
                out.push_str(&format!("{}{}:\n", indent(ind + 1), name));
                match init {
                    Some(init) => dump_expr(init, out, ind + 2),
                    None => out.push_str(&format!("{}(default 0)\n", indent(ind + 2))),
                }
            }
            out.push_str(&format!("{}Body:\n", indent(ind + 1)));
            dump_expr(&e.body, out, ind + 2);
        }
    }
}
