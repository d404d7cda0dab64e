//! CPLEX LP text format writer.
//!
//! The output depends only on the program's insertion order, so identical
//! programs always serialize to identical bytes.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::{Cmp, LinExpr, LinearProgram, Sense, VarKind};

const TERMS_PER_LINE: usize = 8;

impl LinearProgram {
    /// Writes the program in CPLEX LP format.
    pub fn write_lp(&self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(self.to_lp_string().as_bytes())
    }

    /// Writes the program in CPLEX LP format to `path`, replacing any
    /// existing file.
    pub fn write_lp_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_lp(&mut writer)?;
        writer.flush()
    }

    /// Renders the program in CPLEX LP format.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_cvrptw::lp::{Cmp, LinExpr, LinearProgram, Sense, VarKind};
    ///
    /// let mut lp = LinearProgram::new("tiny");
    /// let x = lp.add_var("x", VarKind::Binary, 0.0, 1.0);
    /// lp.add_constraint("pick", LinExpr::from(x), Cmp::Eq, LinExpr::constant_expr(1.0));
    /// let mut obj = LinExpr::new();
    /// obj.add_term(x, 2.5);
    /// lp.set_objective(obj, Sense::Minimize);
    ///
    /// let text = lp.to_lp_string();
    /// assert!(text.contains(" obj: 2.5 x\n"));
    /// assert!(text.contains(" pick: x = 1\n"));
    /// assert!(text.ends_with("End\n"));
    /// ```
    pub fn to_lp_string(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "\\ Problem: {}", self.name());
        s.push_str(match self.sense() {
            Sense::Minimize => "Minimize\n",
            Sense::Maximize => "Maximize\n",
        });
        s.push_str(" obj:");
        self.push_expr(&mut s, self.objective());
        s.push('\n');

        s.push_str("Subject To\n");
        for c in self.constraints() {
            let op = match c.cmp {
                Cmp::Le => "<=",
                Cmp::Ge => ">=",
                Cmp::Eq => "=",
            };
            if c.expr.terms().is_empty() {
                // LP format has no syntax for constant rows.
                let _ = writeln!(s, "\\ {}: 0 {} {}", c.name, op, format_num(c.rhs));
                continue;
            }
            let _ = write!(s, " {}:", c.name);
            self.push_expr(&mut s, &c.expr);
            let _ = writeln!(s, " {} {}", op, format_num(c.rhs));
        }

        s.push_str("Bounds\n");
        for v in self.variables() {
            if v.kind == VarKind::Binary && v.lower == 0.0 && v.upper == 1.0 {
                continue;
            }
            let name = &v.name;
            let (lo, up) = (v.lower, v.upper);
            if lo == up {
                let _ = writeln!(s, " {} = {}", name, format_num(lo));
            } else if lo == f64::NEG_INFINITY && up == f64::INFINITY {
                let _ = writeln!(s, " {} free", name);
            } else if up == f64::INFINITY {
                if lo != 0.0 {
                    let _ = writeln!(s, " {} >= {}", name, format_num(lo));
                }
            } else {
                let _ = writeln!(s, " {} <= {} <= {}", format_num(lo), name, format_num(up));
            }
        }

        self.push_names(&mut s, "Binaries", VarKind::Binary);
        self.push_names(&mut s, "Generals", VarKind::Integer);
        s.push_str("End\n");
        s
    }

    fn push_expr(&self, s: &mut String, expr: &LinExpr) {
        for (k, &(var, coeff)) in expr.terms().iter().enumerate() {
            if k > 0 && k % TERMS_PER_LINE == 0 {
                s.push_str("\n  ");
            }
            let name = &self.variable(var).name;
            let sign = if coeff < 0.0 { "-" } else { "+" };
            let magnitude = coeff.abs();
            if k == 0 && sign == "+" {
                s.push(' ');
            } else {
                let _ = write!(s, " {} ", sign);
            }
            if magnitude == 1.0 {
                s.push_str(name);
            } else {
                let _ = write!(s, "{} {}", format_num(magnitude), name);
            }
        }
    }

    fn push_names(&self, s: &mut String, header: &str, kind: VarKind) {
        let names: Vec<&str> = self
            .variables()
            .iter()
            .filter(|v| v.kind == kind)
            .map(|v| v.name.as_str())
            .collect();
        if names.is_empty() {
            return;
        }
        let _ = writeln!(s, "{}", header);
        for chunk in names.chunks(TERMS_PER_LINE) {
            let _ = writeln!(s, " {}", chunk.join(" "));
        }
    }
}

fn format_num(value: f64) -> String {
    if value == f64::INFINITY {
        "+inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{}", value)
    }
}
