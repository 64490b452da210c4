//! Export of an `AssembledSystem` in CPLEX LP format, readable by most MIP solvers.

use std::fmt::Write as _;
use std::io::{self, Write};

use itertools::Itertools;

use super::{AssembledSystem, LinExpr, VarType};

/// Terms per line before wrapping, the format limits line length
const TERMS_PER_LINE: usize = 8;

fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl AssembledSystem {
    fn render_terms(&self, expr: &LinExpr) -> String {
        let terms = expr
            .terms()
            .iter()
            .filter(|(_, coeff)| *coeff != 0.0)
            .enumerate()
            .map(|(k, (var, coeff))| {
                let name = &self.vars()[*var].name;
                let sign = if *coeff < 0.0 { "-" } else { "+" };
                let magnitude = coeff.abs();
                let term = if magnitude == 1.0 {
                    name.to_string()
                } else {
                    format!("{} {}", number(magnitude), name)
                };
                match (k, sign) {
                    (0, "+") => term,
                    _ => format!("{} {}", sign, term),
                }
            })
            .chunks(TERMS_PER_LINE)
            .into_iter()
            .map(|mut line| line.join(" "))
            .join("\n   ");

        if terms.is_empty() {
            "0".to_string()
        } else {
            terms
        }
    }

    /// Writes the system in CPLEX LP format
    pub fn write_lp<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "\\* {} ({}) *\\", self.name(), self.run_id())?;
        writeln!(writer, "Minimize")?;
        writeln!(writer, " obj: {}", self.render_terms(self.objective()))?;
        writeln!(writer, "Subject To")?;
        for c in self.constraints() {
            writeln!(
                writer,
                " {}: {} = {}",
                c.name,
                self.render_terms(&c.lhs),
                number(c.rhs)
            )?;
        }

        // Variables default to [0, inf), only other bounds are written
        let bounds = self
            .vars()
            .iter()
            .filter(|v| v.lower != 0.0 || v.upper.is_finite())
            .fold(String::new(), |mut out, v| {
                let upper = if v.upper.is_finite() {
                    number(v.upper)
                } else {
                    "+inf".to_string()
                };
                let _ = writeln!(out, " {} <= {} <= {}", number(v.lower), v.name, upper);
                out
            });
        if !bounds.is_empty() {
            writeln!(writer, "Bounds")?;
            write!(writer, "{}", bounds)?;
        }

        let integers = self
            .vars()
            .iter()
            .filter(|v| v.vtype == VarType::Integer)
            .map(|v| v.name.as_str())
            .chunks(TERMS_PER_LINE);
        let mut integers = integers.into_iter().peekable();
        if integers.peek().is_some() {
            writeln!(writer, "General")?;
            for mut line in integers {
                writeln!(writer, " {}", line.join(" "))?;
            }
        }

        writeln!(writer, "End")
    }

    pub fn to_lp_string(&self) -> String {
        let mut buffer = Vec::new();
        self.write_lp(&mut buffer)
            .expect("writing into a Vec<u8> never fails");
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::PlanningConfig;
    use crate::model::{ModelBuilder, ModelInputs};
    use ndarray::{arr1, arr2};

    fn lp() -> String {
        let config = PlanningConfig::new(2, 3, 2).unwrap();
        let inputs = ModelInputs {
            costs: arr2(&[[0.0, 2.0], [2.0, 0.0]]),
            sigma: arr1(&[5.0, 5.0]),
            theta: arr1(&[1.0, 0.0]),
            alpha: arr2(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            beta: arr2(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
        };
        ModelBuilder::new(&config)
            .build(&inputs)
            .unwrap()
            .to_lp_string()
    }

    #[test]
    fn has_all_sections_in_order() {
        let lp = lp();
        let positions: Vec<usize> = ["Minimize", "Subject To", "General", "End"]
            .iter()
            .map(|section| lp.find(section).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!lp.contains("Bounds"));
    }

    #[test]
    fn writes_every_constraint() {
        let lp = lp();
        assert!(lp.contains(" init_cap_0: A_0_0_0 + D_0_0 = 5"));
        assert!(lp.contains(" init_backlog_0: A_0_0_0 + A_0_1_0 + H_0_0 = 1"));
        for name in ["cap_bal_1_1", "cap_recycle_0_2", "backlog_bal_1_2"] {
            assert!(lp.contains(&format!(" {}: ", name)), "missing {}", name);
        }
    }

    #[test]
    fn skips_zero_costs_in_objective() {
        let lp = lp();
        assert!(lp.contains(" obj: 300 H_0_0"));
        assert!(lp.contains("2 A_0_1_0"));
        assert!(!lp.contains("0 A_0_0_0"));
    }

    #[test]
    fn declares_all_variables_integer() {
        let lp = lp();
        let general = &lp[lp.find("General").unwrap()..lp.find("End").unwrap()];
        assert_eq!(general.split_whitespace().count(), 1 + 12 + 6 + 6);
    }
}
