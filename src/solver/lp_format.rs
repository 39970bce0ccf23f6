//! CPLEX LP text format
//!
//! Writes the objective, every live constraint row and the binary section of
//! an [`IlpModel`], so a built model can be inspected by hand or handed to an
//! external solver.
//!
//! ```text
//! \ Model growth_line_tracking
//! Minimize
//!  obj: 0 exit_t0_h0 - 16 map_t0_0_1
//! Subject To
//!  pbc_0_0: 1 exit_t0_h0 + 1 map_t0_0_1 <= 1
//!  pbc_1_0: 1 map_t0_0_1 <= 1
//! Binaries
//!  exit_t0_h0 map_t0_0_1
//! End
//! ```

use std::io::{self, Write};

use super::{IlpModel, Sense, VarId};

/// Terms per line before wrapping
const TERMS_PER_LINE: usize = 8;

fn sense_token(sense: Sense) -> &'static str {
    match sense {
        Sense::LessEqual => "<=",
        Sense::Equal => "=",
        Sense::GreaterEqual => ">=",
    }
}

fn write_terms<W: Write>(writer: &mut W, terms: &[(VarId, f64)], names: &[&str]) -> io::Result<()> {
    for (i, &(var, coef)) in terms.iter().enumerate() {
        if i > 0 && i % TERMS_PER_LINE == 0 {
            write!(writer, "\n   ")?;
        }
        let sign = if coef < 0.0 { "-" } else { "+" };
        let name = names.get(var.0).copied().unwrap_or("?");
        if i == 0 && coef >= 0.0 {
            write!(writer, " {} {}", coef, name)?;
        } else {
            write!(writer, " {} {} {}", sign, coef.abs(), name)?;
        }
    }
    Ok(())
}

/// Write `model` in LP format
///
/// Removed constraints (also pending removals) are left out. Rows without
/// terms are written as comments.
pub fn write_lp<M: IlpModel + ?Sized, W: Write>(model: &M, name: &str, mut writer: W) -> io::Result<()> {
    let names = (0..model.num_vars())
        .map(|j| model.var_name(VarId(j)))
        .collect::<Result<Vec<&str>, _>>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let objective = (0..model.num_vars())
        .map(|j| model.objective_coefficient(VarId(j)).map(|c| (VarId(j), c)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    writeln!(writer, "\\ Model {}", name)?;
    writeln!(writer, "Minimize")?;
    write!(writer, " obj:")?;
    write_terms(&mut writer, &objective, &names)?;
    writeln!(writer)?;

    writeln!(writer, "Subject To")?;
    for row in model.constraint_rows() {
        if row.expr.is_empty() {
            writeln!(writer, "\\ {}: empty row {} {}", row.name, sense_token(row.sense), row.rhs)?;
            continue;
        }
        write!(writer, " {}:", row.name)?;
        write_terms(&mut writer, row.expr.terms(), &names)?;
        writeln!(writer, " {} {}", sense_token(row.sense), row.rhs)?;
    }

    if !names.is_empty() {
        writeln!(writer, "Binaries")?;
        for chunk in names.chunks(TERMS_PER_LINE) {
            writeln!(writer, " {}", chunk.join(" "))?;
        }
    }
    writeln!(writer, "End")?;
    writer.flush()
}
