/*!
Reading formulas in DIMACS form.

Comment lines of the form `c <variable> <name>` name a variable, as written by the [Display](std::fmt::Display) impl of a [CNF].
Other comments are skipped, and an unnamed variable is named by its number.

The variable count is the larger of the count given by the preamble (if any) and the largest variable found.

```rust
# use fm_sat::structures::dimacs::read_dimacs;
let dimacs = b"
c 1 Root
c 2 Engine
p cnf 3 3
 1     0
-2  1  0
-1  2  0
";

let cnf = read_dimacs(dimacs.as_slice()).unwrap();
assert_eq!(cnf.variables().names().collect::<Vec<_>>(), vec!["Root", "Engine", "3"]);
assert_eq!(cnf.clauses().len(), 3);
```
*/

use std::{collections::HashMap, io::BufRead, sync::Arc};

use crate::{
    structures::{literal::CLiteral, literal_set::LiteralSet, variables::Variables, CNF},
    types::err::{self, ErrorKind},
};

/// Records the name of a `c <variable> <name>` comment, if the comment has that form.
fn read_name(
    line: &str,
    line_counter: usize,
    names: &mut HashMap<usize, String>,
) -> Result<(), ErrorKind> {
    let mut details = line[1..].split_whitespace();
    let (Some(variable), Some(name)) = (details.next(), details.next()) else {
        return Ok(());
    };
    let Ok(variable) = variable.parse::<usize>() else {
        return Ok(());
    };
    if variable == 0 || names.values().any(|known| known == name) {
        return Err(err::ParseError::Line(line_counter).into());
    }
    names.insert(variable, name.to_string());
    Ok(())
}

/// Reads a formula in DIMACS form.
pub fn read_dimacs(mut reader: impl BufRead) -> Result<CNF, ErrorKind> {
    let mut names: HashMap<usize, String> = HashMap::default();
    let mut expected_variables = 0;
    let mut clauses: Vec<Vec<CLiteral>> = Vec::default();

    let mut buffer = String::with_capacity(1024);
    let mut clause_buffer: Vec<CLiteral> = Vec::default();
    let mut line_counter = 0;

    // The preamble, up to and including the problem line.
    loop {
        buffer.clear();
        match reader.read_line(&mut buffer) {
            Ok(0) => break,
            Ok(_) => line_counter += 1,
            Err(e) => return Err(err::ParseError::Io(e.to_string()).into()),
        }

        match buffer.trim_start().chars().next() {
            Some('c') => read_name(buffer.trim_start(), line_counter, &mut names)?,

            Some('p') => {
                let mut problem_details = buffer.split_whitespace().skip(2);
                let (Some(variables), Some(_clauses)) =
                    (problem_details.next(), problem_details.next())
                else {
                    return Err(err::ParseError::ProblemSpecification.into());
                };
                expected_variables = match variables.parse::<usize>() {
                    Ok(count) => count,
                    Err(_) => return Err(err::ParseError::ProblemSpecification.into()),
                };
                buffer.clear();
                break;
            }

            None => {}

            // No preamble, so the line is part of the formula.
            _ => break,
        }
    }

    // The formula, starting from the line in the buffer (if any).
    loop {
        let line = buffer.trim_start();
        match line.chars().next() {
            Some('%') => break,
            Some('c') => read_name(line, line_counter, &mut names)?,
            Some('p') => return Err(err::ParseError::Line(line_counter).into()),
            _ => {
                for item in line.split_whitespace() {
                    match item.parse::<CLiteral>() {
                        Ok(0) => clauses.push(std::mem::take(&mut clause_buffer)),
                        Ok(literal) => clause_buffer.push(literal),
                        Err(_) => return Err(err::ParseError::Line(line_counter).into()),
                    }
                }
            }
        }

        buffer.clear();
        match reader.read_line(&mut buffer) {
            Ok(0) => break,
            Ok(_) => line_counter += 1,
            Err(e) => return Err(err::ParseError::Io(e.to_string()).into()),
        }
    }

    if !clause_buffer.is_empty() {
        return Err(err::ParseError::MissingDelimiter.into());
    }

    let largest = clauses
        .iter()
        .flatten()
        .map(|literal| literal.unsigned_abs() as usize)
        .chain(names.keys().copied())
        .max()
        .unwrap_or(0);
    let count = expected_variables.max(largest);

    let mut variable_names = Vec::with_capacity(count);
    for variable in 1..=count {
        let name = names
            .remove(&variable)
            .unwrap_or_else(|| variable.to_string());
        if variable_names.contains(&name) {
            return Err(err::ParseError::ProblemSpecification.into());
        }
        variable_names.push(name);
    }

    let mut cnf = CNF::new(Arc::new(Variables::new(variable_names)));
    cnf.add_clauses(clauses.into_iter().map(LiteralSet::new))?;
    Ok(cnf)
}
