//! DIMACS CNF format parser.
//!
//! Standard format used in SAT competitions. Parsing is strict: the `p cnf`
//! header must precede all clauses, literals must stay within the declared
//! variable range, and every token must be a valid integer. The engine
//! derives its fixed variable count from the header, so leniency here would
//! surface as miscounted candidates later.

use keel_base::{Error, Lit, Result};
use std::io::{BufRead, BufReader, Read};

/// A DIMACS CNF formula.
#[derive(Debug, Clone)]
pub struct DimacsCnf {
    /// Number of variables declared in the header.
    pub num_vars: i32,
    /// Clauses as vectors of literals.
    pub clauses: Vec<Vec<Lit>>,
}

impl DimacsCnf {
    /// Parses DIMACS CNF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = BufReader::new(reader);
        let mut num_vars: i32 = 0;
        let mut clauses = Vec::new();
        let mut clause: Vec<Lit> = Vec::new();
        let mut header_found = false;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('c') {
                continue;
            }

            // Parse header
            if let Some(rest) = line.strip_prefix('p') {
                if header_found {
                    return Err(Error::Parse("duplicate 'p cnf' header".to_string()));
                }
                let parts: Vec<&str> = rest.split_whitespace().collect();
                if parts.len() != 3 || parts[0] != "cnf" {
                    return Err(Error::Parse(format!("invalid header '{line}'")));
                }
                num_vars = parts[1]
                    .parse()
                    .map_err(|e| Error::Parse(format!("invalid variable count: {e}")))?;
                let _num_clauses: usize = parts[2]
                    .parse()
                    .map_err(|e| Error::Parse(format!("invalid clause count: {e}")))?;
                if num_vars < 0 {
                    return Err(Error::Parse(format!(
                        "negative variable count {num_vars}"
                    )));
                }
                if num_vars == i32::MAX {
                    return Err(Error::Parse(format!(
                        "can not support '{num_vars}' variables"
                    )));
                }
                header_found = true;
                continue;
            }

            if !header_found {
                return Err(Error::Parse(
                    "DIMACS header 'p cnf ...' not found".to_string(),
                ));
            }

            // Parse clause literals; clauses may span lines until the 0
            for token in line.split_whitespace() {
                let lit: Lit = token
                    .parse()
                    .map_err(|e| Error::Parse(format!("invalid literal '{token}': {e}")))?;
                if lit == 0 {
                    clauses.push(std::mem::take(&mut clause));
                } else {
                    if lit.unsigned_abs() > num_vars.unsigned_abs() {
                        return Err(Error::Parse(format!(
                            "literal '{lit}' exceeds maximum variable '{num_vars}'"
                        )));
                    }
                    clause.push(lit);
                }
            }
        }

        if !clause.is_empty() {
            return Err(Error::Parse(
                "unterminated clause at end of input".to_string(),
            ));
        }
        if !header_found {
            return Err(Error::Parse(
                "DIMACS header 'p cnf ...' not found".to_string(),
            ));
        }

        Ok(Self { num_vars, clauses })
    }

    /// Parses DIMACS CNF from a string.
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_reader(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimacs() {
        let input = "\
c This is a comment
p cnf 3 2
1 -2 0
2 3 0
";
        let cnf = DimacsCnf::parse(input).unwrap();
        assert_eq!(cnf.num_vars, 3);
        assert_eq!(cnf.clauses.len(), 2);
        assert_eq!(cnf.clauses[0], vec![1, -2]);
        assert_eq!(cnf.clauses[1], vec![2, 3]);
    }

    #[test]
    fn test_parse_multiline_clause() {
        let cnf = DimacsCnf::parse("p cnf 2 1\n1\n-2 0\n").unwrap();
        assert_eq!(cnf.clauses, vec![vec![1, -2]]);
    }

    #[test]
    fn test_parse_empty_formula() {
        let cnf = DimacsCnf::parse("p cnf 0 0\n").unwrap();
        assert_eq!(cnf.num_vars, 0);
        assert!(cnf.clauses.is_empty());
    }

    #[test]
    fn test_missing_header() {
        assert!(DimacsCnf::parse("1 2 0\n").is_err());
    }

    #[test]
    fn test_literal_out_of_range() {
        assert!(DimacsCnf::parse("p cnf 2 1\n1 3 0\n").is_err());
    }

    #[test]
    fn test_unterminated_clause() {
        assert!(DimacsCnf::parse("p cnf 2 1\n1 2\n").is_err());
    }

    #[test]
    fn test_bad_token() {
        assert!(DimacsCnf::parse("p cnf 2 1\n1 x 0\n").is_err());
    }
}
