use crate::error::{LoopwarpError, Result};
use crate::structure::atom::{guess_element, pad_element, Atom};
use crate::structure::coordinate::Coordinate;

/// Parse the fixed columns of an ATOM record.
///
/// Columns 1-54 are required. Element (77-78) is optional and guessed from
/// the atom name when blank or absent.
pub fn parse_line(line: &str) -> Result<Atom> {
    if line.len() < 54 || !line.as_bytes()[..54].is_ascii() {
        return Err(LoopwarpError::Parse(format!(
            "ATOM record is too short ({} columns)", line.len()
        )));
    }
    let x = parse_float(&line[30..38], "x")?;
    let y = parse_float(&line[38..46], "y")?;
    let z = parse_float(&line[46..54], "z")?;
    let atom_name = parse_atom(&line[12..16])?;
    let res_name = parse_residue(&line[17..20])?;
    let chain = line.as_bytes()[21];
    let res_serial = line[22..26]
        .trim()
        .parse::<i32>()
        .map_err(|_| LoopwarpError::Parse(format!("bad residue number '{}'", &line[22..26])))?;
    let insert_code = match line.as_bytes()[26] {
        b' ' => None,
        code => Some(code),
    };
    let element = match line.get(76..78) {
        Some(symbol) if !symbol.trim().is_empty() => pad_element(symbol),
        _ => guess_element(&line[12..16]),
    };

    Ok(Atom::new(
        Coordinate::new(x, y, z),
        atom_name,
        res_name,
        res_serial,
        insert_code,
        chain,
        element,
    ))
}

/// Alternate location indicator (column 17), `None` when blank.
pub fn parse_alt_loc(line: &str) -> Option<u8> {
    match line.as_bytes().get(16) {
        Some(b' ') | None => None,
        Some(code) => Some(*code),
    }
}

fn parse_float(field: &str, axis: &str) -> Result<f32> {
    field
        .trim()
        .parse::<f32>()
        .map_err(|_| LoopwarpError::Parse(format!("bad {} coordinate '{}'", axis, field)))
}

pub fn parse_atom(name: &str) -> Result<[u8; 4]> {
    let bytes = name.as_bytes();
    match bytes.len() {
        4 => Ok([bytes[0], bytes[1], bytes[2], bytes[3]]),
        _ => Err(LoopwarpError::Parse(format!("atom name '{}' is not 4 characters long", name))),
    }
}

pub fn parse_residue(name: &str) -> Result<[u8; 3]> {
    let bytes = name.as_bytes();
    match bytes.len() {
        3 => Ok([bytes[0], bytes[1], bytes[2]]),
        _ => Err(LoopwarpError::Parse(format!("residue name '{}' is not 3 characters long", name))),
    }
}

#[cfg(test)]
mod parser_tests {
    use super::*;

    #[test]
    fn test_parse_atom() {
        assert_eq!(parse_atom("CA  ").unwrap(), [67, 65, 32, 32]);
        assert!(parse_atom("CA").is_err());
        assert!(parse_atom("CA   ").is_err());
    }

    #[test]
    fn test_parse_residue() {
        assert_eq!(parse_residue("ALA").unwrap(), [65, 76, 65]);
        assert!(parse_residue("ALAN").is_err());
        assert!(parse_residue("AL").is_err());
    }

    #[test]
    fn test_parse_line_success() {
        let line =
            "ATOM      1  N   ALA A 340      -2.311   2.993 -33.448  1.00  6.00           N  ";
        let atom = parse_line(line).unwrap();
        assert_eq!(&atom.atom_name, b" N  ");
        assert_eq!(&atom.res_name, b"ALA");
        assert_eq!(atom.chain, b'A');
        assert_eq!(atom.res_serial, 340);
        assert_eq!(atom.insert_code, None);
        assert_eq!(atom.coordinate, Coordinate::new(-2.311, 2.993, -33.448));
        assert_eq!(atom.element_str(), "N");
    }

    #[test]
    fn test_parse_line_insert_code_and_missing_element() {
        let line = "ATOM    812  CB  SER B 111A     11.104  -4.020  21.500  1.00 30.12";
        let atom = parse_line(line).unwrap();
        assert_eq!(atom.res_serial, 111);
        assert_eq!(atom.insert_code, Some(b'A'));
        assert_eq!(atom.element_str(), "C");
        let negative = "ATOM      5  CA  GLY A  -3       0.000   0.000   0.000  1.00  0.00           C  ";
        assert_eq!(parse_line(negative).unwrap().res_serial, -3);
    }

    #[test]
    fn test_parse_line_fail() {
        // Short line
        assert!(parse_line("ATOM      1  N   ALA A   1      10.000  10.000").is_err());
        // Error in X
        let line = "ATOM      1  N   ALA A   1      1A.000  10.000  10.000  1.00  0.00           N  ";
        assert!(parse_line(line).is_err());
        // Error in residue number
        let line = "ATOM      1  N   ALA A   X      10.000  10.000  10.000  1.00  0.00           N  ";
        assert!(parse_line(line).is_err());
    }

    #[test]
    fn test_alt_loc() {
        let line = "ATOM      1  N  AALA A 340      -2.311   2.993 -33.448  0.50  6.00           N  ";
        assert_eq!(parse_alt_loc(line), Some(b'A'));
        assert!(parse_line(line).is_ok());
    }
}
